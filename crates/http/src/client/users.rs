//! User administration API client methods

use super::request::ApiRequest;
use super::{ClientError, StoreClient};
use crate::types::{CreateUserRequest, UserProfile};

impl StoreClient {
    /// List every user (admin).
    pub async fn list_users(&self) -> Result<Vec<UserProfile>, ClientError> {
        let req = ApiRequest::get("/users/all");
        self.execute_enveloped(&req).await
    }

    /// Create a user (admin).
    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<bool, ClientError> {
        let req = ApiRequest::post("/users").json(request)?;
        self.execute_enveloped(&req).await
    }
}

//! Authentication API client methods

use medstore_core::TokenPair;

use super::request::ApiRequest;
use super::{ClientError, StoreClient};
use crate::types::{LoginRequest, LoginResponse, RegisterRequest};

impl StoreClient {
    /// Log in and establish the session from the returned credential pair.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ClientError> {
        let req = ApiRequest::post("/auth/login").json(request)?;
        let login: LoginResponse = self.execute_enveloped(&req).await?;

        self.session().establish(&TokenPair {
            access_token: login.access_token.clone(),
            refresh_token: login.refresh_token.clone(),
        });
        Ok(login)
    }

    /// Register a new account. Does not log in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<bool, ClientError> {
        let req = ApiRequest::post("/auth/register").json(request)?;
        self.execute_enveloped(&req).await
    }

    /// Drop the stored credentials. The backend keeps no session state, so
    /// this is purely local.
    pub fn logout(&self) {
        self.session().clear();
    }
}

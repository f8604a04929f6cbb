//! Cart API client methods

use super::request::ApiRequest;
use super::{ClientError, StoreClient};
use crate::types::{CartItem, UpdateCartItemRequest};

impl StoreClient {
    /// Fetch the authenticated user's cart items.
    pub async fn my_cart(&self) -> Result<Vec<CartItem>, ClientError> {
        let req = ApiRequest::get("/carts/items/mycarts");
        self.execute_enveloped(&req).await
    }

    /// Set the quantity of one cart line.
    pub async fn update_cart_item(
        &self,
        product_id: &str,
        quantity: u32,
    ) -> Result<CartItem, ClientError> {
        let req = ApiRequest::put(format!("/carts/items/{product_id}"))
            .json(&UpdateCartItemRequest { quantity })?;
        self.execute_enveloped(&req).await
    }

    /// Remove one cart line.
    pub async fn remove_cart_item(&self, product_id: &str) -> Result<(), ClientError> {
        let req = ApiRequest::delete(format!("/carts/items/{product_id}"));
        let response = self.dispatch(&req).await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            Err(ClientError::from_status(status, message))
        }
    }
}

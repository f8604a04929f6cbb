//! Product and category API client methods

use serde_json::Value;

use super::request::{ApiRequest, FormField};
use super::{ClientError, StoreClient};
use crate::types::{Category, FileUpload, NewCategory, NewProduct, Page, Product};

impl StoreClient {
    /// Fetch a page of products.
    pub async fn fetch_products(&self, page: u32, size: u32) -> Result<Page<Product>, ClientError> {
        let req = ApiRequest::get("/products")
            .query("page", page.to_string())
            .query("size", size.to_string());
        self.execute_enveloped(&req).await
    }

    /// Search products by keyword. The backend answers with the list either
    /// inside the envelope's `data` or as a bare top-level array.
    pub async fn search_products(
        &self,
        keyword: &str,
        page: u32,
        size: u32,
    ) -> Result<Vec<Product>, ClientError> {
        let req = ApiRequest::get("/products/search")
            .query("keyword", keyword)
            .query("page", page.to_string())
            .query("size", size.to_string());
        let payload: Value = self.execute(&req).await?;

        let list = match payload {
            Value::Array(_) => payload,
            Value::Object(ref map) => map
                .get("data")
                .cloned()
                .unwrap_or_else(|| Value::Array(Vec::new())),
            _ => Value::Array(Vec::new()),
        };
        if !list.is_array() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_value(list)?)
    }

    /// Fetch one product with its detail fields.
    pub async fn product_detail(&self, product_id: &str) -> Result<Product, ClientError> {
        let req = ApiRequest::get(format!("/products/detail/{product_id}"));
        self.execute_enveloped(&req).await
    }

    /// Create a product (admin). Multipart so the image rides along.
    pub async fn create_product(
        &self,
        product: &NewProduct,
        image: Option<&FileUpload>,
    ) -> Result<Product, ClientError> {
        let mut fields = vec![
            FormField::text("name", &product.name),
            FormField::text("description", &product.description),
            FormField::text("price", product.price.to_string()),
            FormField::text("quantity", product.quantity.to_string()),
            FormField::text("categoryId", &product.category_id),
            FormField::text("manufacturerId", &product.manufacturer_id),
        ];
        if let Some(image) = image {
            fields.push(FormField::file("images", image));
        }
        let req = ApiRequest::post("/products").multipart(fields);
        self.execute_enveloped(&req).await
    }

    /// Fetch a page of categories.
    pub async fn fetch_categories(
        &self,
        page: u32,
        size: u32,
    ) -> Result<Page<Category>, ClientError> {
        let req = ApiRequest::get("/categories")
            .query("page", page.to_string())
            .query("size", size.to_string());
        self.execute_enveloped(&req).await
    }

    /// Create a category (admin). Multipart so the thumbnail rides along.
    pub async fn create_category(
        &self,
        category: &NewCategory,
        thumbnail: Option<&FileUpload>,
    ) -> Result<Category, ClientError> {
        let mut fields = vec![
            FormField::text("name", &category.name),
            FormField::text("description", &category.description),
        ];
        if let Some(position) = category.position {
            fields.push(FormField::text("position", position.to_string()));
        }
        if let Some(thumbnail) = thumbnail {
            fields.push(FormField::file("thumbnail", thumbnail));
        }
        let req = ApiRequest::post("/categories").multipart(fields);
        self.execute_enveloped(&req).await
    }
}

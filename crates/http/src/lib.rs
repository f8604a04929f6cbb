//! MedStore HTTP session client
//!
//! Mediates every request between the UI and the REST backend: bearer-token
//! attachment, multipart handling, and a single transparent refresh-and-retry
//! when the access token is rejected.

pub mod client;
pub mod types;

pub use client::config::ClientConfig;
pub use client::error::ClientError;
pub use client::request::ApiRequest;
pub use client::{StoreClient, StoreClientBuilder};

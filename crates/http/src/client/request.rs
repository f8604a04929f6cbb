//! Rebuildable request descriptors and the auth-endpoint classifier
//!
//! A transport request is consumed when it is sent, so the 401 recovery path
//! keeps an owned descriptor it can materialize a second time, multipart
//! bodies included.

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::Serialize;

use crate::types::FileUpload;

/// Paths exempt from bearer attachment and from refresh recovery.
const AUTH_ENDPOINTS: [&str; 3] = ["/auth/login", "/auth/register", "/auth/refresh"];

/// Whether `path` targets an auth endpoint.
///
/// Literal substring containment, case-sensitive, query string included —
/// the same predicate on both the attach side and the recovery side keeps a
/// failing refresh from triggering itself.
pub fn is_auth_endpoint(path: &str) -> bool {
    AUTH_ENDPOINTS.iter().any(|needle| path.contains(needle))
}

/// One field of a multipart body, owned so the body can be rebuilt.
#[derive(Clone, Debug)]
pub enum FormValue {
    Text(String),
    File {
        bytes: Vec<u8>,
        file_name: String,
        mime: Option<String>,
    },
}

/// A named multipart field.
#[derive(Clone, Debug)]
pub struct FormField {
    pub name: String,
    pub value: FormValue,
}

impl FormField {
    /// A plain text field.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Text(value.into()),
        }
    }

    /// A file field built from an upload.
    pub fn file(name: impl Into<String>, upload: &FileUpload) -> Self {
        Self {
            name: name.into(),
            value: FormValue::File {
                bytes: upload.bytes.clone(),
                file_name: upload.file_name.clone(),
                mime: upload.mime.clone(),
            },
        }
    }
}

/// Request payload variants.
#[derive(Clone, Debug)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FormField>),
}

/// Outgoing request descriptor: method, path, query, headers of interest,
/// and a body that can be rebuilt if the first dispatch is rejected.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    content_type: Option<String>,
    body: RequestBody,
}

impl ApiRequest {
    /// Create a descriptor for `method` on `path` (relative to the base URL).
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            content_type: None,
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query pair.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set an explicit `Content-Type`. Ignored for multipart bodies, where
    /// the transport must generate the boundary itself.
    pub fn content_type(mut self, value: impl Into<String>) -> Self {
        self.content_type = Some(value.into());
        self
    }

    /// Attach a JSON body.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, serde_json::Error> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attach a multipart body.
    pub fn multipart(mut self, fields: Vec<FormField>) -> Self {
        self.body = RequestBody::Multipart(fields);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn explicit_content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self.body, RequestBody::Multipart(_))
    }
}

/// Build a transport multipart form from descriptor fields.
pub(crate) fn multipart_form(fields: &[FormField]) -> Result<Form, reqwest::Error> {
    let mut form = Form::new();
    for field in fields {
        form = match &field.value {
            FormValue::Text(text) => form.text(field.name.clone(), text.clone()),
            FormValue::File {
                bytes,
                file_name,
                mime,
            } => {
                let mut part = Part::bytes(bytes.clone()).file_name(file_name.clone());
                if let Some(mime) = mime {
                    part = part.mime_str(mime)?;
                }
                form.part(field.name.clone(), part)
            }
        };
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_endpoints_match_by_substring() {
        assert!(is_auth_endpoint("/auth/login"));
        assert!(is_auth_endpoint("/auth/register"));
        assert!(is_auth_endpoint("/auth/refresh"));
        assert!(is_auth_endpoint("/api/v1/auth/login"));
        assert!(is_auth_endpoint("/auth/refresh?source=retry"));
    }

    #[test]
    fn classifier_is_case_sensitive_and_literal() {
        assert!(!is_auth_endpoint("/AUTH/LOGIN"));
        assert!(!is_auth_endpoint("/auth/logout"));
        assert!(!is_auth_endpoint("/authx/login"));
        assert!(!is_auth_endpoint("/products"));
        assert!(!is_auth_endpoint(""));
    }

    #[test]
    fn json_body_serializes_into_descriptor() {
        let request = ApiRequest::post("/auth/refresh")
            .json(&serde_json::json!({"refreshToken": "R1"}))
            .unwrap();

        match request.body() {
            RequestBody::Json(value) => assert_eq!(value["refreshToken"], "R1"),
            other => panic!("expected json body, got {other:?}"),
        }
    }

    #[test]
    fn multipart_descriptor_rebuilds_its_form() {
        let upload = FileUpload {
            file_name: "pill.png".to_owned(),
            bytes: vec![1, 2, 3],
            mime: Some("image/png".to_owned()),
        };
        let request = ApiRequest::post("/categories").multipart(vec![
            FormField::text("name", "Antibiotics"),
            FormField::file("thumbnail", &upload),
        ]);

        assert!(request.is_multipart());
        // Two builds from one descriptor, as the retry path needs.
        match request.body() {
            RequestBody::Multipart(fields) => {
                assert!(multipart_form(fields).is_ok());
                assert!(multipart_form(fields).is_ok());
            }
            other => panic!("expected multipart body, got {other:?}"),
        }
    }

    #[test]
    fn query_pairs_accumulate_in_order() {
        let request = ApiRequest::get("/products")
            .query("page", "0")
            .query("size", "10");

        assert_eq!(
            request.query_pairs(),
            &[
                ("page".to_owned(), "0".to_owned()),
                ("size".to_owned(), "10".to_owned())
            ]
        );
    }
}

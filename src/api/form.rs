//! Form bodies, multipart or urlencoded
//!
//! A POST without a `Content-Type` is read as an empty form.

use crate::attachments::Upload;
use axum::{
    async_trait,
    extract::{Form, FromRequest, Multipart, Request},
    http::{Method, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use std::collections::HashMap;

/// Text fields and files of a submitted form
#[derive(Debug, Clone, Default)]
pub struct SubmittedForm {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, Upload>,
}

impl SubmittedForm {
    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn take_file(&mut self, name: &str) -> Option<Upload> {
        self.files.remove(name)
    }
}

fn content_type(req: &Request) -> Option<&str> {
    req.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
}

fn is_multipart(req: &Request) -> bool {
    content_type(req).is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

/// A POST with no declared body, such as a bare button press
fn is_bodyless(req: &Request) -> bool {
    !matches!(*req.method(), Method::GET | Method::HEAD) && content_type(req).is_none()
}

#[async_trait]
impl<S> FromRequest<S> for SubmittedForm
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_bodyless(&req) {
            return Ok(Self::default());
        }
        if !is_multipart(&req) {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            return Ok(Self {
                fields,
                files: HashMap::new(),
            });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(IntoResponse::into_response)?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field.bytes().await.map_err(IntoResponse::into_response)?;
                    // Browsers send an empty, unnamed part when no file was chosen.
                    if !file_name.is_empty() {
                        form.files.insert(name, Upload::new(file_name, bytes.to_vec()));
                    }
                },
                None => {
                    let text = field.text().await.map_err(IntoResponse::into_response)?;
                    form.fields.insert(name, text);
                },
            }
        }
        Ok(form)
    }
}

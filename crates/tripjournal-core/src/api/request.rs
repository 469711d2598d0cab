use reqwest::{header, Method, Url};

use super::{ApiError, ApiRequest};
use crate::auth::Session;

/// `Content-Type` values the journal service understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Json,
    FormUrlEncoded,
    /// Used for bodyless deletes
    Any,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Json => "application/json",
            ContentType::FormUrlEncoded => "application/x-www-form-urlencoded",
            ContentType::Any => "*/*",
        }
    }
}

/// Produces requests against a fixed base URL, reading the token from the
/// session at build time.
pub struct RequestBuilder<'a> {
    base_url: &'a Url,
    session: &'a Session,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(base_url: &'a Url, session: &'a Session) -> Self {
        Self { base_url, session }
    }

    pub fn build(
        &self,
        segments: &[&str],
        method: Method,
        auth_required: bool,
        content_type: ContentType,
    ) -> Result<ApiRequest, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static(content_type.as_str()),
        );

        if auth_required {
            let token = self.session.token().ok_or(ApiError::AuthenticationRequired)?;
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token.access_token))
                .map_err(|_| {
                    ApiError::RequestConstruction("Token is not a valid header value".to_string())
                })?;
            headers.insert(header::AUTHORIZATION, value);
        }

        Ok(ApiRequest {
            method,
            url: self.resolve(segments)?,
            headers,
            body: None,
        })
    }

    /// Append each segment to the base URL's path as exactly one path segment.
    /// `/` inside a segment is percent-encoded, never treated as a separator.
    fn resolve(&self, segments: &[&str]) -> Result<Url, ApiError> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(ApiError::RequestConstruction(format!(
                "Invalid path segment {bad:?}"
            )));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ApiError::RequestConstruction(format!("Base URL cannot carry a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

//! REST API client module for the Trip Journal service.
//!
//! `JournalClient` is the public entry point. Requests are described as
//! plain `ApiRequest` values, built by `RequestBuilder` and sent through a
//! `Transport`, so the HTTP stack can be swapped out in tests.
//!
//! Authenticated endpoints use a bearer token obtained from `/register` or
//! `/token`.

pub mod client;
pub mod error;
pub mod request;
pub mod transport;

pub use client::{JournalClient, DEFAULT_BASE_URL};
pub use error::{ApiError, TransportError};
pub use request::{ContentType, RequestBuilder};
pub use transport::{ApiRequest, HttpResponse, ReqwestTransport, Transport};

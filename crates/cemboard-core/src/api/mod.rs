//! Remote API access

pub mod client;
pub mod mock;
pub mod transport;

pub use client::{ApiClient, ImageFile, API_KEY_HEADER};
pub use mock::ScriptedTransport;
pub use transport::{ApiRequest, ApiResponse, Method, RequestBody, ReqwestTransport, Transport};

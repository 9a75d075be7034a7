//! Transport seam between the request pipeline and the network.

mod message;
mod reqwest_transport;

pub use message::{FileUpload, FormPart, HttpRequest, HttpResponse, MultipartForm, Payload, RequestBody};
pub use reqwest::Method;
pub use reqwest_transport::ReqwestTransport;

use async_trait::async_trait;

use crate::errors::ClientResult;

/// Sends one fully built request.
///
/// Implementations report transport failures (no response, timeout) as
/// `ClientError::Network`. Any response that arrives, whatever its status,
/// is returned as `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> ClientResult<HttpResponse>;
}

//! Every outbound call goes through [`RequestPipeline`].
//!
//! The pipeline resolves URLs, injects the bearer token, picks the content
//! type, normalizes error responses and owns the one place where a 401
//! invalidates the session and sends the user to the login surface.

mod redirect;

pub use redirect::{ChannelRedirector, Redirector};

use std::sync::Arc;
use std::time::Instant;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::errors::{extract_error_message, ClientError, ClientResult};
use crate::http::{FileUpload, HttpRequest, HttpResponse, MultipartForm, Payload, RequestBody, Transport};
use crate::session::SessionStore;
use crate::utils::resolve_url;

/// Multipart field name the upload endpoints expect.
pub const UPLOAD_FIELD: &str = "file";

const PROTECTED_HEADERS: [&str; 2] = ["authorization", "content-type"];

#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Clone)]
pub struct RequestPipeline {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    session: SessionStore,
    redirector: Arc<dyn Redirector>,
}

impl RequestPipeline {
    pub fn new(
        config: Arc<ClientConfig>,
        transport: Arc<dyn Transport>,
        session: SessionStore,
        redirector: Arc<dyn Redirector>,
    ) -> Self {
        Self {
            config,
            transport,
            session,
            redirector,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub async fn request(
        &self,
        endpoint: &str,
        method: Method,
        payload: Option<Payload>,
        options: RequestOptions,
    ) -> ClientResult<HttpResponse> {
        let request_id = Uuid::new_v4();
        let (request, sent_token) = self.build_request(endpoint, method, payload, options, request_id)?;
        let method = request.method.clone();
        let started = Instant::now();

        tracing::debug!(
            %request_id,
            %method,
            endpoint,
            authenticated = request.header("authorization").is_some(),
            "sending request"
        );

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(%request_id, %method, endpoint, error = %err, "request failed without response");
                return Err(match err {
                    ClientError::Network(_) | ClientError::InvalidRequest(_) => err,
                    other => ClientError::network(other.user_message().to_string()),
                });
            }
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        if response.is_success() {
            tracing::debug!(%request_id, status = response.status, elapsed_ms, "request succeeded");
            return Ok(response);
        }

        let message = extract_error_message(&response.body);
        tracing::warn!(
            %request_id,
            %method,
            endpoint,
            status = response.status,
            elapsed_ms,
            message = %message,
            "request rejected"
        );

        if response.status == 401 {
            self.handle_unauthorized(endpoint, sent_token.as_deref());
        }

        Err(ClientError::from_status(response.status, message))
    }

    pub async fn get(&self, endpoint: &str) -> ClientResult<HttpResponse> {
        self.request(endpoint, Method::GET, None, RequestOptions::default()).await
    }

    pub async fn delete(&self, endpoint: &str) -> ClientResult<HttpResponse> {
        self.request(endpoint, Method::DELETE, None, RequestOptions::default()).await
    }

    pub async fn post(&self, endpoint: &str, payload: Option<Payload>) -> ClientResult<HttpResponse> {
        self.request(endpoint, Method::POST, payload, RequestOptions::default()).await
    }

    pub async fn put(&self, endpoint: &str, payload: Payload) -> ClientResult<HttpResponse> {
        self.request(endpoint, Method::PUT, Some(payload), RequestOptions::default()).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> ClientResult<T> {
        self.get(endpoint).await?.json()
    }

    pub async fn post_json<B, T>(&self, endpoint: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post(endpoint, Some(Payload::json(body)?)).await?.json()
    }

    /// POST `file` as the multipart field `file`.
    pub async fn upload_file(&self, endpoint: &str, file: FileUpload) -> ClientResult<HttpResponse> {
        tracing::info!(endpoint, file_name = %file.file_name, size = file.bytes.len(), "uploading file");
        let form = MultipartForm::new().file(UPLOAD_FIELD, file);
        self.post(endpoint, Some(Payload::Multipart(form))).await
    }

    fn build_request(
        &self,
        endpoint: &str,
        method: Method,
        payload: Option<Payload>,
        options: RequestOptions,
        request_id: Uuid,
    ) -> ClientResult<(HttpRequest, Option<String>)> {
        if endpoint.trim().is_empty() {
            return Err(ClientError::invalid_request("endpoint must not be empty"));
        }

        let bodyless = method == Method::GET || method == Method::DELETE;
        let payload = if bodyless && payload.is_some() {
            tracing::warn!(%method, endpoint, "dropping body on a bodyless method");
            None
        } else {
            payload
        };

        let mut headers = vec![("X-Request-Id".to_string(), request_id.to_string())];
        for (name, value) in options.headers {
            if PROTECTED_HEADERS.iter().any(|h| name.eq_ignore_ascii_case(h)) {
                tracing::debug!(header = %name, "ignoring caller-supplied protected header");
                continue;
            }
            headers.push((name, value));
        }

        let token = self.session.token();
        if let Some(token) = &token {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }

        let body = match payload {
            Some(Payload::Multipart(form)) => RequestBody::Multipart(form),
            Some(Payload::Json(value)) => {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
                RequestBody::Json(serde_json::to_vec(&value)?)
            }
            None => {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
                RequestBody::Empty
            }
        };

        let request = HttpRequest {
            method,
            url: resolve_url(&self.config.base_url, endpoint),
            headers,
            body,
        };
        Ok((request, token))
    }

    /// `sent_token` is the token the rejected request carried; a 401 for a
    /// token that has since been replaced leaves the new session alone.
    fn handle_unauthorized(&self, endpoint: &str, sent_token: Option<&str>) {
        if self.config.is_auth_endpoint(endpoint) {
            tracing::debug!(endpoint, "401 from auth endpoint, leaving session to the caller");
            return;
        }

        if self.session.invalidate_if_current(sent_token) {
            tracing::info!(to = %self.config.login_path, "redirecting to login");
            self.redirector.redirect(&self.config.login_path);
        }
    }
}

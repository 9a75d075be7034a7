use crate::config::{LOGIN_ENDPOINT, REGISTER_ENDPOINT, REGISTER_FROM_PARAMS_ENDPOINT};
use crate::errors::ClientResult;
use crate::models::{AuthResponse, FirstUserCheck, LoginRequest, RegisterRequest, UserProfile};
use crate::pipeline::RequestPipeline;

pub const CHECK_FIRST_USER_ENDPOINT: &str = "/api/auth/check-first-user";

/// Login and registration. Each successful call installs the returned
/// token and user into the session.
#[derive(Clone)]
pub struct AuthApi {
    pipeline: RequestPipeline,
}

impl AuthApi {
    pub fn new(pipeline: RequestPipeline) -> Self {
        Self { pipeline }
    }

    pub async fn login(&self, username: &str, password: &str) -> ClientResult<UserProfile> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response: AuthResponse = self.pipeline.post_json(LOGIN_ENDPOINT, &request).await?;
        self.install(response)
    }

    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<UserProfile> {
        let response: AuthResponse = self.pipeline.post_json(REGISTER_ENDPOINT, request).await?;
        self.install(response)
    }

    /// Register-or-login from a name and mobile number passed as query parameters.
    pub async fn register_from_params(&self, name: &str, mobile: &str) -> ClientResult<UserProfile> {
        let endpoint = format!(
            "{REGISTER_FROM_PARAMS_ENDPOINT}?name={}&mobile={}",
            urlencoding::encode(name),
            urlencoding::encode(mobile)
        );
        let response: AuthResponse = self.pipeline.post(&endpoint, None).await?.json()?;
        self.install(response)
    }

    pub async fn check_first_user(&self) -> ClientResult<bool> {
        let check: FirstUserCheck = self.pipeline.get_json(CHECK_FIRST_USER_ENDPOINT).await?;
        Ok(check.is_first_user)
    }

    fn install(&self, response: AuthResponse) -> ClientResult<UserProfile> {
        if let Some(message) = &response.message {
            tracing::info!(message = %message, "auth response");
        }
        let user = response.user.clone();
        self.pipeline.session().set_auth(response.access_token, response.user)?;
        Ok(user)
    }
}

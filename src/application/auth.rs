//! Login and signup use cases

use crate::application::SessionManager;
use crate::domain::api_error::{login_message, registration_message};
use crate::domain::{Credentials, Registration, TokenPair};
use crate::error::{QuillError, Result};
use reqwest::Response;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Service exchanging credentials with the auth endpoints
pub struct AuthService {
    session: Arc<SessionManager>,
}

impl AuthService {
    pub fn new(session: Arc<SessionManager>) -> Self {
        AuthService { session }
    }

    /// Exchange username/password for a token pair and store it
    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        self.session.begin_login();
        let result = self.exchange(credentials).await;

        match result {
            Ok(pair) => self.session.login(pair.access, pair.refresh),
            Err(e) => {
                self.session.abort_login();
                Err(e)
            }
        }
    }

    async fn exchange(&self, credentials: &Credentials) -> Result<TokenPair> {
        let url = self.session.endpoints().token();
        debug!(url = %url, username = %credentials.username, "requesting token pair");

        let response = self
            .session
            .client()
            .post(&url)
            .json(credentials)
            .send()
            .await
            .map_err(QuillError::Unreachable)?;

        let status = response.status();
        if status.is_success() {
            let pair = response.json::<TokenPair>().await?;
            if pair.access.is_empty() || pair.refresh.is_empty() {
                warn!("token endpoint returned an incomplete token pair");
                return Err(QuillError::InvalidResponse(
                    "token pair is missing a token".to_string(),
                ));
            }
            return Ok(pair);
        }

        let body = error_body(response).await;
        if status.is_client_error() {
            Err(QuillError::InvalidCredentials(login_message(&body)))
        } else {
            warn!(%status, "login failed on the server side");
            Err(QuillError::Api {
                status: status.as_u16(),
                message: login_message(&body),
            })
        }
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, registration: &Registration) -> Result<()> {
        registration.validate().map_err(QuillError::Registration)?;

        let url = self.session.endpoints().register();
        debug!(url = %url, username = %registration.username, "registering account");

        let response = self
            .session
            .client()
            .post(&url)
            .json(registration)
            .send()
            .await
            .map_err(QuillError::Unreachable)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = error_body(response).await;
        if status.is_client_error() {
            Err(QuillError::Registration(registration_message(&body)))
        } else {
            Err(QuillError::Api {
                status: status.as_u16(),
                message: registration_message(&body),
            })
        }
    }
}

/// JSON error body, or `Null` when the body is not JSON
async fn error_body(response: Response) -> Value {
    response.json::<Value>().await.unwrap_or(Value::Null)
}

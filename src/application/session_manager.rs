//! Authenticated session manager
//!
//! Owns the access/refresh token pair, mirrors it into a [`TokenStore`], and
//! offers a fetch-like [`SessionManager::authenticated_request`] that refreshes
//! the access token once and retries once when the server answers 401.

use crate::domain::credentials::{RefreshRequest, RefreshedToken};
use crate::domain::{Phase, Session, SessionState};
use crate::error::{QuillError, Result};
use crate::infrastructure::{Config, Endpoints, TokenStore};
use parking_lot::Mutex;
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, error, info, warn};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// What a refresh attempt did to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New access token stored
    Refreshed(String),
    /// Refresh token missing or rejected; session cleared
    LoggedOut,
    /// Server or network failure; session left as it was
    Unavailable,
}

/// Method and optional JSON body of a request
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        RequestOptions::get()
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        RequestOptions {
            method: Method::GET,
            body: None,
        }
    }

    pub fn post(body: Value) -> Self {
        RequestOptions {
            method: Method::POST,
            body: Some(body),
        }
    }

    pub fn patch(body: Value) -> Self {
        RequestOptions {
            method: Method::PATCH,
            body: Some(body),
        }
    }

    pub fn delete() -> Self {
        RequestOptions {
            method: Method::DELETE,
            body: None,
        }
    }
}

pub struct SessionManager {
    client: Client,
    endpoints: Endpoints,
    store: Box<dyn TokenStore>,
    persist_access_token: bool,
    session: Mutex<Session>,
}

impl SessionManager {
    /// Create a manager, hydrating the session from `store`
    pub fn new(
        client: Client,
        endpoints: Endpoints,
        store: Box<dyn TokenStore>,
        persist_access_token: bool,
    ) -> Result<Self> {
        let access_token = if persist_access_token {
            store.get(ACCESS_TOKEN_KEY)?
        } else {
            None
        };
        let refresh_token = store.get(REFRESH_TOKEN_KEY)?;
        let session = Session::new(access_token, refresh_token);

        debug!(state = %session.state(), "session hydrated");

        Ok(SessionManager {
            client,
            endpoints,
            store,
            persist_access_token,
            session: Mutex::new(session),
        })
    }

    /// Create a manager with an HTTP client built from `config`
    pub fn from_config(config: &Config, store: Box<dyn TokenStore>) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Self::new(
            client,
            Endpoints::new(&config.api_url),
            store,
            config.persist_access_token,
        )
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Snapshot of the current session
    pub fn session(&self) -> Session {
        self.session.lock().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.lock().is_logged_in()
    }

    pub fn state(&self) -> SessionState {
        self.session.lock().state()
    }

    /// Mark a credential exchange as in flight
    pub fn begin_login(&self) {
        self.set_phase(Phase::LoggingIn);
    }

    /// Abandon an in-flight credential exchange, keeping whatever tokens were held
    pub fn abort_login(&self) {
        self.set_phase(Phase::Idle);
    }

    /// Store a freshly issued token pair
    pub fn login(&self, access_token: String, refresh_token: String) -> Result<()> {
        info!("logged in");
        self.apply(Session::logged_in(access_token, refresh_token))
    }

    /// Clear both tokens in memory and in storage
    pub fn logout(&self) -> Result<()> {
        info!("logged out");
        self.apply(Session::cleared())
    }

    /// Obtain a new access token. `None` on any failure.
    pub async fn refresh(&self) -> Option<String> {
        match self.refresh_outcome().await {
            RefreshOutcome::Refreshed(token) => Some(token),
            RefreshOutcome::LoggedOut | RefreshOutcome::Unavailable => None,
        }
    }

    /// Obtain a new access token, reporting what happened to the session.
    ///
    /// 401 from the refresh endpoint clears the session. Any other failure
    /// leaves it untouched.
    pub async fn refresh_outcome(&self) -> RefreshOutcome {
        let refresh_token = self.session.lock().refresh_token().map(str::to_owned);
        let Some(refresh_token) = refresh_token else {
            info!("no refresh token held, ending session");
            self.logout_after_refresh();
            return RefreshOutcome::LoggedOut;
        };

        self.set_phase(Phase::Refreshing);
        debug!(url = %self.endpoints.token_refresh(), "refreshing access token");

        let result = self
            .client
            .post(self.endpoints.token_refresh())
            .json(&RefreshRequest {
                refresh: &refresh_token,
            })
            .send()
            .await;

        let outcome = match result {
            Ok(response) if response.status().is_success() => {
                match response.json::<RefreshedToken>().await {
                    Ok(body) if !body.access.is_empty() => {
                        let next = self.session.lock().with_access_token(body.access.clone());
                        if let Err(e) = self.apply(next) {
                            error!("failed to persist refreshed token: {}", e);
                        }
                        info!("access token refreshed");
                        RefreshOutcome::Refreshed(body.access)
                    }
                    Ok(_) => {
                        warn!("refresh response carried an empty access token");
                        RefreshOutcome::Unavailable
                    }
                    Err(e) => {
                        warn!("unreadable refresh response: {}", e);
                        RefreshOutcome::Unavailable
                    }
                }
            }
            Ok(response) if response.status() == StatusCode::UNAUTHORIZED => {
                info!("refresh token rejected, ending session");
                self.logout_after_refresh();
                RefreshOutcome::LoggedOut
            }
            Ok(response) => {
                warn!(status = %response.status(), "token refresh failed, keeping session");
                RefreshOutcome::Unavailable
            }
            Err(e) => {
                warn!("token refresh unreachable, keeping session: {}", e);
                RefreshOutcome::Unavailable
            }
        };

        self.set_phase(Phase::Idle);
        outcome
    }

    /// Send a request with the current access token as a bearer credential.
    ///
    /// On 401 the token is refreshed once and the request retried once; the
    /// retried response is returned whatever its status. If no new token can
    /// be obtained the call fails with [`QuillError::SessionExpired`].
    pub async fn authenticated_request(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<Response> {
        let token = self.session.lock().access_token().map(str::to_owned);
        let response = self.send(url, options, token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(url, "request unauthorized, attempting refresh");
        match self.refresh().await {
            Some(new_token) => self.send(url, options, Some(&new_token)).await,
            None => Err(QuillError::SessionExpired),
        }
    }

    async fn send(
        &self,
        url: &str,
        options: &RequestOptions,
        token: Option<&str>,
    ) -> Result<Response> {
        debug!(method = %options.method, url, "sending request");

        let mut request = self.client.request(options.method.clone(), url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    /// Single write path: set the in-memory session, then mirror it to storage
    fn apply(&self, next: Session) -> Result<()> {
        *self.session.lock() = next.clone();

        match next.access_token() {
            Some(token) if self.persist_access_token => self.store.set(ACCESS_TOKEN_KEY, token)?,
            _ => self.store.remove(ACCESS_TOKEN_KEY)?,
        }
        match next.refresh_token() {
            Some(token) => self.store.set(REFRESH_TOKEN_KEY, token)?,
            None => self.store.remove(REFRESH_TOKEN_KEY)?,
        }

        Ok(())
    }

    fn logout_after_refresh(&self) {
        if let Err(e) = self.logout() {
            error!("failed to clear stored session: {}", e);
        }
    }

    fn set_phase(&self, phase: Phase) {
        let mut session = self.session.lock();
        *session = session.with_phase(phase);
    }
}

//! Identity provider client
//!
//! Talks to a GoTrue-compatible auth REST API (the hosted auth service the
//! app signs users in with). Session logic depends on the `IdentityProvider`
//! trait rather than the concrete client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

/// The signed-in user as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

/// A fresh access/refresh token pair plus its user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user: AuthUser,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("identity provider rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("identity provider returned a session without a user")]
    MissingUser,
    #[error("invalid identity provider URL: {0}")]
    Url(#[from] url::ParseError),
}

impl IdentityError {
    /// True when the provider answered and said no (bad token, bad
    /// credentials), as opposed to not being reachable at all.
    pub fn is_rejection(&self) -> bool {
        matches!(self, IdentityError::Rejected { .. } | IdentityError::MissingUser)
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Validate an access token and return its user
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, IdentityError>;

    /// Exchange a refresh token for a new session (rotates both tokens)
    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, IdentityError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, IdentityError>;

    /// Revoke the session behind an access token
    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError>;
}

#[derive(Deserialize)]
struct UserPayload {
    id: String,
    email: Option<String>,
}

impl From<UserPayload> for AuthUser {
    fn from(u: UserPayload) -> Self {
        Self {
            id: u.id,
            email: u.email.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
struct TokenPayload {
    access_token: String,
    refresh_token: String,
    user: Option<UserPayload>,
}

impl TryFrom<TokenPayload> for AuthSession {
    type Error = IdentityError;

    fn try_from(t: TokenPayload) -> Result<Self, Self::Error> {
        let user = t.user.ok_or(IdentityError::MissingUser)?;
        Ok(Self {
            access_token: t.access_token,
            refresh_token: t.refresh_token,
            user: user.into(),
        })
    }
}

#[derive(Clone)]
pub struct IdentityClient {
    base_url: Url,
    api_key: String,
    http: Client,
}

impl IdentityClient {
    pub fn new(project_url: &str, api_key: &str) -> Result<Self, IdentityError> {
        let mut base_url = Url::parse(project_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            api_key: api_key.to_string(),
            http: Client::new(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, IdentityError> {
        Ok(self.base_url.join(path)?)
    }

    fn token_endpoint(&self, grant_type: &str) -> Result<Url, IdentityError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);
        Ok(url)
    }

    async fn request_session(
        &self,
        url: Url,
        body: serde_json::Value,
    ) -> Result<AuthSession, IdentityError> {
        let resp = self
            .http
            .post(url)
            .header("apikey", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await?;
            return Err(IdentityError::Rejected { status, body });
        }

        let token: TokenPayload = resp.json().await?;
        token.try_into()
    }
}

#[async_trait]
impl IdentityProvider for IdentityClient {
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, IdentityError> {
        let resp = self
            .http
            .get(self.endpoint("auth/v1/user")?)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await?;
            return Err(IdentityError::Rejected { status, body });
        }

        let user: UserPayload = resp.json().await?;
        Ok(user.into())
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, IdentityError> {
        let url = self.token_endpoint("refresh_token")?;
        self.request_session(url, serde_json::json!({ "refresh_token": refresh_token }))
            .await
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, IdentityError> {
        let url = self.token_endpoint("password")?;
        self.request_session(
            url,
            serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let resp = self
            .http
            .post(self.endpoint("auth/v1/logout")?)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await?;
            return Err(IdentityError::Rejected { status, body });
        }

        Ok(())
    }
}

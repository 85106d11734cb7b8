//! Session check: access token validation with transparent refresh

use super::identity::{AuthUser, IdentityProvider};

/// Tokens issued by a refresh during this request; both cookies must be
/// rewritten with them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewedTokens {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Authenticated {
        user: AuthUser,
        renewed: Option<RenewedTokens>,
    },
    Unauthenticated,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }
}

/// Resolve the session carried by the two session cookies.
///
/// Order: no access token means unauthenticated; a valid access token means
/// authenticated; otherwise a refresh is attempted with the refresh token.
/// Never fails: every provider error ends in `Unauthenticated` and is logged.
pub async fn check_session(
    identity: &dyn IdentityProvider,
    access_token: Option<&str>,
    refresh_token: Option<&str>,
) -> SessionState {
    let Some(access_token) = access_token.filter(|t| !t.is_empty()) else {
        return SessionState::Unauthenticated;
    };

    match identity.get_user(access_token).await {
        Ok(user) => {
            return SessionState::Authenticated {
                user,
                renewed: None,
            };
        }
        Err(e) => tracing::debug!(error = %e, "Access token rejected, trying refresh"),
    }

    let Some(refresh_token) = refresh_token.filter(|t| !t.is_empty()) else {
        return SessionState::Unauthenticated;
    };

    match identity.refresh_session(refresh_token).await {
        Ok(session) => {
            tracing::info!(user_id = %session.user.id, "Session refreshed");
            SessionState::Authenticated {
                user: session.user,
                renewed: Some(RenewedTokens {
                    access_token: session.access_token,
                    refresh_token: session.refresh_token,
                }),
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Token refresh failed");
            SessionState::Unauthenticated
        }
    }
}

//! Test doubles shared by unit and router tests

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use crate::AppState;
use crate::services::identity::{AuthSession, AuthUser, IdentityError, IdentityProvider};

pub const VALID_ACCESS: &str = "access-ok";
pub const EXPIRED_ACCESS: &str = "access-expired";
pub const VALID_REFRESH: &str = "refresh-ok";
pub const INVALID_REFRESH: &str = "refresh-bad";
pub const ROTATED_ACCESS: &str = "access-rotated";
pub const ROTATED_REFRESH: &str = "refresh-rotated";
/// Refresh token the fake rotates into tokens that cannot go in a header
pub const MALFORMED_ROTATION_REFRESH: &str = "refresh-malformed";
pub const LOGIN_EMAIL: &str = "fan@example.com";
pub const LOGIN_PASSWORD: &str = "correct-horse";

/// In-memory identity provider with a fixed set of valid tokens
#[derive(Default)]
pub struct FakeIdentity {
    unreachable: bool,
    refresh_calls: AtomicUsize,
    sign_out_calls: AtomicUsize,
}

impl FakeIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails as if the provider could not be reached
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn user() -> AuthUser {
        AuthUser {
            id: "user-1".to_string(),
            email: LOGIN_EMAIL.to_string(),
        }
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }

    fn reachable(&self) -> Result<(), IdentityError> {
        if self.unreachable {
            return Err(IdentityError::Url(url::ParseError::EmptyHost));
        }
        Ok(())
    }

    fn rejected() -> IdentityError {
        IdentityError::Rejected {
            status: 401,
            body: "invalid token".to_string(),
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, IdentityError> {
        self.reachable()?;
        match access_token {
            VALID_ACCESS | ROTATED_ACCESS => Ok(Self::user()),
            _ => Err(Self::rejected()),
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, IdentityError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.reachable()?;
        match refresh_token {
            VALID_REFRESH => Ok(AuthSession {
                access_token: ROTATED_ACCESS.to_string(),
                refresh_token: ROTATED_REFRESH.to_string(),
                user: Self::user(),
            }),
            MALFORMED_ROTATION_REFRESH => Ok(AuthSession {
                access_token: "access\nrotated".to_string(),
                refresh_token: ROTATED_REFRESH.to_string(),
                user: Self::user(),
            }),
            _ => Err(Self::rejected()),
        }
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, IdentityError> {
        self.reachable()?;
        if email == LOGIN_EMAIL && password == LOGIN_PASSWORD {
            Ok(AuthSession {
                access_token: VALID_ACCESS.to_string(),
                refresh_token: VALID_REFRESH.to_string(),
                user: Self::user(),
            })
        } else {
            Err(Self::rejected())
        }
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), IdentityError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        self.reachable()
    }
}

/// App state whose pool never connects; only usable for request paths that
/// are decided before touching the database.
pub fn test_state(identity: Arc<FakeIdentity>) -> Arc<AppState> {
    let db = PgPoolOptions::new()
        .connect_lazy("postgres://video_keeper@localhost/video_keeper_test")
        .unwrap();

    Arc::new(AppState { db, identity })
}

pub fn test_app(identity: Arc<FakeIdentity>) -> Router {
    crate::routes::build_app(test_state(identity))
}

/// Full app over a real pool from [`db_pool`]
pub fn test_app_with_db(identity: Arc<FakeIdentity>, db: PgPool) -> Router {
    crate::routes::build_app(Arc::new(AppState { db, identity }))
}

static SCHEMA_SEQ: AtomicUsize = AtomicUsize::new(0);

/// Pool on a fresh, migrated schema of the database named by
/// `TEST_DATABASE_URL`, so each test starts from empty tables.
///
/// Returns `None` (and prints a skip marker) when the variable is unset. A
/// set but unusable database fails the test rather than hiding breakage.
pub async fn db_pool() -> Option<PgPool> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("SKIP-TEST-DATABASE: TEST_DATABASE_URL is not set");
        return None;
    };

    let options: PgConnectOptions = url
        .parse()
        .expect("TEST_DATABASE_URL must be a Postgres URL");
    let schema = format!(
        "video_keeper_test_{}_{}",
        std::process::id(),
        SCHEMA_SEQ.fetch_add(1, Ordering::SeqCst)
    );

    let admin = PgPoolOptions::new()
        .max_connections(1)
        .connect_with(options.clone())
        .await
        .expect("test database should accept connections");
    sqlx::query(&format!("DROP SCHEMA IF EXISTS {} CASCADE", schema))
        .execute(&admin)
        .await
        .expect("drop stale test schema");
    sqlx::query(&format!("CREATE SCHEMA {}", schema))
        .execute(&admin)
        .await
        .expect("create test schema");
    admin.close().await;

    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect_with(options.options([("search_path", schema.as_str())]))
        .await
        .expect("connect to test schema");
    crate::services::db::migrate(&pool)
        .await
        .expect("migrations apply to a fresh schema");

    Some(pool)
}

/// Cookie header carrying the given session tokens
pub fn session_cookie(access: &str, refresh: Option<&str>) -> String {
    match refresh {
        Some(refresh) => format!("session_token={}; session_refresh_token={}", access, refresh),
        None => format!("session_token={}", access),
    }
}

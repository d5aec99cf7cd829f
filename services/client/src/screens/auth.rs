//! services/client/src/screens/auth.rs
//!
//! Sign-in, sign-up and sign-out flows.

use crate::error::ClientError;
use crate::screens::state::AppState;
use question_bank_core::{
    Credentials, IssuedVia, RegistrationRequest, Route, RoleOption, SessionAction,
};
use tracing::{info, warn};

pub const LOGIN_FALLBACK: &str = "Login failed";
pub const REGISTER_FALLBACK: &str = "Registration failed";

/// Signs in and returns the one route to redirect to (the role's home).
///
/// On any failure the session is left untouched.
pub async fn login(state: &AppState, credentials: Credentials) -> Result<Route, ClientError> {
    credentials.validate()?;

    let grant = state.auth.login(&credentials).await.map_err(|e| {
        warn!("Login for '{}' failed: {}", credentials.username, e);
        e
    })?;
    let role = grant.role.clone();
    state.session.dispatch(SessionAction::SignedIn {
        grant,
        via: IssuedVia::Login,
    })?;

    info!("'{}' signed in as {}", credentials.username, role);
    Ok(role.home())
}

/// Registers a new account and signs it in.
pub async fn register(
    state: &AppState,
    request: RegistrationRequest,
) -> Result<Route, ClientError> {
    request.validate()?;

    let grant = state
        .auth
        .register(&request.for_submission())
        .await
        .map_err(|e| {
            warn!("Registration for '{}' failed: {}", request.username, e);
            e
        })?;
    let role = grant.role.clone();
    state.session.dispatch(SessionAction::SignedIn {
        grant,
        via: IssuedVia::Register,
    })?;

    info!("'{}' registered as {}", request.username, role);
    Ok(role.home())
}

pub fn logout(state: &AppState) -> Route {
    state.session.logout();
    info!("Signed out");
    Route::SignIn
}

/// The roles offered by the sign-up form.
pub async fn roles(state: &AppState) -> Result<Vec<RoleOption>, ClientError> {
    Ok(state.auth.list_roles().await?)
}

use crate::state::AppState;
use axum::Router;

pub mod claims;
pub(crate) mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
pub mod repo_types;

pub use extractors::{AuthUser, MaybeAuthUser};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::token_routes())
}

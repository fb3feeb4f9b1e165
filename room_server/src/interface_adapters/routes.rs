use crate::interface_adapters::handlers::{
    anonymous_sign_in, get_profile, issue_room, join_room, map_activity, register, sign_in,
    upgrade_identity,
};
use crate::interface_adapters::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/auth/anonymous", post(anonymous_sign_in))
        .route("/auth/register", post(register))
        .route("/auth/sign-in", post(sign_in))
        .route("/profiles/{user_id}", get(get_profile))
        .route("/rooms", post(issue_room))
        .route("/rooms/join", post(join_room))
        .route("/identity/upgrade", post(upgrade_identity))
        .route("/maps/{map_id}/activity", get(map_activity))
        .with_state(state)
}

use crate::middleware::auth::authenticate;
use crate::middleware::role::require_admin;
use crate::modules::users::controller::{get_me, get_user_by_id};
use crate::state::AppState;
use axum::{Router, middleware, routing::get};

/// Every route here is authenticated; `/{id}` additionally requires `admin`.
pub fn init_users_router(state: AppState) -> Router<AppState> {
    let admin_routes = Router::new()
        .route("/{id}", get(get_user_by_id))
        .route_layer(middleware::from_fn(require_admin));

    Router::new()
        .route("/me", get(get_me))
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(state, authenticate))
}

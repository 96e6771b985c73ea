use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

use super::handler;
use super::handler::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::api_root))
        .route("/healthz", get(handler::healthcheck))
        .route("/snippets", get(handler::list_snippets))
        .route("/snippets", post(handler::create_snippet))
        .route("/snippets/:id", get(handler::get_snippet))
        .route("/snippets/:id", put(handler::update_snippet))
        .route("/snippets/:id", patch(handler::patch_snippet))
        .route("/snippets/:id", delete(handler::delete_snippet))
        .route("/snippets/:id/highlight", get(handler::highlight_snippet))
        .route("/users", get(handler::list_users))
        .route("/users/:id", get(handler::get_user))
        .route("/detailed/users/:id", get(handler::get_user_detailed))
        .nest("/linked", linked_routes())
}

/// The hyperlinked route family. Same handlers shape, same dispatch; only
/// the bound representation variant differs.
fn linked_routes() -> Router<AppState> {
    Router::new()
        .route("/snippets", get(handler::linked_list_snippets))
        .route("/snippets", post(handler::linked_create_snippet))
        .route("/snippets/:id", get(handler::linked_get_snippet))
        .route("/snippets/:id", put(handler::linked_update_snippet))
        .route("/snippets/:id", patch(handler::linked_patch_snippet))
        .route("/snippets/:id", delete(handler::linked_delete_snippet))
        .route("/snippets/:id/highlight", get(handler::linked_highlight_snippet))
        .route("/users", get(handler::linked_list_users))
        .route("/users/:id", get(handler::linked_get_user))
}

//! HTTP handlers. Each snippet handler is a one-line translation of its
//! route into a dispatch call with the variant bound to its route family.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{Method, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde_json::{Value as JsonValue, json};

use crate::db::Database;
use crate::dispatch::{self, Outcome, Payload, Target};
use crate::model::Actor;
use crate::serializers::{self, LinkContext, SnippetVariant, UserVariant};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub links: LinkContext,
}

fn not_found(msg: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"detail": msg}))).into_response()
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"detail": "Internal server error."})),
    )
        .into_response()
}

fn into_response(outcome: Outcome) -> Response {
    match outcome.body {
        Payload::Json(value) => (outcome.status, Json(value)).into_response(),
        Payload::Html(markup) => (outcome.status, Html(markup)).into_response(),
        Payload::Empty => outcome.status.into_response(),
    }
}

async fn run(
    state: &AppState,
    variant: SnippetVariant,
    actor: &Actor,
    method: Method,
    target: Target,
    payload: Option<JsonValue>,
) -> Response {
    match dispatch::dispatch(&state.db, &state.links, variant, actor, method, target, payload).await
    {
        Ok(outcome) => into_response(outcome),
        Err(e) => {
            tracing::error!(error = %crate::unpack_error(e.as_ref()), "dispatch failed");
            internal_error()
        }
    }
}

pub async fn healthcheck() -> impl IntoResponse {
    tracing::info!("got healthcheck request");
    Json(json!({"status": "ok"}))
}

/// Entry point listing the top-level collections as fully qualified URLs.
pub async fn api_root(State(state): State<AppState>) -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "users": state.links.users_root(),
            "snippets": state.links.snippets_root(),
        })),
    )
        .into_response()
}

// ============================================================================
// Snippets, plain family (identifier-keyed output)
// ============================================================================

pub async fn list_snippets(State(state): State<AppState>, actor: Actor) -> Response {
    run(&state, SnippetVariant::Canonical, &actor, Method::GET, Target::Collection, None).await
}

pub async fn create_snippet(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<JsonValue>,
) -> Response {
    run(
        &state,
        SnippetVariant::Canonical,
        &actor,
        Method::POST,
        Target::Collection,
        Some(payload),
    )
    .await
}

pub async fn get_snippet(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> Response {
    run(&state, SnippetVariant::Canonical, &actor, Method::GET, Target::Item(id), None).await
}

pub async fn update_snippet(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(payload): Json<JsonValue>,
) -> Response {
    run(
        &state,
        SnippetVariant::Canonical,
        &actor,
        Method::PUT,
        Target::Item(id),
        Some(payload),
    )
    .await
}

pub async fn patch_snippet(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(payload): Json<JsonValue>,
) -> Response {
    run(
        &state,
        SnippetVariant::Canonical,
        &actor,
        Method::PATCH,
        Target::Item(id),
        Some(payload),
    )
    .await
}

pub async fn delete_snippet(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> Response {
    run(&state, SnippetVariant::Canonical, &actor, Method::DELETE, Target::Item(id), None).await
}

pub async fn highlight_snippet(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> Response {
    run(
        &state,
        SnippetVariant::Canonical,
        &actor,
        Method::GET,
        Target::ItemHighlight(id),
        None,
    )
    .await
}

// ============================================================================
// Snippets, linked family (hyperlinked output, same dispatch)
// ============================================================================

pub async fn linked_list_snippets(State(state): State<AppState>, actor: Actor) -> Response {
    run(&state, SnippetVariant::Hyperlinked, &actor, Method::GET, Target::Collection, None).await
}

pub async fn linked_create_snippet(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<JsonValue>,
) -> Response {
    run(
        &state,
        SnippetVariant::Hyperlinked,
        &actor,
        Method::POST,
        Target::Collection,
        Some(payload),
    )
    .await
}

pub async fn linked_get_snippet(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> Response {
    run(&state, SnippetVariant::Hyperlinked, &actor, Method::GET, Target::Item(id), None).await
}

pub async fn linked_update_snippet(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(payload): Json<JsonValue>,
) -> Response {
    run(
        &state,
        SnippetVariant::Hyperlinked,
        &actor,
        Method::PUT,
        Target::Item(id),
        Some(payload),
    )
    .await
}

pub async fn linked_patch_snippet(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(payload): Json<JsonValue>,
) -> Response {
    run(
        &state,
        SnippetVariant::Hyperlinked,
        &actor,
        Method::PATCH,
        Target::Item(id),
        Some(payload),
    )
    .await
}

pub async fn linked_delete_snippet(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> Response {
    run(&state, SnippetVariant::Hyperlinked, &actor, Method::DELETE, Target::Item(id), None).await
}

pub async fn linked_highlight_snippet(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> Response {
    run(
        &state,
        SnippetVariant::Hyperlinked,
        &actor,
        Method::GET,
        Target::ItemHighlight(id),
        None,
    )
    .await
}

// ============================================================================
// Users (read-only; every actor may read)
// ============================================================================

async fn render_user_by_id(state: &AppState, id: i64, variant: UserVariant) -> Response {
    let user = match state.db.get_user(id).await {
        Ok(Some(user)) => user,
        Ok(None) => return not_found("Not found."),
        Err(e) => {
            tracing::error!(error = %crate::unpack_error(e.as_ref()), "failed to get user");
            return internal_error();
        }
    };

    match state.db.snippet_ids_owned_by(user.id).await {
        Ok(ids) => (
            StatusCode::OK,
            Json(serializers::render_user(&user, &ids, variant, &state.links)),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %crate::unpack_error(e.as_ref()), "failed to list owned snippets");
            internal_error()
        }
    }
}

async fn render_user_listing(state: &AppState, variant: UserVariant) -> Response {
    let users = match state.db.list_users().await {
        Ok(users) => users,
        Err(e) => {
            tracing::error!(error = %crate::unpack_error(e.as_ref()), "failed to list users");
            return internal_error();
        }
    };

    let mut rendered = Vec::with_capacity(users.len());
    for user in &users {
        match state.db.snippet_ids_owned_by(user.id).await {
            Ok(ids) => rendered.push(serializers::render_user(user, &ids, variant, &state.links)),
            Err(e) => {
                tracing::error!(error = %crate::unpack_error(e.as_ref()), "failed to list owned snippets");
                return internal_error();
            }
        }
    }

    (StatusCode::OK, Json(JsonValue::Array(rendered))).into_response()
}

pub async fn list_users(State(state): State<AppState>) -> Response {
    render_user_listing(&state, UserVariant::WithSnippets).await
}

pub async fn get_user(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    render_user_by_id(&state, id, UserVariant::WithSnippets).await
}

pub async fn get_user_detailed(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    render_user_by_id(&state, id, UserVariant::WithOwnerField).await
}

pub async fn linked_list_users(State(state): State<AppState>) -> Response {
    render_user_listing(&state, UserVariant::Hyperlinked).await
}

pub async fn linked_get_user(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    render_user_by_id(&state, id, UserVariant::Hyperlinked).await
}

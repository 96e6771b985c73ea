//! The canonical action dispatcher.
//!
//! Every exposure style funnels into [`dispatch`]: resolve the verb and
//! target to one action, fetch the resource for item-scoped actions, ask the
//! permission evaluator, validate input, then run the store operation and
//! render the result through the variant bound to the calling route. A given
//! (actor, verb, target, payload) produces the same outcome no matter which
//! route family made the call.

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::{Value as JsonValue, json};

use crate::db::Database;
use crate::error::DispatchError;
use crate::highlight;
use crate::model::Actor;
use crate::permissions::{self, Action, Decision};
use crate::serializers::{self, LinkContext, SnippetVariant};

/// The route-bound entity a request addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Collection,
    Item(i64),
    ItemHighlight(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(JsonValue),
    Html(String),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub status: StatusCode,
    pub body: Payload,
}

impl Outcome {
    fn json(status: StatusCode, body: JsonValue) -> Self {
        Outcome {
            status,
            body: Payload::Json(body),
        }
    }
}

impl From<DispatchError> for Outcome {
    fn from(err: DispatchError) -> Self {
        Outcome::json(err.status(), err.into_body())
    }
}

/// Map verb + target shape to exactly one canonical action.
pub fn resolve_action(method: &Method, target: Target) -> Option<Action> {
    match target {
        Target::Collection if *method == Method::GET => Some(Action::List),
        Target::Collection if *method == Method::POST => Some(Action::Create),
        Target::Item(_) if *method == Method::GET => Some(Action::Retrieve),
        Target::Item(_) if *method == Method::PUT => Some(Action::Update),
        Target::Item(_) if *method == Method::PATCH => Some(Action::PartialUpdate),
        Target::Item(_) if *method == Method::DELETE => Some(Action::Delete),
        Target::ItemHighlight(_) if *method == Method::GET => Some(Action::Highlight),
        _ => None,
    }
}

pub async fn dispatch(
    db: &Database,
    links: &LinkContext,
    variant: SnippetVariant,
    actor: &Actor,
    method: Method,
    target: Target,
    payload: Option<JsonValue>,
) -> Result<Outcome> {
    let Some(action) = resolve_action(&method, target) else {
        return Ok(Outcome::json(
            StatusCode::METHOD_NOT_ALLOWED,
            json!({"detail": format!("Method \"{method}\" not allowed.")}),
        ));
    };

    tracing::debug!(action = action.as_str(), "resolved action");

    // Item-scoped actions fetch the resource first; an unknown identifier
    // short-circuits before any permission check.
    let resource = match target {
        Target::Item(id) | Target::ItemHighlight(id) => match db.get_snippet(id).await? {
            Some(snippet) => Some(snippet),
            None => return Ok(DispatchError::NotFound.into()),
        },
        Target::Collection => None,
    };

    if let Decision::Deny(reason) = permissions::evaluate(actor, action, resource.as_ref()) {
        return Ok(Outcome::from(DispatchError::from(reason)));
    }

    let payload = payload.unwrap_or(JsonValue::Null);

    match (action, resource) {
        (Action::List, _) => {
            let snippets = db.list_snippets().await?;
            Ok(Outcome::json(
                StatusCode::OK,
                serializers::render_snippet_list(&snippets, variant, links),
            ))
        }
        (Action::Create, _) => {
            let Some(owner) = actor.user() else {
                return Ok(DispatchError::Unauthenticated.into());
            };
            let input = match serializers::parse_snippet_input(&payload, false) {
                Ok(input) => input,
                Err(errors) => return Ok(DispatchError::Validation(errors).into()),
            };
            let snippet = db.create_snippet(&input.resolve(None, false), owner.id).await?;
            Ok(Outcome::json(
                StatusCode::CREATED,
                serializers::render_snippet(&snippet, variant, links),
            ))
        }
        (Action::Retrieve, Some(snippet)) => Ok(Outcome::json(
            StatusCode::OK,
            serializers::render_snippet(&snippet, variant, links),
        )),
        (Action::Update, Some(snippet)) | (Action::PartialUpdate, Some(snippet)) => {
            let partial = action == Action::PartialUpdate;
            let input = match serializers::parse_snippet_input(&payload, partial) {
                Ok(input) => input,
                Err(errors) => return Ok(DispatchError::Validation(errors).into()),
            };
            let fields = input.resolve(Some(&snippet), partial);
            match db.update_snippet(snippet.id, &fields).await? {
                Some(updated) => Ok(Outcome::json(
                    StatusCode::OK,
                    serializers::render_snippet(&updated, variant, links),
                )),
                None => Ok(DispatchError::NotFound.into()),
            }
        }
        (Action::Delete, Some(snippet)) => {
            if db.delete_snippet(snippet.id).await? {
                Ok(Outcome {
                    status: StatusCode::NO_CONTENT,
                    body: Payload::Empty,
                })
            } else {
                Ok(DispatchError::NotFound.into())
            }
        }
        (Action::Highlight, Some(snippet)) => {
            let markup = highlight::project(
                &snippet.title,
                &snippet.code,
                snippet.language,
                snippet.style,
                snippet.linenos,
            );
            Ok(Outcome {
                status: StatusCode::OK,
                body: Payload::Html(markup),
            })
        }
        // Item actions always carry the fetched resource; this arm is not
        // reachable through resolve_action.
        _ => Ok(DispatchError::NotFound.into()),
    }
}

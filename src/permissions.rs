//! Ownership-based permission checks.
//!
//! `evaluate` is a pure predicate over (actor, action, resource). It holds no
//! request state and is re-run on every dispatch against the freshly fetched
//! resource, so a decision never outlives the owner column it was based on.

use crate::error::DispatchError;
use crate::model::{Actor, Snippet};

/// The canonical unit of authorized work. Every exposure style resolves its
/// verb and route shape to exactly one of these before anything else runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Create,
    Retrieve,
    Update,
    PartialUpdate,
    Delete,
    Highlight,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Create => "create",
            Action::Retrieve => "retrieve",
            Action::Update => "update",
            Action::PartialUpdate => "partial_update",
            Action::Delete => "delete",
            Action::Highlight => "highlight",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    Forbidden,
}

impl From<DenyReason> for DispatchError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::Unauthenticated => DispatchError::Unauthenticated,
            DenyReason::Forbidden => DispatchError::Forbidden,
        }
    }
}

/// Rules, in order: reads are open to everyone; create requires any
/// authenticated identity; update, partial_update and delete additionally
/// require that identity to match the resource's owner.
///
/// Item-scoped actions are only evaluated after the dispatcher has fetched
/// the resource; a missing resource here denies rather than panics.
pub fn evaluate(actor: &Actor, action: Action, resource: Option<&Snippet>) -> Decision {
    match action {
        Action::List | Action::Retrieve | Action::Highlight => Decision::Allow,
        Action::Create => {
            if actor.is_authenticated() {
                Decision::Allow
            } else {
                Decision::Deny(DenyReason::Unauthenticated)
            }
        }
        Action::Update | Action::PartialUpdate | Action::Delete => {
            let user = match actor.user() {
                Some(user) => user,
                None => return Decision::Deny(DenyReason::Unauthenticated),
            };
            match resource {
                Some(snippet) if snippet.owner_id == user.id => Decision::Allow,
                _ => Decision::Deny(DenyReason::Forbidden),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Language, Style, User};

    fn snippet_owned_by(owner_id: i64) -> Snippet {
        Snippet {
            id: 1,
            title: String::new(),
            code: "print(1)".to_string(),
            linenos: false,
            language: Language::default(),
            style: Style::default(),
            owner_id,
            owner_username: "alice".to_string(),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            updated_at: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }

    fn user(id: i64) -> Actor {
        Actor::User(User {
            id,
            username: format!("user{id}"),
        })
    }

    #[test]
    fn reads_are_open_to_everyone() {
        let snippet = snippet_owned_by(1);
        for action in [Action::List, Action::Retrieve, Action::Highlight] {
            assert_eq!(evaluate(&Actor::Anonymous, action, None), Decision::Allow);
            assert_eq!(evaluate(&user(2), action, Some(&snippet)), Decision::Allow);
        }
    }

    #[test]
    fn create_requires_an_authenticated_actor() {
        assert_eq!(evaluate(&user(1), Action::Create, None), Decision::Allow);
        assert_eq!(
            evaluate(&Actor::Anonymous, Action::Create, None),
            Decision::Deny(DenyReason::Unauthenticated)
        );
    }

    #[test]
    fn writes_are_owner_only() {
        let snippet = snippet_owned_by(1);
        for action in [Action::Update, Action::PartialUpdate, Action::Delete] {
            assert_eq!(evaluate(&user(1), action, Some(&snippet)), Decision::Allow);
            assert_eq!(
                evaluate(&user(2), action, Some(&snippet)),
                Decision::Deny(DenyReason::Forbidden)
            );
            assert_eq!(
                evaluate(&Actor::Anonymous, action, Some(&snippet)),
                Decision::Deny(DenyReason::Unauthenticated)
            );
        }
    }

    #[test]
    fn write_without_a_fetched_resource_is_denied() {
        assert_eq!(
            evaluate(&user(1), Action::Delete, None),
            Decision::Deny(DenyReason::Forbidden)
        );
    }
}

//! Rendering and input parsing for snippets and users.
//!
//! One entity, several output shapes: a variant tag picks the field set, a
//! single render function emits it. The inverse direction parses a client
//! payload into a writable field set, collecting every field violation
//! instead of failing on the first. The owner field only ever flows out;
//! client-supplied owner values are ignored and the acting identity is bound
//! server-side at create.

use serde_json::{Value as JsonValue, json};

use crate::error::FieldErrors;
use crate::model::{Language, Snippet, SnippetFields, Style, User};

pub const MAX_TITLE_LENGTH: usize = 100;

/// Output shape for a snippet. Canonical addresses related entities by
/// identifier; Hyperlinked by fully qualified reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnippetVariant {
    Canonical,
    Hyperlinked,
}

/// Output shape for a user projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserVariant {
    /// id, username, owned snippet ids.
    WithSnippets,
    /// WithSnippets plus a reverse `owner` field, for structural parity with
    /// consumers of the snippet payloads.
    WithOwnerField,
    /// Self-describing references instead of bare identifiers.
    Hyperlinked,
}

/// Builds fully qualified references for the hyperlinked variants and the
/// API root. Hyperlinked references point at the route family that renders
/// hyperlinked output.
#[derive(Debug, Clone)]
pub struct LinkContext {
    base: String,
}

impl LinkContext {
    pub fn new(base: &str) -> Self {
        LinkContext {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn snippets_root(&self) -> String {
        format!("{}/snippets", self.base)
    }

    pub fn users_root(&self) -> String {
        format!("{}/users", self.base)
    }

    pub fn snippet_detail(&self, id: i64) -> String {
        format!("{}/linked/snippets/{}", self.base, id)
    }

    pub fn snippet_highlight(&self, id: i64) -> String {
        format!("{}/linked/snippets/{}/highlight", self.base, id)
    }

    pub fn user_detail(&self, id: i64) -> String {
        format!("{}/linked/users/{}", self.base, id)
    }
}

pub fn render_snippet(snippet: &Snippet, variant: SnippetVariant, links: &LinkContext) -> JsonValue {
    match variant {
        SnippetVariant::Canonical => json!({
            "id": snippet.id,
            "title": snippet.title,
            "code": snippet.code,
            "linenos": snippet.linenos,
            "language": snippet.language.as_str(),
            "style": snippet.style.as_str(),
            "owner": snippet.owner_username,
        }),
        SnippetVariant::Hyperlinked => json!({
            "url": links.snippet_detail(snippet.id),
            "id": snippet.id,
            "highlight": links.snippet_highlight(snippet.id),
            "owner": snippet.owner_username,
            "title": snippet.title,
            "code": snippet.code,
            "linenos": snippet.linenos,
            "language": snippet.language.as_str(),
            "style": snippet.style.as_str(),
        }),
    }
}

pub fn render_snippet_list(
    snippets: &[Snippet],
    variant: SnippetVariant,
    links: &LinkContext,
) -> JsonValue {
    JsonValue::Array(
        snippets
            .iter()
            .map(|s| render_snippet(s, variant, links))
            .collect(),
    )
}

pub fn render_user(
    user: &User,
    snippet_ids: &[i64],
    variant: UserVariant,
    links: &LinkContext,
) -> JsonValue {
    match variant {
        UserVariant::WithSnippets => json!({
            "id": user.id,
            "username": user.username,
            "snippets": snippet_ids,
        }),
        UserVariant::WithOwnerField => json!({
            "id": user.id,
            "username": user.username,
            "snippets": snippet_ids,
            "owner": user.username,
        }),
        UserVariant::Hyperlinked => json!({
            "url": links.user_detail(user.id),
            "id": user.id,
            "username": user.username,
            "snippets": snippet_ids
                .iter()
                .map(|id| links.snippet_detail(*id))
                .collect::<Vec<_>>(),
        }),
    }
}

/// The validated subset of client fields. `None` means the field was absent
/// from the payload; resolution against an existing instance and the column
/// defaults happens in [`SnippetInput::resolve`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SnippetInput {
    pub title: Option<String>,
    pub code: Option<String>,
    pub linenos: Option<bool>,
    pub language: Option<Language>,
    pub style: Option<Style>,
}

impl SnippetInput {
    /// Merge parsed fields with the existing instance and defaults into the
    /// full writable set.
    ///
    /// On a full update, absent language/style reset to their defaults while
    /// absent title/linenos keep the instance value; only fields carrying a
    /// declared default are re-defaulted. A partial update keeps every
    /// absent field.
    pub fn resolve(self, existing: Option<&Snippet>, partial: bool) -> SnippetFields {
        SnippetFields {
            title: self
                .title
                .or_else(|| existing.map(|s| s.title.clone()))
                .unwrap_or_default(),
            code: self
                .code
                .or_else(|| existing.map(|s| s.code.clone()))
                .unwrap_or_default(),
            linenos: self
                .linenos
                .or_else(|| existing.map(|s| s.linenos))
                .unwrap_or(false),
            language: self.language.unwrap_or_else(|| {
                match (partial, existing) {
                    (true, Some(s)) => s.language,
                    _ => Language::default(),
                }
            }),
            style: self.style.unwrap_or_else(|| {
                match (partial, existing) {
                    (true, Some(s)) => s.style,
                    _ => Style::default(),
                }
            }),
        }
    }
}

fn is_absent(body: &JsonValue, field: &str) -> bool {
    matches!(body.get(field), None | Some(JsonValue::Null))
}

/// Parse a client payload into a [`SnippetInput`].
///
/// Checks run per field in order: shape, then enum membership. All failing
/// fields are reported together. `partial` relaxes the `code` requirement
/// for partial updates. An `owner` key in the payload is ignored.
pub fn parse_snippet_input(body: &JsonValue, partial: bool) -> Result<SnippetInput, FieldErrors> {
    let mut errors = FieldErrors::new();

    if !body.is_object() {
        errors.push("non_field_errors", "Invalid data. Expected an object.");
        return Err(errors);
    }

    let mut input = SnippetInput::default();

    if !is_absent(body, "title") {
        match body.get("title").and_then(JsonValue::as_str) {
            Some(title) => {
                if title.chars().count() > MAX_TITLE_LENGTH {
                    errors.push(
                        "title",
                        format!("Ensure this field has no more than {MAX_TITLE_LENGTH} characters."),
                    );
                } else {
                    input.title = Some(title.to_string());
                }
            }
            None => errors.push("title", "Not a valid string."),
        }
    }

    if is_absent(body, "code") {
        if !partial {
            errors.push("code", "This field is required.");
        }
    } else {
        match body.get("code").and_then(JsonValue::as_str) {
            Some(code) if code.trim().is_empty() => {
                errors.push("code", "This field may not be blank.");
            }
            Some(code) => input.code = Some(code.to_string()),
            None => errors.push("code", "Not a valid string."),
        }
    }

    if !is_absent(body, "linenos") {
        match body.get("linenos").and_then(JsonValue::as_bool) {
            Some(linenos) => input.linenos = Some(linenos),
            None => errors.push("linenos", "Must be a valid boolean."),
        }
    }

    if !is_absent(body, "language") {
        match body.get("language").and_then(JsonValue::as_str).and_then(Language::from_str) {
            Some(language) => input.language = Some(language),
            None => errors.push(
                "language",
                format!("{} is not a valid choice.", body["language"]),
            ),
        }
    }

    if !is_absent(body, "style") {
        match body.get("style").and_then(JsonValue::as_str).and_then(Style::from_str) {
            Some(style) => input.style = Some(style),
            None => errors.push("style", format!("{} is not a valid choice.", body["style"])),
        }
    }

    if errors.is_empty() { Ok(input) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links() -> LinkContext {
        LinkContext::new("http://testserver")
    }

    fn sample_snippet() -> Snippet {
        Snippet {
            id: 7,
            title: "greeting".to_string(),
            code: "print(\"hi\")".to_string(),
            linenos: true,
            language: Language::Python,
            style: Style::Monokai,
            owner_id: 3,
            owner_username: "alice".to_string(),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            updated_at: "2026-01-02T00:00:00.000Z".to_string(),
        }
    }

    fn field_names(value: &JsonValue) -> Vec<&str> {
        let mut names: Vec<&str> = value
            .as_object()
            .expect("rendered value should be an object")
            .keys()
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }

    #[test]
    fn canonical_variant_has_the_exact_field_set() {
        let rendered = render_snippet(&sample_snippet(), SnippetVariant::Canonical, &links());
        assert_eq!(
            field_names(&rendered),
            vec!["code", "id", "language", "linenos", "owner", "style", "title"]
        );
        assert_eq!(rendered["owner"], "alice");
        assert_eq!(rendered["language"], "python");
    }

    #[test]
    fn hyperlinked_variant_adds_self_and_highlight_references() {
        let rendered = render_snippet(&sample_snippet(), SnippetVariant::Hyperlinked, &links());
        assert_eq!(
            field_names(&rendered),
            vec![
                "code", "highlight", "id", "language", "linenos", "owner", "style", "title", "url"
            ]
        );
        assert_eq!(rendered["url"], "http://testserver/linked/snippets/7");
        assert_eq!(
            rendered["highlight"],
            "http://testserver/linked/snippets/7/highlight"
        );
    }

    #[test]
    fn user_variants_differ_only_in_the_reverse_owner_field() {
        let user = User {
            id: 3,
            username: "alice".to_string(),
        };
        let plain = render_user(&user, &[1, 7], UserVariant::WithSnippets, &links());
        assert_eq!(field_names(&plain), vec!["id", "snippets", "username"]);
        assert_eq!(plain["snippets"], json!([1, 7]));

        let detailed = render_user(&user, &[1, 7], UserVariant::WithOwnerField, &links());
        assert_eq!(
            field_names(&detailed),
            vec!["id", "owner", "snippets", "username"]
        );
        assert_eq!(detailed["owner"], "alice");
    }

    #[test]
    fn hyperlinked_user_links_owned_snippets() {
        let user = User {
            id: 3,
            username: "alice".to_string(),
        };
        let rendered = render_user(&user, &[7], UserVariant::Hyperlinked, &links());
        assert_eq!(rendered["url"], "http://testserver/linked/users/3");
        assert_eq!(
            rendered["snippets"],
            json!(["http://testserver/linked/snippets/7"])
        );
    }

    #[test]
    fn minimal_payload_gets_the_declared_defaults() {
        let input = parse_snippet_input(&json!({"code": "print(1)"}), false).expect("valid");
        let fields = input.resolve(None, false);
        assert_eq!(fields.code, "print(1)");
        assert_eq!(fields.title, "");
        assert!(!fields.linenos);
        assert_eq!(fields.language, Language::Python);
        assert_eq!(fields.style, Style::Friendly);
    }

    #[test]
    fn all_violations_are_reported_together() {
        let errors = parse_snippet_input(
            &json!({"code": "", "language": "cobol", "style": "neon", "linenos": "yes"}),
            false,
        )
        .expect_err("invalid");
        assert!(errors.contains("code"));
        assert!(errors.contains("language"));
        assert!(errors.contains("style"));
        assert!(errors.contains("linenos"));
    }

    #[test]
    fn enum_rejection_names_the_offered_value() {
        let errors =
            parse_snippet_input(&json!({"code": "x", "language": "cobol"}), false).expect_err("invalid");
        let body = errors.into_body();
        assert_eq!(body["language"], json!(["\"cobol\" is not a valid choice."]));
    }

    #[test]
    fn owner_and_unknown_fields_are_ignored() {
        let input = parse_snippet_input(
            &json!({"code": "x", "owner": "mallory", "nonsense": 1}),
            false,
        )
        .expect("valid");
        assert_eq!(input.code.as_deref(), Some("x"));
    }

    #[test]
    fn title_length_boundary() {
        let ok = "a".repeat(MAX_TITLE_LENGTH);
        assert!(parse_snippet_input(&json!({"code": "x", "title": ok}), false).is_ok());

        let too_long = "a".repeat(MAX_TITLE_LENGTH + 1);
        let errors =
            parse_snippet_input(&json!({"code": "x", "title": too_long}), false).expect_err("invalid");
        assert!(errors.contains("title"));
    }

    #[test]
    fn blank_title_is_allowed() {
        let input = parse_snippet_input(&json!({"code": "x", "title": ""}), false).expect("valid");
        assert_eq!(input.title.as_deref(), Some(""));
    }

    #[test]
    fn code_is_optional_only_on_partial_updates() {
        assert!(parse_snippet_input(&json!({}), true).is_ok());
        let errors = parse_snippet_input(&json!({}), false).expect_err("invalid");
        assert!(errors.contains("code"));
    }

    #[test]
    fn non_object_payload_is_a_single_violation() {
        let errors = parse_snippet_input(&json!([1, 2]), false).expect_err("invalid");
        assert!(errors.contains("non_field_errors"));
    }

    #[test]
    fn full_update_resets_defaulted_fields_and_keeps_the_rest() {
        let existing = sample_snippet();
        let input = parse_snippet_input(&json!({"code": "new"}), false).expect("valid");
        let fields = input.resolve(Some(&existing), false);
        assert_eq!(fields.code, "new");
        // Fields without a declared default fall back to the instance.
        assert_eq!(fields.title, "greeting");
        assert!(fields.linenos);
        // Fields with a declared default are re-defaulted on full update.
        assert_eq!(fields.style, Style::Friendly);
    }

    #[test]
    fn partial_update_keeps_every_absent_field() {
        let existing = sample_snippet();
        let input = parse_snippet_input(&json!({"title": "renamed"}), true).expect("valid");
        let fields = input.resolve(Some(&existing), true);
        assert_eq!(fields.title, "renamed");
        assert_eq!(fields.code, existing.code);
        assert_eq!(fields.style, Style::Monokai);
        assert!(fields.linenos);
    }
}

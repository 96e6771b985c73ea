use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Rust,
    Javascript,
    Go,
    C,
    Cpp,
    Ruby,
    Sql,
    Bash,
    Plain,
}

impl Language {
    pub const ALL: &'static [Language] = &[
        Language::Python,
        Language::Rust,
        Language::Javascript,
        Language::Go,
        Language::C,
        Language::Cpp,
        Language::Ruby,
        Language::Sql,
        Language::Bash,
        Language::Plain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Rust => "rust",
            Language::Javascript => "javascript",
            Language::Go => "go",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Ruby => "ruby",
            Language::Sql => "sql",
            Language::Bash => "bash",
            Language::Plain => "plain",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .find(|l| l.as_str() == s.to_lowercase())
            .copied()
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::Python
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Friendly,
    Monokai,
    Colorful,
    Emacs,
    Vim,
    Tango,
}

impl Style {
    pub const ALL: &'static [Style] = &[
        Style::Friendly,
        Style::Monokai,
        Style::Colorful,
        Style::Emacs,
        Style::Vim,
        Style::Tango,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Friendly => "friendly",
            Style::Monokai => "monokai",
            Style::Colorful => "colorful",
            Style::Emacs => "emacs",
            Style::Vim => "vim",
            Style::Tango => "tango",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .find(|st| st.as_str() == s.to_lowercase())
            .copied()
    }
}

impl Default for Style {
    fn default() -> Self {
        Style::Friendly
    }
}

/// A stored snippet, with the owning username joined in at read time.
#[derive(Debug, Clone, PartialEq)]
pub struct Snippet {
    pub id: i64,
    pub title: String,
    pub code: String,
    pub linenos: bool,
    pub language: Language,
    pub style: Style,
    pub owner_id: i64,
    pub owner_username: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
}

/// The identity behind a request. Ownership checks compare against the
/// authenticated user's id; anonymous requests can only read.
#[derive(Debug, Clone, PartialEq)]
pub enum Actor {
    Anonymous,
    User(User),
}

impl Actor {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Actor::User(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Actor::User(u) => Some(u),
            Actor::Anonymous => None,
        }
    }
}

/// The fully resolved writable field set handed to the store. Input parsing
/// merges client fields with instance values and defaults before any write.
#[derive(Debug, Clone, PartialEq)]
pub struct SnippetFields {
    pub title: String,
    pub code: String,
    pub linenos: bool,
    pub language: Language,
    pub style: Style,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_round_trips_through_strings() {
        for language in Language::ALL {
            assert_eq!(Language::from_str(language.as_str()), Some(*language));
        }
        assert_eq!(Language::from_str("PYTHON"), Some(Language::Python));
        assert_eq!(Language::from_str("cobol"), None);
    }

    #[test]
    fn style_round_trips_through_strings() {
        for style in Style::ALL {
            assert_eq!(Style::from_str(style.as_str()), Some(*style));
        }
        assert_eq!(Style::from_str("neon"), None);
    }

    #[test]
    fn defaults_match_the_stored_column_defaults() {
        assert_eq!(Language::default().as_str(), "python");
        assert_eq!(Style::default().as_str(), "friendly");
    }
}

//! Derived HTML rendering of a snippet's code.
//!
//! `project` is a pure function of its inputs and is rendered fresh on every
//! request; nothing here is persisted or accepted back as input. The output
//! is a full standalone document so the markup can be served as-is.

use crate::model::{Language, Style};

const STYLESHEET: &str = "\
body { margin: 1.5em; font-family: sans-serif; }\n\
.highlight pre { padding: 1em; overflow-x: auto; font-family: monospace; }\n\
.highlight .k { font-weight: bold; }\n\
.highlight .lineno { color: #888; user-select: none; }\n\
.highlight.friendly pre { background: #f0f0f0; }\n\
.highlight.monokai pre { background: #272822; color: #f8f8f2; }\n\
.highlight.colorful pre { background: #fffef5; }\n\
.highlight.emacs pre { background: #f8f8f8; }\n\
.highlight.vim pre { background: #000000; color: #cccccc; }\n\
.highlight.tango pre { background: #f8f8f8; }\n";

fn keywords(language: Language) -> &'static [&'static str] {
    match language {
        Language::Python => &[
            "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
            "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
            "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "print",
            "raise", "return", "try", "while", "with", "yield",
        ],
        Language::Rust => &[
            "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
            "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod",
            "move", "mut", "pub", "ref", "return", "self", "static", "struct", "super", "trait",
            "true", "type", "unsafe", "use", "where", "while",
        ],
        Language::Javascript => &[
            "async", "await", "break", "case", "catch", "class", "const", "continue", "default",
            "delete", "do", "else", "export", "extends", "false", "finally", "for", "function",
            "if", "import", "in", "instanceof", "let", "new", "null", "return", "super", "switch",
            "this", "throw", "true", "try", "typeof", "undefined", "var", "void", "while", "yield",
        ],
        Language::Go => &[
            "break", "case", "chan", "const", "continue", "default", "defer", "else",
            "fallthrough", "for", "func", "go", "goto", "if", "import", "interface", "map",
            "package", "range", "return", "select", "struct", "switch", "type", "var",
        ],
        Language::C | Language::Cpp => &[
            "auto", "break", "case", "char", "class", "const", "continue", "default", "do",
            "double", "else", "enum", "extern", "float", "for", "goto", "if", "int", "long",
            "namespace", "new", "return", "short", "signed", "sizeof", "static", "struct",
            "switch", "template", "typedef", "union", "unsigned", "void", "volatile", "while",
        ],
        Language::Ruby => &[
            "alias", "begin", "break", "case", "class", "def", "do", "else", "elsif", "end",
            "ensure", "false", "for", "if", "in", "module", "next", "nil", "not", "puts",
            "redo", "require", "rescue", "retry", "return", "self", "super", "then", "true",
            "unless", "until", "when", "while", "yield",
        ],
        Language::Sql => &[
            "AND", "AS", "BY", "CREATE", "DELETE", "DROP", "FROM", "GROUP", "HAVING", "INSERT",
            "INTO", "JOIN", "LEFT", "LIMIT", "NOT", "NULL", "ON", "OR", "ORDER", "SELECT", "SET",
            "TABLE", "UPDATE", "VALUES", "WHERE",
        ],
        Language::Bash => &[
            "case", "do", "done", "echo", "elif", "else", "esac", "exit", "export", "fi", "for",
            "function", "if", "in", "local", "return", "then", "until", "while",
        ],
        Language::Plain => &[],
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn render_line(line: &str, keywords: &[&str]) -> String {
    let mut out = String::with_capacity(line.len());
    let mut word = String::new();

    let mut flush = |out: &mut String, word: &mut String| {
        if word.is_empty() {
            return;
        }
        if keywords.contains(&word.as_str()) {
            out.push_str("<span class=\"k\">");
            out.push_str(word);
            out.push_str("</span>");
        } else {
            out.push_str(word);
        }
        word.clear();
    };

    for ch in line.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            word.push(ch);
        } else {
            flush(&mut out, &mut word);
            out.push_str(&escape(&ch.to_string()));
        }
    }
    flush(&mut out, &mut word);
    out
}

fn render_code(code: &str, language: Language, linenos: bool) -> String {
    let keywords = keywords(language);
    let mut out = String::new();
    for (index, line) in code.lines().enumerate() {
        if linenos {
            out.push_str(&format!("<span class=\"lineno\">{:>4}</span> ", index + 1));
        }
        out.push_str(&render_line(line, keywords));
        out.push('\n');
    }
    out
}

/// Render the highlight projection: a full HTML document around the marked-up
/// code, titled and styled from the snippet's current fields.
pub fn project(title: &str, code: &str, language: Language, style: Style, linenos: bool) -> String {
    let body = render_code(code, language, linenos);
    let heading = if title.is_empty() {
        String::new()
    } else {
        format!("<h2>{}</h2>\n", escape(title))
    };
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<title>{title}</title>\n<style>\n{STYLESHEET}</style>\n\
         </head>\n<body>\n{heading}<div class=\"highlight {style}\"><pre>{body}</pre></div>\n\
         </body>\n</html>\n",
        title = escape(title),
        style = style.as_str(),
        heading = heading,
        body = body,
    )
}

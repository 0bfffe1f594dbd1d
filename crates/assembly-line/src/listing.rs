//! Titles for listing saved interview sessions

use serde::{Deserialize, Serialize};

const ZWSP: char = '\u{200B}';

/// Metadata saved alongside an interview session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub auto_title: Option<String>,
}

/// An interview the server knows by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewInfo {
    pub filename: String,
    pub title: String,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Human readable interview name: the registered title, else the filename
/// without package, path and extension
pub fn nice_interview_title(metadata: &SessionMetadata, known: &[InterviewInfo]) -> String {
    let filename = match non_empty(&metadata.filename) {
        Some(filename) => filename,
        None => return "Untitled interview".to_string(),
    };
    if let Some(info) = known
        .iter()
        .find(|i| i.filename == filename && !i.title.is_empty())
    {
        return info.title.clone();
    }

    let base = filename.rsplit('/').next().unwrap_or(filename);
    let stem = match base.rfind('.') {
        Some(dot) if dot > 0 => &base[..dot],
        _ => base,
    };
    let stem = match stem.split_once(':') {
        Some((_, rest)) => rest.split(':').next().unwrap_or(rest),
        None => stem,
    };
    capitalize(&stem.replace('_', " "))
}

/// The saved title, else the automatic title when it differs from the
/// interview title
pub fn nice_interview_subtitle(
    metadata: &SessionMetadata,
    known: &[InterviewInfo],
    exclude_identical: bool,
) -> String {
    if let Some(title) = non_empty(&metadata.title) {
        return pascal_to_zwspace(title);
    }
    match non_empty(&metadata.auto_title) {
        Some(auto)
            if !exclude_identical
                || auto.to_lowercase()
                    != nice_interview_title(metadata, known).to_lowercase() =>
        {
            pascal_to_zwspace(auto)
        }
        _ => String::new(),
    }
}

/// Insert a zero-width space at PascalCase word boundaries so long names can
/// wrap on narrow screens
pub fn pascal_to_zwspace(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 8);
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| !n.is_ascii_uppercase());
            let after_lower = !prev.is_ascii_uppercase() && prev != ' ' && prev != ZWSP;
            if next_is_lower || after_lower {
                out.push(ZWSP);
            }
        }
        out.push(c);
    }
    out
}

/// First character upper case, the rest lower case
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

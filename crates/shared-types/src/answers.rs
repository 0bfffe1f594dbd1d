//! Read-only access to interview answers
//!
//! Field names may be dotted paths with list indices, e.g.
//! `users[0].address.city`. A `null` answer counts as undefined.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Resolve a field name to its current value without forcing collection.
pub trait AnswerStore {
    /// Current value of `name`, or `None` when it has not been answered
    fn lookup(&self, name: &str) -> Option<&Value>;

    fn is_defined(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}

/// In-memory answer store backed by a JSON object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answers {
    root: Map<String, Value>,
}

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON document; anything other than an object yields an empty store
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(value))
    }

    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(root) => Self { root },
            _ => Self::default(),
        }
    }

    /// Set a top-level answer
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.root.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.root.remove(name)
    }

    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

impl AnswerStore for Answers {
    fn lookup(&self, name: &str) -> Option<&Value> {
        resolve_path(&self.root, name)
    }
}

impl AnswerStore for HashMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name).filter(|v| !v.is_null())
    }
}

#[derive(Debug, PartialEq)]
enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

fn parse_path(path: &str) -> Option<Vec<Segment<'_>>> {
    let mut segments = Vec::new();
    for part in path.split('.') {
        let (key, mut rest) = match part.find('[') {
            Some(pos) => (&part[..pos], &part[pos..]),
            None => (part, ""),
        };
        if !key.is_empty() {
            segments.push(Segment::Key(key));
        }
        while let Some(stripped) = rest.strip_prefix('[') {
            let close = stripped.find(']')?;
            let index = stripped[..close].trim().parse().ok()?;
            segments.push(Segment::Index(index));
            rest = &stripped[close + 1..];
        }
        if !rest.is_empty() {
            return None;
        }
    }
    Some(segments)
}

fn resolve_path<'a>(root: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    // Exact keys win over path parsing, so keys containing dots still work
    if let Some(value) = root.get(path) {
        return (!value.is_null()).then_some(value);
    }

    let segments = parse_path(path)?;
    let mut iter = segments.into_iter();
    let mut current = match iter.next()? {
        Segment::Key(key) => root.get(key)?,
        Segment::Index(_) => return None,
    };
    for segment in iter {
        current = match (segment, current) {
            (Segment::Key(key), Value::Object(map)) => map.get(key)?,
            (Segment::Index(i), Value::Array(items)) => items.get(i)?,
            _ => return None,
        };
    }
    (!current.is_null()).then_some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Answers {
        Answers::from_value(json!({
            "users": [
                {"name": {"first": "Ada"}, "address": {"city": "Boston"}},
                {"name": {"first": "Grace"}}
            ],
            "case.number": "22-CV-1",
            "unanswered": null,
            "narrative": "It began in May."
        }))
    }

    #[test]
    fn test_lookup_top_level() {
        let answers = sample();
        assert_eq!(
            answers.lookup("narrative"),
            Some(&json!("It began in May."))
        );
    }

    #[test]
    fn test_lookup_nested_path() {
        let answers = sample();
        assert_eq!(
            answers.lookup("users[0].address.city"),
            Some(&json!("Boston"))
        );
        assert_eq!(answers.lookup("users[1].name.first"), Some(&json!("Grace")));
    }

    #[test]
    fn test_missing_paths_are_undefined() {
        let answers = sample();
        assert!(!answers.is_defined("users[1].address.city"));
        assert!(!answers.is_defined("users[5]"));
        assert!(!answers.is_defined("nothing"));
        assert!(!answers.is_defined("users[x]"));
    }

    #[test]
    fn test_null_is_undefined() {
        let answers = sample();
        assert!(!answers.is_defined("unanswered"));
    }

    #[test]
    fn test_dotted_key_matches_exactly() {
        let answers = sample();
        assert_eq!(answers.lookup("case.number"), Some(&json!("22-CV-1")));
    }

    #[test]
    fn test_parse_path_segments() {
        assert_eq!(
            parse_path("a[1][2].b").unwrap(),
            vec![
                Segment::Key("a"),
                Segment::Index(1),
                Segment::Index(2),
                Segment::Key("b")
            ]
        );
        assert!(parse_path("a[1").is_none());
    }
}

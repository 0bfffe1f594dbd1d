//! Small text helpers for templates

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;

lazy_static! {
    static ref EMAIL_LIKE: Regex = Regex::new(r"^\S+@\S+").unwrap();
}

/// Join items as "A, B, and C"
pub fn comma_and_list<S: AsRef<str>>(items: &[S]) -> String {
    join_with(items, ", ", "and")
}

/// Join items as "A, B, or C"
pub fn comma_or_list<S: AsRef<str>>(items: &[S]) -> String {
    join_with(items, ", ", "or")
}

/// Join items as "A, B, C"
pub fn comma_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Join with a custom separator and conjunction; the serial comma is kept
pub fn join_with<S: AsRef<str>>(items: &[S], separator: &str, conjunction: &str) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [first, second] => format!("{} {} {}", first.as_ref(), conjunction, second.as_ref()),
        [init @ .., last] => {
            let head = init
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join(separator);
            format!(
                "{}{} {} {}",
                head,
                separator.trim_end(),
                conjunction,
                last.as_ref()
            )
        }
    }
}

/// Unique letters from all the strings, sorted
pub fn filter_letters<S: AsRef<str>>(letter_strings: &[S]) -> String {
    letter_strings
        .iter()
        .flat_map(|s| s.as_ref().chars())
        .collect::<BTreeSet<char>>()
        .into_iter()
        .collect()
}

/// Minimal email check: something, an `@`, something
pub fn is_email_like(text: &str) -> bool {
    EMAIL_LIKE.is_match(text)
}

/// Custom pronouns entered as "objective/subjective/possessive"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pronouns {
    pub objective: String,
    pub subjective: String,
    pub possessive: String,
}

impl fmt::Display for Pronouns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.subjective, self.objective, self.possessive)
    }
}

/// Parse "them/they/their" style input. Two or three slashes are accepted;
/// a fourth part (possessive pronoun) is ignored.
pub fn parse_custom_pronouns(text: &str) -> Option<Pronouns> {
    let slashes = text.matches('/').count();
    if !(2..=3).contains(&slashes) {
        return None;
    }
    let mut parts = text.split('/').map(|p| p.trim().to_lowercase());
    Some(Pronouns {
        objective: parts.next()?,
        subjective: parts.next()?,
        possessive: parts.next()?,
    })
}

pub fn has_parsable_pronouns(text: &str) -> bool {
    parse_custom_pronouns(text).is_some()
}

//! Field overflow: splitting answers into what fits on the form and what
//! goes to the addendum
//!
//! A field has a character budget (or an item budget for lists). The "safe"
//! value is what the form shows; the "overflow" value is the remainder that
//! an addendum prints.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::AnswerStore;

lazy_static! {
    static ref LINE_BREAKS: Regex = Regex::new(r"[\r\n]+").unwrap();
}

/// How many characters (or list items) fit before a field overflows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverflowTrigger {
    /// `true` sends every defined value to the addendum, `false` never does
    Always(bool),
    Limit(usize),
}

impl Default for OverflowTrigger {
    fn default() -> Self {
        OverflowTrigger::Limit(0)
    }
}

impl From<usize> for OverflowTrigger {
    fn from(limit: usize) -> Self {
        OverflowTrigger::Limit(limit)
    }
}

impl From<bool> for OverflowTrigger {
    fn from(always: bool) -> Self {
        OverflowTrigger::Always(always)
    }
}

/// Knobs for computing safe/overflow text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverflowOptions {
    /// Appended to the safe value when it was truncated
    pub message: String,
    /// Characters per line of the target text box
    pub input_width: usize,
    /// Keep paragraph breaks when the box has room for several lines
    pub preserve_newlines: bool,
    /// Cut at a word boundary instead of mid-word (off by default)
    pub preserve_words: bool,
}

impl Default for OverflowOptions {
    fn default() -> Self {
        Self {
            message: String::new(),
            input_width: 80,
            preserve_newlines: false,
            preserve_words: false,
        }
    }
}

impl OverflowOptions {
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_input_width(mut self, width: usize) -> Self {
        self.input_width = width;
        self
    }

    pub fn preserve_newlines(mut self, preserve: bool) -> Self {
        self.preserve_newlines = preserve;
        self
    }

    pub fn preserve_words(mut self, preserve: bool) -> Self {
        self.preserve_words = preserve;
        self
    }
}

/// Number of text-box lines available once the message is accounted for
pub fn max_lines(trigger: usize, input_width: usize, message_len: usize) -> usize {
    trigger.saturating_sub(message_len) / input_width.max(1) + 1
}

struct Split {
    /// Safe text without the message
    head: String,
    truncated: bool,
    paragraphs: bool,
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn fits_unchanged(text: &str, trigger: usize) -> bool {
    char_len(text) <= trigger && !text.contains(['\r', '\n'])
}

fn normalize(text: &str, keep_newlines: bool) -> String {
    let replacement = if keep_newlines { "\n" } else { " " };
    LINE_BREAKS
        .replace_all(text, replacement)
        .trim_end()
        .to_string()
}

fn split_text(text: &str, trigger: usize, options: &OverflowOptions) -> Split {
    if fits_unchanged(text, trigger) {
        return Split {
            head: text.to_string(),
            truncated: false,
            paragraphs: false,
        };
    }

    let budget = trigger.saturating_sub(char_len(&options.message));
    let width = options.input_width.max(1);
    let lines = budget / width + 1;

    if options.preserve_newlines && lines > 1 {
        let normalized = normalize(text, true);
        let (packed, complete) = pack_paragraphs(&normalized, width, lines);
        return Split {
            head: packed.trim_end().to_string(),
            truncated: !complete,
            paragraphs: true,
        };
    }

    let flat = normalize(text, false);
    if char_len(&flat) <= trigger {
        return Split {
            head: flat,
            truncated: false,
            paragraphs: false,
        };
    }
    let head = if options.preserve_words {
        word_prefix(&flat, budget)
    } else {
        flat.chars().take(budget).collect()
    };
    Split {
        head,
        truncated: true,
        paragraphs: false,
    }
}

/// Fill up to `max_lines` lines of `width` chars, keeping short paragraphs
/// whole and chunking long ones. Returns the packed text and whether every
/// paragraph fit.
fn pack_paragraphs(text: &str, width: usize, max_lines: usize) -> (String, bool) {
    let paragraphs: Vec<Vec<char>> = text.split('\n').map(|p| p.chars().collect()).collect();
    let mut packed = String::new();
    let mut line = 1;
    let mut index = 0;
    let mut consumed = 0;

    while line <= max_lines && index < paragraphs.len() {
        let paragraph = &paragraphs[index];
        let remaining = &paragraph[consumed..];
        if consumed == 0 && remaining.len() <= width {
            packed.extend(remaining);
            packed.push('\n');
            line += 1;
            index += 1;
            continue;
        }
        while line <= max_lines && consumed < paragraph.len() {
            let take = width.min(paragraph.len() - consumed);
            packed.extend(&paragraph[consumed..consumed + take]);
            consumed += take;
            line += 1;
        }
        if consumed == paragraph.len() {
            packed.push('\n');
            index += 1;
            consumed = 0;
        }
    }

    (packed, index >= paragraphs.len())
}

/// Longest prefix of at most `budget` chars that ends on a word boundary.
/// Hyphenated words may break after the hyphen; a single word longer than
/// the budget is cut.
fn word_prefix(text: &str, budget: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= budget {
        return text.trim_end().to_string();
    }
    if budget == 0 {
        return String::new();
    }

    let mut cut = 0;
    for i in (1..=budget).rev() {
        if chars[i].is_whitespace() {
            cut = i;
            break;
        }
        if i < budget
            && chars[i] == '-'
            && chars[i - 1].is_alphabetic()
            && chars[i + 1].is_alphanumeric()
        {
            cut = i + 1;
            break;
        }
    }
    if cut == 0 {
        cut = budget;
    }

    chars[..cut]
        .iter()
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Safe portion of `text`, with `options.message` appended when truncated
pub fn safe_text(text: &str, trigger: usize, options: &OverflowOptions) -> String {
    let split = split_text(text, trigger, options);
    if split.truncated {
        split.head + &options.message
    } else {
        split.head
    }
}

/// Remainder of the normalized `text` after the safe portion
pub fn overflow_text(text: &str, trigger: usize, options: &OverflowOptions) -> String {
    if fits_unchanged(text, trigger) {
        return String::new();
    }
    let bare = OverflowOptions {
        message: String::new(),
        ..options.clone()
    };
    let split = split_text(text, trigger, &bare);
    if !split.truncated {
        return String::new();
    }

    let normalized = normalize(text, split.paragraphs);
    let rest: String = normalized.chars().skip(char_len(&split.head)).collect();
    if options.preserve_words || split.paragraphs {
        rest.trim_start().to_string()
    } else {
        rest
    }
}

/// Display form of an answer
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => if *b { "Yes" } else { "No" }.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => map
            .values()
            .map(display_value)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Empty string, empty list, empty object and null
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Structure of a field's value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    Text,
    List,
    /// A list whose rows are objects, renderable as a table
    ObjectList,
    Other,
}

/// One column of an overflow table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Key of the row attribute
    pub key: String,
    pub label: String,
}

impl Column {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// Overflow rows flattened to strings for a renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverflowTable {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

/// A form field that may spill into an addendum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddendumField {
    pub field_name: String,
    #[serde(default)]
    pub overflow_trigger: OverflowTrigger,
    /// Heading for this field in the addendum
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub headers: Option<Vec<Column>>,
}

impl AddendumField {
    pub fn new(field_name: impl Into<String>, trigger: impl Into<OverflowTrigger>) -> Self {
        Self {
            field_name: field_name.into(),
            overflow_trigger: trigger.into(),
            label: None,
            headers: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_headers(mut self, headers: Vec<Column>) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Addendum heading: the label, or the field name
    pub fn heading(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.field_name)
    }

    pub fn is_defined(&self, answers: &dyn AnswerStore) -> bool {
        answers.is_defined(&self.field_name)
    }

    /// Current value without forcing collection; undefined reads as ""
    pub fn value(&self, answers: &dyn AnswerStore) -> Value {
        answers
            .lookup(&self.field_name)
            .cloned()
            .unwrap_or_else(|| Value::String(String::new()))
    }

    pub fn value_if_defined(&self, answers: &dyn AnswerStore) -> Option<Value> {
        answers.lookup(&self.field_name).cloned()
    }

    pub fn max_lines(&self, input_width: usize, message_len: usize) -> usize {
        match self.overflow_trigger {
            OverflowTrigger::Limit(limit) => max_lines(limit, input_width, message_len),
            OverflowTrigger::Always(true) => 1,
            OverflowTrigger::Always(false) => usize::MAX,
        }
    }

    pub fn shape(&self, answers: &dyn AnswerStore) -> FieldShape {
        match answers.lookup(&self.field_name) {
            None | Some(Value::String(_)) => FieldShape::Text,
            Some(Value::Array(items)) => {
                if matches!(items.first(), Some(Value::Object(_))) {
                    FieldShape::ObjectList
                } else {
                    FieldShape::List
                }
            }
            Some(_) => FieldShape::Other,
        }
    }

    pub fn is_list(&self, answers: &dyn AnswerStore) -> bool {
        matches!(
            self.shape(answers),
            FieldShape::List | FieldShape::ObjectList
        )
    }

    pub fn is_object_list(&self, answers: &dyn AnswerStore) -> bool {
        self.shape(answers) == FieldShape::ObjectList
    }

    /// What fits on the form
    pub fn safe_value(&self, answers: &dyn AnswerStore, options: &OverflowOptions) -> Value {
        let value = match answers.lookup(&self.field_name) {
            Some(value) => value,
            None => return Value::String(String::new()),
        };
        match (self.overflow_trigger, value) {
            (OverflowTrigger::Always(true), Value::Array(_)) => Value::Array(Vec::new()),
            (OverflowTrigger::Always(true), _) => Value::String(String::new()),
            (OverflowTrigger::Always(false), other) => other.clone(),
            (OverflowTrigger::Limit(limit), Value::String(text)) => {
                Value::String(safe_text(text, limit, options))
            }
            (OverflowTrigger::Limit(limit), Value::Array(items)) => {
                Value::Array(items.iter().take(limit).cloned().collect())
            }
            (_, other) => other.clone(),
        }
    }

    /// What goes to the addendum
    pub fn overflow_value(&self, answers: &dyn AnswerStore, options: &OverflowOptions) -> Value {
        let value = match answers.lookup(&self.field_name) {
            Some(value) => value,
            None => return Value::String(String::new()),
        };
        match (self.overflow_trigger, value) {
            (OverflowTrigger::Always(true), other) => other.clone(),
            (OverflowTrigger::Always(false), Value::Array(_)) => Value::Array(Vec::new()),
            (OverflowTrigger::Limit(limit), Value::String(text)) => {
                Value::String(overflow_text(text, limit, options))
            }
            (OverflowTrigger::Limit(limit), Value::Array(items)) => {
                Value::Array(items.iter().skip(limit).cloned().collect())
            }
            _ => Value::String(String::new()),
        }
    }

    pub fn has_overflow(&self, answers: &dyn AnswerStore, options: &OverflowOptions) -> bool {
        !is_blank(&self.overflow_value(answers, options))
    }

    /// The whole value when nothing overflows, otherwise only the message
    pub fn original_or_overflow_message(
        &self,
        answers: &dyn AnswerStore,
        options: &OverflowOptions,
    ) -> String {
        if self.has_overflow(answers, options) {
            options.message.clone()
        } else {
            display_value(&self.value(answers))
        }
    }

    /// Table columns: explicit headers, else the keys of the first row
    pub fn columns(&self, answers: &dyn AnswerStore) -> Option<Vec<Column>> {
        if let Some(headers) = &self.headers {
            return Some(headers.clone());
        }
        match answers.lookup(&self.field_name) {
            Some(Value::Array(items)) => match items.first() {
                Some(Value::Object(first)) => Some(
                    first
                        .keys()
                        .map(|key| Column::new(key.clone(), key.clone()))
                        .collect(),
                ),
                _ => None,
            },
            _ => None,
        }
    }

    /// Overflow rows as strings, one cell per column
    pub fn overflow_table(
        &self,
        answers: &dyn AnswerStore,
        options: &OverflowOptions,
    ) -> Option<OverflowTable> {
        let columns = self.columns(answers)?;
        let rows = match self.overflow_value(answers, options) {
            Value::Array(items) => items
                .iter()
                .map(|row| {
                    columns
                        .iter()
                        .map(|column| match row {
                            Value::Object(map) => {
                                map.get(&column.key).map(display_value).unwrap_or_default()
                            }
                            other => display_value(other),
                        })
                        .collect()
                })
                .collect(),
            _ => Vec::new(),
        };
        Some(OverflowTable { columns, rows })
    }

    /// Bullet list of overflow items, or a Markdown table when the field has
    /// columns
    pub fn overflow_markdown(
        &self,
        answers: &dyn AnswerStore,
        options: &OverflowOptions,
    ) -> String {
        if let Some(table) = self.overflow_table(answers, options) {
            if table.columns.is_empty() {
                return String::new();
            }
            let labels: Vec<&str> = table.columns.iter().map(|c| c.label.as_str()).collect();
            let mut out = labels.join(" | ");
            out.push('\n');
            out.push_str(&vec!["-----"; labels.len()].join("|"));
            out.push('\n');
            for row in &table.rows {
                out.push_str(&row.join("|"));
                out.push('\n');
            }
            return out;
        }

        match self.overflow_value(answers, options) {
            Value::Array(items) => items
                .iter()
                .map(|item| format!("* {}\n", display_value(item)))
                .collect(),
            other => display_value(&other),
        }
    }
}

/// Which fields `defined_fields` returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldStyle {
    #[default]
    OverflowOnly,
    All,
}

/// The overflow-capable fields of one document, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddendumFields {
    fields: Vec<AddendumField>,
}

impl AddendumFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_list(fields: Vec<AddendumField>) -> Self {
        let mut out = Self::new();
        for field in fields {
            out.insert(field);
        }
        out
    }

    /// Add a field, replacing any existing field with the same name
    pub fn insert(&mut self, field: AddendumField) {
        match self
            .fields
            .iter_mut()
            .find(|f| f.field_name == field.field_name)
        {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    pub fn add(&mut self, field_name: impl Into<String>, trigger: impl Into<OverflowTrigger>) {
        self.insert(AddendumField::new(field_name, trigger));
    }

    pub fn get(&self, field_name: &str) -> Option<&AddendumField> {
        self.fields.iter().find(|f| f.field_name == field_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AddendumField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields that have an answer, optionally only those that overflow
    pub fn defined_fields(
        &self,
        answers: &dyn AnswerStore,
        style: FieldStyle,
        options: &OverflowOptions,
    ) -> Vec<&AddendumField> {
        self.fields
            .iter()
            .filter(|f| f.is_defined(answers))
            .filter(|f| style == FieldStyle::All || f.has_overflow(answers, options))
            .collect()
    }

    /// Defined fields that overflow
    pub fn overflow(
        &self,
        answers: &dyn AnswerStore,
        options: &OverflowOptions,
    ) -> Vec<&AddendumField> {
        self.defined_fields(answers, FieldStyle::OverflowOnly, options)
    }

    pub fn has_overflow(&self, answers: &dyn AnswerStore, options: &OverflowOptions) -> bool {
        self.fields
            .iter()
            .any(|f| f.is_defined(answers) && f.has_overflow(answers, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use shared_types::Answers;

    fn answers(value: Value) -> Answers {
        Answers::from_value(value)
    }

    #[test]
    fn test_short_text_is_unchanged() {
        let opts = OverflowOptions::default().with_message("...");
        assert_eq!(safe_text("Short text", 10, &opts), "Short text");
        assert_eq!(overflow_text("Short text", 10, &opts), "");
    }

    #[test]
    fn test_default_is_hard_cut() {
        let text = "Testing here\n\n\nwith some very short words, but a whole lot of them";
        let opts = OverflowOptions::default();
        assert!(!opts.preserve_words);
        let safe = safe_text(text, 23, &opts);
        let rest = overflow_text(text, 23, &opts);
        assert_eq!(safe, "Testing here with some ");
        assert_eq!(rest, "very short words, but a whole lot of them");
        assert_eq!(format!("{}{}", safe, rest), normalize(text, false));
    }

    #[test]
    fn test_word_preserving_cut() {
        let text = "Testing here\n\n\nwith some very short words, but a whole lot of them";
        let opts = OverflowOptions::default().preserve_words(true);
        assert_eq!(safe_text(text, 23, &opts), "Testing here with some");
        assert!(overflow_text(text, 23, &opts).starts_with("very short"));
    }

    #[test]
    fn test_message_fits_within_trigger() {
        let text = "one two three four five six seven eight nine ten";
        let opts = OverflowOptions::default()
            .with_message(" [See addendum]")
            .preserve_words(true);
        let safe = safe_text(text, 30, &opts);
        assert!(safe.chars().count() <= 30);
        assert_eq!(safe, "one two three [See addendum]");
    }

    #[test]
    fn test_hard_cut_reconstructs_text() {
        let text = "abcdefghij klmnopqrst uvwxyz";
        let opts = OverflowOptions::default();
        let safe = safe_text(text, 12, &opts);
        let rest = overflow_text(text, 12, &opts);
        assert_eq!(safe, "abcdefghij k");
        assert_eq!(format!("{}{}", safe, rest), text);
    }

    #[test]
    fn test_long_word_is_broken() {
        let opts = OverflowOptions::default().preserve_words(true);
        assert_eq!(safe_text("supercalifragilistic", 5, &opts), "super");
        assert_eq!(overflow_text("supercalifragilistic", 5, &opts), "califragilistic");
    }

    #[test]
    fn test_hyphenated_word_breaks_after_hyphen() {
        let opts = OverflowOptions::default().preserve_words(true);
        assert_eq!(safe_text("I was twenty-two then", 15, &opts), "I was twenty-");
    }

    #[test]
    fn test_newline_forces_overflow_check() {
        let opts = OverflowOptions::default();
        // Short but multi-line values are flattened
        assert_eq!(safe_text("a\r\nb", 10, &opts), "a b");
        assert_eq!(overflow_text("a\r\nb", 10, &opts), "");
    }

    #[test]
    fn test_paragraphs_are_packed() {
        let text = "first line\nsecond line\nthird line that is long";
        let opts = OverflowOptions::default()
            .with_input_width(12)
            .preserve_newlines(true);
        // 24 chars of budget gives three lines of twelve
        let safe = safe_text(text, 24, &opts);
        assert_eq!(safe, "first line\nsecond line\nthird line t");
        assert_eq!(overflow_text(text, 24, &opts), "hat is long");
    }

    #[test]
    fn test_paragraphs_complete_without_message() {
        let text = "one\ntwo";
        let opts = OverflowOptions::default()
            .with_input_width(5)
            .preserve_newlines(true)
            .with_message("!");
        assert_eq!(safe_text(text, 6, &opts), "one\ntwo");
    }

    #[test]
    fn test_original_or_overflow_message() {
        let store = answers(json!({
            "short": "Short text",
            "long": "A very long text that exceeds the overflow trigger",
            "lines": "A medium\n length text\nthat exceeds\nthe overflow trigger with newlines",
        }));
        let opts = OverflowOptions::default().with_message("Overflow occurred.");
        assert_eq!(
            AddendumField::new("short", 10usize).original_or_overflow_message(&store, &opts),
            "Short text"
        );
        assert_eq!(
            AddendumField::new("long", 10usize).original_or_overflow_message(&store, &opts),
            "Overflow occurred."
        );
        let paragraphs = opts.clone().preserve_newlines(true);
        assert_eq!(
            AddendumField::new("lines", 80usize).original_or_overflow_message(&store, &paragraphs),
            "Overflow occurred."
        );
    }

    #[test]
    fn test_list_overflow_is_positional() {
        let store = answers(json!({ "kids": ["a", "b", "c", "d"] }));
        let field = AddendumField::new("kids", 2usize);
        let opts = OverflowOptions::default();
        assert_eq!(field.safe_value(&store, &opts), json!(["a", "b"]));
        assert_eq!(field.overflow_value(&store, &opts), json!(["c", "d"]));
        assert_eq!(field.overflow_markdown(&store, &opts), "* c\n* d\n");
    }

    #[test]
    fn test_always_trigger() {
        let store = answers(json!({ "notes": "anything", "count": 3 }));
        let opts = OverflowOptions::default();
        let always = AddendumField::new("notes", true);
        assert_eq!(always.safe_value(&store, &opts), json!(""));
        assert_eq!(always.overflow_value(&store, &opts), json!("anything"));
        assert!(AddendumField::new("count", true).has_overflow(&store, &opts));

        let never = AddendumField::new("notes", false);
        assert_eq!(never.safe_value(&store, &opts), json!("anything"));
        assert!(!never.has_overflow(&store, &opts));
    }

    #[test]
    fn test_numbers_never_overflow() {
        let store = answers(json!({ "amount": 123456789 }));
        let field = AddendumField::new("amount", 2usize);
        let opts = OverflowOptions::default();
        assert_eq!(field.safe_value(&store, &opts), json!(123456789));
        assert!(!field.has_overflow(&store, &opts));
        assert_eq!(field.shape(&store), FieldShape::Other);
    }

    #[test]
    fn test_undefined_field_reads_empty() {
        let store = Answers::new();
        let field = AddendumField::new("missing", 5usize);
        assert_eq!(field.value(&store), json!(""));
        assert_eq!(field.value_if_defined(&store), None);
        assert!(!field.has_overflow(&store, &OverflowOptions::default()));
    }

    #[test]
    fn test_object_list_table() {
        let store = answers(json!({
            "debts": [
                { "creditor": "Bank", "amount": 100 },
                { "creditor": "Landlord", "amount": 1200 },
                { "creditor": "Friend", "amount": 5 },
            ]
        }));
        let field = AddendumField::new("debts", 1usize);
        let opts = OverflowOptions::default();
        assert!(field.is_object_list(&store));
        assert_eq!(
            field.columns(&store).unwrap(),
            vec![Column::new("creditor", "creditor"), Column::new("amount", "amount")]
        );
        assert_eq!(
            field.overflow_markdown(&store, &opts),
            "creditor | amount\n-----|-----\nLandlord|1200\nFriend|5\n"
        );
    }

    #[test]
    fn test_explicit_headers_win() {
        let store = answers(json!({ "debts": [{ "creditor": "Bank", "amount": 1 }] }));
        let field = AddendumField::new("debts", 0usize)
            .with_headers(vec![Column::new("amount", "Amount owed")]);
        let table = field
            .overflow_table(&store, &OverflowOptions::default())
            .unwrap();
        assert_eq!(table.columns[0].label, "Amount owed");
        assert_eq!(table.rows, vec![vec!["1".to_string()]]);
    }

    #[test]
    fn test_fields_from_list() {
        let fields: Vec<AddendumField> = serde_json::from_value(json!([
            { "field_name": "story", "overflow_trigger": 20 },
            { "field_name": "kids", "overflow_trigger": true },
            { "field_name": "story", "overflow_trigger": 10 },
        ]))
        .unwrap();
        let fields = AddendumFields::from_list(fields);
        assert_eq!(fields.len(), 2);
        assert_eq!(
            fields.get("story").unwrap().overflow_trigger,
            OverflowTrigger::Limit(10)
        );
        assert_eq!(
            fields.get("kids").unwrap().overflow_trigger,
            OverflowTrigger::Always(true)
        );
    }

    #[test]
    fn test_defined_fields_styles() {
        let store = answers(json!({
            "story": "a story that is far too long to fit",
            "name": "Sam",
        }));
        let mut fields = AddendumFields::new();
        fields.add("story", 10usize);
        fields.add("name", 10usize);
        fields.add("unanswered", 10usize);
        let opts = OverflowOptions::default();

        let names = |list: Vec<&AddendumField>| -> Vec<String> {
            list.iter().map(|f| f.field_name.clone()).collect()
        };
        assert_eq!(names(fields.overflow(&store, &opts)), vec!["story"]);
        assert_eq!(
            names(fields.defined_fields(&store, FieldStyle::All, &opts)),
            vec!["story", "name"]
        );
        assert!(fields.has_overflow(&store, &opts));
    }

    #[test]
    fn test_max_lines() {
        assert_eq!(max_lines(160, 80, 0), 3);
        assert_eq!(max_lines(160, 80, 15), 2);
        assert_eq!(max_lines(10, 80, 20), 1);
        assert_eq!(AddendumField::new("x", 240usize).max_lines(80, 0), 4);
    }
}

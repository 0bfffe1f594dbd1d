//! People and their addresses, with the formatting helpers templates use

use crate::text::{comma_and_list, comma_list, comma_or_list, join_with};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use shared_types::Artifact;
use std::fmt;

/// Unit designators that already say what the unit is
const UNIT_WORDS: &[&str] = &[
    "apt",
    "unit",
    "suite",
    "bldg",
    "fl",
    "apartment",
    "building",
    "floor",
    "ste",
];

const US_STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AS", "American Samoa"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("DC", "District of Columbia"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("GU", "Guam"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("MP", "Northern Mariana Islands"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("PR", "Puerto Rico"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VI", "U.S. Virgin Islands"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
];

const COUNTRIES: &[(&str, &str)] = &[
    ("US", "United States"),
    ("CA", "Canada"),
    ("MX", "Mexico"),
    ("GB", "United Kingdom"),
    ("IE", "Ireland"),
    ("FR", "France"),
    ("DE", "Germany"),
    ("ES", "Spain"),
    ("IT", "Italy"),
    ("BR", "Brazil"),
    ("CN", "China"),
    ("IN", "India"),
    ("JP", "Japan"),
    ("PH", "Philippines"),
    ("DO", "Dominican Republic"),
    ("HT", "Haiti"),
    ("GT", "Guatemala"),
    ("SV", "El Salvador"),
    ("VN", "Vietnam"),
];

/// Full US state or territory name for a postal abbreviation
pub fn state_name(abbreviation: &str) -> Option<&'static str> {
    let upper = abbreviation.trim().to_uppercase();
    US_STATES
        .iter()
        .find(|(code, _)| *code == upper)
        .map(|(_, name)| *name)
}

/// English country name for an ISO 3166 alpha-2 code, or the code itself
pub fn country_name(code: &str) -> String {
    let upper = code.trim().to_uppercase();
    COUNTRIES
        .iter()
        .find(|(c, _)| *c == upper)
        .map(|(_, name)| name.to_string())
        .unwrap_or(upper)
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Presentation choices for address formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressStyle {
    /// Country assumed when an address has none
    pub default_country: String,
    pub impounded_label: String,
    /// Spell out the state name
    pub long_state: bool,
    /// Never add "Unit" before a bare unit number
    pub bare: bool,
    /// Print impounded addresses anyway
    pub show_impounded: bool,
    pub include_unit: bool,
    /// Force the country on or off; by default it is shown when it differs
    /// from `default_country`
    pub show_country: Option<bool>,
}

impl Default for AddressStyle {
    fn default() -> Self {
        Self {
            default_country: "US".to_string(),
            impounded_label: "(impounded)".to_string(),
            long_state: false,
            bare: false,
            show_impounded: false,
            include_unit: true,
            show_country: None,
        }
    }
}

impl AddressStyle {
    pub fn long_state(mut self) -> Self {
        self.long_state = true;
        self
    }

    pub fn bare(mut self) -> Self {
        self.bare = true;
        self
    }

    pub fn show_impounded(mut self) -> Self {
        self.show_impounded = true;
        self
    }

    pub fn without_unit(mut self) -> Self {
        self.include_unit = false;
        self
    }

    pub fn show_country(mut self, show: bool) -> Self {
        self.show_country = Some(show);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    /// Street line, e.g. "123 Main St"
    pub address: Option<String>,
    /// Used with `street` when `address` is missing
    pub street_number: Option<String>,
    pub street: Option<String>,
    pub unit: Option<String>,
    pub floor: Option<String>,
    pub room: Option<String>,
    /// Neighborhood or borough
    pub sublocality_level_1: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub postal_code: Option<String>,
    pub county: Option<String>,
    pub country: Option<String>,
    /// Only the city and state are known
    pub city_only: bool,
    /// Court-ordered confidential address
    pub impounded: bool,
    pub has_no_address: bool,
    pub has_no_address_explanation: Option<String>,
}

impl Address {
    /// The unit, floor or room, prefixed with a designator when the user
    /// typed only a number
    pub fn formatted_unit(&self, bare: bool) -> String {
        if let Some(unit) = present(&self.unit) {
            let lower = unit.to_lowercase();
            let numeric = lower.chars().all(|c| c.is_numeric());
            let needs_word = numeric
                || (!unit.contains(' ') && !UNIT_WORDS.iter().any(|w| lower.contains(w)));
            return if !bare && needs_word {
                format!("Unit {}", unit)
            } else {
                unit.to_string()
            };
        }
        if let Some(floor) = present(&self.floor) {
            return format!("Floor {}", floor);
        }
        if let Some(room) = present(&self.room) {
            return format!("Room {}", room);
        }
        String::new()
    }

    fn street_line(&self) -> String {
        match (
            present(&self.address),
            present(&self.street_number),
            present(&self.street),
        ) {
            (Some(address), _, _) => address.to_string(),
            (None, Some(number), Some(street)) => format!("{} {}", number, street),
            (None, None, Some(street)) => street.to_string(),
            _ => String::new(),
        }
    }

    fn redacted(&self, style: &AddressStyle) -> Option<String> {
        if self.impounded && !style.show_impounded {
            Some(style.impounded_label.clone())
        } else {
            None
        }
    }

    fn no_address_explanation(&self) -> Option<&str> {
        if self.has_no_address {
            present(&self.has_no_address_explanation)
        } else {
            None
        }
    }

    /// Country of this address, falling back to the style's default
    pub fn country_code<'a>(&'a self, style: &'a AddressStyle) -> &'a str {
        present(&self.country).unwrap_or(&style.default_country)
    }

    /// State name spelled out when known, else the abbreviation
    pub fn state_name(&self) -> String {
        match present(&self.state) {
            Some(state) => state_name(state)
                .map(str::to_string)
                .unwrap_or_else(|| state.to_string()),
            None => String::new(),
        }
    }

    /// "City, ST 01234" with the state, zip and neighborhood as available
    fn city_state_zip(&self, style: &AddressStyle) -> String {
        let mut out = present(&self.city).unwrap_or_default().to_string();
        if let Some(state) = present(&self.state) {
            let state = if style.long_state {
                self.state_name()
            } else {
                state.to_string()
            };
            if out.is_empty() {
                out = state;
            } else {
                out.push_str(", ");
                out.push_str(&state);
            }
        }
        if let Some(zip) = present(&self.zip) {
            out.push(' ');
            if self.country_code(style).eq_ignore_ascii_case("US") {
                out.push_str(&format!("{:0>5}", zip));
            } else {
                out.push_str(zip);
            }
        } else if let Some(postal) = present(&self.postal_code) {
            out.push(' ');
            out.push_str(postal);
        }
        out
    }

    fn shows_country(&self, style: &AddressStyle) -> bool {
        match style.show_country {
            Some(show) => show,
            None => present(&self.country)
                .is_some_and(|c| !c.eq_ignore_ascii_case(&style.default_country)),
        }
    }

    /// Street line with the unit
    pub fn line_one(&self, style: &AddressStyle) -> String {
        if let Some(label) = self.redacted(style) {
            return label;
        }
        if let Some(explanation) = self.no_address_explanation() {
            return explanation.to_string();
        }
        if self.city_only {
            return String::new();
        }
        let mut out = self.street_line();
        let unit = self.formatted_unit(style.bare);
        if !unit.is_empty() {
            out.push_str(", ");
            out.push_str(&unit);
        }
        out
    }

    /// Neighborhood, city, state and zip
    pub fn line_two(&self, style: &AddressStyle) -> String {
        if let Some(label) = self.redacted(style) {
            return label;
        }
        let mut out = String::new();
        if let Some(area) = present(&self.sublocality_level_1) {
            out.push_str(area);
            out.push_str(", ");
        }
        out.push_str(&self.city_state_zip(style));
        out
    }

    pub fn on_one_line(&self, style: &AddressStyle) -> String {
        if let Some(label) = self.redacted(style) {
            return label;
        }
        if let Some(explanation) = self.no_address_explanation() {
            return format!(
                "{}, {} {}",
                explanation,
                present(&self.city).unwrap_or_default(),
                present(&self.state).unwrap_or_default()
            )
            .trim_end()
            .to_string();
        }

        let mut out = String::new();
        if !self.city_only {
            out.push_str(&self.street_line());
            if style.include_unit {
                let unit = self.formatted_unit(style.bare);
                if !unit.is_empty() {
                    out.push_str(", ");
                    out.push_str(&unit);
                }
            }
            if !out.is_empty() {
                out.push_str(", ");
            }
        }
        if let Some(area) = present(&self.sublocality_level_1) {
            if present(&self.street_number) != Some(area) {
                out.push_str(area);
                out.push_str(", ");
            }
        }
        out.push_str(&self.city_state_zip(style));
        if self.shows_country(style) {
            out.push_str(", ");
            out.push_str(&country_name(self.country_code(style)));
        }
        out
    }

    /// Multi-line mailing block
    pub fn block(&self, style: &AddressStyle) -> String {
        if let Some(label) = self.redacted(style) {
            return label;
        }
        if let Some(explanation) = self.no_address_explanation() {
            return [
                explanation,
                present(&self.city).unwrap_or_default(),
                present(&self.state).unwrap_or_default(),
            ]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("\n");
        }

        let mut lines = Vec::new();
        if !self.city_only {
            let street = self.street_line();
            if !street.is_empty() {
                lines.push(street);
            }
            let unit = self.formatted_unit(style.bare);
            if !unit.is_empty() {
                lines.push(unit);
            }
        }
        if let Some(area) = present(&self.sublocality_level_1) {
            lines.push(area.to_string());
        }
        lines.push(self.city_state_zip(style));
        if self.shows_country(style) {
            lines.push(country_name(self.country_code(style)));
        }
        lines.join("\n")
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.on_one_line(&AddressStyle::default()))
    }
}

/// How `IndividualName::full` renders the middle name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MiddleName {
    Full,
    #[default]
    Initial,
    Omit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndividualName {
    pub first: String,
    pub middle: Option<String>,
    pub last: Option<String>,
    pub suffix: Option<String>,
}

impl IndividualName {
    pub fn new(first: impl Into<String>, last: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            last: Some(last.into()),
            ..Self::default()
        }
    }

    pub fn with_middle(mut self, middle: impl Into<String>) -> Self {
        self.middle = Some(middle.into());
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn full(&self, middle: MiddleName) -> String {
        let mut parts = vec![self.first.trim().to_string()];
        if let Some(m) = present(&self.middle) {
            match middle {
                MiddleName::Full => parts.push(m.to_string()),
                MiddleName::Initial => {
                    if let Some(initial) = m.chars().next() {
                        parts.push(format!("{}.", initial));
                    }
                }
                MiddleName::Omit => {}
            }
        }
        if let Some(last) = present(&self.last) {
            parts.push(last.to_string());
        }
        if let Some(suffix) = present(&self.suffix) {
            parts.push(suffix.to_string());
        }
        parts.retain(|p| !p.is_empty());
        parts.join(" ")
    }

    pub fn firstlast(&self) -> String {
        match present(&self.last) {
            Some(last) => format!("{} {}", self.first.trim(), last),
            None => self.first.trim().to_string(),
        }
    }
}

impl fmt::Display for IndividualName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full(MiddleName::Initial))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonType {
    #[default]
    Individual,
    Business,
    Organization,
}

/// A party, witness, child or other person in the case
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Individual {
    pub name: IndividualName,
    pub person_type: PersonType,
    pub address: Address,
    pub mailing_address: Option<Address>,
    pub mobile_number: Option<String>,
    pub phone_number: Option<String>,
    /// Court-ordered confidential phone numbers
    pub phone_impounded: bool,
    pub email: Option<String>,
    pub other_contact_method: Option<String>,
    pub birthdate: Option<NaiveDate>,
    #[serde(skip)]
    pub signature: Option<Artifact>,
}

impl Individual {
    pub fn new(name: IndividualName) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    pub fn business(name: impl Into<String>) -> Self {
        Self {
            name: IndividualName {
                first: name.into(),
                ..IndividualName::default()
            },
            person_type: PersonType::Business,
            ..Self::default()
        }
    }

    fn is_entity(&self) -> bool {
        matches!(
            self.person_type,
            PersonType::Business | PersonType::Organization
        )
    }

    /// Full name with the whole middle name; entities use only their name
    pub fn name_full(&self) -> String {
        if self.is_entity() {
            return self.name.first.clone();
        }
        self.name.full(MiddleName::Full)
    }

    pub fn name_initials(&self) -> String {
        if self.is_entity() {
            return self.name.first.clone();
        }
        self.name.full(MiddleName::Initial)
    }

    pub fn name_short(&self) -> String {
        if self.is_entity() {
            return self.name.first.clone();
        }
        self.name.firstlast()
    }

    /// "QKS" for "Quinten K Steenhuis"
    pub fn initials(&self) -> String {
        [
            Some(self.name.first.as_str()),
            self.name.middle.as_deref(),
            self.name.last.as_deref(),
        ]
        .iter()
        .flatten()
        .filter_map(|part| part.trim().chars().next())
        .collect()
    }

    /// The most familiar form of the name that is still unambiguous among
    /// `others`: first name, first name and suffix, first and middle, first
    /// and last, full name, then `default`.
    pub fn familiar(&self, others: &[Individual], default: Option<&str>) -> String {
        if self.is_entity() {
            return self.name.first.clone();
        }
        let first = self.name.first.trim();
        let clashes = |candidate: &str, form: &dyn Fn(&Individual) -> String| {
            others.iter().any(|other| form(other) == candidate)
        };

        if !clashes(first, &|o| o.name.first.trim().to_string()) {
            return first.to_string();
        }

        let with_suffix = |p: &Individual| {
            format!(
                "{} {}",
                p.name.first.trim(),
                present(&p.name.suffix).unwrap_or_default()
            )
        };
        if !clashes(&with_suffix(self), &with_suffix) {
            if let Some(suffix) = present(&self.name.suffix) {
                return format!("{} {}", first, suffix);
            }
            return first.to_string();
        }

        let with_middle = |p: &Individual| {
            format!(
                "{} {}",
                p.name.first.trim(),
                present(&p.name.middle).unwrap_or_default()
            )
        };
        if !clashes(&with_middle(self), &with_middle) {
            if let Some(middle) = present(&self.name.middle) {
                return format!("{} {}", first, middle);
            }
            return first.to_string();
        }

        let short = self.name_short();
        if !clashes(&short, &|o| o.name.firstlast()) {
            return short;
        }

        let full = self.name_full();
        if !clashes(&full, &|o| o.name_full()) {
            return full;
        }

        default.map(str::to_string).unwrap_or(full)
    }

    /// The signature when rendering the final version; previews stay unsigned
    pub fn signature_if_final(&self, key: &str) -> Option<&Artifact> {
        if key == "final" {
            self.signature.as_ref()
        } else {
            None
        }
    }

    /// "555-1234 (cell), 555-9876 (other)", a single bare number, or the
    /// impounded label
    pub fn phone_numbers(&self, style: &AddressStyle) -> String {
        let mut numbers = Vec::new();
        if let Some(mobile) = present(&self.mobile_number) {
            numbers.push((mobile, "cell"));
        }
        if let Some(phone) = present(&self.phone_number) {
            numbers.push((phone, "other"));
        }
        match numbers.as_slice() {
            [] => String::new(),
            _ if self.phone_impounded && !style.show_impounded => style.impounded_label.clone(),
            [(number, _)] => number.to_string(),
            many => comma_list(
                &many
                    .iter()
                    .map(|(number, kind)| format!("{} ({})", number, kind))
                    .collect::<Vec<_>>(),
            ),
        }
    }

    /// "by phone at ..., by email at ..., or by ..."
    pub fn contact_methods(&self, style: &AddressStyle) -> String {
        let mut methods = Vec::new();
        let phones = self.phone_numbers(style);
        if !phones.is_empty() {
            methods.push(format!("by phone at {}", phones));
        }
        if let Some(email) = present(&self.email) {
            methods.push(format!("by email at {}", email));
        }
        if let Some(other) = present(&self.other_contact_method) {
            methods.push(format!("by {}", other));
        }
        comma_or_list(&methods)
    }

    /// Age in the most useful unit: years from two, else months, weeks or days
    pub fn formatted_age(&self, today: NaiveDate) -> Option<String> {
        let birth = self.birthdate?;
        let days = (today - birth).num_days();
        if days < 0 {
            return None;
        }
        let mut years = today.year() - birth.year();
        if (today.month(), today.day()) < (birth.month(), birth.day()) {
            years -= 1;
        }
        if years >= 2 {
            return Some(format!("{} years", years));
        }
        let weeks = days / 7;
        if weeks > 12 {
            let mut months = (today.year() - birth.year()) * 12 + today.month() as i32
                - birth.month() as i32;
            if today.day() < birth.day() {
                months -= 1;
            }
            return Some(format!("{} months", months));
        }
        if weeks > 2 {
            return Some(format!("{} weeks", weeks));
        }
        Some(format!("{} days", days))
    }

    /// Name followed by the address block, one item per line
    pub fn address_block(&self, style: &AddressStyle) -> String {
        format!("{}\n{}", self.name_full(), self.address.block(style))
    }
}

impl fmt::Display for Individual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name_initials())
    }
}

/// Plaintiffs, defendants, children: any list of people
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeopleList {
    people: Vec<Individual>,
}

impl PeopleList {
    pub fn new(people: Vec<Individual>) -> Self {
        Self { people }
    }

    pub fn push(&mut self, person: Individual) {
        self.people.push(person);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Individual> {
        self.people.iter()
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    fn names(&self) -> Vec<String> {
        self.people.iter().map(ToString::to_string).collect()
    }

    pub fn full_names(&self) -> String {
        comma_and_list(
            &self
                .people
                .iter()
                .map(Individual::name_full)
                .collect::<Vec<_>>(),
        )
    }

    /// The first `limit` names, then `truncate` ("et al.") if any were left out
    pub fn short_list(&self, limit: usize, truncate: &str) -> String {
        let names = self.names();
        if names.len() > limit {
            format!("{}{}", comma_and_list(&names[..limit]), truncate)
        } else {
            comma_and_list(&names)
        }
    }

    pub fn familiar(&self, others: &[Individual], default: Option<&str>) -> String {
        comma_and_list(
            &self
                .people
                .iter()
                .map(|p| p.familiar(others, default))
                .collect::<Vec<_>>(),
        )
    }

    pub fn familiar_or(&self, others: &[Individual], default: Option<&str>) -> String {
        comma_or_list(
            &self
                .people
                .iter()
                .map(|p| p.familiar(others, default))
                .collect::<Vec<_>>(),
        )
    }

    /// "Ann Lee, 1 Main St, Boston, MA 02110; and Bo Diaz, ..."
    pub fn names_and_addresses_on_one_line(&self, separator: &str, style: &AddressStyle) -> String {
        let entries: Vec<String> = self
            .people
            .iter()
            .map(|p| format!("{}, {}", p, p.address.on_one_line(style)))
            .collect();
        join_with(&entries, separator, "and")
    }
}

impl fmt::Display for PeopleList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&comma_and_list(&self.names()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn address() -> Address {
        Address {
            address: Some("123 Main St".into()),
            unit: Some("4".into()),
            city: Some("Boston".into()),
            state: Some("MA".into()),
            zip: Some("2110".into()),
            ..Address::default()
        }
    }

    fn person(first: &str, middle: Option<&str>, last: &str) -> Individual {
        let mut name = IndividualName::new(first, last);
        name.middle = middle.map(String::from);
        Individual::new(name)
    }

    #[test]
    fn test_formatted_unit_heuristics() {
        let mut a = Address::default();
        assert_eq!(a.formatted_unit(false), "");
        a.unit = Some("4B".into());
        assert_eq!(a.formatted_unit(false), "Unit 4B");
        assert_eq!(a.formatted_unit(true), "4B");
        a.unit = Some("Apt 4".into());
        assert_eq!(a.formatted_unit(false), "Apt 4");
        a.unit = Some("Suite3".into());
        assert_eq!(a.formatted_unit(false), "Suite3");
        a.unit = None;
        a.floor = Some("2".into());
        assert_eq!(a.formatted_unit(false), "Floor 2");
    }

    #[test]
    fn test_lines_pad_us_zip() {
        let style = AddressStyle::default();
        let a = address();
        assert_eq!(a.line_one(&style), "123 Main St, Unit 4");
        assert_eq!(a.line_two(&style), "Boston, MA 02110");
        assert_eq!(a.on_one_line(&style), "123 Main St, Unit 4, Boston, MA 02110");
        assert_eq!(a.to_string(), "123 Main St, Unit 4, Boston, MA 02110");
        assert_eq!(
            a.line_two(&AddressStyle::default().long_state()),
            "Boston, Massachusetts 02110"
        );
    }

    #[test]
    fn test_block() {
        let a = address();
        assert_eq!(
            a.block(&AddressStyle::default()),
            "123 Main St\nUnit 4\nBoston, MA 02110"
        );
    }

    #[test]
    fn test_foreign_address_shows_country() {
        let a = Address {
            address: Some("1 Rue de Rivoli".into()),
            city: Some("Paris".into()),
            postal_code: Some("75001".into()),
            country: Some("FR".into()),
            ..Address::default()
        };
        assert_eq!(
            a.on_one_line(&AddressStyle::default()),
            "1 Rue de Rivoli, Paris 75001, France"
        );
        assert_eq!(
            a.on_one_line(&AddressStyle::default().show_country(false)),
            "1 Rue de Rivoli, Paris 75001"
        );
    }

    #[test]
    fn test_impounded_address_is_redacted() {
        let a = Address {
            impounded: true,
            ..address()
        };
        let style = AddressStyle::default();
        assert_eq!(a.on_one_line(&style), "(impounded)");
        assert_eq!(a.block(&style), "(impounded)");
        assert_eq!(
            a.line_one(&AddressStyle::default().show_impounded()),
            "123 Main St, Unit 4"
        );
    }

    #[test]
    fn test_no_address_explanation() {
        let a = Address {
            has_no_address: true,
            has_no_address_explanation: Some("Staying with friends".into()),
            city: Some("Lowell".into()),
            state: Some("MA".into()),
            ..Address::default()
        };
        let style = AddressStyle::default();
        assert_eq!(a.on_one_line(&style), "Staying with friends, Lowell MA");
        assert_eq!(a.line_one(&style), "Staying with friends");
        assert_eq!(a.block(&style), "Staying with friends\nLowell\nMA");
    }

    #[test]
    fn test_city_only() {
        let a = Address {
            city_only: true,
            ..address()
        };
        assert_eq!(a.line_one(&AddressStyle::default()), "");
        assert_eq!(a.on_one_line(&AddressStyle::default()), "Boston, MA 02110");
    }

    #[test]
    fn test_name_forms() {
        let p = person("Quinten", Some("Kay"), "Steenhuis");
        assert_eq!(p.name_full(), "Quinten Kay Steenhuis");
        assert_eq!(p.name_initials(), "Quinten K. Steenhuis");
        assert_eq!(p.name_short(), "Quinten Steenhuis");
        assert_eq!(p.initials(), "QKS");
        assert_eq!(p.to_string(), "Quinten K. Steenhuis");

        let jr = Individual::new(IndividualName::new("Sam", "Lee").with_suffix("Jr."));
        assert_eq!(jr.name_full(), "Sam Lee Jr.");
    }

    #[test]
    fn test_business_uses_only_name() {
        let b = Individual::business("Acme Property LLC");
        assert_eq!(b.name_full(), "Acme Property LLC");
        assert_eq!(b.familiar(&[], None), "Acme Property LLC");
        assert_eq!(b.initials(), "A");
    }

    #[test]
    fn test_familiar_disambiguates() {
        let child = person("Ann", Some("Marie"), "Lee");
        let mother = person("Ann", Some("Beth"), "Lee");
        let stranger = person("Bo", None, "Diaz");

        assert_eq!(child.familiar(&[stranger.clone()], None), "Ann");
        assert_eq!(child.familiar(&[mother.clone()], None), "Ann Marie");

        let twin = person("Ann", Some("Marie"), "Lee");
        assert_eq!(child.familiar(&[twin], Some("the minor")), "the minor");
    }

    #[test]
    fn test_phone_numbers_and_contact_methods() {
        let style = AddressStyle::default();
        let mut p = person("Ann", None, "Lee");
        assert_eq!(p.phone_numbers(&style), "");
        p.mobile_number = Some("617-555-1234".into());
        assert_eq!(p.phone_numbers(&style), "617-555-1234");
        p.phone_number = Some("617-555-9876".into());
        assert_eq!(
            p.phone_numbers(&style),
            "617-555-1234 (cell), 617-555-9876 (other)"
        );
        p.email = Some("ann@example.com".into());
        assert_eq!(
            p.contact_methods(&style),
            "by phone at 617-555-1234 (cell), 617-555-9876 (other) or by email at ann@example.com"
        );
        p.phone_impounded = true;
        assert_eq!(p.phone_numbers(&style), "(impounded)");
    }

    #[test]
    fn test_signature_only_on_final() {
        let mut p = person("Ann", None, "Lee");
        p.signature = Some(Artifact::new(
            "sig.png",
            shared_types::FileKind::from_filename("sig.png"),
            vec![1],
        ));
        assert!(p.signature_if_final("final").is_some());
        assert!(p.signature_if_final("preview").is_none());
    }

    #[test]
    fn test_formatted_age() {
        let mut p = person("Kid", None, "Lee");
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        p.birthdate = NaiveDate::from_ymd_opt(2020, 6, 16);
        assert_eq!(p.formatted_age(today).unwrap(), "3 years");
        p.birthdate = NaiveDate::from_ymd_opt(2023, 9, 15);
        assert_eq!(p.formatted_age(today).unwrap(), "9 months");
        p.birthdate = NaiveDate::from_ymd_opt(2024, 5, 15);
        assert_eq!(p.formatted_age(today).unwrap(), "4 weeks");
        p.birthdate = NaiveDate::from_ymd_opt(2024, 6, 10);
        assert_eq!(p.formatted_age(today).unwrap(), "5 days");
    }

    #[test]
    fn test_people_list_formats() {
        let mut a = person("Ann", None, "Lee");
        a.address = address();
        let mut b = person("Bo", None, "Diaz");
        b.address = Address {
            city: Some("Lowell".into()),
            state: Some("MA".into()),
            city_only: true,
            ..Address::default()
        };
        let c = person("Cy", None, "Ng");
        let list = PeopleList::new(vec![a, b, c]);

        assert_eq!(list.to_string(), "Ann Lee, Bo Diaz, and Cy Ng");
        assert_eq!(list.full_names(), "Ann Lee, Bo Diaz, and Cy Ng");
        assert_eq!(list.short_list(2, ", et al."), "Ann Lee and Bo Diaz, et al.");
        assert_eq!(list.familiar(&[], None), "Ann, Bo, and Cy");
        assert_eq!(list.familiar_or(&[], None), "Ann, Bo, or Cy");

        let two = PeopleList::new(list.iter().take(2).cloned().collect());
        assert_eq!(
            two.names_and_addresses_on_one_line("; ", &AddressStyle::default()),
            "Ann Lee, 123 Main St, Unit 4, Boston, MA 02110 and Bo Diaz, Lowell, MA"
        );
    }
}

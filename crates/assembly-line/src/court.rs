//! Courts as loaded from a court list

use crate::people::{Address, AddressStyle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Markdown hard line break
const BR: &str = "  \n";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Court {
    pub name: String,
    pub description: Option<String>,
    pub department: Option<String>,
    pub division: Option<String>,
    pub address: Address,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Columns with no dedicated field
    pub extra: BTreeMap<String, String>,
}

impl Court {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Build from one row of a court list. `address_*` columns fill the
    /// address, `location_latitude`/`location_longitude` the coordinates.
    /// Empty cells are skipped; other columns land in `extra` with spaces
    /// turned into underscores.
    pub fn from_row(row: &BTreeMap<String, String>) -> Self {
        let mut court = Court::default();
        for (column, value) in row {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            let owned = Some(value.to_string());
            match column.as_str() {
                "name" => court.name = value.to_string(),
                "description" => court.description = owned,
                "department" => court.department = owned,
                "division" => court.division = owned,
                "location_latitude" => court.latitude = parse_coordinate(column, value),
                "location_longitude" => court.longitude = parse_coordinate(column, value),
                other => {
                    let is_address = other
                        .strip_prefix("address_")
                        .is_some_and(|field| set_address_field(&mut court.address, field, value));
                    if !is_address {
                        court.extra.insert(other.replace(' ', "_"), value.to_string());
                    }
                }
            }
        }
        court
    }

    /// The name, with the city appended when the name doesn't mention it
    pub fn short_label(&self) -> String {
        match self.address.city.as_deref().map(str::trim) {
            Some(city) if !city.is_empty() && !self.name.contains(city) => {
                format!("{} ({})", self.name, city)
            }
            _ => self.name.clone(),
        }
    }

    /// Bold label and one-line address, as Markdown
    pub fn short_label_and_address(&self, style: &AddressStyle) -> String {
        format!(
            "**{}**{}{}",
            self.short_label(),
            BR,
            self.address.on_one_line(style)
        )
    }

    /// Bold label, address and description, as Markdown
    pub fn short_description(&self, style: &AddressStyle) -> String {
        let mut out = self.short_label_and_address(style);
        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            out.push_str(BR);
            out.push_str(description);
        }
        out
    }
}

impl fmt::Display for Court {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn parse_coordinate(column: &str, value: &str) -> Option<f64> {
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(column, value, "skipping unparsable coordinate");
            None
        }
    }
}

fn set_address_field(address: &mut Address, field: &str, value: &str) -> bool {
    let slot = match field {
        "address" => &mut address.address,
        "street_number" => &mut address.street_number,
        "street" => &mut address.street,
        "unit" => &mut address.unit,
        "floor" => &mut address.floor,
        "room" => &mut address.room,
        "city" => &mut address.city,
        "state" => &mut address.state,
        "zip" => &mut address.zip,
        "postal_code" => &mut address.postal_code,
        "county" => &mut address.county,
        "country" => &mut address.country,
        "sublocality_level_1" => &mut address.sublocality_level_1,
        _ => return false,
    };
    *slot = Some(value.to_string());
    true
}

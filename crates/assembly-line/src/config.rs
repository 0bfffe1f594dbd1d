//! Configuration for document assembly
//!
//! Defaults for overflow handling, exhibit numbering, bundle packaging and
//! address formatting, loaded from TOML. Every section and every key is
//! optional.

use crate::error::{AssemblyError, Result};
use crate::exhibits::{ExhibitOptions, LabelStyle};
use crate::overflow::OverflowOptions;
use crate::people::AddressStyle;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssemblyConfig {
    #[serde(default)]
    pub overflow: OverflowConfig,
    #[serde(default)]
    pub exhibits: ExhibitConfig,
    #[serde(default)]
    pub bundle: BundleConfig,
    #[serde(default)]
    pub people: PeopleConfig,
}

impl AssemblyConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Example
    ///
    /// ```
    /// use assembly_line::config::AssemblyConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = AssemblyConfig::from_str(r#"
    ///     [overflow]
    ///     default_overflow_message = " [See addendum]"
    /// "#)?;
    /// assert_eq!(config.overflow.input_width, 80);
    /// # Ok(())
    /// # }
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no document could be rendered with
    pub fn validate(&self) -> Result<()> {
        if self.overflow.input_width == 0 {
            return Err(AssemblyError::Config(
                "overflow.input_width must be at least 1".to_string(),
            ));
        }
        if self.exhibits.first_page == 0 {
            return Err(AssemblyError::Config(
                "exhibits.first_page must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Overflow defaults applied to every document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverflowConfig {
    /// Appended to truncated values (default: empty)
    #[serde(default)]
    pub default_overflow_message: String,
    /// Characters per line of a typical text box (default: 80)
    #[serde(default = "default_input_width")]
    pub input_width: usize,
    #[serde(default)]
    pub preserve_newlines: bool,
    /// Cut at word boundaries instead of hard-truncating (default: false)
    #[serde(default)]
    pub preserve_words: bool,
}

impl Default for OverflowConfig {
    fn default() -> Self {
        Self {
            default_overflow_message: String::new(),
            input_width: default_input_width(),
            preserve_newlines: false,
            preserve_words: false,
        }
    }
}

impl OverflowConfig {
    pub fn options(&self) -> OverflowOptions {
        OverflowOptions {
            message: self.default_overflow_message.clone(),
            input_width: self.input_width,
            preserve_newlines: self.preserve_newlines,
            preserve_words: self.preserve_words,
        }
    }
}

/// Exhibit list defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExhibitConfig {
    #[serde(default = "default_true")]
    pub include_cover_pages: bool,
    #[serde(default = "default_true")]
    pub include_toc: bool,
    /// Bates-stamp the exhibit pages
    #[serde(default = "default_true")]
    pub add_page_numbers: bool,
    /// Number printed on the first page (default: 1)
    #[serde(default = "default_first_page")]
    pub first_page: u32,
    #[serde(default)]
    pub bates_prefix: String,
    /// Zero-pad page numbers to this width (default: no padding)
    #[serde(default)]
    pub digits: usize,
    #[serde(default)]
    pub label_style: LabelStyle,
}

impl Default for ExhibitConfig {
    fn default() -> Self {
        Self {
            include_cover_pages: true,
            include_toc: true,
            add_page_numbers: true,
            first_page: default_first_page(),
            bates_prefix: String::new(),
            digits: 0,
            label_style: LabelStyle::default(),
        }
    }
}

impl ExhibitConfig {
    pub fn options(&self) -> ExhibitOptions {
        ExhibitOptions {
            include_cover_pages: self.include_cover_pages,
            include_toc: self.include_toc,
            add_page_numbers: self.add_page_numbers,
            first_page: self.first_page,
            bates_prefix: self.bates_prefix.clone(),
            digits: self.digits,
            label_style: self.label_style,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleConfig {
    /// Put the editable DOCX original next to each PDF in zip downloads
    #[serde(default)]
    pub zip_include_original: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeopleConfig {
    /// Country addresses are assumed to be in (default: "US")
    #[serde(default = "default_country")]
    pub default_country: String,
    /// Shown in place of an impounded address or phone number
    #[serde(default = "default_impounded_label")]
    pub impounded_label: String,
}

impl Default for PeopleConfig {
    fn default() -> Self {
        Self {
            default_country: default_country(),
            impounded_label: default_impounded_label(),
        }
    }
}

impl PeopleConfig {
    pub fn address_style(&self) -> AddressStyle {
        AddressStyle {
            default_country: self.default_country.clone(),
            impounded_label: self.impounded_label.clone(),
            ..AddressStyle::default()
        }
    }
}

fn default_input_width() -> usize {
    80
}

fn default_true() -> bool {
    true
}

fn default_first_page() -> u32 {
    1
}

fn default_country() -> String {
    "US".to_string()
}

fn default_impounded_label() -> String {
    "(impounded)".to_string()
}

//! TOML manifest describing the documents, bundles and exhibits of one
//! interview
//!
//! ```toml
//! [[documents]]
//! name = "motion"
//! file = "motion.pdf"
//! title = "Motion to Dismiss"
//! addendum = true
//! overflow_fields = [{ field_name = "facts", overflow_trigger = 640, label = "Facts" }]
//!
//! [exhibits]
//! title = "Exhibits"
//! [[exhibits.items]]
//! title = "Lease"
//! files = ["lease.pdf"]
//!
//! [[bundles]]
//! name = "court"
//! title = "Court packet"
//! items = ["motion", "exhibits"]
//! ```
//!
//! Paths are relative to the manifest's directory. Bundles may include
//! documents, the exhibit list and bundles declared before them.

use anyhow::{bail, Context};
use assembly_line::{
    AddendumField, AddendumFields, AlDocument, AssemblyConfig, BundleSet, DocumentBundle, Enabled,
    Exhibit, ExhibitDocument, ExhibitList, ExhibitPage, PreRendered, StaticDocument, Untransformed,
};
use serde::{Deserialize, Serialize};
use shared_types::{Artifact, FileKind};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub documents: Vec<DocumentSpec>,
    #[serde(default)]
    pub bundles: Vec<BundleSpec>,
    pub exhibits: Option<ExhibitsSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSpec {
    pub name: String,
    /// Rendering used for every key unless `preview_file` is set
    pub file: PathBuf,
    /// Separate rendering for the "preview" key
    pub preview_file: Option<PathBuf>,
    /// PDF to fall back on when `file` cannot be converted
    pub pdf_file: Option<PathBuf>,
    pub title: Option<String>,
    /// Output name without extension; defaults to `name`
    pub filename: Option<String>,
    /// Answer that must be truthy for the document to be included
    pub enabled_if: Option<String>,
    #[serde(default)]
    pub addendum: bool,
    /// Hand the file out as-is, never converted or merged
    #[serde(default)]
    pub untransformed: bool,
    #[serde(default)]
    pub overflow_fields: Vec<AddendumField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleSpec {
    pub name: String,
    pub title: Option<String>,
    pub filename: Option<String>,
    pub enabled_if: Option<String>,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExhibitsSpec {
    #[serde(default = "default_exhibits_name")]
    pub name: String,
    #[serde(default = "default_exhibits_title")]
    pub title: String,
    #[serde(default)]
    pub items: Vec<ExhibitSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExhibitSpec {
    pub title: String,
    #[serde(default)]
    pub files: Vec<PathBuf>,
    /// Replaces the generated cover page
    pub cover: Option<PathBuf>,
}

fn default_exhibits_name() -> String {
    "exhibits".to_string()
}

fn default_exhibits_title() -> String {
    "Exhibits".to_string()
}

/// Everything a manifest describes, ready to render
#[derive(Debug)]
pub struct Assembly {
    pub documents: BTreeMap<String, Rc<AlDocument>>,
    pub bundles: BundleSet,
    pub exhibits: Option<Rc<RefCell<ExhibitList>>>,
}

impl Manifest {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        Self::from_str(&content)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse manifest")
    }

    /// Load every referenced file and wire documents into bundles
    pub fn build(&self, base: &Path, config: &AssemblyConfig) -> anyhow::Result<Assembly> {
        let mut documents = BTreeMap::new();
        for spec in &self.documents {
            let doc = spec.build(base, config)?;
            if documents.insert(spec.name.clone(), Rc::new(doc)).is_some() {
                bail!("Document '{}' is declared twice", spec.name);
            }
        }

        let exhibits = match &self.exhibits {
            Some(spec) => {
                let list = Rc::new(RefCell::new(spec.build(base, config)?));
                let doc = ExhibitDocument::document(
                    spec.name.clone(),
                    spec.name.clone(),
                    spec.title.clone(),
                    Rc::clone(&list),
                );
                if documents.insert(spec.name.clone(), Rc::new(doc)).is_some() {
                    bail!("Exhibit list '{}' clashes with a document name", spec.name);
                }
                Some(list)
            }
            None => None,
        };

        let mut bundles = BundleSet::new();
        for spec in &self.bundles {
            let mut bundle = DocumentBundle::new(
                spec.name.clone(),
                spec.filename.clone().unwrap_or_else(|| spec.name.clone()),
                spec.title.clone().unwrap_or_else(|| spec.name.clone()),
            );
            if let Some(field) = &spec.enabled_if {
                bundle = bundle.with_enabled(Enabled::field(field.clone()));
            }
            for item in &spec.items {
                bundle = match (documents.get(item), bundles.get(item)) {
                    (Some(doc), _) => bundle.with_document(Rc::clone(doc)),
                    (None, Ok(inner)) => bundle.with_bundle(Rc::clone(inner)),
                    (None, Err(_)) => bail!(
                        "Bundle '{}' refers to unknown item '{}'",
                        spec.name,
                        item
                    ),
                };
            }
            bundles.insert(Rc::new(bundle));
        }

        tracing::debug!(
            documents = documents.len(),
            bundles = bundles.len(),
            "built manifest"
        );
        Ok(Assembly {
            documents,
            bundles,
            exhibits,
        })
    }
}

impl DocumentSpec {
    fn build(&self, base: &Path, config: &AssemblyConfig) -> anyhow::Result<AlDocument> {
        let file = load(base, &self.file)?;
        let title = self.title.clone().unwrap_or_else(|| self.name.clone());
        let filename = self.filename.clone().unwrap_or_else(|| self.name.clone());

        let doc = if self.untransformed {
            AlDocument::new(self.name.clone(), filename, title, Untransformed::new(file))
        } else if self.preview_file.is_some() || self.pdf_file.is_some() {
            let preview = match &self.preview_file {
                Some(path) => load(base, path)?,
                None => file.clone(),
            };
            let mut source = PreRendered::new().with("final", file).with("preview", preview);
            if let Some(path) = &self.pdf_file {
                let pdf = load(base, path)?;
                source = source
                    .with_pdf_fallback("final", pdf.clone())
                    .with_pdf_fallback("preview", pdf);
            }
            AlDocument::new(self.name.clone(), filename, title, source)
        } else {
            AlDocument::new(self.name.clone(), filename, title, StaticDocument::new(file))
        };

        let mut doc = doc
            .has_addendum(self.addendum)
            .with_overflow_options(config.overflow.options())
            .with_overflow_fields(AddendumFields::from_list(self.overflow_fields.clone()));
        if let Some(field) = &self.enabled_if {
            doc = doc.with_enabled(Enabled::field(field.clone()));
        }
        Ok(doc)
    }
}

impl ExhibitsSpec {
    fn build(&self, base: &Path, config: &AssemblyConfig) -> anyhow::Result<ExhibitList> {
        let mut exhibits = Vec::with_capacity(self.items.len());
        for item in &self.items {
            let mut exhibit = Exhibit::new(item.title.clone());
            for path in &item.files {
                exhibit = exhibit.with_page(exhibit_page(load(base, path)?)?);
            }
            if let Some(path) = &item.cover {
                exhibit = exhibit.with_cover_page(exhibit_page(load(base, path)?)?);
            }
            exhibits.push(exhibit);
        }
        let mut list = ExhibitList::new(self.name.clone(), config.exhibits.options());
        list.gather(exhibits);
        Ok(list)
    }
}

/// PDFs report their own page count; anything else counts as one page
fn exhibit_page(file: Artifact) -> anyhow::Result<ExhibitPage> {
    if file.is_pdf() {
        let name = file.filename.clone();
        return ExhibitPage::from_pdf(file)
            .with_context(|| format!("Failed to count pages of {}", name));
    }
    Ok(ExhibitPage::with_page_count(file, 1))
}

fn load(base: &Path, path: &Path) -> anyhow::Result<Artifact> {
    let full = base.join(path);
    let bytes = fs::read(&full).with_context(|| format!("Failed to read {}", full.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let kind = FileKind::from_filename(&filename);
    Ok(Artifact::new(filename, kind, bytes))
}

//! Building blocks for legal document assembly
//!
//! - `overflow`: split long answers into what fits on a form and what goes to
//!   an addendum
//! - `document` / `bundle`: render documents with their addenda and combine
//!   them into merged PDFs, file lists, zip archives or emails
//! - `exhibits`: labeled, Bates-numbered exhibit lists with OCR
//! - `people` / `court`: structured parties, addresses and courts
//! - `text` / `listing`: small formatting helpers for templates and session lists
//!
//! Template rendering, office conversion, OCR and mail delivery belong to the
//! host application and are reached through the traits in `host`.

pub mod bundle;
pub mod config;
pub mod court;
pub mod document;
pub mod error;
pub mod exhibits;
pub mod host;
pub mod listing;
pub mod overflow;
pub mod people;
pub mod session;
pub mod text;

pub use bundle::{BundleItem, BundleSet, DocumentBundle};
pub use config::AssemblyConfig;
pub use court::Court;
pub use document::{
    AlDocument, DocumentSource, Enabled, FnSource, PreRendered, RenderRequest, StaticDocument,
    TextAddendum, Untransformed,
};
pub use error::{AssemblyError, Result};
pub use exhibits::{Exhibit, ExhibitDocument, ExhibitList, ExhibitOptions, ExhibitPage, LabelStyle};
pub use host::{
    EmailMessage, EmailTemplate, FormatConverter, Mailer, OcrJob, OcrService, PassthroughConverter,
};
pub use overflow::{AddendumField, AddendumFields, FieldStyle, OverflowOptions, OverflowTrigger};
pub use people::{Address, AddressStyle, Individual, IndividualName, PeopleList};
pub use session::{OutputFormat, Session};
pub use shared_types::{AnswerStore, Answers, Artifact, FileKind};

//! Services supplied by the hosting application
//!
//! Template rendering engines, office-format conversion, OCR and mail
//! delivery all live outside this crate. The assembly layer talks to them
//! through these traits.

use crate::error::{AssemblyError, Result};
use shared_types::Artifact;

/// Converts rendered files between formats
pub trait FormatConverter {
    /// Convert any supported file (DOCX, images) into a PDF
    fn to_pdf(&self, file: &Artifact) -> Result<Artifact>;

    /// Produce a PDF/A version of a PDF
    fn to_pdfa(&self, file: &Artifact) -> Result<Artifact>;
}

/// Converter for hosts without an office suite: PDFs pass through, everything
/// else is rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughConverter;

impl FormatConverter for PassthroughConverter {
    fn to_pdf(&self, file: &Artifact) -> Result<Artifact> {
        if file.is_pdf() {
            return Ok(file.clone());
        }
        Err(AssemblyError::Conversion(format!(
            "no converter available for {} ({})",
            file.filename,
            file.kind.mimetype()
        )))
    }

    fn to_pdfa(&self, file: &Artifact) -> Result<Artifact> {
        Err(AssemblyError::Conversion(format!(
            "PDF/A conversion of {} requires a host converter",
            file.filename
        )))
    }
}

/// A background OCR task for one file
pub trait OcrJob {
    fn ready(&self) -> bool;

    fn failed(&self) -> bool;

    /// The OCRed file, once the job finished successfully
    fn result(&self) -> Option<Artifact>;
}

/// Starts OCR jobs
pub trait OcrService {
    fn start(&self, file: &Artifact) -> Box<dyn OcrJob>;
}

/// Subject and body used when emailing a bundle
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct EmailTemplate {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<Artifact>,
}

pub trait Mailer {
    fn send(&self, message: &EmailMessage) -> Result<()>;
}

use pdf_compose::PdfComposeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error(transparent)]
    Pdf(#[from] PdfComposeError),

    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document '{document}' has no '{key}' rendering")]
    MissingRendering { document: String, key: String },

    #[error("Conversion failed: {0}")]
    Conversion(String),

    #[error("Email delivery failed: {0}")]
    Mail(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No bundle named '{0}'")]
    UnknownBundle(String),

    #[error("Exhibit list '{0}' has no exhibits")]
    NoExhibits(String),
}

pub type Result<T> = std::result::Result<T, AssemblyError>;

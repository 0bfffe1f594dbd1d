use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfComposeError {
    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("No documents to merge")]
    EmptyInput,

    #[error("PDF operation failed: {0}")]
    OperationError(String),
}

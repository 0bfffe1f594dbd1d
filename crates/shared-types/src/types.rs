use serde::{Deserialize, Serialize};

/// What kind of file an [`Artifact`] holds
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Docx,
    /// Anything else, carried by mimetype (e.g. "image/png")
    Other(String),
}

impl FileKind {
    /// Guess the kind from a filename extension
    pub fn from_filename(filename: &str) -> Self {
        let lower = filename.to_lowercase();
        if lower.ends_with(".pdf") {
            FileKind::Pdf
        } else if lower.ends_with(".docx") {
            FileKind::Docx
        } else if lower.ends_with(".zip") {
            FileKind::Other("application/zip".into())
        } else if lower.ends_with(".png") {
            FileKind::Other("image/png".into())
        } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
            FileKind::Other("image/jpeg".into())
        } else {
            FileKind::Other("application/octet-stream".into())
        }
    }

    pub fn mimetype(&self) -> &str {
        match self {
            FileKind::Pdf => "application/pdf",
            FileKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            FileKind::Other(mime) => mime,
        }
    }

    pub fn extension(&self) -> &str {
        match self {
            FileKind::Pdf => "pdf",
            FileKind::Docx => "docx",
            FileKind::Other(mime) => match mime.as_str() {
                "image/png" => "png",
                "image/jpeg" => "jpg",
                "application/zip" => "zip",
                _ => "bin",
            },
        }
    }
}

/// A rendered or uploaded file together with its display metadata.
///
/// Filename, title and kind can all be changed after the bytes exist, which
/// is how merged outputs get their bundle-level names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub filename: String,
    pub title: String,
    pub kind: FileKind,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(filename: impl Into<String>, kind: FileKind, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        Self {
            title: filename.clone(),
            filename,
            kind,
            bytes,
        }
    }

    pub fn pdf(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(filename, FileKind::Pdf, bytes)
    }

    pub fn docx(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(filename, FileKind::Docx, bytes)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn is_pdf(&self) -> bool {
        self.kind == FileKind::Pdf
    }

    pub fn is_docx(&self) -> bool {
        self.kind == FileKind::Docx
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Give a filename the `.{ext}` extension, replacing a `.pdf` or `.docx`
/// extension it already has
pub fn with_extension(filename: &str, ext: &str) -> String {
    let suffix = format!(".{}", ext);
    if has_suffix(filename, &suffix) {
        return filename.to_string();
    }
    let stem = [".pdf", ".docx"]
        .iter()
        .find(|known| has_suffix(filename, known))
        .map_or(filename, |known| &filename[..filename.len() - known.len()]);
    format!("{}{}", stem, suffix)
}

/// ASCII case-insensitive `ends_with`
fn has_suffix(name: &str, suffix: &str) -> bool {
    name.len()
        .checked_sub(suffix.len())
        .and_then(|start| name.get(start..))
        .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
}

//! Assemble CLI
//!
//! Renders the bundles described by a TOML manifest against a JSON answers
//! file:
//! - `render`: one merged PDF per bundle
//! - `zip`: the bundle's files as a zip archive
//! - `overflow`: show how each overflow field of a document splits
//! - `exhibits`: the stamped exhibit list with its table of contents

use anyhow::{bail, Context, Result};
use assembly_line::overflow::display_value;
use assembly_line::{Answers, AssemblyConfig, Session};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod manifest;

use manifest::{Assembly, Manifest};

#[derive(Parser, Debug)]
#[command(name = "assemble")]
#[command(version, about = "Assemble court documents from a manifest and interview answers")]
struct Cli {
    /// Assembly settings (overflow, exhibits, bundles) in TOML
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct Input {
    /// Manifest listing documents, bundles and exhibits
    #[arg(short, long)]
    manifest: PathBuf,

    /// Interview answers as a JSON object
    #[arg(short, long)]
    answers: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Merge a bundle into one PDF
    Render {
        #[command(flatten)]
        input: Input,
        #[arg(short, long)]
        bundle: String,
        /// Rendering key, e.g. "final" or "preview"
        #[arg(short, long, default_value = "final")]
        key: String,
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Write a bundle's files into a zip archive
    Zip {
        #[command(flatten)]
        input: Input,
        #[arg(short, long)]
        bundle: String,
        #[arg(short, long, default_value = "final")]
        key: String,
        /// Also include editable DOCX originals
        #[arg(long)]
        originals: bool,
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Print the safe and overflow parts of a document's fields
    Overflow {
        #[command(flatten)]
        input: Input,
        #[arg(short, long)]
        document: String,
    },
    /// Write the exhibit list as one stamped PDF
    Exhibits {
        #[command(flatten)]
        input: Input,
        #[arg(short, long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr so `overflow` output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("assemble_cli=info".parse()?)
                .add_directive("assembly_line=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => AssemblyConfig::from_file(path)?,
        None => AssemblyConfig::default(),
    };

    match cli.command {
        Command::Render {
            input,
            bundle,
            key,
            out,
        } => {
            let (assembly, mut session) = load(&input, &config)?;
            let bundle = assembly.bundles.get(&bundle)?;
            match bundle.as_pdf(&mut session, &key, false)? {
                Some(pdf) => write(&out, &pdf.bytes)?,
                None => bail!("Bundle '{}' has no enabled documents", bundle.name()),
            }
        }
        Command::Zip {
            input,
            bundle,
            key,
            originals,
            out,
        } => {
            let (assembly, mut session) = load(&input, &config)?;
            let include_original = originals || config.bundle.zip_include_original;
            let archive = assembly
                .bundles
                .get(&bundle)?
                .as_zip(&mut session, &key, include_original, false)?;
            write(&out, &archive.bytes)?;
        }
        Command::Overflow { input, document } => {
            let (assembly, session) = load(&input, &config)?;
            let doc = assembly
                .documents
                .get(&document)
                .with_context(|| format!("No document named '{}'", document))?;
            let answers = session.answers();
            for field in doc.overflow_fields().iter() {
                let safe = field.safe_value(answers, doc.overflow_options());
                let overflow = field.overflow_value(answers, doc.overflow_options());
                println!("{}", field.field_name);
                println!("  safe:     {}", display_value(&safe));
                println!("  overflow: {}", display_value(&overflow));
            }
            if doc.need_addendum(answers) {
                println!("addendum required");
            }
        }
        Command::Exhibits { input, out } => {
            let (assembly, session) = load(&input, &config)?;
            let list = assembly
                .exhibits
                .context("Manifest has no [exhibits] section")?;
            let list = list.borrow();
            for entry in list.table_of_contents() {
                println!("{}\t{}\t{}", entry.label, entry.start_page, entry.title);
            }
            match list.as_pdf(&session)? {
                Some(pdf) => write(&out, &pdf.bytes)?,
                None => bail!("Exhibit list '{}' is empty", list.name()),
            }
        }
    }

    Ok(())
}

fn load(input: &Input, config: &AssemblyConfig) -> Result<(Assembly, Session)> {
    let manifest = Manifest::from_file(&input.manifest)?;
    let base = input.manifest.parent().unwrap_or_else(|| Path::new("."));
    let assembly = manifest.build(base, config)?;

    let answers = match &input.answers {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read answers: {}", path.display()))?;
            Answers::from_json(&json).context("Answers must be a JSON object")?
        }
        None => Answers::new(),
    };
    info!(
        manifest = %input.manifest.display(),
        answers = answers.len(),
        "loaded interview"
    );
    Ok((assembly, Session::new(answers)))
}

fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), "wrote output");
    Ok(())
}

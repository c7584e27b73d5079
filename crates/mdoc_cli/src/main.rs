use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mdoc_core::OutputFormat;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mdoc")]
#[command(about = "Convert Markdown files to PDF or DOCX")]
struct Cli {
    /// Input Markdown file
    input: PathBuf,

    /// Output file (defaults to input name with the format's extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: pdf or docx (defaults to the output extension, else pdf)
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Print the intermediate Typst markup instead of writing a file
    #[arg(long)]
    typst: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let markdown = fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;

    if cli.typst {
        print!("{}", mdoc_core::markdown_to_typst(&markdown));
        return Ok(());
    }

    let format = cli
        .format
        .or_else(|| cli.output.as_deref().and_then(OutputFormat::from_path))
        .unwrap_or(OutputFormat::Pdf);

    let output = cli
        .output
        .unwrap_or_else(|| cli.input.with_extension(format.extension()));

    let doc = mdoc_core::render(&markdown, format)?;

    fs::write(&output, &doc.bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("Created {} ({} bytes)", output.display(), doc.len());
    Ok(())
}

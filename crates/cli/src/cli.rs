use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Ask questions about a folder of PDFs using a local Ollama server.
///
/// Without a command, starts an interactive question loop (building the
/// index first if none exists).
#[derive(Parser, Debug)]
#[command(name = "pdfrag", version, about)]
pub struct CliArgs {
    /// Chunk size in tokens, used when the index has to be built
    #[arg(long, global = true)]
    pub chunk_size: Option<usize>,

    /// Overlap between adjacent chunks in tokens
    #[arg(long, global = true)]
    pub chunk_overlap: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Build (or rebuild) the index from the PDF directory
    Index {
        /// Directory to read PDFs from (default: PDF_DIR)
        #[arg(long)]
        pdf_dir: Option<PathBuf>,
    },
    /// Show whether Ollama is running and the required models are installed
    Status,
    /// Serve the JSON HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

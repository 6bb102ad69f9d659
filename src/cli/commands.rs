// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Defines the `ask`, `retrieve` and `interactive` subcommands
// and the flags they share.
//
// Shared flags are grouped into two `#[command(flatten)]`
// structs so every subcommand accepts the same artifact paths
// and pipeline knobs.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::config::AskConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer one question and print the answer with its section
    Ask(AskArgs),

    /// Print the sections that would be read for a question
    Retrieve(RetrieveArgs),

    /// Read questions from stdin until EOF or `exit`
    Interactive(PipelineArgs),
}

/// Where the prebuilt artifacts live.
#[derive(Args, Debug, Clone)]
pub struct ArtifactArgs {
    /// SQLite database with a `documents(id, text)` table
    #[arg(long = "db", default_value = "data/intro_to_nutrition/health.db")]
    pub db_path: PathBuf,

    /// CSR term matrix (JSON)
    #[arg(long = "matrix", default_value = "data/intro_to_nutrition/health_matrix.json")]
    pub matrix_path: PathBuf,

    /// Fitted TF-IDF vectorizer (JSON)
    #[arg(long = "vectorizer", default_value = "data/intro_to_nutrition/health_vectorizer.json")]
    pub vectorizer_path: PathBuf,

    /// Directory with tokenizer.json, model_config.json and model.mpk.gz
    #[arg(long, default_value = "models/base")]
    pub model_dir: PathBuf,
}

/// Retrieval and encoding knobs.
#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    #[command(flatten)]
    pub artifacts: ArtifactArgs,

    /// Maximum number of sections handed to the span model
    #[arg(long, default_value_t = 5)]
    pub top_k: usize,

    /// Normalised score mass after which section selection stops
    #[arg(long, default_value_t = 0.6)]
    pub coverage: f64,

    /// Token budget per (section, question) sequence
    #[arg(long, default_value_t = 512)]
    pub max_seq_len: usize,

    /// Pad rows at the front instead of the end
    #[arg(long)]
    pub pad_first: bool,
}

#[derive(Args, Debug)]
pub struct AskArgs {
    /// The natural language question to answer
    #[arg(long)]
    pub question: String,

    /// Print the answer as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

#[derive(Args, Debug)]
pub struct RetrieveArgs {
    /// The question to retrieve sections for
    #[arg(long)]
    pub question: String,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

/// The application layer never sees clap types.
impl From<PipelineArgs> for AskConfig {
    fn from(a: PipelineArgs) -> Self {
        AskConfig {
            db_path:         a.artifacts.db_path,
            matrix_path:     a.artifacts.matrix_path,
            vectorizer_path: a.artifacts.vectorizer_path,
            model_dir:       a.artifacts.model_dir,
            top_k:           a.top_k,
            coverage:        a.coverage,
            max_seq_len:     a.max_seq_len,
            pad_first:       a.pad_first,
            ..AskConfig::default()
        }
    }
}

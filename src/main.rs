//! # findoc CLI
//!
//! Command-line front end for financial document Q&A.
//!
//! ## Usage
//!
//! ```bash
//! findoc [--config ./config/findoc.toml] [-v] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `findoc models` | List models served by the local endpoint |
//! | `findoc extract <file>` | Print the normalized document text |
//! | `findoc metrics <file>` | Print extracted financial metrics |
//! | `findoc tables <file>` | Print sheet dimensions and column statistics |
//! | `findoc ask <file> "<question>"` | Answer one question about a document |
//! | `findoc chat [<file>]` | Interactive session |
//!
//! ## Examples
//!
//! ```bash
//! findoc metrics statements/q3.pdf --json
//! findoc ask statements/q3.xlsx "What is the net income?" --model llama3.2
//! findoc chat statements/q3.pdf
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use findoc_qa::chat::{load_and_report, run_chat};
use findoc_qa::client::{discover_models, ModelBackend, OllamaClient};
use findoc_qa::config::{self, Config};
use findoc_qa::report;
use findoc_qa::session::{LoadedDocument, Session};
use findoc_qa::upload::Upload;

const DEFAULT_CONFIG_PATH: &str = "./config/findoc.toml";

/// findoc: ask questions about financial PDFs and spreadsheets using a local
/// language model.
#[derive(Parser)]
#[command(
    name = "findoc",
    about = "Financial document Q&A with a local language model",
    version,
    long_about = "Extracts text and headline metrics (revenue, net income, assets, liabilities, \
    cash, expenses) from PDF and Excel documents and answers questions about them using a \
    locally running Ollama model."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/findoc.toml`; built-in defaults apply when that
    /// file does not exist.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List models available on the model-serving endpoint.
    Models,

    /// Print the normalized text extracted from a document.
    Extract {
        /// PDF or Excel file (.pdf, .xlsx, .xls).
        file: PathBuf,
    },

    /// Print the financial metrics found in a document.
    Metrics {
        /// PDF or Excel file (.pdf, .xlsx, .xls).
        file: PathBuf,

        /// Emit the metric set as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print sheet dimensions and numeric column statistics of a spreadsheet.
    Tables {
        /// Excel file (.xlsx, .xls).
        file: PathBuf,
    },

    /// Answer a single question about a document.
    Ask {
        /// PDF or Excel file (.pdf, .xlsx, .xls).
        file: PathBuf,

        /// The question to ask.
        question: String,

        /// Model to use. Defaults to `model.default_model`, then the first
        /// model the endpoint reports.
        #[arg(long)]
        model: Option<String>,
    },

    /// Start an interactive question-and-answer session.
    Chat {
        /// Document to load at startup.
        file: Option<PathBuf>,

        /// Model to use.
        #[arg(long)]
        model: Option<String>,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "error",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => config::load_config(path),
        None => config::load_or_default(Path::new(DEFAULT_CONFIG_PATH)),
    }
}

/// Load `file` into `session`; a decode failure is fatal for one-shot commands.
fn load_document<'a>(
    session: &'a mut Session,
    file: &Path,
    cfg: &Config,
) -> Result<&'a LoadedDocument> {
    let upload = Upload::from_path(file, cfg.upload.max_bytes)?;
    let doc = session
        .load_document(&upload)
        .with_context(|| format!("failed to process {}", file.display()))?;
    Ok(doc)
}

/// Discover models and apply the requested (or configured) selection.
fn select_model(
    session: &mut Session,
    backend: &dyn ModelBackend,
    requested: Option<String>,
    cfg: &Config,
) -> Result<()> {
    let (models, failure) = discover_models(backend);
    if let Some(e) = failure {
        eprintln!("{}", e.discovery_message());
    }
    session.set_available_models(models);

    if let Some(name) = requested {
        session.select_model(&name)?;
    } else if let Some(name) = &cfg.model.default_model {
        if let Err(e) = session.select_model(name) {
            tracing::warn!("configured default model not usable: {}", e);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = load_config(cli.config.as_deref())?;
    let mut session = Session::new().with_sample_rows(cfg.extract.sample_rows);

    match cli.command {
        Commands::Models => {
            let client = OllamaClient::from_config(&cfg.model)?;
            match client.list_models() {
                Ok(models) if models.is_empty() => {
                    eprintln!("No Ollama models available. Please install and run a model.");
                }
                Ok(models) => {
                    for name in models {
                        println!("{}", name);
                    }
                }
                Err(e) => bail!("{}", e.discovery_message()),
            }
        }
        Commands::Extract { file } => {
            let doc = load_document(&mut session, &file, &cfg)?;
            print!("{}", doc.content);
        }
        Commands::Metrics { file, json } => {
            let doc = load_document(&mut session, &file, &cfg)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&doc.metrics)?);
            } else {
                print!("{}", report::document_info(doc));
                print!("{}", report::metrics_panel(&doc.metrics));
            }
        }
        Commands::Tables { file } => {
            let doc = load_document(&mut session, &file, &cfg)?;
            print!("{}", report::tables_view(&doc.tables));
        }
        Commands::Ask {
            file,
            question,
            model,
        } => {
            let client = OllamaClient::from_config(&cfg.model)?;
            load_document(&mut session, &file, &cfg)?;
            select_model(&mut session, &client, model, &cfg)?;
            let turn = session.ask(&client, &question)?;
            println!("{}", turn.text);
        }
        Commands::Chat { file, model } => {
            let client = OllamaClient::from_config(&cfg.model)?;
            if let Err(e) = select_model(&mut session, &client, model, &cfg) {
                eprintln!("{}", e);
            }
            if let Some(file) = file {
                load_and_report(&mut session, &file, cfg.upload.max_bytes);
            }
            run_chat(&mut session, &client, cfg.upload.max_bytes)?;
        }
    }

    Ok(())
}

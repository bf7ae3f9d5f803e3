//! Interactive chat loop over a [`Session`].
//!
//! Lines starting with `/` are commands; anything else is a question about
//! the loaded document.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

use crate::client::{discover_models, ModelBackend};
use crate::report;
use crate::session::{Session, QUICK_QUESTIONS};
use crate::upload::Upload;

const HELP: &str = "\
Commands:
  /load <path>    load a PDF or Excel document (.pdf, .xlsx, .xls)
  /metrics        show extracted financial metrics
  /tables         show spreadsheet sheets and column statistics
  /models         refresh and list available models
  /model <name>   select a model
  /quick <1-3>    ask a quick question
  /history        show the conversation
  /clear          clear the conversation history
  /help           show this help
  /quit           leave
Anything else is sent as a question about the document.";

#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    Load(PathBuf),
    Metrics,
    Tables,
    Models,
    Model(String),
    Quick(usize),
    History,
    Clear,
    Help,
    Quit,
    Ask(String),
    Empty,
    Invalid(String),
}

impl ChatCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ChatCommand::Empty;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return ChatCommand::Ask(line.to_string());
        };

        let (cmd, arg) = match rest.split_once(char::is_whitespace) {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (rest, ""),
        };

        match (cmd, arg) {
            ("load", "") => ChatCommand::Invalid("usage: /load <path>".into()),
            ("load", path) => ChatCommand::Load(PathBuf::from(path)),
            ("metrics", _) => ChatCommand::Metrics,
            ("tables", _) => ChatCommand::Tables,
            ("models", _) => ChatCommand::Models,
            ("model", "") => ChatCommand::Invalid("usage: /model <name>".into()),
            ("model", name) => ChatCommand::Model(name.to_string()),
            ("quick", n) => match n.parse::<usize>() {
                Ok(n) if (1..=QUICK_QUESTIONS.len()).contains(&n) => ChatCommand::Quick(n - 1),
                _ => ChatCommand::Invalid(format!(
                    "usage: /quick <1-{}>",
                    QUICK_QUESTIONS.len()
                )),
            },
            ("history", _) => ChatCommand::History,
            ("clear", _) => ChatCommand::Clear,
            ("help", _) => ChatCommand::Help,
            ("quit", _) | ("exit", _) => ChatCommand::Quit,
            (other, _) => ChatCommand::Invalid(format!("unknown command: /{}", other)),
        }
    }
}

/// Load `path` into the session and print what was found.
pub fn load_and_report(session: &mut Session, path: &std::path::Path, max_bytes: u64) {
    let upload = match Upload::from_path(path, max_bytes) {
        Ok(upload) => upload,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };
    match session.load_document(&upload) {
        Ok(doc) => {
            println!("Document processed successfully!");
            print!("{}", report::document_info(doc));
            print!("{}", report::metrics_panel(&doc.metrics));
        }
        Err(e) => eprintln!("{}", e),
    }
}

fn ask_and_print(session: &mut Session, backend: &dyn ModelBackend, question: &str) {
    match session.ask(backend, question) {
        Ok(turn) => println!("{}\n", turn.text),
        Err(e) => eprintln!("{}", e),
    }
}

/// Run the read-eval loop until `/quit` or end of input.
pub fn run_chat(session: &mut Session, backend: &dyn ModelBackend, max_bytes: u64) -> Result<()> {
    let mut editor = DefaultEditor::new()?;

    match session.model() {
        Some(model) => println!("Using model: {}", model),
        None => eprintln!("No Ollama models available. Please install and run a model."),
    }
    if !session.has_content() {
        println!("Load a financial document with /load <path> to get started. /help lists commands.");
    }

    loop {
        let line = match editor.readline("findoc> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        if !line.trim().is_empty() {
            editor.add_history_entry(line.as_str())?;
        }

        match ChatCommand::parse(&line) {
            ChatCommand::Empty => {}
            ChatCommand::Load(path) => load_and_report(session, &path, max_bytes),
            ChatCommand::Metrics => match session.document() {
                Some(doc) => print!("{}", report::metrics_panel(&doc.metrics)),
                None => eprintln!("No document loaded."),
            },
            ChatCommand::Tables => match session.document() {
                Some(doc) => print!("{}", report::tables_view(&doc.tables)),
                None => eprintln!("No document loaded."),
            },
            ChatCommand::Models => {
                let (models, failure) = discover_models(backend);
                session.set_available_models(models);
                match failure {
                    Some(e) => eprintln!("{}", e.discovery_message()),
                    None if session.available_models().is_empty() => {
                        eprintln!("No Ollama models available. Please install and run a model.")
                    }
                    None => {}
                }
                for name in session.available_models() {
                    let marker = if Some(name.as_str()) == session.model() {
                        "*"
                    } else {
                        " "
                    };
                    println!("{} {}", marker, name);
                }
            }
            ChatCommand::Model(name) => match session.select_model(&name) {
                Ok(()) => println!("Using model: {}", name),
                Err(e) => eprintln!("{}", e),
            },
            ChatCommand::Quick(idx) => {
                let question = QUICK_QUESTIONS[idx];
                println!("{}", question);
                ask_and_print(session, backend, question);
            }
            ChatCommand::History => print!("{}", report::history(session.conversation())),
            ChatCommand::Clear => {
                session.clear_history();
                println!("Chat history cleared.");
            }
            ChatCommand::Help => println!("{}", HELP),
            ChatCommand::Quit => break,
            ChatCommand::Ask(question) => ask_and_print(session, backend, &question),
            ChatCommand::Invalid(msg) => eprintln!("{}", msg),
        }
    }

    Ok(())
}

use crate::conversation::Conversation;
use crate::model::{ClientConfig, Message, Origin};
use crate::service::{HttpYamlService, YamlService};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
#[derive(Debug, PartialEq)]
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
///
/// The std handles are locked per line: the stderr tracing subscriber writes to the same
/// handle and would block forever behind a lock held for the writer's lifetime.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(std::io::stdout(), "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(std::io::stderr(), "{}", msg);
                }
            }
        }

        let _ = std::io::stdout().flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "spheron-yaml",
    version,
    about = "Chat with a YAML generation service to build Spheron deployment configs"
)]
pub struct Cli {
    /// Base URL of the YAML generation service
    #[arg(long, default_value = "http://localhost:5000")]
    pub base_url: String,

    /// Per-request timeout (e.g. 30s); requests never time out by default
    #[arg(long)]
    pub timeout: Option<humantime::Duration>,

    /// Send this message without the TUI (repeat to refine in order)
    #[arg(long, value_name = "TEXT")]
    pub prompt: Vec<String>,

    /// Print the final YAML, validation and transcript as JSON (requires --prompt)
    #[arg(long)]
    pub json: bool,

    /// Also write the final YAML to this file (requires --prompt)
    #[arg(long, value_name = "PATH")]
    pub output: Option<std::path::PathBuf>,

    /// Log file for TUI mode (default: local data dir)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<std::path::PathBuf>,
}

pub async fn run(args: Cli) -> Result<()> {
    if args.prompt.is_empty() {
        if args.json {
            return Err(anyhow::anyhow!(
                "--json needs at least one --prompt. Use --prompt \"...\" --json together."
            ));
        }
        if args.output.is_some() {
            return Err(anyhow::anyhow!(
                "--output needs at least one --prompt; in the TUI use Ctrl-S to save."
            ));
        }
    }

    if args.prompt.is_empty() {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(args).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            return Err(anyhow::anyhow!(
                "built without TUI support; pass one or more --prompt messages"
            ));
        }
    }

    run_text(args).await
}

/// Build a `ClientConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> ClientConfig {
    ClientConfig {
        base_url: args.base_url.clone(),
        user_agent: format!("spheron-yaml-cli/{}", env!("CARGO_PKG_VERSION")),
        timeout: args.timeout.map(Duration::from),
    }
}

fn transcript_line(msg: &Message) -> String {
    match msg.origin {
        Origin::User => format!("> {}", msg.text),
        Origin::System => format!("< {}", msg.text),
    }
}

/// Submit each prompt in order, echoing new transcript entries to stderr.
async fn run_prompts<S: YamlService + ?Sized>(
    service: &S,
    prompts: &[String],
    out_tx: &mpsc::UnboundedSender<OutputLine>,
) -> Conversation {
    let mut conversation = Conversation::new();
    for prompt in prompts {
        let seen = conversation.transcript().len();
        if !conversation.submit(service, prompt).await {
            let _ = out_tx.send(OutputLine::Stderr(format!(
                "Skipping empty prompt {:?}",
                prompt
            )));
            continue;
        }
        for msg in &conversation.transcript()[seen..] {
            let _ = out_tx.send(OutputLine::Stderr(transcript_line(msg)));
        }
    }
    conversation
}

async fn run_text(args: Cli) -> Result<()> {
    if let Err(e) = crate::logging::init_stderr() {
        eprintln!("warning: logging disabled: {e:#}");
    }
    let cfg = build_config(&args);
    let service = HttpYamlService::new(&cfg)?;
    let (out_tx, out_handle) = spawn_output_writer();

    let res = text_session(&args, &service, &out_tx).await;

    drop(out_tx);
    let _ = out_handle.await;
    res
}

/// Run the prompts and report the result; fails when the export or the last request failed.
async fn text_session<S: YamlService + ?Sized>(
    args: &Cli,
    service: &S,
    out_tx: &mpsc::UnboundedSender<OutputLine>,
) -> Result<()> {
    let conversation = run_prompts(service, &args.prompt, out_tx).await;

    if args.json {
        let out = serde_json::to_string_pretty(&conversation.snapshot())?;
        let _ = out_tx.send(OutputLine::Stdout(out));
    } else if !conversation.document().is_empty() {
        let _ = out_tx.send(OutputLine::Stdout(
            conversation.document().trim_end_matches('\n').to_string(),
        ));
        let v = conversation.validation();
        if v.valid {
            let _ = out_tx.send(OutputLine::Stderr("Validation: valid".into()));
        } else {
            let _ = out_tx.send(OutputLine::Stderr("Validation: issues found".into()));
            for e in &v.errors {
                let _ = out_tx.send(OutputLine::Stderr(format!("  - {e}")));
            }
        }
    }

    if let Some(p) = args.output.as_deref() {
        if conversation.document().is_empty() {
            let _ = out_tx.send(OutputLine::Stderr(
                "No YAML was produced; nothing written".into(),
            ));
        } else {
            crate::export::write_yaml(p, conversation.document())?;
            let _ = out_tx.send(OutputLine::Stderr(format!("Saved: {}", p.display())));
        }
    }

    if let Some(e) = conversation.last_failure() {
        return Err(anyhow::anyhow!("{e}")).context("last request failed");
    }
    Ok(())
}

//! zcalc: a scientific calculator for the terminal.

mod calculator;
mod config;
mod keypad;
mod ui;

use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use calculator::{AngleMode, Backend, ExpressionEngine, LastResult, copy_to_clipboard};
use config::Config;
use keypad::Keypad;
use ui::CalculatorView;

#[derive(Parser, Debug)]
#[command(name = "zcalc", version, about = "A scientific calculator for the terminal")]
struct Cli {
    /// Path to the config file (defaults to ~/.config/zcalc/config.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Interpret trigonometric arguments as degrees.
    #[arg(long)]
    degrees: bool,

    /// Expression evaluator to use.
    #[arg(long, value_enum)]
    backend: Option<Backend>,

    /// Print the one-shot result as JSON.
    #[arg(long)]
    json: bool,

    /// Evaluate this expression and exit instead of starting the keypad.
    expression: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("failed to load config")?;

    let backend = cli.backend.unwrap_or(config.backend);
    let angle_mode = if cli.degrees {
        AngleMode::Degrees
    } else {
        config.angle_mode
    };
    let engine = ExpressionEngine::new(backend.create()).with_angle_mode(angle_mode);

    if !cli.expression.is_empty() {
        let result = evaluate_once(engine, &cli.expression.join(" "), cli.json);
        return Ok(if result.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let keypad = Keypad::new(&config.keys).context("invalid keypad configuration")?;
    info!(%backend, %angle_mode, keys = keypad.len(), "starting keypad");

    let view = CalculatorView::new(engine, keypad)
        .with_theme(config.theme)
        .with_history_visible(config.show_history);
    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    run_repl(view).await?;
    Ok(ExitCode::SUCCESS)
}

/// Evaluate a single expression given on the command line.
fn evaluate_once(mut engine: ExpressionEngine, expression: &str, json: bool) -> LastResult {
    engine.append_token(expression);
    let result = engine.evaluate().result;

    if json {
        let output = serde_json::json!({
            "expression": expression,
            "result": result.clipboard(),
            "display": result.display(),
        });
        println!("{}", output);
    } else {
        println!("{}", result.display());
    }
    result
}

/// Commands available in the keypad loop, entered with a leading ':'.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ReplCommand {
    Help,
    Theme,
    History,
    Keys,
    Copy,
    Export,
    Quit,
}

impl FromStr for ReplCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "help" | "h" => Ok(Self::Help),
            "theme" => Ok(Self::Theme),
            "history" => Ok(Self::History),
            "keys" => Ok(Self::Keys),
            "copy" => Ok(Self::Copy),
            "export" => Ok(Self::Export),
            "quit" | "q" => Ok(Self::Quit),
            other => Err(format!("unknown command :{}", other)),
        }
    }
}

const HELP: &str = "\
Type keypad labels or expression text separated by spaces, e.g. `sin 3 0 ) =`.
Commands:
  :keys     show the keypad
  :history  toggle the history list
  :theme    switch between dark and light
  :copy     copy the result to the clipboard
  :export   print the history as JSON
  :quit     exit
";

async fn run_repl(mut view: CalculatorView) -> Result<()> {
    let mut stdout = std::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    write!(stdout, "{}", view.render_keys())?;
    stdout.flush()?;

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix(':') {
            match command.parse::<ReplCommand>() {
                Ok(ReplCommand::Quit) => break,
                Ok(command) => run_command(&mut view, command, &mut stdout)?,
                Err(message) => writeln!(stdout, "{}", message)?,
            }
        } else {
            for word in line.split_whitespace() {
                view.input(word);
            }
        }

        write!(stdout, "{}", view.render())?;
        stdout.flush()?;
    }

    Ok(())
}

fn run_command(
    view: &mut CalculatorView,
    command: ReplCommand,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        ReplCommand::Help => write!(out, "{}", HELP)?,
        ReplCommand::Theme => view.toggle_theme(),
        ReplCommand::History => view.toggle_history(),
        ReplCommand::Keys => write!(out, "{}", view.render_keys())?,
        ReplCommand::Copy => {
            let engine = view.engine();
            let text = engine
                .last_result()
                .and_then(|result| result.clipboard())
                .unwrap_or_else(|| engine.input().to_string());
            match copy_to_clipboard(&text) {
                Ok(()) => writeln!(out, "copied {}", text)?,
                Err(e) => {
                    warn!(error = %e, "clipboard copy failed");
                    writeln!(out, "{}", e)?;
                }
            }
        }
        ReplCommand::Export => {
            let history = view.engine().history();
            let json = history.to_json().context("failed to serialize history")?;
            debug!(entries = history.len(), "exporting history");
            writeln!(out, "{}", json)?;
        }
        ReplCommand::Quit => {}
    }
    Ok(())
}

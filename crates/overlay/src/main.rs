//! Command-line entry point for the overlay shortcut core.
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process,
};

use clap::{Parser, Subcommand};
use config::{Config, excerpt_at, resolve_config_path};
use keycombo::{KeyCombo, Platform};
use ron::error::SpannedError;
use tokio::runtime::Builder;
use tracing::{debug, error};

/// Scripted sessions against a mock backend.
mod replay;

use crate::replay::Script;

#[derive(Parser, Debug)]
#[command(
    name = "overlay",
    about = "Inspect shortcut configuration and replay shortcut sessions",
    version
)]
/// Command-line interface for the `overlay` binary.
struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,

    /// Logging controls
    #[command(flatten)]
    log: logging::LogArgs,

    /// Optional path to the config file
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
/// Top-level CLI subcommands.
enum Command {
    /// Load and validate the configuration then exit.
    Check {
        /// Path to configuration file to check (defaults to ~/.overlay/config.ron)
        path: Option<PathBuf>,

        /// Dump the resolved configuration as JSON to stdout
        #[arg(long)]
        dump: bool,
    },
    /// List the effective bindings for a platform.
    Bindings {
        /// Target platform (macos|windows|linux); defaults to the current one
        #[arg(long)]
        platform: Option<Platform>,
    },
    /// Parse a key combination and print its normalized forms.
    Validate {
        /// Key combination, e.g. "cmd+shift+s"
        combo: String,
    },
    /// Run a scripted session through the dispatcher and a mock host.
    Replay {
        /// Path to a RON replay script
        script: PathBuf,
    },
}

/// Load the configuration or exit with a rendered error.
fn load_config(explicit: Option<&Path>) -> Config {
    match config::load(explicit) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}", e.pretty());
            process::exit(1);
        }
    }
}

/// `overlay check`.
fn check(explicit: Option<&Path>, dump: bool) {
    match resolve_config_path(explicit) {
        Ok(Some(p)) => debug!(path = %p.display(), "checking config"),
        Ok(None) => debug!("no config file; checking built-in defaults"),
        Err(e) => {
            eprintln!("{}", e.pretty());
            process::exit(1);
        }
    }
    let cfg = load_config(explicit);
    if !dump {
        println!("OK");
        return;
    }
    match serde_json::to_string_pretty(&cfg) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Failed to serialize config: {e}");
            process::exit(1);
        }
    }
}

/// `overlay bindings`.
fn bindings(cfg: &Config, platform: Platform) {
    let shortcuts = cfg.shortcuts_config(platform);
    let width = shortcuts
        .bindings
        .keys()
        .map(|a| a.as_str().len())
        .max()
        .unwrap_or(0);
    println!("# {platform}");
    for (action, binding) in &shortcuts.bindings {
        let key = if binding.key.is_empty() {
            "-"
        } else {
            binding.key.as_str()
        };
        let marker = if binding.enabled { "" } else { "  (disabled)" };
        println!("{:<width$}  {key}{marker}", action.as_str());
    }
}

/// `overlay validate`.
fn validate(combo: &str) {
    match KeyCombo::parse(combo) {
        Ok(kc) => {
            println!("{}", kc.to_string_canonical());
            for platform in Platform::ALL {
                println!("  {:<8} {}", platform.name(), kc.to_platform_string(platform));
            }
        }
        Err(e) => {
            eprintln!("invalid shortcut '{combo}': {e}");
            process::exit(1);
        }
    }
}

/// Render a script syntax error with its location and an excerpt.
fn script_error(err: &SpannedError, source: &str, path: &Path) -> String {
    let line = err.span.start.line.max(1);
    let col = err.span.start.col.max(1);
    format!(
        "Replay script parse error at {}:{}:{}\n{}\n{}",
        path.display(),
        line,
        col,
        err.code,
        excerpt_at(source, line, col)
    )
}

/// `overlay replay`.
fn replay(cfg: &Config, path: &Path) {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Read error at {}: {e}", path.display());
            process::exit(1);
        }
    };
    let script = match Script::from_ron(&text) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", script_error(&e, &text, path));
            process::exit(1);
        }
    };
    let rt = match Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!("failed to start runtime: {e}");
            process::exit(1);
        }
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = rt.block_on(replay::run(cfg, &script, &mut out)) {
        error!("replay output failed: {e}");
        process::exit(1);
    }
    out.flush().ok();
}

fn main() {
    let cli = Cli::parse();
    logging::init(&cli.log);

    match &cli.command {
        Command::Check { path, dump } => {
            let explicit = path.as_deref().or(cli.config.as_deref());
            check(explicit, *dump);
        }
        Command::Bindings { platform } => {
            let cfg = load_config(cli.config.as_deref());
            bindings(&cfg, platform.unwrap_or_else(Platform::current));
        }
        Command::Validate { combo } => validate(combo),
        Command::Replay { script } => {
            let cfg = load_config(cli.config.as_deref());
            replay(&cfg, script);
        }
    }
}

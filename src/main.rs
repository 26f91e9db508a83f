//! sweb - entry point.

use clap::Parser;
use std::path::PathBuf;
use sweb::config::{ControlPreset, ControlScheme};
use sweb::fetch::Fetcher;
use sweb::view::{SessionEnd, TuiApp};
use tracing::info;

/// A small text-mode web browser
#[derive(Parser, Debug)]
#[command(name = "sweb")]
#[command(version)]
#[command(about = "Browse the web from the terminal")]
pub struct Args {
    /// Reference (URL) to open on startup; prompts when omitted
    pub reference: Option<String>,

    /// Control scheme preset (vim, nano or emacs)
    #[arg(long)]
    pub controls: Option<String>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Defaults, then the config file, then CLI flags.
    let config = {
        let config_file = sweb::config::load_config_with_precedence(args.config.clone())?;
        let merged = sweb::config::merge_config(config_file);
        sweb::config::apply_cli_overrides(merged, args.controls.clone())
    };

    sweb::logging::init(&config.log_file_path)?;
    info!(config = ?config, "configuration loaded and resolved");

    let scheme = ControlScheme::preset(ControlPreset::parse(&config.controls));
    info!(controls = scheme.name(), "control scheme selected");
    let fetcher = Fetcher::new(config.timeout_secs, config.user_agent.clone());

    // The app owns the terminal guard; `run` consumes it, so the terminal
    // is back in line mode before anything below executes.
    let app = TuiApp::new(scheme, fetcher)?;
    match app.run(args.reference.clone())? {
        SessionEnd::Quit => {}
        SessionEnd::EasterEgg => sweb::game::play()?,
    }

    info!("session ended");
    Ok(())
}

//! Terminal frontend for the laser link.
//!
//! Connects to the configured controller, prints status transitions and
//! inbound text, and toggles the laser when the user presses Enter (or types
//! `t`). Ctrl+C or stdin EOF shuts the link down.
//!
//! # Usage
//!
//! ```bash
//! laser-panel                        # defaults: 127.0.0.1:12345
//! laser-panel --host 10.0.0.7 --port 5025
//! laser-panel --config config/laser-panel.toml
//! ```

// Use mimalloc as the global allocator.
#[cfg(not(test))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use laser_panel::{logging, LaserPanel, LinkEvent, Settings};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "laser-panel")]
#[command(about = "Terminal panel for a TCP-attached laser controller", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the controller host
    #[arg(long)]
    host: Option<String>,

    /// Override the controller port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    if let Some(host) = cli.host {
        settings.connection.host = host;
    }
    if let Some(port) = cli.port {
        settings.connection.port = port;
    }
    settings.validate()?;
    logging::init(&settings.application.log_level)?;

    println!("🔴 {}", settings.application.name);
    println!("   Endpoint: {}", settings.connection.endpoint());
    println!("   Toggle: Enter or 't' · Quit: Ctrl+C");
    println!();

    let (panel, mut events) = LaserPanel::spawn(settings);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(LinkEvent::StatusChanged(state)) => println!("[{}]", state.label()),
                Some(LinkEvent::TextReceived(text)) => {
                    print!("{text}");
                    std::io::stdout().flush().ok();
                }
                Some(LinkEvent::CommandRejected(reason)) => println!("✗ {reason}"),
                None => break,
            },
            line = lines.next_line() => match line? {
                Some(input) if input.is_empty() || input.eq_ignore_ascii_case("t") => {
                    // A rejection is already surfaced as an event.
                    if let Ok(command) = panel.toggle_laser().await {
                        println!("→ {} (button: {})", command, command.button_caption());
                    }
                }
                Some(_) => {}
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    panel.shutdown().await;
    println!("\n👋 link closed");
    Ok(())
}

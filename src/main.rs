//! Scorebot - A chat bot for rhythm-game leaderboard servers.
//!
//! # Overview
//!
//! Scorebot exposes several leaderboard servers through one command surface.
//! Each server is addressed by its aliases, in Latin or Cyrillic script, and
//! offers the commands its API supports:
//!
//! ```text
//! !bancho user Alice
//! !банчо топ taiko
//! !gatari lb +HDDT
//! ```
//!
//! # Features
//!
//! - **Profiles and plays**: profile, best plays, most recent play and single
//!   scores of any player
//! - **Linked accounts**: link a chat account to a player, commands then target
//!   that player by default, or the author of the replied message
//! - **Chat leaderboards**: rank the chat members by their server rank, or on a
//!   single beatmap with optional modifiers
//! - **Follow-up buttons**: every button is a complete command line going
//!   through the same parsing as a typed message
//! - **Score renders**: optional render service attaching an image to a score
//! - **Localization**: built-in English texts, overridable from a YAML file
//!
//! # Configuration
//!
//! See the [`config`] module for the YAML format and the `SCOREBOT_`
//! environment overrides.
//!
//! # Usage
//!
//! ```bash
//! scorebot --config config.yaml --data ./scorebot-data
//! ```
//!
//! Messages are read from stdin, one per line, see [`transport`] for the
//! line format.
//!
//! # Architecture
//!
//! - [`bot`] - Component wiring and message loop
//! - [`commands`] - Routing, argument parsing, player resolution and handlers
//! - [`config`] - YAML configuration with environment variable overrides
//! - [`locale`] - User facing texts
//! - [`render`] - Score render service client
//! - [`servers`] - Server modules, capabilities and HTTP clients
//! - [`storage`] - Linked accounts, cached records and chat state
//! - [`transport`] - Chat platform boundary
//! - [`utils`] - Path helpers
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (default: `info`)

use std::sync::Arc;

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use crate::{bot::Bot, config::Config, transport::ConsoleTransport};

mod bot;
mod commands;
mod config;
mod locale;
mod render;
mod servers;
mod storage;
mod transport;
mod utils;

/// Command-line arguments for the scorebot.
///
/// # Examples
///
/// ```bash
/// scorebot --config config.yaml --data ./scorebot-data --sender @me
/// ```
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file.
    #[arg(short, long)]
    config: String,
    /// Path to the directory holding the store files.
    ///
    /// Created by the operator, the bot only writes files inside it.
    #[arg(short, long)]
    data: String,
    /// Sender of the console lines naming no sender.
    #[arg(short, long, default_value = "@console")]
    sender: String,
}

#[tokio::main]
async fn main() {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    info!("Starting scorebot {}...", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config file: {}", e);
            return;
        }
    };

    let transport = Arc::new(ConsoleTransport::new(&args.sender));
    let bot = match Bot::new(config, &args, transport).await {
        Ok(bot) => bot,
        Err(e) => {
            error!("Failed to initialize bot: {:#}", e);
            return;
        }
    };

    bot.start().await;
}

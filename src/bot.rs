//! Bot wiring and main loop.
//!
//! [`Bot::new`] builds every component from the configuration: the stores,
//! one [`ServerModule`] per configured server, the texts, the renderer and
//! the [`Commander`]. [`Bot::start`] then handles each incoming message in its
//! own task until the transport closes.
//!
//! # Data Directory
//!
//! - `chats.json` - chat members and last beatmap of each chat
//! - `players-<alias>.json` - linked accounts and records of one server

use std::sync::Arc;

use log::{debug, error, info};

use crate::{
    Args,
    commands::{Commander, IncomingMessage},
    config::{Config, Server},
    locale::{Catalog, Localizer},
    render::{HttpRenderer, Renderer},
    servers::{HttpRemote, ServerInfo, ServerModule},
    storage::{ChatStore, PlayerStore},
    transport::Transport,
    utils::{get_path, player_store_file},
};

/// The bot.
pub struct Bot {
    /// Routes and runs commands
    commander: Arc<Commander>,
    /// Chat platform
    transport: Arc<dyn Transport>,
    /// Stores saved in the background
    player_stores: Vec<PlayerStore>,
    /// Chat store shared by every server
    chats: ChatStore,
}

impl Bot {
    /// Builds the bot from its configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - no server is configured
    /// - the locale file cannot be loaded
    /// - an HTTP client cannot be built
    /// - a server has inconsistent capabilities, or shares an alias with
    ///   another server
    pub async fn new(
        config: Config,
        args: &Args,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, anyhow::Error> {
        if config.servers.is_empty() {
            anyhow::bail!("no server configured");
        }

        let localizer: Arc<dyn Localizer> = match &config.locale_path {
            Some(path) => Arc::new(Catalog::load(path)?),
            None => Arc::new(Catalog::english()),
        };

        let renderer: Option<Arc<dyn Renderer>> = match &config.render.url {
            Some(url) => Some(Arc::new(HttpRenderer::new(url, config.http_timeout)?)),
            None => None,
        };
        info!("rendering {}", if renderer.is_some() { "enabled" } else { "disabled" });

        let chats = ChatStore::new(get_path(&args.data, "chats.json")).await;
        let mut commander = Commander::new(config.prefix, localizer, renderer);
        let mut player_stores = Vec::with_capacity(config.servers.len());

        for server in config.servers {
            let module = Self::create_module(
                server,
                &args.data,
                config.http_timeout,
                chats.clone(),
                commander.render_enabled(),
            )
            .await?;
            player_stores.push(module.store().clone());
            commander.add_module(module)?;
        }

        Ok(Bot {
            commander: Arc::new(commander),
            transport,
            player_stores,
            chats,
        })
    }

    /// Builds the module of a configured server, with its own player store.
    async fn create_module(
        server: Server,
        data_path: &str,
        http_timeout: u64,
        chats: ChatStore,
        render_enabled: bool,
    ) -> Result<ServerModule, anyhow::Error> {
        let primary_alias = server
            .aliases
            .first()
            .ok_or_else(|| anyhow::anyhow!("server {} has no alias", server.name))?;
        let store = PlayerStore::new(get_path(data_path, &player_store_file(primary_alias))).await;
        let remote = HttpRemote::new(&server.url, server.api_key, server.capabilities, http_timeout)?;

        ServerModule::new(
            ServerInfo {
                name: server.name,
                aliases: server.aliases,
                link: server.link,
                capabilities: server.capabilities,
            },
            Arc::new(remote),
            store,
            chats,
            render_enabled,
        )
    }

    /// Starts the bot.
    ///
    /// Starts the persistence tasks of the stores, then handles messages until
    /// the transport closes. Each message is handled in its own task.
    pub async fn start(self) {
        self.chats.start_persistence_task();
        for store in &self.player_stores {
            store.start_persistence_task();
        }

        info!("waiting for messages");
        loop {
            match self.transport.receive().await {
                Ok(Some(message)) => {
                    Self::handle_message(Arc::clone(&self.commander), Arc::clone(&self.transport), message)
                }
                Ok(None) => break,
                Err(e) => {
                    error!("failed to receive message: {}", e);
                    break;
                }
            }
        }

        info!("transport closed, stopping");
    }

    /// Handles a message in a new task.
    fn handle_message(commander: Arc<Commander>, transport: Arc<dyn Transport>, message: IncomingMessage) {
        tokio::spawn(async move {
            let Some(reply) = commander.handle(&message).await else {
                debug!("ignoring message from {}", message.origin.sender_id);
                return;
            };

            if let Err(e) = transport.send(&message.origin, &reply).await {
                error!("failed to send reply to {}: {}", message.origin.sender_id, e);
            }
        });
    }
}

//! Leaderboard servers and their capabilities.
//!
//! A [`ServerModule`] represents one leaderboard server: its aliases, its
//! display name, the [`Capabilities`] of its API, its [`Remote`] accessor, its
//! local [`PlayerStore`] and the commands it offers.
//!
//! # Modules
//!
//! - `requester` - the [`Remote`] trait and its HTTP implementation
//! - `response_structs` - JSON structures of the HTTP API
//! - `structs` - modes, modifiers, records and scores shared by every server

mod requester;
mod response_structs;
mod structs;

use std::{fmt, sync::Arc};

use log::{debug, info};
use serde::Deserialize;

#[cfg(test)]
pub use crate::servers::requester::MockRemote;
pub use crate::servers::requester::{HttpRemote, Remote, RemoteError};
pub use crate::servers::structs::{Mode, Mods, PlayerRecord, RankedEntry, Score, UserQuery};
use crate::{
    commands::{
        actions::module_commands,
        command::Command,
        identity::PlayerReference,
        router::Router,
    },
    storage::{ChatStore, PlayerStore},
};

/// Optional operations of a server API.
///
/// Checked once when the module is built; handlers then branch on these
/// flags instead of probing the server.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Players can be looked up by name
    pub lookup_by_name: bool,
    /// Players can be looked up by id
    pub lookup_by_id: bool,
    /// Top plays can be requested by player name
    pub top_by_name: bool,
    /// Top plays can be requested by player id
    pub top_by_id: bool,
    /// Recent plays can be requested by player name
    pub recent_by_name: bool,
    /// Recent plays can be requested by player id
    pub recent_by_id: bool,
    /// A single score can be requested by its id
    pub score_by_id: bool,
    /// Beatmap leaderboards can be requested
    pub leaderboard: bool,
}

/// Inconsistent [`Capabilities`].
#[derive(Debug, PartialEq, Eq)]
pub enum CapabilityError {
    /// Neither lookup by name nor lookup by id is supported
    NoLookup,
    /// An operation by name is supported without lookup by name
    NameWithoutLookup(&'static str),
    /// An operation by id is supported without lookup by id
    IdWithoutLookup(&'static str),
}

impl fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CapabilityError::NoLookup => write!(f, "at least one player lookup must be supported"),
            CapabilityError::NameWithoutLookup(operation) => {
                write!(f, "{} by name requires lookup by name", operation)
            }
            CapabilityError::IdWithoutLookup(operation) => {
                write!(f, "{} by id requires lookup by id", operation)
            }
        }
    }
}

impl std::error::Error for CapabilityError {}

/// Player scoped operations, each with a by-name and a by-id form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Player statistics
    Lookup,
    /// Best plays
    Top,
    /// Recent plays
    Recent,
}

impl Capabilities {
    /// Checks that the flags describe a usable server.
    ///
    /// # Errors
    ///
    /// - [`CapabilityError::NoLookup`] without any player lookup
    /// - [`CapabilityError::NameWithoutLookup`] for top or recent plays by name
    ///   without lookup by name
    /// - [`CapabilityError::IdWithoutLookup`] for top or recent plays by id
    ///   without lookup by id
    pub fn validate(&self) -> Result<(), CapabilityError> {
        if !self.lookup_by_name && !self.lookup_by_id {
            return Err(CapabilityError::NoLookup);
        }
        if (self.top_by_name && !self.lookup_by_name) || (self.recent_by_name && !self.lookup_by_name) {
            let operation = if self.top_by_name { "top plays" } else { "recent plays" };
            return Err(CapabilityError::NameWithoutLookup(operation));
        }
        if (self.top_by_id && !self.lookup_by_id) || (self.recent_by_id && !self.lookup_by_id) {
            let operation = if self.top_by_id { "top plays" } else { "recent plays" };
            return Err(CapabilityError::IdWithoutLookup(operation));
        }
        Ok(())
    }

    /// Returns the `(by_name, by_id)` flags of an operation.
    pub fn forms(&self, operation: Operation) -> (bool, bool) {
        match operation {
            Operation::Lookup => (self.lookup_by_name, self.lookup_by_id),
            Operation::Top => (self.top_by_name, self.top_by_id),
            Operation::Recent => (self.recent_by_name, self.recent_by_id),
        }
    }

    /// Returns `true` if the operation is supported in any form.
    pub fn supports(&self, operation: Operation) -> bool {
        let (by_name, by_id) = self.forms(operation);
        by_name || by_id
    }
}

/// Static description of a server module.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    /// Display name, prefixed to every reply
    pub name: String,
    /// Aliases routing to the module, the first one is used in follow-up commands
    pub aliases: Vec<String>,
    /// Link to the server website
    pub link: String,
    /// Operations of the server API
    pub capabilities: Capabilities,
}

/// One leaderboard server, as seen by the commands.
///
/// Built once at startup and shared by every invocation routed to it.
pub struct ServerModule {
    /// Static description
    info: ServerInfo,
    /// Server API accessor
    remote: Arc<dyn Remote>,
    /// Linked accounts and cached records of this server
    store: PlayerStore,
    /// Chat state shared by every server
    chats: ChatStore,
    /// Commands offered by this server
    commands: Router<Command>,
}

impl ServerModule {
    /// Creates a server module and registers its commands.
    ///
    /// Commands needing a capability the server lacks are not registered.
    /// The `render` command is only registered when `render_enabled` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the capabilities are inconsistent, if the module has
    /// no alias, or if two commands share an alias.
    pub fn new(
        info: ServerInfo,
        remote: Arc<dyn Remote>,
        store: PlayerStore,
        chats: ChatStore,
        render_enabled: bool,
    ) -> Result<Self, anyhow::Error> {
        info.capabilities.validate()?;
        if info.aliases.is_empty() {
            anyhow::bail!("server {} has no alias", info.name);
        }

        let commands = module_commands(&info.capabilities, render_enabled)?;

        info!(
            "server {} ready with {} commands, aliases {:?}",
            info.name,
            commands.len(),
            info.aliases
        );

        Ok(ServerModule {
            info,
            remote,
            store,
            chats,
            commands,
        })
    }

    /// Display name of the server.
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Aliases of the server.
    pub fn aliases(&self) -> &[String] {
        &self.info.aliases
    }

    /// Alias used in follow-up commands.
    pub fn primary_alias(&self) -> &str {
        &self.info.aliases[0]
    }

    /// Link to the server website.
    pub fn link(&self) -> &str {
        &self.info.link
    }

    /// Operations of the server API.
    pub fn capabilities(&self) -> &Capabilities {
        &self.info.capabilities
    }

    /// Server API accessor.
    pub fn remote(&self) -> &dyn Remote {
        self.remote.as_ref()
    }

    /// Local store of the server.
    pub fn store(&self) -> &PlayerStore {
        &self.store
    }

    /// Chat state.
    pub fn chats(&self) -> &ChatStore {
        &self.chats
    }

    /// Returns the command bound to `alias`.
    pub fn route(&self, alias: &str) -> Option<&Command> {
        self.commands.route(alias)
    }

    /// Iterates over the commands in registration order.
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    /// Text naming `record` in a follow-up command.
    ///
    /// The nickname when the server can look players up by name, the id
    /// otherwise, so the follow-up resolves to the same player.
    pub fn follow_up_target(&self, record: &PlayerRecord) -> String {
        if self.info.capabilities.lookup_by_name {
            record.nickname.clone()
        } else {
            record.player_id.clone()
        }
    }

    /// Chooses how to query the server about `reference` for `operation`.
    ///
    /// Prefers the form the reference already carries. When the server only
    /// supports the other form, the player is first looked up to translate
    /// the name into an id or the id into a name.
    ///
    /// # Errors
    ///
    /// - [`RemoteError::Unsupported`] if the operation cannot be done for
    ///   this reference
    /// - any error of the translating lookup
    pub async fn user_query(
        &self,
        reference: &PlayerReference,
        operation: Operation,
        mode: Mode,
    ) -> Result<UserQuery, RemoteError> {
        let (by_name, by_id) = self.info.capabilities.forms(operation);
        let lookup = &self.info.capabilities;

        let query = match reference {
            PlayerReference::LocalAccount(account) if by_id => UserQuery::Id(account.remote_id.clone()),
            PlayerReference::LocalAccount(account) if by_name => {
                UserQuery::Name(account.nickname.clone())
            }
            PlayerReference::ExplicitNickname(name) if by_name => UserQuery::Name(name.clone()),
            PlayerReference::ExplicitNickname(name) if by_id && lookup.lookup_by_name => {
                let record = self.remote.get_user(&UserQuery::Name(name.clone()), mode).await?;
                UserQuery::Id(record.player_id)
            }
            PlayerReference::ExplicitId(id) if by_id => UserQuery::Id(id.clone()),
            PlayerReference::ExplicitId(id) if by_name && lookup.lookup_by_id => {
                let record = self.remote.get_user(&UserQuery::Id(id.clone()), mode).await?;
                UserQuery::Name(record.nickname)
            }
            _ => return Err(RemoteError::Unsupported("player query")),
        };

        debug!("query {} for {:?} of {:?}", query, operation, reference);

        Ok(query)
    }
}

//! Command action handlers.
//!
//! One handler per command. Each handler receives a
//! [`CommandContext`](crate::commands::CommandContext) and returns the
//! [`ReplyPayload`](crate::commands::reply::ReplyPayload) of the invocation.
//!
//! # Handler Pattern
//!
//! Handlers follow a consistent pattern:
//! 1. Read the arguments and the resolved player from the context
//! 2. Query the server through the module, in the form its capabilities allow
//! 3. Build the reply, with follow-up buttons only for supported commands
//!
//! Server errors are returned as is: the dispatch pipeline turns a missing
//! player or score into a "not found" reply and anything else into a generic
//! failure reply.
//!
//! # Available Handlers
//!
//! - [`help`] - List the commands of the server
//! - [`user`] - Player profile
//! - [`top`] - Best plays
//! - [`recent`] - Most recent play
//! - [`link`] - Link and unlink accounts
//! - [`mode`] - Default mode
//! - [`chat`] - Chat leaderboard
//! - [`map_leaderboard`] - Beatmap leaderboard among chat members
//! - [`score`] - Score by id and its render

pub mod chat;
pub mod help;
pub mod link;
pub mod map_leaderboard;
pub mod mode;
pub mod recent;
pub mod score;
pub mod top;
pub mod user;

use crate::{
    commands::{
        CommandContext,
        command::Command,
        identity::PlayerReference,
        markdown_response::format_usage,
        reply::{Button, ReplyPayload},
        router::{RegistryError, Router},
    },
    servers::{Capabilities, Mode, Operation, Score},
};

/// Builds the command router of a server module.
///
/// Commands needing an operation the server lacks are left out. `render`
/// also needs `render_enabled`.
///
/// # Errors
///
/// Returns an error if two commands share an alias.
pub fn module_commands(
    capabilities: &Capabilities,
    render_enabled: bool,
) -> Result<Router<Command>, RegistryError> {
    let commands = [
        (help::COMMAND, true),
        (user::COMMAND, true),
        (top::COMMAND, capabilities.supports(Operation::Top)),
        (recent::COMMAND, capabilities.supports(Operation::Recent)),
        (link::SET_COMMAND, true),
        (link::UNSET_COMMAND, true),
        (mode::COMMAND, true),
        (chat::COMMAND, true),
        (map_leaderboard::COMMAND, capabilities.leaderboard),
        (score::SCORE_COMMAND, capabilities.score_by_id),
        (score::RENDER_COMMAND, capabilities.score_by_id && render_enabled),
    ];

    let mut router = Router::new();
    for (command, enabled) in commands {
        if enabled {
            router.register(command.aliases, command)?;
        }
    }

    Ok(router)
}

/// Name shown for a player reference.
fn reference_label(reference: &PlayerReference) -> &str {
    match reference {
        PlayerReference::LocalAccount(account) => &account.nickname,
        PlayerReference::ExplicitNickname(nickname) => nickname,
        PlayerReference::ExplicitId(id) => id,
    }
}

/// Reply reminding the usage of `command`.
fn usage_reply(context: &CommandContext, command: &Command) -> ReplyPayload {
    let prefix_alias = format!("{}{}", context.prefix, context.module.primary_alias());
    ReplyPayload::text(format_usage(context.localizer.as_ref(), command, &prefix_alias))
}

/// Button rendering `score`, when rendering is enabled and the score can be
/// fetched back by its id.
fn render_button(context: &CommandContext, score: &Score, index: usize, mode: Mode) -> Option<Button> {
    if context.renderer.is_none() || !context.module.capabilities().score_by_id {
        return None;
    }
    let score_id = score.score_id.as_deref()?;

    Some(Button {
        label: context.text("button_render", &[("index", &index.to_string())]),
        command: context.follow_up(score::RENDER_COMMAND.name, &[mode.name(), score_id]),
    })
}

/// Button showing the leaderboard of `beatmap_id`, when the server has them.
fn leaderboard_button(context: &CommandContext, beatmap_id: &str, mode: Mode) -> Option<Button> {
    if !context.module.capabilities().leaderboard {
        return None;
    }

    Some(Button {
        label: context.text("button_lb", &[]),
        command: context.follow_up(map_leaderboard::COMMAND.name, &[mode.name(), beatmap_id]),
    })
}

/// Server ids of the chat members with a linked account, in membership order.
async fn member_player_ids(context: &CommandContext, chat_id: &str) -> Vec<String> {
    let mut player_ids = Vec::new();

    for member in context.module.chats().get_chat_members(chat_id).await {
        if let Some(account) = context.module.store().get_account(&member).await {
            player_ids.push(account.remote_id);
        }
    }

    player_ids
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;

    use crate::{
        commands::{CommandContext, MessageOrigin, arguments::ArgumentBundle, identity::PlayerReference},
        locale::Catalog,
        servers::{Capabilities, MockRemote, Mode, Mods, PlayerRecord, Score, ServerInfo, ServerModule},
        storage::{ChatStore, LocalAccount, PlayerStore},
    };

    pub fn all_capabilities() -> Capabilities {
        Capabilities {
            lookup_by_name: true,
            lookup_by_id: true,
            top_by_name: true,
            top_by_id: true,
            recent_by_name: true,
            recent_by_id: true,
            score_by_id: true,
            leaderboard: true,
        }
    }

    pub fn create_test_module(
        capabilities: Capabilities,
        remote: MockRemote,
        store: PlayerStore,
        chats: ChatStore,
    ) -> Arc<ServerModule> {
        Arc::new(
            ServerModule::new(
                ServerInfo {
                    name: "Test".to_owned(),
                    aliases: vec!["test".to_owned(), "тест".to_owned()],
                    link: "https://test.example.com".to_owned(),
                    capabilities,
                },
                Arc::new(remote),
                store,
                chats,
                true,
            )
            .unwrap(),
        )
    }

    pub fn create_test_context(
        module: Arc<ServerModule>,
        tokens: &[&str],
        account: Option<LocalAccount>,
        reference: Option<PlayerReference>,
    ) -> CommandContext {
        let tokens: Vec<String> = tokens.iter().map(|token| token.to_string()).collect();

        CommandContext {
            module,
            origin: MessageOrigin {
                room_id: Some("-100".to_owned()),
                sender_id: "@alice".to_owned(),
                reply_to: None,
            },
            args: ArgumentBundle::parse_with_mods(&tokens),
            account,
            reference,
            localizer: Arc::new(Catalog::english()),
            renderer: None,
            prefix: '!',
        }
    }

    pub fn create_test_account(remote_id: &str, nickname: &str, mode: Option<Mode>) -> LocalAccount {
        LocalAccount {
            remote_id: remote_id.to_owned(),
            nickname: nickname.to_owned(),
            mode,
        }
    }

    pub fn create_test_record(player_id: &str, nickname: &str, mode: Mode) -> PlayerRecord {
        PlayerRecord {
            player_id: player_id.to_owned(),
            nickname: nickname.to_owned(),
            mode,
            rank: 100,
            performance: 3000.0,
            accuracy: 97.0,
            play_count: 4000,
            country: Some("FR".to_owned()),
        }
    }

    pub fn create_test_score(score_id: Option<&str>, beatmap_id: &str) -> Score {
        Score {
            score_id: score_id.map(str::to_owned),
            beatmap_id: beatmap_id.to_owned(),
            title: "Kenji Ninuma - DISCOPRINCE [Normal]".to_owned(),
            mods: Mods(8),
            accuracy: 99.0,
            performance: Some(120.0),
            grade: "S".to_owned(),
            max_combo: 314,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::actions::fixtures::all_capabilities;

    #[test]
    fn test_module_commands_all() {
        let router = module_commands(&all_capabilities(), true).unwrap();

        assert_eq!(router.len(), 11);
        for alias in ["help", "user", "top", "recent", "set", "unset", "mode", "chat", "lb", "score", "render"] {
            assert!(router.route(alias).is_some(), "missing {}", alias);
        }
    }

    #[test]
    fn test_module_commands_cyrillic_aliases() {
        let router = module_commands(&all_capabilities(), true).unwrap();

        assert_eq!(router.route("топ").unwrap().name, "top");
        assert_eq!(router.route("профиль").unwrap().name, "user");
        assert_eq!(router.route("лб").unwrap().name, "lb");
    }

    #[test]
    fn test_module_commands_render_switch() {
        let router = module_commands(&all_capabilities(), false).unwrap();

        assert!(router.route("score").is_some());
        assert!(router.route("render").is_none());
    }

    #[test]
    fn test_command_names_are_first_alias() {
        let router = module_commands(&all_capabilities(), true).unwrap();

        for command in router.values() {
            assert_eq!(command.aliases[0], command.name);
        }
    }
}

//! Command orchestration and execution.
//!
//! This module provides the [`Commander`] struct, the entry point for every
//! chat message. It routes the message to a server module and a command, then
//! runs the dispatch pipeline.
//!
//! # Flow
//!
//! ```text
//! Message → parse() → Invocation → dispatch() → ReplyPayload
//! ```

use std::{panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
use log::{debug, error, info, warn};

use crate::{
    commands::{
        CommandContext, CommandParseError, IncomingMessage, MessageOrigin, follow_up_line,
        arguments::ArgumentBundle,
        command::{Command, parse_message},
        identity::{ResolutionFailure, resolve},
        reply::ReplyPayload,
        router::{RegistryError, Router},
    },
    locale::Localizer,
    render::Renderer,
    servers::{RemoteError, ServerModule},
};

/// Message routed to a command.
pub struct Invocation {
    /// Server the message is addressed to
    pub module: Arc<ServerModule>,
    /// Routed command
    pub command: Command,
    /// Tokens following the command alias
    pub arguments: Vec<String>,
}

/// Command orchestrator.
///
/// The Commander is responsible for:
/// - Routing server aliases to server modules
/// - Routing command aliases inside a module
/// - Building the context of a command and running its handler
/// - Converting every failure into a reply
///
/// Messages without the prefix, or addressed to an unknown server, are
/// silently ignored.
pub struct Commander {
    /// Command prefix
    prefix: char,
    /// Server modules by alias
    modules: Router<Arc<ServerModule>>,
    /// Text lookup service
    localizer: Arc<dyn Localizer>,
    /// Score renderer, `None` when rendering is disabled
    renderer: Option<Arc<dyn Renderer>>,
}

impl Commander {
    /// Creates a Commander without any server.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Character starting every command
    /// * `localizer` - Text lookup service
    /// * `renderer` - Score renderer, `None` to disable rendering
    pub fn new(
        prefix: char,
        localizer: Arc<dyn Localizer>,
        renderer: Option<Arc<dyn Renderer>>,
    ) -> Self {
        Commander {
            prefix,
            modules: Router::new(),
            localizer,
            renderer,
        }
    }

    /// Registers a server module under its aliases.
    ///
    /// # Errors
    ///
    /// Returns an error if an alias is already used by another server.
    pub fn add_module(&mut self, module: ServerModule) -> Result<(), RegistryError> {
        let aliases = module.aliases().to_vec();
        let name = module.name().to_owned();
        self.modules.register(&aliases, Arc::new(module))?;

        info!("server {} registered as {:?}", name, aliases);

        Ok(())
    }

    /// Returns `true` when rendering is enabled.
    pub fn render_enabled(&self) -> bool {
        self.renderer.is_some()
    }

    /// Routes a message body to a command.
    ///
    /// A server alias without command routes to the `help` command.
    ///
    /// # Returns
    ///
    /// * `Ok(Invocation)` - Routed command
    /// * `Err(CommandParseError::NotForBot)` - Not a command, or unknown server
    /// * `Err(CommandParseError::InvalidCommand)` - Unknown command of a known
    ///   server, with the reply text
    pub fn parse(&self, body: &str) -> Result<Invocation, CommandParseError> {
        let message = parse_message(self.prefix, body).ok_or(CommandParseError::NotForBot)?;

        let Some(module) = self.modules.route(&message.module) else {
            debug!("ignoring message for unknown server {}", message.module);
            return Err(CommandParseError::NotForBot);
        };

        let alias = message.command.as_deref().unwrap_or("help");
        let Some(command) = module.route(alias) else {
            debug!("unknown command {} for server {}", alias, module.name());
            let help = follow_up_line(self.prefix, &message.module, "help", &[]);
            let text = self
                .localizer
                .text("unknown_command", &[("command", alias), ("help", &help)]);
            return Err(CommandParseError::InvalidCommand(
                ReplyPayload::text(text).prefixed(module.name()).text,
            ));
        };

        Ok(Invocation {
            module: Arc::clone(module),
            command: *command,
            arguments: message.arguments,
        })
    }

    /// Handles a chat message.
    ///
    /// # Returns
    ///
    /// The reply to send, `None` when the message is not for the bot.
    pub async fn handle(&self, message: &IncomingMessage) -> Option<ReplyPayload> {
        match self.parse(&message.body) {
            Ok(invocation) => Some(self.dispatch(invocation, &message.origin).await),
            Err(CommandParseError::InvalidCommand(text)) => Some(ReplyPayload::text(text)),
            Err(CommandParseError::NotForBot) => None,
        }
    }

    /// Runs a routed command.
    ///
    /// 1. Records the sender as a member of the chat
    /// 2. Parses the arguments
    /// 3. Resolves the targeted player when the command needs one
    /// 4. Runs the handler, catching its errors and panics
    /// 5. Prefixes the reply with the server name
    pub async fn dispatch(&self, invocation: Invocation, origin: &MessageOrigin) -> ReplyPayload {
        let Invocation {
            module,
            command,
            arguments,
        } = invocation;
        debug!(
            "dispatching {} on {} from {}",
            command.name,
            module.name(),
            origin.sender_id
        );

        if let Some(room_id) = &origin.room_id {
            module.chats().add_member(room_id, &origin.sender_id).await;
        }

        let args = if command.parse_mods {
            ArgumentBundle::parse_with_mods(&arguments)
        } else {
            ArgumentBundle::parse(&arguments)
        };
        let account = module.store().get_account(&origin.sender_id).await;

        let reference = if command.need_user_parse {
            match resolve(origin, &args, &module).await {
                Ok(reference) => Some(reference),
                Err(failure) => {
                    debug!("player resolution failed: {}", failure);
                    let text = self.failure_text(failure, &module);
                    return ReplyPayload::text(text).prefixed(module.name());
                }
            }
        } else {
            None
        };

        let context = CommandContext {
            module: Arc::clone(&module),
            origin: origin.clone(),
            args,
            account,
            reference,
            localizer: Arc::clone(&self.localizer),
            renderer: self.renderer.clone(),
            prefix: self.prefix,
        };

        let reply = match AssertUnwindSafe((command.handler)(&context)).catch_unwind().await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => self.error_reply(&e, command.name, &module),
            Err(_) => {
                error!("command {} panicked on {}", command.name, module.name());
                ReplyPayload::text(self.localizer.text("failure", &[]))
            }
        };

        reply.prefixed(module.name())
    }

    /// Text explaining a resolution failure.
    fn failure_text(&self, failure: ResolutionFailure, module: &ServerModule) -> String {
        let set = follow_up_line(self.prefix, module.primary_alias(), "set", &[]);
        self.localizer.text(failure.locale_key(), &[("set", &set)])
    }

    /// Reply to a handler error.
    fn error_reply(&self, error: &anyhow::Error, command: &str, module: &ServerModule) -> ReplyPayload {
        if let Some(failure) = error.downcast_ref::<ResolutionFailure>() {
            return ReplyPayload::text(self.failure_text(*failure, module));
        }

        let key = match error.downcast_ref::<RemoteError>() {
            Some(RemoteError::NotFound) => "not_found",
            Some(RemoteError::Unsupported(operation)) => {
                warn!("unsupported {} in command {} on {}", operation, command, module.name());
                "unsupported"
            }
            _ => {
                error!("command {} failed on {}: {:#}", command, module.name(), error);
                "failure"
            }
        };

        ReplyPayload::text(self.localizer.text(key, &[]))
    }
}

#[cfg(test)]
mod tests {
    use futures::future::BoxFuture;
    use mockall::predicate::eq;

    use super::*;
    use crate::{
        commands::actions::fixtures::{all_capabilities, create_test_record, create_test_score},
        locale::Catalog,
        servers::{Capabilities, MockRemote, Mode, ServerInfo, UserQuery},
        storage::{ChatStore, PlayerStore},
    };

    fn create_test_server(
        name: &str,
        aliases: &[&str],
        capabilities: Capabilities,
        remote: MockRemote,
        store: PlayerStore,
        chats: ChatStore,
    ) -> ServerModule {
        ServerModule::new(
            ServerInfo {
                name: name.to_owned(),
                aliases: aliases.iter().map(|alias| alias.to_string()).collect(),
                link: "https://example.com".to_owned(),
                capabilities,
            },
            Arc::new(remote),
            store,
            chats,
            false,
        )
        .unwrap()
    }

    fn create_test_commander(remote: MockRemote, store: PlayerStore, chats: ChatStore) -> Commander {
        let mut commander = Commander::new('!', Arc::new(Catalog::english()), None);
        commander
            .add_module(create_test_server(
                "Bancho",
                &["bancho", "банчо"],
                all_capabilities(),
                remote,
                store,
                chats,
            ))
            .unwrap();
        commander
    }

    fn create_test_message(body: &str, reply_to: Option<&str>) -> IncomingMessage {
        IncomingMessage {
            body: body.to_owned(),
            origin: MessageOrigin {
                room_id: Some("-100".to_owned()),
                sender_id: "@alice".to_owned(),
                reply_to: reply_to.map(str::to_owned),
            },
        }
    }

    fn panicking_handler(_: &CommandContext) -> BoxFuture<'_, Result<ReplyPayload, anyhow::Error>> {
        async { panic!("boom") }.boxed()
    }

    fn failing_handler(_: &CommandContext) -> BoxFuture<'_, Result<ReplyPayload, anyhow::Error>> {
        async { Err(anyhow::anyhow!("server unreachable")) }.boxed()
    }

    #[test]
    fn test_parse_not_for_bot() {
        let commander = create_test_commander(MockRemote::new(), PlayerStore::in_memory(), ChatStore::in_memory());

        assert!(matches!(commander.parse("hello"), Err(CommandParseError::NotForBot)));
        assert!(matches!(commander.parse("!other top"), Err(CommandParseError::NotForBot)));
    }

    #[test]
    fn test_parse_routes_module_and_command() {
        let commander = create_test_commander(MockRemote::new(), PlayerStore::in_memory(), ChatStore::in_memory());

        let invocation = commander.parse("!bancho top taiko Alice").unwrap();

        assert_eq!(invocation.module.name(), "Bancho");
        assert_eq!(invocation.command.name, "top");
        assert_eq!(invocation.arguments, vec!["taiko", "Alice"]);
    }

    #[test]
    fn test_parse_without_command_is_help() {
        let commander = create_test_commander(MockRemote::new(), PlayerStore::in_memory(), ChatStore::in_memory());

        let invocation = commander.parse("!bancho").unwrap();

        assert_eq!(invocation.command.name, "help");
    }

    #[test]
    fn test_parse_unknown_command() {
        let commander = create_test_commander(MockRemote::new(), PlayerStore::in_memory(), ChatStore::in_memory());

        match commander.parse("!bancho dance") {
            Err(CommandParseError::InvalidCommand(text)) => assert_eq!(
                text,
                "[Bancho] Unknown command `dance`. Type `!bancho help` for the list of commands."
            ),
            _ => panic!("expected an invalid command"),
        }
    }

    #[test]
    fn test_duplicate_server_alias() {
        let mut commander = create_test_commander(MockRemote::new(), PlayerStore::in_memory(), ChatStore::in_memory());

        let result = commander.add_module(create_test_server(
            "Other",
            &["other", "bancho"],
            all_capabilities(),
            MockRemote::new(),
            PlayerStore::in_memory(),
            ChatStore::in_memory(),
        ));

        assert_eq!(result, Err(RegistryError::DuplicateAlias("bancho".to_owned())));
        assert!(matches!(commander.parse("!other help"), Err(CommandParseError::NotForBot)));
    }

    #[tokio::test]
    async fn test_top_with_mode_uses_linked_account() {
        let mut remote = MockRemote::new();
        remote
            .expect_get_top()
            .with(eq(UserQuery::Id("42".to_owned())), eq(Mode::Taiko), eq(5))
            .times(1)
            .returning(|_, _, _| Ok(vec![create_test_score(Some("1"), "75")]));
        let store = PlayerStore::in_memory();
        store.set_account("@alice", "42", "Alice", Some(Mode::Standard)).await.unwrap();
        let commander = create_test_commander(remote, store, ChatStore::in_memory());

        let reply = commander
            .handle(&create_test_message("!bancho top taiko", None))
            .await
            .unwrap();

        assert!(reply.text.starts_with("[Bancho] Best plays of **Alice** (taiko):"));
    }

    #[test]
    fn test_cyrillic_aliases_route() {
        let commander = create_test_commander(MockRemote::new(), PlayerStore::in_memory(), ChatStore::in_memory());

        let module = commander.modules.route("банчо").unwrap();

        assert_eq!(module.name(), "Bancho");
        assert_eq!(module.route("топ").unwrap().name, "top");
        assert_eq!(module.route("профиль").unwrap().name, "user");
    }

    #[test]
    fn test_parse_keeps_dash_arguments() {
        let commander = create_test_commander(MockRemote::new(), PlayerStore::in_memory(), ChatStore::in_memory());

        let invocation = commander.parse("!bancho user Cool -Player-").unwrap();

        assert_eq!(invocation.arguments, vec!["Cool", "-Player-"]);
    }

    #[tokio::test]
    async fn test_dash_nickname_wins_over_linked_account() {
        let mut remote = MockRemote::new();
        remote
            .expect_get_user()
            .with(eq(UserQuery::Name("-GN".to_owned())), eq(Mode::Standard))
            .times(1)
            .returning(|_, mode| Ok(create_test_record("7", "-GN", mode)));
        let store = PlayerStore::in_memory();
        store.set_account("@alice", "42", "Alice", None).await.unwrap();
        let commander = create_test_commander(remote, store, ChatStore::in_memory());

        let reply = commander
            .handle(&create_test_message("!bancho user -GN", None))
            .await
            .unwrap();

        assert!(reply.text.starts_with("[Bancho] **-GN**"));
        assert_eq!(reply.buttons[0][0].command, "!bancho top standard -GN");
    }

    #[tokio::test]
    async fn test_cyrillic_message_end_to_end() {
        let mut remote = MockRemote::new();
        remote
            .expect_get_top()
            .with(eq(UserQuery::Id("42".to_owned())), eq(Mode::Mania), eq(5))
            .times(1)
            .returning(|_, _, _| Ok(Vec::new()));
        let store = PlayerStore::in_memory();
        store.set_account("@alice", "42", "Alice", Some(Mode::Mania)).await.unwrap();
        let commander = create_test_commander(remote, store, ChatStore::in_memory());

        let reply = commander
            .handle(&create_test_message("!банчо топ", None))
            .await
            .unwrap();

        assert_eq!(reply.text, "[Bancho] **Alice** has no play in mania.");
    }

    #[tokio::test]
    async fn test_reply_to_without_account_makes_no_remote_call() {
        // No expectation is set, any remote call fails the test
        let store = PlayerStore::in_memory();
        store.set_account("@alice", "42", "Alice", None).await.unwrap();
        let commander = create_test_commander(MockRemote::new(), store, ChatStore::in_memory());

        let reply = commander
            .handle(&create_test_message("!bancho user", Some("@bob")))
            .await
            .unwrap();

        assert_eq!(
            reply.text,
            "[Bancho] The player you replied to has not linked an account, give a nickname instead."
        );
    }

    #[tokio::test]
    async fn test_no_linked_account() {
        let commander = create_test_commander(MockRemote::new(), PlayerStore::in_memory(), ChatStore::in_memory());

        let reply = commander
            .handle(&create_test_message("!bancho recent", None))
            .await
            .unwrap();

        assert_eq!(
            reply.text,
            "[Bancho] You have not linked an account, use `!bancho set` or give a nickname."
        );
    }

    #[tokio::test]
    async fn test_not_found_reply() {
        let mut remote = MockRemote::new();
        remote
            .expect_get_user()
            .with(eq(UserQuery::Name("Nobody".to_owned())), eq(Mode::Standard))
            .returning(|_, _| Err(RemoteError::NotFound));
        let commander = create_test_commander(remote, PlayerStore::in_memory(), ChatStore::in_memory());

        let reply = commander
            .handle(&create_test_message("!bancho user Nobody", None))
            .await
            .unwrap();

        assert_eq!(reply.text, "[Bancho] Not found on this server.");
    }

    #[tokio::test]
    async fn test_sender_becomes_chat_member() {
        let mut remote = MockRemote::new();
        remote
            .expect_get_user()
            .returning(|_, mode| Ok(create_test_record("42", "Alice", mode)));
        let chats = ChatStore::in_memory();
        let commander = create_test_commander(remote, PlayerStore::in_memory(), chats.clone());

        commander
            .handle(&create_test_message("!bancho user Alice", None))
            .await
            .unwrap();

        assert_eq!(chats.get_chat_members("-100").await, vec!["@alice"]);
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_failure_reply() {
        let commander = create_test_commander(MockRemote::new(), PlayerStore::in_memory(), ChatStore::in_memory());
        let mut invocation = commander.parse("!bancho help").unwrap();
        invocation.command.handler = panicking_handler;

        let reply = commander
            .dispatch(invocation, &create_test_message("", None).origin)
            .await;

        assert_eq!(reply.text, "[Bancho] Something went wrong, please try again later.");
    }

    #[tokio::test]
    async fn test_handler_error_becomes_failure_reply() {
        let commander = create_test_commander(MockRemote::new(), PlayerStore::in_memory(), ChatStore::in_memory());
        let mut invocation = commander.parse("!bancho help").unwrap();
        invocation.command.handler = failing_handler;

        let reply = commander
            .dispatch(invocation, &create_test_message("", None).origin)
            .await;

        assert_eq!(reply.text, "[Bancho] Something went wrong, please try again later.");
    }

    #[tokio::test]
    async fn test_button_command_goes_through_same_path() {
        let mut remote = MockRemote::new();
        remote
            .expect_get_user()
            .returning(|_, mode| Ok(create_test_record("42", "Cool Player", mode)));
        remote
            .expect_get_top()
            .with(eq(UserQuery::Name("Cool Player".to_owned())), eq(Mode::Mania), eq(5))
            .times(1)
            .returning(|_, _, _| Ok(Vec::new()));
        let commander = create_test_commander(remote, PlayerStore::in_memory(), ChatStore::in_memory());

        let profile = commander
            .handle(&create_test_message("!bancho user mania Cool Player", None))
            .await
            .unwrap();
        let button = &profile.buttons[0][0];
        let reply = commander
            .handle(&create_test_message(&button.command, None))
            .await
            .unwrap();

        assert_eq!(reply.text, "[Bancho] **Cool Player** has no play in mania.");
    }
}

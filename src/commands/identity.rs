//! Player identity resolution.
//!
//! Decides which player a command is about before any handler runs. The
//! resolver only reads the local store of the module; looking the player up on
//! the server is left to the handler consuming the [`PlayerReference`].
//!
//! # Policy
//!
//! 1. Nickname tokens in the arguments win over any linked account
//! 2. Otherwise, when the message replies to someone, that sender's account
//! 3. Otherwise, the account of the sender of the message

use std::fmt;

use log::debug;

use crate::{
    commands::{MessageOrigin, arguments::ArgumentBundle},
    servers::{Capabilities, ServerModule},
    storage::LocalAccount,
};

/// Player targeted by a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerReference {
    /// Account linked to a chat sender
    LocalAccount(LocalAccount),
    /// Name typed by the sender, only produced when the server has lookup by name
    ExplicitNickname(String),
    /// Id typed by the sender, produced when the server has no lookup by name
    ExplicitId(String),
}

/// Reasons why no player could be targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionFailure {
    /// The message replies to a sender without a linked account
    NoIdentity,
    /// The sender has no linked account and gave no nickname
    NoLinkedAccount,
    /// The sender gave an empty id
    InvalidExplicitId,
}

impl ResolutionFailure {
    /// Locale key of the message explaining the failure.
    pub fn locale_key(self) -> &'static str {
        match self {
            ResolutionFailure::NoIdentity => "no_identity",
            ResolutionFailure::NoLinkedAccount => "no_linked_account",
            ResolutionFailure::InvalidExplicitId => "invalid_id",
        }
    }
}

impl fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ResolutionFailure::NoIdentity => write!(f, "replied sender has no linked account"),
            ResolutionFailure::NoLinkedAccount => write!(f, "sender has no linked account"),
            ResolutionFailure::InvalidExplicitId => write!(f, "empty player id"),
        }
    }
}

impl std::error::Error for ResolutionFailure {}

/// Builds the reference typed in the arguments, if any.
///
/// The nickname tokens are joined with spaces. They name the player when the
/// server can look players up by name, and are taken as a raw id otherwise.
///
/// # Returns
///
/// * `None` - no nickname token was given
/// * `Some(Ok(reference))` - the typed reference
/// * `Some(Err(ResolutionFailure::InvalidExplicitId))` - the typed id is blank
pub fn explicit_reference(
    bundle: &ArgumentBundle,
    capabilities: &Capabilities,
) -> Option<Result<PlayerReference, ResolutionFailure>> {
    let joined = bundle.joined_nickname()?;

    if capabilities.lookup_by_name {
        return Some(Ok(PlayerReference::ExplicitNickname(joined)));
    }

    if joined.trim().is_empty() {
        return Some(Err(ResolutionFailure::InvalidExplicitId));
    }
    Some(Ok(PlayerReference::ExplicitId(joined)))
}

/// Resolves the player targeted by a command.
///
/// # Arguments
///
/// * `origin` - Where the message comes from
/// * `bundle` - Parsed arguments of the command
/// * `module` - Server the command is routed to
///
/// # Errors
///
/// - [`ResolutionFailure::NoIdentity`] when replying to a sender without account
/// - [`ResolutionFailure::NoLinkedAccount`] when the sender has no account
/// - [`ResolutionFailure::InvalidExplicitId`] when the typed id is blank
pub async fn resolve(
    origin: &MessageOrigin,
    bundle: &ArgumentBundle,
    module: &ServerModule,
) -> Result<PlayerReference, ResolutionFailure> {
    if let Some(reference) = explicit_reference(bundle, module.capabilities()) {
        debug!("explicit player reference {:?}", reference);
        return reference;
    }

    if let Some(reply_to) = &origin.reply_to {
        return match module.store().get_account(reply_to).await {
            Some(account) => Ok(PlayerReference::LocalAccount(account)),
            None => {
                debug!("replied sender {} has no linked account", reply_to);
                Err(ResolutionFailure::NoIdentity)
            }
        };
    }

    match module.store().get_account(&origin.sender_id).await {
        Some(account) => Ok(PlayerReference::LocalAccount(account)),
        None => {
            debug!("sender {} has no linked account", origin.sender_id);
            Err(ResolutionFailure::NoLinkedAccount)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        servers::{MockRemote, Mode, ServerInfo},
        storage::{ChatStore, PlayerStore},
    };

    fn create_test_module(lookup_by_name: bool, store: PlayerStore) -> ServerModule {
        // No expectation is set, any remote call fails the test
        ServerModule::new(
            ServerInfo {
                name: "Test".to_owned(),
                aliases: vec!["test".to_owned()],
                link: String::new(),
                capabilities: Capabilities {
                    lookup_by_name,
                    lookup_by_id: true,
                    ..Capabilities::default()
                },
            },
            Arc::new(MockRemote::new()),
            store,
            ChatStore::in_memory(),
            false,
        )
        .unwrap()
    }

    fn create_test_origin(reply_to: Option<&str>) -> MessageOrigin {
        MessageOrigin {
            room_id: Some("!room".to_owned()),
            sender_id: "@alice".to_owned(),
            reply_to: reply_to.map(str::to_owned),
        }
    }

    fn tokens(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_owned).collect()
    }

    #[tokio::test]
    async fn test_resolve_own_account() {
        let store = PlayerStore::in_memory();
        store.set_account("@alice", "42", "Alice", Some(Mode::Standard)).await.unwrap();
        let module = create_test_module(true, store);

        let bundle = ArgumentBundle::parse(&tokens("taiko"));
        let reference = resolve(&create_test_origin(None), &bundle, &module).await.unwrap();

        assert_eq!(bundle.mode, Some(Mode::Taiko));
        assert!(bundle.nickname.is_empty());
        assert_eq!(
            reference,
            PlayerReference::LocalAccount(LocalAccount {
                remote_id: "42".to_owned(),
                nickname: "Alice".to_owned(),
                mode: Some(Mode::Standard),
            })
        );
    }

    #[tokio::test]
    async fn test_resolve_reply_to_account_wins() {
        let store = PlayerStore::in_memory();
        store.set_account("@alice", "42", "Alice", None).await.unwrap();
        store.set_account("@bob", "7", "Bob", None).await.unwrap();
        let module = create_test_module(true, store);

        let reference = resolve(
            &create_test_origin(Some("@bob")),
            &ArgumentBundle::parse(&[]),
            &module,
        )
        .await
        .unwrap();

        match reference {
            PlayerReference::LocalAccount(account) => assert_eq!(account.remote_id, "7"),
            other => panic!("unexpected reference {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolve_reply_to_without_account() {
        let store = PlayerStore::in_memory();
        store.set_account("@alice", "42", "Alice", None).await.unwrap();
        let module = create_test_module(true, store);

        let result = resolve(
            &create_test_origin(Some("@bob")),
            &ArgumentBundle::parse(&[]),
            &module,
        )
        .await;

        assert_eq!(result, Err(ResolutionFailure::NoIdentity));
    }

    #[tokio::test]
    async fn test_resolve_without_account() {
        let module = create_test_module(true, PlayerStore::in_memory());

        let result = resolve(&create_test_origin(None), &ArgumentBundle::parse(&[]), &module).await;

        assert_eq!(result, Err(ResolutionFailure::NoLinkedAccount));
    }

    #[tokio::test]
    async fn test_resolve_nickname_overrides_account() {
        let store = PlayerStore::in_memory();
        store.set_account("@alice", "42", "Alice", None).await.unwrap();
        let module = create_test_module(true, store);

        let reference = resolve(
            &create_test_origin(Some("@alice")),
            &ArgumentBundle::parse(&tokens("mania Cool Player")),
            &module,
        )
        .await
        .unwrap();

        assert_eq!(reference, PlayerReference::ExplicitNickname("Cool Player".to_owned()));
    }

    #[tokio::test]
    async fn test_resolve_explicit_id_without_name_lookup() {
        let module = create_test_module(false, PlayerStore::in_memory());

        let reference = resolve(
            &create_test_origin(None),
            &ArgumentBundle::parse(&tokens("NicknameWithSpaces Extra")),
            &module,
        )
        .await
        .unwrap();

        assert_eq!(
            reference,
            PlayerReference::ExplicitId("NicknameWithSpaces Extra".to_owned())
        );
    }

    #[test]
    fn test_explicit_reference_blank_id() {
        let capabilities = Capabilities {
            lookup_by_id: true,
            ..Capabilities::default()
        };
        let bundle = ArgumentBundle {
            nickname: vec![" ".to_owned()],
            full: vec![" ".to_owned()],
            ..ArgumentBundle::default()
        };

        assert_eq!(
            explicit_reference(&bundle, &capabilities),
            Some(Err(ResolutionFailure::InvalidExplicitId))
        );
        assert_eq!(explicit_reference(&ArgumentBundle::default(), &capabilities), None);
    }
}

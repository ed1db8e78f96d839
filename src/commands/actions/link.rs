//! Account link command handlers.
//!
//! `set` links the sender to a server player after checking the player exists,
//! `unset` removes the link. Both write the store before acknowledging.
//!
//! # Errors
//!
//! `set` refuses a player already linked to another sender. A missing or
//! blank player is answered with the usage of the command.

use futures::{FutureExt, future::BoxFuture};
use log::{debug, info};

use crate::{
    commands::{
        CommandContext,
        actions::usage_reply,
        command::Command,
        identity::explicit_reference,
        reply::ReplyPayload,
    },
    servers::Operation,
};

/// The `set` command.
pub const SET_COMMAND: Command = Command {
    name: "set",
    aliases: &["set", "link", "привязать", "сет"],
    usage: "[mode] <nickname>",
    need_user_parse: false,
    parse_mods: false,
    handler: handle_set,
};

/// The `unset` command.
pub const UNSET_COMMAND: Command = Command {
    name: "unset",
    aliases: &["unset", "unlink", "отвязать", "ансет"],
    usage: "",
    need_user_parse: false,
    parse_mods: false,
    handler: handle_unset,
};

/// Links the sender to the player given as argument.
pub fn handle_set(context: &CommandContext) -> BoxFuture<'_, Result<ReplyPayload, anyhow::Error>> {
    set(context).boxed()
}

/// Removes the link of the sender.
pub fn handle_unset(context: &CommandContext) -> BoxFuture<'_, Result<ReplyPayload, anyhow::Error>> {
    unset(context).boxed()
}

async fn set(context: &CommandContext) -> Result<ReplyPayload, anyhow::Error> {
    let module = &context.module;
    let sender_id = &context.origin.sender_id;

    let Some(reference) = explicit_reference(&context.args, module.capabilities()) else {
        debug!("set called without player");
        return Ok(usage_reply(context, &SET_COMMAND));
    };
    let reference = reference?;
    let mode = context.mode();

    let query = module.user_query(&reference, Operation::Lookup, mode).await?;
    let record = module.remote().get_user(&query, mode).await?;

    if let Some((owner, _)) = module.store().find_by_remote_id(&record.player_id).await
        && &owner != sender_id
    {
        info!("player {} is already linked to {}", record.player_id, owner);
        return Ok(ReplyPayload::text(
            context.text("set_taken", &[("nickname", &record.nickname)]),
        ));
    }

    let default_mode = context
        .args
        .mode
        .or_else(|| context.account.as_ref().and_then(|account| account.mode));
    module
        .store()
        .set_account(sender_id, &record.player_id, &record.nickname, default_mode)
        .await?;

    let text = context.text(
        "set_done",
        &[("nickname", &record.nickname), ("id", &record.player_id)],
    );
    module.store().put_record(record).await;

    Ok(ReplyPayload::text(text))
}

async fn unset(context: &CommandContext) -> Result<ReplyPayload, anyhow::Error> {
    let removed = context
        .module
        .store()
        .remove_account(&context.origin.sender_id)
        .await?;

    let key = if removed { "unset_done" } else { "unset_missing" };
    Ok(ReplyPayload::text(context.text(key, &[])))
}

//! Chat leaderboard command handler.
//!
//! Ranks the chat members with a linked account, from the records cached when
//! their profiles were last fetched. No server call is made.

use futures::{FutureExt, future::BoxFuture};
use log::debug;

use crate::commands::{
    CommandContext,
    actions::member_player_ids,
    command::Command,
    leaderboard::{aggregate, collect_records},
    markdown_response::format_leaderboard,
    reply::ReplyPayload,
};

/// The `chat` command.
pub const COMMAND: Command = Command {
    name: "chat",
    aliases: &["chat", "чат"],
    usage: "[mode] [chat_id]",
    need_user_parse: false,
    parse_mods: false,
    handler: handle_chat,
};

/// Shows the leaderboard of a chat.
///
/// The chat is the one of the message, or the numeric chat id given as
/// argument.
pub fn handle_chat(context: &CommandContext) -> BoxFuture<'_, Result<ReplyPayload, anyhow::Error>> {
    chat(context).boxed()
}

async fn chat(context: &CommandContext) -> Result<ReplyPayload, anyhow::Error> {
    let chat_id = match (context.args.nickname.first(), &context.origin.room_id) {
        (Some(chat_id), _) if chat_id.parse::<i64>().is_ok() => chat_id.clone(),
        (Some(chat_id), _) => {
            return Ok(ReplyPayload::text(context.text("chat_invalid", &[("chat", chat_id)])));
        }
        (None, Some(room_id)) => room_id.clone(),
        (None, None) => return Ok(ReplyPayload::text(context.text("chat_no_room", &[]))),
    };

    let mode = context.mode();
    let store = context.module.store();
    let player_ids = member_player_ids(context, &chat_id).await;
    let records = collect_records(store, &player_ids, mode).await;
    let entries = aggregate(&player_ids, mode, |player_id, _| records.get(player_id).cloned());

    debug!("chat {} leaderboard has {} entries", chat_id, entries.len());

    if entries.is_empty() {
        return Ok(ReplyPayload::text(context.text("chat_empty", &[])));
    }

    let header = context.text("chat_header", &[("mode", mode.name())]);
    Ok(ReplyPayload::text(format_leaderboard(
        context.localizer.as_ref(),
        header,
        &entries,
    )))
}

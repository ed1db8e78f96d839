//! Beatmap leaderboard command handler.
//!
//! Asks the server for the leaderboard of a beatmap, restricted to the chat
//! members with a linked account. Without beatmap argument, the last beatmap
//! shown in the chat is used.

use futures::{FutureExt, future::BoxFuture};
use log::debug;

use crate::commands::{
    CommandContext,
    actions::member_player_ids,
    command::Command,
    leaderboard::rank,
    markdown_response::format_leaderboard,
    reply::ReplyPayload,
};

/// The `lb` command.
pub const COMMAND: Command = Command {
    name: "lb",
    aliases: &["lb", "leaderboard", "лб", "лидерборд"],
    usage: "[mode] [beatmap_id] [+mods]",
    need_user_parse: false,
    parse_mods: true,
    handler: handle_leaderboard,
};

/// Shows the leaderboard of a beatmap among the chat members.
pub fn handle_leaderboard(context: &CommandContext) -> BoxFuture<'_, Result<ReplyPayload, anyhow::Error>> {
    leaderboard(context).boxed()
}

async fn leaderboard(context: &CommandContext) -> Result<ReplyPayload, anyhow::Error> {
    let module = &context.module;
    let Some(room_id) = &context.origin.room_id else {
        return Ok(ReplyPayload::text(context.text("chat_no_room", &[])));
    };

    let beatmap_id = match context.args.nickname.first() {
        Some(beatmap_id) => Some(beatmap_id.clone()),
        None => module.chats().get_last_beatmap(room_id).await,
    };
    let Some(beatmap_id) = beatmap_id else {
        return Ok(ReplyPayload::text(context.text("lb_no_map", &[])));
    };

    let mode = context.mode();
    let mods = context.args.mods();
    let player_ids = member_player_ids(context, room_id).await;
    debug!(
        "handling lb command for beatmap {} among {} players",
        beatmap_id,
        player_ids.len()
    );

    let entries = if player_ids.is_empty() {
        Vec::new()
    } else {
        rank(
            module
                .remote()
                .get_leaderboard(&beatmap_id, &player_ids, mode, mods)
                .await?,
        )
    };

    if entries.is_empty() {
        return Ok(ReplyPayload::text(context.text("lb_empty", &[("beatmap", &beatmap_id)])));
    }

    let header = context.text(
        "lb_header",
        &[
            ("beatmap", &beatmap_id),
            ("mode", mode.name()),
            ("mods", &mods.unwrap_or_default().to_string()),
        ],
    );
    Ok(ReplyPayload::text(format_leaderboard(
        context.localizer.as_ref(),
        header,
        &entries,
    )))
}

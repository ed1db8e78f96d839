//! Recent play command handler.
//!
//! Shows the most recent play of the targeted player and remembers its
//! beatmap as the last one of the chat, so `lb` works without argument.

use futures::{FutureExt, future::BoxFuture};
use log::debug;

use crate::{
    commands::{
        CommandContext,
        actions::{leaderboard_button, reference_label, render_button},
        command::Command,
        markdown_response::format_scores,
        reply::ReplyPayload,
    },
    servers::Operation,
};

/// The `recent` command.
pub const COMMAND: Command = Command {
    name: "recent",
    aliases: &["recent", "r", "rs", "последний", "рс"],
    usage: "[mode] [nickname]",
    need_user_parse: true,
    parse_mods: false,
    handler: handle_recent,
};

/// Shows the most recent play of the targeted player.
pub fn handle_recent(context: &CommandContext) -> BoxFuture<'_, Result<ReplyPayload, anyhow::Error>> {
    recent(context).boxed()
}

async fn recent(context: &CommandContext) -> Result<ReplyPayload, anyhow::Error> {
    let module = &context.module;
    let mode = context.mode();
    let reference = context.reference()?;
    let label = reference_label(reference);

    let query = module.user_query(reference, Operation::Recent, mode).await?;
    debug!("handling recent command for {} in {}", query, mode);

    let scores = module.remote().get_recent(&query, mode).await?;
    let Some(score) = scores.into_iter().next() else {
        return Ok(ReplyPayload::text(context.text(
            "recent_empty",
            &[("nickname", label), ("mode", mode.name())],
        )));
    };

    if let Some(room_id) = &context.origin.room_id {
        module.chats().set_last_beatmap(room_id, &score.beatmap_id).await;
    }

    let header = context.text("recent_header", &[("nickname", label), ("mode", mode.name())]);
    let row = [
        leaderboard_button(context, &score.beatmap_id, mode),
        render_button(context, &score, 1, mode),
    ]
    .into_iter()
    .flatten()
    .collect();
    let text = format_scores(context.localizer.as_ref(), header, std::slice::from_ref(&score));

    Ok(ReplyPayload::text(text).with_row(row))
}

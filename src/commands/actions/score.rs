//! Single score command handlers.
//!
//! `score` shows a score fetched by its id, `render` also attaches the image
//! produced by the render service. Both remember the beatmap of the score as
//! the last one of the chat.

use futures::{FutureExt, future::BoxFuture};
use log::debug;

use crate::{
    commands::{
        CommandContext,
        actions::{leaderboard_button, render_button, usage_reply},
        command::Command,
        markdown_response::format_scores,
        reply::ReplyPayload,
    },
    servers::Score,
};

/// The `score` command.
pub const SCORE_COMMAND: Command = Command {
    name: "score",
    aliases: &["score", "скор"],
    usage: "[mode] <score_id>",
    need_user_parse: false,
    parse_mods: false,
    handler: handle_score,
};

/// The `render` command.
pub const RENDER_COMMAND: Command = Command {
    name: "render",
    aliases: &["render", "рендер"],
    usage: "[mode] <score_id>",
    need_user_parse: false,
    parse_mods: false,
    handler: handle_render,
};

/// Shows a score by its id.
pub fn handle_score(context: &CommandContext) -> BoxFuture<'_, Result<ReplyPayload, anyhow::Error>> {
    score(context).boxed()
}

/// Renders a score by its id.
pub fn handle_render(context: &CommandContext) -> BoxFuture<'_, Result<ReplyPayload, anyhow::Error>> {
    render(context).boxed()
}

/// Fetches the score given as argument and remembers its beatmap.
///
/// Returns `None` when no score id was given.
async fn fetch_score(context: &CommandContext) -> Result<Option<Score>, anyhow::Error> {
    let Some(score_id) = context.args.nickname.first() else {
        return Ok(None);
    };
    debug!("fetching score {}", score_id);

    let module = &context.module;
    let score = module.remote().get_score(score_id, context.mode()).await?;

    if let Some(room_id) = &context.origin.room_id {
        module.chats().set_last_beatmap(room_id, &score.beatmap_id).await;
    }

    Ok(Some(score))
}

async fn score(context: &CommandContext) -> Result<ReplyPayload, anyhow::Error> {
    let Some(score) = fetch_score(context).await? else {
        return Ok(usage_reply(context, &SCORE_COMMAND));
    };

    let mode = context.mode();
    let score_id = score.score_id.clone().unwrap_or_default();
    let header = context.text("score_header", &[("score", &score_id), ("mode", mode.name())]);
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

async fn render(context: &CommandContext) -> Result<ReplyPayload, anyhow::Error> {
    let Some(renderer) = &context.renderer else {
        return Ok(ReplyPayload::text(context.text("unsupported", &[])));
    };
    let Some(score) = fetch_score(context).await? else {
        return Ok(usage_reply(context, &RENDER_COMMAND));
    };

    let image = renderer.render(&score, context.mode()).await?;
    let score_id = score.score_id.unwrap_or_default();

    Ok(ReplyPayload::text(context.text("render_done", &[("score", &score_id)])).with_image(image))
}

//! Best plays command handler.

use futures::{FutureExt, future::BoxFuture};
use log::debug;

use crate::{
    commands::{
        CommandContext,
        actions::{reference_label, render_button},
        command::Command,
        markdown_response::format_scores,
        reply::ReplyPayload,
    },
    servers::Operation,
};

/// Number of plays shown.
const TOP_LIMIT: usize = 5;

/// The `top` command.
pub const COMMAND: Command = Command {
    name: "top",
    aliases: &["top", "best", "топ", "лучшие"],
    usage: "[mode] [nickname]",
    need_user_parse: true,
    parse_mods: false,
    handler: handle_top,
};

/// Shows the best plays of the targeted player.
///
/// Each play with a score id gets a render button when rendering is enabled.
pub fn handle_top(context: &CommandContext) -> BoxFuture<'_, Result<ReplyPayload, anyhow::Error>> {
    top(context).boxed()
}

async fn top(context: &CommandContext) -> Result<ReplyPayload, anyhow::Error> {
    let module = &context.module;
    let mode = context.mode();
    let reference = context.reference()?;
    let label = reference_label(reference);

    let query = module.user_query(reference, Operation::Top, mode).await?;
    debug!("handling top command for {} in {}", query, mode);

    let scores = module.remote().get_top(&query, mode, TOP_LIMIT).await?;
    if scores.is_empty() {
        return Ok(ReplyPayload::text(context.text(
            "top_empty",
            &[("nickname", label), ("mode", mode.name())],
        )));
    }

    let header = context.text("top_header", &[("nickname", label), ("mode", mode.name())]);
    let row = scores
        .iter()
        .enumerate()
        .filter_map(|(index, score)| render_button(context, score, index + 1, mode))
        .collect();

    Ok(ReplyPayload::text(format_scores(context.localizer.as_ref(), header, &scores)).with_row(row))
}

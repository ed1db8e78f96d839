//! Profile command handler.
//!
//! Fetches the statistics of the targeted player, caches them for the chat
//! leaderboard and offers follow-up buttons for the supported commands.

use futures::{FutureExt, future::BoxFuture};
use log::debug;

use crate::{
    commands::{
        CommandContext,
        actions::{recent, top},
        command::Command,
        markdown_response::format_profile,
        reply::{Button, ReplyPayload},
    },
    servers::Operation,
};

/// The `user` command.
pub const COMMAND: Command = Command {
    name: "user",
    aliases: &["user", "u", "profile", "профиль", "юзер"],
    usage: "[mode] [nickname]",
    need_user_parse: true,
    parse_mods: false,
    handler: handle_user,
};

/// Shows the profile of the targeted player.
pub fn handle_user(context: &CommandContext) -> BoxFuture<'_, Result<ReplyPayload, anyhow::Error>> {
    user(context).boxed()
}

async fn user(context: &CommandContext) -> Result<ReplyPayload, anyhow::Error> {
    let module = &context.module;
    let mode = context.mode();
    debug!("handling user command in {}", mode);

    let query = module
        .user_query(context.reference()?, Operation::Lookup, mode)
        .await?;
    let record = module.remote().get_user(&query, mode).await?;
    module.store().put_record(record.clone()).await;

    let target = module.follow_up_target(&record);
    let mut row = Vec::new();
    if module.capabilities().supports(Operation::Top) {
        row.push(Button {
            label: context.text("button_top", &[]),
            command: context.follow_up(top::COMMAND.name, &[mode.name(), &target]),
        });
    }
    if module.capabilities().supports(Operation::Recent) {
        row.push(Button {
            label: context.text("button_recent", &[]),
            command: context.follow_up(recent::COMMAND.name, &[mode.name(), &target]),
        });
    }

    Ok(ReplyPayload::text(format_profile(context.localizer.as_ref(), &record)).with_row(row))
}

//! Default mode command handler.
//!
//! Sets the mode used when a command is sent without mode. The mode is
//! checked before anything is written.

use futures::{FutureExt, future::BoxFuture};
use log::debug;

use crate::commands::{
    CommandContext, command::Command, follow_up_line, markdown_response::format_modes,
    reply::ReplyPayload,
};

/// The `mode` command.
pub const COMMAND: Command = Command {
    name: "mode",
    aliases: &["mode", "режим", "мод"],
    usage: "<mode>",
    need_user_parse: false,
    parse_mods: false,
    handler: handle_mode,
};

/// Sets the default mode of the sender.
pub fn handle_mode(context: &CommandContext) -> BoxFuture<'_, Result<ReplyPayload, anyhow::Error>> {
    mode(context).boxed()
}

async fn mode(context: &CommandContext) -> Result<ReplyPayload, anyhow::Error> {
    // Trailing tokens mean the first one was not a mode either
    let (Some(mode), true) = (context.args.mode, context.args.full.is_empty()) else {
        debug!("invalid mode arguments {:?}", context.args.full);
        return Ok(ReplyPayload::text(
            context.text("mode_invalid", &[("modes", &format_modes())]),
        ));
    };

    let module = &context.module;
    if !module.store().set_mode(&context.origin.sender_id, mode).await? {
        let set = follow_up_line(context.prefix, module.primary_alias(), "set", &[]);
        return Ok(ReplyPayload::text(
            context.text("no_linked_account", &[("set", &set)]),
        ));
    }

    Ok(ReplyPayload::text(context.text("mode_done", &[("mode", mode.name())])))
}

//! Help command handler.
//!
//! Lists the commands registered on the server module, so servers lacking an
//! operation do not advertise the matching command.
//!
//! This is a stateless command.

use futures::{FutureExt, future::BoxFuture};
use log::debug;

use crate::commands::{
    CommandContext, command::Command, markdown_response::format_help, reply::ReplyPayload,
};

/// The `help` command.
pub const COMMAND: Command = Command {
    name: "help",
    aliases: &["help", "h", "помощь", "хелп"],
    usage: "",
    need_user_parse: false,
    parse_mods: false,
    handler: handle_help,
};

/// Returns formatted help information about the commands of the server.
pub fn handle_help(context: &CommandContext) -> BoxFuture<'_, Result<ReplyPayload, anyhow::Error>> {
    async move {
        debug!("handling help command");

        let module = &context.module;
        let prefix_alias = format!("{}{}", context.prefix, module.primary_alias());

        Ok(ReplyPayload::text(format_help(
            context.localizer.as_ref(),
            module.name(),
            module.link(),
            module.commands(),
            &prefix_alias,
        )))
    }
    .boxed()
}

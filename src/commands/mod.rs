/// Command dispatch: routes `Command` enum variants to their implementations.
pub mod completion;
pub mod containers;
pub mod servers;

use std::io::Write;

use tracing::debug;

use crate::api::Session;
use crate::cli::OutputCtx;
use crate::cli::args::{Command, ContainerCommand, FilesCommand, ServersCommand};
use crate::errors::RackError;

/// Dispatch a parsed `Command` to its handler.
///
/// Handlers validate their arguments before asking `session` for a client.
///
/// # Errors
///
/// Returns `RackError` on any command failure.
pub fn dispatch(
    command: &Command,
    ctx: &OutputCtx,
    session: &dyn Session,
    out: &mut dyn Write,
) -> Result<(), RackError> {
    debug!(?command, format = ?ctx.format, "dispatching");
    match command {
        Command::Servers(ServersCommand::List(args)) => servers::list(args, ctx, session, out),
        Command::Servers(ServersCommand::Get(args)) => servers::get(args, ctx, session, out),
        Command::Files(FilesCommand::Container(command)) => {
            dispatch_container(command, ctx, session, out)
        }
        Command::Completion { shell } => completion::script(*shell, out),
        Command::Complete { path } => completion::candidates(path, out),
    }
}

fn dispatch_container(
    command: &ContainerCommand,
    ctx: &OutputCtx,
    session: &dyn Session,
    out: &mut dyn Write,
) -> Result<(), RackError> {
    match command {
        ContainerCommand::Create(args) => containers::create(args, ctx, session, out),
        ContainerCommand::List(args) => containers::list(args, ctx, session, out),
        ContainerCommand::Get(args) => containers::get(args, ctx, session, out),
        ContainerCommand::Delete(args) => containers::delete(args, ctx, session, out),
        ContainerCommand::Update(args) => containers::update(args, ctx, session, out),
        ContainerCommand::Empty(args) => containers::empty(args, ctx, session, out),
        ContainerCommand::SetMetadata(args) => containers::set_metadata(args, ctx, session, out),
        ContainerCommand::UpdateMetadata(args) => {
            containers::update_metadata(args, ctx, session, out)
        }
        ContainerCommand::GetMetadata(args) => containers::get_metadata(args, ctx, session, out),
        ContainerCommand::DeleteMetadata(args) => {
            containers::delete_metadata(args, ctx, session, out)
        }
    }
}

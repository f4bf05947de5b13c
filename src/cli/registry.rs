/// Command descriptors read from the clap definition.
///
/// Help, completion and dispatch all come from the same `Cli` derive, so the
/// registry cannot drift from what the parser accepts.
use clap::builder::ValueParser;
use clap::{Arg, ArgAction, Command, CommandFactory, value_parser};

use super::args::Cli;

/// Kind of value a flag takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    String,
    Int,
    Bool,
}

/// One `--flag` of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagDescriptor {
    pub name: String,
    pub kind: FlagKind,
    pub description: String,
}

/// One leaf command of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    pub name: String,
    pub usage: String,
    pub about: String,
    pub flags: Vec<FlagDescriptor>,
}

fn find<'a>(root: &'a Command, path: &[&str]) -> Option<&'a Command> {
    path.iter().try_fold(root, |cmd, name| cmd.find_subcommand(name))
}

fn is_integer(parser: &ValueParser) -> bool {
    let id = parser.type_id();
    [
        ValueParser::from(value_parser!(u32)).type_id(),
        ValueParser::from(value_parser!(u64)).type_id(),
    ]
    .contains(&id)
}

fn flag_kind(arg: &Arg) -> FlagKind {
    if matches!(arg.get_action(), ArgAction::SetTrue | ArgAction::SetFalse) {
        FlagKind::Bool
    } else if is_integer(arg.get_value_parser()) {
        FlagKind::Int
    } else {
        FlagKind::String
    }
}

fn flags(cmd: &Command) -> Vec<FlagDescriptor> {
    cmd.get_arguments()
        .filter(|arg| !arg.is_positional() && !arg.is_hide_set() && !arg.is_global_set())
        .filter(|arg| !matches!(arg.get_id().as_str(), "help" | "version"))
        .map(|arg| FlagDescriptor {
            name: arg
                .get_long()
                .map_or_else(|| arg.get_id().to_string(), str::to_owned),
            kind: flag_kind(arg),
            description: arg.get_help().map(ToString::to_string).unwrap_or_default(),
        })
        .collect()
}

fn visible_subcommands(cmd: &Command) -> impl Iterator<Item = &Command> {
    cmd.get_subcommands()
        .filter(|sub| !sub.is_hide_set() && sub.get_name() != "help")
}

/// Descriptors of the commands in group `path`, e.g. `["files", "container"]`,
/// in declaration order. Unknown groups yield nothing.
#[must_use]
pub fn group(path: &[&str]) -> Vec<CommandDescriptor> {
    let root = Cli::command();
    let Some(group) = find(&root, path) else {
        return Vec::new();
    };
    let prefix = path.join(" ");
    visible_subcommands(group)
        .map(|cmd| CommandDescriptor {
            name: cmd.get_name().to_owned(),
            usage: format!("rack {prefix} {} [optional flags]", cmd.get_name()),
            about: cmd.get_about().map(ToString::to_string).unwrap_or_default(),
            flags: flags(cmd),
        })
        .collect()
}

/// Completion candidates for a command path: subcommand names for a group,
/// `--flag` names for a leaf command.
#[must_use]
pub fn complete(path: &[&str]) -> Vec<String> {
    let root = Cli::command();
    let Some(cmd) = find(&root, path) else {
        return Vec::new();
    };
    if cmd.has_subcommands() {
        return visible_subcommands(cmd)
            .map(|sub| sub.get_name().to_owned())
            .collect();
    }
    let Some((name, parent)) = path.split_last() else {
        return Vec::new();
    };
    group(parent)
        .into_iter()
        .find(|descriptor| descriptor.name == *name)
        .map(|descriptor| {
            descriptor
                .flags
                .iter()
                .map(|flag| format!("--{}", flag.name))
                .collect()
        })
        .unwrap_or_default()
}

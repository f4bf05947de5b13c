/// CLI argument definitions via clap derive.
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::Deserialize;

/// rack: manage compute servers and object-store containers.
#[derive(Debug, Parser)]
#[command(
    name = "rack",
    about = "Command-line client for a cloud provider's compute and object-store APIs",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output format. Defaults to the configured `output`, else table.
    #[arg(long, short = 'o', global = true, value_name = "FORMAT")]
    pub output: Option<OutputFormat>,

    /// Shorthand for --output json.
    #[arg(long, global = true, conflicts_with = "output")]
    pub json: bool,

    /// Comma-separated column names to include in table output (case-insensitive).
    #[arg(long, global = true, value_name = "FIELDS")]
    pub fields: Option<String>,

    /// Omit table headers (useful for awk/cut processing).
    #[arg(long, global = true)]
    pub no_header: bool,

    /// Config profile to apply, from `[profiles.<NAME>]`.
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    /// Region, overriding the configured one.
    #[arg(long, global = true, value_name = "REGION")]
    pub region: Option<String>,

    /// Config file to read instead of the default location.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// More diagnostics on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only report errors on stderr.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Tab-aligned columns with a header line.
    #[default]
    Table,
    /// Bordered table.
    Pretty,
    /// JSON array or object (pretty-printed).
    Json,
    /// Compact single-line JSON.
    Compact,
    /// Newline-delimited JSON (one object per line).
    Ndjson,
    /// First column only, one per line.
    Id,
}

impl OutputFormat {
    /// Whether this format is machine-readable JSON.
    #[must_use]
    pub fn is_json(self) -> bool {
        matches!(self, Self::Json | Self::Compact | Self::Ndjson)
    }
}

/// All command groups.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute servers.
    #[command(subcommand)]
    Servers(ServersCommand),
    /// Object storage.
    #[command(subcommand)]
    Files(FilesCommand),
    /// Print a shell completion script.
    Completion {
        /// Target shell.
        shell: Shell,
    },
    /// Print the subcommands or flags of a command path, one per line.
    #[command(hide = true)]
    Complete {
        /// Command path, e.g. `files container create`.
        path: Vec<String>,
    },
}

/// `rack servers` commands.
#[derive(Debug, Subcommand)]
pub enum ServersCommand {
    /// List existing servers.
    List(ServerListArgs),
    /// Retrieve details of a server.
    Get(ServerGetArgs),
}

/// `rack files` commands.
#[derive(Debug, Subcommand)]
pub enum FilesCommand {
    /// Object-store containers.
    #[command(subcommand)]
    Container(ContainerCommand),
}

/// `rack files container` commands.
#[derive(Debug, Subcommand)]
pub enum ContainerCommand {
    /// Create a container.
    Create(ContainerCreateArgs),
    /// List containers.
    List(ContainerListArgs),
    /// Retrieve details of a container.
    Get(ContainerNameArgs),
    /// Delete a container.
    Delete(ContainerDeleteArgs),
    /// Update the access control of a container.
    Update(ContainerUpdateArgs),
    /// Delete every object in a container.
    Empty(ContainerNameArgs),
    /// Replace the metadata of a container.
    SetMetadata(ContainerMetadataArgs),
    /// Add or overwrite metadata keys of a container.
    UpdateMetadata(ContainerMetadataArgs),
    /// Show the metadata of a container.
    GetMetadata(ContainerNameArgs),
    /// Remove metadata keys from a container.
    DeleteMetadata(ContainerDeleteMetadataArgs),
}

/// Positional arguments. Accepted by the parser so that arity errors go
/// through the validator and exit with code 1.
#[derive(Debug, Clone, Default, Args)]
pub struct Positionals {
    #[arg(hide = true, value_name = "ARGS")]
    pub args: Vec<String>,
}

/// Arguments for `rack servers list`.
#[derive(Debug, Clone, Default, Args)]
pub struct ServerListArgs {
    /// Only list servers whose name matches this value.
    #[arg(long)]
    pub name: Option<String>,

    /// Only list servers changed since this ISO 8601 time.
    #[arg(long, value_name = "TIME")]
    pub changes_since: Option<String>,

    /// Only list servers built from this image ID.
    #[arg(long, value_name = "ID")]
    pub image: Option<String>,

    /// Only list servers with this flavor ID.
    #[arg(long, value_name = "ID")]
    pub flavor: Option<String>,

    /// Only list servers in this status, e.g. ACTIVE.
    #[arg(long)]
    pub status: Option<String>,

    /// Start listing after the server with this ID.
    #[arg(long, value_name = "ID")]
    pub marker: Option<String>,

    /// Page size requested from the API.
    #[arg(long, value_name = "N")]
    pub limit: Option<u32>,

    #[command(flatten)]
    pub positionals: Positionals,
}

/// Arguments for `rack servers get`.
#[derive(Debug, Clone, Default, Args)]
pub struct ServerGetArgs {
    /// [required] Server ID.
    #[arg(long)]
    pub id: Option<String>,

    #[command(flatten)]
    pub positionals: Positionals,
}

/// Arguments for `rack files container create`.
#[derive(Debug, Clone, Default, Args)]
pub struct ContainerCreateArgs {
    /// [required] Container name.
    #[arg(long)]
    pub name: Option<String>,

    /// Metadata as comma-separated key=value pairs.
    #[arg(long, value_name = "KEY=VALUE,...")]
    pub metadata: Option<String>,

    /// Read access control list, e.g. `.r:*`.
    #[arg(long, value_name = "ACL")]
    pub container_read: Option<String>,

    /// Write access control list.
    #[arg(long, value_name = "ACL")]
    pub container_write: Option<String>,

    #[command(flatten)]
    pub positionals: Positionals,
}

/// Arguments for `rack files container list`.
#[derive(Debug, Clone, Default, Args)]
pub struct ContainerListArgs {
    /// Maximum number of containers to return.
    #[arg(long, value_name = "N")]
    pub limit: Option<u32>,

    /// Only list containers after this name.
    #[arg(long, value_name = "NAME")]
    pub marker: Option<String>,

    /// Only list containers before this name.
    #[arg(long, value_name = "NAME")]
    pub end_marker: Option<String>,

    /// Only list containers whose name starts with this prefix.
    #[arg(long)]
    pub prefix: Option<String>,

    #[command(flatten)]
    pub positionals: Positionals,
}

/// Arguments for container commands that only take a name.
#[derive(Debug, Clone, Default, Args)]
pub struct ContainerNameArgs {
    /// [required] Container name.
    #[arg(long)]
    pub name: Option<String>,

    #[command(flatten)]
    pub positionals: Positionals,
}

/// Arguments for `rack files container delete`.
#[derive(Debug, Clone, Default, Args)]
pub struct ContainerDeleteArgs {
    /// [required] Container name.
    #[arg(long)]
    pub name: Option<String>,

    /// Delete every object in the container first.
    #[arg(long)]
    pub purge: bool,

    #[command(flatten)]
    pub positionals: Positionals,
}

/// Arguments for `rack files container update`.
#[derive(Debug, Clone, Default, Args)]
pub struct ContainerUpdateArgs {
    /// [required] Container name.
    #[arg(long)]
    pub name: Option<String>,

    /// Read access control list, e.g. `.r:*`.
    #[arg(long, value_name = "ACL")]
    pub container_read: Option<String>,

    /// Write access control list.
    #[arg(long, value_name = "ACL")]
    pub container_write: Option<String>,

    #[command(flatten)]
    pub positionals: Positionals,
}

/// Arguments for `rack files container set-metadata` and `update-metadata`.
#[derive(Debug, Clone, Default, Args)]
pub struct ContainerMetadataArgs {
    /// [required] Container name.
    #[arg(long)]
    pub name: Option<String>,

    /// [required] Metadata as comma-separated key=value pairs.
    #[arg(long, value_name = "KEY=VALUE,...")]
    pub metadata: Option<String>,

    #[command(flatten)]
    pub positionals: Positionals,
}

/// Arguments for `rack files container delete-metadata`.
#[derive(Debug, Clone, Default, Args)]
pub struct ContainerDeleteMetadataArgs {
    /// [required] Container name.
    #[arg(long)]
    pub name: Option<String>,

    /// [required] Comma-separated metadata keys to remove.
    #[arg(long, value_name = "KEY,...")]
    pub metadata_keys: Option<String>,

    #[command(flatten)]
    pub positionals: Positionals,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_positionals_are_accepted() {
        let cli = Cli::try_parse_from(["rack", "servers", "list", "extra"]).unwrap();
        let Command::Servers(ServersCommand::List(args)) = cli.command else {
            panic!("expected servers list");
        };
        assert_eq!(args.positionals.args, ["extra"]);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "rack", "files", "container", "list", "-o", "json", "--region", "ORD", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert_eq!(cli.region.as_deref(), Some("ORD"));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_kebab_case_command_names() {
        let cli = Cli::try_parse_from([
            "rack",
            "files",
            "container",
            "delete-metadata",
            "--name",
            "logs",
            "--metadata-keys",
            "a,b",
        ])
        .unwrap();
        let Command::Files(FilesCommand::Container(ContainerCommand::DeleteMetadata(args))) =
            cli.command
        else {
            panic!("expected delete-metadata");
        };
        assert_eq!(args.metadata_keys.as_deref(), Some("a,b"));
    }
}

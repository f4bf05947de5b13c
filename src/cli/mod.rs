/// CLI layer: argument parsing, validation, the command registry and output formatting.
pub mod args;
pub mod output;
pub mod registry;
pub mod validate;

pub use args::{Cli, OutputFormat};
pub use output::{OutputCtx, resolve_format, write_error};

#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! rack: manage compute servers and object-store containers from the CLI.

mod api;
mod cli;
mod commands;
mod errors;
mod extract;
mod logging;
mod settings;
#[cfg(test)]
mod testing;
mod types;

use std::io::Write;

use clap::Parser;
use config::Map;
use tracing::debug;

use api::HttpSession;
use cli::{Cli, OutputCtx, OutputFormat, resolve_format, write_error};
use errors::RackError;
use settings::{CliOverrides, LoadOptions, Settings};
use types::ErrorOutput;

/// Load settings for `cli`; `env` of `None` reads the process environment.
fn load_settings(cli: &Cli, env: Option<Map<String, String>>) -> Result<Settings, RackError> {
    let settings = Settings::load(LoadOptions {
        config_path: cli.config.clone(),
        profile: cli.profile.clone(),
        env,
    })?;
    Ok(settings.with_cli_overrides(CliOverrides {
        region: cli.region.as_deref(),
    }))
}

fn output_ctx(cli: &Cli, settings: &Settings) -> OutputCtx {
    let format = resolve_format(cli.output, cli.json, settings.output);
    OutputCtx::new(format, cli.fields.as_deref(), cli.no_header)
}

fn fail(err: &RackError, format: OutputFormat) -> ! {
    debug!(code = err.code(), "command failed");
    write_error(&ErrorOutput::from_rack_error(err), format);
    std::process::exit(err.exit_code());
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let settings = match load_settings(&cli, None) {
        Ok(settings) => settings,
        Err(err) => fail(&err, resolve_format(cli.output, cli.json, OutputFormat::Table)),
    };

    let ctx = output_ctx(&cli, &settings);
    let session = HttpSession::new(settings);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = commands::dispatch(&cli.command, &ctx, &session, &mut out)
        .and_then(|()| out.flush().map_err(RackError::from));
    if let Err(err) = result {
        fail(&err, ctx.format);
    }
}

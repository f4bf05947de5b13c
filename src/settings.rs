//! Configuration with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Config file: `$XDG_CONFIG_HOME/rack/config.toml`, or `--config PATH`
//! 3. Profile section: `[profiles.<name>]` of the same file, chosen by
//!    `--profile` or `RACK_PROFILE`
//! 4. Environment variables: `RACK_*` prefix
//! 5. Command-line flags: `CliOverrides`

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat, Map};
use directories::ProjectDirs;
use serde::Deserialize;
use tracing::debug;

use crate::api::Service;
use crate::cli::OutputFormat;

/// Effective settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Provider region, substituted for `{region}` in endpoint templates.
    pub region: String,
    /// Pre-issued token sent as `X-Auth-Token`.
    pub auth_token: Option<String>,
    /// Compute endpoint, e.g. `https://{region}.servers.example.com/v2/123456`.
    pub compute_endpoint: Option<String>,
    /// Object-store endpoint, e.g. `https://storage.{region}.example.com/v1/AUTH_123`.
    pub object_store_endpoint: Option<String>,
    /// Default output format when `--output` is not given.
    pub output: OutputFormat,
    /// HTTP request timeout.
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            region: "DFW".to_owned(),
            auth_token: None,
            compute_endpoint: None,
            object_store_endpoint: None,
            output: OutputFormat::Table,
            timeout_secs: 30,
        }
    }
}

/// One layer of settings; `None` means "inherit".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawSettings {
    region: Option<String>,
    auth_token: Option<String>,
    compute_endpoint: Option<String>,
    object_store_endpoint: Option<String>,
    output: Option<OutputFormat>,
    timeout_secs: Option<u64>,
    /// Profile to apply; only read from the environment layer.
    profile: Option<String>,
    profiles: HashMap<String, RawSettings>,
}

/// Where to load settings from.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file; must exist when given.
    pub config_path: Option<PathBuf>,
    /// Profile section to apply; overrides `RACK_PROFILE`.
    pub profile: Option<String>,
    /// Environment to read `RACK_*` from; `None` reads the process environment.
    pub env: Option<Map<String, String>>,
}

/// Values given as command-line flags, the highest layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliOverrides<'a> {
    pub region: Option<&'a str>,
}

/// Get the XDG config directory for rack.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rack").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the default config file.
#[must_use]
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

fn load_file(path: &Path, required: bool) -> Result<RawSettings, ConfigError> {
    Config::builder()
        .add_source(File::from(path).format(FileFormat::Toml).required(required))
        .build()?
        .try_deserialize()
}

fn load_env(env: Option<Map<String, String>>) -> Result<RawSettings, ConfigError> {
    Config::builder()
        .add_source(
            Environment::with_prefix("RACK")
                .prefix_separator("_")
                .source(env),
        )
        .build()?
        .try_deserialize()
}

impl Settings {
    /// Overlay the scalar values set in `raw`.
    #[must_use]
    fn merge_with(mut self, raw: &RawSettings) -> Self {
        if let Some(region) = &raw.region {
            self.region.clone_from(region);
        }
        if raw.auth_token.is_some() {
            self.auth_token.clone_from(&raw.auth_token);
        }
        if raw.compute_endpoint.is_some() {
            self.compute_endpoint.clone_from(&raw.compute_endpoint);
        }
        if raw.object_store_endpoint.is_some() {
            self.object_store_endpoint.clone_from(&raw.object_store_endpoint);
        }
        if let Some(output) = raw.output {
            self.output = output;
        }
        if let Some(timeout) = raw.timeout_secs {
            self.timeout_secs = timeout;
        }
        self
    }

    /// Load settings with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a file or variable cannot be parsed, the
    /// explicit config file is missing, or the requested profile is not
    /// defined.
    pub fn load(opts: LoadOptions) -> Result<Self, ConfigError> {
        let (path, required) = match opts.config_path {
            Some(path) => (Some(path), true),
            None => (global_config_path(), false),
        };
        let file = match &path {
            Some(path) => load_file(path, required)?,
            None => RawSettings::default(),
        };
        let env = load_env(opts.env)?;

        let mut current = Self::default().merge_with(&file);

        if let Some(name) = opts.profile.or_else(|| env.profile.clone()) {
            // The config crate lowercases table keys.
            let profile = file.profiles.get(&name.to_lowercase()).ok_or_else(|| {
                ConfigError::Message(format!("profile '{name}' is not defined in the config file"))
            })?;
            debug!(profile = %name, "applying profile");
            current = current.merge_with(profile);
        }

        current = current.merge_with(&env);
        debug!(?path, region = %current.region, "settings loaded");
        Ok(current)
    }

    /// Apply command-line flags over every loaded layer.
    #[must_use]
    pub fn with_cli_overrides(mut self, overrides: CliOverrides<'_>) -> Self {
        if let Some(region) = overrides.region {
            region.clone_into(&mut self.region);
        }
        self
    }

    /// Endpoint for `service`, with `{region}` replaced by the lowercased region.
    #[must_use]
    pub fn endpoint(&self, service: Service) -> Option<String> {
        let template = match service {
            Service::Compute => self.compute_endpoint.as_deref(),
            Service::ObjectStore => self.object_store_endpoint.as_deref(),
        }?;
        Some(template.replace("{region}", &self.region.to_lowercase()))
    }
}

//! Config command

use anyhow::{anyhow, Result};
use camino::Utf8Path;
use secretgate_core::{CredentialConfig, SecretsConfig};
use secretgate_secrets::resolve_credentials;

use crate::cli::{ConfigCommands, ConfigShowArgs};
use crate::output;

const MASK: &str = "********";

pub fn run(cmd: ConfigCommands, config_path: Option<&Utf8Path>) -> Result<()> {
    match cmd {
        ConfigCommands::Validate => validate(config_path),
        ConfigCommands::Show(args) => show(args, config_path),
    }
}

fn validate(config_path: Option<&Utf8Path>) -> Result<()> {
    let loaded = super::load_config(config_path)?;
    let config = loaded.inner();

    let mut failures = 0;
    for kind in config.configured_backends() {
        let connection = config.connection(kind)?;
        match resolve_credentials(&connection.credentials) {
            Ok(strategy) => {
                output::kv(kind.as_str(), &format!("{} ({})", connection.region, strategy.name()))
            }
            Err(e) => {
                failures += 1;
                output::warning(&format!("{}: {}", kind, e));
            }
        }
    }

    if failures > 0 {
        return Err(anyhow!(
            "{} backend(s) have invalid credential settings",
            failures
        ));
    }

    output::success(&format!("Configuration is valid: {}", loaded.config_path));
    output::kv("Default provider", config.default_provider.as_str());
    output::kv(
        "Cache refresh interval",
        &format!("{}s", config.cache.refresh_interval_secs),
    );
    Ok(())
}

fn show(args: ConfigShowArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let loaded = super::load_config(config_path)?;
    let config = masked(loaded.config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        print!("{}", serde_yaml_ng::to_string(&config)?);
    }

    Ok(())
}

/// Replace secret key material with a fixed mask
fn masked(mut config: SecretsConfig) -> SecretsConfig {
    for kind in config.configured_backends() {
        if let Some(connection) = config.connection_mut(kind).as_mut() {
            mask_credentials(&mut connection.credentials);
        }
    }
    config
}

fn mask_credentials(credentials: &mut CredentialConfig) {
    for field in [&mut credentials.secret_key, &mut credentials.session_token] {
        if field.as_deref().is_some_and(|v| !v.is_empty()) {
            *field = Some(MASK.to_string());
        }
    }
}

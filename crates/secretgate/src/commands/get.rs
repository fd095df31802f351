//! Get command

use anyhow::{Context, Result};
use camino::Utf8Path;
use secretgate_secrets::SecretServiceFactory;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

use crate::cli::GetArgs;
use crate::output;

pub async fn run(
    args: GetArgs,
    config_path: Option<&Utf8Path>,
    cancel: CancellationToken,
) -> Result<()> {
    let loaded = super::load_config(config_path)?;
    let factory = SecretServiceFactory::new(loaded.config);
    let kind = args.provider.unwrap_or(factory.config().default_provider);

    let service = factory
        .create_service_for(kind)
        .await
        .with_context(|| format!("Failed to create {} service", kind))?;

    let mut values = BTreeMap::new();
    for key in &args.keys {
        let value = service
            .get_secret(key, &cancel)
            .await
            .with_context(|| format!("Failed to read '{}' from {}", key, kind))?;
        values.insert(key.as_str(), value);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&values)?);
    } else if values.len() == 1 {
        for value in values.values() {
            println!("{}", value);
        }
    } else {
        for (key, value) in &values {
            println!("{}={}", key, value);
        }
    }

    if args.stats {
        let stats = factory.cache(kind).stats();
        output::header(&format!("Cache statistics ({})", kind));
        output::kv("Entries", &stats.entries.to_string());
        output::kv("Hits", &stats.hits.to_string());
        output::kv("Misses", &stats.misses.to_string());
        output::kv("Fills", &stats.fills.to_string());
        output::kv("Expirations", &stats.expirations.to_string());
        output::kv("Hit rate", &format!("{:.1}%", stats.hit_rate()));
    }

    Ok(())
}

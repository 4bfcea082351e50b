//! Example AppHost: declares a Firebird server with one database and prints the
//! deployment manifest.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! Reads `apphost.json` (or `FIREBIRD_HOSTING_CONFIG`) when present.

use firebird_hosting::config::{DatabaseConfig, ServerConfig};
use firebird_hosting::{apply, config_path, load_from_path, manifest, parameters_from_env, HostConfig};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("firebird_hosting=info")),
        )
        .init();

    let path = config_path();
    let mut config = if Path::new(&path).exists() {
        load_from_path(&path).await?
    } else {
        tracing::info!(path = %path, "no config file; using the default firebird server");
        default_config()
    };
    config.merge_parameters(parameters_from_env());

    let mut builder = config.builder();
    apply(&config, &mut builder)?;
    let app = builder.build();

    let manifest = manifest::build(app.model());
    println!("{}", serde_json::to_string_pretty(&manifest)?);
    Ok(())
}

fn default_config() -> HostConfig {
    HostConfig {
        servers: vec![ServerConfig {
            name: "firebird".into(),
            databases: vec![DatabaseConfig {
                name: "testDb".into(),
                database_name: None,
            }],
            ..ServerConfig::default()
        }],
        ..HostConfig::default()
    }
}

//! Show command implementation

use anyhow::{Context, Result};
use clap::Args;
use envlayer::{ConfigLoader, ConfigType, DirSource, LoadRequest};
use std::path::PathBuf;

#[derive(Args)]
pub struct ShowArgs {
    /// Directory holding the base and per-environment config files
    #[arg(long, value_name = "DIR", env = "ENVLAYER_DIR")]
    pub dir: PathBuf,

    /// Base config file name, without extension
    #[arg(long, value_name = "NAME", default_value = "config", env = "ENVLAYER_BASE")]
    pub base: String,

    /// Config file format: json, yaml, yml or toml
    #[arg(short, long, value_name = "FORMAT", default_value = "json", env = "ENVLAYER_FORMAT")]
    pub format: ConfigType,

    /// Variable that selects the environment
    #[arg(long, value_name = "VAR", default_value = "APP_ENV", env = "ENVLAYER_ENV_KEY")]
    pub env_key: String,

    /// Environment used when the selecting variable is unset or empty
    #[arg(long, value_name = "ENV", default_value = "dev", env = "ENVLAYER_DEFAULT_ENV")]
    pub default_env: String,

    /// Prefix for bound variables and secret file names
    #[arg(long, value_name = "PREFIX", default_value = "app", env = "ENVLAYER_PREFIX")]
    pub prefix: String,

    /// Variable that names the secret-store directory
    #[arg(
        long,
        value_name = "VAR",
        default_value = "APP_SECRETS_DIR",
        env = "ENVLAYER_SECRETS_DIR_KEY"
    )]
    pub secrets_dir_key: String,

    /// Do not override config keys from prefixed environment variables
    #[arg(long)]
    pub no_env_binding: bool,

    /// Only print the subtree at this dotted key
    #[arg(long, value_name = "KEY")]
    pub key: Option<String>,
}

pub fn run(args: ShowArgs) -> Result<()> {
    if !args.dir.is_dir() {
        anyhow::bail!("Config directory not found: {}", args.dir.display());
    }

    let request = LoadRequest::new(&args.env_key, &args.default_env, &args.prefix, args.format)
        .secrets_dir_key(&args.secrets_dir_key)
        .bind_env(!args.no_env_binding);

    let loaded = ConfigLoader::new(request)
        .load(&DirSource::new(&args.dir), &args.base)
        .with_context(|| format!("Failed loading configuration from {}", args.dir.display()))?;

    let config = match &args.key {
        Some(key) => loaded
            .extract_inner::<serde_json::Value>(key)
            .with_context(|| format!("Key not found in merged configuration: {key}"))?,
        None => loaded.to_value()?,
    };

    let output = serde_json::json!({
        "environment": loaded.environment().as_str(),
        "files": loaded.files(),
        "config": config,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

//! Secrets command implementation

use anyhow::{Context, Result};
use clap::Args;
use envlayer::config::EnvVars;
use envlayer::secrets::{load_secrets, secrets_dir_from};
use std::path::PathBuf;

use super::utils::{mask_secret, single_line};

#[derive(Args)]
pub struct SecretsArgs {
    /// Prefix for secret file names
    #[arg(long, value_name = "PREFIX", default_value = "app", env = "ENVLAYER_PREFIX")]
    pub prefix: String,

    /// Secret-store directory (overrides the variable named by --secrets-dir-key)
    #[arg(long, value_name = "DIR")]
    pub secrets_dir: Option<PathBuf>,

    /// Variable that names the secret-store directory
    #[arg(
        long,
        value_name = "VAR",
        default_value = "APP_SECRETS_DIR",
        env = "ENVLAYER_SECRETS_DIR_KEY"
    )]
    pub secrets_dir_key: String,

    /// Print secret values instead of masking them
    #[arg(long)]
    pub reveal: bool,
}

pub fn run(args: SecretsArgs) -> Result<()> {
    let dir = match args.secrets_dir {
        Some(dir) => dir,
        None => secrets_dir_from(&EnvVars::capture(), &args.secrets_dir_key),
    };
    if dir.as_os_str().is_empty() {
        println!("No secret store configured (set {} or pass --secrets-dir)", args.secrets_dir_key);
        return Ok(());
    }

    let secrets = load_secrets(&dir, &args.prefix)
        .with_context(|| format!("Failed reading secret store {}", dir.display()))?;

    if secrets.is_empty() {
        println!("No secrets found in {}", dir.display());
        return Ok(());
    }

    for (key, value) in &secrets {
        let shown = if args.reveal { single_line(value) } else { mask_secret(value) };
        println!("{key} = {shown}");
    }
    Ok(())
}

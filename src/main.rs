//! envlayer: inspect layered per-environment configuration
//!
//! Loads a base config, merges the environment overlay, binds prefixed
//! environment variables and applies secret-store overrides, then prints
//! the result.

use anyhow::Result;

mod cli;

fn main() -> Result<()> {
    cli::run()
}

//! Command-line parsing
//!
//! Flags override the config file and environment. The `config` subcommand
//! inspects or regenerates the config file instead of starting the UI.

use crate::config::{Config, Overrides, ProductSource, VERSION};
use anyhow::Context as _;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use venta_nexus::ReloadPolicy;

/// Venta Libre Bolivia - marketplace client for the terminal
#[derive(Debug, Parser)]
#[command(name = "venta-libre")]
#[command(version = VERSION)]
#[command(about = "Marketplace client for the terminal", long_about = None)]
pub struct Cli {
    /// Base URL of the REST API
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Use generated products on the home page
    #[arg(long, conflicts_with = "api")]
    pub mock: bool,

    /// Load products from GET /products
    #[arg(long)]
    pub api: bool,

    /// Path shown first, e.g. /users
    #[arg(long, value_name = "PATH")]
    pub start: Option<String>,

    /// When navigating to the mounted page remounts it
    #[arg(long, value_name = "POLICY", value_parser = parse_policy)]
    pub policy: Option<ReloadPolicy>,

    /// Config file to read instead of the default location
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Write a config file with the default values
        #[arg(long)]
        reset: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

fn parse_policy(raw: &str) -> Result<ReloadPolicy, String> {
    raw.parse()
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        let source = if self.api {
            Some(ProductSource::Api)
        } else if self.mock {
            Some(ProductSource::Mock)
        } else {
            None
        };
        Overrides {
            api_url: self.api_url.clone(),
            source,
            start_path: self.start.clone(),
            reload_policy: self.policy,
        }
    }

    fn config_file(&self) -> Option<PathBuf> {
        self.config.clone().or_else(Config::config_path)
    }

    /// Runs the `config` subcommand, if given. Returns true when the process
    /// should exit afterwards.
    pub fn handle_command(&self) -> anyhow::Result<bool> {
        let Some(Commands::Config { show, reset, path }) = &self.command else {
            return Ok(false);
        };

        if *path {
            let file = self.config_file().context("could not determine config path")?;
            println!("{}", file.display());
        } else if *show {
            let config = Config::load(self.config.as_deref(), &self.overrides())?;
            println!("# Effective configuration (flags > env > file > defaults)");
            println!();
            print!("{}", config.to_toml());
        } else if *reset {
            let file = self.config_file().context("could not determine config path")?;
            if let Some(dir) = file.parent() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("creating {}", dir.display()))?;
            }
            std::fs::write(&file, Config::default().to_toml())
                .with_context(|| format!("writing {}", file.display()))?;
            println!("Wrote defaults to {}", file.display());
        } else {
            println!("Usage: venta-libre config [--show|--reset|--path]");
            println!();
            println!("Options:");
            println!("  --show   Display effective configuration");
            println!("  --reset  Write a config file with the default values");
            println!("  --path   Show config file path");
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "venta-libre",
            "--api-url",
            "http://api.test/v1",
            "--api",
            "--start",
            "/users",
            "--policy",
            "always",
        ])
        .unwrap();
        let overrides = cli.overrides();
        assert_eq!(overrides.api_url.as_deref(), Some("http://api.test/v1"));
        assert_eq!(overrides.source, Some(ProductSource::Api));
        assert_eq!(overrides.start_path.as_deref(), Some("/users"));
        assert_eq!(overrides.reload_policy, Some(ReloadPolicy::Always));
    }

    #[test]
    fn test_no_flags_override_nothing() {
        let cli = Cli::try_parse_from(["venta-libre"]).unwrap();
        let overrides = cli.overrides();
        assert!(overrides.api_url.is_none());
        assert!(overrides.source.is_none());
        assert!(overrides.reload_policy.is_none());
    }

    #[test]
    fn test_mock_and_api_conflict() {
        assert!(Cli::try_parse_from(["venta-libre", "--mock", "--api"]).is_err());
        assert!(Cli::try_parse_from(["venta-libre", "--policy", "sometimes"]).is_err());
    }
}

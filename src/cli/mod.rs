//! Command line arguments.
//!
//! The service is configured through the environment; flags given here take
//! precedence over the matching variables.

use crate::config::Config;
use clap::Parser;

/// Webhook service that builds single-page apps with an LLM and deploys them to GitHub Pages.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Address to bind (overrides HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory for rolling log files (overrides LOG_DIR)
    #[arg(long)]
    pub log_dir: Option<String>,
}

impl Cli {
    /// Applies the flags that were given on top of `config`.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(dir) = &self.log_dir {
            config.log.dir = Some(dir.clone());
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config::from_lookup(|key| match key {
            "MY_SECRET" => Some("s".to_string()),
            "GITHUB_TOKEN" => Some("t".to_string()),
            "GOOGLE_API_KEY" => Some("k".to_string()),
            "PORT" => Some("9000".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn flags_override_environment() {
        let cli = Cli::parse_from(["app-deployer", "--host", "127.0.0.1", "-p", "8081"]);
        let config = cli.apply(base_config());
        assert_eq!(config.bind_addr(), "127.0.0.1:8081");
    }

    #[test]
    fn no_flags_keep_environment() {
        let cli = Cli::parse_from(["app-deployer"]);
        let config = cli.apply(base_config());
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
        assert!(config.log.dir.is_none());
    }
}

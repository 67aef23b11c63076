//! CLI argument definitions

use clap::Parser;
use scrollback::config::{
    default_public_url, Config, DEFAULT_BANK_SIZE, DEFAULT_BOT_NAME, DEFAULT_PORT, DEFAULT_UPSTREAM,
};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "scrollback")]
#[command(about = "Keeps recent chat history and serves extracts of it", long_about = None)]
#[command(version)]
pub struct Cli {
    /// HTTP port
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// HTTP bind address
    #[arg(long, env = "BIND", default_value = "127.0.0.1")]
    pub bind: IpAddr,

    /// Public base URL for generated links (default: http://localhost:<port>)
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Number of messages to retain
    #[arg(long, env = "BANK_SIZE", default_value_t = DEFAULT_BANK_SIZE, value_parser = parse_bank_size)]
    pub bank_size: usize,

    /// Chat service WebSocket URL
    #[arg(long, env = "DEVZAT_HOST", default_value = DEFAULT_UPSTREAM)]
    pub upstream: String,

    /// Chat service bot token
    #[arg(long, env = "DEVZAT_TOKEN")]
    pub token: String,

    /// Display name for replies
    #[arg(long, env = "BOT_NAME", default_value = DEFAULT_BOT_NAME)]
    pub bot_name: String,

    /// HTTP request timeout, e.g. "10s"
    #[arg(long, env = "REQUEST_TIMEOUT", default_value = "10s", value_parser = humantime::parse_duration)]
    pub request_timeout: Duration,

    /// Log level
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn to_config(&self) -> Config {
        let port = self.port;
        let public_url = self.host.clone().unwrap_or_else(|| default_public_url(port));

        Config::new(self.token.clone())
            .bind_addr(SocketAddr::new(self.bind, port))
            .public_url(public_url)
            .bank_size(self.bank_size)
            .upstream_url(self.upstream.clone())
            .bot_name(self.bot_name.clone())
            .request_timeout(self.request_timeout)
    }
}

fn parse_bank_size(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("Bank size must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("Invalid bank size: {}. {}", s, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["scrollback", "--token", "t"]).unwrap();
        let config = cli.to_config();

        assert_eq!(config.token, "t");
        assert_eq!(config.bot_name, "Devzat-extractor");
        assert!(config.public_url.ends_with(&config.bind_addr.port().to_string()) || cli.host.is_some());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "scrollback",
            "--token",
            "t",
            "--port",
            "9000",
            "--host",
            "https://extract.example.com",
            "--bank-size",
            "50",
            "--request-timeout",
            "30s",
        ])
        .unwrap();
        let config = cli.to_config();

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.public_url, "https://extract.example.com");
        assert_eq!(config.bank_size, 50);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_cli_rejects_zero_bank_size() {
        assert!(Cli::try_parse_from(["scrollback", "--token", "t", "--bank-size", "0"]).is_err());
    }
}

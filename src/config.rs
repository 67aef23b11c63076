//! Service configuration

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;

pub const DEFAULT_BANK_SIZE: usize = 1000;

pub const DEFAULT_UPSTREAM: &str = "ws://devzat.hackclub.com:5556";

pub const DEFAULT_BOT_NAME: &str = "Devzat-extractor";

/// Runtime configuration for the extractor
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,

    /// Public base URL used in generated links, e.g. "https://extract.example.com"
    pub public_url: String,

    /// Ring store capacity (messages retained)
    pub bank_size: usize,

    /// Chat service WebSocket URL
    pub upstream_url: String,

    /// Chat service bot token
    pub token: String,

    /// Display name used for replies
    pub bot_name: String,

    /// Per-request timeout for the HTTP endpoint
    pub request_timeout: Duration,
}

impl Config {
    /// Create a configuration with defaults for everything but the token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT),
            public_url: default_public_url(DEFAULT_PORT),
            bank_size: DEFAULT_BANK_SIZE,
            upstream_url: DEFAULT_UPSTREAM.to_string(),
            token: token.into(),
            bot_name: DEFAULT_BOT_NAME.to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Set the bind address; the public URL follows the port unless set later
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self.public_url = default_public_url(addr.port());
        self
    }

    pub fn public_url(mut self, url: impl Into<String>) -> Self {
        self.public_url = url.into();
        self
    }

    /// Set the ring capacity (at least 1)
    pub fn bank_size(mut self, size: usize) -> Self {
        self.bank_size = size.max(1);
        self
    }

    pub fn upstream_url(mut self, url: impl Into<String>) -> Self {
        self.upstream_url = url.into();
        self
    }

    pub fn bot_name(mut self, name: impl Into<String>) -> Self {
        self.bot_name = name.into();
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Public URL when none is configured
pub fn default_public_url(port: u16) -> String {
    format!("http://localhost:{}", port)
}

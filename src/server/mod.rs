pub mod form;
pub mod http;
pub mod page;

use anyhow::{Context, Result};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs};
use std::time::Duration;

use crate::config::Config;

pub fn serve(config: &Config) -> Result<()> {
    http::run_server(config)
}

/// Probe `/health` on the configured address.
pub fn status(config: &Config) -> Result<()> {
    let addr = probe_addr(&config.server.bind)?;
    let url = format!("http://{}/health", addr);
    let agent = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(2)))
        .build()
        .new_agent();
    match agent.get(&url).call() {
        Ok(_) => eprintln!("titanic-predictor: running on {}", addr),
        Err(_) => eprintln!("titanic-predictor: not responding on {}", addr),
    }
    Ok(())
}

/// Address a local client should dial for a bind address; wildcard binds
/// are reached over loopback.
fn probe_addr(bind: &str) -> Result<SocketAddr> {
    let mut addr = bind
        .to_socket_addrs()
        .with_context(|| format!("invalid bind address '{}'", bind))?
        .next()
        .with_context(|| format!("bind address '{}' resolved to nothing", bind))?;
    if addr.ip().is_unspecified() {
        let loopback = match addr.ip() {
            IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::LOCALHOST),
        };
        addr.set_ip(loopback);
    }
    Ok(addr)
}

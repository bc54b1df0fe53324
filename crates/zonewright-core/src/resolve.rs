// ── Name server address resolution ──
//
// Name servers may be multi-homed; every address they resolve to is
// allowed to transfer zones.

use std::net::{IpAddr, ToSocketAddrs};

use tracing::warn;

pub trait HostResolver {
    /// All addresses of `host`, deduplicated, empty if it does not resolve.
    fn resolve(&self, host: &str) -> Vec<IpAddr>;
}

/// Resolves through the system resolver (`getaddrinfo`).
#[derive(Debug, Clone, Default)]
pub struct SystemResolver;

impl HostResolver for SystemResolver {
    fn resolve(&self, host: &str) -> Vec<IpAddr> {
        let host = host.trim_end_matches('.');
        match (host, 0).to_socket_addrs() {
            Ok(addrs) => {
                let mut ips: Vec<IpAddr> = Vec::new();
                for ip in addrs.map(|a| a.ip()) {
                    if !ips.contains(&ip) {
                        ips.push(ip);
                    }
                }
                ips
            }
            Err(err) => {
                warn!(host, error = %err, "cannot resolve name server");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ip_literal_resolves_to_itself() {
        let ips = SystemResolver.resolve("192.0.2.53");
        assert_eq!(ips, vec!["192.0.2.53".parse::<IpAddr>().unwrap()]);
    }

    #[test]
    fn unresolvable_host_yields_nothing() {
        assert!(SystemResolver.resolve("does-not-exist.invalid.").is_empty());
    }
}

use async_trait::async_trait;
use std::net::IpAddr;

/// Host name resolution collaborator
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Resolves `host` to a single address, or `None` if it cannot be resolved
    async fn resolve(&self, host: &str) -> Option<IpAddr>;
}

/// [`HostResolver`] using the system resolver
///
/// IP-literal hosts are returned without a lookup. When a name resolves to
/// several addresses an IPv4 one is preferred.
#[derive(Debug, Clone, Copy, Default)]
pub struct DnsResolver;

#[async_trait]
impl HostResolver for DnsResolver {
    async fn resolve(&self, host: &str) -> Option<IpAddr> {
        let bare = host.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = bare.parse::<IpAddr>() {
            return Some(ip);
        }

        match tokio::net::lookup_host((bare, 0)).await {
            Ok(addrs) => {
                let addrs: Vec<IpAddr> = addrs.map(|addr| addr.ip()).collect();
                addrs
                    .iter()
                    .find(|ip| ip.is_ipv4())
                    .or_else(|| addrs.first())
                    .copied()
            }
            Err(e) => {
                tracing::debug!("Failed to resolve {}: {}", host, e);
                None
            }
        }
    }
}

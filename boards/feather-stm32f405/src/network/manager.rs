#![deny(unsafe_code)]
#![deny(warnings)]
//! Uplink bring-up
//!
//! Waits for the DHCP lease and resolves the collector once, before the
//! egress and control loops start.

use defmt::{info, warn};
use embassy_net::dns::DnsQueryType;
use embassy_net::{IpEndpoint, Stack};
use gateway_core::config::CollectorConfig;

use super::error::NetworkError;

/// Block until DHCP has leased an address, then log the lease
///
/// Neither the collector nor the control listener can work before this, so
/// the network task runs nothing else until it returns.
pub async fn wait_for_uplink(stack: &Stack<'_>) {
    info!("Uplink: waiting for DHCP lease");
    stack.wait_config_up().await;

    let Some(lease) = stack.config_v4() else {
        info!("Uplink up without an IPv4 lease");
        return;
    };
    let ip = lease.address.address().octets();
    info!(
        "Uplink up: address {}.{}.{}.{}/{}",
        ip[0],
        ip[1],
        ip[2],
        ip[3],
        lease.address.prefix_len()
    );
    match lease.gateway {
        Some(router) => {
            let r = router.octets();
            info!("Uplink router {}.{}.{}.{}", r[0], r[1], r[2], r[3]);
        }
        None => info!("Uplink has no router; collector must be on-link"),
    }
    info!("Uplink DNS servers: {}", lease.dns_servers.len());
}

/// Resolve the collector host to an endpoint
///
/// Dotted IPv4 literals resolve without a DNS round trip.
pub async fn resolve_collector(
    stack: &Stack<'_>,
    collector: &CollectorConfig,
) -> Result<IpEndpoint, NetworkError> {
    let addrs = stack
        .dns_query(collector.host, DnsQueryType::A)
        .await
        .map_err(|e| {
            warn!(
                "DNS query for {} failed: {:?}",
                collector.host,
                defmt::Debug2Format(&e)
            );
            NetworkError::DnsError
        })?;

    let addr = addrs.first().copied().ok_or(NetworkError::DnsError)?;
    info!(
        "Collector {} resolved ({:?}), port {}",
        collector.host,
        defmt::Debug2Format(&addr),
        collector.port
    );
    Ok(IpEndpoint::new(addr, collector.port))
}

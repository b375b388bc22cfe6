//! ==============================================================================
//! netinfo.rs - lan address for the startup banner
//! ==============================================================================
//!
//! the readers need the machine's lan ip, not 0.0.0.0. connecting a udp
//! socket picks the outbound interface without sending anything.
//!
//! ==============================================================================

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// best-effort outbound lan address, loopback if there is no route
pub fn local_ip() -> IpAddr {
    probe().unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

fn probe() -> std::io::Result<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect("8.8.8.8:80")?;
    Ok(socket.local_addr()?.ip())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_returns_an_ipv4_address() {
        // offline machines fall back to loopback
        assert!(local_ip().is_ipv4());
    }
}

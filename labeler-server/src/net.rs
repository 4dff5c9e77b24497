//! Network helpers for the startup banner

use std::net::{IpAddr, UdpSocket};

/// Best-effort LAN address of this machine
///
/// Connecting a UDP socket sends no packets; it only makes the OS pick the
/// outbound interface, whose address is then read back.
pub fn local_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    socket.local_addr().ok().map(|addr| addr.ip())
}

/// URL other labelers on the network can open
pub fn share_url(ip: IpAddr, port: u16) -> String {
    format!("http://{}:{}", ip, port)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_share_url() {
        let ip = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20));
        assert_eq!(share_url(ip, 5001), "http://192.168.1.20:5001");
    }
}

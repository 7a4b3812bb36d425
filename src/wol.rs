use crate::error::BraviaError;
use std::fmt;
use std::str::FromStr;
use tokio::net::UdpSocket;

/// Wake-on-LAN discard port
const WOL_PORT: u16 = 9;

/// 48-bit hardware (MAC) address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacAddr([u8; 6]);

impl MacAddr {
    /// Get the raw octets
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl FromStr for MacAddr {
    type Err = BraviaError;

    /// Parse a colon- or dash-separated address such as `AA:BB:CC:DD:EE:FF`
    fn from_str(s: &str) -> Result<Self, BraviaError> {
        let parts: Vec<&str> = s.split([':', '-']).collect();
        if parts.len() != 6 {
            return Err(BraviaError::InvalidMacAddr(s.to_string()));
        }
        let mut octets = [0u8; 6];
        for (octet, part) in octets.iter_mut().zip(&parts) {
            *octet = u8::from_str_radix(part, 16)
                .map_err(|_| BraviaError::InvalidMacAddr(s.to_string()))?;
        }
        Ok(MacAddr(octets))
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

/// Build the magic packet: six `0xFF` bytes followed by the address 16 times
pub(crate) fn magic_packet(mac: MacAddr) -> [u8; 102] {
    let mut packet = [0xffu8; 102];
    for chunk in packet[6..].chunks_exact_mut(6) {
        chunk.copy_from_slice(&mac.0);
    }
    packet
}

/// Broadcast the magic packet for the given address
pub(crate) async fn send_magic_packet(mac: MacAddr) -> crate::error::Result<()> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.set_broadcast(true)?;
    let packet = magic_packet(mac);
    socket.send_to(&packet, ("255.255.255.255", WOL_PORT)).await?;
    tracing::debug!(%mac, "sent wake-on-LAN packet");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_colon_and_dash_separators() {
        let a: MacAddr = "AA:BB:CC:DD:EE:FF".parse().unwrap();
        let b: MacAddr = "aa-bb-cc-dd-ee-ff".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.octets(), [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!("AA:BB:CC:DD:EE".parse::<MacAddr>().is_err());
        assert!("AA:BB:CC:DD:EE:GG".parse::<MacAddr>().is_err());
        assert!("".parse::<MacAddr>().is_err());
    }

    #[test]
    fn magic_packet_is_header_plus_sixteen_repetitions() {
        let mac: MacAddr = "AA:BB:CC:DD:EE:FF".parse().unwrap();
        let packet = magic_packet(mac);
        assert_eq!(packet.len(), 102);
        assert_eq!(&packet[..6], &[0xff; 6]);
        for chunk in packet[6..].chunks_exact(6) {
            assert_eq!(chunk, &[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        }
    }

    #[test]
    fn displays_upper_hex() {
        let mac: MacAddr = "aa:0b:cc:dd:ee:ff".parse().unwrap();
        assert_eq!(mac.to_string(), "AA:0B:CC:DD:EE:FF");
    }
}

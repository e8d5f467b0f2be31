use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::ops::Range;

use crate::error::SampQueryError;
use crate::parse::{get_bytes, get_u16, get_u32};

/// Every request and reply starts with this tag.
pub const MAGIC: &[u8; 4] = b"SAMP";

/// Magic + 4 address octets + 2 port bytes + opcode.
pub const HEADER_LEN: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Server name, game mode, language and player counts.
    ///
    /// To be parsed by [crate::info::ServerInfo::parse].
    Info,
    /// Server configuration key/value pairs.
    ///
    /// To be parsed by [crate::rules::ServerRules::parse].
    Rules,
    /// Detailed player list: id, name, score and ping.
    ///
    /// To be parsed by [crate::players::Player::parse_list].
    Players,
}

/// Convert a u8 into an [Opcode].
impl TryFrom<u8> for Opcode {
    type Error = SampQueryError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            b'i' => Ok(Opcode::Info),
            b'r' => Ok(Opcode::Rules),
            b'd' => Ok(Opcode::Players),
            n => Err(SampQueryError::MalformedReply(format!(
                "unknown opcode 0x{n:02x}"
            ))),
        }
    }
}

/// For packing an [Opcode] into a packet in [RequestPacket::pack].
impl Opcode {
    pub fn to_byte(self) -> u8 {
        match self {
            Opcode::Info => b'i',    // 0x69
            Opcode::Rules => b'r',   // 0x72
            Opcode::Players => b'd', // 0x64
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(self.to_byte()))
    }
}

/// A validated server address: literal IPv4 plus a non-zero port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    address: Ipv4Addr,
    port: u16,
}

impl Endpoint {
    /// Parse a dotted-quad address. Hostnames must be resolved beforehand,
    /// see [crate::query::resolve_host].
    pub fn new(address: &str, port: u32) -> Result<Self, SampQueryError> {
        let address: Ipv4Addr = address
            .trim()
            .parse()
            .map_err(|_| SampQueryError::InvalidAddress(address.to_owned()))?;
        Self::from_addr(address, port)
    }

    pub fn from_addr(address: Ipv4Addr, port: u32) -> Result<Self, SampQueryError> {
        let port = u16::try_from(port)
            .ok()
            .filter(|p| *p != 0)
            .ok_or(SampQueryError::InvalidPort(port))?;
        Ok(Endpoint { address, port })
    }

    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.address, self.port))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

/// Field widths differ between server releases.
///
/// Both variants reserve 4 bytes for info string lengths and for player
/// score/ping; they disagree on how many of those bytes carry the value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProtocolRevision {
    /// 16-bit value followed by 2 padding bytes.
    #[default]
    Current,
    /// Full 32-bit value.
    Legacy,
}

impl ProtocolRevision {
    /// Read one 4-byte slot at index `offset` from `data`.
    ///
    /// Mutates `offset` to the index after the slot.
    pub fn read_slot(self, data: &[u8], offset: &mut usize, field: &str) -> Result<u32, SampQueryError> {
        match self {
            ProtocolRevision::Current => {
                // check the whole slot up front so a truncation never
                // leaves offset halfway through it
                let mut probe = *offset;
                get_bytes(data, &mut probe, 4, field)?;
                let value = get_u16(data, offset, field)?;
                *offset += 2;
                Ok(u32::from(value))
            }
            ProtocolRevision::Legacy => get_u32(data, offset, field),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPacket {
    endpoint: Endpoint,
    opcode: Opcode,
}

impl RequestPacket {
    pub fn new(endpoint: Endpoint, opcode: Opcode) -> Self {
        RequestPacket { endpoint, opcode }
    }

    /// Serializes a request packet into its 11 wire bytes.
    pub fn pack(&self) -> [u8; HEADER_LEN] {
        // packet structure: magic, address octets, port (LE), opcode
        let mut payload = [0u8; HEADER_LEN];
        payload[0..4].copy_from_slice(MAGIC);
        payload[4..8].copy_from_slice(&self.endpoint.address().octets());
        payload[8..10].copy_from_slice(&self.endpoint.port().to_le_bytes());
        payload[10] = self.opcode.to_byte();
        payload
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ResponsePacket {
    opcode: u8,
    body: Vec<u8>,
}

impl ResponsePacket {
    const MAGIC_RANGE: Range<usize> = 0..4;
    const OPCODE_OFFSET: usize = 10;

    /// Deserializes an incoming datagram, dropping the echoed request header.
    pub fn unpack(incoming: &[u8]) -> Result<Self, SampQueryError> {
        if incoming.len() < HEADER_LEN {
            return Err(SampQueryError::MalformedReply(format!(
                "reply is {} bytes, shorter than the {HEADER_LEN}-byte header",
                incoming.len()
            )));
        }
        if &incoming[Self::MAGIC_RANGE] != MAGIC {
            log::warn!("reply header does not start with SAMP magic");
        }

        Ok(ResponsePacket {
            opcode: incoming[Self::OPCODE_OFFSET],
            body: incoming[HEADER_LEN..].to_vec(),
        })
    }

    /// The echoed opcode, if it is one this client knows.
    pub fn opcode(&self) -> Option<Opcode> {
        Opcode::try_from(self.opcode).ok()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_info_request() {
        let endpoint = Endpoint::new("192.168.1.1", 7777).unwrap();
        let packet = RequestPacket::new(endpoint, Opcode::Info).pack();
        assert_eq!(
            packet,
            [0x53, 0x41, 0x4D, 0x50, 0xC0, 0xA8, 0x01, 0x01, 0xE1, 0x1E, 0x69]
        );
    }

    #[test]
    fn header_reproduces_endpoint() {
        for (addr, port) in [("127.0.0.1", 1), ("10.0.0.254", 7777), ("255.255.255.255", 65535)] {
            let endpoint = Endpoint::new(addr, port).unwrap();
            let packet = RequestPacket::new(endpoint, Opcode::Rules).pack();
            let octets: [u8; 4] = packet[4..8].try_into().unwrap();
            let decoded_port = u16::from_le_bytes([packet[8], packet[9]]);
            assert_eq!(Ipv4Addr::from(octets), endpoint.address());
            assert_eq!(u32::from(decoded_port), port);
            assert_eq!(packet[10], b'r');
        }
    }

    #[test]
    fn rejects_bad_endpoints() {
        assert!(matches!(
            Endpoint::new("192.168.1", 7777),
            Err(SampQueryError::InvalidAddress(_))
        ));
        assert!(matches!(
            Endpoint::new("192.168.1.256", 7777),
            Err(SampQueryError::InvalidAddress(_))
        ));
        assert!(matches!(
            Endpoint::new("example.com", 7777),
            Err(SampQueryError::InvalidAddress(_))
        ));
        assert!(matches!(
            Endpoint::new("127.0.0.1", 0),
            Err(SampQueryError::InvalidPort(0))
        ));
        assert!(matches!(
            Endpoint::new("127.0.0.1", 65536),
            Err(SampQueryError::InvalidPort(65536))
        ));
    }

    #[test]
    fn opcode_bytes() {
        assert_eq!(Opcode::Info.to_byte(), 0x69);
        assert_eq!(Opcode::Rules.to_byte(), 0x72);
        assert_eq!(Opcode::Players.to_byte(), 0x64);
        assert_eq!(Opcode::try_from(b'd').unwrap(), Opcode::Players);
        assert!(Opcode::try_from(b'x').is_err());
    }

    #[test]
    fn unpack_strips_header() {
        let mut reply = RequestPacket::new(Endpoint::new("127.0.0.1", 7777).unwrap(), Opcode::Info)
            .pack()
            .to_vec();
        reply.extend_from_slice(&[1, 2, 3]);
        let packet = ResponsePacket::unpack(&reply).unwrap();
        assert_eq!(packet.opcode(), Some(Opcode::Info));
        assert_eq!(packet.body(), &[1, 2, 3]);
    }

    #[test]
    fn unpack_header_only_is_empty_body() {
        let reply = RequestPacket::new(Endpoint::new("127.0.0.1", 7777).unwrap(), Opcode::Rules).pack();
        assert!(ResponsePacket::unpack(&reply).unwrap().body().is_empty());
    }

    #[test]
    fn unpack_short_reply_is_malformed() {
        let err = ResponsePacket::unpack(b"SAMP\x7f\x00").unwrap_err();
        assert!(matches!(err, SampQueryError::MalformedReply(_)));
    }

    #[test]
    fn slot_widths_per_revision() {
        let data = [0x10, 0x00, 0x01, 0x00];
        let mut offset = 0;
        assert_eq!(ProtocolRevision::Current.read_slot(&data, &mut offset, "x").unwrap(), 16);
        assert_eq!(offset, 4);
        let mut offset = 0;
        assert_eq!(ProtocolRevision::Legacy.read_slot(&data, &mut offset, "x").unwrap(), 0x0001_0010);
        assert_eq!(offset, 4);
    }

    #[test]
    fn truncated_slot_is_malformed() {
        let data = [0x10, 0x00, 0x01];
        let mut offset = 0;
        assert!(ProtocolRevision::Current.read_slot(&data, &mut offset, "x").is_err());
        assert_eq!(offset, 0);
    }
}

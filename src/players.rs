use serde::Serialize;

use crate::error::SampQueryError;
use crate::packet::ProtocolRevision;
use crate::parse::{get_text, get_u16, get_u8};

/// One entry of the detailed player list (`d` request).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Player {
    pub id: u8,
    pub name: String,
    pub score: u32,
    pub ping: u32,
}

impl Player {
    /// Parse a player list reply body (header already stripped).
    pub fn parse_list(data: &[u8], revision: ProtocolRevision) -> Result<Vec<Player>, SampQueryError> {
        let mut offset: usize = 0;
        let count = get_u16(data, &mut offset, "player count")?;

        // each record is at least 10 bytes, don't let a bogus count reserve more
        let mut players = Vec::with_capacity(usize::from(count).min(data.len() / 10));
        for _ in 0..count {
            let id = get_u8(data, &mut offset, "player id")?;
            let len = get_u8(data, &mut offset, "player name length")?;
            let name = get_text(data, &mut offset, usize::from(len), "player name")?;
            let score = revision.read_slot(data, &mut offset, "player score")?;
            let ping = revision.read_slot(data, &mut offset, "player ping")?;
            players.push(Player { id, name, score, ping });
        }

        Ok(players)
    }
}

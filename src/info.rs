use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::error::SampQueryError;
use crate::packet::ProtocolRevision;
use crate::parse::{get_text, get_u16, get_u8};

/// Server information as obtained by the `i` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    /// Is the server password protected?
    pub has_password: bool,
    /// Current players
    pub players_online: u16,
    /// Max players
    pub max_players: u16,
    /// Server hostname
    pub server_name: String,
    /// Game mode script name
    pub game_mode: String,
    /// Server language, free text set by the operator
    pub language: String,
    /// Wall-clock time around the whole `i` round trip.
    ///
    /// Includes socket setup, so it reads a little higher than a real
    /// network RTT.
    #[serde(serialize_with = "as_millis")]
    pub ping: Duration,
}

fn as_millis<S: Serializer>(ping: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(ping.as_millis()).unwrap_or(u64::MAX))
}

impl ServerInfo {
    /// Parse an info reply body (header already stripped).
    ///
    /// `ping` is left at zero; the caller measures it.
    pub fn parse(data: &[u8], revision: ProtocolRevision) -> Result<ServerInfo, SampQueryError> {
        let mut offset: usize = 0;

        let has_password = get_u8(data, &mut offset, "password flag")? != 0;
        let players_online = get_u16(data, &mut offset, "player count")?;
        let max_players = get_u16(data, &mut offset, "max players")?;

        let mut get_string = |field: &str| -> Result<String, SampQueryError> {
            let len = revision.read_slot(data, &mut offset, field)?;
            get_text(data, &mut offset, len as usize, field)
        };
        let server_name = get_string("server name")?;
        let game_mode = get_string("game mode")?;
        let language = get_string("language")?;

        Ok(ServerInfo {
            has_password,
            players_online,
            max_players,
            server_name,
            game_mode,
            language,
            ping: Duration::ZERO,
        })
    }
}

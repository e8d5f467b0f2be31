use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::net::lookup_host;

use crate::config::QueryConfig;
use crate::error::SampQueryError;
use crate::info::ServerInfo;
use crate::packet::{Endpoint, Opcode};
use crate::players::Player;
use crate::rules::ServerRules;
use crate::transport::send_recv;

/// Everything a full [QueryClient::query] gathers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryResult {
    #[serde(flatten)]
    pub info: ServerInfo,
    pub rules: ServerRules,
    /// Empty when the large-roster limit skipped the player request.
    pub players: Vec<Player>,
}

/// Resolve `host` to a single IPv4 address.
///
/// Literal addresses are returned as-is without touching the resolver.
pub async fn resolve_host(host: &str) -> Result<Ipv4Addr, SampQueryError> {
    let host = host.trim();
    if let Ok(addr) = host.parse::<Ipv4Addr>() {
        return Ok(addr);
    }

    let mut addrs = lookup_host((host, 0))
        .await
        .map_err(|e| SampQueryError::Resolution(format!("{host}: {e}")))?;

    // game servers usually publish a single A record
    addrs
        .find_map(|addr| match addr.ip() {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
        .ok_or_else(|| SampQueryError::Resolution(format!("{host}: no IPv4 address found")))
}

/// Runs the three SA-MP requests against one server.
///
/// Each request opens and closes its own socket, so one client can be shared
/// by concurrent tasks.
#[derive(Debug, Clone, Default)]
pub struct QueryClient {
    config: QueryConfig,
}

impl QueryClient {
    pub fn new(config: QueryConfig) -> Self {
        QueryClient { config }
    }

    /// Resolve the configured host and validate the port.
    pub async fn endpoint(&self) -> Result<Endpoint, SampQueryError> {
        if u16::try_from(self.config.port).map_or(true, |p| p == 0) {
            return Err(SampQueryError::InvalidPort(self.config.port));
        }
        let address = resolve_host(&self.config.host).await?;
        Endpoint::from_addr(address, self.config.port)
    }

    pub async fn query_info(&self, endpoint: &Endpoint) -> Result<ServerInfo, SampQueryError> {
        let started = Instant::now();
        let packet = send_recv(endpoint, Opcode::Info, self.config.timeout).await?;
        let ping = started.elapsed();

        let mut info = ServerInfo::parse(packet.body(), self.config.revision)?;
        info.ping = ping;
        Ok(info)
    }

    pub async fn query_rules(&self, endpoint: &Endpoint) -> Result<ServerRules, SampQueryError> {
        let packet = send_recv(endpoint, Opcode::Rules, self.config.timeout).await?;
        ServerRules::parse(packet.body())
    }

    pub async fn query_players(&self, endpoint: &Endpoint) -> Result<Vec<Player>, SampQueryError> {
        let packet = send_recv(endpoint, Opcode::Players, self.config.timeout).await?;
        Player::parse_list(packet.body(), self.config.revision)
    }

    /// Info, then rules, then players, stopping at the first failure.
    pub async fn query(&self) -> Result<QueryResult, SampQueryError> {
        let endpoint = self.endpoint().await?;
        self.query_endpoint(&endpoint).await
    }

    pub async fn query_endpoint(&self, endpoint: &Endpoint) -> Result<QueryResult, SampQueryError> {
        let info = self.query_info(endpoint).await?;
        let rules = self.query_rules(endpoint).await?;

        let players = match self.config.large_roster_threshold {
            Some(limit) if info.players_online > limit => {
                log::info!(
                    "{endpoint} has {} players online (limit {limit}), skipping player list",
                    info.players_online
                );
                Vec::new()
            }
            _ => self.query_players(endpoint).await?,
        };

        Ok(QueryResult { info, rules, players })
    }
}

/// Query `host` for its info, rules and player list.
///
/// If `timeout_dur` is `Some(Duration)`, each of the three requests will use `timeout_dur`.
/// The default is 1 second if `timeout_dur` is `None`.
///
/// Example usage:
/// ```no_run
/// # async fn run() -> Result<(), sampquery::SampQueryError> {
/// let result = sampquery::query("127.0.0.1", 7777, None).await?;
/// println!("{} ({}/{})", result.info.server_name, result.info.players_online, result.info.max_players);
/// # Ok(())
/// # }
/// ```
pub async fn query(
    host: &str,
    port: u32,
    timeout_dur: Option<Duration>,
) -> Result<QueryResult, SampQueryError> {
    let mut config = QueryConfig::default().with_host(host).with_port(port);
    if let Some(timeout_dur) = timeout_dur {
        config = config.with_timeout(timeout_dur);
    }
    QueryClient::new(config).query().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn literal_address_skips_resolver() {
        assert_eq!(
            resolve_host(" 10.1.2.3 ").await.unwrap(),
            Ipv4Addr::new(10, 1, 2, 3)
        );
    }

    #[tokio::test]
    async fn localhost_resolves() {
        let addr = resolve_host("localhost").await.unwrap();
        assert!(addr.is_loopback());
    }

    #[tokio::test]
    async fn unresolvable_host() {
        let err = resolve_host("no-such-host.invalid").await.unwrap_err();
        assert!(matches!(err, SampQueryError::Resolution(_)));
    }

    #[tokio::test]
    async fn bad_port_fails_before_resolution() {
        let client = QueryClient::new(
            QueryConfig::default()
                .with_host("no-such-host.invalid")
                .with_port(70_000),
        );
        assert!(matches!(
            client.endpoint().await,
            Err(SampQueryError::InvalidPort(70_000))
        ));
    }
}

//! Command-line front end: query one server and print what it reports.
//!
//! Settings start from `SAMP_*` environment variables (see
//! [sampquery::QueryConfig::from_env]); flags override them.

use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgGroup, Parser};
use sampquery::{Player, ProtocolRevision, QueryClient, QueryConfig, ServerInfo, ServerRules};

/// Query a SA-MP server for its info, rules and players.
#[derive(Parser)]
#[command(author, version, about)]
#[command(group(ArgGroup::new("only").args(["info", "rules", "players"])))]
struct Cli {
    /// Server hostname or IPv4 address.
    host: Option<String>,

    /// Server port.
    #[arg(short, long)]
    port: Option<u32>,

    /// Per-request timeout in milliseconds.
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Read 32-bit string lengths and player scores (older servers).
    #[arg(long)]
    legacy: bool,

    /// Skip the player list above this many players online; 0 disables the limit.
    #[arg(long, conflicts_with = "no_roster_limit")]
    roster_limit: Option<u16>,

    /// Always fetch the player list.
    #[arg(long)]
    no_roster_limit: bool,

    /// Only request server info.
    #[arg(long)]
    info: bool,

    /// Only request server rules.
    #[arg(long)]
    rules: bool,

    /// Only request the player list.
    #[arg(long)]
    players: bool,

    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn config(&self) -> QueryConfig {
        let mut config = QueryConfig::from_env();
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = Duration::from_millis(timeout);
        }
        if self.legacy {
            config.revision = ProtocolRevision::Legacy;
        }
        if self.no_roster_limit {
            config.large_roster_threshold = None;
        } else if let Some(limit) = self.roster_limit {
            config.large_roster_threshold = roster_threshold(limit);
        }
        config
    }
}

/// `0` means no limit, the same as `SAMP_ROSTER_LIMIT=0`.
fn roster_threshold(limit: u16) -> Option<u16> {
    (limit != 0).then_some(limit)
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialise env_logger; set RUST_LOG to control verbosity.
    env_logger::init();

    let cli = Cli::parse();
    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let client = QueryClient::new(cli.config());
    let endpoint = client.endpoint().await?;
    log::info!("querying {endpoint}");

    if cli.info {
        let info = client.query_info(&endpoint).await?;
        emit(cli.json, &info, || print_info(&info))
    } else if cli.rules {
        let rules = client.query_rules(&endpoint).await?;
        emit(cli.json, &rules, || print_rules(&rules))
    } else if cli.players {
        let players = client.query_players(&endpoint).await?;
        emit(cli.json, &players, || print_players(&players))
    } else {
        let result = client.query_endpoint(&endpoint).await?;
        emit(cli.json, &result, || {
            print_info(&result.info);
            println!();
            print_rules(&result.rules);
            println!();
            print_players(&result.players);
        })
    }
}

fn emit<T: serde::Serialize>(
    json: bool,
    value: &T,
    text: impl FnOnce(),
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text();
    }
    Ok(())
}

fn print_info(info: &ServerInfo) {
    println!("Server:   {}", info.server_name);
    println!("Gamemode: {}", info.game_mode);
    println!("Language: {}", info.language);
    println!("Players:  {}/{}", info.players_online, info.max_players);
    println!("Password: {}", if info.has_password { "yes" } else { "no" });
    println!("Ping:     {} ms", info.ping.as_millis());
}

fn print_rules(rules: &ServerRules) {
    for (name, value) in rules.iter() {
        println!("{name:<12} {value}");
    }
}

fn print_players(players: &[Player]) {
    if players.is_empty() {
        println!("(no players listed)");
        return;
    }
    println!("{:>3}  {:<24} {:>8} {:>6}", "id", "name", "score", "ping");
    for player in players {
        println!(
            "{:>3}  {:<24} {:>8} {:>6}",
            player.id, player.name, player.score, player.ping
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_roster_limit_disables_skipping() {
        let cli = Cli::parse_from(["sampquery", "--roster-limit", "0"]);
        assert_eq!(cli.config().large_roster_threshold, None);

        let cli = Cli::parse_from(["sampquery", "--roster-limit", "40"]);
        assert_eq!(cli.config().large_roster_threshold, Some(40));

        let cli = Cli::parse_from(["sampquery", "--no-roster-limit"]);
        assert_eq!(cli.config().large_roster_threshold, None);
    }

    #[test]
    fn only_one_stage_flag() {
        assert!(Cli::try_parse_from(["sampquery", "--info", "--rules"]).is_err());
    }
}

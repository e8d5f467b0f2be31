//! Pure Rust async implementation of the [SA-MP Query Protocol](https://sampwiki.blast.hk/wiki/Query_Mechanism)
pub mod codepage;
pub mod config;
pub mod error;
pub mod info;
pub mod packet;
mod parse;
pub mod players;
pub mod query;
pub mod rules;
pub mod transport;

pub use config::QueryConfig;
pub use error::{ErrorKind, SampQueryError};
pub use info::ServerInfo;
pub use packet::{Endpoint, Opcode, ProtocolRevision};
pub use players::Player;
pub use query::{query, resolve_host, QueryClient, QueryResult};
pub use rules::ServerRules;

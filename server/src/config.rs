//! Server configuration from the command line

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "issue-board-server", version, about = "SQLite-backed issue board API")]
pub struct ServerArgs {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, short, default_value_t = 3030)]
    pub port: u16,

    /// SQLite database file, or `:memory:`
    #[arg(long, default_value = "issue_board.db")]
    pub db: PathBuf,

    /// Number of recent log records kept in memory
    #[arg(long, default_value_t = 512)]
    pub log_capacity: usize,

    /// Create the demo board when it is missing
    #[arg(long)]
    pub seed: bool,
}

impl ServerArgs {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    pub fn in_memory(&self) -> bool {
        self.db.as_os_str() == ":memory:"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = ServerArgs::parse_from(["issue-board-server"]);
        assert_eq!(args.port, 3030);
        assert!(!args.seed);
        assert!(!args.in_memory());
        assert_eq!(args.socket_addr().unwrap().port(), 3030);
    }

    #[test]
    fn test_memory_db_flag() {
        let args = ServerArgs::parse_from(["issue-board-server", "--db", ":memory:", "--seed", "-p", "8080"]);
        assert!(args.in_memory());
        assert!(args.seed);
        assert_eq!(args.port, 8080);
    }
}

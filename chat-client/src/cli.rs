use anyhow::{Context, Result};
use clap::Parser;

use crate::client::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_USERNAME};

/// Overrides the server host name.
pub const HOST_ENV: &str = "CHAT_CLIENT_HOST";
/// Overrides the server TCP port.
pub const PORT_ENV: &str = "CHAT_CLIENT_PORT";

/// Every argument is part of the username, so the parser defines no flags.
#[derive(Parser, Debug)]
#[command(about, disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Username, given as one or more words.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub name: Vec<String>,
}

impl Cli {
    pub fn username(&self) -> String {
        if self.name.is_empty() {
            DEFAULT_USERNAME.to_string()
        } else {
            self.name.join(" ")
        }
    }
}

/// Server to connect to, read from `CHAT_CLIENT_HOST` and `CHAT_CLIENT_PORT`.
pub fn server_from_env() -> Result<(String, u16)> {
    server_from(std::env::var(HOST_ENV).ok(), std::env::var(PORT_ENV).ok())
}

pub fn server_from(host: Option<String>, port: Option<String>) -> Result<(String, u16)> {
    let host = host.unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = match port {
        Some(port) => port
            .trim()
            .parse()
            .with_context(|| format!("{PORT_ENV} is not a valid port: {port:?}"))?,
        None => DEFAULT_PORT,
    };
    Ok((host, port))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn username(args: &[&str]) -> String {
        Cli::try_parse_from(std::iter::once("chat_client").chain(args.iter().copied()))
            .expect("arguments should parse")
            .username()
    }

    #[test]
    fn words_are_joined_into_username() {
        assert_eq!(username(&["Jane", "Doe"]), "Jane Doe");
    }

    #[test]
    fn no_words_uses_default_username() {
        assert_eq!(username(&[]), "Dummy");
    }

    #[test]
    fn flag_like_words_are_part_of_the_name() {
        assert_eq!(username(&["--port"]), "--port");
        assert_eq!(username(&["-h"]), "-h");
        assert_eq!(username(&["-V"]), "-V");
        assert_eq!(username(&["--help"]), "--help");
        assert_eq!(username(&["--host", "Doe"]), "--host Doe");
        assert_eq!(username(&["Jane", "-x", "Doe"]), "Jane -x Doe");
    }

    #[test]
    fn server_defaults_without_overrides() {
        let (host, port) = server_from(None, None).unwrap();
        assert_eq!(host, "localhost");
        assert_eq!(port, 15214);
    }

    #[test]
    fn server_overrides_are_applied() {
        let (host, port) = server_from(Some("127.0.0.1".into()), Some(" 4000 ".into())).unwrap();
        assert_eq!(host, "127.0.0.1");
        assert_eq!(port, 4000);
    }

    #[test]
    fn bad_port_override_is_rejected() {
        let err = server_from(None, Some("chat".into())).unwrap_err();
        assert!(err.to_string().contains(PORT_ENV));
    }
}

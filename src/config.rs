use anyhow::{Context, Result};
use clap::Parser;

pub const DEFAULT_PORT: u16 = 7001;

#[derive(Debug, Parser)]
#[command(name = "echo-status")]
#[command(about = "Answers every HTTP request with the status code named in its path")]
#[command(version)]
pub struct Cli {
    /// TCP port to listen on [default: 7001]
    pub port: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        Ok(Self { port: resolve_port(cli.port.as_deref())? })
    }
}

/// A missing or blank argument means the default port.
pub fn resolve_port(arg: Option<&str>) -> Result<u16> {
    match arg.map(str::trim) {
        None | Some("") => Ok(DEFAULT_PORT),
        Some(raw) => raw.parse::<u16>().with_context(|| format!("invalid port: {raw:?}")),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn port_resolution() {
        assert_eq!(resolve_port(None).unwrap(), 7001);
        assert_eq!(resolve_port(Some("")).unwrap(), 7001);
        assert_eq!(resolve_port(Some("  ")).unwrap(), 7001);
        assert_eq!(resolve_port(Some("8080")).unwrap(), 8080);
        assert_eq!(resolve_port(Some(" 8080 ")).unwrap(), 8080);
        assert_eq!(resolve_port(Some("0")).unwrap(), 0);

        for bad in ["abc", "-1", "65536", "80.5"] {
            assert!(resolve_port(Some(bad)).is_err(), "{bad}");
        }
    }

    #[test]
    fn cli_positional_port() {
        let cli = Cli::try_parse_from(["echo-status"]).unwrap();
        assert_eq!(Config::from_cli(&cli).unwrap(), Config { port: DEFAULT_PORT });

        let cli = Cli::try_parse_from(["echo-status", "8080"]).unwrap();
        assert_eq!(Config::from_cli(&cli).unwrap(), Config { port: 8080 });

        let cli = Cli::try_parse_from(["echo-status", "http"]).unwrap();
        assert!(Config::from_cli(&cli).is_err());
    }
}

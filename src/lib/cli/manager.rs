use std::{path::PathBuf, sync::Arc};

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
)]
struct Args {
    /// Draw pages on the panel and keep refreshing. Without it, pages are written to the log once.
    #[arg(long)]
    display: bool,

    /// Stop after one full page cycle, even with --display.
    #[arg(long)]
    once: bool,

    /// Sets the FTL telnet API endpoint, overriding the settings file.
    #[arg(long, value_name = "<IP>:<PORT>", value_parser = parse_ftl_address)]
    ftl_address: Option<(String, u16)>,

    /// Sets the settings file path, relative paths live in the user configuration folder.
    #[arg(long, value_name = "PATH", default_value = "settings.json")]
    settings_file: String,

    /// Ignores the existing settings file and writes the defaults over it.
    #[arg(long)]
    reset: bool,

    /// Specifies the path in which the logs will be stored.
    #[arg(long, value_name = "PATH", default_value = "./logs")]
    log_path: PathBuf,

    /// How many daily log files are kept.
    #[arg(long, value_name = "COUNT", default_value = "7")]
    log_retention: usize,

    /// Turns all log categories up to Debug, for more information check RUST_LOG env variable.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug)]
struct Manager {
    clap_matches: Args,
}

lazy_static! {
    static ref MANAGER: Arc<Manager> = Arc::new(Manager::new());
}

impl Manager {
    fn new() -> Self {
        Self {
            clap_matches: Args::parse(),
        }
    }
}

// Construct our manager, should be done inside main
pub fn init() {
    MANAGER.as_ref();
}

// Check if the verbosity parameter was used
pub fn is_verbose() -> bool {
    MANAGER.clap_matches.verbose
}

pub fn is_display_enabled() -> bool {
    MANAGER.clap_matches.display
}

pub fn is_once() -> bool {
    MANAGER.clap_matches.once
}

pub fn is_reset() -> bool {
    MANAGER.clap_matches.reset
}

pub fn ftl_address() -> Option<(String, u16)> {
    MANAGER.clap_matches.ftl_address.clone()
}

pub fn settings_file() -> String {
    MANAGER.clap_matches.settings_file.clone()
}

pub fn log_path() -> PathBuf {
    MANAGER.clap_matches.log_path.clone()
}

pub fn log_retention() -> usize {
    MANAGER.clap_matches.log_retention
}

// Return the command line used to start this application
pub fn command_line_string() -> String {
    std::env::args().collect::<Vec<String>>().join(" ")
}

// Return the parsed command line arguments
pub fn command_line() -> String {
    format!("{:#?}", MANAGER.clap_matches)
}

fn parse_ftl_address(value: &str) -> Result<(String, u16), String> {
    let (host, port) = value
        .rsplit_once(':')
        .ok_or_else(|| format!("{value:?} is not in the <IP>:<PORT> form"))?;

    if host.is_empty() {
        return Err(format!("{value:?} has no host"));
    }

    let port = port
        .parse::<u16>()
        .map_err(|error| format!("Invalid port {port:?}: {error}"))?;

    Ok((host.to_string(), port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_arguments() {
        let args = Args::try_parse_from(["pihole-display"]).unwrap();

        assert!(!args.display);
        assert!(!args.once);
        assert!(!args.verbose);
        assert!(!args.reset);
        assert_eq!(args.ftl_address, None);
        assert_eq!(args.settings_file, "settings.json");
        assert_eq!(args.log_path, PathBuf::from("./logs"));
        assert_eq!(args.log_retention, 7);
    }

    #[test]
    fn display_mode_with_custom_endpoint() {
        let args = Args::try_parse_from([
            "pihole-display",
            "--display",
            "--ftl-address",
            "192.168.1.2:4711",
            "-v",
        ])
        .unwrap();

        assert!(args.display);
        assert!(args.verbose);
        assert_eq!(args.ftl_address, Some(("192.168.1.2".to_string(), 4711)));
    }

    #[test]
    fn malformed_endpoint_is_rejected() {
        assert!(Args::try_parse_from(["pihole-display", "--ftl-address", "localhost"]).is_err());
        assert!(parse_ftl_address(":4711").is_err());
        assert!(parse_ftl_address("localhost:http").is_err());
        assert_eq!(
            parse_ftl_address("localhost:4711"),
            Ok(("localhost".to_string(), 4711))
        );
    }
}

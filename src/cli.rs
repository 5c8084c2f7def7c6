use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use getopts::{Matches, Options};

pub const ADDR_ENV: &str = "EVENTBOARD_ADDR";

pub struct Args {
    pub address: SocketAddr,
    pub csv_path: PathBuf,
    pub ftp_host: String,
    pub ftp_port: u16,
    pub ftp_user: Option<String>,
    pub remote_dir: String,
    pub remote_name: String,
    pub password_env: String,
    pub secrets_file: Option<PathBuf>,
    pub secret_key: String,
    pub timeout: Duration,
    pub auto_sync: bool,
    pub debounce: Duration,
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optopt(
        "a",
        "address",
        "Socket address (IP and port) to listen on [Default: $EVENTBOARD_ADDR or 127.0.0.1:8080]",
        "SOCKET_ADDRESS",
    );
    opts.optopt(
        "o",
        "csv-path",
        "Local CSV file written on every upload [Default: events.csv]",
        "PATH",
    );
    opts.optopt(
        "",
        "ftp-host",
        "FTP server to upload to [Default: sv11005.star.ne.jp]",
        "HOST",
    );
    opts.optopt("", "ftp-port", "FTP control port [Default: 21]", "PORT");
    opts.optopt("", "ftp-user", "FTP account name", "USER");
    opts.optopt(
        "",
        "remote-dir",
        "Remote directory to upload into [Default: /public_html/]",
        "DIR",
    );
    opts.optopt(
        "",
        "remote-name",
        "Remote file name [Default: events.csv]",
        "NAME",
    );
    opts.optopt(
        "",
        "password-env",
        "Environment variable holding the FTP password [Default: EVENTBOARD_FTP_PASSWORD]",
        "VAR",
    );
    opts.optopt(
        "",
        "secrets-file",
        "TOML file holding the FTP password, used instead of the environment",
        "PATH",
    );
    opts.optopt(
        "",
        "secret-key",
        "Key of the FTP password in the secrets file [Default: ftp_password]",
        "KEY",
    );
    opts.optopt(
        "t",
        "timeout",
        "Timeout for each FTP network step [Default: 30]",
        "SECONDS",
    );
    opts.optflag(
        "",
        "auto-sync",
        "Upload automatically after changes to the list [Default: false]",
    );
    opts.optopt(
        "",
        "debounce",
        "Quiet period before an automatic upload [Default: 5]",
        "SECONDS",
    );
    opts
}

fn or_exit<T, E: std::fmt::Display>(result: Result<T, E>, option: &str) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            eprintln!("Provided value for option '{option}' is invalid: {err}");
            process::exit(1);
        }
    }
}

fn default_address() -> SocketAddr {
    match env::var(ADDR_ENV) {
        Ok(value) => or_exit(value.parse(), ADDR_ENV),
        Err(_) => SocketAddr::from(([127, 0, 0, 1], 8080)),
    }
}

/// A whole number of seconds, zero excluded.
fn seconds(matches: &Matches, name: &str, default: u64) -> Result<Duration, String> {
    match matches.opt_get_default(name, default) {
        Ok(0) => Err("must be at least 1 second".to_string()),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(err) => Err(err.to_string()),
    }
}

fn string_or(matches: &Matches, name: &str, default: &str) -> String {
    matches.opt_str(name).unwrap_or_else(|| default.to_string())
}

pub fn parse(args: Vec<String>) -> Args {
    let opts = opts();

    let matches = match opts.parse(args) {
        Ok(matches) => matches,
        Err(fail) => {
            eprintln!("{fail}");
            process::exit(1);
        }
    };

    if matches.opt_present("help") {
        println!("{}", opts.usage(&opts.short_usage(env!("CARGO_PKG_NAME"))));
        process::exit(0);
    }

    let address = match matches.opt_str("address") {
        Some(value) => or_exit(value.parse(), "address"),
        None => default_address(),
    };

    let ftp_port = or_exit(matches.opt_get_default("ftp-port", 21), "ftp-port");
    let timeout = or_exit(seconds(&matches, "timeout", 30), "timeout");
    let debounce = or_exit(seconds(&matches, "debounce", 5), "debounce");

    Args {
        address,
        csv_path: PathBuf::from(string_or(&matches, "csv-path", "events.csv")),
        ftp_host: string_or(&matches, "ftp-host", "sv11005.star.ne.jp"),
        ftp_port,
        ftp_user: matches.opt_str("ftp-user"),
        remote_dir: string_or(&matches, "remote-dir", "/public_html/"),
        remote_name: string_or(&matches, "remote-name", "events.csv"),
        password_env: string_or(&matches, "password-env", "EVENTBOARD_FTP_PASSWORD"),
        secrets_file: matches.opt_str("secrets-file").map(PathBuf::from),
        secret_key: string_or(&matches, "secret-key", "ftp_password"),
        timeout,
        auto_sync: matches.opt_present("auto-sync"),
        debounce,
    }
}

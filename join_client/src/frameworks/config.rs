use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

// Runtime settings read from the environment.

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:3003";
const DEFAULT_TIMEOUT_MS: u64 = 3000;
const DEFAULT_SESSION_FILE: &str = ".join_session.json";

pub fn backend_url() -> Result<Url, url::ParseError> {
    let raw = env::var("BACKEND_URL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
    Url::parse(raw.trim())
}

pub fn backend_timeout() -> Duration {
    let millis = env::var("BACKEND_TIMEOUT_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|ms| *ms > 0)
        .unwrap_or(DEFAULT_TIMEOUT_MS);
    Duration::from_millis(millis)
}

pub fn session_file() -> PathBuf {
    env::var("SESSION_FILE")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE))
}

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Join {
        code: String,
        display_name: Option<String>,
    },
    SignUp {
        email: String,
    },
    SignIn {
        email: String,
    },
}

pub const USAGE: &str = "usage: join_client <ROOM_CODE> [DISPLAY_NAME] | join_client sign-up <EMAIL> | join_client sign-in <EMAIL>";

pub fn command() -> Result<Command, String> {
    parse_command(
        env::args().skip(1),
        env::var("ROOM_CODE").ok(),
        env::var("DISPLAY_NAME").ok(),
    )
}

// Arguments take precedence over ROOM_CODE / DISPLAY_NAME.
pub fn parse_command(
    mut args: impl Iterator<Item = String>,
    env_code: Option<String>,
    env_display_name: Option<String>,
) -> Result<Command, String> {
    let first = args.next();

    match first.as_deref() {
        Some("sign-up") => {
            let email = args.next().ok_or_else(|| USAGE.to_string())?;
            return Ok(Command::SignUp { email });
        }
        Some("sign-in") => {
            let email = args.next().ok_or_else(|| USAGE.to_string())?;
            return Ok(Command::SignIn { email });
        }
        _ => {}
    }

    let code = first
        .or(env_code)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| USAGE.to_string())?;
    let display_name = args
        .next()
        .or(env_display_name)
        .filter(|v| !v.trim().is_empty());

    Ok(Command::Join { code, display_name })
}

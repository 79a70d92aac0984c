use std::env;

use anyhow::Context as _;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://warden.db";
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 1;

/// Presence shown while the bot is connected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamStatus {
    pub name: String,
    pub url: String,
}

pub struct BotConfig {
    pub token: String,
    pub guild_id: u64,
    pub database_url: String,
    pub database_max_connections: u32,
    pub auto_run_migrations: bool,
    pub stream_status: Option<StreamStatus>,
}

impl BotConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let token = env::var("DISCORD_TOKEN").context("DISCORD_TOKEN is not set")?;
        let guild_id = env::var("DISCORD_GUILD_ID")
            .context("DISCORD_GUILD_ID is not set")?
            .trim()
            .parse::<u64>()
            .context("DISCORD_GUILD_ID must be a numeric guild id")?;

        let database_url = optional_var("DATABASE_URL")
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned());
        let database_max_connections = parse_count(
            optional_var("DATABASE_MAX_CONNECTIONS").as_deref(),
            DEFAULT_DATABASE_MAX_CONNECTIONS,
        );
        let auto_run_migrations = parse_flag(optional_var("AUTO_RUN_MIGRATIONS").as_deref(), true);
        let stream_status = stream_status(
            optional_var("STATUS_STREAM_NAME"),
            optional_var("STATUS_STREAM_URL"),
        );

        Ok(Self {
            token,
            guild_id,
            database_url,
            database_max_connections,
            auto_run_migrations,
            stream_status,
        })
    }
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_flag(value: Option<&str>, default: bool) -> bool {
    match value {
        Some(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        None => default,
    }
}

/// Zero or unparsable counts fall back to the default.
fn parse_count(value: Option<&str>, default: u32) -> u32 {
    value
        .and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|count| *count > 0)
        .unwrap_or(default)
}

fn stream_status(name: Option<String>, url: Option<String>) -> Option<StreamStatus> {
    Some(StreamStatus {
        name: name?,
        url: url?,
    })
}

#[cfg(test)]
mod tests {
    use super::{StreamStatus, parse_count, parse_flag, stream_status};

    #[test]
    fn flags_accept_common_truthy_spellings() {
        for value in ["1", "true", "TRUE", " yes ", "on"] {
            assert!(parse_flag(Some(value), false), "{value}");
        }
        assert!(!parse_flag(Some("false"), true));
        assert!(!parse_flag(Some("nope"), true));
        assert!(parse_flag(None, true));
    }

    #[test]
    fn counts_fall_back_on_garbage_and_zero() {
        assert_eq!(parse_count(Some("4"), 1), 4);
        assert_eq!(parse_count(Some("0"), 1), 1);
        assert_eq!(parse_count(Some("many"), 1), 1);
        assert_eq!(parse_count(None, 2), 2);
    }

    #[test]
    fn stream_status_needs_both_parts() {
        assert_eq!(
            stream_status(Some("Warden".into()), Some("https://twitch.tv/warden".into())),
            Some(StreamStatus {
                name: "Warden".into(),
                url: "https://twitch.tv/warden".into(),
            })
        );
        assert_eq!(stream_status(Some("Warden".into()), None), None);
        assert_eq!(stream_status(None, Some("https://twitch.tv/warden".into())), None);
    }
}

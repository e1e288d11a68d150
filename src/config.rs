// Runtime configuration, read from the environment (and `.env` via dotenv).

use anyhow::{bail, Context, Result};

use std::fmt;

const DEFAULT_DB_PATH: &str = "data/registry.db";

/// Where registry state lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// SQLite database file at this path.
    Sqlite(String),
    /// Process memory only; everything is gone after a restart.
    Memory,
}

impl StorageBackend {
    fn from_setting(raw: Option<String>) -> Self {
        match raw.as_deref().map(str::trim) {
            None | Some("") => StorageBackend::Sqlite(DEFAULT_DB_PATH.to_string()),
            // A SQLite ":memory:" database is per-connection, so map it here too
            Some(value) if value.eq_ignore_ascii_case("memory") || value.contains(":memory:") => {
                StorageBackend::Memory
            }
            Some(value) => StorageBackend::Sqlite(value.to_string()),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Sqlite(path) => write!(f, "sqlite:{}", path),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub discord_token: String,
    /// Deploying identity: permanent moderator and sole manager of the set.
    pub owner_id: u64,
    pub storage: StorageBackend,
    /// Channel that receives every registry audit event.
    pub audit_channel_id: Option<u64>,
    /// Register commands in this guild only (instant updates during development).
    pub dev_guild_id: Option<u64>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let discord_token = lookup("DISCORD_TOKEN").context(
            "Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.",
        )?;

        let owner_id = parse_id(&lookup, "REGISTRY_OWNER_ID")?
            .context("Missing REGISTRY_OWNER_ID environment variable!")?;
        if owner_id == 0 {
            bail!("REGISTRY_OWNER_ID must be a non-zero user id");
        }

        let storage = StorageBackend::from_setting(lookup("REGISTRY_DB_PATH"));

        Ok(Self {
            discord_token,
            owner_id,
            storage,
            audit_channel_id: parse_id(&lookup, "AUDIT_CHANNEL_ID")?,
            dev_guild_id: parse_id(&lookup, "DEV_GUILD_ID")?,
        })
    }
}

fn parse_id(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<u64>> {
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .with_context(|| format!("{} must be a numeric id, got {:?}", key, raw)),
        _ => Ok(None),
    }
}

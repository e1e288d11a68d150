// This is the entry point of the moderation registry bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (databases)
// - `discord/` = Discord-specific adapters (commands, audit forwarding)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands and the audit forwarder

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

mod config;

use crate::config::{AppConfig, StorageBackend};
use crate::core::registry::{ModerationRegistry, RegistryStore};
use crate::discord::audit;
use crate::discord::{Data, Error};
use crate::infra::registry::{InMemoryRegistryStore, SqliteRegistryStore};
use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // Initialize logging so we can see what's happening (RUST_LOG overrides the default)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // This is the "composition root" where we wire everything together.

    let store: Box<dyn RegistryStore> = match &config.storage {
        StorageBackend::Sqlite(path) => Box::new(
            SqliteRegistryStore::new(path)
                .await
                .with_context(|| format!("Failed to open registry database {}", path))?,
        ),
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory registry storage; state is lost on restart");
            Box::new(InMemoryRegistryStore::new())
        }
    };

    let registry = Arc::new(
        ModerationRegistry::deploy(store, config.owner_id)
            .await
            .context("Failed to deploy moderation registry")?,
    );

    let contents = registry.content_count().await?;
    let reports = registry.report_count().await?;
    tracing::info!(
        owner = config.owner_id,
        storage = %config.storage,
        contents,
        reports,
        "Registry loaded"
    );

    let data = Data {
        registry: Arc::clone(&registry),
    };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    let intents = serenity::GatewayIntents::GUILDS;
    let audit_channel_id = config.audit_channel_id;
    let dev_guild_id = config.dev_guild_id;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![discord::commands::registry::registry()],
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                match dev_guild_id {
                    // Guild registration shows up immediately, handy while developing
                    Some(guild_id) => {
                        poise::builtins::register_in_guild(
                            ctx,
                            &framework.options().commands,
                            serenity::GuildId::new(guild_id),
                        )
                        .await?
                    }
                    None => {
                        poise::builtins::register_globally(ctx, &framework.options().commands)
                            .await?
                    }
                }
                tracing::info!("Commands registered");

                if let Some(channel_id) = audit_channel_id {
                    let events = data.registry.subscribe();
                    tokio::spawn(audit::run(ctx.http.clone(), channel_id, events));
                }

                tracing::info!("Registry bot is ready");
                Ok::<Data, Error>(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await
        .context("Error creating client")?;

    client.start().await.context("Error running bot")?;
    Ok(())
}

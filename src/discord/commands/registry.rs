// Discord commands for the moderation registry.
//
// The invoking Discord user is the caller identity for every registry call.
// Authorization lives in the core; Discord permissions are not consulted.
//
// This layer is THIN - no business logic, just translation.

use crate::core::registry::{
    Content, ContentStatus, ErrorKind, ModerationRegistry, RegistryError, RegistryStore, Report,
};
use crate::discord::embed_text::{truncate, EMBED_FIELD_LIMIT, MESSAGE_SNIPPET_LIMIT};
use poise::serenity_prelude as serenity;
use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// The registry as the bot runs it; the backend is chosen at startup.
pub type Registry = ModerationRegistry<Box<dyn RegistryStore>>;

/// Shared state handed to every command.
pub struct Data {
    pub registry: Arc<Registry>,
}

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum StatusChoice {
    Active,
    #[name = "Under Review"]
    UnderReview,
    Flagged,
    Removed,
}

impl From<StatusChoice> for ContentStatus {
    fn from(value: StatusChoice) -> Self {
        match value {
            StatusChoice::Active => ContentStatus::Active,
            StatusChoice::UnderReview => ContentStatus::UnderReview,
            StatusChoice::Flagged => ContentStatus::Flagged,
            StatusChoice::Removed => ContentStatus::Removed,
        }
    }
}

/// Turn a registry failure into something a user can act on.
pub fn error_reply(err: &RegistryError) -> String {
    match err.kind() {
        ErrorKind::NotFound => format!("🔍 {}.", err),
        ErrorKind::InvalidInput => format!("⚠️ {}.", err),
        ErrorKind::Unauthorized => format!("⛔ {}.", err),
        ErrorKind::Conflict => format!("❌ {}.", err),
        ErrorKind::Storage => {
            tracing::error!(error = %err, "Registry storage failure");
            "💥 Something went wrong while saving. Please try again later.".to_string()
        }
    }
}

pub fn status_color(status: ContentStatus) -> u32 {
    match status {
        ContentStatus::Active => 0x57F287,      // Green
        ContentStatus::UnderReview => 0xFEE75C, // Yellow
        ContentStatus::Flagged => 0xE67E22,     // Orange
        ContentStatus::Removed => 0xED4245,     // Red
    }
}

fn to_timestamp(time: chrono::DateTime<chrono::Utc>) -> serenity::Timestamp {
    serenity::Timestamp::from_unix_timestamp(time.timestamp())
        .unwrap_or_else(|_| serenity::Timestamp::now())
}

async fn reply_error(ctx: Context<'_>, err: &RegistryError) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content(error_reply(err))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Community content moderation.
#[poise::command(
    slash_command,
    subcommands(
        "submit",
        "report",
        "moderate",
        "add_moderator",
        "remove_moderator",
        "content",
        "report_info",
        "moderators"
    ),
    guild_only
)]
pub async fn registry(_ctx: Context<'_>) -> Result<(), Error> {
    // Parent command - subcommands do the work
    Ok(())
}

/// Register a content reference for moderation.
#[poise::command(slash_command, guild_only)]
pub async fn submit(
    ctx: Context<'_>,
    #[description = "Content-addressed reference, e.g. an IPFS CID"] content_hash: String,
) -> Result<(), Error> {
    let caller = ctx.author().id.get();

    match ctx
        .data()
        .registry
        .submit_content(caller, &content_hash)
        .await
    {
        Ok(content_id) => {
            ctx.say(format!(
                "✅ Registered content **#{}** (`{}`).",
                content_id,
                truncate(&content_hash, MESSAGE_SNIPPET_LIMIT)
            ))
            .await?;
            Ok(())
        }
        Err(err) => reply_error(ctx, &err).await,
    }
}

/// Report content that breaks the rules.
#[poise::command(slash_command, guild_only)]
pub async fn report(
    ctx: Context<'_>,
    #[description = "Content id"] content_id: u64,
    #[description = "Why this content should be reviewed"] reason: String,
) -> Result<(), Error> {
    let caller = ctx.author().id.get();

    match ctx
        .data()
        .registry
        .report_content(caller, content_id, &reason)
        .await
    {
        Ok(report_id) => {
            ctx.send(
                poise::CreateReply::default()
                    .content(format!(
                        "📝 Report **#{}** filed against content **#{}**. Thanks!",
                        report_id, content_id
                    ))
                    .ephemeral(true),
            )
            .await?;
            Ok(())
        }
        Err(err) => reply_error(ctx, &err).await,
    }
}

/// Change the status of a piece of content (moderators only).
#[poise::command(slash_command, guild_only)]
pub async fn moderate(
    ctx: Context<'_>,
    #[description = "Content id"] content_id: u64,
    #[description = "New status"] status: StatusChoice,
) -> Result<(), Error> {
    let caller = ctx.author().id.get();
    let new_status = ContentStatus::from(status);

    match ctx
        .data()
        .registry
        .moderate_content(caller, content_id, new_status)
        .await
    {
        Ok(()) => {
            let note = if new_status == ContentStatus::Removed {
                " It can no longer be reported or moderated."
            } else {
                ""
            };
            ctx.say(format!(
                "🛡️ Content **#{}** is now **{}**.{}",
                content_id, new_status, note
            ))
            .await?;
            Ok(())
        }
        Err(err) => reply_error(ctx, &err).await,
    }
}

/// Grant moderator rights (owner only).
#[poise::command(slash_command, guild_only)]
pub async fn add_moderator(
    ctx: Context<'_>,
    #[description = "User to promote"] user: serenity::User,
) -> Result<(), Error> {
    let caller = ctx.author().id.get();

    match ctx
        .data()
        .registry
        .add_moderator(caller, user.id.get())
        .await
    {
        Ok(()) => {
            ctx.say(format!("✅ <@{}> is now a moderator.", user.id))
                .await?;
            Ok(())
        }
        Err(err) => reply_error(ctx, &err).await,
    }
}

/// Revoke moderator rights (owner only).
#[poise::command(slash_command, guild_only)]
pub async fn remove_moderator(
    ctx: Context<'_>,
    #[description = "User to demote"] user: serenity::User,
) -> Result<(), Error> {
    let caller = ctx.author().id.get();

    match ctx
        .data()
        .registry
        .remove_moderator(caller, user.id.get())
        .await
    {
        Ok(()) => {
            ctx.say(format!("✅ <@{}> is no longer a moderator.", user.id))
                .await?;
            Ok(())
        }
        Err(err) => reply_error(ctx, &err).await,
    }
}

fn content_embed(content: &Content, needs_moderation: bool) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(format!("📄 Content #{}", content.id))
        .color(status_color(content.status))
        .field(
            "Hash",
            format!(
                "`{}`",
                truncate(&content.content_hash, EMBED_FIELD_LIMIT - 2)
            ),
            false,
        )
        .field("Author", format!("<@{}>", content.author), true)
        .field("Status", content.status.to_string(), true)
        .field("Reports", content.report_count.to_string(), true)
        .field("Active", if content.is_active { "Yes" } else { "No" }, true)
        .field(
            "Needs moderation",
            if needs_moderation { "Yes" } else { "No" },
            true,
        )
        .timestamp(to_timestamp(content.timestamp))
}

/// Show a content record.
#[poise::command(slash_command, guild_only)]
pub async fn content(
    ctx: Context<'_>,
    #[description = "Content id"] content_id: u64,
) -> Result<(), Error> {
    let registry = &ctx.data().registry;

    let content = match registry.get_content(content_id).await {
        Ok(content) => content,
        Err(err) => return reply_error(ctx, &err).await,
    };
    let needs_moderation = match registry.needs_moderation(content_id).await {
        Ok(flag) => flag,
        Err(err) => return reply_error(ctx, &err).await,
    };

    ctx.send(poise::CreateReply::default().embed(content_embed(&content, needs_moderation)))
        .await?;
    Ok(())
}

fn report_embed(report: &Report) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(format!("📝 Report #{}", report.id))
        .color(0x5865F2) // Blurple
        .field("Content", format!("#{}", report.content_id), true)
        .field("Reporter", format!("<@{}>", report.reporter), true)
        .field("Reason", truncate(&report.reason, EMBED_FIELD_LIMIT), false)
        .timestamp(to_timestamp(report.timestamp))
}

/// Show a filed report.
#[poise::command(slash_command, guild_only)]
pub async fn report_info(
    ctx: Context<'_>,
    #[description = "Report id"] report_id: u64,
) -> Result<(), Error> {
    match ctx.data().registry.get_report(report_id).await {
        Ok(report) => {
            ctx.send(
                poise::CreateReply::default()
                    .embed(report_embed(&report))
                    .ephemeral(true),
            )
            .await?;
            Ok(())
        }
        Err(err) => reply_error(ctx, &err).await,
    }
}

/// List the current moderators.
#[poise::command(slash_command, guild_only)]
pub async fn moderators(ctx: Context<'_>) -> Result<(), Error> {
    let registry = &ctx.data().registry;

    let moderators = match registry.moderators().await {
        Ok(list) => list,
        Err(err) => return reply_error(ctx, &err).await,
    };

    let caller_is_moderator = match registry.is_moderator(ctx.author().id.get()).await {
        Ok(flag) => flag,
        Err(err) => return reply_error(ctx, &err).await,
    };

    let owner = registry.owner();
    let lines: Vec<String> = moderators
        .iter()
        .map(|id| {
            if *id == owner {
                format!("• <@{}> (owner)", id)
            } else {
                format!("• <@{}>", id)
            }
        })
        .collect();

    let embed = serenity::CreateEmbed::new()
        .title("🛡️ Moderators")
        .color(0x5865F2)
        .description(lines.join("\n"))
        .footer(serenity::CreateEmbedFooter::new(if caller_is_moderator {
            "You are a moderator"
        } else {
            "You are not a moderator"
        }));

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

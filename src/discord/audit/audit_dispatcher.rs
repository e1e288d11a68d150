// Forwards registry audit events to a Discord channel.
//
// Each message carries a readable summary plus the exact JSON payload so
// anything scraping the channel sees the same event shape as the core.
// Payloads too big for an embed field go out as a `.json` attachment, never cut.

use crate::core::registry::RegistryEvent;
use crate::discord::commands::registry::status_color;
use crate::discord::embed_text::{truncate, EMBED_DESCRIPTION_LIMIT, EMBED_FIELD_LIMIT};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

/// Human-readable one-liner for an event.
pub fn describe_event(event: &RegistryEvent) -> String {
    match event {
        RegistryEvent::ContentSubmitted {
            content_id,
            author,
            content_hash,
        } => format!(
            "<@{}> submitted content #{} (`{}`)",
            author, content_id, content_hash
        ),
        RegistryEvent::ContentReported {
            content_id,
            reporter,
            reason,
        } => format!(
            "<@{}> reported content #{}: {}",
            reporter, content_id, reason
        ),
        RegistryEvent::ContentModerated {
            content_id,
            new_status,
            moderator,
        } => format!(
            "<@{}> set content #{} to **{}**",
            moderator, content_id, new_status
        ),
        RegistryEvent::ModeratorAdded { moderator } => {
            format!("<@{}> was added as a moderator", moderator)
        }
        RegistryEvent::ModeratorRemoved { moderator } => {
            format!("<@{}> was removed as a moderator", moderator)
        }
    }
}

fn event_color(event: &RegistryEvent) -> u32 {
    match event {
        RegistryEvent::ContentModerated { new_status, .. } => status_color(*new_status),
        RegistryEvent::ContentReported { .. } => 0xFEE75C,
        _ => 0x5865F2,
    }
}

/// Where the JSON payload of an audit message goes.
#[derive(Debug, PartialEq, Eq)]
enum PayloadPlacement {
    /// Inline code block in the "Payload" field.
    Field(String),
    /// Full JSON sent as a file next to the embed.
    Attachment { filename: String, json: String },
}

fn place_payload(event: &RegistryEvent) -> PayloadPlacement {
    let json = serde_json::to_string(event).unwrap_or_default();
    let block = format!("```json\n{}\n```", json);

    if block.chars().count() <= EMBED_FIELD_LIMIT {
        PayloadPlacement::Field(block)
    } else {
        PayloadPlacement::Attachment {
            filename: format!("{}.json", event.name()),
            json,
        }
    }
}

async fn send_event(
    http: &serenity::Http,
    channel_id: u64,
    event: &RegistryEvent,
) -> Result<(), serenity::Error> {
    let mut embed = serenity::CreateEmbed::new()
        .title(event.name())
        .description(truncate(&describe_event(event), EMBED_DESCRIPTION_LIMIT))
        .color(event_color(event))
        .timestamp(serenity::Timestamp::now());
    let mut message = serenity::CreateMessage::new();

    match place_payload(event) {
        PayloadPlacement::Field(block) => {
            embed = embed.field("Payload", block, false);
        }
        PayloadPlacement::Attachment { filename, json } => {
            embed = embed.field("Payload", format!("Attached as `{}`", filename), false);
            message = message.add_file(serenity::CreateAttachment::bytes(
                json.into_bytes(),
                filename,
            ));
        }
    }

    serenity::ChannelId::new(channel_id)
        .send_message(http, message.embed(embed))
        .await?;
    Ok(())
}

/// Post every event to `channel_id` until the registry is dropped.
pub async fn run(
    http: Arc<serenity::Http>,
    channel_id: u64,
    mut events: broadcast::Receiver<RegistryEvent>,
) {
    tracing::info!(channel_id, "Audit dispatcher started");

    loop {
        match events.recv().await {
            Ok(event) => {
                if let Err(err) = send_event(&http, channel_id, &event).await {
                    tracing::warn!(
                        channel_id,
                        event = event.name(),
                        error = %err,
                        "Failed to post audit event"
                    );
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Audit dispatcher fell behind; events dropped");
            }
            Err(RecvError::Closed) => break,
        }
    }

    tracing::info!("Audit dispatcher stopped");
}

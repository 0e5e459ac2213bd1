//! Announces the release on a Discord webhook.

use crate::context::Context;
use crate::error::{ReleaseError, Result};
use crate::pipeline::Pipe;
use crate::template::Template;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

const SERVICE: &str = "discord";
const DEFAULT_WEBHOOK_BASE: &str = "https://discord.com/api";
const DEFAULT_MESSAGE: &str = "{{project_name}} {{tag}} is out! Check it out at {{release_url}}";
const DEFAULT_AUTHOR: &str = "shipwright";
const DEFAULT_COLOR: &str = "3888754";

const ENV_WEBHOOK_ID: &str = "DISCORD_WEBHOOK_ID";
const ENV_WEBHOOK_TOKEN: &str = "DISCORD_WEBHOOK_TOKEN";

#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    embeds: Vec<Embed<'a>>,
}

#[derive(Debug, Serialize)]
struct Embed<'a> {
    author: EmbedAuthor<'a>,
    description: String,
    color: u32,
}

#[derive(Debug, Serialize)]
struct EmbedAuthor<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon_url: Option<&'a str>,
}

/// Posts the release announcement
pub struct DiscordPipe {
    base_url: String,
}

impl DiscordPipe {
    /// Pipe posting to the public Discord API
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_WEBHOOK_BASE)
    }

    /// Pipe posting to a different API root
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Default for DiscordPipe {
    fn default() -> Self {
        Self::new()
    }
}

fn failure(reason: impl Into<String>) -> ReleaseError {
    ReleaseError::Announce {
        service: SERVICE,
        reason: reason.into(),
    }
}

fn webhook_credentials() -> Result<(u64, String)> {
    let id = std::env::var(ENV_WEBHOOK_ID)
        .map_err(|_| ReleaseError::config(format!("{SERVICE}: {ENV_WEBHOOK_ID} is not set")))?;
    let token = std::env::var(ENV_WEBHOOK_TOKEN)
        .map_err(|_| ReleaseError::config(format!("{SERVICE}: {ENV_WEBHOOK_TOKEN} is not set")))?;
    let id = id
        .trim()
        .parse::<u64>()
        .map_err(|e| failure(format!("invalid webhook id '{id}': {e}")))?;
    Ok((id, token))
}

#[async_trait]
impl Pipe for DiscordPipe {
    fn name(&self) -> &'static str {
        "discord"
    }

    fn skip(&self, ctx: &Context) -> bool {
        !ctx.config.announce.discord.enabled
    }

    fn default(&self, ctx: &mut Context) -> Result<()> {
        let discord = &mut ctx.config.announce.discord;
        if discord.message_template.is_empty() {
            discord.message_template = DEFAULT_MESSAGE.to_string();
        }
        if discord.author.is_empty() {
            discord.author = DEFAULT_AUTHOR.to_string();
        }
        if discord.color.is_empty() {
            discord.color = DEFAULT_COLOR.to_string();
        }
        Ok(())
    }

    async fn run(&self, ctx: &mut Context) -> Result<()> {
        let ctx: &Context = ctx;
        let discord = &ctx.config.announce.discord;

        let description = Template::new(ctx)
            .apply(&discord.message_template)
            .map_err(|e| failure(e.to_string()))?;
        let color = discord
            .color
            .trim()
            .parse::<u32>()
            .map_err(|e| failure(format!("invalid color '{}': {e}", discord.color)))?;
        let (id, token) = webhook_credentials()?;

        let message = WebhookMessage {
            embeds: vec![Embed {
                author: EmbedAuthor {
                    name: &discord.author,
                    icon_url: Some(discord.icon_url.as_str()).filter(|url| !url.is_empty()),
                },
                description,
                color,
            }],
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| failure(e.to_string()))?;
        let url = format!("{}/webhooks/{id}/{token}", self.base_url);

        let response = ctx
            .cancellable(client.post(&url).json(&message).send())
            .await?
            .map_err(|e| failure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(failure(format!("webhook returned {status}: {body}")));
        }

        log::info!(webhook_id = id; "announced release on discord");
        Ok(())
    }
}

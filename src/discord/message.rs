//! Discord webhook message schema and the builder that fills it.
//!
//! The wire format is fixed by these structs; the builder only decides which
//! embeds and fields are present.

use serde::Serialize;

use crate::core::models::{PullRequestContext, SummaryResult, truncate_chars};

pub const BOT_USERNAME: &str = "GitHub PR Bot";
pub const BOT_AVATAR_URL: &str =
    "https://github.githubassets.com/images/modules/logos_page/GitHub-Mark.png";

const TITLE_MAX_CHARS: usize = 100;
const REVIEW_EXCERPT_CHARS: usize = 80;
const REVIEWS_EMBED_MAX_CHARS: usize = 500;
const KEY_REVIEWS_SHOWN: usize = 2;

const COLOR_GREEN: u32 = 0x00ff00;
const COLOR_BLUE: u32 = 0x0099ff;
const COLOR_ORANGE: u32 = 0xffa500;
const COLOR_PURPLE: u32 = 0x6f42c1;
const COLOR_SPRING_GREEN: u32 = 0x00ff7f;

pub const SUMMARY_EMBED_TITLE: &str = "📋 AI Summary";
pub const REVIEWS_EMBED_TITLE: &str = "🔍 Key Reviews";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookMessage {
    pub username: String,
    pub avatar_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embed {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub color: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

impl WebhookMessage {
    #[must_use]
    pub fn embed(&self, title: &str) -> Option<&Embed> {
        self.embeds.iter().find(|e| e.title == title)
    }
}

fn title_case(word: &str) -> String {
    word.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + chars.as_str()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn action_emoji(action: &str, merged: bool) -> &'static str {
    match action {
        "opened" => "🆕",
        "synchronize" | "reopened" => "🔄",
        "closed" if merged => "✅",
        "closed" => "❌",
        "ready_for_review" => "👀",
        _ => "🔍",
    }
}

fn action_color(action: &str, state: &str) -> u32 {
    match action {
        "opened" => COLOR_GREEN,
        "synchronize" => COLOR_BLUE,
        "reopened" => COLOR_ORANGE,
        "closed" => COLOR_PURPLE,
        "ready_for_review" => COLOR_SPRING_GREEN,
        _ if state == "open" => COLOR_GREEN,
        _ => COLOR_PURPLE,
    }
}

/// Builds the single webhook message sent for one pull request event.
pub struct NotificationBuilder<'a> {
    context: &'a PullRequestContext,
    action: Option<&'a str>,
    summary: Option<&'a SummaryResult>,
    mention: Option<&'a str>,
}

impl<'a> NotificationBuilder<'a> {
    #[must_use]
    pub fn new(context: &'a PullRequestContext) -> Self {
        Self {
            context,
            action: None,
            summary: None,
            mention: None,
        }
    }

    #[must_use]
    pub fn action(mut self, action: &'a str) -> Self {
        self.action = Some(action).filter(|a| !a.is_empty());
        self
    }

    #[must_use]
    pub fn summary(mut self, summary: Option<&'a SummaryResult>) -> Self {
        self.summary = summary;
        self
    }

    /// Discord user ID to ping in the message content.
    #[must_use]
    pub fn mention(mut self, user_id: Option<&'a str>) -> Self {
        self.mention = user_id.filter(|id| !id.is_empty());
        self
    }

    #[must_use]
    pub fn build(self) -> WebhookMessage {
        let mut embeds = vec![self.overview_embed()];
        if let Some(summary) = self.summary {
            embeds.push(Embed {
                title: SUMMARY_EMBED_TITLE.to_string(),
                description: Some(summary.text().to_string()),
                url: None,
                color: COLOR_BLUE,
                fields: Vec::new(),
                timestamp: None,
                footer: Some(EmbedFooter {
                    text: format!(
                        "Generated by AI • {} chars",
                        summary.text().chars().count()
                    ),
                }),
            });
        }
        if let Some(reviews) = self.reviews_embed() {
            embeds.push(reviews);
        }

        let label = self.action.unwrap_or("analysis");
        let content = match self.mention {
            Some(id) => format!("<@{id}> PR {label} notification! 🚀"),
            None => format!("PR {label} notification! 🚀"),
        };

        WebhookMessage {
            username: BOT_USERNAME.to_string(),
            avatar_url: BOT_AVATAR_URL.to_string(),
            content: Some(content),
            embeds,
        }
    }

    fn overview_embed(&self) -> Embed {
        let ctx = self.context;
        let action = self.action.unwrap_or_default();
        let heading = self.action.map_or_else(|| "Analysis".to_string(), title_case);

        Embed {
            title: format!(
                "{} PR {}: {}",
                action_emoji(action, ctx.merged),
                heading,
                truncate_chars(&ctx.title, TITLE_MAX_CHARS)
            ),
            description: Some(format!(
                "**Author:** {}\n**Branch:** `{}` → `{}`",
                ctx.author, ctx.head_branch, ctx.base_branch
            )),
            url: Some(ctx.url.clone()).filter(|u| !u.is_empty()),
            color: action_color(action, &ctx.state),
            fields: vec![
                EmbedField {
                    name: "📊 Statistics".to_string(),
                    value: format!(
                        "**Files:** {}\n**Changes:** +{} -{}",
                        ctx.changed_files, ctx.additions, ctx.deletions
                    ),
                    inline: true,
                },
                EmbedField {
                    name: "💬 Activity".to_string(),
                    value: format!(
                        "**Reviews:** {}\n**Comments:** {}",
                        ctx.reviews.len(),
                        ctx.comments.len()
                    ),
                    inline: true,
                },
            ],
            timestamp: ctx.updated_at.map(|t| t.to_rfc3339()),
            footer: Some(EmbedFooter {
                text: format!("PR #{} • {}", ctx.number, title_case(&ctx.state)),
            }),
        }
    }

    fn reviews_embed(&self) -> Option<Embed> {
        let reviews = &self.context.reviews;
        if reviews.len() <= 1 {
            return None;
        }
        let text: String = reviews[reviews.len() - KEY_REVIEWS_SHOWN.min(reviews.len())..]
            .iter()
            .map(|r| {
                let body = if r.body.trim().is_empty() {
                    "No comment".to_string()
                } else {
                    truncate_chars(r.body.trim(), REVIEW_EXCERPT_CHARS)
                };
                format!("{} **{}**: {}\n", r.state.emoji(), r.author, body)
            })
            .collect();

        Some(Embed {
            title: REVIEWS_EMBED_TITLE.to_string(),
            description: Some(truncate_chars(&text, REVIEWS_EMBED_MAX_CHARS)),
            url: None,
            color: COLOR_ORANGE,
            fields: Vec::new(),
            timestamp: None,
            footer: Some(EmbedFooter {
                text: format!("{} total reviews", reviews.len()),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("opened"), "Opened");
        assert_eq!(title_case("ready_for_review"), "Ready For Review");
        assert_eq!(title_case("manual_test"), "Manual Test");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_closed_emoji_depends_on_merge() {
        assert_eq!(action_emoji("closed", true), "✅");
        assert_eq!(action_emoji("closed", false), "❌");
        assert_eq!(action_emoji("edited", false), "🔍");
    }

    #[test]
    fn test_color_falls_back_to_state() {
        assert_eq!(action_color("edited", "open"), COLOR_GREEN);
        assert_eq!(action_color("edited", "closed"), COLOR_PURPLE);
        assert_eq!(action_color("synchronize", "open"), COLOR_BLUE);
    }
}

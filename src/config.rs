// src/config.rs
use crate::constants::DEFAULT_CACHE_TTL_SECS;
use crate::error::AppError;
use crate::filter::FilterOptions;
use crate::types::{AuthToken, NotionId, ValidationError};
use clap::Parser;
use std::path::PathBuf;

/// Parsed command-line input.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// Blog root page URL or ID (defaults to $NOTION_PAGE_ID)
    pub page: Option<String>,

    /// Write the feed to this file instead of stdout
    #[arg(short, long)]
    pub output_file: Option<String>,

    /// Emit every extracted post, skipping the publish filter
    #[arg(long, default_value_t = false)]
    pub all: bool,

    /// Accepted post status (repeatable, default: Public)
    #[arg(long = "status")]
    pub status: Vec<String>,

    /// Accepted post type (repeatable, default: Post)
    #[arg(long = "type")]
    pub post_type: Vec<String>,

    /// Pretty-print the JSON feed
    #[arg(long, default_value_t = false)]
    pub pretty: bool,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable response caching (always fetch fresh data)
    #[arg(long, default_value_t = false)]
    pub no_cache: bool,

    /// Cache TTL in seconds
    #[arg(long, default_value_t = DEFAULT_CACHE_TTL_SECS)]
    pub cache_ttl: u64,

    /// Override the Notion v3 API base URL
    #[arg(long)]
    pub api_base: Option<String>,
}

/// Resolved pipeline configuration, validated and ready to drive fetch and delivery.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub page_id: NotionId,
    /// `token_v2` session cookie; public pages need none.
    pub token: Option<AuthToken>,
    pub active_user: Option<String>,
    pub api_base: Option<String>,
    pub output_file: Option<PathBuf>,
    /// `None` publishes every extracted post.
    pub filter: Option<FilterOptions>,
    pub pretty: bool,
    pub verbose: bool,
    pub no_cache: bool,
    pub cache_ttl: u64,
}

impl PipelineConfig {
    /// Resolves a complete pipeline configuration from CLI input and the
    /// process environment.
    pub fn resolve(cli: CommandLineInput) -> Result<Self, AppError> {
        Self::resolve_with(cli, |key| std::env::var(key).ok())
    }

    /// Resolves against an explicit environment lookup.
    pub fn resolve_with<F>(cli: CommandLineInput, env: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let page_input = cli.page.or_else(|| lookup("NOTION_PAGE_ID")).ok_or_else(|| {
            AppError::MissingConfiguration(
                "no page given and NOTION_PAGE_ID environment variable not set".to_string(),
            )
        })?;
        let page_id = NotionId::parse(&page_input)?;

        let token = lookup("NOTION_TOKEN_V2").map(AuthToken::new).transpose()?;
        let active_user = lookup("NOTION_ACTIVE_USER");
        if active_user.is_some() && token.is_none() {
            log::warn!("NOTION_ACTIVE_USER is set without NOTION_TOKEN_V2; it will have no effect");
        }

        let api_base = cli.api_base.map(validate_api_base).transpose()?;

        let filter = (!cli.all).then(|| {
            let defaults = FilterOptions::default();
            FilterOptions {
                accept_status: non_empty_or(cli.status, defaults.accept_status),
                accept_type: non_empty_or(cli.post_type, defaults.accept_type),
            }
        });

        Ok(PipelineConfig {
            page_id,
            token,
            active_user,
            api_base,
            output_file: cli.output_file.map(PathBuf::from),
            filter,
            pretty: cli.pretty,
            verbose: cli.verbose,
            no_cache: cli.no_cache,
            cache_ttl: cli.cache_ttl,
        })
    }
}

fn non_empty_or(values: Vec<String>, fallback: Vec<String>) -> Vec<String> {
    if values.is_empty() {
        fallback
    } else {
        values
    }
}

fn validate_api_base(raw: String) -> Result<String, ValidationError> {
    let parsed = url::Url::parse(&raw).map_err(|e| ValidationError::InvalidUrl {
        url: raw.clone(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(raw),
        other => Err(ValidationError::InvalidUrl {
            url: raw,
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

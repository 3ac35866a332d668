// src/main.rs

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use notion2posts::{
    deliver, AppError, CachedNotionClient, CommandLineInput, DeliveryTarget, FeedComposer,
    FeedDelivery, FeedDocument, NotionHttpClient, NotionId, NotionRepository, OutputPlan,
    OutputReport, PipelineConfig, PostCollection, PostFetcher, PostSource, RenderedFeed,
    SkipReason,
};
use std::fs;
use std::sync::Arc;

/// Sets up logging: console on stderr (stdout carries the feed) plus a debug log file.
fn setup_logging(verbose: bool) -> anyhow::Result<()> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join("notion2posts.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    let console_appender = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)
        .with_context(|| format!("cannot open log file {}", log_file_path.display()))?;

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(console_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stderr")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Executes the feed build: fetch → compose → deliver.
async fn execute_pipeline(config: &PipelineConfig) -> Result<(), AppError> {
    let pipeline = NotionToPosts::new(config);

    let posts = pipeline.fetch(&config.page_id).await?;
    let feed = pipeline.compose(&posts)?;
    let report = pipeline.deliver(feed)?;
    pipeline.report_completion(&posts, &report);

    Ok(())
}

/// Orchestrates extraction, feed composition and delivery for one root page.
struct NotionToPosts<'a> {
    config: &'a PipelineConfig,
}

impl<'a> NotionToPosts<'a> {
    fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    async fn build_client(&self) -> Result<Arc<dyn NotionRepository>, AppError> {
        let token = self.config.token.as_ref();
        let active_user = self.config.active_user.as_deref();
        let http_client = match &self.config.api_base {
            Some(base) => NotionHttpClient::with_base_url(base, token, active_user)?,
            None => NotionHttpClient::new(token, active_user)?,
        };

        if self.config.no_cache {
            log::info!("Cache disabled; all requests go to Notion");
            Ok(Arc::new(http_client))
        } else {
            log::info!("Cache enabled (TTL: {}s)", self.config.cache_ttl);
            Ok(Arc::new(
                CachedNotionClient::new(http_client, self.config.cache_ttl).await?,
            ))
        }
    }

    /// Summarizes the run on stderr, unless the feed itself went to stdout.
    fn report_completion(&self, posts: &PostCollection, report: &OutputReport) {
        if report.printed_to_stdout() {
            return;
        }

        eprintln!("📄 Extracted {} posts from Notion.", posts.posts.len());
        if !posts.is_complete() {
            eprintln!(
                "⚠️  Skipped {} pages ({} untitled, {} without properties, {} undated).",
                posts.skipped_count(),
                posts.skipped_for(&SkipReason::MissingTitle),
                posts.skipped_for(&SkipReason::NoProperties),
                posts.skipped_for(&SkipReason::MissingCreatedTime),
            );
        }

        for completed in &report.completed {
            if let DeliveryTarget::WriteFile { path, .. } = &completed.operation {
                eprintln!("✓ Feed saved to {}", path.display());
            }
        }
    }
}

#[async_trait::async_trait]
impl PostSource for NotionToPosts<'_> {
    async fn fetch(&self, root: &NotionId) -> Result<PostCollection, AppError> {
        log::info!("Retrieving posts for {}", root.as_str());
        let fetcher = PostFetcher::new(self.build_client().await?);
        fetcher.fetch_posts(root).await
    }
}

impl FeedComposer for NotionToPosts<'_> {
    fn compose(&self, posts: &PostCollection) -> Result<RenderedFeed, AppError> {
        let document = FeedDocument::build(posts, self.config.filter.as_ref(), chrono::Utc::now());
        log::info!(
            "Publishing {} of {} posts",
            document.posts.len(),
            posts.posts.len()
        );
        document.render(self.config.pretty)
    }
}

impl FeedDelivery for NotionToPosts<'_> {
    fn deliver(&self, feed: RenderedFeed) -> Result<OutputReport, AppError> {
        let plan = OutputPlan::for_feed(feed, self.config.output_file.clone());
        let report = deliver(plan)?;

        if !report.is_success() {
            return Err(AppError::DeliveryFailed {
                failures: report.failed.iter().map(|f| f.error.clone()).collect(),
            });
        }
        Ok(report)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose).context("failed to initialize logging")?;

    let config = PipelineConfig::resolve(cli)?;

    execute_pipeline(&config).await?;

    Ok(())
}

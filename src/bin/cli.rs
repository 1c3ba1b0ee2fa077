//! refound CLI
//!
//! Local execution entry point for the reconciliation pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use refound::{
    error::Result,
    models::{Config, LostCategory, Member, MemberLostItem},
    pipeline,
    services::{FeedClient, HttpMailer},
    store::LocalStore,
};

/// refound - Lost-and-Found Reconciliation Pipeline
#[derive(Parser, Debug)]
#[command(
    name = "refound",
    version,
    about = "Reconciles a public lost-and-found feed and notifies members"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run both periodic jobs until interrupted
    Run,

    /// Run a single feed reconciliation pass
    Reconcile,

    /// Run a single matching and notification pass
    Notify,

    /// Register a member who can receive notifications
    AddMember {
        #[arg(long)]
        id: u64,

        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,
    },

    /// File a lost-item report for a member
    AddReport {
        #[arg(long)]
        id: u64,

        #[arg(long)]
        member_id: u64,

        /// Category code as the feed uses it, e.g. "지갑"
        #[arg(long)]
        category: String,

        /// Name of the lost item
        #[arg(long)]
        name: String,

        /// Optional free-text description
        #[arg(long, default_value = "")]
        detail: String,
    },

    /// Validate the configuration file
    Validate,

    /// Show store collection counts
    Status,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("refound starting...");

    let config = Config::load_or_default(&cli.config);
    log::info!("Loaded configuration from {}", cli.config.display());

    let store = LocalStore::new(&config.store.data_dir);

    match cli.command {
        Command::Run => {
            config.validate()?;
            pipeline::run_scheduler(Arc::new(config), Arc::new(store)).await?;
        }

        Command::Reconcile => {
            config.feed.validate()?;
            let feed = FeedClient::new(&config.feed)?;
            let summary = pipeline::run_reconcile(&feed, &store, config.feed.tail_window).await?;
            log::info!(
                "Reconcile complete: feed total {}, {} fetched, {} upserted, {} skipped",
                summary.feed_total,
                summary.fetched,
                summary.upserted,
                summary.skipped
            );
        }

        Command::Notify => {
            config.mail.validate()?;
            let mailer = HttpMailer::new(&config.mail)?;
            let summary = pipeline::run_notify(&store, &store, &mailer).await?;
            log::info!(
                "Notify complete: {} candidate(s), {} sent, {} skipped, {} failed",
                summary.candidates,
                summary.sent,
                summary.skipped,
                summary.failed
            );
        }

        Command::AddMember { id, name, email } => {
            store.insert_member(Member { id, name, email }).await?;
            log::info!("Member {} registered", id);
        }

        Command::AddReport {
            id,
            member_id,
            category,
            name,
            detail,
        } => {
            let category = LostCategory::from_code(&category);
            if category == LostCategory::Unknown {
                log::warn!("Category code not recognized; filing as unclassified");
            }
            store
                .insert_report(MemberLostItem {
                    id,
                    member_id,
                    category,
                    item_name: name,
                    item_detail: detail,
                    notified: false,
                })
                .await?;
            log::info!("Report {} filed", id);
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK (feed, store, mail, and schedule sections)");

            log::info!("All validations passed!");
        }

        Command::Status => {
            log::info!("Data directory: {}", config.store.data_dir);
            let summary = store.summary().await?;
            log::info!(
                "Lost items: {} ({} notified)",
                summary.lost_items,
                summary.sent_items
            );
            log::info!("Members: {}", summary.members);
            log::info!(
                "Reports: {} open of {}",
                summary.unnotified_reports,
                summary.reports
            );
        }
    }

    log::info!("Done!");

    Ok(())
}

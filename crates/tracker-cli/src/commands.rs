//! Subcommand handlers.

use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::debug;
use tracker_config_and_utils::{Paths, TrackerConfig};
use tracker_events::{Labels, TrackEvent};
use tracker_outbox::{ReqwestTransport, Tracker};
use tracker_storage::{FileStore, PlatformDeviceId};

use crate::{Commands, EventKind};

pub(crate) async fn run(command: Commands, config: TrackerConfig, paths: &Paths) -> anyhow::Result<()> {
    let store = FileStore::open(paths.store_file())
        .with_context(|| format!("opening store at {}", paths.store_file().display()))?;
    let transport = ReqwestTransport::new(config.request_timeout())?;
    let tracker = Tracker::initialize(
        config,
        Arc::new(store),
        Arc::new(PlatformDeviceId::new()),
        Arc::new(transport),
    )?;

    let result = dispatch(&tracker, command).await;
    tracker.shutdown();
    result
}

async fn dispatch(tracker: &Tracker, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Send {
            kind,
            ids,
            labels,
            amount,
            trans_id,
            name,
            url,
        } => {
            let event = build_event(kind, ids, labels.into_iter().collect(), amount, trans_id, name)?;
            if let Some(url) = url {
                tracker.set_current_url(url);
            }
            let event_name = event.name().to_string();
            tracker.send(event).await?;
            let pending = tracker.pending_retries().await?;
            println!("{event_name}: dispatched ({pending} pending retries)");
        }
        Commands::Identify { user_id } => match tracker.set_user(&user_id) {
            Some(handle) => {
                handle.await?;
                println!("identified as {user_id}");
            }
            None => println!("already identified as {user_id}"),
        },
        Commands::Retry => {
            let report = tracker.process_retry_queue().await;
            let pending = tracker.pending_retries().await?;
            println!(
                "delivered={} requeued={} rejected={} dropped_stale={} dropped_malformed={} pending={}",
                report.delivered,
                report.requeued,
                report.rejected,
                report.dropped_stale,
                report.dropped_malformed,
                pending
            );
        }
        Commands::Status => {
            let pending = tracker.pending_retries().await?;
            println!("tmpId:    {}", tracker.tmp_id().unwrap_or_default());
            println!("userId:   {}", tracker.user_id().unwrap_or_default());
            println!("endpoint: {}", tracker.endpoint());
            println!("pending:  {pending}");
        }
        Commands::Clear => {
            tracker.clear_storage().await?;
            println!("storage cleared");
        }
    }
    debug!("Command finished");
    Ok(())
}

/// Map command-line arguments onto an event variant.
pub(crate) fn build_event(
    kind: EventKind,
    ids: Vec<String>,
    labels: Labels,
    amount: Option<f64>,
    trans_id: Option<String>,
    name: Option<String>,
) -> anyhow::Result<TrackEvent> {
    let event = match kind {
        EventKind::PageView => TrackEvent::page_view(),
        EventKind::ProductPage => TrackEvent::product_page(ids),
        EventKind::CategoryView => TrackEvent::category_view(ids),
        EventKind::BrandView => TrackEvent::brand_view(ids),
        EventKind::ProductHover => TrackEvent::product_hover(ids),
        EventKind::AddCart => TrackEvent::add_cart(ids),
        EventKind::Purchase => {
            let Some(amount) = amount else {
                bail!("purchase requires --amount");
            };
            TrackEvent::purchase(ids, amount, trans_id)
        }
        EventKind::Custom => {
            let Some(name) = name.filter(|n| !n.trim().is_empty()) else {
                bail!("custom events require --name");
            };
            TrackEvent::custom(name)
        }
    };
    Ok(event.with_labels(labels))
}

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use iamavailable_directory::config::DirectoryConfig;
use iamavailable_directory::directory::FilterSpec;
use iamavailable_directory::feed::{SnapshotPoller, SnapshotPublisher};
use iamavailable_directory::state::{DirectoryService, ResultCache};
use iamavailable_directory::tier::is_expired;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = DirectoryConfig::load().context("Failed to load configuration")?;

    let publisher = Arc::new(SnapshotPublisher::new());
    let poller = SnapshotPoller::new(
        config.snapshot.path.clone(),
        config.snapshot.poll_interval(),
        Arc::clone(&publisher),
    );
    poller
        .tick()
        .await
        .context("Failed to load initial profile snapshot")?;

    let cache = Arc::new(ResultCache::new(&config.cache));
    let mut service = DirectoryService::new(publisher.subscribe(), cache);
    let filter = config.directory.default_filter.clone();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut shutdown = shutdown_tx.subscribe();
    let poller_handle = tokio::spawn(async move {
        if let Err(err) = poller.run(shutdown_rx).await {
            error!("Snapshot poller terminated with error: {err}");
        }
    });
    tokio::spawn(shutdown_signal(shutdown_tx.clone()));

    report(&service, &filter).await;
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
            changed = service.changed() => {
                match changed {
                    Ok(_) => report(&service, &filter).await,
                    Err(err) => {
                        warn!("{err}");
                        break;
                    }
                }
            }
        }
    }

    shutdown_tx.send(true).ok();
    if let Err(join_err) = poller_handle.await {
        error!("Snapshot poller join error: {join_err}");
    }

    Ok(())
}

fn init_tracing() {
    let default_filter = "info";
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());
    assert!(!filter.is_empty(), "Tracing filter must not be empty");
    assert!(filter.len() < 256, "Tracing filter length exceeds bounds");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .compact()
        .init();
}

async fn report(service: &DirectoryService, filter: &FilterSpec) {
    let view = service.query(filter).await;
    info!(
        "Directory revision {}: {} of {} profiles match ({} active filters)",
        view.revision,
        view.profiles.len(),
        view.total,
        view.active_filters
    );
    if view.offers_clear_filters() {
        info!("No profiles found; clearing filters would show all {}", view.total);
    }

    let now = Utc::now();
    let snapshot = service.snapshot();
    let stale = snapshot
        .profiles
        .iter()
        .filter(|profile| is_expired(profile, profile.tier, now))
        .count();
    if stale > 0 {
        info!("{stale} free-tier profiles are past their listing window");
    }

    for profile in view.profiles.iter() {
        let open_to: Vec<&str> = profile.open_to.iter().map(|option| option.label()).collect();
        debug!(
            "{} | {} | {} | open to: {} | featured={}",
            profile.name,
            profile.role,
            profile.availability.label(),
            open_to.join(", "),
            profile.featured
        );
    }
}

async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {err}");
        return;
    }
    shutdown_tx.send(true).ok();
    info!("Shutdown signal dispatched");
}

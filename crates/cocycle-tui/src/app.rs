//! Application state for the ride preview.
//!
//! The `App` owns the query layer, the ride page being shown and the map
//! preview. Fetches run as background tasks and report back over an MPSC
//! channel; each result carries the `Ticket` it was requested under and is
//! dropped if a refresh has superseded it.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use cocycle_core::api::{ApiClient, ApiError};
use cocycle_core::cache::{ride_keys, Cached, QueryCache, QueryState, RequestGuard, RideQueries, Ticket};
use cocycle_core::config::Config;
use cocycle_core::map::{MapInputs, MapPreview};
use cocycle_core::models::{Participant, Ride};
use cocycle_core::view::{BuildContext, RidePage};

use crate::ui::map_canvas::CanvasFactory;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background result channel.
/// A load produces two results; refreshes may briefly overlap.
const CHANNEL_BUFFER_SIZE: usize = 8;

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    Quitting,
}

// ============================================================================
// Background Task Results
// ============================================================================

enum Fetched {
    Ride(Result<Arc<Ride>, ApiError>),
    Participants(Result<Arc<Vec<Participant>>, ApiError>),
}

struct BackgroundResult {
    ticket: Ticket,
    fetched: Fetched,
}

pub struct App {
    pub state: AppState,
    pub ride_id: String,
    pub page: RidePage,
    pub map: MapPreview<CanvasFactory>,
    pub status_message: Option<String>,
    /// Participant list scroll offset
    pub scroll: usize,
    /// Age of the ride currently shown
    pub ride_cache: Option<Cached<Ride>>,

    config: Config,
    queries: RideQueries<ApiClient>,
    guard: RequestGuard,
    ride: QueryState<Ride>,
    participants: QueryState<Vec<Participant>>,

    result_rx: mpsc::Receiver<BackgroundResult>,
    result_tx: mpsc::Sender<BackgroundResult>,
}

impl App {
    pub fn new(config: Config, ride_id: String) -> Result<Self> {
        let api = ApiClient::new(config.api_url.clone()).context("Failed to build HTTP client")?;
        let queries = RideQueries::new(api, QueryCache::new());
        let map = MapPreview::new(CanvasFactory::default(), config.map_token.clone());
        let (result_tx, result_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Ok(Self {
            state: AppState::Normal,
            ride_id,
            page: RidePage::Loading,
            map,
            status_message: None,
            scroll: 0,
            ride_cache: None,
            config,
            queries,
            guard: RequestGuard::new(),
            ride: QueryState::Loading,
            participants: QueryState::Loading,
            result_rx,
            result_tx,
        })
    }

    /// Start fetching the ride and its participants in the background
    pub fn load(&mut self) {
        let ticket = self.guard.issue();
        debug!(ride_id = %self.ride_id, generation = ticket.generation(), "Loading ride");

        let queries = self.queries.clone();
        let ride_id = self.ride_id.clone();
        let tx = self.result_tx.clone();
        let ride_ticket = ticket.clone();
        tokio::spawn(async move {
            let fetched = Fetched::Ride(queries.ride(&ride_id).await);
            Self::send_result(&tx, ride_ticket, fetched).await;
        });

        let queries = self.queries.clone();
        let ride_id = self.ride_id.clone();
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            let fetched = Fetched::Participants(queries.participants(&ride_id).await);
            Self::send_result(&tx, ticket, fetched).await;
        });
    }

    /// Drop cached data for this ride and fetch it again
    pub async fn refresh(&mut self) {
        info!(ride_id = %self.ride_id, "Refreshing ride");
        self.guard.invalidate();
        let removed = self.queries.invalidate_ride(&self.ride_id).await;
        debug!(removed, "Invalidated cached ride entries");

        self.ride = QueryState::Loading;
        self.participants = QueryState::Loading;
        self.rebuild_page();
        self.status_message = Some("Refreshing...".to_string());
        self.load();
    }

    async fn send_result(tx: &mpsc::Sender<BackgroundResult>, ticket: Ticket, fetched: Fetched) {
        if let Err(e) = tx.send(BackgroundResult { ticket, fetched }).await {
            error!(error = %e, "Failed to send fetch result - channel closed");
        }
    }

    /// Apply finished background fetches
    pub async fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.result_rx.try_recv() {
            results.push(result);
        }
        if results.is_empty() {
            return;
        }

        for result in results {
            if !result.ticket.is_current() {
                debug!(generation = result.ticket.generation(), "Dropping superseded result");
                continue;
            }
            match result.fetched {
                Fetched::Ride(result) => {
                    if let Err(ref e) = result {
                        warn!(ride_id = %self.ride_id, error = %e, "Ride failed to load");
                        self.status_message = Some(format!("Error: {}", e));
                    } else {
                        self.status_message = None;
                    }
                    self.ride = result.into();
                    self.ride_cache = self
                        .queries
                        .cache()
                        .peek::<Ride>(&ride_keys::detail(&self.ride_id))
                        .await;
                }
                Fetched::Participants(result) => {
                    if let Err(ref e) = result {
                        warn!(ride_id = %self.ride_id, error = %e, "Participants failed to load");
                    }
                    self.participants = result.into();
                }
            }
        }

        self.rebuild_page();
        self.update_map();
    }

    fn rebuild_page(&mut self) {
        let mut ctx = BuildContext::new(Utc::now(), Local);
        ctx.deep_link_scheme = self.config.deep_link_scheme.clone();
        self.page = RidePage::resolve(&self.ride, &self.participants, &ctx);
    }

    fn update_map(&mut self) {
        let Some(ride) = self.ride.data() else {
            self.map.unmount();
            return;
        };
        if let Err(e) = self.map.render(&MapInputs::from_ride(ride)) {
            error!(error = %e, "Map preview failed");
            self.status_message = Some(format!("Map unavailable: {}", e));
        }
    }

    pub fn participant_count(&self) -> usize {
        match &self.page {
            RidePage::Ready(view) => view.participants.len(),
            _ => 0,
        }
    }

    pub fn scroll_down(&mut self) {
        if self.scroll + 1 < self.participant_count() {
            self.scroll += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    /// Release the map and drop every cached entry
    pub async fn shutdown(&mut self) {
        self.guard.invalidate();
        self.map.unmount();
        self.queries.cache().clear().await;
        info!("Session cache cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let config = Config {
            api_url: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        App::new(config, "ride-1".to_string()).expect("app builds")
    }

    #[tokio::test]
    async fn test_stale_results_are_dropped() {
        let mut app = app();
        let old = app.guard.issue();
        let _new = app.guard.issue();

        App::send_result(
            &app.result_tx,
            old,
            Fetched::Ride(Err(ApiError::Network("late".to_string()))),
        )
        .await;
        app.check_background_tasks().await;

        assert_eq!(app.page, RidePage::Loading);
        assert!(app.status_message.is_none());
    }

    #[tokio::test]
    async fn test_current_error_shows_not_found() {
        let mut app = app();
        let ticket = app.guard.issue();

        App::send_result(
            &app.result_tx,
            ticket,
            Fetched::Ride(Err(ApiError::NotFound("ride".to_string()))),
        )
        .await;
        app.check_background_tasks().await;

        assert_eq!(app.page, RidePage::NotFound);
        assert!(app.status_message.is_some());
        assert!(!app.map.is_mounted());
    }

    #[tokio::test]
    async fn test_scroll_is_clamped() {
        let mut app = app();
        app.scroll_up();
        app.scroll_down();
        assert_eq!(app.scroll, 0);
    }
}

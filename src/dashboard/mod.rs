//! Headless dashboard controller
//!
//! Owns the dashboard's state: the current snapshot, the air-quality view,
//! the chart panel, settings, and search history. Rendering is someone
//! else's job; this module only decides what the views should show.
//!
//! Loads are token-based. `begin_load` hands out a generation token and
//! refuses re-entry while a load is in flight; `commit_load` discards
//! results whose token is no longer current, so a stale response can never
//! overwrite a newer one.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::chart::{ChartArea, ChartError, ChartMetric, ChartPanel};
use crate::models::{AirQualitySample, ForecastDay, WeatherSnapshot};
use crate::Result;

pub mod feed;
pub mod recents;
pub mod settings;
pub mod storage;

pub use feed::{HttpFeed, WeatherFeed};
pub use recents::RecentSearches;
pub use settings::{Settings, TemperatureUnit};
pub use storage::StateStore;

/// How long the air-quality fetch may run before the view gives up on it
pub const AIR_QUALITY_TIMEOUT: Duration = Duration::from_secs(8);

/// Resize events within this window collapse into one relayout
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(300);

const ZERO_AREA_RETRIES: u32 = 10;
const ZERO_AREA_RETRY_DELAY: Duration = Duration::from_millis(100);

const DEFAULT_CHART_AREA: ChartArea = ChartArea {
    width: 600.0,
    height: 300.0,
};

/// Fallback suggestions shown alongside matching recents
const POPULAR_CITIES: [&str; 5] = ["London", "New York", "Tokyo", "Paris", "Sydney"];

const MAX_SUGGESTIONS: usize = 6;
const MAX_RECENT_SUGGESTIONS: usize = 3;

/// What the air-quality card shows
#[derive(Debug, Clone, PartialEq)]
pub enum AirQualityView {
    /// No reading requested yet
    Pending,
    Available(AirQualitySample),
    /// Fetch failed or timed out; the card shows a placeholder
    Unavailable,
}

/// Proof that a load was started; commits carry it back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadToken {
    generation: u64,
}

/// Everything one load fetches before any state changes. Air quality is not
/// part of this; it loads after the snapshot is applied so a slow air-quality
/// upstream never delays the main view.
#[derive(Debug)]
pub struct CityData {
    pub snapshot: WeatherSnapshot,
    pub chart: Option<Vec<ForecastDay>>,
    pub chart_error: Option<String>,
}

#[derive(Debug)]
struct ResizeDebounce {
    pending: Option<ChartArea>,
    deadline: Instant,
}

pub struct Dashboard {
    feed: Arc<dyn WeatherFeed>,
    store: StateStore,
    settings: Settings,
    recents: RecentSearches,
    location_permission: Option<bool>,
    generation: u64,
    loading: bool,
    current: Option<WeatherSnapshot>,
    air: AirQualityView,
    panel: ChartPanel,
    chart_area: ChartArea,
    resize: Option<ResizeDebounce>,
    refresh_deadline: Instant,
}

impl Dashboard {
    /// Build a dashboard, restoring persisted settings, search history, and
    /// the location permission decision
    pub async fn new(feed: Arc<dyn WeatherFeed>, store: StateStore) -> Result<Self> {
        let settings: Settings = store
            .get(storage::SETTINGS_KEY)
            .await?
            .unwrap_or_default();
        let recents: RecentSearches = store
            .get(storage::RECENTS_KEY)
            .await?
            .unwrap_or_default();
        let location_permission: Option<bool> = store.get(storage::PERMISSION_KEY).await?;

        let refresh_deadline = Instant::now() + Duration::from_millis(settings.refresh_interval_ms);
        Ok(Self {
            feed,
            store,
            settings,
            recents,
            location_permission,
            generation: 0,
            loading: false,
            current: None,
            air: AirQualityView::Pending,
            panel: ChartPanel::new(),
            chart_area: DEFAULT_CHART_AREA,
            resize: None,
            refresh_deadline,
        })
    }

    // ---- load lifecycle ----

    /// Start a load. Returns `None` while another load is in flight; callers
    /// drop the request rather than queueing it.
    pub fn begin_load(&mut self) -> Option<LoadToken> {
        if self.loading {
            debug!("Load already in flight, ignoring request");
            return None;
        }
        self.loading = true;
        self.generation += 1;
        Some(LoadToken {
            generation: self.generation,
        })
    }

    /// Fetch everything one city view needs. The snapshot is mandatory; the
    /// chart fetch degrades rather than failing the load.
    pub async fn fetch_city(&self, city: &str) -> Result<CityData> {
        let snapshot = self.feed.snapshot_by_city(city);
        let chart = self.feed.chart(city);
        let (snapshot, chart) = tokio::join!(snapshot, chart);

        Ok(Self::assemble(
            snapshot?,
            chart.map(|series| series.combined),
        ))
    }

    /// Coordinate variant of [`fetch_city`](Self::fetch_city); the chart
    /// fetch is keyed by the resolved city name
    pub async fn fetch_coords(&self, lat: f64, lng: f64) -> Result<CityData> {
        let snapshot = self.feed.snapshot_by_coords(lat, lng).await?;
        let city = snapshot.place.city.clone();
        let chart = self.feed.chart(&city).await;

        Ok(Self::assemble(snapshot, chart.map(|series| series.combined)))
    }

    fn assemble(snapshot: WeatherSnapshot, chart: Result<Vec<ForecastDay>>) -> CityData {
        let (chart, chart_error) = match chart {
            Ok(days) => (Some(days), None),
            Err(err) => {
                warn!(%err, "Chart data unavailable");
                (None, Some(err.user_message()))
            }
        };

        CityData {
            snapshot,
            chart,
            chart_error,
        }
    }

    /// Fetch air quality for an already-applied snapshot, bounded by
    /// [`AIR_QUALITY_TIMEOUT`]. Timeout and fetch failure both degrade to
    /// the unavailable view; the timed-out future is dropped, not awaited.
    /// Results for a superseded token are discarded.
    pub async fn load_air_quality(&mut self, token: LoadToken, city: &str) {
        let result =
            tokio::time::timeout(AIR_QUALITY_TIMEOUT, self.feed.air_quality(city)).await;

        if token.generation != self.generation {
            debug!("Discarding stale air quality result");
            return;
        }

        self.air = match result {
            Ok(Ok(sample)) => AirQualityView::Available(sample),
            Ok(Err(err)) => {
                warn!(%err, "Air quality unavailable");
                AirQualityView::Unavailable
            }
            Err(_) => {
                warn!("Air quality request timed out");
                AirQualityView::Unavailable
            }
        };
    }

    /// Apply fetched data. Returns `false` (discarding the data untouched)
    /// when a newer load has started since the token was issued.
    pub async fn commit_load(&mut self, token: LoadToken, data: CityData) -> bool {
        if token.generation != self.generation {
            debug!(
                stale = token.generation,
                current = self.generation,
                "Discarding stale load result"
            );
            return false;
        }
        self.loading = false;

        self.recents.push(&data.snapshot.place.city);
        if let Err(err) = self
            .store
            .put(storage::RECENTS_KEY, self.recents.clone())
            .await
        {
            warn!(%err, "Failed to persist recent searches");
        }

        self.current = Some(data.snapshot);
        self.air = AirQualityView::Pending;

        self.panel.begin_load();
        match data.chart {
            Some(days) => self.settle_chart(days).await,
            None => self
                .panel
                .fail_load(data.chart_error.unwrap_or_else(|| {
                    "Chart data unavailable".to_string()
                })),
        }

        self.arm_refresh();
        true
    }

    /// Abandon a load after a fetch failure, keeping the last good state on
    /// screen
    pub fn abort_load(&mut self, token: LoadToken) {
        if token.generation == self.generation {
            self.loading = false;
        }
    }

    /// Convenience wrapper: begin, fetch, commit, then fetch air quality for
    /// the committed city. Returns `Ok(false)` when the request was ignored
    /// because a load was already in flight.
    pub async fn load_city(&mut self, city: &str) -> Result<bool> {
        let Some(token) = self.begin_load() else {
            return Ok(false);
        };

        match self.fetch_city(city).await {
            Ok(data) => {
                let committed = self.commit_load(token, data).await;
                if committed {
                    self.refresh_air_quality(token).await;
                }
                Ok(committed)
            }
            Err(err) => {
                self.abort_load(token);
                Err(err)
            }
        }
    }

    pub async fn load_coords(&mut self, lat: f64, lng: f64) -> Result<bool> {
        let Some(token) = self.begin_load() else {
            return Ok(false);
        };

        match self.fetch_coords(lat, lng).await {
            Ok(data) => {
                let committed = self.commit_load(token, data).await;
                if committed {
                    self.refresh_air_quality(token).await;
                }
                Ok(committed)
            }
            Err(err) => {
                self.abort_load(token);
                Err(err)
            }
        }
    }

    /// Reload the currently displayed city. A no-op when nothing has been
    /// loaded yet.
    pub async fn refresh(&mut self) -> Result<bool> {
        let Some(city) = self.current.as_ref().map(|s| s.place.city.clone()) else {
            return Ok(false);
        };
        self.load_city(&city).await
    }

    async fn refresh_air_quality(&mut self, token: LoadToken) {
        let Some(city) = self.current.as_ref().map(|s| s.place.city.clone()) else {
            return;
        };
        self.load_air_quality(token, &city).await;
    }

    /// Lay out the chart, retrying a bounded number of times while the
    /// drawing area reports zero size (mid-layout reads settle quickly)
    async fn settle_chart(&mut self, days: Vec<ForecastDay>) {
        for attempt in 0..=ZERO_AREA_RETRIES {
            match self.panel.complete_load(days.clone(), self.chart_area) {
                Ok(()) => return,
                Err(ChartError::ZeroArea) if attempt < ZERO_AREA_RETRIES => {
                    tokio::time::sleep(ZERO_AREA_RETRY_DELAY).await;
                }
                Err(_) => return,
            }
        }
    }

    // ---- views ----

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn current(&self) -> Option<&WeatherSnapshot> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn air_quality(&self) -> &AirQualityView {
        &self.air
    }

    #[must_use]
    pub fn panel(&self) -> &ChartPanel {
        &self.panel
    }

    #[must_use]
    pub fn panel_mut(&mut self) -> &mut ChartPanel {
        &mut self.panel
    }

    /// Switch the plotted chart metric; the held window relays out without a
    /// refetch
    pub fn switch_metric(&mut self, metric: ChartMetric) -> std::result::Result<(), ChartError> {
        self.panel.switch_metric(metric)
    }

    #[must_use]
    pub fn recents(&self) -> &RecentSearches {
        &self.recents
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn location_permission(&self) -> Option<bool> {
        self.location_permission
    }

    /// Autocomplete suggestions: matching recents first, then matching
    /// popular cities, deduplicated and capped. Empty when autocomplete is
    /// disabled in settings.
    #[must_use]
    pub fn suggest(&self, query: &str) -> Vec<String> {
        if !self.settings.autocomplete || query.trim().is_empty() {
            return Vec::new();
        }

        let mut suggestions: Vec<String> = self
            .recents
            .matching(query)
            .take(MAX_RECENT_SUGGESTIONS)
            .map(str::to_string)
            .collect();

        let query_lower = query.to_lowercase();
        for city in POPULAR_CITIES {
            if suggestions.len() >= MAX_SUGGESTIONS {
                break;
            }
            if city.to_lowercase().contains(&query_lower)
                && !suggestions.iter().any(|s| s.eq_ignore_ascii_case(city))
            {
                suggestions.push(city.to_string());
            }
        }

        suggestions.truncate(MAX_SUGGESTIONS);
        suggestions
    }

    // ---- settings and permissions ----

    /// Replace the settings, persist them, and re-arm the refresh timer with
    /// the new interval
    pub async fn update_settings(&mut self, settings: Settings) -> Result<()> {
        self.settings = settings;
        self.store
            .put(storage::SETTINGS_KEY, self.settings.clone())
            .await?;
        self.arm_refresh();
        Ok(())
    }

    /// Record the location permission decision so the dashboard never
    /// re-prompts
    pub async fn set_location_permission(&mut self, granted: bool) -> Result<()> {
        self.location_permission = Some(granted);
        self.store.put(storage::PERMISSION_KEY, granted).await?;
        Ok(())
    }

    // ---- auto refresh ----

    fn arm_refresh(&mut self) {
        self.refresh_deadline =
            Instant::now() + Duration::from_millis(self.settings.refresh_interval_ms);
    }

    /// Whether the auto-refresh interval has elapsed since the last commit
    /// or settings change
    #[must_use]
    pub fn refresh_due(&self) -> bool {
        self.settings.auto_refresh && Instant::now() >= self.refresh_deadline
    }

    // ---- resize ----

    /// Record a resize; the relayout happens once events go quiet for
    /// [`RESIZE_DEBOUNCE`]
    pub fn queue_resize(&mut self, area: ChartArea) {
        self.resize = Some(ResizeDebounce {
            pending: Some(area),
            deadline: Instant::now() + RESIZE_DEBOUNCE,
        });
    }

    /// Apply a queued resize once its debounce window has passed. Returns
    /// `true` when a relayout was applied.
    pub fn poll_resize(&mut self) -> bool {
        let ready = match &self.resize {
            Some(debounce) => Instant::now() >= debounce.deadline,
            None => false,
        };
        if !ready {
            return false;
        }

        let Some(area) = self.resize.take().and_then(|debounce| debounce.pending) else {
            return false;
        };
        self.chart_area = area;

        match self.panel.redraw(area) {
            Ok(()) | Err(ChartError::ZeroArea) => {}
            Err(err) => warn!(%err, "Chart relayout failed after resize"),
        }
        true
    }

    #[cfg(test)]
    fn set_chart_area(&mut self, area: ChartArea) {
        self.chart_area = area;
    }
}

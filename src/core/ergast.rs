use crate::adapters::http::{HttpClient, HttpSettings, RetryPolicy};
use crate::config::toml_config::TomlConfig;
use crate::core::endpoints::Endpoints;
use crate::core::transform::{
    filter_races_by_position, filter_standings_by_position, flatten_standings,
};
use crate::domain::model::{
    ChampionRecord, DriverStandingsResponse, Race, RaceResultsResponse, SeasonStandingsList,
};
use crate::domain::ports::{ApiRequest, RequestExecutor};
use crate::utils::error::{EtlError, Result};
use futures::future::join_all;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const STANDINGS_CONTEXT: &str = "F1 seasons (driverStanding)";
pub const RACE_RESULTS_CONTEXT: &str = "F1 seasons (race results)";

/// Pacing and fan-out knobs for the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Years fetched together in one chunk.
    pub concurrency_limit: usize,
    /// Pause between two chunks of years.
    pub batch_delay: Duration,
    /// Records requested per results page.
    pub page_size: usize,
    /// Pause before each further results page.
    pub page_delay: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            concurrency_limit: 3,
            batch_delay: Duration::from_millis(100),
            page_size: 100,
            page_delay: Duration::from_millis(200),
        }
    }
}

/// Inclusive range of seasons for [`ErgastService::fetch_season_champions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonRange {
    pub from_year: i32,
    pub to_year: i32,
    pub position: Option<u32>,
}

impl SeasonRange {
    pub fn new(from_year: i32, to_year: i32) -> Self {
        Self {
            from_year,
            to_year,
            position: None,
        }
    }

    pub fn with_position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    /// Years in the range; empty when `from_year` is after `to_year`.
    fn years(&self) -> Vec<i32> {
        (self.from_year..=self.to_year).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonRaceQuery {
    pub year: i32,
    pub position: Option<u32>,
}

impl SeasonRaceQuery {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            position: None,
        }
    }

    pub fn with_position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }
}

/// Result of one year's task inside a chunk.
enum YearOutcome {
    Fetched(Vec<ChampionRecord>),
    Failed,
}

enum PageState {
    Fetching,
    Evaluating,
    Done,
}

/// Offset bookkeeping for the results paginator.
#[derive(Debug)]
struct PageCursor {
    offset: usize,
    limit: usize,
    total: usize,
}

impl PageCursor {
    fn new(limit: usize) -> Self {
        Self {
            offset: 0,
            limit: limit.max(1),
            total: 0,
        }
    }

    fn advance(&mut self, reported_total: usize) {
        self.total = reported_total;
        self.offset += self.limit;
    }

    fn has_more(&self) -> bool {
        self.offset < self.total
    }
}

// 0 視為未指定名次
fn active_position(position: Option<u32>) -> Option<u32> {
    position.filter(|p| *p > 0)
}

fn describe_position(position: Option<u32>) -> String {
    position
        .map(|p| format!(" (position {})", p))
        .unwrap_or_default()
}

fn decode<T: DeserializeOwned + Default>(body: Option<serde_json::Value>) -> Result<T> {
    match body {
        Some(value) if !value.is_null() => Ok(serde_json::from_value(value)?),
        _ => Ok(T::default()),
    }
}

/// Aggregation engine over the Ergast results API.
pub struct ErgastService<E: RequestExecutor> {
    executor: E,
    endpoints: Endpoints,
    settings: EngineSettings,
}

impl ErgastService<HttpClient> {
    /// Builds the reqwest-backed service; the retry policy is fixed from here on.
    pub fn from_config(config: &TomlConfig) -> Result<Self> {
        let http = HttpClient::new(HttpSettings::from(config), RetryPolicy::from(config))?;
        let endpoints = Endpoints::new(config.base_url())?;
        Ok(Self::with_settings(http, endpoints, EngineSettings::from(config)))
    }
}

impl<E: RequestExecutor> ErgastService<E> {
    pub fn new(executor: E, endpoints: Endpoints) -> Self {
        Self::with_settings(executor, endpoints, EngineSettings::default())
    }

    pub fn with_settings(executor: E, endpoints: Endpoints, settings: EngineSettings) -> Self {
        Self {
            executor,
            endpoints,
            settings,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// One season's standings, flattened or narrowed to a single position.
    pub async fn fetch_driver_standings(
        &self,
        year: i32,
        position: Option<u32>,
    ) -> Result<Vec<ChampionRecord>> {
        let position = active_position(position);
        let request = ApiRequest::get(self.endpoints.driver_standings(year), STANDINGS_CONTEXT);

        tracing::info!(
            "🏁 Driver standings: fetching {}{}",
            year,
            describe_position(position)
        );

        let response: DriverStandingsResponse = decode(self.executor.execute(&request).await?)?;
        let lists: Vec<SeasonStandingsList> = response.mr_data.standings_table.standings_lists;

        if lists.is_empty() {
            tracing::warn!(
                "⚠️ Driver standings: no data for {}{}",
                year,
                describe_position(position)
            );
            return Ok(Vec::new());
        }

        let champions = match position {
            Some(p) => filter_standings_by_position(&lists, p),
            None => flatten_standings(&lists),
        };

        tracing::info!(
            "✅ Driver standings: {} records for {}{}",
            champions.len(),
            year,
            describe_position(position)
        );

        Ok(champions)
    }

    /// Standings for every year in the range, in year order.
    ///
    /// Years are fetched in chunks of `concurrency_limit`; a failing year is
    /// logged and contributes nothing, it never fails the whole call.
    pub async fn fetch_season_champions(&self, range: SeasonRange) -> Result<Vec<ChampionRecord>> {
        tracing::info!(
            "🏆 Season champions: fetching {} to {}{}",
            range.from_year,
            range.to_year,
            describe_position(range.position)
        );

        match self.collect_champions(range).await {
            Ok(results) => {
                tracing::info!(
                    "✅ Season champions: {} records from {} to {}{}",
                    results.len(),
                    range.from_year,
                    range.to_year,
                    describe_position(range.position)
                );
                Ok(results)
            }
            Err(e) => {
                let message = e.to_string();
                tracing::error!("❌ Season champions: failed to fetch complete data: {}", message);
                Err(EtlError::AggregationFailed { message })
            }
        }
    }

    async fn collect_champions(&self, range: SeasonRange) -> Result<Vec<ChampionRecord>> {
        let years = range.years();
        if years.is_empty() {
            tracing::warn!(
                "⚠️ Season champions: empty range {} to {}, nothing to fetch",
                range.from_year,
                range.to_year
            );
        }
        let chunks: Vec<&[i32]> = years.chunks(self.settings.concurrency_limit.max(1)).collect();
        let mut results = Vec::new();
        let mut failed_years = 0usize;

        for (index, chunk) in chunks.iter().enumerate() {
            tracing::debug!("Season champions: chunk {}/{} {:?}", index + 1, chunks.len(), chunk);

            // join_all 依輸入順序回傳，完成先後不影響輸出順序
            let outcomes = join_all(
                chunk
                    .iter()
                    .map(|&year| self.fetch_year_isolated(year, range.position)),
            )
            .await;

            for outcome in outcomes {
                match outcome {
                    YearOutcome::Fetched(records) => results.extend(records),
                    YearOutcome::Failed => failed_years += 1,
                }
            }

            if index + 1 < chunks.len() {
                self.executor.delay(self.settings.batch_delay).await;
            }
        }

        if failed_years > 0 {
            tracing::warn!(
                "⚠️ Season champions: {} of {} years returned no data because of errors",
                failed_years,
                years.len()
            );
        }

        Ok(results)
    }

    async fn fetch_year_isolated(&self, year: i32, position: Option<u32>) -> YearOutcome {
        match self.fetch_driver_standings(year, position).await {
            Ok(records) => YearOutcome::Fetched(records),
            Err(e) => {
                tracing::error!("❌ Season champions: failed to fetch data for year {}: {}", year, e);
                YearOutcome::Failed
            }
        }
    }

    /// Every race of a season, walking the results pages until the reported total.
    ///
    /// With a position, only races where some result sits at that position are
    /// kept; their results are returned whole.
    pub async fn fetch_season_races(&self, query: SeasonRaceQuery) -> Result<Vec<Race>> {
        let position = active_position(query.position);
        let mut cursor = PageCursor::new(self.settings.page_size);
        let mut all_races: Vec<Race> = Vec::new();
        let mut state = PageState::Fetching;

        tracing::info!(
            "🏎️ Season races: fetching {}{}",
            query.year,
            describe_position(position)
        );

        loop {
            state = match state {
                PageState::Fetching => {
                    let url = self.endpoints.results(query.year, cursor.limit, cursor.offset);
                    tracing::debug!(
                        "Season races: offset={}, limit={}",
                        cursor.offset,
                        cursor.limit
                    );

                    let request = ApiRequest::get(url, RACE_RESULTS_CONTEXT);
                    let page: RaceResultsResponse =
                        decode(self.executor.execute(&request).await?)?;
                    let total = page.total();
                    let races = page.mr_data.race_table.races;

                    match position {
                        Some(p) => {
                            let filtered = filter_races_by_position(races, p);
                            tracing::debug!(
                                "Season races: kept {} races for position {} in {}",
                                filtered.len(),
                                p,
                                query.year
                            );
                            all_races.extend(filtered);
                        }
                        None => all_races.extend(races),
                    }

                    cursor.advance(total);
                    PageState::Evaluating
                }
                PageState::Evaluating => {
                    if cursor.has_more() {
                        self.executor.delay(self.settings.page_delay).await;
                        PageState::Fetching
                    } else {
                        PageState::Done
                    }
                }
                PageState::Done => break,
            };
        }

        if all_races.is_empty() {
            tracing::warn!(
                "⚠️ Season races: no races for {}{}",
                query.year,
                describe_position(position)
            );
        } else {
            tracing::info!(
                "✅ Season races: {} races for {}",
                all_races.len(),
                query.year
            );
        }

        Ok(all_races)
    }
}

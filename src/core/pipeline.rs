use crate::core::ergast::{ErgastService, SeasonRaceQuery, SeasonRange};
use crate::core::export;
use crate::domain::model::{Dataset, TransformResult};
use crate::domain::ports::{ConfigProvider, Pipeline, RequestExecutor, Storage};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};

/// Which of the three engine operations a pipeline run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    Standings { year: i32, position: Option<u32> },
    Champions(SeasonRange),
    Races(SeasonRaceQuery),
}

impl Query {
    /// Base file name for the exported files, e.g. `champions_2010_2013_p1`.
    pub fn file_stem(&self) -> String {
        let (stem, position) = match self {
            Query::Standings { year, position } => (format!("standings_{}", year), *position),
            Query::Champions(range) => (
                format!("champions_{}_{}", range.from_year, range.to_year),
                range.position,
            ),
            Query::Races(query) => (format!("races_{}", query.year), query.position),
        };
        match position {
            Some(p) if p > 0 => format!("{}_p{}", stem, p),
            _ => stem,
        }
    }
}

impl Validate for Query {
    fn validate(&self) -> Result<()> {
        const FIRST_SEASON: i32 = 1950;
        const LAST_SEASON: i32 = 2100;
        match self {
            Query::Standings { year, .. } => {
                validation::validate_range("year", *year, FIRST_SEASON, LAST_SEASON)
            }
            Query::Champions(range) => {
                validation::validate_range("from", range.from_year, FIRST_SEASON, LAST_SEASON)?;
                validation::validate_range("to", range.to_year, FIRST_SEASON, LAST_SEASON)
            }
            Query::Races(query) => {
                validation::validate_range("year", query.year, FIRST_SEASON, LAST_SEASON)
            }
        }
    }
}

/// Extracts one query through the engine and writes it out in the requested formats.
pub struct ErgastPipeline<S: Storage, E: RequestExecutor> {
    storage: S,
    service: ErgastService<E>,
    query: Query,
    output_path: String,
    output_formats: Vec<String>,
}

impl<S: Storage, E: RequestExecutor> ErgastPipeline<S, E> {
    pub fn new<C: ConfigProvider>(
        storage: S,
        service: ErgastService<E>,
        query: Query,
        config: &C,
    ) -> Self {
        Self {
            storage,
            service,
            query,
            output_path: config.output_path().to_string(),
            output_formats: config.output_formats().to_vec(),
        }
    }

    fn wants(&self, format: &str) -> bool {
        self.output_formats.iter().any(|f| f == format)
    }
}

#[async_trait::async_trait]
impl<S: Storage, E: RequestExecutor> Pipeline for ErgastPipeline<S, E> {
    async fn extract(&self) -> Result<Dataset> {
        let dataset = match self.query {
            Query::Standings { year, position } => {
                Dataset::Champions(self.service.fetch_driver_standings(year, position).await?)
            }
            Query::Champions(range) => {
                Dataset::Champions(self.service.fetch_season_champions(range).await?)
            }
            Query::Races(query) => Dataset::Races(self.service.fetch_season_races(query).await?),
        };
        Ok(dataset)
    }

    async fn transform(&self, data: Dataset) -> Result<TransformResult> {
        export::render(&data)
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let stem = self.query.file_stem();

        if self.wants("csv") {
            let name = format!("{}.csv", stem);
            tracing::debug!("Writing {} ({} bytes)", name, result.csv_output.len());
            self.storage.write_file(&name, result.csv_output.as_bytes()).await?;
        }

        if self.wants("json") {
            let name = format!("{}.json", stem);
            tracing::debug!("Writing {} ({} bytes)", name, result.json_output.len());
            self.storage.write_file(&name, result.json_output.as_bytes()).await?;
        }

        Ok(format!("{}/{}", self.output_path, stem))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem() {
        assert_eq!(
            Query::Standings { year: 2023, position: None }.file_stem(),
            "standings_2023"
        );
        assert_eq!(
            Query::Champions(SeasonRange::new(2010, 2013).with_position(1)).file_stem(),
            "champions_2010_2013_p1"
        );
        assert_eq!(
            Query::Races(SeasonRaceQuery::new(2021).with_position(0)).file_stem(),
            "races_2021"
        );
    }

    #[test]
    fn test_query_validation() {
        assert!(Query::Races(SeasonRaceQuery::new(2021)).validate().is_ok());
        assert!(Query::Standings { year: 1066, position: None }.validate().is_err());
        assert!(Query::Champions(SeasonRange::new(1950, 3000)).validate().is_err());
    }
}

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// 上游以 null 表示「沒有資料」，與欄位缺漏同樣視為預設值
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Driver identity as reported by the results API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub driver_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permanent_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
}

impl Driver {
    pub fn full_name(&self) -> String {
        match (&self.given_name, &self.family_name) {
            (Some(given), Some(family)) => format!("{} {}", given, family),
            (None, Some(family)) => family.clone(),
            (Some(given), None) => given.clone(),
            (None, None) => self.driver_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constructor {
    pub constructor_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
}

/// One row of a standings table. Fields the engine does not interpret
/// (`positionText`, `Constructors`, ...) are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverStanding {
    pub position: String,
    #[serde(default)]
    pub points: String,
    #[serde(default)]
    pub wins: String,
    #[serde(rename = "Driver")]
    pub driver: Driver,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonStandingsList {
    pub season: String,
    pub round: String,
    #[serde(rename = "DriverStandings", default, deserialize_with = "null_as_default")]
    pub driver_standings: Vec<DriverStanding>,
}

/// A driver standing tagged with the season and round it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChampionRecord {
    pub season: String,
    pub round: String,
    #[serde(flatten)]
    pub standing: DriverStanding,
}

impl ChampionRecord {
    pub fn position(&self) -> &str {
        &self.standing.position
    }

    pub fn driver(&self) -> &Driver {
        &self.standing.driver
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceResult {
    pub position: String,
    #[serde(rename = "Driver")]
    pub driver: Driver,
    #[serde(rename = "Constructor", default, skip_serializing_if = "Option::is_none")]
    pub constructor: Option<Constructor>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RaceResult {
    /// Passed-through string field such as `points`, `grid` or `status`.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.extra.get(name).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub season: String,
    pub round: String,
    #[serde(default)]
    pub race_name: String,
    #[serde(default)]
    pub date: String,
    #[serde(rename = "Results", default, deserialize_with = "null_as_default")]
    pub results: Vec<RaceResult>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// 上游回應外殼：MRData 之下的表格

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StandingsTable {
    #[serde(rename = "StandingsLists", default, deserialize_with = "null_as_default")]
    pub standings_lists: Vec<SeasonStandingsList>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StandingsData {
    #[serde(rename = "StandingsTable", default, deserialize_with = "null_as_default")]
    pub standings_table: StandingsTable,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DriverStandingsResponse {
    #[serde(rename = "MRData", default, deserialize_with = "null_as_default")]
    pub mr_data: StandingsData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RaceTable {
    #[serde(rename = "Races", default, deserialize_with = "null_as_default")]
    pub races: Vec<Race>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RaceResultsData {
    #[serde(default)]
    pub total: Option<String>,
    #[serde(rename = "RaceTable", default, deserialize_with = "null_as_default")]
    pub race_table: RaceTable,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RaceResultsResponse {
    #[serde(rename = "MRData", default, deserialize_with = "null_as_default")]
    pub mr_data: RaceResultsData,
}

impl RaceResultsResponse {
    /// Server-reported record count; missing or unparseable counts as zero.
    pub fn total(&self) -> usize {
        self.mr_data
            .total
            .as_deref()
            .and_then(|t| t.trim().parse().ok())
            .unwrap_or(0)
    }
}

/// What a pipeline run extracted.
#[derive(Debug, Clone, PartialEq)]
pub enum Dataset {
    Champions(Vec<ChampionRecord>),
    Races(Vec<Race>),
}

impl Dataset {
    pub fn len(&self) -> usize {
        match self {
            Dataset::Champions(records) => records.len(),
            Dataset::Races(races) => races.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub record_count: usize,
    pub csv_output: String,
    pub json_output: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_standing_keeps_unknown_fields() {
        let standing: DriverStanding = serde_json::from_value(json!({
            "position": "1",
            "positionText": "1",
            "points": "575",
            "wins": "19",
            "Driver": {"driverId": "max_verstappen", "givenName": "Max", "familyName": "Verstappen"},
            "Constructors": [{"constructorId": "red_bull"}]
        }))
        .unwrap();

        assert_eq!(standing.driver.full_name(), "Max Verstappen");
        assert!(standing.extra.contains_key("Constructors"));

        let record = ChampionRecord {
            season: "2023".to_string(),
            round: "22".to_string(),
            standing,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["season"], "2023");
        assert_eq!(value["positionText"], "1");
        assert_eq!(value["Driver"]["driverId"], "max_verstappen");
    }

    #[test]
    fn test_total_parsing() {
        let response: RaceResultsResponse =
            serde_json::from_value(json!({"MRData": {"total": "440", "RaceTable": {"Races": []}}}))
                .unwrap();
        assert_eq!(response.total(), 440);

        let missing: RaceResultsResponse =
            serde_json::from_value(json!({"MRData": {"RaceTable": {}}})).unwrap();
        assert_eq!(missing.total(), 0);

        let garbage: RaceResultsResponse =
            serde_json::from_value(json!({"MRData": {"total": "n/a"}})).unwrap();
        assert_eq!(garbage.total(), 0);
    }

    #[test]
    fn test_null_tables_read_as_empty() {
        let null_table: RaceResultsResponse =
            serde_json::from_value(json!({"MRData": {"total": "0", "RaceTable": null}})).unwrap();
        assert!(null_table.mr_data.race_table.races.is_empty());

        let null_races: RaceResultsResponse =
            serde_json::from_value(json!({"MRData": {"total": "0", "RaceTable": {"Races": null}}}))
                .unwrap();
        assert!(null_races.mr_data.race_table.races.is_empty());

        let null_lists: DriverStandingsResponse = serde_json::from_value(
            json!({"MRData": {"StandingsTable": {"StandingsLists": null}}}),
        )
        .unwrap();
        assert!(null_lists.mr_data.standings_table.standings_lists.is_empty());

        let null_mr_data: DriverStandingsResponse =
            serde_json::from_value(json!({"MRData": null})).unwrap();
        assert!(null_mr_data.mr_data.standings_table.standings_lists.is_empty());

        let race: Race = serde_json::from_value(
            json!({"season": "2023", "round": "1", "Results": null}),
        )
        .unwrap();
        assert!(race.results.is_empty());
    }
}

//! Rendering of extracted datasets as flat CSV and pretty JSON.

use crate::domain::model::{ChampionRecord, Dataset, Race, TransformResult};
use crate::utils::error::{EtlError, Result};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
struct ChampionRow<'a> {
    season: &'a str,
    round: &'a str,
    position: &'a str,
    points: &'a str,
    wins: &'a str,
    driver_id: &'a str,
    driver_name: String,
    nationality: &'a str,
    constructor: &'a str,
}

#[derive(Debug, Serialize)]
struct RaceResultRow<'a> {
    season: &'a str,
    round: &'a str,
    race_name: &'a str,
    date: &'a str,
    position: &'a str,
    driver_id: &'a str,
    driver_name: String,
    constructor_id: &'a str,
    points: &'a str,
    grid: &'a str,
    laps: &'a str,
    status: &'a str,
}

fn first_constructor_name(record: &ChampionRecord) -> &str {
    record
        .standing
        .extra
        .get("Constructors")
        .and_then(Value::as_array)
        .and_then(|constructors| constructors.first())
        .and_then(|c| c.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("")
}

fn champion_row(record: &ChampionRecord) -> ChampionRow<'_> {
    let driver = record.driver();
    ChampionRow {
        season: &record.season,
        round: &record.round,
        position: record.position(),
        points: &record.standing.points,
        wins: &record.standing.wins,
        driver_id: &driver.driver_id,
        driver_name: driver.full_name(),
        nationality: driver.nationality.as_deref().unwrap_or(""),
        constructor: first_constructor_name(record),
    }
}

fn race_rows(race: &Race) -> Vec<RaceResultRow<'_>> {
    if race.results.is_empty() {
        // 沒有成績的比賽仍輸出一列，避免整場消失
        return vec![RaceResultRow {
            season: &race.season,
            round: &race.round,
            race_name: &race.race_name,
            date: &race.date,
            position: "",
            driver_id: "",
            driver_name: String::new(),
            constructor_id: "",
            points: "",
            grid: "",
            laps: "",
            status: "",
        }];
    }

    race.results
        .iter()
        .map(|result| RaceResultRow {
            season: &race.season,
            round: &race.round,
            race_name: &race.race_name,
            date: &race.date,
            position: &result.position,
            driver_id: &result.driver.driver_id,
            driver_name: result.driver.full_name(),
            constructor_id: result
                .constructor
                .as_ref()
                .map(|c| c.constructor_id.as_str())
                .unwrap_or(""),
            points: result.field("points").unwrap_or(""),
            grid: result.field("grid").unwrap_or(""),
            laps: result.field("laps").unwrap_or(""),
            status: result.field("status").unwrap_or(""),
        })
        .collect()
}

fn write_csv<T: Serialize>(rows: impl IntoIterator<Item = T>, header: &[&str]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }

    let bytes = writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("Failed to flush CSV output: {}", e),
    })?;
    String::from_utf8(bytes).map_err(|e| EtlError::ProcessingError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

pub const CHAMPION_HEADER: [&str; 9] = [
    "season",
    "round",
    "position",
    "points",
    "wins",
    "driver_id",
    "driver_name",
    "nationality",
    "constructor",
];

pub const RACE_HEADER: [&str; 12] = [
    "season",
    "round",
    "race_name",
    "date",
    "position",
    "driver_id",
    "driver_name",
    "constructor_id",
    "points",
    "grid",
    "laps",
    "status",
];

pub fn render(dataset: &Dataset) -> Result<TransformResult> {
    let (csv_output, json_output) = match dataset {
        Dataset::Champions(records) => (
            write_csv(records.iter().map(champion_row), &CHAMPION_HEADER)?,
            serde_json::to_string_pretty(records)?,
        ),
        Dataset::Races(races) => (
            write_csv(races.iter().flat_map(race_rows), &RACE_HEADER)?,
            serde_json::to_string_pretty(races)?,
        ),
    };

    Ok(TransformResult {
        record_count: dataset.len(),
        csv_output,
        json_output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn champions() -> Vec<ChampionRecord> {
        serde_json::from_value(json!([{
            "season": "2023",
            "round": "22",
            "position": "1",
            "points": "575",
            "wins": "19",
            "Driver": {"driverId": "max_verstappen", "givenName": "Max", "familyName": "Verstappen", "nationality": "Dutch"},
            "Constructors": [{"constructorId": "red_bull", "name": "Red Bull"}]
        }]))
        .unwrap()
    }

    #[test]
    fn test_render_champions() {
        let result = render(&Dataset::Champions(champions())).unwrap();

        let lines: Vec<&str> = result.csv_output.lines().collect();
        assert_eq!(result.record_count, 1);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], CHAMPION_HEADER.join(","));
        assert_eq!(
            lines[1],
            "2023,22,1,575,19,max_verstappen,Max Verstappen,Dutch,Red Bull"
        );

        let json: serde_json::Value = serde_json::from_str(&result.json_output).unwrap();
        assert_eq!(json[0]["Driver"]["driverId"], "max_verstappen");
        assert_eq!(json[0]["season"], "2023");
    }

    #[test]
    fn test_render_races_one_row_per_result() {
        let races: Vec<Race> = serde_json::from_value(json!([
            {
                "season": "2023", "round": "1", "raceName": "Bahrain Grand Prix", "date": "2023-03-05",
                "Results": [
                    {"position": "1", "points": "25", "grid": "1", "laps": "57", "status": "Finished",
                     "Driver": {"driverId": "max_verstappen"}, "Constructor": {"constructorId": "red_bull"}},
                    {"position": "2", "points": "18", "grid": "2", "laps": "57", "status": "Finished",
                     "Driver": {"driverId": "perez"}, "Constructor": {"constructorId": "red_bull"}}
                ]
            },
            {"season": "2023", "round": "2", "raceName": "Saudi Arabian Grand Prix", "date": "2023-03-19", "Results": []}
        ]))
        .unwrap();

        let result = render(&Dataset::Races(races)).unwrap();
        let lines: Vec<&str> = result.csv_output.lines().collect();

        assert_eq!(result.record_count, 2);
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[1],
            "2023,1,Bahrain Grand Prix,2023-03-05,1,max_verstappen,max_verstappen,red_bull,25,1,57,Finished"
        );
        assert!(lines[3].starts_with("2023,2,Saudi Arabian Grand Prix,2023-03-19,,"));
    }

    #[test]
    fn test_render_empty_dataset() {
        let result = render(&Dataset::Champions(Vec::new())).unwrap();
        assert_eq!(result.record_count, 0);
        assert_eq!(result.csv_output.trim_end(), CHAMPION_HEADER.join(","));
        assert_eq!(result.json_output, "[]");
    }
}

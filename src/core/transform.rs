//! Pure shaping of upstream tables into domain records.
//!
//! Positions are matched by exact string equality against the decimal form
//! of the requested position, the way the API encodes them.

use crate::domain::model::{ChampionRecord, DriverStanding, Race, SeasonStandingsList};

fn tag(list: &SeasonStandingsList, standing: &DriverStanding) -> ChampionRecord {
    ChampionRecord {
        season: list.season.clone(),
        round: list.round.clone(),
        standing: standing.clone(),
    }
}

/// Every standing of every list, tagged with its list's season and round.
pub fn flatten_standings(lists: &[SeasonStandingsList]) -> Vec<ChampionRecord> {
    lists
        .iter()
        .flat_map(|list| list.driver_standings.iter().map(move |s| tag(list, s)))
        .collect()
}

/// At most one record per list: the first standing at `position`.
pub fn filter_standings_by_position(
    lists: &[SeasonStandingsList],
    position: u32,
) -> Vec<ChampionRecord> {
    let wanted = position.to_string();
    lists
        .iter()
        .filter_map(|list| {
            list.driver_standings
                .iter()
                .find(|s| s.position == wanted)
                .map(|s| tag(list, s))
        })
        .collect()
}

/// Keeps races with at least one result at `position`. Results are not pruned.
pub fn filter_races_by_position(races: Vec<Race>, position: u32) -> Vec<Race> {
    let wanted = position.to_string();
    races
        .into_iter()
        .filter(|race| race.results.iter().any(|r| r.position == wanted))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lists() -> Vec<SeasonStandingsList> {
        serde_json::from_value(json!([
            {
                "season": "2008", "round": "18",
                "DriverStandings": [
                    {"position": "1", "points": "98", "wins": "5", "Driver": {"driverId": "hamilton"}},
                    {"position": "2", "points": "97", "wins": "6", "Driver": {"driverId": "massa"}}
                ]
            },
            {
                "season": "2009", "round": "17",
                "DriverStandings": [
                    {"position": "1", "points": "95", "wins": "6", "Driver": {"driverId": "button"}}
                ]
            }
        ]))
        .unwrap()
    }

    fn races() -> Vec<Race> {
        serde_json::from_value(json!([
            {
                "season": "2023", "round": "1", "raceName": "Bahrain Grand Prix",
                "Results": [
                    {"position": "1", "Driver": {"driverId": "max_verstappen"}},
                    {"position": "2", "Driver": {"driverId": "perez"}}
                ]
            },
            {
                "season": "2023", "round": "2", "raceName": "Saudi Arabian Grand Prix",
                "Results": [
                    {"position": "2", "Driver": {"driverId": "max_verstappen"}}
                ]
            }
        ]))
        .unwrap()
    }

    #[test]
    fn test_flatten_tags_every_standing() {
        let records = flatten_standings(&lists());
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].season, "2008");
        assert_eq!(records[1].driver().driver_id, "massa");
        assert_eq!(records[2].season, "2009");
        assert_eq!(records[2].round, "17");
    }

    #[test]
    fn test_filter_standings_one_per_list() {
        let records = filter_standings_by_position(&lists(), 2);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].position(), "2");
        assert_eq!(records[0].season, "2008");

        let champions = filter_standings_by_position(&lists(), 1);
        assert_eq!(champions.len(), 2);
        assert!(champions.iter().all(|r| r.position() == "1"));
    }

    #[test]
    fn test_filter_standings_no_match() {
        assert!(filter_standings_by_position(&lists(), 20).is_empty());
    }

    #[test]
    fn test_filter_races_keeps_full_results() {
        let kept = filter_races_by_position(races(), 1);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].round, "1");
        assert_eq!(kept[0].results.len(), 2);

        let second = filter_races_by_position(races(), 2);
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn test_position_compares_as_string() {
        let odd: Vec<Race> = serde_json::from_value(json!([
            {"season": "2023", "round": "1", "Results": [{"position": "01", "Driver": {"driverId": "x"}}]}
        ]))
        .unwrap();
        assert!(filter_races_by_position(odd, 1).is_empty());
    }
}

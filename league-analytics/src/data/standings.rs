// Standings and weekly-result ingest.
//
// The standings file is the one required input. Weekly results are optional
// and feed the hot/cold and schedule-strength modifiers.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::LeagueConfig;
use crate::data::names::{canonical_franchise, fold_franchise};
use crate::data::normalize::{
    normalize_team_row, RawRecord, StatOverride, TeamStatRecord, TEAM_SOURCES,
};
use crate::data::IngestError;

// ---------------------------------------------------------------------------
// Weekly results
// ---------------------------------------------------------------------------

/// One completed head-to-head matchup, seen from `team`'s side.
#[derive(Debug, Clone, Serialize)]
pub struct WeeklyResult {
    pub week: u32,
    pub team: String,
    pub opponent: String,
    pub points_for: f64,
    pub points_against: f64,
}

impl WeeklyResult {
    pub fn won(&self) -> bool {
        self.points_for > self.points_against
    }

    pub fn tied(&self) -> bool {
        (self.points_for - self.points_against).abs() < f64::EPSILON
    }
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct RawWeeklyRow {
    #[serde(alias = "Week")]
    week: u32,
    #[serde(alias = "Team")]
    team: String,
    #[serde(alias = "Opponent", alias = "Opp")]
    opponent: String,
    #[serde(alias = "PF", alias = "Points For")]
    points_for: f64,
    #[serde(alias = "PA", alias = "Points Against")]
    points_against: f64,
    /// Absorb any extra columns the export includes.
    #[serde(flatten)]
    _extra: HashMap<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Reader-based loaders (private, enable testing without temp files)
// ---------------------------------------------------------------------------

/// Per-team manual overrides grouped by folded team label.
fn override_map(overrides: &[StatOverride]) -> BTreeMap<String, BTreeMap<String, f64>> {
    let mut map: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    for entry in overrides {
        map.entry(fold_franchise(&entry.team))
            .or_default()
            .insert(entry.field.trim().to_lowercase(), entry.value);
    }
    map
}

fn read_standings<R: Read>(
    rdr: R,
    league: &LeagueConfig,
) -> Result<Vec<TeamStatRecord>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let headers = reader.headers()?.clone();
    let overrides = override_map(&league.overrides);
    let no_overrides = BTreeMap::new();

    let mut teams = Vec::new();
    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("skipping malformed standings row: {}", e);
                continue;
            }
        };

        let mut raw = RawRecord::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            raw.insert(header, cell);
        }

        let label = match TEAM_SOURCES.iter().find_map(|s| raw.get(s)) {
            Some(l) => l.to_string(),
            None => {
                warn!("skipping standings row with no team label");
                continue;
            }
        };

        let team = canonical_franchise(&league.aliases, &label, league.season);
        let team_overrides = overrides.get(&fold_franchise(&team)).unwrap_or(&no_overrides);
        teams.push(normalize_team_row(
            &team,
            &raw,
            team_overrides,
            league.points_per_win,
        ));
    }
    Ok(teams)
}

fn read_weekly<R: Read>(rdr: R, league: &LeagueConfig) -> Result<Vec<WeeklyResult>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut results = Vec::new();
    for result in reader.deserialize::<RawWeeklyRow>() {
        match result {
            Ok(raw) => {
                if !raw.points_for.is_finite() || !raw.points_against.is_finite() {
                    warn!(
                        team = %raw.team,
                        week = raw.week,
                        "skipping weekly row with non-finite points"
                    );
                    continue;
                }
                results.push(WeeklyResult {
                    week: raw.week,
                    team: canonical_franchise(&league.aliases, &raw.team, league.season),
                    opponent: canonical_franchise(&league.aliases, &raw.opponent, league.season),
                    points_for: raw.points_for,
                    points_against: raw.points_against,
                });
            }
            Err(e) => warn!("skipping malformed weekly row: {}", e),
        }
    }
    Ok(results)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

/// Load and normalize the current standings. A file that yields zero teams is
/// an error: every downstream engine needs at least one team.
pub fn load_standings(path: &Path, league: &LeagueConfig) -> Result<Vec<TeamStatRecord>, IngestError> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let teams = read_standings(file, league).map_err(|e| IngestError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    if teams.is_empty() {
        return Err(IngestError::Empty {
            path: path.display().to_string(),
        });
    }
    Ok(teams)
}

/// Load completed weekly matchups. An empty file is fine here; the modifiers
/// degrade gracefully without weekly granularity.
pub fn load_weekly_results(
    path: &Path,
    league: &LeagueConfig,
) -> Result<Vec<WeeklyResult>, IngestError> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    read_weekly(file, league).map_err(|e| IngestError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::names::FranchiseAlias;

    fn league() -> LeagueConfig {
        LeagueConfig {
            name: "Test League".to_string(),
            season: 2025,
            num_teams: 4,
            points_per_win: 100.0,
            abbreviations: BTreeMap::new(),
            aliases: vec![
                FranchiseAlias {
                    canonical: "Athletics".to_string(),
                    alias: "Oakland Athletics".to_string(),
                    from_season: None,
                    to_season: Some(2023),
                },
                FranchiseAlias {
                    canonical: "Athletics".to_string(),
                    alias: "Las Vegas Athletics".to_string(),
                    from_season: Some(2024),
                    to_season: None,
                },
            ],
            overrides: Vec::new(),
        }
    }

    #[test]
    fn standings_roundtrip_with_canonical_headers() {
        let csv_data = "\
Team,Wins,Losses,Ties,FPts,Weeks
Harbor City Sawyers,10,5,1,1500.5,16
Bridgeport Bluecaps,8,8,0,1200,16";

        let teams = read_standings(csv_data.as_bytes(), &league()).unwrap();
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].team, "Harbor City Sawyers");
        assert_eq!(teams[0].wins, 10);
        assert_eq!(teams[0].ties, 1);
        assert!((teams[0].fantasy_points - 1500.5).abs() < 1e-9);
        assert_eq!(teams[1].weeks_played, 16);
    }

    #[test]
    fn standings_accept_platform_headers() {
        let csv_data = "\
Team Name,W,L,T,Points For,GP
Delta Basin Nine,9,6,1,1320.25,16";

        let teams = read_standings(csv_data.as_bytes(), &league()).unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].team, "Delta Basin Nine");
        assert_eq!(teams[0].wins, 9);
        assert!((teams[0].fantasy_points - 1320.25).abs() < 1e-9);
    }

    #[test]
    fn standings_fold_franchise_aliases() {
        let csv_data = "\
Team,Wins,Losses,FPts,Weeks
Las Vegas Athletics,7,9,1100,16";

        let teams = read_standings(csv_data.as_bytes(), &league()).unwrap();
        assert_eq!(teams[0].team, "Athletics");
    }

    #[test]
    fn standings_apply_manual_overrides_after_aliasing() {
        let mut league = league();
        league.overrides = vec![StatOverride {
            team: "Athletics".to_string(),
            field: "fpts".to_string(),
            value: 999.0,
        }];
        let csv_data = "\
Team,Wins,Losses,FPts,Weeks
Las Vegas Athletics,7,9,1100,16";

        let teams = read_standings(csv_data.as_bytes(), &league).unwrap();
        assert!((teams[0].fantasy_points - 999.0).abs() < 1e-9);
    }

    #[test]
    fn standings_skip_rows_without_a_team_label() {
        let csv_data = "\
Team,Wins,Losses,FPts,Weeks
,7,9,1100,16
Harbor City Sawyers,10,6,1400,16";

        let teams = read_standings(csv_data.as_bytes(), &league()).unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].team, "Harbor City Sawyers");
    }

    #[test]
    fn weekly_rows_parse_and_classify() {
        let csv_data = "\
Week,Team,Opponent,PF,PA
1,Harbor City Sawyers,Bridgeport Bluecaps,102.5,98.0
2,Harbor City Sawyers,Delta Basin Nine,88.0,88.0";

        let weekly = read_weekly(csv_data.as_bytes(), &league()).unwrap();
        assert_eq!(weekly.len(), 2);
        assert!(weekly[0].won());
        assert!(!weekly[0].tied());
        assert!(weekly[1].tied());
    }

    #[test]
    fn weekly_rows_fold_franchise_aliases() {
        let csv_data = "\
Week,Team,Opponent,PF,PA
1,Las Vegas Athletics,Harbor City Sawyers,90,100";

        let weekly = read_weekly(csv_data.as_bytes(), &league()).unwrap();
        assert_eq!(weekly[0].team, "Athletics");
        assert_eq!(weekly[0].opponent, "Harbor City Sawyers");
    }

    #[test]
    fn malformed_weekly_rows_are_skipped() {
        let csv_data = "\
Week,Team,Opponent,PF,PA
1,Harbor City Sawyers,Bridgeport Bluecaps,102.5,98.0
not-a-week,Bridgeport Bluecaps,Harbor City Sawyers,98.0,102.5";

        let weekly = read_weekly(csv_data.as_bytes(), &league()).unwrap();
        assert_eq!(weekly.len(), 1);
    }
}

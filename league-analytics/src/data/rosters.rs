// Roster ingest.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::LeagueConfig;
use crate::data::names::canonical_franchise;
use crate::data::normalize::lenient_number;
use crate::data::IngestError;

/// Where a rostered player currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RosterStatus {
    Active,
    Reserve,
    Minors,
}

impl RosterStatus {
    fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "res" | "reserve" | "ir" => RosterStatus::Reserve,
            "na" | "min" | "minors" => RosterStatus::Minors,
            _ => RosterStatus::Active,
        }
    }
}

/// One rostered player, carrying the contract fields the MVP scorer reads.
#[derive(Debug, Clone, Serialize)]
pub struct RosterSlot {
    pub team: String,
    pub player: String,
    pub positions: Vec<String>,
    pub status: RosterStatus,
    pub salary: f64,
    pub age: Option<u32>,
    pub contract: Option<String>,
    pub fantasy_points: f64,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct RawRosterRow {
    #[serde(alias = "Team")]
    team: String,
    #[serde(alias = "Player", alias = "Name")]
    player: String,
    #[serde(default, alias = "Positions", alias = "Position", alias = "Pos")]
    positions: String,
    #[serde(default, alias = "Status")]
    status: String,
    /// Kept as text: exports write salaries like "$45" or "45,000".
    #[serde(default, alias = "Salary")]
    salary: String,
    #[serde(default, alias = "Age")]
    age: Option<f64>,
    #[serde(default, alias = "Contract")]
    contract: String,
    #[serde(default, alias = "FPts", alias = "Points")]
    fantasy_points: Option<f64>,
    /// Absorb any extra columns the export includes.
    #[serde(flatten)]
    _extra: HashMap<String, serde_json::Value>,
}

/// Split a position-eligibility cell ("SS/2B" or "SP, RP") into uppercase
/// position codes.
fn parse_positions(raw: &str) -> Vec<String> {
    raw.split(|c| c == '/' || c == ',')
        .map(|p| p.trim().to_uppercase())
        .filter(|p| !p.is_empty())
        .collect()
}

fn read_rosters<R: Read>(rdr: R, league: &LeagueConfig) -> Result<Vec<RosterSlot>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut slots = Vec::new();
    for result in reader.deserialize::<RawRosterRow>() {
        match result {
            Ok(raw) => {
                let player = raw.player.trim().to_string();
                if player.is_empty() {
                    warn!("skipping roster row with no player name");
                    continue;
                }

                let salary = match lenient_number(&raw.salary) {
                    Some(v) => v,
                    None => {
                        if !raw.salary.trim().is_empty() {
                            warn!(
                                player = %player,
                                cell = %raw.salary,
                                "unparseable salary, defaulting to 0"
                            );
                        }
                        0.0
                    }
                };

                let contract = {
                    let trimmed = raw.contract.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        Some(trimmed.to_string())
                    }
                };

                slots.push(RosterSlot {
                    team: canonical_franchise(&league.aliases, &raw.team, league.season),
                    player,
                    positions: parse_positions(&raw.positions),
                    status: RosterStatus::parse(&raw.status),
                    salary,
                    age: raw.age.map(|a| a.max(0.0).round() as u32),
                    contract,
                    fantasy_points: raw.fantasy_points.unwrap_or(0.0),
                });
            }
            Err(e) => warn!("skipping malformed roster row: {}", e),
        }
    }
    Ok(slots)
}

/// Load the league rosters from a CSV file.
pub fn load_rosters(path: &Path, league: &LeagueConfig) -> Result<Vec<RosterSlot>, IngestError> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    read_rosters(file, league).map_err(|e| IngestError::Csv {
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
    use std::collections::BTreeMap;

    fn league() -> LeagueConfig {
        LeagueConfig {
            name: "Test League".to_string(),
            season: 2025,
            num_teams: 4,
            points_per_win: 100.0,
            abbreviations: BTreeMap::new(),
            aliases: Vec::new(),
            overrides: Vec::new(),
        }
    }

    #[test]
    fn roster_rows_parse_fully() {
        let csv_data = "\
Team,Player,Positions,Status,Salary,Age,Contract,FPts
Harbor City Sawyers,Bobby Witt Jr.,SS/2B,Active,$45,25,2029,612.5
Bridgeport Bluecaps,Jackson Jobe,SP,Min,3,22,1st,0";

        let slots = read_rosters(csv_data.as_bytes(), &league()).unwrap();
        assert_eq!(slots.len(), 2);

        assert_eq!(slots[0].player, "Bobby Witt Jr.");
        assert_eq!(slots[0].positions, vec!["SS", "2B"]);
        assert_eq!(slots[0].status, RosterStatus::Active);
        assert!((slots[0].salary - 45.0).abs() < 1e-9);
        assert_eq!(slots[0].age, Some(25));
        assert_eq!(slots[0].contract.as_deref(), Some("2029"));
        assert!((slots[0].fantasy_points - 612.5).abs() < 1e-9);

        assert_eq!(slots[1].status, RosterStatus::Minors);
    }

    #[test]
    fn comma_separated_positions_also_split() {
        let csv_data = "\
Team,Player,Positions,Status,Salary,Age,Contract,FPts
Harbor City Sawyers,Shohei Ohtani,\"UT, SP\",Active,60,30,2030,800";

        let slots = read_rosters(csv_data.as_bytes(), &league()).unwrap();
        assert_eq!(slots[0].positions, vec!["UT", "SP"]);
    }

    #[test]
    fn missing_optional_fields_fall_back() {
        let csv_data = "\
Team,Player,Positions,Status,Salary,Age,Contract,FPts
Harbor City Sawyers,Mystery Man,,,,,,";

        let slots = read_rosters(csv_data.as_bytes(), &league()).unwrap();
        assert_eq!(slots[0].status, RosterStatus::Active);
        assert!(slots[0].positions.is_empty());
        assert!((slots[0].salary - 0.0).abs() < 1e-9);
        assert_eq!(slots[0].age, None);
        assert_eq!(slots[0].contract, None);
        assert!((slots[0].fantasy_points - 0.0).abs() < 1e-9);
    }

    #[test]
    fn reserve_and_ir_statuses_map_to_reserve() {
        let csv_data = "\
Team,Player,Positions,Status,Salary,Age,Contract,FPts
A,Player One,C,Res,1,24,1st,10
A,Player Two,C,IR,1,24,1st,10";

        let slots = read_rosters(csv_data.as_bytes(), &league()).unwrap();
        assert_eq!(slots[0].status, RosterStatus::Reserve);
        assert_eq!(slots[1].status, RosterStatus::Reserve);
    }

    #[test]
    fn rows_without_a_player_are_skipped() {
        let csv_data = "\
Team,Player,Positions,Status,Salary,Age,Contract,FPts
Harbor City Sawyers,,SS,Active,45,25,2029,612.5
Harbor City Sawyers,Real Player,SS,Active,45,25,2029,612.5";

        let slots = read_rosters(csv_data.as_bytes(), &league()).unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].player, "Real Player");
    }
}

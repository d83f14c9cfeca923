// Historical season ingest.
//
// Completed seasons live one CSV per year under the history directory,
// named by year: history/2024.csv, history/2023.csv, and so on. Franchise
// renames are folded to the canonical name at load time, using each row's
// season to pick the right alias window.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::LeagueConfig;
use crate::data::names::canonical_franchise;
use crate::data::IngestError;

/// How a team's playoff run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlayoffFinish {
    First,
    Second,
    Third,
}

impl PlayoffFinish {
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "1st" | "1" | "first" | "champion" => Some(PlayoffFinish::First),
            "2nd" | "2" | "second" | "runner-up" => Some(PlayoffFinish::Second),
            "3rd" | "3" | "third" => Some(PlayoffFinish::Third),
            _ => None,
        }
    }
}

/// One team's final line from a completed season.
#[derive(Debug, Clone, Serialize)]
pub struct HistoricalSeasonRecord {
    pub season: i32,
    pub team: String,
    /// Final winning percentage, 0-1.
    pub win_pct: f64,
    /// Final standings position, 1-based.
    pub rank: u32,
    pub fantasy_points: f64,
    pub playoff: Option<PlayoffFinish>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct RawSeasonRow {
    #[serde(alias = "Team")]
    team: String,
    #[serde(alias = "Win%", alias = "WinPct")]
    win_pct: f64,
    #[serde(alias = "Rk", alias = "Rank")]
    rank: u32,
    #[serde(alias = "FPts", alias = "Fantasy Points")]
    fantasy_points: f64,
    #[serde(default, alias = "Playoff", alias = "Playoffs", alias = "Finish")]
    playoff: String,
    /// Absorb any extra columns the archive includes.
    #[serde(flatten)]
    _extra: HashMap<String, serde_json::Value>,
}

fn read_season<R: Read>(
    rdr: R,
    season: i32,
    league: &LeagueConfig,
) -> Result<Vec<HistoricalSeasonRecord>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut records = Vec::new();
    for result in reader.deserialize::<RawSeasonRow>() {
        match result {
            Ok(raw) => {
                let team = raw.team.trim();
                if team.is_empty() {
                    warn!(season, "skipping season row with no team");
                    continue;
                }
                if !raw.win_pct.is_finite() || !raw.fantasy_points.is_finite() {
                    warn!(season, team = %team, "skipping season row with non-finite stats");
                    continue;
                }
                records.push(HistoricalSeasonRecord {
                    season,
                    team: canonical_franchise(&league.aliases, team, season),
                    win_pct: raw.win_pct.clamp(0.0, 1.0),
                    rank: raw.rank,
                    fantasy_points: raw.fantasy_points,
                    playoff: PlayoffFinish::parse(&raw.playoff),
                });
            }
            Err(e) => warn!(season, "skipping malformed season row: {}", e),
        }
    }
    Ok(records)
}

/// Load every `<year>.csv` under `dir`. Files whose names are not a year are
/// skipped with a warning, never fatal.
pub fn load_history(dir: &Path, league: &LeagueConfig) -> Result<Vec<HistoricalSeasonRecord>, IngestError> {
    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => paths.push(entry.path()),
            Err(e) => warn!(dir = %dir.display(), "skipping unreadable directory entry: {}", e),
        }
    }
    paths.sort();

    let mut records = Vec::new();
    for path in paths {
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        let season = match path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<i32>().ok())
        {
            Some(year) => year,
            None => {
                warn!(path = %path.display(), "skipping history file not named by year");
                continue;
            }
        };

        let file = std::fs::File::open(&path).map_err(|e| IngestError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let rows = read_season(file, season, league).map_err(|e| IngestError::Csv {
            path: path.display().to_string(),
            source: e,
        })?;
        records.extend(rows);
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Prospect-list ingest.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::data::IngestError;

/// One entry from an industry prospect list. `club` is the player's MLB
/// organization, not a fantasy team; joins onto rosters go by player name.
#[derive(Debug, Clone, Serialize)]
pub struct ProspectRanking {
    pub rank: u32,
    pub name: String,
    pub position: String,
    pub club: String,
    pub score: f64,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct RawProspectRow {
    #[serde(alias = "Rank", alias = "Rk")]
    rank: u32,
    #[serde(alias = "Name", alias = "Player")]
    name: String,
    #[serde(default, alias = "Position", alias = "Pos")]
    position: String,
    #[serde(default, alias = "MLB Team", alias = "Team", alias = "Club")]
    club: String,
    #[serde(alias = "Score")]
    score: f64,
    /// Absorb any extra columns the list includes.
    #[serde(flatten)]
    _extra: HashMap<String, serde_json::Value>,
}

fn read_prospects<R: Read>(rdr: R) -> Result<Vec<ProspectRanking>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut prospects = Vec::new();
    for result in reader.deserialize::<RawProspectRow>() {
        match result {
            Ok(raw) => {
                let name = raw.name.trim().to_string();
                if name.is_empty() {
                    warn!("skipping prospect row with no name");
                    continue;
                }
                if !raw.score.is_finite() {
                    warn!(prospect = %name, "skipping prospect row with non-finite score");
                    continue;
                }
                prospects.push(ProspectRanking {
                    rank: raw.rank,
                    name,
                    position: raw.position.trim().to_uppercase(),
                    club: raw.club.trim().to_string(),
                    score: raw.score,
                });
            }
            Err(e) => warn!("skipping malformed prospect row: {}", e),
        }
    }
    Ok(prospects)
}

/// Load a prospect list from a CSV file.
pub fn load_prospects(path: &Path) -> Result<Vec<ProspectRanking>, IngestError> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    read_prospects(file).map_err(|e| IngestError::Csv {
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

    #[test]
    fn prospect_rows_parse() {
        let csv_data = "\
Rank,Name,Position,MLB Team,Score
1,Jesus Made,SS,MIL,82.5
2,Sebastian Walcott,SS/3B,TEX,78.0";

        let prospects = read_prospects(csv_data.as_bytes()).unwrap();
        assert_eq!(prospects.len(), 2);
        assert_eq!(prospects[0].rank, 1);
        assert_eq!(prospects[0].name, "Jesus Made");
        assert_eq!(prospects[0].club, "MIL");
        assert!((prospects[0].score - 82.5).abs() < 1e-9);
    }

    #[test]
    fn nameless_and_malformed_rows_are_skipped() {
        let csv_data = "\
Rank,Name,Position,MLB Team,Score
1,,SS,MIL,82.5
not-a-rank,Someone,SS,MIL,80
3,Valid Prospect,C,BAL,75.0";

        let prospects = read_prospects(csv_data.as_bytes()).unwrap();
        assert_eq!(prospects.len(), 1);
        assert_eq!(prospects[0].name, "Valid Prospect");
    }
}

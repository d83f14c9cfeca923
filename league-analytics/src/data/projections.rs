// Player projection ingest.
//
// Two CSVs: a hitters file and a pitchers file. Counting stats stay f64
// because projection systems publish fractional season totals.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::data::IngestError;

/// Projected season counting stats for a hitter.
#[derive(Debug, Clone, Serialize)]
pub struct HitterProjection {
    pub name: String,
    pub h: f64,
    pub doubles: f64,
    pub triples: f64,
    pub hr: f64,
    pub r: f64,
    pub rbi: f64,
    pub bb: f64,
    pub hbp: f64,
    pub sb: f64,
}

/// Projected season counting stats for a pitcher.
#[derive(Debug, Clone, Serialize)]
pub struct PitcherProjection {
    pub name: String,
    pub ip: f64,
    pub so: f64,
    pub sv: f64,
    pub hld: f64,
    pub er: f64,
    pub h: f64,
    pub bb: f64,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code, non_snake_case)]
struct RawHitterRow {
    Name: String,
    H: f64,
    #[serde(rename = "2B")]
    doubles: f64,
    #[serde(rename = "3B")]
    triples: f64,
    HR: f64,
    R: f64,
    RBI: f64,
    BB: f64,
    /// Some projection systems omit HBP entirely.
    #[serde(default)]
    HBP: f64,
    SB: f64,
    /// Absorb any extra columns the projection system includes.
    #[serde(flatten)]
    _extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code, non_snake_case)]
struct RawPitcherRow {
    Name: String,
    IP: f64,
    #[serde(alias = "K")]
    SO: f64,
    SV: f64,
    #[serde(default, alias = "HD")]
    HLD: f64,
    ER: f64,
    H: f64,
    BB: f64,
    /// Absorb any extra columns the projection system includes.
    #[serde(flatten)]
    _extra: HashMap<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Reader-based loaders (private, enable testing without temp files)
// ---------------------------------------------------------------------------

fn load_hitters_from_reader<R: Read>(rdr: R) -> Result<Vec<HitterProjection>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut hitters = Vec::new();
    for result in reader.deserialize::<RawHitterRow>() {
        match result {
            Ok(raw) => {
                if !raw.H.is_finite() || !raw.HR.is_finite() {
                    warn!("skipping hitter '{}': non-finite stat value", raw.Name.trim());
                    continue;
                }
                hitters.push(HitterProjection {
                    name: raw.Name.trim().to_string(),
                    h: raw.H,
                    doubles: raw.doubles,
                    triples: raw.triples,
                    hr: raw.HR,
                    r: raw.R,
                    rbi: raw.RBI,
                    bb: raw.BB,
                    hbp: raw.HBP,
                    sb: raw.SB,
                });
            }
            Err(e) => warn!("skipping malformed hitter row: {}", e),
        }
    }
    Ok(hitters)
}

fn load_pitchers_from_reader<R: Read>(rdr: R) -> Result<Vec<PitcherProjection>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut pitchers = Vec::new();
    for result in reader.deserialize::<RawPitcherRow>() {
        match result {
            Ok(raw) => {
                if !raw.IP.is_finite() || !raw.ER.is_finite() {
                    warn!("skipping pitcher '{}': non-finite IP/ER value", raw.Name.trim());
                    continue;
                }
                pitchers.push(PitcherProjection {
                    name: raw.Name.trim().to_string(),
                    ip: raw.IP,
                    so: raw.SO,
                    sv: raw.SV,
                    hld: raw.HLD,
                    er: raw.ER,
                    h: raw.H,
                    bb: raw.BB,
                });
            }
            Err(e) => warn!("skipping malformed pitcher row: {}", e),
        }
    }
    Ok(pitchers)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

/// Load hitter projections from a CSV file.
pub fn load_hitter_projections(path: &Path) -> Result<Vec<HitterProjection>, IngestError> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_hitters_from_reader(file).map_err(|e| IngestError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load pitcher projections from a CSV file.
pub fn load_pitcher_projections(path: &Path) -> Result<Vec<PitcherProjection>, IngestError> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_pitchers_from_reader(file).map_err(|e| IngestError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Canonical team-stat normalization.
//
// Standings exports name the same columns half a dozen ways depending on the
// platform and the season. Instead of per-source shims, every standings row
// funnels through one declarative mapping: each canonical field lists its
// source columns most-authoritative-first, and a manual override from config
// beats them all. Missing fields fall back to a computed default.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

// ---------------------------------------------------------------------------
// Canonical record
// ---------------------------------------------------------------------------

/// One team's current-season standings line in canonical form. Derived fresh
/// on every run; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamStatRecord {
    pub team: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    /// Derived: (wins + ties/2) / games, 0.0 before any games are played.
    pub win_pct: f64,
    pub fantasy_points: f64,
    /// Clamped to at least 1 so per-week averages stay defined.
    pub weeks_played: u32,
}

/// A config-pinned stat value: beats every source column for one team+field.
/// `field` names a canonical field ("wins", "losses", "ties", "fpts",
/// "weeks").
#[derive(Debug, Clone, Deserialize)]
pub struct StatOverride {
    pub team: String,
    pub field: String,
    pub value: f64,
}

// ---------------------------------------------------------------------------
// Raw rows
// ---------------------------------------------------------------------------

/// A raw ingest row: folded header -> cell text. Headers fold to lowercase
/// with whitespace runs collapsed, so "Points For", "points  for" and
/// "POINTS FOR" all land on the same key.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    fields: BTreeMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut record = Self::new();
        for (key, value) in pairs {
            record.insert(key, value);
        }
        record
    }

    fn fold_key(key: &str) -> String {
        key.trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.fields.insert(Self::fold_key(key), value.trim().to_string());
    }

    /// Cell for a folded header. Empty cells count as absent so the source
    /// chain can keep walking.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(&Self::fold_key(key))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Field mapping
// ---------------------------------------------------------------------------

// Source columns per canonical field, most authoritative first. The canonical
// column name leads each list so normalized output re-normalizes to itself.
pub(crate) const TEAM_SOURCES: &[&str] = &["team", "team name", "name"];
const WINS_SOURCES: &[&str] = &["w", "wins"];
const LOSSES_SOURCES: &[&str] = &["l", "losses"];
const TIES_SOURCES: &[&str] = &["t", "ties"];
const POINTS_SOURCES: &[&str] = &["fpts", "fantasy points", "pf", "points for"];
const WEEKS_SOURCES: &[&str] = &["weeks", "weeks played", "gp"];

/// Strip currency and separator noise, then parse. `None` when the cell is
/// garbled beyond that.
pub(crate) fn lenient_number(cell: &str) -> Option<f64> {
    let cleaned: String = cell
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%' | ' '))
        .collect();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}

/// Resolve one canonical field: manual override first, then the source column
/// chain. `None` when nothing supplies it, so the caller applies the computed
/// default. A present-but-garbled cell resolves to 0 (logged) rather than
/// falling through to a lower-priority column.
fn resolve(
    raw: &RawRecord,
    overrides: &BTreeMap<String, f64>,
    field: &str,
    sources: &[&str],
    team: &str,
) -> Option<f64> {
    if let Some(value) = overrides.get(field) {
        return Some(*value);
    }
    for source in sources {
        if let Some(cell) = raw.get(source) {
            return Some(lenient_number(cell).unwrap_or_else(|| {
                warn!(team, field, cell, "unparseable numeric cell, defaulting to 0");
                0.0
            }));
        }
    }
    None
}

/// Build the canonical standings record for one team.
///
/// `overrides` maps canonical field names ("wins", "fpts", ...) to values
/// pinned in config for this team. `points_per_win` feeds the computed
/// default for leagues whose exports omit a points column.
pub fn normalize_team_row(
    team: &str,
    raw: &RawRecord,
    overrides: &BTreeMap<String, f64>,
    points_per_win: f64,
) -> TeamStatRecord {
    let wins_raw = resolve(raw, overrides, "wins", WINS_SOURCES, team).unwrap_or(0.0);
    let losses_raw = resolve(raw, overrides, "losses", LOSSES_SOURCES, team).unwrap_or(0.0);
    let ties_raw = resolve(raw, overrides, "ties", TIES_SOURCES, team).unwrap_or(0.0);

    let fantasy_points = resolve(raw, overrides, "fpts", POINTS_SOURCES, team)
        .unwrap_or_else(|| wins_raw * points_per_win);

    // Head-to-head leagues play one matchup per week, so games played stands
    // in for weeks when the export has no weeks column.
    let games_raw = wins_raw + losses_raw + ties_raw;
    let weeks_raw = resolve(raw, overrides, "weeks", WEEKS_SOURCES, team).unwrap_or(games_raw);

    let wins = wins_raw.max(0.0).round() as u32;
    let losses = losses_raw.max(0.0).round() as u32;
    let ties = ties_raw.max(0.0).round() as u32;
    let games = wins + losses + ties;
    let win_pct = if games > 0 {
        (wins as f64 + 0.5 * ties as f64) / games as f64
    } else {
        0.0
    };

    TeamStatRecord {
        team: team.trim().to_string(),
        wins,
        losses,
        ties,
        win_pct,
        fantasy_points,
        weeks_played: (weeks_raw.max(0.0).round() as u32).max(1),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

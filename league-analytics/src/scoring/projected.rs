// Projected team rankings.
//
// Applies the league's scoring settings to external hitter and pitcher
// projection tables, joins them onto rosters by normalized player name, and
// ranks teams by total projected output. Minor-league slots are skipped:
// they cannot score until activated.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::names::normalize_player_name;
use crate::data::projections::{HitterProjection, PitcherProjection};
use crate::data::rosters::{RosterSlot, RosterStatus};

const QUALITY_APPEARANCE_BONUS: f64 = 8.0;

/// One team's projected outlook, hitting and pitching reported separately.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectedTeamRecord {
    pub team: String,
    pub hitter_points: f64,
    pub pitcher_points: f64,
    pub total_points: f64,
    pub matched: u32,
    pub rank: u32,
}

/// Fantasy points for a projected hitter line under league scoring.
pub fn hitter_points(proj: &HitterProjection) -> f64 {
    let singles = proj.h - (proj.doubles + proj.triples + proj.hr);
    singles
        + proj.doubles * 2.0
        + proj.triples * 3.0
        + proj.hr * 4.0
        + proj.rbi
        + proj.r
        + proj.bb
        + proj.hbp
        + proj.sb * 2.0
}

/// Quality-appearance windows: the earned-run ceiling rises with innings.
fn quality_appearance(ip: f64, er: f64) -> bool {
    ((4.0..=4.67).contains(&ip) && er <= 1.0)
        || ((5.0..=6.67).contains(&ip) && er <= 2.0)
        || (ip >= 7.0 && er <= 3.0)
}

/// Fantasy points for a projected pitcher line under league scoring,
/// including the quality-appearance bonus where the line qualifies.
pub fn pitcher_points(proj: &PitcherProjection) -> f64 {
    let mut points = proj.ip * 2.0 + proj.so + proj.sv * 6.0 + proj.hld * 3.0
        - proj.er
        - proj.h * 0.5
        - proj.bb * 0.5;
    if quality_appearance(proj.ip, proj.er) {
        points += QUALITY_APPEARANCE_BONUS;
    }
    points
}

/// Position strings that route a slot to the pitching subtotal.
fn is_mound_slot(positions: &[String]) -> bool {
    positions
        .iter()
        .any(|p| matches!(p.as_str(), "SP" | "RP" | "P"))
}

/// Rank each roster by the summed projections of its players.
///
/// The join checks both tables, so a two-way player contributes a combined
/// line to whichever subtotal the roster position selects. Every roster team
/// gets a record; unmatched players and minor-league slots add nothing.
pub fn compute_projected_rankings(
    rosters: &[RosterSlot],
    hitters: &[HitterProjection],
    pitchers: &[PitcherProjection],
) -> Vec<ProjectedTeamRecord> {
    // First projection line wins when a name appears twice.
    let mut hitter_table: BTreeMap<String, f64> = BTreeMap::new();
    for proj in hitters {
        hitter_table
            .entry(normalize_player_name(&proj.name))
            .or_insert_with(|| hitter_points(proj));
    }
    let mut pitcher_table: BTreeMap<String, f64> = BTreeMap::new();
    for proj in pitchers {
        pitcher_table
            .entry(normalize_player_name(&proj.name))
            .or_insert_with(|| pitcher_points(proj));
    }

    let mut team_order: Vec<String> = Vec::new();
    let mut totals: BTreeMap<String, ProjectedTeamRecord> = BTreeMap::new();

    for slot in rosters {
        if !totals.contains_key(&slot.team) {
            team_order.push(slot.team.clone());
        }
        let record = totals
            .entry(slot.team.clone())
            .or_insert_with(|| ProjectedTeamRecord {
                team: slot.team.clone(),
                hitter_points: 0.0,
                pitcher_points: 0.0,
                total_points: 0.0,
                matched: 0,
                rank: 0,
            });

        if slot.status == RosterStatus::Minors {
            continue;
        }

        let key = normalize_player_name(&slot.player);
        let mut line = 0.0;
        let mut found = false;
        if let Some(&pts) = hitter_table.get(&key) {
            line += pts;
            found = true;
        }
        if let Some(&pts) = pitcher_table.get(&key) {
            line += pts;
            found = true;
        }
        if !found {
            continue;
        }

        if is_mound_slot(&slot.positions) {
            record.pitcher_points += line;
        } else {
            record.hitter_points += line;
        }
        record.matched += 1;
    }

    let mut records: Vec<ProjectedTeamRecord> = team_order
        .into_iter()
        .filter_map(|team| totals.remove(&team))
        .map(|mut record| {
            record.total_points = record.hitter_points + record.pitcher_points;
            record
        })
        .collect();

    records.sort_by(|a, b| {
        b.total_points
            .partial_cmp(&a.total_points)
            .unwrap_or(Ordering::Equal)
    });
    for (i, record) in records.iter_mut().enumerate() {
        record.rank = (i + 1) as u32;
    }
    records
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Player value scorer.
//
// Normalizes five per-player metrics onto [0, 1] across the whole pool and
// blends them into one composite. Fantasy points and salary are min-max
// scaled, salary inverted so cheap production beats expensive production.
// Age follows a desirability curve peaked at the 24-27 prime. Contract
// length maps through end-year buckets. Position takes the player's single
// best eligible slot: base defensive value plus a scarcity bonus that grows
// as fewer rostered players share the position.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::rosters::RosterSlot;

/// Contract buckets, longest deals first. A contract ending in or after a
/// bucket's year earns that bucket's score.
const CONTRACT_BUCKETS: [(i32, f64); 9] = [
    (2050, 1.0),
    (2045, 0.9),
    (2040, 0.8),
    (2035, 0.7),
    (2029, 0.6),
    (2028, 0.5),
    (2027, 0.4),
    (2026, 0.3),
    (2025, 0.2),
];

/// Expiring or unparseable contracts ("1st", "2nd") score here.
const CONTRACT_FALLBACK: f64 = 0.1;

/// Bonus paid to the thinnest position in the pool.
const SCARCITY_MAX_BONUS: f64 = 0.10;

/// Players listed without an age are assumed to be in their prime.
const DEFAULT_AGE: u32 = 25;

/// Players listed without eligibility count as utility.
const DEFAULT_POSITION: &str = "UT";

/// Relative importance of each value component. Any non-negative mix works;
/// the scorer renormalizes so the effective weights sum to 1.
#[derive(Debug, Clone)]
pub struct MvpWeights {
    pub fantasy_points: f64,
    pub salary: f64,
    pub age: f64,
    pub contract: f64,
    pub position: f64,
}

impl Default for MvpWeights {
    fn default() -> Self {
        MvpWeights {
            fantasy_points: 0.50,
            salary: 0.20,
            age: 0.10,
            contract: 0.10,
            position: 0.10,
        }
    }
}

impl MvpWeights {
    fn sum(&self) -> f64 {
        self.fantasy_points + self.salary + self.age + self.contract + self.position
    }
}

/// One player's value breakdown; every component sits on [0, 1].
#[derive(Debug, Clone, Serialize)]
pub struct PlayerMvpRecord {
    pub player: String,
    pub team: String,
    pub fantasy_points_score: f64,
    pub salary_score: f64,
    pub age_score: f64,
    pub contract_score: f64,
    pub position_score: f64,
    pub composite: f64,
    pub rank: u32,
}

/// Min-max rescale onto [0, 1]. A pool with no spread reads as all-max.
fn minmax_score(value: f64, min: f64, max: f64) -> f64 {
    if (max - min).abs() < 1e-9 {
        1.0
    } else {
        (value - min) / (max - min)
    }
}

/// Inverted min-max: the cheapest player scores 1.0, the priciest 0.0.
fn inverse_minmax_score(value: f64, min: f64, max: f64) -> f64 {
    if (max - min).abs() < 1e-9 {
        1.0
    } else {
        1.0 - (value - min) / (max - min)
    }
}

/// Desirability curve over age, peaked at the 24-27 prime and decaying in
/// two-year steps on either side.
fn age_score(age: u32) -> f64 {
    let distance = if age < 24 {
        24 - age
    } else if age > 27 {
        age - 27
    } else {
        0
    };
    match distance {
        0 => 1.0,
        1..=2 => 0.8,
        3..=4 => 0.6,
        5..=6 => 0.4,
        7..=8 => 0.2,
        _ => 0.1,
    }
}

fn contract_score(contract: Option<&str>) -> f64 {
    let Some(raw) = contract else {
        return CONTRACT_FALLBACK;
    };
    let Ok(end_year) = raw.trim().parse::<i32>() else {
        return CONTRACT_FALLBACK;
    };
    for (threshold, score) in CONTRACT_BUCKETS {
        if end_year >= threshold {
            return score;
        }
    }
    CONTRACT_FALLBACK
}

/// Base defensive value by position code.
fn position_base(position: &str) -> f64 {
    match position {
        "SP" | "C" => 0.90,
        "SS" => 0.85,
        "CF" => 0.80,
        "2B" => 0.75,
        "3B" => 0.70,
        "RF" => 0.65,
        "LF" => 0.60,
        "1B" => 0.55,
        "UT" => 0.50,
        _ => 0.40,
    }
}

/// Count how many rostered players are eligible at each position. A
/// multi-eligible player counts once at every slot they can fill.
fn position_counts(players: &[RosterSlot]) -> BTreeMap<String, u32> {
    let mut counts: BTreeMap<String, u32> = BTreeMap::new();
    for slot in players {
        if slot.positions.is_empty() {
            *counts.entry(DEFAULT_POSITION.to_string()).or_insert(0) += 1;
        } else {
            for pos in &slot.positions {
                *counts.entry(pos.clone()).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// A player's position component: the best of their eligible slots, each
/// valued at base plus scarcity. The thinnest position in the pool earns the
/// full bonus, the deepest earns none, and a pool where every position is
/// equally stocked pays the midpoint.
fn position_score(positions: &[String], counts: &BTreeMap<String, u32>) -> f64 {
    let (pool_min, pool_max) = match (counts.values().min(), counts.values().max()) {
        (Some(&min), Some(&max)) => (min, max),
        _ => (0, 0),
    };

    let fallback = [DEFAULT_POSITION.to_string()];
    let eligible: &[String] = if positions.is_empty() {
        &fallback
    } else {
        positions
    };

    eligible
        .iter()
        .map(|pos| {
            let bonus = match counts.get(pos.as_str()) {
                Some(&count) if pool_max > pool_min => {
                    SCARCITY_MAX_BONUS * (pool_max - count) as f64 / (pool_max - pool_min) as f64
                }
                _ => SCARCITY_MAX_BONUS / 2.0,
            };
            position_base(pos) + bonus
        })
        .fold(0.0, f64::max)
}

/// Score every player in the pool and rank them by composite value,
/// descending. Ties keep input order. An empty pool scores nothing.
pub fn compute_mvp_scores(players: &[RosterSlot], weights: &MvpWeights) -> Vec<PlayerMvpRecord> {
    if players.is_empty() {
        return Vec::new();
    }

    let counts = position_counts(players);

    let fpts_min = players
        .iter()
        .map(|p| p.fantasy_points)
        .fold(f64::INFINITY, f64::min);
    let fpts_max = players
        .iter()
        .map(|p| p.fantasy_points)
        .fold(f64::NEG_INFINITY, f64::max);
    let salary_min = players.iter().map(|p| p.salary).fold(f64::INFINITY, f64::min);
    let salary_max = players
        .iter()
        .map(|p| p.salary)
        .fold(f64::NEG_INFINITY, f64::max);

    let weight_sum = weights.sum();
    let scale = if weight_sum > 0.0 { 1.0 / weight_sum } else { 0.0 };

    let mut records: Vec<PlayerMvpRecord> = players
        .iter()
        .map(|slot| {
            let mut record = PlayerMvpRecord {
                player: slot.player.clone(),
                team: slot.team.clone(),
                fantasy_points_score: minmax_score(slot.fantasy_points, fpts_min, fpts_max),
                salary_score: inverse_minmax_score(slot.salary, salary_min, salary_max),
                age_score: age_score(slot.age.unwrap_or(DEFAULT_AGE)),
                contract_score: contract_score(slot.contract.as_deref()),
                position_score: position_score(&slot.positions, &counts),
                composite: 0.0,
                rank: 0,
            };
            record.composite = scale
                * (weights.fantasy_points * record.fantasy_points_score
                    + weights.salary * record.salary_score
                    + weights.age * record.age_score
                    + weights.contract * record.contract_score
                    + weights.position * record.position_score);
            record
        })
        .collect();

    records.sort_by(|a, b| {
        b.composite
            .partial_cmp(&a.composite)
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

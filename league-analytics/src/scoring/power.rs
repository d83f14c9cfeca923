// Power score engine.
//
// Raw power = weekly scoring average x points modifier x hot/cold modifier,
// optionally absorbing the schedule-strength adjustment. Raw scores are then
// rescaled so the league mean sits at exactly 100, which keeps week-over-week
// tables comparable as season totals grow.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::normalize::TeamStatRecord;
use crate::data::standings::WeeklyResult;
use crate::scoring::modifiers::{
    hot_cold_modifier, points_modifier, recent_win_rate, schedule_strength,
};
use crate::scoring::ScoringError;

/// Power engine tunables.
#[derive(Debug, Clone)]
pub struct PowerOptions {
    /// How many of the most recent weeks feed the hot/cold modifier.
    pub recent_window_weeks: usize,
    /// When set, raw scores also absorb the schedule-strength adjustment as
    /// a (1 + adjustment) factor. The adjustment column is reported either
    /// way.
    pub include_schedule_strength: bool,
}

impl Default for PowerOptions {
    fn default() -> Self {
        Self {
            recent_window_weeks: 3,
            include_schedule_strength: false,
        }
    }
}

/// One team's fully derived power line.
#[derive(Debug, Clone, Serialize)]
pub struct PowerScoreRecord {
    pub team: String,
    pub weekly_avg: f64,
    pub points_modifier: f64,
    pub hot_cold_modifier: f64,
    pub schedule_strength: f64,
    pub raw_score: f64,
    /// Raw score rescaled so the league mean is exactly 100.
    pub normalized_score: f64,
    /// 1-based; ties keep standings input order.
    pub rank: u32,
}

/// Score and rank every team. The only error is an empty team list; a team
/// with zero output still ranks, it just ranks last.
pub fn compute_power_scores(
    teams: &[TeamStatRecord],
    weekly: &[WeeklyResult],
    options: &PowerOptions,
) -> Result<Vec<PowerScoreRecord>, ScoringError> {
    if teams.is_empty() {
        return Err(ScoringError::EmptyTeams);
    }

    let league_points: Vec<f64> = teams.iter().map(|t| t.fantasy_points).collect();
    let weekly_averages: BTreeMap<String, f64> = teams
        .iter()
        .map(|t| (t.team.clone(), weekly_average(t)))
        .collect();

    let mut records: Vec<PowerScoreRecord> = teams
        .iter()
        .map(|team| {
            let avg = weekly_average(team);
            let points_mod = points_modifier(team.fantasy_points, &league_points);
            let hot_cold = hot_cold_modifier(recent_win_rate(
                &team.team,
                weekly,
                options.recent_window_weeks,
            ));
            let strength = schedule_strength(&team.team, weekly, &weekly_averages);

            let mut raw = avg * points_mod * hot_cold;
            if options.include_schedule_strength {
                raw *= 1.0 + strength;
            }

            PowerScoreRecord {
                team: team.team.clone(),
                weekly_avg: avg,
                points_modifier: points_mod,
                hot_cold_modifier: hot_cold,
                schedule_strength: strength,
                raw_score: raw,
                normalized_score: 0.0,
                rank: 0,
            }
        })
        .collect();

    let mean = records.iter().map(|r| r.raw_score).sum::<f64>() / records.len() as f64;
    for record in &mut records {
        record.normalized_score = if mean.abs() > f64::EPSILON {
            record.raw_score / mean * 100.0
        } else {
            // Every team produced zero: nothing to scale against.
            0.0
        };
    }

    // Stable sort: teams tied on raw score keep their standings order.
    records.sort_by(|a, b| {
        b.raw_score
            .partial_cmp(&a.raw_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (i, record) in records.iter_mut().enumerate() {
        record.rank = (i + 1) as u32;
    }

    Ok(records)
}

fn weekly_average(team: &TeamStatRecord) -> f64 {
    team.fantasy_points / team.weeks_played.max(1) as f64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

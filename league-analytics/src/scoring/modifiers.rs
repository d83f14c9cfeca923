// Per-team modifiers feeding the power engine.

use std::collections::BTreeMap;

use crate::data::standings::WeeklyResult;

/// Bounds of the points-modifier band.
pub const POINTS_MOD_FLOOR: f64 = 1.0;
pub const POINTS_MOD_CEILING: f64 = 1.9;

/// A spread below this counts as "everyone tied".
const SPREAD_EPSILON: f64 = 1e-9;

/// Linear rescale of a team's total fantasy points onto [1.0, 1.9] within
/// the league: the lowest-scoring team maps to 1.0, the highest to 1.9. A
/// league with no spread maps everyone to the midpoint 1.45.
pub fn points_modifier(team_points: f64, league_points: &[f64]) -> f64 {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &points in league_points {
        min = min.min(points);
        max = max.max(points);
    }

    let spread = max - min;
    if !spread.is_finite() || spread < SPREAD_EPSILON {
        return (POINTS_MOD_FLOOR + POINTS_MOD_CEILING) / 2.0;
    }

    let t = ((team_points - min) / spread).clamp(0.0, 1.0);
    POINTS_MOD_FLOOR + t * (POINTS_MOD_CEILING - POINTS_MOD_FLOOR)
}

/// Hot/cold factor from a recent win rate: 1.0 (winless) to 1.5 (perfect).
/// `None` means the team has no weekly results at all; that is neutral 1.0,
/// never a guess.
pub fn hot_cold_modifier(recent_win_rate: Option<f64>) -> f64 {
    match recent_win_rate {
        Some(rate) => 1.0 + 0.5 * rate.clamp(0.0, 1.0),
        None => 1.0,
    }
}

/// Win rate over the team's most recent `window` weekly results, ties
/// counting half. Fewer rows than the window means the rate covers whatever
/// has actually been played, which for a young season is the season-to-date
/// record. `None` when the team has no weekly rows at all.
pub fn recent_win_rate(team: &str, weekly: &[WeeklyResult], window: usize) -> Option<f64> {
    let mut rows: Vec<&WeeklyResult> = weekly.iter().filter(|r| r.team == team).collect();
    if rows.is_empty() {
        return None;
    }
    rows.sort_by_key(|r| r.week);

    let take = window.max(1).min(rows.len());
    let recent = &rows[rows.len() - take..];

    let mut score = 0.0;
    for row in recent {
        if row.tied() {
            score += 0.5;
        } else if row.won() {
            score += 1.0;
        }
    }
    Some(score / take as f64)
}

/// Percentile position of `value` within `values` by min-max rescale. A
/// degenerate pool (all equal) pins everyone to 0.5.
fn minmax_percentile(value: f64, values: &[f64]) -> f64 {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
    }
    let spread = max - min;
    if !spread.is_finite() || spread < SPREAD_EPSILON {
        return 0.5;
    }
    ((value - min) / spread).clamp(0.0, 1.0)
}

/// Schedule-strength adjustment in [-1.0, 1.0].
///
/// Own and opponent strengths are min-max percentiles of per-week scoring
/// averages across the league. The gap between own strength and the mean
/// opponent percentile is then scaled by the opposition faced: beating a
/// hard schedule counts for more than feasting on a soft one, and losing to
/// a soft schedule counts against more than losing to a gauntlet. Teams
/// without a completed matchup sit at 0.
pub fn schedule_strength(
    team: &str,
    weekly: &[WeeklyResult],
    weekly_averages: &BTreeMap<String, f64>,
) -> f64 {
    let own_avg = match weekly_averages.get(team) {
        Some(avg) => *avg,
        None => return 0.0,
    };
    let pool: Vec<f64> = weekly_averages.values().copied().collect();

    let mut opponent_pcts = Vec::new();
    for row in weekly.iter().filter(|r| r.team == team) {
        if let Some(opp_avg) = weekly_averages.get(&row.opponent) {
            opponent_pcts.push(minmax_percentile(*opp_avg, &pool));
        }
    }
    if opponent_pcts.is_empty() {
        return 0.0;
    }

    let own_pct = minmax_percentile(own_avg, &pool);
    let opp_pct = opponent_pcts.iter().sum::<f64>() / opponent_pcts.len() as f64;

    let delta = own_pct - opp_pct;
    let adjusted = if delta >= 0.0 {
        delta * opp_pct
    } else {
        delta * (1.0 - opp_pct)
    };
    adjusted.clamp(-1.0, 1.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

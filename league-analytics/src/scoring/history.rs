// Historical performance scorer.
//
// Each configured season contributes (recency weight) x (season score),
// where a season score is the mean of three 0-100 readings: winning
// percentage, final-rank position, and share of the season's top fantasy
// points. Podium finishes add a flat bonus on top. A team absent from a
// season simply contributes nothing for that year.

use std::collections::BTreeMap;

use crate::data::seasons::{HistoricalSeasonRecord, PlayoffFinish};

const FIRST_PLACE_BONUS: f64 = 30.0;
const SECOND_PLACE_BONUS: f64 = 20.0;
const THIRD_PLACE_BONUS: f64 = 10.0;

fn playoff_bonus(finish: PlayoffFinish) -> f64 {
    match finish {
        PlayoffFinish::First => FIRST_PLACE_BONUS,
        PlayoffFinish::Second => SECOND_PLACE_BONUS,
        PlayoffFinish::Third => THIRD_PLACE_BONUS,
    }
}

/// Score one season line against its year's field. `team_count` and
/// `max_points` describe the whole season, not just this team.
fn season_score(record: &HistoricalSeasonRecord, team_count: usize, max_points: f64) -> f64 {
    let win_pct_score = record.win_pct * 100.0;

    // Linear from 100 (1st) down to 0 (last). A one-team season is trivially
    // a first-place finish.
    let rank_score = if team_count > 1 {
        100.0 * (1.0 - (record.rank.saturating_sub(1)) as f64 / (team_count - 1) as f64)
    } else {
        100.0
    };
    let rank_score = rank_score.clamp(0.0, 100.0);

    let points_score = if max_points > 0.0 {
        (record.fantasy_points / max_points * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    let base = (win_pct_score + rank_score + points_score) / 3.0;
    base + record.playoff.map_or(0.0, playoff_bonus)
}

/// Weighted historical score per team.
///
/// `weights` maps season years to recency weights (validated at config load
/// to sum to 1). Seasons present in the data but absent from `weights` are
/// ignored; weighted seasons with no row for a team contribute 0. Every team
/// in `teams` gets an entry even when it has no history at all.
pub fn compute_historical_scores(
    teams: &[String],
    seasons: &[HistoricalSeasonRecord],
    weights: &BTreeMap<i32, f64>,
) -> BTreeMap<String, f64> {
    // Per-season field context: (team count, max fantasy points).
    let mut season_context: BTreeMap<i32, (usize, f64)> = BTreeMap::new();
    for record in seasons {
        let entry = season_context.entry(record.season).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 = entry.1.max(record.fantasy_points);
    }

    let mut scores = BTreeMap::new();
    for team in teams {
        let mut total = 0.0;
        for (year, weight) in weights {
            let row = seasons
                .iter()
                .find(|r| r.season == *year && &r.team == team);
            if let Some(record) = row {
                let (team_count, max_points) = season_context
                    .get(year)
                    .copied()
                    .unwrap_or((1, 0.0));
                total += weight * season_score(record, team_count, max_points);
            }
        }
        scores.insert(team.clone(), total);
    }
    scores
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

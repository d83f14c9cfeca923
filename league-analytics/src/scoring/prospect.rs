// Prospect strength scorer.
//
// Joins an industry prospect list onto league rosters by normalized player
// name, then aggregates per fantasy team. Unmatched rostered players carry
// no prospect value; unmatched prospects belong to no one and are ignored.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::data::names::normalize_player_name;
use crate::data::prospects::ProspectRanking;
use crate::data::rosters::RosterSlot;

/// One team's aggregated prospect holdings.
#[derive(Debug, Clone, Serialize)]
pub struct ProspectScoreRecord {
    pub team: String,
    pub total_score: f64,
    pub avg_score: f64,
    /// How many rostered players matched the prospect list.
    pub matched: u32,
    /// 1-based, by average score; total score breaks ties.
    pub rank: u32,
}

/// Aggregate prospect scores for every team that appears in the rosters.
pub fn compute_prospect_scores(
    rosters: &[RosterSlot],
    prospects: &[ProspectRanking],
) -> Vec<ProspectScoreRecord> {
    // Best (lowest-rank) entry wins when a list carries duplicate names.
    let mut by_name: BTreeMap<String, &ProspectRanking> = BTreeMap::new();
    for prospect in prospects {
        let key = normalize_player_name(&prospect.name);
        if key.is_empty() {
            continue;
        }
        match by_name.get(&key) {
            Some(existing) if existing.rank <= prospect.rank => {}
            _ => {
                by_name.insert(key, prospect);
            }
        }
    }

    // A player can only count once league-wide; first roster occurrence wins.
    let mut seen_players: BTreeSet<String> = BTreeSet::new();

    // Accumulate in first-seen team order so equal teams rank stably.
    let mut order: Vec<String> = Vec::new();
    let mut totals: BTreeMap<String, (f64, u32)> = BTreeMap::new();

    for slot in rosters {
        if !totals.contains_key(&slot.team) {
            order.push(slot.team.clone());
            totals.insert(slot.team.clone(), (0.0, 0));
        }

        let key = normalize_player_name(&slot.player);
        if key.is_empty() || !seen_players.insert(key.clone()) {
            continue;
        }
        if let Some(prospect) = by_name.get(&key) {
            let entry = totals.get_mut(&slot.team);
            if let Some((total, matched)) = entry {
                *total += prospect.score;
                *matched += 1;
            }
        }
    }

    let mut records: Vec<ProspectScoreRecord> = order
        .into_iter()
        .map(|team| {
            let (total, matched) = totals.get(&team).copied().unwrap_or((0.0, 0));
            let avg = if matched > 0 {
                total / matched as f64
            } else {
                0.0
            };
            ProspectScoreRecord {
                team,
                total_score: total,
                avg_score: avg,
                matched,
                rank: 0,
            }
        })
        .collect();

    records.sort_by(|a, b| {
        b.avg_score
            .partial_cmp(&a.avg_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                b.total_score
                    .partial_cmp(&a.total_score)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    });
    for (i, record) in records.iter_mut().enumerate() {
        record.rank = (i + 1) as u32;
    }
    records
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::rosters::RosterStatus;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    fn slot(team: &str, player: &str) -> RosterSlot {
        RosterSlot {
            team: team.to_string(),
            player: player.to_string(),
            positions: vec!["SS".to_string()],
            status: RosterStatus::Minors,
            salary: 1.0,
            age: Some(20),
            contract: Some("1st".to_string()),
            fantasy_points: 0.0,
        }
    }

    fn prospect(rank: u32, name: &str, score: f64) -> ProspectRanking {
        ProspectRanking {
            rank,
            name: name.to_string(),
            position: "SS".to_string(),
            club: "MIL".to_string(),
            score,
        }
    }

    #[test]
    fn scores_join_by_normalized_name() {
        let rosters = vec![
            slot("A", "Jesús Made"),
            slot("A", "Nobody Special"),
            slot("B", "Walcott, Sebastian"),
        ];
        let prospects = vec![
            prospect(1, "Jesus Made", 80.0),
            prospect(2, "Sebastian Walcott", 70.0),
        ];

        let records = compute_prospect_scores(&rosters, &prospects);
        let a = records.iter().find(|r| r.team == "A").unwrap();
        let b = records.iter().find(|r| r.team == "B").unwrap();

        assert!(approx_eq(a.total_score, 80.0, 1e-9));
        assert_eq!(a.matched, 1);
        assert!(approx_eq(b.total_score, 70.0, 1e-9));
    }

    #[test]
    fn ranking_is_by_average_with_total_tiebreak() {
        // A: two prospects at 60 each (avg 60, total 120).
        // B: one prospect at 70 (avg 70, total 70) -> ranks first on average.
        let rosters = vec![
            slot("A", "First Guy"),
            slot("A", "Second Guy"),
            slot("B", "Third Guy"),
        ];
        let prospects = vec![
            prospect(1, "First Guy", 60.0),
            prospect(2, "Second Guy", 60.0),
            prospect(3, "Third Guy", 70.0),
        ];

        let records = compute_prospect_scores(&rosters, &prospects);
        assert_eq!(records[0].team, "B");
        assert_eq!(records[0].rank, 1);
        assert_eq!(records[1].team, "A");
    }

    #[test]
    fn equal_averages_break_on_total() {
        let rosters = vec![
            slot("A", "First Guy"),
            slot("A", "Second Guy"),
            slot("B", "Third Guy"),
        ];
        let prospects = vec![
            prospect(1, "First Guy", 50.0),
            prospect(2, "Second Guy", 50.0),
            prospect(3, "Third Guy", 50.0),
        ];

        let records = compute_prospect_scores(&rosters, &prospects);
        // Same 50.0 average, but A holds twice the total.
        assert_eq!(records[0].team, "A");
        assert_eq!(records[1].team, "B");
    }

    #[test]
    fn duplicate_roster_names_count_once() {
        // Data error: the same player listed on two teams. First wins.
        let rosters = vec![slot("A", "Jesus Made"), slot("B", "Jesus Made")];
        let prospects = vec![prospect(1, "Jesus Made", 80.0)];

        let records = compute_prospect_scores(&rosters, &prospects);
        let a = records.iter().find(|r| r.team == "A").unwrap();
        let b = records.iter().find(|r| r.team == "B").unwrap();

        assert_eq!(a.matched, 1);
        assert_eq!(b.matched, 0);
        assert!(approx_eq(b.total_score, 0.0, 1e-9));
    }

    #[test]
    fn duplicate_prospect_entries_keep_the_best_rank() {
        let rosters = vec![slot("A", "Jesus Made")];
        let prospects = vec![prospect(40, "Jesus Made", 55.0), prospect(1, "Jesus Made", 80.0)];

        let records = compute_prospect_scores(&rosters, &prospects);
        assert!(approx_eq(records[0].total_score, 80.0, 1e-9));
    }

    #[test]
    fn teams_without_matches_still_get_records() {
        let rosters = vec![slot("A", "Jesus Made"), slot("Empty Farm", "Journeyman Vet")];
        let prospects = vec![prospect(1, "Jesus Made", 80.0)];

        let records = compute_prospect_scores(&rosters, &prospects);
        let empty = records.iter().find(|r| r.team == "Empty Farm").unwrap();

        assert_eq!(empty.matched, 0);
        assert!(approx_eq(empty.total_score, 0.0, 1e-9));
        assert!(approx_eq(empty.avg_score, 0.0, 1e-9));
        assert_eq!(empty.rank, 2);
    }
}

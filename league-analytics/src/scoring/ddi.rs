// Dynasty Dominance Index.
//
// Blends present strength (power), future strength (prospects), and pedigree
// (historical score) into one composite. Each component is rescaled against
// the league's best before weighting, so the composite is invariant to each
// component's absolute scale.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::scoring::power::PowerScoreRecord;
use crate::scoring::prospect::ProspectScoreRecord;
use crate::scoring::ScoringError;

/// Component weights. Validated at config load to sum to 1.
#[derive(Debug, Clone)]
pub struct DdiWeights {
    pub power: f64,
    pub prospect: f64,
    pub historical: f64,
}

impl Default for DdiWeights {
    fn default() -> Self {
        Self {
            power: 0.45,
            prospect: 0.30,
            historical: 0.25,
        }
    }
}

/// One team's composite line. Components are 0-100 where 100 is the league's
/// best on that axis, each reported with its own 1-based rank so the table
/// shows where the composite came from.
#[derive(Debug, Clone, Serialize)]
pub struct DdiRecord {
    pub team: String,
    pub power_component: f64,
    pub prospect_component: f64,
    pub historical_component: f64,
    pub power_rank: u32,
    pub prospect_rank: u32,
    pub historical_rank: u32,
    pub composite: f64,
    /// 1-based; ties keep the power-table order.
    pub rank: u32,
}

/// Rescale a value against the pool maximum onto 0-100. A missing or
/// non-positive maximum collapses the whole component to 0.
fn max_relative(value: f64, max: f64) -> f64 {
    if max > 0.0 {
        (value / max * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// 1-based ranks for one component column, descending; ties keep the
/// power-table order.
fn component_ranks(records: &[DdiRecord], value: impl Fn(&DdiRecord) -> f64) -> Vec<u32> {
    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by(|&a, &b| {
        value(&records[b])
            .partial_cmp(&value(&records[a]))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mut ranks = vec![0u32; records.len()];
    for (pos, idx) in order.into_iter().enumerate() {
        ranks[idx] = (pos + 1) as u32;
    }
    ranks
}

/// Compose the index over the power table's team universe. Teams missing
/// from `prospects` or `historical` score 0 on that component.
pub fn compute_ddi(
    power: &[PowerScoreRecord],
    prospects: &[ProspectScoreRecord],
    historical: &BTreeMap<String, f64>,
    weights: &DdiWeights,
) -> Result<Vec<DdiRecord>, ScoringError> {
    if power.is_empty() {
        return Err(ScoringError::EmptyTeams);
    }

    let max_power = power.iter().map(|r| r.raw_score).fold(0.0_f64, f64::max);
    let max_prospect = prospects
        .iter()
        .map(|r| r.total_score)
        .fold(0.0_f64, f64::max);
    let max_history = historical.values().copied().fold(0.0_f64, f64::max);

    let prospect_totals: BTreeMap<&str, f64> = prospects
        .iter()
        .map(|r| (r.team.as_str(), r.total_score))
        .collect();

    let mut records: Vec<DdiRecord> = power
        .iter()
        .map(|team| {
            let power_component = max_relative(team.raw_score, max_power);
            let prospect_component = max_relative(
                prospect_totals.get(team.team.as_str()).copied().unwrap_or(0.0),
                max_prospect,
            );
            let historical_component = max_relative(
                historical.get(&team.team).copied().unwrap_or(0.0),
                max_history,
            );

            let composite = power_component * weights.power
                + prospect_component * weights.prospect
                + historical_component * weights.historical;

            DdiRecord {
                team: team.team.clone(),
                power_component,
                prospect_component,
                historical_component,
                power_rank: 0,
                prospect_rank: 0,
                historical_rank: 0,
                composite,
                rank: 0,
            }
        })
        .collect();

    let power_ranks = component_ranks(&records, |r| r.power_component);
    let prospect_ranks = component_ranks(&records, |r| r.prospect_component);
    let historical_ranks = component_ranks(&records, |r| r.historical_component);
    for (i, record) in records.iter_mut().enumerate() {
        record.power_rank = power_ranks[i];
        record.prospect_rank = prospect_ranks[i];
        record.historical_rank = historical_ranks[i];
    }

    records.sort_by(|a, b| {
        b.composite
            .partial_cmp(&a.composite)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (i, record) in records.iter_mut().enumerate() {
        record.rank = (i + 1) as u32;
    }

    Ok(records)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    fn power_record(team: &str, raw: f64) -> PowerScoreRecord {
        PowerScoreRecord {
            team: team.to_string(),
            weekly_avg: 0.0,
            points_modifier: 1.0,
            hot_cold_modifier: 1.0,
            schedule_strength: 0.0,
            raw_score: raw,
            normalized_score: 0.0,
            rank: 0,
        }
    }

    fn prospect_record(team: &str, total: f64) -> ProspectScoreRecord {
        ProspectScoreRecord {
            team: team.to_string(),
            total_score: total,
            avg_score: total,
            matched: 1,
            rank: 0,
        }
    }

    #[test]
    fn components_rescale_against_the_league_best() {
        let power = vec![power_record("A", 60.0), power_record("B", 30.0)];
        let prospects = vec![prospect_record("A", 100.0), prospect_record("B", 50.0)];
        let mut historical = BTreeMap::new();
        historical.insert("A".to_string(), 120.0);
        historical.insert("B".to_string(), 120.0);

        let ddi = compute_ddi(&power, &prospects, &historical, &DdiWeights::default()).unwrap();
        let a = ddi.iter().find(|r| r.team == "A").unwrap();
        let b = ddi.iter().find(|r| r.team == "B").unwrap();

        assert!(approx_eq(a.power_component, 100.0, 1e-9));
        assert!(approx_eq(b.power_component, 50.0, 1e-9));
        assert!(approx_eq(b.prospect_component, 50.0, 1e-9));
        assert!(approx_eq(a.historical_component, 100.0, 1e-9));
        assert!(approx_eq(b.historical_component, 100.0, 1e-9));

        // A: 100*0.45 + 100*0.30 + 100*0.25 = 100.
        assert!(approx_eq(a.composite, 100.0, 1e-9));
        // B: 50*0.45 + 50*0.30 + 100*0.25 = 22.5 + 15 + 25 = 62.5.
        assert!(approx_eq(b.composite, 62.5, 1e-9));
        assert_eq!(a.rank, 1);
        assert_eq!(b.rank, 2);
    }

    #[test]
    fn composite_ranks_survive_raw_power_rescaling() {
        let prospects = vec![prospect_record("A", 10.0), prospect_record("B", 90.0)];
        let mut historical = BTreeMap::new();
        historical.insert("A".to_string(), 40.0);
        historical.insert("B".to_string(), 60.0);

        let base = vec![power_record("A", 50.0), power_record("B", 40.0)];
        let scaled = vec![power_record("A", 5000.0), power_record("B", 4000.0)];

        let ddi_base =
            compute_ddi(&base, &prospects, &historical, &DdiWeights::default()).unwrap();
        let ddi_scaled =
            compute_ddi(&scaled, &prospects, &historical, &DdiWeights::default()).unwrap();

        let order_base: Vec<&str> = ddi_base.iter().map(|r| r.team.as_str()).collect();
        let order_scaled: Vec<&str> = ddi_scaled.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(order_base, order_scaled);

        for (lhs, rhs) in ddi_base.iter().zip(ddi_scaled.iter()) {
            assert!(approx_eq(lhs.composite, rhs.composite, 1e-9));
        }
    }

    #[test]
    fn component_ranks_accompany_the_composite() {
        let power = vec![power_record("A", 60.0), power_record("B", 30.0)];
        let prospects = vec![prospect_record("A", 40.0), prospect_record("B", 80.0)];
        let mut historical = BTreeMap::new();
        historical.insert("A".to_string(), 120.0);
        historical.insert("B".to_string(), 120.0);

        let ddi = compute_ddi(&power, &prospects, &historical, &DdiWeights::default()).unwrap();
        let a = ddi.iter().find(|r| r.team == "A").unwrap();
        let b = ddi.iter().find(|r| r.team == "B").unwrap();

        assert_eq!((a.power_rank, b.power_rank), (1, 2));
        assert_eq!((a.prospect_rank, b.prospect_rank), (2, 1));
        // Tied history keeps the power-table order.
        assert_eq!((a.historical_rank, b.historical_rank), (1, 2));
    }

    #[test]
    fn missing_component_data_scores_zero() {
        let power = vec![power_record("A", 50.0), power_record("No Farm", 40.0)];
        let prospects = vec![prospect_record("A", 80.0)];
        let historical = BTreeMap::new();

        let ddi = compute_ddi(&power, &prospects, &historical, &DdiWeights::default()).unwrap();
        let bare = ddi.iter().find(|r| r.team == "No Farm").unwrap();

        assert!(approx_eq(bare.prospect_component, 0.0, 1e-9));
        // Empty history zeroes the component for everyone.
        assert!(ddi.iter().all(|r| r.historical_component == 0.0));
    }

    #[test]
    fn empty_power_table_is_an_error() {
        assert!(matches!(
            compute_ddi(&[], &[], &BTreeMap::new(), &DdiWeights::default()),
            Err(ScoringError::EmptyTeams)
        ));
    }

    #[test]
    fn tied_composites_keep_power_order() {
        let power = vec![power_record("First", 50.0), power_record("Second", 50.0)];
        let prospects = vec![];
        let historical = BTreeMap::new();

        let ddi = compute_ddi(&power, &prospects, &historical, &DdiWeights::default()).unwrap();
        assert_eq!(ddi[0].team, "First");
        assert_eq!(ddi[1].team, "Second");
    }
}

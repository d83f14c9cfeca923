// Rank-movement tracking.
//
// Movement is previous rank minus current rank: positive means the team
// climbed, negative means it slid. "Previous" is the latest stored snapshot
// dated strictly before the run date, so re-running today never diffs a team
// against itself.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::NaiveDate;

use crate::db::Database;

/// Deltas against a prior rank map. Teams absent from the prior snapshot
/// (expansion, rename) get no entry rather than a fabricated zero.
pub fn movement_deltas(
    current: &[(String, u32)],
    previous: Option<&BTreeMap<String, u32>>,
) -> BTreeMap<String, i64> {
    let previous = match previous {
        Some(map) => map,
        None => return BTreeMap::new(),
    };

    let mut deltas = BTreeMap::new();
    for (team, rank) in current {
        if let Some(prior_rank) = previous.get(team) {
            deltas.insert(team.clone(), *prior_rank as i64 - *rank as i64);
        }
    }
    deltas
}

/// Movement for one ranking stream, read from the snapshot store.
pub fn movement_against_history(
    db: &Database,
    source: &str,
    as_of: NaiveDate,
    current: &[(String, u32)],
) -> Result<BTreeMap<String, i64>> {
    let prior = db.latest_snapshot_before(source, as_of)?;
    Ok(movement_deltas(current, prior.as_ref().map(|(_, ranks)| ranks)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

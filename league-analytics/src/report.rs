// Report rendering: fixed-width text tables for the terminal and a JSON
// export of the full run for downstream tooling.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::app::RankingsRun;
use crate::config::LeagueConfig;
use crate::scoring::ddi::DdiRecord;
use crate::scoring::mvp::PlayerMvpRecord;
use crate::scoring::power::PowerScoreRecord;
use crate::scoring::projected::ProjectedTeamRecord;
use crate::scoring::prospect::ProspectScoreRecord;

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Render the whole run as one printable report. Sections with no data
/// (e.g. no rosters were loaded) are left out rather than printed empty.
pub fn render_run(run: &RankingsRun, league: &LeagueConfig, mvp_rows: usize) -> String {
    let mut s = String::new();
    s.push_str(&format!("{} rankings as of {}\n", league.name, run.as_of));

    s.push_str(&section("Power Rankings"));
    s.push_str(&power_table(&run.power, &run.power_movement, &league.abbreviations));

    s.push_str(&section("Dynasty Dominance Index"));
    s.push_str(&ddi_table(&run.ddi, &run.ddi_movement, &league.abbreviations));

    if !run.prospects.is_empty() {
        s.push_str(&section("Prospect Pipeline"));
        s.push_str(&prospect_table(&run.prospects, &league.abbreviations));
    }

    if !run.historical.is_empty() {
        s.push_str(&section("Historical Performance"));
        s.push_str(&historical_table(&run.historical, &league.abbreviations));
    }

    if !run.projected.is_empty() {
        s.push_str(&section("Projected Season Points"));
        s.push_str(&projected_table(&run.projected, &league.abbreviations));
    }

    if !run.mvp.is_empty() {
        s.push_str(&section("MVP Race"));
        s.push_str(&mvp_table(&run.mvp, &league.abbreviations, mvp_rows));
    }

    s
}

/// Write the run as pretty-printed JSON, creating parent directories as
/// needed.
pub fn export_json(run: &RankingsRun, path: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create report directory {}", parent.display()))?;
        }
    }
    let json =
        serde_json::to_string_pretty(run).context("failed to serialize rankings run to JSON")?;
    std::fs::write(path, json).with_context(|| format!("failed to write report to {path}"))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

pub fn power_table(
    records: &[PowerScoreRecord],
    movement: &BTreeMap<String, i64>,
    abbreviations: &BTreeMap<String, String>,
) -> String {
    let mut s = String::new();
    s.push_str(&format!(
        "{:>4}  {:<22} {:>7} {:>7} {:>9} {:>6} {:>8} {:>7} {:>5}\n",
        "Rank", "Team", "WkAvg", "PtsMod", "Hot/Cold", "Sched", "Raw", "Score", "Move"
    ));
    for r in records {
        s.push_str(&format!(
            "{:>4}  {:<22} {:>7.1} {:>7.2} {:>9.2} {:>+6.2} {:>8.1} {:>7.1} {:>5}\n",
            r.rank,
            short_name(&r.team, abbreviations),
            r.weekly_avg,
            r.points_modifier,
            r.hot_cold_modifier,
            r.schedule_strength,
            r.raw_score,
            r.normalized_score,
            movement_cell(movement, &r.team),
        ));
    }
    s
}

pub fn ddi_table(
    records: &[DdiRecord],
    movement: &BTreeMap<String, i64>,
    abbreviations: &BTreeMap<String, String>,
) -> String {
    let mut s = String::new();
    s.push_str(&format!(
        "{:>4}  {:<22} {:>7} {:>3} {:>9} {:>3} {:>8} {:>3} {:>7} {:>5}\n",
        "Rank", "Team", "Power", "P#", "Prospect", "F#", "History", "H#", "DDI", "Move"
    ));
    for r in records {
        s.push_str(&format!(
            "{:>4}  {:<22} {:>7.1} {:>3} {:>9.1} {:>3} {:>8.1} {:>3} {:>7.1} {:>5}\n",
            r.rank,
            short_name(&r.team, abbreviations),
            r.power_component,
            r.power_rank,
            r.prospect_component,
            r.prospect_rank,
            r.historical_component,
            r.historical_rank,
            r.composite,
            movement_cell(movement, &r.team),
        ));
    }
    s
}

pub fn prospect_table(
    records: &[ProspectScoreRecord],
    abbreviations: &BTreeMap<String, String>,
) -> String {
    let mut s = String::new();
    s.push_str(&format!(
        "{:>4}  {:<22} {:>7} {:>7} {:>8}\n",
        "Rank", "Team", "Total", "Avg", "Matched"
    ));
    for r in records {
        s.push_str(&format!(
            "{:>4}  {:<22} {:>7.1} {:>7.1} {:>8}\n",
            r.rank,
            short_name(&r.team, abbreviations),
            r.total_score,
            r.avg_score,
            r.matched,
        ));
    }
    s
}

/// Historical blended scores, best team first.
pub fn historical_table(
    historical: &BTreeMap<String, f64>,
    abbreviations: &BTreeMap<String, String>,
) -> String {
    let mut rows: Vec<(&String, &f64)> = historical.iter().collect();
    rows.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut s = String::new();
    s.push_str(&format!("      {:<22} {:>7}\n", "Team", "Score"));
    for (team, score) in rows {
        s.push_str(&format!(
            "      {:<22} {:>7.1}\n",
            short_name(team, abbreviations),
            score,
        ));
    }
    s
}

pub fn projected_table(
    records: &[ProjectedTeamRecord],
    abbreviations: &BTreeMap<String, String>,
) -> String {
    let mut s = String::new();
    s.push_str(&format!(
        "{:>4}  {:<22} {:>8} {:>9} {:>8} {:>8}\n",
        "Rank", "Team", "Hitting", "Pitching", "Total", "Matched"
    ));
    for r in records {
        s.push_str(&format!(
            "{:>4}  {:<22} {:>8.1} {:>9.1} {:>8.1} {:>8}\n",
            r.rank,
            short_name(&r.team, abbreviations),
            r.hitter_points,
            r.pitcher_points,
            r.total_points,
            r.matched,
        ));
    }
    s
}

/// MVP standings capped at `rows`. Component columns are the 0-1 factor
/// scores; the MVP column is the weighted composite on a 0-100 scale.
pub fn mvp_table(
    records: &[PlayerMvpRecord],
    abbreviations: &BTreeMap<String, String>,
    rows: usize,
) -> String {
    let mut s = String::new();
    s.push_str(&format!(
        "{:>4}  {:<22} {:<5} {:>5} {:>5} {:>5} {:>5} {:>5} {:>6}\n",
        "Rank", "Player", "Team", "FPts", "Cost", "Age", "Deal", "Pos", "MVP"
    ));
    for r in records.iter().take(rows) {
        s.push_str(&format!(
            "{:>4}  {:<22} {:<5} {:>5.2} {:>5.2} {:>5.2} {:>5.2} {:>5.2} {:>6.1}\n",
            r.rank,
            r.player,
            short_name(&r.team, abbreviations),
            r.fantasy_points_score,
            r.salary_score,
            r.age_score,
            r.contract_score,
            r.position_score,
            r.composite * 100.0,
        ));
    }
    s
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn section(title: &str) -> String {
    format!("\n{:=<64}\n", format!("== {title} "))
}

fn short_name(team: &str, abbreviations: &BTreeMap<String, String>) -> String {
    abbreviations.get(team).cloned().unwrap_or_else(|| team.to_string())
}

/// Movement marker for one team. An empty movement map means there was no
/// prior snapshot, so every cell is blank; with history, a team missing
/// from the previous snapshot shows as "new".
fn movement_cell(movement: &BTreeMap<String, i64>, team: &str) -> String {
    if movement.is_empty() {
        return String::new();
    }
    match movement.get(team) {
        Some(delta) if *delta > 0 => format!("+{delta}"),
        Some(delta) => delta.to_string(),
        None => "new".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

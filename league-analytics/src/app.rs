// Pipeline orchestration.
//
// Loads every input table up front, runs the scorers in dependency order
// (power feeds DDI, history and prospects feed DDI, MVP and projections run
// on their own), reads movement against stored history, and only then
// appends the run's snapshots. All intermediate results travel as explicit
// values; nothing is stashed in shared state between stages.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::data::normalize::TeamStatRecord;
use crate::data::projections::{
    load_hitter_projections, load_pitcher_projections, HitterProjection, PitcherProjection,
};
use crate::data::prospects::{load_prospects, ProspectRanking};
use crate::data::rosters::{load_rosters, RosterSlot};
use crate::data::seasons::{load_history, HistoricalSeasonRecord};
use crate::data::standings::{load_standings, load_weekly_results, WeeklyResult};
use crate::data::IngestError;
use crate::db::{Database, DDI_STREAM, POWER_STREAM};
use crate::scoring::ddi::{compute_ddi, DdiRecord, DdiWeights};
use crate::scoring::history::compute_historical_scores;
use crate::scoring::movement::movement_against_history;
use crate::scoring::mvp::{compute_mvp_scores, MvpWeights, PlayerMvpRecord};
use crate::scoring::power::{compute_power_scores, PowerOptions, PowerScoreRecord};
use crate::scoring::projected::{compute_projected_rankings, ProjectedTeamRecord};
use crate::scoring::prospect::{compute_prospect_scores, ProspectScoreRecord};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Everything a ranking run reads, loaded before any scorer fires.
#[derive(Debug, Default)]
pub struct ScoringInputs {
    pub standings: Vec<TeamStatRecord>,
    pub weekly: Vec<WeeklyResult>,
    pub rosters: Vec<RosterSlot>,
    pub prospects: Vec<ProspectRanking>,
    pub history: Vec<HistoricalSeasonRecord>,
    pub hitter_projections: Vec<HitterProjection>,
    pub pitcher_projections: Vec<PitcherProjection>,
}

/// Load a CSV that the pipeline can live without. A missing file logs a
/// warning and yields an empty table; a malformed one is still an error.
fn load_optional<T>(
    path: &str,
    what: &str,
    loader: impl FnOnce(&Path) -> Result<Vec<T>, IngestError>,
) -> Result<Vec<T>> {
    let p = Path::new(path);
    if !p.exists() {
        warn!("No {} file at {}; scorers that need it degrade", what, path);
        return Ok(Vec::new());
    }
    let rows = loader(p).with_context(|| format!("failed to load {what} from {path}"))?;
    info!("Loaded {} {} rows from {}", rows.len(), what, path);
    Ok(rows)
}

/// Load all input tables named in the config. Standings are required (no
/// power table means no run); everything else degrades to empty.
pub fn load_inputs(config: &Config) -> Result<ScoringInputs> {
    let standings_path = Path::new(&config.data_paths.standings);
    let standings = load_standings(standings_path, &config.league)
        .with_context(|| format!("failed to load standings from {}", config.data_paths.standings))?;
    info!("Loaded standings for {} teams", standings.len());
    if standings.len() as u32 != config.league.num_teams {
        warn!(
            "Standings list {} teams but league.num_teams is {}",
            standings.len(),
            config.league.num_teams
        );
    }

    let weekly = load_optional(&config.data_paths.weekly_results, "weekly results", |p| {
        load_weekly_results(p, &config.league)
    })?;
    let rosters = load_optional(&config.data_paths.rosters, "roster", |p| {
        load_rosters(p, &config.league)
    })?;
    let prospects = load_optional(&config.data_paths.prospects, "prospect", load_prospects)?;
    let hitter_projections = load_optional(
        &config.data_paths.hitter_projections,
        "hitter projection",
        load_hitter_projections,
    )?;
    let pitcher_projections = load_optional(
        &config.data_paths.pitcher_projections,
        "pitcher projection",
        load_pitcher_projections,
    )?;

    let history_dir = Path::new(&config.data_paths.history_dir);
    let history = if history_dir.exists() {
        let rows = load_history(history_dir, &config.league).with_context(|| {
            format!("failed to load history from {}", config.data_paths.history_dir)
        })?;
        info!("Loaded {} historical season rows", rows.len());
        rows
    } else {
        warn!(
            "No history directory at {}; historical scores read 0",
            config.data_paths.history_dir
        );
        Vec::new()
    };

    Ok(ScoringInputs {
        standings,
        weekly,
        rosters,
        prospects,
        history,
        hitter_projections,
        pitcher_projections,
    })
}

// ---------------------------------------------------------------------------
// The run
// ---------------------------------------------------------------------------

/// The complete output of one ranking run.
#[derive(Debug, Serialize)]
pub struct RankingsRun {
    pub as_of: NaiveDate,
    pub power: Vec<PowerScoreRecord>,
    pub power_movement: BTreeMap<String, i64>,
    pub ddi: Vec<DdiRecord>,
    pub ddi_movement: BTreeMap<String, i64>,
    pub prospects: Vec<ProspectScoreRecord>,
    pub historical: BTreeMap<String, f64>,
    pub mvp: Vec<PlayerMvpRecord>,
    pub projected: Vec<ProjectedTeamRecord>,
}

/// Run every scorer over the loaded inputs and append the run's snapshots.
///
/// Movement is read before the snapshots are written, so a same-day re-run
/// compares against the previous date rather than itself.
pub fn run_rankings(config: &Config, inputs: &ScoringInputs, db: &Database) -> Result<RankingsRun> {
    let as_of = config
        .as_of_date()
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    info!("Ranking run dated {}", as_of);

    let options = PowerOptions {
        recent_window_weeks: config.scoring.power.recent_window_weeks,
        include_schedule_strength: config.scoring.power.include_schedule_strength,
    };
    let power = compute_power_scores(&inputs.standings, &inputs.weekly, &options)
        .context("power scoring failed")?;
    let power_ranking: Vec<(String, u32)> =
        power.iter().map(|r| (r.team.clone(), r.rank)).collect();
    let power_movement = movement_against_history(db, POWER_STREAM, as_of, &power_ranking)
        .context("failed to read power movement")?;

    let teams: Vec<String> = inputs.standings.iter().map(|t| t.team.clone()).collect();
    let historical = compute_historical_scores(&teams, &inputs.history, &config.year_weights());

    let prospects = compute_prospect_scores(&inputs.rosters, &inputs.prospects);

    let ddi_weights = DdiWeights {
        power: config.scoring.ddi.power,
        prospect: config.scoring.ddi.prospect,
        historical: config.scoring.ddi.historical,
    };
    let ddi = compute_ddi(&power, &prospects, &historical, &ddi_weights)
        .context("DDI scoring failed")?;
    let ddi_ranking: Vec<(String, u32)> = ddi.iter().map(|r| (r.team.clone(), r.rank)).collect();
    let ddi_movement = movement_against_history(db, DDI_STREAM, as_of, &ddi_ranking)
        .context("failed to read DDI movement")?;

    let mvp_weights = MvpWeights {
        fantasy_points: config.scoring.mvp.fantasy_points,
        salary: config.scoring.mvp.salary,
        age: config.scoring.mvp.age,
        contract: config.scoring.mvp.contract,
        position: config.scoring.mvp.position,
    };
    let mvp = compute_mvp_scores(&inputs.rosters, &mvp_weights);

    let projected = compute_projected_rankings(
        &inputs.rosters,
        &inputs.hitter_projections,
        &inputs.pitcher_projections,
    );

    db.record_snapshot(POWER_STREAM, as_of, &power_ranking)
        .context("failed to record power snapshot")?;
    db.record_snapshot(DDI_STREAM, as_of, &ddi_ranking)
        .context("failed to record DDI snapshot")?;
    info!("Snapshots recorded for {}", as_of);

    Ok(RankingsRun {
        as_of,
        power,
        power_movement,
        ddi,
        ddi_movement,
        prospects,
        historical,
        mvp,
        projected,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        DataPaths, DdiWeightsConfig, LeagueConfig, MvpWeightsConfig, PowerSettings, ReportConfig,
        ScoringConfig,
    };

    fn team(name: &str, wins: u32, losses: u32, fpts: f64, weeks: u32) -> TeamStatRecord {
        let games = (wins + losses) as f64;
        TeamStatRecord {
            team: name.to_string(),
            wins,
            losses,
            ties: 0,
            win_pct: if games > 0.0 { wins as f64 / games } else { 0.0 },
            fantasy_points: fpts,
            weeks_played: weeks,
        }
    }

    fn config_dated(as_of: &str) -> Config {
        Config {
            league: LeagueConfig {
                name: "Test League".to_string(),
                season: 2025,
                num_teams: 2,
                points_per_win: 100.0,
                abbreviations: BTreeMap::new(),
                aliases: Vec::new(),
                overrides: Vec::new(),
            },
            scoring: ScoringConfig {
                power: PowerSettings {
                    recent_window_weeks: 3,
                    include_schedule_strength: false,
                },
                ddi: DdiWeightsConfig {
                    power: 0.45,
                    prospect: 0.30,
                    historical: 0.25,
                },
                history_weights: BTreeMap::from([("2024".to_string(), 1.0)]),
                mvp: MvpWeightsConfig {
                    fantasy_points: 0.50,
                    salary: 0.20,
                    age: 0.10,
                    contract: 0.10,
                    position: 0.10,
                },
                as_of: Some(as_of.to_string()),
            },
            db_path: ":memory:".to_string(),
            data_paths: DataPaths {
                standings: "unused".to_string(),
                weekly_results: "unused".to_string(),
                rosters: "unused".to_string(),
                prospects: "unused".to_string(),
                history_dir: "unused".to_string(),
                hitter_projections: "unused".to_string(),
                pitcher_projections: "unused".to_string(),
            },
            report: ReportConfig {
                mvp_rows: 20,
                json_path: None,
            },
        }
    }

    fn two_team_inputs() -> ScoringInputs {
        ScoringInputs {
            standings: vec![
                team("Alpha", 10, 5, 150.0, 5),
                team("Beta", 5, 10, 90.0, 5),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn first_run_records_snapshots_without_movement() {
        let config = config_dated("2025-08-20");
        let db = Database::open(":memory:").unwrap();

        let run = run_rankings(&config, &two_team_inputs(), &db).unwrap();

        assert_eq!(run.as_of, NaiveDate::from_ymd_opt(2025, 8, 20).unwrap());
        assert_eq!(run.power.len(), 2);
        assert_eq!(run.power[0].team, "Alpha");
        assert!(run.power_movement.is_empty());
        assert_eq!(run.ddi.len(), 2);
        assert!(run.ddi_movement.is_empty());

        let dates = db.snapshot_dates(POWER_STREAM).unwrap();
        assert_eq!(dates, vec![NaiveDate::from_ymd_opt(2025, 8, 20).unwrap()]);
        let dates = db.snapshot_dates(DDI_STREAM).unwrap();
        assert_eq!(dates, vec![NaiveDate::from_ymd_opt(2025, 8, 20).unwrap()]);
    }

    #[test]
    fn later_run_reports_movement_against_the_stored_snapshot() {
        let db = Database::open(":memory:").unwrap();

        let first = config_dated("2025-08-20");
        run_rankings(&first, &two_team_inputs(), &db).unwrap();

        // A week later the standings have flipped.
        let second = config_dated("2025-08-27");
        let flipped = ScoringInputs {
            standings: vec![
                team("Alpha", 10, 12, 150.0, 7),
                team("Beta", 12, 10, 260.0, 7),
            ],
            ..Default::default()
        };
        let run = run_rankings(&second, &flipped, &db).unwrap();

        assert_eq!(run.power[0].team, "Beta");
        assert_eq!(run.power_movement.get("Beta"), Some(&1));
        assert_eq!(run.power_movement.get("Alpha"), Some(&-1));
    }

    #[test]
    fn rerun_on_the_same_day_still_ignores_itself() {
        let db = Database::open(":memory:").unwrap();
        let config = config_dated("2025-08-20");

        run_rankings(&config, &two_team_inputs(), &db).unwrap();
        let again = run_rankings(&config, &two_team_inputs(), &db).unwrap();

        // The only stored snapshot carries today's date, which movement
        // comparison must skip.
        assert!(again.power_movement.is_empty());
    }

    #[test]
    fn empty_standings_fail_the_run() {
        let db = Database::open(":memory:").unwrap();
        let config = config_dated("2025-08-20");
        let inputs = ScoringInputs::default();

        assert!(run_rankings(&config, &inputs, &db).is_err());
    }
}

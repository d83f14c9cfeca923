// Configuration loading and parsing (league.toml, scoring.toml).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::data::names::FranchiseAlias;
use crate::data::normalize::StatOverride;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub scoring: ScoringConfig,
    pub db_path: String,
    pub data_paths: DataPaths,
    pub report: ReportConfig,
}

impl Config {
    /// History weights with the TOML string keys parsed into season years.
    /// Validation has already rejected non-year keys.
    pub fn year_weights(&self) -> BTreeMap<i32, f64> {
        self.scoring
            .history_weights
            .iter()
            .filter_map(|(year, weight)| year.trim().parse::<i32>().ok().map(|y| (y, *weight)))
            .collect()
    }

    /// The pinned run date from `[run]`, when one is set.
    pub fn as_of_date(&self) -> Option<NaiveDate> {
        self.scoring
            .as_of
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
    }
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    /// The season being ranked; alias windows are resolved against it.
    pub season: i32,
    pub num_teams: u32,
    /// Fallback used when a standings export carries no scoring total.
    #[serde(default = "default_points_per_win")]
    pub points_per_win: f64,
    /// Short team codes used in the report tables.
    #[serde(default)]
    pub abbreviations: BTreeMap<String, String>,
    /// Franchise renames/relocations, each optionally bounded to a season
    /// window.
    #[serde(default)]
    pub aliases: Vec<FranchiseAlias>,
    /// Manual stat corrections applied ahead of every source column.
    #[serde(default)]
    pub overrides: Vec<StatOverride>,
}

fn default_points_per_win() -> f64 {
    100.0
}

// ---------------------------------------------------------------------------
// scoring.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire scoring.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ScoringFile {
    power: PowerSettings,
    ddi_weights: DdiWeightsConfig,
    history_weights: BTreeMap<String, f64>,
    mvp_weights: MvpWeightsConfig,
    #[serde(default)]
    run: RunSection,
    database: DatabaseSection,
    data_paths: DataPaths,
    report: ReportConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RunSection {
    #[serde(default)]
    as_of: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    path: String,
}

/// The public scoring config assembled from the scoring.toml sections.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub power: PowerSettings,
    pub ddi: DdiWeightsConfig,
    /// Season year (string-keyed as written in TOML) to recency weight.
    pub history_weights: BTreeMap<String, f64>,
    pub mvp: MvpWeightsConfig,
    /// Overrides "today" for snapshot recording and movement comparison.
    pub as_of: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PowerSettings {
    pub recent_window_weeks: usize,
    #[serde(default)]
    pub include_schedule_strength: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DdiWeightsConfig {
    pub power: f64,
    pub prospect: f64,
    pub historical: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MvpWeightsConfig {
    pub fantasy_points: f64,
    pub salary: f64,
    pub age: f64,
    pub contract: f64,
    pub position: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub standings: String,
    pub weekly_results: String,
    pub rosters: String,
    pub prospects: String,
    pub history_dir: String,
    pub hitter_projections: String,
    pub pitcher_projections: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// How many players the MVP table prints.
    #[serde(default = "default_mvp_rows")]
    pub mvp_rows: usize,
    /// When set, the full run is also exported as JSON to this path.
    #[serde(default)]
    pub json_path: Option<String>,
}

fn default_mvp_rows() -> usize {
    20
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/scoring.toml`, both relative to the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- league.toml (required) ---
    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;
    let league = league_file.league;

    // --- scoring.toml (required) ---
    let scoring_path = config_dir.join("scoring.toml");
    let scoring_text = read_file(&scoring_path)?;
    let scoring_file: ScoringFile =
        toml::from_str(&scoring_text).map_err(|e| ConfigError::ParseError {
            path: scoring_path.clone(),
            source: e,
        })?;

    let scoring = ScoringConfig {
        power: scoring_file.power,
        ddi: scoring_file.ddi_weights,
        history_weights: scoring_file.history_weights,
        mvp: scoring_file.mvp_weights,
        as_of: scoring_file.run.as_of,
    };

    let config = Config {
        league,
        scoring,
        db_path: scoring_file.database.path,
        data_paths: scoring_file.data_paths,
        report: scoring_file.report,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        // With no defaults to copy, a missing config/ cannot be repaired.
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };

        // .example templates stay where they are.
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }

        let target = config_dir.join(file_name);
        if copy_if_absent(&path, &target)? {
            copied.push(target);
        }
    }

    Ok(copied)
}

/// Copy `source` to `target` unless `target` already exists. Uses
/// `create_new` so an existing user-edited file is never touched.
fn copy_if_absent(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(mut dest) => {
            let content = std::fs::read(source).map_err(|e| ConfigError::DefaultsCopyError {
                message: format!("failed to read {}: {e}", source.display()),
            })?;
            std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                ConfigError::DefaultsCopyError {
                    message: format!("failed to write {}: {e}", target.display()),
                }
            })?;
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", target.display()),
        }),
    }
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Stat fields a manual override may target.
const OVERRIDE_FIELDS: &[&str] = &["wins", "losses", "ties", "fpts", "weeks"];

fn validate(config: &Config) -> Result<(), ConfigError> {
    // League validations
    if config.league.num_teams == 0 {
        return Err(ConfigError::ValidationError {
            field: "league.num_teams".into(),
            message: "must be greater than 0".into(),
        });
    }

    let ppw = config.league.points_per_win;
    if ppw <= 0.0 {
        return Err(ConfigError::ValidationError {
            field: "league.points_per_win".into(),
            message: format!("must be > 0, got {ppw}"),
        });
    }

    for alias in &config.league.aliases {
        if let (Some(from), Some(to)) = (alias.from_season, alias.to_season) {
            if from > to {
                return Err(ConfigError::ValidationError {
                    field: "league.aliases".into(),
                    message: format!(
                        "alias `{}` has from_season {from} after to_season {to}",
                        alias.alias
                    ),
                });
            }
        }
    }

    for over in &config.league.overrides {
        if !OVERRIDE_FIELDS.contains(&over.field.as_str()) {
            return Err(ConfigError::ValidationError {
                field: "league.overrides".into(),
                message: format!(
                    "unknown stat field `{}` for team `{}`; expected one of {:?}",
                    over.field, over.team, OVERRIDE_FIELDS
                ),
            });
        }
    }

    // Power validations
    if config.scoring.power.recent_window_weeks == 0 {
        return Err(ConfigError::ValidationError {
            field: "power.recent_window_weeks".into(),
            message: "must be > 0".into(),
        });
    }

    // DDI weights must be non-negative and sum to 1
    let ddi = &config.scoring.ddi;
    let ddi_fields: &[(&str, f64)] = &[
        ("ddi_weights.power", ddi.power),
        ("ddi_weights.prospect", ddi.prospect),
        ("ddi_weights.historical", ddi.historical),
    ];
    for (name, val) in ddi_fields {
        if *val < 0.0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be >= 0, got {val}"),
            });
        }
    }
    let ddi_sum = ddi.power + ddi.prospect + ddi.historical;
    if (ddi_sum - 1.0).abs() > 1e-6 {
        return Err(ConfigError::ValidationError {
            field: "ddi_weights".into(),
            message: format!("must sum to 1.0, got {ddi_sum}"),
        });
    }

    // History weights: year-keyed, non-negative, summing to 1
    if config.scoring.history_weights.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "history_weights".into(),
            message: "at least one season weight is required".into(),
        });
    }
    let mut history_sum = 0.0;
    for (year, weight) in &config.scoring.history_weights {
        if year.trim().parse::<i32>().is_err() {
            return Err(ConfigError::ValidationError {
                field: "history_weights".into(),
                message: format!("season key `{year}` is not a year"),
            });
        }
        if *weight < 0.0 {
            return Err(ConfigError::ValidationError {
                field: "history_weights".into(),
                message: format!("weight for {year} must be >= 0, got {weight}"),
            });
        }
        history_sum += *weight;
    }
    if (history_sum - 1.0).abs() > 1e-6 {
        return Err(ConfigError::ValidationError {
            field: "history_weights".into(),
            message: format!("must sum to 1.0, got {history_sum}"),
        });
    }

    // MVP weights: non-negative with a positive sum (the scorer renormalizes)
    let mvp = &config.scoring.mvp;
    let mvp_fields: &[(&str, f64)] = &[
        ("mvp_weights.fantasy_points", mvp.fantasy_points),
        ("mvp_weights.salary", mvp.salary),
        ("mvp_weights.age", mvp.age),
        ("mvp_weights.contract", mvp.contract),
        ("mvp_weights.position", mvp.position),
    ];
    for (name, val) in mvp_fields {
        if *val < 0.0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be >= 0, got {val}"),
            });
        }
    }
    let mvp_sum: f64 = mvp_fields.iter().map(|(_, v)| v).sum();
    if mvp_sum <= 0.0 {
        return Err(ConfigError::ValidationError {
            field: "mvp_weights".into(),
            message: "must sum to a positive value".into(),
        });
    }

    // Run validations
    if let Some(raw) = &config.scoring.as_of {
        if NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_err() {
            return Err(ConfigError::ValidationError {
                field: "run.as_of".into(),
                message: format!("expected YYYY-MM-DD, got `{raw}`"),
            });
        }
    }

    // Report validations
    if config.report.mvp_rows == 0 {
        return Err(ConfigError::ValidationError {
            field: "report.mvp_rows".into(),
            message: "must be > 0".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

// League analytics entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not the terminal report)
// 2. Load config
// 3. Open database
// 4. Load season data files
// 5. Run the scorers and record rank snapshots
// 6. Print the report
// 7. Export JSON when configured

use league_analytics::app;
use league_analytics::config;
use league_analytics::db;
use league_analytics::report;

use anyhow::Context;
use tracing::info;

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not the terminal report)
    init_tracing()?;
    info!("League analytics starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, season {}, {} teams",
        config.league.name, config.league.season, config.league.num_teams
    );

    // 3. Open database
    let db = db::Database::open(&config.db_path).context("failed to open database")?;
    info!("Database opened at {}", config.db_path);

    // 4. Load season data files
    let inputs = app::load_inputs(&config).context("failed to load season data")?;
    info!(
        "Loaded {} standings rows, {} weekly results, {} roster slots, {} prospects",
        inputs.standings.len(),
        inputs.weekly.len(),
        inputs.rosters.len(),
        inputs.prospects.len()
    );

    // 5. Run the scorers and record rank snapshots
    let run = app::run_rankings(&config, &inputs, &db).context("scoring run failed")?;
    info!("Scored {} teams as of {}", run.power.len(), run.as_of);

    // 6. Print the report
    print!(
        "{}",
        report::render_run(&run, &config.league, config.report.mvp_rows)
    );

    // 7. Export JSON when configured
    if let Some(path) = &config.report.json_path {
        report::export_json(&run, path).context("failed to export JSON report")?;
        info!("Report exported to {}", path);
    }

    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by the report).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("league-analytics.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("league_analytics=info,dugout=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

// Scoring engines: power, prospects, history, DDI, MVP, projections.

pub mod ddi;
pub mod history;
pub mod modifiers;
pub mod movement;
pub mod mvp;
pub mod power;
pub mod projected;
pub mod prospect;

/// Malformed invocation of a ranking computation. Missing or degenerate
/// data degrades to documented defaults instead of raising one of these.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("cannot rank an empty team list")]
    EmptyTeams,
}

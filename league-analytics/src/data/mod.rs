// Data ingest and normalization.
//
// Loaders are deliberately forgiving: a malformed row is logged and skipped,
// never fatal. The one hard failure is a standings file that yields zero
// teams, since nothing downstream can rank an empty league.

pub mod names;
pub mod normalize;
pub mod projections;
pub mod prospects;
pub mod rosters;
pub mod seasons;
pub mod standings;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("{path} contained no usable rows")]
    Empty { path: String },
}

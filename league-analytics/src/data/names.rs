// Player and franchise name canonicalization.
//
// Every cross-source join in the engine (prospects onto rosters, rosters onto
// projections, history onto current standings) goes through these functions,
// so the rules here are the single source of truth for "same player" and
// "same franchise".

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Player names
// ---------------------------------------------------------------------------

/// Fold one accented Latin character to its ASCII base letter. Input is
/// already lowercased, so only lowercase forms appear here.
fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ø' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

/// Canonical comparison form of a player name.
///
/// Lowercases, folds accents, drops parenthetical and " - " annotations,
/// flips "Last, First" ordering, strips periods and apostrophes, and
/// collapses whitespace runs. Idempotent: normalizing an already canonical
/// name returns it unchanged.
pub fn normalize_player_name(name: &str) -> String {
    let lowered: String = name.trim().to_lowercase().chars().map(fold_accent).collect();

    // Suffixes like "(CIN)" or " - Day-to-Day" are annotations, not name parts.
    let base = match lowered.split_once('(') {
        Some((head, _)) => head,
        None => lowered.as_str(),
    };
    let base = match base.split_once(" - ") {
        Some((head, _)) => head,
        None => base,
    };

    // "Last, First" ordering comes from export tools; flip it back.
    let reordered = match base.split_once(',') {
        Some((last, first)) => format!("{} {}", first.trim(), last.trim()),
        None => base.trim().to_string(),
    };

    let stripped: String = reordered
        .chars()
        .filter(|c| !matches!(c, '.' | '\'' | '’'))
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Franchise aliases
// ---------------------------------------------------------------------------

/// One franchise rename: `alias` resolves to `canonical` for seasons inside
/// the optional `[from_season, to_season]` window (open ends when absent).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FranchiseAlias {
    pub canonical: String,
    pub alias: String,
    #[serde(default)]
    pub from_season: Option<i32>,
    #[serde(default)]
    pub to_season: Option<i32>,
}

impl FranchiseAlias {
    fn covers(&self, season: i32) -> bool {
        self.from_season.map_or(true, |lo| season >= lo)
            && self.to_season.map_or(true, |hi| season <= hi)
    }
}

/// Comparison form for franchise labels: lowercase, accent-folded, periods
/// dropped, whitespace collapsed. Franchise labels never carry "Last, First"
/// ordering, so this is gentler than player-name folding.
pub fn fold_franchise(name: &str) -> String {
    let folded: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(fold_accent)
        .filter(|c| *c != '.')
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve a team label to its canonical franchise name for a given season.
/// Labels with no matching alias pass through trimmed but otherwise intact.
pub fn canonical_franchise(aliases: &[FranchiseAlias], name: &str, season: i32) -> String {
    let folded = fold_franchise(name);
    for entry in aliases {
        if entry.covers(season) && fold_franchise(&entry.alias) == folded {
            return entry.canonical.clone();
        }
    }
    name.trim().to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use super::ScoredManifest;
use crate::error::SelectError;
use crate::manifest::Grade;
use std::cmp::Reverse;

/// Pick the engine to activate automatically.
///
/// Only compatible `stable` engines are eligible. The highest score wins and
/// ties keep their input order. `devel` engines are never returned, whatever
/// their score.
pub fn top_engine(scored: &[ScoredManifest]) -> Result<&ScoredManifest, SelectError> {
    let mut eligible: Vec<&ScoredManifest> = scored
        .iter()
        .filter(|engine| engine.score() > 0 && engine.grade() == Grade::Stable)
        .collect();
    eligible.sort_by_key(|engine| Reverse(engine.score()));
    eligible
        .into_iter()
        .next()
        .ok_or(SelectError::NoCompatibleEngine)
}

/// Order for listing engines to people: score descending, and at equal
/// score `stable` before `devel`. Not used for selection.
pub fn display_order(scored: &[ScoredManifest]) -> Vec<&ScoredManifest> {
    let mut ordered: Vec<&ScoredManifest> = scored.iter().collect();
    ordered.sort_by_key(|engine| (Reverse(engine.score()), engine.grade() != Grade::Stable));
    ordered
}

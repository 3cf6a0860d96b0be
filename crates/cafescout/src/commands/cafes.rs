use crate::backend::Backend;
use crate::commands::{pluralize_cafes, CmdMessage, CmdResult};
use crate::discovery::{compute_visible, DiscoveryEngine, FilterConfig};
use crate::error::Result;
use crate::model::CafeId;
use std::collections::BTreeMap;
use tracing::debug;

/// One-shot listing: fetch everything, filter once. Fetch errors propagate.
pub fn list<B: Backend>(backend: &B, search: &str, filters: &FilterConfig) -> Result<CmdResult> {
    let all = backend.fetch_cafes()?;
    let filters = filters.clone().normalized();
    let visible = compute_visible(&all, search, &filters);
    debug!(visible = visible.len(), total = all.len(), "listed cafés");
    let message = showing_message(visible.len(), all.len());
    Ok(CmdResult::default()
        .with_listed_cafes(visible)
        .with_message(message))
}

/// Trending cafés with their review counts. A café whose reviews cannot be
/// fetched counts as 0.
pub fn trending<B: Backend>(backend: &B) -> Result<CmdResult> {
    let cafes = backend.fetch_trending()?;
    let counts: BTreeMap<CafeId, u64> = cafes
        .iter()
        .map(|cafe| {
            let count = match backend.fetch_reviews(cafe.cafe_id) {
                Ok(reviews) => reviews.review_count,
                Err(e) => {
                    debug!(cafe_id = cafe.cafe_id, error = %e, "review count unavailable");
                    0
                }
            };
            (cafe.cafe_id, count)
        })
        .collect();
    let mut result = CmdResult::default();
    if cafes.is_empty() {
        result.add_message(CmdMessage::info("No trending cafés yet"));
    }
    Ok(result.with_listed_cafes(cafes).with_review_counts(counts))
}

/// A café with its reviews.
pub fn view<B: Backend>(backend: &B, id: CafeId) -> Result<CmdResult> {
    let cafe = backend.fetch_cafe(id)?;
    let reviews = backend.fetch_reviews(id)?;
    let mut result = CmdResult::default().with_cafe(cafe);
    if reviews.reviews.is_empty() {
        result.add_message(CmdMessage::info("No reviews yet"));
    }
    Ok(result.with_reviews(reviews))
}

/// Refetches the café set into `engine`.
///
/// A failed fetch is not an error here: the engine keeps its previous visible
/// set and the result carries a warning instead.
pub fn refresh<B: Backend>(backend: &B, engine: &mut DiscoveryEngine) -> CmdResult {
    match backend.fetch_cafes() {
        Ok(cafes) => {
            engine.replace_cafes(cafes);
            CmdResult::default()
                .with_listed_cafes(engine.visible().to_vec())
                .with_message(showing_message(engine.visible().len(), engine.all().len()))
        }
        Err(e) => {
            engine.record_fetch_failure(&e);
            CmdResult::default()
                .with_listed_cafes(engine.visible().to_vec())
                .with_message(CmdMessage::warning(format!(
                    "Could not refresh cafés ({}). Showing previous results.",
                    e
                )))
        }
    }
}

fn showing_message(visible: usize, total: usize) -> CmdMessage {
    CmdMessage::info(format!("Showing {} of {}", visible, pluralize_cafes(total)))
}

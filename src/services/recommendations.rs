use std::collections::{BTreeMap, HashMap};

use tracing::instrument;

use crate::{
    db::CatalogStore,
    error::AppResult,
    models::{DestinationTag, Profile, Recommendation, Tag, TagName},
};

/// Number of recommendations when the caller does not choose
pub const DEFAULT_TOP_N: usize = 3;

/// Ranks destinations against a tag profile
///
/// Scores are the exact integer inner product of the profile weights and the
/// curated `destination_tag.score` values. Ranking is by score descending,
/// ties going to the lower destination id.
///
/// Gaps in the data never fail the request: profile tags missing from the tag
/// table are dropped, and winning destinations that no longer exist (or are
/// soft-deleted) are skipped, so the result may hold fewer than `top_n`
/// entries or none at all. Only storage failures are returned as errors.
#[instrument(skip(profile, store))]
pub async fn run_recommendation(
    profile: &Profile,
    store: &dyn CatalogStore,
    top_n: usize,
) -> AppResult<Vec<Recommendation>> {
    if top_n == 0 || profile.is_empty() {
        return Ok(Vec::new());
    }

    // 1. Resolve profile tags to persisted tag ids
    let names: Vec<String> = profile
        .active_tags()
        .map(|(tag, _)| tag.as_str().to_string())
        .collect();
    let tags = store.tags_by_names(&names).await?;
    let weights = tag_weights(profile, &tags);

    if weights.is_empty() {
        tracing::debug!(profile_tags = names.len(), "No profile tags matched the catalog");
        return Ok(Vec::new());
    }

    // 2. Fetch the destination links for those tags
    let mut tag_ids: Vec<i32> = weights.keys().copied().collect();
    tag_ids.sort_unstable();
    let rows = store.destination_tags_by_tag_ids(&tag_ids).await?;

    // 3-4. Accumulate and rank
    let totals = accumulate_scores(&weights, &rows);
    let ranked = rank(totals, top_n);

    tracing::debug!(
        matched_tags = tag_ids.len(),
        links = rows.len(),
        ranked = ranked.len(),
        "Scored destinations"
    );

    // 5-6. Resolve display data, skipping destinations that have gone away
    let mut recommendations = Vec::with_capacity(ranked.len());
    for (destination_id, score) in ranked {
        match store.destination_by_id(destination_id).await? {
            Some(destination) => recommendations.push(Recommendation {
                name: destination.name,
                description: destination.description,
                country: destination.country,
                latitude: destination.latitude,
                longitude: destination.longitude,
                score,
            }),
            None => {
                tracing::warn!(destination_id, "Skipping missing destination");
            }
        }
    }

    Ok(recommendations)
}

/// Maps each persisted tag id to the profile weight of its name
///
/// Rows whose name is not a valid tag name, or whose profile weight is zero,
/// are left out.
fn tag_weights(profile: &Profile, tags: &[Tag]) -> HashMap<i32, i64> {
    tags.iter()
        .filter_map(|tag| {
            let name = TagName::new(tag.name.as_str()).ok()?;
            let weight = profile.weight(&name);
            (weight != 0).then_some((tag.id, weight))
        })
        .collect()
}

/// Sums `row.score * weight(row.tag_id)` per destination
///
/// Rows for tags without a weight contribute nothing. Duplicate rows for the
/// same destination and tag are summed.
fn accumulate_scores(weights: &HashMap<i32, i64>, rows: &[DestinationTag]) -> BTreeMap<i32, i64> {
    let mut totals = BTreeMap::new();
    for row in rows {
        let Some(weight) = weights.get(&row.tag_id) else {
            continue;
        };
        *totals.entry(row.destination_id).or_insert(0) += i64::from(row.score) * weight;
    }
    totals
}

/// Orders by score descending then destination id ascending, keeping `top_n`
fn rank(totals: BTreeMap<i32, i64>, top_n: usize) -> Vec<(i32, i64)> {
    let mut ranked: Vec<(i32, i64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(top_n);
    ranked
}

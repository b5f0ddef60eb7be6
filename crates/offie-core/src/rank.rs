//! Ordering of an aggregated shop collection.

use std::cmp::Ordering;

use feruca::Collator;

use crate::types::{Shop, SortKey};

/// Returns a new ordering of `shops` by `key`; the input is left untouched.
///
/// - [`SortKey::Distance`]: nearest first.
/// - [`SortKey::Rating`]: highest rating first, equal ratings farther first,
///   unrated shops after every rated one.
/// - [`SortKey::Name`]: case-insensitive ascending by Unicode collation, so
///   `Éclair` sorts with the `e`s rather than after `z`.
///
/// Every comparison falls back to `place_id`, so the result does not depend
/// on the input order and ranking a ranked collection is a no-op.
#[must_use]
pub fn rank(shops: &[Shop], key: SortKey) -> Vec<Shop> {
    let mut ranked = shops.to_vec();
    let mut collator = Collator::default();
    ranked.sort_by(|a, b| {
        compare(a, b, key, &mut collator).then_with(|| a.place_id.cmp(&b.place_id))
    });
    ranked
}

fn compare(a: &Shop, b: &Shop, key: SortKey, collator: &mut Collator) -> Ordering {
    match key {
        SortKey::Distance => a.distance_from_user.total_cmp(&b.distance_from_user),
        SortKey::Rating => by_rating(a, b),
        SortKey::Name => by_name(a, b, collator),
    }
}

fn by_rating(a: &Shop, b: &Shop) -> Ordering {
    let farther_first = || b.distance_from_user.total_cmp(&a.distance_from_user);
    match (a.rating, b.rating) {
        (Some(ra), Some(rb)) => rb.total_cmp(&ra).then_with(farther_first),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => farther_first(),
    }
}

/// Collates case-folded names, then the names as written so that `Spar`
/// and `spar` still have a fixed order.
fn by_name(a: &Shop, b: &Shop, collator: &mut Collator) -> Ordering {
    let (folded_a, folded_b) = (a.name.to_lowercase(), b.name.to_lowercase());
    collator
        .collate(folded_a.as_str(), folded_b.as_str())
        .then_with(|| collator.collate(a.name.as_str(), b.name.as_str()))
}

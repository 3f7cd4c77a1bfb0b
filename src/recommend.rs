/**
 * slopeone
 * Copyright (C) 2018 Sebastian Schelter
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

use serde_derive::Serialize;
use tracing::{debug, info};

use crate::diffs::DiffStorage;
use crate::error::{Error, Result};
use crate::model::{self, DataModel};
use crate::types::{ItemId, Preference, Rating, UserId};

/// An item recommended to a user, together with its estimated rating.
#[derive(PartialEq, Clone, Copy, Debug, Serialize)]
pub struct RecommendedItem {
    pub item: ItemId,
    pub value: Rating,
}

/// Values use the shortest representation which round-trips, e.g. `1.0` or `5.5`. Exponent
/// notation only kicks in for magnitudes below `1e-4` or from `1e16` on.
impl fmt::Display for RecommendedItem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "RecommendedItem[item:{}, value:{:?}]", self.item, self.value)
    }
}

/// The two queries the programs run against a recommender.
pub trait Recommender {

    /// At most `how_many` items the user has not rated yet, highest estimate first.
    fn recommend(&self, user: UserId, how_many: usize) -> Result<Vec<RecommendedItem>>;

    /// The estimated rating of `user` for `item`, `None` if no estimate can be computed.
    /// Fails with `NoSuchUser` or `NoSuchItem` for ids missing from the data model.
    fn estimate_preference(&self, user: UserId, item: ItemId) -> Result<Option<Rating>>;

    fn data_model(&self) -> &DataModel;
}

/// Result type used to find the top-k items per user via a binary heap. The ordering is
/// reversed so that the heap keeps the worst of the current top-k on top. Ties go to the
/// smaller item id.
#[derive(PartialEq, Debug)]
struct ScoredItem {
    item: ItemId,
    score: f64,
}

fn cmp_reverse(scored_item_a: &ScoredItem, scored_item_b: &ScoredItem) -> Ordering {
    match scored_item_a.score.partial_cmp(&scored_item_b.score) {
        Some(Ordering::Less) => Ordering::Greater,
        Some(Ordering::Greater) => Ordering::Less,
        _ => scored_item_a.item.cmp(&scored_item_b.item),
    }
}

impl Eq for ScoredItem {}

impl Ord for ScoredItem {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_reverse(self, other)
    }
}

impl PartialOrd for ScoredItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(cmp_reverse(self, other))
    }
}

fn top_k<I>(scored_items: I, k: usize) -> Vec<RecommendedItem>
    where I: Iterator<Item = ScoredItem> {

    if k == 0 {
        return Vec::new();
    }

    // k may be arbitrarily large, reserve no more than there are items to score
    let capacity = match scored_items.size_hint() {
        (_, Some(upper)) => upper.min(k),
        (lower, None) => lower.min(k),
    };
    let mut heap = BinaryHeap::with_capacity(capacity);

    for scored_item in scored_items {
        if heap.len() < k {
            heap.push(scored_item);
        } else if let Some(mut top) = heap.peek_mut() {
            if scored_item < *top {
                *top = scored_item;
            }
        }
    }

    heap.into_sorted_vec()
        .into_iter()
        .map(|scored_item| RecommendedItem {
            item: scored_item.item,
            value: scored_item.score as Rating,
        })
        .collect()
}

/// How the average diffs of the items a user rated are combined into one estimate.
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Weighting {
    /// Every co-rated item counts the same.
    Unweighted,
    /// Diffs count proportionally to the number of users they were observed for.
    Weighted,
    /// Like `Weighted`, additionally divided by `1 + standard deviation` of the diff.
    WeightedByStandardDeviation,
}

/// Weighted slope one: predicts a user's rating for an item from the user's ratings of other
/// items, shifted by the average rating differences observed between those items and the
/// target item.
pub struct SlopeOneRecommender {
    model: DataModel,
    diffs: DiffStorage,
    weighting: Weighting,
}

impl SlopeOneRecommender {

    pub fn new(model: DataModel) -> Self {
        SlopeOneRecommender::with_weighting(model, Weighting::WeightedByStandardDeviation)
    }

    pub fn with_weighting(model: DataModel, weighting: Weighting) -> Self {
        info!(
            "Computing average diffs for {} users and {} items",
            model.num_users(),
            model.num_items()
        );

        let diffs = DiffStorage::build(&model);
        SlopeOneRecommender { model, diffs, weighting }
    }

    pub fn diffs(&self) -> &DiffStorage {
        &self.diffs
    }

    fn estimate(&self, preferences: &[Preference], item: ItemId) -> Option<f64> {
        let averages = self.diffs.diffs_to(preferences, item);

        let mut total = 0.0;
        let mut weight_sum = 0.0;

        for (preference, average) in preferences.iter().zip(averages.iter()) {
            if let Some(average) = average {
                let weight = match self.weighting {
                    Weighting::Unweighted => 1.0,
                    Weighting::Weighted => average.count() as f64,
                    Weighting::WeightedByStandardDeviation => {
                        match average.standard_deviation() {
                            Some(deviation) => average.count() as f64 / (1.0 + deviation),
                            None => average.count() as f64,
                        }
                    }
                };

                total += weight * (preference.rating as f64 + average.average());
                weight_sum += weight;
            }
        }

        let estimate = if weight_sum > 0.0 {
            Some(total / weight_sum)
        } else {
            // Nothing co-rated, fall back to the item's average rating
            self.diffs.average_item_rating(item).map(|average| average.average())
        };

        estimate.filter(|value| value.is_finite())
    }
}

impl Recommender for SlopeOneRecommender {

    fn recommend(&self, user: UserId, how_many: usize) -> Result<Vec<RecommendedItem>> {
        let preferences = self.model.preferences_from_user(user)?;

        let mut candidates: Vec<ItemId> =
            self.diffs.recommendable_items(preferences).into_iter().collect();
        candidates.sort();

        debug!(user, num_candidates = candidates.len(), "scoring candidates");

        let scored_items = candidates.into_iter()
            .filter_map(|item| {
                self.estimate(preferences, item).map(|score| ScoredItem { item, score })
            });

        Ok(top_k(scored_items, how_many))
    }

    fn estimate_preference(&self, user: UserId, item: ItemId) -> Result<Option<Rating>> {
        let preferences = self.model.preferences_from_user(user)?;

        if !self.model.contains_item(item) {
            return Err(Error::NoSuchItem(item));
        }

        if let Some(rating) = model::find_rating(preferences, item) {
            return Ok(Some(rating));
        }

        Ok(self.estimate(preferences, item)
            .map(|estimate| estimate as Rating)
            .filter(|estimate| estimate.is_finite()))
    }

    fn data_model(&self) -> &DataModel {
        &self.model
    }
}

#[cfg(test)]
mod tests {

    use std::collections::BinaryHeap;

    use crate::error::Error;
    use crate::model::DataModel;
    use crate::recommend::{self, RecommendedItem, Recommender, ScoredItem};
    use crate::recommend::{SlopeOneRecommender, Weighting};

    fn close_enough_to(value: f32, expected: f32) -> bool {
        (value - expected).abs() < 0.0001
    }

    /// User 1 rated everything, user 2 misses item 3, user 3 only rated an item nobody
    /// else rated.
    fn recommender() -> SlopeOneRecommender {
        let model: DataModel = vec![
            (1, 1, Some(1.0)), (1, 2, Some(2.0)), (1, 3, Some(4.0)),
            (2, 1, Some(3.0)), (2, 2, Some(3.0)),
            (3, 4, Some(1.0)),
        ].into_iter().collect();

        SlopeOneRecommender::new(model)
    }

    #[test]
    fn scored_item_ordering_reversed() {
        let item_a = ScoredItem { item: 1, score: 0.5 };
        let item_b = ScoredItem { item: 2, score: 1.5 };
        let item_c = ScoredItem { item: 3, score: 0.3 };
        let item_d = ScoredItem { item: 4, score: 0.5 };

        assert!(item_a > item_b);
        assert!(item_a < item_c);
        assert!(item_b < item_c);
        assert!(item_a < item_d);
    }

    #[test]
    fn topk() {
        let items = vec![
            ScoredItem { item: 1, score: 0.5 },
            ScoredItem { item: 2, score: 1.5 },
            ScoredItem { item: 3, score: 0.3 },
            ScoredItem { item: 4, score: 3.5 },
            ScoredItem { item: 5, score: 2.5 },
            ScoredItem { item: 6, score: 1.5 },
        ];

        let top_k = recommend::top_k(items.into_iter(), 3);

        assert_eq!(top_k, vec![
            RecommendedItem { item: 4, value: 3.5 },
            RecommendedItem { item: 5, value: 2.5 },
            RecommendedItem { item: 2, value: 1.5 },
        ]);

        let nothing = recommend::top_k(vec![ScoredItem { item: 1, score: 0.5 }].into_iter(), 0);
        assert!(nothing.is_empty());

        let unbounded = recommend::top_k(
            vec![ScoredItem { item: 1, score: 0.5 }, ScoredItem { item: 2, score: 1.5 }]
                .into_iter(),
            usize::MAX,
        );
        assert_eq!(unbounded, vec![
            RecommendedItem { item: 2, value: 1.5 },
            RecommendedItem { item: 1, value: 0.5 },
        ]);

        // The heap we use keeps the worst entry on top
        let mut heap = BinaryHeap::new();
        heap.push(ScoredItem { item: 1, score: 0.5 });
        heap.push(ScoredItem { item: 2, score: 0.1 });
        assert_eq!(heap.peek().unwrap().item, 2);
    }

    #[test]
    fn estimates_from_average_diffs() {
        let recommender = recommender();

        // (3 + 3) from item 1 and (3 + 2) from item 2, both observed once
        let estimate = recommender.estimate_preference(2, 3).unwrap().unwrap();
        assert!(close_enough_to(estimate, 5.5));

        // Known ratings are returned as they are
        assert_eq!(recommender.estimate_preference(1, 2).unwrap(), Some(2.0));

        // Nothing co-rated with item 4, so the average rating of item 1 is used
        let fallback = recommender.estimate_preference(3, 1).unwrap().unwrap();
        assert!(close_enough_to(fallback, 2.0));
    }

    #[test]
    fn weightings() {
        // User 4 misses item 3. The diff 1 -> 3 is seen once, the diff 2 -> 3 twice with
        // values 1 and 2.
        let estimate_with = |weighting: Weighting| {
            let model: DataModel = vec![
                (1, 1, Some(1.0)), (1, 2, Some(2.0)), (1, 3, Some(3.0)),
                (2, 2, Some(2.0)), (2, 3, Some(4.0)),
                (4, 1, Some(2.0)), (4, 2, Some(2.0)),
            ].into_iter().collect();

            SlopeOneRecommender::with_weighting(model, weighting)
                .estimate_preference(4, 3)
                .unwrap()
                .unwrap()
        };

        assert!(close_enough_to(estimate_with(Weighting::Unweighted), 3.75));
        assert!(close_enough_to(estimate_with(Weighting::Weighted), 11.0 / 3.0));
        assert!(close_enough_to(estimate_with(Weighting::WeightedByStandardDeviation), 3.73025));
    }

    #[test]
    fn unknown_ids() {
        let recommender = recommender();

        assert!(matches!(recommender.estimate_preference(42, 1), Err(Error::NoSuchUser(42))));
        assert!(matches!(recommender.estimate_preference(1, 42), Err(Error::NoSuchItem(42))));
        assert!(matches!(recommender.recommend(42, 10), Err(Error::NoSuchUser(42))));
    }

    #[test]
    fn recommendations() {
        let recommender = recommender();

        let recommendations = recommender.recommend(2, 10).unwrap();
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].item, 3);
        assert!(close_enough_to(recommendations[0].value, 5.5));

        // User 1 rated all co-rated items, user 3 has no co-rated items
        assert!(recommender.recommend(1, 10).unwrap().is_empty());
        assert!(recommender.recommend(3, 10).unwrap().is_empty());

        assert!(recommender.recommend(2, 0).unwrap().is_empty());

        // Asking for more items than exist returns all of them
        let everything = recommender.recommend(2, usize::MAX).unwrap();
        assert_eq!(everything.len(), 1);
        assert_eq!(everything[0].item, 3);
        assert!(close_enough_to(everything[0].value, 5.5));
    }

    #[test]
    fn display() {
        let recommended_item = RecommendedItem { item: 7, value: 1.0 };
        assert_eq!(recommended_item.to_string(), "RecommendedItem[item:7, value:1.0]");
    }
}

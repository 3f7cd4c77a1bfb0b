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

use tracing::debug;

use crate::model::DataModel;
use crate::types::{self, ItemId, ItemSet, Preference, SparseMatrix, SparseRow};

/// Incrementally maintained count, mean and sample standard deviation (Welford's method).
#[derive(PartialEq, Clone, Copy, Debug, Default)]
pub struct RunningAverage {
    count: u32,
    mean: f64,
    sum_of_squared_deviations: f64,
}

impl RunningAverage {

    pub fn add(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.sum_of_squared_deviations += delta * (value - self.mean);
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn average(&self) -> f64 {
        self.mean
    }

    /// Sample standard deviation, undefined for less than two values.
    pub fn standard_deviation(&self) -> Option<f64> {
        if self.count > 1 {
            Some((self.sum_of_squared_deviations / (self.count - 1) as f64).sqrt())
        } else {
            None
        }
    }

    /// View of the same data with every value negated.
    fn inverted(&self) -> RunningAverage {
        RunningAverage { mean: -self.mean, ..*self }
    }
}

/// In-memory storage of the average rating differences between all pairs of co-rated items,
/// plus the average rating of every item.
///
/// Only the pair `(a, b)` with `a < b` is stored, holding the average of `rating(b) - rating(a)`.
/// Lookups in the other direction return the inverted average.
pub struct DiffStorage {
    average_diffs: SparseMatrix<RunningAverage>,
    average_item_ratings: SparseRow<RunningAverage>,
    co_rated_items: SparseRow<ItemSet>,
    num_diffs: u64,
}

impl DiffStorage {

    pub fn build(model: &DataModel) -> Self {

        let mut average_diffs: SparseMatrix<RunningAverage> =
            types::new_sparse_matrix(model.num_items());
        let mut average_item_ratings: SparseRow<RunningAverage> =
            types::new_sparse_row(model.num_items());
        let mut co_rated_items: SparseRow<ItemSet> = types::new_sparse_row(model.num_items());

        let mut num_diffs: u64 = 0;

        for (_, preferences) in model.preferences_of_users() {

            for (index, preference_a) in preferences.iter().enumerate() {

                average_item_ratings
                    .entry(preference_a.item)
                    .or_insert_with(RunningAverage::default)
                    .add(preference_a.rating as f64);

                // Preferences are sorted by item, so item_a < item_b holds below
                for preference_b in preferences[index + 1..].iter() {
                    let diff = preference_b.rating as f64 - preference_a.rating as f64;

                    average_diffs
                        .entry(preference_a.item)
                        .or_insert_with(|| types::new_sparse_row(10))
                        .entry(preference_b.item)
                        .or_insert_with(RunningAverage::default)
                        .add(diff);

                    co_rated_items
                        .entry(preference_a.item)
                        .or_insert_with(|| types::new_item_set(10))
                        .insert(preference_b.item);
                    co_rated_items
                        .entry(preference_b.item)
                        .or_insert_with(|| types::new_item_set(10))
                        .insert(preference_a.item);

                    num_diffs += 1;
                }
            }
        }

        debug!(num_diffs, num_items = average_item_ratings.len(), "built diff storage");

        DiffStorage { average_diffs, average_item_ratings, co_rated_items, num_diffs }
    }

    /// The average of `rating(item_b) - rating(item_a)` over all users who rated both items.
    pub fn diff(&self, item_a: ItemId, item_b: ItemId) -> Option<RunningAverage> {
        if item_a < item_b {
            self.lookup(item_a, item_b)
        } else if item_a > item_b {
            self.lookup(item_b, item_a).map(|average| average.inverted())
        } else {
            None
        }
    }

    /// For every preference, the diff from its item to `target_item`.
    pub fn diffs_to(
        &self,
        preferences: &[Preference],
        target_item: ItemId,
    ) -> Vec<Option<RunningAverage>> {
        preferences.iter()
            .map(|preference| self.diff(preference.item, target_item))
            .collect()
    }

    pub fn average_item_rating(&self, item: ItemId) -> Option<RunningAverage> {
        self.average_item_ratings.get(&item).cloned()
    }

    /// Items co-rated with at least one of the given items, excluding the given items.
    pub fn recommendable_items(&self, preferences: &[Preference]) -> ItemSet {
        let mut candidates = types::new_item_set(preferences.len() * 10);

        for preference in preferences {
            if let Some(co_rated) = self.co_rated_items.get(&preference.item) {
                candidates.extend(co_rated.iter().cloned());
            }
        }

        for preference in preferences {
            candidates.remove(&preference.item);
        }

        candidates
    }

    /// Number of item pair observations accumulated while building.
    pub fn num_diffs(&self) -> u64 {
        self.num_diffs
    }

    fn lookup(&self, smaller_item: ItemId, larger_item: ItemId) -> Option<RunningAverage> {
        self.average_diffs
            .get(&smaller_item)
            .and_then(|row| row.get(&larger_item))
            .cloned()
    }
}

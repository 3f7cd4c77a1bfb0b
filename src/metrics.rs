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

use fnv::FnvHashMap;

use crate::types::{self, ItemId, UserId};

/// Root mean squared error over `(expected, obtained)` pairs.
pub fn rmse(pairs: &[(f32, f32)]) -> Option<f64> {
    if pairs.is_empty() {
        return None;
    }

    let squared_sum: f64 = pairs.iter()
        .map(|&(expected, obtained)| (expected as f64 - obtained as f64).powi(2))
        .sum();

    Some((squared_sum / pairs.len() as f64).sqrt())
}

/// Mean absolute error over `(expected, obtained)` pairs.
pub fn mae(pairs: &[(f32, f32)]) -> Option<f64> {
    if pairs.is_empty() {
        return None;
    }

    let absolute_sum: f64 = pairs.iter()
        .map(|&(expected, obtained)| (expected as f64 - obtained as f64).abs())
        .sum();

    Some(absolute_sum / pairs.len() as f64)
}

/// Precision and recall of recommendation lists of length `count`, averaged over the users in
/// the test set.
///
/// A hit is a recommended item which also occurs in the test items of the user. Precision
/// counts every recommended hit once and divides by `count`. Recall counts every test entry
/// whose item was recommended, so repeated test entries count repeatedly, and divides by the
/// number of test entries of the user.
pub fn precision_recall(
    recommendations: &FnvHashMap<UserId, Vec<ItemId>>,
    test: &FnvHashMap<UserId, Vec<ItemId>>,
    count: usize,
) -> Option<(f64, f64)> {

    if test.is_empty() || count == 0 {
        return None;
    }

    let mut precision_sum = 0.0;
    let mut recall_sum = 0.0;

    for (user, test_items) in test.iter() {
        let mut recommended = types::new_item_set(count);
        if let Some(items) = recommendations.get(user) {
            recommended.extend(items.iter().take(count).cloned());
        }

        let unique_hits = recommended.iter()
            .filter(|item| test_items.contains(*item))
            .count();

        let hits = test_items.iter()
            .filter(|item| recommended.contains(*item))
            .count();

        precision_sum += unique_hits as f64 / count as f64;
        if !test_items.is_empty() {
            recall_sum += hits as f64 / test_items.len() as f64;
        }
    }

    let num_users = test.len() as f64;

    Some((precision_sum / num_users, recall_sum / num_users))
}

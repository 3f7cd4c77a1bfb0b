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

use fnv::{FnvHashMap, FnvHashSet};

pub type UserId = i64;
pub type ItemId = i64;
pub type Rating = f32;

/// The rating a user gave to an item. Boolean data (lines without a rating) is stored with a
/// rating of `1.0`.
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Preference {
    pub item: ItemId,
    pub rating: Rating,
}

/// Preferences of a single user, sorted by item id.
pub type UserPreferences = Vec<Preference>;

pub type ItemSet = FnvHashSet<ItemId>;

pub type SparseRow<T> = FnvHashMap<ItemId, T>;
pub type SparseMatrix<T> = FnvHashMap<ItemId, SparseRow<T>>;

pub fn new_item_set(capacity: usize) -> ItemSet {
    FnvHashSet::with_capacity_and_hasher(capacity, Default::default())
}

pub fn new_sparse_row<T>(capacity: usize) -> SparseRow<T> {
    FnvHashMap::with_capacity_and_hasher(capacity, Default::default())
}

pub fn new_sparse_matrix<T>(num_rows: usize) -> SparseMatrix<T> {
    FnvHashMap::with_capacity_and_hasher(num_rows, Default::default())
}

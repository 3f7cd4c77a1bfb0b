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

use std::io;
use std::path::Path;

use fnv::FnvHashMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::io as csv_io;
use crate::types::{self, ItemId, Preference, Rating, UserId, UserPreferences};

/// Rating used for lines without an explicit rating.
pub const BOOLEAN_RATING: Rating = 1.0;

/// Immutable in-memory table of the ratings users gave to items. User and item ids are kept
/// sorted, so iteration order is deterministic.
pub struct DataModel {
    preferences_of_users: FnvHashMap<UserId, UserPreferences>,
    user_ids: Vec<UserId>,
    item_ids: Vec<ItemId>,
    num_preferences: u64,
    has_rating_values: bool,
}

impl DataModel {

    /// Loads the ratings file at `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = csv_io::csv_reader(path)?;
        DataModel::from_reader(&mut reader)
    }

    pub fn from_reader<R: io::Read>(reader: &mut csv::Reader<R>) -> Result<Self> {
        let ratings = csv_io::ratings_from_csv(reader)
            .collect::<Result<Vec<_>>>()?;

        Ok(ratings.into_iter().collect())
    }

    pub fn num_users(&self) -> usize {
        self.user_ids.len()
    }

    pub fn num_items(&self) -> usize {
        self.item_ids.len()
    }

    pub fn num_preferences(&self) -> u64 {
        self.num_preferences
    }

    /// Whether at least one line carried an explicit rating.
    pub fn has_rating_values(&self) -> bool {
        self.has_rating_values
    }

    pub fn user_ids(&self) -> &[UserId] {
        &self.user_ids
    }

    pub fn item_ids(&self) -> &[ItemId] {
        &self.item_ids
    }

    pub fn contains_user(&self, user: UserId) -> bool {
        self.preferences_of_users.contains_key(&user)
    }

    pub fn contains_item(&self, item: ItemId) -> bool {
        self.item_ids.binary_search(&item).is_ok()
    }

    /// The preferences of `user`, sorted by item id.
    pub fn preferences_from_user(&self, user: UserId) -> Result<&[Preference]> {
        self.preferences_of_users
            .get(&user)
            .map(|preferences| preferences.as_slice())
            .ok_or(Error::NoSuchUser(user))
    }

    /// All users with their preferences, in ascending user order.
    pub fn preferences_of_users(&self) -> impl Iterator<Item = (UserId, &[Preference])> + '_ {
        self.user_ids.iter()
            .map(move |user| (*user, self.preferences_of_users[user].as_slice()))
    }

    /// The rating `user` gave to `item`, if any.
    pub fn preference_value(&self, user: UserId, item: ItemId) -> Result<Option<Rating>> {
        let preferences = self.preferences_from_user(user)?;
        Ok(find_rating(preferences, item))
    }
}

pub fn find_rating(preferences: &[Preference], item: ItemId) -> Option<Rating> {
    preferences
        .binary_search_by_key(&item, |preference| preference.item)
        .ok()
        .map(|index| preferences[index].rating)
}

impl FromIterator<(UserId, ItemId, Option<Rating>)> for DataModel {

    fn from_iter<I>(ratings: I) -> Self
        where I: IntoIterator<Item = (UserId, ItemId, Option<Rating>)> {

        let mut rows: FnvHashMap<UserId, types::SparseRow<Rating>> =
            FnvHashMap::with_capacity_and_hasher(100, Default::default());
        let mut all_items = types::new_item_set(100);
        let mut has_rating_values = false;

        for (user, item, rating) in ratings {
            has_rating_values |= rating.is_some();

            // Later lines override earlier ratings for the same pair
            rows.entry(user)
                .or_insert_with(|| types::new_sparse_row(10))
                .insert(item, rating.unwrap_or(BOOLEAN_RATING));

            all_items.insert(item);
        }

        let mut num_preferences: u64 = 0;
        let mut preferences_of_users =
            FnvHashMap::with_capacity_and_hasher(rows.len(), Default::default());

        for (user, row) in rows.into_iter() {
            let mut preferences: UserPreferences = row.into_iter()
                .map(|(item, rating)| Preference { item, rating })
                .collect();
            preferences.sort_by_key(|preference| preference.item);

            num_preferences += preferences.len() as u64;
            preferences_of_users.insert(user, preferences);
        }

        let mut user_ids: Vec<UserId> = preferences_of_users.keys().cloned().collect();
        user_ids.sort();

        let mut item_ids: Vec<ItemId> = all_items.into_iter().collect();
        item_ids.sort();

        debug!(
            num_users = user_ids.len(),
            num_items = item_ids.len(),
            num_preferences,
            "built data model"
        );

        DataModel { preferences_of_users, user_ids, item_ids, num_preferences, has_rating_values }
    }
}

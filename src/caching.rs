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

use std::cell::RefCell;

use fnv::FnvHashMap;
use tracing::trace;

use crate::error::Result;
use crate::model::DataModel;
use crate::recommend::{RecommendedItem, Recommender};
use crate::types::{ItemId, Rating, UserId};

/// Recommendations computed for a user, and how many were asked for back then.
struct CachedRecommendations {
    requested: usize,
    items: Vec<RecommendedItem>,
}

impl CachedRecommendations {

    /// A cached list answers a request if it is long enough, or if the underlying recommender
    /// already ran out of items last time.
    fn answers(&self, how_many: usize) -> bool {
        self.items.len() >= how_many || self.items.len() < self.requested
    }
}

/// Decorator which memoizes the recommendations and estimates of the wrapped recommender.
/// Errors are passed through and never cached.
pub struct CachingRecommender<R: Recommender> {
    recommender: R,
    recommendations: RefCell<FnvHashMap<UserId, CachedRecommendations>>,
    estimates: RefCell<FnvHashMap<(UserId, ItemId), Option<Rating>>>,
}

impl<R: Recommender> CachingRecommender<R> {

    pub fn new(recommender: R) -> Self {
        CachingRecommender {
            recommender,
            recommendations: RefCell::new(FnvHashMap::default()),
            estimates: RefCell::new(FnvHashMap::default()),
        }
    }

    pub fn clear(&self) {
        self.recommendations.borrow_mut().clear();
        self.estimates.borrow_mut().clear();
    }

    pub fn clear_user(&self, user: UserId) {
        self.recommendations.borrow_mut().remove(&user);
        self.estimates.borrow_mut().retain(|&(cached_user, _), _| cached_user != user);
    }

    pub fn into_inner(self) -> R {
        self.recommender
    }
}

impl<R: Recommender> Recommender for CachingRecommender<R> {

    fn recommend(&self, user: UserId, how_many: usize) -> Result<Vec<RecommendedItem>> {

        if let Some(cached) = self.recommendations.borrow().get(&user) {
            if cached.answers(how_many) {
                trace!(user, how_many, "recommendations served from cache");
                return Ok(cached.items.iter().take(how_many).cloned().collect());
            }
        }

        let items = self.recommender.recommend(user, how_many)?;
        let answer = items.clone();

        self.recommendations.borrow_mut()
            .insert(user, CachedRecommendations { requested: how_many, items });

        Ok(answer)
    }

    fn estimate_preference(&self, user: UserId, item: ItemId) -> Result<Option<Rating>> {

        if let Some(estimate) = self.estimates.borrow().get(&(user, item)) {
            return Ok(*estimate);
        }

        let estimate = self.recommender.estimate_preference(user, item)?;
        self.estimates.borrow_mut().insert((user, item), estimate);

        Ok(estimate)
    }

    fn data_model(&self) -> &DataModel {
        self.recommender.data_model()
    }
}

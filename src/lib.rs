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

pub mod caching;
pub mod diffs;
pub mod error;
pub mod io;
pub mod metrics;
pub mod model;
pub mod output;
pub mod recommend;
pub mod types;


use std::path::Path;
use std::time::Instant;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::caching::CachingRecommender;
use crate::error::Result;
use crate::model::DataModel;
use crate::recommend::SlopeOneRecommender;

pub use crate::error::Error;
pub use crate::output::DEFAULT_PREDICTION;
pub use crate::recommend::{RecommendedItem, Recommender};

/// Loads the ratings at `ratings_path` and builds a caching slope one recommender on them.
pub fn slope_one_from_file<P: AsRef<Path>>(
    ratings_path: P,
) -> Result<CachingRecommender<SlopeOneRecommender>> {

    let ratings_path = ratings_path.as_ref();
    info!("Reading ratings from {}", ratings_path.display());

    let start = Instant::now();
    let model = DataModel::from_file(ratings_path)?;

    info!(
        "Found {} ratings between {} users and {} items.",
        model.num_preferences(),
        model.num_users(),
        model.num_items()
    );

    if !model.has_rating_values() {
        info!("No explicit ratings found, treating the data as boolean preferences.");
    }

    let recommender = SlopeOneRecommender::new(model);

    info!(
        "{} item pair diffs observed, {}ms training time",
        recommender.diffs().num_diffs(),
        start.elapsed().as_millis()
    );

    Ok(CachingRecommender::new(recommender))
}

/// Installs the log output of the programs. Logs go to stderr, so that stdout stays free for
/// reports. The level defaults to `info` and can be changed via `RUST_LOG`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

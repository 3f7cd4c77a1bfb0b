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

use std::io::Write;

use serde_derive::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::recommend::{RecommendedItem, Recommender};
use crate::types::{ItemId, Rating, UserId};

/// Score emitted whenever no prediction can be made.
pub const DEFAULT_PREDICTION: Rating = 0.5;

/// Estimated preference of `user` for `item`, or `DEFAULT_PREDICTION` if the user or the item
/// is unknown, or if the estimate is undefined. Other failures are passed on.
pub fn prediction_or_default<R>(recommender: &R, user: UserId, item: ItemId) -> Result<Rating>
    where R: Recommender + ?Sized {

    match recommender.estimate_preference(user, item) {
        Ok(Some(estimate)) if estimate.is_finite() => Ok(estimate),
        Ok(_) => Ok(DEFAULT_PREDICTION),
        Err(ref failure) if failure.is_unknown_id() => {
            debug!(user, item, "{}, using default prediction", failure);
            Ok(DEFAULT_PREDICTION)
        },
        Err(failure) => Err(failure),
    }
}

/// Writes the human readable report: the recommendations for every user, followed by the
/// predictions for all user-item pairs of the data model.
pub fn write_report<R, W>(recommender: &R, num_recommendations: usize, out: &mut W) -> Result<()>
    where R: Recommender + ?Sized, W: Write {

    let model = recommender.data_model();

    writeln!(out, "Recommendations:")?;

    for &user in model.user_ids() {
        let recommendations = recommender.recommend(user, num_recommendations)?;

        if recommendations.is_empty() {
            writeln!(out, "User {}: no recommendations", user)?;
        }

        for recommended_item in recommendations.iter() {
            writeln!(out, "User {}: {}", user, recommended_item)?;
        }
    }

    writeln!(out, "Predictions:")?;

    for &user in model.user_ids() {
        for &item in model.item_ids() {
            let prediction = prediction_or_default(recommender, user, item)?;
            writeln!(out, "{} - {}: {:.6}", user, item, prediction)?;
        }
    }

    Ok(())
}

/// Writes a `user,item,score` line for every pair. Returns the number of lines written.
pub fn write_predictions<R, W, I>(recommender: &R, pairs: I, out: &mut W) -> Result<u64>
    where R: Recommender + ?Sized, W: Write, I: Iterator<Item = Result<(UserId, ItemId)>> {

    let mut num_predictions: u64 = 0;
    let mut num_defaults: u64 = 0;

    for pair in pairs {
        let (user, item) = pair?;
        let prediction = prediction_or_default(recommender, user, item)?;

        if prediction == DEFAULT_PREDICTION {
            num_defaults += 1;
        }

        writeln!(out, "{},{},{:.6}", user, item, prediction)?;
        num_predictions += 1;
    }

    info!("Wrote {} predictions, {} of them default values", num_predictions, num_defaults);

    Ok(num_predictions)
}

/// Writes a `user,item,score` line for each of the top `how_many` recommendations of every
/// user. Returns the number of lines written.
pub fn write_recommendations<R, W>(recommender: &R, how_many: usize, out: &mut W) -> Result<u64>
    where R: Recommender + ?Sized, W: Write {

    let mut num_recommendations: u64 = 0;

    for &user in recommender.data_model().user_ids() {
        for recommended_item in recommender.recommend(user, how_many)? {
            writeln!(out, "{},{},{:.6}", user, recommended_item.item, recommended_item.value)?;
            num_recommendations += 1;
        }
    }

    info!("Wrote {} recommendations", num_recommendations);

    Ok(num_recommendations)
}

/// Struct used for JSON serialization of the recommendations of a user. Field names will be
/// used in JSON.
#[derive(Serialize)]
struct Recommendations<'a> {
    for_user: UserId,
    recommended_items: &'a [RecommendedItem],
}

/// Like `write_recommendations`, but emits one JSON object per user and line. Users without
/// recommendations are skipped. Returns the number of recommendations written.
pub fn write_recommendations_as_json<R, W>(
    recommender: &R,
    how_many: usize,
    out: &mut W,
) -> Result<u64>
    where R: Recommender + ?Sized, W: Write {

    let mut num_recommendations: u64 = 0;

    for &user in recommender.data_model().user_ids() {
        let recommended_items = recommender.recommend(user, how_many)?;

        if recommended_items.is_empty() {
            continue;
        }

        let recommendations_as_json = serde_json::to_string(
            &Recommendations {
                for_user: user,
                recommended_items: &recommended_items,
            })?;

        writeln!(out, "{}", recommendations_as_json)?;
        num_recommendations += recommended_items.len() as u64;
    }

    info!("Wrote {} recommendations as JSON", num_recommendations);

    Ok(num_recommendations)
}

#[cfg(test)]
mod tests {

    use crate::caching::CachingRecommender;
    use crate::error::Error;
    use crate::io as csv_io;
    use crate::model::DataModel;
    use crate::output::{self, DEFAULT_PREDICTION};
    use crate::recommend::SlopeOneRecommender;

    const RATINGS: &str = "1,1,1.0\n1,2,2.0\n1,3,4.0\n2,1,3.0\n2,2,3.0\n3,4,1.0\n";

    fn recommender() -> CachingRecommender<SlopeOneRecommender> {
        let mut reader = csv_io::reader_from(RATINGS.as_bytes());
        let model = DataModel::from_reader(&mut reader).unwrap();
        CachingRecommender::new(SlopeOneRecommender::new(model))
    }

    fn lines(out: Vec<u8>) -> Vec<String> {
        String::from_utf8(out).unwrap().lines().map(String::from).collect()
    }

    #[test]
    fn unknown_ids_get_the_default() {
        let recommender = recommender();

        assert_eq!(output::prediction_or_default(&recommender, 42, 1).unwrap(), DEFAULT_PREDICTION);
        assert_eq!(output::prediction_or_default(&recommender, 1, 42).unwrap(), DEFAULT_PREDICTION);
        assert_eq!(output::prediction_or_default(&recommender, 1, 3).unwrap(), 4.0);
    }

    #[test]
    fn predictions_for_test_pairs() {
        let recommender = recommender();

        let mut reader = csv_io::reader_from("10,1\n2,20\n2,3\n".as_bytes());
        let pairs = csv_io::pairs_from_csv(&mut reader, false);

        let mut out = Vec::new();
        let num_predictions = output::write_predictions(&recommender, pairs, &mut out).unwrap();

        assert_eq!(num_predictions, 3);
        assert_eq!(lines(out), vec!["10,1,0.500000", "2,20,0.500000", "2,3,5.500000"]);
    }

    #[test]
    fn unparseable_test_pairs_are_fatal() {
        let recommender = recommender();

        let mut reader = csv_io::reader_from("1,1\nfoo\n".as_bytes());
        let pairs = csv_io::pairs_from_csv(&mut reader, false);

        let mut out = Vec::new();
        let result = output::write_predictions(&recommender, pairs, &mut out);

        assert!(matches!(result, Err(Error::Parse { line: 2, .. })));
    }

    #[test]
    fn recommendations_respect_the_count() {
        let recommender = recommender();

        let mut out = Vec::new();
        assert_eq!(output::write_recommendations(&recommender, 0, &mut out).unwrap(), 0);
        assert!(out.is_empty());

        let mut out = Vec::new();
        assert_eq!(output::write_recommendations(&recommender, 1, &mut out).unwrap(), 1);
        assert_eq!(lines(out), vec!["2,3,5.500000"]);
    }

    #[test]
    fn recommendations_as_json() {
        let recommender = recommender();

        let mut out = Vec::new();
        output::write_recommendations_as_json(&recommender, 10, &mut out).unwrap();

        let lines = lines(out);
        assert_eq!(lines.len(), 1);

        let parsed: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(parsed["for_user"], 2);
        assert_eq!(parsed["recommended_items"][0]["item"], 3);
        assert_eq!(parsed["recommended_items"][0]["value"], 5.5);
    }

    #[test]
    fn report() {
        let recommender = recommender();

        let mut out = Vec::new();
        output::write_report(&recommender, 10, &mut out).unwrap();

        let lines = lines(out);

        assert_eq!(&lines[..5], &[
            "Recommendations:",
            "User 1: no recommendations",
            "User 2: RecommendedItem[item:3, value:5.5]",
            "User 3: no recommendations",
            "Predictions:",
        ]);

        // Three users times four items
        assert_eq!(lines.len(), 5 + 12);
        assert_eq!(lines[5], "1 - 1: 1.000000");
        assert_eq!(lines[7], "1 - 3: 4.000000");
        assert_eq!(lines[11], "2 - 3: 5.500000");
        // Only item 4 is known to user 3, item 1 falls back to its average rating
        assert_eq!(lines[13], "3 - 1: 2.000000");
    }
}

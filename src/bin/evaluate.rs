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

use std::env;
use std::error::Error;
use std::process;

use fnv::FnvHashMap;
use getopts::Options;
use tracing::{error, info, warn};

use slopeone::io;
use slopeone::metrics;
use slopeone::types::{ItemId, UserId};

fn main() {

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("r", "recommendations", "Treat the result file as recommendations and report \
        precision and recall at the given list length (optional, by default the result file \
        holds predictions and RMSE and MAE are reported).", "NUMBER");
    opts.optflag("h", "help", "Print this help menu");

    let matches = match opts.parse(&args[1..]) {
        Ok(matches) => matches,
        Err(failure) => {
            let hint = failure.to_string();
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    if matches.opt_present("h") {
        return print_usage_and_exit(&program, opts, None);
    }

    if matches.free.len() != 2 {
        return print_usage_and_exit(
            &program,
            opts,
            Some("Please specify a result file and a test file."),
        );
    }

    let result_path = &matches.free[0];
    let test_path = &matches.free[1];

    let count: Option<usize> = match matches.opt_get("r") {
        Ok(count) => count,
        Err(failure) => {
            let hint = format!("Problem with option 'r': {}", failure);
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    slopeone::init_logging();

    let outcome = match count {
        Some(count) => evaluate_recommendations(result_path, test_path, count),
        None => evaluate_predictions(result_path, test_path),
    };

    if let Err(failure) = outcome {
        error!("{}", failure);
        process::exit(1);
    }
}

fn print_usage_and_exit(program: &str, opts: Options, hint: Option<&str>) {

    if let Some(hint) = hint {
        eprintln!("\n{}\n", hint);
    }

    let brief = format!("Usage: {} [options] RESULTFILE TESTFILE", program);
    eprint!("{}", opts.usage(&brief));

    process::exit(if hint.is_some() { 2 } else { 0 });
}

fn evaluate_predictions(predictions_path: &str, test_path: &str) -> Result<(), Box<dyn Error>> {

    let mut predictions: FnvHashMap<(UserId, ItemId), f32> = FnvHashMap::default();
    for (user, item, prediction) in io::read_scored(predictions_path)? {
        predictions.insert((user, item), prediction);
    }

    let test = io::read_scored(test_path)?;
    info!("Comparing {} predictions with {} test ratings", predictions.len(), test.len());

    let mut pairs = Vec::with_capacity(test.len());
    let mut num_missing = 0;

    for (user, item, expected) in test {
        match predictions.get(&(user, item)) {
            Some(obtained) => pairs.push((expected, *obtained)),
            None => num_missing += 1,
        }
    }

    if num_missing > 0 {
        warn!("No prediction for {} test ratings, they are ignored", num_missing);
    }

    match (metrics::rmse(&pairs), metrics::mae(&pairs)) {
        (Some(rmse), Some(mae)) => {
            println!("RMSE: {:.6}", rmse);
            println!("MAE: {:.6}", mae);
        },
        _ => println!("Nothing to evaluate."),
    }

    Ok(())
}

fn evaluate_recommendations(
    recommendations_path: &str,
    test_path: &str,
    count: usize,
) -> Result<(), Box<dyn Error>> {

    // Recommendations are listed best first per user
    let mut recommendations: FnvHashMap<UserId, Vec<ItemId>> = FnvHashMap::default();
    for (user, item, _) in io::read_scored(recommendations_path)? {
        recommendations.entry(user).or_insert_with(Vec::new).push(item);
    }

    let mut test: FnvHashMap<UserId, Vec<ItemId>> = FnvHashMap::default();
    let mut test_reader = io::csv_reader(test_path)?;
    for pair in io::pairs_from_csv(&mut test_reader, false) {
        let (user, item) = pair?;
        test.entry(user).or_insert_with(Vec::new).push(item);
    }

    info!(
        "Comparing recommendations for {} users with test items of {} users",
        recommendations.len(),
        test.len()
    );

    match metrics::precision_recall(&recommendations, &test, count) {
        Some((precision, recall)) => {
            println!("Precision@{}: {:.6}", count, precision);
            println!("Recall@{}: {:.6}", count, recall);
        },
        None => println!("Nothing to evaluate."),
    }

    Ok(())
}

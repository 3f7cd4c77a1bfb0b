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
use std::io::{self, Write};
use std::process;

use getopts::Options;
use tracing::error;

use slopeone::output;

const DEFAULT_RATINGS_PATH: &str = "datasets/dummy-bool.csv";

fn main() {

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("i", "inputfile", "Ratings file name (optional, defaults to \
        datasets/dummy-bool.csv). The file must contain a user, an item and an optional \
        rating per line, separated by commas.", "PATH");
    opts.optopt("n", "num-recommendations", "Number of recommendations to compute per user \
        (optional, defaults to 10).", "NUMBER");
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

    let ratings_path = matches.opt_str("i")
        .unwrap_or_else(|| String::from(DEFAULT_RATINGS_PATH));

    let n: usize = match matches.opt_get_default("n", 10) {
        Ok(n) => n,
        Err(failure) => {
            let hint = format!("Problem with option 'n': {}", failure);
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    slopeone::init_logging();

    if let Err(failure) = report(&ratings_path, n) {
        error!("{}", failure);
        process::exit(1);
    }
}

fn print_usage_and_exit(program: &str, opts: Options, hint: Option<&str>) {

    if let Some(hint) = hint {
        eprintln!("\n{}\n", hint);
    }

    let brief = format!("Usage: {} [options]", program);
    eprint!("{}", opts.usage(&brief));

    process::exit(if hint.is_some() { 2 } else { 0 });
}

fn report(ratings_path: &str, n: usize) -> Result<(), Box<dyn Error>> {

    let recommender = slopeone::slope_one_from_file(ratings_path)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    output::write_report(&recommender, n, &mut out)?;
    out.flush()?;

    Ok(())
}

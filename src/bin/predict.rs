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
use std::io::Write;
use std::process;

use getopts::Options;
use tracing::{error, info};

use slopeone::{io, output};

fn main() {

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optflag("s", "skip-header", "Treat the first line of the test file as a header and \
        skip it.");
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

    if matches.free.len() != 3 {
        return print_usage_and_exit(
            &program,
            opts,
            Some("Please specify a train file, a test file and an output file."),
        );
    }

    let train_path = &matches.free[0];
    let test_path = &matches.free[1];
    let output_path = &matches.free[2];
    let skip_header = matches.opt_present("s");

    slopeone::init_logging();

    if let Err(failure) = predict(train_path, test_path, output_path, skip_header) {
        error!("{}", failure);
        process::exit(1);
    }
}

fn print_usage_and_exit(program: &str, opts: Options, hint: Option<&str>) {

    if let Some(hint) = hint {
        eprintln!("\n{}\n", hint);
    }

    let brief = format!("Usage: {} [options] TRAINFILE TESTFILE OUTPUTFILE", program);
    eprint!("{}", opts.usage(&brief));

    process::exit(if hint.is_some() { 2 } else { 0 });
}

fn predict(
    train_path: &str,
    test_path: &str,
    output_path: &str,
    skip_header: bool,
) -> Result<(), Box<dyn Error>> {

    let recommender = slopeone::slope_one_from_file(train_path)?;

    let mut test_reader = io::csv_reader(test_path)?;
    let pairs = io::pairs_from_csv(&mut test_reader, skip_header);

    info!("Writing predictions for the pairs in {} to {}", test_path, output_path);

    let mut out = io::output_file(output_path)?;
    output::write_predictions(&recommender, pairs, &mut out)?;
    out.flush()?;

    Ok(())
}

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
    opts.optflag("j", "json", "Write one JSON object per user instead of user,item,score \
        lines.");
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
            Some("Please specify a train file, a recommendation count and an output file."),
        );
    }

    let train_path = &matches.free[0];
    let output_path = &matches.free[2];

    let n: usize = match matches.free[1].parse() {
        Ok(n) => n,
        Err(failure) => {
            let hint = format!("Problem with the recommendation count: {}", failure);
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    slopeone::init_logging();

    if let Err(failure) = batch_recommend(train_path, n, output_path, matches.opt_present("j")) {
        error!("{}", failure);
        process::exit(1);
    }
}

fn print_usage_and_exit(program: &str, opts: Options, hint: Option<&str>) {

    if let Some(hint) = hint {
        eprintln!("\n{}\n", hint);
    }

    let brief = format!("Usage: {} [options] TRAINFILE COUNT OUTPUTFILE", program);
    eprint!("{}", opts.usage(&brief));

    process::exit(if hint.is_some() { 2 } else { 0 });
}

fn batch_recommend(
    train_path: &str,
    n: usize,
    output_path: &str,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {

    let recommender = slopeone::slope_one_from_file(train_path)?;

    info!("Writing {} recommendations per user to {}", n, output_path);

    let mut out = io::output_file(output_path)?;

    if as_json {
        output::write_recommendations_as_json(&recommender, n, &mut out)?;
    } else {
        output::write_recommendations(&recommender, n, &mut out)?;
    }

    out.flush()?;

    Ok(())
}

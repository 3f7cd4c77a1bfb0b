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

use std::fs::File;
use std::io::{self, BufWriter, ErrorKind};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::{Error, Result};
use crate::types::{ItemId, Rating, UserId};

/// Opens a CSV input file. We expect NO headers, and a `user,item[,rating]` tuple per line
/// with comma separation. Lines starting with `#` are skipped.
pub fn csv_reader<P: AsRef<Path>>(path: P) -> Result<csv::Reader<File>> {
    let path = path.as_ref();

    let file = File::open(path).map_err(|failure| {
        if failure.kind() == ErrorKind::NotFound {
            Error::FileNotFound { path: path.display().to_string() }
        } else {
            Error::Io(failure)
        }
    })?;

    Ok(reader_from(file))
}

/// Same settings as `csv_reader`, for in-memory or already opened input.
pub fn reader_from<R: io::Read>(input: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(Trim::All)
        .from_reader(input)
}

/// Creates (or truncates) the output file at `path`. Callers are expected to flush the
/// returned writer once they are done.
pub fn output_file<P: AsRef<Path>>(path: P) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

/// Iterates over the `(user, item, rating)` records of a ratings file. The rating is absent
/// for boolean data.
pub fn ratings_from_csv<'a, R>(
    reader: &'a mut csv::Reader<R>,
) -> impl Iterator<Item = Result<(UserId, ItemId, Option<Rating>)>> + 'a
where
    R: io::Read,
{
    reader.records().map(|result| {
        let record = result?;
        let line = line_of(&record);

        let user = parse_id(&record, 0, line, "user")?;
        let item = parse_id(&record, 1, line, "item")?;
        let rating = parse_optional_value(&record, 2, line)?;

        Ok((user, item, rating))
    })
}

/// Iterates over the `(user, item)` pairs of a test file, additional fields are ignored. If
/// `skip_header` is set, the first line of the input is the header. The reader may already
/// have dropped that line as blank or as a comment, in which case no record is skipped.
pub fn pairs_from_csv<'a, R>(
    reader: &'a mut csv::Reader<R>,
    skip_header: bool,
) -> impl Iterator<Item = Result<(UserId, ItemId)>> + 'a
where
    R: io::Read,
{
    reader.records()
        .filter(move |result| match result {
            Ok(record) => !(skip_header && line_of(record) == 1),
            Err(_) => true,
        })
        .map(|result| {
            let record = result?;
            let line = line_of(&record);

            let user = parse_id(&record, 0, line, "user")?;
            let item = parse_id(&record, 1, line, "item")?;

            Ok((user, item))
        })
}

/// Reads a whole file of `user,item,score` lines, as written by the batch programs. Rated
/// test files have the same shape.
pub fn read_scored<P: AsRef<Path>>(path: P) -> Result<Vec<(UserId, ItemId, f32)>> {
    let mut reader = csv_reader(path)?;
    let mut scored = Vec::new();

    for result in reader.records() {
        let record = result?;
        let line = line_of(&record);

        let user = parse_id(&record, 0, line, "user")?;
        let item = parse_id(&record, 1, line, "item")?;
        let score = parse_optional_value(&record, 2, line)?
            .ok_or_else(|| Error::Parse { line, message: String::from("missing score") })?;

        scored.push((user, item, score));
    }

    Ok(scored)
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|position| position.line()).unwrap_or(0)
}

fn parse_id(record: &StringRecord, index: usize, line: u64, what: &str) -> Result<i64> {
    let field = record.get(index).ok_or_else(|| Error::Parse {
        line,
        message: format!("expected at least two fields, found {}", record.len()),
    })?;

    field.parse::<i64>().map_err(|failure| Error::Parse {
        line,
        message: format!("invalid {} id '{}': {}", what, field, failure),
    })
}

fn parse_optional_value(record: &StringRecord, index: usize, line: u64) -> Result<Option<f32>> {
    match record.get(index) {
        None | Some("") => Ok(None),
        Some(field) => {
            let value = field.parse::<f32>().map_err(|failure| Error::Parse {
                line,
                message: format!("invalid value '{}': {}", field, failure),
            })?;

            if value.is_finite() {
                Ok(Some(value))
            } else {
                Err(Error::Parse { line, message: format!("value '{}' is not finite", field) })
            }
        }
    }
}

#[cfg(test)]
mod tests {

    use std::io::Write;

    use tempfile::NamedTempFile;

    use crate::error::Error;
    use crate::io;

    #[test]
    fn ratings_with_and_without_values() {
        let data = "1,10,4.5\n# a comment\n\n2, 20\n";
        let mut reader = io::reader_from(data.as_bytes());

        let ratings: Vec<_> = io::ratings_from_csv(&mut reader)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(ratings, vec![(1, 10, Some(4.5)), (2, 20, None)]);
    }

    #[test]
    fn single_field_is_a_parse_error() {
        let data = "1,10\n7\n";
        let mut reader = io::reader_from(data.as_bytes());

        let results: Vec<_> = io::ratings_from_csv(&mut reader).collect();

        assert!(results[0].is_ok());
        match results[1] {
            Err(Error::Parse { line, .. }) => assert_eq!(line, 2),
            ref other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn non_integer_ids_and_bad_ratings_are_rejected() {
        let data = "a,10\n1,b\n1,2,x\n1,2,NaN\n";
        let mut reader = io::reader_from(data.as_bytes());

        let results: Vec<_> = io::ratings_from_csv(&mut reader).collect();

        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|result| matches!(result, Err(Error::Parse { .. }))));
    }

    #[test]
    fn header_is_skipped_on_request() {
        let data = "user,item\n1,10\n2,20,0.3\n";

        let mut reader = io::reader_from(data.as_bytes());
        let pairs: Vec<_> = io::pairs_from_csv(&mut reader, true)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(pairs, vec![(1, 10), (2, 20)]);

        let mut reader = io::reader_from(data.as_bytes());
        let first = io::pairs_from_csv(&mut reader, false).next().unwrap();
        assert!(matches!(first, Err(Error::Parse { line: 1, .. })));
    }

    #[test]
    fn commented_header_keeps_the_first_pair() {
        let data = "#user,item\n1,10\n2,20\n";

        let mut reader = io::reader_from(data.as_bytes());
        let pairs: Vec<_> = io::pairs_from_csv(&mut reader, true)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(pairs, vec![(1, 10), (2, 20)]);
    }

    #[test]
    fn blank_header_keeps_the_first_pair() {
        let data = "\n1,10\n2,20\n";

        let mut reader = io::reader_from(data.as_bytes());
        let pairs: Vec<_> = io::pairs_from_csv(&mut reader, true)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(pairs, vec![(1, 10), (2, 20)]);
    }

    #[test]
    fn missing_file() {
        match io::csv_reader("/definitely/not/here.csv") {
            Err(Error::FileNotFound { path }) => assert_eq!(path, "/definitely/not/here.csv"),
            other => panic!("expected FileNotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn scored_lines_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "1,10,0.500000\n2,20,3.250000\n").unwrap();

        let scored = io::read_scored(file.path()).unwrap();

        assert_eq!(scored, vec![(1, 10, 0.5), (2, 20, 3.25)]);
    }

    #[test]
    fn scored_lines_need_a_score() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "1,10\n").unwrap();

        assert!(matches!(io::read_scored(file.path()), Err(Error::Parse { line: 1, .. })));
    }
}

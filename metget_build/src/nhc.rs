/*
 * Copyright © 2026, The Water Institute of the Gulf. All rights reserved.
 *
 * The “MetGet” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

//! merging of NHC best-track and forecast advisories into a single ATCF
//! track. The byte layout of the advisory lines is preserved: columns [8, 18)
//! are rewritten to the merged start date and [29, 33) to the delta hours.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use chrono::{DateTime, Duration, Utc};

use metget_common::datetime::{fmt_atcf_date, parse_atcf_date};

use crate::errors::{Result, internal_error};

struct TrackLine {
    line: String,
    date: DateTime<Utc>,
}

fn read_best_track_lines (path: &Path)->Result<Vec<TrackLine>> {
    let mut lines = Vec::new();
    for line in BufReader::new( File::open(path)?).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue
        }
        let date = advisory_date(&line)?;
        lines.push( TrackLine { line: line.trim_end().to_string(), date });
    }
    Ok(lines)
}

fn read_forecast_lines (path: &Path)->Result<Vec<TrackLine>> {
    let mut lines = Vec::new();
    for line in BufReader::new( File::open(path)?).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue
        }
        // forecast lines are valid at base time plus the lead hours column
        let base = advisory_date(&line)?;
        let hours: i64 = field( &line, 5)?.trim().parse()
            .map_err(|_| internal_error( format!("bad forecast hour in '{line}'")))?;
        lines.push( TrackLine { line: line.trim_end().to_string(), date: base + Duration::hours(hours) });
    }
    Ok(lines)
}

fn field (line: &str, index: usize)->Result<&str> {
    line.split(',').nth(index)
        .ok_or_else(|| internal_error( format!("short ATCF line '{line}'")))
}

fn advisory_date (line: &str)->Result<DateTime<Utc>> {
    parse_atcf_date( field( line, 2)?)
        .ok_or_else(|| internal_error( format!("bad ATCF date in '{line}'")))
}

/// rewrite one advisory line onto the merged time base
fn rebase_line (line: &str, start_date_str: &str, delta_hours: i64)->String {
    let bytes = line.as_bytes();
    let head = String::from_utf8_lossy( &bytes[..8.min(bytes.len())]);
    let mid = if bytes.len() > 29 { String::from_utf8_lossy( &bytes[18..29]) } else { "".into() };
    let tail = if bytes.len() > 33 { String::from_utf8_lossy( &bytes[33..]) } else { "".into() };

    format!("{head}{start_date_str}{mid}{delta_hours:4}{tail}")
}

/// merge a best track with a forecast advisory. Best-track lines up to the
/// forecast issue time are kept, hours rebased to the best-track start;
/// forecast rows are appended only for dates the best track does not cover
pub fn merge_nhc_tracks (besttrack_file: &Path, forecast_file: &Path, output_file: &Path)->Result<PathBuf> {
    let btk_lines = read_best_track_lines(besttrack_file)?;
    let fcst_lines = read_forecast_lines(forecast_file)?;

    let start_date = btk_lines.first()
        .map(|l| l.date)
        .ok_or_else(|| internal_error( "empty best track file"))?;
    let start_date_str = fmt_atcf_date(&start_date);

    let first_forecast_date = fcst_lines.first().map(|l| l.date);

    let mut covered_dates = Vec::new();
    let mut merged = File::create(output_file)?;

    for entry in &btk_lines {
        if let Some(first) = first_forecast_date {
            if entry.date > first {
                continue
            }
        }
        covered_dates.push( entry.date);
        let dt = (entry.date - start_date).num_seconds() / 3600;
        writeln!( merged, "{}", rebase_line( &entry.line, &start_date_str, dt))?;
    }

    for entry in &fcst_lines {
        if covered_dates.contains(&entry.date) {
            continue
        }
        let dt = (entry.date - start_date).num_seconds() / 3600;
        writeln!( merged, "{}", rebase_line( &entry.line, &start_date_str, dt))?;
    }

    Ok( output_file.to_path_buf())
}

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
#![allow(unused)]

use chrono::{DateTime, TimeZone, Utc};
use metget_catalog::{FileRecord, select_multiple_forecasts, select_nowcast, select_single_forecast};

fn t (hour: u32)->DateTime<Utc> {
    Utc.with_ymd_and_hms( 2023, 1, 1, hour, 0, 0).unwrap()
}

fn record (id: i64, cycle_hour: u32, tau: i32)->FileRecord {
    let forecast_cycle = t(cycle_hour);
    FileRecord {
        id,
        forecast_cycle,
        valid_time: forecast_cycle + chrono::Duration::hours(tau as i64),
        tau,
        filepath: format!("gfs.t{cycle_hour:02}z.f{tau:03}"),
        accessed: Some( forecast_cycle),
    }
}

/// cycles 00Z and 06Z with tau 0/3/6 each
fn two_cycle_catalog ()->Vec<FileRecord> {
    vec![
        record( 1, 0, 0), record( 2, 0, 3), record( 3, 0, 6),
        record( 4, 6, 0), record( 5, 6, 3), record( 6, 6, 6),
    ]
}

/// cycles 00Z, 06Z and 12Z with tau 0/3/6/9 each
fn three_cycle_catalog ()->Vec<FileRecord> {
    let mut records = Vec::new();
    let mut id = 0;
    for cycle in [0, 6, 12] {
        for tau in [0, 3, 6, 9] {
            id += 1;
            records.push( record( id, cycle, tau));
        }
    }
    records
}

#[test]
fn test_nowcast_selection () {
    // catalog: GFS cycles 00Z and 06Z, tau 0/3/6; window 00Z..06Z
    let records = two_cycle_catalog();
    let selected = select_nowcast(&records);

    assert_eq!( selected.len(), 2);
    assert_eq!( selected[0].valid_time, t(0));
    assert_eq!( selected[1].valid_time, t(6));
    assert!( selected.iter().all(|r| r.tau == 0));
    // the 06Z analysis beats the 00Z tau=6 forecast for the same valid time
    assert_eq!( selected[1].id, 4);
}

#[test]
fn test_multiple_forecasts_stitch () {
    // with a 12Z cycle added, each valid time comes from the freshest cycle
    let records = three_cycle_catalog();
    let selected = select_multiple_forecasts( &records, 0);

    let taus: Vec<i32> = selected.iter().map(|r| r.tau).collect();
    let times: Vec<DateTime<Utc>> = selected.iter().map(|r| r.valid_time).collect();

    assert_eq!( times, vec![t(0), t(3), t(6), t(9), t(12), t(15), t(18), t(21)]);
    assert_eq!( taus[0], 0); // 00Z analysis
    assert_eq!( taus[1], 3); // only 00Z reaches 03Z
    assert_eq!( taus[2], 0); // 06Z analysis supersedes 00Z tau 6
    assert_eq!( taus[4], 0); // 12Z analysis

    // restricted to the request window there is exactly one record per valid time
    let in_window: Vec<&FileRecord> = selected.iter().filter(|r| r.valid_time <= t(12)).collect();
    assert_eq!( in_window.len(), 5);
}

#[test]
fn test_multiple_forecasts_tau_floor () {
    let records = three_cycle_catalog();
    let selected = select_multiple_forecasts( &records, 3);

    assert!( selected.iter().all(|r| r.tau >= 3));
    // per valid time, the smallest qualifying tau wins
    for r in &selected {
        let best_tau = records.iter()
            .filter(|c| c.valid_time == r.valid_time && c.tau >= 3)
            .map(|c| c.tau)
            .min().unwrap();
        assert_eq!( r.tau, best_tau);
    }
}

#[test]
fn test_single_forecast_same_cycle () {
    // with no tau floor, everything comes from the earliest cycle >= start
    let records = three_cycle_catalog();
    let selected = select_single_forecast( &records, t(0), t(12), 0);

    assert!( !selected.is_empty());
    assert!( selected.iter().all(|r| r.forecast_cycle == t(0)));
    assert_eq!( selected.len(), 4);
}

#[test]
fn test_single_forecast_tau_backfill () {
    // tau=3 keeps the 00Z cycle for 03Z/06Z/09Z and backfills the 12Z valid
    // time from the 06Z cycle
    let records = three_cycle_catalog();
    let selected = select_single_forecast( &records, t(0), t(12), 3);

    assert_eq!( selected.len(), 4);
    assert_eq!( selected[0].valid_time, t(3));
    assert_eq!( selected[1].valid_time, t(6));
    assert_eq!( selected[2].valid_time, t(9));
    assert_eq!( selected[3].valid_time, t(12));

    assert_eq!( selected[0].forecast_cycle, t(0));
    assert_eq!( selected[1].forecast_cycle, t(0));
    assert_eq!( selected[2].forecast_cycle, t(0));
    assert_eq!( selected[3].forecast_cycle, t(6)); // tau 6 from the 06Z cycle
    assert!( selected.iter().all(|r| r.tau >= 3));
}

#[test]
fn test_single_forecast_no_coverage () {
    let records = two_cycle_catalog();
    // no cycle starts inside the window
    let selected = select_single_forecast( &records, t(13), t(20), 0);
    assert!( selected.is_empty());
}

#[test]
fn test_valid_times_strictly_ordered_and_unique () {
    let records = three_cycle_catalog();

    for selected in [
        select_nowcast(&records),
        select_multiple_forecasts( &records, 0),
        select_multiple_forecasts( &records, 3),
        select_single_forecast( &records, t(0), t(12), 3),
    ] {
        for pair in selected.windows(2) {
            assert!( pair[0].valid_time < pair[1].valid_time);
        }
    }
}

#[test]
fn test_tie_break_prefers_latest_ingestion () {
    // two records of the same cycle and valid time; the re-ingested one
    // (larger id, later accessed) wins
    let mut records = vec![ record( 10, 0, 3)];
    let mut reingested = record( 11, 0, 3);
    reingested.accessed = Some( t(6));
    records.push( reingested);

    let selected = select_multiple_forecasts( &records, 0);
    assert_eq!( selected.len(), 1);
    assert_eq!( selected[0].id, 11);
}

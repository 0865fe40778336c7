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

use chrono::{TimeZone, Utc};
use ndarray::Array2;

use metget_build::{MetDataset, OutputFile, OutputFormat, OutputGrid};
use metget_sources::{MetDataType, VariableType};

fn constant_dataset (grid: &OutputGrid, press: f64, u: f64, v: f64)->MetDataset {
    let mut dataset = MetDataset::new( grid.ni(), grid.nj());
    dataset.insert( MetDataType::Pressure, Array2::from_elem( (grid.ni(), grid.nj()), press));
    dataset.insert( MetDataType::WindU, Array2::from_elem( (grid.ni(), grid.nj()), u));
    dataset.insert( MetDataType::WindV, Array2::from_elem( (grid.ni(), grid.nj()), v));
    dataset
}

fn wind_pressure_writer (dir: &std::path::Path)->(OutputFile, OutputGrid, Vec<String>) {
    let start = Utc.with_ymd_and_hms( 2023, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms( 2023, 1, 1, 6, 0, 0).unwrap();

    // 80 rows x 92 columns at 0.25 degrees from (-98, 18)
    let grid = OutputGrid::new( -98.0, 18.0, -75.25, 37.75, 0.25, 0.25, 4326).unwrap();

    let filenames = vec![
        dir.join("fort_00.pre").to_string_lossy().to_string(),
        dir.join("fort_00.wnd").to_string_lossy().to_string(),
    ];

    let mut output = OutputFile::create( OutputFormat::OwiAscii, start, end, 3600, false).unwrap();
    output.add_domain( grid.clone(), filenames.clone(), VariableType::WindPressure, "main").unwrap();
    (output, grid, filenames)
}

#[test]
fn test_header_lines () {
    let dir = tempfile::tempdir().unwrap();
    let (mut output, grid, filenames) = wind_pressure_writer( dir.path());

    let start = Utc.with_ymd_and_hms( 2023, 1, 1, 0, 0, 0).unwrap();
    output.open_domain(0).unwrap();
    output.write( 0, &constant_dataset( &grid, 1013.0, 5.0, -5.0), start).unwrap();
    output.close().unwrap();

    let pre = std::fs::read_to_string(&filenames[0]).unwrap();
    let mut lines = pre.lines();

    let file_header = lines.next().unwrap();
    assert!( file_header.starts_with( "Oceanweather WIN/PRE Format"));
    assert!( file_header.contains( "2023010100"));

    let record_header = lines.next().unwrap();
    assert_eq!(
        record_header,
        "iLat=  80iLong=  92DX=0.2500DY=0.2500SWLat= 18.0000SWLon= -98.000DT=202301010000"
    );
}

#[test]
fn test_record_layout () {
    let dir = tempfile::tempdir().unwrap();
    let (mut output, grid, filenames) = wind_pressure_writer( dir.path());

    let start = Utc.with_ymd_and_hms( 2023, 1, 1, 0, 0, 0).unwrap();
    output.open_domain(0).unwrap();
    output.write( 0, &constant_dataset( &grid, 1013.0, 5.0, -5.0), start).unwrap();
    output.close().unwrap();

    let pre = std::fs::read_to_string(&filenames[0]).unwrap();
    let lines: Vec<&str> = pre.lines().collect();

    // 80*92 = 7360 values, 8 per line = 920 value lines after the two headers
    assert_eq!( lines.len(), 2 + 920);
    assert_eq!( lines[2], " 1013.0000 1013.0000 1013.0000 1013.0000 1013.0000 1013.0000 1013.0000 1013.0000");

    // the wnd file carries u then v for the same snapshot
    let wnd = std::fs::read_to_string(&filenames[1]).unwrap();
    let wnd_lines: Vec<&str> = wnd.lines().collect();
    assert_eq!( wnd_lines.len(), 2 + 2 * 920);
    assert!( wnd_lines[2].starts_with( "    5.0000"));
    assert!( wnd_lines[2 + 920].starts_with( "   -5.0000"));
}

#[test]
fn test_snapshot_count_matches_time_span () {
    let dir = tempfile::tempdir().unwrap();
    let (mut output, grid, filenames) = wind_pressure_writer( dir.path());

    let start = Utc.with_ymd_and_hms( 2023, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms( 2023, 1, 1, 6, 0, 0).unwrap();

    output.open_domain(0).unwrap();
    let mut time = start;
    let mut snaps = 0;
    while time <= end {
        output.write( 0, &constant_dataset( &grid, 1013.0, 5.0, -5.0), time).unwrap();
        time += chrono::Duration::hours(1);
        snaps += 1;
    }
    output.close().unwrap();

    // floor((end-start)/step) + 1 snapshots
    assert_eq!( snaps, 7);
    let pre = std::fs::read_to_string(&filenames[0]).unwrap();
    let record_headers = pre.lines().filter(|l| l.starts_with("iLat=")).count();
    assert_eq!( record_headers, 7);
}

#[test]
fn test_out_of_order_write_is_rejected () {
    let dir = tempfile::tempdir().unwrap();
    let (mut output, grid, _) = wind_pressure_writer( dir.path());

    let t0 = Utc.with_ymd_and_hms( 2023, 1, 1, 0, 0, 0).unwrap();
    let t1 = Utc.with_ymd_and_hms( 2023, 1, 1, 1, 0, 0).unwrap();
    let dataset = constant_dataset( &grid, 1013.0, 5.0, -5.0);

    output.open_domain(0).unwrap();
    output.write( 0, &dataset, t1).unwrap();
    assert!( output.write( 0, &dataset, t0).is_err()); // backwards
    assert!( output.write( 0, &dataset, t1).is_err()); // repeated
}

#[test]
fn test_write_after_close_is_rejected () {
    let dir = tempfile::tempdir().unwrap();
    let (mut output, grid, _) = wind_pressure_writer( dir.path());

    let t0 = Utc.with_ymd_and_hms( 2023, 1, 1, 0, 0, 0).unwrap();
    let t1 = Utc.with_ymd_and_hms( 2023, 1, 1, 1, 0, 0).unwrap();
    let dataset = constant_dataset( &grid, 1013.0, 5.0, -5.0);

    output.open_domain(0).unwrap();
    output.write( 0, &dataset, t0).unwrap();
    output.close_domain(0).unwrap();
    assert!( output.write( 0, &dataset, t1).is_err());
}

#[test]
fn test_gzip_compression () {
    let dir = tempfile::tempdir().unwrap();
    let start = Utc.with_ymd_and_hms( 2023, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms( 2023, 1, 1, 6, 0, 0).unwrap();
    let grid = OutputGrid::new( -98.0, 18.0, -90.0, 25.0, 1.0, 1.0, 4326).unwrap();

    let filename = dir.path().join("fort_00.precip.gz").to_string_lossy().to_string();
    let mut output = OutputFile::create( OutputFormat::OwiAscii, start, end, 3600, true).unwrap();
    output.add_domain( grid.clone(), vec![filename.clone()], VariableType::Precipitation, "main").unwrap();

    let mut dataset = MetDataset::new( grid.ni(), grid.nj());
    dataset.insert( MetDataType::Precipitation, Array2::from_elem( (grid.ni(), grid.nj()), 1.5));

    output.open_domain(0).unwrap();
    output.write( 0, &dataset, start).unwrap();
    output.close().unwrap();

    let bytes = std::fs::read(&filename).unwrap();
    assert_eq!( &bytes[..2], &[0x1f, 0x8b]); // gzip magic
}

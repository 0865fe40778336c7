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

//! end-to-end check over the in-process pipeline: a synthetic constant-field
//! GRIB goes through decode, interpolation, sequencing and the OWI ASCII
//! writer, and the constant comes out at every cell.

mod common;

use chrono::{TimeZone, Utc};

use common::{TestGrid, build_grib_file, wind_pressure_products};
use metget_build::{FileObj, Meteorology, OutputFile, OutputFormat, OutputGrid};
use metget_sources::{VariableType, descriptor_for_service};

#[test]
fn test_constant_field_round_trip () {
    let dir = tempfile::tempdir().unwrap();
    let gfs = descriptor_for_service("gfs-ncep").unwrap();

    let source = TestGrid { ni: 21, nj: 21, lat1: 5.0, lon1: 255.0, di: 1.0, dj: 1.0, bitmap: None };
    let grib = dir.path().join("gfs.grib2");
    std::fs::write( &grib, build_grib_file( &source, &wind_pressure_products( 5.0, -5.0, 101300.0))).unwrap();

    let start = Utc.with_ymd_and_hms( 2023, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms( 2023, 1, 1, 6, 0, 0).unwrap();
    let grid = OutputGrid::new( -98.0, 12.0, -93.0, 17.0, 0.5, 0.5, 4326).unwrap();

    let mut meteo = Meteorology::new( &grid, "gfs-ncep", VariableType::WindPressure, false, 0).unwrap();
    meteo.set_next_file( FileObj::single( grib.clone(), gfs, start));
    meteo.set_next_file( FileObj::single( grib, gfs, end));
    meteo.process_files().unwrap();

    let filenames = vec![
        dir.path().join("out.pre").to_string_lossy().to_string(),
        dir.path().join("out.wnd").to_string_lossy().to_string(),
    ];
    let mut output = OutputFile::create( OutputFormat::OwiAscii, start, end, 3600, false).unwrap();
    output.add_domain( grid.clone(), filenames.clone(), VariableType::WindPressure, "main").unwrap();
    output.open_domain(0).unwrap();

    let mut time = start;
    while time <= end {
        let dataset = meteo.get(time).unwrap();
        output.write( 0, &dataset, time).unwrap();
        time += chrono::Duration::hours(1);
    }
    output.close().unwrap();

    // the pressure file holds 1013.0000 at every cell of every snapshot
    let pre = std::fs::read_to_string(&filenames[0]).unwrap();
    for line in pre.lines().skip(1).filter(|l| !l.starts_with("iLat=")) {
        for chunk in line.as_bytes().chunks(10) {
            let value: f64 = std::str::from_utf8(chunk).unwrap().trim().parse().unwrap();
            assert!( (value - 1013.0).abs() < 1e-3);
        }
    }

    // the wind file alternates u and v blocks; every value is one of them
    let wnd = std::fs::read_to_string(&filenames[1]).unwrap();
    for line in wnd.lines().skip(1).filter(|l| !l.starts_with("iLat=")) {
        for chunk in line.as_bytes().chunks(10) {
            let value: f64 = std::str::from_utf8(chunk).unwrap().trim().parse().unwrap();
            assert!( (value.abs() - 5.0).abs() < 1e-3);
        }
    }
}

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

fn small_grid ()->OutputGrid {
    OutputGrid::new( -98.0, 18.0, -94.0, 21.0, 1.0, 1.0, 4326).unwrap()
}

fn wind_pressure_dataset (grid: &OutputGrid)->MetDataset {
    let mut dataset = MetDataset::new( grid.ni(), grid.nj());
    dataset.insert( MetDataType::Pressure, Array2::from_elem( (grid.ni(), grid.nj()), 1013.0));
    dataset.insert( MetDataType::WindU, Array2::from_elem( (grid.ni(), grid.nj()), 5.0));
    dataset.insert( MetDataType::WindV, Array2::from_elem( (grid.ni(), grid.nj()), -5.0));
    dataset
}

#[test]
fn test_owi_netcdf_groups_in_request_order () {
    let dir = tempfile::tempdir().unwrap();
    let start = Utc.with_ymd_and_hms( 2023, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms( 2023, 1, 1, 6, 0, 0).unwrap();
    let grid = small_grid();

    let filename = dir.path().join("fort.nc").to_string_lossy().to_string();
    let mut output = OutputFile::create( OutputFormat::OwiNetcdf, start, end, 3600, false).unwrap();

    // a fine domain listed first, a coarse one second; the group order must
    // follow the request order, not the resolution
    output.add_domain( grid.clone(), vec![filename.clone()], VariableType::WindPressure, "storm").unwrap();
    output.add_domain( grid.clone(), vec![filename.clone()], VariableType::WindPressure, "basin").unwrap();

    let dataset = wind_pressure_dataset(&grid);
    for index in 0..2 {
        output.open_domain(index).unwrap();
        output.write( index, &dataset, start).unwrap();
        output.write( index, &dataset, start + chrono::Duration::hours(1)).unwrap();
        output.close_domain(index).unwrap();
    }
    output.close().unwrap();

    let file = netcdf::open(&filename).unwrap();

    let order = file.attribute("group_order").unwrap();
    match order.value().unwrap() {
        netcdf::AttributeValue::Str(value) => assert_eq!( value, "storm basin"),
        other => panic!("unexpected group_order attribute {other:?}"),
    }

    let storm = file.group("storm").unwrap().expect("storm group");
    let u10 = storm.variable("U10").unwrap();
    assert_eq!( u10.dimensions().len(), 3);

    let values: Vec<f32> = u10.get_values( (0, .., ..)).unwrap();
    assert_eq!( values.len(), grid.n());
    assert!( values.iter().all(|v| (*v - 5.0).abs() < 1e-5));

    let time = storm.variable("time").unwrap();
    let stamps: Vec<i64> = time.get_values(..).unwrap();
    assert_eq!( stamps.len(), 2);
    assert_eq!( stamps[1] - stamps[0], 60); // one hour in minutes

    // minutes since 1990-01-01 for 2023-01-01T00
    let epoch = Utc.with_ymd_and_hms( 1990, 1, 1, 0, 0, 0).unwrap();
    assert_eq!( stamps[0], (start - epoch).num_minutes());
}

#[test]
fn test_owi_netcdf_rejects_out_of_order_times () {
    let dir = tempfile::tempdir().unwrap();
    let start = Utc.with_ymd_and_hms( 2023, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms( 2023, 1, 1, 6, 0, 0).unwrap();
    let grid = small_grid();

    let filename = dir.path().join("fort.nc").to_string_lossy().to_string();
    let mut output = OutputFile::create( OutputFormat::OwiNetcdf, start, end, 3600, false).unwrap();
    output.add_domain( grid.clone(), vec![filename], VariableType::WindPressure, "main").unwrap();

    let dataset = wind_pressure_dataset(&grid);
    output.open_domain(0).unwrap();
    output.write( 0, &dataset, start + chrono::Duration::hours(1)).unwrap();
    assert!( output.write( 0, &dataset, start).is_err());
}

#[test]
fn test_cf_netcdf_structure () {
    let dir = tempfile::tempdir().unwrap();
    let start = Utc.with_ymd_and_hms( 2023, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms( 2023, 1, 1, 6, 0, 0).unwrap();
    let grid = small_grid();

    let filename = dir.path().join("forcing.nc").to_string_lossy().to_string();
    let mut output = OutputFile::create( OutputFormat::CfNetcdf, start, end, 3600, false).unwrap();
    output.add_domain( grid.clone(), vec![filename.clone()], VariableType::WindPressure, "main").unwrap();

    let dataset = wind_pressure_dataset(&grid);
    output.open_domain(0).unwrap();
    output.write( 0, &dataset, start).unwrap();
    output.write( 0, &dataset, start + chrono::Duration::hours(3)).unwrap();
    output.close().unwrap();

    let file = netcdf::open(&filename).unwrap();

    let conventions = file.attribute("Conventions").unwrap();
    match conventions.value().unwrap() {
        netcdf::AttributeValue::Str(value) => assert!( value.starts_with("CF-1.6")),
        other => panic!("unexpected Conventions attribute {other:?}"),
    }

    // 1-D coordinate axes
    let lon = file.variable("lon").unwrap();
    assert_eq!( lon.dimensions().len(), 1);
    let lon_values: Vec<f64> = lon.get_values(..).unwrap();
    assert_eq!( lon_values.len(), grid.nj());
    assert_eq!( lon_values[0], -98.0);

    // variables carry the canonical names and the crs mapping exists
    assert!( file.variable("mslp").is_some());
    assert!( file.variable("wind_u").is_some());
    assert!( file.variable("crs").is_some());

    // time is minutes since the request start
    let time = file.variable("time").unwrap();
    let stamps: Vec<f64> = time.get_values(..).unwrap();
    assert_eq!( stamps, vec![0.0, 180.0]);

    let mslp = file.variable("mslp").unwrap();
    let values: Vec<f64> = mslp.get_values( (1, .., ..)).unwrap();
    assert!( values.iter().all(|v| (*v - 1013.0).abs() < 1e-9));
}

#[test]
fn test_cf_netcdf_secondary_domain_filenames () {
    let dir = tempfile::tempdir().unwrap();
    let start = Utc.with_ymd_and_hms( 2023, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms( 2023, 1, 1, 6, 0, 0).unwrap();
    let grid = small_grid();

    let filename = dir.path().join("forcing.nc").to_string_lossy().to_string();
    let mut output = OutputFile::create( OutputFormat::CfNetcdf, start, end, 3600, false).unwrap();
    output.add_domain( grid.clone(), vec![filename.clone()], VariableType::Wind, "outer").unwrap();
    output.add_domain( grid.clone(), vec![filename.clone()], VariableType::Wind, "inner").unwrap();

    let names = output.filenames();
    assert_eq!( names.len(), 2);
    assert!( names[0].ends_with("forcing.nc"));
    assert!( names[1].ends_with("forcing_01.nc"));
}

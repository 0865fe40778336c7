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

mod common;

use chrono::{TimeZone, Utc};

use common::{TestGrid, build_grib_file, wind_pressure_products};
use metget_build::{DataInterpolator, FileObj, OutputGrid, gaussian_filter_nan};
use metget_sources::{MetDataType, VariableType, descriptor_for_service};

/// coarse source covering the whole target at 1 degree
fn coarse_grid ()->TestGrid {
    TestGrid { ni: 21, nj: 21, lat1: 5.0, lon1: 255.0, di: 1.0, dj: 1.0, bitmap: None }
}

/// fine nested source covering (261..264, 13..16) at 0.25 degrees
fn fine_grid ()->TestGrid {
    TestGrid { ni: 13, nj: 13, lat1: 13.0, lon1: 261.0, di: 0.25, dj: 0.25, bitmap: None }
}

fn target_grid ()->OutputGrid {
    OutputGrid::new( -98.0, 12.0, -93.0, 17.0, 0.5, 0.5, 4326).unwrap()
}

fn build_nested_snapshot (dir: &std::path::Path)->FileObj {
    let hafs = descriptor_for_service("ncep-hafs-a").unwrap();

    let fine = dir.join("storm.grib2");
    std::fs::write( &fine, build_grib_file( &fine_grid(), &wind_pressure_products( 1.0, 1.0, 100000.0))).unwrap();

    let coarse = dir.join("parent.grib2");
    std::fs::write( &coarse, build_grib_file( &coarse_grid(), &wind_pressure_products( 2.0, 2.0, 101000.0))).unwrap();

    // pass the coarse file first: the merge must reorder by resolution
    FileObj::new( vec![coarse, fine], hafs, Utc.with_ymd_and_hms( 2023, 1, 1, 0, 0, 0).unwrap())
}

#[test]
fn test_nested_merge_priority () {
    let dir = tempfile::tempdir().unwrap();
    let f_obj = build_nested_snapshot( dir.path());

    let grid = target_grid();
    let mut interp = DataInterpolator::new( grid.clone(), false, 0);
    let merged = interp.interpolate( &f_obj, VariableType::WindPressure, false).unwrap();

    let u = merged.get( MetDataType::WindU).unwrap();

    // (i, j) of a point well inside the fine domain: x = -97.5 -> 262.5, y = 14.5
    let (fi, fj) = grid.index_of( -97.5, 14.5);
    assert!( (u[[fi, fj]] - 1.0).abs() < 1e-6, "fine source must win inside its footprint");

    // a point only the coarse source covers
    let (ci, cj) = grid.index_of( -93.5, 16.5);
    assert!( (u[[ci, cj]] - 2.0).abs() < 1e-6, "coarse source must fill the holes");

    // nothing is left undefined: the coarse source spans the whole grid
    assert!( u.iter().all(|v| !v.is_nan()));
}

#[test]
fn test_boundary_smoothing_preserves_interior () {
    let dir = tempfile::tempdir().unwrap();
    let f_obj = build_nested_snapshot( dir.path());

    let grid = target_grid();
    let mut interp = DataInterpolator::new( grid.clone(), false, 0);
    let merged = interp.interpolate( &f_obj, VariableType::WindPressure, true).unwrap();

    let u = merged.get( MetDataType::WindU).unwrap();

    // the fine footprint spans (261..264, 13..16); its smoothing ring reaches
    // 1.25 degrees (5 x 0.25) to each side of the boundary. The center cell is
    // 1.5 degrees from every edge and must be untouched
    let (fi, fj) = grid.index_of( -97.5, 14.5);
    assert!( (u[[fi, fj]] - 1.0).abs() < 1e-6, "interior of the finest source must not change");

    // far outside the ring the coarse value is untouched as well
    let (ci, cj) = grid.index_of( -93.0, 17.0);
    assert!( (u[[ci, cj]] - 2.0).abs() < 1e-6);
}

#[test]
fn test_fill_value_outside_coverage () {
    let dir = tempfile::tempdir().unwrap();
    let hafs = descriptor_for_service("ncep-hafs-a").unwrap();

    // only the fine nested source; most of the target grid is uncovered
    let fine = dir.path().join("storm.grib2");
    std::fs::write( &fine, build_grib_file( &fine_grid(), &wind_pressure_products( 1.0, 1.0, 100000.0))).unwrap();
    let f_obj = FileObj::new( vec![fine], hafs, Utc.with_ymd_and_hms( 2023, 1, 1, 0, 0, 0).unwrap());

    let grid = target_grid();

    // outermost domain: holes become the canonical fill value
    let mut interp = DataInterpolator::new( grid.clone(), false, 0);
    let merged = interp.interpolate( &f_obj, VariableType::WindPressure, false).unwrap();
    let u = merged.get( MetDataType::WindU).unwrap();
    let (i, j) = grid.index_of( -93.5, 12.0);
    assert_eq!( u[[i, j]], -999.0);

    // nested domain under backfill: holes take the physical default instead
    let mut interp = DataInterpolator::new( grid.clone(), true, 1);
    let merged = interp.interpolate( &f_obj, VariableType::WindPressure, false).unwrap();
    let press = merged.get( MetDataType::Pressure).unwrap();
    assert_eq!( press[[i, j]], 1013.0);
    let u = merged.get( MetDataType::WindU).unwrap();
    assert_eq!( u[[i, j]], 0.0);
}

#[test]
fn test_gaussian_filter_nan_handling () {
    use ndarray::Array2;

    // a constant field stays constant under the normalized kernel
    let constant = Array2::from_elem( (10, 10), 3.0);
    let smoothed = gaussian_filter_nan( &constant, 1.5);
    for v in smoothed.iter() {
        assert!( (v - 3.0).abs() < 1e-9);
    }

    // undefined cells stay undefined and do not poison their neighbors
    let mut holey = Array2::from_elem( (10, 10), 3.0);
    holey[[5, 5]] = f64::NAN;
    let smoothed = gaussian_filter_nan( &holey, 1.5);
    assert!( smoothed[[5, 5]].is_nan());
    assert!( (smoothed[[5, 6]] - 3.0).abs() < 1e-9);
    assert!( (smoothed[[0, 0]] - 3.0).abs() < 1e-9);
}

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

use metget_build::OutputGrid;

#[test]
fn test_axis_counts () {
    // the wnat-style grid of the OWI header check: 92 columns, 80 rows
    let grid = OutputGrid::new( -98.0, 18.0, -75.25, 37.75, 0.25, 0.25, 4326).unwrap();
    assert_eq!( grid.nj(), 92);
    assert_eq!( grid.ni(), 80);
    assert_eq!( grid.n(), 92 * 80);
}

#[test]
fn test_swapped_corners_are_canonicalized () {
    let grid = OutputGrid::new( -75.25, 37.75, -98.0, 18.0, 0.25, 0.25, 4326).unwrap();
    assert_eq!( grid.x_lower_left(), -98.0);
    assert_eq!( grid.y_lower_left(), 18.0);
    assert_eq!( grid.x_upper_right(), -75.25);
    assert_eq!( grid.y_upper_right(), 37.75);
}

#[test]
fn test_invalid_grids () {
    // degenerate extent
    assert!( OutputGrid::new( -98.0, 18.0, -98.0, 37.75, 0.25, 0.25, 4326).is_err());
    // nonpositive resolution
    assert!( OutputGrid::new( -98.0, 18.0, -75.0, 37.75, 0.0, 0.25, 4326).is_err());
    // fewer than 3 cells on an axis
    assert!( OutputGrid::new( -98.0, 18.0, -97.75, 37.75, 0.25, 0.25, 4326).is_err());
}

#[test]
fn test_corner_index_round_trip () {
    let grid = OutputGrid::new( -98.0, 18.0, -90.0, 25.0, 0.25, 0.5, 4326).unwrap();

    for i in 0..grid.ni() {
        for j in 0..grid.nj() {
            let (x, y) = grid.corner( i, j).unwrap();
            assert_eq!( grid.index_of( x, y), (i, j));
        }
    }

    assert!( grid.corner( grid.ni(), 0).is_none());
    assert!( grid.corner( 0, grid.nj()).is_none());
}

#[test]
fn test_center_offset () {
    let grid = OutputGrid::new( -98.0, 18.0, -90.0, 25.0, 0.25, 0.5, 4326).unwrap();
    let (cx, cy) = grid.center( 0, 0).unwrap();
    assert!( (cx - (-97.875)).abs() < 1e-12);
    assert!( (cy - 18.25).abs() < 1e-12);
}

#[test]
fn test_x_column_convert_360 () {
    let grid = OutputGrid::new( -98.0, 18.0, -90.0, 25.0, 1.0, 1.0, 4326).unwrap();

    let plain = grid.x_column(false);
    assert_eq!( plain[0], -98.0);

    let shifted = grid.x_column(true);
    assert_eq!( shifted[0], 262.0);
    assert_eq!( shifted.len(), plain.len());
    assert!( shifted.iter().all(|x| *x >= 0.0));
}

#[test]
fn test_is_inside () {
    let grid = OutputGrid::new( -98.0, 18.0, -90.0, 25.0, 1.0, 1.0, 4326).unwrap();
    assert!( grid.is_inside( -95.0, 20.0));
    assert!( grid.is_inside( -98.0, 18.0));
    assert!( !grid.is_inside( -89.0, 20.0));
    assert!( !grid.is_inside( -95.0, 17.0));
}

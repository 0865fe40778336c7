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

//! the regular lon/lat target grid of one output domain.
//!
//! `i` indexes latitude rows (0..ni), `j` indexes longitude columns (0..nj).

use crate::errors::{Result, validation_error};

const MIN_GRID_CELLS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct OutputGrid {
    x_lower_left: f64,
    y_lower_left: f64,
    x_upper_right: f64,
    y_upper_right: f64,
    x_resolution: f64,
    y_resolution: f64,
    epsg: i32,

    x_points: Vec<f64>,
    y_points: Vec<f64>,
}

impl OutputGrid {
    /// construct the grid, canonicalizing swapped corners. Axis vectors run
    /// from the lower-left corner inclusive of the upper-right corner
    pub fn new (x_lower_left: f64, y_lower_left: f64, x_upper_right: f64, y_upper_right: f64,
                x_resolution: f64, y_resolution: f64, epsg: i32)->Result<OutputGrid>
    {
        let (x_lower_left, x_upper_right) = if x_lower_left > x_upper_right {
            (x_upper_right, x_lower_left)
        } else {
            (x_lower_left, x_upper_right)
        };
        let (y_lower_left, y_upper_right) = if y_lower_left > y_upper_right {
            (y_upper_right, y_lower_left)
        } else {
            (y_lower_left, y_upper_right)
        };

        if x_lower_left == x_upper_right || y_lower_left == y_upper_right {
            return Err( validation_error( "grid corners must span a nonzero area"))
        }
        if x_resolution <= 0.0 || y_resolution <= 0.0 {
            return Err( validation_error( "grid resolution must be greater than 0"))
        }

        let nx = axis_count( x_lower_left, x_upper_right, x_resolution);
        let ny = axis_count( y_lower_left, y_upper_right, y_resolution);
        if nx < MIN_GRID_CELLS || ny < MIN_GRID_CELLS {
            return Err( validation_error(
                format!("grid resolution too coarse, need at least {MIN_GRID_CELLS} points per axis")))
        }

        let x_points = (0..nx).map(|j| x_lower_left + j as f64 * x_resolution).collect();
        let y_points = (0..ny).map(|i| y_lower_left + i as f64 * y_resolution).collect();

        Ok( OutputGrid {
            x_lower_left, y_lower_left, x_upper_right, y_upper_right,
            x_resolution, y_resolution, epsg,
            x_points, y_points,
        })
    }

    pub fn x_lower_left (&self)->f64 { self.x_lower_left }
    pub fn y_lower_left (&self)->f64 { self.y_lower_left }
    pub fn x_upper_right (&self)->f64 { self.x_upper_right }
    pub fn y_upper_right (&self)->f64 { self.y_upper_right }
    pub fn x_resolution (&self)->f64 { self.x_resolution }
    pub fn y_resolution (&self)->f64 { self.y_resolution }
    pub fn epsg (&self)->i32 { self.epsg }

    /// number of latitude rows
    pub fn ni (&self)->usize { self.y_points.len() }

    /// number of longitude columns
    pub fn nj (&self)->usize { self.x_points.len() }

    pub fn n (&self)->usize { self.ni() * self.nj() }

    /// the longitude axis; `convert_360` shifts negative longitudes by +360
    /// to match the GRIB convention
    pub fn x_column (&self, convert_360: bool)->Vec<f64> {
        if convert_360 {
            self.x_points.iter().map(|x| if *x < 0.0 { x + 360.0 } else { *x }).collect()
        } else {
            self.x_points.clone()
        }
    }

    pub fn y_column (&self)->Vec<f64> {
        self.y_points.clone()
    }

    pub fn corner (&self, i: usize, j: usize)->Option<(f64, f64)> {
        if i >= self.ni() || j >= self.nj() {
            return None
        }
        Some( (self.x_points[j], self.y_points[i]) )
    }

    pub fn center (&self, i: usize, j: usize)->Option<(f64, f64)> {
        self.corner( i, j).map(|(x, y)| (x + self.x_resolution / 2.0, y + self.y_resolution / 2.0))
    }

    /// the (i, j) cell of a point; `index_of(corner(i,j)) == (i,j)`
    pub fn index_of (&self, x: f64, y: f64)->(usize, usize) {
        let j = ((x - self.x_lower_left) / self.x_resolution + 0.5).floor().max(0.0) as usize;
        let i = ((y - self.y_lower_left) / self.y_resolution + 0.5).floor().max(0.0) as usize;
        (i, j)
    }

    pub fn width (&self)->f64 { self.x_upper_right - self.x_lower_left }

    pub fn height (&self)->f64 { self.y_upper_right - self.y_lower_left }

    pub fn centroid (&self)->(f64, f64) {
        (self.x_lower_left + self.width() / 2.0, self.y_lower_left + self.height() / 2.0)
    }

    pub fn corners (&self)->[(f64, f64); 4] {
        [
            (self.x_lower_left, self.y_lower_left),
            (self.x_lower_left, self.y_upper_right),
            (self.x_upper_right, self.y_upper_right),
            (self.x_upper_right, self.y_lower_left),
        ]
    }

    pub fn is_inside (&self, x: f64, y: f64)->bool {
        x >= self.x_lower_left && x <= self.x_upper_right
            && y >= self.y_lower_left && y <= self.y_upper_right
    }
}

fn axis_count (lower: f64, upper: f64, resolution: f64)->usize {
    ((upper - lower) / resolution + 1.0e-6).floor() as usize + 1
}

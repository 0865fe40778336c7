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

//! decoded GRIB fields on a regular lat/lon grid

use ndarray::Array2;

use crate::decode::decode_values;
use crate::errors::{MetgetGribError, Result};
use crate::message::{GribMessage, GridDefinition, LatLonGrid};

/// a single decoded 2-D field. Latitude ascends, longitude follows the wire
/// convention (0..360 for the NOAA products), values are `[lat][lon]`
#[derive(Debug, Clone)]
pub struct GribField {
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    pub values: Array2<f64>,
}

impl GribField {
    pub fn nlat (&self)->usize { self.lat.len() }
    pub fn nlon (&self)->usize { self.lon.len() }

    /// extract the field of one message, normalizing row order so latitude ascends
    pub fn from_message (msg: &GribMessage)->Result<GribField> {
        let grid = match &msg.grid {
            GridDefinition::LatLon(g) => g,
            GridDefinition::Unsupported(n) => return Err( MetgetGribError::UnsupportedGrid(*n)),
        };

        let values = decode_values(msg)?;
        if values.len() < grid.ni * grid.nj {
            return Err( MetgetGribError::Truncated(
                format!("grid wants {} points, decoded {}", grid.ni * grid.nj, values.len())))
        }

        let mut array = Array2::from_shape_vec( (grid.nj, grid.ni), values[..grid.ni * grid.nj].to_vec())
            .map_err(|e| MetgetGribError::DecodeError( e.to_string()))?;

        let mut lat = lat_axis(grid);
        if !grid.scans_positive_j() {
            // wire order is north to south; flip to ascending latitude
            lat.reverse();
            array.invert_axis( ndarray::Axis(0));
        }
        if grid.scans_negative_i() {
            array.invert_axis( ndarray::Axis(1));
        }

        Ok( GribField { lat, lon: lon_axis(grid), values: array })
    }
}

fn lat_axis (grid: &LatLonGrid)->Vec<f64> {
    let step = if grid.scans_positive_j() { grid.dj } else { -grid.dj };
    (0..grid.nj).map(|j| grid.lat1 + step * j as f64).collect()
}

fn lon_axis (grid: &LatLonGrid)->Vec<f64> {
    let step = if grid.scans_negative_i() { -grid.di } else { grid.di };
    let mut lon: Vec<f64> = (0..grid.ni).map(|i| grid.lon1 + step * i as f64).collect();
    if grid.scans_negative_i() {
        lon.reverse();
    }
    lon
}

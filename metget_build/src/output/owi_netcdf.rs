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

//! the OWI NetCDF writer: one NetCDF-4 file, one group per domain in request
//! order. Group order is the insertion order of the request's domain list and
//! is never re-sorted.

use chrono::{DateTime, NaiveDate, Utc};
use ndarray::Array2;

use metget_sources::{FILL_VALUE, MetDataType, VariableType};

use crate::errors::{Result, internal_error, writer_state};
use crate::met_dataset::MetDataset;
use crate::output::owi_variable_map;
use crate::output_grid::OutputGrid;

const COMPRESSION_LEVEL: i32 = 4;

pub struct OwiNetcdfOutput {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    filename: Option<String>,
    file: Option<netcdf::FileMut>,
    domains: Vec<OwiNetcdfDomain>,
}

struct OwiNetcdfDomain {
    grid: OutputGrid,
    group_name: String,
    group_rank: i32,
    variable_type: VariableType,
    snap_count: usize,
    is_open: bool,
    last_time: Option<DateTime<Utc>>,
}

impl OwiNetcdfOutput {
    pub fn new (start: DateTime<Utc>, end: DateTime<Utc>)->Self {
        OwiNetcdfOutput { start, end, filename: None, file: None, domains: Vec::new() }
    }

    /// all domains share one file; the first registered filename wins
    pub fn add_domain (&mut self, grid: OutputGrid, filenames: Vec<String>,
                       variable_type: VariableType, name: &str)->Result<()>
    {
        let filename = filenames.first()
            .ok_or_else(|| writer_state( "owi-netcdf needs a filename"))?;
        if self.filename.is_none() {
            self.filename = Some( filename.clone());
        }

        let group_rank = self.domains.len() as i32 + 1;
        self.domains.push( OwiNetcdfDomain {
            grid,
            group_name: name.to_string(),
            group_rank,
            variable_type,
            snap_count: 0,
            is_open: false,
            last_time: None,
        });
        Ok(())
    }

    pub fn domain_count (&self)->usize { self.domains.len() }

    pub fn open_domain (&mut self, index: usize)->Result<()> {
        if self.file.is_none() {
            let filename = self.filename.as_ref()
                .ok_or_else(|| writer_state( "no domains registered"))?;
            self.file = Some( netcdf::create(filename)?);
        }

        let file = self.file.as_mut().unwrap();
        let domain = self.domains.get_mut(index)
            .ok_or_else(|| internal_error( format!("no output domain {index}")))?;
        domain.initialize(file)?;
        Ok(())
    }

    pub fn write (&mut self, index: usize, dataset: &MetDataset, time: DateTime<Utc>)->Result<()> {
        let file = self.file.as_mut()
            .ok_or_else(|| writer_state( "write before open"))?;
        let domain = self.domains.get_mut(index)
            .ok_or_else(|| internal_error( format!("no output domain {index}")))?;
        domain.write( file, dataset, time)
    }

    pub fn close_domain (&mut self, index: usize)->Result<()> {
        if let Some(domain) = self.domains.get_mut(index) {
            domain.is_open = false;
        }
        Ok(())
    }

    pub fn close (&mut self)->Result<()> {
        if let Some(mut file) = self.file.take() {
            let group_order: Vec<String> = self.domains.iter().map(|d| d.group_name.clone()).collect();
            file.add_attribute( "group_order", group_order.join(" "))?;
        }
        Ok(())
    }

    pub fn filenames (&self)->Vec<String> {
        self.filename.iter().cloned().collect()
    }
}

impl OwiNetcdfDomain {
    fn initialize (&mut self, file: &mut netcdf::FileMut)->Result<()> {
        let grid = &self.grid;
        let mut group = file.add_group(&self.group_name)?;

        group.add_dimension( "xi", grid.nj())?;
        group.add_dimension( "yi", grid.ni())?;
        group.add_unlimited_dimension( "time")?;

        let mut lat_var = group.add_variable::<f64>( "lat", &["yi", "xi"])?;
        lat_var.put_attribute( "units", "degrees_north")?;
        lat_var.put_attribute( "long_name", "latitude")?;
        lat_var.put_attribute( "axis", "Y")?;
        lat_var.put_attribute( "coordinates", "lat lon")?;

        let mut lon_var = group.add_variable::<f64>( "lon", &["yi", "xi"])?;
        lon_var.put_attribute( "units", "degrees_east")?;
        lon_var.put_attribute( "long_name", "longitude")?;
        lon_var.put_attribute( "axis", "X")?;
        lon_var.put_attribute( "coordinates", "lat lon")?;

        let mut time_var = group.add_variable::<i64>( "time", &["time"])?;
        time_var.put_attribute( "units", "minutes since 1990-01-01T00:00:00")?;
        time_var.put_attribute( "calendar", "proleptic_gregorian")?;

        group.add_attribute( "rank", self.group_rank)?;

        for (name, met_type) in owi_variable_map(self.variable_type)? {
            let mut var = group.add_variable::<f32>( name, &["time", "yi", "xi"])?;
            var.set_compression( COMPRESSION_LEVEL, true)?;
            var.set_fill_value( FILL_VALUE as f32)?;
            var.put_attribute( "units", met_type.units())?;
            var.put_attribute( "long_name", met_type.cf_long_name())?;
            var.put_attribute( "coordinates", "time lat lon")?;
        }

        // materialize the coordinate arrays
        let x = grid.x_column(false);
        let y = grid.y_column();
        let mut lon2d = Vec::with_capacity( grid.n());
        let mut lat2d = Vec::with_capacity( grid.n());
        for yv in &y {
            for xv in &x {
                lon2d.push(*xv);
                lat2d.push(*yv);
            }
        }
        let mut lon_var = group.variable_mut("lon")
            .ok_or_else(|| internal_error( "lon variable missing"))?;
        lon_var.put_values( &lon2d, (.., ..))?;
        let mut lat_var = group.variable_mut("lat")
            .ok_or_else(|| internal_error( "lat variable missing"))?;
        lat_var.put_values( &lat2d, (.., ..))?;

        self.is_open = true;
        Ok(())
    }

    fn write (&mut self, file: &mut netcdf::FileMut, dataset: &MetDataset, time: DateTime<Utc>)->Result<()> {
        if !self.is_open {
            return Err( writer_state( "write on a closed owi-netcdf domain"))
        }
        if let Some(last) = self.last_time {
            if time <= last {
                return Err( writer_state( format!("snapshot {time} written after {last}")))
            }
        }

        let index = self.snap_count;
        let minutes_since = owi_epoch_minutes(time);

        let mut group = file.group_mut(&self.group_name)?
            .ok_or_else(|| internal_error( format!("group {} missing", self.group_name)))?;

        let mut time_var = group.variable_mut("time")
            .ok_or_else(|| internal_error( "time variable missing"))?;
        time_var.put_values( &[minutes_since], index..index + 1)?;

        for (name, met_type) in owi_variable_map(self.variable_type)? {
            let values = dataset.get(met_type)
                .ok_or_else(|| internal_error( format!("dataset is missing {met_type}")))?;
            write_record( &mut group, name, index, values, &self.grid)?;
        }

        self.snap_count += 1;
        self.last_time = Some(time);
        Ok(())
    }
}

fn write_record (group: &mut netcdf::GroupMut, name: &str, index: usize,
                 values: &Array2<f64>, grid: &OutputGrid)->Result<()>
{
    if values.dim() != (grid.ni(), grid.nj()) {
        return Err( internal_error(
            format!("field shape {:?} does not match grid ({}, {})", values.dim(), grid.ni(), grid.nj())))
    }

    let flat: Vec<f32> = values.iter().map(|v| *v as f32).collect();
    let mut var = group.variable_mut(name)
        .ok_or_else(|| internal_error( format!("variable {name} missing")))?;
    var.put_values( &flat, (index, .., ..))?;
    Ok(())
}

/// minutes since the OWI epoch (1990-01-01)
pub fn owi_epoch_minutes (time: DateTime<Utc>)->i64 {
    let epoch = NaiveDate::from_ymd_opt( 1990, 1, 1).unwrap()
        .and_hms_opt( 0, 0, 0).unwrap()
        .and_utc();
    (time - epoch).num_minutes()
}

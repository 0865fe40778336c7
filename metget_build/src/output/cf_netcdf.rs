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

//! the CF-1.6 NetCDF writer: 1-D lon/lat coordinates, a WGS84 crs variable
//! and one data variable per requested component.

use chrono::{DateTime, Utc};
use ndarray::Array2;

use metget_sources::{FILL_VALUE, VariableType};

use crate::errors::{Result, internal_error, writer_state};
use crate::met_dataset::MetDataset;
use crate::output_grid::OutputGrid;

const COMPRESSION_LEVEL: i32 = 2;

const WGS84_WKT: &str = "GEOGCS[\"WGS 84\",DATUM[\"WGS_1984\",SPHEROID[\"WGS 84\",6378137,298.257223563,AUTHORITY[\"EPSG\",\"7030\"]],\
AUTHORITY[\"EPSG\",\"6326\"]],PRIMEM[\"Greenwich\",0,AUTHORITY[\"EPSG\",\"8901\"]],\
UNIT[\"degree\",0.0174532925199433,AUTHORITY[\"EPSG\",\"9122\"]],\
AUTHORITY[\"EPSG\",\"4326\"]]";

pub struct CfNetcdfOutput {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    time_step: u64,
    domains: Vec<CfNetcdfDomain>,
}

struct CfNetcdfDomain {
    grid: OutputGrid,
    filename: String,
    variable_type: VariableType,
    file: Option<netcdf::FileMut>,
    snap_count: usize,
    last_time: Option<DateTime<Utc>>,
}

impl CfNetcdfOutput {
    pub fn new (start: DateTime<Utc>, end: DateTime<Utc>, time_step: u64)->Self {
        CfNetcdfOutput { start, end, time_step, domains: Vec::new() }
    }

    pub fn add_domain (&mut self, grid: OutputGrid, filenames: Vec<String>, variable_type: VariableType)->Result<()> {
        let base = filenames.first()
            .ok_or_else(|| writer_state( "cf-netcdf needs a filename"))?;

        // one file per domain; secondary domains get an index suffix
        let filename = if self.domains.is_empty() {
            base.clone()
        } else {
            let index = self.domains.len();
            match base.strip_suffix(".nc") {
                Some(stem) => format!("{stem}_{index:02}.nc"),
                None => format!("{base}_{index:02}"),
            }
        };

        self.domains.push( CfNetcdfDomain {
            grid,
            filename,
            variable_type,
            file: None,
            snap_count: 0,
            last_time: None,
        });
        Ok(())
    }

    pub fn domain_count (&self)->usize { self.domains.len() }

    pub fn open_domain (&mut self, index: usize)->Result<()> {
        let start = self.start;
        self.domain(index)?.open(start)
    }

    pub fn write (&mut self, index: usize, dataset: &MetDataset, time: DateTime<Utc>)->Result<()> {
        let start = self.start;
        self.domain(index)?.write( dataset, time, start)
    }

    pub fn close_domain (&mut self, index: usize)->Result<()> {
        self.domain(index)?.file.take();
        Ok(())
    }

    pub fn close (&mut self)->Result<()> {
        for domain in self.domains.iter_mut() {
            domain.file.take();
        }
        Ok(())
    }

    pub fn filenames (&self)->Vec<String> {
        self.domains.iter().map(|d| d.filename.clone()).collect()
    }

    fn domain (&mut self, index: usize)->Result<&mut CfNetcdfDomain> {
        self.domains.get_mut(index)
            .ok_or_else(|| internal_error( format!("no output domain {index}")))
    }
}

impl CfNetcdfDomain {
    fn open (&mut self, start: DateTime<Utc>)->Result<()> {
        let mut file = netcdf::create(&self.filename)?;
        let grid = &self.grid;

        file.add_dimension( "lon", grid.nj())?;
        file.add_dimension( "lat", grid.ni())?;
        file.add_unlimited_dimension( "time")?;

        let mut lon_var = file.add_variable::<f64>( "lon", &["lon"])?;
        lon_var.set_compression( COMPRESSION_LEVEL, true)?;
        lon_var.put_attribute( "long_name", "Longitude")?;
        lon_var.put_attribute( "units", "degrees_east")?;
        lon_var.put_attribute( "axis", "X")?;

        let mut lat_var = file.add_variable::<f64>( "lat", &["lat"])?;
        lat_var.set_compression( COMPRESSION_LEVEL, true)?;
        lat_var.put_attribute( "long_name", "Latitude")?;
        lat_var.put_attribute( "units", "degrees_north")?;
        lat_var.put_attribute( "axis", "Y")?;

        let mut time_var = file.add_variable::<f64>( "time", &["time"])?;
        time_var.set_compression( COMPRESSION_LEVEL, true)?;
        time_var.put_attribute( "long_name", "time")?;
        time_var.put_attribute( "units", format!("minutes since {}", start.format("%Y-%m-%d %H:%M:%S")))?;
        time_var.put_attribute( "axis", "T")?;

        let mut crs_var = file.add_variable::<i32>( "crs", &[])?;
        crs_var.put_attribute( "long_name", "coordinate reference system")?;
        crs_var.put_attribute( "grid_mapping_name", "latitude_longitude")?;
        crs_var.put_attribute( "longitude_of_prime_meridian", 0.0f64)?;
        crs_var.put_attribute( "semi_major_axis", 6378137.0f64)?;
        crs_var.put_attribute( "inverse_flattening", 298.257223563f64)?;
        // some consumers want wkt, some crs_wkt
        crs_var.put_attribute( "wkt", WGS84_WKT)?;
        crs_var.put_attribute( "crs_wkt", WGS84_WKT)?;
        crs_var.put_attribute( "proj4_params", "+proj=longlat +ellps=WGS84 +datum=WGS84 +no_defs")?;
        crs_var.put_attribute( "epsg_code", "EPSG:4326")?;

        for met_type in self.variable_type.select() {
            let mut var = file.add_variable::<f64>( met_type.netcdf_var_name(), &["time", "lat", "lon"])?;
            var.set_compression( COMPRESSION_LEVEL, true)?;
            var.set_fill_value( FILL_VALUE)?;
            var.put_attribute( "units", met_type.units())?;
            var.put_attribute( "long_name", met_type.cf_long_name())?;
            var.put_attribute( "standard_name", met_type.cf_standard_name())?;
            var.put_attribute( "grid_mapping", "crs")?;
        }

        file.add_attribute( "Conventions", "CF-1.6,UGRID-0.9")?;
        file.add_attribute( "title", "MetGet Forcing, CF-NetCDF Format")?;
        file.add_attribute( "institution", "MetGet")?;
        file.add_attribute( "source", "MetGet")?;
        file.add_attribute( "history", format!("Created {}", Utc::now().format("%Y-%m-%d %H:%M:%S")))?;
        file.add_attribute( "references", "https://github.com/waterinstitute/metget-server")?;
        file.add_attribute( "metadata_conventions", "Unidata Dataset Discovery v1.0")?;
        file.add_attribute( "summary", "Data generated by MetGet")?;
        file.add_attribute( "metget_server_version", env!("CARGO_PKG_VERSION"))?;
        file.add_attribute( "date_created", Utc::now().format("%Y-%m-%d %H:%M:%S").to_string())?;

        let mut lon_var = file.variable_mut("lon")
            .ok_or_else(|| internal_error( "lon variable missing"))?;
        lon_var.put_values( &grid.x_column(false), ..)?;
        let mut lat_var = file.variable_mut("lat")
            .ok_or_else(|| internal_error( "lat variable missing"))?;
        lat_var.put_values( &grid.y_column(), ..)?;

        self.file = Some(file);
        Ok(())
    }

    fn write (&mut self, dataset: &MetDataset, time: DateTime<Utc>, start: DateTime<Utc>)->Result<()> {
        if let Some(last) = self.last_time {
            if time <= last {
                return Err( writer_state( format!("snapshot {time} written after {last}")))
            }
        }
        let index = self.snap_count;
        let minutes = (time - start).num_seconds() as f64 / 60.0;
        let grid_shape = (self.grid.ni(), self.grid.nj());

        let file = self.file.as_mut()
            .ok_or_else(|| writer_state( "write on a closed cf-netcdf domain"))?;

        let mut time_var = file.variable_mut("time")
            .ok_or_else(|| internal_error( "time variable missing"))?;
        time_var.put_values( &[minutes], index..index + 1)?;

        for met_type in self.variable_type.select() {
            let mut var = file.variable_mut( met_type.netcdf_var_name())
                .ok_or_else(|| internal_error( format!("variable {met_type} missing")))?;

            match dataset.get(met_type) {
                Some(values) => {
                    if values.dim() != grid_shape {
                        return Err( internal_error( format!("field shape {:?} does not match grid", values.dim())))
                    }
                    let flat: Vec<f64> = values.iter().copied().collect();
                    var.put_values( &flat, (index, .., ..))?;
                }
                None => {
                    let fill = vec![FILL_VALUE; grid_shape.0 * grid_shape.1];
                    var.put_values( &fill, (index, .., ..))?;
                }
            }
        }

        self.snap_count += 1;
        self.last_time = Some(time);
        Ok(())
    }
}

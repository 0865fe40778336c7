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

//! output writers. One variant per format with a common
//! open/write/close/filenames contract; dispatch is static. The raw format
//! has no writer - the orchestrator passes source files through verbatim.

mod owi_ascii;
pub use owi_ascii::*;

mod owi_netcdf;
pub use owi_netcdf::*;

mod cf_netcdf;
pub use cf_netcdf::*;

use chrono::{DateTime, Utc};

use metget_sources::{MetDataType, VariableType};

use crate::errors::{Result, validation_error};
use crate::met_dataset::MetDataset;
use crate::output_grid::OutputGrid;

/// the wire names of the request `format` field, folded onto the writers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    OwiAscii,
    OwiNetcdf,
    CfNetcdf,
    Raw,
}

impl OutputFormat {
    pub fn from_string (format: &str)->Result<OutputFormat> {
        match format {
            "ascii" | "owi-ascii" | "adcirc-ascii" => Ok(OutputFormat::OwiAscii),
            "owi-netcdf" | "adcirc-netcdf" => Ok(OutputFormat::OwiNetcdf),
            "hec-netcdf" | "cf-netcdf" | "netcdf" => Ok(OutputFormat::CfNetcdf),
            "raw" => Ok(OutputFormat::Raw),
            other => Err( validation_error( format!("invalid output format '{other}'"))),
        }
    }
}

/// the per-format OWI NetCDF short names; also used for ASCII file suffixes
pub(crate) fn owi_variable_map (variable_type: VariableType)->Result<Vec<(&'static str, MetDataType)>> {
    let map: Vec<(&'static str, MetDataType)> = match variable_type {
        VariableType::WindPressure => vec![
            ("U10", MetDataType::WindU),
            ("V10", MetDataType::WindV),
            ("PSFC", MetDataType::Pressure),
        ],
        VariableType::Wind => vec![ ("U10", MetDataType::WindU), ("V10", MetDataType::WindV)],
        VariableType::Pressure => vec![ ("PSFC", MetDataType::Pressure)],
        VariableType::Precipitation => vec![ ("PRCP", MetDataType::Precipitation)],
        VariableType::Temperature => vec![ ("TEMP", MetDataType::Temperature)],
        VariableType::Humidity => vec![ ("RH", MetDataType::Humidity)],
        VariableType::Ice => vec![ ("ICE", MetDataType::Ice)],
        VariableType::PrecipitationType => vec![
            ("PRCP", MetDataType::Precipitation),
            ("CRAIN", MetDataType::CategoricalRain),
            ("CSNOW", MetDataType::CategoricalSnow),
            ("CICE", MetDataType::CategoricalIce),
            ("CFRZR", MetDataType::CategoricalFreezingRain),
        ],
        other => return Err( validation_error( format!("variable type {other} is not writable"))),
    };
    Ok(map)
}

/// a writer of one of the interpolated formats
pub enum OutputFile {
    OwiAscii(OwiAsciiOutput),
    OwiNetcdf(OwiNetcdfOutput),
    CfNetcdf(CfNetcdfOutput),
}

impl OutputFile {
    /// None for the raw format, which copies source files through instead
    pub fn create (format: OutputFormat, start: DateTime<Utc>, end: DateTime<Utc>,
                   time_step: u64, compression: bool)->Option<OutputFile>
    {
        match format {
            OutputFormat::OwiAscii => Some( OutputFile::OwiAscii( OwiAsciiOutput::new( start, end, time_step, compression))),
            OutputFormat::OwiNetcdf => Some( OutputFile::OwiNetcdf( OwiNetcdfOutput::new( start, end))),
            OutputFormat::CfNetcdf => Some( OutputFile::CfNetcdf( CfNetcdfOutput::new( start, end, time_step))),
            OutputFormat::Raw => None,
        }
    }

    pub fn add_domain (&mut self, grid: OutputGrid, filenames: Vec<String>,
                       variable_type: VariableType, name: &str)->Result<()>
    {
        match self {
            OutputFile::OwiAscii(out) => out.add_domain( grid, filenames, variable_type),
            OutputFile::OwiNetcdf(out) => out.add_domain( grid, filenames, variable_type, name),
            OutputFile::CfNetcdf(out) => out.add_domain( grid, filenames, variable_type),
        }
    }

    pub fn domain_count (&self)->usize {
        match self {
            OutputFile::OwiAscii(out) => out.domain_count(),
            OutputFile::OwiNetcdf(out) => out.domain_count(),
            OutputFile::CfNetcdf(out) => out.domain_count(),
        }
    }

    pub fn open_domain (&mut self, index: usize)->Result<()> {
        match self {
            OutputFile::OwiAscii(out) => out.open_domain(index),
            OutputFile::OwiNetcdf(out) => out.open_domain(index),
            OutputFile::CfNetcdf(out) => out.open_domain(index),
        }
    }

    /// write one snapshot; `time` must be strictly increasing per domain
    pub fn write (&mut self, index: usize, dataset: &MetDataset, time: DateTime<Utc>)->Result<()> {
        match self {
            OutputFile::OwiAscii(out) => out.write( index, dataset, time),
            OutputFile::OwiNetcdf(out) => out.write( index, dataset, time),
            OutputFile::CfNetcdf(out) => out.write( index, dataset, time),
        }
    }

    pub fn close_domain (&mut self, index: usize)->Result<()> {
        match self {
            OutputFile::OwiAscii(out) => out.close_domain(index),
            OutputFile::OwiNetcdf(out) => out.close_domain(index),
            OutputFile::CfNetcdf(out) => out.close_domain(index),
        }
    }

    pub fn close (&mut self)->Result<()> {
        match self {
            OutputFile::OwiAscii(out) => out.close(),
            OutputFile::OwiNetcdf(out) => out.close(),
            OutputFile::CfNetcdf(out) => out.close(),
        }
    }

    /// every file this writer produces, deduplicated
    pub fn filenames (&self)->Vec<String> {
        let mut names = match self {
            OutputFile::OwiAscii(out) => out.filenames(),
            OutputFile::OwiNetcdf(out) => out.filenames(),
            OutputFile::CfNetcdf(out) => out.filenames(),
        };
        names.dedup();
        names
    }

    /// delete whatever partial outputs exist (error and restore paths)
    pub fn remove_files (&self) {
        for name in self.filenames() {
            let path = std::path::Path::new(&name);
            if path.exists() {
                let _ = std::fs::remove_file(path);
            }
        }
    }
}

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

//! the Oceanweather WIN/PRE ASCII writer. `wind_pressure` produces a `.pre`
//! and a `.wnd` file per domain; scalar variable types produce one file.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use chrono::{DateTime, Datelike, Timelike, Utc};
use flate2::{Compression, write::GzEncoder};
use ndarray::Array2;

use metget_sources::{MetDataType, VariableType};

use crate::errors::{Result, internal_error, writer_state};
use crate::met_dataset::MetDataset;
use crate::output_grid::OutputGrid;

pub struct OwiAsciiOutput {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    time_step: u64,
    compression: bool,
    domains: Vec<OwiAsciiDomain>,
}

impl OwiAsciiOutput {
    pub fn new (start: DateTime<Utc>, end: DateTime<Utc>, time_step: u64, compression: bool)->Self {
        OwiAsciiOutput { start, end, time_step, compression, domains: Vec::new() }
    }

    pub fn add_domain (&mut self, grid: OutputGrid, filenames: Vec<String>, variable_type: VariableType)->Result<()> {
        if variable_type == VariableType::WindPressure && filenames.len() != 2 {
            return Err( writer_state( "wind_pressure needs a .pre and a .wnd file"))
        }
        if variable_type != VariableType::WindPressure && filenames.len() != 1 {
            return Err( writer_state( "scalar variable types write a single file"))
        }

        self.domains.push( OwiAsciiDomain {
            grid,
            filenames,
            variable_type,
            start: self.start,
            end: self.end,
            compression: self.compression,
            writers: None,
            last_time: None,
        });
        Ok(())
    }

    pub fn domain_count (&self)->usize { self.domains.len() }

    pub fn open_domain (&mut self, index: usize)->Result<()> {
        self.domain(index)?.open()
    }

    pub fn write (&mut self, index: usize, dataset: &MetDataset, time: DateTime<Utc>)->Result<()> {
        self.domain(index)?.write( dataset, time)
    }

    pub fn close_domain (&mut self, index: usize)->Result<()> {
        self.domain(index)?.close()
    }

    pub fn close (&mut self)->Result<()> {
        for domain in self.domains.iter_mut() {
            domain.close()?;
        }
        Ok(())
    }

    pub fn filenames (&self)->Vec<String> {
        self.domains.iter().flat_map(|d| d.filenames.clone()).collect()
    }

    fn domain (&mut self, index: usize)->Result<&mut OwiAsciiDomain> {
        self.domains.get_mut(index)
            .ok_or_else(|| internal_error( format!("no output domain {index}")))
    }
}

struct OwiAsciiDomain {
    grid: OutputGrid,
    filenames: Vec<String>,
    variable_type: VariableType,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    compression: bool,
    writers: Option<Vec<BufWriter<File>>>,
    last_time: Option<DateTime<Utc>>,
}

impl OwiAsciiDomain {
    fn open (&mut self)->Result<()> {
        let mut writers = Vec::with_capacity( self.filenames.len());
        for name in &self.filenames {
            let mut writer = BufWriter::new( File::create(name)?);
            write!( writer, "{}", file_header( self.start, self.end))?;
            writers.push(writer);
        }
        self.writers = Some(writers);
        Ok(())
    }

    fn write (&mut self, dataset: &MetDataset, time: DateTime<Utc>)->Result<()> {
        if let Some(last) = self.last_time {
            if time <= last {
                return Err( writer_state( format!("snapshot {time} written after {last}")))
            }
        }
        let header = record_header( time, &self.grid);
        let grid_dim = (self.grid.ni(), self.grid.nj());

        {
            let Some(writers) = self.writers.as_mut() else {
                return Err( writer_state( "write on a closed OWI ASCII domain"))
            };

            if self.variable_type == VariableType::WindPressure {
                let pressure = require_field( dataset, MetDataType::Pressure)?;
                let wind_u = require_field( dataset, MetDataType::WindU)?;
                let wind_v = require_field( dataset, MetDataType::WindV)?;

                write!( writers[0], "{header}")?;
                write_record( &mut writers[0], pressure)?;
                write!( writers[1], "{header}")?;
                write_record( &mut writers[1], wind_u)?;
                write_record( &mut writers[1], wind_v)?;
            } else {
                let var = self.variable_type.select()[0];
                let values = require_field( dataset, var)?;
                write!( writers[0], "{header}")?;
                write_record( &mut writers[0], values)?;
            }
        }

        self.last_time = Some(time);
        Ok(())
    }

    fn close (&mut self)->Result<()> {
        if let Some(writers) = self.writers.take() {
            for mut writer in writers {
                writer.flush()?;
            }
            if self.compression {
                for name in &self.filenames {
                    compress_file(name)?;
                }
            }
        }
        Ok(())
    }
}

fn require_field (dataset: &MetDataset, var: MetDataType)->Result<&Array2<f64>> {
    dataset.get(var)
        .ok_or_else(|| internal_error( format!("dataset is missing {var}")))
}

fn file_header (start: DateTime<Utc>, end: DateTime<Utc>)->String {
    format!(
        "Oceanweather WIN/PRE Format                            {:04}{:02}{:02}{:02}     {:04}{:02}{:02}{:02}\n",
        start.year(), start.month(), start.day(), start.hour(),
        end.year(), end.month(), end.day(), end.hour()
    )
}

fn record_header (date: DateTime<Utc>, grid: &OutputGrid)->String {
    format!(
        "iLat={:4}iLong={:4}DX={:6.4}DY={:6.4}SWLat={}SWLon={}DT={:04}{:02}{:02}{:02}{:02}\n",
        grid.ni(), grid.nj(),
        grid.x_resolution(), grid.y_resolution(),
        format_header_coordinate( grid.y_lower_left()),
        format_header_coordinate( grid.x_lower_left()),
        date.year(), date.month(), date.day(), date.hour(), date.minute()
    )
}

/// SW corner coordinates are 8 characters wide with as many decimal places
/// as still fit after the integer part
fn format_header_coordinate (value: f64)->String {
    let int_len = (value.trunc() as i64).to_string().len();
    let decimals = 7usize.saturating_sub( int_len + 1);
    format!("{value:8.decimals$}")
}

/// values go out row major (latitude slowest), 8 per line in %10.4f; the last
/// short line is not padded
fn write_record<W: Write> (writer: &mut W, values: &Array2<f64>)->Result<()> {
    let mut on_line = 0;
    for v in values.iter() {
        write!( writer, "{v:10.4}")?;
        on_line += 1;
        if on_line == 8 {
            writeln!(writer)?;
            on_line = 0;
        }
    }
    if on_line != 0 {
        writeln!(writer)?;
    }
    Ok(())
}

/// gzip the finished file in place (the configured filename already carries
/// the .gz suffix)
fn compress_file (name: &str)->Result<()> {
    let path = Path::new(name);
    let mut plain = Vec::new();
    File::open(path)?.read_to_end(&mut plain)?;

    let mut encoder = GzEncoder::new( File::create(path)?, Compression::default());
    encoder.write_all(&plain)?;
    encoder.finish()?;
    Ok(())
}

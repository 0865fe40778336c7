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

//! the two-frame meteorology sequencer.
//!
//! Holds the snapshots bracketing the current output time and blends between
//! them. `process_files` must run between every `set_next_file` and the next
//! `get`; on rotation the old second frame (and the cached triangulation)
//! moves to the first slot without re-interpolation.

use chrono::{DateTime, Utc};
use tracing::info;

use metget_sources::{SourceDescriptor, VariableType, descriptor_for_service};

use crate::errors::{Result, internal_error, writer_state};
use crate::fileobj::FileObj;
use crate::interpolator::DataInterpolator;
use crate::met_dataset::MetDataset;
use crate::output_grid::OutputGrid;

pub struct Meteorology {
    descriptor: &'static SourceDescriptor,
    variable_type: VariableType,

    file_1: Option<FileObj>,
    file_2: Option<FileObj>,

    interpolation_1: DataInterpolator,
    interpolation_2: DataInterpolator,

    result_1: Option<MetDataset>,
    result_2: Option<MetDataset>,

    is_accumulated: bool,
    accumulation_time: Option<f64>,
}

impl Meteorology {
    pub fn new (grid: &OutputGrid, service: &str, variable_type: VariableType,
                backfill: bool, domain_level: usize)->Result<Meteorology>
    {
        let descriptor = descriptor_for_service(service)?;

        // accumulation semantics follow the first requested component the
        // source actually provides
        let (is_accumulated, accumulation_time) = descriptor.selected_variables(variable_type)
            .first()
            .map(|binding| (binding.is_accumulated, binding.accumulation_time))
            .unwrap_or( (false, None));

        if is_accumulated {
            info!("variable {} is accumulated (window: {:?})", variable_type, accumulation_time);
        }

        Ok( Meteorology {
            descriptor,
            variable_type,
            file_1: None,
            file_2: None,
            interpolation_1: DataInterpolator::new( grid.clone(), backfill, domain_level),
            interpolation_2: DataInterpolator::new( grid.clone(), backfill, domain_level),
            result_1: None,
            result_2: None,
            is_accumulated,
            accumulation_time,
        })
    }

    pub fn f1 (&self)->Option<&FileObj> { self.file_1.as_ref() }

    pub fn f2 (&self)->Option<&FileObj> { self.file_2.as_ref() }

    /// slide the window: the current second frame becomes the first, the new
    /// file becomes the second. The first two calls fill the empty slots
    pub fn set_next_file (&mut self, f_obj: FileObj) {
        if self.file_1.is_none() {
            self.file_1 = Some(f_obj);
        } else if self.file_2.is_none() {
            self.file_2 = Some(f_obj);
        } else {
            self.file_1 = self.file_2.take();
            self.file_2 = Some(f_obj);
        }
    }

    /// interpolate whatever frames are not interpolated yet. The old second
    /// result is reused as the new first result after a rotation
    pub fn process_files (&mut self)->Result<()> {
        let file_1 = self.file_1.clone()
            .ok_or_else(|| writer_state( "process_files called before set_next_file"))?;
        let file_2 = self.file_2.clone()
            .ok_or_else(|| writer_state( "process_files called before both frames were set"))?;

        match self.result_2.take() {
            Some(previous) => {
                self.result_1 = Some(previous);
            }
            None => {
                self.result_1 = Some( self.interpolation_1.interpolate( &file_1, self.variable_type, false)?);

                // the triangulation computed for frame 1 moves over so frame 2
                // does not recompute it for an identical point set
                if !self.interpolation_2.has_triangulation() {
                    self.interpolation_2.set_triangulation( self.interpolation_1.take_triangulation());
                }
            }
        }

        self.result_2 = Some( self.interpolation_2.interpolate( &file_2, self.variable_type, false)?);
        Ok(())
    }

    /// blend weight of the second frame at `time`, clamped to [0, 1] and
    /// monotone non-decreasing in `time`
    pub fn time_weight (&self, time: DateTime<Utc>)->f64 {
        let (Some(f1), Some(f2)) = (&self.file_1, &self.file_2) else { return 0.0 };

        if time >= f2.time() {
            return 1.0
        }
        if time <= f1.time() {
            return 0.0
        }
        let elapsed = (time - f1.time()).num_seconds() as f64;
        let span = (f2.time() - f1.time()).num_seconds() as f64;
        elapsed / span
    }

    /// the meteorological field at `time`
    pub fn get (&self, time: DateTime<Utc>)->Result<MetDataset> {
        if self.is_accumulated {
            self.accumulated_quantity(time)
        } else {
            self.interpolated_quantity(time)
        }
    }

    fn interpolated_quantity (&self, time: DateTime<Utc>)->Result<MetDataset> {
        let (result_1, result_2) = self.results()?;

        if time >= self.frame_2_time()? {
            return Ok( result_2.clone())
        }
        if time <= self.frame_1_time()? {
            return Ok( result_1.clone())
        }
        Ok( MetDataset::lerp( result_1, result_2, self.time_weight(time)))
    }

    fn accumulated_quantity (&self, time: DateTime<Utc>)->Result<MetDataset> {
        match self.accumulation_time {
            Some(window) => self.accumulated_rate( time, window),
            None => self.accumulated_rate_two_files(time),
        }
    }

    /// the field already carries a rolling accumulation; divide by the window
    fn accumulated_rate (&self, time: DateTime<Utc>, window: f64)->Result<MetDataset> {
        let (result_1, result_2) = self.results()?;

        if time >= self.frame_2_time()? {
            return Ok( result_2.scaled( 1.0 / window))
        }
        if time <= self.frame_1_time()? {
            return Ok( result_1.scaled( 1.0 / window))
        }
        Ok( MetDataset::lerp( result_1, result_2, self.time_weight(time)).scaled( 1.0 / window))
    }

    /// snap-to-snap totals need both frames to form a rate; outside the
    /// bracket the rate is zero
    fn accumulated_rate_two_files (&self, time: DateTime<Utc>)->Result<MetDataset> {
        let (result_1, result_2) = self.results()?;
        let (t1, t2) = (self.frame_1_time()?, self.frame_2_time()?);

        if time < t1 || time > t2 || t2 == t1 {
            return Ok( result_1.zeros_like())
        }

        let dt = (t2 - t1).num_seconds() as f64;
        Ok( MetDataset::rate_between( result_1, result_2, dt))
    }

    fn results (&self)->Result<(&MetDataset, &MetDataset)> {
        match (&self.result_1, &self.result_2) {
            (Some(r1), Some(r2)) => Ok( (r1, r2) ),
            _ => Err( writer_state( "get called before process_files")),
        }
    }

    fn frame_1_time (&self)->Result<DateTime<Utc>> {
        self.file_1.as_ref().map(|f| f.time())
            .ok_or_else(|| internal_error( "no first frame"))
    }

    fn frame_2_time (&self)->Result<DateTime<Utc>> {
        self.file_2.as_ref().map(|f| f.time())
            .ok_or_else(|| internal_error( "no second frame"))
    }
}

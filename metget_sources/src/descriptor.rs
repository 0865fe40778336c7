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

use crate::data_type::{MetDataType, VariableType};
use crate::errors::{MetgetSourcesError, Result};

/// the on-disk format of a source's files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Grib,
    CoampsNetcdf,
}

/// which columns the source's catalog table carries beyond the generic set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Generic,
    Storm,
    Ensemble,
    StormEnsemble,
}

impl ServiceKind {
    pub fn has_storm (&self)->bool {
        matches!( self, ServiceKind::Storm | ServiceKind::StormEnsemble)
    }

    pub fn has_ensemble_member (&self)->bool {
        matches!( self, ServiceKind::Ensemble | ServiceKind::StormEnsemble)
    }
}

/// GRIB2 identification of a product, used by the decoder in place of the
/// ecCodes short-name tables
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GribProductId {
    pub discipline: u8,
    pub category: u8,
    pub parameter: u8,
    pub surface_type: u8,
    pub surface_value: Option<f64>,
}

impl GribProductId {
    pub const fn new (discipline: u8, category: u8, parameter: u8, surface_type: u8)->Self {
        GribProductId { discipline, category, parameter, surface_type, surface_value: None }
    }

    pub const fn at_level (mut self, surface_value: f64)->Self {
        self.surface_value = Some(surface_value);
        self
    }
}

/// how one MetDataType maps onto a source's files
#[derive(Debug, Clone, Copy)]
pub struct VariableBinding {
    pub data_type: MetDataType,

    /// short descriptive name used in generated filenames (e.g. "uvel")
    pub name: &'static str,

    /// the `VAR:level` record name as it appears in GRIB index sidecars
    pub index_name: &'static str,

    /// variable name inside the file (netCDF variable or decoded grib var)
    pub var_name: &'static str,

    /// grib short name (e.g. "10u")
    pub grib_name: &'static str,

    /// grib product identification for the in-crate decoder
    pub grib_id: Option<GribProductId>,

    /// multiplicative factor applied after decode (e.g. Pa -> hPa)
    pub scale: f64,

    pub is_accumulated: bool,

    /// rolling accumulation window in seconds, when the source declares one
    pub accumulation_time: Option<f64>,

    /// the zero-hour snapshot of this variable is unusable and must be skipped
    pub skip_0: bool,
}

impl VariableBinding {
    pub const fn new (data_type: MetDataType, name: &'static str, index_name: &'static str,
                      var_name: &'static str, grib_name: &'static str, scale: f64)->Self {
        VariableBinding {
            data_type, name, index_name, var_name, grib_name,
            grib_id: None, scale,
            is_accumulated: false, accumulation_time: None, skip_0: false,
        }
    }

    pub const fn grib (mut self, id: GribProductId)->Self {
        self.grib_id = Some(id);
        self
    }

    pub const fn accumulated (mut self)->Self {
        self.is_accumulated = true;
        self
    }

    pub const fn accumulation_window (mut self, seconds: f64)->Self {
        self.accumulation_time = Some(seconds);
        self
    }

    pub const fn skip_zero_hour (mut self)->Self {
        self.skip_0 = true;
        self
    }
}

/// immutable description of one meteorological model source
#[derive(Debug, Clone, Copy)]
pub struct SourceDescriptor {
    /// display name (e.g. "GFS-NCEP")
    pub name: &'static str,

    /// the request-facing service id (e.g. "gfs-ncep")
    pub service: &'static str,

    /// catalog table holding this source's records
    pub table_name: &'static str,

    pub file_format: FileFormat,

    /// public archive bucket the raw files live in, if any
    pub bucket: Option<&'static str>,

    pub kind: ServiceKind,

    pub variables: &'static [VariableBinding],

    /// forecast cycles as hours of day
    pub cycles: &'static [u32],

    pub ensemble_members: Option<&'static [&'static str]>,
}

impl SourceDescriptor {
    /// look up the binding for a single field. Unknown -> fail
    pub fn variable (&self, t: MetDataType)->Result<&'static VariableBinding> {
        self.variables.iter()
            .find(|v| v.data_type == t)
            .ok_or_else(|| MetgetSourcesError::UnknownVariable {
                service: self.service.to_string(),
                var: t.to_string(),
            })
    }

    pub fn has_variable (&self, t: MetDataType)->bool {
        self.variables.iter().any(|v| v.data_type == t)
    }

    /// the intersection of the requested variable group with what this source
    /// actually advertises, preserving the group's output order
    pub fn selected_variables (&self, variable_type: VariableType)->Vec<&'static VariableBinding> {
        variable_type.select().iter()
            .filter_map(|t| self.variables.iter().find(|v| v.data_type == *t))
            .collect()
    }
}

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

//! a bundle of named 2-D fields on the target grid, the unit of data flowing
//! from the interpolator through the sequencer into the writers

use std::collections::BTreeMap;
use ndarray::{Array2, Zip};

use metget_sources::MetDataType;

/// fields are `[lat row][lon column]`, matching `OutputGrid::ni/nj`
#[derive(Debug, Clone, PartialEq)]
pub struct MetDataset {
    ni: usize,
    nj: usize,
    fields: BTreeMap<MetDataType, Array2<f64>>,
}

impl MetDataset {
    pub fn new (ni: usize, nj: usize)->Self {
        MetDataset { ni, nj, fields: BTreeMap::new() }
    }

    pub fn ni (&self)->usize { self.ni }
    pub fn nj (&self)->usize { self.nj }

    pub fn insert (&mut self, var: MetDataType, values: Array2<f64>) {
        debug_assert_eq!( values.dim(), (self.ni, self.nj));
        self.fields.insert( var, values);
    }

    /// add a NaN-filled field
    pub fn insert_empty (&mut self, var: MetDataType) {
        self.fields.insert( var, Array2::from_elem( (self.ni, self.nj), f64::NAN));
    }

    pub fn get (&self, var: MetDataType)->Option<&Array2<f64>> {
        self.fields.get(&var)
    }

    pub fn get_mut (&mut self, var: MetDataType)->Option<&mut Array2<f64>> {
        self.fields.get_mut(&var)
    }

    pub fn contains (&self, var: MetDataType)->bool {
        self.fields.contains_key(&var)
    }

    pub fn variables (&self)->Vec<MetDataType> {
        self.fields.keys().copied().collect()
    }

    pub fn iter (&self)->impl Iterator<Item = (&MetDataType, &Array2<f64>)> {
        self.fields.iter()
    }

    pub fn iter_mut (&mut self)->impl Iterator<Item = (&MetDataType, &mut Array2<f64>)> {
        self.fields.iter_mut()
    }

    /// a dataset of the same variables, all zero
    pub fn zeros_like (&self)->MetDataset {
        let mut out = MetDataset::new( self.ni, self.nj);
        for var in self.fields.keys() {
            out.insert( *var, Array2::zeros( (self.ni, self.nj)));
        }
        out
    }

    /// every field multiplied by a constant
    pub fn scaled (&self, factor: f64)->MetDataset {
        let mut out = MetDataset::new( self.ni, self.nj);
        for (var, values) in &self.fields {
            out.insert( *var, values.mapv(|v| v * factor));
        }
        out
    }

    /// elementwise linear blend `a*(1-w) + b*w` over the variables present in both
    pub fn lerp (a: &MetDataset, b: &MetDataset, weight: f64)->MetDataset {
        let mut out = MetDataset::new( a.ni, a.nj);
        for (var, va) in &a.fields {
            if let Some(vb) = b.fields.get(var) {
                let blended = Zip::from(va).and(vb).map_collect(|x, y| x * (1.0 - weight) + y * weight);
                out.insert( *var, blended);
            }
        }
        out
    }

    /// the rate `(b - a) / dt_seconds`, clamped to >= 0. A non-positive (or
    /// undefined) difference is a zero rate
    pub fn rate_between (a: &MetDataset, b: &MetDataset, dt_seconds: f64)->MetDataset {
        let mut out = MetDataset::new( a.ni, a.nj);
        for (var, va) in &a.fields {
            if let Some(vb) = b.fields.get(var) {
                let rate = Zip::from(va).and(vb).map_collect(|x, y| {
                    let dv = y - x;
                    if dv > 0.0 { dv / dt_seconds } else { 0.0 }
                });
                out.insert( *var, rate);
            }
        }
        out
    }
}

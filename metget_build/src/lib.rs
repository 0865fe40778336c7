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

//! the MetGet build pipeline - request validation, source interpolation,
//! domain merging, time sequencing, output writing and the orchestrating
//! request state machine.

pub mod output_grid;
pub use output_grid::*;

pub mod met_dataset;
pub use met_dataset::*;

pub mod triangulation;
pub use triangulation::*;

pub mod interpolator;
pub use interpolator::*;

pub mod meteorology;
pub use meteorology::*;

pub mod fileobj;
pub use fileobj::*;

pub mod output;
pub use output::*;

pub mod domain;
pub use domain::*;

pub mod input;
pub use input::*;

pub mod nhc;

pub mod s3grib;
pub use s3grib::*;

pub mod context;
pub use context::*;

pub mod handler;
pub use handler::*;

mod errors;
pub use errors::*;

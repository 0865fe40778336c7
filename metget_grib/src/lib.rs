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

//! minimal GRIB2 support for the MetGet build pipeline.
//!
//! This is not a general GRIB library. It reads the subset NOAA's gridded
//! products actually use on the wire - lat/lon grids (template 3.0) with
//! simple (5.0), complex (5.2) and complex + spatial differencing (5.3)
//! packing - plus the `.idx` sidecars that drive ranged downloads.

pub mod message;
pub use message::*;

pub mod decode;

pub mod field;
pub use field::*;

pub mod index;
pub use index::*;

mod errors;
pub use errors::*;

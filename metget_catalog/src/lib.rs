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

//! the MetGet catalog - relational persistence of ingested file records and
//! request state, plus the file-selection engine that resolves a request
//! window into the best-available set of files.

pub mod tables;
pub use tables::*;

pub mod schema;

pub mod store;
pub use store::*;

pub mod selection;
pub use selection::*;

mod errors;
pub use errors::*;

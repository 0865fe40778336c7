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

//! static descriptors of the meteorological sources MetGet can serve.
//!
//! The descriptors are process-global and immutable. Every other crate goes
//! through [`registry::descriptor_for_service`] - there is no runtime mutation
//! and no per-service special casing outside of this crate.

mod data_type;
pub use data_type::*;

mod descriptor;
pub use descriptor::*;

pub mod registry;
pub use registry::{descriptor_for_service, descriptor_for_name, NHC_SERVICE};

mod errors;
pub use errors::*;

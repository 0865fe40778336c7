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

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MetgetGribError>;

#[derive(Error, Debug)]
pub enum MetgetGribError {
    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("not a GRIB file")]
    NotGrib,

    #[error("unsupported GRIB edition {0}")]
    EditionMismatch(u8),

    #[error("unknown section number {0}")]
    UnknownSection(u8),

    #[error("truncated message: {0}")]
    Truncated(String),

    #[error("unsupported grid template {0}")]
    UnsupportedGrid(u16),

    #[error("unsupported packing template {0}")]
    UnsupportedPacking(u16),

    #[error("index parse error: {0}")]
    IndexError(String),

    #[error("no message matches {0}")]
    NoSuchVariable(String),

    #[error("decode error: {0}")]
    DecodeError(String),
}

pub fn decode_error (msg: impl ToString)->MetgetGribError {
    MetgetGribError::DecodeError(msg.to_string())
}

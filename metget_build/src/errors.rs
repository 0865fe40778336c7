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
use metget_common::s3::MetgetS3Error;

pub type Result<T> = std::result::Result<T, MetgetBuildError>;

/// the request-facing error taxonomy. The `kind` discriminator lands in the
/// request row's message and decides the terminal state
#[derive(Error, Debug)]
pub enum MetgetBuildError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("no data: {0}")]
    NoData(String),

    #[error("in cold storage: {0}")]
    InColdStorage(String),

    #[error("transient IO failure: {0}")]
    TransientIo(String),

    #[error("database conflict: {0}")]
    DbConflict(String),

    #[error("writer state error: {0}")]
    WriterState(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl MetgetBuildError {
    pub fn kind (&self)->&'static str {
        match self {
            MetgetBuildError::Validation(_) => "validation",
            MetgetBuildError::NoData(_) => "no-data",
            MetgetBuildError::InColdStorage(_) => "in-cold-storage",
            MetgetBuildError::TransientIo(_) => "transient-io",
            MetgetBuildError::DbConflict(_) => "db-conflict",
            MetgetBuildError::WriterState(_) => "writer-state",
            MetgetBuildError::Timeout(_) => "timeout",
            MetgetBuildError::Internal(_) => "internal",
        }
    }
}

pub fn validation_error (msg: impl ToString)->MetgetBuildError {
    MetgetBuildError::Validation(msg.to_string())
}

pub fn no_data (msg: impl ToString)->MetgetBuildError {
    MetgetBuildError::NoData(msg.to_string())
}

pub fn writer_state (msg: impl ToString)->MetgetBuildError {
    MetgetBuildError::WriterState(msg.to_string())
}

pub fn internal_error (msg: impl ToString)->MetgetBuildError {
    MetgetBuildError::Internal(msg.to_string())
}

impl From<std::io::Error> for MetgetBuildError {
    fn from (e: std::io::Error)->Self {
        MetgetBuildError::Internal( e.to_string())
    }
}

impl From<MetgetS3Error> for MetgetBuildError {
    fn from (e: MetgetS3Error)->Self {
        match e {
            MetgetS3Error::InCold(key) => MetgetBuildError::InColdStorage(key),
            MetgetS3Error::Transient(msg) => MetgetBuildError::TransientIo(msg),
            MetgetS3Error::NotFound(key) => MetgetBuildError::NoData( format!("object missing: {key}")),
            other => MetgetBuildError::Internal( other.to_string()),
        }
    }
}

impl From<metget_catalog::MetgetCatalogError> for MetgetBuildError {
    fn from (e: metget_catalog::MetgetCatalogError)->Self {
        match e {
            metget_catalog::MetgetCatalogError::NoData(msg) => MetgetBuildError::NoData(msg),
            metget_catalog::MetgetCatalogError::InvalidQuery(msg) => MetgetBuildError::Validation(msg),
            other => MetgetBuildError::Internal( other.to_string()),
        }
    }
}

impl From<metget_sources::MetgetSourcesError> for MetgetBuildError {
    fn from (e: metget_sources::MetgetSourcesError)->Self {
        MetgetBuildError::Validation( e.to_string())
    }
}

impl From<metget_grib::MetgetGribError> for MetgetBuildError {
    fn from (e: metget_grib::MetgetGribError)->Self {
        MetgetBuildError::Internal( e.to_string())
    }
}

impl From<netcdf::Error> for MetgetBuildError {
    fn from (e: netcdf::Error)->Self {
        MetgetBuildError::Internal( e.to_string())
    }
}

impl From<metget_common::config::MetgetConfigError> for MetgetBuildError {
    fn from (e: metget_common::config::MetgetConfigError)->Self {
        MetgetBuildError::Internal( e.to_string())
    }
}

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

//! process configuration sourced from the environment.
//!
//! All environment access happens here, once, at process start. The resulting
//! [`MetgetConfig`] is threaded into the components that need it - nothing
//! below the orchestrator reads environment variables.

use std::env;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::datetime::{hours, secs};

pub type Result<T> = std::result::Result<T, MetgetConfigError>;

#[derive(Error, Debug)]
pub enum MetgetConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(String),

    #[error("invalid value for environment variable {0}: {1}")]
    InvalidVar(String, String),
}

/// general MetGet server parameters, assembled from the `METGET_*` environment
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct MetgetConfig {
    /// database name (METGET_DATABASE)
    pub database: String,

    /// database host (METGET_DATABASE_SERVICE_HOST)
    pub database_host: String,

    /// database credentials (METGET_DATABASE_USER / METGET_DATABASE_PASSWORD)
    pub database_user: String,
    pub database_password: String,

    /// bucket holding ingested meteorological source files (METGET_S3_BUCKET)
    pub s3_bucket: String,

    /// bucket where request results are posted (METGET_S3_BUCKET_UPLOAD)
    pub s3_bucket_upload: String,

    /// table names for the API key and request records
    pub api_key_table: String,
    pub request_table: String,

    /// COAMPS-TC side bucket and its credentials (COAMPS_S3_BUCKET / COAMPS_AWS_KEY / COAMPS_AWS_SECRET)
    pub coamps_bucket: Option<String>,
    pub coamps_aws_key: Option<String>,
    pub coamps_aws_secret: Option<String>,

    /// sleep between archive-restore polls (REQUEST_SLEEP_TIME, seconds)
    pub request_sleep_time: Duration,

    /// ceiling on total request wall time (MAX_REQUEST_TIME, seconds)
    pub max_request_time: Duration,
}

impl MetgetConfig {
    /// assemble the configuration from the environment. A missing required
    /// variable is a hard startup failure
    pub fn from_env ()->Result<Self> {
        Ok( MetgetConfig {
            database: required("METGET_DATABASE")?,
            database_host: required("METGET_DATABASE_SERVICE_HOST")?,
            database_user: required("METGET_DATABASE_USER")?,
            database_password: required("METGET_DATABASE_PASSWORD")?,
            s3_bucket: required("METGET_S3_BUCKET")?,
            s3_bucket_upload: required("METGET_S3_BUCKET_UPLOAD")?,
            api_key_table: required("METGET_API_KEY_TABLE")?,
            request_table: required("METGET_REQUEST_TABLE")?,
            coamps_bucket: optional("COAMPS_S3_BUCKET"),
            coamps_aws_key: optional("COAMPS_AWS_KEY"),
            coamps_aws_secret: optional("COAMPS_AWS_SECRET"),
            request_sleep_time: optional_secs("REQUEST_SLEEP_TIME")?.unwrap_or(secs(600)),
            max_request_time: optional_secs("MAX_REQUEST_TIME")?.unwrap_or(hours(48)),
        })
    }

    /// postgres connection URL for the catalog database
    pub fn database_url (&self)->String {
        format!( "postgres://{}:{}@{}/{}",
            self.database_user, self.database_password, self.database_host, self.database
        )
    }
}

fn required (name: &str)->Result<String> {
    env::var(name).map_err(|_| MetgetConfigError::MissingVar(name.to_string()))
}

fn optional (name: &str)->Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn optional_secs (name: &str)->Result<Option<Duration>> {
    match optional(name) {
        Some(v) => {
            let n: u64 = v.parse().map_err(|_| MetgetConfigError::InvalidVar(name.to_string(), v))?;
            Ok( Some(secs(n)) )
        }
        None => Ok(None)
    }
}

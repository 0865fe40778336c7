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

//! row types of the catalog tables

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use strum::{Display, EnumString};

/// lifecycle of a build request
#[derive(Display, EnumString, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Queued,
    Running,
    Error,
    Completed,
    Restore,
}

/// one catalog row of a gridded service. The storm and ensemble columns only
/// exist for the service kinds that declare them and come back NULL otherwise
#[derive(FromRow, Debug, Clone, PartialEq)]
pub struct FileRecord {
    pub id: i64,

    #[sqlx(rename = "forecastcycle")]
    pub forecast_cycle: DateTime<Utc>,

    #[sqlx(rename = "forecasttime")]
    pub valid_time: DateTime<Utc>,

    pub tau: i32,

    pub filepath: String,

    #[sqlx(default)]
    pub accessed: Option<DateTime<Utc>>,
}

/// a new gridded-service row for batch ingestion
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub forecast_cycle: DateTime<Utc>,
    pub valid_time: DateTime<Utc>,
    pub tau: i32,
    pub filepath: String,
    pub url: Option<String>,
    pub storm_name: Option<String>,
    pub ensemble_member: Option<String>,
}

impl NewFileRecord {
    pub fn key (&self)->CatalogKey {
        CatalogKey {
            forecast_cycle: self.forecast_cycle,
            valid_time: self.valid_time,
            storm_name: self.storm_name.clone(),
            ensemble_member: self.ensemble_member.clone(),
        }
    }
}

/// the uniqueness key of a gridded-service row
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogKey {
    pub forecast_cycle: DateTime<Utc>,
    pub valid_time: DateTime<Utc>,
    pub storm_name: Option<String>,
    pub ensemble_member: Option<String>,
}

/// one NHC track row (best track or forecast; forecast rows carry `advisory`)
#[derive(FromRow, Debug, Clone)]
pub struct NhcTrackRow {
    pub id: i64,
    pub storm_year: i32,
    pub basin: String,
    pub storm: i32,
    #[sqlx(default)]
    pub advisory: Option<String>,
    pub advisory_start: DateTime<Utc>,
    pub advisory_end: DateTime<Utc>,
    pub advisory_duration_hr: i32,
    pub filepath: String,
    pub md5: String,
    #[sqlx(default)]
    pub geometry_data: Option<JsonValue>,
}

/// a new (or re-ingested) NHC track record; these tables are mutable
#[derive(Debug, Clone)]
pub struct NhcTrackRecord {
    pub storm_year: i32,
    pub basin: String,
    pub storm: i32,
    pub advisory: Option<String>,
    pub advisory_start: DateTime<Utc>,
    pub advisory_end: DateTime<Utc>,
    pub advisory_duration_hr: i32,
    pub filepath: String,
    pub md5: String,
    pub geojson: Option<JsonValue>,
}

/// one build request row
#[derive(FromRow, Debug, Clone)]
pub struct RequestRow {
    pub id: i64,
    pub request_id: String,

    #[sqlx(rename = "try")]
    pub try_count: i32,

    pub status: String,
    pub start_date: DateTime<Utc>,
    pub last_date: DateTime<Utc>,
    pub api_key: String,
    pub source_ip: String,
    pub credit_usage: i64,
    pub input_data: JsonValue,
    pub message: JsonValue,
}

impl RequestRow {
    pub fn request_status (&self)->Option<RequestStatus> {
        self.status.parse().ok()
    }
}

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

//! validated build request input. Everything the schema rejects turns into a
//! `validation` error before any work starts.

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use metget_common::datetime::parse_datetime;
use metget_sources::{NHC_SERVICE, VariableType};

use crate::domain::Domain;
use crate::errors::{Result, validation_error};
use crate::output::OutputFormat;

const VALID_DATA_TYPES: [&str; 8] = [
    "wind_pressure", "rain", "precipitation", "ice", "humidity", "temperature", "pressure", "wind",
];

#[derive(Debug, Clone)]
pub struct Input {
    json: JsonValue,

    version: String,
    creator: String,
    request_id: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    time_step: u64,
    filename: String,
    format: OutputFormat,
    data_type: String,
    variable_type: VariableType,

    nowcast: bool,
    multiple_forecasts: bool,
    backfill: bool,
    strict: bool,
    dry_run: bool,
    compression: bool,
    epsg: i32,

    domains: Vec<Domain>,
    credit_usage: i64,
}

impl Input {
    pub fn parse (json: &JsonValue)->Result<Input> {
        let version = required_str( json, "version")?;
        let creator = required_str( json, "creator")?;
        let request_id = optional_str( json, "request_id")
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let start_date = required_date( json, "start_date")?;
        let end_date = required_date( json, "end_date")?;
        if start_date >= end_date {
            return Err( validation_error( "start_date must be before end_date"))
        }

        let time_step = json.get("time_step")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| validation_error( "missing 'time_step'"))?;
        if time_step <= 0 {
            return Err( validation_error( "time_step must be a positive number of seconds"))
        }

        let mut filename = required_str( json, "filename")?;
        let format = OutputFormat::from_string( &required_str( json, "format")?)?;

        // NetCDF outputs always carry the suffix
        if matches!( format, OutputFormat::OwiNetcdf | OutputFormat::CfNetcdf) && !filename.ends_with(".nc") {
            filename.push_str(".nc");
        }

        let data_type = optional_str( json, "data_type").unwrap_or_else(|| "wind_pressure".to_string());
        if !VALID_DATA_TYPES.contains(&data_type.as_str()) {
            return Err( validation_error( format!("invalid data type '{data_type}'")))
        }
        let variable_type = VariableType::from_string(&data_type)?;

        let nowcast = optional_bool( json, "nowcast");
        let multiple_forecasts = optional_bool( json, "multiple_forecasts");
        let backfill = optional_bool( json, "backfill");
        let strict = optional_bool( json, "strict");
        let dry_run = optional_bool( json, "dry_run");
        let compression = optional_bool( json, "compression");

        let epsg = json.get("epsg").and_then(|v| v.as_i64()).unwrap_or(4326) as i32;
        if epsg <= 0 {
            return Err( validation_error( "epsg must be a positive integer"))
        }

        let domain_list = json.get("domains")
            .and_then(|v| v.as_array())
            .ok_or_else(|| validation_error( "missing 'domains'"))?;
        if domain_list.is_empty() {
            return Err( validation_error( "you must specify one or more domains"))
        }

        let mut domains = Vec::with_capacity( domain_list.len());
        for (level, domain_json) in domain_list.iter().enumerate() {
            domains.push( Domain::from_json( domain_json, level, epsg)?);
        }

        let mut input = Input {
            json: json.clone(),
            version, creator, request_id,
            start_date, end_date,
            time_step: time_step as u64,
            filename, format, data_type, variable_type,
            nowcast, multiple_forecasts, backfill, strict, dry_run, compression, epsg,
            domains,
            credit_usage: 0,
        };
        input.credit_usage = input.calculate_credit_usage();
        Ok(input)
    }

    pub fn json (&self)->&JsonValue { &self.json }
    pub fn version (&self)->&str { &self.version }
    pub fn creator (&self)->&str { &self.creator }
    pub fn request_id (&self)->&str { &self.request_id }
    pub fn start_date (&self)->DateTime<Utc> { self.start_date }
    pub fn end_date (&self)->DateTime<Utc> { self.end_date }
    pub fn time_step (&self)->u64 { self.time_step }
    pub fn filename (&self)->&str { &self.filename }
    pub fn format (&self)->OutputFormat { self.format }
    pub fn data_type (&self)->&str { &self.data_type }
    pub fn variable_type (&self)->VariableType { self.variable_type }
    pub fn nowcast (&self)->bool { self.nowcast }
    pub fn multiple_forecasts (&self)->bool { self.multiple_forecasts }
    pub fn backfill (&self)->bool { self.backfill }
    pub fn strict (&self)->bool { self.strict }
    pub fn dry_run (&self)->bool { self.dry_run }
    pub fn compression (&self)->bool { self.compression }
    pub fn epsg (&self)->i32 { self.epsg }
    pub fn credit_usage (&self)->i64 { self.credit_usage }

    pub fn num_domains (&self)->usize { self.domains.len() }

    pub fn domain (&self, index: usize)->&Domain { &self.domains[index] }

    pub fn domains (&self)->&[Domain] { &self.domains }

    /// credits are grid cells times time steps per gridded domain, with flat
    /// rates for track-only and raw requests
    fn calculate_credit_usage (&self)->i64 {
        let num_time_steps = ((self.end_date - self.start_date).num_seconds() as u64 / self.time_step) as i64;

        self.domains.iter()
            .map(|d| {
                if d.service() == NHC_SERVICE {
                    100 * 100 * 24
                } else if self.format == OutputFormat::Raw {
                    100 * 100 * 24 * num_time_steps
                } else {
                    d.grid().n() as i64 * num_time_steps
                }
            })
            .sum()
    }
}

fn required_str (json: &JsonValue, key: &str)->Result<String> {
    json.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| validation_error( format!("missing '{key}'")))
}

fn optional_str (json: &JsonValue, key: &str)->Option<String> {
    json.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}

fn optional_bool (json: &JsonValue, key: &str)->bool {
    json.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
}

fn required_date (json: &JsonValue, key: &str)->Result<DateTime<Utc>> {
    let text = required_str( json, key)?;
    parse_datetime(&text)
        .ok_or_else(|| validation_error( format!("invalid datetime in '{key}': {text}")))
}

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

//! one requested output domain: a service plus a target grid and whatever
//! storm/ensemble qualifiers the service requires.

use serde_json::Value as JsonValue;

use metget_sources::{NHC_SERVICE, descriptor_for_service, registry::valid_services};

use crate::errors::{Result, validation_error};
use crate::output_grid::OutputGrid;

/// services that address their files by storm name
fn service_requires_storm (service: &str)->bool {
    matches!( service, "nhc" | "coamps-tc" | "coamps-ctcx" | "hwrf" | "ncep-hafs-a" | "ncep-hafs-b")
}

/// services that address their files by ensemble member
fn service_requires_ensemble_member (service: &str)->bool {
    matches!( service, "gefs-ncep" | "coamps-ctcx" | "refs")
}

#[derive(Debug, Clone)]
pub struct Domain {
    name: String,
    service: String,
    grid: OutputGrid,
    domain_level: usize,

    storm: Option<String>,
    basin: Option<String>,
    advisory: Option<String>,
    storm_year: Option<i32>,
    tau: i32,
    ensemble_member: Option<String>,
}

impl Domain {
    /// build and validate one domain from its request JSON. `domain_level` is
    /// the domain's position in the request (0 = outermost)
    pub fn from_json (json: &JsonValue, domain_level: usize, epsg: i32)->Result<Domain> {
        let name = required_str( json, "name")?;
        let service = required_str( json, "service")?;

        if !valid_services().contains(&service.as_str()) {
            return Err( validation_error( format!("invalid service '{service}'")))
        }
        if service != NHC_SERVICE {
            descriptor_for_service(&service)?;
        }

        let grid = parse_grid( json, epsg)?;

        let storm = optional_str( json, "storm");
        let basin = optional_str( json, "basin");
        let advisory = json.get("advisory").and_then(|v| v.as_i64()).map(|v| v.to_string());
        let storm_year = json.get("storm_year").and_then(|v| v.as_i64()).map(|v| v as i32);
        let tau = json.get("tau").and_then(|v| v.as_i64()).unwrap_or(0) as i32;
        let ensemble_member = optional_str( json, "ensemble_member");

        if tau < 0 {
            return Err( validation_error( "tau must be >= 0"))
        }
        if let Some(basin) = &basin {
            if !matches!( basin.as_str(), "al" | "ep" | "cp") {
                return Err( validation_error( format!("invalid basin '{basin}'")))
            }
        }
        if let Some(advisory) = &advisory {
            if advisory.parse::<i64>().map(|v| v <= 0).unwrap_or(true) {
                return Err( validation_error( "advisory must be a positive integer"))
            }
        }
        if let Some(year) = storm_year {
            if year <= 1990 {
                return Err( validation_error( "storm_year must be after 1990"))
            }
        }

        if service_requires_storm(&service) && storm.is_none() {
            return Err( validation_error( format!("service '{service}' requires a storm")))
        }
        if service == NHC_SERVICE
            && (basin.is_none() || advisory.is_none() || storm_year.is_none()) {
            return Err( validation_error( "nhc domains require basin, advisory and storm_year"))
        }
        if service_requires_ensemble_member(&service) && ensemble_member.is_none() {
            return Err( validation_error( format!("service '{service}' requires an ensemble_member")))
        }

        Ok( Domain {
            name, service, grid, domain_level,
            storm, basin, advisory, storm_year, tau, ensemble_member,
        })
    }

    pub fn name (&self)->&str { &self.name }
    pub fn service (&self)->&str { &self.service }
    pub fn grid (&self)->&OutputGrid { &self.grid }
    pub fn domain_level (&self)->usize { self.domain_level }
    pub fn storm (&self)->Option<&str> { self.storm.as_deref() }
    pub fn basin (&self)->Option<&str> { self.basin.as_deref() }
    pub fn advisory (&self)->Option<&str> { self.advisory.as_deref() }
    pub fn storm_year (&self)->Option<i32> { self.storm_year }
    pub fn tau (&self)->i32 { self.tau }
    pub fn ensemble_member (&self)->Option<&str> { self.ensemble_member.as_deref() }
}

/// either a named preset or explicit corners + resolution
fn parse_grid (json: &JsonValue, epsg: i32)->Result<OutputGrid> {
    if let Some(preset) = optional_str( json, "predefined_domain") {
        return preset_grid( &preset, epsg)
    }

    let x_init = required_f64( json, "x_init")?;
    let y_init = required_f64( json, "y_init")?;
    let x_end = required_f64( json, "x_end")?;
    let y_end = required_f64( json, "y_end")?;
    let di = required_f64( json, "di")?;
    let dj = required_f64( json, "dj")?;

    if !(-180.0..=180.0).contains(&x_init) || !(-180.0..=180.0).contains(&x_end) {
        return Err( validation_error( "longitudes must be within [-180, 180]"))
    }
    if !(-90.0..=90.0).contains(&y_init) || !(-90.0..=90.0).contains(&y_end) {
        return Err( validation_error( "latitudes must be within [-90, 90]"))
    }
    if di <= 0.0 || dj <= 0.0 {
        return Err( validation_error( "di and dj must be positive"))
    }

    OutputGrid::new( x_init, y_init, x_end, y_end, di, dj, epsg)
}

fn preset_grid (name: &str, epsg: i32)->Result<OutputGrid> {
    match name {
        "wnat" => OutputGrid::new( -126.0, 23.0, -66.0, 50.0, 0.25, 0.25, epsg),
        "gom" => OutputGrid::new( -98.0, 10.0, -75.0, 30.0, 0.25, 0.25, epsg),
        "global" => OutputGrid::new( -180.0, -90.0, 180.0, 90.0, 0.25, 0.25, epsg),
        other => Err( validation_error( format!("unknown predefined domain '{other}'"))),
    }
}

fn required_str (json: &JsonValue, key: &str)->Result<String> {
    json.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| validation_error( format!("domain is missing '{key}'")))
}

fn optional_str (json: &JsonValue, key: &str)->Option<String> {
    json.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}

fn required_f64 (json: &JsonValue, key: &str)->Result<f64> {
    json.get(key)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| validation_error( format!("domain is missing '{key}'")))
}

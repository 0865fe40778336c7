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

use serde_json::{Value as JsonValue, json};

use metget_build::{Input, OutputFormat};
use metget_sources::VariableType;

fn request_json ()->JsonValue {
    json!({
        "version": "0.0.1",
        "creator": "test-suite",
        "request_id": "8e0b556f-39a9-4b54-9b86-b5f18a3c4ee1",
        "start_date": "2023-01-01T00:00:00",
        "end_date": "2023-01-01T06:00:00",
        "time_step": 3600,
        "filename": "fort",
        "format": "owi-ascii",
        "data_type": "wind_pressure",
        "backfill": true,
        "domains": [
            {
                "name": "wnat",
                "service": "gfs-ncep",
                "x_init": -98.0, "y_init": 10.0,
                "x_end": -60.0, "y_end": 45.0,
                "di": 0.25, "dj": 0.25
            }
        ]
    })
}

#[test]
fn test_parse_valid_request () {
    let input = Input::parse( &request_json()).unwrap();

    assert_eq!( input.request_id(), "8e0b556f-39a9-4b54-9b86-b5f18a3c4ee1");
    assert_eq!( input.format(), OutputFormat::OwiAscii);
    assert_eq!( input.variable_type(), VariableType::WindPressure);
    assert_eq!( input.time_step(), 3600);
    assert!( input.backfill());
    assert!( !input.nowcast());
    assert!( !input.multiple_forecasts());
    assert_eq!( input.epsg(), 4326);
    assert_eq!( input.num_domains(), 1);

    let domain = input.domain(0);
    assert_eq!( domain.service(), "gfs-ncep");
    assert_eq!( domain.domain_level(), 0);
    assert_eq!( domain.tau(), 0);
    assert_eq!( domain.grid().nj(), 153); // (-60 - -98) / 0.25 + 1
    assert_eq!( domain.grid().ni(), 141);

    // cells * time steps
    assert_eq!( input.credit_usage(), (153 * 141 * 6) as i64);
}

#[test]
fn test_netcdf_suffix_is_forced () {
    let mut json = request_json();
    json["format"] = json!("owi-netcdf");
    let input = Input::parse(&json).unwrap();
    assert_eq!( input.filename(), "fort.nc");
    assert_eq!( input.format(), OutputFormat::OwiNetcdf);
}

#[test]
fn test_date_ordering_is_validated () {
    let mut json = request_json();
    json["end_date"] = json!("2022-12-31T00:00:00");
    assert!( Input::parse(&json).is_err());
}

#[test]
fn test_time_step_must_be_positive () {
    let mut json = request_json();
    json["time_step"] = json!(0);
    assert!( Input::parse(&json).is_err());
}

#[test]
fn test_unknown_service_is_rejected () {
    let mut json = request_json();
    json["domains"][0]["service"] = json!("ecmwf");
    assert!( Input::parse(&json).is_err());
}

#[test]
fn test_unknown_format_and_data_type () {
    let mut json = request_json();
    json["format"] = json!("grib2");
    assert!( Input::parse(&json).is_err());

    let mut json = request_json();
    json["data_type"] = json!("vorticity");
    assert!( Input::parse(&json).is_err());
}

#[test]
fn test_domains_must_be_present () {
    let mut json = request_json();
    json["domains"] = json!([]);
    assert!( Input::parse(&json).is_err());
}

#[test]
fn test_storm_services_require_qualifiers () {
    // coamps-tc needs a storm
    let mut json = request_json();
    json["domains"][0]["service"] = json!("coamps-tc");
    assert!( Input::parse(&json).is_err());

    json["domains"][0]["storm"] = json!("09L");
    assert!( Input::parse(&json).is_ok());

    // gefs needs an ensemble member
    let mut json = request_json();
    json["domains"][0]["service"] = json!("gefs-ncep");
    assert!( Input::parse(&json).is_err());

    json["domains"][0]["ensemble_member"] = json!("c00");
    assert!( Input::parse(&json).is_ok());

    // nhc needs storm, basin, advisory and storm_year
    let mut json = request_json();
    json["domains"][0]["service"] = json!("nhc");
    json["domains"][0]["storm"] = json!("09");
    assert!( Input::parse(&json).is_err());

    json["domains"][0]["basin"] = json!("al");
    json["domains"][0]["advisory"] = json!(12);
    json["domains"][0]["storm_year"] = json!(2023);
    assert!( Input::parse(&json).is_ok());
}

#[test]
fn test_grid_presets () {
    let mut json = request_json();
    json["domains"][0] = json!({
        "name": "gulf",
        "service": "gfs-ncep",
        "predefined_domain": "gom"
    });
    let input = Input::parse(&json).unwrap();
    assert_eq!( input.domain(0).grid().x_lower_left(), -98.0);
    assert_eq!( input.domain(0).grid().y_lower_left(), 10.0);
    assert_eq!( input.domain(0).grid().x_upper_right(), -75.0);
    assert_eq!( input.domain(0).grid().y_upper_right(), 30.0);

    json["domains"][0]["predefined_domain"] = json!("wnat");
    let input = Input::parse(&json).unwrap();
    assert_eq!( input.domain(0).grid().x_lower_left(), -126.0);
    assert_eq!( input.domain(0).grid().y_upper_right(), 50.0);

    json["domains"][0]["predefined_domain"] = json!("atlantis");
    assert!( Input::parse(&json).is_err());
}

#[test]
fn test_coordinate_bounds () {
    let mut json = request_json();
    json["domains"][0]["x_init"] = json!(-190.0);
    assert!( Input::parse(&json).is_err());

    let mut json = request_json();
    json["domains"][0]["y_end"] = json!(95.0);
    assert!( Input::parse(&json).is_err());

    let mut json = request_json();
    json["domains"][0]["di"] = json!(-0.25);
    assert!( Input::parse(&json).is_err());
}

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

use metget_sources::*;

#[test]
fn test_service_lookup () {
    let gfs = descriptor_for_service("gfs-ncep").unwrap();
    assert_eq!( gfs.name, "GFS-NCEP");
    assert_eq!( gfs.table_name, "gfs_ncep");
    assert_eq!( gfs.cycles, &[0, 6, 12, 18]);
    assert!( gfs.bucket.is_some());

    assert!( descriptor_for_service("gfs").is_err());
    assert!( descriptor_for_name("refs").is_err()); // service id, not a display name
    assert!( descriptor_for_name("refs-ncep").is_ok());
}

#[test]
fn test_variable_lookup () {
    let gfs = descriptor_for_service("gfs-ncep").unwrap();

    let press = gfs.variable( MetDataType::Pressure).unwrap();
    assert_eq!( press.grib_name, "prmsl");
    assert_eq!( press.scale, 0.01);
    assert!( !press.is_accumulated);

    // GFS does not carry surface stress
    assert!( gfs.variable( MetDataType::SurfaceStressU).is_err());
}

#[test]
fn test_selected_variables_intersection () {
    let wpc = descriptor_for_service("wpc-ncep").unwrap();

    // WPC only has precipitation; requesting wind_pressure selects nothing
    assert!( wpc.selected_variables( VariableType::WindPressure).is_empty());

    let rain = wpc.selected_variables( VariableType::Precipitation);
    assert_eq!( rain.len(), 1);
    assert!( rain[0].is_accumulated);
    assert_eq!( rain[0].accumulation_time, Some(21600.0));
}

#[test]
fn test_wind_pressure_component_order () {
    let gfs = descriptor_for_service("gfs-ncep").unwrap();
    let selected = gfs.selected_variables( VariableType::WindPressure);

    let types: Vec<MetDataType> = selected.iter().map(|v| v.data_type).collect();
    assert_eq!( types, vec![MetDataType::Pressure, MetDataType::WindU, MetDataType::WindV]);
}

#[test]
fn test_variable_type_aliases () {
    assert_eq!( VariableType::from_string("rain").unwrap(), VariableType::Precipitation);
    assert_eq!( VariableType::from_string("precipitation").unwrap(), VariableType::Precipitation);
    assert!( VariableType::from_string("windy").is_err());
}

#[test]
fn test_ensemble_members () {
    let gefs = descriptor_for_service("gefs-ncep").unwrap();
    let members = gefs.ensemble_members.unwrap();
    assert_eq!( members.len(), 32);
    assert_eq!( members[0], "avg");
    assert_eq!( members[1], "c00");
    assert_eq!( members[31], "p30");

    assert!( gefs.kind.has_ensemble_member());
    assert!( !gefs.kind.has_storm());

    let ctcx = descriptor_for_service("coamps-ctcx").unwrap();
    assert!( ctcx.kind.has_ensemble_member());
    assert!( ctcx.kind.has_storm());
}

#[test]
fn test_skip_zero_hour_flags () {
    let hrrr = descriptor_for_service("hrrr-conus").unwrap();
    let precip = hrrr.variable( MetDataType::Precipitation).unwrap();
    assert!( precip.skip_0);
    assert!( !precip.is_accumulated);

    let nam = descriptor_for_service("nam-ncep").unwrap();
    let precip = nam.variable( MetDataType::Precipitation).unwrap();
    assert!( precip.is_accumulated);
    assert!( precip.accumulation_time.is_none());
}

#[test]
fn test_data_type_strings () {
    assert_eq!( MetDataType::Pressure.to_string(), "pressure");
    assert_eq!( MetDataType::CategoricalFreezingRain.to_string(), "categorical_freezing_rain");
    assert_eq!( MetDataType::Pressure.netcdf_var_name(), "mslp");
    assert_eq!( MetDataType::Pressure.default_value(), 1013.0);
    assert_eq!( MetDataType::Temperature.default_value(), 20.0);
    assert_eq!( MetDataType::WindU.fill_value(), -999.0);
}

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

//! the static source registry. One immutable [`SourceDescriptor`] per model,
//! shared process-wide.

use crate::data_type::MetDataType;
use crate::descriptor::{FileFormat, GribProductId, ServiceKind, SourceDescriptor, VariableBinding};
use crate::errors::{MetgetSourcesError, Result};

//--- grib product identifications (WMO + NCEP local tables)

const GRIB_WIND_U: GribProductId = GribProductId::new(0, 2, 2, 103).at_level(10.0);
const GRIB_WIND_V: GribProductId = GribProductId::new(0, 2, 3, 103).at_level(10.0);
const GRIB_PRMSL: GribProductId = GribProductId::new(0, 3, 1, 101);
const GRIB_MSLMA: GribProductId = GribProductId::new(0, 3, 198, 101);
const GRIB_SP: GribProductId = GribProductId::new(0, 3, 0, 1);
const GRIB_ICEC: GribProductId = GribProductId::new(10, 2, 0, 1);
const GRIB_PRATE: GribProductId = GribProductId::new(0, 1, 7, 1);
const GRIB_APCP: GribProductId = GribProductId::new(0, 1, 8, 1);
const GRIB_ACPCP: GribProductId = GribProductId::new(0, 1, 10, 1);
const GRIB_RH_LAYER: GribProductId = GribProductId::new(0, 1, 1, 108);
const GRIB_RH_2M: GribProductId = GribProductId::new(0, 1, 1, 103).at_level(2.0);
const GRIB_TMP_LAYER: GribProductId = GribProductId::new(0, 0, 0, 108);
const GRIB_TMP_2M: GribProductId = GribProductId::new(0, 0, 0, 103).at_level(2.0);
const GRIB_CRAIN: GribProductId = GribProductId::new(0, 1, 192, 1);
const GRIB_CFRZR: GribProductId = GribProductId::new(0, 1, 193, 1);
const GRIB_CICEP: GribProductId = GribProductId::new(0, 1, 194, 1);
const GRIB_CSNOW: GribProductId = GribProductId::new(0, 1, 195, 1);

//--- per-service variable tables

static GFS_VARIABLES: [VariableBinding; 7] = [
    VariableBinding::new( MetDataType::WindU, "uvel", "UGRD:10 m above ground", "u10", "10u", 1.0).grib(GRIB_WIND_U),
    VariableBinding::new( MetDataType::WindV, "vvel", "VGRD:10 m above ground", "v10", "10v", 1.0).grib(GRIB_WIND_V),
    VariableBinding::new( MetDataType::Pressure, "press", "PRMSL:mean sea level", "prmsl", "prmsl", 0.01).grib(GRIB_PRMSL),
    VariableBinding::new( MetDataType::Ice, "ice", "ICEC:surface", "icec", "icec", 1.0).grib(GRIB_ICEC),
    VariableBinding::new( MetDataType::Precipitation, "precip_rate", "PRATE:surface", "prate", "prate", 3600.0).grib(GRIB_PRATE),
    VariableBinding::new( MetDataType::Humidity, "humidity", "RH:30-0 mb above ground", "rh", "r", 1.0).grib(GRIB_RH_LAYER),
    VariableBinding::new( MetDataType::Temperature, "temperature", "TMP:30-0 mb above ground", "tmp", "t", 1.0).grib(GRIB_TMP_LAYER),
];

static NAM_VARIABLES: [VariableBinding; 6] = [
    VariableBinding::new( MetDataType::WindU, "uvel", "UGRD:10 m above ground", "u10", "10u", 1.0).grib(GRIB_WIND_U),
    VariableBinding::new( MetDataType::WindV, "vvel", "VGRD:10 m above ground", "v10", "10v", 1.0).grib(GRIB_WIND_V),
    VariableBinding::new( MetDataType::Pressure, "press", "PRMSL:mean sea level", "prmsl", "prmsl", 0.01).grib(GRIB_PRMSL),
    VariableBinding::new( MetDataType::Precipitation, "accumulated_precip", "ACPCP:surface", "acpcp", "acpcp", 3600.0).grib(GRIB_ACPCP).accumulated(),
    VariableBinding::new( MetDataType::Humidity, "humidity", "RH:30-0 mb above ground", "rh", "r", 1.0).grib(GRIB_RH_LAYER),
    VariableBinding::new( MetDataType::Temperature, "temperature", "TMP:30-0 mb above ground", "tmp", "t", 1.0).grib(GRIB_TMP_LAYER),
];

static GEFS_VARIABLES: [VariableBinding; 5] = [
    VariableBinding::new( MetDataType::WindU, "uvel", "UGRD:10 m above ground", "u10", "10u", 1.0).grib(GRIB_WIND_U),
    VariableBinding::new( MetDataType::WindV, "vvel", "VGRD:10 m above ground", "v10", "10v", 1.0).grib(GRIB_WIND_V),
    VariableBinding::new( MetDataType::Pressure, "press", "PRMSL:mean sea level", "prmsl", "prmsl", 0.01).grib(GRIB_PRMSL),
    VariableBinding::new( MetDataType::Ice, "ice", "ICETK:surface", "icec", "icec", 1.0).grib(GRIB_ICEC),
    VariableBinding::new( MetDataType::Precipitation, "accumulated_precip", "APCP:surface", "tp", "tp", 3600.0).grib(GRIB_APCP).accumulated(),
];

static RRFS_VARIABLES: [VariableBinding; 10] = [
    VariableBinding::new( MetDataType::WindU, "uvel", "UGRD:10 m above ground", "u10", "10u", 1.0).grib(GRIB_WIND_U),
    VariableBinding::new( MetDataType::WindV, "vvel", "VGRD:10 m above ground", "v10", "10v", 1.0).grib(GRIB_WIND_V),
    VariableBinding::new( MetDataType::Pressure, "press", "PRES:surface", "sp", "sp", 0.01).grib(GRIB_SP),
    VariableBinding::new( MetDataType::Ice, "ice", "ICEC:surface", "icec", "siconc", 1.0).grib(GRIB_ICEC),
    VariableBinding::new( MetDataType::Precipitation, "precip_rate", "PRATE:surface", "prate", "prate", 3600.0).grib(GRIB_PRATE).skip_zero_hour(),
    VariableBinding::new( MetDataType::Humidity, "humidity", "RH:2 m above ground", "rh", "r2", 1.0).grib(GRIB_RH_2M),
    VariableBinding::new( MetDataType::Temperature, "temperature", "TMP:2 m above ground", "tmp", "t2m", 1.0).grib(GRIB_TMP_2M),
    VariableBinding::new( MetDataType::CategoricalRain, "cat_rain", "CRAIN:surface", "crain", "crain", 1.0).grib(GRIB_CRAIN),
    VariableBinding::new( MetDataType::CategoricalIce, "cat_ice", "CICEP:surface", "cicep", "cicep", 1.0).grib(GRIB_CICEP),
    VariableBinding::new( MetDataType::CategoricalSnow, "cat_snow", "CSNOW:surface", "csnow", "csnow", 1.0).grib(GRIB_CSNOW),
];

static REFS_VARIABLES: [VariableBinding; 11] = [
    VariableBinding::new( MetDataType::WindU, "uvel", "UGRD:10 m above ground", "u10", "10u", 1.0).grib(GRIB_WIND_U),
    VariableBinding::new( MetDataType::WindV, "vvel", "VGRD:10 m above ground", "v10", "10v", 1.0).grib(GRIB_WIND_V),
    VariableBinding::new( MetDataType::Pressure, "press", "PRES:surface", "mslma", "sp", 0.01).grib(GRIB_SP),
    VariableBinding::new( MetDataType::Ice, "ice", "ICEC:surface", "icec", "siconc", 1.0).grib(GRIB_ICEC),
    VariableBinding::new( MetDataType::Precipitation, "precip_rate", "PRATE:surface", "prate", "prate", 3600.0).grib(GRIB_PRATE).skip_zero_hour(),
    VariableBinding::new( MetDataType::Humidity, "humidity", "RH:2 m above ground", "rh", "r2", 1.0).grib(GRIB_RH_2M),
    VariableBinding::new( MetDataType::Temperature, "temperature", "TMP:2 m above ground", "tmp", "t2m", 1.0).grib(GRIB_TMP_2M),
    VariableBinding::new( MetDataType::CategoricalRain, "cat_rain", "CRAIN:surface", "crain", "crain", 1.0).grib(GRIB_CRAIN),
    VariableBinding::new( MetDataType::CategoricalIce, "cat_ice", "CICEP:surface", "cicep", "cicep", 1.0).grib(GRIB_CICEP),
    VariableBinding::new( MetDataType::CategoricalSnow, "cat_snow", "CSNOW:surface", "csnow", "csnow", 1.0).grib(GRIB_CSNOW),
    VariableBinding::new( MetDataType::CategoricalFreezingRain, "cat_freezing_rain", "CFRZR:surface", "cfrzr", "cfrzr", 1.0).grib(GRIB_CFRZR),
];

static HRRR_VARIABLES: [VariableBinding; 7] = [
    VariableBinding::new( MetDataType::WindU, "uvel", "UGRD:10 m above ground", "u10", "10u", 1.0).grib(GRIB_WIND_U),
    VariableBinding::new( MetDataType::WindV, "vvel", "VGRD:10 m above ground", "v10", "10v", 1.0).grib(GRIB_WIND_V),
    VariableBinding::new( MetDataType::Pressure, "press", "MSLMA:mean sea level", "mslma", "mslma", 0.01).grib(GRIB_MSLMA),
    VariableBinding::new( MetDataType::Ice, "ice", "ICEC:surface", "icec", "icec", 1.0).grib(GRIB_ICEC),
    VariableBinding::new( MetDataType::Precipitation, "precip_rate", "PRATE:surface", "prate", "prate", 3600.0).grib(GRIB_PRATE).skip_zero_hour(),
    VariableBinding::new( MetDataType::Humidity, "humidity", "RH:2 m above ground", "rh", "2r", 1.0).grib(GRIB_RH_2M),
    VariableBinding::new( MetDataType::Temperature, "temperature", "TMP:2 m above ground", "tmp", "2t", 1.0).grib(GRIB_TMP_2M),
];

static HWRF_VARIABLES: [VariableBinding; 6] = [
    VariableBinding::new( MetDataType::WindU, "uvel", "UGRD:10 m above ground", "u10", "10u", 1.0).grib(GRIB_WIND_U),
    VariableBinding::new( MetDataType::WindV, "vvel", "VGRD:10 m above ground", "v10", "10v", 1.0).grib(GRIB_WIND_V),
    VariableBinding::new( MetDataType::Pressure, "press", "PRMSL:mean sea level", "prmsl", "prmsl", 0.01).grib(GRIB_PRMSL),
    VariableBinding::new( MetDataType::Precipitation, "accumulated_precip", "APCP:surface", "apcp", "apcp", 3600.0).grib(GRIB_APCP).accumulated(),
    VariableBinding::new( MetDataType::Humidity, "humidity", "RH:30-0 mb above ground", "rh", "r", 1.0).grib(GRIB_RH_LAYER),
    VariableBinding::new( MetDataType::Temperature, "temperature", "TMP:30-0 mb above ground", "tmp", "t", 1.0).grib(GRIB_TMP_LAYER),
];

static WPC_VARIABLES: [VariableBinding; 1] = [
    VariableBinding::new( MetDataType::Precipitation, "accumulated_precip", "APCP:surface", "tp", "tp", 3600.0)
        .grib(GRIB_APCP).accumulated().accumulation_window(21600.0),
];

static HAFS_VARIABLES: [VariableBinding; 6] = [
    VariableBinding::new( MetDataType::WindU, "uvel", "UGRD:10 m above ground", "u10", "10u", 1.0).grib(GRIB_WIND_U),
    VariableBinding::new( MetDataType::WindV, "vvel", "VGRD:10 m above ground", "v10", "10v", 1.0).grib(GRIB_WIND_V),
    VariableBinding::new( MetDataType::Pressure, "press", "PRMSL:mean sea level", "prmsl", "prmsl", 0.01).grib(GRIB_PRMSL),
    VariableBinding::new( MetDataType::Precipitation, "precip_rate", "PRATE:surface", "prate", "prate", 3600.0).grib(GRIB_PRATE),
    VariableBinding::new( MetDataType::Humidity, "humidity", "RH:2 m above ground", "r2", "2r", 1.0).grib(GRIB_RH_2M),
    VariableBinding::new( MetDataType::Temperature, "temperature", "TMP:2 m above ground", "t2m", "2t", 1.0).grib(GRIB_TMP_2M),
];

static COAMPS_VARIABLES: [VariableBinding; 13] = [
    VariableBinding::new( MetDataType::WindU, "uuwind", "U component of wind", "uuwind", "", 1.0),
    VariableBinding::new( MetDataType::WindV, "vvwind", "V component of wind", "vvwind", "", 1.0),
    VariableBinding::new( MetDataType::Pressure, "slpres", "Sea level pressure", "slpres", "", 1.0),
    VariableBinding::new( MetDataType::Precipitation, "hourly_precip", "Hourly precipitation", "precip", "", 1.0).skip_zero_hour(),
    VariableBinding::new( MetDataType::Humidity, "rh", "Relative humidity", "relhum", "", 1.0),
    VariableBinding::new( MetDataType::Temperature, "temperature", "Temperature", "airtmp", "", 1.0),
    VariableBinding::new( MetDataType::SurfaceStressU, "surface_stress_u", "sfc u stress", "stresu", "", 1.0).accumulated(),
    VariableBinding::new( MetDataType::SurfaceStressV, "surface_stress_v", "sfc v stress", "stresv", "", 1.0).accumulated(),
    VariableBinding::new( MetDataType::SurfaceLatentHeatFlux, "surface_latent_heat_flux", "sfc latent heat flux", "lahflx", "", 1.0).accumulated(),
    VariableBinding::new( MetDataType::SurfaceSensibleHeatFlux, "surface_sensible_heat_flux", "sfc sensible heat flux", "sehflx", "", 1.0).accumulated(),
    VariableBinding::new( MetDataType::SurfaceLongwaveFlux, "surface_longwave_flux", "sfc longwave flux", "lonflx", "", 1.0).accumulated(),
    VariableBinding::new( MetDataType::SurfaceSolarFlux, "surface_solar_flux", "sfc solar flux", "solflx", "", 1.0).accumulated(),
    VariableBinding::new( MetDataType::SurfaceNetRadiationFlux, "surface_net_radiation_flux", "sfc net radiation flux", "nradfl", "", 1.0).accumulated(),
];

//--- cycle tables

static SYNOPTIC_CYCLES: [u32; 4] = [0, 6, 12, 18];
static HOURLY_CYCLES: [u32; 24] = [
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23,
];

//--- ensemble member tables

static GEFS_MEMBERS: [&str; 32] = [
    "avg", "c00",
    "p01", "p02", "p03", "p04", "p05", "p06", "p07", "p08", "p09", "p10",
    "p11", "p12", "p13", "p14", "p15", "p16", "p17", "p18", "p19", "p20",
    "p21", "p22", "p23", "p24", "p25", "p26", "p27", "p28", "p29", "p30",
];
static REFS_MEMBERS: [&str; 5] = ["m001", "m002", "m003", "m004", "m005"];

//--- the descriptors

pub static NCEP_GFS: SourceDescriptor = SourceDescriptor {
    name: "GFS-NCEP",
    service: "gfs-ncep",
    table_name: "gfs_ncep",
    file_format: FileFormat::Grib,
    bucket: Some("noaa-gfs-bdp-pds"),
    kind: ServiceKind::Generic,
    variables: &GFS_VARIABLES,
    cycles: &SYNOPTIC_CYCLES,
    ensemble_members: None,
};

pub static NCEP_NAM: SourceDescriptor = SourceDescriptor {
    name: "NAM-NCEP",
    service: "nam-ncep",
    table_name: "nam_ncep",
    file_format: FileFormat::Grib,
    bucket: Some("noaa-nam-pds"),
    kind: ServiceKind::Generic,
    variables: &NAM_VARIABLES,
    cycles: &SYNOPTIC_CYCLES,
    ensemble_members: None,
};

pub static NCEP_GEFS: SourceDescriptor = SourceDescriptor {
    name: "GEFS-NCEP",
    service: "gefs-ncep",
    table_name: "gefs_fcst",
    file_format: FileFormat::Grib,
    bucket: Some("noaa-gefs-pds"),
    kind: ServiceKind::Ensemble,
    variables: &GEFS_VARIABLES,
    cycles: &SYNOPTIC_CYCLES,
    ensemble_members: Some(&GEFS_MEMBERS),
};

pub static NCEP_RRFS: SourceDescriptor = SourceDescriptor {
    name: "RRFS",
    service: "rrfs",
    table_name: "rrfs_ncep",
    file_format: FileFormat::Grib,
    bucket: Some("noaa-rrfs-pds"),
    kind: ServiceKind::Generic,
    variables: &RRFS_VARIABLES,
    cycles: &HOURLY_CYCLES,
    ensemble_members: None,
};

pub static NCEP_REFS: SourceDescriptor = SourceDescriptor {
    name: "REFS-NCEP",
    service: "refs",
    table_name: "refs_ncep",
    file_format: FileFormat::Grib,
    bucket: Some("noaa-rrfs-pds"),
    kind: ServiceKind::Ensemble,
    variables: &REFS_VARIABLES,
    cycles: &SYNOPTIC_CYCLES,
    ensemble_members: Some(&REFS_MEMBERS),
};

pub static HRRR_CONUS: SourceDescriptor = SourceDescriptor {
    name: "HRRR-CONUS",
    service: "hrrr-conus",
    table_name: "hrrr_ncep",
    file_format: FileFormat::Grib,
    bucket: Some("noaa-hrrr-bdp-pds"),
    kind: ServiceKind::Generic,
    variables: &HRRR_VARIABLES,
    cycles: &HOURLY_CYCLES,
    ensemble_members: None,
};

pub static HRRR_ALASKA: SourceDescriptor = SourceDescriptor {
    name: "HRRR-ALASKA",
    service: "hrrr-alaska",
    table_name: "hrrr_alaska_ncep",
    file_format: FileFormat::Grib,
    bucket: Some("noaa-hrrr-bdp-pds"),
    kind: ServiceKind::Generic,
    variables: &HRRR_VARIABLES,
    cycles: &HOURLY_CYCLES,
    ensemble_members: None,
};

pub static NCEP_HWRF: SourceDescriptor = SourceDescriptor {
    name: "HWRF",
    service: "hwrf",
    table_name: "hwrf",
    file_format: FileFormat::Grib,
    bucket: None,
    kind: ServiceKind::Storm,
    variables: &HWRF_VARIABLES,
    cycles: &SYNOPTIC_CYCLES,
    ensemble_members: None,
};

pub static NCEP_WPC: SourceDescriptor = SourceDescriptor {
    name: "WPC-NCEP",
    service: "wpc-ncep",
    table_name: "wpc_ncep",
    file_format: FileFormat::Grib,
    bucket: None,
    kind: ServiceKind::Generic,
    variables: &WPC_VARIABLES,
    cycles: &SYNOPTIC_CYCLES,
    ensemble_members: None,
};

pub static NCEP_HAFS_A: SourceDescriptor = SourceDescriptor {
    name: "NCEP-HAFS-A",
    service: "ncep-hafs-a",
    table_name: "ncep_hafs_a",
    file_format: FileFormat::Grib,
    bucket: Some("noaa-nws-hafs-pds"),
    kind: ServiceKind::Storm,
    variables: &HAFS_VARIABLES,
    cycles: &SYNOPTIC_CYCLES,
    ensemble_members: None,
};

pub static NCEP_HAFS_B: SourceDescriptor = SourceDescriptor {
    name: "NCEP-HAFS-B",
    service: "ncep-hafs-b",
    table_name: "ncep_hafs_b",
    file_format: FileFormat::Grib,
    bucket: Some("noaa-nws-hafs-pds"),
    kind: ServiceKind::Storm,
    variables: &HAFS_VARIABLES,
    cycles: &SYNOPTIC_CYCLES,
    ensemble_members: None,
};

pub static COAMPS_TC: SourceDescriptor = SourceDescriptor {
    name: "COAMPS-TC",
    service: "coamps-tc",
    table_name: "coamps_tc",
    file_format: FileFormat::CoampsNetcdf,
    bucket: None,
    kind: ServiceKind::Storm,
    variables: &COAMPS_VARIABLES,
    cycles: &SYNOPTIC_CYCLES,
    ensemble_members: None,
};

pub static COAMPS_CTCX: SourceDescriptor = SourceDescriptor {
    name: "COAMPS-CTCX",
    service: "coamps-ctcx",
    table_name: "ctcx",
    file_format: FileFormat::CoampsNetcdf,
    bucket: None,
    kind: ServiceKind::StormEnsemble,
    variables: &COAMPS_VARIABLES,
    cycles: &SYNOPTIC_CYCLES,
    ensemble_members: None,
};

pub static ALL_SOURCES: [&SourceDescriptor; 13] = [
    &NCEP_GFS, &NCEP_GEFS, &NCEP_NAM, &HRRR_CONUS, &HRRR_ALASKA, &NCEP_HWRF, &NCEP_WPC,
    &NCEP_HAFS_A, &NCEP_HAFS_B, &COAMPS_TC, &COAMPS_CTCX, &NCEP_RRFS, &NCEP_REFS,
];

/// the storm-track pseudo service; it has no gridded descriptor
pub const NHC_SERVICE: &str = "nhc";

/// look up a descriptor by its request-facing service id (e.g. "gfs-ncep")
pub fn descriptor_for_service (service: &str)->Result<&'static SourceDescriptor> {
    ALL_SOURCES.iter()
        .find(|d| d.service == service)
        .copied()
        .ok_or_else(|| MetgetSourcesError::UnknownService( service.to_string()))
}

/// look up a descriptor by display name (e.g. "GFS-NCEP"), case-insensitive
pub fn descriptor_for_name (name: &str)->Result<&'static SourceDescriptor> {
    ALL_SOURCES.iter()
        .find(|d| d.name.eq_ignore_ascii_case(name))
        .copied()
        .ok_or_else(|| MetgetSourcesError::UnknownService( name.to_string()))
}

/// every service id the request validator accepts, including "nhc"
pub fn valid_services ()->Vec<&'static str> {
    let mut services: Vec<&str> = ALL_SOURCES.iter().map(|d| d.service).collect();
    services.push(NHC_SERVICE);
    services
}

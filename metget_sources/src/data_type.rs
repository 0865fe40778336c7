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

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::errors::{MetgetSourcesError, Result};

/// canonical fill value for every output format
pub const FILL_VALUE: f64 = -999.0;

/// a single physical field a meteorological source can provide
#[derive(Display, EnumString, EnumIter, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[strum(serialize_all = "snake_case")]
pub enum MetDataType {
    Pressure,
    WindU,
    WindV,
    Temperature,
    Humidity,
    Precipitation,
    Ice,
    SurfaceStressU,
    SurfaceStressV,
    SurfaceLatentHeatFlux,
    SurfaceSensibleHeatFlux,
    SurfaceLongwaveFlux,
    SurfaceSolarFlux,
    SurfaceNetRadiationFlux,
    CategoricalRain,
    CategoricalSnow,
    CategoricalIce,
    CategoricalFreezingRain,
}

impl MetDataType {
    pub fn cf_long_name (&self)->&'static str {
        match self {
            MetDataType::Pressure => "air pressure at sea level",
            MetDataType::WindU => "e/w wind velocity",
            MetDataType::WindV => "n/s wind velocity",
            MetDataType::Temperature => "air temperature at sea level",
            MetDataType::Humidity => "specific humidity",
            MetDataType::Precipitation => "precipitation rate",
            MetDataType::Ice => "ice depth",
            MetDataType::SurfaceStressU => "eastward surface stress",
            MetDataType::SurfaceStressV => "northward surface stress",
            MetDataType::SurfaceLatentHeatFlux => "surface latent heat flux",
            MetDataType::SurfaceSensibleHeatFlux => "surface sensible heat flux",
            MetDataType::SurfaceLongwaveFlux => "surface longwave radiation flux",
            MetDataType::SurfaceSolarFlux => "surface solar radiation flux",
            MetDataType::SurfaceNetRadiationFlux => "surface net radiation flux",
            MetDataType::CategoricalRain => "categorical rain",
            MetDataType::CategoricalSnow => "categorical snow",
            MetDataType::CategoricalIce => "categorical ice",
            MetDataType::CategoricalFreezingRain => "categorical freezing rain",
        }
    }

    pub fn units (&self)->&'static str {
        match self {
            MetDataType::Pressure => "mb",
            MetDataType::WindU | MetDataType::WindV => "m/s",
            MetDataType::Temperature => "C",
            MetDataType::Humidity => "kg/kg",
            MetDataType::Precipitation => "mm/hr",
            MetDataType::Ice => "m",
            MetDataType::SurfaceStressU
            | MetDataType::SurfaceStressV
            | MetDataType::SurfaceLatentHeatFlux
            | MetDataType::SurfaceSensibleHeatFlux
            | MetDataType::SurfaceLongwaveFlux
            | MetDataType::SurfaceSolarFlux
            | MetDataType::SurfaceNetRadiationFlux => "W/m^2",
            MetDataType::CategoricalRain
            | MetDataType::CategoricalSnow
            | MetDataType::CategoricalIce
            | MetDataType::CategoricalFreezingRain => "n/a",
        }
    }

    pub fn cf_standard_name (&self)->&'static str {
        match self {
            MetDataType::Pressure => "air_pressure_at_sea_level",
            MetDataType::WindU => "eastward_wind",
            MetDataType::WindV => "northward_wind",
            MetDataType::Temperature => "air_temperature_at_sea_level",
            MetDataType::Humidity => "specific_humidity",
            MetDataType::Precipitation => "precipitation_rate",
            MetDataType::Ice => "ice_depth",
            MetDataType::SurfaceStressU => "eastward_surface_stress",
            MetDataType::SurfaceStressV => "northward_surface_stress",
            MetDataType::SurfaceLatentHeatFlux => "surface_latent_heat_flux",
            MetDataType::SurfaceSensibleHeatFlux => "surface_sensible_heat_flux",
            MetDataType::SurfaceLongwaveFlux => "surface_longwave_radiation_flux",
            MetDataType::SurfaceSolarFlux => "surface_solar_radiation_flux",
            MetDataType::SurfaceNetRadiationFlux => "surface_net_radiation_flux",
            MetDataType::CategoricalRain => "categorical_rain",
            MetDataType::CategoricalSnow => "categorical_snow",
            MetDataType::CategoricalIce => "categorical_ice",
            MetDataType::CategoricalFreezingRain => "categorical_freezing_rain",
        }
    }

    pub fn netcdf_var_name (&self)->&'static str {
        match self {
            MetDataType::Pressure => "mslp",
            MetDataType::WindU => "wind_u",
            MetDataType::WindV => "wind_v",
            MetDataType::Temperature => "temperature",
            MetDataType::Humidity => "humidity",
            MetDataType::Precipitation => "precipitation",
            MetDataType::Ice => "ice",
            MetDataType::SurfaceStressU => "surface_stress_u",
            MetDataType::SurfaceStressV => "surface_stress_v",
            MetDataType::SurfaceLatentHeatFlux => "surface_latent_heat_flux",
            MetDataType::SurfaceSensibleHeatFlux => "surface_sensible_heat_flux",
            MetDataType::SurfaceLongwaveFlux => "surface_longwave_flux",
            MetDataType::SurfaceSolarFlux => "surface_solar_flux",
            MetDataType::SurfaceNetRadiationFlux => "surface_net_radiation_flux",
            MetDataType::CategoricalRain => "categorical_rain",
            MetDataType::CategoricalSnow => "categorical_snow",
            MetDataType::CategoricalIce => "categorical_ice",
            MetDataType::CategoricalFreezingRain => "categorical_freezing_rain",
        }
    }

    /// background value used when a hole may be backfilled with something physical
    pub fn default_value (&self)->f64 {
        match self {
            MetDataType::Pressure => 1013.0,
            MetDataType::Temperature => 20.0,
            _ => 0.0,
        }
    }

    pub fn fill_value (&self)->f64 {
        FILL_VALUE
    }
}

/// the user-facing grouping of fields that can be requested together
#[derive(Display, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "snake_case")]
pub enum VariableType {
    AllVariables,
    WindPressure,
    Pressure,
    Wind,
    Precipitation,
    Temperature,
    Humidity,
    Ice,
    PrecipitationType,
}

impl VariableType {
    pub fn from_string (data_type: &str)->Result<Self> {
        match data_type {
            "wind_pressure" => Ok(VariableType::WindPressure),
            "pressure" => Ok(VariableType::Pressure),
            "wind" => Ok(VariableType::Wind),
            "precipitation" | "rain" => Ok(VariableType::Precipitation),
            "temperature" => Ok(VariableType::Temperature),
            "humidity" => Ok(VariableType::Humidity),
            "ice" => Ok(VariableType::Ice),
            "all_variables" => Ok(VariableType::AllVariables),
            "precipitation_type" => Ok(VariableType::PrecipitationType),
            other => Err( MetgetSourcesError::UnknownDataType( other.to_string())),
        }
    }

    /// the component fields of this variable group, in output order
    pub fn select (&self)->Vec<MetDataType> {
        match self {
            VariableType::WindPressure => vec![MetDataType::Pressure, MetDataType::WindU, MetDataType::WindV],
            VariableType::Pressure => vec![MetDataType::Pressure],
            VariableType::Wind => vec![MetDataType::WindU, MetDataType::WindV],
            VariableType::Precipitation => vec![MetDataType::Precipitation],
            VariableType::Temperature => vec![MetDataType::Temperature],
            VariableType::Humidity => vec![MetDataType::Humidity],
            VariableType::Ice => vec![MetDataType::Ice],
            VariableType::AllVariables => MetDataType::iter().collect(),
            VariableType::PrecipitationType => vec![
                MetDataType::Precipitation,
                MetDataType::CategoricalRain,
                MetDataType::CategoricalSnow,
                MetDataType::CategoricalIce,
                MetDataType::CategoricalFreezingRain,
            ],
        }
    }
}

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

//! DDL for the catalog tables. A fresh database is stood up by the worker at
//! startup; everything is `IF NOT EXISTS` so re-running is harmless.

use metget_sources::{ServiceKind, SourceDescriptor, registry};

/// the DDL for one gridded-service table, shaped by its service kind
pub fn service_table_ddl (descriptor: &SourceDescriptor)->String {
    let table = descriptor.table_name;

    let (extra_columns, unique_columns) = match descriptor.kind {
        ServiceKind::Generic => ("", "forecastcycle, forecasttime"),
        ServiceKind::Storm => ("stormname TEXT NOT NULL,", "forecastcycle, forecasttime, stormname"),
        ServiceKind::Ensemble => ("ensemble_member TEXT NOT NULL,", "forecastcycle, forecasttime, ensemble_member"),
        ServiceKind::StormEnsemble => (
            "stormname TEXT NOT NULL, ensemble_member TEXT NOT NULL,",
            "forecastcycle, forecasttime, stormname, ensemble_member",
        ),
    };

    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            id BIGSERIAL PRIMARY KEY,
            forecastcycle TIMESTAMPTZ NOT NULL,
            forecasttime TIMESTAMPTZ NOT NULL,
            tau INTEGER NOT NULL,
            {extra_columns}
            filepath TEXT NOT NULL,
            url TEXT,
            accessed TIMESTAMPTZ,
            UNIQUE ({unique_columns})
        )"
    )
}

pub fn nhc_btk_table_ddl ()->String {
    "CREATE TABLE IF NOT EXISTS nhc_btk (
        id BIGSERIAL PRIMARY KEY,
        storm_year INTEGER NOT NULL,
        basin TEXT NOT NULL,
        storm INTEGER NOT NULL,
        advisory_start TIMESTAMPTZ NOT NULL,
        advisory_end TIMESTAMPTZ NOT NULL,
        advisory_duration_hr INTEGER NOT NULL,
        filepath TEXT NOT NULL,
        md5 TEXT NOT NULL,
        accessed TIMESTAMPTZ,
        geometry_data JSONB,
        UNIQUE (storm_year, basin, storm)
    )".to_string()
}

pub fn nhc_fcst_table_ddl ()->String {
    "CREATE TABLE IF NOT EXISTS nhc_fcst (
        id BIGSERIAL PRIMARY KEY,
        storm_year INTEGER NOT NULL,
        basin TEXT NOT NULL,
        storm INTEGER NOT NULL,
        advisory TEXT NOT NULL,
        advisory_start TIMESTAMPTZ NOT NULL,
        advisory_end TIMESTAMPTZ NOT NULL,
        advisory_duration_hr INTEGER NOT NULL,
        filepath TEXT NOT NULL,
        md5 TEXT NOT NULL,
        accessed TIMESTAMPTZ,
        geometry_data JSONB,
        UNIQUE (storm_year, basin, storm, advisory)
    )".to_string()
}

pub fn request_table_ddl (table: &str)->String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            id BIGSERIAL PRIMARY KEY,
            request_id TEXT NOT NULL UNIQUE,
            try INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL,
            start_date TIMESTAMPTZ NOT NULL,
            last_date TIMESTAMPTZ NOT NULL,
            api_key TEXT NOT NULL,
            source_ip TEXT NOT NULL,
            credit_usage BIGINT NOT NULL DEFAULT 0,
            input_data JSONB NOT NULL,
            message JSONB NOT NULL
        )"
    )
}

/// every statement needed for a complete catalog database
pub fn all_tables_ddl (request_table: &str)->Vec<String> {
    let mut ddl: Vec<String> = registry::ALL_SOURCES.iter().map(|d| service_table_ddl(d)).collect();
    ddl.push( nhc_btk_table_ddl());
    ddl.push( nhc_fcst_table_ddl());
    ddl.push( request_table_ddl(request_table));
    ddl
}

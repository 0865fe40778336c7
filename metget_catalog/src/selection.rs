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

//! the file-selection engine.
//!
//! Candidate rows come out of the database with narrow filters; the policy
//! logic itself - per-valid-time winner resolution, tie breaking and the
//! single-forecast tau backfill - runs over plain record vectors so it can be
//! exercised without a live catalog.

use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use metget_sources::{NHC_SERVICE, VariableType, descriptor_for_service};

use crate::errors::{MetgetCatalogError, Result};
use crate::store::CatalogStore;
use crate::tables::{FileRecord, NhcTrackRow};

/// a normalized file-selection query
#[derive(Debug, Clone)]
pub struct Query {
    pub service: String,
    pub variable_type: VariableType,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub tau: i32,
    pub nowcast: bool,
    pub multiple_forecasts: bool,
    pub storm: Option<String>,
    pub basin: Option<String>,
    pub advisory: Option<String>,
    pub storm_year: Option<i32>,
    pub ensemble_member: Option<String>,
}

/// what the engine resolves a query to
#[derive(Debug, Clone)]
pub enum Selection {
    Gridded(Vec<FileRecord>),
    NhcTracks {
        best_track: Option<NhcTrackRow>,
        forecast_track: Option<NhcTrackRow>,
    },
}

/// resolve a query against the catalog under the policy it encodes
pub async fn select_files (store: &CatalogStore, query: &Query)->Result<Selection> {
    if query.service == NHC_SERVICE {
        return select_nhc_tracks( store, query).await
    }

    let descriptor = descriptor_for_service( &query.service)?;
    let tau = normalized_tau(query)?;

    let candidates = store.fetch_candidates(
        descriptor, query.start, query.end,
        query.storm.as_deref(), query.ensemble_member.as_deref()).await?;

    let selected = if query.nowcast {
        select_nowcast( &candidates)
    } else if query.multiple_forecasts {
        select_multiple_forecasts( &candidates, tau)
    } else {
        select_single_forecast( &candidates, query.start, query.end, tau)
    };

    info!("selected {} of {} candidate {} records", selected.len(), candidates.len(), query.service);
    Ok( Selection::Gridded(selected))
}

async fn select_nhc_tracks (store: &CatalogStore, query: &Query)->Result<Selection> {
    let storm_year = query.storm_year
        .ok_or_else(|| MetgetCatalogError::InvalidQuery( "nhc query requires storm_year".to_string()))?;
    let basin = query.basin.as_deref()
        .ok_or_else(|| MetgetCatalogError::InvalidQuery( "nhc query requires basin".to_string()))?;
    let storm: i32 = query.storm.as_deref()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| MetgetCatalogError::InvalidQuery( "nhc query requires a numeric storm id".to_string()))?;

    let best_track = store.fetch_nhc_best_track( storm_year, basin, storm).await?;

    let forecast_track = match query.advisory.as_deref() {
        Some(advisory) => store.fetch_nhc_forecast( storm_year, basin, storm, advisory).await?,
        None => None,
    };

    if best_track.is_none() && forecast_track.is_none() {
        return Err( MetgetCatalogError::NoData(
            format!("no nhc tracks for {}/{}/{}", storm_year, basin, storm)))
    }

    Ok( Selection::NhcTracks { best_track, forecast_track })
}

/// apply the accumulated-variable tau adjustment. The zero hour of an
/// accumulated field with no intrinsic accumulation window carries no signal,
/// as does any field the source flags with skip_0. NHC is never adjusted
pub fn normalized_tau (query: &Query)->Result<i32> {
    if query.service == NHC_SERVICE || query.tau != 0 {
        return Ok(query.tau)
    }

    let descriptor = descriptor_for_service( &query.service)?;
    let Some(binding) = query.variable_type.select().iter()
        .find_map(|t| descriptor.variables.iter().find(|v| v.data_type == *t)) else {
        return Ok(query.tau)
    };

    if (binding.is_accumulated && binding.accumulation_time.is_none()) || binding.skip_0 {
        warn!("variable {} has no usable zero hour, raising tau to 1", binding.data_type);
        return Ok(1)
    }
    Ok(query.tau)
}

/// the "best available forecast for this moment" ordering: smallest tau,
/// then most recently accessed, then largest id
fn is_better (candidate: &FileRecord, incumbent: &FileRecord)->bool {
    if candidate.tau != incumbent.tau {
        return candidate.tau < incumbent.tau
    }
    match (candidate.accessed, incumbent.accessed) {
        (Some(a), Some(b)) if a != b => a > b,
        _ => candidate.id > incumbent.id,
    }
}

/// reduce to one winner per valid time, ordered by valid time
fn winners_by_valid_time<'a, I> (records: I)->Vec<FileRecord>
    where I: Iterator<Item = &'a FileRecord>
{
    let mut best: BTreeMap<DateTime<Utc>, &FileRecord> = BTreeMap::new();
    for record in records {
        best.entry( record.valid_time)
            .and_modify(|incumbent| {
                if is_better( record, incumbent) { *incumbent = record }
            })
            .or_insert(record);
    }
    best.into_values().cloned().collect()
}

/// nowcast policy: one tau=0 analysis per valid time across cycles
pub fn select_nowcast (records: &[FileRecord])->Vec<FileRecord> {
    winners_by_valid_time( records.iter().filter(|r| r.tau == 0))
}

/// multiple-forecasts policy: for each valid time, the qualifying record of
/// the most recent cycle (smallest tau)
pub fn select_multiple_forecasts (records: &[FileRecord], tau_req: i32)->Vec<FileRecord> {
    winners_by_valid_time( records.iter().filter(|r| r.tau >= tau_req))
}

/// single-forecast policy: the earliest cycle at or after `start` provides
/// everything it can; with a tau floor, valid times the cycle cannot reach
/// are backfilled from the multi-forecast result
pub fn select_single_forecast (records: &[FileRecord], start: DateTime<Utc>, end: DateTime<Utc>, tau_req: i32)->Vec<FileRecord> {
    let Some(first_cycle) = records.iter()
        .filter(|r| r.forecast_cycle >= start && r.forecast_cycle <= end)
        .map(|r| r.forecast_cycle)
        .min() else {
        return Vec::new()
    };

    let in_window = |r: &&FileRecord| r.valid_time >= start && r.valid_time <= end;

    let pure_forecast = winners_by_valid_time(
        records.iter()
            .filter(|r| r.forecast_cycle == first_cycle && r.tau >= tau_req)
            .filter(in_window));

    if tau_req == 0 {
        return pure_forecast
    }

    let fallback: Vec<FileRecord> = select_multiple_forecasts( records, tau_req).into_iter()
        .filter(|r| r.valid_time >= start && r.valid_time <= end)
        .collect();
    merge_by_valid_time( pure_forecast, fallback)
}

/// union by valid time; rows already present take precedence
fn merge_by_valid_time (primary: Vec<FileRecord>, fallback: Vec<FileRecord>)->Vec<FileRecord> {
    let mut merged: BTreeMap<DateTime<Utc>, FileRecord> =
        primary.into_iter().map(|r| (r.valid_time, r)).collect();
    for record in fallback {
        merged.entry( record.valid_time).or_insert(record);
    }
    merged.into_values().collect()
}

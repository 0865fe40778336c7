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

//! the build orchestrator: validate -> list (with restore-wait) -> download ->
//! interpolate -> upload -> finalize. One handler owns one request and its
//! scratch directory; temp files die with the handler on every exit path.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use futures::{StreamExt, TryStreamExt};
use serde_json::json;
use tempfile::TempDir;
use tracing::{debug, info, warn};

use metget_catalog::{Query, Selection, select_files};
use metget_common::datetime::DateSpan;
use metget_common::s3::{MAX_RETRY_ATTEMPTS, with_retry};
use metget_sources::{FileFormat, NHC_SERVICE, VariableType, descriptor_for_service};

use crate::context::Context;
use crate::domain::Domain;
use crate::errors::{MetgetBuildError, Result, internal_error, no_data, validation_error};
use crate::fileobj::FileObj;
use crate::input::Input;
use crate::meteorology::Meteorology;
use crate::nhc::merge_nhc_tracks;
use crate::output::{OutputFile, OutputFormat};
use crate::s3grib::S3GribClient;

/// in-flight cap for the downloads of one snapshot
const MAX_CONCURRENT_DOWNLOADS: usize = 4;

/// what the handler reports back to the worker loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Completed,
    RestoreWait,
}

/// one selected snapshot of one domain: the catalog paths and, once
/// downloaded, the local files
struct DomainFile {
    time: DateTime<Utc>,
    remote_paths: Vec<String>,
    local: Option<Vec<PathBuf>>,
}

pub struct MessageHandler {
    input: Input,
    work_dir: TempDir,
}

impl MessageHandler {
    pub fn new (input: Input)->Result<MessageHandler> {
        let work_dir = TempDir::new()?;
        Ok( MessageHandler { input, work_dir })
    }

    pub fn input (&self)->&Input { &self.input }

    /// run the request end to end. `deadline` is when the request times out
    /// in total, across restore cycles
    pub async fn process_message (&self, ctx: &Context, deadline: DateTime<Utc>)->Result<ProcessOutcome> {
        info!("processing request {}", self.input.request_id());
        info!("found {} domains in input request", self.input.num_domains());

        let mut output = OutputFile::create(
            self.input.format(),
            self.input.start_date(),
            self.input.end_date(),
            self.input.time_step(),
            self.input.compression(),
        );

        //--- list: resolve the file set and check for archived objects
        let (selections, ongoing_restore) = self.list_files_check_archive( ctx, output.as_mut()).await?;
        if ongoing_restore {
            info!("request {} is waiting on an archive restore", self.input.request_id());
            if let Some(output) = &output {
                output.remove_files();
            }
            return Ok( ProcessOutcome::RestoreWait)
        }

        //--- download/assemble the per-domain snapshot lists
        let mut domain_data = self.assemble_domain_data( ctx, &selections).await?;

        //--- interpolate (or pass raw files through)
        let result = match output.as_mut() {
            Some(output) => self.interpolate_fields( ctx, output, &mut domain_data, deadline).await,
            None => self.collect_raw_files( ctx, &mut domain_data).await,
        };

        let (output_files, files_used) = match result {
            Ok(r) => r,
            Err(e) => {
                if let Some(output) = &output {
                    output.remove_files();
                }
                self.cleanup_local_files( &domain_data);
                return Err(e)
            }
        };

        if let Some(output) = output.as_mut() {
            output.close()?;
        }

        //--- upload results and the manifest
        self.upload_files( ctx, &output_files, &files_used).await?;

        //--- cleanup
        self.cleanup_local_files( &domain_data);

        info!("finished processing request {}", self.input.request_id());
        Ok( ProcessOutcome::Completed)
    }

    /* #region list ***********************************************************************/

    async fn list_files_check_archive (&self, ctx: &Context, mut output: Option<&mut OutputFile>)
        ->Result<(Vec<Selection>, bool)>
    {
        let mut selections = Vec::with_capacity( self.input.num_domains());
        let mut ongoing_restore = false;

        for (index, domain) in self.input.domains().iter().enumerate() {
            if let Some(output) = output.as_deref_mut() {
                debug!("registering output domain {index}");
                self.register_output_domain( output, index)?;
            }

            info!("querying catalog for domain {} ({})", index, domain.service());
            let selection = select_files( &ctx.catalog, &self.domain_query(domain)).await?;

            if let Selection::Gridded(files) = &selection {
                info!("selected {} files for domain {}", files.len(), index);
                if files.len() < 2 {
                    return Err( no_data( format!("no data found for domain {index}")))
                }

                for record in files {
                    if record.filepath.starts_with("s3://") {
                        continue // public archives have no cold tier to restore
                    }
                    for path in record.filepath.split(',') {
                        let restoring = with_retry( MAX_RETRY_ATTEMPTS, || {
                            let s3 = ctx.s3.clone();
                            let path = path.to_string();
                            async move { s3.check_archive_and_initiate_restore(&path).await }
                        }).await?;
                        if restoring {
                            ongoing_restore = true;
                        }
                    }
                }
            }

            selections.push(selection);
        }

        Ok( (selections, ongoing_restore) )
    }

    fn domain_query (&self, domain: &Domain)->Query {
        Query {
            service: domain.service().to_string(),
            variable_type: self.input.variable_type(),
            start: self.input.start_date(),
            end: self.input.end_date(),
            tau: domain.tau(),
            nowcast: self.input.nowcast(),
            multiple_forecasts: self.input.multiple_forecasts(),
            storm: domain.storm().map(|s| s.to_string()),
            basin: domain.basin().map(|s| s.to_string()),
            advisory: domain.advisory().map(|s| s.to_string()),
            storm_year: domain.storm_year(),
            ensemble_member: domain.ensemble_member().map(|s| s.to_string()),
        }
    }

    /// register the writer-side domain, deriving the output filenames
    fn register_output_domain (&self, output: &mut OutputFile, index: usize)->Result<()> {
        let domain = self.input.domain(index);
        let filenames = self.domain_filenames( index)?;
        output.add_domain( domain.grid().clone(), filenames, self.input.variable_type(), domain.name())
    }

    fn domain_filenames (&self, index: usize)->Result<Vec<String>> {
        let domain = self.input.domain(index);
        let base = self.input.filename();

        let mut names = match self.input.format() {
            OutputFormat::OwiAscii => {
                let level = format!("_{:02}", domain.domain_level());
                match self.input.data_type() {
                    "wind_pressure" => vec![
                        format!("{base}_{index:02}{level}.pre"),
                        format!("{base}_{index:02}{level}.wnd"),
                    ],
                    "rain" | "precipitation" => vec![ format!("{base}{level}.precip")],
                    "humidity" => vec![ format!("{base}{level}.humid")],
                    "ice" => vec![ format!("{base}{level}.ice")],
                    other => return Err( validation_error( format!("variable '{other}' has no OWI ASCII form"))),
                }
            }
            OutputFormat::OwiNetcdf | OutputFormat::CfNetcdf => vec![ base.to_string()],
            OutputFormat::Raw => vec![],
        };

        if self.input.compression() && self.input.format() == OutputFormat::OwiAscii {
            for name in names.iter_mut() {
                name.push_str(".gz");
            }
        }
        Ok(names)
    }

    /* #endregion list */

    /* #region download *******************************************************************/

    /// turn catalog selections into per-domain snapshot lists. NHC tracks are
    /// downloaded and merged here; gridded sources stay remote until a frame
    /// actually needs them
    async fn assemble_domain_data (&self, ctx: &Context, selections: &[Selection])->Result<Vec<Vec<DomainFile>>> {
        let mut domain_data = Vec::with_capacity( selections.len());

        for (index, selection) in selections.iter().enumerate() {
            match selection {
                Selection::Gridded(files) => {
                    domain_data.push( files.iter()
                        .map(|record| DomainFile {
                            time: record.valid_time,
                            remote_paths: record.filepath.split(',').map(|s| s.to_string()).collect(),
                            local: None,
                        })
                        .collect());
                }
                Selection::NhcTracks { best_track, forecast_track } => {
                    domain_data.push( self.assemble_nhc_track( ctx, index, best_track.as_ref(), forecast_track.as_ref()).await?);
                }
            }
        }
        Ok(domain_data)
    }

    async fn assemble_nhc_track (&self, ctx: &Context, index: usize,
                                 best_track: Option<&metget_catalog::NhcTrackRow>,
                                 forecast_track: Option<&metget_catalog::NhcTrackRow>)->Result<Vec<DomainFile>>
    {
        let domain = self.input.domain(index);
        let mut track_files = Vec::new();

        let download = |filepath: String, name: String| {
            let s3 = ctx.s3.clone();
            let local = self.work_dir.path().join(name);
            async move {
                with_retry( MAX_RETRY_ATTEMPTS, || {
                    let s3 = s3.clone();
                    let filepath = filepath.clone();
                    let local = local.clone();
                    async move { s3.download( &filepath, &local).await }
                }).await
            }
        };

        let besttrack_local = match best_track {
            Some(row) => {
                let local = download( row.filepath.clone(), format!("besttrack_{index:02}.btk")).await?;
                track_files.push( DomainFile {
                    time: row.advisory_start,
                    remote_paths: vec![row.filepath.clone()],
                    local: Some( vec![local.clone()]),
                });
                Some( (local, row.advisory_start) )
            }
            None => None,
        };

        let forecast_local = match forecast_track {
            Some(row) => {
                let local = download( row.filepath.clone(), format!("forecast_{index:02}.fcst")).await?;
                track_files.push( DomainFile {
                    time: row.advisory_start,
                    remote_paths: vec![row.filepath.clone()],
                    local: Some( vec![local.clone()]),
                });
                Some(local)
            }
            None => None,
        };

        if let (Some((btk, btk_start)), Some(fcst)) = (&besttrack_local, &forecast_local) {
            let merge_name = format!(
                "nhc_merge_{:04}_{}_{}_{}.trk",
                btk_start.format("%Y"),
                domain.basin().unwrap_or("al"),
                domain.storm().unwrap_or("00"),
                domain.advisory().unwrap_or("000"),
            );
            let merged = merge_nhc_tracks( btk, fcst, &self.work_dir.path().join(merge_name))?;
            track_files.push( DomainFile {
                time: *btk_start,
                remote_paths: vec![],
                local: Some( vec![merged]),
            });
        }

        if track_files.is_empty() {
            return Err( no_data( format!("no nhc track data for domain {index}")))
        }
        Ok(track_files)
    }

    /// make one snapshot's files local, fetching them if nothing has yet.
    /// Multi-file bundles download concurrently, with a small in-flight cap
    async fn ensure_local (&self, ctx: &Context, domain: &Domain, entry: &mut DomainFile)->Result<Vec<PathBuf>> {
        if let Some(local) = &entry.local {
            return Ok( local.clone())
        }

        let descriptor = descriptor_for_service( domain.service())?;

        let fetches = entry.remote_paths.iter().map(|remote| {
            let basename = remote.rsplit('/').next().unwrap_or(remote);
            let local = self.work_dir.path().join(
                format!("{}.{}.{}", domain.service(), entry.time.format("%Y%m%d%H%M"), basename));
            self.fetch_one( ctx, descriptor, remote.clone(), local)
        });

        let local_files: Vec<PathBuf> = futures::stream::iter(fetches)
            .buffered(MAX_CONCURRENT_DOWNLOADS)
            .try_collect().await?;

        entry.local = Some( local_files.clone());
        Ok(local_files)
    }

    async fn fetch_one (&self, ctx: &Context, descriptor: &'static metget_sources::SourceDescriptor,
                        remote: String, local: PathBuf)->Result<PathBuf>
    {
        if remote.starts_with("s3://") {
            // NOAA archive: ranged read driven by the grib index sidecar
            let grib_client = S3GribClient::new(descriptor).await?;
            let (path, ok) = grib_client.download( &remote, &local, self.input.variable_type()).await?;
            if !ok {
                return Err( no_data( format!("unable to fetch {remote}")))
            }
            Ok(path)
        } else {
            let path = with_retry( MAX_RETRY_ATTEMPTS, || {
                let s3 = ctx.s3.clone();
                let remote = remote.clone();
                let local = local.clone();
                async move { s3.download( &remote, &local).await }
            }).await?;
            Ok(path)
        }
    }

    /* #endregion download */

    /* #region interpolate ****************************************************************/

    async fn interpolate_fields (&self, ctx: &Context, output: &mut OutputFile,
                                 domain_data: &mut [Vec<DomainFile>], deadline: DateTime<Utc>)
        ->Result<(Vec<String>, BTreeMap<String, Vec<String>>)>
    {
        info!("starting to interpolate meteorological fields");
        let mut files_used: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for index in 0..self.input.num_domains() {
            let used = self.process_domain( ctx, output, index, &mut domain_data[index], deadline).await?;
            files_used.insert( self.input.domain(index).name().to_string(), used);
        }

        let output_files = output.filenames();
        info!("generated output files: {}", output_files.join(", "));

        Ok( (output_files, files_used) )
    }

    async fn process_domain (&self, ctx: &Context, output: &mut OutputFile, index: usize,
                             files: &mut Vec<DomainFile>, deadline: DateTime<Utc>)->Result<Vec<String>>
    {
        let domain = self.input.domain(index).clone();
        info!("processing domain {} of {}", index + 1, self.input.num_domains());

        if domain.service() == NHC_SERVICE {
            return Err( validation_error( "nhc tracks cannot be interpolated to a grid; request the raw format"))
        }

        let descriptor = descriptor_for_service( domain.service())?;
        let mut meteo = Meteorology::new(
            domain.grid(), domain.service(), self.input.variable_type(),
            self.input.backfill(), domain.domain_level())?;

        output.open_domain(index)?;

        let mut files_used: Vec<String> = Vec::new();

        // prime the sequencer with the first file as both frames; the zero
        // rate this produces for accumulated variables at t0 is intended
        let first_local = self.ensure_local( ctx, &domain, &mut files[0]).await?;
        let first_time = files[0].time;
        record_files_used( &mut files_used, &files[0]);

        meteo.set_next_file( FileObj::new( first_local.clone(), descriptor, first_time));
        meteo.set_next_file( FileObj::new( first_local, descriptor, first_time));
        meteo.process_files()?;

        let mut file_index = 0usize;

        for time in DateSpan::new( self.input.start_date(), self.input.end_date(),
                                   std::time::Duration::from_secs( self.input.time_step())) {
            if Utc::now() > deadline {
                return Err( MetgetBuildError::Timeout(
                    format!("request {} exceeded its processing ceiling", self.input.request_id())))
            }

            while meteo.f2().map(|f| time > f.time()).unwrap_or(false) && file_index + 1 < files.len() {
                file_index = next_file_index( files, time, file_index);

                let local = self.ensure_local( ctx, &domain, &mut files[file_index]).await?;
                let file_time = files[file_index].time;
                debug!("advancing domain {} to {}", index + 1, file_time);

                record_files_used( &mut files_used, &files[file_index]);
                meteo.set_next_file( FileObj::new( local, descriptor, file_time));
                meteo.process_files()?;

                // the superseded frames are interpolated; drop their files and
                // index sidecars
                if let (Some(f1), Some(f2)) = (meteo.f1(), meteo.f2()) {
                    f1.remove_local_files();
                    f2.remove_local_files();
                }
            }

            let weight = meteo.time_weight(time);
            debug!("processing time {} (weight {weight:.3})", time.format("%Y-%m-%d %H:%M"));

            let dataset = meteo.get(time)?;
            output.write( index, &dataset, time)?;
        }

        output.close_domain(index)?;
        files_used.dedup();
        Ok(files_used)
    }

    /* #endregion interpolate */

    /* #region raw ************************************************************************/

    /// the raw format skips interpolation entirely: every selected source file
    /// is made local and shipped through unchanged
    async fn collect_raw_files (&self, ctx: &Context, domain_data: &mut [Vec<DomainFile>])
        ->Result<(Vec<String>, BTreeMap<String, Vec<String>>)>
    {
        let mut output_files = Vec::new();
        let mut files_used = BTreeMap::new();

        for (index, files) in domain_data.iter_mut().enumerate() {
            let domain = self.input.domain(index).clone();
            let mut used = Vec::new();

            for entry in files.iter_mut() {
                let locals = if domain.service() == NHC_SERVICE {
                    entry.local.clone().unwrap_or_default()
                } else {
                    self.ensure_local( ctx, &domain, entry).await?
                };

                for local in locals {
                    let name = local.file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .ok_or_else(|| internal_error( "unnamed local file"))?;
                    used.push( name.clone());
                    output_files.push( local.to_string_lossy().to_string());
                }
            }
            files_used.insert( domain.name().to_string(), used);
        }

        Ok( (output_files, files_used) )
    }

    /* #endregion raw */

    /* #region upload and cleanup *********************************************************/

    async fn upload_files (&self, ctx: &Context, output_files: &[String],
                           files_used: &BTreeMap<String, Vec<String>>)->Result<()>
    {
        let request_id = self.input.request_id();
        let mut uploaded_names = Vec::with_capacity( output_files.len());

        for file in output_files {
            let path = Path::new(file);
            let name = path.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .ok_or_else(|| internal_error( format!("unnamed output file {file}")))?;

            let key = format!("{request_id}/{name}");
            with_retry( MAX_RETRY_ATTEMPTS, || {
                let s3 = ctx.s3_upload.clone();
                let path = path.to_path_buf();
                let key = key.clone();
                async move { s3.upload( &path, &key).await }
            }).await?;

            uploaded_names.push(name);
            let _ = std::fs::remove_file(path);
        }

        let manifest = json!({
            "input": self.input.json(),
            "version": { "metget-server": env!("CARGO_PKG_VERSION") },
            "input_files": files_used,
            "output_files": uploaded_names,
        });

        let manifest_path = self.work_dir.path().join("filelist.json");
        std::fs::write( &manifest_path, serde_json::to_string_pretty(&manifest).unwrap_or_default())?;

        let key = format!("{request_id}/filelist.json");
        with_retry( MAX_RETRY_ATTEMPTS, || {
            let s3 = ctx.s3_upload.clone();
            let path = manifest_path.clone();
            let key = key.clone();
            async move { s3.upload( &path, &key).await }
        }).await?;

        Ok(())
    }

    fn cleanup_local_files (&self, domain_data: &[Vec<DomainFile>]) {
        for files in domain_data {
            for entry in files {
                if let Some(locals) = &entry.local {
                    for local in locals {
                        if local.exists() {
                            let _ = std::fs::remove_file(local);
                        }
                        let sidecar = PathBuf::from( format!("{}.idx", local.display()));
                        if sidecar.exists() {
                            let _ = std::fs::remove_file(&sidecar);
                        }
                    }
                }
            }
        }
    }

    /* #endregion upload and cleanup */
}

/// the next snapshot that covers `time`: the first file at or after it, or
/// the last file when the window runs past the list
fn next_file_index (files: &[DomainFile], time: DateTime<Utc>, current: usize)->usize {
    for (k, file) in files.iter().enumerate().skip( current + 1) {
        if time <= file.time {
            return k
        }
    }
    files.len() - 1
}

fn record_files_used (files_used: &mut Vec<String>, entry: &DomainFile) {
    for remote in &entry.remote_paths {
        if let Some(name) = remote.rsplit('/').next() {
            if !files_used.contains( &name.to_string()) {
                files_used.push( name.to_string());
            }
        }
    }
}

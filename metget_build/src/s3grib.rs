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

//! ranged reads of NOAA-archive GRIB files. The `.idx` sidecar tells us which
//! byte ranges carry the requested variables; only those records are fetched
//! and spliced into the local file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use metget_common::s3::{MAX_RETRY_ATTEMPTS, ObjectStore, create_anonymous_s3_client, with_retry};
use metget_grib::GribIndex;
use metget_sources::{SourceDescriptor, VariableType};

use crate::errors::{MetgetBuildError, Result, internal_error};

const NOAA_ARCHIVE_REGION: &str = "us-east-1";

pub struct S3GribClient {
    store: ObjectStore,
    descriptor: &'static SourceDescriptor,
}

impl S3GribClient {
    /// anonymous client against the source's public archive bucket
    pub async fn new (descriptor: &'static SourceDescriptor)->Result<S3GribClient> {
        let bucket = descriptor.bucket
            .ok_or_else(|| internal_error( format!("{} has no archive bucket", descriptor.service)))?;

        let client = create_anonymous_s3_client(NOAA_ARCHIVE_REGION).await;
        Ok( S3GribClient { store: ObjectStore::new( client, bucket), descriptor })
    }

    /// split an `s3://bucket/key` url into its key, verifying the bucket
    fn key_of (&self, remote_path: &str)->Result<String> {
        let stripped = remote_path.strip_prefix("s3://")
            .ok_or_else(|| internal_error( format!("not an s3 url: {remote_path}")))?;
        let (bucket, key) = stripped.split_once('/')
            .ok_or_else(|| internal_error( format!("no key in s3 url: {remote_path}")))?;

        if bucket != self.store.bucket() {
            return Err( internal_error(
                format!("bucket {bucket} does not match {} archive {}", self.descriptor.service, self.store.bucket())))
        }
        Ok( key.to_string())
    }

    /// fetch the records of the requested variables into `local_path`. The
    /// second return is false when the sidecar is missing and the caller may
    /// fall back to another source
    pub async fn download (&self, remote_path: &str, local_path: &Path, variable_type: VariableType)->Result<(PathBuf, bool)> {
        let key = self.key_of(remote_path)?;
        let index_key = format!("{key}.idx");

        let index_bytes = match with_retry( MAX_RETRY_ATTEMPTS, || {
            let store = self.store.clone();
            let index_key = index_key.clone();
            async move { store.get_bytes(&index_key).await }
        }).await {
            Ok(bytes) => bytes,
            Err(metget_common::s3::MetgetS3Error::NotFound(_)) => {
                debug!("no index sidecar for {key}");
                return Ok( (local_path.to_path_buf(), false) )
            }
            Err(e) => return Err(e.into()),
        };

        let index = GribIndex::parse( &String::from_utf8_lossy(&index_bytes))
            .map_err(|e| internal_error( format!("{index_key}: {e}")))?;

        let names: Vec<&str> = self.descriptor.selected_variables(variable_type).iter()
            .map(|binding| binding.index_name)
            .collect();
        let ranges = index.ranges_for(&names);
        if ranges.is_empty() {
            return Err( MetgetBuildError::NoData( format!("{key} carries none of {names:?}")))
        }

        info!("fetching {} records of {}", ranges.len(), key);

        if let Some(parent) = local_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(local_path)?;
        for range in ranges {
            let end = match range.end {
                Some(end) => end,
                None => {
                    let info = self.store.head(&key).await?;
                    info.size.map(|s| s.saturating_sub(1) as u64).unwrap_or(u64::MAX / 2)
                }
            };

            let bytes = with_retry( MAX_RETRY_ATTEMPTS, || {
                let store = self.store.clone();
                let key = key.clone();
                async move { store.range_get( &key, range.start, end).await }
            }).await?;
            file.write_all(&bytes)?;
        }

        Ok( (local_path.to_path_buf(), true) )
    }
}

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

//! object store primitives for the MetGet buckets and the public NOAA archives

use std::{fmt::Debug, fs::File, future::Future, io::Write, path::{Path, PathBuf}};
use bytes::Bytes;
use thiserror::Error;
use tracing::warn;

use aws_config::{BehaviorVersion, Region, meta::region::RegionProviderChain};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    Client,
    error::ProvideErrorMetadata,
    primitives::ByteStream,
    types::{GlacierJobParameters, RestoreRequest, StorageClass, Tier},
};
use aws_smithy_runtime_api::client::result::SdkError;
use aws_smithy_types::timeout::TimeoutConfig;

use crate::datetime::secs;

pub type S3Client = Client;

pub type Result<T> = std::result::Result<T, MetgetS3Error>;

/// default cap on retries of transient failures
pub const MAX_RETRY_ATTEMPTS: u32 = 10;

#[derive(Error, Debug)]
pub enum MetgetS3Error {
    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("access denied: {0}")]
    Forbidden(String),

    #[error("object archived in cold storage: {0}")]
    InCold(String),

    #[error("transient object store failure: {0}")]
    Transient(String),

    #[error("byte stream error {0}")]
    ByteStreamError( #[from] aws_smithy_types::byte_stream::error::Error),

    #[error("operation failed {0}")]
    OpFailed(String),
}

pub fn op_failed (msg: impl ToString)->MetgetS3Error {
    MetgetS3Error::OpFailed(msg.to_string())
}

/// map an SDK error onto our taxonomy based on the service error code.
/// Anything that is not clearly a caller error is treated as transient so it
/// goes through the bounded retry path
fn map_sdk_error<E,R> (key: &str, e: SdkError<E,R>)->MetgetS3Error
    where E: ProvideErrorMetadata + Debug, R: Debug
{
    match e.code() {
        Some("NoSuchKey") | Some("NoSuchBucket") | Some("NotFound") => MetgetS3Error::NotFound( key.to_string()),
        Some("AccessDenied") | Some("Forbidden") => MetgetS3Error::Forbidden( key.to_string()),
        Some("InvalidObjectState") => MetgetS3Error::InCold( key.to_string()),
        _ => MetgetS3Error::Transient( format!("{key}: {e:?}")),
    }
}

fn timeouts ()->TimeoutConfig {
    TimeoutConfig::builder()
        .operation_attempt_timeout( secs(30))
        .build()
}

/// create a client with the ambient environment credentials (worker role)
pub async fn create_s3_client ()->Client {
    let aws_config = aws_config::defaults( BehaviorVersion::latest())
        .timeout_config( timeouts())
        .load().await;
    Client::new( &aws_config)
}

/// create an anonymous client, used for the public NOAA archive buckets
pub async fn create_anonymous_s3_client (region: &str)->Client {
    let region_provider = RegionProviderChain::first_try( Region::new( region.to_string()))
        .or_else( Region::new( "us-east-1"));
    let aws_config = aws_config::defaults( BehaviorVersion::latest())
        .no_credentials()
        .region( region_provider)
        .timeout_config( timeouts())
        .load().await;
    Client::new( &aws_config)
}

/// create a client with explicit keys (COAMPS-TC side bucket)
pub async fn create_s3_client_with_keys (region: &str, key: &str, secret: &str)->Client {
    let creds = Credentials::new( key, secret, None, None, "metget-static");
    let aws_config = aws_config::defaults( BehaviorVersion::latest())
        .credentials_provider( creds)
        .region( Region::new( region.to_string()))
        .timeout_config( timeouts())
        .load().await;
    Client::new( &aws_config)
}

/// result of a `head` operation, reduced to what callers care about
#[derive(Debug, Clone)]
pub struct ObjectInfo {
    pub key: String,
    pub size: Option<i64>,
    pub archived: bool,
    pub restore_ongoing: bool,
    pub restore_complete: bool,
}

/// a bucket-scoped handle for the object store operations of the build pipeline
#[derive(Clone)]
pub struct ObjectStore {
    client: Client,
    bucket: String,
}

impl ObjectStore {
    pub fn new (client: Client, bucket: impl ToString)->Self {
        ObjectStore { client, bucket: bucket.to_string() }
    }

    pub fn bucket (&self)->&str { &self.bucket }

    pub fn client (&self)->&Client { &self.client }

    /// retrieve all keys for the given prefix
    pub async fn list (&self, prefix: &str)->Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut builder = self.client.list_objects_v2().bucket(&self.bucket).prefix(prefix);
            if let Some(token) = &continuation {
                builder = builder.continuation_token(token);
            }
            let result = builder.send().await.map_err(|e| map_sdk_error( prefix, e))?;

            for obj in result.contents() {
                if let Some(key) = obj.key() {
                    keys.push( key.to_string());
                }
            }

            match result.next_continuation_token() {
                Some(token) => { continuation = Some(token.to_string()) }
                None => break
            }
        }

        Ok(keys)
    }

    pub async fn head (&self, key: &str)->Result<ObjectInfo> {
        match self.client.head_object().bucket(&self.bucket).key(key).send().await {
            Ok(out) => {
                let archived = matches!( out.storage_class(),
                    Some(&StorageClass::Glacier) | Some(&StorageClass::DeepArchive));
                let restore = out.restore().unwrap_or("");

                Ok( ObjectInfo {
                    key: key.to_string(),
                    size: out.content_length(),
                    archived,
                    restore_ongoing: restore.contains( r#"ongoing-request="true""#),
                    restore_complete: restore.contains( "expiry-date"),
                })
            }
            Err(e) => {
                let svc = e.into_service_error();
                if svc.is_not_found() {
                    Err( MetgetS3Error::NotFound( key.to_string()))
                } else {
                    Err( MetgetS3Error::Transient( format!("{key}: {svc:?}")))
                }
            }
        }
    }

    pub async fn exists (&self, key: &str)->Result<bool> {
        match self.head(key).await {
            Ok(_) => Ok(true),
            Err(MetgetS3Error::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// download an object to the given local path
    pub async fn download (&self, key: &str, local_path: &Path)->Result<PathBuf> {
        if let Some(parent) = local_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut object = self.client.get_object().bucket(&self.bucket).key(key).send().await
            .map_err(|e| {
                let svc = e.into_service_error();
                if svc.is_no_such_key() {
                    MetgetS3Error::NotFound( key.to_string())
                } else if svc.is_invalid_object_state() {
                    MetgetS3Error::InCold( key.to_string())
                } else {
                    MetgetS3Error::Transient( format!("{key}: {svc:?}"))
                }
            })?;

        let mut file = File::create(local_path)?;
        while let Some(bytes) = object.body.try_next().await? {
            file.write_all(&bytes)?;
        }

        Ok( local_path.to_path_buf())
    }

    /// fetch a whole (small) object into memory
    pub async fn get_bytes (&self, key: &str)->Result<Bytes> {
        let object = self.client.get_object().bucket(&self.bucket).key(key).send().await
            .map_err(|e| {
                let svc = e.into_service_error();
                if svc.is_no_such_key() {
                    MetgetS3Error::NotFound( key.to_string())
                } else if svc.is_invalid_object_state() {
                    MetgetS3Error::InCold( key.to_string())
                } else {
                    MetgetS3Error::Transient( format!("{key}: {svc:?}"))
                }
            })?;

        let data = object.body.collect().await?;
        Ok( data.into_bytes())
    }

    /// fetch a single inclusive byte range of an object
    pub async fn range_get (&self, key: &str, start: u64, end: u64)->Result<Bytes> {
        let object = self.client.get_object()
            .bucket(&self.bucket)
            .key(key)
            .range( format!("bytes={start}-{end}"))
            .send().await
            .map_err(|e| map_sdk_error( key, e))?;

        let data = object.body.collect().await?;
        Ok( data.into_bytes())
    }

    pub async fn upload (&self, local_path: &Path, key: &str)->Result<()> {
        let body = ByteStream::from_path(local_path).await?;
        self.client.put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .send().await
            .map_err(|e| map_sdk_error( key, e))?;
        Ok(())
    }

    /// check whether the object lives in an archive tier and, if it does,
    /// make sure a restore is under way. Returns true while the object is
    /// not yet readable, which puts the request into the restore-wait state
    pub async fn check_archive_and_initiate_restore (&self, key: &str)->Result<bool> {
        let info = self.head(key).await?;

        if !info.archived || info.restore_complete {
            return Ok(false)
        }
        if info.restore_ongoing {
            return Ok(true)
        }

        let glacier_params = GlacierJobParameters::builder()
            .tier( Tier::Standard)
            .build()
            .map_err( op_failed)?;
        let restore_request = RestoreRequest::builder()
            .days(5)
            .glacier_job_parameters( glacier_params)
            .build();

        self.client.restore_object()
            .bucket(&self.bucket)
            .key(key)
            .restore_request( restore_request)
            .send().await
            .map_err(|e| map_sdk_error( key, e))?;

        Ok(true)
    }
}

/// run the given operation with exponential backoff on transient failures.
/// Everything else is returned to the caller right away
pub async fn with_retry<T, F, Fut> (max_attempts: u32, op: F)->Result<T>
    where F: Fn()->Fut, Fut: Future<Output=Result<T>>
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(MetgetS3Error::Transient(msg)) => {
                attempt += 1;
                if attempt >= max_attempts {
                    return Err( MetgetS3Error::Transient(msg))
                }
                let delay = secs( 2u64.pow( attempt.min(6)));
                warn!("transient failure ({}), retry {}/{} in {}s", msg, attempt, max_attempts, delay.as_secs());
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

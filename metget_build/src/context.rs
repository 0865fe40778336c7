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

//! process-wide context: configuration, the catalog store and the shared
//! object-store clients. Built once at startup and threaded into every
//! component - nothing below this reads the environment or creates clients.

use metget_catalog::CatalogStore;
use metget_common::config::MetgetConfig;
use metget_common::s3::{ObjectStore, create_s3_client};

use crate::errors::{Result, internal_error};

pub struct Context {
    pub config: MetgetConfig,
    pub catalog: CatalogStore,
    pub s3: ObjectStore,
    pub s3_upload: ObjectStore,
}

impl Context {
    /// assemble the context from the environment. A missing required variable
    /// is a hard startup failure
    pub async fn initialize ()->Result<Context> {
        let config = MetgetConfig::from_env()?;

        let client = create_s3_client().await;
        let s3 = ObjectStore::new( client.clone(), &config.s3_bucket);
        let s3_upload = ObjectStore::new( client, &config.s3_bucket_upload);

        let catalog = CatalogStore::connect(&config).await
            .map_err(|e| internal_error( format!("catalog connection failed: {e}")))?;

        Ok( Context { config, catalog, s3, s3_upload })
    }
}

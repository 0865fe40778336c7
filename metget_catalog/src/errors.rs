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

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MetgetCatalogError>;

#[derive(Error, Debug)]
pub enum MetgetCatalogError {
    #[error("database error {0}")]
    DatabaseError( #[from] sqlx::Error),

    #[error("source error {0}")]
    SourceError( #[from] metget_sources::MetgetSourcesError),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("no data for query: {0}")]
    NoData(String),
}

pub fn invalid_query (msg: impl ToString)->MetgetCatalogError {
    MetgetCatalogError::InvalidQuery(msg.to_string())
}

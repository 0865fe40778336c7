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

pub type Result<T> = std::result::Result<T, MetgetSourcesError>;

#[derive(Error, Debug)]
pub enum MetgetSourcesError {
    #[error("unknown service '{0}'")]
    UnknownService(String),

    #[error("unknown data type '{0}'")]
    UnknownDataType(String),

    #[error("variable {var} is not provided by service '{service}'")]
    UnknownVariable { service: String, var: String },
}

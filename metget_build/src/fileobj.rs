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

//! one snapshot's worth of local source files. COAMPS snapshots are
//! multi-file bundles and HAFS pairs a parent with a storm file; everything
//! else is a single file.

use std::path::PathBuf;
use chrono::{DateTime, Utc};

use metget_sources::{FileFormat, SourceDescriptor};

#[derive(Debug, Clone)]
pub struct FileObj {
    files: Vec<PathBuf>,
    descriptor: &'static SourceDescriptor,
    time: DateTime<Utc>,
}

impl FileObj {
    pub fn new (files: Vec<PathBuf>, descriptor: &'static SourceDescriptor, time: DateTime<Utc>)->Self {
        FileObj { files, descriptor, time }
    }

    pub fn single (file: PathBuf, descriptor: &'static SourceDescriptor, time: DateTime<Utc>)->Self {
        FileObj { files: vec![file], descriptor, time }
    }

    pub fn files (&self)->&[PathBuf] { &self.files }

    pub fn descriptor (&self)->&'static SourceDescriptor { self.descriptor }

    pub fn time (&self)->DateTime<Utc> { self.time }

    /// delete the local files, including any grib index sidecar
    pub fn remove_local_files (&self) {
        for file in &self.files {
            if file.exists() {
                let _ = std::fs::remove_file(file);
            }
            if self.descriptor.file_format == FileFormat::Grib {
                let sidecar = PathBuf::from( format!("{}.idx", file.display()));
                if sidecar.exists() {
                    let _ = std::fs::remove_file(&sidecar);
                }
            }
        }
    }
}

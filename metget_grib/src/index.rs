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

//! GRIB `.idx` sidecar parsing.
//!
//! Sidecar lines look like
//! `4:502908:d=2023010100:UGRD:10 m above ground:anl:` - record number, byte
//! offset, date, short name, level and forecast info separated by colons.
//! Byte ranges are derived from consecutive offsets; the last record is
//! open-ended.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::errors::{MetgetGribError, Result};

#[derive(Debug, Clone)]
pub struct IdxRecord {
    pub number: u32,
    pub offset: u64,
    pub date: Option<DateTime<Utc>>,
    pub var: String,
    pub level: String,
    pub forecast_info: String,
}

impl IdxRecord {
    /// the `VAR:level` key registry bindings match against
    pub fn key (&self)->String {
        format!("{}:{}", self.var, self.level)
    }
}

/// an inclusive byte range; `end == None` runs to the end of the object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct GribIndex {
    pub records: Vec<IdxRecord>,
}

impl GribIndex {
    pub fn parse (text: &str)->Result<GribIndex> {
        let mut records = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue
            }

            let fields: Vec<&str> = line.split(':').collect();
            if fields.len() < 5 {
                return Err( MetgetGribError::IndexError( format!("short index line '{line}'")))
            }

            let number: u32 = fields[0].trim().parse()
                .map_err(|_| MetgetGribError::IndexError( format!("bad record number in '{line}'")))?;
            let offset: u64 = fields[1].trim().parse()
                .map_err(|_| MetgetGribError::IndexError( format!("bad byte offset in '{line}'")))?;

            records.push( IdxRecord {
                number,
                offset,
                date: parse_idx_date( fields[2]),
                var: fields[3].to_string(),
                level: fields[4].to_string(),
                forecast_info: fields.get(5).unwrap_or(&"").to_string(),
            });
        }

        if records.is_empty() {
            return Err( MetgetGribError::IndexError( "empty index".to_string()))
        }
        Ok( GribIndex { records })
    }

    /// byte range of the record at the given position
    pub fn range_of (&self, position: usize)->ByteRange {
        let start = self.records[position].offset;
        let end = self.records.get(position + 1).map(|next| next.offset.saturating_sub(1));
        ByteRange { start, end }
    }

    /// byte ranges of every record whose `VAR:level` key matches one of the
    /// requested names. Names may omit the level to match all levels of a
    /// variable
    pub fn ranges_for (&self, names: &[&str])->Vec<ByteRange> {
        let mut ranges = Vec::new();
        for (i, record) in self.records.iter().enumerate() {
            let key = record.key();
            let matched = names.iter().any(|n| {
                key == *n || record.var == *n || key.starts_with( &format!("{n}:"))
            });
            if matched {
                ranges.push( self.range_of(i));
            }
        }
        ranges
    }
}

fn parse_idx_date (field: &str)->Option<DateTime<Utc>> {
    let digits = field.trim().strip_prefix("d=")?;
    NaiveDateTime::parse_from_str( &format!("{digits}0000"), "%Y%m%d%H%M%S")
        .ok()
        .map(|ndt| DateTime::from_naive_utc_and_offset(ndt, Utc))
}

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

use std::time::Duration;
use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone, Timelike, Utc};

// simple std Duration ctor wrappers so we don't depend on the (still experimental) min/hour ctors
#[inline] pub fn millis (n: u64)->Duration { Duration::from_millis(n) }
#[inline] pub fn secs (n: u64)->Duration { Duration::from_secs(n) }
#[inline] pub fn minutes (n: u64)->Duration { Duration::from_secs(n * 60) }
#[inline] pub fn hours (n: u64)->Duration { Duration::from_secs(n * 3600) }

#[inline]
pub fn utc_now ()->DateTime<Utc> {
    Utc::now()
}

/// return the full hour for given DateTime (minutes, seconds and nanos all zeroed)
pub fn full_hour<Tz:TimeZone> (dt: &DateTime<Tz>)->DateTime<Tz> {
    dt.with_minute(0).unwrap().with_second(0).unwrap().with_nanosecond(0).unwrap()
}

pub fn is_between_inclusive (dt: &DateTime<Utc>, dt_start: &DateTime<Utc>, dt_end: &DateTime<Utc>) -> bool {
    dt >= dt_start && dt <= dt_end
}

/// parse an ISO-8601 / RFC-3339 datetime, with a fallback for the common
/// "YYYY-MM-DD HH:MM[:SS]" form used in request payloads. The result is UTC
/// with any supplied offset applied.
pub fn parse_datetime (s: &str)->Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.to_utc())
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(DateTime::from_naive_utc_and_offset(ndt, Utc))
        }
    }
    None
}

/// parse a "YYYYMMDDHH" stamp as used in ATCF advisory lines (leading blanks tolerated)
pub fn parse_atcf_date (s: &str)->Option<DateTime<Utc>> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(&format!("{s}0000"), "%Y%m%d%H%M%S")
        .ok()
        .map(|ndt| DateTime::from_naive_utc_and_offset(ndt, Utc))
}

pub fn fmt_atcf_date (dt: &DateTime<Utc>)->String {
    dt.format("%Y%m%d%H").to_string()
}

/// inclusive iterator over [start, end] stepping by `step`
pub struct DateSpan {
    next: Option<DateTime<Utc>>,
    end: DateTime<Utc>,
    step: TimeDelta,
}

impl DateSpan {
    pub fn new (start: DateTime<Utc>, end: DateTime<Utc>, step: Duration)->Self {
        let step = TimeDelta::from_std(step).unwrap_or(TimeDelta::seconds(1));
        DateSpan { next: Some(start), end, step }
    }
}

impl Iterator for DateSpan {
    type Item = DateTime<Utc>;

    fn next (&mut self)->Option<DateTime<Utc>> {
        let current = self.next?;
        if current > self.end {
            self.next = None;
            return None
        }
        self.next = Some(current + self.step);
        Some(current)
    }
}

//--- support for serde

pub fn ser_short_rfc3339<S: serde::Serializer> (dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>  {
    let dfm = format!("{}", dt.format("%Y-%m-%dT%H:%M:%S%Z"));
    s.serialize_str(&dfm)
}

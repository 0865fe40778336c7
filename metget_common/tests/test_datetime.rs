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
#![allow(unused)]

use chrono::{TimeZone, Utc};
use metget_common::datetime::*;

#[test]
fn test_parse_datetime_forms () {
    let expected = Utc.with_ymd_and_hms( 2023, 1, 1, 6, 0, 0).unwrap();

    assert_eq!( parse_datetime("2023-01-01T06:00:00Z"), Some(expected));
    assert_eq!( parse_datetime("2023-01-01T06:00:00"), Some(expected));
    assert_eq!( parse_datetime("2023-01-01 06:00:00"), Some(expected));
    assert_eq!( parse_datetime("2023-01-01 06:00"), Some(expected));
    assert_eq!( parse_datetime("January 1st"), None);
}

#[test]
fn test_atcf_dates () {
    let dt = parse_atcf_date(" 2023090512").unwrap();
    assert_eq!( dt, Utc.with_ymd_and_hms( 2023, 9, 5, 12, 0, 0).unwrap());
    assert_eq!( fmt_atcf_date(&dt), "2023090512");
    assert!( parse_atcf_date("not-a-date").is_none());
}

#[test]
fn test_full_hour () {
    let dt = Utc.with_ymd_and_hms( 2023, 1, 1, 6, 42, 31).unwrap();
    assert_eq!( full_hour(&dt), Utc.with_ymd_and_hms( 2023, 1, 1, 6, 0, 0).unwrap());
}

#[test]
fn test_date_span_is_inclusive () {
    let start = Utc.with_ymd_and_hms( 2023, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms( 2023, 1, 1, 6, 0, 0).unwrap();

    let steps: Vec<_> = DateSpan::new( start, end, hours(1)).collect();
    assert_eq!( steps.len(), 7);
    assert_eq!( steps[0], start);
    assert_eq!( steps[6], end);

    // a step that overshoots the end still yields the start
    let steps: Vec<_> = DateSpan::new( start, end, hours(10)).collect();
    assert_eq!( steps, vec![start]);
}

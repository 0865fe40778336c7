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

use metget_build::nhc::merge_nhc_tracks;

/// a best-track line: the date sits in bytes [8, 18), the hours field in [29, 33)
fn btk_line (date: &str)->String {
    format!("AL, 09, {date},   , BEST,   0, 253N,  876W,  35, 1005, HU")
}

/// a forecast line: valid at base date plus the lead-hours column
fn fcst_line (base: &str, tau: i64)->String {
    format!("AL, 09, {base},  1, OFCL,{tau:4}, 260N,  880W,  45,  995, HU")
}

#[test]
fn test_merge_rebases_and_appends () {
    let dir = tempfile::tempdir().unwrap();

    // best track ends 2023-09-05 12Z; forecast issued then, reaching +72 h
    let btk_path = dir.path().join("btk.dat");
    std::fs::write( &btk_path, [
        btk_line("2023090400"),
        btk_line("2023090412"),
        btk_line("2023090500"),
        btk_line("2023090512"),
    ].join("\n")).unwrap();

    let fcst_path = dir.path().join("fcst.dat");
    std::fs::write( &fcst_path, [
        fcst_line( "2023090512", 0),
        fcst_line( "2023090512", 12),
        fcst_line( "2023090512", 24),
        fcst_line( "2023090512", 48),
        fcst_line( "2023090512", 72),
    ].join("\n")).unwrap();

    let merged_path = dir.path().join("merged.trk");
    merge_nhc_tracks( &btk_path, &fcst_path, &merged_path).unwrap();

    let merged = std::fs::read_to_string(&merged_path).unwrap();
    let lines: Vec<&str> = merged.lines().collect();

    // 4 best-track lines plus the 4 forecast rows at dates not already present
    assert_eq!( lines.len(), 8);

    // every line is rebased to the best-track start date
    for line in &lines {
        assert_eq!( &line[8..18], "2023090400");
    }

    // delta hours: best track rows 0/12/24/36, then forecast rows 48/60/84/108
    let hours: Vec<&str> = lines.iter().map(|l| l[29..33].trim()).collect();
    assert_eq!( hours, vec!["0", "12", "24", "36", "48", "60", "84", "108"]);

    // everything outside the rewritten columns survives byte for byte
    assert!( lines[0].starts_with("AL, 09, "));
    assert!( lines[0].ends_with(", 253N,  876W,  35, 1005, HU"));
    assert!( lines[7].ends_with(", 260N,  880W,  45,  995, HU"));
}

#[test]
fn test_merge_skips_duplicate_forecast_rows () {
    let dir = tempfile::tempdir().unwrap();

    let btk_path = dir.path().join("btk.dat");
    std::fs::write( &btk_path, [
        btk_line("2023090500"),
        btk_line("2023090512"),
    ].join("\n")).unwrap();

    // the tau=0 forecast row coincides with the last best-track fix
    let fcst_path = dir.path().join("fcst.dat");
    std::fs::write( &fcst_path, [
        fcst_line( "2023090512", 0),
        fcst_line( "2023090512", 12),
    ].join("\n")).unwrap();

    let merged_path = dir.path().join("merged.trk");
    merge_nhc_tracks( &btk_path, &fcst_path, &merged_path).unwrap();

    let merged = std::fs::read_to_string(&merged_path).unwrap();
    let lines: Vec<&str> = merged.lines().collect();

    assert_eq!( lines.len(), 3); // the duplicate 12Z forecast row is dropped
    let hours: Vec<&str> = lines.iter().map(|l| l[29..33].trim()).collect();
    assert_eq!( hours, vec!["0", "12", "24"]);
}

#[test]
fn test_merge_requires_best_track_lines () {
    let dir = tempfile::tempdir().unwrap();

    let btk_path = dir.path().join("btk.dat");
    std::fs::write( &btk_path, "").unwrap();
    let fcst_path = dir.path().join("fcst.dat");
    std::fs::write( &fcst_path, fcst_line( "2023090512", 0)).unwrap();

    let merged_path = dir.path().join("merged.trk");
    assert!( merge_nhc_tracks( &btk_path, &fcst_path, &merged_path).is_err());
}

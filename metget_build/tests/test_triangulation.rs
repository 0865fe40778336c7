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

use metget_build::{CdtInterpolator, Stereographic};

/// a small curvilinear-ish point cloud: a regular 5x5 lon/lat patch around
/// (265, 20) with its outer ring as the constraint
fn patch ()->(Vec<(f64, f64)>, Vec<(usize, usize)>) {
    let mut points = Vec::new();
    for i in 0..5 {
        for j in 0..5 {
            points.push( (263.0 + j as f64, 18.0 + i as f64));
        }
    }

    // outer ring indices, counterclockwise
    let ring = [0usize, 1, 2, 3, 4, 9, 14, 19, 24, 23, 22, 21, 20, 15, 10, 5];
    let boundary: Vec<(usize, usize)> = (0..ring.len())
        .map(|k| (ring[k], ring[(k + 1) % ring.len()]))
        .collect();

    (points, boundary)
}

#[test]
fn test_projection_is_invertible_enough () {
    // distinct inputs land on distinct plane points and nearby inputs stay nearby
    let projection = Stereographic::default();

    let (x1, y1) = projection.forward( 265.0, 20.0);
    let (x2, y2) = projection.forward( 265.1, 20.0);
    let (x3, y3) = projection.forward( 265.0, 20.1);

    assert!( (x1 - x2).hypot( y1 - y2) > 1.0);
    assert!( (x1 - x3).hypot( y1 - y3) > 1.0);
    assert!( (x1 - x2).hypot( y1 - y2) < 50_000.0); // a tenth of a degree is km-scale
}

#[test]
fn test_constant_field_is_reproduced () {
    let (points, boundary) = patch();
    let mut cdt = CdtInterpolator::new( &points, &boundary).unwrap();

    let values = vec![7.5; points.len()];
    let targets = vec![ (264.5, 19.5), (265.0, 20.0), (266.2, 21.7)];
    let out = cdt.interpolate( &targets, &values);

    for v in out {
        assert!( (v - 7.5).abs() < 1e-9);
    }
}

#[test]
fn test_vertex_hits_and_outside_targets () {
    let (points, boundary) = patch();
    let mut cdt = CdtInterpolator::new( &points, &boundary).unwrap();

    let values: Vec<f64> = (0..points.len()).map(|k| k as f64).collect();

    // exactly on a source point returns that point's value; far outside is NaN
    let targets = vec![ points[12], (100.0, -60.0)];
    let out = cdt.interpolate( &targets, &values);

    assert!( (out[0] - 12.0).abs() < 1e-9);
    assert!( out[1].is_nan());
}

#[test]
fn test_weights_are_cached_and_reused () {
    let (points, boundary) = patch();
    let mut cdt = CdtInterpolator::new( &points, &boundary).unwrap();
    assert!( cdt.matches(&points));
    assert!( !cdt.matches(&points[1..]));

    let targets = vec![ (264.5, 19.5)];

    // two different value sets through the same stencils
    let ones = cdt.interpolate( &targets, &vec![1.0; points.len()]);
    assert!( (ones[0] - 1.0).abs() < 1e-9);

    let twos = cdt.interpolate( &targets, &vec![2.0; points.len()]);
    assert!( (twos[0] - 2.0).abs() < 1e-9);
}

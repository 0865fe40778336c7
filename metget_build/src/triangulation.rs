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

//! constrained Delaunay triangulation of irregular source points.
//!
//! The triangulation runs in a north-polar stereographic plane so wraparound
//! and pole neighborhoods triangulate cleanly; per-target barycentric weights
//! are computed once and reused while the source point set is unchanged.

use spade::{ConstrainedDelaunayTriangulation, Point2, PositionInTriangulation, Triangulation as SpadeTriangulation};
use tracing::{debug, info};

use crate::errors::{Result, internal_error};

/* #region stereographic projection *******************************************************/

const WGS84_A: f64 = 6378137.0;
const WGS84_B: f64 = 6356752.314245;

/// WGS84 forward transform onto a north-polar stereographic plane
/// (lat_0 = 90, true scale at 60N, reference longitude -105)
#[derive(Debug, Clone, Copy)]
pub struct Stereographic {
    lon0: f64,
    eccentricity: f64,
    rho_scale: f64,
}

impl Default for Stereographic {
    fn default ()->Self {
        Stereographic::new( -105.0, 60.0)
    }
}

impl Stereographic {
    pub fn new (lon0_deg: f64, lat_ts_deg: f64)->Self {
        let e = (1.0 - (WGS84_B * WGS84_B) / (WGS84_A * WGS84_A)).sqrt();

        // true-scale factor per Snyder: rho = a * m_ts * t / t_ts
        let lat_ts = lat_ts_deg.to_radians();
        let m_ts = lat_ts.cos() / (1.0 - e * e * lat_ts.sin().powi(2)).sqrt();
        let t_ts = half_angle_t( lat_ts, e);

        Stereographic {
            lon0: lon0_deg.to_radians(),
            eccentricity: e,
            rho_scale: WGS84_A * m_ts / t_ts,
        }
    }

    /// forward transform of a lon/lat pair in degrees to plane meters
    pub fn forward (&self, lon_deg: f64, lat_deg: f64)->(f64, f64) {
        let lon = lon_deg.to_radians();
        let lat = lat_deg.to_radians().clamp( -std::f64::consts::FRAC_PI_2 + 1e-10, std::f64::consts::FRAC_PI_2 - 1e-10);

        let t = half_angle_t( lat, self.eccentricity);
        let rho = self.rho_scale * t;
        let dlon = lon - self.lon0;

        (rho * dlon.sin(), -rho * dlon.cos())
    }
}

fn half_angle_t (lat: f64, e: f64)->f64 {
    let es = e * lat.sin();
    (std::f64::consts::FRAC_PI_4 - lat / 2.0).tan() / ((1.0 - es) / (1.0 + es)).powf( e / 2.0)
}

/* #endregion stereographic projection */

/// a target point's interpolation stencil: source indices and barycentric weights
type Stencil = Option<([usize; 3], [f64; 3])>;

pub struct CdtInterpolator {
    points: Vec<(f64, f64)>,
    projection: Stereographic,
    cdt: ConstrainedDelaunayTriangulation<Point2<f64>>,
    vertex_to_point: Vec<usize>,
    stencils: Option<Vec<Stencil>>,
}

impl CdtInterpolator {
    /// triangulate the source points with the boundary ring as constraint
    /// edges. `boundary` is index pairs into `points`
    pub fn new (points: &[(f64, f64)], boundary: &[(usize, usize)])->Result<CdtInterpolator> {
        info!("triangulating {} source points", points.len());

        let projection = Stereographic::default();
        let mut cdt: ConstrainedDelaunayTriangulation<Point2<f64>> = ConstrainedDelaunayTriangulation::new();

        let mut handles = Vec::with_capacity( points.len());
        let mut vertex_to_point: Vec<usize> = Vec::new();
        for (index, (lon, lat)) in points.iter().enumerate() {
            let (x, y) = projection.forward( *lon, *lat);
            let handle = cdt.insert( Point2::new( x, y))
                .map_err(|e| internal_error( format!("triangulation insert failed: {e:?}")))?;

            if handle.index() >= vertex_to_point.len() {
                vertex_to_point.resize( handle.index() + 1, usize::MAX);
            }
            if vertex_to_point[handle.index()] == usize::MAX {
                vertex_to_point[handle.index()] = index;
            }
            handles.push(handle);
        }

        for (from, to) in boundary {
            let (h1, h2) = (handles[*from], handles[*to]);
            if h1 != h2 && !cdt.exists_constraint( h1, h2) {
                cdt.add_constraint( h1, h2);
            }
        }

        Ok( CdtInterpolator { points: points.to_vec(), projection, cdt, vertex_to_point, stencils: None })
    }

    /// whether a cached triangulation can be reused for this source point set
    pub fn matches (&self, points: &[(f64, f64)])->bool {
        self.points == points
    }

    /// interpolate source values onto the target points, computing and caching
    /// the stencils on first use. Targets outside the triangulation are NaN
    pub fn interpolate (&mut self, targets: &[(f64, f64)], values: &[f64])->Vec<f64> {
        if self.stencils.is_none() {
            self.compute_stencils(targets);
        }

        self.stencils.as_ref().unwrap().iter()
            .map(|stencil| match stencil {
                Some((indices, weights)) => {
                    let v = [values[indices[0]], values[indices[1]], values[indices[2]]];
                    weights[0] * v[0] + weights[1] * v[1] + weights[2] * v[2]
                }
                None => f64::NAN,
            })
            .collect()
    }

    fn compute_stencils (&mut self, targets: &[(f64, f64)]) {
        debug!("computing interpolation weights for {} target points", targets.len());

        let stencils = targets.iter()
            .map(|(lon, lat)| {
                let (x, y) = self.projection.forward( *lon, *lat);
                self.locate_stencil( x, y)
            })
            .collect();

        self.stencils = Some(stencils);
    }

    fn locate_stencil (&self, x: f64, y: f64)->Stencil {
        match self.cdt.locate( Point2::new( x, y)) {
            PositionInTriangulation::OnFace(face) => {
                let face = self.cdt.face(face);
                let vertices = face.vertices();

                let p = [
                    vertices[0].position(),
                    vertices[1].position(),
                    vertices[2].position(),
                ];
                let indices = [
                    self.vertex_to_point[vertices[0].fix().index()],
                    self.vertex_to_point[vertices[1].fix().index()],
                    self.vertex_to_point[vertices[2].fix().index()],
                ];
                let weights = barycentric( (x, y), p)?;
                Some( (indices, weights) )
            }
            PositionInTriangulation::OnEdge(edge) => {
                let edge = self.cdt.directed_edge(edge);
                let (from, to) = (edge.from(), edge.to());

                let p0 = from.position();
                let p1 = to.position();
                let length = ((p1.x - p0.x).powi(2) + (p1.y - p0.y).powi(2)).sqrt();
                let w = if length > 0.0 {
                    (((x - p0.x).powi(2) + (y - p0.y).powi(2)).sqrt() / length).clamp( 0.0, 1.0)
                } else {
                    0.0
                };

                Some( (
                    [ self.vertex_to_point[from.fix().index()],
                      self.vertex_to_point[to.fix().index()],
                      self.vertex_to_point[from.fix().index()] ],
                    [1.0 - w, w, 0.0],
                ))
            }
            PositionInTriangulation::OnVertex(vertex) => {
                let index = self.vertex_to_point[ self.cdt.vertex(vertex).fix().index()];
                Some( ([index, index, index], [1.0, 0.0, 0.0]) )
            }
            _ => None,
        }
    }
}

/// barycentric coordinates of `p` in the triangle `t`; None for degenerate triangles
fn barycentric (p: (f64, f64), t: [Point2<f64>; 3])->Option<[f64; 3]> {
    let det = (t[1].y - t[2].y) * (t[0].x - t[2].x) + (t[2].x - t[1].x) * (t[0].y - t[2].y);
    if det.abs() < f64::EPSILON {
        return None
    }

    let w0 = ((t[1].y - t[2].y) * (p.0 - t[2].x) + (t[2].x - t[1].x) * (p.1 - t[2].y)) / det;
    let w1 = ((t[2].y - t[0].y) * (p.0 - t[2].x) + (t[0].x - t[2].x) * (p.1 - t[2].y)) / det;
    let w2 = 1.0 - w0 - w1;

    Some( [w0.max(0.0), w1.max(0.0), w2.max(0.0)] )
}

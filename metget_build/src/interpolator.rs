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

//! interpolation of source snapshots onto the target grid, priority merging
//! of nested source domains and Gaussian boundary smoothing.

use std::path::{Path, PathBuf};
use geo::{BooleanOps, Buffer, Contains, LineString, MultiPolygon, Point, Polygon, Simplify};
use ndarray::{Array2, Zip};
use tracing::{debug, info, warn};

use metget_grib::{GribField, read_messages};
use metget_sources::{FILL_VALUE, FileFormat, MetDataType, SourceDescriptor, VariableBinding, VariableType};

use crate::errors::{MetgetBuildError, Result, internal_error, no_data};
use crate::fileobj::FileObj;
use crate::met_dataset::MetDataset;
use crate::output_grid::OutputGrid;
use crate::triangulation::CdtInterpolator;

/// native-grid data of one source file
enum SourceData {
    Rectilinear {
        lon: Vec<f64>,
        lat: Vec<f64>,
        fields: Vec<(MetDataType, Array2<f64>)>,
    },
    Unstructured {
        points: Vec<(f64, f64)>,
        fields: Vec<(MetDataType, Vec<f64>)>,
        boundary: Vec<(usize, usize)>,
    },
}

/// one source file prepared for interpolation: native data, footprint polygon
/// and (after the interpolation pass) the values on the target grid
pub struct InterpData {
    filename: PathBuf,
    resolution: f64,
    polygon: Polygon<f64>,
    source: SourceData,
    interp: Option<MetDataset>,
}

impl InterpData {
    pub fn resolution (&self)->f64 { self.resolution }
    pub fn polygon (&self)->&Polygon<f64> { &self.polygon }
}

pub struct DataInterpolator {
    grid: OutputGrid,
    x: Vec<f64>,
    y: Vec<f64>,
    backfill: bool,
    domain_level: usize,
    triangulation: Option<CdtInterpolator>,
}

impl DataInterpolator {
    pub fn new (grid: OutputGrid, backfill: bool, domain_level: usize)->Self {
        let x = grid.x_column(true);
        let y = grid.y_column();
        DataInterpolator { grid, x, y, backfill, domain_level, triangulation: None }
    }

    pub fn grid (&self)->&OutputGrid { &self.grid }

    /// hand the cached triangulation to another interpolator (frame rotation)
    pub fn take_triangulation (&mut self)->Option<CdtInterpolator> {
        self.triangulation.take()
    }

    pub fn set_triangulation (&mut self, triangulation: Option<CdtInterpolator>) {
        self.triangulation = triangulation;
    }

    pub fn has_triangulation (&self)->bool {
        self.triangulation.is_some()
    }

    /// interpolate one snapshot (possibly spanning several nested files) onto
    /// the target grid and merge by ascending native resolution
    pub fn interpolate (&mut self, f_obj: &FileObj, variable_type: VariableType, apply_filter: bool)->Result<MetDataset> {
        let descriptor = f_obj.descriptor();
        let selected = descriptor.selected_variables(variable_type);
        if selected.is_empty() {
            return Err( no_data( format!("{} provides no {} variables", descriptor.service, variable_type)))
        }

        let mut data = Vec::with_capacity( f_obj.files().len());
        for file in f_obj.files() {
            data.push( self.open_dataset( file, descriptor, &selected)?);
        }

        // finest native resolution first; a stable sort keeps the file order
        // when resolutions tie
        data.sort_by(|a, b| a.resolution.total_cmp(&b.resolution));

        for item in data.iter_mut() {
            item.interp = Some( self.interpolate_item(item)?);
        }

        let mut merged = self.merge_data( &mut data, &selected, apply_filter);
        self.replace_nan_values( &mut merged, &selected);
        Ok(merged)
    }

    /* #region source reading *************************************************************/

    fn open_dataset (&self, filename: &Path, descriptor: &'static SourceDescriptor,
                     selected: &[&'static VariableBinding])->Result<InterpData>
    {
        match descriptor.file_format {
            FileFormat::Grib => self.open_grib( filename, descriptor, selected),
            FileFormat::CoampsNetcdf => self.open_coamps( filename, selected),
        }
    }

    fn open_grib (&self, filename: &Path, descriptor: &'static SourceDescriptor,
                  selected: &[&'static VariableBinding])->Result<InterpData>
    {
        let buf = std::fs::read(filename)?;
        let messages = read_messages(&buf)?;

        let mut lon: Option<Vec<f64>> = None;
        let mut lat: Option<Vec<f64>> = None;
        let mut fields = Vec::new();

        for binding in selected {
            let Some(id) = &binding.grib_id else { continue };
            let Some(message) = messages.iter().find(|m| m.matches(id)) else {
                debug!("{} has no {} record", filename.display(), binding.grib_name);
                continue
            };

            let field = GribField::from_message(message)?;
            let values = field.values.mapv(|v| v * binding.scale);

            lon.get_or_insert_with(|| normalize_lon( field.lon.clone()));
            lat.get_or_insert( field.lat.clone());
            fields.push( (binding.data_type, values));
        }

        if fields.is_empty() {
            return Err( no_data( format!("no requested variables in {}", filename.display())))
        }

        let lon = lon.unwrap();
        let lat = lat.unwrap();
        let resolution = rectilinear_resolution( &lon, &lat);
        let polygon = rectilinear_polygon( &lon, &lat, &fields[0].1, resolution);

        Ok( InterpData {
            filename: filename.to_path_buf(),
            resolution,
            polygon,
            source: SourceData::Rectilinear { lon, lat, fields },
            interp: None,
        })
    }

    fn open_coamps (&self, filename: &Path, selected: &[&'static VariableBinding])->Result<InterpData> {
        let file = netcdf::open(filename)?;

        let lon_var = file.variable("lon")
            .ok_or_else(|| internal_error( format!("{} has no lon variable", filename.display())))?;
        let lat_var = file.variable("lat")
            .ok_or_else(|| internal_error( format!("{} has no lat variable", filename.display())))?;

        let dims: Vec<usize> = lon_var.dimensions().iter().map(|d| d.len()).collect();
        let lon_values: Vec<f64> = lon_var.get_values(..)?;
        let lat_values: Vec<f64> = lat_var.get_values(..)?;

        if dims.len() == 2 {
            self.open_coamps_curvilinear( &file, filename, selected, &dims, lon_values, lat_values)
        } else {
            self.open_coamps_rectilinear( &file, filename, selected, lon_values, lat_values)
        }
    }

    fn open_coamps_rectilinear (&self, file: &netcdf::File, filename: &Path,
                                selected: &[&'static VariableBinding],
                                lon: Vec<f64>, lat: Vec<f64>)->Result<InterpData>
    {
        let lon = normalize_lon(lon);
        let (nrows, ncols) = (lat.len(), lon.len());

        let mut fields = Vec::new();
        for binding in selected {
            let Some(var) = file.variable( binding.var_name) else {
                debug!("{} has no {} variable", filename.display(), binding.var_name);
                continue
            };
            let values: Vec<f64> = var.get_values(..)?;
            let array = Array2::from_shape_vec( (nrows, ncols), values)
                .map_err(|e| internal_error( e.to_string()))?
                .mapv(|v| v * binding.scale);
            fields.push( (binding.data_type, array));
        }

        if fields.is_empty() {
            return Err( no_data( format!("no requested variables in {}", filename.display())))
        }

        let resolution = rectilinear_resolution( &lon, &lat);
        let polygon = rectilinear_polygon( &lon, &lat, &fields[0].1, resolution);

        Ok( InterpData {
            filename: filename.to_path_buf(),
            resolution,
            polygon,
            source: SourceData::Rectilinear { lon, lat, fields },
            interp: None,
        })
    }

    fn open_coamps_curvilinear (&self, file: &netcdf::File, filename: &Path,
                                selected: &[&'static VariableBinding], dims: &[usize],
                                lon: Vec<f64>, lat: Vec<f64>)->Result<InterpData>
    {
        let (nrows, ncols) = (dims[0], dims[1]);

        let points: Vec<(f64, f64)> = lon.iter().zip(lat.iter())
            .map(|(lon, lat)| (if *lon < 0.0 { lon + 360.0 } else { *lon }, *lat))
            .collect();

        let mut fields = Vec::new();
        for binding in selected {
            let Some(var) = file.variable( binding.var_name) else {
                debug!("{} has no {} variable", filename.display(), binding.var_name);
                continue
            };
            let values: Vec<f64> = var.get_values(..)?;
            fields.push( (binding.data_type, values.iter().map(|v| v * binding.scale).collect()));
        }

        if fields.is_empty() {
            return Err( no_data( format!("no requested variables in {}", filename.display())))
        }

        // the footprint is the grid's outer ring, walked in order so it can
        // double as the triangulation constraint
        let ring_indices = grid_boundary_ring( nrows, ncols);
        let mut boundary = Vec::with_capacity( ring_indices.len());
        for k in 0..ring_indices.len() {
            boundary.push( (ring_indices[k], ring_indices[(k + 1) % ring_indices.len()]) );
        }

        let resolution = curvilinear_resolution( &points, nrows, ncols);
        let ring: Vec<(f64, f64)> = ring_indices.iter().map(|k| points[*k]).collect();
        let polygon = valid_polygon( ring).simplify( resolution / 2.0);

        Ok( InterpData {
            filename: filename.to_path_buf(),
            resolution,
            polygon,
            source: SourceData::Unstructured { points, fields, boundary },
            interp: None,
        })
    }

    /* #endregion source reading */

    /* #region interpolation **************************************************************/

    fn interpolate_item (&mut self, item: &InterpData)->Result<MetDataset> {
        match &item.source {
            SourceData::Rectilinear { lon, lat, fields } => {
                let mut out = MetDataset::new( self.y.len(), self.x.len());
                for (var, values) in fields {
                    out.insert( *var, self.bilinear( lon, lat, values));
                }
                Ok(out)
            }
            SourceData::Unstructured { points, fields, boundary } => {
                self.triangulated( points, fields, boundary)
            }
        }
    }

    fn bilinear (&self, lon: &[f64], lat: &[f64], values: &Array2<f64>)->Array2<f64> {
        let mut out = Array2::from_elem( (self.y.len(), self.x.len()), f64::NAN);

        for (i, y) in self.y.iter().enumerate() {
            let Some(i0) = bracket( lat, *y) else { continue };
            let fy = fraction( lat[i0], lat[i0 + 1], *y);

            for (j, x) in self.x.iter().enumerate() {
                let Some(j0) = bracket( lon, *x) else { continue };
                let fx = fraction( lon[j0], lon[j0 + 1], *x);

                let v00 = values[[i0, j0]];
                let v01 = values[[i0, j0 + 1]];
                let v10 = values[[i0 + 1, j0]];
                let v11 = values[[i0 + 1, j0 + 1]];

                out[[i, j]] = (v00 * (1.0 - fx) + v01 * fx) * (1.0 - fy)
                    + (v10 * (1.0 - fx) + v11 * fx) * fy;
            }
        }
        out
    }

    fn triangulated (&mut self, points: &[(f64, f64)], fields: &[(MetDataType, Vec<f64>)],
                     boundary: &[(usize, usize)])->Result<MetDataset>
    {
        let reuse = self.triangulation.as_ref().map(|t| t.matches(points)).unwrap_or(false);
        if !reuse {
            self.triangulation = Some( CdtInterpolator::new( points, boundary)?);
        }
        let triangulation = self.triangulation.as_mut().unwrap();

        let mut targets = Vec::with_capacity( self.y.len() * self.x.len());
        for y in &self.y {
            for x in &self.x {
                targets.push( (*x, *y));
            }
        }

        let mut out = MetDataset::new( self.y.len(), self.x.len());
        for (var, values) in fields {
            let flat = triangulation.interpolate( &targets, values);
            let array = Array2::from_shape_vec( (self.y.len(), self.x.len()), flat)
                .map_err(|e| internal_error( e.to_string()))?;
            out.insert( *var, array);
        }
        Ok(out)
    }

    /* #endregion interpolation */

    /* #region merge and smoothing ********************************************************/

    /// write each source into the merged field wherever it is still undefined,
    /// finest resolution first, then smooth across nested-domain boundaries
    fn merge_data (&self, data: &mut [InterpData], selected: &[&'static VariableBinding], apply_filter: bool)->MetDataset {
        let mut out = MetDataset::new( self.y.len(), self.x.len());

        for binding in selected {
            let mut merged = Array2::from_elem( (self.y.len(), self.x.len()), f64::NAN);
            for item in data.iter() {
                if let Some(values) = item.interp.as_ref().and_then(|d| d.get( binding.data_type)) {
                    Zip::from(&mut merged).and(values).for_each(|m, v| {
                        if m.is_nan() { *m = *v }
                    });
                }
            }
            out.insert( binding.data_type, merged);
        }

        if apply_filter {
            self.smooth_domain_boundaries( data, &mut out);
        }
        out
    }

    /// Gaussian blend across the boundary of every source that is fully
    /// enclosed by another source. Only the cells inside the smoothing ring
    /// (the +-5 resolution annulus around the footprint boundary) change
    fn smooth_domain_boundaries (&self, data: &[InterpData], out: &mut MetDataset) {
        let enclosed = enclosed_flags(data);

        let mut passes: Vec<(f64, Vec<(usize, usize)>)> = Vec::new();
        for (index, item) in data.iter().enumerate().take( data.len().saturating_sub(1)) {
            if !enclosed[index] {
                continue
            }

            let ring = smoothing_ring( &item.polygon, item.resolution);
            let cells = self.cells_within( &ring);
            if !cells.is_empty() {
                passes.push( (5.0 * item.resolution, cells));
            }
        }

        for (sigma, cells) in passes {
            for (_, values) in out.iter_mut() {
                let smoothed = gaussian_filter_nan( values, sigma);
                for (i, j) in &cells {
                    values[[*i, *j]] = smoothed[[*i, *j]];
                }
            }
        }
    }

    fn cells_within (&self, ring: &MultiPolygon<f64>)->Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for (i, y) in self.y.iter().enumerate() {
            for (j, x) in self.x.iter().enumerate() {
                if ring.contains( &Point::new( *x, *y)) {
                    cells.push( (i, j));
                }
            }
        }
        cells
    }

    /// replace leftover NaNs with the physical default for nested backfilled
    /// domains, the canonical fill value otherwise
    fn replace_nan_values (&self, out: &mut MetDataset, selected: &[&'static VariableBinding]) {
        for binding in selected {
            let replacement = if self.backfill && self.domain_level != 0 {
                binding.data_type.default_value()
            } else {
                FILL_VALUE
            };

            if let Some(values) = out.get_mut( binding.data_type) {
                values.mapv_inplace(|v| if v.is_nan() { replacement } else { v });
            }
        }
    }

    /* #endregion merge and smoothing */
}

/* #region geometry helpers ***************************************************************/

fn normalize_lon (mut lon: Vec<f64>)->Vec<f64> {
    for v in lon.iter_mut() {
        if *v < 0.0 { *v += 360.0 }
    }
    lon
}

fn bracket (axis: &[f64], value: f64)->Option<usize> {
    if axis.len() < 2 || value < axis[0] || value > axis[axis.len() - 1] {
        return None
    }
    let idx = axis.partition_point(|a| *a <= value);
    Some( idx.saturating_sub(1).min( axis.len() - 2) )
}

fn fraction (lower: f64, upper: f64, value: f64)->f64 {
    if upper > lower { ((value - lower) / (upper - lower)).clamp( 0.0, 1.0) } else { 0.0 }
}

fn rectilinear_resolution (lon: &[f64], lat: &[f64])->f64 {
    let dx = ((lon[lon.len() - 1] - lon[0]) / lon.len() as f64).abs();
    let dy = ((lat[lat.len() - 1] - lat[0]) / lat.len() as f64).abs();
    (dx + dy) / 2.0
}

fn curvilinear_resolution (points: &[(f64, f64)], nrows: usize, ncols: usize)->f64 {
    let dx = ((points[ncols - 1].0 - points[0].0) / ncols as f64).abs();
    let dy = ((points[(nrows - 1) * ncols].1 - points[0].1) / nrows as f64).abs();
    (dx + dy) / 2.0
}

/// the footprint polygon of a rectilinear source: the four corners when the
/// data has no holes, otherwise a trace of the cells bordering the holes
fn rectilinear_polygon (lon: &[f64], lat: &[f64], values: &Array2<f64>, resolution: f64)->Polygon<f64> {
    let has_nan = values.iter().any(|v| v.is_nan());

    if !has_nan {
        let ring = vec![
            (lon[0], lat[0]),
            (lon[lon.len() - 1], lat[0]),
            (lon[lon.len() - 1], lat[lat.len() - 1]),
            (lon[0], lat[lat.len() - 1]),
        ];
        return valid_polygon(ring)
    }

    let (nrows, ncols) = values.dim();
    let mut edge_points = Vec::new();
    for i in 0..nrows {
        for j in 0..ncols {
            if values[[i, j]].is_nan() {
                continue
            }
            // neighborhood wraps like the reference trace
            let neighbors = [
                values[[(i + nrows - 1) % nrows, j]],
                values[[(i + 1) % nrows, j]],
                values[[i, (j + ncols - 1) % ncols]],
                values[[i, (j + 1) % ncols]],
            ];
            if neighbors.iter().any(|v| v.is_nan()) {
                edge_points.push( (lon[j], lat[i]));
            }
        }
    }

    if edge_points.len() < 3 {
        let ring = vec![
            (lon[0], lat[0]),
            (lon[lon.len() - 1], lat[0]),
            (lon[lon.len() - 1], lat[lat.len() - 1]),
            (lon[0], lat[lat.len() - 1]),
        ];
        return valid_polygon(ring)
    }

    valid_polygon( order_ring(edge_points)).simplify( resolution / 2.0)
}

/// order a point cloud into a ring by repeated nearest-neighbor selection
fn order_ring (mut points: Vec<(f64, f64)>)->Vec<(f64, f64)> {
    let mut ordered = Vec::with_capacity( points.len());
    ordered.push( points.swap_remove(0));

    while !points.is_empty() {
        let last = *ordered.last().unwrap();
        let (nearest, _) = points.iter().enumerate()
            .map(|(k, p)| (k, (p.0 - last.0).powi(2) + (p.1 - last.1).powi(2)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();
        ordered.push( points.swap_remove(nearest));
    }
    ordered
}

/// the exterior ring of an nrows x ncols grid as flat indices, walked
/// counterclockwise from the lower-left corner
fn grid_boundary_ring (nrows: usize, ncols: usize)->Vec<usize> {
    let mut ring = Vec::with_capacity( 2 * (nrows + ncols));

    for j in 0..ncols {
        ring.push(j); // bottom row
    }
    for i in 1..nrows {
        ring.push( i * ncols + ncols - 1); // right column
    }
    for j in (0..ncols - 1).rev() {
        ring.push( (nrows - 1) * ncols + j); // top row
    }
    for i in (1..nrows - 1).rev() {
        ring.push( i * ncols); // left column
    }
    ring
}

fn valid_polygon (ring: Vec<(f64, f64)>)->Polygon<f64> {
    Polygon::new( LineString::from(ring), vec![])
}

/// the annulus `buffer(poly, +5 res) - buffer(poly, -5 res)`
fn smoothing_ring (polygon: &Polygon<f64>, resolution: f64)->MultiPolygon<f64> {
    let outer = polygon.buffer( 5.0 * resolution);
    let inner = polygon.buffer( -5.0 * resolution);
    outer.difference(&inner)
}

/// which source footprints are fully enclosed by another source's footprint
fn enclosed_flags (data: &[InterpData])->Vec<bool> {
    let mut flags = vec![false; data.len()];
    for (i, item_i) in data.iter().enumerate() {
        for (j, item_j) in data.iter().enumerate() {
            if i != j && item_j.polygon.contains(&item_i.polygon) {
                flags[i] = true;
                break
            }
        }
    }
    flags
}

/// separable Gaussian blur. The kernel is renormalized over the finite
/// samples under it; an undefined center stays undefined
pub fn gaussian_filter_nan (values: &Array2<f64>, sigma: f64)->Array2<f64> {
    if sigma <= 0.0 {
        return values.clone()
    }

    let radius = (3.0 * sigma).ceil() as isize;
    let kernel: Vec<f64> = (-radius..=radius)
        .map(|d| (-0.5 * (d as f64 / sigma).powi(2)).exp())
        .collect();

    let pass = |input: &Array2<f64>, axis_rows: bool|->Array2<f64> {
        let (nrows, ncols) = input.dim();
        let mut out = Array2::from_elem( (nrows, ncols), f64::NAN);

        for i in 0..nrows {
            for j in 0..ncols {
                if input[[i, j]].is_nan() {
                    continue
                }
                let mut sum = 0.0;
                let mut weight = 0.0;
                for (k, w) in kernel.iter().enumerate() {
                    let d = k as isize - radius;
                    let (ii, jj) = if axis_rows { (i as isize + d, j as isize) } else { (i as isize, j as isize + d) };
                    if ii < 0 || jj < 0 || ii >= nrows as isize || jj >= ncols as isize {
                        continue
                    }
                    let v = input[[ii as usize, jj as usize]];
                    if v.is_nan() {
                        continue
                    }
                    sum += w * v;
                    weight += w;
                }
                if weight > 0.0 {
                    out[[i, j]] = sum / weight;
                }
            }
        }
        out
    };

    let horizontal = pass( values, false);
    pass( &horizontal, true)
}

/* #endregion geometry helpers */

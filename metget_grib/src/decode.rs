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

//! unpacking of GRIB2 data sections into physical values.
//!
//! Follows the NCEP g2lib reconstruction for complex packing and spatial
//! differencing. Missing points (bitmap or missing-value management) come out
//! as NaN.

use crate::errors::{MetgetGribError, Result, decode_error};
use crate::message::{
    ComplexPacking, GribMessage, GroupDefinition, Packing, SimplePacking, SpatialDiffPacking,
    grib_int_n,
};

/// MSB-first bit reader over a byte slice
struct BitReader<'a> {
    buf: &'a [u8],
    byte: usize,
    bit: usize,
}

impl<'a> BitReader<'a> {
    fn new (buf: &'a [u8])->Self {
        BitReader { buf, byte: 0, bit: 0 }
    }

    fn read (&mut self, num_bits: usize)->Result<u64> {
        if num_bits == 0 {
            return Ok(0)
        }
        if num_bits > 64 {
            return Err( decode_error( format!("bit width {num_bits} out of range")))
        }

        let mut v: u64 = 0;
        for _ in 0..num_bits {
            if self.byte >= self.buf.len() {
                return Err( MetgetGribError::Truncated( "bit stream exhausted".to_string()))
            }
            let bit = (self.buf[self.byte] >> (7 - self.bit)) & 1;
            v = (v << 1) | bit as u64;

            self.bit += 1;
            if self.bit == 8 {
                self.bit = 0;
                self.byte += 1;
            }
        }
        Ok(v)
    }

    fn skip_to_byte (&mut self) {
        if self.bit != 0 {
            self.bit = 0;
            self.byte += 1;
        }
    }

    fn bytes_consumed (&self)->usize {
        if self.bit == 0 { self.byte } else { self.byte + 1 }
    }
}

#[inline]
fn scale_value (x: f64, packing: &SimplePacking)->f64 {
    (packing.reference_value as f64 + x * 2f64.powi( packing.binary_scale_factor as i32))
        / 10f64.powi( packing.decimal_scale_factor as i32)
}

/// decode a message's data section to physical values in wire order
pub fn decode_values (msg: &GribMessage)->Result<Vec<f64>> {
    let num_points = msg.representation.num_points;

    let raw = match &msg.representation.packing {
        Packing::Simple(p) => decode_simple( &msg.data, p, num_points)?,
        Packing::Complex(p) => decode_complex( &msg.data, p, num_points)?,
        Packing::ComplexSpatialDiff(p) => decode_spatial_diff( &msg.data, p, num_points)?,
        Packing::Unsupported(n) => return Err( MetgetGribError::UnsupportedPacking(*n)),
    };

    if !msg.bitmap.applies() {
        return Ok(raw)
    }

    // expand through the bitmap: raw carries only the present points
    let total = msg.bitmap.data.len() * 8;
    let mut values = Vec::with_capacity(total);
    let mut src = raw.into_iter();
    for i in 0..total {
        if msg.bitmap.is_present(i) {
            values.push( src.next().ok_or_else(|| decode_error("bitmap and data length disagree"))?);
        } else {
            values.push( f64::NAN);
        }
    }
    Ok(values)
}

fn decode_simple (data: &[u8], packing: &SimplePacking, num_points: usize)->Result<Vec<f64>> {
    if packing.num_bits == 0 {
        // a constant field packs down to just the reference value
        return Ok( vec![ scale_value( 0.0, packing); num_points] )
    }

    let mut reader = BitReader::new(data);
    let mut values = Vec::with_capacity(num_points);
    for _ in 0..num_points {
        let x = reader.read( packing.num_bits)? as f64;
        values.push( scale_value( x, packing));
    }
    Ok(values)
}

/// the per-group metadata of a complex-packed message
struct Groups {
    references: Vec<u64>,
    widths: Vec<usize>,
    lengths: Vec<usize>,
    bytes_consumed: usize,
}

fn read_groups (data: &[u8], packing: &ComplexPacking)->Result<Groups> {
    let groups: &GroupDefinition = &packing.groups;
    let ng = groups.num_groups;

    let mut reader = BitReader::new(data);
    let mut references = Vec::with_capacity(ng);
    for _ in 0..ng {
        references.push( reader.read( packing.simple.num_bits)?);
    }
    reader.skip_to_byte();

    let mut widths = Vec::with_capacity(ng);
    for _ in 0..ng {
        widths.push( groups.group_widths_reference as usize + reader.read( groups.group_widths_num_bits)? as usize);
    }
    reader.skip_to_byte();

    let mut lengths = Vec::with_capacity(ng);
    for _ in 0..ng {
        lengths.push( groups.group_lengths_reference as usize
            + groups.group_lengths_increment as usize * reader.read( groups.group_scaled_lengths_num_bits)? as usize);
    }
    if let Some(last) = lengths.last_mut() {
        *last = groups.group_lengths_last as usize;
    }
    reader.skip_to_byte();

    Ok( Groups { references, widths, lengths, bytes_consumed: reader.bytes_consumed() })
}

/// unpack the grouped integer stream. Missing points are None
fn unpack_groups (data: &[u8], packing: &ComplexPacking, num_points: usize)->Result<(Vec<Option<i64>>, usize)> {
    let groups = read_groups( data, packing)?;
    let mut reader = BitReader::new( &data[groups.bytes_consumed..]);

    let missing_management = packing.missing_value_management;
    let mut values: Vec<Option<i64>> = Vec::with_capacity(num_points);

    for g in 0..groups.references.len() {
        let reference = groups.references[g];
        let width = groups.widths[g];
        let length = groups.lengths[g];

        if width == 0 {
            // constant group; with missing management an all-ones reference marks the whole group missing
            let group_missing = missing_management > 0
                && packing.simple.num_bits > 0
                && reference == all_ones( packing.simple.num_bits);
            for _ in 0..length {
                values.push( if group_missing { None } else { Some( reference as i64) });
            }
        } else {
            for _ in 0..length {
                let v = reader.read(width)?;
                if missing_management > 0 && v == all_ones(width) {
                    values.push(None);
                } else {
                    values.push( Some( reference as i64 + v as i64));
                }
            }
        }
    }

    if values.len() < num_points {
        return Err( decode_error( format!("grouped stream has {} of {} points", values.len(), num_points)))
    }
    values.truncate(num_points);

    Ok( (values, groups.bytes_consumed + reader.bytes_consumed()) )
}

#[inline]
fn all_ones (bits: usize)->u64 {
    if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 }
}

fn decode_complex (data: &[u8], packing: &ComplexPacking, num_points: usize)->Result<Vec<f64>> {
    let (raw, _) = unpack_groups( data, packing, num_points)?;

    Ok( raw.into_iter()
        .map(|v| match v {
            Some(x) => scale_value( x as f64, &packing.simple),
            None => f64::NAN,
        })
        .collect())
}

fn decode_spatial_diff (data: &[u8], packing: &SpatialDiffPacking, num_points: usize)->Result<Vec<f64>> {
    let order = packing.order as usize;
    let octets = packing.descriptor_octets;
    if order == 0 || order > 2 {
        return Err( decode_error( format!("spatial differencing order {order} not supported")))
    }

    // extra descriptors: `order` initial values followed by the overall minimum
    let descriptor_len = (order + 1) * octets;
    if data.len() < descriptor_len {
        return Err( MetgetGribError::Truncated( "spatial differencing descriptors".to_string()))
    }
    let mut initial = Vec::with_capacity(order);
    for i in 0..order {
        initial.push( grib_int_n( &data[i * octets..(i + 1) * octets]));
    }
    let min_diff = grib_int_n( &data[order * octets..descriptor_len]);

    let (raw, _) = unpack_groups( &data[descriptor_len..], &packing.complex, num_points)?;

    // undo the differencing (g2lib reconstruction); differenced fields have no
    // missing-value management so treat None as zero increment
    let mut x: Vec<i64> = Vec::with_capacity(num_points);
    for (i, v) in raw.into_iter().enumerate() {
        let v = v.unwrap_or(0);
        let value = if i < order {
            initial[i]
        } else if order == 1 {
            v + min_diff + x[i - 1]
        } else {
            v + min_diff + 2 * x[i - 1] - x[i - 2]
        };
        x.push(value);
    }

    Ok( x.into_iter().map(|v| scale_value( v as f64, &packing.complex.simple)).collect())
}

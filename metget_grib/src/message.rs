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

//! GRIB2 message structure and section reader

use chrono::{DateTime, NaiveDate, Utc};
use metget_sources::GribProductId;

use crate::errors::{MetgetGribError, Result};

const GRIB_MAGIC: &[u8] = b"GRIB";
const END_MAGIC: &[u8] = b"7777";
const SECT0_SIZE: usize = 16;

/// big-endian byte cursor over a borrowed buffer
pub(crate) struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new (buf: &'a [u8])->Self {
        ByteCursor { buf, pos: 0 }
    }

    pub fn pos (&self)->usize { self.pos }

    pub fn remaining (&self)->usize { self.buf.len() - self.pos }

    pub fn take (&mut self, n: usize)->Result<&'a [u8]> {
        if self.remaining() < n {
            return Err( MetgetGribError::Truncated( format!("need {} bytes, have {}", n, self.remaining())))
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn skip (&mut self, n: usize)->Result<()> {
        self.take(n).map(|_| ())
    }

    pub fn u8 (&mut self)->Result<u8> {
        Ok( self.take(1)?[0] )
    }

    pub fn u16 (&mut self)->Result<u16> {
        Ok( u16::from_be_bytes( self.take(2)?.try_into().unwrap()) )
    }

    pub fn u32 (&mut self)->Result<u32> {
        Ok( u32::from_be_bytes( self.take(4)?.try_into().unwrap()) )
    }

    pub fn u64 (&mut self)->Result<u64> {
        Ok( u64::from_be_bytes( self.take(8)?.try_into().unwrap()) )
    }

    pub fn f32 (&mut self)->Result<f32> {
        Ok( f32::from_be_bytes( self.take(4)?.try_into().unwrap()) )
    }

    /// GRIB signed integers are sign-and-magnitude, not two's complement
    pub fn i8_grib (&mut self)->Result<i8> {
        Ok( grib_int8( self.u8()?) )
    }

    pub fn i16_grib (&mut self)->Result<i16> {
        Ok( grib_int16( self.u16()?) )
    }

    pub fn i32_grib (&mut self)->Result<i32> {
        Ok( grib_int32( self.u32()?) )
    }
}

#[inline] pub(crate) fn grib_int8 (v: u8)->i8 {
    if v & 0x80 != 0 { -((v & 0x7f) as i8) } else { v as i8 }
}

#[inline] pub(crate) fn grib_int16 (v: u16)->i16 {
    if v & 0x8000 != 0 { -((v & 0x7fff) as i16) } else { v as i16 }
}

#[inline] pub(crate) fn grib_int32 (v: u32)->i32 {
    if v & 0x8000_0000 != 0 { -((v & 0x7fff_ffff) as i32) } else { v as i32 }
}

/// sign-and-magnitude integer of `octets` bytes, as used by the spatial
/// differencing extra descriptors
pub(crate) fn grib_int_n (bytes: &[u8])->i64 {
    if bytes.is_empty() {
        return 0
    }
    let negative = bytes[0] & 0x80 != 0;
    let mut v: i64 = (bytes[0] & 0x7f) as i64;
    for b in &bytes[1..] {
        v = (v << 8) | (*b as i64);
    }
    if negative { -v } else { v }
}

/* #region sections ***********************************************************************/

#[derive(Debug, Clone)]
pub struct Indicator {
    pub discipline: u8,
    pub total_length: u64,
}

#[derive(Debug, Clone)]
pub struct Identification {
    pub centre_id: u16,
    pub subcentre_id: u16,
    pub master_table_version: u8,
    pub local_table_version: u8,
    pub ref_time: DateTime<Utc>,
    pub prod_status: u8,
    pub data_type: u8,
}

/// grid definition template 3.0 (regular lat/lon), angles in degrees
#[derive(Debug, Clone, PartialEq)]
pub struct LatLonGrid {
    pub ni: usize,
    pub nj: usize,
    pub lat1: f64,
    pub lon1: f64,
    pub lat2: f64,
    pub lon2: f64,
    pub di: f64,
    pub dj: f64,
    pub scanning_mode: u8,
}

impl LatLonGrid {
    /// i direction is negative (east to west)
    pub fn scans_negative_i (&self)->bool { self.scanning_mode & 0x80 != 0 }

    /// j direction is positive (south to north)
    pub fn scans_positive_j (&self)->bool { self.scanning_mode & 0x40 != 0 }
}

#[derive(Debug, Clone)]
pub enum GridDefinition {
    LatLon(LatLonGrid),
    Unsupported(u16),
}

#[derive(Debug, Clone)]
pub struct ProductDefinition {
    pub template_number: u16,
    pub category: u8,
    pub parameter: u8,
    pub surface1_type: u8,
    pub surface1_value: f64,
}

impl ProductDefinition {
    /// does this product match a registry binding's grib identification
    pub fn matches (&self, discipline: u8, id: &GribProductId)->bool {
        discipline == id.discipline
            && self.category == id.category
            && self.parameter == id.parameter
            && self.surface1_type == id.surface_type
            && id.surface_value.map(|v| (self.surface1_value - v).abs() < 1e-6).unwrap_or(true)
    }
}

#[derive(Debug, Clone)]
pub struct SimplePacking {
    pub reference_value: f32,
    pub binary_scale_factor: i16,
    pub decimal_scale_factor: i16,
    pub num_bits: usize,
    pub values_type: u8,
}

#[derive(Debug, Clone)]
pub struct GroupDefinition {
    pub num_groups: usize,
    pub group_widths_reference: u8,
    pub group_widths_num_bits: usize,
    pub group_lengths_reference: u32,
    pub group_lengths_increment: u8,
    pub group_lengths_last: u32,
    pub group_scaled_lengths_num_bits: usize,
}

#[derive(Debug, Clone)]
pub struct ComplexPacking {
    pub simple: SimplePacking,
    pub group_method: u8,
    pub missing_value_management: u8,
    pub missing_primary: u32,
    pub missing_secondary: u32,
    pub groups: GroupDefinition,
}

#[derive(Debug, Clone)]
pub struct SpatialDiffPacking {
    pub complex: ComplexPacking,
    pub order: u8,
    pub descriptor_octets: usize,
}

#[derive(Debug, Clone)]
pub enum Packing {
    Simple(SimplePacking),
    Complex(ComplexPacking),
    ComplexSpatialDiff(SpatialDiffPacking),
    Unsupported(u16),
}

#[derive(Debug, Clone)]
pub struct DataRepresentation {
    pub num_points: usize,
    pub template_number: u16,
    pub packing: Packing,
}

#[derive(Debug, Clone)]
pub struct Bitmap {
    pub indicator: u8,
    pub data: Vec<u8>,
}

impl Bitmap {
    pub fn is_present (&self, index: usize)->bool {
        match self.indicator {
            0 => {
                let byte = index / 8;
                let bit = 7 - (index % 8);
                self.data.get(byte).map(|b| b & (1 << bit) != 0).unwrap_or(false)
            }
            _ => true, // 255 = no bitmap applies
        }
    }

    pub fn applies (&self)->bool {
        self.indicator == 0
    }
}

/* #endregion sections */

#[derive(Debug, Clone)]
pub struct GribMessage {
    pub indicator: Indicator,
    pub identification: Identification,
    pub grid: GridDefinition,
    pub product: ProductDefinition,
    pub representation: DataRepresentation,
    pub bitmap: Bitmap,
    pub data: Vec<u8>,
}

impl GribMessage {
    pub fn matches (&self, id: &GribProductId)->bool {
        self.product.matches( self.indicator.discipline, id)
    }
}

/// read all messages from an in-memory GRIB2 file image. Trailing garbage
/// after the last complete message is ignored, which keeps concatenated
/// ranged downloads readable
pub fn read_messages (buf: &[u8])->Result<Vec<GribMessage>> {
    let mut messages = Vec::new();
    let mut pos = 0;

    while pos + SECT0_SIZE <= buf.len() {
        // resynchronize on the magic, records from ranged reads are back to back
        match find_magic( &buf[pos..]) {
            Some(offset) => { pos += offset }
            None => break
        }
        if pos + SECT0_SIZE > buf.len() { break }

        let total_length = u64::from_be_bytes( buf[pos + 8..pos + 16].try_into().unwrap()) as usize;
        if pos + total_length > buf.len() {
            break
        }

        messages.push( read_message( &buf[pos..pos + total_length])? );
        pos += total_length;
    }

    if messages.is_empty() {
        return Err( MetgetGribError::NotGrib )
    }
    Ok(messages)
}

fn find_magic (buf: &[u8])->Option<usize> {
    buf.windows( GRIB_MAGIC.len()).position(|w| w == GRIB_MAGIC)
}

fn read_message (buf: &[u8])->Result<GribMessage> {
    let mut cursor = ByteCursor::new(buf);

    //--- section 0
    let magic = cursor.take(4)?;
    if magic != GRIB_MAGIC {
        return Err( MetgetGribError::NotGrib )
    }
    cursor.skip(2)?; // reserved
    let discipline = cursor.u8()?;
    let edition = cursor.u8()?;
    if edition != 2 {
        return Err( MetgetGribError::EditionMismatch(edition))
    }
    let total_length = cursor.u64()?;
    let indicator = Indicator { discipline, total_length };

    let mut identification = None;
    let mut grid = None;
    let mut product = None;
    let mut representation = None;
    let mut bitmap = None;
    let mut data = None;

    while cursor.remaining() >= END_MAGIC.len() {
        if &buf[cursor.pos()..cursor.pos() + END_MAGIC.len()] == END_MAGIC {
            break
        }

        let section_length = cursor.u32()? as usize;
        let section_number = cursor.u8()?;
        if section_length < 5 {
            return Err( MetgetGribError::Truncated( format!("section {section_number} shorter than its header")))
        }
        let body = cursor.take( section_length - 5)?;

        match section_number {
            1 => { identification = Some( read_identification(body)?) }
            2 => {} // local use, skipped
            3 => { grid = Some( read_grid_definition(body)?) }
            4 => { product = Some( read_product_definition(body)?) }
            5 => { representation = Some( read_data_representation(body)?) }
            6 => {
                if body.is_empty() {
                    return Err( MetgetGribError::Truncated( "empty bitmap section".to_string()))
                }
                bitmap = Some( Bitmap { indicator: body[0], data: body[1..].to_vec() });
            }
            7 => { data = Some( body.to_vec()) }
            n => { return Err( MetgetGribError::UnknownSection(n)) }
        }
    }

    let missing = |name: &str| MetgetGribError::Truncated( format!("missing section {name}"));

    Ok( GribMessage {
        indicator,
        identification: identification.ok_or_else(|| missing("1"))?,
        grid: grid.ok_or_else(|| missing("3"))?,
        product: product.ok_or_else(|| missing("4"))?,
        representation: representation.ok_or_else(|| missing("5"))?,
        bitmap: bitmap.unwrap_or( Bitmap { indicator: 255, data: Vec::new() }),
        data: data.ok_or_else(|| missing("7"))?,
    })
}

fn read_identification (body: &[u8])->Result<Identification> {
    let mut c = ByteCursor::new(body);

    let centre_id = c.u16()?;
    let subcentre_id = c.u16()?;
    let master_table_version = c.u8()?;
    let local_table_version = c.u8()?;
    let _significance = c.u8()?;
    let year = c.u16()? as i32;
    let month = c.u8()? as u32;
    let day = c.u8()? as u32;
    let hour = c.u8()? as u32;
    let minute = c.u8()? as u32;
    let second = c.u8()? as u32;
    let prod_status = c.u8()?;
    let data_type = c.u8()?;

    let ref_time = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .map(|ndt| DateTime::from_naive_utc_and_offset(ndt, Utc))
        .ok_or_else(|| MetgetGribError::DecodeError( format!("invalid reference time {year}-{month}-{day}")))?;

    Ok( Identification {
        centre_id, subcentre_id, master_table_version, local_table_version,
        ref_time, prod_status, data_type,
    })
}

const ANGLE_SCALE: f64 = 1.0e-6;

fn read_grid_definition (body: &[u8])->Result<GridDefinition> {
    let mut c = ByteCursor::new(body);

    let _source = c.u8()?;
    let _num_points = c.u32()?;
    let num_list_size = c.u8()? as usize;
    let _num_list_interpretation = c.u8()?;
    let template_number = c.u16()?;

    if template_number != 0 {
        return Ok( GridDefinition::Unsupported(template_number))
    }

    c.skip(16)?; // earth shape parameters
    let ni = c.u32()? as usize;
    let nj = c.u32()? as usize;
    let _basic_angle = c.u32()?;
    let _basic_angle_subdiv = c.u32()?;
    let lat1 = c.i32_grib()? as f64 * ANGLE_SCALE;
    let lon1 = c.i32_grib()? as f64 * ANGLE_SCALE;
    let _res_flags = c.u8()?;
    let lat2 = c.i32_grib()? as f64 * ANGLE_SCALE;
    let lon2 = c.i32_grib()? as f64 * ANGLE_SCALE;
    let di = c.u32()? as f64 * ANGLE_SCALE;
    let dj = c.u32()? as f64 * ANGLE_SCALE;
    let scanning_mode = c.u8()?;

    Ok( GridDefinition::LatLon( LatLonGrid {
        ni, nj, lat1, lon1, lat2, lon2, di, dj, scanning_mode,
    }))
}

fn read_product_definition (body: &[u8])->Result<ProductDefinition> {
    let mut c = ByteCursor::new(body);

    let _num_coordinates = c.u16()?;
    let template_number = c.u16()?;

    // templates 4.0 (instant) and 4.8 (accumulation) share the leading layout
    let category = c.u8()?;
    let parameter = c.u8()?;
    let _process_type = c.u8()?;
    let _background_id = c.u8()?;
    let _process_id = c.u8()?;
    let _cutoff_hours = c.u16()?;
    let _cutoff_minutes = c.u8()?;
    let _time_unit = c.u8()?;
    let _forecast_time = c.u32()?;
    let surface1_type = c.u8()?;
    let surface1_scale = c.i8_grib()?;
    let surface1_scaled = c.u32()?;

    let surface1_value = surface1_scaled as f64 * 10f64.powi( -(surface1_scale as i32));

    Ok( ProductDefinition {
        template_number, category, parameter, surface1_type, surface1_value,
    })
}

fn read_data_representation (body: &[u8])->Result<DataRepresentation> {
    let mut c = ByteCursor::new(body);

    let num_points = c.u32()? as usize;
    let template_number = c.u16()?;

    let read_simple = |c: &mut ByteCursor|->Result<SimplePacking> {
        Ok( SimplePacking {
            reference_value: c.f32()?,
            binary_scale_factor: c.i16_grib()?,
            decimal_scale_factor: c.i16_grib()?,
            num_bits: c.u8()? as usize,
            values_type: c.u8()?,
        })
    };

    let read_complex = |c: &mut ByteCursor|->Result<ComplexPacking> {
        let simple = read_simple(c)?;
        Ok( ComplexPacking {
            simple,
            group_method: c.u8()?,
            missing_value_management: c.u8()?,
            missing_primary: c.u32()?,
            missing_secondary: c.u32()?,
            groups: GroupDefinition {
                num_groups: c.u32()? as usize,
                group_widths_reference: c.u8()?,
                group_widths_num_bits: c.u8()? as usize,
                group_lengths_reference: c.u32()?,
                group_lengths_increment: c.u8()?,
                group_lengths_last: c.u32()?,
                group_scaled_lengths_num_bits: c.u8()? as usize,
            },
        })
    };

    let packing = match template_number {
        0 => Packing::Simple( read_simple(&mut c)?),
        2 => Packing::Complex( read_complex(&mut c)?),
        3 => {
            let complex = read_complex(&mut c)?;
            Packing::ComplexSpatialDiff( SpatialDiffPacking {
                complex,
                order: c.u8()?,
                descriptor_octets: c.u8()? as usize,
            })
        }
        n => Packing::Unsupported(n),
    };

    Ok( DataRepresentation { num_points, template_number, packing })
}

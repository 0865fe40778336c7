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

//! synthetic GRIB2 assembly shared by the pipeline tests

pub struct TestProduct {
    pub discipline: u8,
    pub category: u8,
    pub parameter: u8,
    pub surface_type: u8,
    pub surface_value: u32,
    /// constant field value (packed as the reference with zero data bits)
    pub value: f32,
}

pub struct TestGrid {
    pub ni: u32,
    pub nj: u32,
    pub lat1: f64,
    pub lon1: f64,
    pub di: f64,
    pub dj: f64,
    /// present-point bitmap; None = all points present
    pub bitmap: Option<Vec<u8>>,
}

/// one message per product, all on the same grid, scanning south to north
pub fn build_grib_file (grid: &TestGrid, products: &[TestProduct])->Vec<u8> {
    let mut buf = Vec::new();
    for product in products {
        buf.extend( build_message( grid, product));
    }
    buf
}

fn build_message (grid: &TestGrid, product: &TestProduct)->Vec<u8> {
    let mut sections: Vec<Vec<u8>> = Vec::new();

    //--- section 1
    let mut s1 = Vec::new();
    s1.extend( 7u16.to_be_bytes());
    s1.extend( 0u16.to_be_bytes());
    s1.extend( [2u8, 1, 1]);
    s1.extend( 2023u16.to_be_bytes());
    s1.extend( [1u8, 1, 0, 0, 0]);
    s1.extend( [0u8, 1]);
    sections.push( section( 1, s1));

    //--- section 3: lat/lon template 3.0
    let mut s3 = Vec::new();
    s3.push(0);
    s3.extend( (grid.ni * grid.nj).to_be_bytes());
    s3.extend( [0u8, 0]);
    s3.extend( 0u16.to_be_bytes());
    s3.extend( [0u8; 16]);
    s3.extend( grid.ni.to_be_bytes());
    s3.extend( grid.nj.to_be_bytes());
    s3.extend( 0u32.to_be_bytes());
    s3.extend( 0u32.to_be_bytes());
    s3.extend( micro(grid.lat1).to_be_bytes());
    s3.extend( micro(grid.lon1).to_be_bytes());
    s3.push(48);
    s3.extend( micro( grid.lat1 + grid.dj * (grid.nj - 1) as f64).to_be_bytes());
    s3.extend( micro( grid.lon1 + grid.di * (grid.ni - 1) as f64).to_be_bytes());
    s3.extend( micro(grid.di).to_be_bytes());
    s3.extend( micro(grid.dj).to_be_bytes());
    s3.push(0x40); // scan: i east, j south to north
    sections.push( section( 3, s3));

    //--- section 4: template 4.0
    let mut s4 = Vec::new();
    s4.extend( 0u16.to_be_bytes());
    s4.extend( 0u16.to_be_bytes());
    s4.push( product.category);
    s4.push( product.parameter);
    s4.extend( [2u8, 0, 0]);
    s4.extend( 0u16.to_be_bytes());
    s4.push(0);
    s4.push(1);
    s4.extend( 0u32.to_be_bytes());
    s4.push( product.surface_type);
    s4.push(0);
    s4.extend( product.surface_value.to_be_bytes());
    s4.push(255);
    s4.push(0);
    s4.extend( 0u32.to_be_bytes());
    sections.push( section( 4, s4));

    let num_points = match &grid.bitmap {
        Some(bits) => count_bits(bits),
        None => (grid.ni * grid.nj) as usize,
    };

    //--- section 5: simple packing, zero data bits (constant field)
    let mut s5 = Vec::new();
    s5.extend( (num_points as u32).to_be_bytes());
    s5.extend( 0u16.to_be_bytes());
    s5.extend( product.value.to_be_bytes());
    s5.extend( 0u16.to_be_bytes());
    s5.extend( 0u16.to_be_bytes());
    s5.push(0);
    s5.push(0);
    sections.push( section( 5, s5));

    //--- section 6
    let mut s6 = Vec::new();
    match &grid.bitmap {
        Some(bits) => { s6.push(0); s6.extend_from_slice(bits); }
        None => { s6.push(255); }
    }
    sections.push( section( 6, s6));

    //--- section 7: empty for zero-bit packing
    sections.push( section( 7, Vec::new()));

    let body_length: usize = sections.iter().map(|s| s.len()).sum();
    let total_length = 16 + body_length + 4;

    let mut buf = Vec::new();
    buf.extend( b"GRIB");
    buf.extend( [0u8, 0]);
    buf.push( product.discipline);
    buf.push(2);
    buf.extend( (total_length as u64).to_be_bytes());
    for s in sections {
        buf.extend(s);
    }
    buf.extend( b"7777");
    buf
}

fn section (number: u8, body: Vec<u8>)->Vec<u8> {
    let mut s = Vec::with_capacity( body.len() + 5);
    s.extend( ((body.len() + 5) as u32).to_be_bytes());
    s.push(number);
    s.extend(body);
    s
}

/// grib sign-and-magnitude microdegrees
fn micro (v: f64)->u32 {
    let magnitude = (v.abs() * 1e6).round() as u32;
    if v < 0.0 { magnitude | 0x8000_0000 } else { magnitude }
}

fn count_bits (bytes: &[u8])->usize {
    bytes.iter().map(|b| b.count_ones() as usize).sum()
}

/// the standard wind+pressure product set: u = `u`, v = `v`, prmsl = `press` Pa
pub fn wind_pressure_products (u: f32, v: f32, press_pa: f32)->Vec<TestProduct> {
    vec![
        TestProduct { discipline: 0, category: 2, parameter: 2, surface_type: 103, surface_value: 10, value: u },
        TestProduct { discipline: 0, category: 2, parameter: 3, surface_type: 103, surface_value: 10, value: v },
        TestProduct { discipline: 0, category: 3, parameter: 1, surface_type: 101, surface_value: 0, value: press_pa },
    ]
}

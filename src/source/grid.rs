//! KMA village-forecast grid projection
//!
//! Converts WGS84 coordinates into the 5 km Lambert conformal conic grid
//! used by the village forecast API (`nx`, `ny`).

use crate::Result;
use crate::error::DigestError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const EARTH_RADIUS_KM: f64 = 6371.00877;
const GRID_SPACING_KM: f64 = 5.0;
const STANDARD_PARALLEL_1: f64 = 30.0;
const STANDARD_PARALLEL_2: f64 = 60.0;
const ORIGIN_LONGITUDE: f64 = 126.0;
const ORIGIN_LATITUDE: f64 = 38.0;
const ORIGIN_X: f64 = 43.0;
const ORIGIN_Y: f64 = 136.0;

/// Forecast grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPoint {
    pub nx: u32,
    pub ny: u32,
}

/// Project latitude/longitude onto the forecast grid
pub fn to_grid(latitude: f64, longitude: f64) -> Result<GridPoint> {
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(DigestError::config(format!(
            "Coordinates out of range: lat={latitude}, lon={longitude}"
        )));
    }

    let deg = PI / 180.0;
    let re = EARTH_RADIUS_KM / GRID_SPACING_KM;
    let slat1 = STANDARD_PARALLEL_1 * deg;
    let slat2 = STANDARD_PARALLEL_2 * deg;
    let olon = ORIGIN_LONGITUDE * deg;
    let olat = ORIGIN_LATITUDE * deg;

    let sn = ((PI * 0.25 + slat2 * 0.5).tan() / (PI * 0.25 + slat1 * 0.5).tan()).ln();
    let sn = (slat1.cos() / slat2.cos()).ln() / sn;
    let sf = (PI * 0.25 + slat1 * 0.5).tan().powf(sn) * slat1.cos() / sn;
    let ro = re * sf / (PI * 0.25 + olat * 0.5).tan().powf(sn);

    let ra = re * sf / (PI * 0.25 + latitude * deg * 0.5).tan().powf(sn);
    let mut theta = longitude * deg - olon;
    if theta > PI {
        theta -= 2.0 * PI;
    }
    if theta < -PI {
        theta += 2.0 * PI;
    }
    theta *= sn;

    let x = (ra * theta.sin() + ORIGIN_X + 0.5).floor();
    let y = (ro - ra * theta.cos() + ORIGIN_Y + 0.5).floor();

    if !x.is_finite() || !y.is_finite() || x < 1.0 || y < 1.0 {
        return Err(DigestError::config(format!(
            "Coordinates lat={latitude}, lon={longitude} fall outside the forecast grid"
        )));
    }

    Ok(GridPoint {
        nx: x as u32,
        ny: y as u32,
    })
}

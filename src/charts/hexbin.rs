//! Hexagonal Binning Module
//! Aggregates collision coordinates into pointy-top hexagonal cells for the
//! density layer. Points are projected into a local plane (longitude scaled by
//! the cosine of the mean latitude) so cells are metrically regular, then
//! mapped back to latitude/longitude for plotting.

use std::collections::HashMap;

/// Cell radius (center to corner) in degrees of latitude. Roughly 100 m at
/// street scale.
pub const DEFAULT_RADIUS_DEG: f64 = 0.0009;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// One populated hexagonal cell.
#[derive(Debug, Clone)]
pub struct HexBin {
    /// Cell center as (latitude, longitude).
    pub center: (f64, f64),
    /// Corner ring as (latitude, longitude), counter-clockwise.
    pub corners: [(f64, f64); 6],
    pub count: usize,
}

/// Bin (latitude, longitude) points into hexagonal cells of the given radius.
///
/// Every point lands in exactly one cell; cells with no points are not
/// reported. Output is ordered by cell coordinate so repeated calls over the
/// same input agree.
pub fn bin_points(points: &[(f64, f64)], radius_deg: f64) -> Vec<HexBin> {
    if points.is_empty() || radius_deg <= 0.0 {
        return Vec::new();
    }

    let mean_lat = points.iter().map(|p| p.0).sum::<f64>() / points.len() as f64;
    let lon_scale = mean_lat.to_radians().cos().abs().max(1e-6);

    let mut cells: HashMap<(i64, i64), usize> = HashMap::new();
    for &(lat, lon) in points {
        let x = lon * lon_scale;
        let y = lat;
        let qf = (SQRT_3 / 3.0 * x - y / 3.0) / radius_deg;
        let rf = (2.0 / 3.0 * y) / radius_deg;
        *cells.entry(axial_round(qf, rf)).or_insert(0) += 1;
    }

    let mut keys: Vec<(i64, i64)> = cells.keys().copied().collect();
    keys.sort_unstable();

    keys.into_iter()
        .map(|key| {
            let (q, r) = (key.0 as f64, key.1 as f64);
            let cx = radius_deg * (SQRT_3 * q + SQRT_3 / 2.0 * r);
            let cy = radius_deg * 1.5 * r;

            let mut corners = [(0.0, 0.0); 6];
            for (i, corner) in corners.iter_mut().enumerate() {
                // Pointy-top corners sit at 30 + 60*i degrees.
                let angle = (60.0 * i as f64 + 30.0).to_radians();
                let x = cx + radius_deg * angle.cos();
                let y = cy + radius_deg * angle.sin();
                *corner = (y, x / lon_scale);
            }

            HexBin {
                center: (cy, cx / lon_scale),
                corners,
                count: cells[&key],
            }
        })
        .collect()
}

fn axial_round(qf: f64, rf: f64) -> (i64, i64) {
    let sf = -qf - rf;
    let mut q = qf.round();
    let mut r = rf.round();
    let s = sf.round();

    let dq = (q - qf).abs();
    let dr = (r - rf).abs();
    let ds = (s - sf).abs();

    if dq > dr && dq > ds {
        q = -r - s;
    } else if dr > ds {
        r = -q - s;
    }
    (q as i64, r as i64)
}

//! Coordinate reference systems and the transforms between them.
//!
//! Accident positions are published in S-JTSK / Krovak East North
//! (EPSG:5514). Transforms go from there to WGS84 (EPSG:4326, as
//! longitude/latitude degrees) and on to Web Mercator (EPSG:3857).
//! The datum shift is the three-parameter translation used by the
//! EPSG:5514 definition, good to a few metres.

use std::f64::consts::{FRAC_PI_4, PI};
use std::fmt;
use std::sync::OnceLock;

use crate::model::{AccidentError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Crs {
    /// S-JTSK / Krovak East North, metres.
    Sjtsk,
    /// Longitude, latitude in degrees.
    Wgs84,
    /// Pseudo-Mercator, metres.
    WebMercator,
}

impl Crs {
    pub fn epsg(self) -> u32 {
        match self {
            Crs::Sjtsk => 5514,
            Crs::Wgs84 => 4326,
            Crs::WebMercator => 3857,
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

// ---------------------------------------------------------------------------
// Ellipsoids
// ---------------------------------------------------------------------------

const BESSEL_A: f64 = 6_377_397.155;
const BESSEL_E2: f64 = 0.006_674_372_230_614;
const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// S-JTSK → WGS84 geocentric translation, metres.
const TOWGS84: [f64; 3] = [589.0, 76.0, 480.0];

// ---------------------------------------------------------------------------
// Krovak projection
// ---------------------------------------------------------------------------

struct Krovak {
    e: f64,
    b: f64,
    t0: f64,
    n: f64,
    r0: f64,
    lambda0: f64,
    alpha: f64,
    phi_p: f64,
}

fn krovak() -> &'static Krovak {
    static PARAMS: OnceLock<Krovak> = OnceLock::new();
    PARAMS.get_or_init(|| {
        let e = BESSEL_E2.sqrt();
        let phi_c = 49.5f64.to_radians();
        let phi_p = 78.5f64.to_radians();
        let k_p = 0.9999;

        let b = (1.0 + BESSEL_E2 * phi_c.cos().powi(4) / (1.0 - BESSEL_E2)).sqrt();
        let a = BESSEL_A * (1.0 - BESSEL_E2).sqrt() / (1.0 - BESSEL_E2 * phi_c.sin().powi(2));
        let gamma0 = (phi_c.sin() / b).asin();
        let t0 = (FRAC_PI_4 + gamma0 / 2.0).tan()
            * ((1.0 + e * phi_c.sin()) / (1.0 - e * phi_c.sin())).powf(e * b / 2.0)
            / (FRAC_PI_4 + phi_c / 2.0).tan().powf(b);

        Krovak {
            e,
            b,
            t0,
            n: phi_p.sin(),
            r0: k_p * a / phi_p.tan(),
            lambda0: 24.833_333_333_333_33f64.to_radians(),
            alpha: 30.288_139_722_222_22f64.to_radians(),
            phi_p,
        }
    })
}

/// EPSG:5514 easting/northing → Bessel latitude/longitude (radians).
fn krovak_inverse(x: f64, y: f64) -> (f64, f64) {
    let k = krovak();
    // EPSG:5514 axes are the negated Krovak southing/westing
    let southing = -y;
    let westing = -x;

    let r = southing.hypot(westing);
    let theta = westing.atan2(southing);
    let d = theta / k.phi_p.sin();
    let t = 2.0 * (((k.r0 / r).powf(1.0 / k.n) * (FRAC_PI_4 + k.phi_p / 2.0).tan()).atan() - FRAC_PI_4);
    let u = (k.alpha.cos() * t.sin() - k.alpha.sin() * t.cos() * d.cos()).asin();
    let v = (t.cos() * d.sin() / u.cos()).asin();

    let mut phi = u;
    for _ in 0..15 {
        let next = 2.0
            * ((k.t0.powf(-1.0 / k.b)
                * (u / 2.0 + FRAC_PI_4).tan().powf(1.0 / k.b)
                * ((1.0 + k.e * phi.sin()) / (1.0 - k.e * phi.sin())).powf(k.e / 2.0))
            .atan()
                - FRAC_PI_4);
        let done = (next - phi).abs() < 1e-12;
        phi = next;
        if done {
            break;
        }
    }

    (phi, k.lambda0 - v / k.b)
}

/// Bessel geodetic → geocentric, translate, → WGS84 geodetic (radians).
fn bessel_to_wgs84(phi: f64, lambda: f64) -> (f64, f64) {
    let n = BESSEL_A / (1.0 - BESSEL_E2 * phi.sin().powi(2)).sqrt();
    let x = n * phi.cos() * lambda.cos() + TOWGS84[0];
    let y = n * phi.cos() * lambda.sin() + TOWGS84[1];
    let z = n * (1.0 - BESSEL_E2) * phi.sin() + TOWGS84[2];

    let e2 = WGS84_F * (2.0 - WGS84_F);
    let p = x.hypot(y);
    let mut lat = z.atan2(p * (1.0 - e2));
    for _ in 0..10 {
        let n = WGS84_A / (1.0 - e2 * lat.sin().powi(2)).sqrt();
        lat = (z + e2 * n * lat.sin()).atan2(p);
    }
    (lat, y.atan2(x))
}

fn sjtsk_to_wgs84(x: f64, y: f64) -> (f64, f64) {
    let (phi, lambda) = krovak_inverse(x, y);
    let (lat, lon) = bessel_to_wgs84(phi, lambda);
    (lon.to_degrees(), lat.to_degrees())
}

fn wgs84_to_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let x = WGS84_A * lon.to_radians();
    let y = WGS84_A * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

fn mercator_to_wgs84(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / WGS84_A).to_degrees();
    let lat = (2.0 * (y / WGS84_A).exp().atan() - PI / 2.0).to_degrees();
    (lon, lat)
}

/// Transforms one point. Transforms into S-JTSK are not supported.
pub fn transform(point: (f64, f64), from: Crs, to: Crs) -> Result<(f64, f64)> {
    let (x, y) = point;
    match (from, to) {
        (a, b) if a == b => Ok(point),
        (Crs::Sjtsk, Crs::Wgs84) => Ok(sjtsk_to_wgs84(x, y)),
        (Crs::Sjtsk, Crs::WebMercator) => {
            let (lon, lat) = sjtsk_to_wgs84(x, y);
            Ok(wgs84_to_mercator(lon, lat))
        }
        (Crs::Wgs84, Crs::WebMercator) => Ok(wgs84_to_mercator(x, y)),
        (Crs::WebMercator, Crs::Wgs84) => Ok(mercator_to_wgs84(x, y)),
        (from, to) => Err(AccidentError::UnsupportedTransform {
            from: from.to_string(),
            to: to.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_prague_and_brno_land_where_expected() {
        // Old Town Prague and central Brno, within ~50 m
        let (lon, lat) = transform((-743_000.0, -1_043_000.0), Crs::Sjtsk, Crs::Wgs84).unwrap();
        assert_abs_diff_eq!(lat, 50.0874, epsilon = 5e-4);
        assert_abs_diff_eq!(lon, 14.4187, epsilon = 5e-4);

        let (lon, lat) = transform((-598_000.0, -1_160_000.0), Crs::Sjtsk, Crs::Wgs84).unwrap();
        assert_abs_diff_eq!(lat, 49.2020, epsilon = 5e-4);
        assert_abs_diff_eq!(lon, 16.6091, epsilon = 5e-4);
    }

    #[test]
    fn test_sjtsk_to_web_mercator() {
        let (x, y) = transform((-598_000.0, -1_160_000.0), Crs::Sjtsk, Crs::WebMercator).unwrap();
        assert_abs_diff_eq!(x, 1_848_918.0, epsilon = 60.0);
        assert_abs_diff_eq!(y, 6_309_211.0, epsilon = 60.0);
    }

    #[test]
    fn test_mercator_roundtrip_and_identity() {
        let p = (16.6, 49.2);
        let m = transform(p, Crs::Wgs84, Crs::WebMercator).unwrap();
        let back = transform(m, Crs::WebMercator, Crs::Wgs84).unwrap();
        assert_abs_diff_eq!(back.0, p.0, epsilon = 1e-9);
        assert_abs_diff_eq!(back.1, p.1, epsilon = 1e-9);
        assert_eq!(transform(p, Crs::Wgs84, Crs::Wgs84).unwrap(), p);
    }

    #[test]
    fn test_transform_into_sjtsk_is_unsupported() {
        let err = transform((16.6, 49.2), Crs::Wgs84, Crs::Sjtsk).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported transform from EPSG:4326 to EPSG:5514");
    }
}

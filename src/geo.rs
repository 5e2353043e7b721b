//! Coordinate math for parcel geometry.
//!
//! Parcel rings are stored with `x` = longitude and `y` = latitude, in degrees of
//! the spatial reference system the geometry was requested in. Distances assume
//! geographic coordinates (EPSG:4326 / EPSG:4258).

use serde::{Deserialize, Serialize};

/// Mean Earth radius, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// A point with `x` = longitude and `y` = latitude.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Great-circle distance between two points, in meters (haversine formula).
pub fn haversine_m(a: Point, b: Point) -> f64 {
    let (lat_a, lon_a) = (a.y.to_radians(), a.x.to_radians());
    let (lat_b, lon_b) = (b.y.to_radians(), b.x.to_radians());
    let dlat = lat_b - lat_a;
    let dlon = lon_b - lon_a;
    let h = (dlat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Lengths of the edges of a ring, in meters.
///
/// Each vertex is paired with the previous one; the first vertex is paired with
/// the last, closing the ring. Empty rings yield no edges.
pub fn edge_lengths(ring: &[Point]) -> Vec<f64> {
    if ring.is_empty() {
        return vec![];
    }
    (0..ring.len())
        .map(|idx| {
            let prev = if idx == 0 { ring.len() - 1 } else { idx - 1 };
            haversine_m(ring[prev], ring[idx])
        })
        .collect()
}

/// Total length of a ring's edges, in meters, or [`None`] for an empty ring.
pub fn ring_perimeter(ring: &[Point]) -> Option<f64> {
    let edges = edge_lengths(ring);
    if edges.is_empty() {
        None
    } else {
        Some(edges.iter().sum())
    }
}

/// Arithmetic mean of a set of points, or [`None`] if there are none.
pub fn mean_point(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    Some(Point {
        x: points.iter().map(|p| p.x).sum::<f64>() / n,
        y: points.iter().map(|p| p.y).sum::<f64>() / n,
    })
}

/// Whether `point` lies inside the ring, by ray casting.
///
/// Points exactly on an edge may fall on either side.
pub fn ring_contains(ring: &[Point], point: Point) -> bool {
    let mut inside = false;
    let mut j = ring.len().wrapping_sub(1);
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_madrid_barcelona() {
        let madrid = Point::new(-3.7038, 40.4168);
        let barcelona = Point::new(2.1734, 41.3851);
        let d = haversine_m(madrid, barcelona);
        // Roughly 505 km.
        assert!((d - 505_000.0).abs() < 5_000.0, "got {d}");
    }

    #[test]
    fn test_haversine_zero() {
        let p = Point::new(-3.7, 40.4);
        assert_eq!(haversine_m(p, p), 0.0);
    }

    #[test]
    fn test_edge_lengths_pairing() {
        // A thin triangle; three vertices give three edges, first paired with last.
        let ring = [
            Point::new(0.0, 0.0),
            Point::new(0.001, 0.0),
            Point::new(0.001, 0.001),
        ];
        let edges = edge_lengths(&ring);
        assert_eq!(edges.len(), 3);
        assert!(edges.iter().all(|e| *e > 0.0));
        let perimeter = ring_perimeter(&ring).unwrap();
        assert!((perimeter - edges.iter().sum::<f64>()).abs() < 1e-9);
    }

    #[test]
    fn test_empty_ring() {
        assert!(edge_lengths(&[]).is_empty());
        assert!(ring_perimeter(&[]).is_none());
        assert!(mean_point(&[]).is_none());
    }

    #[test]
    fn test_mean_point() {
        let points = [Point::new(0.0, 0.0), Point::new(2.0, 4.0)];
        let mean = mean_point(&points).unwrap();
        assert_eq!(mean, Point::new(1.0, 2.0));
    }

    #[test]
    fn test_ring_contains() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        assert!(ring_contains(&square, Point::new(0.5, 0.5)));
        assert!(!ring_contains(&square, Point::new(1.5, 0.5)));
        assert!(!ring_contains(&square, Point::new(-0.1, 0.9)));
    }
}

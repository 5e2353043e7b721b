//! Exporters for parcels: JSON, CSV and GeoJSON.

use crate::parcel::Parcel;
use anyhow::{Context, Error};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

/// Serialize parcels as a pretty-printed JSON array.
pub fn to_json(parcels: &[Parcel]) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(parcels)?)
}

/// Write [`to_json`] output to a file.
pub fn write_json(parcels: &[Parcel], path: impl AsRef<Path>) -> Result<(), Error> {
    let path = path.as_ref();
    fs::write(path, to_json(parcels)?).with_context(|| format!("unable to write {}", path.display()))
}

/// Serialize parcels as CSV, one row per parcel.
///
/// Geometry is omitted; use [`to_geojson`] for coordinates.
pub fn to_csv(parcels: &[Parcel]) -> String {
    let mut out = String::from(
        "reference,province,municipality,kind,built_area,area,perimeter_m,centroid_x,centroid_y\n",
    );
    for parcel in parcels {
        let row = [
            csv_field(&parcel.reference),
            csv_field(&parcel.province),
            csv_field(&parcel.municipality),
            parcel.kind.to_string(),
            parcel.built_area.to_string(),
            parcel.area.to_string(),
            parcel
                .perimeter()
                .map(|p| p.to_string())
                .unwrap_or_default(),
            parcel.centroid.x.to_string(),
            parcel.centroid.y.to_string(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Write [`to_csv`] output to a file.
pub fn write_csv(parcels: &[Parcel], path: impl AsRef<Path>) -> Result<(), Error> {
    let path = path.as_ref();
    fs::write(path, to_csv(parcels)).with_context(|| format!("unable to write {}", path.display()))
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.into()
    }
}

/// Serialize parcels as a GeoJSON `FeatureCollection` of polygons.
///
/// Exterior rings are closed (the first vertex repeated at the end) as GeoJSON
/// requires.
pub fn to_geojson(parcels: &[Parcel]) -> Value {
    let features: Vec<Value> = parcels
        .iter()
        .map(|parcel| {
            let mut ring: Vec<[f64; 2]> =
                parcel.geometry.iter().map(|p| [p.x, p.y]).collect();
            if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
                if first != last {
                    ring.push(first);
                }
            }
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [ring],
                },
                "properties": {
                    "reference": parcel.reference,
                    "province": parcel.province,
                    "municipality": parcel.municipality,
                    "kind": parcel.kind,
                    "built_area": parcel.built_area,
                    "area": parcel.area,
                    "sketch_url": parcel.sketch_url,
                },
            })
        })
        .collect();
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Write [`to_geojson`] output to a file.
pub fn write_geojson(parcels: &[Parcel], path: impl AsRef<Path>) -> Result<(), Error> {
    let path = path.as_ref();
    fs::write(path, serde_json::to_string_pretty(&to_geojson(parcels))?)
        .with_context(|| format!("unable to write {}", path.display()))
}

//! Interactive map rendering.
//!
//! Produces a self-contained HTML page plotting parcel boundaries with Leaflet
//! (loaded from its CDN), with one popup per parcel. The view is centered on the
//! mean of the parcel centroids; an empty set falls back to a view of Spain.

use crate::export;
use crate::geo::{mean_point, Point};
use crate::parcel::Parcel;
use anyhow::{Context, Error};
use std::fs;
use std::path::Path;

const LEAFLET_VERSION: &str = "1.9.4";

// Puerta del Sol, the conventional center of Spain.
const FALLBACK_CENTER: Point = Point {
    x: -3.7038,
    y: 40.4168,
};

/// Render parcels as a standalone Leaflet HTML page.
pub fn map_html(parcels: &[Parcel], title: &str) -> Result<String, Error> {
    let centroids: Vec<Point> = parcels.iter().map(|parcel| parcel.centroid).collect();
    let (center, zoom) = match mean_point(&centroids) {
        Some(center) => (center, 17),
        None => (FALLBACK_CENTER, 6),
    };
    let geojson = serde_json::to_string(&export::to_geojson(parcels))?;
    let title = escape_html(title);

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8"/>
<title>{title}</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@{version}/dist/leaflet.css"/>
<script src="https://unpkg.com/leaflet@{version}/dist/leaflet.js"></script>
<style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
var map = L.map("map").setView([{lat}, {lon}], {zoom});
L.tileLayer("https://tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png", {{
    attribution: "&copy; OpenStreetMap contributors | Dirección General del Catastro"
}}).addTo(map);
var parcels = {geojson};
L.geoJSON(parcels, {{
    onEachFeature: function (feature, layer) {{
        var p = feature.properties;
        layer.bindPopup(
            "<b>" + p.reference + "</b><br/>" +
            p.municipality + " (" + p.province + ")<br/>" +
            p.kind + ", " + p.area + " m&sup2;"
        );
    }}
}}).addTo(map);
</script>
</body>
</html>
"#,
        version = LEAFLET_VERSION,
        lat = center.y,
        lon = center.x,
        zoom = zoom,
        geojson = geojson,
    ))
}

/// Write [`map_html`] output to a file.
pub fn write_map(parcels: &[Parcel], title: &str, path: impl AsRef<Path>) -> Result<(), Error> {
    let path = path.as_ref();
    fs::write(path, map_html(parcels, title)?)
        .with_context(|| format!("unable to write {}", path.display()))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::sample_parcel;

    #[test]
    fn test_map_contains_parcel() {
        let html = map_html(&[sample_parcel()], "Gran Vía 1").unwrap();
        assert!(html.contains("leaflet"));
        assert!(html.contains("1541506VK4714B0002PK"));
        // Centered on the parcel's centroid.
        assert!(html.contains("setView([40.0005, -3.0005], 17)"));
        assert!(html.contains("<title>Gran Vía 1</title>"));
    }

    #[test]
    fn test_empty_map_falls_back_to_spain() {
        let html = map_html(&[], "empty").unwrap();
        assert!(html.contains("setView([40.4168, -3.7038], 6)"));
        assert!(html.contains("\"features\":[]"));
    }

    #[test]
    fn test_title_is_escaped() {
        let html = map_html(&[], "<script>x</script>").unwrap();
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
    }
}

//! GML parsing for the INSPIRE WFS responses.
//!
//! The `GetParcel` stored query returns a `cp:CadastralParcel` with a reference
//! point, an exterior ring and the official area; `GetBuildingPartByParcel`
//! returns one `bu-ext2d:BuildingPart` per building volume. Both are read with a
//! streaming `quick_xml` event loop keyed on local element names, since the
//! services are inconsistent about namespace prefixes.
//!
//! GML geographic coordinates arrive in `lat lon` axis order; points are stored
//! with `x` = longitude and `y` = latitude.

use super::{BuildingPart, FloorCounts, ParcelGeometry};
use crate::geo::Point;
use anyhow::{Context, Error};
use quick_xml::events::Event;
use quick_xml::Reader;

/// The local part of a possibly namespace-prefixed element name.
fn local_name(raw: &[u8]) -> String {
    let name = String::from_utf8_lossy(raw);
    match name.rsplit_once(':') {
        Some((_, local)) => local.to_string(),
        None => name.to_string(),
    }
}

/// Split a `lat lon lat lon ...` coordinate list into points with `x` = lon.
fn parse_pos_list(text: &str) -> Result<Vec<Point>, Error> {
    let coords: Vec<f64> = text
        .split_whitespace()
        .map(|token| {
            token
                .parse::<f64>()
                .with_context(|| format!("malformed coordinate {token:?}"))
        })
        .collect::<Result<_, _>>()?;
    if coords.len() % 2 != 0 {
        return Err(Error::msg(format!(
            "coordinate list holds an odd number of values ({})",
            coords.len()
        )));
    }
    Ok(coords
        .chunks_exact(2)
        .map(|pair| Point::new(pair[1], pair[0]))
        .collect())
}

/// Parse the response of the `GetParcel` stored query.
pub(crate) fn parse_parcel_geometry(xml: &str) -> Result<ParcelGeometry, Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut current_tag = String::new();
    let mut in_reference_point = false;
    let mut in_exterior = false;

    let mut reference_point: Option<Point> = None;
    let mut exterior: Option<Vec<Point>> = None;
    let mut area: Option<f64> = None;

    loop {
        match reader
            .read_event_into(&mut buf)
            .context("malformed WFS response")?
        {
            Event::Start(ref e) => {
                let name = local_name(e.name().as_ref());
                match name.as_str() {
                    "referencePoint" => in_reference_point = true,
                    "exterior" => in_exterior = true,
                    _ => {}
                }
                current_tag = name;
            }
            Event::Text(ref e) => {
                let text = e.unescape().unwrap_or_default();
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                match current_tag.as_str() {
                    "pos" if in_reference_point => {
                        reference_point = parse_pos_list(text)?.into_iter().next();
                    }
                    "posList" if in_exterior => {
                        exterior = Some(parse_pos_list(text)?);
                    }
                    "areaValue" => {
                        area = Some(
                            text.parse()
                                .with_context(|| format!("malformed area value {text:?}"))?,
                        );
                    }
                    _ => {}
                }
            }
            Event::End(ref e) => match local_name(e.name().as_ref()).as_str() {
                "referencePoint" => in_reference_point = false,
                "exterior" => in_exterior = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(ParcelGeometry {
        reference_point: reference_point
            .ok_or_else(|| Error::msg("the WFS response contains no reference point"))?,
        exterior: exterior.ok_or_else(|| Error::msg("the WFS response contains no exterior ring"))?,
        area: area.ok_or_else(|| Error::msg("the WFS response contains no area value"))?,
    })
}

/// Parse the response of the `GetBuildingPartByParcel` stored query.
///
/// A parcel without building parts (rustic land, bare plots) yields the zero
/// aggregate rather than an error.
pub(crate) fn parse_building_parts(xml: &str) -> Result<FloorCounts, Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut current_tag = String::new();
    let mut current: Option<BuildingPart> = None;
    let mut parts: Vec<BuildingPart> = Vec::new();

    loop {
        match reader
            .read_event_into(&mut buf)
            .context("malformed WFS response")?
        {
            Event::Start(ref e) => {
                let name = local_name(e.name().as_ref());
                if name == "BuildingPart" {
                    let id = e.attributes().flatten().find_map(|attr| {
                        (local_name(attr.key.as_ref()) == "id")
                            .then(|| String::from_utf8_lossy(&attr.value).to_string())
                    });
                    current = Some(BuildingPart {
                        id,
                        floors_above_ground: None,
                        floors_below_ground: 0,
                    });
                }
                current_tag = name;
            }
            Event::Text(ref e) => {
                let Some(part) = current.as_mut() else {
                    continue;
                };
                let text = e.unescape().unwrap_or_default();
                let text = text.trim();
                match current_tag.as_str() {
                    "numberOfFloorsAboveGround" => match text.parse() {
                        Ok(floors) => part.floors_above_ground = Some(floors),
                        Err(err) => {
                            tracing::warn!("malformed floor count {text:?}: {err}");
                        }
                    },
                    "numberOfFloorsBelowGround" => match text.parse() {
                        Ok(floors) => part.floors_below_ground = floors,
                        Err(err) => {
                            tracing::warn!("malformed floor count {text:?}: {err}");
                        }
                    },
                    _ => {}
                }
            }
            Event::End(ref e) => {
                if local_name(e.name().as_ref()) == "BuildingPart" {
                    if let Some(part) = current.take() {
                        parts.push(part);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(FloorCounts {
        above_ground: parts.iter().filter_map(|part| part.floors_above_ground).max(),
        below_ground: parts
            .iter()
            .map(|part| part.floors_below_ground)
            .max()
            .unwrap_or(0),
        parts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARCEL: &str = r#"<?xml version="1.0" encoding="utf-8"?>
    <FeatureCollection xmlns:gml="http://www.opengis.net/gml/3.2"
                       xmlns:cp="http://inspire.ec.europa.eu/schemas/cp/4.0">
      <member>
        <cp:CadastralParcel gml:id="ES.SDGC.CP.1541506VK4714B">
          <cp:areaValue uom="m2">425</cp:areaValue>
          <cp:geometry>
            <gml:MultiSurface>
              <gml:surfaceMember>
                <gml:Surface>
                  <gml:patches>
                    <gml:PolygonPatch>
                      <gml:exterior>
                        <gml:LinearRing>
                          <gml:posList srsDimension="2">40.0 -3.0 40.0 -3.001 40.001 -3.001 40.001 -3.0</gml:posList>
                        </gml:LinearRing>
                      </gml:exterior>
                    </gml:PolygonPatch>
                  </gml:patches>
                </gml:Surface>
              </gml:surfaceMember>
            </gml:MultiSurface>
          </cp:geometry>
          <cp:referencePoint>
            <gml:Point gml:id="ES.SDGC.CP.1541506VK4714B_P">
              <gml:pos>40.0005 -3.0005</gml:pos>
            </gml:Point>
          </cp:referencePoint>
        </cp:CadastralParcel>
      </member>
    </FeatureCollection>"#;

    const BUILDING: &str = r#"<?xml version="1.0" encoding="utf-8"?>
    <gml:FeatureCollection xmlns:gml="http://www.opengis.net/gml/3.2"
                           xmlns:bu-ext2d="http://inspire.jrc.ec.europa.eu/schemas/bu-ext2d/2.0">
      <gml:featureMember>
        <bu-ext2d:BuildingPart gml:id="ES.SDGC.BU.1541506VK4714B_part1">
          <bu-ext2d:numberOfFloorsAboveGround>5</bu-ext2d:numberOfFloorsAboveGround>
          <bu-ext2d:numberOfFloorsBelowGround>1</bu-ext2d:numberOfFloorsBelowGround>
        </bu-ext2d:BuildingPart>
      </gml:featureMember>
      <gml:featureMember>
        <bu-ext2d:BuildingPart gml:id="ES.SDGC.BU.1541506VK4714B_part2">
          <bu-ext2d:numberOfFloorsAboveGround>3</bu-ext2d:numberOfFloorsAboveGround>
          <bu-ext2d:numberOfFloorsBelowGround>2</bu-ext2d:numberOfFloorsBelowGround>
        </bu-ext2d:BuildingPart>
      </gml:featureMember>
    </gml:FeatureCollection>"#;

    #[test]
    fn test_parse_parcel_geometry() {
        let geometry = parse_parcel_geometry(PARCEL).unwrap();
        // Axis order on the wire is lat lon; stored points are x = lon, y = lat.
        assert_eq!(geometry.reference_point, Point::new(-3.0005, 40.0005));
        assert_eq!(geometry.exterior.len(), 4);
        assert_eq!(geometry.exterior[0], Point::new(-3.0, 40.0));
        assert_eq!(geometry.exterior[2], Point::new(-3.001, 40.001));
        assert_eq!(geometry.area, 425.0);
    }

    #[test]
    fn test_parse_building_parts() {
        let counts = parse_building_parts(BUILDING).unwrap();
        assert_eq!(counts.parts.len(), 2);
        assert_eq!(counts.above_ground, Some(5));
        assert_eq!(counts.below_ground, 2);
        assert_eq!(counts.total(), Some(7));
        assert_eq!(
            counts.parts[0].id.as_deref(),
            Some("ES.SDGC.BU.1541506VK4714B_part1")
        );
    }

    #[test]
    fn test_empty_feature_collection() {
        let xml = r#"<FeatureCollection xmlns:gml="http://www.opengis.net/gml/3.2"></FeatureCollection>"#;
        assert!(parse_parcel_geometry(xml).is_err());
        let counts = parse_building_parts(xml).unwrap();
        assert!(counts.parts.is_empty());
        assert_eq!(counts.total(), None);
    }

    #[test]
    fn test_malformed_coordinates() {
        let xml = PARCEL.replace("40.0005 -3.0005", "north west");
        assert!(parse_parcel_geometry(&xml).is_err());
    }

    #[test]
    fn test_unpaired_coordinate_is_an_error() {
        let xml = PARCEL.replace(
            "40.001 -3.001 40.001 -3.0",
            "40.001 -3.001 40.001 -3.0 40.002",
        );
        let err = parse_parcel_geometry(&xml).unwrap_err().to_string();
        assert!(err.contains("odd number"), "{err}");
    }
}

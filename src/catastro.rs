//! Facilities for pulling data from the Catastro web services.

use crate::geo::Point;
use anyhow::Error;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

mod client;
mod gml;
mod local;
mod wire;

pub use client::{Client, Endpoints};
pub use local::LocalClient;

/// A Catastro client.
///
/// Implemented by the live HTTP [`Client`] and by [`LocalClient`], which serves
/// the same payloads from the local file system.
#[async_trait]
pub trait Catastro: Send + Sync {
    /// List the names of the Spanish provinces known to the Catastro.
    async fn provinces(&self) -> Result<Vec<String>, Error>;

    /// List municipalities of a province, optionally filtering by name.
    ///
    /// The province may be given by its colloquial Castilian name; it is mapped
    /// to the official name the service expects. An unknown province is an error
    /// listing the valid ones.
    async fn municipalities(
        &self,
        province: &str,
        filter: Option<&str>,
    ) -> Result<Vec<String>, Error>;

    /// List the streets of a municipality.
    async fn streets(&self, province: &str, municipality: &str)
        -> Result<Vec<StreetEntry>, Error>;

    /// Look up a parcel by its 20-character cadastral reference.
    ///
    /// If the reference resolves to more than one cadastral reference
    /// (`control.cudnp > 1`), this is an error directing the caller to
    /// [`MetaParcel`](crate::parcel::MetaParcel).
    async fn parcel_by_reference(&self, rc: &str) -> Result<ParcelRecord, Error>;

    /// Look up a rustic parcel by province, municipality, polygon and plot
    /// number.
    async fn parcel_by_plot(
        &self,
        province: &str,
        municipality: &str,
        polygon: &str,
        plot: &str,
    ) -> Result<ParcelRecord, Error>;

    /// Look up an urban parcel by address.
    ///
    /// The street name is validated against the municipality's street catalogue
    /// first; a number the service does not know is an error carrying the
    /// numbers it suggests instead.
    async fn parcel_by_address(
        &self,
        province: &str,
        municipality: &str,
        road_type: RoadType,
        street: &str,
        number: &str,
    ) -> Result<ParcelRecord, Error>;

    /// All cadastral references behind a reference, without the single-parcel
    /// restriction of [`parcel_by_reference`](Self::parcel_by_reference).
    async fn references_by_reference(&self, rc: &str) -> Result<Vec<String>, Error>;

    /// All cadastral references at a polygon/plot location.
    async fn references_by_plot(
        &self,
        province: &str,
        municipality: &str,
        polygon: &str,
        plot: &str,
    ) -> Result<Vec<String>, Error>;

    /// All cadastral references at an address.
    async fn references_by_address(
        &self,
        province: &str,
        municipality: &str,
        road_type: RoadType,
        street: &str,
        number: &str,
    ) -> Result<Vec<String>, Error>;

    /// Fetch the geometry of a parcel from the INSPIRE WFS, in the given
    /// spatial reference system.
    async fn parcel_geometry(&self, rc: &str, srs: Srs) -> Result<ParcelGeometry, Error>;

    /// Fetch per-part floor counts for the buildings on a parcel.
    async fn building_floors(&self, rc: &str) -> Result<FloorCounts, Error>;

    /// The URL of the parcel sketch (croquis) for a cadastral reference.
    fn sketch_url(&self, rc: &str) -> String;
}

/// The spatial reference systems the WFS services accept.
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    Deserialize,
    Serialize,
)]
pub enum Srs {
    /// WGS 84 geographic coordinates, the default.
    #[strum(serialize = "EPSG:4326")]
    #[serde(rename = "EPSG:4326")]
    Wgs84,
    /// ETRS89 geographic coordinates.
    #[strum(serialize = "EPSG:4258")]
    #[serde(rename = "EPSG:4258")]
    Etrs89,
    /// ETRS89 / UTM zone 29N.
    #[strum(serialize = "EPSG:25829")]
    #[serde(rename = "EPSG:25829")]
    Utm29,
    /// ETRS89 / UTM zone 30N.
    #[strum(serialize = "EPSG:25830")]
    #[serde(rename = "EPSG:25830")]
    Utm30,
    /// ETRS89 / UTM zone 31N.
    #[strum(serialize = "EPSG:25831")]
    #[serde(rename = "EPSG:25831")]
    Utm31,
}

impl Default for Srs {
    fn default() -> Self {
        Self::Wgs84
    }
}

impl FromStr for Srs {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::iter()
            .find(|srs| srs.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                Error::msg(format!(
                    "unknown spatial reference system {s}; the supported systems are: {}",
                    Self::iter()
                        .map(|srs| srs.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}

/// Whether a parcel is urban or rustic land.
#[derive(
    Clone, Copy, Debug, Display, PartialEq, Eq, Hash, EnumString, Deserialize, Serialize,
)]
pub enum ParcelKind {
    Urban,
    Rustic,
}

impl ParcelKind {
    /// Decode the `cn` field of the Callejero responses: `"RU"` marks rustic
    /// land, anything else is urban.
    pub fn from_code(code: Option<&str>) -> Self {
        if code == Some("RU") {
            Self::Rustic
        } else {
            Self::Urban
        }
    }
}

/// Road-type abbreviations used by the Catastro street catalogue.
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    Deserialize,
    Serialize,
)]
pub enum RoadType {
    AL,
    AV,
    BO,
    CJ,
    CL,
    CM,
    CR,
    CS,
    CT,
    GL,
    GV,
    LG,
    PG,
    PJ,
    PQ,
    PS,
    PZ,
    RB,
    RD,
    TR,
    UR,
    VI,
}

impl FromStr for RoadType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::iter()
            .find(|road| road.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                Error::msg(format!(
                    "unknown road type {s}; the valid siglas are: {}",
                    Self::iter()
                        .map(|road| format!("{road} ({})", road.name()))
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}

impl RoadType {
    /// The full Castilian name of this road type.
    pub fn name(&self) -> &'static str {
        use RoadType::*;
        match self {
            AL => "Aldea",
            AV => "Avenida",
            BO => "Barrio",
            CJ => "Callejón",
            CL => "Calle",
            CM => "Camino",
            CR => "Carretera",
            CS => "Caserío",
            CT => "Cuesta",
            GL => "Glorieta",
            GV => "Gran Vía",
            LG => "Lugar",
            PG => "Polígono",
            PJ => "Pasaje",
            PQ => "Parque",
            PS => "Paseo",
            PZ => "Plaza",
            RB => "Rambla",
            RD => "Ronda",
            TR => "Travesía",
            UR => "Urbanización",
            VI => "Vía",
        }
    }
}

/// Colloquial Castilian province names mapped to the names the service uses.
const PROVINCE_ALIASES: &[(&str, &str)] = &[
    ("Alicante", "ALACANT"),
    ("Coruña", "A CORUÑA"),
    ("Gerona", "GIRONA"),
    ("Guipúzcoa", "GIPUZKOA"),
    ("Lérida", "LLEIDA"),
    ("Orense", "OURENSE"),
    ("Vizcaya", "BIZKAIA"),
];

/// The official spelling of a province name, resolving colloquial aliases.
///
/// Comparison is on the uppercased forms, so accented input matches its alias
/// in any case ("Lérida", "LÉRIDA", "lérida").
pub fn official_province(name: &str) -> String {
    let folded = name.to_uppercase();
    for (alias, official) in PROVINCE_ALIASES {
        if alias.to_uppercase() == folded {
            return (*official).into();
        }
    }
    folded
}

/// Resolve a province name against the known list, or fail listing the valid
/// provinces.
pub(crate) fn check_province(province: &str, known: &[String]) -> Result<String, Error> {
    let official = official_province(province);
    if known.iter().any(|name| name.eq_ignore_ascii_case(&official)) {
        Ok(official)
    } else {
        Err(Error::msg(format!(
            "the province {province} does not exist; the provinces of Spain are: {}",
            known.join(", ")
        )))
    }
}

/// A street in a municipality's catalogue.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct StreetEntry {
    /// The road-type abbreviation (this stays a string: the live catalogue uses
    /// more siglas than [`RoadType`] enumerates).
    pub road_type: String,
    /// The street name as the service spells it.
    pub name: String,
}

impl Display for StreetEntry {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} {}", self.road_type, self.name)
    }
}

/// A subdivision of a parcel: a construction unit (urban) or subplot (rustic).
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Region {
    /// Use description (urban) or crop description (rustic).
    pub description: String,
    /// Surface in square meters.
    pub area: f64,
}

/// Location detail of a parcel, depending on its kind.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum ParcelLocation {
    /// Address of an urban parcel.
    Urban {
        /// Road type and street name, e.g. `"CL GRAN VIA"`.
        street: String,
        /// Street number.
        number: String,
        /// Construction year, as reported.
        built_year: Option<String>,
        /// Main use class (residential, commercial, ...).
        use_class: Option<String>,
    },
    /// Polygon/plot location of a rustic parcel.
    Rustic {
        polygon: String,
        plot: String,
        /// The place (paraje) name, if any.
        place_name: Option<String>,
    },
}

/// A parcel as returned by the Callejero lookups, before geometry is attached.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ParcelRecord {
    /// The 20-character cadastral reference.
    pub reference: String,
    pub province: String,
    pub municipality: String,
    pub kind: ParcelKind,
    pub location: ParcelLocation,
    /// Construction units or subplots making up the parcel.
    pub regions: Vec<Region>,
}

impl ParcelRecord {
    /// Sum of the region surfaces, in square meters.
    pub fn built_area(&self) -> f64 {
        self.regions.iter().map(|region| region.area).sum()
    }
}

/// Parcel geometry from the WFS `GetParcel` stored query.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ParcelGeometry {
    /// The official reference point of the parcel.
    pub reference_point: Point,
    /// Vertices of the exterior ring.
    pub exterior: Vec<Point>,
    /// Official parcel area in square meters.
    pub area: f64,
}

/// Floor counts of one building part.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct BuildingPart {
    /// The `gml:id` of the part, if present.
    pub id: Option<String>,
    pub floors_above_ground: Option<u32>,
    pub floors_below_ground: u32,
}

/// Aggregated floor counts for the buildings on a parcel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FloorCounts {
    /// Maximum floors above ground over all parts, if any part reports them.
    pub above_ground: Option<u32>,
    /// Maximum floors below ground over all parts.
    pub below_ground: u32,
    /// Per-part detail.
    pub parts: Vec<BuildingPart>,
}

impl FloorCounts {
    /// Total floors of the tallest column of the building, if known.
    pub fn total(&self) -> Option<u32> {
        self.above_ground.map(|above| above + self.below_ground)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_srs_roundtrip() {
        for srs in Srs::iter() {
            assert_eq!(srs.to_string().parse::<Srs>().unwrap(), srs);
        }
        assert_eq!("EPSG:4326".parse::<Srs>().unwrap(), Srs::Wgs84);
        assert_eq!("epsg:25830".parse::<Srs>().unwrap(), Srs::Utm30);
    }

    #[test]
    fn test_unknown_srs_lists_choices() {
        let err = "EPSG:3857".parse::<Srs>().unwrap_err().to_string();
        assert!(err.contains("EPSG:3857"), "{err}");
        for srs in Srs::iter() {
            assert!(err.contains(&srs.to_string()), "{err}");
        }
    }

    #[test]
    fn test_parcel_kind_from_code() {
        assert_eq!(ParcelKind::from_code(Some("RU")), ParcelKind::Rustic);
        assert_eq!(ParcelKind::from_code(Some("UR")), ParcelKind::Urban);
        assert_eq!(ParcelKind::from_code(None), ParcelKind::Urban);
    }

    #[test]
    fn test_road_type_parse() {
        assert_eq!("CL".parse::<RoadType>().unwrap(), RoadType::CL);
        assert_eq!("pz".parse::<RoadType>().unwrap(), RoadType::PZ);
        assert_eq!(RoadType::CL.name(), "Calle");
    }

    #[test]
    fn test_unknown_road_type_lists_siglas() {
        let err = "XX".parse::<RoadType>().unwrap_err().to_string();
        assert!(err.contains("XX"), "{err}");
        assert!(err.contains("CL (Calle)"), "{err}");
        assert!(err.contains("PZ (Plaza)"), "{err}");
    }

    #[test]
    fn test_official_province() {
        assert_eq!(official_province("Gerona"), "GIRONA");
        assert_eq!(official_province("gerona"), "GIRONA");
        assert_eq!(official_province("Madrid"), "MADRID");
    }

    #[test]
    fn test_official_province_folds_accents() {
        assert_eq!(official_province("GUIPÚZCOA"), "GIPUZKOA");
        assert_eq!(official_province("LÉRIDA"), "LLEIDA");
        assert_eq!(official_province("lérida"), "LLEIDA");
    }

    #[test]
    fn test_check_province() {
        let known = vec!["MADRID".to_string(), "GIRONA".to_string()];
        assert_eq!(check_province("Gerona", &known).unwrap(), "GIRONA");
        let err = check_province("Narnia", &known).unwrap_err().to_string();
        assert!(err.contains("Narnia"), "{err}");
        assert!(err.contains("MADRID, GIRONA"), "{err}");
    }

    #[test]
    fn test_built_area_sums_regions() {
        let record = ParcelRecord {
            reference: "1541506VK4714B0002PK".into(),
            province: "MADRID".into(),
            municipality: "MADRID".into(),
            kind: ParcelKind::Urban,
            location: ParcelLocation::Urban {
                street: "CL GRAN VIA".into(),
                number: "1".into(),
                built_year: Some("1920".into()),
                use_class: Some("Residencial".into()),
            },
            regions: vec![
                Region {
                    description: "VIVIENDA".into(),
                    area: 32.0,
                },
                Region {
                    description: "ELEMENTOS COMUNES".into(),
                    area: 7.5,
                },
            ],
        };
        assert_eq!(record.built_area(), 39.5);
    }

    #[test]
    fn test_floor_totals() {
        let counts = FloorCounts {
            above_ground: Some(5),
            below_ground: 2,
            parts: vec![],
        };
        assert_eq!(counts.total(), Some(7));
        assert_eq!(FloorCounts::default().total(), None);
    }
}

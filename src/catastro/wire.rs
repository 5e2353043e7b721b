//! Wire types for the OVC Callejero JSON service.
//!
//! Responses arrive as a single-key envelope named after the operation
//! (`consulta_dnprcResult`, `consulta_dnpppResult`, ...) wrapping the same deeply
//! nested payload. The serde types below mirror the service's field names; the
//! functions at the bottom turn decoded payloads into the crate's domain types
//! and are shared by the HTTP and local clients.

use super::{ParcelKind, ParcelLocation, ParcelRecord, Region, StreetEntry};
use crate::error::ServerError;
use anyhow::Error;
use derive_more::Into;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Decode a raw response body.
///
/// Empty bodies and bodies that are not JSON are server errors carrying the raw
/// payload, as some Catastro failure modes respond with HTML.
pub(crate) fn decode<C: DeserializeOwned>(body: &[u8]) -> Result<C, Error> {
    if body.is_empty() {
        return Err(ServerError::empty_response().into());
    }
    serde_json::from_slice(body).map_err(|_| ServerError::not_json(body).into())
}

/// Envelope of `Consulta_DNPRC` responses.
#[derive(Clone, Debug, Deserialize, Serialize, Into)]
pub(crate) struct DnprcResponse {
    #[serde(rename = "consulta_dnprcResult")]
    result: ConsultaDnp,
}

/// Envelope of `Consulta_DNPPP` responses.
#[derive(Clone, Debug, Deserialize, Serialize, Into)]
pub(crate) struct DnpppResponse {
    #[serde(rename = "consulta_dnpppResult")]
    result: ConsultaDnp,
}

/// Envelope of `Consulta_DNPLOC` responses.
#[derive(Clone, Debug, Deserialize, Serialize, Into)]
pub(crate) struct DnplocResponse {
    #[serde(rename = "consulta_dnplocResult")]
    result: ConsultaDnp,
}

/// The parcel-lookup payload, shared by the three `Consulta_DNP*` operations.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub(crate) struct ConsultaDnp {
    #[serde(default)]
    pub control: Option<Control>,
    #[serde(default)]
    pub lerr: Option<Lerr>,
    #[serde(default)]
    pub bico: Option<Bico>,
    #[serde(default)]
    pub lrcdnp: Option<Lrcdnp>,
    #[serde(default)]
    pub numerero: Option<Numerero>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
pub(crate) struct Control {
    /// Number of cadastral references matched by the query.
    #[serde(default)]
    pub cudnp: Option<u32>,
}

/// The service's error list.
///
/// Depending on the endpoint this is either a bare list of errors or a
/// `{"err": [...]}` wrapper.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub(crate) enum Lerr {
    Wrapped { err: Vec<WireError> },
    List(Vec<WireError>),
}

impl Lerr {
    pub fn first(&self) -> Option<&WireError> {
        match self {
            Self::Wrapped { err } => err.first(),
            Self::List(list) => list.first(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct WireError {
    pub cod: String,
    pub des: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Bico {
    pub bi: Bi,
    /// Urban construction units.
    #[serde(default)]
    pub lcons: Option<Vec<Cons>>,
    /// Rustic subplots.
    #[serde(default)]
    pub lspr: Option<Vec<Spr>>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Bi {
    pub idbi: Idbi,
    pub dt: Dt,
    #[serde(default)]
    pub debi: Option<Debi>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Idbi {
    pub rc: RcParts,
    #[serde(default)]
    pub cn: Option<String>,
}

/// A cadastral reference, split across fields on the wire.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub(crate) struct RcParts {
    #[serde(default)]
    pub pc1: Option<String>,
    #[serde(default)]
    pub pc2: Option<String>,
    #[serde(default)]
    pub car: Option<String>,
    #[serde(default)]
    pub cc1: Option<String>,
    #[serde(default)]
    pub cc2: Option<String>,
}

impl RcParts {
    /// Reassemble the 20-character cadastral reference.
    pub fn join(&self) -> String {
        [&self.pc1, &self.pc2, &self.car, &self.cc1, &self.cc2]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect()
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Dt {
    /// Province name.
    #[serde(default)]
    pub np: Option<String>,
    /// Municipality name.
    #[serde(default)]
    pub nm: Option<String>,
    #[serde(default)]
    pub locs: Option<Locs>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub(crate) struct Locs {
    #[serde(default)]
    pub lous: Option<Lous>,
    #[serde(default)]
    pub lors: Option<Lors>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Lous {
    #[serde(default)]
    pub lourb: Option<Lourb>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Lourb {
    #[serde(default)]
    pub dir: Option<Dir>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub(crate) struct Dir {
    /// Road-type abbreviation.
    #[serde(default)]
    pub tv: Option<String>,
    /// Street name.
    #[serde(default)]
    pub nv: Option<String>,
    /// Street number.
    #[serde(default)]
    pub pnp: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Lors {
    #[serde(default)]
    pub lorus: Option<Lorus>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub(crate) struct Lorus {
    #[serde(default)]
    pub cpp: Option<Cpp>,
    /// Place (paraje) name.
    #[serde(default)]
    pub npa: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub(crate) struct Cpp {
    /// Polygon number.
    #[serde(default)]
    pub cpo: Option<String>,
    /// Plot number.
    #[serde(default)]
    pub cpa: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub(crate) struct Debi {
    /// Construction year.
    #[serde(default)]
    pub ant: Option<String>,
    /// Main use class.
    #[serde(default)]
    pub luso: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Cons {
    #[serde(default)]
    pub lcd: Option<String>,
    #[serde(default)]
    pub dfcons: Option<Dfcons>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub(crate) struct Dfcons {
    /// Surface of the construction unit, in square meters.
    #[serde(default)]
    pub stl: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Spr {
    #[serde(default)]
    pub dspr: Option<Dspr>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub(crate) struct Dspr {
    /// Crop description.
    #[serde(default)]
    pub dcc: Option<String>,
    /// Subplot surface, in square meters.
    #[serde(default)]
    pub ssp: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Lrcdnp {
    pub rcdnp: Vec<Rcdnp>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Rcdnp {
    pub rc: RcParts,
}

/// Suggested street numbers attached to error 43.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Numerero {
    pub nump: Vec<Nump>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Nump {
    pub num: Num,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub(crate) struct Num {
    #[serde(default)]
    pub pnp: Option<String>,
}

/// Envelope of `ObtenerProvincias` responses.
#[derive(Clone, Debug, Deserialize, Serialize, Into)]
pub(crate) struct ProvincieroResponse {
    #[serde(rename = "consulta_provincieroResult")]
    result: Provinciero,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Provinciero {
    #[serde(default)]
    pub lerr: Option<Lerr>,
    #[serde(default)]
    pub provinciero: Option<ProvList>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct ProvList {
    pub prov: Vec<Prov>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Prov {
    pub np: String,
}

/// Envelope of `ObtenerMunicipios` responses.
#[derive(Clone, Debug, Deserialize, Serialize, Into)]
pub(crate) struct MunicipieroResponse {
    #[serde(rename = "consulta_municipieroResult")]
    result: Municipiero,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Municipiero {
    #[serde(default)]
    pub lerr: Option<Lerr>,
    #[serde(default)]
    pub municipiero: Option<MuniList>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct MuniList {
    pub muni: Vec<Muni>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Muni {
    pub nm: String,
}

/// Envelope of `ObtenerCallejero` responses.
#[derive(Clone, Debug, Deserialize, Serialize, Into)]
pub(crate) struct CallejeroResponse {
    #[serde(rename = "consulta_callejeroResult")]
    result: Callejero,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Callejero {
    #[serde(default)]
    pub lerr: Option<Lerr>,
    #[serde(default)]
    pub callejero: Option<CalleList>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct CalleList {
    pub calle: Vec<Calle>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Calle {
    pub dir: Dir,
}

/// Fail on a reported `lerr` entry.
///
/// Error 43 ("the number does not exist") on address lookups carries a
/// `numerero` list of numbers the service knows; those are surfaced in the
/// message.
pub(crate) fn check(result: &ConsultaDnp) -> Result<(), Error> {
    let Some(err) = result.lerr.as_ref().and_then(Lerr::first) else {
        return Ok(());
    };
    if err.cod == "43" {
        if let Some(numerero) = &result.numerero {
            let suggested: Vec<&str> = numerero
                .nump
                .iter()
                .filter_map(|nump| nump.num.pnp.as_deref())
                .collect();
            return Err(ServerError::reported(
                err.cod.clone(),
                format!(
                    "{}; the service suggests these numbers instead: {}",
                    err.des,
                    suggested.join(", ")
                ),
            )
            .into());
        }
    }
    Err(ServerError::reported(err.cod.clone(), err.des.clone()).into())
}

fn cudnp(result: &ConsultaDnp) -> u32 {
    result
        .control
        .as_ref()
        .and_then(|control| control.cudnp)
        .unwrap_or(1)
}

fn multi_parcel_error() -> Error {
    Error::msg("this parcel has several cadastral references; use a MetaParcel")
}

/// The single cadastral reference a lookup resolved to.
///
/// `Consulta_DNPLOC` sometimes reports the match through `lrcdnp` rather than
/// `bico`; both shapes are accepted.
pub(crate) fn single_reference(result: &ConsultaDnp) -> Result<String, Error> {
    check(result)?;
    if cudnp(result) > 1 {
        return Err(multi_parcel_error());
    }
    if let Some(bico) = &result.bico {
        return Ok(bico.bi.idbi.rc.join());
    }
    if let Some(first) = result
        .lrcdnp
        .as_ref()
        .and_then(|lrcdnp| lrcdnp.rcdnp.first())
    {
        return Ok(first.rc.join());
    }
    Err(Error::msg("the response contains no cadastral reference"))
}

/// All cadastral references a lookup matched.
pub(crate) fn reference_list(result: &ConsultaDnp) -> Result<Vec<String>, Error> {
    check(result)?;
    if let Some(lrcdnp) = &result.lrcdnp {
        return Ok(lrcdnp.rcdnp.iter().map(|entry| entry.rc.join()).collect());
    }
    if let Some(bico) = &result.bico {
        return Ok(vec![bico.bi.idbi.rc.join()]);
    }
    Err(Error::msg("the response contains no cadastral reference"))
}

/// Build a [`ParcelRecord`] from a `Consulta_DNPRC` payload.
pub(crate) fn parcel_record(result: ConsultaDnp) -> Result<ParcelRecord, Error> {
    check(&result)?;
    if cudnp(&result) > 1 {
        return Err(multi_parcel_error());
    }
    let bico = result
        .bico
        .ok_or_else(|| Error::msg("the response contains no parcel data"))?;
    let bi = &bico.bi;
    let kind = ParcelKind::from_code(bi.idbi.cn.as_deref());
    let reference = bi.idbi.rc.join();

    let location = match kind {
        ParcelKind::Urban => {
            let dir = bi
                .dt
                .locs
                .as_ref()
                .and_then(|locs| locs.lous.as_ref())
                .and_then(|lous| lous.lourb.as_ref())
                .and_then(|lourb| lourb.dir.clone())
                .unwrap_or_default();
            let debi = bi.debi.clone().unwrap_or_default();
            ParcelLocation::Urban {
                street: format!(
                    "{} {}",
                    dir.tv.unwrap_or_default(),
                    dir.nv.unwrap_or_default()
                ),
                number: dir.pnp.unwrap_or_default(),
                built_year: debi.ant,
                use_class: debi.luso,
            }
        }
        ParcelKind::Rustic => {
            let lorus = bi
                .dt
                .locs
                .as_ref()
                .and_then(|locs| locs.lors.as_ref())
                .and_then(|lors| lors.lorus.clone())
                .unwrap_or_default();
            let cpp = lorus.cpp.unwrap_or_default();
            ParcelLocation::Rustic {
                polygon: cpp.cpo.unwrap_or_default(),
                plot: cpp.cpa.unwrap_or_default(),
                place_name: lorus.npa,
            }
        }
    };

    let regions = match kind {
        ParcelKind::Urban => bico
            .lcons
            .unwrap_or_default()
            .into_iter()
            .filter_map(|cons| {
                region(
                    cons.lcd.unwrap_or_default(),
                    cons.dfcons.unwrap_or_default().stl,
                    &reference,
                )
            })
            .collect(),
        ParcelKind::Rustic => bico
            .lspr
            .unwrap_or_default()
            .into_iter()
            .filter_map(|spr| {
                let dspr = spr.dspr.unwrap_or_default();
                region(dspr.dcc.unwrap_or_default(), dspr.ssp, &reference)
            })
            .collect(),
    };

    Ok(ParcelRecord {
        reference,
        province: bi.dt.np.clone().unwrap_or_default(),
        municipality: bi.dt.nm.clone().unwrap_or_default(),
        kind,
        location,
        regions,
    })
}

fn region(description: String, area: Option<String>, reference: &str) -> Option<Region> {
    let raw = area?;
    match raw.parse::<f64>() {
        Ok(area) => Some(Region { description, area }),
        Err(err) => {
            tracing::warn!("parcel {reference} has a malformed region surface {raw:?}: {err}");
            None
        }
    }
}

/// Province names from an `ObtenerProvincias` payload.
pub(crate) fn province_names(result: Provinciero) -> Result<Vec<String>, Error> {
    if let Some(err) = result.lerr.as_ref().and_then(Lerr::first) {
        return Err(ServerError::reported(err.cod.clone(), err.des.clone()).into());
    }
    Ok(result
        .provinciero
        .map(|list| list.prov.into_iter().map(|prov| prov.np).collect())
        .unwrap_or_default())
}

/// Municipality names from an `ObtenerMunicipios` payload.
pub(crate) fn municipality_names(result: Municipiero) -> Result<Vec<String>, Error> {
    if let Some(err) = result.lerr.as_ref().and_then(Lerr::first) {
        return Err(ServerError::reported(err.cod.clone(), err.des.clone()).into());
    }
    Ok(result
        .municipiero
        .map(|list| list.muni.into_iter().map(|muni| muni.nm).collect())
        .unwrap_or_default())
}

/// Street entries from an `ObtenerCallejero` payload.
pub(crate) fn street_entries(result: Callejero) -> Result<Vec<StreetEntry>, Error> {
    if let Some(err) = result.lerr.as_ref().and_then(Lerr::first) {
        return Err(ServerError::reported(err.cod.clone(), err.des.clone()).into());
    }
    Ok(result
        .callejero
        .map(|list| {
            list.calle
                .into_iter()
                .map(|calle| StreetEntry {
                    road_type: calle.dir.tv.unwrap_or_default(),
                    name: calle.dir.nv.unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catastro::ParcelLocation;

    const URBAN: &str = r#"{
        "consulta_dnprcResult": {
            "control": {"cudnp": 1, "cucons": 2},
            "bico": {
                "bi": {
                    "idbi": {
                        "cn": "UR",
                        "rc": {"pc1": "1541506", "pc2": "VK4714B", "car": "0002", "cc1": "P", "cc2": "K"}
                    },
                    "dt": {
                        "np": "MADRID",
                        "nm": "MADRID",
                        "locs": {"lous": {"lourb": {"dir": {"tv": "CL", "nv": "GRAN VIA", "pnp": "1"}}}}
                    },
                    "debi": {"ant": "1920", "luso": "Residencial"}
                },
                "lcons": [
                    {"lcd": "VIVIENDA", "dfcons": {"stl": "32"}},
                    {"lcd": "ELEMENTOS COMUNES", "dfcons": {"stl": "7.5"}}
                ]
            }
        }
    }"#;

    const RUSTIC: &str = r#"{
        "consulta_dnprcResult": {
            "control": {"cudnp": 1},
            "bico": {
                "bi": {
                    "idbi": {
                        "cn": "RU",
                        "rc": {"pc1": "28067A0", "pc2": "2300149", "car": "0000", "cc1": "F", "cc2": "J"}
                    },
                    "dt": {
                        "np": "MADRID",
                        "nm": "SAN MARTIN DE VALDEIGLESIAS",
                        "locs": {"lors": {"lorus": {"cpp": {"cpo": "23", "cpa": "149"}, "npa": "LAS SUERTES"}}}
                    }
                },
                "lspr": [
                    {"dspr": {"dcc": "E- Pastos", "ssp": "439732"}}
                ]
            }
        }
    }"#;

    #[test]
    fn test_urban_record() {
        let payload: ConsultaDnp = decode::<DnprcResponse>(URBAN.as_bytes()).unwrap().into();
        let record = parcel_record(payload).unwrap();
        assert_eq!(record.reference, "1541506VK4714B0002PK");
        assert_eq!(record.kind, ParcelKind::Urban);
        assert_eq!(record.province, "MADRID");
        assert_eq!(record.municipality, "MADRID");
        match &record.location {
            ParcelLocation::Urban {
                street,
                number,
                built_year,
                use_class,
            } => {
                assert_eq!(street, "CL GRAN VIA");
                assert_eq!(number, "1");
                assert_eq!(built_year.as_deref(), Some("1920"));
                assert_eq!(use_class.as_deref(), Some("Residencial"));
            }
            other => panic!("expected urban location, got {other:?}"),
        }
        assert_eq!(record.regions.len(), 2);
        assert_eq!(record.built_area(), 39.5);
    }

    #[test]
    fn test_rustic_record() {
        let payload: ConsultaDnp = decode::<DnprcResponse>(RUSTIC.as_bytes()).unwrap().into();
        let record = parcel_record(payload).unwrap();
        assert_eq!(record.reference, "28067A023001490000FJ");
        assert_eq!(record.kind, ParcelKind::Rustic);
        match &record.location {
            ParcelLocation::Rustic {
                polygon,
                plot,
                place_name,
            } => {
                assert_eq!(polygon, "23");
                assert_eq!(plot, "149");
                assert_eq!(place_name.as_deref(), Some("LAS SUERTES"));
            }
            other => panic!("expected rustic location, got {other:?}"),
        }
        assert_eq!(record.built_area(), 439_732.0);
    }

    #[test]
    fn test_reported_error() {
        let body = r#"{
            "consulta_dnprcResult": {
                "lerr": [{"cod": "16", "des": "LA REFERENCIA CATASTRAL NO EXISTE"}]
            }
        }"#;
        let payload: ConsultaDnp = decode::<DnprcResponse>(body.as_bytes()).unwrap().into();
        let err = parcel_record(payload).unwrap_err();
        let server = err.downcast_ref::<ServerError>().unwrap();
        assert_eq!(server.code.as_deref(), Some("16"));
    }

    #[test]
    fn test_wrapped_error_list() {
        let body = r#"{
            "consulta_dnprcResult": {
                "lerr": {"err": [{"cod": "4", "des": "NO HAY DATOS"}]}
            }
        }"#;
        let payload: ConsultaDnp = decode::<DnprcResponse>(body.as_bytes()).unwrap().into();
        assert!(check(&payload).is_err());
    }

    #[test]
    fn test_multiple_references_rejected() {
        let body = r#"{
            "consulta_dnprcResult": {
                "control": {"cudnp": 2},
                "lrcdnp": {"rcdnp": [
                    {"rc": {"pc1": "1541506", "pc2": "VK4714B", "car": "0001", "cc1": "A", "cc2": "B"}},
                    {"rc": {"pc1": "1541506", "pc2": "VK4714B", "car": "0002", "cc1": "P", "cc2": "K"}}
                ]}
            }
        }"#;
        let payload: ConsultaDnp = decode::<DnprcResponse>(body.as_bytes()).unwrap().into();
        assert!(single_reference(&payload).is_err());
        let refs = reference_list(&payload).unwrap();
        assert_eq!(
            refs,
            vec!["1541506VK4714B0001AB", "1541506VK4714B0002PK"]
        );
    }

    #[test]
    fn test_number_suggestions_on_error_43() {
        let body = r#"{
            "consulta_dnplocResult": {
                "lerr": [{"cod": "43", "des": "EL NUMERO NO EXISTE"}],
                "numerero": {"nump": [{"num": {"pnp": "2"}}, {"num": {"pnp": "4"}}]}
            }
        }"#;
        let payload: ConsultaDnp = decode::<DnplocResponse>(body.as_bytes()).unwrap().into();
        let err = single_reference(&payload).unwrap_err();
        assert!(err.to_string().contains("2, 4"), "got {err}");
    }

    #[test]
    fn test_empty_and_non_json_bodies() {
        let err = decode::<DnprcResponse>(b"").unwrap_err();
        assert!(err
            .downcast_ref::<ServerError>()
            .unwrap()
            .message
            .contains("empty"));

        let err = decode::<DnprcResponse>(b"<html>maintenance</html>").unwrap_err();
        assert!(err
            .downcast_ref::<ServerError>()
            .unwrap()
            .message
            .contains("maintenance"));
    }

    #[test]
    fn test_catalogue_payloads() {
        let provinces = r#"{
            "consulta_provincieroResult": {
                "provinciero": {"prov": [{"np": "MADRID"}, {"np": "GIRONA"}]}
            }
        }"#;
        let result: Provinciero = decode::<ProvincieroResponse>(provinces.as_bytes())
            .unwrap()
            .into();
        assert_eq!(province_names(result).unwrap(), vec!["MADRID", "GIRONA"]);

        let municipalities = r#"{
            "consulta_municipieroResult": {
                "municipiero": {"muni": [{"nm": "MADRID"}, {"nm": "ALCOBENDAS"}]}
            }
        }"#;
        let result: Municipiero = decode::<MunicipieroResponse>(municipalities.as_bytes())
            .unwrap()
            .into();
        assert_eq!(
            municipality_names(result).unwrap(),
            vec!["MADRID", "ALCOBENDAS"]
        );

        let streets = r#"{
            "consulta_callejeroResult": {
                "callejero": {"calle": [{"dir": {"tv": "CL", "nv": "GRAN VIA"}}]}
            }
        }"#;
        let result: Callejero = decode::<CallejeroResponse>(streets.as_bytes())
            .unwrap()
            .into();
        let entries = street_entries(result).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].to_string(), "CL GRAN VIA");
    }
}

//! A Catastro client backed by the public web services.

use super::{
    check_province, gml, official_province, wire, Catastro, FloorCounts, ParcelGeometry,
    ParcelRecord, RoadType, Srs, StreetEntry,
};
use anyhow::Error;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use surf::Url;

/// The service endpoints a [`Client`] talks to.
///
/// Defaults to the production Catastro services; tests point these at fixture
/// servers.
#[derive(Clone, Debug)]
pub struct Endpoints {
    /// The OVC Callejero JSON service. Operation names are appended, so the URL
    /// must end with a slash.
    pub callejero: Url,
    /// The INSPIRE WFS for cadastral parcels.
    pub parcel_wfs: Url,
    /// The INSPIRE WFS for buildings.
    pub building_wfs: Url,
    /// The parcel sketch (croquis) page.
    pub sketch: Url,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            callejero: "https://ovc.catastro.meh.es/OVCServWeb/OVCWcfCallejero/COVCCallejero.svc/json/"
                .parse()
                .unwrap(),
            parcel_wfs: "https://ovc.catastro.meh.es/INSPIRE/wfsCP.aspx".parse().unwrap(),
            building_wfs: "https://ovc.catastro.meh.es/INSPIRE/wfsBU.aspx".parse().unwrap(),
            sketch: "https://ovc.catastro.meh.es/OVCServWeb/OVCWcfLibres/OVCFXCC.svc/RecuperarCroquisRCDatos"
                .parse()
                .unwrap(),
        }
    }
}

/// A Catastro client.
pub struct Client {
    client: surf::Client,
    endpoints: Endpoints,
}

impl Client {
    /// Connect to the production Catastro services.
    pub fn new() -> Self {
        Self::with_endpoints(Endpoints::default())
    }

    /// Connect to custom service endpoints.
    pub fn with_endpoints(endpoints: Endpoints) -> Self {
        Self {
            client: surf::Client::new(),
            endpoints,
        }
    }

    fn callejero(&self, op: &str) -> Result<Request, Error> {
        Ok(Request::new(&self.client, self.endpoints.callejero.join(op)?))
    }

    /// Find the catalogue entry for a street, the way the service spells it.
    ///
    /// An exact (case-insensitive) name match wins; otherwise a single entry
    /// containing the requested name is accepted.
    async fn resolve_street(
        &self,
        province: &str,
        municipality: &str,
        road_type: RoadType,
        street: &str,
    ) -> Result<StreetEntry, Error> {
        let streets = self.streets(province, municipality).await?;
        match_street(&streets, road_type, street).cloned().ok_or_else(|| {
            Error::msg(format!(
                "the street {} {street} does not exist in {municipality}",
                road_type
            ))
        })
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the catalogue entry matching a road type and street name.
fn match_street<'a>(
    streets: &'a [StreetEntry],
    road_type: RoadType,
    name: &str,
) -> Option<&'a StreetEntry> {
    let sigla = road_type.to_string();
    let candidates: Vec<&StreetEntry> = streets
        .iter()
        .filter(|entry| entry.road_type.eq_ignore_ascii_case(&sigla))
        .collect();
    if let Some(exact) = candidates
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(name))
        .copied()
    {
        return Some(exact);
    }
    let needle = name.to_uppercase();
    candidates
        .into_iter()
        .find(|entry| entry.name.to_uppercase().contains(&needle))
}

#[async_trait]
impl Catastro for Client {
    async fn provinces(&self) -> Result<Vec<String>, Error> {
        let res: wire::ProvincieroResponse = self.callejero("ObtenerProvincias")?.json().await?;
        wire::province_names(res.into())
    }

    async fn municipalities(
        &self,
        province: &str,
        filter: Option<&str>,
    ) -> Result<Vec<String>, Error> {
        let known = self.provinces().await?;
        let official = check_province(province, &known)?;
        let mut req = self
            .callejero("ObtenerMunicipios")?
            .param("provincia", official);
        if let Some(filter) = filter {
            req = req.param("municipio", filter);
        }
        let res: wire::MunicipieroResponse = req.json().await?;
        wire::municipality_names(res.into())
    }

    async fn streets(
        &self,
        province: &str,
        municipality: &str,
    ) -> Result<Vec<StreetEntry>, Error> {
        let res: wire::CallejeroResponse = self
            .callejero("ObtenerCallejero")?
            .param("Provincia", official_province(province))
            .param("Municipio", municipality)
            .json()
            .await?;
        wire::street_entries(res.into())
    }

    async fn parcel_by_reference(&self, rc: &str) -> Result<ParcelRecord, Error> {
        let res: wire::DnprcResponse = self
            .callejero("Consulta_DNPRC")?
            .param("RefCat", rc)
            .json()
            .await?;
        wire::parcel_record(res.into())
    }

    async fn parcel_by_plot(
        &self,
        province: &str,
        municipality: &str,
        polygon: &str,
        plot: &str,
    ) -> Result<ParcelRecord, Error> {
        let res: wire::DnpppResponse = self
            .callejero("Consulta_DNPPP")?
            .param("Provincia", official_province(province))
            .param("Municipio", municipality)
            .param("Poligono", polygon)
            .param("Parcela", plot)
            .json()
            .await?;
        let rc = wire::single_reference(&res.into())?;
        self.parcel_by_reference(&rc).await
    }

    async fn parcel_by_address(
        &self,
        province: &str,
        municipality: &str,
        road_type: RoadType,
        street: &str,
        number: &str,
    ) -> Result<ParcelRecord, Error> {
        let entry = self
            .resolve_street(province, municipality, road_type, street)
            .await?;
        let res: wire::DnplocResponse = self
            .callejero("Consulta_DNPLOC")?
            .param("Provincia", official_province(province))
            .param("Municipio", municipality)
            .param("Sigla", entry.road_type.clone())
            .param("Calle", entry.name.clone())
            .param("Numero", number)
            .json()
            .await?;
        let rc = wire::single_reference(&res.into())?;
        self.parcel_by_reference(&rc).await
    }

    async fn references_by_reference(&self, rc: &str) -> Result<Vec<String>, Error> {
        let res: wire::DnprcResponse = self
            .callejero("Consulta_DNPRC")?
            .param("RefCat", rc)
            .json()
            .await?;
        wire::reference_list(&res.into())
    }

    async fn references_by_plot(
        &self,
        province: &str,
        municipality: &str,
        polygon: &str,
        plot: &str,
    ) -> Result<Vec<String>, Error> {
        let res: wire::DnpppResponse = self
            .callejero("Consulta_DNPPP")?
            .param("Provincia", official_province(province))
            .param("Municipio", municipality)
            .param("Poligono", polygon)
            .param("Parcela", plot)
            .json()
            .await?;
        wire::reference_list(&res.into())
    }

    async fn references_by_address(
        &self,
        province: &str,
        municipality: &str,
        road_type: RoadType,
        street: &str,
        number: &str,
    ) -> Result<Vec<String>, Error> {
        let entry = self
            .resolve_street(province, municipality, road_type, street)
            .await?;
        let res: wire::DnplocResponse = self
            .callejero("Consulta_DNPLOC")?
            .param("Provincia", official_province(province))
            .param("Municipio", municipality)
            .param("Sigla", entry.road_type.clone())
            .param("Calle", entry.name.clone())
            .param("Numero", number)
            .json()
            .await?;
        wire::reference_list(&res.into())
    }

    async fn parcel_geometry(&self, rc: &str, srs: Srs) -> Result<ParcelGeometry, Error> {
        let xml = Request::new(&self.client, self.endpoints.parcel_wfs.clone())
            .param("service", "wfs")
            .param("version", "2")
            .param("request", "getfeature")
            .param("STOREDQUERIE_ID", "GetParcel")
            .param("refcat", rc)
            .param("srsname", srs.to_string())
            .xml()
            .await?;
        gml::parse_parcel_geometry(&xml)
    }

    async fn building_floors(&self, rc: &str) -> Result<FloorCounts, Error> {
        let xml = Request::new(&self.client, self.endpoints.building_wfs.clone())
            .param("service", "WFS")
            .param("version", "2.0.0")
            .param("request", "GetFeature")
            .param("STOREDQUERIE_ID", "GetBuildingPartByParcel")
            .param("REFCAT", rc)
            .param("srsname", Srs::Wgs84.to_string())
            .xml()
            .await?;
        gml::parse_building_parts(&xml)
    }

    fn sketch_url(&self, rc: &str) -> String {
        let mut url = self.endpoints.sketch.clone();
        url.set_query(Some(&format!("refcat={rc}")));
        url.into()
    }
}

struct Request {
    builder: surf::RequestBuilder,
    params: HashMap<String, String>,
}

impl Request {
    fn new(client: &surf::Client, url: Url) -> Self {
        Self {
            builder: client.get(url),
            params: HashMap::default(),
        }
    }

    fn param(mut self, param: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(param.into(), value.into());
        self
    }

    async fn body(self) -> Result<Vec<u8>, Error> {
        tracing::info!(?self.builder, ?self.params, "Catastro request");
        self.builder
            .query(&self.params)
            .map_err(Error::msg)?
            .recv_bytes()
            .await
            .map_err(Error::msg)
    }

    async fn json<C: DeserializeOwned>(self) -> Result<C, Error> {
        wire::decode(&self.body().await?)
    }

    async fn xml(self) -> Result<String, Error> {
        let body = self.body().await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

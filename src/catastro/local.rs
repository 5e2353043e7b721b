//! A Catastro client which reads from the local file system instead of the web
//! services.
//!
//! The fixture tree stores the raw service payloads, so the decoding path is
//! exactly the one the live client uses:
//!
//! ```text
//! ROOT/
//!     provinces.json                          ObtenerProvincias payload
//!     municipalities/<province>.json          ObtenerMunicipios payload, keyed
//!                                             by the official province name
//!     streets/<province>/<municipality>.json  ObtenerCallejero payload
//!     parcels/<RC>.json                       Consulta_DNPRC payload
//!     plots/<province>-<municipality>-<polygon>-<plot>.json
//!     addresses/<province>-<municipality>-<sigla>-<street>-<number>.json
//!     geometry/<RC>-<SRS>.gml                 GetParcel response
//!     buildings/<RC>.gml                      GetBuildingPartByParcel response
//! ```
//!
//! Path components derived from user input are slugged: lowercased, with runs of
//! non-alphanumeric characters collapsed to `-`.

use super::{
    check_province, gml, wire, Catastro, FloorCounts, ParcelGeometry, ParcelRecord, RoadType, Srs,
    StreetEntry,
};
use anyhow::{Context, Error};
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};

/// A Catastro client which reads from the local file system.
pub struct LocalClient {
    root: PathBuf,
}

impl LocalClient {
    /// Open a local fixture tree.
    pub fn open(root: PathBuf) -> Self {
        Self { root }
    }

    fn read(&self, rel: impl AsRef<Path>) -> Result<Vec<u8>, Error> {
        let path = self.root.join(rel);
        tracing::info!("reading {}", path.display());
        fs::read(&path).with_context(|| format!("unable to read {}", path.display()))
    }

    fn read_dnprc(&self, rc: &str) -> Result<wire::DnprcResponse, Error> {
        wire::decode(&self.read(format!("parcels/{rc}.json"))?)
    }
}

/// Turn user input into a stable path component.
fn slug(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut dash = false;
    for c in value.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
            dash = false;
        } else if !dash && !out.is_empty() {
            out.push('-');
            dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

#[async_trait]
impl Catastro for LocalClient {
    async fn provinces(&self) -> Result<Vec<String>, Error> {
        let res: wire::ProvincieroResponse = wire::decode(&self.read("provinces.json")?)?;
        wire::province_names(res.into())
    }

    async fn municipalities(
        &self,
        province: &str,
        filter: Option<&str>,
    ) -> Result<Vec<String>, Error> {
        let known = self.provinces().await?;
        let official = check_province(province, &known)?;
        let res: wire::MunicipieroResponse =
            wire::decode(&self.read(format!("municipalities/{}.json", slug(&official)))?)?;
        let mut names = wire::municipality_names(res.into())?;
        if let Some(filter) = filter {
            let needle = filter.to_uppercase();
            names.retain(|name| name.to_uppercase().contains(&needle));
        }
        Ok(names)
    }

    async fn streets(
        &self,
        province: &str,
        municipality: &str,
    ) -> Result<Vec<StreetEntry>, Error> {
        let res: wire::CallejeroResponse = wire::decode(&self.read(format!(
            "streets/{}/{}.json",
            slug(province),
            slug(municipality)
        ))?)?;
        wire::street_entries(res.into())
    }

    async fn parcel_by_reference(&self, rc: &str) -> Result<ParcelRecord, Error> {
        wire::parcel_record(self.read_dnprc(rc)?.into())
    }

    async fn parcel_by_plot(
        &self,
        province: &str,
        municipality: &str,
        polygon: &str,
        plot: &str,
    ) -> Result<ParcelRecord, Error> {
        let res: wire::DnpppResponse = wire::decode(&self.read(format!(
            "plots/{}-{}-{polygon}-{plot}.json",
            slug(province),
            slug(municipality)
        ))?)?;
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
        let res: wire::DnplocResponse = wire::decode(&self.read(format!(
            "addresses/{}-{}-{}-{}-{number}.json",
            slug(province),
            slug(municipality),
            slug(&road_type.to_string()),
            slug(street)
        ))?)?;
        let rc = wire::single_reference(&res.into())?;
        self.parcel_by_reference(&rc).await
    }

    async fn references_by_reference(&self, rc: &str) -> Result<Vec<String>, Error> {
        wire::reference_list(&self.read_dnprc(rc)?.into())
    }

    async fn references_by_plot(
        &self,
        province: &str,
        municipality: &str,
        polygon: &str,
        plot: &str,
    ) -> Result<Vec<String>, Error> {
        let res: wire::DnpppResponse = wire::decode(&self.read(format!(
            "plots/{}-{}-{polygon}-{plot}.json",
            slug(province),
            slug(municipality)
        ))?)?;
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
        let res: wire::DnplocResponse = wire::decode(&self.read(format!(
            "addresses/{}-{}-{}-{}-{number}.json",
            slug(province),
            slug(municipality),
            slug(&road_type.to_string()),
            slug(street)
        ))?)?;
        wire::reference_list(&res.into())
    }

    async fn parcel_geometry(&self, rc: &str, srs: Srs) -> Result<ParcelGeometry, Error> {
        let srs = srs.to_string().replace(':', "-");
        let body = self.read(format!("geometry/{rc}-{srs}.gml"))?;
        gml::parse_parcel_geometry(&String::from_utf8_lossy(&body))
    }

    async fn building_floors(&self, rc: &str) -> Result<FloorCounts, Error> {
        let body = self.read(format!("buildings/{rc}.gml"))?;
        gml::parse_building_parts(&String::from_utf8_lossy(&body))
    }

    fn sketch_url(&self, rc: &str) -> String {
        format!("file://{}", self.root.join(format!("sketches/{rc}.html")).display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug() {
        assert_eq!(slug("San Martín de Valdeiglesias"), "san-martín-de-valdeiglesias");
        assert_eq!(slug("A CORUÑA"), "a-coruña");
        assert_eq!(slug("  Madrid  "), "madrid");
    }

    #[async_std::test]
    async fn test_provinces_from_fixture() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("provinces.json"),
            r#"{"consulta_provincieroResult": {"provinciero": {"prov": [{"np": "MADRID"}]}}}"#,
        )
        .unwrap();
        let client = LocalClient::open(dir.path().into());
        assert_eq!(client.provinces().await.unwrap(), vec!["MADRID"]);
    }

    #[async_std::test]
    async fn test_unknown_province_lists_valid_ones() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("provinces.json"),
            r#"{"consulta_provincieroResult": {"provinciero": {"prov": [{"np": "MADRID"}, {"np": "GIRONA"}]}}}"#,
        )
        .unwrap();
        fs::create_dir(dir.path().join("municipalities")).unwrap();
        fs::write(
            dir.path().join("municipalities/girona.json"),
            r#"{"consulta_municipieroResult": {"municipiero": {"muni": [{"nm": "GIRONA"}, {"nm": "FIGUERES"}]}}}"#,
        )
        .unwrap();
        let client = LocalClient::open(dir.path().into());

        // The colloquial alias resolves to the official fixture.
        assert_eq!(
            client.municipalities("Gerona", None).await.unwrap(),
            vec!["GIRONA", "FIGUERES"]
        );

        let err = client
            .municipalities("Narnia", None)
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("Narnia"), "{err}");
        assert!(err.contains("MADRID, GIRONA"), "{err}");
    }

    #[async_std::test]
    async fn test_missing_fixture_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let client = LocalClient::open(dir.path().into());
        let err = client
            .parcel_by_reference("1541506VK4714B0002PK")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unable to read"));
    }
}

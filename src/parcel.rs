//! The user-facing parcel object model.
//!
//! A [`Parcel`] combines the descriptive record of the Callejero lookups with
//! the geometry of the INSPIRE WFS. [`MetaParcel`] covers locations that resolve
//! to several cadastral references, building one [`Parcel`] per reference.

use crate::catastro::{
    Catastro, FloorCounts, ParcelKind, ParcelLocation, Region, RoadType, Srs,
};
use crate::geo::{self, Point};
use anyhow::Error;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

/// A cadastral parcel with geographic data attached.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Parcel {
    /// The 20-character cadastral reference.
    pub reference: String,
    pub province: String,
    pub municipality: String,
    pub kind: ParcelKind,
    /// Address (urban) or polygon/plot (rustic) detail.
    pub location: ParcelLocation,
    /// Construction units or subplots.
    pub regions: Vec<Region>,
    /// Sum of the region surfaces, in square meters.
    pub built_area: f64,
    /// Vertices of the exterior ring, in `srs` coordinates.
    pub geometry: Vec<Point>,
    /// The official reference point of the parcel.
    pub centroid: Point,
    /// Official parcel area, in square meters.
    pub area: f64,
    /// The spatial reference system of `geometry` and `centroid`.
    pub srs: Srs,
    /// URL of the parcel sketch (croquis).
    pub sketch_url: String,
}

impl Parcel {
    /// Look up a parcel by its cadastral reference.
    pub async fn by_reference<C: Catastro + ?Sized>(
        catastro: &C,
        rc: &str,
        srs: Srs,
    ) -> Result<Self, Error> {
        let record = catastro.parcel_by_reference(rc).await?;
        Self::assemble(catastro, record, srs).await
    }

    /// Look up a rustic parcel by province, municipality, polygon and plot.
    pub async fn by_plot<C: Catastro + ?Sized>(
        catastro: &C,
        province: &str,
        municipality: &str,
        polygon: &str,
        plot: &str,
        srs: Srs,
    ) -> Result<Self, Error> {
        let record = catastro
            .parcel_by_plot(province, municipality, polygon, plot)
            .await?;
        Self::assemble(catastro, record, srs).await
    }

    /// Look up an urban parcel by address.
    pub async fn by_address<C: Catastro + ?Sized>(
        catastro: &C,
        province: &str,
        municipality: &str,
        road_type: RoadType,
        street: &str,
        number: &str,
        srs: Srs,
    ) -> Result<Self, Error> {
        let record = catastro
            .parcel_by_address(province, municipality, road_type, street, number)
            .await?;
        Self::assemble(catastro, record, srs).await
    }

    async fn assemble<C: Catastro + ?Sized>(
        catastro: &C,
        record: crate::catastro::ParcelRecord,
        srs: Srs,
    ) -> Result<Self, Error> {
        tracing::info!(
            "parcel {} ({}, {})",
            record.reference,
            record.municipality,
            record.province
        );
        let geometry = catastro.parcel_geometry(&record.reference, srs).await?;
        let sketch_url = catastro.sketch_url(&record.reference);
        Ok(Self {
            built_area: record.built_area(),
            reference: record.reference,
            province: record.province,
            municipality: record.municipality,
            kind: record.kind,
            location: record.location,
            regions: record.regions,
            geometry: geometry.exterior,
            centroid: geometry.reference_point,
            area: geometry.area,
            srs,
            sketch_url,
        })
    }

    /// Lengths of the boundary edges, in meters, pairing each vertex with the
    /// previous one (and the first with the last).
    pub fn edge_lengths(&self) -> Vec<f64> {
        geo::edge_lengths(&self.geometry)
    }

    /// The boundary perimeter, in meters, or [`None`] without geometry.
    pub fn perimeter(&self) -> Option<f64> {
        geo::ring_perimeter(&self.geometry)
    }

    /// Aggregated floor counts of the buildings on this parcel.
    ///
    /// Rustic parcels have no building parts and yield the zero aggregate
    /// without a request.
    pub async fn floors<C: Catastro + ?Sized>(&self, catastro: &C) -> Result<FloorCounts, Error> {
        if self.kind == ParcelKind::Rustic {
            return Ok(FloorCounts::default());
        }
        catastro.building_floors(&self.reference).await
    }
}

/// A location covered by several cadastral references.
///
/// Where a single-parcel lookup fails with "several cadastral references", a
/// `MetaParcel` collects them all.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct MetaParcel {
    /// The member parcels, in the order the service reported them.
    pub parcels: Vec<Parcel>,
}

impl MetaParcel {
    /// Look up all parcels behind a cadastral reference.
    pub async fn by_reference<C: Catastro + ?Sized>(
        catastro: &C,
        rc: &str,
        srs: Srs,
    ) -> Result<Self, Error> {
        let refs = catastro.references_by_reference(rc).await?;
        Self::assemble(catastro, refs, srs).await
    }

    /// Look up all parcels at a polygon/plot location.
    pub async fn by_plot<C: Catastro + ?Sized>(
        catastro: &C,
        province: &str,
        municipality: &str,
        polygon: &str,
        plot: &str,
        srs: Srs,
    ) -> Result<Self, Error> {
        let refs = catastro
            .references_by_plot(province, municipality, polygon, plot)
            .await?;
        Self::assemble(catastro, refs, srs).await
    }

    /// Look up all parcels at an address.
    pub async fn by_address<C: Catastro + ?Sized>(
        catastro: &C,
        province: &str,
        municipality: &str,
        road_type: RoadType,
        street: &str,
        number: &str,
        srs: Srs,
    ) -> Result<Self, Error> {
        let refs = catastro
            .references_by_address(province, municipality, road_type, street, number)
            .await?;
        Self::assemble(catastro, refs, srs).await
    }

    async fn assemble<C: Catastro + ?Sized>(
        catastro: &C,
        refs: Vec<String>,
        srs: Srs,
    ) -> Result<Self, Error> {
        tracing::info!("meta-parcel with {} cadastral references", refs.len());
        let parcels = try_join_all(
            refs.iter()
                .map(|rc| Parcel::by_reference(catastro, rc, srs)),
        )
        .await?;
        Ok(Self { parcels })
    }
}

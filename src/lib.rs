//! Typed client for the Spanish Cadastre (Catastro) web services.
//!
//! The Catastro publishes parcel data through two families of services: the OVC
//! *Callejero* JSON endpoints (province/municipality/street catalogues and parcel
//! lookups by cadastral reference, plot or address) and the INSPIRE WFS endpoints
//! returning parcel geometry and building parts as GML. This crate wraps both
//! behind the [`catastro::Catastro`] trait and exposes results as a typed object
//! model ([`parcel::Parcel`], [`parcel::MetaParcel`]) with exporters for JSON,
//! CSV, GeoJSON and interactive Leaflet maps.

pub mod catastro;
pub mod error;
pub mod export;
pub mod geo;
pub mod map;
pub mod parcel;

/// Initialize a `tracing` subscriber filtered by `RUST_LOG`.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

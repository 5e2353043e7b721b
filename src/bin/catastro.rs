use anyhow::Error;
use clap::{Parser, ValueEnum};
use escatastro::{
    catastro::{Catastro, Client, RoadType, Srs},
    export, init_logging, map,
    parcel::{MetaParcel, Parcel},
};
use std::path::PathBuf;

/// Query the Spanish Cadastre from the command line.
#[derive(Parser)]
enum Command {
    /// List the Spanish provinces.
    Provinces,
    /// List the municipalities of a province.
    Municipalities {
        /// The province name.
        #[clap(short, long, env = "CATASTRO_PROVINCE")]
        province: String,

        /// Only list municipalities matching FILTER.
        #[clap(short, long, name = "FILTER")]
        filter: Option<String>,
    },
    /// List the streets of a municipality.
    Streets {
        /// The province name.
        #[clap(short, long, env = "CATASTRO_PROVINCE")]
        province: String,

        /// The municipality name.
        #[clap(short, long, env = "CATASTRO_MUNICIPALITY")]
        municipality: String,
    },
    /// Look up a parcel and print or export it.
    ///
    /// Exactly one of these lookups must be given: a cadastral reference
    /// (--rc), a rustic plot (--province --municipality --polygon --plot), or
    /// an address (--province --municipality --road-type --street --number).
    Lookup {
        /// The 20-character cadastral reference.
        #[clap(long, env = "CATASTRO_RC", conflicts_with_all = ["polygon", "street"])]
        rc: Option<String>,

        #[clap(short, long, env = "CATASTRO_PROVINCE")]
        province: Option<String>,

        #[clap(short, long, env = "CATASTRO_MUNICIPALITY")]
        municipality: Option<String>,

        /// Polygon number of a rustic plot lookup.
        #[clap(long, requires_all = ["province", "municipality", "plot"])]
        polygon: Option<String>,

        /// Plot number of a rustic plot lookup.
        #[clap(long)]
        plot: Option<String>,

        /// Road-type abbreviation of an address lookup (CL, AV, PZ, ...).
        #[clap(long, requires_all = ["province", "municipality", "street", "number"])]
        road_type: Option<RoadType>,

        /// Street name of an address lookup.
        #[clap(long)]
        street: Option<String>,

        /// Street number of an address lookup.
        #[clap(long)]
        number: Option<String>,

        /// The spatial reference system for the geometry.
        #[clap(long, env = "CATASTRO_SRS", default_value = "EPSG:4326")]
        srs: Srs,

        /// Collect every cadastral reference at the location instead of
        /// failing when there are several.
        #[clap(long)]
        all: bool,

        /// Output format for stdout.
        #[clap(short = 'f', long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Also write an interactive map to FILE.
        #[clap(long, name = "FILE")]
        map: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Json,
    Csv,
    Geojson,
}

async fn lookup(
    client: &Client,
    rc: Option<&str>,
    province: Option<&str>,
    municipality: Option<&str>,
    polygon: Option<&str>,
    plot: Option<&str>,
    road_type: Option<RoadType>,
    street: Option<&str>,
    number: Option<&str>,
    srs: Srs,
    all: bool,
) -> Result<Vec<Parcel>, Error> {
    if let Some(rc) = rc {
        return Ok(if all {
            MetaParcel::by_reference(client, rc, srs).await?.parcels
        } else {
            vec![Parcel::by_reference(client, rc, srs).await?]
        });
    }
    if let (Some(province), Some(municipality)) = (province, municipality) {
        if let (Some(polygon), Some(plot)) = (polygon, plot) {
            return Ok(if all {
                MetaParcel::by_plot(client, province, municipality, polygon, plot, srs)
                    .await?
                    .parcels
            } else {
                vec![Parcel::by_plot(client, province, municipality, polygon, plot, srs).await?]
            });
        }
        if let (Some(road_type), Some(street), Some(number)) = (road_type, street, number) {
            return Ok(if all {
                MetaParcel::by_address(
                    client,
                    province,
                    municipality,
                    road_type,
                    street,
                    number,
                    srs,
                )
                .await?
                .parcels
            } else {
                vec![
                    Parcel::by_address(
                        client,
                        province,
                        municipality,
                        road_type,
                        street,
                        number,
                        srs,
                    )
                    .await?,
                ]
            });
        }
    }
    Err(Error::msg(
        "not enough information for a lookup: give --rc, a plot (--province --municipality \
         --polygon --plot) or an address (--province --municipality --road-type --street --number)",
    ))
}

#[async_std::main]
async fn main() -> Result<(), Error> {
    init_logging();
    let client = Client::new();

    match Command::parse() {
        Command::Provinces => {
            for province in client.provinces().await? {
                println!("{province}");
            }
        }
        Command::Municipalities { province, filter } => {
            for municipality in client.municipalities(&province, filter.as_deref()).await? {
                println!("{municipality}");
            }
        }
        Command::Streets {
            province,
            municipality,
        } => {
            for street in client.streets(&province, &municipality).await? {
                println!("{street}");
            }
        }
        Command::Lookup {
            rc,
            province,
            municipality,
            polygon,
            plot,
            road_type,
            street,
            number,
            srs,
            all,
            format,
            map,
        } => {
            let parcels = lookup(
                &client,
                rc.as_deref(),
                province.as_deref(),
                municipality.as_deref(),
                polygon.as_deref(),
                plot.as_deref(),
                road_type,
                street.as_deref(),
                number.as_deref(),
                srs,
                all,
            )
            .await?;

            match format {
                Format::Json => println!("{}", export::to_json(&parcels)?),
                Format::Csv => print!("{}", export::to_csv(&parcels)),
                Format::Geojson => {
                    println!("{}", serde_json::to_string_pretty(&export::to_geojson(&parcels))?)
                }
            }
            if let Some(path) = map {
                map::write_map(&parcels, "Catastro parcels", &path)?;
                tracing::info!("map written to {}", path.display());
            }
        }
    }
    Ok(())
}

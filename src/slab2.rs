//! Slab2: subduction zone geometries (Hayes et al. 2018), one set of five
//! xyz grids per zone. Upstream distributes depth-like quantities in
//! kilometres; loading converts them to metres and scales the recorded
//! ranges consistently.

use crate::dataset::{Loaded, attr};
use crate::error::GeoError;
use crate::grid::{Grid, read_xyz_grid};
use crate::store::Store;
use crate::transport::Transport;

/// Kilometres to metres, applied to depth, thickness and depth_uncertainty.
pub const KM_TO_M: f64 = 1000.0;

struct Dataset {
    field: &'static str,
    long_name: &'static str,
    units: &'static str,
    rescale: bool,
}

const DATASETS: &[Dataset] = &[
    Dataset {
        field: "depth",
        long_name: "Slab depth",
        units: "meters",
        rescale: true,
    },
    Dataset {
        field: "dip",
        long_name: "Slab dip",
        units: "degrees",
        rescale: false,
    },
    Dataset {
        field: "strike",
        long_name: "Slab strike",
        units: "degrees",
        rescale: false,
    },
    Dataset {
        field: "thickness",
        long_name: "Slab thickness",
        units: "meters",
        rescale: true,
    },
    Dataset {
        field: "depth_uncertainty",
        long_name: "Slab depth uncertainty",
        units: "meters",
        rescale: true,
    },
];

const ZONES: &[(&str, &str, &str)] = &[
    ("alaska", "alu", "Alaska"),
    ("calabria", "cal", "Calabria"),
];

pub fn valid_zones() -> Vec<&'static str> {
    ZONES.iter().map(|(zone, _, _)| *zone).collect()
}

pub fn dataset_fields() -> Vec<&'static str> {
    DATASETS.iter().map(|dataset| dataset.field).collect()
}

/// Fetch the Slab2 model for a subduction `zone` (`"alaska"` or
/// `"calabria"`). The five per-field grids are merged on shared longitude
/// and latitude coordinates.
pub fn fetch_slab2<T: Transport>(
    store: &Store<T>,
    zone: &str,
    load: bool,
) -> Result<Loaded<Grid>, GeoError> {
    let (indicator, zone_name) = ZONES
        .iter()
        .find(|(key, _, _)| *key == zone)
        .map(|(_, indicator, zone_name)| (*indicator, *zone_name))
        .ok_or_else(|| GeoError::InvalidSelector {
            dataset: "slab2 zone",
            value: zone.to_string(),
            valid: valid_zones(),
        })?;

    let names: Vec<String> = DATASETS
        .iter()
        .map(|dataset| format!("{indicator}_slab2_{}.xyz", dataset.field))
        .collect();

    let mut paths = Vec::with_capacity(names.len());
    for name in &names {
        let (path, _) = store.fetch(name)?;
        paths.push(path);
    }
    if !load {
        return Ok(Loaded::Paths(paths));
    }

    let mut grid = Grid::new();
    for (dataset, path) in DATASETS.iter().zip(&paths) {
        let component = read_xyz_grid(path, dataset.field, "longitude", "latitude")?;
        grid.merge(component)?;
        if let Some(var) = grid.var_mut(dataset.field) {
            if dataset.rescale {
                var.scale(KM_TO_M);
            }
            var.attrs
                .insert("long_name".to_string(), attr(dataset.long_name));
            var.attrs.insert("units".to_string(), attr(dataset.units));
            var.set_actual_range();
        }
    }
    grid.annotate_coord("longitude", "Longitude", "degrees")?;
    grid.annotate_coord("latitude", "Latitude", "degrees")?;
    grid.attrs_mut().insert(
        "title".to_string(),
        attr(format!("Slab2 model - Zone: {zone_name}")),
    );
    grid.attrs_mut().insert("zone".to_string(), attr(zone_name));
    grid.attrs_mut().insert("datum".to_string(), attr("WGS84"));
    grid.attrs_mut()
        .insert("doi".to_string(), attr("10.5066/F7PV6JNV"));
    Ok(Loaded::Data(grid))
}

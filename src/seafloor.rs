//! Age of the oceanic lithosphere (Müller et al. 2008): age and age
//! uncertainty grids at 2 and 6 arc-minute resolutions, distributed as
//! bzip2-compressed xyz grids with values stored in hundredths of million
//! years.

use crate::dataset::{Loaded, attr};
use crate::error::GeoError;
use crate::grid::{Grid, read_xyz_grid};
use crate::processors::{Compression, Processor};
use crate::store::Store;
use crate::transport::Transport;

/// Raw grid values are in hundredths of million years; loading rescales them
/// (and their recorded ranges) to million years.
pub const AGE_SCALE_FACTOR: f64 = 0.01;

const RESOLUTIONS: &[&str] = &["6min", "2min"];

pub fn valid_resolutions() -> Vec<&'static str> {
    RESOLUTIONS.to_vec()
}

/// Fetch the seafloor age and age uncertainty grids at the given
/// `resolution` (`"6min"` or `"2min"`). Both grids are merged into one
/// dataset with variables `age` and `uncertainty` in million years.
pub fn fetch_seafloor_age<T: Transport>(
    store: &Store<T>,
    resolution: &str,
    load: bool,
) -> Result<Loaded<Grid>, GeoError> {
    if !RESOLUTIONS.contains(&resolution) {
        return Err(GeoError::InvalidSelector {
            dataset: "seafloor age resolution",
            value: resolution.to_string(),
            valid: valid_resolutions(),
        });
    }
    // "6min" -> "6", matching the upstream file naming.
    let tag = &resolution[..1];
    let age_name = format!("age.3.{tag}.xyz.bz2");
    let error_name = format!("ageerror.3.{tag}.xyz.bz2");

    let decompress = Processor::Decompress(Compression::Bzip2);
    let mut age_paths = store.fetch_processed(&age_name, &decompress)?;
    let mut error_paths = store.fetch_processed(&error_name, &decompress)?;
    if !load {
        age_paths.append(&mut error_paths);
        return Ok(Loaded::Paths(age_paths));
    }

    let mut grid = read_xyz_grid(&age_paths[0], "age", "longitude", "latitude")?;
    let uncertainty = read_xyz_grid(&error_paths[0], "uncertainty", "longitude", "latitude")?;
    grid.merge(uncertainty)?;

    for (name, long_name) in [("age", "Age of oceanic lithosphere"), ("uncertainty", "Age uncertainty")] {
        if let Some(var) = grid.var_mut(name) {
            var.scale(AGE_SCALE_FACTOR);
            var.attrs.insert("long_name".to_string(), attr(long_name));
            var.attrs
                .insert("units".to_string(), attr("million_years"));
            var.set_actual_range();
        }
    }
    grid.annotate_coord("longitude", "Longitude", "degrees")?;
    grid.annotate_coord("latitude", "Latitude", "degrees")?;
    grid.attrs_mut()
        .insert("title".to_string(), attr("Age of oceanic lithosphere"));
    grid.attrs_mut()
        .insert("doi".to_string(), attr("10.1029/2007GC001743"));
    grid.attrs_mut().insert("datum".to_string(), attr("WGS84"));
    Ok(Loaded::Data(grid))
}

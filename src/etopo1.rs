//! ETOPO1 global relief model, distributed as gzip-compressed xyz grids in
//! two versions: the ice surface (top of the Antarctic and Greenland ice
//! sheets) and the bedrock underneath them.

use crate::dataset::{Loaded, attr};
use crate::error::GeoError;
use crate::grid::{Grid, read_xyz_grid};
use crate::processors::{Compression, Processor};
use crate::store::Store;
use crate::transport::Transport;

const VERSIONS: &[(&str, &str, &str)] = &[
    ("ice", "ETOPO1_Ice_g_gmt4.xyz.gz", "Ice Surface"),
    ("bedrock", "ETOPO1_Bed_g_gmt4.xyz.gz", "Bedrock"),
];

pub fn valid_versions() -> Vec<&'static str> {
    VERSIONS.iter().map(|(version, _, _)| *version).collect()
}

/// Fetch the ETOPO1 global relief model for the given `version` (`"ice"` or
/// `"bedrock"`). The grid variable is named after the version; relief is in
/// meters relative to sea level, grid-line registered.
pub fn fetch_etopo1<T: Transport>(
    store: &Store<T>,
    version: &str,
    load: bool,
) -> Result<Loaded<Grid>, GeoError> {
    let version = version.to_lowercase();
    let (name, long_name) = VERSIONS
        .iter()
        .find(|(key, _, _)| *key == version)
        .map(|(_, name, long_name)| (*name, *long_name))
        .ok_or_else(|| GeoError::InvalidSelector {
            dataset: "etopo1 version",
            value: version.clone(),
            valid: valid_versions(),
        })?;

    let paths = store.fetch_processed(name, &Processor::Decompress(Compression::Gzip))?;
    if !load {
        return Ok(Loaded::Paths(paths));
    }

    let mut grid = read_xyz_grid(&paths[0], &version, "longitude", "latitude")?;
    if let Some(var) = grid.var_mut(&version) {
        var.attrs.insert(
            "long_name".to_string(),
            attr(format!("ETOPO1 {long_name} relief [meters]")),
        );
        var.attrs.insert("units".to_string(), attr("meters"));
        var.set_actual_range();
    }
    grid.annotate_coord("longitude", "Longitude", "degrees")?;
    grid.annotate_coord("latitude", "Latitude", "degrees")?;
    grid.attrs_mut().insert(
        "title".to_string(),
        attr(format!("ETOPO1 {long_name} relief")),
    );
    grid.attrs_mut()
        .insert("doi".to_string(), attr("10.7289/V5C8276M"));
    grid.attrs_mut().insert("datum".to_string(), attr("WGS84"));
    Ok(Loaded::Data(grid))
}

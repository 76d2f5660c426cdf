//! Point survey tables: the Great Britain aeromagnetic survey and the South
//! Africa land gravity database, both distributed gzip-compressed.

use crate::dataset::{Loaded, attr};
use crate::error::GeoError;
use crate::processors::{Compression, Processor};
use crate::store::Store;
use crate::table::{Table, read_columns, read_csv_with_header};
use crate::transport::Transport;

/// Fetch the total-field magnetic anomaly survey of Great Britain
/// (British Geological Survey, 1955-1965 airborne coverage). Columns include
/// longitude, latitude, the anomaly in nanoTesla and observation height in
/// meters relative to the WGS84 datum.
pub fn fetch_britain_magnetic<T: Transport>(
    store: &Store<T>,
    load: bool,
) -> Result<Loaded<Table>, GeoError> {
    let paths = store.fetch_processed(
        "britain-magnetic.csv.gz",
        &Processor::Decompress(Compression::Gzip),
    )?;
    if !load {
        return Ok(Loaded::Paths(paths));
    }
    let mut table = read_csv_with_header(&paths[0], ',')?;
    table.attrs_mut().insert(
        "title".to_string(),
        attr("Great Britain total-field magnetic anomaly"),
    );
    table
        .attrs_mut()
        .insert("datum".to_string(), attr("WGS84"));
    Ok(Loaded::Data(table))
}

/// Fetch the land gravity survey of South Africa (14559 stations).
/// Gravity is referenced to IGSN 71 in mGal; elevation is above sea level
/// in meters.
pub fn fetch_south_africa_gravity<T: Transport>(
    store: &Store<T>,
    load: bool,
) -> Result<Loaded<Table>, GeoError> {
    let paths = store.fetch_processed(
        "south-africa-gravity.ast.gz",
        &Processor::Decompress(Compression::Gzip),
    )?;
    if !load {
        return Ok(Loaded::Paths(paths));
    }
    let mut table = read_columns(
        &paths[0],
        None,
        0,
        &[
            ("latitude", Some("degrees")),
            ("longitude", Some("degrees")),
            ("elevation", Some("meters")),
            ("gravity", Some("mGal")),
        ],
    )?;
    table.attrs_mut().insert(
        "title".to_string(),
        attr("South Africa land gravity survey"),
    );
    table
        .attrs_mut()
        .insert("gravity_reference".to_string(), attr("IGSN 71"));
    Ok(Loaded::Data(table))
}

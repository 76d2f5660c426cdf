//! GRAV-D airborne gravity for the United States (NOAA National Geodetic
//! Survey), distributed as one zip archive per survey block. A zone selector
//! fetches every block in the zone and concatenates their point tables.

use camino::Utf8PathBuf;

use crate::dataset::{Loaded, attr};
use crate::error::GeoError;
use crate::processors::{ArchiveKind, Processor};
use crate::store::Store;
use crate::table::{ColumnSpec, Table, read_columns_lossy};
use crate::transport::Transport;

const ZONES: &[(&str, &str, &[&str])] = &[
    ("pacific_north", "Pacific North", &["PN01", "PN02", "PN03"]),
    ("pacific_south", "Pacific South", &["PS01", "PS02"]),
];

/// The flight and point identifier columns are non-numeric and come through
/// as NaN; see [`read_columns_lossy`].
const COLUMNS: &[ColumnSpec<'static>] = &[
    ("flight_id", None),
    ("id_or_date", None),
    ("latitude", Some("degrees")),
    ("longitude", Some("degrees")),
    ("height", Some("meters")),
    ("gravity", Some("mGal")),
];

pub fn valid_zones() -> Vec<&'static str> {
    ZONES.iter().map(|(zone, _, _)| *zone).collect()
}

/// Fetch the GRAV-D airborne gravity observations for a survey `zone` (see
/// [`valid_zones`]). Each of the zone's blocks is unpacked from its own zip
/// and the per-block tables are concatenated in block order. Height is
/// ellipsoidal in meters; gravity is the observed full field in mGal.
pub fn fetch_gravd<T: Transport>(
    store: &Store<T>,
    zone: &str,
    load: bool,
) -> Result<Loaded<Table>, GeoError> {
    let (zone_name, blocks) = ZONES
        .iter()
        .find(|(key, _, _)| *key == zone)
        .map(|(_, zone_name, blocks)| (*zone_name, *blocks))
        .ok_or_else(|| GeoError::InvalidSelector {
            dataset: "gravd zone",
            value: zone.to_string(),
            valid: valid_zones(),
        })?;

    let mut data_files = Vec::with_capacity(blocks.len());
    for block in blocks {
        let archive = format!("NGS_GRAVD_Block_{block}_BETA1.zip");
        let members = store.fetch_processed(&archive, &Processor::Unpack(ArchiveKind::Zip))?;
        data_files.push(find_data_file(&archive, block, &members)?);
    }
    if !load {
        return Ok(Loaded::Paths(data_files));
    }

    let mut table: Option<Table> = None;
    for path in &data_files {
        let block = read_columns_lossy(path, None, 0, COLUMNS)?;
        match table.as_mut() {
            None => table = Some(block),
            Some(table) => table.append_rows(block)?,
        }
    }
    let mut table = table.unwrap_or_default();
    table.attrs_mut().insert(
        "title".to_string(),
        attr(format!("GRAV-D airborne gravity - Zone: {zone_name}")),
    );
    table
        .attrs_mut()
        .insert("source".to_string(), attr("NOAA National Geodetic Survey"));
    table.attrs_mut().insert("zone".to_string(), attr(zone_name));
    table.attrs_mut().insert("datum".to_string(), attr("WGS84"));
    Ok(Loaded::Data(table))
}

/// Each block archive holds one gravity data file alongside supplementary
/// and readme files; the data file is `NGS_GRAVD_Block_<b>_Gravity_Data*.txt`.
fn find_data_file(
    archive: &str,
    block: &str,
    members: &[Utf8PathBuf],
) -> Result<Utf8PathBuf, GeoError> {
    let prefix = format!("NGS_GRAVD_Block_{block}_Gravity_Data");
    members
        .iter()
        .find(|path| {
            path.file_name().is_some_and(|name| {
                name.starts_with(&prefix)
                    && name.ends_with(".txt")
                    && !name.contains("supplementary")
            })
        })
        .cloned()
        .ok_or_else(|| GeoError::MemberNotFound {
            archive: archive.to_string(),
            member: format!("{prefix}*.txt"),
        })
}

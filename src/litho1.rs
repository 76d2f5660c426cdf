//! LITHO1.0: a tessellated model of the crust and uppermost mantle,
//! distributed as a tar.gz of per-node model files plus an icosahedron
//! coordinate file. Assembled into a (nodes x boundaries) grid.

use std::collections::HashMap;
use std::fs;

use camino::Utf8Path;

use crate::dataset::{Attrs, Loaded, attr};
use crate::error::GeoError;
use crate::grid::Grid;
use crate::processors::{ArchiveKind, Processor};
use crate::store::Store;
use crate::transport::Transport;

const ARCHIVE: &str = "litho1.0.tar.gz";
const COORDINATES_FILE: &str = "Icosahedron_Level7_LatLon_mod.txt";

pub const PROPERTIES: &[&str] = &[
    "depth", "density", "Vp", "Vs", "Qkappa", "Qmu", "Vp2", "Vs2", "eta",
];

/// Fetch the LITHO1.0 model. `properties` selects a subset of the nine
/// model properties (`None` loads them all); the result is a grid with
/// dimensions `nodes` x `boundaries`, per-node `longitude`/`latitude`
/// variables, and the boundary labels recorded in the `boundaries` attr.
pub fn fetch_litho1<T: Transport>(
    store: &Store<T>,
    properties: Option<&[&str]>,
    load: bool,
) -> Result<Loaded<Grid>, GeoError> {
    let selected: Vec<&str> = match properties {
        Some(properties) => {
            for property in properties {
                if !PROPERTIES.contains(property) {
                    return Err(GeoError::InvalidSelector {
                        dataset: "litho1 property",
                        value: property.to_string(),
                        valid: PROPERTIES.to_vec(),
                    });
                }
            }
            properties.to_vec()
        }
        None => PROPERTIES.to_vec(),
    };

    let members = store.fetch_processed(ARCHIVE, &Processor::Unpack(ArchiveKind::TarGz))?;
    if !load {
        return Ok(Loaded::Paths(members));
    }

    // One filename index instead of scanning ~40k members per node.
    let by_name: HashMap<&str, &Utf8Path> = members
        .iter()
        .filter_map(|path| path.file_name().map(|name| (name, path.as_path())))
        .collect();
    let coord_file = by_name
        .get(COORDINATES_FILE)
        .copied()
        .ok_or_else(|| GeoError::MemberNotFound {
            archive: ARCHIVE.to_string(),
            member: COORDINATES_FILE.to_string(),
        })?;
    let (latitudes, longitudes) = read_coordinates(coord_file)?;
    let node_count = latitudes.len();

    // Node files are parsed in node order; boundary labels are collected in
    // order of first appearance across the model.
    let mut boundaries: Vec<String> = Vec::new();
    let mut node_rows: Vec<Vec<(usize, [f64; 9])>> = Vec::with_capacity(node_count);
    for node in 1..=node_count {
        let file_name = format!("node{node}.model");
        let path = by_name
            .get(file_name.as_str())
            .copied()
            .ok_or_else(|| GeoError::MemberNotFound {
                archive: ARCHIVE.to_string(),
                member: file_name.clone(),
            })?;
        node_rows.push(read_node_model(path, &mut boundaries)?);
    }

    let mut grid = Grid::new();
    grid.add_dim("nodes", node_count)?;
    grid.add_dim("boundaries", boundaries.len())?;
    grid.set_coord("nodes", (1..=node_count).map(|n| n as f64).collect())?;
    grid.add_var("longitude", &["nodes"], longitudes, units("degrees"))?;
    grid.add_var("latitude", &["nodes"], latitudes, units("degrees"))?;

    for (index, property) in PROPERTIES.iter().enumerate() {
        if !selected.contains(property) {
            continue;
        }
        let mut values = vec![f64::NAN; node_count * boundaries.len()];
        for (node_index, rows) in node_rows.iter().enumerate() {
            for (boundary_index, row) in rows {
                values[node_index * boundaries.len() + boundary_index] = row[index];
            }
        }
        grid.add_var(*property, &["nodes", "boundaries"], values, Attrs::new())?;
    }

    grid.attrs_mut()
        .insert("title".to_string(), attr("LITHO1.0 model"));
    grid.attrs_mut()
        .insert("doi".to_string(), attr("10.1002/2013JB010626"));
    grid.attrs_mut().insert(
        "boundaries".to_string(),
        serde_json::Value::from(boundaries),
    );
    Ok(Loaded::Data(grid))
}

fn units(value: &str) -> Attrs {
    let mut attrs = Attrs::new();
    attrs.insert("units".to_string(), attr(value));
    attrs
}

/// The coordinate file has three whitespace-separated columns: latitude,
/// an unused index, longitude.
fn read_coordinates(path: &Utf8Path) -> Result<(Vec<f64>, Vec<f64>), GeoError> {
    let content = fs::read_to_string(path.as_std_path())
        .map_err(|err| GeoError::Filesystem(format!("read {path}: {err}")))?;
    let mut latitudes = Vec::new();
    let mut longitudes = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 3 {
            return Err(parse_error(path, index, "expected `lat index lon`"));
        }
        let lat = fields[0]
            .parse::<f64>()
            .map_err(|_| parse_error(path, index, "latitude is not a number"))?;
        let lon = fields[2]
            .parse::<f64>()
            .map_err(|_| parse_error(path, index, "longitude is not a number"))?;
        latitudes.push(lat);
        longitudes.push(lon);
    }
    Ok((latitudes, longitudes))
}

/// A node model file has one header row, then rows of the nine property
/// values followed by a boundary label. Returns `(boundary index, values)`
/// per unique boundary, registering new labels in `boundaries`.
fn read_node_model(
    path: &Utf8Path,
    boundaries: &mut Vec<String>,
) -> Result<Vec<(usize, [f64; 9])>, GeoError> {
    let content = fs::read_to_string(path.as_std_path())
        .map_err(|err| GeoError::Filesystem(format!("read {path}: {err}")))?;
    let mut rows = Vec::new();
    let mut seen: Vec<usize> = Vec::new();
    for (index, line) in content.lines().enumerate().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 10 {
            return Err(parse_error(path, index, "expected 9 values and a label"));
        }
        let mut values = [0.0f64; 9];
        for (value, field) in values.iter_mut().zip(&fields[..9]) {
            *value = field
                .parse::<f64>()
                .map_err(|_| parse_error(path, index, "property value is not a number"))?;
        }
        let label = fields[9];
        let boundary_index = match boundaries.iter().position(|known| known == label) {
            Some(position) => position,
            None => {
                boundaries.push(label.to_string());
                boundaries.len() - 1
            }
        };
        // Duplicate boundary rows occur in the upstream files; keep the first.
        if seen.contains(&boundary_index) {
            continue;
        }
        seen.push(boundary_index);
        rows.push((boundary_index, values));
    }
    Ok(rows)
}

fn parse_error(path: &Utf8Path, line_index: usize, message: &str) -> GeoError {
    GeoError::Parse {
        path: path.to_string(),
        message: format!("line {}: {message}", line_index + 1),
    }
}

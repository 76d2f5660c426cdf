//! Bedmap2: gridded surface elevation, ice thickness, bed elevation and
//! mask products for Antarctica, distributed as one zip archive of xyz
//! grids in the Antarctic Polar Stereographic projection.

use camino::{Utf8Path, Utf8PathBuf};

use crate::dataset::{Loaded, attr};
use crate::error::GeoError;
use crate::grid::{Grid, read_xyz_grid};
use crate::processors::{ArchiveKind, Processor};
use crate::store::Store;
use crate::transport::Transport;

const ARCHIVE: &str = "bedmap2_xyz.zip";

struct Dataset {
    field: &'static str,
    long_name: &'static str,
    units: Option<&'static str>,
    /// The 5 km uncertainty grid lives on a coarser mesh than the 1 km
    /// products and merges under its own dimension names.
    coarse: bool,
}

const DATASETS: &[Dataset] = &[
    Dataset { field: "bed", long_name: "Bedrock Height", units: Some("meters"), coarse: false },
    Dataset { field: "surface", long_name: "Ice Surface Height", units: Some("meters"), coarse: false },
    Dataset { field: "thickness", long_name: "Ice Thickness", units: Some("meters"), coarse: false },
    Dataset {
        field: "icemask_grounded_and_shelves",
        long_name: "Mask of Grounding Line and Floating Ice Shelves",
        units: None,
        coarse: false,
    },
    Dataset { field: "rockmask", long_name: "Mask of Rock Outcrops", units: None, coarse: false },
    Dataset { field: "lakemask_vostok", long_name: "Mask for Lake Vostok", units: None, coarse: false },
    Dataset {
        field: "grounded_bed_uncertainty",
        long_name: "Ice Bed Uncertainty",
        units: Some("meters"),
        coarse: false,
    },
    Dataset {
        field: "thickness_uncertainty_5km",
        long_name: "Ice Thickness Uncertainty",
        units: Some("meters"),
        coarse: true,
    },
    Dataset {
        field: "coverage",
        long_name: "Distribution of Ice Thickness Data (binary)",
        units: None,
        coarse: false,
    },
    Dataset { field: "geoid", long_name: "Geoid Height (WGS84)", units: Some("meters"), coarse: false },
];

pub fn valid_datasets() -> Vec<&'static str> {
    DATASETS.iter().map(|dataset| dataset.field).collect()
}

fn member_file_name(field: &str) -> String {
    if field == "geoid" {
        "gl04c_geoid_to_WGS84.xyz".to_string()
    } else {
        format!("bedmap2_{field}.xyz")
    }
}

fn find_member<'a>(
    members: &'a [Utf8PathBuf],
    file_name: &str,
) -> Result<&'a Utf8Path, GeoError> {
    members
        .iter()
        .find(|path| path.file_name() == Some(file_name))
        .map(Utf8PathBuf::as_path)
        .ok_or_else(|| GeoError::MemberNotFound {
            archive: ARCHIVE.to_string(),
            member: file_name.to_string(),
        })
}

/// Fetch the requested Bedmap2 `datasets` (see [`valid_datasets`]) and merge
/// them into one grid on the shared polar stereographic `x`/`y` mesh.
///
/// All products share one mesh except `thickness_uncertainty_5km`, which is
/// defined on a coarser mesh and merges under `x_coarse`/`y_coarse`.
pub fn fetch_bedmap2<T: Transport>(
    store: &Store<T>,
    datasets: &[&str],
    load: bool,
) -> Result<Loaded<Grid>, GeoError> {
    let mut selected = Vec::with_capacity(datasets.len());
    for field in datasets {
        let dataset = DATASETS
            .iter()
            .find(|dataset| dataset.field == *field)
            .ok_or_else(|| GeoError::InvalidSelector {
                dataset: "bedmap2 dataset",
                value: field.to_string(),
                valid: valid_datasets(),
            })?;
        selected.push(dataset);
    }

    let members = store.fetch_processed(ARCHIVE, &Processor::Unpack(ArchiveKind::Zip))?;
    if !load {
        let mut paths = Vec::with_capacity(selected.len());
        for dataset in &selected {
            paths.push(find_member(&members, &member_file_name(dataset.field))?.to_path_buf());
        }
        return Ok(Loaded::Paths(paths));
    }

    let mut grid = Grid::new();
    for dataset in &selected {
        let path = find_member(&members, &member_file_name(dataset.field))?;
        let (x_dim, y_dim) = if dataset.coarse {
            ("x_coarse", "y_coarse")
        } else {
            ("x", "y")
        };
        let mut component = read_xyz_grid(path, dataset.field, x_dim, y_dim)?;
        if let Some(var) = component.var_mut(dataset.field) {
            var.attrs
                .insert("long_name".to_string(), attr(dataset.long_name));
            if let Some(units) = dataset.units {
                var.attrs.insert("units".to_string(), attr(units));
            }
            var.set_actual_range();
        }
        grid.merge(component)?;
    }

    // Which meshes exist depends on the selection.
    for (dim, long_name) in [
        ("x", "Easting"),
        ("y", "Northing"),
        ("x_coarse", "Easting"),
        ("y_coarse", "Northing"),
    ] {
        if grid.coord(dim).is_some() {
            grid.annotate_coord(dim, long_name, "meters")?;
        }
    }
    grid.attrs_mut().insert("title".to_string(), attr("Bedmap2"));
    grid.attrs_mut().insert(
        "projection".to_string(),
        attr("Antarctic Polar Stereographic"),
    );
    grid.attrs_mut()
        .insert("true_scale_latitude".to_string(), attr(-71));
    grid.attrs_mut().insert("datum".to_string(), attr("WGS84"));
    grid.attrs_mut().insert("EPSG".to_string(), attr("3031"));
    grid.attrs_mut()
        .insert("doi".to_string(), attr("10.5194/tc-7-375-2013"));
    Ok(Loaded::Data(grid))
}

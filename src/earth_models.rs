//! One-dimensional reference Earth models distributed by the IRIS Earth
//! Model Collaboration as small delimited files. Each loader fetches a
//! single registry file and parses it into a [`Table`] with documented
//! column names and units.

use crate::dataset::{Loaded, attr};
use crate::error::GeoError;
use crate::store::Store;
use crate::table::{ColumnSpec, Table, read_columns};
use crate::transport::Transport;

struct ModelSpec {
    name: &'static str,
    title: &'static str,
    doi: &'static str,
    delimiter: Option<char>,
    skip_rows: usize,
    columns: &'static [ColumnSpec<'static>],
}

fn fetch_model<T: Transport>(
    store: &Store<T>,
    spec: &ModelSpec,
    load: bool,
) -> Result<Loaded<Table>, GeoError> {
    let (path, _) = store.fetch(spec.name)?;
    if !load {
        return Ok(Loaded::Paths(vec![path]));
    }
    let mut table = read_columns(&path, spec.delimiter, spec.skip_rows, spec.columns)?;
    table.attrs_mut().insert("title".to_string(), attr(spec.title));
    table.attrs_mut().insert("doi".to_string(), attr(spec.doi));
    Ok(Loaded::Data(table))
}

/// Fetch the Preliminary Reference Earth Model (PREM).
///
/// A one-dimensional model of average Earth properties as a function of
/// planetary radius, including density, seismic velocities, attenuation (Q)
/// and the anisotropy parameter eta on the boundaries of the major Earth
/// layers. Radius and depth are in km, density in g/cm³, velocities in km/s.
pub fn fetch_prem<T: Transport>(store: &Store<T>, load: bool) -> Result<Loaded<Table>, GeoError> {
    fetch_model(
        store,
        &ModelSpec {
            name: "PREM_1s.csv",
            title: "Preliminary Reference Earth Model (PREM)",
            doi: "10.1016/0031-9201(81)90046-7",
            delimiter: Some(','),
            skip_rows: 0,
            columns: &[
                ("radius", Some("km")),
                ("depth", Some("km")),
                ("density", Some("g/cm3")),
                ("Vpv", Some("km/s")),
                ("Vph", Some("km/s")),
                ("Vsv", Some("km/s")),
                ("Vsh", Some("km/s")),
                ("eta", None),
                ("Q_mu", None),
                ("Q_kappa", None),
            ],
        },
        load,
    )
}

/// Fetch the ak135-f Earth model: ak135 with the density and Q model of
/// Montagner and Kennett added. Depth in km, density in Mg/m³, velocities
/// in km/s.
pub fn fetch_ak135f<T: Transport>(store: &Store<T>, load: bool) -> Result<Loaded<Table>, GeoError> {
    fetch_model(
        store,
        &ModelSpec {
            name: "AK135F_AVG_IDV.csv",
            title: "ak135-f Earth model",
            doi: "10.1111/j.1365-246X.1995.tb03540.x",
            delimiter: Some(','),
            skip_rows: 2,
            columns: &[
                ("depth", Some("km")),
                ("density", Some("Mg/m3")),
                ("Vp", Some("km/s")),
                ("Vs", Some("km/s")),
                ("Q_kappa", None),
                ("Q_mu", None),
            ],
        },
        load,
    )
}

/// Fetch the IASP91 Earth model.
pub fn fetch_iasp91<T: Transport>(store: &Store<T>, load: bool) -> Result<Loaded<Table>, GeoError> {
    fetch_model(
        store,
        &ModelSpec {
            name: "IASP91.csv",
            title: "IASP91 Earth model",
            doi: "10.1111/j.1365-246X.1991.tb06724.x",
            delimiter: Some(','),
            skip_rows: 0,
            columns: &[
                ("depth", Some("km")),
                ("radius", Some("km")),
                ("Vp", Some("km/s")),
                ("Vs", Some("km/s")),
            ],
        },
        load,
    )
}

const PEM_COLUMNS: &[ColumnSpec<'static>] = &[
    ("radius", Some("km")),
    ("depth", Some("km")),
    ("density", Some("g/cm3")),
    ("Vp", Some("km/s")),
    ("Vs", Some("km/s")),
];

/// Fetch the PEM-A (Average Parametric Earth Model) model, a weighted
/// average of the oceanic and continental PEM variants.
pub fn fetch_pema<T: Transport>(store: &Store<T>, load: bool) -> Result<Loaded<Table>, GeoError> {
    fetch_model(
        store,
        &ModelSpec {
            name: "PEMA.csv",
            title: "PEM-A Average Parametric Earth Model",
            doi: "10.1016/0031-9201(75)90009-6",
            delimiter: Some(','),
            skip_rows: 0,
            columns: PEM_COLUMNS,
        },
        load,
    )
}

/// Fetch the PEM-C (Continental Parametric Earth Model) model.
pub fn fetch_pemc<T: Transport>(store: &Store<T>, load: bool) -> Result<Loaded<Table>, GeoError> {
    fetch_model(
        store,
        &ModelSpec {
            name: "PEMC.csv",
            title: "PEM-C Continental Parametric Earth Model",
            doi: "10.1016/0031-9201(75)90009-6",
            delimiter: Some(','),
            skip_rows: 0,
            columns: PEM_COLUMNS,
        },
        load,
    )
}

/// Fetch the PEM-O (Oceanic Parametric Earth Model) model.
pub fn fetch_pemo<T: Transport>(store: &Store<T>, load: bool) -> Result<Loaded<Table>, GeoError> {
    fetch_model(
        store,
        &ModelSpec {
            name: "PEMO.csv",
            title: "PEM-O Oceanic Parametric Earth Model",
            doi: "10.1016/0031-9201(75)90009-6",
            delimiter: Some(','),
            skip_rows: 0,
            columns: PEM_COLUMNS,
        },
        load,
    )
}

/// Fetch the MC35 Earth model, a shear velocity model based on PEM-C.
pub fn fetch_mc35<T: Transport>(store: &Store<T>, load: bool) -> Result<Loaded<Table>, GeoError> {
    fetch_model(
        store,
        &ModelSpec {
            name: "MC35.csv",
            title: "MC35 Earth model",
            doi: "10.1029/96JB07046",
            delimiter: Some(','),
            skip_rows: 0,
            columns: &[("depth", Some("km")), ("Vs", Some("km/s"))],
        },
        load,
    )
}

/// Fetch the STW105 Earth model. Unlike the other IRIS models this one is
/// distributed in SI units: radius in m, density in kg/m³, velocities in m/s.
pub fn fetch_stw105<T: Transport>(store: &Store<T>, load: bool) -> Result<Loaded<Table>, GeoError> {
    fetch_model(
        store,
        &ModelSpec {
            name: "STW105.txt",
            title: "STW105 Earth model",
            doi: "10.1029/2007JB005169",
            delimiter: None,
            skip_rows: 3,
            columns: &[
                ("radius", Some("m")),
                ("density", Some("kg/m3")),
                ("Vpv", Some("m/s")),
                ("Vsv", Some("m/s")),
                ("Q_kappa", None),
                ("Q_mu", None),
                ("Vph", Some("m/s")),
                ("Vsh", Some("m/s")),
                ("eta", None),
            ],
        },
        load,
    )
}

/// Fetch the TNA/SNA (Tectonic/Shield North America) average shear model.
pub fn fetch_tna_sna<T: Transport>(
    store: &Store<T>,
    load: bool,
) -> Result<Loaded<Table>, GeoError> {
    fetch_model(
        store,
        &ModelSpec {
            name: "StartingVsModel_TNA-SNA-average_IDV.csv",
            title: "TNA/SNA average Vs model",
            doi: "10.1029/2010JB007631",
            delimiter: Some(','),
            skip_rows: 2,
            columns: &[("radius", Some("m")), ("Vs", Some("m/s"))],
        },
        load,
    )
}

//! Fetch, cache, and load open geophysical and geological datasets.
//!
//! Datasets are identified by logical filenames declared in an embedded
//! registry manifest together with their sha256 digests and remote
//! locations. A [`Store`](store::Store) resolves names to hash-verified
//! files in a local cache directory, downloading through a
//! [`Transport`](transport::Transport) only on a cache miss and applying
//! idempotent post-fetch processors (decompression, archive unpacking)
//! before the per-dataset loaders parse the files into [`Table`](table::Table)
//! or [`Grid`](grid::Grid) values with normalized names, units and
//! provenance metadata.
//!
//! ```no_run
//! use geodatasets::{HttpTransport, Registry, Store, fetch_prem};
//!
//! let store = Store::new(Registry::builtin(), HttpTransport::new()?)?;
//! let prem = fetch_prem(&store, true)?.data().unwrap();
//! println!("{} rows", prem.nrows());
//! # Ok::<(), geodatasets::GeoError>(())
//! ```

pub mod bedmap2;
pub mod dataset;
pub mod earth_models;
pub mod error;
pub mod etopo1;
pub mod fs_util;
pub mod gravd;
pub mod grid;
pub mod litho1;
pub mod mcmurray;
pub mod processors;
pub mod registry;
pub mod seafloor;
pub mod slab2;
pub mod store;
pub mod surveys;
pub mod table;
pub mod transport;

pub use crate::bedmap2::fetch_bedmap2;
pub use crate::dataset::{Attrs, Loaded};
pub use crate::earth_models::{
    fetch_ak135f, fetch_iasp91, fetch_mc35, fetch_pema, fetch_pemc, fetch_pemo, fetch_prem,
    fetch_stw105, fetch_tna_sna,
};
pub use crate::error::GeoError;
pub use crate::etopo1::fetch_etopo1;
pub use crate::gravd::fetch_gravd;
pub use crate::grid::Grid;
pub use crate::litho1::fetch_litho1;
pub use crate::mcmurray::fetch_mcmurray_facies;
pub use crate::processors::{ArchiveKind, Compression, Processor};
pub use crate::registry::Registry;
pub use crate::seafloor::fetch_seafloor_age;
pub use crate::slab2::fetch_slab2;
pub use crate::store::{FetchAction, Store};
pub use crate::surveys::{fetch_britain_magnetic, fetch_south_africa_gravity};
pub use crate::table::Table;
pub use crate::transport::{HttpTransport, Transport};

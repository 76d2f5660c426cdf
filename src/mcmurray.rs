//! Mannville Group well logs from Alberta, Canada, preprocessed for facies
//! prediction. One CSV inside a larger zip archive; only that member is
//! extracted.

use crate::dataset::{Loaded, attr};
use crate::error::GeoError;
use crate::processors::Processor;
use crate::store::Store;
use crate::table::{Table, read_csv_with_header};
use crate::transport::Transport;

const ARCHIVE: &str = "mcmurray_facies.csv.zip";
const MEMBER: &str = "mcmurray_facies.csv";

/// Fetch the McMurray/Wabiskaw facies well-log table. Label columns (well
/// identifiers, lithology names) are represented as NaN in the numeric
/// table.
pub fn fetch_mcmurray_facies<T: Transport>(
    store: &Store<T>,
    load: bool,
) -> Result<Loaded<Table>, GeoError> {
    let paths = store.fetch_processed(ARCHIVE, &Processor::extract_member(MEMBER))?;
    if !load {
        return Ok(Loaded::Paths(paths));
    }
    let mut table = read_csv_with_header(&paths[0], ',')?;
    table.attrs_mut().insert(
        "title".to_string(),
        attr("McMurray/Wabiskaw oil sands well logs"),
    );
    table.attrs_mut().insert(
        "source".to_string(),
        attr("Alberta Geological Survey, ARC/AGS Special Report 6"),
    );
    Ok(Loaded::Data(table))
}

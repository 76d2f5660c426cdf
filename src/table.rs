//! A minimal columnar table: the passive sink that tabular dataset loaders
//! parse into. Columns are named `f64` arrays with optional physical units;
//! dataset-level metadata lives in an attrs map.

use std::fs;

use camino::Utf8Path;

use crate::dataset::Attrs;
use crate::error::GeoError;

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub units: Option<String>,
    pub values: Vec<f64>,
}

impl Column {
    pub fn min(&self) -> Option<f64> {
        self.values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .reduce(f64::max)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<Column>,
    attrs: Attrs,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        units: Option<&str>,
        values: Vec<f64>,
    ) {
        self.columns.push(Column {
            name: name.into(),
            units: units.map(str::to_string),
            values,
        });
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|col| col.name == name)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|col| col.name.as_str()).collect()
    }

    pub fn nrows(&self) -> usize {
        self.columns.first().map_or(0, |col| col.values.len())
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut Attrs {
        &mut self.attrs
    }

    /// Append another table's rows. The column layouts must match.
    pub fn append_rows(&mut self, other: Table) -> Result<(), GeoError> {
        if self.column_names() != other.column_names() {
            return Err(GeoError::ShapeMismatch(format!(
                "cannot append rows: columns {:?} vs {:?}",
                self.column_names(),
                other.column_names()
            )));
        }
        for (dest, src) in self.columns.iter_mut().zip(other.columns) {
            dest.values.extend(src.values);
        }
        Ok(())
    }
}

/// A column declaration for [`read_columns`]: name and optional units.
pub type ColumnSpec<'a> = (&'a str, Option<&'a str>);

/// Read a headerless delimited numeric file into a [`Table`] with the given
/// column declarations. `delimiter = None` splits on any whitespace. Rows
/// with a different field count, or unparseable fields, are a [`GeoError::Parse`].
pub fn read_columns(
    path: &Utf8Path,
    delimiter: Option<char>,
    skip_rows: usize,
    columns: &[ColumnSpec<'_>],
) -> Result<Table, GeoError> {
    let content = fs::read_to_string(path.as_std_path())
        .map_err(|err| GeoError::Filesystem(format!("read {path}: {err}")))?;
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); columns.len()];

    for (index, line) in content.lines().enumerate().skip(skip_rows) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = split_fields(line, delimiter);
        if fields.len() != columns.len() {
            return Err(parse_error(
                path,
                index,
                format!("expected {} fields, found {}", columns.len(), fields.len()),
            ));
        }
        for (column, field) in values.iter_mut().zip(&fields) {
            let value = field
                .trim()
                .parse::<f64>()
                .map_err(|_| parse_error(path, index, format!("not a number: {field:?}")))?;
            column.push(value);
        }
    }

    let mut table = Table::new();
    for ((name, units), values) in columns.iter().zip(values) {
        table.push_column(*name, *units, values);
    }
    Ok(table)
}

/// Like [`read_columns`], but non-numeric fields become NaN instead of
/// failing the parse. For headerless files that mix identifier columns
/// into otherwise numeric rows.
pub fn read_columns_lossy(
    path: &Utf8Path,
    delimiter: Option<char>,
    skip_rows: usize,
    columns: &[ColumnSpec<'_>],
) -> Result<Table, GeoError> {
    let content = fs::read_to_string(path.as_std_path())
        .map_err(|err| GeoError::Filesystem(format!("read {path}: {err}")))?;
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); columns.len()];

    for (index, line) in content.lines().enumerate().skip(skip_rows) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = split_fields(line, delimiter);
        if fields.len() != columns.len() {
            return Err(parse_error(
                path,
                index,
                format!("expected {} fields, found {}", columns.len(), fields.len()),
            ));
        }
        for (column, field) in values.iter_mut().zip(&fields) {
            column.push(field.trim().parse::<f64>().unwrap_or(f64::NAN));
        }
    }

    let mut table = Table::new();
    for ((name, units), values) in columns.iter().zip(values) {
        table.push_column(*name, *units, values);
    }
    Ok(table)
}

/// Read a delimited file whose first row names the columns. Non-numeric
/// cells become NaN, which keeps identifier/label columns representable
/// without a second value type.
pub fn read_csv_with_header(path: &Utf8Path, delimiter: char) -> Result<Table, GeoError> {
    let content = fs::read_to_string(path.as_std_path())
        .map_err(|err| GeoError::Filesystem(format!("read {path}: {err}")))?;
    let mut lines = content.lines().enumerate();

    let (_, header) = lines
        .next()
        .ok_or_else(|| parse_error(path, 0, "empty file".to_string()))?;
    let names: Vec<String> = header
        .split(delimiter)
        .map(|field| field.trim().to_string())
        .collect();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); names.len()];

    for (index, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(delimiter).collect();
        if fields.len() != names.len() {
            return Err(parse_error(
                path,
                index,
                format!("expected {} fields, found {}", names.len(), fields.len()),
            ));
        }
        for (column, field) in values.iter_mut().zip(&fields) {
            column.push(field.trim().parse::<f64>().unwrap_or(f64::NAN));
        }
    }

    let mut table = Table::new();
    for (name, values) in names.into_iter().zip(values) {
        table.push_column(name, None, values);
    }
    Ok(table)
}

fn split_fields(line: &str, delimiter: Option<char>) -> Vec<&str> {
    match delimiter {
        Some(ch) => line.split(ch).collect(),
        None => line.split_whitespace().collect(),
    }
}

fn parse_error(path: &Utf8Path, line_index: usize, message: String) -> GeoError {
    GeoError::Parse {
        path: path.to_string(),
        message: format!("line {}: {message}", line_index + 1),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use camino::Utf8PathBuf;

    use super::*;

    fn write_temp(content: &str) -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("data.csv")).unwrap();
        fs::write(path.as_std_path(), content).unwrap();
        (dir, path)
    }

    #[test]
    fn read_headerless_columns() {
        let (_dir, path) = write_temp("1.0,10.0\n2.0,20.0\n");
        let table = read_columns(
            &path,
            Some(','),
            0,
            &[("depth", Some("km")), ("Vs", Some("km/s"))],
        )
        .unwrap();
        assert_eq!(table.nrows(), 2);
        assert_eq!(table.column("Vs").unwrap().values, vec![10.0, 20.0]);
        assert_eq!(table.column("depth").unwrap().units.as_deref(), Some("km"));
    }

    #[test]
    fn skip_rows_drops_preamble() {
        let (_dir, path) = write_temp("# model\n# fields\n0.0 1.0\n");
        let table = read_columns(&path, None, 2, &[("a", None), ("b", None)]).unwrap();
        assert_eq!(table.nrows(), 1);
    }

    #[test]
    fn ragged_row_is_parse_error() {
        let (_dir, path) = write_temp("1.0,2.0\n3.0\n");
        let err = read_columns(&path, Some(','), 0, &[("a", None), ("b", None)]).unwrap_err();
        assert_matches!(err, GeoError::Parse { .. });
    }

    #[test]
    fn append_rows_requires_matching_columns() {
        let mut a = Table::new();
        a.push_column("depth", Some("km"), vec![1.0]);
        let mut b = Table::new();
        b.push_column("depth", Some("km"), vec![2.0, 3.0]);
        a.append_rows(b).unwrap();
        assert_eq!(a.column("depth").unwrap().values, vec![1.0, 2.0, 3.0]);

        let mut c = Table::new();
        c.push_column("vs", None, vec![4.0]);
        assert_matches!(a.append_rows(c), Err(GeoError::ShapeMismatch(_)));
    }

    #[test]
    fn lossy_columns_turn_labels_into_nan() {
        let (_dir, path) = write_temp("F21 2017-05-01 61.2 -149.9\n");
        let table = read_columns_lossy(
            &path,
            None,
            0,
            &[("flight_id", None), ("date", None), ("latitude", None), ("longitude", None)],
        )
        .unwrap();
        assert!(table.column("flight_id").unwrap().values[0].is_nan());
        assert_eq!(table.column("latitude").unwrap().values, vec![61.2]);
    }

    #[test]
    fn header_csv_tolerates_labels() {
        let (_dir, path) = write_temp("depth,lith\n1.5,sand\n2.5,shale\n");
        let table = read_csv_with_header(&path, ',').unwrap();
        assert_eq!(table.column("depth").unwrap().values, vec![1.5, 2.5]);
        assert!(table.column("lith").unwrap().values[0].is_nan());
    }
}

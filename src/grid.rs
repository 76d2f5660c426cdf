//! A minimal labeled grid: named dimensions, coordinate arrays, and data
//! variables with attached metadata. Gridded loaders parse into this and
//! merge per-field components on shared coordinates.

use std::collections::BTreeMap;
use std::fs;

use camino::Utf8Path;

use crate::dataset::Attrs;
use crate::error::GeoError;

#[derive(Debug, Clone)]
pub struct DataVar {
    pub dims: Vec<String>,
    pub values: Vec<f64>,
    pub attrs: Attrs,
}

impl DataVar {
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

    /// Multiply every value by `factor`. Callers that rescale units must
    /// refresh `actual_range` afterwards so values and range stay paired.
    pub fn scale(&mut self, factor: f64) {
        for value in &mut self.values {
            *value *= factor;
        }
    }

    /// Record the `[min, max]` of the current values in the attrs map.
    pub fn set_actual_range(&mut self) {
        if let (Some(min), Some(max)) = (self.min(), self.max()) {
            self.attrs
                .insert("actual_range".to_string(), serde_json::json!([min, max]));
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Grid {
    dims: Vec<(String, usize)>,
    coords: BTreeMap<String, Vec<f64>>,
    coord_attrs: BTreeMap<String, Attrs>,
    vars: BTreeMap<String, DataVar>,
    attrs: Attrs,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dim(&mut self, name: impl Into<String>, size: usize) -> Result<(), GeoError> {
        let name = name.into();
        match self.dim_len(&name) {
            Some(existing) if existing != size => Err(GeoError::ShapeMismatch(format!(
                "dimension {name} has size {existing}, cannot redefine as {size}"
            ))),
            Some(_) => Ok(()),
            None => {
                self.dims.push((name, size));
                Ok(())
            }
        }
    }

    pub fn set_coord(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), GeoError> {
        let name = name.into();
        let size = self
            .dim_len(&name)
            .ok_or_else(|| GeoError::ShapeMismatch(format!("coordinate {name} has no dimension")))?;
        if values.len() != size {
            return Err(GeoError::ShapeMismatch(format!(
                "coordinate {name} has {} values for dimension of size {size}",
                values.len()
            )));
        }
        self.coords.insert(name, values);
        Ok(())
    }

    pub fn add_var(
        &mut self,
        name: impl Into<String>,
        dims: &[&str],
        values: Vec<f64>,
        attrs: Attrs,
    ) -> Result<(), GeoError> {
        let name = name.into();
        if self.vars.contains_key(&name) {
            return Err(GeoError::ShapeMismatch(format!(
                "variable {name} already present"
            )));
        }
        let mut expected = 1usize;
        for dim in dims {
            let size = self.dim_len(dim).ok_or_else(|| {
                GeoError::ShapeMismatch(format!("variable {name} references unknown dimension {dim}"))
            })?;
            expected *= size;
        }
        if values.len() != expected {
            return Err(GeoError::ShapeMismatch(format!(
                "variable {name} has {} values for shape of {expected}",
                values.len()
            )));
        }
        self.vars.insert(
            name,
            DataVar {
                dims: dims.iter().map(|dim| dim.to_string()).collect(),
                values,
                attrs,
            },
        );
        Ok(())
    }

    pub fn dim_len(&self, name: &str) -> Option<usize> {
        self.dims
            .iter()
            .find(|(dim, _)| dim == name)
            .map(|(_, size)| *size)
    }

    pub fn dims(&self) -> &[(String, usize)] {
        &self.dims
    }

    pub fn coord(&self, name: &str) -> Option<&[f64]> {
        self.coords.get(name).map(Vec::as_slice)
    }

    pub fn coord_attrs(&self, name: &str) -> Option<&Attrs> {
        self.coord_attrs.get(name)
    }

    /// Attach `long_name` and `units` to an existing coordinate and record
    /// its `[min, max]` in `actual_range`.
    pub fn annotate_coord(
        &mut self,
        name: &str,
        long_name: &str,
        units: &str,
    ) -> Result<(), GeoError> {
        let range = self
            .coords
            .get(name)
            .and_then(|values| {
                let min = values.iter().copied().filter(|v| !v.is_nan()).reduce(f64::min)?;
                let max = values.iter().copied().filter(|v| !v.is_nan()).reduce(f64::max)?;
                Some(serde_json::json!([min, max]))
            })
            .ok_or_else(|| {
                GeoError::ShapeMismatch(format!("coordinate {name} has no values"))
            })?;
        let attrs = self.coord_attrs.entry(name.to_string()).or_default();
        attrs.insert("long_name".to_string(), serde_json::Value::from(long_name));
        attrs.insert("units".to_string(), serde_json::Value::from(units));
        attrs.insert("actual_range".to_string(), range);
        Ok(())
    }

    pub fn var(&self, name: &str) -> Option<&DataVar> {
        self.vars.get(name)
    }

    pub fn var_mut(&mut self, name: &str) -> Option<&mut DataVar> {
        self.vars.get_mut(name)
    }

    pub fn var_names(&self) -> Vec<&str> {
        self.vars.keys().map(String::as_str).collect()
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut Attrs {
        &mut self.attrs
    }

    /// Merge another grid into this one, aligning on shared dimensions and
    /// coordinates. A shared dimension with a different size, a shared
    /// coordinate with different values, or a duplicate variable name is a
    /// [`GeoError::ShapeMismatch`]. Components defined on deliberately
    /// different meshes must use distinct dimension names.
    pub fn merge(&mut self, other: Grid) -> Result<(), GeoError> {
        for (dim, size) in other.dims {
            self.add_dim(dim, size)?;
        }
        for (name, values) in other.coords {
            match self.coords.get(&name) {
                Some(existing) if existing != &values => {
                    return Err(GeoError::ShapeMismatch(format!(
                        "coordinate {name} differs between merged components"
                    )));
                }
                Some(_) => {}
                None => {
                    self.set_coord(name, values)?;
                }
            }
        }
        for (name, attrs) in other.coord_attrs {
            let merged = self.coord_attrs.entry(name).or_default();
            for (key, value) in attrs {
                merged.entry(key).or_insert(value);
            }
        }
        for (name, var) in other.vars {
            if self.vars.contains_key(&name) {
                return Err(GeoError::ShapeMismatch(format!(
                    "variable {name} already present"
                )));
            }
            self.vars.insert(name, var);
        }
        for (key, value) in other.attrs {
            self.attrs.entry(key).or_insert(value);
        }
        Ok(())
    }
}

/// Read a plain-text `x y value` grid (one point per line, `#` comments
/// skipped) into a [`Grid`] with ascending coordinates and a single data
/// variable laid out row-major as `(y_dim, x_dim)`. The points must form a
/// complete rectangular mesh.
pub fn read_xyz_grid(
    path: &Utf8Path,
    var: &str,
    x_dim: &str,
    y_dim: &str,
) -> Result<Grid, GeoError> {
    let content = fs::read_to_string(path.as_std_path())
        .map_err(|err| GeoError::Filesystem(format!("read {path}: {err}")))?;

    let mut points = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let point = (|| {
            let x = fields.next()?.parse::<f64>().ok()?;
            let y = fields.next()?.parse::<f64>().ok()?;
            let value = fields.next()?.parse::<f64>().ok()?;
            fields.next().is_none().then_some((x, y, value))
        })()
        .ok_or_else(|| GeoError::Parse {
            path: path.to_string(),
            message: format!("line {}: expected `x y value`", index + 1),
        })?;
        points.push(point);
    }

    let xs = sorted_unique(points.iter().map(|(x, _, _)| *x));
    let ys = sorted_unique(points.iter().map(|(_, y, _)| *y));
    if points.len() != xs.len() * ys.len() {
        return Err(GeoError::Parse {
            path: path.to_string(),
            message: format!(
                "{} points do not form a {}x{} mesh",
                points.len(),
                ys.len(),
                xs.len()
            ),
        });
    }

    let mut values = vec![f64::NAN; xs.len() * ys.len()];
    for (x, y, value) in points {
        let col = index_of(&xs, x);
        let row = index_of(&ys, y);
        values[row * xs.len() + col] = value;
    }

    let mut grid = Grid::new();
    grid.add_dim(y_dim, ys.len())?;
    grid.add_dim(x_dim, xs.len())?;
    grid.set_coord(y_dim, ys)?;
    grid.set_coord(x_dim, xs)?;
    grid.add_var(var, &[y_dim, x_dim], values, Attrs::new())?;
    Ok(grid)
}

fn sorted_unique(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.collect();
    out.sort_by(|a, b| a.total_cmp(b));
    out.dedup();
    out
}

fn index_of(sorted: &[f64], value: f64) -> usize {
    sorted
        .binary_search_by(|probe| probe.total_cmp(&value))
        .unwrap_or(0)
}

//! Table model behind the ROI list widget: one row per registered ROI.

use crate::layer::NameSource;
use roikit_core::{Error, Result, ShapeKind};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// One list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoiListRow {
    pub name: String,
    pub kind: ShapeKind,
}

/// Column of the list table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoiListColumn {
    /// Editable display name.
    Name,
    /// Read-only shape kind.
    Type,
}

impl RoiListColumn {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RoiListColumn::Name => "name",
            RoiListColumn::Type => "type",
        }
    }
}

impl fmt::Display for RoiListColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoiListColumn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "name" => Ok(RoiListColumn::Name),
            "type" => Ok(RoiListColumn::Type),
            _ => Err(Error::InvalidArgument(format!("column {s:?} not found"))),
        }
    }
}

/// Rows `{name, type}` plus a row selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoiList {
    rows: Vec<RoiListRow>,
    selected: BTreeSet<usize>,
}

impl RoiList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row.
    pub fn add_row(&mut self, name: impl Into<String>, kind: ShapeKind) {
        self.rows.push(RoiListRow {
            name: name.into(),
            kind,
        });
    }

    /// Removes row `row`; selected rows after it shift up.
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] past the end.
    pub fn remove_row(&mut self, row: usize) -> Result<RoiListRow> {
        self.check_row(row)?;
        self.selected = self
            .selected
            .iter()
            .filter(|&&i| i != row)
            .map(|&i| if i > row { i - 1 } else { i })
            .collect();
        Ok(self.rows.remove(row))
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Row names in display order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.name.clone()).collect()
    }

    #[must_use]
    pub fn rows(&self) -> &[RoiListRow] {
        &self.rows
    }

    /// Values of the named column, one per row.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] for an unknown column.
    pub fn get_column(&self, column: &str) -> Result<Vec<String>> {
        let values = match column.parse::<RoiListColumn>()? {
            RoiListColumn::Name => self.rows.iter().map(|r| r.name.clone()).collect(),
            RoiListColumn::Type => self.rows.iter().map(|r| r.kind.to_string()).collect(),
        };
        Ok(values)
    }

    /// Overwrites the named column.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] for an unknown column,
    /// [`Error::LengthMismatch`] unless there is one value per row, and
    /// [`Error::UnsupportedShape`] for an unknown kind in the type column.
    pub fn set_column(&mut self, column: &str, values: Vec<String>) -> Result<()> {
        let column = column.parse::<RoiListColumn>()?;
        if values.len() != self.rows.len() {
            return Err(Error::LengthMismatch {
                what: "list column",
                expected: self.rows.len(),
                found: values.len(),
            });
        }
        match column {
            RoiListColumn::Name => {
                for (row, name) in self.rows.iter_mut().zip(values) {
                    row.name = name;
                }
            }
            RoiListColumn::Type => {
                let kinds = values
                    .iter()
                    .map(|v| v.parse::<ShapeKind>())
                    .collect::<Result<Vec<_>>>()?;
                for (row, kind) in self.rows.iter_mut().zip(kinds) {
                    row.kind = kind;
                }
            }
        }
        Ok(())
    }

    /// Renames one row.
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] past the end.
    pub fn rename(&mut self, row: usize, name: impl Into<String>) -> Result<()> {
        self.check_row(row)?;
        self.rows[row].name = name.into();
        Ok(())
    }

    /// Replaces the row selection.
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] for a row past the end.
    pub fn select_rows<I: IntoIterator<Item = usize>>(&mut self, rows: I) -> Result<()> {
        let rows: BTreeSet<usize> = rows.into_iter().collect();
        if let Some(&row) = rows.iter().find(|&&r| r >= self.rows.len()) {
            return self.check_row(row);
        }
        self.selected = rows;
        Ok(())
    }

    #[must_use]
    pub fn selected_rows(&self) -> &BTreeSet<usize> {
        &self.selected
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row >= self.rows.len() {
            return Err(Error::IndexOutOfRange {
                index: row,
                len: self.rows.len(),
            });
        }
        Ok(())
    }
}

impl NameSource for RoiList {
    fn names(&self) -> Vec<String> {
        RoiList::names(self)
    }
}

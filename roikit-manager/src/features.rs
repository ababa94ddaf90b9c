//! Per-shape feature table: sequential ids plus an optional name column.

use roikit_core::{Error, Result};

/// One feature row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeatureRow {
    pub id: u32,
    pub name: Option<String>,
}

/// Column-oriented feature table, index-aligned with a shape sequence.
///
/// The `names` column is either absent or exactly as long as `ids`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeatureTable {
    ids: Vec<u32>,
    names: Option<Vec<String>>,
}

#[allow(clippy::cast_possible_truncation)]
fn id_of(index: usize) -> u32 {
    index as u32
}

impl FeatureTable {
    /// Creates an empty table without a name column.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The id column.
    #[must_use]
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    /// The name column, if present.
    #[must_use]
    pub fn names(&self) -> Option<&[String]> {
        self.names.as_deref()
    }

    /// Returns true if the name column exists.
    #[must_use]
    pub fn has_names(&self) -> bool {
        self.names.is_some()
    }

    /// Returns row `index`.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<FeatureRow> {
        let id = *self.ids.get(index)?;
        Some(FeatureRow {
            id,
            name: self.names.as_ref().map(|names| names[index].clone()),
        })
    }

    /// Appends a row. A name on a table without a name column creates the
    /// column, filling earlier rows with empty names.
    pub fn push(&mut self, row: FeatureRow) {
        let n = self.ids.len();
        self.ids.push(row.id);
        match (&mut self.names, row.name) {
            (Some(names), name) => names.push(name.unwrap_or_default()),
            (None, Some(name)) => {
                let mut names = vec![String::new(); n];
                names.push(name);
                self.names = Some(names);
            }
            (None, None) => {}
        }
    }

    /// Removes and returns row `index`.
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] past the end.
    pub fn remove(&mut self, index: usize) -> Result<FeatureRow> {
        if index >= self.ids.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.ids.len(),
            });
        }
        let id = self.ids.remove(index);
        let name = self.names.as_mut().map(|names| names.remove(index));
        Ok(FeatureRow { id, name })
    }

    /// Appends all rows of `other`, reconciling the name columns.
    pub fn append(&mut self, other: FeatureTable) {
        let (n, m) = (self.ids.len(), other.ids.len());
        self.ids.extend(other.ids);
        self.names = match (self.names.take(), other.names) {
            (None, None) => None,
            (Some(mut a), Some(b)) => {
                a.extend(b);
                Some(a)
            }
            (Some(mut a), None) => {
                a.resize(n + m, String::new());
                Some(a)
            }
            (None, Some(b)) => {
                let mut a = vec![String::new(); n];
                a.extend(b);
                Some(a)
            }
        };
    }

    /// Rewrites the id column as `0..len`.
    pub fn relabel_ids(&mut self) {
        for (i, id) in self.ids.iter_mut().enumerate() {
            *id = id_of(i);
        }
    }

    /// Replaces the name column; shorter input is padded with `fill(i)`.
    pub fn set_names<F>(&mut self, mut names: Vec<String>, fill: F)
    where
        F: Fn(usize) -> String,
    {
        let n = self.ids.len();
        names.truncate(n);
        for i in names.len()..n {
            names.push(fill(i));
        }
        self.names = Some(names);
    }

    /// Sets the name of row `index`, creating the name column if needed.
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] past the end.
    pub fn set_name(&mut self, index: usize, name: impl Into<String>) -> Result<()> {
        let len = self.ids.len();
        if index >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        let names = self.names.get_or_insert_with(|| vec![String::new(); len]);
        names[index] = name.into();
        Ok(())
    }

    /// Removes every row; the name column, if any, is kept empty.
    pub fn clear(&mut self) {
        self.ids.clear();
        if let Some(names) = &mut self.names {
            names.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: u32, name: Option<&str>) -> FeatureRow {
        FeatureRow {
            id,
            name: name.map(str::to_string),
        }
    }

    #[test]
    fn test_push_creates_name_column() {
        let mut table = FeatureTable::new();
        table.push(row(0, None));
        assert!(!table.has_names());
        table.push(row(1, Some("b")));
        assert_eq!(table.names().unwrap(), &["".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_remove_and_relabel() {
        let mut table = FeatureTable::new();
        for i in 0..4 {
            table.push(row(i, Some(&format!("n{i}"))));
        }
        assert_eq!(table.remove(1).unwrap(), row(1, Some("n1")));
        table.relabel_ids();
        assert_eq!(table.ids(), &[0, 1, 2]);
        assert_eq!(table.row(1), Some(row(1, Some("n2"))));
        assert!(matches!(
            table.remove(3),
            Err(Error::IndexOutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_append_reconciles_names() {
        let mut a = FeatureTable::new();
        a.push(row(0, None));
        let mut b = FeatureTable::new();
        b.push(row(0, Some("x")));
        a.append(b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.names().unwrap(), &["".to_string(), "x".to_string()]);
    }

    #[test]
    fn test_set_names_pads() {
        let mut table = FeatureTable::new();
        for i in 0..3 {
            table.push(row(i, None));
        }
        table.set_names(vec!["a".into()], |i| format!("ROI-{i:04}"));
        assert_eq!(
            table.names().unwrap(),
            &["a".to_string(), "ROI-0001".to_string(), "ROI-0002".to_string()]
        );
        table.set_name(2, "c").unwrap();
        assert_eq!(table.row(2).unwrap().name.as_deref(), Some("c"));
    }
}

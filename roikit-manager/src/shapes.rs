//! Headless shape canvas: the live shape sequence with kinds, features,
//! selection and label text options.

use crate::features::{FeatureRow, FeatureTable};
use roikit_core::{Error, Result, RoiData, ShapeData, ShapeKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Smallest label font size.
pub const MIN_TEXT_SIZE: u32 = 4;
/// Largest label font size.
pub const MAX_TEXT_SIZE: u32 = 64;

/// Feature column rendered as the shape label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFeatureName {
    #[default]
    Id,
    Name,
}

impl TextFeatureName {
    /// Column name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TextFeatureName::Id => "id",
            TextFeatureName::Name => "name",
        }
    }
}

impl fmt::Display for TextFeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextFeatureName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "id" => Ok(TextFeatureName::Id),
            "name" => Ok(TextFeatureName::Name),
            _ => Err(Error::InvalidArgument(format!(
                "text feature must be \"id\" or \"name\", got {s:?}"
            ))),
        }
    }
}

/// Label text options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextOptions {
    pub visible: bool,
    pub size: u32,
    pub feature_name: TextFeatureName,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            visible: false,
            size: 9,
            feature_name: TextFeatureName::Id,
        }
    }
}

/// Shapes moved out of a canvas in one piece.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeColumns {
    pub data: Vec<ShapeData>,
    pub kinds: Vec<ShapeKind>,
    pub features: FeatureTable,
}

/// An ordered shape collection with per-shape kind and features.
///
/// Mutations here are raw: they do not notify anyone. The state machine in
/// [`crate::RoiLayer`] wraps them with notifications.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shapes {
    data: Vec<ShapeData>,
    kinds: Vec<ShapeKind>,
    features: FeatureTable,
    feature_defaults: FeatureRow,
    selected: BTreeSet<usize>,
    text: TextOptions,
}

impl Shapes {
    /// Creates an empty canvas.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached canvas holding `rois`, ids `0..n` and the names
    /// column if present.
    #[must_use]
    pub fn from_roi_data(rois: &RoiData) -> Self {
        let mut shapes = Self::new();
        for (i, (shape, kind)) in rois.data.iter().zip(&rois.shape_type).enumerate() {
            let name = rois
                .names
                .as_ref()
                .and_then(|names| names.get(i).cloned());
            shapes.push_row(shape.clone(), *kind, FeatureRow { id: 0, name });
        }
        shapes.features.relabel_ids();
        shapes
    }

    /// Number of shapes.
    #[must_use]
    pub fn nshapes(&self) -> usize {
        self.data.len()
    }

    /// Returns true if there are no shapes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn data(&self) -> &[ShapeData] {
        &self.data
    }

    #[must_use]
    pub fn kinds(&self) -> &[ShapeKind] {
        &self.kinds
    }

    #[must_use]
    pub fn features(&self) -> &FeatureTable {
        &self.features
    }

    pub fn features_mut(&mut self) -> &mut FeatureTable {
        &mut self.features
    }

    /// Feature row given to the next appended shape.
    #[must_use]
    pub fn feature_defaults(&self) -> &FeatureRow {
        &self.feature_defaults
    }

    pub fn set_feature_defaults(&mut self, row: FeatureRow) {
        self.feature_defaults = row;
    }

    #[must_use]
    pub fn selected(&self) -> &BTreeSet<usize> {
        &self.selected
    }

    /// Replaces the selection, dropping indices past the end.
    pub fn set_selected<I: IntoIterator<Item = usize>>(&mut self, indices: I) {
        let n = self.data.len();
        self.selected = indices.into_iter().filter(|&i| i < n).collect();
    }

    #[must_use]
    pub fn text(&self) -> &TextOptions {
        &self.text
    }

    pub fn text_mut(&mut self) -> &mut TextOptions {
        &mut self.text
    }

    /// Appends a shape with the current feature defaults; returns its index.
    pub fn push(&mut self, shape: ShapeData, kind: ShapeKind) -> usize {
        let row = self.feature_defaults.clone();
        self.push_row(shape, kind, row)
    }

    /// Appends a shape with an explicit feature row; returns its index.
    pub fn push_row(&mut self, shape: ShapeData, kind: ShapeKind, row: FeatureRow) -> usize {
        self.data.push(shape);
        self.kinds.push(kind);
        self.features.push(row);
        self.data.len() - 1
    }

    /// Removes the shapes at `indices`, clearing the selection.
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] if any index is past the end; the
    /// canvas is left unchanged in that case.
    pub fn remove(&mut self, indices: &BTreeSet<usize>) -> Result<()> {
        let len = self.data.len();
        if let Some(&index) = indices.iter().find(|&&i| i >= len) {
            return Err(Error::IndexOutOfRange { index, len });
        }
        for &i in indices.iter().rev() {
            self.data.remove(i);
            self.kinds.remove(i);
            self.features.remove(i)?;
        }
        self.selected.clear();
        Ok(())
    }

    /// Removes and returns one shape with its kind and feature row.
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] past the end.
    pub fn take(&mut self, index: usize) -> Result<(ShapeData, ShapeKind, FeatureRow)> {
        let row = self.features.remove(index)?;
        self.selected.remove(&index);
        self.selected = self
            .selected
            .iter()
            .map(|&i| if i > index { i - 1 } else { i })
            .collect();
        Ok((self.data.remove(index), self.kinds.remove(index), row))
    }

    /// Moves every shape out, leaving the canvas empty.
    pub fn take_all(&mut self) -> ShapeColumns {
        self.selected.clear();
        let mut features = FeatureTable::new();
        std::mem::swap(&mut features, &mut self.features);
        if features.has_names() {
            // keep the column so later rows get names too
            self.features.set_names(Vec::new(), |_| String::new());
        }
        ShapeColumns {
            data: std::mem::take(&mut self.data),
            kinds: std::mem::take(&mut self.kinds),
            features,
        }
    }

    /// Replaces every shape.
    pub fn set_all(&mut self, columns: ShapeColumns) {
        debug_assert_eq!(columns.data.len(), columns.kinds.len());
        debug_assert_eq!(columns.data.len(), columns.features.len());
        self.selected.clear();
        self.data = columns.data;
        self.kinds = columns.kinds;
        self.features = columns.features;
    }

    /// Rewrites the id column as `0..n`.
    pub fn relabel_ids(&mut self) {
        self.features.relabel_ids();
    }

    /// Label strings for every shape, from the configured feature column.
    #[must_use]
    pub fn text_labels(&self) -> Vec<String> {
        match self.text.feature_name {
            TextFeatureName::Id => self.features.ids().iter().map(ToString::to_string).collect(),
            TextFeatureName::Name => match self.features.names() {
                Some(names) => names.to_vec(),
                None => vec![String::new(); self.nshapes()],
            },
        }
    }

    /// Copies the shapes into a record store.
    #[must_use]
    pub fn to_roi_data(&self) -> RoiData {
        RoiData {
            data: self.data.clone(),
            shape_type: self.kinds.clone(),
            names: self.features.names().map(<[String]>::to_vec),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(offset: f64) -> ShapeData {
        ShapeData::new(vec![
            [offset, offset],
            [offset, offset + 2.0],
            [offset + 2.0, offset + 2.0],
            [offset + 2.0, offset],
        ])
    }

    #[test]
    fn test_push_and_remove() {
        let mut shapes = Shapes::new();
        for i in 0..4 {
            shapes.push(square(f64::from(i)), ShapeKind::Rectangle);
        }
        shapes.set_selected([1, 3, 9]);
        assert_eq!(shapes.selected(), &BTreeSet::from([1, 3]));
        shapes.remove(&BTreeSet::from([0, 2])).unwrap();
        assert_eq!(shapes.nshapes(), 2);
        assert_eq!(shapes.data()[0], square(1.0));
        assert!(shapes.selected().is_empty());
        assert!(shapes.remove(&BTreeSet::from([5])).is_err());
        assert_eq!(shapes.nshapes(), 2);
    }

    #[test]
    fn test_take_shifts_selection() {
        let mut shapes = Shapes::new();
        for i in 0..3 {
            shapes.push(square(f64::from(i)), ShapeKind::Ellipse);
        }
        shapes.set_selected([0, 2]);
        let (shape, kind, _) = shapes.take(1).unwrap();
        assert_eq!(shape, square(1.0));
        assert_eq!(kind, ShapeKind::Ellipse);
        assert_eq!(shapes.selected(), &BTreeSet::from([0, 1]));
    }

    #[test]
    fn test_text_feature_name_parse() {
        assert_eq!("name".parse::<TextFeatureName>().unwrap(), TextFeatureName::Name);
        assert!(matches!(
            "label".parse::<TextFeatureName>(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_from_roi_data() {
        let rois = RoiData::new(
            vec![square(0.0), square(5.0)],
            vec![ShapeKind::Rectangle, ShapeKind::Ellipse],
            Some(vec!["a".into(), "b".into()]),
        )
        .unwrap();
        let shapes = Shapes::from_roi_data(&rois);
        assert_eq!(shapes.features().ids(), &[0, 1]);
        assert_eq!(shapes.to_roi_data(), rois);
    }
}

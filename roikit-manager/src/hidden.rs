//! The hidden set: registered shapes parked while `show_all` is off.

use crate::features::{FeatureRow, FeatureTable};
use roikit_core::{Error, Result, ShapeData, ShapeKind};
use std::collections::BTreeSet;

/// Everything parked by a visibility-off transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HiddenSnapshot {
    pub data: Vec<ShapeData>,
    pub kinds: Vec<ShapeKind>,
    pub features: FeatureTable,
    pub selected: BTreeSet<usize>,
    pub current_item: Option<usize>,
    pub text_visible: bool,
}

/// One shape taken out of the buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct HiddenEntry {
    pub shape: ShapeData,
    pub kind: ShapeKind,
    pub feature: FeatureRow,
}

/// Owner of the hidden half of the collection.
///
/// Entries are moved in and out; nothing is shared with the live canvas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HiddenBuffer {
    snapshot: HiddenSnapshot,
}

impl HiddenBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties shapes, kinds, features, selection and the current item.
    pub fn clear(&mut self) {
        let text_visible = self.snapshot.text_visible;
        self.snapshot = HiddenSnapshot {
            text_visible,
            ..HiddenSnapshot::default()
        };
    }

    /// Swaps in a whole new snapshot.
    pub fn replace_with(
        &mut self,
        data: Vec<ShapeData>,
        kinds: Vec<ShapeKind>,
        features: FeatureTable,
        selected: BTreeSet<usize>,
        current_item: Option<usize>,
        text_visible: bool,
    ) {
        debug_assert_eq!(data.len(), kinds.len());
        debug_assert_eq!(data.len(), features.len());
        self.snapshot = HiddenSnapshot {
            data,
            kinds,
            features,
            selected,
            current_item,
            text_visible,
        };
    }

    /// Removes and returns entry `index`.
    ///
    /// `index` leaves the selection and higher selected indices, like the
    /// stored current item, shift down by one.
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] past the end.
    pub fn pop(&mut self, index: usize) -> Result<HiddenEntry> {
        let feature = self.snapshot.features.remove(index)?;
        let shape = self.snapshot.data.remove(index);
        let kind = self.snapshot.kinds.remove(index);
        let shift = |i: usize| if i > index { i - 1 } else { i };
        self.snapshot.selected = self
            .snapshot
            .selected
            .iter()
            .filter(|&&i| i != index)
            .map(|&i| shift(i))
            .collect();
        self.snapshot.current_item = self
            .snapshot
            .current_item
            .filter(|&i| i != index)
            .map(shift);
        Ok(HiddenEntry {
            shape,
            kind,
            feature,
        })
    }

    /// Number of parked shapes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.snapshot.data.len()
    }

    /// Returns true if nothing is parked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot.data.is_empty()
    }

    /// Parks one more shape at the end.
    pub fn push(&mut self, shape: ShapeData, kind: ShapeKind, feature: FeatureRow) {
        self.snapshot.data.push(shape);
        self.snapshot.kinds.push(kind);
        self.snapshot.features.push(feature);
    }

    /// Moves the whole snapshot out, leaving the buffer empty.
    pub fn take(&mut self) -> HiddenSnapshot {
        std::mem::take(&mut self.snapshot)
    }

    /// Renames parked entry `index`.
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] past the end.
    pub fn rename(&mut self, index: usize, name: impl Into<String>) -> Result<()> {
        self.snapshot.features.set_name(index, name)
    }

    /// Parked shapes.
    #[must_use]
    pub fn data(&self) -> &[ShapeData] {
        &self.snapshot.data
    }

    /// Parked shape kinds.
    #[must_use]
    pub fn kinds(&self) -> &[ShapeKind] {
        &self.snapshot.kinds
    }

    /// Parked feature rows.
    #[must_use]
    pub fn features(&self) -> &FeatureTable {
        &self.snapshot.features
    }

    pub(crate) fn features_mut(&mut self) -> &mut FeatureTable {
        &mut self.snapshot.features
    }

    /// Selection at the time of parking.
    #[must_use]
    pub fn selected(&self) -> &BTreeSet<usize> {
        &self.snapshot.selected
    }

    /// Current item at the time of parking, if it was not pulled back out.
    #[must_use]
    pub fn current_item(&self) -> Option<usize> {
        self.snapshot.current_item
    }

    /// Label visibility at the time of parking.
    #[must_use]
    pub fn text_visible(&self) -> bool {
        self.snapshot.text_visible
    }

    /// Entry `index` as a kind, for bounds-checked lookups.
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] past the end.
    pub fn kind(&self, index: usize) -> Result<ShapeKind> {
        self.snapshot
            .kinds
            .get(index)
            .copied()
            .ok_or(Error::IndexOutOfRange {
                index,
                len: self.size(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(n: usize) -> HiddenBuffer {
        let mut buffer = HiddenBuffer::new();
        for i in 0..n {
            #[allow(clippy::cast_precision_loss)]
            let v = i as f64;
            buffer.push(
                ShapeData::new(vec![[v, v], [v + 1.0, v + 1.0]]),
                ShapeKind::Line,
                FeatureRow {
                    id: u32::try_from(i).unwrap(),
                    name: None,
                },
            );
        }
        buffer
    }

    #[test]
    fn test_pop_shifts_selection() {
        let mut buffer = filled(5);
        let HiddenSnapshot {
            data,
            kinds,
            features,
            ..
        } = buffer.take();
        buffer.replace_with(
            data,
            kinds,
            features,
            BTreeSet::from([0, 2, 4]),
            Some(3),
            true,
        );
        let entry = buffer.pop(2).unwrap();
        assert_eq!(entry.feature.id, 2);
        assert_eq!(buffer.size(), 4);
        assert_eq!(buffer.selected(), &BTreeSet::from([0, 3]));
        assert_eq!(buffer.current_item(), Some(2));
        assert!(buffer.text_visible());
    }

    #[test]
    fn test_pop_current_clears_it() {
        let mut buffer = filled(2);
        let snap = buffer.take();
        buffer.replace_with(
            snap.data,
            snap.kinds,
            snap.features,
            BTreeSet::from([1]),
            Some(1),
            false,
        );
        buffer.pop(1).unwrap();
        assert_eq!(buffer.current_item(), None);
        assert!(buffer.selected().is_empty());
        assert!(buffer.pop(5).is_err());
    }

    #[test]
    fn test_take_and_clear_empty_buffer() {
        let mut buffer = filled(3);
        let snap = buffer.take();
        assert_eq!(snap.data.len(), 3);
        assert_eq!(buffer.size(), 0);

        let mut buffer = filled(3);
        buffer.clear();
        assert!(buffer.is_empty());
        assert!(buffer.features().is_empty());
    }

    #[test]
    fn test_rename() {
        let mut buffer = filled(2);
        buffer.rename(1, "nucleus").unwrap();
        assert_eq!(buffer.features().row(1).unwrap().name.as_deref(), Some("nucleus"));
        assert!(buffer.rename(2, "x").is_err());
    }
}

//! ROI collection state machine.
//!
//! [`RoiLayer`] owns the live shape sequence (the canvas), the hidden set
//! and the uncommitted `current_item`. Canvas entry points ([`RoiLayer::add`],
//! [`RoiLayer::remove`], [`RoiLayer::set_selected`]) go through the data
//! channel; the layer reacts to its own data events before any external
//! subscriber sees them, and raises `roi_added` / `roi_removed` for
//! registered ROIs.
//!
//! Invariants kept after every public call:
//! - `current_item`, when set, is the last live index;
//! - the id feature column of both the live canvas and the hidden set is
//!   `0..n`;
//! - the hidden set is empty while `show_all` is on.

use crate::config::ManagerConfig;
use crate::events::{
    ActionType, DataEvent, EventEmitter, LayerEvents, RoiAdded, RoiRemoved,
};
use crate::features::{FeatureRow, FeatureTable};
use crate::hidden::HiddenBuffer;
use crate::shapes::{ShapeColumns, Shapes, TextFeatureName, MAX_TEXT_SIZE, MIN_TEXT_SIZE};
use crate::Result;
use log::debug;
use roikit_core::{Error as CoreError, RoiData, RoiTuple, ShapeData, ShapeKind};
use roikit_ij::BatchPolicy;
use roikit_io::ReadOptions;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::Path;
use std::rc::Weak;

/// Supplier of the registered ROI names, one per list row.
pub trait NameSource {
    fn names(&self) -> Vec<String>;
}

/// Parses a textual `show_all` flag.
///
/// Accepts `true`/`false`, `1`/`0`, `yes`/`no` and `on`/`off`, ignoring case.
///
/// # Errors
/// Returns an invalid-argument error for anything else.
pub fn parse_show_all(value: &str) -> roikit_core::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(CoreError::InvalidArgument(format!(
            "show_all must be a boolean, got {value:?}"
        ))),
    }
}

/// Generated name of registered row `index`.
pub(crate) fn default_name(prefix: &str, index: usize) -> String {
    format!("{prefix}{index:04}")
}

#[allow(clippy::cast_possible_truncation)]
fn id_of(index: usize) -> u32 {
    index as u32
}

fn check_indices(indices: &BTreeSet<usize>, len: usize) -> roikit_core::Result<()> {
    match indices.iter().find(|&&i| i >= len) {
        Some(&index) => Err(CoreError::IndexOutOfRange { index, len }),
        None => Ok(()),
    }
}

/// Headless ROI layer.
#[derive(Debug)]
pub struct RoiLayer {
    shapes: Shapes,
    hidden: HiddenBuffer,
    current_item: Option<usize>,
    show_all: bool,
    name_prefix: String,
    policy: BatchPolicy,
    name_source: Option<Weak<RefCell<dyn NameSource>>>,
    data_events: EventEmitter<DataEvent>,
    events: LayerEvents,
}

impl Default for RoiLayer {
    fn default() -> Self {
        Self::new(&ManagerConfig::default())
    }
}

impl RoiLayer {
    /// Creates an empty layer.
    #[must_use]
    pub fn new(config: &ManagerConfig) -> Self {
        let mut shapes = Shapes::new();
        *shapes.text_mut() = config.text.clone();
        Self {
            shapes,
            hidden: HiddenBuffer::new(),
            current_item: None,
            show_all: config.show_all,
            name_prefix: config.name_prefix.clone(),
            policy: config.batch_policy(),
            name_source: None,
            data_events: EventEmitter::new(),
            events: LayerEvents::default(),
        }
    }

    /// Attaches the supplier of registered names (normally the list model).
    pub fn set_name_source(&mut self, source: Weak<RefCell<dyn NameSource>>) {
        self.name_source = Some(source);
    }

    /// The live canvas.
    #[must_use]
    pub fn shapes(&self) -> &Shapes {
        &self.shapes
    }

    /// The hidden set.
    #[must_use]
    pub fn hidden(&self) -> &HiddenBuffer {
        &self.hidden
    }

    /// Live index of the drawn but unregistered shape.
    #[must_use]
    pub fn current_item(&self) -> Option<usize> {
        self.current_item
    }

    #[must_use]
    pub fn show_all(&self) -> bool {
        self.show_all
    }

    /// Canvas data channel.
    #[must_use]
    pub fn data_events(&self) -> &EventEmitter<DataEvent> {
        &self.data_events
    }

    /// Registration channels.
    #[must_use]
    pub fn events(&self) -> &LayerEvents {
        &self.events
    }

    /// Number of registered ROIs.
    #[must_use]
    pub fn roi_count(&self) -> usize {
        if self.show_all {
            self.shapes.nshapes() - usize::from(self.current_item.is_some())
        } else {
            self.hidden.size()
        }
    }

    /// Draws a new shape on the canvas. The shape becomes the current item
    /// and any previous unregistered shape is discarded.
    ///
    /// # Errors
    /// Returns an unsupported-shape error if the vertex count does not fit
    /// `kind`.
    pub fn add(&mut self, shape: ShapeData, kind: ShapeKind) -> Result<usize> {
        shape.validate_for(kind)?;
        self.data_changed(&DataEvent::adding());
        let index = self.shapes.push(shape, kind);
        self.data_changed(&DataEvent::added(index));
        Ok(index)
    }

    /// Removes live shapes. Registered ROIs among them are reported on
    /// `roi_removed`.
    ///
    /// # Errors
    /// Returns an out-of-range error, leaving the layer unchanged, if any
    /// index is past the end.
    pub fn remove(&mut self, indices: &BTreeSet<usize>) -> Result<()> {
        check_indices(indices, self.shapes.nshapes())?;
        if indices.is_empty() {
            return Ok(());
        }
        let current = self.current_item;
        self.remove_live(indices)?;
        let registered: BTreeSet<usize> = indices
            .iter()
            .copied()
            .filter(|&i| Some(i) != current)
            .collect();
        if !registered.is_empty() {
            debug!("removed registered rows {registered:?}");
            self.events.roi_removed.emit(&RoiRemoved {
                indices: registered,
            });
        }
        Ok(())
    }

    /// Removes the selected live shapes.
    ///
    /// # Errors
    /// Propagates [`RoiLayer::remove`] errors.
    pub fn remove_selected(&mut self) -> Result<()> {
        let selected = self.shapes.selected().clone();
        self.remove(&selected)
    }

    /// Replaces the canvas selection.
    ///
    /// # Errors
    /// Returns an out-of-range error if any index is past the end.
    pub fn set_selected<I: IntoIterator<Item = usize>>(&mut self, indices: I) -> Result<()> {
        let indices: BTreeSet<usize> = indices.into_iter().collect();
        check_indices(&indices, self.shapes.nshapes())?;
        self.shapes.set_selected(indices);
        Ok(())
    }

    /// Commits the current item. Returns the list row it was registered at.
    ///
    /// # Errors
    /// Returns an out-of-range error if the current item is not live.
    pub fn register(&mut self) -> Result<Option<usize>> {
        let Some(current) = self.current_item.take() else {
            self.shapes.set_selected([]);
            return Ok(None);
        };
        let row = if self.show_all {
            current
        } else {
            self.hidden.size()
        };
        let kind = self.shapes.kinds().get(current).copied().ok_or(
            CoreError::IndexOutOfRange {
                index: current,
                len: self.shapes.nshapes(),
            },
        )?;
        if self.show_all {
            self.shapes.set_selected([]);
        } else {
            let (shape, kind, feature) = self.shapes.take(current)?;
            self.hidden.push(shape, kind, feature);
            self.hidden.features_mut().relabel_ids();
        }
        debug!("registered {kind} as row {row}");
        debug_assert_eq!(self.roi_count(), row + 1);
        self.events.roi_added.emit(&RoiAdded {
            index: row,
            kind,
            name: None,
        });
        Ok(Some(row))
    }

    /// Discards the current item, if any.
    pub fn remove_current(&mut self) -> bool {
        let Some(current) = self.current_item.take() else {
            return false;
        };
        {
            let _blocker = self.data_events.blocker();
            let removed = self.remove_live(&BTreeSet::from([current]));
            debug_assert!(removed.is_ok(), "current item {current} not live");
        }
        self.shapes.relabel_ids();
        true
    }

    /// Switches the visibility mode.
    ///
    /// Turning it off parks every registered ROI in the hidden set and
    /// leaves only the current item on the canvas. Turning it on merges the
    /// hidden set back in front of the canvas.
    ///
    /// # Errors
    /// Returns an out-of-range error if the current item is not live.
    pub fn set_show_all(&mut self, show_all: bool) -> Result<()> {
        if self.show_all == show_all {
            return Ok(());
        }
        if show_all {
            self.merge_hidden();
        } else {
            self.park_registered()?;
        }
        self.show_all = show_all;
        debug!(
            "show_all={show_all}: {} live, {} hidden, current {:?}",
            self.shapes.nshapes(),
            self.hidden.size(),
            self.current_item
        );
        debug_assert!(!show_all || self.hidden.is_empty());
        debug_assert!(self.current_is_last());
        Ok(())
    }

    fn merge_hidden(&mut self) {
        let snapshot = self.hidden.take();
        let live = self.shapes.take_all();
        let offset = snapshot.data.len();

        let mut data = snapshot.data;
        data.extend(live.data);
        let mut kinds = snapshot.kinds;
        kinds.extend(live.kinds);
        let mut features = snapshot.features;
        features.append(live.features);
        self.shapes.set_all(ShapeColumns {
            data,
            kinds,
            features,
        });

        self.current_item = self
            .current_item
            .map(|i| i + offset)
            .or(snapshot.current_item);
        match self.current_item {
            Some(current) => self.shapes.set_selected([current]),
            None => self.shapes.set_selected(snapshot.selected),
        }
        self.shapes.text_mut().visible = snapshot.text_visible;
        self.shapes.relabel_ids();
    }

    fn park_registered(&mut self) -> Result<()> {
        let selected = self.shapes.selected().clone();
        let live = self.shapes.take_all();
        let text_visible = self.shapes.text().visible;
        self.hidden.replace_with(
            live.data,
            live.kinds,
            live.features,
            selected,
            self.current_item,
            text_visible,
        );
        if let Some(current) = self.current_item {
            let entry = self.hidden.pop(current)?;
            self.hidden.features_mut().relabel_ids();
            let index = self.shapes.push_row(entry.shape, entry.kind, entry.feature);
            self.current_item = Some(index);
            self.shapes.set_selected([index]);
            self.shapes.relabel_ids();
        }
        self.shapes.text_mut().visible = false;
        Ok(())
    }

    /// Removes registered rows from the hidden set while `show_all` is off.
    ///
    /// # Errors
    /// Returns an invalid-argument error while showing all, or an
    /// out-of-range error for a row past the end.
    pub fn remove_hidden(&mut self, rows: &BTreeSet<usize>) -> Result<()> {
        if self.show_all {
            return Err(CoreError::InvalidArgument(
                "hidden rows can only be removed while show_all is off".to_string(),
            )
            .into());
        }
        check_indices(rows, self.hidden.size())?;
        if rows.is_empty() {
            return Ok(());
        }
        for &row in rows.iter().rev() {
            self.hidden.pop(row)?;
        }
        self.hidden.features_mut().relabel_ids();
        debug!("removed hidden rows {rows:?}");
        self.events.roi_removed.emit(&RoiRemoved {
            indices: rows.clone(),
        });
        Ok(())
    }

    /// Mirrors a list rename into the feature table.
    ///
    /// # Errors
    /// Returns an out-of-range error for an unknown row.
    pub fn set_roi_name(&mut self, row: usize, name: impl Into<String>) -> Result<()> {
        let len = self.roi_count();
        if row >= len {
            return Err(CoreError::IndexOutOfRange { index: row, len }.into());
        }
        self.ensure_name_column();
        if self.show_all {
            self.shapes.features_mut().set_name(row, name)?;
        } else {
            self.hidden.rename(row, name)?;
        }
        Ok(())
    }

    /// Feature column used for label text.
    #[must_use]
    pub fn text_feature_name(&self) -> TextFeatureName {
        self.shapes.text().feature_name
    }

    /// Selects the label column. Choosing names creates the name column
    /// from the name source, falling back to generated names.
    pub fn set_text_feature_name(&mut self, feature_name: TextFeatureName) {
        self.shapes.text_mut().feature_name = feature_name;
        if feature_name == TextFeatureName::Name {
            self.ensure_name_column();
        }
    }

    /// Sets the label font size.
    ///
    /// # Errors
    /// Returns an invalid-argument error outside `4..=64`.
    pub fn set_text_size(&mut self, size: u32) -> Result<()> {
        if !(MIN_TEXT_SIZE..=MAX_TEXT_SIZE).contains(&size) {
            return Err(CoreError::InvalidArgument(format!(
                "text size must be within {MIN_TEXT_SIZE}..={MAX_TEXT_SIZE}, got {size}"
            ))
            .into());
        }
        self.shapes.text_mut().size = size;
        Ok(())
    }

    /// Shows or hides the labels.
    pub fn set_text_visible(&mut self, visible: bool) {
        self.shapes.text_mut().visible = visible;
    }

    /// Label strings of the live shapes.
    #[must_use]
    pub fn text_labels(&self) -> Vec<String> {
        self.shapes.text_labels()
    }

    /// Loads a `.json`, `.roi` or `.zip` file. Returns the number of ROIs
    /// registered.
    ///
    /// # Errors
    /// Returns file and codec errors; the layer is unchanged on error.
    pub fn load<P: AsRef<Path>>(&mut self, path: P, append: bool) -> Result<usize> {
        let options = ReadOptions::default().with_policy(self.policy);
        let loaded = roikit_io::read_roiset(path.as_ref(), &options)?;
        for warning in &loaded.warnings {
            debug!("skipped while loading {}: {warning}", path.as_ref().display());
        }
        self.load_rois(loaded.shapes, append)
    }

    /// Registers `rois`, replacing the collection unless `append` is set.
    ///
    /// # Errors
    /// Returns an unsupported-shape error, leaving the layer unchanged, if
    /// any ROI has the wrong vertex count for its kind.
    pub fn load_rois(&mut self, rois: Vec<RoiTuple>, append: bool) -> Result<usize> {
        for roi in &rois {
            roi.shape.validate_for(roi.kind)?;
        }
        if append {
            self.remove_current();
        } else {
            self.clear_all();
        }
        let start = self.roi_count();
        let count = rois.len();
        for (i, roi) in rois.into_iter().enumerate() {
            let row = start + i;
            let target = if self.show_all {
                self.shapes.features()
            } else {
                self.hidden.features()
            };
            let name = roi.name.clone().or_else(|| {
                target
                    .has_names()
                    .then(|| default_name(&self.name_prefix, row))
            });
            let feature = FeatureRow {
                id: id_of(row),
                name,
            };
            if self.show_all {
                self.shapes.push_row(roi.shape, roi.kind, feature);
            } else {
                self.hidden.push(roi.shape, roi.kind, feature);
            }
            self.events.roi_added.emit(&RoiAdded {
                index: row,
                kind: roi.kind,
                name: roi.name,
            });
        }
        self.shapes.relabel_ids();
        self.hidden.features_mut().relabel_ids();
        self.shapes.set_selected([]);
        debug!("loaded {count} ROIs (append={append})");
        Ok(count)
    }

    /// Removes every shape, registered or not.
    pub fn clear_all(&mut self) {
        let registered = self.roi_count();
        self.clear_live();
        self.hidden.clear();
        self.current_item = None;
        if registered > 0 {
            self.events.roi_removed.emit(&RoiRemoved {
                indices: (0..registered).collect(),
            });
        }
    }

    /// Registered ROIs, excluding the current item.
    ///
    /// Names come from the name source when one is attached, else from the
    /// name feature column.
    ///
    /// # Errors
    /// Returns a length-mismatch error if the name source is out of step.
    pub fn get_roi_data(&self) -> Result<RoiData> {
        let (data, kinds, features) = if self.show_all {
            (
                self.shapes.data(),
                self.shapes.kinds(),
                self.shapes.features(),
            )
        } else {
            (
                self.hidden.data(),
                self.hidden.kinds(),
                self.hidden.features(),
            )
        };
        let n = self.roi_count();
        let names = self
            .source_names()
            .or_else(|| features.names().map(|names| names[..n].to_vec()));
        Ok(RoiData::new(
            data[..n].to_vec(),
            kinds[..n].to_vec(),
            names,
        )?)
    }

    /// Writes the registered ROIs to `path`; the format follows the
    /// extension.
    ///
    /// # Errors
    /// Returns file and codec errors.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let rois = self.get_roi_data()?;
        roikit_io::write_roiset(path.as_ref(), &rois)?;
        debug!("saved {} ROIs to {}", rois.len(), path.as_ref().display());
        Ok(())
    }

    /// A detached canvas holding the registered ROIs.
    ///
    /// # Errors
    /// Propagates [`RoiLayer::get_roi_data`] errors.
    pub fn to_external_collection(&self) -> Result<Shapes> {
        Ok(Shapes::from_roi_data(&self.get_roi_data()?))
    }

    fn source_names(&self) -> Option<Vec<String>> {
        self.name_source
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|source| source.borrow().names())
    }

    fn ensure_name_column(&mut self) {
        let names = self.source_names().unwrap_or_default();
        let prefix = self.name_prefix.clone();
        let fill = |i: usize| default_name(&prefix, i);
        if self.show_all {
            fill_names(self.shapes.features_mut(), names, &fill);
        } else {
            fill_names(self.hidden.features_mut(), names, &fill);
            let offset = self.hidden.size();
            fill_names(self.shapes.features_mut(), Vec::new(), &|i: usize| {
                default_name(&prefix, offset + i)
            });
        }
    }

    fn current_is_last(&self) -> bool {
        !matches!(self.current_item, Some(i) if i + 1 != self.shapes.nshapes())
    }

    /// Empties the canvas without notifications.
    fn clear_live(&mut self) {
        let _blocker = self.data_events.blocker();
        let all: BTreeSet<usize> = (0..self.shapes.nshapes()).collect();
        let removed = self.remove_live(&all);
        debug_assert!(removed.is_ok());
    }

    fn remove_live(&mut self, indices: &BTreeSet<usize>) -> Result<()> {
        self.data_changed(&DataEvent::removing(indices.clone()));
        self.shapes.remove(indices)?;
        self.data_changed(&DataEvent::removed(indices.clone()));
        Ok(())
    }

    fn data_changed(&mut self, event: &DataEvent) {
        if self.data_events.is_blocked() {
            return;
        }
        self.on_data_change(event);
        self.data_events.emit(event);
    }

    fn on_data_change(&mut self, event: &DataEvent) {
        match event.action {
            ActionType::Adding => {
                self.remove_current();
                if !self.show_all {
                    self.clear_live();
                }
                let index = self.shapes.nshapes();
                let name = self
                    .shapes
                    .features()
                    .has_names()
                    .then(|| default_name(&self.name_prefix, self.roi_count()));
                self.shapes.set_feature_defaults(FeatureRow {
                    id: id_of(index),
                    name,
                });
            }
            ActionType::Added => {
                if let Some(&index) = event.indices.iter().next() {
                    self.current_item = Some(index);
                    self.shapes.set_selected([index]);
                }
                self.shapes.relabel_ids();
                debug_assert!(self.current_is_last());
            }
            ActionType::Removing => {}
            ActionType::Removed => {
                self.current_item = self.current_item.and_then(|current| {
                    if event.indices.contains(&current) {
                        None
                    } else {
                        Some(current - event.indices.range(..current).count())
                    }
                });
                self.shapes.relabel_ids();
            }
        }
    }
}

fn fill_names<F>(table: &mut FeatureTable, names: Vec<String>, fill: &F)
where
    F: Fn(usize) -> String,
{
    if !table.has_names() {
        table.set_names(names, fill);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::rc::Rc;

    fn rect(offset: f64) -> ShapeData {
        ShapeData::new(vec![
            [offset, offset],
            [offset, offset + 2.0],
            [offset + 2.0, offset + 2.0],
            [offset + 2.0, offset],
        ])
    }

    fn ids(layer: &RoiLayer) -> Vec<u32> {
        layer.shapes().features().ids().to_vec()
    }

    fn with_registered(n: usize) -> RoiLayer {
        let mut layer = RoiLayer::default();
        for i in 0..n {
            #[allow(clippy::cast_precision_loss)]
            layer.add(rect(i as f64), ShapeKind::Rectangle).unwrap();
            layer.register().unwrap();
        }
        layer
    }

    #[test]
    fn test_add_replaces_current() {
        let mut layer = RoiLayer::default();
        layer.add(rect(0.0), ShapeKind::Rectangle).unwrap();
        layer.add(rect(1.0), ShapeKind::Ellipse).unwrap();
        assert_eq!(layer.shapes().nshapes(), 1);
        assert_eq!(layer.current_item(), Some(0));
        assert_eq!(layer.shapes().kinds(), &[ShapeKind::Ellipse]);
        assert_eq!(layer.roi_count(), 0);
    }

    #[test]
    fn test_register_emits_row() {
        let mut layer = RoiLayer::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        layer
            .events()
            .roi_added
            .subscribe(move |ev: &RoiAdded| s.borrow_mut().push((ev.index, ev.kind)));
        layer.add(rect(0.0), ShapeKind::Rectangle).unwrap();
        assert_eq!(layer.register().unwrap(), Some(0));
        layer.add(rect(3.0), ShapeKind::Ellipse).unwrap();
        assert_eq!(layer.register().unwrap(), Some(1));
        assert_eq!(layer.register().unwrap(), None);
        assert_eq!(
            *seen.borrow(),
            vec![(0, ShapeKind::Rectangle), (1, ShapeKind::Ellipse)]
        );
        assert_eq!(layer.roi_count(), 2);
        assert!(layer.shapes().selected().is_empty());
    }

    #[test]
    fn test_removal_shifts_current() {
        let mut layer = with_registered(3);
        layer.add(rect(9.0), ShapeKind::Rectangle).unwrap();
        assert_eq!(layer.current_item(), Some(3));
        layer.remove(&BTreeSet::from([0, 1])).unwrap();
        assert_eq!(layer.current_item(), Some(1));
        assert_eq!(ids(&layer), vec![0, 1]);
    }

    #[test]
    fn test_remove_only_current_is_silent() {
        let mut layer = with_registered(1);
        let removed = Rc::new(RefCell::new(Vec::new()));
        let r = Rc::clone(&removed);
        layer
            .events()
            .roi_removed
            .subscribe(move |ev: &RoiRemoved| r.borrow_mut().push(ev.indices.clone()));
        layer.add(rect(5.0), ShapeKind::Rectangle).unwrap();
        layer.remove_selected().unwrap();
        assert!(removed.borrow().is_empty());
        assert_eq!(layer.current_item(), None);

        layer.add(rect(5.0), ShapeKind::Rectangle).unwrap();
        layer.set_selected([0, 1]).unwrap();
        layer.remove_selected().unwrap();
        assert_eq!(*removed.borrow(), vec![BTreeSet::from([0])]);
        assert_eq!(layer.roi_count(), 0);
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut layer = with_registered(2);
        assert!(matches!(
            layer.remove(&BTreeSet::from([1, 2])),
            Err(Error::CoreError(CoreError::IndexOutOfRange { index: 2, len: 2 }))
        ));
        assert_eq!(layer.roi_count(), 2);
        assert!(layer.set_selected([4]).is_err());
    }

    #[test]
    fn test_hide_keeps_only_current() {
        let mut layer = with_registered(3);
        layer.set_text_visible(true);
        layer.add(rect(7.0), ShapeKind::Ellipse).unwrap();
        layer.set_show_all(false).unwrap();
        assert_eq!(layer.shapes().nshapes(), 1);
        assert_eq!(layer.current_item(), Some(0));
        assert_eq!(layer.shapes().data()[0], rect(7.0));
        assert_eq!(layer.hidden().size(), 3);
        assert_eq!(layer.roi_count(), 3);
        assert!(!layer.shapes().text().visible);

        layer.set_show_all(true).unwrap();
        assert!(layer.hidden().is_empty());
        assert_eq!(layer.shapes().nshapes(), 4);
        assert_eq!(layer.current_item(), Some(3));
        assert_eq!(layer.shapes().selected(), &BTreeSet::from([3]));
        assert!(layer.shapes().text().visible);
        assert_eq!(ids(&layer), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_register_while_hidden_parks_shape() {
        let mut layer = with_registered(1);
        layer.set_show_all(false).unwrap();
        assert_eq!(layer.shapes().nshapes(), 0);
        layer.add(rect(4.0), ShapeKind::Rectangle).unwrap();
        assert_eq!(layer.register().unwrap(), Some(1));
        assert_eq!(layer.shapes().nshapes(), 0);
        assert_eq!(layer.hidden().size(), 2);
        assert_eq!(layer.hidden().features().ids(), &[0, 1]);
    }

    #[test]
    fn test_remove_hidden() {
        let mut layer = with_registered(4);
        assert!(layer.remove_hidden(&BTreeSet::from([0])).is_err());
        layer.set_show_all(false).unwrap();
        layer.remove_hidden(&BTreeSet::from([0, 2])).unwrap();
        assert_eq!(layer.roi_count(), 2);
        assert_eq!(layer.hidden().data(), &[rect(1.0), rect(3.0)]);
        assert!(layer.remove_hidden(&BTreeSet::from([2])).is_err());
    }

    #[test]
    fn test_text_feature_name_creates_names() {
        let mut layer = with_registered(2);
        layer.add(rect(8.0), ShapeKind::Rectangle).unwrap();
        layer.set_text_feature_name(TextFeatureName::Name);
        assert_eq!(
            layer.text_labels(),
            vec!["ROI-0000", "ROI-0001", "ROI-0002"]
        );
        layer.set_roi_name(1, "nucleus").unwrap();
        assert_eq!(layer.text_labels()[1], "nucleus");
        assert!(layer.set_roi_name(2, "x").is_err());
        assert!(layer.set_text_size(3).is_err());
        layer.set_text_size(12).unwrap();
        assert_eq!(layer.shapes().text().size, 12);
    }

    #[test]
    fn test_roi_data_excludes_current() {
        let mut layer = with_registered(2);
        layer.add(rect(8.0), ShapeKind::Ellipse).unwrap();
        let rois = layer.get_roi_data().unwrap();
        assert_eq!(rois.len(), 2);
        assert_eq!(rois.names, None);
        let shapes = layer.to_external_collection().unwrap();
        assert_eq!(shapes.nshapes(), 2);
    }

    #[test]
    fn test_load_rois_replace_and_append() {
        let mut layer = with_registered(2);
        let removed = Rc::new(RefCell::new(Vec::new()));
        let r = Rc::clone(&removed);
        layer
            .events()
            .roi_removed
            .subscribe(move |ev: &RoiRemoved| r.borrow_mut().push(ev.indices.clone()));
        let rois = vec![
            RoiTuple::new(rect(0.0).points, ShapeKind::Rectangle).with_name("a"),
            RoiTuple::new(vec![[0.0, 0.0], [3.0, 4.0]], ShapeKind::Line),
        ];
        assert_eq!(layer.load_rois(rois.clone(), false).unwrap(), 2);
        assert_eq!(*removed.borrow(), vec![BTreeSet::from([0, 1])]);
        layer.add(rect(5.0), ShapeKind::Rectangle).unwrap();
        assert_eq!(layer.load_rois(rois, true).unwrap(), 2);
        assert_eq!(layer.roi_count(), 4);
        assert_eq!(layer.current_item(), None);
        assert_eq!(ids(&layer), vec![0, 1, 2, 3]);
        let names = layer.get_roi_data().unwrap().names.unwrap();
        assert_eq!(names, vec!["a", "ROI-0001", "a", "ROI-0003"]);
    }

    #[test]
    fn test_load_rejects_bad_geometry() {
        let mut layer = with_registered(1);
        let rois = vec![RoiTuple::new(vec![[0.0, 0.0]], ShapeKind::Rectangle)];
        assert!(layer.load_rois(rois, false).is_err());
        assert_eq!(layer.roi_count(), 1);
    }

    #[test]
    fn test_parse_show_all() {
        assert!(parse_show_all("True").unwrap());
        assert!(!parse_show_all("off").unwrap());
        assert!(matches!(
            parse_show_all("maybe"),
            Err(CoreError::InvalidArgument(_))
        ));
    }
}

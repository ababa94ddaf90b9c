//! ROI manager: the layer plus the list model it keeps in step.

use crate::config::ManagerConfig;
use crate::events::{RoiAdded, RoiRemoved};
use crate::layer::{default_name, NameSource, RoiLayer};
use crate::roilist::RoiList;
use crate::shapes::{Shapes, TextFeatureName};
use crate::Result;
use log::warn;
use roikit_core::{ShapeData, ShapeKind};
use std::cell::{Ref, RefCell};
use std::collections::BTreeSet;
use std::path::Path;
use std::rc::Rc;

/// Owns a [`RoiLayer`] and the [`RoiList`] mirroring its registered ROIs.
///
/// The list follows the layer through `roi_added` / `roi_removed`; the
/// layer reads names back from the list through a weak handle.
#[derive(Debug)]
pub struct RoiManager {
    layer: RoiLayer,
    list: Rc<RefCell<RoiList>>,
    config: ManagerConfig,
}

impl Default for RoiManager {
    fn default() -> Self {
        Self::new(ManagerConfig::default())
    }
}

impl RoiManager {
    /// Creates a manager with an empty layer and list.
    #[must_use]
    pub fn new(config: ManagerConfig) -> Self {
        let mut layer = RoiLayer::new(&config);
        let list = Rc::new(RefCell::new(RoiList::new()));

        let source: Rc<RefCell<dyn NameSource>> = list.clone();
        layer.set_name_source(Rc::downgrade(&source));

        let rows = Rc::clone(&list);
        let prefix = config.name_prefix.clone();
        layer.events().roi_added.subscribe(move |ev: &RoiAdded| {
            let name = ev
                .name
                .clone()
                .unwrap_or_else(|| default_name(&prefix, ev.index));
            rows.borrow_mut().add_row(name, ev.kind);
        });

        let rows = Rc::clone(&list);
        layer.events().roi_removed.subscribe(move |ev: &RoiRemoved| {
            let mut rows = rows.borrow_mut();
            for &row in ev.indices.iter().rev() {
                if let Err(err) = rows.remove_row(row) {
                    warn!("list out of step with layer: {err}");
                }
            }
        });

        Self {
            layer,
            list,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    #[must_use]
    pub fn layer(&self) -> &RoiLayer {
        &self.layer
    }

    /// The list model.
    ///
    /// # Panics
    /// Panics if the list is mutably borrowed, which only happens inside a
    /// layer notification.
    #[must_use]
    pub fn list(&self) -> Ref<'_, RoiList> {
        self.list.borrow()
    }

    /// Number of registered ROIs.
    #[must_use]
    pub fn roi_count(&self) -> usize {
        self.layer.roi_count()
    }

    /// Draws a shape; it becomes the current item.
    ///
    /// # Errors
    /// Returns an unsupported-shape error for a wrong vertex count.
    pub fn add(&mut self, shape: ShapeData, kind: ShapeKind) -> Result<usize> {
        self.layer.add(shape, kind)
    }

    /// Registers the current item.
    ///
    /// # Errors
    /// Propagates [`RoiLayer::register`] errors.
    pub fn register(&mut self) -> Result<Option<usize>> {
        self.layer.register()
    }

    /// Draws `shape` and registers it at once.
    ///
    /// # Errors
    /// Returns an unsupported-shape error for a wrong vertex count.
    pub fn register_with(&mut self, shape: ShapeData, kind: ShapeKind) -> Result<Option<usize>> {
        self.layer.add(shape, kind)?;
        self.layer.register()
    }

    /// Selects live shapes.
    ///
    /// # Errors
    /// Returns an out-of-range error for an index past the end.
    pub fn select<I: IntoIterator<Item = usize>>(&mut self, indices: I) -> Result<()> {
        self.layer.set_selected(indices)
    }

    /// Selects then removes live shapes.
    ///
    /// # Errors
    /// Returns an out-of-range error for an index past the end.
    pub fn remove(&mut self, indices: &BTreeSet<usize>) -> Result<()> {
        self.layer.set_selected(indices.iter().copied())?;
        self.layer.remove_selected()
    }

    /// Removes what is selected: canvas shapes while showing all, list rows
    /// otherwise.
    ///
    /// # Errors
    /// Propagates removal errors.
    pub fn remove_selected(&mut self) -> Result<()> {
        if self.layer.show_all() {
            self.layer.remove_selected()
        } else {
            let rows = self.list.borrow().selected_rows().clone();
            self.layer.remove_hidden(&rows)
        }
    }

    /// Selects list rows. The current item is discarded; while showing all
    /// the matching shapes are selected on the canvas too.
    ///
    /// # Errors
    /// Returns an out-of-range error for a row past the end.
    pub fn select_rows<I: IntoIterator<Item = usize>>(&mut self, rows: I) -> Result<()> {
        let rows: BTreeSet<usize> = rows.into_iter().collect();
        self.list.borrow_mut().select_rows(rows.iter().copied())?;
        self.layer.remove_current();
        if self.layer.show_all() {
            self.layer.set_selected(rows)?;
        }
        Ok(())
    }

    /// Removes registered rows, whichever mode is active.
    ///
    /// # Errors
    /// Returns an out-of-range error for a row past the end.
    pub fn remove_rows(&mut self, rows: &BTreeSet<usize>) -> Result<()> {
        if self.layer.show_all() {
            self.layer.remove_current();
            self.remove(rows)
        } else {
            self.layer.remove_hidden(rows)
        }
    }

    /// Renames a list row and its feature entry.
    ///
    /// # Errors
    /// Returns an out-of-range error for a row past the end.
    pub fn rename_row(&mut self, row: usize, name: &str) -> Result<()> {
        self.list.borrow_mut().rename(row, name)?;
        self.layer.set_roi_name(row, name)
    }

    /// Switches the visibility mode.
    ///
    /// # Errors
    /// Propagates [`RoiLayer::set_show_all`] errors.
    pub fn set_show_all(&mut self, show_all: bool) -> Result<()> {
        self.layer.set_show_all(show_all)
    }

    #[must_use]
    pub fn show_all(&self) -> bool {
        self.layer.show_all()
    }

    /// Loads ROIs from a `.json`, `.roi` or `.zip` file.
    ///
    /// # Errors
    /// Returns file and codec errors.
    pub fn load_roiset<P: AsRef<Path>>(&mut self, path: P, append: bool) -> Result<usize> {
        self.layer.load(path, append)
    }

    /// Saves the registered ROIs; `.zip` and `.roi` write ImageJ records,
    /// anything else JSON.
    ///
    /// # Errors
    /// Returns file and codec errors.
    pub fn save_roiset<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.layer.save(path)
    }

    /// A plain shape collection holding the registered ROIs.
    ///
    /// # Errors
    /// Propagates [`RoiLayer::to_external_collection`] errors.
    pub fn as_shapes(&self) -> Result<Shapes> {
        self.layer.to_external_collection()
    }

    /// Chooses the label column.
    pub fn set_text_feature_name(&mut self, feature_name: TextFeatureName) {
        self.layer.set_text_feature_name(feature_name);
    }

    /// Sets the label font size.
    ///
    /// # Errors
    /// Returns an invalid-argument error outside `4..=64`.
    pub fn set_text_size(&mut self, size: u32) -> Result<()> {
        self.layer.set_text_size(size)
    }
}

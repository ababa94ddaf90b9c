//! roikit-manager: Headless ROI manager.
//!
//! This crate holds the registration workflow for ROIs drawn over an image:
//!
//! - [`RoiLayer`] - the collection state machine with its current
//!   (uncommitted) shape, visibility toggle and hidden set
//! - [`RoiList`] - the table model of registered ROIs
//! - [`RoiManager`] - the layer and list wired together, with load/save
//! - [`ManagerRegistry`] - one manager per viewer handle
//!
//! Everything is single-threaded; notifications are delivered synchronously
//! through [`EventEmitter`] channels.

pub mod config;
mod error;
pub mod events;
pub mod features;
pub mod hidden;
pub mod layer;
pub mod manager;
pub mod registry;
pub mod roilist;
pub mod shapes;

pub use config::ManagerConfig;
pub use error::{Error, Result};
pub use events::{
    ActionType, DataEvent, EmitterBlocker, EventEmitter, LayerEvents, RoiAdded, RoiRemoved,
};
pub use features::{FeatureRow, FeatureTable};
pub use hidden::{HiddenBuffer, HiddenEntry, HiddenSnapshot};
pub use layer::{parse_show_all, NameSource, RoiLayer};
pub use manager::RoiManager;
pub use registry::ManagerRegistry;
pub use roilist::{RoiList, RoiListColumn, RoiListRow};
pub use shapes::{ShapeColumns, Shapes, TextFeatureName, TextOptions, MAX_TEXT_SIZE, MIN_TEXT_SIZE};

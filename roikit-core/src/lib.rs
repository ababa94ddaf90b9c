//! roikit-core: Core shape types and the ROI record store.
//!
//! This crate provides the shape model shared by the ImageJ codec, the file
//! layer and the ROI manager: the closed set of [`ShapeKind`]s, per-shape
//! geometry with optional plane/time/z placement, and the [`RoiData`]
//! collection with its JSON form.
//!

pub mod error;
pub mod roi_data;
pub mod shape;

pub use error::{Error, Result};
pub use roi_data::{RoiData, RoiShapes};
pub use shape::{ExtraAxes, Point, RoiTuple, ShapeData, ShapeKind};

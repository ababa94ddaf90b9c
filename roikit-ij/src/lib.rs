//! roikit-ij: ImageJ ROI record parser, writer and geometry codec.
//!
//! This crate reads and writes the binary ROI records produced by ImageJ
//! and Fiji (`.roi` files and the entries of `.zip` ROI sets), and
//! translates them to and from the shape model of `roikit-core`.
//!
//! # Key Components
//!
//! - [`ImagejRoi`] - One binary record, with [`ImagejRoi::from_bytes`] and
//!   [`ImagejRoi::to_bytes`]
//! - [`roi_to_shape`] / [`shape_to_roi`] - Geometry codec, including the
//!   rotated rectangle and rotated ellipse encodings
//! - [`decode_batch`] - Decoding a whole ROI set with a skip policy
//!
//! # Coordinates
//!
//! Shapes use `[row, column]` vertices, ImageJ records `(x, y)`. Axis
//! aligned rectangles and ovals are stored by their pixel-edge bounds, so a
//! corner at `(row, col)` corresponds to the bound `(col + 0.5, row + 0.5)`.

pub mod convert;
pub mod encoding;
mod error;
pub mod record;

pub use convert::{
    decode_batch, roi_to_shape, shape_to_roi, BatchPolicy, Decoded, DecodedBatch,
    UnsupportedShapeWarning, ELLIPSE_SAMPLES,
};
pub use encoding::{decode_rotated_roi_width, encode_rotated_roi_width, ByteOrder};
pub use error::{Error, Result};
pub use record::{ImagejRoi, RoiOptions, RoiSubtype, RoiType};

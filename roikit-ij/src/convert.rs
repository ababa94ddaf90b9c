//! Geometry codec between [`RoiTuple`]s and ImageJ records.
//!
//! Shapes use `[row, column]` vertices; ImageJ records use `(x, y)`. Axis
//! aligned rectangles and ovals are stored as pixel-edge bounds, so their
//! corners sit half a pixel away from the stored origin. Lines, vertex
//! lists, rotated rectangles and rotated ellipses are stored without
//! offset.

use crate::encoding::{decode_rotated_roi_width, encode_rotated_roi_width};
use crate::record::{ImagejRoi, RoiSubtype, RoiType};
use crate::{Error, Result};
use roikit_core::{ExtraAxes, Point, RoiTuple, ShapeData, ShapeKind};
use std::f64::consts::PI;
use std::fmt;

/// Number of samples stored as the polygon of a rotated ellipse.
pub const ELLIPSE_SAMPLES: usize = 72;

/// A record that was recognised but has no shape counterpart.
#[derive(Debug, Clone, PartialEq)]
pub struct UnsupportedShapeWarning {
    pub roitype: RoiType,
    pub subtype: RoiSubtype,
    pub name: Option<String>,
}

impl fmt::Display for UnsupportedShapeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skipped ImageJ {} ROI", self.roitype)?;
        if let Some(name) = &self.name {
            write!(f, " {name:?}")?;
        }
        f.write_str(": no matching shape kind")
    }
}

/// Outcome of decoding one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Shape(RoiTuple),
    Skipped(UnsupportedShapeWarning),
}

impl Decoded {
    /// Returns the shape, if one was decoded.
    #[must_use]
    pub fn into_shape(self) -> Option<RoiTuple> {
        match self {
            Decoded::Shape(roi) => Some(roi),
            Decoded::Skipped(_) => None,
        }
    }
}

/// How [`decode_batch`] treats records the codec cannot translate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    /// Abort on the first error.
    #[default]
    Strict,
    /// Log and drop records that fail to decode.
    SkipUnsupported,
}

/// Shapes decoded from a batch of records, plus what was skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedBatch {
    pub shapes: Vec<RoiTuple>,
    pub warnings: Vec<UnsupportedShapeWarning>,
}

fn unsupported(roi: &ImagejRoi) -> Error {
    Error::UnsupportedShape {
        roitype: roi.roitype.to_string(),
        subtype: roi.subtype.to_string(),
    }
}

#[inline]
fn xy(point: Point) -> [f64; 2] {
    [point[1], point[0]]
}

#[inline]
fn rc(x: f64, y: f64) -> Point {
    [y, x]
}

fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - b[0]).hypot(a[1] - b[1])
}

fn midpoint(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [(a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0]
}

/// Decodes one record.
///
/// # Errors
/// Returns [`Error::UnsupportedShape`] for composite shapes and
/// type/subtype combinations without a shape kind. Point selections are
/// not errors; they come back as [`Decoded::Skipped`].
pub fn roi_to_shape(roi: &ImagejRoi) -> Result<Decoded> {
    if roi.shape_roi_size > 0 {
        return Err(unsupported(roi));
    }
    let (points, kind) = match (roi.roitype, roi.subtype) {
        (RoiType::Point, _) => {
            let warning = UnsupportedShapeWarning {
                roitype: roi.roitype,
                subtype: roi.subtype,
                name: roi.name.clone(),
            };
            log::warn!("{warning}");
            return Ok(Decoded::Skipped(warning));
        }
        (_, RoiSubtype::RotatedRect) => (rotated_rect_corners(roi), ShapeKind::Rectangle),
        (_, RoiSubtype::Ellipse) => (ellipse_corners(roi), ShapeKind::Ellipse),
        (RoiType::Rect, RoiSubtype::Undefined) => (bounds_corners(roi), ShapeKind::Rectangle),
        (RoiType::Oval, RoiSubtype::Undefined) => (bounds_corners(roi), ShapeKind::Ellipse),
        (RoiType::Line, RoiSubtype::Undefined) => (
            vec![
                rc(f64::from(roi.x1), f64::from(roi.y1)),
                rc(f64::from(roi.x2), f64::from(roi.y2)),
            ],
            ShapeKind::Line,
        ),
        (RoiType::Polygon | RoiType::Freehand, RoiSubtype::Undefined) => {
            (vertices(roi), ShapeKind::Polygon)
        }
        (RoiType::Polyline | RoiType::Freeline, RoiSubtype::Undefined) => {
            (vertices(roi), ShapeKind::Path)
        }
        _ => return Err(unsupported(roi)),
    };
    if points.is_empty() {
        return Err(unsupported(roi));
    }
    let extra_axes = match (roi.position, roi.t_position, roi.z_position) {
        (0, 0, 0) => ExtraAxes::None,
        (p, t, z) => ExtraAxes::PlaneTimeZ(p, t, z),
    };
    Ok(Decoded::Shape(RoiTuple {
        shape: ShapeData { points, extra_axes },
        kind,
        name: roi.name.clone(),
    }))
}

/// Corners of an axis-aligned rectangle or oval, shifted to pixel centres.
fn bounds_corners(roi: &ImagejRoi) -> Vec<Point> {
    let (x, y, w, h) = if roi.has_subpixel_rect() {
        (
            f64::from(roi.xd()),
            f64::from(roi.yd()),
            f64::from(roi.widthd()),
            f64::from(roi.heightd()),
        )
    } else {
        (
            f64::from(roi.left),
            f64::from(roi.top),
            f64::from(roi.right) - f64::from(roi.left),
            f64::from(roi.bottom) - f64::from(roi.top),
        )
    };
    let (x, y) = (x - 0.5, y - 0.5);
    vec![rc(x, y), rc(x + w, y), rc(x + w, y + h), rc(x, y + h)]
}

/// Stored vertices, absolute, as `[row, column]`.
fn vertices(roi: &ImagejRoi) -> Vec<Point> {
    match &roi.subpixel_coordinates {
        Some(points) => points
            .iter()
            .map(|&[x, y]| rc(f64::from(x), f64::from(y)))
            .collect(),
        None => {
            let (left, top) = (f64::from(roi.left), f64::from(roi.top));
            roi.integer_coordinates
                .iter()
                .map(|&[x, y]| rc(f64::from(x) + left, f64::from(y) + top))
                .collect()
        }
    }
}

/// Parallelogram around the axis `start..end` with the given lateral width.
///
/// Corners run `start - lat/2, start + lat/2, end + lat/2, end - lat/2`,
/// with the lateral direction a quarter turn from the axis.
fn parallelogram(start: [f64; 2], end: [f64; 2], width: f64) -> Vec<Point> {
    let length = distance(start, end);
    let lat = if length > 0.0 {
        let (ux, uy) = ((end[0] - start[0]) / length, (end[1] - start[1]) / length);
        [uy * width / 2.0, -ux * width / 2.0]
    } else {
        [0.0, 0.0]
    };
    [
        [start[0] - lat[0], start[1] - lat[1]],
        [start[0] + lat[0], start[1] + lat[1]],
        [end[0] + lat[0], end[1] + lat[1]],
        [end[0] - lat[0], end[1] - lat[1]],
    ]
    .into_iter()
    .map(|[x, y]| rc(x, y))
    .collect()
}

fn rotated_rect_corners(roi: &ImagejRoi) -> Vec<Point> {
    if roi.n_coordinates() == 4 {
        return vertices(roi);
    }
    // older writers kept only the axis and width
    let width = decode_rotated_roi_width(roi.float_param_fields(), roi.byte_order);
    parallelogram(
        [f64::from(roi.x1), f64::from(roi.y1)],
        [f64::from(roi.x2), f64::from(roi.y2)],
        f64::from(width),
    )
}

fn ellipse_corners(roi: &ImagejRoi) -> Vec<Point> {
    let ratio = f64::from(decode_rotated_roi_width(
        roi.float_param_fields(),
        roi.byte_order,
    ));
    let start = [f64::from(roi.x1), f64::from(roi.y1)];
    let end = [f64::from(roi.x2), f64::from(roi.y2)];
    parallelogram(start, end, distance(start, end) * ratio)
}

/// Encodes one shape.
///
/// # Errors
/// Returns an unsupported-shape error if the vertex count does not fit the
/// kind.
pub fn shape_to_roi(tuple: &RoiTuple) -> Result<ImagejRoi> {
    tuple.shape.validate_for(tuple.kind)?;
    let points = tuple.points();
    let mut roi = match tuple.kind {
        ShapeKind::Rectangle | ShapeKind::Ellipse if is_axis_aligned(points) => {
            let roitype = if tuple.kind == ShapeKind::Rectangle {
                RoiType::Rect
            } else {
                RoiType::Oval
            };
            axis_aligned(points, roitype)
        }
        ShapeKind::Rectangle => rotated_rect(points),
        ShapeKind::Ellipse => rotated_ellipse(points),
        ShapeKind::Line => line(points),
        ShapeKind::Polygon => polygon(points, RoiType::Polygon),
        ShapeKind::Path => polygon(points, RoiType::Polyline),
    };
    match tuple.extra_axes() {
        ExtraAxes::None => {}
        ExtraAxes::Z(z) => roi.z_position = z,
        ExtraAxes::TimeZ(t, z) => {
            roi.t_position = t;
            roi.z_position = z;
        }
        ExtraAxes::PlaneTimeZ(p, t, z) => {
            roi.position = p;
            roi.t_position = t;
            roi.z_position = z;
        }
    }
    roi.name.clone_from(&tuple.name);
    Ok(roi)
}

/// True if the first two corners share a row or a column.
#[allow(clippy::float_cmp)]
fn is_axis_aligned(points: &[Point]) -> bool {
    points[0][0] == points[1][0] || points[0][1] == points[1][1]
}

fn axis_aligned(points: &[Point], roitype: RoiType) -> ImagejRoi {
    let (mut x0, mut y0) = (f64::INFINITY, f64::INFINITY);
    let (mut x1, mut y1) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for &[row, col] in points {
        x0 = x0.min(col);
        y0 = y0.min(row);
        x1 = x1.max(col);
        y1 = y1.max(row);
    }
    let mut roi = ImagejRoi {
        roitype,
        ..ImagejRoi::default()
    };
    roi.set_subpixel_rect(x0 + 0.5, y0 + 0.5, x1 - x0, y1 - y0);
    roi
}

fn vertex_roi(points: &[[f64; 2]], roitype: RoiType) -> ImagejRoi {
    ImagejRoi::from_points(points, roitype)
}

#[allow(clippy::cast_possible_truncation)]
fn set_axis(roi: &mut ImagejRoi, start: [f64; 2], end: [f64; 2]) {
    roi.x1 = start[0] as f32;
    roi.y1 = start[1] as f32;
    roi.x2 = end[0] as f32;
    roi.y2 = end[1] as f32;
}

#[allow(clippy::cast_possible_truncation)]
fn rotated_rect(points: &[Point]) -> ImagejRoi {
    let corners: Vec<[f64; 2]> = points.iter().map(|&p| xy(p)).collect();
    let mut roi = vertex_roi(&corners, RoiType::Freehand);
    roi.subtype = RoiSubtype::RotatedRect;
    set_axis(
        &mut roi,
        midpoint(corners[1], corners[2]),
        midpoint(corners[0], corners[3]),
    );
    let width = distance(corners[1], corners[2]) as f32;
    roi.set_float_param_fields(encode_rotated_roi_width(width, roi.byte_order));
    roi
}

/// Rotated ellipse: a sampled outline plus the analytic axis and ratio.
///
/// The outline is rotated by `atan2(dy, dx)` of the major axis, measured in
/// image `(x, y)` coordinates from its start to its end point, as ImageJ's
/// `EllipseRoi` does.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn rotated_ellipse(points: &[Point]) -> ImagejRoi {
    let c: Vec<[f64; 2]> = points.iter().map(|&p| xy(p)).collect();
    let a = distance(c[1], c[2]) / 2.0;
    let b = distance(c[0], c[1]) / 2.0;
    let start = midpoint(c[0], c[1]);
    let end = midpoint(c[2], c[3]);
    let centre = midpoint(start, end);
    let theta = (end[1] - start[1]).atan2(end[0] - start[0]);
    let (sin_t, cos_t) = theta.sin_cos();

    let samples: Vec<[f64; 2]> = (0..ELLIPSE_SAMPLES)
        .map(|i| {
            let phi = i as f64 * 2.0 * PI / ELLIPSE_SAMPLES as f64;
            let (u, v) = (a * phi.cos(), b * phi.sin());
            [
                centre[0] + u * cos_t - v * sin_t,
                centre[1] + u * sin_t + v * cos_t,
            ]
        })
        .collect();

    let mut roi = vertex_roi(&samples, RoiType::Freehand);
    roi.subtype = RoiSubtype::Ellipse;
    set_axis(&mut roi, start, end);
    let ratio = if a > 0.0 { (b / a) as f32 } else { 0.0 };
    roi.set_float_param_fields(encode_rotated_roi_width(ratio, roi.byte_order));
    roi
}

#[allow(clippy::cast_possible_truncation)]
fn line(points: &[Point]) -> ImagejRoi {
    let ends: Vec<[f64; 2]> = points.iter().map(|&p| xy(p)).collect();
    let mut roi = vertex_roi(&ends, RoiType::Line);
    // lines keep their geometry in the header only
    roi.integer_coordinates.clear();
    roi.subpixel_coordinates = None;
    set_axis(&mut roi, ends[0], ends[1]);
    roi
}

fn polygon(points: &[Point], roitype: RoiType) -> ImagejRoi {
    let xy_points: Vec<[f64; 2]> = points.iter().map(|&p| xy(p)).collect();
    vertex_roi(&xy_points, roitype)
}

/// Decodes a batch of records.
///
/// Skipped records contribute a warning. Errors abort the batch under
/// [`BatchPolicy::Strict`] and are logged and dropped otherwise.
///
/// # Errors
/// Returns the first decode error under [`BatchPolicy::Strict`].
pub fn decode_batch<'a, I>(rois: I, policy: BatchPolicy) -> Result<DecodedBatch>
where
    I: IntoIterator<Item = &'a ImagejRoi>,
{
    let mut batch = DecodedBatch::default();
    for (index, roi) in rois.into_iter().enumerate() {
        match roi_to_shape(roi) {
            Ok(Decoded::Shape(shape)) => batch.shapes.push(shape),
            Ok(Decoded::Skipped(warning)) => batch.warnings.push(warning),
            Err(e) if policy == BatchPolicy::SkipUnsupported => {
                log::warn!("dropping ROI record {index}: {e}");
            }
            Err(e) => return Err(e),
        }
    }
    log::debug!(
        "decoded {} shapes, {} skipped",
        batch.shapes.len(),
        batch.warnings.len()
    );
    Ok(batch)
}

//! Shape kinds, geometry and single-ROI records.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 2D vertex as `[row, column]`.
pub type Point = [f64; 2];

/// The closed set of shape families a ROI can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Four corners, possibly rotated.
    Rectangle,
    /// Four corners of the bounding parallelogram, possibly rotated.
    Ellipse,
    /// Two endpoints.
    Line,
    /// Closed polygon.
    Polygon,
    /// Open polyline.
    Path,
}

impl ShapeKind {
    /// All kinds, in declaration order.
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Rectangle,
        ShapeKind::Ellipse,
        ShapeKind::Line,
        ShapeKind::Polygon,
        ShapeKind::Path,
    ];

    /// Returns the lowercase name used in files and list views.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Line => "line",
            ShapeKind::Polygon => "polygon",
            ShapeKind::Path => "path",
        }
    }

    /// Number of vertices this kind requires, if fixed.
    #[must_use]
    pub fn fixed_vertex_count(&self) -> Option<usize> {
        match self {
            ShapeKind::Rectangle | ShapeKind::Ellipse => Some(4),
            ShapeKind::Line => Some(2),
            ShapeKind::Polygon | ShapeKind::Path => None,
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ShapeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::UnsupportedShape(format!("unknown shape type {s:?}")))
    }
}

/// Indices locating a 2D shape inside a higher-dimensional stack.
///
/// The variants follow the ImageJ convention: a single extra axis is the
/// z slice, two are time and z, three are plane (channel position), time
/// and z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExtraAxes {
    #[default]
    None,
    Z(i32),
    TimeZ(i32, i32),
    PlaneTimeZ(i32, i32, i32),
}

impl ExtraAxes {
    /// Builds extra axes from 0 to 3 leading indices.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] for more than three values.
    pub fn from_slice(values: &[i32]) -> Result<Self> {
        match *values {
            [] => Ok(ExtraAxes::None),
            [z] => Ok(ExtraAxes::Z(z)),
            [t, z] => Ok(ExtraAxes::TimeZ(t, z)),
            [p, t, z] => Ok(ExtraAxes::PlaneTimeZ(p, t, z)),
            _ => Err(Error::InvalidArgument(format!(
                "at most 3 extra axes are supported, got {}",
                values.len()
            ))),
        }
    }

    /// Returns the indices in leading-axis order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<i32> {
        match *self {
            ExtraAxes::None => Vec::new(),
            ExtraAxes::Z(z) => vec![z],
            ExtraAxes::TimeZ(t, z) => vec![t, z],
            ExtraAxes::PlaneTimeZ(p, t, z) => vec![p, t, z],
        }
    }

    /// Number of extra axes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            ExtraAxes::None => 0,
            ExtraAxes::Z(_) => 1,
            ExtraAxes::TimeZ(..) => 2,
            ExtraAxes::PlaneTimeZ(..) => 3,
        }
    }

    /// Returns true if the shape lives in a plain 2D image.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, ExtraAxes::None)
    }
}

/// Geometry of one shape: its vertices plus its placement in the stack.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShapeData {
    /// Vertices as `[row, column]`.
    pub points: Vec<Point>,
    /// Plane/time/z placement.
    pub extra_axes: ExtraAxes,
}

impl ShapeData {
    /// Creates 2D shape data from vertices.
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            extra_axes: ExtraAxes::None,
        }
    }

    /// Sets the extra axes.
    #[must_use]
    pub fn with_extra_axes(mut self, extra_axes: ExtraAxes) -> Self {
        self.extra_axes = extra_axes;
        self
    }

    /// Number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if there are no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Row coordinates (image y).
    pub fn rows(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p[0])
    }

    /// Column coordinates (image x).
    pub fn cols(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p[1])
    }

    /// Mean vertex, or `None` for an empty shape.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn centroid(&self) -> Option<Point> {
        if self.points.is_empty() {
            return None;
        }
        let n = self.points.len() as f64;
        let (sr, sc) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(r, c), p| (r + p[0], c + p[1]));
        Some([sr / n, sc / n])
    }

    /// Checks the vertex count against what `kind` requires.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedShape`] on a mismatch.
    pub fn validate_for(&self, kind: ShapeKind) -> Result<()> {
        match kind.fixed_vertex_count() {
            Some(n) if self.points.len() != n => Err(Error::UnsupportedShape(format!(
                "{kind} needs {n} vertices, got {}",
                self.points.len()
            ))),
            None if self.points.is_empty() => {
                Err(Error::UnsupportedShape(format!("{kind} has no vertices")))
            }
            _ => Ok(()),
        }
    }
}

impl From<Vec<Point>> for ShapeData {
    fn from(points: Vec<Point>) -> Self {
        Self::new(points)
    }
}

/// One ROI: geometry, kind and optional display name.
#[derive(Debug, Clone, PartialEq)]
pub struct RoiTuple {
    pub shape: ShapeData,
    pub kind: ShapeKind,
    pub name: Option<String>,
}

impl RoiTuple {
    /// Creates an unnamed 2D ROI.
    pub fn new(points: Vec<Point>, kind: ShapeKind) -> Self {
        Self {
            shape: ShapeData::new(points),
            kind,
            name: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the plane/time/z placement.
    #[must_use]
    pub fn with_extra_axes(mut self, extra_axes: ExtraAxes) -> Self {
        self.shape.extra_axes = extra_axes;
        self
    }

    /// Vertices as `[row, column]`.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.shape.points
    }

    /// Plane/time/z placement.
    #[must_use]
    pub fn extra_axes(&self) -> ExtraAxes {
        self.shape.extra_axes
    }
}

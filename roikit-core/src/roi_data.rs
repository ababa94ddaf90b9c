//! The ROI record store: a collection of shapes and its JSON form.
//!
//! JSON layout:
//!
//! ```json
//! { "data": [[[r, c], [r, c], ...], ...],
//!   "shape_type": ["rectangle", ...],
//!   "names": ["...", ...] }
//! ```
//!
//! `names` is optional. A vertex row longer than two numbers carries the
//! shape's extra axes in front of `row, column`.

use crate::{Error, ExtraAxes, Result, RoiTuple, ShapeData, ShapeKind};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

#[derive(Serialize, Deserialize)]
struct RoiDataJson {
    data: Vec<Vec<Vec<f64>>>,
    shape_type: Vec<ShapeKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    names: Option<Vec<String>>,
}

/// An index-aligned collection of shapes with optional names.
///
/// Treated as immutable once built; fields are public so callers can
/// destructure it, which is why [`RoiData::iter_shapes`] re-checks lengths.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoiData {
    pub data: Vec<ShapeData>,
    pub shape_type: Vec<ShapeKind>,
    pub names: Option<Vec<String>>,
}

impl RoiData {
    /// Creates a collection, checking that all sequences line up.
    ///
    /// # Errors
    /// Returns [`Error::LengthMismatch`] if `shape_type` or `names` differ in
    /// length from `data`.
    pub fn new(
        data: Vec<ShapeData>,
        shape_type: Vec<ShapeKind>,
        names: Option<Vec<String>>,
    ) -> Result<Self> {
        let rois = Self {
            data,
            shape_type,
            names,
        };
        rois.check_lengths()?;
        Ok(rois)
    }

    /// Builds a collection from single ROIs.
    ///
    /// The name column is kept only if at least one ROI is named; unnamed
    /// entries get an empty name.
    pub fn from_tuples<I: IntoIterator<Item = RoiTuple>>(rois: I) -> Self {
        let mut out = Self::default();
        let mut names = Vec::new();
        let mut any_named = false;
        for roi in rois {
            any_named |= roi.name.is_some();
            names.push(roi.name.unwrap_or_default());
            out.data.push(roi.shape);
            out.shape_type.push(roi.kind);
        }
        if any_named {
            out.names = Some(names);
        }
        out
    }

    /// Number of shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the collection holds no shapes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn check_lengths(&self) -> Result<()> {
        let expected = self.data.len();
        if self.shape_type.len() != expected {
            return Err(Error::LengthMismatch {
                what: "shape_type",
                expected,
                found: self.shape_type.len(),
            });
        }
        if let Some(names) = &self.names {
            if names.len() != expected {
                return Err(Error::LengthMismatch {
                    what: "names",
                    expected,
                    found: names.len(),
                });
            }
        }
        Ok(())
    }

    /// Iterates over the shapes as [`RoiTuple`]s.
    ///
    /// The iterator borrows the collection, so calling this again restarts
    /// from the first shape.
    ///
    /// # Errors
    /// Returns [`Error::LengthMismatch`] if the sequences do not line up.
    pub fn iter_shapes(&self) -> Result<RoiShapes<'_>> {
        self.check_lengths()?;
        Ok(RoiShapes {
            rois: self,
            index: 0,
        })
    }

    /// Converts to a JSON value.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if a coordinate is NaN or infinite,
    /// since JSON has no representation for it.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let mut data = Vec::with_capacity(self.data.len());
        for (index, shape) in self.data.iter().enumerate() {
            let extra: Vec<f64> = shape.extra_axes.to_vec().into_iter().map(f64::from).collect();
            let mut rows = Vec::with_capacity(shape.points.len());
            for p in &shape.points {
                if !(p[0].is_finite() && p[1].is_finite()) {
                    return Err(Error::InvalidArgument(format!(
                        "shape {index} has a non-finite vertex {p:?}"
                    )));
                }
                let mut row = extra.clone();
                row.extend_from_slice(p);
                rows.push(row);
            }
            data.push(rows);
        }
        let js = RoiDataJson {
            data,
            shape_type: self.shape_type.clone(),
            names: self.names.clone(),
        };
        Ok(serde_json::to_value(js)?)
    }

    /// Converts to a JSON string.
    ///
    /// # Errors
    /// See [`RoiData::to_json`]; [`Error::Json`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_json()?)?)
    }

    /// Writes the JSON form to `writer`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] for non-finite coordinates and
    /// [`Error::Json`] on serialization or write failure.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, &self.to_json()?)?;
        Ok(())
    }

    /// Parses the JSON form.
    ///
    /// # Errors
    /// Returns [`Error::Json`] for malformed input or unknown shape types,
    /// [`Error::InvalidArgument`] for vertices with fewer than two numbers or
    /// more than three extra axes, and [`Error::LengthMismatch`] if the
    /// sequences do not line up.
    pub fn from_json(js: &serde_json::Value) -> Result<Self> {
        let js = RoiDataJson::deserialize(js)?;
        Self::from_parsed(js)
    }

    /// Parses the JSON form from a string.
    ///
    /// # Errors
    /// See [`RoiData::from_json`].
    pub fn from_json_str(s: &str) -> Result<Self> {
        let js: RoiDataJson = serde_json::from_str(s)?;
        Self::from_parsed(js)
    }

    /// Parses the JSON form from a reader.
    ///
    /// # Errors
    /// See [`RoiData::from_json`].
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let js: RoiDataJson = serde_json::from_reader(reader)?;
        Self::from_parsed(js)
    }

    fn from_parsed(js: RoiDataJson) -> Result<Self> {
        let data = js
            .data
            .into_iter()
            .map(shape_from_rows)
            .collect::<Result<Vec<_>>>()?;
        Self::new(data, js.shape_type, js.names)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn axis_index(value: f64) -> Result<i32> {
    let rounded = value.round();
    if rounded.is_finite() && rounded >= f64::from(i32::MIN) && rounded <= f64::from(i32::MAX) {
        Ok(rounded as i32)
    } else {
        Err(Error::InvalidArgument(format!(
            "extra-axis index {value} is not a 32-bit integer"
        )))
    }
}

fn shape_from_rows(rows: Vec<Vec<f64>>) -> Result<ShapeData> {
    let mut extra_axes = ExtraAxes::None;
    let mut points = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        let n = row.len();
        if n < 2 {
            return Err(Error::InvalidArgument(format!(
                "vertex needs at least 2 coordinates, got {n}"
            )));
        }
        if i == 0 {
            let leading = row[..n - 2]
                .iter()
                .map(|&v| axis_index(v))
                .collect::<Result<Vec<_>>>()?;
            extra_axes = ExtraAxes::from_slice(&leading)?;
        }
        points.push([row[n - 2], row[n - 1]]);
    }
    Ok(ShapeData { points, extra_axes })
}

/// Restartable iterator over the shapes of a [`RoiData`].
#[derive(Debug, Clone)]
pub struct RoiShapes<'a> {
    rois: &'a RoiData,
    index: usize,
}

impl Iterator for RoiShapes<'_> {
    type Item = RoiTuple;

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.index;
        let shape = self.rois.data.get(i)?;
        self.index += 1;
        Some(RoiTuple {
            shape: shape.clone(),
            kind: self.rois.shape_type[i],
            name: self.rois.names.as_ref().map(|names| names[i].clone()),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.rois.data.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RoiShapes<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> RoiData {
        RoiData::new(
            vec![
                ShapeData::new(vec![[0.0, 0.0], [0.0, 2.5], [3.0, 2.5], [3.0, 0.0]]),
                ShapeData::new(vec![[1.0, 1.0], [4.25, 7.5]]),
                ShapeData::new(vec![[0.0, 0.0], [5.0, 0.0], [5.0, 5.0]])
                    .with_extra_axes(ExtraAxes::TimeZ(2, 7)),
            ],
            vec![ShapeKind::Rectangle, ShapeKind::Line, ShapeKind::Polygon],
            Some(vec!["a".into(), "b".into(), "c".into()]),
        )
        .unwrap()
    }

    #[test]
    fn test_json_round_trip() {
        let rois = sample();
        let back = RoiData::from_json(&rois.to_json().unwrap()).unwrap();
        assert_eq!(back.shape_type, rois.shape_type);
        assert_eq!(back.names, rois.names);
        for (a, b) in back.data.iter().zip(&rois.data) {
            assert_eq!(a.extra_axes, b.extra_axes);
            for (pa, pb) in a.points.iter().zip(&b.points) {
                assert_relative_eq!(pa[0], pb[0]);
                assert_relative_eq!(pa[1], pb[1]);
            }
        }
    }

    #[test]
    fn test_json_layout() {
        let js = sample().to_json().unwrap();
        assert_eq!(js["shape_type"][0], "rectangle");
        assert_eq!(js["data"][1][1][1], 7.5);
        // extra axes lead each vertex row
        assert_eq!(js["data"][2][0].as_array().unwrap().len(), 4);
        assert_eq!(js["names"][2], "c");
    }

    #[test]
    fn test_missing_names_tolerated() {
        let rois = RoiData::from_json_str(
            r#"{"data": [[[0, 0], [1, 1]]], "shape_type": ["line"]}"#,
        )
        .unwrap();
        assert_eq!(rois.len(), 1);
        assert!(rois.names.is_none());
        assert!(rois.to_json().unwrap().get("names").is_none());
    }

    #[test]
    fn test_unknown_shape_type_rejected() {
        let result =
            RoiData::from_json_str(r#"{"data": [[[0, 0]]], "shape_type": ["point"]}"#);
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_iter_shapes_restartable() {
        let rois = sample();
        let iter = rois.iter_shapes().unwrap();
        assert_eq!(iter.len(), 3);
        let first: Vec<_> = iter.clone().collect();
        let second: Vec<_> = rois.iter_shapes().unwrap().collect();
        assert_eq!(first, second);
        assert_eq!(first[1].kind, ShapeKind::Line);
        assert_eq!(first[2].name.as_deref(), Some("c"));
        assert_eq!(first[2].extra_axes(), ExtraAxes::TimeZ(2, 7));
    }

    #[test]
    fn test_iter_shapes_names_mismatch() {
        let mut rois = sample();
        rois.names = Some(vec!["only-one".into()]);
        assert!(matches!(
            rois.iter_shapes(),
            Err(Error::LengthMismatch { what: "names", .. })
        ));
    }

    #[test]
    fn test_new_rejects_kind_mismatch() {
        let result = RoiData::new(vec![ShapeData::default()], vec![], None);
        assert!(matches!(
            result,
            Err(Error::LengthMismatch {
                what: "shape_type",
                expected: 1,
                found: 0
            })
        ));
    }

    #[test]
    fn test_from_tuples_names() {
        let unnamed = RoiData::from_tuples(vec![RoiTuple::new(
            vec![[0.0, 0.0], [1.0, 1.0]],
            ShapeKind::Line,
        )]);
        assert!(unnamed.names.is_none());

        let named = RoiData::from_tuples(vec![
            RoiTuple::new(vec![[0.0, 0.0], [1.0, 1.0]], ShapeKind::Line),
            RoiTuple::new(vec![[0.0, 0.0], [1.0, 1.0]], ShapeKind::Path).with_name("p"),
        ]);
        assert_eq!(named.names, Some(vec![String::new(), "p".to_string()]));
    }

    #[test]
    fn test_non_finite_vertex_not_written() {
        let rois = RoiData::new(
            vec![ShapeData::new(vec![[0.0, 0.0], [f64::NAN, 1.0]])],
            vec![ShapeKind::Line],
            None,
        )
        .unwrap();
        assert!(matches!(rois.to_json(), Err(Error::InvalidArgument(_))));
        let mut buf = Vec::new();
        assert!(matches!(rois.to_writer(&mut buf), Err(Error::InvalidArgument(_))));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_extra_axis_out_of_range_rejected() {
        let result = RoiData::from_json_str(
            r#"{"data": [[[1e12, 0, 0], [1e12, 1, 1]]], "shape_type": ["line"]}"#,
        );
        assert!(matches!(result, Err(Error::InvalidArgument(_))));

        let rois = RoiData::from_json_str(
            r#"{"data": [[[3.0, 0, 0], [3.0, 1, 1]]], "shape_type": ["line"]}"#,
        )
        .unwrap();
        assert_eq!(rois.data[0].extra_axes, ExtraAxes::Z(3));
    }
}

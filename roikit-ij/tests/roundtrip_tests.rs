#![allow(clippy::float_cmp, clippy::cast_precision_loss)]
use approx::assert_relative_eq;
use roikit_core::{ExtraAxes, Point, RoiTuple, ShapeKind};
use roikit_ij::{
    decode_batch, roi_to_shape, shape_to_roi, BatchPolicy, ByteOrder, Decoded, ImagejRoi,
    RoiSubtype, RoiType,
};

// encode, serialize, parse and decode one shape
fn through_bytes(tuple: &RoiTuple, order: ByteOrder) -> RoiTuple {
    let mut roi = shape_to_roi(tuple).unwrap();
    roi.set_byte_order(order);
    let bytes = roi.to_bytes().unwrap();
    let parsed = ImagejRoi::from_bytes(&bytes).unwrap();
    assert_eq!(parsed.byte_order, order);
    match roi_to_shape(&parsed).unwrap() {
        Decoded::Shape(shape) => shape,
        Decoded::Skipped(w) => panic!("unexpected skip: {w}"),
    }
}

fn assert_points_close(actual: &[Point], expected: &[Point], epsilon: f64) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert_relative_eq!(a[0], e[0], epsilon = epsilon, max_relative = 1e-5);
        assert_relative_eq!(a[1], e[1], epsilon = epsilon, max_relative = 1e-5);
    }
}

// Corners of an ellipse's bounding box, ordered so that the major axis runs
// from the middle of edge 0-1 to the middle of edge 2-3.
fn ellipse_box(centre: [f64; 2], a: f64, b: f64, theta: f64) -> Vec<Point> {
    let (s, c) = theta.sin_cos();
    let u = [c * a, s * a];
    let n = [s * b, -c * b];
    let start = [centre[0] - u[0], centre[1] - u[1]];
    let end = [centre[0] + u[0], centre[1] + u[1]];
    [
        [start[0] - n[0], start[1] - n[1]],
        [start[0] + n[0], start[1] + n[1]],
        [end[0] + n[0], end[1] + n[1]],
        [end[0] - n[0], end[1] - n[1]],
    ]
    .into_iter()
    .map(|[x, y]| [y, x])
    .collect()
}

fn dist(p: Point, q: Point) -> f64 {
    (p[0] - q[0]).hypot(p[1] - q[1])
}

#[test]
fn test_axis_aligned_rectangle_round_trip() {
    let rect = vec![[10.3, 20.7], [10.3, 45.1], [33.9, 45.1], [33.9, 20.7]];
    let tuple = RoiTuple::new(rect.clone(), ShapeKind::Rectangle);
    let roi = shape_to_roi(&tuple).unwrap();
    assert_eq!(roi.roitype, RoiType::Rect);
    assert_eq!(roi.subtype, RoiSubtype::Undefined);
    assert!(roi.has_subpixel_rect());
    assert_eq!((roi.left, roi.top), (21, 11));

    for order in [ByteOrder::Big, ByteOrder::Little] {
        let back = through_bytes(&tuple, order);
        assert_eq!(back.kind, ShapeKind::Rectangle);
        assert_points_close(back.points(), &rect, 1e-8);
    }
}

#[test]
fn test_rotated_ellipse_geometry_survives() {
    let centre = [40.0, 25.0];
    let (a, b, theta) = (12.0, 5.0, 0.6_f64);
    let corners = ellipse_box(centre, a, b, theta);
    let tuple = RoiTuple::new(corners.clone(), ShapeKind::Ellipse);

    for order in [ByteOrder::Big, ByteOrder::Little] {
        let back = through_bytes(&tuple, order);
        assert_eq!(back.kind, ShapeKind::Ellipse);
        let p = back.points();

        let centroid = back.shape.centroid().unwrap();
        assert_relative_eq!(centroid[0], centre[1], epsilon = 1e-4);
        assert_relative_eq!(centroid[1], centre[0], epsilon = 1e-4);
        assert_relative_eq!(dist(p[1], p[2]) / 2.0, a, epsilon = 1e-4);
        assert_relative_eq!(dist(p[0], p[1]) / 2.0, b, epsilon = 1e-4);

        let start = [(p[0][0] + p[1][0]) / 2.0, (p[0][1] + p[1][1]) / 2.0];
        let end = [(p[2][0] + p[3][0]) / 2.0, (p[2][1] + p[3][1]) / 2.0];
        let angle = (end[0] - start[0]).atan2(end[1] - start[1]);
        assert_relative_eq!(angle, theta, epsilon = 1e-5);

        assert_points_close(p, &corners, 1e-4);
    }
}

#[test]
fn test_rotated_ellipse_outline_is_on_the_ellipse() {
    let centre = [0.0, 0.0];
    let (a, b, theta) = (10.0, 4.0, 1.1_f64);
    let tuple = RoiTuple::new(ellipse_box(centre, a, b, theta), ShapeKind::Ellipse);
    let roi = shape_to_roi(&tuple).unwrap();
    let outline = roi.subpixel_coordinates.as_ref().unwrap();
    assert_eq!(outline.len(), roikit_ij::ELLIPSE_SAMPLES);

    let (s, c) = theta.sin_cos();
    for &[x, y] in outline {
        let (x, y) = (f64::from(x), f64::from(y));
        // rotate back into the ellipse frame
        let u = x * c + y * s;
        let v = -x * s + y * c;
        assert_relative_eq!((u / a).powi(2) + (v / b).powi(2), 1.0, epsilon = 1e-5);
    }
}

#[test]
fn test_rotated_rectangle_round_trip() {
    let corners = vec![[5.0, 0.0], [0.0, 5.0], [3.0, 8.0], [8.0, 3.0]];
    let tuple = RoiTuple::new(corners.clone(), ShapeKind::Rectangle).with_name("tilted");
    for order in [ByteOrder::Big, ByteOrder::Little] {
        let back = through_bytes(&tuple, order);
        assert_eq!(back.kind, ShapeKind::Rectangle);
        assert_eq!(back.name.as_deref(), Some("tilted"));
        assert_points_close(back.points(), &corners, 1e-6);
    }
}

#[test]
fn test_polygon_and_path_round_trip() {
    let outline = vec![[1.25, 3.5], [7.75, 2.0], [9.0, 11.5], [2.5, 9.125]];
    for kind in [ShapeKind::Polygon, ShapeKind::Path] {
        let tuple = RoiTuple::new(outline.clone(), kind)
            .with_extra_axes(ExtraAxes::PlaneTimeZ(2, 4, 6));
        let back = through_bytes(&tuple, ByteOrder::Big);
        assert_eq!(back.kind, kind);
        assert_eq!(back.extra_axes(), ExtraAxes::PlaneTimeZ(2, 4, 6));
        assert_points_close(back.points(), &outline, 1e-6);
    }
}

#[test]
fn test_batch_with_point_skips_it() {
    let shapes = [
        RoiTuple::new(vec![[0.0, 0.0], [0.0, 4.0], [3.0, 4.0], [3.0, 0.0]], ShapeKind::Rectangle),
        RoiTuple::new(vec![[1.0, 1.0], [5.0, 9.0]], ShapeKind::Line),
        RoiTuple::new(vec![[0.0, 0.0], [2.0, 3.0], [4.0, 0.0]], ShapeKind::Polygon),
    ];
    let mut rois: Vec<ImagejRoi> = shapes.iter().map(|s| shape_to_roi(s).unwrap()).collect();
    rois.insert(1, ImagejRoi::from_points(&[[3.0, 3.0]], RoiType::Point));

    let parsed: Vec<ImagejRoi> = rois
        .iter()
        .map(|r| ImagejRoi::from_bytes(&r.to_bytes().unwrap()).unwrap())
        .collect();
    let batch = decode_batch(&parsed, BatchPolicy::Strict).unwrap();
    assert_eq!(batch.shapes.len(), parsed.len() - 1);
    assert_eq!(batch.warnings.len(), 1);
    assert_eq!(batch.warnings[0].roitype, RoiType::Point);
    let kinds: Vec<ShapeKind> = batch.shapes.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![ShapeKind::Rectangle, ShapeKind::Line, ShapeKind::Polygon]
    );
}

#[test]
fn test_name_survives_non_ascii() {
    let tuple = RoiTuple::new(vec![[0.0, 0.0], [1.0, 2.0]], ShapeKind::Line).with_name("Kern µ-3");
    let back = through_bytes(&tuple, ByteOrder::Big);
    assert_eq!(back.name.as_deref(), Some("Kern µ-3"));
}

//! Geometry and raster primitive regression test
//!
//! Exercises transform composition, polygon fill and raster algebra the
//! way the output pipeline chains them.

use scanout_core::{
    FillRule, Pix, PixelDepth, PointF, Polygon, PolygonRasterizer, Rect, RectF, RopOp, Transform,
};
use scanout_test::RegParams;

#[test]
fn geometry_reg() {
    let mut rp = RegParams::new("geometry");

    // A rotated content square mapped back through the inverse lands on
    // the original corners.
    let content = Polygon::from_rect(&RectF::new(10.0, 20.0, 100.0, 50.0));
    let xform = Transform::rotation_about(PointF::new(60.0, 45.0), 30.0).translated(5.0, -3.0);
    let inv = xform.inverted().unwrap();
    let back = inv.map_polygon(&xform.map_polygon(&content));
    for (a, b) in back.points().iter().zip(content.points()) {
        rp.compare_values(b.x, a.x, 1e-9);
        rp.compare_values(b.y, a.y, 1e-9);
    }

    // Bounding rect of the rotated polygon contains the original area.
    let bounds = xform.map_polygon(&content).bounding_rect().to_rect();
    rp.check(bounds.w >= 100 && bounds.h >= 50, "rotated bounds cover content");

    // fill + fill_except partition the image.
    let poly = Polygon::new(vec![
        PointF::new(3.0, 2.0),
        PointF::new(40.0, 8.0),
        PointF::new(30.0, 35.0),
        PointF::new(5.0, 28.0),
    ]);
    let mut inside = Pix::new(48, 40, PixelDepth::Bit1).unwrap().to_mut();
    PolygonRasterizer::fill(&mut inside, 1, &poly, FillRule::Winding);
    let mut outside = Pix::new(48, 40, PixelDepth::Bit1).unwrap().to_mut();
    PolygonRasterizer::fill_except(&mut outside, 1, &poly, FillRule::Winding);
    let inside: Pix = inside.into();
    let outside: Pix = outside.into();
    let n_in = inside.count_black().unwrap();
    let n_out = outside.count_black().unwrap();
    rp.compare_values(48.0 * 40.0, (n_in + n_out) as f64, 0.0);
    rp.compare_values(0.0, inside.and(&outside).unwrap().count_black().unwrap() as f64, 0.0);

    // Polygon area and filled pixel count agree closely.
    rp.compare_values(poly.signed_area().abs(), n_in as f64, 60.0);

    // Copy a rectangle through rop_rect and subtract it again.
    let mut canvas = inside.to_mut();
    canvas.rop_rect(Rect::new(0, 0, 10, 10), &outside, 0, 0, RopOp::SrcOrDst).unwrap();
    let canvas: Pix = canvas.into();
    let restored = canvas.rop(&outside, RopOp::Subtract).unwrap();
    rp.compare_pix(&inside, &restored);

    assert!(rp.cleanup());
}

#[test]
fn geometry_serde_reg() {
    let mut rp = RegParams::new("geometry_serde");

    let xform = Transform::rotation(12.5).translated(3.0, 4.0);
    let json = serde_json::to_string(&xform).unwrap();
    let back: Transform = serde_json::from_str(&json).unwrap();
    rp.check(back.fuzzy_eq(&xform, 1e-12), "transform survives json");

    let poly = Polygon::from_rect(&RectF::new(0.5, 1.5, 10.0, 20.0));
    let json = serde_json::to_string(&poly).unwrap();
    let back: Polygon = serde_json::from_str(&json).unwrap();
    rp.compare_values(poly.len() as f64, back.len() as f64, 0.0);
    rp.compare_values(poly.signed_area(), back.signed_area(), 1e-12);

    assert!(rp.cleanup());
}

//! Vector drawing producers: lines, beziers, rectangles, polygons,
//! ellipses, and free-form paths.

use crate::error::{Error, Result};
use crate::object::ObjectId;
use crate::writer::{real, Color, ContentBuffer};
use crate::Document;

/// Magic constant for approximating a quarter arc with one cubic bezier.
const ARC_MAGIC: f32 = 0.552_284_8;

/// One step of a free-form path, mirroring the PDF path operators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathOp {
    /// Begin a new subpath at the point (`m`)
    MoveTo(f32, f32),
    /// Straight segment to the point (`l`)
    LineTo(f32, f32),
    /// Cubic bezier: two control points then the endpoint (`c`)
    CurveTo(f32, f32, f32, f32, f32, f32),
    /// Cubic bezier reusing the current point as first control (`v`):
    /// second control point then the endpoint
    CurveToV(f32, f32, f32, f32),
    /// Cubic bezier using the endpoint as second control (`y`):
    /// first control point then the endpoint
    CurveToY(f32, f32, f32, f32),
    /// Close the subpath (`h`)
    ClosePath,
}

impl Document {
    /// Draw a straight line.
    pub fn add_line(
        &mut self,
        page: Option<ObjectId>,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: Color,
    ) -> Result<()> {
        let result = self.add_line_impl(page, x1, y1, x2, y2, width, color);
        self.track(result)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn add_line_impl(
        &mut self,
        page: Option<ObjectId>,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: Color,
    ) -> Result<()> {
        let mut ops = ContentBuffer::new();
        ops.push_str("BT\r\n");
        write!(ops, "{} w\r\n", real(width));
        write!(ops, "{} {} m\r\n", real(x1), real(y1));
        ops.push_str("/DeviceRGB CS\r\n");
        self.stroke_color(&mut ops, color);
        write!(ops, "{} {} l S\r\n", real(x2), real(y2));
        ops.push_str("ET");
        self.add_stream_impl(page, ops.as_str()?)?;
        Ok(())
    }

    /// Draw a cubic bezier curve between `(x1, y1)` and `(x2, y2)` with
    /// two control points.
    #[allow(clippy::too_many_arguments)]
    pub fn add_cubic_bezier(
        &mut self,
        page: Option<ObjectId>,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        xq1: f32,
        yq1: f32,
        xq2: f32,
        yq2: f32,
        width: f32,
        color: Color,
    ) -> Result<()> {
        let result = (|| -> Result<()> {
            let mut ops = ContentBuffer::new();
            write!(ops, "{} w\r\n", real(width));
            write!(ops, "{} {} m\r\n", real(x1), real(y1));
            ops.push_str("/DeviceRGB CS\r\n");
            self.stroke_color(&mut ops, color);
            write!(
                ops,
                "{} {} {} {} {} {} c S",
                real(xq1),
                real(yq1),
                real(xq2),
                real(yq2),
                real(x2),
                real(y2)
            );
            self.add_stream_impl(page, ops.as_str()?)?;
            Ok(())
        })();
        self.track(result)
    }

    /// Draw a quadratic bezier curve between `(x1, y1)` and `(x2, y2)`
    /// with one control point, elevated to the cubic form.
    #[allow(clippy::too_many_arguments)]
    pub fn add_quadratic_bezier(
        &mut self,
        page: Option<ObjectId>,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        xq1: f32,
        yq1: f32,
        width: f32,
        color: Color,
    ) -> Result<()> {
        let xc1 = x1 + (xq1 - x1) * (2.0 / 3.0);
        let yc1 = y1 + (yq1 - y1) * (2.0 / 3.0);
        let xc2 = x2 + (xq1 - x2) * (2.0 / 3.0);
        let yc2 = y2 + (yq1 - y2) * (2.0 / 3.0);
        self.add_cubic_bezier(page, x1, y1, x2, y2, xc1, yc1, xc2, yc2, width, color)
    }

    /// Draw an outline rectangle with its lower-left corner at `(x, y)`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_rectangle(
        &mut self,
        page: Option<ObjectId>,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        border_width: f32,
        color: Color,
    ) -> Result<()> {
        let result = (|| -> Result<()> {
            let mut ops = ContentBuffer::new();
            ops.push_str("BT ");
            self.stroke_color(&mut ops, color);
            write!(ops, "{} w ", real(border_width));
            write!(
                ops,
                "{} {} {} {} re S ",
                real(x),
                real(y),
                real(width),
                real(height)
            );
            ops.push_str("ET");
            self.add_stream_impl(page, ops.as_str()?)?;
            Ok(())
        })();
        self.track(result)
    }

    /// Draw a filled rectangle with its lower-left corner at `(x, y)`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_filled_rectangle(
        &mut self,
        page: Option<ObjectId>,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        border_width: f32,
        color: Color,
    ) -> Result<()> {
        let result = (|| -> Result<()> {
            let mut ops = ContentBuffer::new();
            ops.push_str("BT ");
            self.fill_color(&mut ops, color);
            write!(ops, "{} w ", real(border_width));
            write!(
                ops,
                "{} {} {} {} re f ",
                real(x),
                real(y),
                real(width),
                real(height)
            );
            ops.push_str("ET");
            self.add_stream_impl(page, ops.as_str()?)?;
            Ok(())
        })();
        self.track(result)
    }

    /// Draw a free-form path. `fill` of `None` leaves the interior
    /// unpainted; otherwise the path is filled and stroked.
    pub fn add_custom_path(
        &mut self,
        page: Option<ObjectId>,
        operations: &[PathOp],
        stroke_width: f32,
        stroke_color: Color,
        fill: Option<Color>,
    ) -> Result<()> {
        let result = self.add_custom_path_impl(page, operations, stroke_width, stroke_color, fill);
        self.track(result)
    }

    fn add_custom_path_impl(
        &mut self,
        page: Option<ObjectId>,
        operations: &[PathOp],
        stroke_width: f32,
        stroke_color: Color,
        fill: Option<Color>,
    ) -> Result<()> {
        if operations.is_empty() {
            return Err(Error::InvalidArgument("empty path".to_string()));
        }
        let mut ops = ContentBuffer::new();
        if let Some(fill) = fill {
            self.fill_color(&mut ops, fill);
        }
        self.stroke_color(&mut ops, stroke_color);
        write!(ops, "{} w\r\n", real(stroke_width));
        for op in operations {
            match *op {
                PathOp::MoveTo(x, y) => write!(ops, "{} {} m\r\n", real(x), real(y)),
                PathOp::LineTo(x, y) => write!(ops, "{} {} l\r\n", real(x), real(y)),
                PathOp::CurveTo(cx1, cy1, cx2, cy2, x, y) => write!(
                    ops,
                    "{} {} {} {} {} {} c\r\n",
                    real(cx1),
                    real(cy1),
                    real(cx2),
                    real(cy2),
                    real(x),
                    real(y)
                ),
                PathOp::CurveToV(cx2, cy2, x, y) => write!(
                    ops,
                    "{} {} {} {} v\r\n",
                    real(cx2),
                    real(cy2),
                    real(x),
                    real(y)
                ),
                PathOp::CurveToY(cx1, cy1, x, y) => write!(
                    ops,
                    "{} {} {} {} y\r\n",
                    real(cx1),
                    real(cy1),
                    real(x),
                    real(y)
                ),
                PathOp::ClosePath => ops.push_str("h\r\n"),
            }
        }
        ops.push_str(if fill.is_some() { "B" } else { "S" });
        self.add_stream_impl(page, ops.as_str()?)?;
        Ok(())
    }

    /// Draw an ellipse centered at `(x, y)`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_ellipse(
        &mut self,
        page: Option<ObjectId>,
        x: f32,
        y: f32,
        xradius: f32,
        yradius: f32,
        width: f32,
        color: Color,
        fill: Option<Color>,
    ) -> Result<()> {
        let lx = xradius * ARC_MAGIC;
        let ly = yradius * ARC_MAGIC;
        let operations = [
            PathOp::MoveTo(x + xradius, y),
            PathOp::CurveTo(x + xradius, y + ly, x + lx, y + yradius, x, y + yradius),
            PathOp::CurveTo(x - lx, y + yradius, x - xradius, y + ly, x - xradius, y),
            PathOp::CurveTo(x - xradius, y - ly, x - lx, y - yradius, x, y - yradius),
            PathOp::CurveTo(x + lx, y - yradius, x + xradius, y - ly, x + xradius, y),
        ];
        self.add_custom_path(page, &operations, width, color, fill)
    }

    /// Draw a circle centered at `(x, y)`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_circle(
        &mut self,
        page: Option<ObjectId>,
        x: f32,
        y: f32,
        radius: f32,
        width: f32,
        color: Color,
        fill: Option<Color>,
    ) -> Result<()> {
        self.add_ellipse(page, x, y, radius, radius, width, color, fill)
    }

    /// Draw an outline polygon through the given points.
    pub fn add_polygon(
        &mut self,
        page: Option<ObjectId>,
        points: &[(f32, f32)],
        border_width: f32,
        color: Color,
    ) -> Result<()> {
        let result = self.polygon_path(page, points, border_width, color, None);
        self.track(result)
    }

    /// Draw a filled polygon through the given points.
    pub fn add_filled_polygon(
        &mut self,
        page: Option<ObjectId>,
        points: &[(f32, f32)],
        border_width: f32,
        color: Color,
    ) -> Result<()> {
        let result = self.polygon_path(page, points, border_width, color, Some(color));
        self.track(result)
    }

    fn polygon_path(
        &mut self,
        page: Option<ObjectId>,
        points: &[(f32, f32)],
        border_width: f32,
        color: Color,
        fill: Option<Color>,
    ) -> Result<()> {
        if points.len() < 2 {
            return Err(Error::InvalidArgument(
                "polygon needs at least two points".to_string(),
            ));
        }
        let mut operations = Vec::with_capacity(points.len() + 1);
        operations.push(PathOp::MoveTo(points[0].0, points[0].1));
        for &(x, y) in &points[1..] {
            operations.push(PathOp::LineTo(x, y));
        }
        operations.push(PathOp::ClosePath);
        self.add_custom_path_impl(page, &operations, border_width, color, fill)
    }

    /// `RG` stroke color plus the alpha graphics state.
    fn stroke_color(&self, ops: &mut ContentBuffer, color: Color) {
        let (r, g, b) = color.components();
        write!(ops, "{} {} {} RG\r\n", real(r), real(g), real(b));
        write!(ops, "/GS{} gs\r\n", color.gs_index());
    }

    /// `rg` fill color plus the alpha graphics state.
    fn fill_color(&self, ops: &mut ContentBuffer, color: Color) {
        let (r, g, b) = color.components();
        write!(ops, "{} {} {} rg\r\n", real(r), real(g), real(b));
        write!(ops, "/GS{} gs\r\n", color.gs_index());
    }
}

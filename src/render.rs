//! Rasterization of module matrices
//!
//! Both pixel-buffer and recording outputs go through one drawing routine
//! parameterized over the [DrawTarget] capability, so raster and painter
//! rendering can never disagree on geometry.
use crate::{
    Ecc, EncodeError, Point, QrMatrix, RGBA, Scalar, SurfaceMut, SurfaceOwned, Transform, clamp,
    encode, to_svg,
};

/// Extra module-units added on each side of a filled module square
///
/// Compensates for anti-aliasing seams between adjacent squares at shared
/// edges. The value is empirical and tied to the sampling of the target
/// rasterizer; treat it as tunable, not sacred.
pub const MODULE_OVERLAP: Scalar = 0.02;

// edge length of a filled module square
const MODULE_EDGE: Scalar = 1.0 + 2.0 * MODULE_OVERLAP;

/// Capability required of a drawing target
///
/// Transform calls accumulate; there is no save/restore. A caller that
/// needs its previous transform state back must keep it around itself.
pub trait DrawTarget {
    /// Scale subsequent drawing by `[sx, sy]`
    fn scale(&mut self, sx: Scalar, sy: Scalar);

    /// Translate subsequent drawing by `[tx, ty]`
    fn translate(&mut self, tx: Scalar, ty: Scalar);

    /// Fill an axis-aligned rectangle given in drawing coordinates
    fn fill_rect(&mut self, x: Scalar, y: Scalar, width: Scalar, height: Scalar);
}

/// Draw dark modules of the matrix onto the target
///
/// Shared by every output form: scales the target so that
/// `size + 2 * border` module-units span `size` output units, translates
/// by the border (minus the seam overlap) and fills one slightly
/// over-sized unit square per dark module, row-major. Light modules are
/// left to the background.
pub fn draw_modules(target: &mut impl DrawTarget, matrix: &QrMatrix, border: usize, size: usize) {
    let scale = size as Scalar / (matrix.size() + 2 * border) as Scalar;
    target.scale(scale, scale);
    target.translate(border as Scalar - MODULE_OVERLAP, border as Scalar - MODULE_OVERLAP);
    for (x, y) in matrix.dark_modules() {
        target.fill_rect(x as Scalar, y as Scalar, MODULE_EDGE, MODULE_EDGE);
    }
}

/// Render matrix into a fresh `size x size` pixel buffer
///
/// White background, black modules, solid fill without strokes. Output is
/// deterministic: identical inputs produce pixel-identical buffers.
pub fn render_image(matrix: &QrMatrix, border: usize, size: usize) -> SurfaceOwned<RGBA> {
    let mut img = SurfaceOwned::new_with(size, size, |_, _| RGBA::WHITE);
    let mut painter = RasterPainter::new(&mut img, RGBA::BLACK);
    draw_modules(&mut painter, matrix, border, size);
    tracing::debug!(
        "[render_image] {} modules -> {}x{} pixels",
        matrix.size(),
        size,
        size
    );
    img
}

/// Encode text and render it into a fresh pixel buffer
pub fn generate_image(
    text: &str,
    size: usize,
    border: usize,
    ecc: Ecc,
) -> Result<SurfaceOwned<RGBA>, EncodeError> {
    Ok(render_image(&encode(text, ecc)?, border, size))
}

/// Encode text and draw it onto a caller-owned target
///
/// The only operation with a side effect beyond its return value: it
/// advances the target's transform state and appends draw calls to it.
pub fn generate_onto(
    target: &mut impl DrawTarget,
    text: &str,
    size: usize,
    border: usize,
    ecc: Ecc,
) -> Result<(), EncodeError> {
    let matrix = encode(text, ecc)?;
    draw_modules(target, &matrix, border, size);
    Ok(())
}

/// Encode text and render it as an SVG document
pub fn generate_svg(text: &str, border: usize, ecc: Ecc) -> Result<String, EncodeError> {
    Ok(to_svg(&encode(text, ecc)?, border))
}

/// Draw target backed by a mutable pixel surface
///
/// Fills rectangles with a single color by rounding their transformed
/// bounds to the nearest pixel, clamped at the surface edges.
pub struct RasterPainter<'a, S> {
    surf: &'a mut S,
    tr: Transform,
    color: RGBA,
}

impl<'a, S: SurfaceMut<Item = RGBA>> RasterPainter<'a, S> {
    pub fn new(surf: &'a mut S, color: RGBA) -> Self {
        Self {
            surf,
            tr: Transform::identity(),
            color,
        }
    }
}

impl<S: SurfaceMut<Item = RGBA>> DrawTarget for RasterPainter<'_, S> {
    fn scale(&mut self, sx: Scalar, sy: Scalar) {
        self.tr = self.tr.scale(sx, sy);
    }

    fn translate(&mut self, tx: Scalar, ty: Scalar) {
        self.tr = self.tr.translate(tx, ty);
    }

    fn fill_rect(&mut self, x: Scalar, y: Scalar, width: Scalar, height: Scalar) {
        let Point([x0, y0]) = self.tr.apply(Point::new(x, y));
        let Point([x1, y1]) = self.tr.apply(Point::new(x + width, y + height));
        let (x0, x1) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let (y0, y1) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };

        let shape = self.surf.shape();
        let col0 = clamp(x0.round(), 0.0, shape.width as Scalar) as usize;
        let col1 = clamp(x1.round(), 0.0, shape.width as Scalar) as usize;
        let row0 = clamp(y0.round(), 0.0, shape.height as Scalar) as usize;
        let row1 = clamp(y1.round(), 0.0, shape.height as Scalar) as usize;

        let data = self.surf.data_mut();
        for row in row0..row1 {
            let row_offset = shape.offset(row, 0);
            for col in col0..col1 {
                data[row_offset + col * shape.col_stride] = self.color;
            }
        }
    }
}

/// Single drawing instruction recorded by [DrawList]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCmd {
    Scale(Scalar, Scalar),
    Translate(Scalar, Scalar),
    FillRect {
        x: Scalar,
        y: Scalar,
        width: Scalar,
        height: Scalar,
    },
}

/// Recording draw target
///
/// Keeps the list of issued drawing instructions together with the
/// cumulative transform, the way an interactive painter would. Replaying
/// the list on any other target reproduces the drawing.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    cmds: Vec<DrawCmd>,
    tr: Transform,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded instructions in issue order
    pub fn cmds(&self) -> &[DrawCmd] {
        &self.cmds
    }

    /// Cumulative transform after all recorded instructions
    pub fn transform(&self) -> Transform {
        self.tr
    }

    pub fn into_cmds(self) -> Vec<DrawCmd> {
        self.cmds
    }
}

impl DrawTarget for DrawList {
    fn scale(&mut self, sx: Scalar, sy: Scalar) {
        self.tr = self.tr.scale(sx, sy);
        self.cmds.push(DrawCmd::Scale(sx, sy));
    }

    fn translate(&mut self, tx: Scalar, ty: Scalar) {
        self.tr = self.tr.translate(tx, ty);
        self.cmds.push(DrawCmd::Translate(tx, ty));
    }

    fn fill_rect(&mut self, x: Scalar, y: Scalar, width: Scalar, height: Scalar) {
        self.cmds.push(DrawCmd::FillRect {
            x,
            y,
            width,
            height,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Surface, assert_approx_eq};

    #[test]
    fn test_render_image_geometry() {
        // single dark module at (0, 0) of a 3x3 grid, border 1, 50px:
        // scale is 10, the square covers pixels [10, 20) on both axes
        let matrix = QrMatrix::from_fn(3, |x, y| x == 0 && y == 0);
        let img = render_image(&matrix, 1, 50);
        assert_eq!(img.width(), 50);
        assert_eq!(img.height(), 50);

        assert_eq!(*img.get(15, 15).unwrap(), RGBA::BLACK);
        assert_eq!(*img.get(10, 10).unwrap(), RGBA::BLACK);
        assert_eq!(*img.get(19, 19).unwrap(), RGBA::BLACK);
        assert_eq!(*img.get(9, 15).unwrap(), RGBA::WHITE);
        assert_eq!(*img.get(15, 9).unwrap(), RGBA::WHITE);
        assert_eq!(*img.get(20, 20).unwrap(), RGBA::WHITE);
        assert_eq!(*img.get(5, 5).unwrap(), RGBA::WHITE);
    }

    #[test]
    fn test_render_image_deterministic() {
        let matrix = QrMatrix::from_fn(5, |x, y| (x + y) % 2 == 0);
        let img0 = render_image(&matrix, 2, 64);
        let img1 = render_image(&matrix, 2, 64);
        assert_eq!(img0.data(), img1.data());
    }

    #[test]
    fn test_render_image_blank() {
        let matrix = QrMatrix::from_fn(1, |_, _| false);
        let img = render_image(&matrix, 0, 16);
        assert!(img.iter().all(|pixel| *pixel == RGBA::WHITE));
    }

    #[test]
    fn test_render_image_degenerate() {
        // size 0 is a documented caller contract, not an error
        let matrix = QrMatrix::from_fn(3, |_, _| true);
        let img = render_image(&matrix, 0, 0);
        assert_eq!(img.width(), 0);
        assert_eq!(img.iter().count(), 0);
    }

    #[test]
    fn test_raster_painter_clamps() {
        let mut surf = SurfaceOwned::new_with(4, 4, |_, _| RGBA::WHITE);
        let mut painter = RasterPainter::new(&mut surf, RGBA::BLACK);
        painter.fill_rect(-10.0, -10.0, 100.0, 100.0);
        assert!(surf.iter().all(|pixel| *pixel == RGBA::BLACK));
    }

    #[test]
    fn test_draw_list() {
        let matrix = QrMatrix::from_fn(3, |x, y| x == 0 && y == 0);
        let mut list = DrawList::new();
        draw_modules(&mut list, &matrix, 1, 50);

        let cmds = list.cmds();
        assert_eq!(cmds.len(), 3);
        match cmds[0] {
            DrawCmd::Scale(sx, sy) => {
                assert_approx_eq!(sx, 10.0);
                assert_approx_eq!(sy, 10.0);
            }
            cmd => panic!("expected scale, got {:?}", cmd),
        }
        match cmds[1] {
            DrawCmd::Translate(tx, ty) => {
                assert_approx_eq!(tx, 0.98, 1e-12);
                assert_approx_eq!(ty, 0.98, 1e-12);
            }
            cmd => panic!("expected translate, got {:?}", cmd),
        }
        match cmds[2] {
            DrawCmd::FillRect {
                x,
                y,
                width,
                height,
            } => {
                assert_approx_eq!(x, 0.0);
                assert_approx_eq!(y, 0.0);
                assert_approx_eq!(width, 1.04, 1e-12);
                assert_approx_eq!(height, 1.04, 1e-12);
            }
            cmd => panic!("expected fill rect, got {:?}", cmd),
        }

        // cumulative transform matches the raster mapping
        let p = list.transform().apply(Point::new(0.0, 0.0));
        assert_approx_eq!(p.x(), 9.8, 1e-12);
        assert_approx_eq!(p.y(), 9.8, 1e-12);
    }

    #[test]
    fn test_draw_list_module_count() {
        let matrix = QrMatrix::from_fn(7, |x, y| (x * y) % 3 == 1);
        let mut list = DrawList::new();
        draw_modules(&mut list, &matrix, 4, 210);
        let fills = list
            .into_cmds()
            .into_iter()
            .filter(|cmd| matches!(cmd, DrawCmd::FillRect { .. }))
            .count();
        assert_eq!(fills, matrix.dark_count());
    }

    #[test]
    fn test_generate() -> Result<(), EncodeError> {
        let img = generate_image("HELLO WORLD", 210, 4, Ecc::Low)?;
        assert_eq!(img.width(), 210);
        // finder patterns guarantee black pixels somewhere
        assert!(img.iter().any(|pixel| *pixel == RGBA::BLACK));

        let svg = generate_svg("HELLO WORLD", 4, Ecc::Low)?;
        assert!(svg.contains("viewBox=\"0 0 29 29\""));

        let mut list = DrawList::new();
        generate_onto(&mut list, "HELLO WORLD", 210, 4, Ecc::Low)?;
        assert!(!list.cmds().is_empty());
        Ok(())
    }
}

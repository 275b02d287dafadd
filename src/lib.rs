//! Simple and small QR code rendering library.
//!
//! Symbol encoding is delegated to the `qrcode` crate; this library owns
//! only the geometry that turns a module matrix into output:
//!  - rasterization into an in-memory pixel buffer
//!  - draw calls against an abstract painter-style target
//!  - byte-exact SVG generation (and extraction back out of it)
//!
#![deny(warnings)]

mod color;
mod encode;
mod geometry;
mod matrix;
mod render;
mod surface;
mod svg;
mod utils;

pub use color::{ColorError, RGBA};
pub use encode::{Ecc, EncodeError, encode};
pub use geometry::{EPSILON, Point, Scalar, Transform, scalar_fmt};
pub use matrix::QrMatrix;
pub use render::{
    DrawCmd, DrawList, DrawTarget, MODULE_OVERLAP, RasterPainter, draw_modules, generate_image,
    generate_onto, generate_svg, render_image,
};
#[cfg(feature = "png")]
pub use surface::write_png;
pub use surface::{Shape, Surface, SurfaceIter, SurfaceMut, SurfaceOwned};
pub use svg::{SvgParseError, SvgSquareParser, matrix_from_svg, modules_from_svg, to_svg};
use utils::clamp;

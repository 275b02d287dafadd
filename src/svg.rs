//! SVG document generation and module extraction
//!
//! The generated document is a stable byte-for-byte function of the matrix
//! and border, suitable for snapshot testing. Extraction parses the subset
//! of [SVG path data](https://www.w3.org/TR/SVG11/paths.html#PathData) this
//! module emits (`M`, `h`, `v`, `z`) back into module positions.
use crate::QrMatrix;
use std::{
    fmt,
    io::{Cursor, Read},
};

const SVG_PREAMBLE: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
    <!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \
    \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">";
const PATH_PREFIX: &str = "<path d=\"";
const VIEWBOX_PREFIX: &str = "viewBox=\"0 0 ";

/// Render matrix as a self-contained SVG 1.1 document
///
/// The viewBox spans `size + 2 * border` units, the background is a white
/// rectangle and all dark modules are unit-square subpaths of a single
/// black path element, emitted in row-major order. Coordinates are plain
/// integers; vector output needs no anti-aliasing seam correction.
pub fn to_svg(matrix: &QrMatrix, border: usize) -> String {
    let dimension = matrix.size() + 2 * border;
    let mut svg = String::from(SVG_PREAMBLE);
    svg += &format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" \
         viewBox=\"0 0 {0} {0}\" stroke=\"none\">",
        dimension
    );
    svg += "<rect width=\"100%\" height=\"100%\" fill=\"#FFFFFF\"/>";
    svg += PATH_PREFIX;
    let mut first = true;
    for (x, y) in matrix.dark_modules() {
        if !first {
            svg += " ";
        }
        first = false;
        svg += &format!("M{},{}h1v1h-1z", x + border, y + border);
    }
    svg += "\" fill=\"#000000\"/></svg>";
    svg
}

struct Parser<I> {
    input: I,
    input_buffer: Option<u8>,
}

impl<I: Read> Parser<I> {
    fn new(input: I) -> Self {
        Self {
            input,
            input_buffer: None,
        }
    }

    // consume single byte from the input
    fn parse_byte(&mut self) -> Result<Option<u8>, SvgParseError> {
        match self.input_buffer.take() {
            None => {
                let mut byte = [0; 1];
                if self.input.read(&mut byte)? != 0 {
                    Ok(Some(byte[0]))
                } else {
                    Ok(None)
                }
            }
            byte => Ok(byte),
        }
    }

    // put byte into input buffer, at most one byte is cached
    fn unparse_byte(&mut self, byte: u8) {
        debug_assert!(self.input_buffer.is_none());
        self.input_buffer = Some(byte);
    }

    // consume separators from the input
    fn parse_separators(&mut self) -> Result<(), SvgParseError> {
        loop {
            let byte = match self.parse_byte()? {
                None => break,
                Some(byte) => byte,
            };
            if !matches!(byte, b' ' | b'\t' | b'\r' | b'\n' | b',') {
                self.unparse_byte(byte);
                break;
            }
        }
        Ok(())
    }

    // parse single integer coordinate from the input
    fn parse_int(&mut self) -> Result<i64, SvgParseError> {
        self.parse_separators()?;
        let mut value: i64 = 0;
        let mut sign = 1;
        let mut digits = 0;
        match self.parse_byte()? {
            Some(b'-') => sign = -1,
            Some(b'+') => (),
            Some(byte) => self.unparse_byte(byte),
            None => (),
        }
        loop {
            let byte = match self.parse_byte()? {
                None => break,
                Some(byte) => byte,
            };
            if !byte.is_ascii_digit() {
                self.unparse_byte(byte);
                break;
            }
            digits += 1;
            value = value.wrapping_mul(10).wrapping_add((byte - b'0') as i64);
        }
        if digits == 0 {
            return Err(SvgParseError::InvalidScalar);
        }
        Ok(sign * value)
    }
}

/// Parser for the unit-square path data emitted by [to_svg]
///
/// Iterates over `M{x},{y}h1v1h-1z` subpaths yielding the `(x, y)` corner
/// of each square in document units (border offset included).
pub struct SvgSquareParser<I> {
    parser: Parser<I>,
}

impl<I: Read> SvgSquareParser<I> {
    pub fn new(input: I) -> Self {
        Self {
            parser: Parser::new(input),
        }
    }

    /// Parse single subpath from the input, none indicates end of input
    pub fn parse_square(&mut self) -> Result<Option<(i64, i64)>, SvgParseError> {
        self.parser.parse_separators()?;
        let op = match self.parser.parse_byte()? {
            None => return Ok(None),
            Some(op) => op,
        };
        if op != b'M' {
            return Err(SvgParseError::InvalidCmd(op));
        }
        let x = self.parser.parse_int()?;
        let y = self.parser.parse_int()?;
        for (cmd, value) in [(b'h', 1), (b'v', 1), (b'h', -1)] {
            self.parser.parse_separators()?;
            match self.parser.parse_byte()? {
                Some(byte) if byte == cmd => (),
                Some(byte) => return Err(SvgParseError::InvalidCmd(byte)),
                None => return Err(SvgParseError::UnexpectedEnd),
            }
            if self.parser.parse_int()? != value {
                return Err(SvgParseError::NotUnitSquare);
            }
        }
        self.parser.parse_separators()?;
        match self.parser.parse_byte()? {
            Some(b'z') => Ok(Some((x, y))),
            Some(byte) => Err(SvgParseError::InvalidCmd(byte)),
            None => Err(SvgParseError::UnexpectedEnd),
        }
    }
}

impl<I: Read> Iterator for SvgSquareParser<I> {
    type Item = Result<(i64, i64), SvgParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.parse_square().transpose()
    }
}

// path data of the first path element in the document
fn path_data(svg: &str) -> Result<&str, SvgParseError> {
    let start = svg
        .find(PATH_PREFIX)
        .ok_or(SvgParseError::PathNotFound)?
        + PATH_PREFIX.len();
    let len = svg[start..].find('"').ok_or(SvgParseError::PathNotFound)?;
    Ok(&svg[start..start + len])
}

// side of the square viewBox
fn view_box_side(svg: &str) -> Result<usize, SvgParseError> {
    let start = svg
        .find(VIEWBOX_PREFIX)
        .ok_or(SvgParseError::ViewBoxNotFound)?
        + VIEWBOX_PREFIX.len();
    let rest = &svg[start..];
    let len = rest.find(' ').ok_or(SvgParseError::ViewBoxNotFound)?;
    rest[..len]
        .parse()
        .map_err(|_| SvgParseError::InvalidScalar)
}

/// Extract dark module positions from a generated document
///
/// Positions are in document units, border offset included.
pub fn modules_from_svg(svg: &str) -> Result<Vec<(i64, i64)>, SvgParseError> {
    SvgSquareParser::new(Cursor::new(path_data(svg)?.as_bytes())).collect()
}

/// Reconstruct the module matrix from a generated document
///
/// Inverse of [to_svg] given the same border: the matrix side is recovered
/// from the viewBox and every square subpath becomes a dark module.
pub fn matrix_from_svg(svg: &str, border: usize) -> Result<QrMatrix, SvgParseError> {
    let side = view_box_side(svg)?;
    let size = side
        .checked_sub(2 * border)
        .ok_or(SvgParseError::ModuleOutOfBounds)?;
    let mut modules = vec![false; size * size];
    for module in SvgSquareParser::new(Cursor::new(path_data(svg)?.as_bytes())) {
        let (x, y) = module?;
        let x = x - border as i64;
        let y = y - border as i64;
        if x < 0 || y < 0 || x >= size as i64 || y >= size as i64 {
            return Err(SvgParseError::ModuleOutOfBounds);
        }
        modules[y as usize * size + x as usize] = true;
    }
    Ok(QrMatrix::new(size, modules))
}

/// Error while extracting modules from an SVG document
#[derive(Debug)]
pub enum SvgParseError {
    /// Failed to parse SVG command
    InvalidCmd(u8),
    /// Failed to parse scalar value
    InvalidScalar,
    /// Subpath is not a unit square
    NotUnitSquare,
    /// Input ended in the middle of a subpath
    UnexpectedEnd,
    /// Document carries no path element
    PathNotFound,
    /// Document carries no square viewBox
    ViewBoxNotFound,
    /// Square position does not fit the declared viewBox
    ModuleOutOfBounds,
    /// IO error propagated while reading input stream
    IoError(std::io::Error),
}

impl fmt::Display for SvgParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SvgParseError::{:?}", self)
    }
}

impl From<std::io::Error> for SvgParseError {
    fn from(error: std::io::Error) -> Self {
        Self::IoError(error)
    }
}

impl std::error::Error for SvgParseError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Ecc, encode};

    #[test]
    fn test_svg_single_module() {
        let matrix = QrMatrix::from_fn(3, |x, y| x == 0 && y == 0);
        let svg = to_svg(&matrix, 1);
        assert!(svg.contains("viewBox=\"0 0 5 5\""));
        assert!(svg.contains("<path d=\"M1,1h1v1h-1z\" fill=\"#000000\"/>"));
        assert_eq!(modules_from_svg(&svg).unwrap(), vec![(1, 1)]);
    }

    #[test]
    fn test_svg_two_modules() {
        let matrix = QrMatrix::from_fn(3, |x, y| y == 0 && x < 2);
        let svg = to_svg(&matrix, 0);
        assert!(svg.contains("<path d=\"M0,0h1v1h-1z M1,0h1v1h-1z\" fill=\"#000000\"/>"));
        assert_eq!(modules_from_svg(&svg).unwrap(), vec![(0, 0), (1, 0)]);
    }

    #[test]
    fn test_svg_empty() {
        let matrix = QrMatrix::from_fn(1, |_, _| false);
        let svg = to_svg(&matrix, 0);
        assert_eq!(
            svg,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \
             \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\
             <svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" \
             viewBox=\"0 0 1 1\" stroke=\"none\">\
             <rect width=\"100%\" height=\"100%\" fill=\"#FFFFFF\"/>\
             <path d=\"\" fill=\"#000000\"/></svg>"
        );
        assert_eq!(modules_from_svg(&svg).unwrap(), vec![]);
        assert_eq!(matrix_from_svg(&svg, 0).unwrap(), matrix);
    }

    #[test]
    fn test_svg_deterministic() {
        let matrix = QrMatrix::from_fn(5, |x, y| (x + y) % 2 == 0);
        assert_eq!(to_svg(&matrix, 2), to_svg(&matrix, 2));
    }

    #[test]
    fn test_module_count() {
        let matrix = QrMatrix::from_fn(7, |x, y| (x * y) % 3 == 1);
        let svg = to_svg(&matrix, 4);
        assert_eq!(modules_from_svg(&svg).unwrap().len(), matrix.dark_count());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            modules_from_svg("<svg></svg>"),
            Err(SvgParseError::PathNotFound)
        ));

        let squares: Result<Vec<_>, _> =
            SvgSquareParser::new(Cursor::new(b"M1,1h2v1h-1z".as_slice())).collect();
        assert!(matches!(squares, Err(SvgParseError::NotUnitSquare)));

        let squares: Result<Vec<_>, _> =
            SvgSquareParser::new(Cursor::new(b"L1,1".as_slice())).collect();
        assert!(matches!(squares, Err(SvgParseError::InvalidCmd(b'L'))));

        let squares: Result<Vec<_>, _> =
            SvgSquareParser::new(Cursor::new(b"M1,1h1v1".as_slice())).collect();
        assert!(matches!(squares, Err(SvgParseError::UnexpectedEnd)));
    }

    #[test]
    fn test_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
        let matrix = encode("ROUND TRIP", Ecc::Medium)?;
        let svg = to_svg(&matrix, 4);
        assert_eq!(matrix_from_svg(&svg, 4)?, matrix);
        Ok(())
    }
}

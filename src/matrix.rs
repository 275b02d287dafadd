use qrcode::{Color, QrCode};

/// Square grid of QR modules produced by the symbol encoder
///
/// Cells are stored row-major, `true` meaning "dark module present". The
/// renderers only ever read it; nothing here knows about pixels or borders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    size: usize,
    modules: Vec<bool>,
}

impl QrMatrix {
    /// Construct matrix from a side length and row-major module data
    pub fn new(size: usize, modules: Vec<bool>) -> Self {
        assert!(
            modules.len() == size * size,
            "module data must be square: {} != {}x{}",
            modules.len(),
            size,
            size
        );
        Self { size, modules }
    }

    /// Construct matrix by evaluating `f(x, y)` for every cell
    pub fn from_fn<F>(size: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> bool,
    {
        let mut modules = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                modules.push(f(x, y))
            }
        }
        Self { size, modules }
    }

    /// Side length of the symbol in modules
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the module at `(x, y)` is dark, false outside of the grid
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.size && *self.modules.get(y * self.size + x).unwrap_or(&false)
    }

    /// Number of dark modules
    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|dark| **dark).count()
    }

    /// Positions of dark modules in row-major order (`y` outer, `x` inner)
    pub fn dark_modules(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let size = self.size;
        self.modules
            .iter()
            .enumerate()
            .filter_map(move |(index, dark)| dark.then_some((index % size, index / size)))
    }
}

impl From<&QrCode> for QrMatrix {
    fn from(code: &QrCode) -> Self {
        let size = code.width();
        let modules = code
            .to_colors()
            .into_iter()
            .map(|color| color == Color::Dark)
            .collect();
        Self::new(size, modules)
    }
}

impl From<QrCode> for QrMatrix {
    fn from(code: QrCode) -> Self {
        Self::from(&code)
    }
}

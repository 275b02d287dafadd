#[cfg(feature = "png")]
use crate::RGBA;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    /// Width of the surface
    pub width: usize,
    /// Height of the surface
    pub height: usize,
    /// How many elements we need to skip to get to the next row.
    pub row_stride: usize,
    /// How many elements we need to skip to get to the next column.
    pub col_stride: usize,
}

impl Shape {
    #[inline]
    pub fn offset(&self, row: usize, col: usize) -> usize {
        row * self.row_stride + col * self.col_stride
    }

    #[inline]
    pub fn nth(&self, n: usize) -> Option<(usize, usize)> {
        if self.width == 0 {
            return None;
        }
        let row = n / self.width;
        let col = n - row * self.width;
        (row < self.height).then_some((row, col))
    }
}

pub trait Surface {
    type Item;

    fn data(&self) -> &[Self::Item];

    fn shape(&self) -> Shape;

    fn width(&self) -> usize {
        self.shape().width
    }

    fn height(&self) -> usize {
        self.shape().height
    }

    fn get(&self, row: usize, col: usize) -> Option<&Self::Item> {
        let offset = self.shape().offset(row, col);
        self.data().get(offset)
    }

    fn iter(&self) -> SurfaceIter<'_, Self::Item> {
        SurfaceIter {
            index: 0,
            shape: self.shape(),
            data: self.data(),
        }
    }
}

pub struct SurfaceIter<'a, P> {
    index: usize,
    shape: Shape,
    data: &'a [P],
}

impl<P> SurfaceIter<'_, P> {
    pub fn position(&self) -> (usize, usize) {
        self.shape.nth(self.index).unwrap_or((self.shape.height, 0))
    }
}

impl<'a, P> Iterator for SurfaceIter<'a, P> {
    type Item = &'a P;

    fn next(&mut self) -> Option<Self::Item> {
        self.nth(0)
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.index += n + 1;
        let (row, col) = self.shape.nth(self.index - 1)?;
        self.data.get(self.shape.offset(row, col))
    }
}

pub trait SurfaceMut: Surface {
    fn data_mut(&mut self) -> &mut [Self::Item];

    fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Self::Item> {
        let index = self.shape().offset(row, col);
        self.data_mut().get_mut(index)
    }

    /// Set every element to the provided value
    fn fill(&mut self, value: Self::Item)
    where
        Self::Item: Copy,
    {
        let shape = self.shape();
        let data = self.data_mut();
        for row in 0..shape.height {
            for col in 0..shape.width {
                data[shape.offset(row, col)] = value;
            }
        }
    }
}

#[derive(Clone)]
pub struct SurfaceOwned<P> {
    shape: Shape,
    data: Vec<P>,
}

impl<P> SurfaceOwned<P> {
    pub fn new_default(height: usize, width: usize) -> Self
    where
        P: Default,
    {
        Self::new_with(height, width, |_, _| Default::default())
    }

    pub fn new_with<F>(height: usize, width: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> P,
    {
        let mut data = Vec::with_capacity(height * width);
        for row in 0..height {
            for col in 0..width {
                data.push(f(row, col))
            }
        }
        Self {
            shape: Shape {
                width,
                height,
                row_stride: width,
                col_stride: 1,
            },
            data,
        }
    }

    pub fn to_vec(self) -> Vec<P> {
        self.data
    }
}

impl<P> Surface for SurfaceOwned<P> {
    type Item = P;

    fn shape(&self) -> Shape {
        self.shape
    }

    fn data(&self) -> &[Self::Item] {
        &self.data
    }
}

impl<P> SurfaceMut for SurfaceOwned<P> {
    fn data_mut(&mut self) -> &mut [Self::Item] {
        &mut self.data
    }
}

/// Write surface as an 8-bit RGBA PNG
///
/// Bytes go through [RGBA::to_rgba] so the channel order does not depend
/// on the host endianness.
#[cfg(feature = "png")]
pub fn write_png(
    surf: &impl Surface<Item = RGBA>,
    out: impl std::io::Write,
) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(out, surf.width() as u32, surf.height() as u32);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    let mut data = Vec::with_capacity(surf.width() * surf.height() * 4);
    for pixel in surf.iter() {
        data.extend_from_slice(&pixel.to_rgba());
    }
    writer.write_image_data(&data)?;
    writer.finish()
}

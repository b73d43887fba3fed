use crate::{GridCells, Loc};
use image::RgbaImage;

/// Colors used to render alive and dead cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub alive: [u8; 4],
    pub dead: [u8; 4],
}

impl Palette {
    pub const BLACK_ON_WHITE: Palette = Palette {
        alive: [0x00, 0x00, 0x00, 0xff],
        dead: [0xff, 0xff, 0xff, 0xff],
    };

    pub fn color_rgba(&self, alive: bool) -> [u8; 4] {
        if alive { self.alive } else { self.dead }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::BLACK_ON_WHITE
    }
}

/// One generation rendered as a `size` x `size` RGBA image, one pixel per
/// cell. Read-only once created.
#[derive(Clone, Debug)]
pub struct Snapshot {
    image: RgbaImage,
}

impl Snapshot {
    pub fn render(cells: &GridCells, palette: &Palette) -> Self {
        let mut image = RgbaImage::new(cells.size(), cells.size());
        debug_assert_eq!(image.len(), 4 * cells.num_cells());

        for (cell, pixel) in cells.cells_iter().zip(image.chunks_exact_mut(4)) {
            pixel.copy_from_slice(&palette.color_rgba(*cell));
        }
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Color of the cell at `loc`, which is the pixel at x = col, y = row.
    pub fn pixel(&self, loc: Loc) -> [u8; 4] {
        self.image.get_pixel(loc.col, loc.row).0
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.image.dimensions() == other.image.dimensions()
            && self.image.as_raw() == other.image.as_raw()
    }
}

impl Eq for Snapshot {}

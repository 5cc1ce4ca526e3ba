use crate::error::Error;
use crate::graphics::Color;
use std::path::Path;

/// Pixels of the built-in logo letters, one mask cell per `LETTER_SCALE` pixels
const LETTERS: [&str; 7] = [
    "#...#.#####..####",
    "#...#...#...#....",
    "#...#...#...#....",
    "#####...#....###.",
    "#...#...#.......#",
    "#...#...#.......#",
    "#...#...#...####.",
];
const LETTER_SCALE: u32 = 12;
const LETTER_MARGIN: u32 = 6;

/// An RGBA image that can be composited onto a surface
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    width: u32,
    height: u32,
    /// Straight-alpha RGBA, row major
    pixels: Vec<u8>,
}

impl Sprite {
    /// Wraps a raw RGBA buffer
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, Error> {
        if width == 0 || height == 0 {
            return Err(Error::EmptySprite { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(Error::SpriteBuffer {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Sprite {
            width,
            height,
            pixels,
        })
    }

    /// Decodes an image file
    pub fn load(path: &Path) -> Result<Self, Error> {
        let decoded = image::open(path).map_err(|source| Error::Image {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::info!("loaded sprite {} ({}x{})", path.display(), width, height);
        Sprite::from_rgba(width, height, rgba.into_raw())
    }

    /// The sprites used when no image files are given
    pub fn builtin() -> Vec<Sprite> {
        vec![Sprite::letters(), Sprite::disc(240, 96)]
    }

    /// Block letters rendered from the embedded mask
    fn letters() -> Sprite {
        let columns = LETTERS[0].len() as u32;
        let rows = LETTERS.len() as u32;
        let width = columns * LETTER_SCALE + 2 * LETTER_MARGIN;
        let height = rows * LETTER_SCALE + 2 * LETTER_MARGIN;
        let mut pixels = vec![0u8; (width * height * 4) as usize];

        for (row, line) in LETTERS.iter().enumerate() {
            for (column, cell) in line.bytes().enumerate() {
                if cell != b'#' {
                    continue;
                }
                let left = LETTER_MARGIN + column as u32 * LETTER_SCALE;
                let top = LETTER_MARGIN + row as u32 * LETTER_SCALE;
                for y in top..top + LETTER_SCALE {
                    for x in left..left + LETTER_SCALE {
                        let offset = ((y * width + x) * 4) as usize;
                        pixels[offset..offset + 4].copy_from_slice(&[255, 255, 255, 255]);
                    }
                }
            }
        }

        Sprite {
            width,
            height,
            pixels,
        }
    }

    /// A flat disc with a hole punched through the middle
    fn disc(width: u32, height: u32) -> Sprite {
        let mut pixels = vec![0u8; (width * height * 4) as usize];
        let (rx, ry) = (width as f64 / 2.0, height as f64 / 2.0);

        for y in 0..height {
            for x in 0..width {
                let dx = (x as f64 + 0.5 - rx) / rx;
                let dy = (y as f64 + 0.5 - ry) / ry;
                let distance = dx * dx + dy * dy;
                if distance <= 1.0 && distance >= 0.04 {
                    let offset = ((y * width + x) * 4) as usize;
                    pixels[offset..offset + 4].copy_from_slice(&[255, 255, 255, 255]);
                }
            }
        }

        Sprite {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reads a pixel; out-of-range coordinates are transparent
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        if x >= self.width || y >= self.height {
            return Color::TRANSPARENT;
        }
        let offset = ((y * self.width + x) * 4) as usize;
        Color::rgba8(
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
            self.pixels[offset + 3],
        )
    }
}

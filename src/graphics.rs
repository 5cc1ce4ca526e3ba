use crate::math::{hsl_to_rgb, lerp};
use crate::sprite::Sprite;

/// Straight-alpha 8-bit color
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba8(0, 0, 0, 0);
    pub const WHITE: Color = Color::rgb8(255, 255, 255);
    pub const RED: Color = Color::rgb8(255, 0, 0);
    pub const GREEN: Color = Color::rgb8(0, 128, 0);
    pub const BLUE: Color = Color::rgb8(0, 0, 255);

    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub const fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    /// Opaque color from hue in degrees, saturation and lightness in `[0, 1]`
    pub fn hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
        let [r, g, b] = hsl_to_rgb(hue, saturation, lightness);
        Color::rgb8(r, g, b)
    }

    /// Parses `rrggbb`, with or without a leading `#`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Color::rgb8(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn as_rgba8(&self) -> (u8, u8, u8, u8) {
        (self.r, self.g, self.b, self.a)
    }

    /// Premultiplied channels in `[0, 1]`
    fn premultiplied(&self) -> [f32; 4] {
        let a = self.a as f32 / 255.0;
        [
            self.r as f32 / 255.0 * a,
            self.g as f32 / 255.0 * a,
            self.b as f32 / 255.0 * a,
            a,
        ]
    }

    fn from_premultiplied(p: [f32; 4]) -> Self {
        let a = p[3].clamp(0.0, 1.0);
        if a <= 0.0 {
            return Color::TRANSPARENT;
        }
        let channel = |c: f32| ((c / a).clamp(0.0, 1.0) * 255.0).round() as u8;
        Color::rgba8(
            channel(p[0]),
            channel(p[1]),
            channel(p[2]),
            (a * 255.0).round() as u8,
        )
    }
}

/// Porter-Duff rule used when new content meets existing pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CompositeOp {
    /// New content over existing
    #[default]
    SourceOver,
    /// Existing content kept only where new content is opaque; new content
    /// fills where nothing existed. Pixels the new content does not cover
    /// are cleared.
    DestinationAtop,
    /// New content drawn behind existing content
    DestinationOver,
}

impl CompositeOp {
    /// Blend factors `(source, destination)` for the given alphas
    fn factors(self, source_alpha: f32, destination_alpha: f32) -> (f32, f32) {
        match self {
            CompositeOp::SourceOver => (1.0, 1.0 - source_alpha),
            CompositeOp::DestinationAtop => (1.0 - destination_alpha, source_alpha),
            CompositeOp::DestinationOver => (1.0 - destination_alpha, 1.0),
        }
    }

    /// Whether pixels outside the drawn shape are affected
    fn is_unbounded(self) -> bool {
        matches!(self, CompositeOp::DestinationAtop)
    }

    /// Blends `source` onto `destination`
    pub fn blend(self, source: Color, destination: Color) -> Color {
        let s = source.premultiplied();
        let d = destination.premultiplied();
        let (fs, fd) = self.factors(s[3], d[3]);
        Color::from_premultiplied([
            s[0] * fs + d[0] * fd,
            s[1] * fs + d[1] * fd,
            s[2] * fs + d[2] * fd,
            s[3] * fs + d[3] * fd,
        ])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Two-stop horizontal gradient between `x0` and `x1`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearGradient {
    pub x0: f64,
    pub x1: f64,
    pub start: Color,
    pub end: Color,
}

impl LinearGradient {
    /// Color at horizontal position `x`, padded beyond either end
    pub fn color_at(&self, x: f64) -> Color {
        let span = self.x1 - self.x0;
        let t = if span == 0.0 {
            0.0
        } else {
            ((x - self.x0) / span).clamp(0.0, 1.0)
        };
        let mix = |a: u8, b: u8| lerp(a as f64, b as f64, t).round() as u8;
        Color::rgba8(
            mix(self.start.r, self.end.r),
            mix(self.start.g, self.end.g),
            mix(self.start.b, self.end.b),
            mix(self.start.a, self.end.a),
        )
    }
}

/// A 2-D immediate-mode drawing context
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Makes a rectangle fully transparent, ignoring the composite rule
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    /// Sets the rule used by every later paint
    fn set_composite(&mut self, op: CompositeOp);
    /// Fills the whole surface with a gradient
    fn fill_gradient(&mut self, gradient: &LinearGradient);
    /// Draws `sprite` scaled into the rectangle at `(x, y)`
    fn draw_image(&mut self, sprite: &Sprite, x: f64, y: f64, width: f64, height: f64);
    fn stroke_line(&mut self, from: [f64; 2], to: [f64; 2], color: Color);
    /// Strokes the arc from `start` to `start + sweep` radians
    fn stroke_arc(&mut self, center: [f64; 2], radius: f64, start: f64, sweep: f64, color: Color);
    /// Draws text with its baseline at `at[1]`, anchored horizontally per `align`
    fn fill_text(&mut self, text: &str, at: [f64; 2], align: TextAlign, color: Color);
}

/// Text placed on the canvas; glyphs are rasterized by the presenter
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub at: [f64; 2],
    pub align: TextAlign,
    pub color: Color,
    /// Drawn with a rule that only shows through transparent pixels
    pub behind: bool,
}

/// Nominal glyph height above the baseline
const TEXT_SIZE: f64 = 14.0;
/// Nominal horizontal advance per glyph
const GLYPH_ADVANCE: f64 = TEXT_SIZE * 0.6;

impl TextRun {
    /// Area covered by the glyphs as `[left, top, right, bottom]`
    pub fn bounds(&self) -> [f64; 4] {
        let width = self.text.chars().count() as f64 * GLYPH_ADVANCE;
        let [x, y] = self.at;
        let left = match self.align {
            TextAlign::Left => x,
            TextAlign::Center => x - width / 2.0,
            TextAlign::Right => x - width,
        };
        [left, y - TEXT_SIZE, left + width, y]
    }
}

/// Software surface backed by an RGBA pixel buffer
pub struct Canvas {
    width: u32,
    height: u32,
    pixel_data: Vec<u8>,
    texts: Vec<TextRun>,
    composite: CompositeOp,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Canvas {
            width,
            height,
            pixel_data: vec![0u8; width as usize * height as usize * 4],
            texts: Vec::new(),
            composite: CompositeOp::default(),
        }
    }

    pub fn composite(&self) -> CompositeOp {
        self.composite
    }

    pub fn texts(&self) -> &[TextRun] {
        &self.texts
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        if x >= self.width || y >= self.height {
            return Color::TRANSPARENT;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        Color::rgba8(
            self.pixel_data[offset],
            self.pixel_data[offset + 1],
            self.pixel_data[offset + 2],
            self.pixel_data[offset + 3],
        )
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let (r, g, b, a) = color.as_rgba8();
        self.pixel_data[offset] = r;
        self.pixel_data[offset + 1] = g;
        self.pixel_data[offset + 2] = b;
        self.pixel_data[offset + 3] = a;
    }

    /// Blends one pixel with the current rule, skipping out-of-bounds points
    fn plot(&mut self, x: isize, y: isize, color: Color) {
        if x < 0 || y < 0 || x >= self.width as isize || y >= self.height as isize {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        let blended = self.composite.blend(color, self.pixel(x, y));
        self.set_pixel(x, y, blended);
    }

    /// Draws a line using Bresenham's algorithm
    fn draw_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Color) {
        if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
            return;
        }
        let (mut x0, mut y0, x1, y1) = (
            x0.round() as isize,
            y0.round() as isize,
            x1.round() as isize,
            y1.round() as isize,
        );
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy; // error value e_xy

        loop {
            self.plot(x0, y0, color);

            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }
}

impl Surface for Canvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let left = x.max(0.0).floor() as u32;
        let top = y.max(0.0).floor() as u32;
        let right = (x + width).min(self.width as f64).ceil().max(0.0) as u32;
        let bottom = (y + height).min(self.height as f64).ceil().max(0.0) as u32;
        for py in top..bottom {
            for px in left..right {
                self.set_pixel(px, py, Color::TRANSPARENT);
            }
        }
        let whole_surface = x <= 0.0
            && y <= 0.0
            && x + width >= self.width as f64
            && y + height >= self.height as f64;
        if whole_surface {
            self.texts.clear();
            return;
        }
        self.texts.retain(|run| {
            let [left, top, right, bottom] = run.bounds();
            right < x || left > x + width || bottom < y || top > y + height
        });
    }

    fn set_composite(&mut self, op: CompositeOp) {
        self.composite = op;
    }

    fn fill_gradient(&mut self, gradient: &LinearGradient) {
        let row: Vec<Color> = (0..self.width)
            .map(|px| gradient.color_at(px as f64 + 0.5))
            .collect();
        for py in 0..self.height {
            for (px, &color) in row.iter().enumerate() {
                let blended = self.composite.blend(color, self.pixel(px as u32, py));
                self.set_pixel(px as u32, py, blended);
            }
        }
    }

    fn draw_image(&mut self, sprite: &Sprite, x: f64, y: f64, width: f64, height: f64) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let scale_x = sprite.width() as f64 / width;
        let scale_y = sprite.height() as f64 / height;
        let unbounded = self.composite.is_unbounded();

        for py in 0..self.height {
            let v = (py as f64 + 0.5 - y) * scale_y;
            let row_inside = v >= 0.0 && v < sprite.height() as f64;
            if !row_inside && !unbounded {
                continue;
            }
            for px in 0..self.width {
                let u = (px as f64 + 0.5 - x) * scale_x;
                let inside = row_inside && u >= 0.0 && u < sprite.width() as f64;
                let source = if inside {
                    sprite.pixel(u as u32, v as u32)
                } else if unbounded {
                    Color::TRANSPARENT
                } else {
                    continue;
                };
                let blended = self.composite.blend(source, self.pixel(px, py));
                self.set_pixel(px, py, blended);
            }
        }
    }

    fn stroke_line(&mut self, from: [f64; 2], to: [f64; 2], color: Color) {
        self.draw_line(from[0], from[1], to[0], to[1], color);
    }

    fn stroke_arc(&mut self, center: [f64; 2], radius: f64, start: f64, sweep: f64, color: Color) {
        if radius <= 0.0 || !sweep.is_finite() || !start.is_finite() {
            return;
        }
        let segments = ((sweep.abs() * radius).ceil() as usize).max(8);
        let point = |i: usize| {
            let angle = start + sweep * i as f64 / segments as f64;
            [
                center[0] + radius * angle.cos(),
                center[1] + radius * angle.sin(),
            ]
        };
        let mut previous = point(0);
        for i in 1..=segments {
            let next = point(i);
            self.draw_line(previous[0], previous[1], next[0], next[1], color);
            previous = next;
        }
    }

    fn fill_text(&mut self, text: &str, at: [f64; 2], align: TextAlign, color: Color) {
        self.texts.push(TextRun {
            text: text.to_string(),
            at,
            align,
            color,
            behind: self.composite == CompositeOp::DestinationOver,
        });
    }
}

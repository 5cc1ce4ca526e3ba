use crate::graphics::{Color, CompositeOp, LinearGradient, Surface};
use crate::sprite::Sprite;
use crate::state::SpriteState;

/// Hues of the two gradient stops at wall-clock time `now_ms`
pub fn gradient_hues(now_ms: f64) -> (f64, f64) {
    let swing = (now_ms * 0.001).sin() * 60.0;
    (swing + 270.0, swing + 150.0)
}

/// Fills the surface with the color-cycling horizontal gradient
pub fn paint_background<S: Surface + ?Sized>(surface: &mut S, now_ms: f64) {
    let (start, end) = gradient_hues(now_ms);
    let gradient = LinearGradient {
        x0: 0.0,
        x1: surface.width() as f64,
        start: Color::hsl(start, 1.0, 0.5),
        end: Color::hsl(end, 1.0, 0.5),
    };
    surface.fill_gradient(&gradient);
}

/// Cuts the sprite's shape out of the background, then leaves the surface
/// drawing behind existing content for the rest of the frame
pub fn paint_sprite<S: Surface + ?Sized>(surface: &mut S, state: &SpriteState, sprite: &Sprite) {
    surface.set_composite(CompositeOp::DestinationAtop);
    surface.draw_image(sprite, state.x, state.y, state.sprite_width, state.sprite_height);
    surface.set_composite(CompositeOp::DestinationOver);
}

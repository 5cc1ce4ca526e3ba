use crate::graphics::{Color, Surface, TextAlign};
use crate::math::{angle_between, clamp_upper_wins, normalize_angle, project_along};
use crate::state::SpriteState;

/// Length of the facing-direction ray
pub const RAY_LENGTH: f64 = 300.0;
/// Radius of the arc drawn at the surface center
pub const ARC_RADIUS: f64 = 20.0;
const TEXT_BLOCK_WIDTH: f64 = 120.0;
const TEXT_BLOCK_HEIGHT: f64 = 80.0;
const LINE_SPACING: f64 = 20.0;
const EDGE_PADDING: f64 = 10.0;

/// Key bindings listed at the bottom of every frame
pub const LEGEND: [&str; 2] = ["E: toggle debug", "S: switch logo"];

/// Everything the overlay draws, derived from one state snapshot
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayGeometry {
    pub surface_center: [f64; 2],
    pub sprite_center: [f64; 2],
    pub ray_end: [f64; 2],
    /// Angle of the center line, seen from the surface center
    pub arc_start: f64,
    /// Signed sweep from the center line to the ray end, in `(-PI, PI]`
    pub arc_sweep: f64,
    /// Top-left anchor of the coordinate text block
    pub text_origin: [f64; 2],
}

impl OverlayGeometry {
    pub fn compute(state: &SpriteState) -> Self {
        let surface_center = state.surface_center();
        let sprite_center = state.sprite_center();
        let ray_end = project_along(sprite_center, state.vx, state.vy, RAY_LENGTH);

        let arc_start = angle_between(surface_center, sprite_center);
        let arc_end = angle_between(surface_center, ray_end);
        let arc_sweep = normalize_angle(arc_end - arc_start);

        let text_origin = [
            clamp_upper_wins(
                sprite_center[0] - 25.0,
                0.0,
                state.surface_width as f64 - TEXT_BLOCK_WIDTH,
            ),
            clamp_upper_wins(
                sprite_center[1] + state.sprite_height / 2.0 + 20.0,
                0.0,
                state.surface_height as f64 - TEXT_BLOCK_HEIGHT,
            ),
        ];

        OverlayGeometry {
            surface_center,
            sprite_center,
            ray_end,
            arc_start,
            arc_sweep,
            text_origin,
        }
    }

    /// Length of the arc between the two directions
    pub fn arc_length(&self) -> f64 {
        ARC_RADIUS * self.arc_sweep.abs()
    }
}

/// The position/velocity lines of the text block
pub fn state_lines(state: &SpriteState) -> [String; 4] {
    [
        format!("x: {:.2}", state.x),
        format!("y: {:.2}", state.y),
        format!("vx: {:.2}", state.vx),
        format!("vy: {:.2}", state.vy),
    ]
}

/// Draws the debug geometry and readouts for `state`
pub fn paint_overlay<S: Surface + ?Sized>(surface: &mut S, state: &SpriteState, fps: Option<f64>) {
    let geometry = OverlayGeometry::compute(state);

    // Center line
    surface.stroke_line(geometry.surface_center, geometry.sprite_center, Color::RED);

    // Facing direction
    surface.stroke_line(geometry.sprite_center, geometry.ray_end, Color::GREEN);

    surface.stroke_arc(
        geometry.surface_center,
        ARC_RADIUS,
        geometry.arc_start,
        geometry.arc_sweep,
        Color::BLUE,
    );
    surface.fill_text(
        &format!("{:.2}", geometry.arc_length()),
        [
            geometry.surface_center[0],
            geometry.surface_center[1] - ARC_RADIUS - 5.0,
        ],
        TextAlign::Center,
        Color::BLUE,
    );

    let [text_x, text_y] = geometry.text_origin;
    for (i, line) in state_lines(state).iter().enumerate() {
        surface.fill_text(
            line,
            [text_x, text_y + LINE_SPACING * i as f64],
            TextAlign::Left,
            Color::WHITE,
        );
    }

    if let Some(fps) = fps {
        surface.fill_text(
            &format!("{} fps", fps.round()),
            [surface.width() as f64 - EDGE_PADDING, LINE_SPACING],
            TextAlign::Right,
            Color::WHITE,
        );
    }
}

/// Draws the key binding legend in the bottom-left corner
pub fn paint_legend<S: Surface + ?Sized>(surface: &mut S) {
    let bottom = surface.height() as f64 - EDGE_PADDING;
    for (i, line) in LEGEND.iter().rev().enumerate() {
        surface.fill_text(
            line,
            [EDGE_PADDING, bottom - LINE_SPACING * i as f64],
            TextAlign::Left,
            Color::WHITE,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::{Canvas, CompositeOp};
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn state_at(x: f64, y: f64, vx: f64, vy: f64) -> SpriteState {
        SpriteState {
            x,
            y,
            vx,
            vy,
            debug: true,
            surface_width: 800,
            surface_height: 600,
            sprite_width: 100.0,
            sprite_height: 100.0,
            selected: 0,
        }
    }

    #[test]
    fn facing_ray_points_along_velocity() {
        let geometry = OverlayGeometry::compute(&state_at(100.0, 200.0, 1.0, 0.0));
        assert_eq!(geometry.sprite_center, [150.0, 250.0]);
        assert_relative_eq!(geometry.ray_end[0], 450.0);
        assert_relative_eq!(geometry.ray_end[1], 250.0);
    }

    #[test]
    fn arc_sweeps_from_center_line_to_ray_end() {
        // Sprite straight above the center, heading right
        let geometry = OverlayGeometry::compute(&state_at(350.0, 0.0, 1.0, 0.0));
        assert_relative_eq!(geometry.arc_start, -FRAC_PI_2);
        // Ray end (700, 50) relative to center (400, 300)
        let expected = (-250.0f64).atan2(300.0) + FRAC_PI_2;
        assert_relative_eq!(geometry.arc_sweep, expected, epsilon = 1e-12);
        assert_relative_eq!(geometry.arc_length(), 20.0 * expected.abs(), epsilon = 1e-12);
    }

    #[test]
    fn text_block_is_clamped_to_surface() {
        let near_origin = OverlayGeometry::compute(&state_at(-40.0, -300.0, 1.0, 1.0));
        assert_eq!(near_origin.text_origin, [0.0, 0.0]);

        let far_corner = OverlayGeometry::compute(&state_at(790.0, 590.0, 1.0, 1.0));
        assert_eq!(far_corner.text_origin, [680.0, 520.0]);

        let inside = OverlayGeometry::compute(&state_at(100.0, 100.0, 1.0, 1.0));
        assert_eq!(inside.text_origin, [125.0, 220.0]);
    }

    #[test]
    fn state_lines_use_two_decimals() {
        let lines = state_lines(&state_at(1.0, 2.346, -1.2, 1.2));
        assert_eq!(lines, ["x: 1.00", "y: 2.35", "vx: -1.20", "vy: 1.20"].map(String::from));
    }

    #[test]
    fn overlay_draws_lines_text_and_fps() {
        let mut canvas = Canvas::new(800, 600);
        let state = state_at(100.0, 100.0, 1.0, 1.0);
        paint_overlay(&mut canvas, &state, Some(59.6));

        // Surface center sits on the red line
        assert_eq!(canvas.pixel(400, 300), Color::RED);
        // Diagonal facing ray out of the sprite center
        assert_eq!(canvas.pixel(170, 170), Color::GREEN);

        let texts: Vec<&str> = canvas.texts().iter().map(|t| t.text.as_str()).collect();
        assert!(texts.contains(&"x: 100.00"));
        assert!(texts.contains(&"vy: 1.00"));
        assert!(texts.contains(&"60 fps"));

        let fps = canvas.texts().iter().find(|t| t.text == "60 fps").unwrap();
        assert_eq!(fps.align, TextAlign::Right);
        assert_eq!(fps.at[0], 790.0);
    }

    #[test]
    fn missing_fps_reading_is_not_drawn() {
        let mut canvas = Canvas::new(800, 600);
        paint_overlay(&mut canvas, &state_at(0.0, 0.0, 1.0, 1.0), None);
        assert!(canvas.texts().iter().all(|t| !t.text.ends_with("fps")));
    }

    #[test]
    fn legend_lines_stack_upwards_from_the_bottom() {
        let mut canvas = Canvas::new(200, 100);
        canvas.set_composite(CompositeOp::DestinationOver);
        paint_legend(&mut canvas);

        let texts = canvas.texts();
        assert_eq!(texts.len(), 2);
        assert_eq!(texts[0].text, LEGEND[1]);
        assert_eq!(texts[0].at, [10.0, 90.0]);
        assert_eq!(texts[1].text, LEGEND[0]);
        assert_eq!(texts[1].at, [10.0, 70.0]);
        assert!(texts.iter().all(|t| t.behind));
    }
}

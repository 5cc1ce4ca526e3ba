use std::f64::consts::PI;

/// Converts an HSL color to 8-bit RGB.
///
/// `hue` is in degrees and may lie outside `[0, 360)`; saturation and
/// lightness are fractions in `[0, 1]`.
pub fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> [u8; 3] {
    let hue = hue.rem_euclid(360.0) / 60.0;
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let second = chroma * (1.0 - (hue % 2.0 - 1.0).abs());
    let (r, g, b) = match hue as u32 {
        0 => (chroma, second, 0.0),
        1 => (second, chroma, 0.0),
        2 => (0.0, chroma, second),
        3 => (0.0, second, chroma),
        4 => (second, 0.0, chroma),
        _ => (chroma, 0.0, second),
    };
    let m = lightness - chroma / 2.0;
    [
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    ]
}

/// Linear interpolation between `a` and `b`
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Point reached by walking `length` units from `origin` along the
/// direction of the velocity vector
pub fn project_along(origin: [f64; 2], vx: f64, vy: f64, length: f64) -> [f64; 2] {
    let angle = vy.atan2(vx);
    [
        origin[0] + length * angle.cos(),
        origin[1] + length * angle.sin(),
    ]
}

/// Angle of the vector from `from` to `to`, as returned by `atan2`
pub fn angle_between(from: [f64; 2], to: [f64; 2]) -> f64 {
    (to[1] - from[1]).atan2(to[0] - from[0])
}

/// Wraps an angle into `(-PI, PI]`
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI {
        wrapped + 2.0 * PI
    } else {
        wrapped
    }
}

/// Clamps `value` to `[min, max]`, letting the upper bound win when the
/// range is empty.
pub fn clamp_upper_wins(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

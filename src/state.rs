use rand::Rng;

/// Divisor applied to a sprite's source size before it is drawn
pub const SPRITE_SCALE: f64 = 1.5;

/// Position, velocity and display flags of the bouncing sprite
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteState {
    /// Top-left corner in surface coordinates
    pub x: f64,
    pub y: f64,
    /// Displacement per frame
    pub vx: f64,
    pub vy: f64,
    /// Draw the debug overlay
    pub debug: bool,
    pub surface_width: u32,
    pub surface_height: u32,
    /// Drawn size of the selected sprite
    pub sprite_width: f64,
    pub sprite_height: f64,
    /// Index of the sprite being drawn
    pub selected: usize,
}

impl SpriteState {
    /// Places a sprite of the given source size somewhere in the top-left
    /// quarter of the surface, moving down and to the right at `speed`
    pub fn new<R: Rng + ?Sized>(
        surface: (u32, u32),
        sprite: (u32, u32),
        speed: f64,
        rng: &mut R,
    ) -> Self {
        let (surface_width, surface_height) = surface;
        SpriteState {
            x: rng.gen::<f64>() * surface_width as f64 / 2.0,
            y: rng.gen::<f64>() * surface_height as f64 / 2.0,
            vx: speed,
            vy: speed,
            debug: false,
            surface_width,
            surface_height,
            sprite_width: sprite.0 as f64 / SPRITE_SCALE,
            sprite_height: sprite.1 as f64 / SPRITE_SCALE,
            selected: 0,
        }
    }

    /// Moves by one frame of velocity, then turns any axis whose wall was
    /// crossed back towards the surface. The sprite may end up one frame
    /// past a wall.
    pub fn advance(&mut self) {
        self.x += self.vx;
        self.y += self.vy;
        self.vx = reflect(self.x, self.vx, self.sprite_width, self.surface_width);
        self.vy = reflect(self.y, self.vy, self.sprite_height, self.surface_height);
    }

    pub fn toggle_debug(&mut self) {
        self.debug = !self.debug;
    }

    /// Records new surface dimensions without moving the sprite
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface_width = width;
        self.surface_height = height;
    }

    /// Switches to another sprite, keeping position and velocity
    pub fn select(&mut self, index: usize, sprite: (u32, u32)) {
        self.selected = index;
        self.sprite_width = sprite.0 as f64 / SPRITE_SCALE;
        self.sprite_height = sprite.1 as f64 / SPRITE_SCALE;
    }

    /// Center of the drawn sprite
    pub fn sprite_center(&self) -> [f64; 2] {
        [
            self.x + self.sprite_width / 2.0,
            self.y + self.sprite_height / 2.0,
        ]
    }

    /// Center of the surface
    pub fn surface_center(&self) -> [f64; 2] {
        [
            self.surface_width as f64 / 2.0,
            self.surface_height as f64 / 2.0,
        ]
    }
}

/// Velocity along one axis after checking both walls. A sprite past a wall
/// always heads back inside, so one that overshoots by more than a frame
/// does not flip back and forth.
fn reflect(position: f64, velocity: f64, extent: f64, limit: u32) -> f64 {
    if position < 0.0 {
        velocity.abs()
    } else if position + extent > limit as f64 {
        -velocity.abs()
    } else {
        velocity
    }
}

/// Measures the instantaneous frame rate from consecutive frame timestamps
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameClock {
    previous_ms: Option<f64>,
    fps: Option<f64>,
}

impl FrameClock {
    /// Records a frame at `now_ms`
    pub fn tick(&mut self, now_ms: f64) {
        if let Some(previous) = self.previous_ms {
            let delta = now_ms - previous;
            self.fps = (delta > 0.0).then(|| 1000.0 / delta);
        }
        self.previous_ms = Some(now_ms);
    }

    /// Latest reading; `None` before two frames or after a zero-length frame
    pub fn fps(&self) -> Option<f64> {
        self.fps
    }
}

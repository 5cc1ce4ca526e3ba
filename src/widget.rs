use crate::error::Error;
use crate::graphics::{Canvas, Surface};
use crate::launcher;
use crate::overlay::{paint_legend, paint_overlay};
use crate::render::{paint_background, paint_sprite};
use crate::sprite::Sprite;
use crate::state::{FrameClock, SpriteState};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use rand::Rng;

/// Whether the frame loop should keep going after an event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Settings fixed for the lifetime of the widget
#[derive(Clone, Debug, PartialEq)]
pub struct WidgetConfig {
    /// Per-frame speed on both axes
    pub speed: f64,
    /// Page opened by the link key
    pub url: String,
    /// Start with the overlay visible
    pub debug: bool,
}

/// Bouncing logo widget
pub struct BounceWidget {
    state: SpriteState,
    sprites: Vec<Sprite>,
    canvas: Canvas,
    clock: FrameClock,
    url: String,
    open_link: fn(&str) -> Result<(), Error>,
}

impl BounceWidget {
    /// Builds the widget for a surface of `size` pixels. Returns `None` when
    /// there is nothing to draw on or nothing to draw.
    pub fn new<R: Rng + ?Sized>(
        config: &WidgetConfig,
        sprites: Vec<Sprite>,
        size: (u32, u32),
        rng: &mut R,
    ) -> Option<Self> {
        let (width, height) = size;
        if width == 0 || height == 0 {
            log::debug!("surface {}x{} is not drawable yet", width, height);
            return None;
        }
        let first = sprites.first()?;
        let mut state = SpriteState::new(size, (first.width(), first.height()), config.speed, rng);
        state.debug = config.debug;
        log::info!(
            "starting at ({:.2}, {:.2}) on a {}x{} surface",
            state.x,
            state.y,
            width,
            height
        );

        Some(BounceWidget {
            state,
            sprites,
            canvas: Canvas::new(width, height),
            clock: FrameClock::default(),
            url: config.url.clone(),
            open_link: launcher::open_url,
        })
    }

    pub fn state(&self) -> &SpriteState {
        &self.state
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Adopts a new surface size. The canvas is recreated blank; the
    /// sprite keeps its position until it bounces back into view.
    pub fn resize(&mut self, width: u32, height: u32) {
        log::debug!("surface resized to {}x{}", width, height);
        self.state.resize(width, height);
        self.canvas = Canvas::new(width, height);
    }

    pub fn toggle_debug(&mut self) {
        self.state.toggle_debug();
        log::debug!("debug overlay {}", if self.state.debug { "on" } else { "off" });
    }

    /// Moves on to the next sprite, wrapping around
    pub fn cycle_sprite(&mut self) {
        let next = (self.state.selected + 1) % self.sprites.len();
        let sprite = &self.sprites[next];
        self.state.select(next, (sprite.width(), sprite.height()));
    }

    fn launch_link(&self) {
        if let Err(err) = (self.open_link)(&self.url) {
            log::warn!("{}", err);
        }
    }

    /// Handles a key press
    pub fn key(&mut self, key: &KeyEvent) -> Flow {
        if key.kind != KeyEventKind::Press {
            return Flow::Continue;
        }
        if is_quit(key) {
            return Flow::Exit;
        }
        if let KeyCode::Char(c) = key.code {
            match c.to_ascii_lowercase() {
                'e' => self.toggle_debug(),
                's' => self.cycle_sprite(),
                'w' => self.launch_link(),
                _ => {}
            }
        }
        Flow::Continue
    }

    /// Paints the current state, then advances it by one frame
    pub fn frame(&mut self, now_ms: f64) {
        self.clock.tick(now_ms);
        let sprite = &self.sprites[self.state.selected];
        paint_frame(&mut self.canvas, &self.state, sprite, self.clock.fps(), now_ms);
        self.state.advance();
    }
}

/// Whether `key` is one of the quit keys: `q`, `Esc` or `Ctrl-C`
pub fn is_quit(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Esc => true,
        KeyCode::Char('c') | KeyCode::Char('C') => key.modifiers.contains(KeyModifiers::CONTROL),
        KeyCode::Char(c) => c.eq_ignore_ascii_case(&'q'),
        _ => false,
    }
}

/// Paints one frame of `state` onto `surface`
pub fn paint_frame<S: Surface + ?Sized>(
    surface: &mut S,
    state: &SpriteState,
    sprite: &Sprite,
    fps: Option<f64>,
    now_ms: f64,
) {
    let (width, height) = (surface.width() as f64, surface.height() as f64);
    surface.clear_rect(0.0, 0.0, width, height);

    paint_background(surface, now_ms);
    paint_sprite(surface, state, sprite);

    if state.debug {
        paint_overlay(surface, state, fps);
    }

    paint_legend(surface);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::{Color, CompositeOp, LinearGradient, TextAlign};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn config() -> WidgetConfig {
        WidgetConfig {
            speed: 1.2,
            url: "https://example.com".to_string(),
            debug: false,
        }
    }

    fn sprites() -> Vec<Sprite> {
        vec![
            Sprite::from_rgba(30, 15, vec![255; 30 * 15 * 4]).unwrap(),
            Sprite::from_rgba(60, 60, vec![255; 60 * 60 * 4]).unwrap(),
        ]
    }

    fn widget() -> BounceWidget {
        let mut rng = StdRng::seed_from_u64(9);
        BounceWidget::new(&config(), sprites(), (400, 300), &mut rng).unwrap()
    }

    fn press(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[derive(Debug, PartialEq)]
    enum Call {
        Clear,
        Composite(CompositeOp),
        Gradient,
        Image,
        Line(Color),
        Arc,
        Text(String),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl Surface for Recorder {
        fn width(&self) -> u32 {
            400
        }
        fn height(&self) -> u32 {
            300
        }
        fn clear_rect(&mut self, _x: f64, _y: f64, _width: f64, _height: f64) {
            self.calls.push(Call::Clear);
        }
        fn set_composite(&mut self, op: CompositeOp) {
            self.calls.push(Call::Composite(op));
        }
        fn fill_gradient(&mut self, _gradient: &LinearGradient) {
            self.calls.push(Call::Gradient);
        }
        fn draw_image(&mut self, _sprite: &Sprite, _x: f64, _y: f64, _w: f64, _h: f64) {
            self.calls.push(Call::Image);
        }
        fn stroke_line(&mut self, _from: [f64; 2], _to: [f64; 2], color: Color) {
            self.calls.push(Call::Line(color));
        }
        fn stroke_arc(&mut self, _c: [f64; 2], _r: f64, _start: f64, _sweep: f64, _color: Color) {
            self.calls.push(Call::Arc);
        }
        fn fill_text(&mut self, text: &str, _at: [f64; 2], _align: TextAlign, _color: Color) {
            self.calls.push(Call::Text(text.to_string()));
        }
    }

    #[test]
    fn needs_a_surface_and_a_sprite() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(BounceWidget::new(&config(), sprites(), (0, 300), &mut rng).is_none());
        assert!(BounceWidget::new(&config(), sprites(), (400, 0), &mut rng).is_none());
        assert!(BounceWidget::new(&config(), Vec::new(), (400, 300), &mut rng).is_none());
    }

    #[test]
    fn starts_with_configured_speed_and_debug() {
        let mut rng = StdRng::seed_from_u64(0);
        let config = WidgetConfig {
            debug: true,
            ..config()
        };
        let widget = BounceWidget::new(&config, sprites(), (400, 300), &mut rng).unwrap();
        assert!(widget.state().debug);
        assert_eq!((widget.state().vx, widget.state().vy), (1.2, 1.2));
        assert_eq!(widget.state().sprite_width, 20.0);
    }

    #[test]
    fn debug_key_toggles_overlay() {
        let mut widget = widget();
        assert_eq!(widget.key(&press('e')), Flow::Continue);
        assert!(widget.state().debug);
        widget.key(&press('E'));
        assert!(!widget.state().debug);
    }

    #[test]
    fn key_releases_are_ignored() {
        let mut widget = widget();
        let mut release = press('e');
        release.kind = KeyEventKind::Release;
        widget.key(&release);
        assert!(!widget.state().debug);
    }

    #[test]
    fn sprite_key_cycles_without_moving() {
        let mut widget = widget();
        let before = widget.state().clone();

        widget.key(&press('s'));
        assert_eq!(widget.state().selected, 1);
        assert_eq!(widget.state().sprite_width, 40.0);
        assert_eq!(
            (widget.state().x, widget.state().y, widget.state().vx, widget.state().vy),
            (before.x, before.y, before.vx, before.vy)
        );

        widget.key(&press('s'));
        assert_eq!(widget.state().selected, 0);
    }

    static OPENED: AtomicUsize = AtomicUsize::new(0);

    fn record_open(url: &str) -> Result<(), Error> {
        assert_eq!(url, "https://example.com");
        OPENED.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    #[test]
    fn link_key_opens_url_and_leaves_state_alone() {
        let mut widget = widget();
        widget.open_link = record_open;
        let before = widget.state().clone();

        assert_eq!(widget.key(&press('w')), Flow::Continue);
        assert_eq!(OPENED.load(Ordering::SeqCst), 1);
        assert_eq!(widget.state(), &before);
    }

    #[test]
    fn failed_link_is_not_fatal() {
        let mut widget = widget();
        widget.open_link = |url| {
            Err(Error::Launch {
                url: url.to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        };
        assert_eq!(widget.key(&press('w')), Flow::Continue);
    }

    #[test]
    fn quit_keys_exit() {
        let mut widget = widget();
        assert_eq!(widget.key(&press('q')), Flow::Exit);
        assert_eq!(
            widget.key(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)),
            Flow::Exit
        );
        assert_eq!(
            widget.key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Flow::Exit
        );
    }

    #[test]
    fn quit_matching_covers_case_and_control() {
        assert!(is_quit(&press('Q')));
        assert!(is_quit(&KeyEvent::new(KeyCode::Char('C'), KeyModifiers::CONTROL)));
        assert!(!is_quit(&press('c')));
        assert!(!is_quit(&press('e')));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut widget = widget();
        let before = widget.state().clone();
        assert_eq!(widget.key(&press('x')), Flow::Continue);
        assert_eq!(widget.key(&KeyEvent::new(KeyCode::F(5), KeyModifiers::NONE)), Flow::Continue);
        assert_eq!(widget.state(), &before);
    }

    #[test]
    fn resize_recreates_canvas_only() {
        let mut widget = widget();
        let before = widget.state().clone();
        widget.resize(100, 50);
        assert_eq!((widget.canvas().width(), widget.canvas().height()), (100, 50));
        assert_eq!((widget.state().surface_width, widget.state().surface_height), (100, 50));
        assert_eq!((widget.state().x, widget.state().y), (before.x, before.y));
    }

    #[test]
    fn frame_paints_then_advances() {
        let mut widget = widget();
        let before = widget.state().clone();
        widget.frame(0.0);
        assert_eq!(widget.state().x, before.x + 1.2);
        assert_eq!(widget.state().y, before.y + 1.2);
        assert_eq!(widget.canvas().composite(), CompositeOp::DestinationOver);
        assert_eq!(widget.canvas().texts().len(), 2);
    }

    #[test]
    fn text_does_not_pile_up_on_tiny_surfaces() {
        let mut rng = StdRng::seed_from_u64(5);
        let config = WidgetConfig {
            debug: true,
            ..config()
        };
        let mut widget = BounceWidget::new(&config, sprites(), (96, 48), &mut rng).unwrap();
        for i in 0..1000 {
            widget.frame(i as f64 * 16.0);
        }
        // arc label, four state lines, fps and two legend lines
        assert!(widget.canvas().texts().len() <= 8, "{}", widget.canvas().texts().len());
    }

    #[test]
    fn frames_survive_a_zero_sized_resize() {
        let mut widget = widget();
        widget.resize(0, 0);
        widget.frame(0.0);
        widget.frame(16.0);
        assert!(widget.state().x.is_finite());
    }

    #[test]
    fn paint_order_without_debug() {
        let mut recorder = Recorder::default();
        let widget = widget();
        paint_frame(&mut recorder, widget.state(), &widget.sprites[0], None, 0.0);
        assert_eq!(
            recorder.calls,
            vec![
                Call::Clear,
                Call::Gradient,
                Call::Composite(CompositeOp::DestinationAtop),
                Call::Image,
                Call::Composite(CompositeOp::DestinationOver),
                Call::Text("S: switch logo".to_string()),
                Call::Text("E: toggle debug".to_string()),
            ]
        );
    }

    #[test]
    fn paint_order_with_debug() {
        let mut recorder = Recorder::default();
        let mut widget = widget();
        widget.toggle_debug();
        paint_frame(&mut recorder, widget.state(), &widget.sprites[0], Some(60.0), 0.0);

        let overlay = &recorder.calls[5..];
        assert_eq!(overlay[0], Call::Line(Color::RED));
        assert_eq!(overlay[1], Call::Line(Color::GREEN));
        assert_eq!(overlay[2], Call::Arc);
        assert_eq!(overlay[8], Call::Text("60 fps".to_string()));
        assert_eq!(overlay.len(), 11);
    }

    #[test]
    fn frame_rate_is_tracked_while_hidden() {
        let mut widget = widget();
        widget.frame(1000.0);
        widget.frame(1020.0);
        assert!(!widget.state().debug);
        assert_eq!(widget.clock.fps(), Some(50.0));
    }
}

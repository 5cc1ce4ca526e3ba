mod error;
mod graphics;
mod launcher;
mod math;
mod overlay;
mod render;
mod sprite;
mod state;
mod terminal;
mod widget;

use clap::Parser;
use crossterm::event::{self, Event, MouseButton, MouseEventKind};
use error::Error;
use graphics::Color;
use rand::Rng;
use sprite::Sprite;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use terminal::{Layout, Presenter, TerminalGuard};
use widget::{is_quit, BounceWidget, Flow, WidgetConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(version, about = "A bouncing logo for your terminal")]
struct Args {
    /// Image files to bounce; built-in logos are used when none are given
    sprites: Vec<PathBuf>,

    /// Distance travelled per frame on each axis
    #[arg(long, default_value_t = 1.2, value_parser = parse_speed)]
    speed: f64,

    /// Target frames per second
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=240))]
    fps: u32,

    /// Logical pixels per terminal cell horizontally (0 = detect)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=terminal::MAX_CELL_SIZE as i64))]
    cell_width: u32,

    /// Logical pixels per terminal cell vertically (0 = detect)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=terminal::MAX_CELL_SIZE as i64))]
    cell_height: u32,

    /// Page opened with the W key
    #[arg(long, default_value = "https://github.com")]
    url: String,

    /// Start with the debug overlay visible
    #[arg(short, long)]
    debug: bool,

    /// Seed for the starting position
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file (RUST_LOG filters, default info)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Color behind transparent parts of the frame, as rrggbb
    #[arg(long, default_value = "111111")]
    background: String,
}

impl Args {
    fn widget_config(&self) -> WidgetConfig {
        WidgetConfig {
            speed: self.speed,
            url: self.url.clone(),
            debug: self.debug,
        }
    }
}

/// Accepts finite, strictly positive speeds
fn parse_speed(value: &str) -> Result<f64, String> {
    let speed: f64 = value.parse().map_err(|err| format!("{}", err))?;
    if speed.is_finite() && speed > 0.0 {
        Ok(speed)
    } else {
        Err(format!("speed must be a positive number, got {}", value))
    }
}

/// Routes log output to `path`; without one, logging stays disabled
fn init_logging(path: Option<&PathBuf>) -> Result<(), Error> {
    if let Some(path) = path {
        let file = File::create(path)?;
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();
    }
    Ok(())
}

fn load_sprites(paths: &[PathBuf]) -> Result<Vec<Sprite>, Error> {
    if paths.is_empty() {
        return Ok(Sprite::builtin());
    }
    paths.iter().map(|path| Sprite::load(path)).collect()
}

/// Milliseconds since the Unix epoch
fn now_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64() * 1000.0)
        .unwrap_or_default()
}

fn make_rng(seed: Option<u64>) -> rand::rngs::StdRng {
    use rand::SeedableRng;
    match seed {
        Some(seed) => rand::rngs::StdRng::seed_from_u64(seed),
        None => rand::rngs::StdRng::from_entropy(),
    }
}

/// Applies a new surface size, building the widget if it could not start
/// before
fn on_resize<R: Rng + ?Sized>(
    widget: &mut Option<BounceWidget>,
    size: (u32, u32),
    config: &WidgetConfig,
    sprites: &[Sprite],
    rng: &mut R,
) {
    if let Some(widget) = widget.as_mut() {
        widget.resize(size.0, size.1);
        return;
    }
    *widget = BounceWidget::new(config, sprites.to_vec(), size, rng);
    if widget.is_some() {
        log::info!("terminal became drawable at {}x{}", size.0, size.1);
    }
}

/// Runs the frame loop until a quit key is pressed
fn run(args: Args) -> Result<(), Error> {
    let page =
        Color::from_hex(&args.background).ok_or_else(|| Error::InvalidColor(args.background.clone()))?;
    let sprites = load_sprites(&args.sprites)?;
    let config = args.widget_config();
    let mut rng = make_rng(args.seed);

    let (columns, rows) = terminal::grid_size()?;
    let (cell_width, cell_height) = terminal::cell_size((args.cell_width, args.cell_height));
    let mut presenter = Presenter::new(
        Layout {
            columns,
            rows,
            cell_width,
            cell_height,
        },
        page,
    );
    log::info!(
        "{}x{} cells at {}x{} pixels per cell",
        columns,
        rows,
        cell_width,
        cell_height
    );

    let _guard = TerminalGuard::acquire()?;
    let mut out = BufWriter::new(io::stdout());
    let mut widget =
        BounceWidget::new(&config, sprites.clone(), presenter.layout().surface_size(), &mut rng);
    if widget.is_none() {
        log::warn!("terminal has no drawable area yet, waiting for a resize");
    }

    let frame_interval = Duration::from_secs_f64(1.0 / args.fps as f64);
    let mut next_frame = Instant::now();

    loop {
        let timeout = next_frame.saturating_duration_since(Instant::now());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    let flow = match widget.as_mut() {
                        Some(widget) => widget.key(&key),
                        None if is_quit(&key) => Flow::Exit,
                        None => Flow::Continue,
                    };
                    if flow == Flow::Exit {
                        break;
                    }
                }
                Event::Resize(columns, rows) => {
                    let layout = Layout {
                        columns,
                        rows,
                        ..presenter.layout()
                    };
                    presenter.set_layout(layout);
                    on_resize(&mut widget, layout.surface_size(), &config, &sprites, &mut rng);
                }
                Event::Mouse(mouse) => {
                    if mouse.kind == MouseEventKind::Down(MouseButton::Left)
                        && presenter.layout().hits_badge(mouse.column, mouse.row)
                    {
                        if let Some(widget) = widget.as_mut() {
                            widget.toggle_debug();
                        }
                    }
                }
                _ => {}
            }
            continue;
        }

        if let Some(widget) = widget.as_mut() {
            widget.frame(now_ms());
            presenter.present(widget.canvas(), &mut out)?;
        }

        next_frame += frame_interval;
        let now = Instant::now();
        if next_frame < now {
            next_frame = now + frame_interval;
        }
    }

    if let Some(widget) = widget.as_ref() {
        let state = widget.state();
        log::info!("exiting at ({:.2}, {:.2})", state.x, state.y);
    }
    Ok(())
}

/// Main function
pub fn main() -> Result<(), Error> {
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;
    log::info!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let result = run(args);
    if let Err(err) = &result {
        log::error!("{}", err);
    }
    result
}

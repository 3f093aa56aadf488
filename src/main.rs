// Copyright (c) 2026 rezky_nightky

mod canvas;
mod cell;
mod config;
mod error;
mod field;
mod frame;
mod logging;
mod palette;
mod pointer;
mod runtime;
mod scene;
mod surface;
mod terminal;
mod vocab;

use std::env;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind, MouseEventKind};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::config::{
    color_enabled_stdout, default_params_usage_for_help, print_help_detail, require_f64_range,
    Args,
};
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::runtime::ColorMode;
use crate::scene::{Intent, Scene};
use crate::surface::CellMetrics;
use crate::terminal::{restore_terminal_best_effort, Terminal};
use crate::vocab::print_list_glyphs;

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

fn build_info() -> String {
    let sha = env!("GLOWDRIFT_GIT_SHA");
    if sha.is_empty() {
        env!("GLOWDRIFT_BUILD").to_string()
    } else {
        format!("{} ({})", env!("GLOWDRIFT_BUILD"), sha)
    }
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term.contains("256color") {
        return ColorMode::Color256;
    }

    ColorMode::Color256
}

fn detect_color_mode(args: &Args) -> Result<ColorMode> {
    match args.colormode {
        None => Ok(detect_color_mode_auto()),
        Some(0) => Ok(ColorMode::Mono),
        Some(16) => Ok(ColorMode::Color16),
        Some(8 | 256) => Ok(ColorMode::Color256),
        Some(24 | 32) => Ok(ColorMode::TrueColor),
        Some(m) => Err(Error::InvalidArgument {
            name: "--colormode",
            value: m.to_string(),
            reason: "allowed: 0,16,8/256,24/32".to_string(),
        }),
    }
}

fn color_mode_label(m: ColorMode) -> &'static str {
    match m {
        ColorMode::TrueColor => "24-bit truecolor",
        ColorMode::Color256 => "8-bit (256-color)",
        ColorMode::Mono => "mono",
        ColorMode::Color16 => "16-color",
    }
}

fn print_bitcolor_check(args: &Args) -> Result<()> {
    let colorterm = env::var("COLORTERM").unwrap_or_default();
    let term = env::var("TERM").unwrap_or_default();
    let auto = detect_color_mode_auto();
    let effective = detect_color_mode(args)?;

    println!("BITCOLOR CHECK:");
    println!(
        "  COLORTERM: {}",
        if colorterm.is_empty() {
            "(unset)"
        } else {
            &colorterm
        }
    );
    println!(
        "  TERM: {}",
        if term.is_empty() { "(unset)" } else { &term }
    );
    println!("  auto_detected: {}", color_mode_label(auto));
    if args.colormode.is_some() {
        println!("  forced: {}", color_mode_label(effective));
    }
    println!("  effective: {}", color_mode_label(effective));
    Ok(())
}

fn install_exit_handlers() {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }
}

fn parse_args() -> Args {
    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }
    cmd.build();

    let matches = cmd.get_matches_from(env::args_os());
    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

#[derive(Default)]
struct PerfStats {
    frames: u64,
    drawn_frames: u64,
    work_sum_s: f64,
    work_max_s: f32,
    pressure: f32,
    pressure_sum: f64,
    pressure_max: f32,
    overshoot_frames: u64,
}

impl PerfStats {
    /// Pressure climbs while frames overrun `period_s` and drains slowly once
    /// they fit again.
    fn record(&mut self, drew: bool, work_s: f32, period_s: f32) {
        let overshoot = ((work_s / period_s) - 1.0).clamp(0.0, 2.0);
        self.pressure = if overshoot > 0.0 {
            (self.pressure + overshoot * 0.25).min(1.0)
        } else {
            (self.pressure - 0.02).max(0.0)
        };
        let pressure = self.pressure;

        self.frames = self.frames.saturating_add(1);
        if drew {
            self.drawn_frames = self.drawn_frames.saturating_add(1);
        }
        self.work_sum_s += work_s as f64;
        self.work_max_s = self.work_max_s.max(work_s);
        self.pressure_sum += pressure as f64;
        self.pressure_max = self.pressure_max.max(pressure);
        if overshoot > 0.0 {
            self.overshoot_frames = self.overshoot_frames.saturating_add(1);
        }
    }

    fn print(&self, elapsed: Duration, target_fps: f64, scene_frames: u64) {
        let elapsed_s = elapsed.as_secs_f64().max(0.000_001);
        let frames = self.frames.max(1) as f64;
        let drawn_ratio = self.drawn_frames as f64 / frames;

        println!("PERF STATS:");
        println!("  elapsed_s: {:.3}", elapsed_s);
        println!("  target_fps: {:.3}", target_fps);
        println!("  avg_fps: {:.3}", self.frames as f64 / elapsed_s);
        println!("  frames: {}", self.frames);
        println!("  simulated_frames: {}", scene_frames);
        println!(
            "  drawn_frames: {} ({:.1}%)",
            self.drawn_frames,
            drawn_ratio * 100.0
        );
        println!("  avg_work_ms: {:.3}", self.work_sum_s / frames * 1000.0);
        println!("  max_work_ms: {:.3}", self.work_max_s as f64 * 1000.0);
        println!(
            "  overshoot_frames: {} ({:.1}%)",
            self.overshoot_frames,
            self.overshoot_frames as f64 / frames * 100.0
        );
        println!("  avg_perf_pressure: {:.3}", self.pressure_sum / frames);
        println!("  max_perf_pressure: {:.3}", self.pressure_max);
    }
}

enum Control {
    Continue,
    Quit,
}

fn handle_event(ev: Event, scene: &mut Scene, screensaver: bool) -> Control {
    match ev {
        Event::Resize(cols, rows) => scene.push(Intent::Resize { cols, rows }),
        Event::Mouse(m) => {
            if matches!(m.kind, MouseEventKind::Moved | MouseEventKind::Drag(_)) {
                scene.push(Intent::PointerMoved {
                    col: m.column,
                    row: m.row,
                    at: Instant::now(),
                });
            }
        }
        Event::FocusLost => scene.push(Intent::PointerLeft),
        Event::Key(k) if k.kind == KeyEventKind::Press => {
            if screensaver {
                return Control::Quit;
            }
            match k.code {
                KeyCode::Esc | KeyCode::Char('q') => return Control::Quit,
                KeyCode::Char('t') => scene.push(Intent::SetTheme(scene.theme().toggled())),
                KeyCode::Char('p') => scene.toggle_pause(),
                KeyCode::Char('n') => scene.set_noise(!scene.noise()),
                KeyCode::Char(' ') => scene.push(Intent::Reset),
                _ => {}
            }
        }
        _ => {}
    }
    Control::Continue
}

fn run() -> Result<()> {
    install_exit_handlers();
    let args = parse_args();

    if args.list_glyphs {
        print_list_glyphs();
        return Ok(());
    }

    if args.help_detail {
        print_help_detail();
        return Ok(());
    }

    if args.check_bitcolor {
        return print_bitcolor_check(&args);
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    logging::init(args.log_file.as_deref())?;

    let color_mode = detect_color_mode(&args)?;
    let target_fps = require_f64_range("--fps", args.fps, 1.0, 240.0)?;
    let end_after = match args.duration {
        Some(s) if !s.is_finite() => {
            return Err(Error::InvalidArgument {
                name: "--duration",
                value: s.to_string(),
                reason: "must be a finite number".to_string(),
            })
        }
        Some(s) if s > 0.0 => Some(Duration::from_secs_f64(require_f64_range(
            "--duration",
            s,
            0.1,
            86400.0,
        )?)),
        _ => None,
    };

    let mut term = Terminal::new()?;
    let (cols, rows) = term.size()?;
    let (px_w, px_h) = term.pixel_size();
    let config = args.scene_config(CellMetrics::from_window(cols, rows, px_w, px_h))?;

    tracing::info!(
        cols,
        rows,
        cell_w = config.metrics.width,
        cell_h = config.metrics.height,
        seed = config.seed,
        theme = args.theme.label(),
        color_mode = color_mode_label(color_mode),
        "starting"
    );

    let mut scene = Scene::new(config, args.theme, cols, rows);
    let mut frame = Frame::new(cols, rows, None);

    let start_time = Instant::now();
    let end_time = end_after.map(|d| start_time + d);

    let target_period = Duration::from_secs_f64(1.0 / target_fps);
    let target_period_s = target_period.as_secs_f32().max(0.000_001);
    let mut next_frame = Instant::now();
    let mut perf = PerfStats::default();
    let mut running = true;

    while running {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                let ev = Terminal::read_event()?;
                if let Control::Quit = handle_event(ev, &mut scene, args.screensaver) {
                    running = false;
                    break;
                }
            }

            if !running {
                break;
            }

            let now = Instant::now();
            if now >= next_frame {
                break;
            }

            let mut timeout = next_frame - now;
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            let _ = Terminal::poll_event(timeout)?;
        }

        if !running {
            break;
        }

        let work_start = Instant::now();
        scene.step(work_start, &mut frame, color_mode);
        let drew = frame.has_changes();
        if drew {
            term.draw(&mut frame)?;
        }
        if args.perf_stats {
            perf.record(drew, work_start.elapsed().as_secs_f32(), target_period_s);
        }

        next_frame += target_period;
        let now = Instant::now();
        if now > next_frame {
            next_frame = now;
        }
    }

    tracing::info!(
        frames = scene.frames(),
        elapsed_s = start_time.elapsed().as_secs_f64(),
        "stopped"
    );

    if args.perf_stats {
        drop(term);
        perf.print(start_time.elapsed(), target_fps, scene.frames());
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perf_pressure_builds_on_overruns_and_drains_after() {
        let mut perf = PerfStats::default();
        perf.record(true, 0.010, 0.020);
        assert_eq!(perf.pressure, 0.0);
        assert_eq!(perf.overshoot_frames, 0);

        // Twice the period is an overshoot of 1.0.
        perf.record(true, 0.040, 0.020);
        assert!((perf.pressure - 0.25).abs() < 1e-6);
        assert_eq!(perf.overshoot_frames, 1);

        for _ in 0..10 {
            perf.record(true, 0.100, 0.020);
        }
        assert_eq!(perf.pressure, 1.0);
        assert_eq!(perf.pressure_max, 1.0);

        perf.record(false, 0.001, 0.020);
        assert!((perf.pressure - 0.98).abs() < 1e-6);
        assert_eq!(perf.frames, 13);
        assert_eq!(perf.drawn_frames, 12);
    }
}

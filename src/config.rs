// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;

use crate::error::{Error, Result};
use crate::runtime::Theme;
use crate::scene::SceneConfig;
use crate::surface::CellMetrics;
use crate::vocab::glyph_set_from_str;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  glowdrift --theme dark --fps 60 --particles 120 --glyphs 80 --icons 15 --glyph-set code";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn colorize_help_detail(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 64);
    for chunk in text.split_inclusive('\n') {
        let (line, nl) = chunk
            .strip_suffix('\n')
            .map(|l| (l, "\n"))
            .unwrap_or((chunk, ""));

        let is_heading =
            !line.starts_with(' ') && line.ends_with(':') && line == line.to_ascii_uppercase();

        if is_heading {
            out.push_str("\x1b[1;36m");
            out.push_str(line);
            out.push_str("\x1b[0m");
        } else if let Some(rest) = line.strip_prefix("  glowdrift") {
            out.push_str("  \x1b[1;34mglowdrift\x1b[0m");
            out.push_str(rest);
        } else if line.starts_with("  -") {
            out.push_str("\x1b[33m");
            out.push_str(line);
            out.push_str("\x1b[0m");
        } else {
            out.push_str(line);
        }
        out.push_str(nl);
    }
    out
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        colorize_help_detail(DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "glowdrift", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 't',
        long = "theme",
        default_value_t = Theme::Dark,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Palette theme (dark, light); press t to toggle"
    )]
    pub theme: Theme,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: 24-bit if supported (COLORTERM), else 8-bit"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "glyph-set",
        default_value = "code",
        help_heading = "APPEARANCE",
        help = "Tokens for the floating code layer (see --list-glyphs)"
    )]
    pub glyph_set: String,

    #[arg(
        long = "no-noise",
        help_heading = "APPEARANCE",
        help = "Disable the per-frame noise speckle"
    )]
    pub no_noise: bool,

    #[arg(
        long = "cell-size",
        help_heading = "APPEARANCE",
        help = "Pixel size of one terminal cell, WxH (default: reported by the terminal, else 8x16)"
    )]
    pub cell_size: Option<String>,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "PERFORMANCE",
        help = "Target FPS (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        long = "particles",
        default_value_t = 120,
        help_heading = "PERFORMANCE",
        help = "Particle pool size (min 0 max 2000)"
    )]
    pub particles: usize,

    #[arg(
        long = "glyphs",
        default_value_t = 80,
        help_heading = "PERFORMANCE",
        help = "Floating code glyph count (min 0 max 1000)"
    )]
    pub glyphs: usize,

    #[arg(
        long = "icons",
        default_value_t = 15,
        help_heading = "PERFORMANCE",
        help = "Rotating icon count (min 0 max 200)"
    )]
    pub icons: usize,

    #[arg(
        long = "perf-stats",
        help_heading = "PERFORMANCE",
        help = "Print performance statistics summary on exit"
    )]
    pub perf_stats: bool,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "seed",
        help_heading = "GENERAL",
        help = "Seed for a reproducible animation (default: random)"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "log-file",
        help_heading = "GENERAL",
        help = "Write diagnostics to this file (filter via GLOWDRIFT_LOG, default info)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "help-detail",
        help_heading = "HELP",
        help = "Show detailed help for all parameters and exit"
    )]
    pub help_detail: bool,

    #[arg(
        long = "list-glyphs",
        help_heading = "HELP",
        help = "List available glyph sets and exit"
    )]
    pub list_glyphs: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

pub fn require_f64_range(name: &'static str, v: f64, min: f64, max: f64) -> Result<f64> {
    if !v.is_finite() {
        return Err(Error::InvalidArgument {
            name,
            value: v.to_string(),
            reason: "must be a finite number".to_string(),
        });
    }
    if v < min || v > max {
        return Err(Error::InvalidArgument {
            name,
            value: v.to_string(),
            reason: format!("min {} max {}", min, max),
        });
    }
    Ok(v)
}

pub fn require_usize_range(name: &'static str, v: usize, min: usize, max: usize) -> Result<usize> {
    if v < min || v > max {
        return Err(Error::InvalidArgument {
            name,
            value: v.to_string(),
            reason: format!("min {} max {}", min, max),
        });
    }
    Ok(v)
}

impl Args {
    /// Validated scene sizing. `reported` is the cell size the terminal
    /// announced, used unless `--cell-size` overrides it.
    pub fn scene_config(&self, reported: Option<CellMetrics>) -> Result<SceneConfig> {
        let metrics = match &self.cell_size {
            Some(raw) => raw
                .parse::<CellMetrics>()
                .map_err(|_| Error::InvalidCellSize(raw.clone()))?,
            None => reported.unwrap_or_default(),
        };
        let glyph_set = glyph_set_from_str(&self.glyph_set).map_err(|reason| {
            Error::InvalidArgument {
                name: "--glyph-set",
                value: self.glyph_set.clone(),
                reason,
            }
        })?;

        Ok(SceneConfig {
            particles: require_usize_range("--particles", self.particles, 0, 2000)?,
            glyphs: require_usize_range("--glyphs", self.glyphs, 0, 1000)?,
            icons: require_usize_range("--icons", self.icons, 0, 200)?,
            glyph_set,
            noise: !self.no_noise,
            metrics,
            seed: self.seed.unwrap_or_else(rand::random),
            ..SceneConfig::default()
        })
    }
}

pub fn print_help_detail() {
    let block = format!(
        "{}\n\nUSAGE:\n  glowdrift [OPTIONS]\n\nAPPEARANCE:\n  -t, --theme <dark|light>\n      Palette theme; the whole scene is rebuilt when it changes.\n      Example: glowdrift --theme light\n\n  --colormode <0|16|8|24>\n      Force color mode; otherwise auto-detected from COLORTERM/TERM.\n      Example: glowdrift --colormode 8\n\n  --glyph-set <name>\n      Tokens for the floating code layer (see --list-glyphs).\n      Example: glowdrift --glyph-set binary\n\n  --no-noise\n      Disable the metallic noise speckle.\n\n  --cell-size <WxH>\n      Pixel size of one cell; scales every distance in the scene.\n      Example: glowdrift --cell-size 10x20\n\nPERFORMANCE:\n  -f, --fps <number>\n      Target FPS (min 1 max 240).\n      Example: glowdrift --fps 30\n\n  --particles <n>, --glyphs <n>, --icons <n>\n      Pool sizes for the particle, code glyph and icon layers.\n      Example: glowdrift --particles 60 --glyphs 40\n\n  --perf-stats\n      Print performance statistics summary on exit.\n      Example: glowdrift --duration 10 --perf-stats\n\nGENERAL:\n  --duration <seconds>\n      Stop after N seconds (min 0.1 max 86400).\n\n  -s, --screensaver\n      Exit on any keypress.\n\n  --seed <n>\n      Reproducible animation.\n\n  --log-file <path>\n      Write diagnostics to a file; GLOWDRIFT_LOG sets the filter.\n      Example: GLOWDRIFT_LOG=debug glowdrift --log-file /tmp/glowdrift.log\n\nKEYS:\n  q, Esc   quit\n  t        toggle dark/light theme\n  p        pause\n  n        toggle noise\n  space    rebuild all layers\n",
        DEFAULT_PARAMS_USAGE
    );

    if color_enabled_stdout() {
        print!("{}", colorize_help_detail(&block));
    } else {
        print!("{}", block);
    }
}

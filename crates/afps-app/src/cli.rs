//! Command-line interface (clap builder API).

use std::path::PathBuf;
use std::str::FromStr;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::LevelFilter;

use afps_core::config::AppConfig;

/// Frames simulated when `--frames` is not given.
pub const DEFAULT_FRAMES: u64 = 600;

pub fn create_clap_command() -> Command {
    Command::new("afps")
        .about("Headless abstract FPS target range with display-lag simulation")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("JSON configuration file. Missing fields take their defaults.")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("frames")
                .short('n')
                .long("frames")
                .value_name("N")
                .help("Number of frames to run")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("display-lag")
                .short('l')
                .long("display-lag")
                .value_name("FRAMES")
                .help("Display lag in frames (0-60)")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(i32)),
        )
        .arg(
            Arg::new("frame-rate")
                .short('r')
                .long("frame-rate")
                .value_name("HZ")
                .help("Lock the frame rate instead of running unlocked")
                .value_parser(value_parser!(f32)),
        )
        .arg(
            Arg::new("hitscan")
                .long("hitscan")
                .help("Instant ray hits")
                .action(ArgAction::SetTrue)
                .conflicts_with("ballistic"),
        )
        .arg(
            Arg::new("ballistic")
                .long("ballistic")
                .help("Simulated projectiles under gravity")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("SEED")
                .help("Seed for target waves; also enables respawning")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("play-mode")
                .long("play-mode")
                .help("Experiment mode: fullscreen window settings, sounds on")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("snapshot-out")
                .long("snapshot-out")
                .value_name("FILE")
                .help("Write the final session snapshot as JSON")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log verbosity")
                .default_value("info")
                .value_parser(["off", "error", "warn", "info", "debug", "trace"]),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("FILE")
                .help("Also append log output to this file")
                .value_parser(value_parser!(PathBuf)),
        )
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub config_path: Option<PathBuf>,
    pub frames: u64,
    pub display_lag: Option<i32>,
    pub frame_rate: Option<f32>,
    /// `Some(true)` for `--hitscan`, `Some(false)` for `--ballistic`.
    pub hit_scan: Option<bool>,
    pub seed: Option<u64>,
    pub play_mode: bool,
    pub snapshot_out: Option<PathBuf>,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl RunOptions {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self, String> {
        let level = matches
            .get_one::<String>("log-level")
            .map(String::as_str)
            .unwrap_or("info");
        let log_level =
            LevelFilter::from_str(level).map_err(|e| format!("Invalid log level {level}: {e}"))?;

        let hit_scan = if matches.get_flag("hitscan") {
            Some(true)
        } else if matches.get_flag("ballistic") {
            Some(false)
        } else {
            None
        };

        Ok(Self {
            config_path: matches.get_one::<PathBuf>("config").cloned(),
            frames: matches
                .get_one::<u64>("frames")
                .copied()
                .unwrap_or(DEFAULT_FRAMES),
            display_lag: matches.get_one::<i32>("display-lag").copied(),
            frame_rate: matches.get_one::<f32>("frame-rate").copied(),
            hit_scan,
            seed: matches.get_one::<u64>("seed").copied(),
            play_mode: matches.get_flag("play-mode"),
            snapshot_out: matches.get_one::<PathBuf>("snapshot-out").cloned(),
            log_level,
            log_file: matches.get_one::<PathBuf>("log-file").cloned(),
        })
    }

    /// Load the config file (or defaults) and apply the flag overrides.
    pub fn load_config(&self) -> Result<AppConfig, String> {
        let config = match &self.config_path {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };
        Ok(self.apply(config))
    }

    /// Flags win over file values.
    pub fn apply(&self, mut config: AppConfig) -> AppConfig {
        if self.play_mode {
            config = config.with_play_mode(true);
        }
        if let Some(frames) = self.display_lag {
            config.display_lag_frames = frames;
        }
        if let Some(hz) = self.frame_rate {
            config.unlock_framerate = false;
            config.variable_refresh_rate = true;
            config.target_frame_rate = hz;
        }
        if let Some(hit_scan) = self.hit_scan {
            config.weapon.hit_scan = hit_scan;
        }
        if let Some(seed) = self.seed {
            config.targets.respawn.enabled = true;
            config.targets.respawn.seed = seed;
        }
        config.sanitized()
    }
}

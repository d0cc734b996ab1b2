//! Application configuration.
//!
//! Everything that was a compile-time switch in a typical engine demo
//! (frame rate lock, play mode, window size, weapon tuning) lives here and
//! is handed to the session at construction. Every field has a default so
//! a partial JSON file is valid.

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::ShotVisual;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Frame rate to lock to with a variable-refresh display (Hz).
    pub target_frame_rate: f32,
    /// Run as fast as possible instead of locking to a display rate.
    pub unlock_framerate: bool,
    /// The display supports G-SYNC / FreeSync style variable refresh.
    pub variable_refresh_rate: bool,
    /// Fixed refresh rate of the display (Hz).
    pub refresh_rate: f32,
    pub horizontal_fov_degrees: f32,
    /// Experiment mode: fullscreen, no debug windows, sounds on.
    pub play_mode: bool,
    /// Play sounds. `None` follows `play_mode`.
    pub audio: Option<bool>,
    pub display_lag_frames: i32,
    pub reticle_index: i32,
    pub scene_brightness: f32,
    pub window: WindowConfig,
    pub weapon: WeaponConfig,
    pub targets: TargetsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            target_frame_rate: 1000.0,
            unlock_framerate: true,
            variable_refresh_rate: true,
            refresh_rate: 60.0,
            horizontal_fov_degrees: 90.0,
            play_mode: false,
            audio: None,
            display_lag_frames: 0,
            reticle_index: 0,
            scene_brightness: 1.0,
            window: WindowConfig::for_play_mode(false),
            weapon: WeaponConfig::default(),
            targets: TargetsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Failed to parse config: {e}"))
    }

    /// Read and parse a JSON config file.
    pub fn load(path: &Path) -> Result<Self, String> {
        let json = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))
    }

    /// Clamp every bounded field into range. Non-finite values fall back to
    /// their defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let weapon_defaults = WeaponConfig::default();
        let respawn_defaults = RespawnConfig::default();

        self.display_lag_frames = self
            .display_lag_frames
            .clamp(0, MAX_DISPLAY_LAG_FRAMES as i32);
        self.reticle_index = self.reticle_index.clamp(0, NUM_RETICLES as i32 - 1);
        self.scene_brightness = finite_or(self.scene_brightness, defaults.scene_brightness)
            .clamp(MIN_SCENE_BRIGHTNESS, MAX_SCENE_BRIGHTNESS);
        self.target_frame_rate = finite_or(self.target_frame_rate, defaults.target_frame_rate)
            .clamp(MIN_FRAME_RATE, MAX_FRAME_RATE);
        self.refresh_rate = positive_or(self.refresh_rate, defaults.refresh_rate);
        self.horizontal_fov_degrees =
            positive_or(self.horizontal_fov_degrees, defaults.horizontal_fov_degrees);

        self.weapon.bullet_speed = positive_or(self.weapon.bullet_speed, weapon_defaults.bullet_speed);
        self.weapon.fire_period = finite_or(self.weapon.fire_period, weapon_defaults.fire_period);
        self.weapon.fire_sound_volume =
            finite_or(self.weapon.fire_sound_volume, weapon_defaults.fire_sound_volume);

        let respawn = &mut self.targets.respawn;
        respawn.min_scale = finite_or(respawn.min_scale, respawn_defaults.min_scale).max(f32::EPSILON);
        respawn.max_scale = finite_or(respawn.max_scale, respawn_defaults.max_scale).max(respawn.min_scale);
        self
    }

    /// Seconds per frame implied by the frame-rate settings.
    pub fn frame_duration(&self) -> f64 {
        if self.unlock_framerate {
            UNLOCKED_FRAME_DURATION
        } else if self.variable_refresh_rate {
            1.0 / self.target_frame_rate as f64
        } else {
            1.0 / self.refresh_rate as f64
        }
    }

    pub fn audio_enabled(&self) -> bool {
        self.audio.unwrap_or(self.play_mode)
    }

    /// Switch play mode and resize the window to match.
    pub fn with_play_mode(mut self, play_mode: bool) -> Self {
        self.play_mode = play_mode;
        self.window = WindowConfig::for_play_mode(play_mode);
        self
    }
}

/// Window settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub resizable: bool,
    pub caption: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::for_play_mode(false)
    }
}

impl WindowConfig {
    /// Play mode is fullscreen 1080p; debug mode leaves room for the taskbar.
    pub fn for_play_mode(play_mode: bool) -> Self {
        Self {
            width: 1920,
            height: if play_mode { 1080 } else { 980 },
            fullscreen: play_mode,
            resizable: !play_mode,
            caption: "Abstract FPS".into(),
        }
    }
}

/// Weapon tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    /// Instant ray hits instead of simulated ballistic projectiles.
    pub hit_scan: bool,
    pub render_model: bool,
    pub render_bullets: bool,
    pub render_muzzle_flash: bool,
    /// Seconds between shots when auto-firing. 0 means a continuous laser.
    pub fire_period: f32,
    pub auto_fire: bool,
    /// Projectile speed (units/s).
    pub bullet_speed: f32,
    /// World-space offset from the weapon frame to the muzzle.
    pub muzzle_offset: Vec3,
    pub fire_sound_volume: f32,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            hit_scan: true,
            render_model: true,
            render_bullets: true,
            render_muzzle_flash: false,
            fire_period: 0.1,
            auto_fire: true,
            bullet_speed: 100.0,
            muzzle_offset: Vec3::new(0.0, 0.0, -0.5),
            fire_sound_volume: 0.5,
        }
    }
}

impl WeaponConfig {
    /// Bullets for an auto-firing weapon with a period, a laser otherwise.
    pub fn shot_visual(&self) -> ShotVisual {
        if self.fire_period > 0.0 && self.auto_fire {
            ShotVisual::Bullet
        } else {
            ShotVisual::Laser
        }
    }

    /// Whether the per-shot fire cue plays (continuous lasers stay silent).
    pub fn plays_fire_sound(&self) -> bool {
        self.fire_period > 0.0 || !self.auto_fire
    }

    /// Whether the weapon frame needs updating at all.
    pub fn needs_weapon_frame(&self) -> bool {
        self.render_model || self.render_bullets || self.render_muzzle_flash
    }
}

/// A target to place at startup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetSpawn {
    pub position: Vec3,
    pub scale: f32,
}

/// Target setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetsConfig {
    pub initial: Vec<TargetSpawn>,
    pub respawn: RespawnConfig,
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            initial: vec![
                TargetSpawn {
                    position: Vec3::new(37.6184, -0.54509, -2.12245),
                    scale: 1.0,
                },
                TargetSpawn {
                    position: Vec3::new(39.7, -2.3, 2.4),
                    scale: 1.0,
                },
            ],
            respawn: RespawnConfig::default(),
        }
    }
}

/// Automatic target waves once the active collection is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RespawnConfig {
    pub enabled: bool,
    /// Targets per wave.
    pub count: u32,
    /// Corner of the spawn volume.
    pub min: Vec3,
    /// Opposite corner of the spawn volume.
    pub max: Vec3,
    pub min_scale: f32,
    pub max_scale: f32,
    /// RNG seed. Same seed = same waves.
    pub seed: u64,
}

impl Default for RespawnConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            count: 3,
            min: Vec3::new(30.0, -3.0, -4.0),
            max: Vec3::new(45.0, 1.0, 4.0),
            min_scale: 0.5,
            max_scale: 2.0,
            seed: 42,
        }
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// `value` if it is finite and above zero, else `fallback`.
fn positive_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

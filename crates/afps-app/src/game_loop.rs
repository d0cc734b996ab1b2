//! Headless game loop. Builds the hallway range, installs the session in a
//! frame scheduler and lets an auto-fire bot play for a fixed number of
//! frames.

use std::fs;
use std::path::Path;

use glam::Vec3;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use afps_core::collab::Scene;
use afps_core::commands::InputCommand;
use afps_core::config::{AppConfig, WeaponConfig};
use afps_core::constants::{TARGET_BASE_RADIUS, TARGET_MODEL_COUNT};
use afps_core::state::SessionSnapshot;
use afps_core::types::CFrame;
use afps_sim::targets::bucket_scale;
use afps_sim::{FpsSession, FrameScheduler, SessionAssets};
use afps_world::{MemoryScene, Shape, SoftwareDevice};

use crate::cli::RunOptions;

/// The software device renders at the window size divided by this.
const OUTPUT_DOWNSCALE: u32 = 16;

/// Frames between laser shots when the weapon has no fire period.
const LASER_FIRE_INTERVAL: u64 = 10;

/// Where the player stands: the near end of the hallway, facing the targets.
pub fn spawn_frame() -> CFrame {
    let mut frame = CFrame::from_translation(Vec3::new(0.0, 0.0, 0.0));
    frame.look_at(Vec3::new(38.0, -1.0, 0.0));
    frame
}

/// Hallway geometry plus the target model array and the bullet model.
pub fn build_range() -> (MemoryScene, SessionAssets) {
    let mut scene = MemoryScene::new();

    scene.add_wall("floor", Vec3::new(24.0, -4.5, 0.0), Vec3::new(26.0, 0.5, 6.0));
    scene.add_wall("ceiling", Vec3::new(24.0, 4.5, 0.0), Vec3::new(26.0, 0.5, 6.0));
    scene.add_wall("left wall", Vec3::new(24.0, 0.0, -6.5), Vec3::new(26.0, 4.0, 0.5));
    scene.add_wall("right wall", Vec3::new(24.0, 0.0, 6.5), Vec3::new(26.0, 4.0, 0.5));
    scene.add_wall("back wall", Vec3::new(50.5, 0.0, 0.0), Vec3::new(0.5, 4.0, 6.0));

    let target_models = (0..TARGET_MODEL_COUNT)
        .map(|i| {
            scene.register_model(
                &format!("target-{i:02}"),
                Shape::Sphere {
                    radius: TARGET_BASE_RADIUS * bucket_scale(i),
                },
            )
        })
        .collect();
    let bullet_model = scene.register_model("bullet", Shape::Sphere { radius: 0.02 });

    (
        scene,
        SessionAssets {
            target_models,
            bullet_model,
        },
    )
}

/// Turns toward the nearest target and pulls the trigger at the weapon's rate.
#[derive(Debug, Clone)]
pub struct AutoFireBot {
    fire_period: f64,
    last_shot_secs: Option<f64>,
}

impl AutoFireBot {
    pub fn new(weapon: &WeaponConfig) -> Self {
        Self {
            fire_period: weapon.fire_period.max(0.0) as f64,
            last_shot_secs: None,
        }
    }

    /// Commands for frame `frame`.
    pub fn plan<S: Scene>(&mut self, session: &FpsSession<S>, frame: u64) -> Vec<InputCommand> {
        let eye = session.camera().frame.translation;
        let nearest = session
            .targets()
            .iter()
            .filter_map(|t| session.scene().frame(t.entity).map(|f| f.translation))
            .min_by(|a, b| a.distance_squared(eye).total_cmp(&b.distance_squared(eye)));

        let Some(aim) = nearest else {
            return Vec::new();
        };

        let mut look = session.camera().frame;
        look.look_at(aim);
        let mut commands = vec![InputCommand::MoveCamera { frame: look }];

        let now = session.time().elapsed_secs;
        let due = if self.fire_period > 0.0 {
            self.last_shot_secs
                .map_or(true, |last| now - last >= self.fire_period)
        } else {
            frame % LASER_FIRE_INTERVAL == 0
        };
        if due {
            self.last_shot_secs = Some(now);
            commands.push(InputCommand::Fire);
        }
        commands
    }
}

/// Outcome of a headless run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub frames: u64,
    pub elapsed_secs: f64,
    pub shots_fired: u32,
    pub hits: u32,
    pub targets_destroyed: u32,
    pub targets_remaining: usize,
    pub projectiles_in_flight: usize,
    pub waves_spawned: u32,
    /// Configured display lag.
    pub display_lag_frames: usize,
    /// Age in frames of the image on the output after the last frame.
    pub presented_frame_age: Option<u64>,
}

/// Run `frames` frames of the range with `config`.
pub fn run(config: AppConfig, frames: u64) -> (RunSummary, SessionSnapshot) {
    let (scene, assets) = build_range();
    let width = (config.window.width / OUTPUT_DOWNSCALE).max(1);
    let height = (config.window.height / OUTPUT_DOWNSCALE).max(1);
    let mut bot = AutoFireBot::new(&config.weapon);

    let mut session = FpsSession::new(config, scene, assets, spawn_frame());
    let mut device = SoftwareDevice::new(width, height);
    let mut scheduler = FrameScheduler::new(session.frame_duration());
    FpsSession::install(&mut scheduler);

    for frame in 0..frames {
        scheduler.queue_inputs(bot.plan(&session, frame));
        let time = scheduler.run_frame(&mut session, &mut device);
        if frame % 100 == 0 {
            debug!(
                "frame {}: {} targets, {} projectiles",
                time.tick,
                session.targets().len(),
                session.weapon().projectiles().len()
            );
        }
    }

    let snapshot = session.snapshot();
    let presented_frame_age = device
        .output()
        .tag()
        .filter(|tag| *tag <= snapshot.time.tick)
        .map(|tag| snapshot.time.tick - tag);

    let summary = RunSummary {
        frames,
        elapsed_secs: snapshot.time.elapsed_secs,
        shots_fired: snapshot.score.shots_fired,
        hits: snapshot.score.hits,
        targets_destroyed: snapshot.score.targets_destroyed,
        targets_remaining: snapshot.targets.len(),
        projectiles_in_flight: snapshot.projectiles.len(),
        waves_spawned: snapshot.score.waves_spawned,
        display_lag_frames: snapshot.display.lag_frames,
        presented_frame_age,
    };
    (summary, snapshot)
}

pub fn write_snapshot(path: &Path, snapshot: &SessionSnapshot) -> Result<(), String> {
    let json = serde_json::to_string_pretty(snapshot)
        .map_err(|e| format!("Failed to serialize snapshot: {e}"))?;
    fs::write(path, json).map_err(|e| format!("Failed to write snapshot {}: {e}", path.display()))
}

/// Load config, run, log the summary and write the snapshot if requested.
pub fn run_with_options(options: &RunOptions) -> Result<RunSummary, String> {
    let config = options.load_config()?;
    info!(
        "running {} frames: lag {} frames, {:.6} s/frame, hitscan={}",
        options.frames,
        config.display_lag_frames,
        config.frame_duration(),
        config.weapon.hit_scan
    );

    let (summary, snapshot) = run(config, options.frames);

    info!(
        "{} frames ({:.3} s): {} shots, {} hits, {} targets destroyed, {} remaining",
        summary.frames,
        summary.elapsed_secs,
        summary.shots_fired,
        summary.hits,
        summary.targets_destroyed,
        summary.targets_remaining
    );
    match summary.presented_frame_age {
        Some(age) => info!(
            "display lag {} frames, last presented frame was {age} frames old",
            summary.display_lag_frames
        ),
        None => info!(
            "display lag {} frames, no rendered frame presented yet",
            summary.display_lag_frames
        ),
    }

    if let Some(path) = &options.snapshot_out {
        write_snapshot(path, &snapshot)?;
        info!("snapshot written to {}", path.display());
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.unlock_framerate = false;
        config.target_frame_rate = 60.0;
        config
    }

    #[test]
    fn test_range_has_hallway_and_models() {
        let (scene, assets) = build_range();
        assert_eq!(assets.target_models.len(), TARGET_MODEL_COUNT);
        assert_eq!(scene.inserted_count(), 5);
        assert!(scene.contains("back wall"));
    }

    #[test]
    fn test_spawn_frame_faces_targets() {
        let look = spawn_frame().look_vector();
        assert!(look.x > 0.99);
    }

    #[test]
    fn test_bot_clears_default_range() {
        let (summary, snapshot) = run(quick_config(), 120);
        assert_eq!(summary.frames, 120);
        assert_eq!(snapshot.time.tick, 120);
        assert!(summary.shots_fired >= 2);
        assert_eq!(summary.targets_destroyed, 2);
        assert_eq!(summary.targets_remaining, 0);
        assert_eq!(summary.presented_frame_age, Some(0));
    }

    #[test]
    fn test_bot_respawns_with_waves() {
        let mut config = quick_config();
        config.targets.respawn.enabled = true;
        let (summary, _) = run(config, 240);
        assert!(summary.waves_spawned >= 1);
        assert!(summary.targets_destroyed > 2);
    }

    #[test]
    fn test_presented_frame_matches_lag() {
        let mut config = quick_config();
        config.display_lag_frames = 5;
        let (summary, snapshot) = run(config, 30);
        assert_eq!(summary.presented_frame_age, Some(5));
        assert!(snapshot.display.buffer_len >= 6);
    }

    #[test]
    fn test_ballistic_run_leaves_projectiles_or_hits() {
        let mut config = quick_config();
        config.weapon.hit_scan = false;
        let (summary, _) = run(config, 60);
        assert!(summary.shots_fired > 0);
        assert!(summary.hits + summary.projectiles_in_flight as u32 > 0);
    }

    #[test]
    fn test_runs_are_deterministic() {
        let mut config = quick_config();
        config.targets.respawn.enabled = true;
        let (_, a) = run(config.clone(), 200);
        let (_, b) = run(config, 200);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}

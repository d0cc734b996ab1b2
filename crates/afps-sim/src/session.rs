//! FPS session. Owns the weapon, targets, waves and compositor and wires
//! them to the host's scene, render device and frame loop.
//!
//! Like the rest of the crate the session is headless: a `tick` (or a
//! `FrameScheduler` frame) processes queued input, simulates, poses and
//! renders through the collaborator traits, and `snapshot` reports the
//! visible state.

use std::collections::VecDeque;

use glam::Vec3;
use log::{debug, info, warn};

use afps_core::collab::{AudioSink, RenderDevice, Scene};
use afps_core::commands::InputCommand;
use afps_core::config::AppConfig;
use afps_core::constants::*;
use afps_core::events::{AudioCue, DebugPrimitive};
use afps_core::state::{DisplayView, ScoreView, SessionSnapshot};
use afps_core::types::{CFrame, Camera, EntityId, ModelId, RenderTargetId, SimTime};

use crate::compositor::DisplayLagCompositor;
use crate::projectile::ProjectileHit;
use crate::scheduler::FrameScheduler;
use crate::targets::{Target, TargetRegistry};
use crate::waves::TargetWaves;
use crate::weapon::{FireOutcome, ViewModelPose, Weapon};

/// Models the host pre-built for the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionAssets {
    /// One target model per scale bucket, smallest first.
    pub target_models: Vec<ModelId>,
    pub bullet_model: ModelId,
}

/// Asset path of reticle `index`.
pub fn reticle_path(index: usize) -> String {
    format!("gui/reticle/reticle-{index:03}.png")
}

/// Audio cues go to the buffer only while sound is on.
fn audio_sink(enabled: bool, cues: &mut Vec<AudioCue>) -> Option<&mut dyn AudioSink> {
    if enabled {
        Some(cues as &mut dyn AudioSink)
    } else {
        None
    }
}

pub struct FpsSession<Sc: Scene> {
    config: AppConfig,
    scene: Sc,
    camera: Camera,
    weapon: Weapon,
    targets: TargetRegistry,
    waves: TargetWaves,
    compositor: DisplayLagCompositor,
    time: SimTime,
    command_queue: VecDeque<InputCommand>,
    audio_cues: Vec<AudioCue>,
    /// Primitives for the frame being rendered; cleared after render.
    debug_primitives: Vec<DebugPrimitive>,
    projectile_hits: Vec<ProjectileHit>,
    view_model_pose: Option<ViewModelPose>,
    reticle_index: usize,
    scene_brightness: f32,
    frame_duration: f64,
    score: ScoreView,
    last_presented: Option<RenderTargetId>,
}

impl<Sc: Scene> FpsSession<Sc> {
    /// Build a session over `scene` and spawn the configured initial targets.
    pub fn new(config: AppConfig, scene: Sc, assets: SessionAssets, camera_frame: CFrame) -> Self {
        let config = config.sanitized();
        if assets.target_models.len() != TARGET_MODEL_COUNT {
            warn!(
                "expected {TARGET_MODEL_COUNT} target models, got {}",
                assets.target_models.len()
            );
        }

        let mut session = Self {
            camera: Camera::new(camera_frame, config.horizontal_fov_degrees),
            weapon: Weapon::new(config.weapon.clone(), assets.bullet_model),
            targets: TargetRegistry::new(assets.target_models),
            waves: TargetWaves::new(config.targets.respawn.clone()),
            compositor: DisplayLagCompositor::new(config.display_lag_frames),
            time: SimTime::default(),
            command_queue: VecDeque::new(),
            audio_cues: Vec::new(),
            debug_primitives: Vec::new(),
            projectile_hits: Vec::new(),
            view_model_pose: None,
            reticle_index: config.reticle_index as usize,
            scene_brightness: config.scene_brightness,
            frame_duration: config.frame_duration(),
            score: ScoreView::default(),
            last_presented: None,
            scene,
            config,
        };

        for spawn in session.config.targets.initial.clone() {
            session.spawn_target(spawn.position, spawn.scale);
        }
        info!(
            "session ready: {} targets, hitscan={}, lag={} frames",
            session.targets.len(),
            session.weapon.config().hit_scan,
            session.compositor.lag_frames()
        );
        session
    }

    // --- Lifecycle ---

    /// Spawn a target at `position`. Returns its scene entity.
    pub fn spawn_target(&mut self, position: Vec3, scale: f32) -> Option<EntityId> {
        let entity = self
            .targets
            .spawn(&mut self.scene, position, scale)
            .map(|t| t.entity)?;
        self.score.targets_spawned += 1;
        Some(entity)
    }

    /// Destroy the target at `index`. Out-of-range indices are ignored.
    pub fn destroy_target(&mut self, index: usize) -> Option<Target> {
        let audio = audio_sink(self.config.audio_enabled(), &mut self.audio_cues);
        let target = self.targets.destroy(&mut self.scene, audio, index)?;
        self.score.targets_destroyed += 1;
        Some(target)
    }

    /// Fire the weapon from the camera. A hitscan hit is reported but the
    /// target is left alive; see `handle_input` for the player's trigger.
    pub fn fire(&mut self) -> FireOutcome {
        self.fire_with_exclusions(&[])
    }

    /// Fire, ignoring the entities in `dont_hit` entirely.
    pub fn fire_with_exclusions(&mut self, dont_hit: &[EntityId]) -> FireOutcome {
        let audio = audio_sink(self.config.audio_enabled(), &mut self.audio_cues);
        let outcome = self.weapon.fire(
            &mut self.scene,
            audio,
            &self.camera,
            self.targets.targets(),
            dont_hit,
        );
        self.score.shots_fired += 1;
        if let Some(beam) = &outcome.beam {
            self.debug_primitives.push(beam.clone());
        }
        outcome
    }

    // --- Frame phases ---

    /// Advance scene motion and projectiles, resolve ballistic hits and
    /// refill empty ranges.
    pub fn on_simulation(&mut self, dt: f64) {
        let step = dt as f32;
        self.scene.advance(step);

        let expired = self.weapon.on_simulation(
            &mut self.scene,
            self.targets.targets(),
            step,
            &mut self.projectile_hits,
        );
        self.score.projectiles_expired += expired;

        // Earlier hits may have swapped targets around; resolve by entity.
        let hits = std::mem::take(&mut self.projectile_hits);
        for hit in hits {
            match self.targets.index_of(hit.target) {
                Some(index) => {
                    if self.destroy_target(index).is_some() {
                        self.score.hits += 1;
                    }
                }
                None => debug!("{} hit a target that is already gone", hit.projectile),
            }
        }

        let respawned = self.waves.run(&mut self.targets, &mut self.scene);
        if respawned > 0 {
            self.score.targets_spawned += respawned;
            self.score.waves_spawned = self.waves.waves_spawned();
        }

        self.time.advance(dt);
    }

    /// Refresh the weapon pose from the camera.
    pub fn on_pose(&mut self) {
        self.view_model_pose = self.weapon.pose(&self.camera);
    }

    /// Render the scene through the display-lag compositor.
    pub fn on_graphics_3d(&mut self, device: &mut dyn RenderDevice) {
        let frame_index = self.time.tick;
        self.compositor.begin_frame(device);
        device.render_scene(frame_index);
        self.last_presented = self.compositor.end_frame(device);
        self.debug_primitives.clear();
    }

    // --- Input ---

    /// Apply one input command. Every command is consumed.
    pub fn handle_input(&mut self, command: &InputCommand) -> bool {
        match command {
            InputCommand::Fire => {
                let outcome = self.fire();
                if let Some(hit) = outcome.hit {
                    if self.destroy_target(hit.index).is_some() {
                        self.score.hits += 1;
                    }
                }
            }
            InputCommand::SetHitscan { enabled } => self.set_hitscan(*enabled),
            InputCommand::SpawnTarget { position, scale } => {
                self.spawn_target(*position, *scale);
            }
            InputCommand::DestroyTarget { index } => {
                self.destroy_target(*index);
            }
            InputCommand::MoveCamera { frame } => self.camera.advance(*frame),
            InputCommand::SetDisplayLag { frames } => self.set_display_lag(*frames),
            InputCommand::SetReticle { index } => self.set_reticle(*index),
            InputCommand::SetBrightness { value } => self.set_brightness(*value),
            InputCommand::SetFrameRate { hz } => self.set_frame_rate(*hz),
        }
        true
    }

    /// Queue a command for the next `tick`.
    pub fn queue_command(&mut self, command: InputCommand) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = InputCommand>) {
        self.command_queue.extend(commands);
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_input(&command);
        }
    }

    // --- Settings ---

    pub fn set_display_lag(&mut self, frames: i32) {
        self.compositor.set_lag_frames(frames);
    }

    pub fn set_hitscan(&mut self, enabled: bool) {
        if self.weapon.config().hit_scan != enabled {
            info!("hitscan {}", if enabled { "on" } else { "off" });
        }
        self.weapon.set_hit_scan(enabled);
    }

    /// Select a reticle, clamped to the available set.
    pub fn set_reticle(&mut self, index: i32) {
        let clamped = index.clamp(0, NUM_RETICLES as i32 - 1) as usize;
        if clamped as i32 != index {
            warn!("reticle {index} clamped to {clamped}");
        }
        self.reticle_index = clamped;
        debug!("reticle {}", reticle_path(clamped));
    }

    pub fn set_brightness(&mut self, value: f32) {
        if !value.is_finite() {
            warn!("ignoring brightness {value}");
            return;
        }
        self.scene_brightness = value.clamp(MIN_SCENE_BRIGHTNESS, MAX_SCENE_BRIGHTNESS);
    }

    /// Request a frame rate. Changes of less than `FRAME_DURATION_EPSILON`
    /// seconds per frame are ignored.
    pub fn set_frame_rate(&mut self, hz: f32) {
        if !hz.is_finite() || hz <= 0.0 {
            warn!("ignoring frame rate {hz}");
            return;
        }
        let hz = hz.clamp(MIN_FRAME_RATE, MAX_FRAME_RATE);
        let duration = 1.0 / hz as f64;
        if (duration - self.frame_duration).abs() < FRAME_DURATION_EPSILON {
            return;
        }
        info!("frame rate {hz} Hz");
        self.config.target_frame_rate = hz;
        self.frame_duration = duration;
    }

    // --- Driving ---

    /// Run one full frame without a scheduler and report the result.
    pub fn tick(&mut self, device: &mut dyn RenderDevice) -> SessionSnapshot {
        self.process_commands();
        self.on_simulation(self.frame_duration);
        self.on_pose();
        self.on_graphics_3d(device);
        self.snapshot()
    }

    /// Register the session's phases with a scheduler.
    pub fn install(scheduler: &mut FrameScheduler<Self>)
    where
        Sc: 'static,
    {
        scheduler.on_input(|session, command| session.handle_input(command));
        scheduler.on_simulation(|session, dt| session.on_simulation(dt));
        scheduler.on_pose(|session| session.on_pose());
        scheduler.on_render(|session, device| session.on_graphics_3d(device));
        scheduler.frame_duration_source(|session| session.frame_duration());
    }

    /// Visible state. Drains pending audio cues.
    pub fn snapshot(&mut self) -> SessionSnapshot {
        SessionSnapshot {
            time: self.time,
            targets: self.targets.targets().iter().map(Target::view).collect(),
            projectiles: self
                .weapon
                .projectiles()
                .iter()
                .map(|p| p.view(&self.scene))
                .collect(),
            display: DisplayView {
                state: self.compositor.state(),
                lag_frames: self.compositor.lag_frames(),
                buffer_len: self.compositor.buffer_len(),
                current_index: self.compositor.current_index(),
                frame_duration_secs: self.frame_duration,
            },
            reticle_index: self.reticle_index,
            scene_brightness: self.scene_brightness,
            hit_scan: self.weapon.config().hit_scan,
            audio_cues: std::mem::take(&mut self.audio_cues),
            score: self.score.clone(),
        }
    }

    // --- Accessors ---

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn scene(&self) -> &Sc {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Sc {
        &mut self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn weapon(&self) -> &Weapon {
        &self.weapon
    }

    pub fn targets(&self) -> &[Target] {
        self.targets.targets()
    }

    pub fn compositor(&self) -> &DisplayLagCompositor {
        &self.compositor
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn frame_duration(&self) -> f64 {
        self.frame_duration
    }

    pub fn reticle_index(&self) -> usize {
        self.reticle_index
    }

    pub fn reticle_asset(&self) -> String {
        reticle_path(self.reticle_index)
    }

    pub fn scene_brightness(&self) -> f32 {
        self.scene_brightness
    }

    pub fn view_model_pose(&self) -> Option<ViewModelPose> {
        self.view_model_pose
    }

    pub fn debug_primitives(&self) -> &[DebugPrimitive] {
        &self.debug_primitives
    }

    pub fn score(&self) -> &ScoreView {
        &self.score
    }

    /// Target presented by the last render, `None` when rendering directly.
    pub fn last_presented(&self) -> Option<RenderTargetId> {
        self.last_presented
    }

    pub fn pending_audio(&self) -> &[AudioCue] {
        &self.audio_cues
    }
}

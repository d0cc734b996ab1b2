//! Tests for the target/projectile lifecycle, the display-lag compositor,
//! the frame scheduler and the session.

use glam::Vec3;

use afps_core::collab::{RenderDevice, Scene};
use afps_core::commands::InputCommand;
use afps_core::config::{AppConfig, RespawnConfig, WeaponConfig};
use afps_core::constants::*;
use afps_core::enums::{CompositorState, ProjectileMotion, ShotVisual};
use afps_core::events::{AudioCue, DebugPrimitive};
use afps_core::types::{CFrame, Camera, EntityId, ModelId};
use afps_world::{MemoryScene, Shape, SoftwareDevice};

use crate::compositor::DisplayLagCompositor;
use crate::projectile::{self, Projectile};
use crate::scheduler::FrameScheduler;
use crate::session::{reticle_path, FpsSession, SessionAssets};
use crate::targets::{bucket_scale, TargetRegistry};
use crate::waves::TargetWaves;
use crate::weapon::Weapon;

// ---- Helpers ----

fn build_scene() -> (MemoryScene, SessionAssets) {
    let mut scene = MemoryScene::new();
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
    let bullet_model = scene.register_model("bullet", Shape::Sphere { radius: 0.05 });
    (
        scene,
        SessionAssets {
            target_models,
            bullet_model,
        },
    )
}

/// Default config with an empty range.
fn empty_range() -> AppConfig {
    let mut config = AppConfig::default();
    config.targets.initial.clear();
    config
}

/// Camera at the origin looking down -Z.
fn session(config: AppConfig) -> FpsSession<MemoryScene> {
    let (scene, assets) = build_scene();
    FpsSession::new(config, scene, assets, CFrame::IDENTITY)
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

// ---- Targets ----

#[test]
fn test_unit_scale_uses_middle_bucket() {
    let mut s = session(empty_range());
    let entity = s.spawn_target(Vec3::new(0.0, 0.0, -10.0), 1.0).unwrap();

    assert_eq!(s.targets().len(), 1);
    assert_eq!(s.targets()[0].scale_bucket, 10);
    assert_eq!(s.targets()[0].name, "target001");
    assert!(s.scene().is_inserted(entity));
    assert_eq!(s.scene().model_name(s.scene().model(entity).unwrap()), Some("target-10"));
}

#[test]
fn test_target_names_are_unique() {
    let mut s = session(empty_range());
    s.spawn_target(Vec3::ZERO, 1.0);
    s.spawn_target(Vec3::ONE, 1.0);
    s.destroy_target(0);
    s.spawn_target(Vec3::X, 1.0);

    let names: Vec<&str> = s.targets().iter().map(|t| t.name.as_str()).collect();
    assert!(names.contains(&"target002"));
    assert!(names.contains(&"target003"));
}

#[test]
fn test_spawned_target_is_immediately_hittable() {
    let mut s = session(empty_range());
    s.spawn_target(Vec3::new(0.0, 0.0, -10.0), 1.0);
    let outcome = s.fire();
    assert_eq!(outcome.hit.map(|h| h.index), Some(0));
}

#[test]
fn test_destroy_removes_exactly_one() {
    let mut s = session(empty_range());
    for i in 0..5 {
        s.spawn_target(Vec3::new(i as f32 * 3.0, 0.0, -10.0), 1.0);
    }

    while !s.targets().is_empty() {
        let before = s.targets().len();
        let destroyed = s.destroy_target(before / 2).unwrap();
        assert_eq!(s.targets().len(), before - 1);
        assert!(s.targets().iter().all(|t| t.entity != destroyed.entity));
        assert!(!s.scene().contains(&destroyed.name));
    }
    assert_eq!(s.score().targets_destroyed, 5);
}

#[test]
fn test_destroy_out_of_range_is_noop() {
    let mut s = session(empty_range());
    s.spawn_target(Vec3::ZERO, 1.0);
    assert!(s.destroy_target(3).is_none());
    assert_eq!(s.targets().len(), 1);

    let mut empty = session(empty_range());
    assert!(empty.destroy_target(0).is_none());
}

#[test]
fn test_default_config_spawns_hallway_targets() {
    let s = session(AppConfig::default());
    assert_eq!(s.targets().len(), 2);
    assert!(s.targets().iter().all(|t| t.scale_bucket == 10));
    assert_eq!(s.score().targets_spawned, 2);
}

// ---- Hitscan ----

#[test]
fn test_hitscan_hit_then_destroy() {
    let mut s = session(empty_range());
    s.spawn_target(Vec3::new(0.0, 0.0, -10.0), 1.0);

    let outcome = s.fire();
    let hit = outcome.hit.expect("target straight ahead");
    assert_eq!(hit.index, 0);
    assert!(hit.distance.is_finite());
    assert!(approx(hit.distance, 10.0 - TARGET_BASE_RADIUS));
    // fire reports, it does not destroy
    assert_eq!(s.targets().len(), 1);

    s.destroy_target(hit.index);
    assert!(s.targets().is_empty());
}

#[test]
fn test_dont_hit_excluding_all_targets_reports_wall() {
    let mut s = session(empty_range());
    let wall = s
        .scene_mut()
        .add_wall("back wall", Vec3::new(0.0, 0.0, -20.0), Vec3::new(5.0, 5.0, 0.5));
    let target = s.spawn_target(Vec3::new(0.0, 0.0, -10.0), 1.0).unwrap();

    let outcome = s.fire_with_exclusions(&[target]);
    assert!(outcome.hit.is_none());
    assert!(approx(outcome.closest, 19.5));
    assert_eq!(outcome.world_hit.and_then(|h| h.entity), Some(wall));
}

#[test]
fn test_wall_in_front_blocks_target() {
    let mut s = session(empty_range());
    s.scene_mut()
        .add_wall("cover", Vec3::new(0.0, 0.0, -5.0), Vec3::new(2.0, 2.0, 0.1));
    s.spawn_target(Vec3::new(0.0, 0.0, -10.0), 1.0);

    let outcome = s.fire();
    assert!(outcome.hit.is_none());
    assert!(approx(outcome.closest, 4.9));
}

#[test]
fn test_equal_distance_last_target_wins() {
    let mut s = session(empty_range());
    s.spawn_target(Vec3::new(0.0, 0.0, -10.0), 1.0);
    s.spawn_target(Vec3::new(0.0, 0.0, -10.0), 1.0);

    let outcome = s.fire();
    assert_eq!(outcome.hit.map(|h| h.index), Some(1));
}

#[test]
fn test_miss_reports_infinite_closest() {
    let mut s = session(empty_range());
    s.spawn_target(Vec3::new(0.0, 0.0, 10.0), 1.0);
    let outcome = s.fire();
    assert!(outcome.hit.is_none());
    assert!(outcome.world_hit.is_none());
    assert_eq!(outcome.closest, f32::INFINITY);
}

#[test]
fn test_fire_input_destroys_hit_target() {
    let mut s = session(empty_range());
    s.spawn_target(Vec3::new(0.0, 0.0, -10.0), 1.0);
    s.queue_command(InputCommand::Fire);
    let mut device = SoftwareDevice::new(4, 4);
    let snap = s.tick(&mut device);

    assert!(snap.targets.is_empty());
    assert_eq!(snap.score.shots_fired, 1);
    assert_eq!(snap.score.hits, 1);
    assert_eq!(snap.score.targets_destroyed, 1);
}

// ---- Shot visuals and audio ----

#[test]
fn test_bullet_spawned_with_capped_lifetime() {
    let mut s = session(empty_range());
    s.scene_mut()
        .add_wall("back wall", Vec3::new(0.0, 0.0, -20.0), Vec3::new(5.0, 5.0, 0.5));
    s.on_pose();
    let outcome = s.fire();

    let bullet = outcome.projectile.expect("bullet entity");
    assert_eq!(s.weapon().projectiles().len(), 1);
    let p = &s.weapon().projectiles()[0];
    assert_eq!(p.name, "bullet001");
    assert_eq!(p.motion, ProjectileMotion::Linear);
    assert_eq!(p.gravity, 0.0);
    assert!(approx(p.remaining_secs(), 19.5 / 100.0));

    let flags = s.scene().flags(bullet).unwrap();
    assert!(!flags.should_be_saved);
    assert!(!flags.can_cause_collisions);
    assert!(!flags.casts_shadows);
    assert!(s.scene().is_inserted(bullet));
}

#[test]
fn test_bullet_lifetime_capped_at_max_travel() {
    let mut s = session(empty_range());
    s.fire();
    let p = &s.weapon().projectiles()[0];
    assert!(approx(p.remaining_secs(), MAX_BULLET_TRAVEL / 100.0));
}

#[test]
fn test_continuous_laser_emits_beam_silently() {
    let mut config = empty_range();
    config.weapon.fire_period = 0.0;
    config.audio = Some(true);
    assert_eq!(config.weapon.shot_visual(), ShotVisual::Laser);

    let mut s = session(config);
    let outcome = s.fire();
    assert!(outcome.projectile.is_none());
    match outcome.beam {
        Some(DebugPrimitive::Beam { radius, color, end, .. }) => {
            assert_eq!(radius, LASER_BEAM_RADIUS);
            assert_eq!(color, LASER_BEAM_COLOR);
            assert!(approx(end.z, -AIM_DISTANCE));
        }
        None => panic!("expected a beam"),
    }
    assert_eq!(s.debug_primitives().len(), 1);
    assert!(s.pending_audio().is_empty());

    let mut device = SoftwareDevice::new(4, 4);
    s.on_graphics_3d(&mut device);
    assert!(s.debug_primitives().is_empty());
}

#[test]
fn test_fire_and_explosion_cues() {
    let mut config = empty_range();
    config.audio = Some(true);
    let mut s = session(config);
    s.spawn_target(Vec3::new(0.0, 0.0, -10.0), 1.0);

    s.handle_input(&InputCommand::Fire);
    let snap = s.snapshot();
    assert_eq!(snap.audio_cues.len(), 2);
    match &snap.audio_cues[0] {
        AudioCue::Fire { velocity, volume, .. } => {
            assert!(approx(velocity.z, -FIRE_CUE_VELOCITY_SCALE));
            assert_eq!(*volume, 0.5);
        }
        other => panic!("expected fire cue, got {other:?}"),
    }
    match &snap.audio_cues[1] {
        AudioCue::Explosion { position, volume, .. } => {
            assert!(approx(position.z, -10.0));
            assert_eq!(*volume, EXPLOSION_VOLUME);
        }
        other => panic!("expected explosion cue, got {other:?}"),
    }

    // drained
    assert!(s.snapshot().audio_cues.is_empty());
}

#[test]
fn test_audio_off_outside_play_mode() {
    let mut s = session(empty_range());
    s.spawn_target(Vec3::new(0.0, 0.0, -10.0), 1.0);
    s.handle_input(&InputCommand::Fire);
    assert!(s.snapshot().audio_cues.is_empty());
}

// ---- View model ----

#[test]
fn test_view_model_pose_follows_camera() {
    let mut s = session(empty_range());
    s.on_pose();
    let pose = s.view_model_pose().expect("model rendered by default");
    assert!(approx(pose.frame.translation.x, VIEW_MODEL_OFFSET[0]));
    assert!(approx(pose.frame.translation.y, VIEW_MODEL_OFFSET[1]));
    assert!(approx(pose.frame.translation.z, VIEW_MODEL_OFFSET[2]));

    let mut hidden = empty_range();
    hidden.weapon.render_model = false;
    let mut s = session(hidden);
    s.on_pose();
    assert!(s.view_model_pose().is_none());
}

#[test]
fn test_view_model_drops_when_looking_up() {
    let mut s = session(empty_range());
    let mut up = CFrame::IDENTITY;
    up.look_at(Vec3::new(0.0, 1.0, -1.0));
    s.handle_input(&InputCommand::MoveCamera { frame: up });
    s.on_pose();

    let pose = s.view_model_pose().unwrap();
    let local = up.rotation.transpose() * (pose.frame.translation - up.translation);
    assert!(local.y < VIEW_MODEL_OFFSET[1]);
    assert!(pose.previous_frame != pose.frame);
}

// ---- Projectiles ----

fn spawn_bullet(scene: &mut MemoryScene, model: ModelId, name: &str) -> EntityId {
    let entity = scene.create_entity(name, model, CFrame::IDENTITY);
    scene.insert(entity);
    entity
}

#[test]
fn test_projectile_lifetime_decrements_by_dt() {
    let (mut scene, assets) = build_scene();
    let mut projectiles: Vec<Projectile> = [0.05, 1.0, 0.0, 0.5]
        .into_iter()
        .enumerate()
        .map(|(i, lifetime)| {
            let name = format!("bullet{:03}", i + 1);
            let entity = spawn_bullet(&mut scene, assets.bullet_model, &name);
            Projectile::linear(entity, name, 10.0, lifetime)
        })
        .collect();
    let dt = 0.1;
    let before: Vec<(String, f32)> = projectiles
        .iter()
        .map(|p| (p.name.clone(), p.remaining_secs()))
        .collect();

    let mut hits = Vec::new();
    let expired = projectile::simulate(&mut projectiles, &mut scene, &[], dt, &mut hits);

    assert_eq!(expired, 2);
    assert!(hits.is_empty());
    for (name, remaining) in before {
        let after = projectiles.iter().find(|p| p.name == name);
        if remaining > dt {
            assert_eq!(after.map(|p| p.remaining_secs()), Some(remaining - dt));
            assert!(scene.contains(&name));
        } else {
            assert!(after.is_none(), "{name} should have expired");
            assert!(!scene.contains(&name));
        }
    }
}

#[test]
fn test_zero_bullet_speed_keeps_tracers_finite() {
    let (mut scene, assets) = build_scene();
    let config = WeaponConfig {
        bullet_speed: 0.0,
        ..Default::default()
    };
    let mut weapon = Weapon::new(config, assets.bullet_model);
    assert_eq!(weapon.config().bullet_speed, WeaponConfig::default().bullet_speed);

    let camera = Camera::new(CFrame::IDENTITY, 90.0);
    weapon.fire(&mut scene, None, &camera, &[], &[]);
    assert_eq!(weapon.projectiles().len(), 1);
    let remaining = weapon.projectiles()[0].remaining_secs();
    assert!(remaining.is_finite() && remaining > 0.0);
}

#[test]
fn test_linear_projectile_moves_along_look() {
    let (mut scene, assets) = build_scene();
    let entity = spawn_bullet(&mut scene, assets.bullet_model, "bullet001");
    let mut projectiles = vec![Projectile::linear(entity, "bullet001".into(), 50.0, 1.0)];
    let mut hits = Vec::new();
    projectile::simulate(&mut projectiles, &mut scene, &[], 0.1, &mut hits);
    let frame = scene.frame(entity).unwrap();
    assert!(approx(frame.translation.z, -5.0));
}

#[test]
fn test_hitscan_bullets_expire_over_ticks() {
    let mut s = session(empty_range());
    let mut device = SoftwareDevice::new(4, 4);
    s.set_frame_rate(100.0);
    s.fire();
    s.fire();
    assert_eq!(s.weapon().projectiles().len(), 2);

    // 1 s lifetime at 100 Hz
    for _ in 0..101 {
        s.tick(&mut device);
    }
    assert!(s.weapon().projectiles().is_empty());
    assert_eq!(s.score().projectiles_expired, 2);
    assert!(!s.scene().contains("bullet001"));
}

#[test]
fn test_ballistic_projectile_hits_target() {
    let mut config = empty_range();
    config.weapon.hit_scan = false;
    let mut s = session(config);
    s.spawn_target(Vec3::new(0.0, 0.0, -10.0), 2.0);
    s.on_pose();

    let outcome = s.fire();
    assert!(outcome.hit.is_none());
    assert!(outcome.projectile.is_some());
    let p = &s.weapon().projectiles()[0];
    assert_eq!(p.motion, ProjectileMotion::Ballistic);
    assert_eq!(p.gravity, BALLISTIC_GRAVITY);
    assert!(approx(p.remaining_secs(), MAX_BULLET_TRAVEL / 100.0));

    let mut device = SoftwareDevice::new(4, 4);
    s.set_frame_rate(60.0);
    for _ in 0..30 {
        s.tick(&mut device);
    }
    assert!(s.targets().is_empty());
    assert!(s.weapon().projectiles().is_empty());
    assert_eq!(s.score().hits, 1);
    assert_eq!(s.score().projectiles_expired, 0);
}

#[test]
fn test_ballistic_projectile_falls() {
    let mut config = empty_range();
    config.weapon.hit_scan = false;
    let mut s = session(config);
    s.fire();
    let entity = s.weapon().projectiles()[0].entity;
    let start = s.scene().frame(entity).unwrap().translation;

    let mut device = SoftwareDevice::new(4, 4);
    s.set_frame_rate(60.0);
    for _ in 0..30 {
        s.tick(&mut device);
    }
    let end = s.scene().frame(entity).unwrap().translation;
    assert!(end.y < start.y);
    assert!(end.z < start.z);
}

#[test]
fn test_set_hitscan_input_switches_mode() {
    let mut s = session(empty_range());
    s.handle_input(&InputCommand::SetHitscan { enabled: false });
    assert!(!s.weapon().config().hit_scan);
    s.fire();
    assert_eq!(s.weapon().projectiles()[0].motion, ProjectileMotion::Ballistic);
}

// ---- Display-lag compositor ----

#[test]
fn test_zero_lag_renders_directly() {
    let mut device = SoftwareDevice::new(4, 4);
    let mut compositor = DisplayLagCompositor::new(0);
    for t in 1..10u64 {
        let presented = compositor.render(&mut device, |d| d.draw_frame(t));
        assert!(presented.is_none());
        assert_eq!(device.output().tag(), Some(t));
    }
    assert_eq!(compositor.state(), CompositorState::Disabled);
    assert_eq!(device.target_count(), 0);
    assert_eq!(device.present_count(), 0);
}

#[test]
fn test_lag_round_trip_is_bit_identical() {
    for k in 1..=5u64 {
        let mut device = SoftwareDevice::new(4, 4);
        let mut compositor = DisplayLagCompositor::new(k as i32);

        for t in 0..20u64 {
            compositor.render(&mut device, |d| d.draw_frame(t));
            // what was drawn went to a delay buffer, not the output
            let drawn = device.target(compositor.buffers()[((t as usize) % (k as usize + 1))]).cloned();
            assert_eq!(drawn.and_then(|b| b.tag()), Some(t));

            if t >= k {
                let mut expected = device.output().clone();
                expected.fill_tagged(t - k);
                assert_eq!(device.output().pixels, expected.pixels, "lag {k}, tick {t}");
            }
            assert_eq!(device.stack_depth(), 0);
        }
        assert_eq!(compositor.buffer_len(), k as usize + 1);
    }
}

#[test]
fn test_buffers_labelled_and_sized() {
    let mut device = SoftwareDevice::new(8, 2);
    let mut compositor = DisplayLagCompositor::new(2);
    compositor.render(&mut device, |d| d.draw_frame(0));

    for (i, id) in compositor.buffers().iter().enumerate() {
        let buffer = device.target(*id).unwrap();
        assert_eq!(buffer.label, format!("Delay buffer {i}"));
        assert_eq!((buffer.width, buffer.height), (8, 2));
        assert_eq!(buffer.pixels.len(), 8 * 2 * 3);
    }
}

#[test]
fn test_lag_grows_and_never_shrinks() {
    let mut device = SoftwareDevice::new(4, 4);
    let mut compositor = DisplayLagCompositor::new(2);
    for t in 0..5u64 {
        compositor.render(&mut device, |d| d.draw_frame(t));
        assert!(compositor.buffer_len() >= compositor.lag_frames() + 1);
    }
    assert_eq!(compositor.buffer_len(), 3);

    compositor.set_lag_frames(6);
    compositor.render(&mut device, |d| d.draw_frame(5));
    assert_eq!(compositor.buffer_len(), 7);

    compositor.set_lag_frames(1);
    assert!(compositor.current_index() <= 1);
    for t in 6..12u64 {
        compositor.render(&mut device, |d| d.draw_frame(t));
        assert!(compositor.current_index() <= 1);
    }
    assert_eq!(compositor.buffer_len(), 7);
    // stable again: one frame behind
    assert_eq!(device.output().tag(), Some(10));

    compositor.set_lag_frames(0);
    compositor.render(&mut device, |d| d.draw_frame(12));
    assert_eq!(device.output().tag(), Some(12));
}

#[test]
fn test_lag_raised_mid_frame_applies_next_frame() {
    let mut device = SoftwareDevice::new(4, 4);
    let mut compositor = DisplayLagCompositor::new(1);
    compositor.render(&mut device, |d| d.draw_frame(0));
    assert_eq!(compositor.buffer_len(), 2);

    assert!(compositor.begin_frame(&mut device).is_some());
    device.draw_frame(1);
    compositor.set_lag_frames(5);
    assert!(compositor.end_frame(&mut device).is_some());
    assert_eq!(device.stack_depth(), 0);
    assert_eq!(device.output().tag(), Some(0));

    compositor.render(&mut device, |d| d.draw_frame(2));
    assert_eq!(compositor.buffer_len(), 6);
    assert!(compositor.current_index() <= 5);
}

#[test]
fn test_session_presents_delayed_frames() {
    let mut config = empty_range();
    config.display_lag_frames = 3;
    let mut s = session(config);
    let mut device = SoftwareDevice::new(4, 4);

    for _ in 0..12 {
        let snap = s.tick(&mut device);
        let t = snap.time.tick;
        assert_eq!(snap.display.state, CompositorState::Buffering);
        assert!(snap.display.buffer_len >= snap.display.lag_frames + 1);
        if t > 3 {
            assert_eq!(device.output().tag(), Some(t - 3));
        }
    }
    assert!(s.last_presented().is_some());

    s.handle_input(&InputCommand::SetDisplayLag { frames: -4 });
    let snap = s.tick(&mut device);
    assert_eq!(snap.display.state, CompositorState::Disabled);
    assert_eq!(device.output().tag(), Some(snap.time.tick));
    assert!(s.last_presented().is_none());
}

// ---- Waves ----

fn respawn(seed: u64) -> RespawnConfig {
    RespawnConfig {
        enabled: true,
        seed,
        ..RespawnConfig::default()
    }
}

#[test]
fn test_waves_only_spawn_into_empty_range() {
    let (mut scene, assets) = build_scene();
    let mut registry = TargetRegistry::new(assets.target_models);
    let mut waves = TargetWaves::new(respawn(7));

    assert_eq!(waves.run(&mut registry, &mut scene), 3);
    assert_eq!(registry.len(), 3);
    assert_eq!(waves.run(&mut registry, &mut scene), 0);
    assert_eq!(waves.waves_spawned(), 1);

    let config = respawn(7);
    for target in registry.targets() {
        let p = target.position;
        assert!(p.cmpge(config.min).all() && p.cmple(config.max).all());
        assert!(target.scale >= config.min_scale - 1e-5);
        assert!(target.scale <= config.max_scale + 1e-5);
    }
}

#[test]
fn test_waves_disabled_by_default() {
    let (mut scene, assets) = build_scene();
    let mut registry = TargetRegistry::new(assets.target_models);
    let mut waves = TargetWaves::new(RespawnConfig::default());
    assert_eq!(waves.run(&mut registry, &mut scene), 0);
    assert!(registry.is_empty());
}

#[test]
fn test_waves_same_seed_same_positions() {
    let positions = |seed| {
        let (mut scene, assets) = build_scene();
        let mut registry = TargetRegistry::new(assets.target_models);
        TargetWaves::new(respawn(seed)).run(&mut registry, &mut scene);
        registry
            .targets()
            .iter()
            .map(|t| (t.position, t.scale))
            .collect::<Vec<_>>()
    };
    assert_eq!(positions(99), positions(99));
    assert_ne!(positions(99), positions(100));
}

#[test]
fn test_session_respawns_after_last_kill() {
    let mut config = empty_range();
    config.targets.respawn = respawn(3);
    config.targets.initial = vec![afps_core::config::TargetSpawn {
        position: Vec3::new(0.0, 0.0, -10.0),
        scale: 1.0,
    }];
    let mut s = session(config);
    let mut device = SoftwareDevice::new(4, 4);

    s.queue_command(InputCommand::Fire);
    let snap = s.tick(&mut device);
    assert_eq!(snap.score.targets_destroyed, 1);
    assert_eq!(snap.targets.len(), 3);
    assert_eq!(snap.score.waves_spawned, 1);
    assert_eq!(snap.score.targets_spawned, 4);
}

// ---- Scheduler ----

#[derive(Default)]
struct Recorder {
    calls: Vec<String>,
}

#[test]
fn test_scheduler_phase_order() {
    let mut scheduler = FrameScheduler::<Recorder>::new(0.01);
    scheduler.on_render(|r, device| {
        r.calls.push("render".into());
        let _ = device.width();
    });
    scheduler.on_pose(|r| r.calls.push("pose".into()));
    scheduler.on_simulation(|r, dt| r.calls.push(format!("sim {dt}")));
    scheduler.on_input(|r, _| {
        r.calls.push("input".into());
        false
    });

    let mut state = Recorder::default();
    let mut device = SoftwareDevice::new(2, 2);
    scheduler.queue_input(InputCommand::Fire);
    let time = scheduler.run_frame(&mut state, &mut device);

    assert_eq!(state.calls, vec!["input", "sim 0.01", "pose", "render"]);
    assert_eq!(time.tick, 1);
    assert!((time.elapsed_secs - 0.01).abs() < 1e-12);
}

#[test]
fn test_consumed_input_stops_propagation() {
    let mut scheduler = FrameScheduler::<Recorder>::new(0.01);
    scheduler.on_input(|r, _| {
        r.calls.push("first".into());
        true
    });
    scheduler.on_input(|r, _| {
        r.calls.push("second".into());
        true
    });

    let mut state = Recorder::default();
    let mut device = SoftwareDevice::new(2, 2);
    scheduler.queue_inputs([InputCommand::Fire, InputCommand::Fire]);
    scheduler.run_frame(&mut state, &mut device);
    assert_eq!(state.calls, vec!["first", "first"]);
}

#[test]
fn test_frame_duration_ignores_tiny_changes() {
    let mut scheduler = FrameScheduler::<Recorder>::new(0.01);
    assert!(!scheduler.set_frame_duration(0.01 + FRAME_DURATION_EPSILON / 2.0));
    assert_eq!(scheduler.frame_duration(), 0.01);
    assert!(scheduler.set_frame_duration(0.02));
    assert_eq!(scheduler.frame_duration(), 0.02);
    assert!(!scheduler.set_frame_duration(-1.0));
    assert!(!scheduler.set_frame_duration(f64::NAN));
}

#[test]
fn test_installed_session_runs_under_scheduler() {
    let mut config = empty_range();
    config.display_lag_frames = 1;
    let mut s = session(config);
    s.spawn_target(Vec3::new(0.0, 0.0, -10.0), 1.0);

    let mut scheduler: FrameScheduler<FpsSession<MemoryScene>> = FrameScheduler::new(1.0);
    FpsSession::install(&mut scheduler);
    let mut device = SoftwareDevice::new(4, 4);

    scheduler.queue_input(InputCommand::SetFrameRate { hz: 120.0 });
    scheduler.queue_input(InputCommand::Fire);
    let time = scheduler.run_frame(&mut s, &mut device);

    assert!(s.targets().is_empty());
    assert!((scheduler.frame_duration() - 1.0 / 120.0).abs() < 1e-9);
    assert_eq!(time.tick, 1);
    assert_eq!(s.time().tick, 1);
    assert!(s.view_model_pose().is_some());

    scheduler.run_frame(&mut s, &mut device);
    assert_eq!(device.output().tag(), Some(1));
}

// ---- Settings ----

#[test]
fn test_reticle_clamped_with_asset_path() {
    let mut s = session(empty_range());
    s.handle_input(&InputCommand::SetReticle { index: 70 });
    assert_eq!(s.reticle_index(), NUM_RETICLES - 1);
    assert_eq!(s.reticle_asset(), "gui/reticle/reticle-054.png");
    s.set_reticle(-2);
    assert_eq!(s.reticle_index(), 0);
    assert_eq!(reticle_path(7), "gui/reticle/reticle-007.png");
}

#[test]
fn test_brightness_clamped() {
    let mut s = session(empty_range());
    s.set_brightness(5.0);
    assert_eq!(s.scene_brightness(), MAX_SCENE_BRIGHTNESS);
    s.set_brightness(0.0);
    assert_eq!(s.scene_brightness(), MIN_SCENE_BRIGHTNESS);
    s.set_brightness(f32::NAN);
    assert_eq!(s.scene_brightness(), MIN_SCENE_BRIGHTNESS);
}

#[test]
fn test_frame_rate_changes() {
    let mut config = empty_range();
    config.unlock_framerate = false;
    let mut s = session(config);
    assert!((s.frame_duration() - 1.0 / 1000.0).abs() < 1e-12);

    s.set_frame_rate(240.0);
    assert!((s.frame_duration() - 1.0 / 240.0).abs() < 1e-9);
    // 240 -> 240.1 Hz moves the duration by ~2e-6 s
    s.set_frame_rate(240.1);
    assert!((s.frame_duration() - 1.0 / 240.0).abs() < 1e-9);
    s.set_frame_rate(-5.0);
    assert!((s.frame_duration() - 1.0 / 240.0).abs() < 1e-9);
}

#[test]
fn test_unlocked_frame_duration() {
    let s = session(empty_range());
    assert_eq!(s.frame_duration(), UNLOCKED_FRAME_DURATION);
}

// ---- Determinism ----

#[test]
fn test_snapshots_deterministic() {
    let run = || {
        let mut config = AppConfig::default();
        config.targets.respawn = respawn(1234);
        config.display_lag_frames = 2;
        config.audio = Some(true);
        let mut s = session(config);
        let mut device = SoftwareDevice::new(4, 4);
        let mut out = Vec::new();
        for frame in 0..120 {
            if frame % 10 == 0 {
                let aim = s.targets().first().map(|t| t.position);
                if let Some(aim) = aim {
                    let mut look = CFrame::from_translation(Vec3::new(30.0, 0.0, 0.0));
                    look.look_at(aim);
                    s.queue_command(InputCommand::MoveCamera { frame: look });
                }
                s.queue_command(InputCommand::Fire);
            }
            let snap = s.tick(&mut device);
            out.push(serde_json::to_string(&snap).unwrap());
        }
        out
    };
    assert_eq!(run(), run());
}

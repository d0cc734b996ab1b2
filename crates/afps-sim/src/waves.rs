//! Target waves: refill the range when every target is down.

use glam::Vec3;
use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use afps_core::collab::Scene;
use afps_core::config::RespawnConfig;

use crate::targets::TargetRegistry;

/// Seeded respawner. Two instances with the same config produce the same
/// sequence of positions and scales.
#[derive(Debug, Clone)]
pub struct TargetWaves {
    config: RespawnConfig,
    rng: ChaCha8Rng,
    waves_spawned: u32,
}

impl TargetWaves {
    pub fn new(config: RespawnConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            waves_spawned: 0,
        }
    }

    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn waves_spawned(&self) -> u32 {
        self.waves_spawned
    }

    /// Spawn a wave if respawn is enabled and no targets remain.
    /// Returns the number of targets spawned.
    pub fn run<S: Scene + ?Sized>(&mut self, registry: &mut TargetRegistry, scene: &mut S) -> u32 {
        if !self.config.enabled || !registry.is_empty() || self.config.count == 0 {
            return 0;
        }

        let mut spawned = 0;
        for _ in 0..self.config.count {
            let position = self.random_position();
            let scale = self.random_scale();
            if registry.spawn(scene, position, scale).is_some() {
                spawned += 1;
            }
        }

        if spawned > 0 {
            self.waves_spawned += 1;
            info!("wave {}: {spawned} targets", self.waves_spawned);
        }
        spawned
    }

    /// Uniform point inside the spawn box. Inverted bounds are tolerated.
    fn random_position(&mut self) -> Vec3 {
        let t = Vec3::new(self.rng.gen(), self.rng.gen(), self.rng.gen());
        self.config.min + (self.config.max - self.config.min) * t
    }

    /// Log-uniform scale between `min_scale` and `max_scale`.
    fn random_scale(&mut self) -> f32 {
        let lo = self.config.min_scale.max(f32::EPSILON).ln();
        let hi = self.config.max_scale.max(f32::EPSILON).ln();
        let t: f32 = self.rng.gen();
        (lo + (hi - lo) * t).exp()
    }
}

//! Simulation constants and tuning parameters.

// --- Targets ---

/// Relative size step between adjacent target model buckets.
pub const TARGET_MODEL_ARRAY_SCALING: f32 = 0.1;

/// Bucket index of the unit-scale target model.
pub const TARGET_MODEL_ARRAY_OFFSET: f32 = 10.0;

/// Number of pre-built target models (buckets 0..=20).
pub const TARGET_MODEL_COUNT: usize = 21;

/// Target orbit radius around its anchor point (spin in place).
pub const TARGET_ORBIT_RADIUS: f32 = 0.0;

/// Target orbit period in seconds.
pub const TARGET_ORBIT_PERIOD_SECS: f32 = 0.1;

/// Collision radius of the unit-scale target model.
pub const TARGET_BASE_RADIUS: f32 = 0.5;

/// Volume of the positional cue played when a target is destroyed.
pub const EXPLOSION_VOLUME: f32 = 16.0;

// --- Weapon ---

/// Distance ahead of the camera used as the aim point when the ray hits nothing.
pub const AIM_DISTANCE: f32 = 1000.0;

/// Maximum travel distance used to derive a bullet's lifetime.
pub const MAX_BULLET_TRAVEL: f32 = 100.0;

/// Gravity applied to ballistic projectiles (units/s²).
pub const BALLISTIC_GRAVITY: f32 = 10.0;

/// Radius of the debug laser beam.
pub const LASER_BEAM_RADIUS: f32 = 0.02;

/// Colour of the debug laser beam (RGBA).
pub const LASER_BEAM_COLOR: [f32; 4] = [0.2, 0.8, 0.0, 1.0];

/// Speed multiplier applied to the look vector for the fire cue velocity.
pub const FIRE_CUE_VELOCITY_SCALE: f32 = 2.0;

// --- View model ---

/// View model offset from the camera (x, y, z) before look-pitch correction.
pub const VIEW_MODEL_OFFSET: [f32; 3] = [0.3, -0.4, -1.1];

/// View model yaw and pitch in degrees.
pub const VIEW_MODEL_YAW_DEGREES: f32 = 10.0;
pub const VIEW_MODEL_PITCH_DEGREES: f32 = 5.0;

/// Vertical drop of the view model per unit of look-vector Y.
pub const VIEW_MODEL_Y_SCALE: f32 = -0.12;

// --- Display lag ---

/// Upper bound accepted for the display lag slider (frames).
pub const MAX_DISPLAY_LAG_FRAMES: usize = 60;

// --- Frame timing ---

/// Frame duration used when the frame rate is unlocked (finite maximum rate).
pub const UNLOCKED_FRAME_DURATION: f64 = 1.0 / 8192.0;

/// Frame-duration changes smaller than this are ignored.
pub const FRAME_DURATION_EPSILON: f64 = 1e-5;

/// Range of the frame-rate control (Hz).
pub const MIN_FRAME_RATE: f32 = 30.0;
pub const MAX_FRAME_RATE: f32 = 5000.0;

// --- HUD ---

/// Number of reticle images available.
pub const NUM_RETICLES: usize = 55;

/// Scene brightness range.
pub const MIN_SCENE_BRIGHTNESS: f32 = 0.01;
pub const MAX_SCENE_BRIGHTNESS: f32 = 2.0;

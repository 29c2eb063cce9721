//! Engine constants and tuning parameters.

// --- Geometry ---

/// Threshold below which a vector length is treated as zero.
pub const GEOMETRY_EPSILON: f32 = 1e-6;

// --- Clustering ---

/// K-means convergence threshold: largest single-centroid shift (meters).
pub const KMEANS_SHIFT_EPSILON: f32 = 1e-3;

/// K-means iteration cap.
pub const KMEANS_MAX_ITERATIONS: usize = 64;

/// Defensive cap on constrained-k-means retry rounds. The cluster count
/// grows monotonically each round and is capped at the input size, so in
/// practice far fewer rounds are needed.
pub const CONSTRAINED_KMEANS_MAX_ROUNDS: usize = 32;

/// Distance below which a point is considered coincident with a centroid
/// in the fuzzy membership update.
pub const FUZZY_COINCIDENT_EPSILON: f32 = 1e-6;

// --- Guidance ---

/// Default proportional-navigation gain.
pub const PN_DEFAULT_GAIN: f32 = 3.0;

/// Turn-rate multiplier applied to the whole commanded acceleration vector.
/// Empirically tuned for this engine's engagement geometries; changing it
/// changes intercept behavior, not just numerical accuracy.
pub const PN_TURN_FACTOR: f32 = 100.0;

/// Fraction of `max_normal` a component is clamped to when it exceeds the
/// per-axis acceleration cap. Empirically tuned alongside `PN_TURN_FACTOR`.
pub const PN_SOFT_CLAMP_FRACTION: f32 = 0.2;

/// Feed-forward weight on target lateral acceleration in augmented PN.
pub const APN_AUGMENTATION_FACTOR: f32 = 0.5;

// --- Launch planning ---

/// Agreement tolerance between guessed and table-returned time-to-intercept
/// (seconds).
pub const LAUNCH_TIME_TOLERANCE_SECS: f32 = 1e-2;

/// Iteration cap for the fixed-point launch solver.
pub const LAUNCH_MAX_ITERATIONS: usize = 20;

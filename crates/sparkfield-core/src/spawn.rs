//! Pointer-speed driven spawn policy.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::particle::ParticleKind;

/// How many particles of which kind a pointer event produces.
///
/// Speeds above `high_threshold` always burst `high_count` rising particles.
/// Between the thresholds a single swirling particle appears with
/// `medium_chance`; below, a single ambient one with `ambient_chance`.
/// A sparkle is rolled independently of speed on every event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnPolicy {
    pub high_threshold: f32,
    pub medium_threshold: f32,
    pub high_count: u32,
    pub medium_chance: f32,
    pub ambient_chance: f32,
    pub sparkle_chance: f32,
    /// Full width of the square a new particle is scattered in around the pointer.
    pub position_jitter: f32,
    /// Fraction of the pointer motion a new particle keeps.
    pub inherit_velocity: f32,
    pub velocity_jitter: f32,
    /// Extra velocity spread per unit of pointer speed.
    pub speed_jitter: f32,
}

impl Default for SpawnPolicy {
    fn default() -> Self {
        Self {
            high_threshold: 5.0,
            medium_threshold: 2.0,
            high_count: 2,
            medium_chance: 0.8,
            ambient_chance: 0.3,
            sparkle_chance: 0.05,
            position_jitter: 15.0,
            inherit_velocity: 0.2,
            velocity_jitter: 2.0,
            speed_jitter: 0.05,
        }
    }
}

/// Particles laid along the pointer path between two events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    pub enabled: bool,
    /// Distance between candidate points on a segment.
    pub spacing: f32,
    pub chance: f32,
    /// Fraction of the segment vector handed to each trail particle.
    pub velocity_scale: f32,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            spacing: 5.0,
            chance: 0.7,
            velocity_scale: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpawnPlan {
    pub burst: Option<(ParticleKind, u32)>,
    pub sparkle: bool,
}

impl SpawnPlan {
    pub fn total(&self) -> u32 {
        self.burst.map_or(0, |(_, n)| n) + u32::from(self.sparkle)
    }
}

impl SpawnPolicy {
    pub fn roll<R: Rng + ?Sized>(&self, speed: f32, rng: &mut R) -> SpawnPlan {
        let burst = if speed > self.high_threshold {
            Some((ParticleKind::Rising, self.high_count))
        } else if speed > self.medium_threshold {
            roll_chance(rng, self.medium_chance).then_some((ParticleKind::Swirling, 1))
        } else {
            roll_chance(rng, self.ambient_chance).then_some((ParticleKind::Ambient, 1))
        };
        SpawnPlan {
            burst,
            sparkle: roll_chance(rng, self.sparkle_chance),
        }
    }
}

/// `true` with probability `p`, clamped into `[0, 1]`.
pub(crate) fn roll_chance<R: Rng + ?Sized>(rng: &mut R, p: f32) -> bool {
    rng.random::<f32>() < p.clamp(0.0, 1.0)
}

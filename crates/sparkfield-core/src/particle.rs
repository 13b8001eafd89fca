//! Particles, their kinds, and the per-kind physics and draw routines.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use sparkfield_platform::{Color, Paint, Surface};

use crate::config::KindProfile;

/// Inner radius of the star outline relative to its tips (regular pentagram).
const STAR_INNER_RATIO: f32 = 0.381_966;
/// Vertical stretch of the flame ellipse.
const FLAME_ASPECT: f32 = 1.5;
const HIGHLIGHT_ALPHA: f32 = 0.8;
const HIGHLIGHT_GLOW: f32 = 3.0;
/// Angular frequency of the swirl perturbation, per frame of age.
const SWIRL_FREQUENCY: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleKind {
    /// Low-energy dust that falls under normal gravity.
    Ambient,
    /// High-energy flame that accelerates upward under heavy drag.
    Rising,
    /// Medium-energy mote whose velocity wobbles with age.
    Swirling,
    /// Long-lived star that glides to a stop.
    Sparkle,
    /// Dot laid along the pointer path.
    Trail,
}

impl ParticleKind {
    pub const ALL: [ParticleKind; 5] = [
        ParticleKind::Ambient,
        ParticleKind::Rising,
        ParticleKind::Swirling,
        ParticleKind::Sparkle,
        ParticleKind::Trail,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ParticleKind::Ambient => "ambient",
            ParticleKind::Rising => "rising",
            ParticleKind::Swirling => "swirling",
            ParticleKind::Sparkle => "sparkle",
            ParticleKind::Trail => "trail",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Creation serial; lower ids are older.
    pub id: u64,
    pub kind: ParticleKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub age: u32,
    pub lifespan: u32,
    pub size: f32,
    /// Grow-in multiplier on `size`, eased toward 1.
    pub scale: f32,
    pub color: Color,
    pub opacity: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
}

impl Particle {
    pub fn is_alive(&self) -> bool {
        self.age < self.lifespan
    }

    pub fn radius(&self) -> f32 {
        (self.size * self.scale).max(0.0)
    }

    /// Advances one frame: move, apply the kind's forces, age, spin and fade.
    pub fn update(&mut self, profile: &KindProfile, fade_exponent: f32, scale_easing: f32) {
        self.position += self.velocity * profile.glide;
        match self.kind {
            ParticleKind::Ambient | ParticleKind::Trail => self.fall(profile),
            ParticleKind::Rising => self.rise(profile),
            ParticleKind::Swirling => self.swirl(profile),
            ParticleKind::Sparkle => self.coast(profile),
        }
        self.age = self.age.saturating_add(1);
        self.rotation = (self.rotation + self.rotation_speed) % TAU;
        self.scale += (1.0 - self.scale) * scale_easing.clamp(0.0, 1.0);
        self.opacity = fade(self.age, self.lifespan, fade_exponent);
    }

    fn fall(&mut self, profile: &KindProfile) {
        self.velocity.y += profile.acceleration;
        self.velocity *= profile.drag;
    }

    fn rise(&mut self, profile: &KindProfile) {
        // Screen y grows downward, so buoyancy is a negative acceleration.
        self.velocity.y -= profile.acceleration.abs();
        self.velocity *= profile.drag;
    }

    fn swirl(&mut self, profile: &KindProfile) {
        self.velocity.y += profile.acceleration;
        self.velocity *= profile.drag;
        let phase = self.age as f32 * SWIRL_FREQUENCY;
        self.velocity += Vec2::new(phase.sin(), phase.cos()) * profile.swirl;
    }

    fn coast(&mut self, profile: &KindProfile) {
        self.velocity *= profile.drag;
    }

    /// Draws the particle with its kind's shape. Invisible particles draw nothing.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, profile: &KindProfile, highlight_ratio: f32) {
        if self.opacity <= 0.0 {
            return;
        }
        let radius = self.radius();
        let paint = Paint::new(self.color, self.opacity).with_glow(profile.glow);
        match self.kind {
            ParticleKind::Ambient | ParticleKind::Swirling | ParticleKind::Trail => {
                surface.fill_circle(self.position, radius, paint);
            }
            ParticleKind::Rising => {
                let radii = Vec2::new(radius, radius * FLAME_ASPECT);
                surface.fill_ellipse(self.position, radii, self.rotation, paint);
            }
            ParticleKind::Sparkle => {
                let outline = star_outline(self.position, radius, self.rotation);
                surface.fill_polygon(&outline, paint);
            }
        }
        if profile.highlight {
            let highlight = Paint::new(Color::WHITE, self.opacity * HIGHLIGHT_ALPHA)
                .with_glow(HIGHLIGHT_GLOW);
            surface.fill_circle(self.position, radius * highlight_ratio, highlight);
        }
    }
}

/// `1 - (age / lifespan)^exponent`, clamped to `[0, 1]`.
pub fn fade(age: u32, lifespan: u32, exponent: f32) -> f32 {
    if lifespan == 0 {
        return 0.0;
    }
    let progress = (age as f32 / lifespan as f32).clamp(0.0, 1.0);
    (1.0 - progress.powf(exponent.max(f32::EPSILON))).clamp(0.0, 1.0)
}

/// Ten-vertex outline of a five-pointed star, tips first.
pub fn star_outline(center: Vec2, radius: f32, rotation: f32) -> [Vec2; 10] {
    let mut points = [Vec2::ZERO; 10];
    for (i, point) in points.iter_mut().enumerate() {
        let reach = if i % 2 == 0 {
            radius
        } else {
            radius * STAR_INNER_RATIO
        };
        let angle = rotation + i as f32 * PI / 5.0;
        *point = center + Vec2::from_angle(angle) * reach;
    }
    points
}

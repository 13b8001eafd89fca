//! Field presets: per-kind physics profiles, spawn policy, palette.
//!
//! Presets are plain serde structs, so they can be written as TOML:
//!
//! ```toml
//! name = "custom"
//! max_particles = 120
//! fade_exponent = 1.5
//!
//! [spawn]
//! high_threshold = 8.0
//! high_count = 3
//!
//! [kinds.rising]
//! lifespan = 45
//! drag = [0.97, 0.94]
//! theme = "fire"
//! ```

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;
use crate::palette::Palette;
use crate::particle::ParticleKind;
use crate::spawn::{SpawnPolicy, TrailConfig};

pub const PRESET_NAMES: [&str; 3] = ["default", "ember", "comet"];

/// Physics and look shared by every particle of one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KindProfile {
    /// Frames a particle lives, before jitter.
    pub lifespan: u32,
    /// Up to this many extra frames are added at random.
    pub lifespan_jitter: u32,
    pub size: f32,
    pub size_jitter: f32,
    /// Added to vertical velocity each frame (screen y points down).
    /// Rising particles use its magnitude as lift.
    pub acceleration: f32,
    /// Per-axis velocity multiplier applied each frame.
    pub drag: Vec2,
    /// Amplitude of the age-driven wobble; only swirling particles use it.
    pub swirl: f32,
    /// Fraction of velocity applied to position each frame.
    pub glide: f32,
    /// Rotation speed is drawn from `[-spin/2, spin/2)`.
    pub spin: f32,
    pub glow: f32,
    /// Draw a small white dot at the center.
    pub highlight: bool,
    /// Palette theme to draw colors from; any theme when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl Default for KindProfile {
    fn default() -> Self {
        Self {
            lifespan: 60,
            lifespan_jitter: 0,
            size: 1.5,
            size_jitter: 3.0,
            acceleration: 0.0,
            drag: Vec2::splat(0.98),
            swirl: 0.0,
            glide: 1.0,
            spin: 0.2,
            glow: 8.0,
            highlight: true,
            theme: None,
        }
    }
}

impl KindProfile {
    fn themed(mut self, theme: &str) -> Self {
        self.theme = Some(theme.to_owned());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KindProfiles {
    pub ambient: KindProfile,
    pub rising: KindProfile,
    pub swirling: KindProfile,
    pub sparkle: KindProfile,
    pub trail: KindProfile,
}

impl KindProfiles {
    pub fn get(&self, kind: ParticleKind) -> &KindProfile {
        match kind {
            ParticleKind::Ambient => &self.ambient,
            ParticleKind::Rising => &self.rising,
            ParticleKind::Swirling => &self.swirling,
            ParticleKind::Sparkle => &self.sparkle,
            ParticleKind::Trail => &self.trail,
        }
    }
}

impl Default for KindProfiles {
    fn default() -> Self {
        Self {
            ambient: KindProfile {
                acceleration: 0.1,
                ..Default::default()
            },
            rising: KindProfile {
                lifespan: 40,
                acceleration: 0.2,
                drag: Vec2::new(0.98, 0.95),
                glow: 15.0,
                ..Default::default()
            }
            .themed("fire"),
            swirling: KindProfile {
                acceleration: 0.05,
                drag: Vec2::splat(0.99),
                swirl: 0.1,
                glow: 20.0,
                ..Default::default()
            }
            .themed("magic"),
            sparkle: KindProfile {
                lifespan: 80,
                size: 3.0,
                size_jitter: 2.0,
                drag: Vec2::splat(0.995),
                glow: 12.0,
                highlight: false,
                ..Default::default()
            }
            .themed("gold"),
            trail: KindProfile {
                lifespan: 80,
                lifespan_jitter: 40,
                size_jitter: 2.5,
                acceleration: 0.05,
                drag: Vec2::splat(0.99),
                spin: 0.1,
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub name: String,
    /// Upper bound on live particles; the oldest is evicted beyond it.
    pub max_particles: usize,
    /// Opacity is `1 - progress^fade_exponent`; above 1 the fade bites late.
    pub fade_exponent: f32,
    /// Scale a particle is born at, eased toward 1.
    pub initial_scale: f32,
    pub scale_easing: f32,
    /// Radius of the white center dot relative to the particle.
    pub highlight_ratio: f32,
    pub spawn: SpawnPolicy,
    pub trail: TrailConfig,
    pub kinds: KindProfiles,
    pub palette: Palette,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            name: "default".into(),
            max_particles: 150,
            fade_exponent: 1.0,
            initial_scale: 1.0,
            scale_easing: 0.1,
            highlight_ratio: 0.3,
            spawn: SpawnPolicy::default(),
            trail: TrailConfig::default(),
            kinds: KindProfiles::default(),
            palette: Palette::default(),
        }
    }
}

impl FieldConfig {
    /// Short, dense cursor tail: few particles, linear fade, colors from any theme.
    pub fn ember() -> Self {
        let mut kinds = KindProfiles::default();
        for kind in ParticleKind::ALL {
            kinds_mut(&mut kinds, kind).theme = None;
        }
        kinds.swirling.swirl = 0.05;
        Self {
            name: "ember".into(),
            max_particles: 50,
            spawn: SpawnPolicy {
                medium_chance: 1.0,
                inherit_velocity: 0.0,
                speed_jitter: 0.1,
                ..Default::default()
            },
            kinds,
            ..Default::default()
        }
    }

    /// Long comet trail: particles grow in, fade late and follow the pointer path.
    pub fn comet() -> Self {
        Self {
            name: "comet".into(),
            max_particles: 300,
            fade_exponent: 1.5,
            initial_scale: 0.1,
            spawn: SpawnPolicy {
                high_threshold: 10.0,
                medium_threshold: 5.0,
                high_count: 3,
                medium_chance: 0.5,
                ambient_chance: 0.0,
                sparkle_chance: 0.02,
                position_jitter: 8.0,
                inherit_velocity: 0.3,
                velocity_jitter: 2.0,
                speed_jitter: 0.0,
            },
            trail: TrailConfig {
                enabled: true,
                ..Default::default()
            },
            kinds: KindProfiles {
                rising: KindProfile {
                    lifespan: 60,
                    acceleration: 0.3,
                    drag: Vec2::new(0.96, 0.94),
                    spin: 0.1,
                    glow: 15.0,
                    ..Default::default()
                }
                .themed("fire"),
                swirling: KindProfile {
                    lifespan: 100,
                    lifespan_jitter: 50,
                    size: 3.0,
                    size_jitter: 4.0,
                    drag: Vec2::splat(0.98),
                    swirl: 0.1,
                    spin: 0.1,
                    glow: 20.0,
                    highlight: false,
                    ..Default::default()
                }
                .themed("magic"),
                sparkle: KindProfile {
                    lifespan: 120,
                    lifespan_jitter: 60,
                    size: 2.0,
                    size_jitter: 3.0,
                    drag: Vec2::splat(0.995),
                    glide: 0.5,
                    spin: 0.1,
                    glow: 12.0,
                    highlight: true,
                    ..Default::default()
                }
                .themed("gold"),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Ok(Self::default()),
            "ember" => Ok(Self::ember()),
            "comet" => Ok(Self::comet()),
            other => Err(ConfigError::UnknownPreset(other.to_owned())),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: FieldConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        info!("loaded preset '{}' from {}", config.name, path.display());
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));
        if self.max_particles == 0 {
            return invalid("max_particles must be at least 1".into());
        }
        if !positive(self.fade_exponent) {
            return invalid(format!("fade_exponent must be positive, got {}", self.fade_exponent));
        }
        if !positive(self.initial_scale) || !(0.0..=1.0).contains(&self.scale_easing) {
            return invalid("initial_scale must be positive and scale_easing within [0, 1]".into());
        }
        let spawn = &self.spawn;
        for (label, p) in [
            ("medium_chance", spawn.medium_chance),
            ("ambient_chance", spawn.ambient_chance),
            ("sparkle_chance", spawn.sparkle_chance),
            ("trail.chance", self.trail.chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return invalid(format!("{label} must be within [0, 1], got {p}"));
            }
        }
        if spawn.medium_threshold > spawn.high_threshold {
            return invalid(format!(
                "medium_threshold {} exceeds high_threshold {}",
                spawn.medium_threshold, spawn.high_threshold
            ));
        }
        if self.trail.enabled && !positive(self.trail.spacing) {
            return invalid("trail.spacing must be positive".into());
        }
        for kind in ParticleKind::ALL {
            let profile = self.kinds.get(kind);
            if profile.lifespan == 0 || !positive(profile.size) || profile.size_jitter < 0.0 {
                return invalid(format!(
                    "{} particles need a positive lifespan and size",
                    kind.name()
                ));
            }
            if let Some(theme) = &profile.theme {
                if self.palette.theme(theme).map_or(true, <[_]>::is_empty) {
                    return invalid(format!(
                        "{} particles use theme '{theme}', which the palette lacks",
                        kind.name()
                    ));
                }
            }
        }
        Ok(())
    }
}

/// False for NaN as well as for zero and negatives.
fn positive(value: f32) -> bool {
    value > 0.0
}

fn kinds_mut(kinds: &mut KindProfiles, kind: ParticleKind) -> &mut KindProfile {
    match kind {
        ParticleKind::Ambient => &mut kinds.ambient,
        ParticleKind::Rising => &mut kinds.rising,
        ParticleKind::Swirling => &mut kinds.swirling,
        ParticleKind::Sparkle => &mut kinds.sparkle,
        ParticleKind::Trail => &mut kinds.trail,
    }
}

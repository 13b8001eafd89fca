//! Sparkfield core engine: platform-agnostic particle field for cursor trails.
//!
//! A [`ParticleField`] turns pointer motion into short-lived particles, moves
//! them with per-kind physics every frame and redraws them onto a host
//! [`Surface`](sparkfield_platform::Surface). Everything host-specific
//! (surfaces, frame scheduling, event subscriptions) lives behind the traits
//! in `sparkfield-platform`.

mod config;
mod error;
mod field;
mod palette;
mod particle;
mod pointer;
mod spawn;

pub use config::{FieldConfig, KindProfile, KindProfiles, PRESET_NAMES};
pub use error::{ConfigError, FieldError};
pub use field::{FieldState, FieldStats, KindCounts, ParticleField};
pub use palette::Palette;
pub use particle::{fade, star_outline, Particle, ParticleKind};
pub use pointer::{PointerMove, PointerTrack};
pub use spawn::{SpawnPlan, SpawnPolicy, TrailConfig};

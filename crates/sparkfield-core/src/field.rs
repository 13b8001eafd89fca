//! The particle field: a bounded, pointer-driven particle population that
//! updates and redraws itself once per host frame.
//!
//! Lifecycle is explicit. [`ParticleField::start`] subscribes to the host's
//! pointer and resize channels and requests the first frame;
//! [`ParticleField::stop`] cancels the pending frame and releases every
//! subscription before returning. While stopped, ticks and pointer events are
//! ignored and nothing accumulates.

use std::collections::VecDeque;
use std::f32::consts::TAU;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use sparkfield_platform::{
    EventChannel, EventSource, FrameRequest, FrameScheduler, Host, Subscription, Surface,
    SurfaceSize,
};
use tracing::{debug, error, info, trace, warn};

use crate::config::FieldConfig;
use crate::error::FieldError;
use crate::particle::{fade, Particle, ParticleKind};
use crate::pointer::{PointerMove, PointerTrack};
use crate::spawn::roll_chance;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldState {
    Stopped,
    Running,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindCounts {
    pub ambient: usize,
    pub rising: usize,
    pub swirling: usize,
    pub sparkle: usize,
    pub trail: usize,
}

impl KindCounts {
    pub fn get(&self, kind: ParticleKind) -> usize {
        match kind {
            ParticleKind::Ambient => self.ambient,
            ParticleKind::Rising => self.rising,
            ParticleKind::Swirling => self.swirling,
            ParticleKind::Sparkle => self.sparkle,
            ParticleKind::Trail => self.trail,
        }
    }

    fn bump(&mut self, kind: ParticleKind) {
        let slot = match kind {
            ParticleKind::Ambient => &mut self.ambient,
            ParticleKind::Rising => &mut self.rising,
            ParticleKind::Swirling => &mut self.swirling,
            ParticleKind::Sparkle => &mut self.sparkle,
            ParticleKind::Trail => &mut self.trail,
        };
        *slot += 1;
    }
}

/// Snapshot of a field's population and lifetime counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldStats {
    pub state: FieldState,
    pub live: usize,
    pub kinds: KindCounts,
    pub frames: u64,
    pub spawned: u64,
    pub evicted: u64,
    pub expired: u64,
}

#[derive(Debug, Default)]
struct Counters {
    frames: u64,
    spawned: u64,
    evicted: u64,
    expired: u64,
}

pub struct ParticleField<S> {
    config: FieldConfig,
    particles: VecDeque<Particle>,
    pointer: PointerTrack,
    rng: StdRng,
    surface: Option<S>,
    state: FieldState,
    pending_frame: Option<FrameRequest>,
    subscriptions: Vec<Subscription>,
    missing_surface_reported: bool,
    next_id: u64,
    counters: Counters,
}

impl<S: Surface> ParticleField<S> {
    pub fn new(config: FieldConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Deterministic spawning, for tests and scripted runs.
    pub fn with_seed(config: FieldConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: FieldConfig, rng: StdRng) -> Self {
        let capacity = config.max_particles.max(1);
        Self {
            config,
            particles: VecDeque::with_capacity(capacity),
            pointer: PointerTrack::default(),
            rng,
            surface: None,
            state: FieldState::Stopped,
            pending_frame: None,
            subscriptions: Vec::new(),
            missing_surface_reported: false,
            next_id: 0,
            counters: Counters::default(),
        }
    }

    /// Supplies the drawable, returning the one it replaces.
    pub fn attach_surface(&mut self, surface: S) -> Option<S> {
        debug!(
            "particle field '{}': surface attached ({:?})",
            self.config.name,
            surface.size()
        );
        self.missing_surface_reported = false;
        self.surface.replace(surface)
    }

    pub fn detach_surface(&mut self) -> Option<S> {
        self.surface.take()
    }

    /// Subscribes to the host and schedules the first frame. Calling it while
    /// running does nothing.
    ///
    /// Without a surface the field stays stopped and inert; the problem is
    /// logged once until a surface is attached.
    pub fn start<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<(), FieldError> {
        if self.state == FieldState::Running {
            return Ok(());
        }
        if self.surface.is_none() {
            if !self.missing_surface_reported {
                error!(
                    "particle field '{}' has no drawable surface; staying inert",
                    self.config.name
                );
                self.missing_surface_reported = true;
            }
            return Err(FieldError::MissingSurface);
        }
        for channel in EventChannel::ALL {
            match host.subscribe(channel) {
                Ok(subscription) => self.subscriptions.push(subscription),
                Err(err) => {
                    self.release_subscriptions(host);
                    return Err(FieldError::Subscribe {
                        channel,
                        reason: err.to_string(),
                    });
                }
            }
        }
        self.pending_frame = Some(host.request_frame());
        self.state = FieldState::Running;
        info!(
            "particle field '{}' started (max {} particles)",
            self.config.name, self.config.max_particles
        );
        Ok(())
    }

    /// Cancels the pending frame, releases subscriptions and drops all
    /// particles. Idempotent.
    pub fn stop<H: Host + ?Sized>(&mut self, host: &mut H) {
        if self.state == FieldState::Stopped {
            return;
        }
        if let Some(request) = self.pending_frame.take() {
            host.cancel_frame(request);
        }
        self.release_subscriptions(host);
        self.particles.clear();
        self.pointer.reset();
        if let Some(surface) = self.surface.as_mut() {
            surface.clear();
        }
        self.state = FieldState::Stopped;
        info!(
            "particle field '{}' stopped after {} frames",
            self.config.name, self.counters.frames
        );
    }

    fn release_subscriptions<E: EventSource + ?Sized>(&mut self, host: &mut E) {
        for subscription in self.subscriptions.drain(..) {
            let channel = subscription.channel();
            if let Err(err) = host.unsubscribe(subscription) {
                warn!("failed to release {channel:?} listener: {err}");
            }
        }
    }

    pub fn on_pointer_move(&mut self, event: PointerMove) {
        if self.state != FieldState::Running {
            return;
        }
        let speed = self.pointer.record(event);
        let motion = self.pointer.motion();
        if self.config.trail.enabled {
            self.lay_trail(speed);
        }
        let plan = self.config.spawn.roll(speed, &mut self.rng);
        if let Some((kind, count)) = plan.burst {
            for _ in 0..count {
                self.emit(kind, event.position, motion, speed);
            }
        }
        if plan.sparkle {
            self.emit(ParticleKind::Sparkle, event.position, motion, speed);
        }
    }

    pub fn on_pointer_enter(&mut self) {
        if self.state == FieldState::Running {
            self.pointer.enter();
        }
    }

    pub fn on_pointer_leave(&mut self) {
        if self.state == FieldState::Running {
            self.pointer.leave();
        }
    }

    /// Resizes the surface. Particle coordinates are untouched.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        if let Some(surface) = self.surface.as_mut() {
            debug!("particle field '{}': resize to {width}x{height}", self.config.name);
            surface.resize(SurfaceSize::new(width, height));
        }
    }

    /// One animation frame: update, cull, redraw, then ask for the next frame.
    pub fn tick<F: FrameScheduler + ?Sized>(&mut self, scheduler: &mut F) {
        if self.state != FieldState::Running {
            return;
        }
        // A tick not driven by the pending frame must not leave that frame behind.
        if let Some(request) = self.pending_frame.take() {
            scheduler.cancel_frame(request);
        }
        self.advance();
        self.render();
        self.pending_frame = Some(scheduler.request_frame());
    }

    fn advance(&mut self) {
        let config = &self.config;
        for particle in self.particles.iter_mut() {
            let profile = config.kinds.get(particle.kind);
            particle.update(profile, config.fade_exponent, config.scale_easing);
        }
        let before = self.particles.len();
        self.particles.retain(Particle::is_alive);
        self.counters.expired += (before - self.particles.len()) as u64;
        self.counters.frames += 1;
    }

    fn render(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.clear();
        for particle in &self.particles {
            let profile = self.config.kinds.get(particle.kind);
            particle.draw(surface, profile, self.config.highlight_ratio);
        }
    }

    /// Drops trail particles at even spacing along the last pointer segment.
    fn lay_trail(&mut self, speed: f32) {
        let Some((from, to)) = self.pointer.segment() else {
            return;
        };
        let trail = &self.config.trail;
        let segment = to - from;
        let distance = segment.length();
        if distance <= trail.spacing {
            return;
        }
        let inherited = segment * trail.velocity_scale;
        let chance = trail.chance;
        // A jump across the screen cannot place more than a full field's worth.
        let steps = ((distance / trail.spacing) as usize).min(self.config.max_particles.max(1));
        for step in 0..steps {
            if roll_chance(&mut self.rng, chance) {
                let at = from + segment * (step as f32 / steps as f32);
                self.emit(ParticleKind::Trail, at, inherited, speed);
            }
        }
    }

    fn emit(&mut self, kind: ParticleKind, at: Vec2, motion: Vec2, speed: f32) {
        let config = &self.config;
        let profile = config.kinds.get(kind);
        let spawn = &config.spawn;
        let rng = &mut self.rng;

        let position = at + centered(rng) * spawn.position_jitter;
        let spread = spawn.velocity_jitter + speed * spawn.speed_jitter;
        let velocity = motion * spawn.inherit_velocity + centered(rng) * spread;
        let lifespan = profile
            .lifespan
            .saturating_add(rng.random_range(0..=profile.lifespan_jitter))
            .max(1);
        let size = (profile.size + rng.random::<f32>() * profile.size_jitter).max(f32::EPSILON);
        let color = config.palette.pick(profile.theme.as_deref(), rng);
        let rotation = rng.random::<f32>() * TAU;
        let rotation_speed = (rng.random::<f32>() - 0.5) * profile.spin;

        let particle = Particle {
            id: self.next_id,
            kind,
            position,
            velocity,
            age: 0,
            lifespan,
            size,
            scale: config.initial_scale.max(f32::EPSILON),
            color,
            opacity: fade(0, lifespan, config.fade_exponent),
            rotation,
            rotation_speed,
        };
        self.next_id += 1;
        self.push(particle);
    }

    /// Appends, evicting from the front first so the bound always holds.
    fn push(&mut self, particle: Particle) {
        let limit = self.config.max_particles.max(1);
        let mut evicted = 0u64;
        while self.particles.len() >= limit && self.particles.pop_front().is_some() {
            evicted += 1;
        }
        if evicted > 0 {
            trace!("evicted {evicted} particle(s) to admit #{}", particle.id);
            self.counters.evicted += evicted;
        }
        self.particles.push_back(particle);
        self.counters.spawned += 1;
    }

    pub fn state(&self) -> FieldState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == FieldState::Running
    }

    /// Live particles, oldest first.
    pub fn particles(&self) -> impl ExactSizeIterator<Item = &Particle> + '_ {
        self.particles.iter()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn pointer(&self) -> &PointerTrack {
        &self.pointer
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    pub fn pending_frame(&self) -> Option<FrameRequest> {
        self.pending_frame
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    pub fn stats(&self) -> FieldStats {
        let mut kinds = KindCounts::default();
        for particle in &self.particles {
            kinds.bump(particle.kind);
        }
        FieldStats {
            state: self.state,
            live: self.particles.len(),
            kinds,
            frames: self.counters.frames,
            spawned: self.counters.spawned,
            evicted: self.counters.evicted,
            expired: self.counters.expired,
        }
    }
}

/// Random vector with both components in `[-0.5, 0.5)`.
fn centered<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    Vec2::new(rng.random::<f32>() - 0.5, rng.random::<f32>() - 0.5)
}

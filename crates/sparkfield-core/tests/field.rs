use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sparkfield_core::{
    FieldConfig, FieldError, FieldState, ParticleField, ParticleKind, PointerMove,
};
use glam::Vec2;
use sparkfield_platform::{EventChannel, ManualHost, RecordingSurface, Surface, SurfaceSize};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

type Field = ParticleField<RecordingSurface>;

fn started(config: FieldConfig, seed: u64) -> (Field, ManualHost) {
    let mut field = ParticleField::with_seed(config, seed);
    field.attach_surface(RecordingSurface::new(SurfaceSize::new(1280, 720)));
    let mut host = ManualHost::new();
    field.start(&mut host).unwrap();
    (field, host)
}

/// Fires the pending frame the way a host repaint would.
fn frame(field: &mut Field, host: &mut ManualHost) {
    host.take_frame().expect("field should have a frame pending");
    field.tick(host);
}

fn count(field: &Field, kind: ParticleKind) -> usize {
    field.particles().filter(|p| p.kind == kind).count()
}

/// Only bursts: no ambient, medium or sparkle rolls.
fn bursts_only() -> FieldConfig {
    let mut config = FieldConfig::default();
    config.spawn.medium_chance = 0.0;
    config.spawn.ambient_chance = 0.0;
    config.spawn.sparkle_chance = 0.0;
    config
}

#[test]
fn population_never_exceeds_the_bound() {
    for preset in ["default", "ember", "comet"] {
        let mut config = FieldConfig::preset(preset).unwrap();
        config.max_particles = 30;
        let (mut field, mut host) = started(config, 5);
        let mut rng = StdRng::seed_from_u64(99);
        for step in 0..2_000 {
            let x = rng.random_range(0.0..1280.0);
            let y = rng.random_range(0.0..720.0);
            field.on_pointer_move(PointerMove::at(x, y));
            assert!(field.len() <= 30, "{preset}: {} live", field.len());
            if step % 7 == 0 {
                frame(&mut field, &mut host);
            }
        }
        assert!(field.stats().evicted > 0);
    }
}

#[test]
fn surviving_particles_age_by_one_and_never_brighten() {
    let (mut field, mut host) = started(FieldConfig::comet(), 3);
    let mut x = 0.0;
    for _ in 0..120 {
        x += 12.0;
        field.on_pointer_move(PointerMove::at(x % 1280.0, 300.0));
        let before: HashMap<u64, (u32, f32)> =
            field.particles().map(|p| (p.id, (p.age, p.opacity))).collect();
        frame(&mut field, &mut host);
        for particle in field.particles() {
            assert!((0.0..=1.0).contains(&particle.opacity));
            if let Some((age, opacity)) = before.get(&particle.id) {
                assert_eq!(particle.age, age + 1);
                assert!(particle.opacity <= *opacity);
            }
        }
    }
}

#[test]
fn particle_is_removed_after_exactly_its_lifespan() {
    let (mut field, mut host) = started(bursts_only(), 8);
    field.on_pointer_move(PointerMove::at(200.0, 200.0).with_delta(20.0, 0.0));
    let lifespan = field.particles().next().unwrap().lifespan;
    assert_eq!(lifespan, field.config().kinds.rising.lifespan);

    for _ in 0..lifespan - 1 {
        frame(&mut field, &mut host);
    }
    assert_eq!(field.len(), 2);
    assert!(field.particles().all(|p| p.age == lifespan - 1 && p.opacity > 0.0));

    frame(&mut field, &mut host);
    assert!(field.is_empty());
    assert_eq!(field.stats().expired, 2);
}

#[test]
fn stop_is_idempotent_and_silences_the_field() {
    let (mut field, mut host) = started(FieldConfig::default(), 2);
    field.on_pointer_move(PointerMove::at(0.0, 0.0).with_delta(25.0, 0.0));
    frame(&mut field, &mut host);
    let frames = field.stats().frames;

    field.stop(&mut host);
    field.stop(&mut host);
    assert_eq!(field.state(), FieldState::Stopped);
    assert_eq!(host.pending_frames(), 0);
    assert_eq!(host.cancelled_frames(), 1);
    assert_eq!(host.live_subscriptions(), 0);
    assert!(field.subscriptions().is_empty());
    assert_eq!(field.pending_frame(), None);
    assert!(field.is_empty());

    field.tick(&mut host);
    field.on_pointer_move(PointerMove::at(10.0, 10.0).with_delta(40.0, 0.0));
    assert_eq!(field.stats().frames, frames);
    assert_eq!(host.pending_frames(), 0);
    assert!(field.is_empty());

    field.start(&mut host).unwrap();
    assert!(field.is_running());
    assert_eq!(host.live_subscriptions(), EventChannel::ALL.len());
    assert_eq!(host.pending_frames(), 1);
}

#[test]
fn fast_swipe_spawns_two_rising_particles() {
    let (mut field, _host) = started(FieldConfig::default(), 21);
    field.on_pointer_move(PointerMove::at(400.0, 300.0).with_delta(20.0, 0.0));
    assert_eq!(count(&field, ParticleKind::Rising), 2);
    assert_eq!(count(&field, ParticleKind::Swirling), 0);
    assert!(field
        .particles()
        .filter(|p| p.kind == ParticleKind::Rising)
        .all(|p| p.age == 0));
}

#[test]
fn stationary_pointer_spawns_no_energetic_particles() {
    for seed in 0..50 {
        let (mut field, _host) = started(FieldConfig::default(), seed);
        field.on_pointer_move(PointerMove::at(640.0, 360.0));
        field.on_pointer_move(PointerMove::at(640.0, 360.0));
        assert_eq!(field.pointer().speed(), 0.0);
        assert_eq!(count(&field, ParticleKind::Rising), 0);
        assert_eq!(count(&field, ParticleKind::Swirling), 0);
        assert!(field.particles().all(|p| matches!(
            p.kind,
            ParticleKind::Ambient | ParticleKind::Sparkle
        )));
    }
}

#[test]
fn full_field_evicts_the_oldest() {
    let mut config = bursts_only();
    config.max_particles = 5;
    config.spawn.ambient_chance = 1.0;
    let (mut field, _host) = started(config, 4);
    for _ in 0..5 {
        field.on_pointer_move(PointerMove::at(50.0, 50.0));
    }
    assert_eq!(field.len(), 5);
    let oldest = field.particles().next().unwrap().id;

    field.on_pointer_move(PointerMove::at(50.0, 50.0));
    assert_eq!(field.len(), 5);
    let ids: Vec<u64> = field.particles().map(|p| p.id).collect();
    assert!(!ids.contains(&oldest));
    assert_eq!(ids, (oldest + 1..=oldest + 5).collect::<Vec<_>>());
    assert_eq!(field.particles().last().unwrap().age, 0);
    assert_eq!(field.stats().evicted, 1);
}

#[test]
fn resize_leaves_particles_alone() {
    let (mut field, mut host) = started(FieldConfig::comet(), 17);
    for i in 0..30 {
        field.on_pointer_move(PointerMove::at(i as f32 * 15.0, 200.0));
        frame(&mut field, &mut host);
    }
    let snapshot: Vec<_> = field
        .particles()
        .map(|p| (p.id, p.position, p.age, p.lifespan))
        .collect();
    field.on_resize(1920, 1080);
    let after: Vec<_> = field
        .particles()
        .map(|p| (p.id, p.position, p.age, p.lifespan))
        .collect();
    assert_eq!(snapshot, after);
    assert_eq!(
        field.surface().unwrap().size(),
        SurfaceSize::new(1920, 1080)
    );
    frame(&mut field, &mut host);
}

#[test]
fn missing_surface_keeps_the_field_inert() {
    let mut field: Field = ParticleField::with_seed(FieldConfig::default(), 1);
    let mut host = ManualHost::new();
    assert!(matches!(
        field.start(&mut host),
        Err(FieldError::MissingSurface)
    ));
    assert!(matches!(
        field.start(&mut host),
        Err(FieldError::MissingSurface)
    ));
    assert_eq!(field.state(), FieldState::Stopped);
    assert_eq!(host.pending_frames(), 0);
    assert_eq!(host.live_subscriptions(), 0);

    field.on_pointer_move(PointerMove::at(0.0, 0.0).with_delta(50.0, 0.0));
    assert!(field.is_empty());

    field.attach_surface(RecordingSurface::new(SurfaceSize::new(320, 200)));
    field.start(&mut host).unwrap();
    assert!(field.is_running());
}

#[test]
fn refused_subscription_rolls_back_the_rest() {
    let mut field: Field = ParticleField::with_seed(FieldConfig::default(), 1);
    field.attach_surface(RecordingSurface::default());
    let mut host = ManualHost::new();
    host.refuse_channel(EventChannel::PointerLeave);
    let err = field.start(&mut host).unwrap_err();
    assert!(matches!(
        err,
        FieldError::Subscribe {
            channel: EventChannel::PointerLeave,
            ..
        }
    ));
    assert_eq!(host.live_subscriptions(), 0);
    assert_eq!(host.pending_frames(), 0);
    assert!(!field.is_running());
}

#[test]
fn each_frame_clears_then_draws_visible_particles() {
    let (mut field, mut host) = started(FieldConfig::default(), 12);
    for i in 0..10 {
        field.on_pointer_move(PointerMove::at(100.0 + i as f32 * 30.0, 100.0));
    }
    frame(&mut field, &mut host);

    let expected: usize = field
        .particles()
        .filter(|p| p.opacity > 0.0)
        .map(|p| 1 + usize::from(field.config().kinds.get(p.kind).highlight))
        .sum();
    let surface = field.surface().unwrap();
    assert_eq!(surface.clears(), 1);
    assert_eq!(surface.commands().len(), expected);
    assert!(surface.commands().iter().all(|c| c.paint().alpha > 0.0));
}

#[test]
fn trail_follows_long_segments() {
    let mut config = FieldConfig::comet();
    config.spawn.high_threshold = f32::MAX;
    config.spawn.medium_threshold = f32::MAX;
    config.spawn.sparkle_chance = 0.0;
    config.trail.chance = 1.0;
    let (mut field, _host) = started(config, 6);

    field.on_pointer_move(PointerMove::at(0.0, 0.0));
    assert!(field.is_empty());
    field.on_pointer_move(PointerMove::at(100.0, 0.0));
    assert_eq!(field.len(), 20);
    assert!(field.particles().all(|p| p.kind == ParticleKind::Trail));
    assert!(field
        .particles()
        .all(|p| (-4.0..=104.0).contains(&p.position.x) && p.position.y.abs() <= 4.0));

    field.on_pointer_move(PointerMove::at(103.0, 0.0));
    assert_eq!(field.len(), 20);
}

#[test]
fn leaving_and_reentering_is_not_a_swipe() {
    let (mut field, _host) = started(bursts_only(), 30);
    field.on_pointer_move(PointerMove::at(0.0, 0.0));
    field.on_pointer_leave();
    assert!(!field.pointer().is_inside());
    field.on_pointer_enter();
    field.on_pointer_move(PointerMove::at(900.0, 700.0));
    assert!(field.is_empty());
}

#[test]
fn unscheduled_tick_leaves_no_orphaned_frame() {
    let (mut field, mut host) = started(FieldConfig::default(), 13);
    field.tick(&mut host);
    assert_eq!(host.pending_frames(), 1);

    field.stop(&mut host);
    assert_eq!(host.pending_frames(), 0);

    field.start(&mut host).unwrap();
    field.on_pointer_move(PointerMove::at(300.0, 300.0).with_delta(30.0, 0.0));
    frame(&mut field, &mut host);
    frame(&mut field, &mut host);
    assert_eq!(host.pending_frames(), 1);
    assert!(field.particles().all(|p| p.age == 2));
}

fn steady_spawns() -> FieldConfig {
    let mut config = bursts_only();
    config.spawn.position_jitter = 0.0;
    config.spawn.velocity_jitter = 0.0;
    config.spawn.speed_jitter = 0.0;
    config
}

#[test]
fn bursts_spawn_on_the_pointer_with_inherited_motion() {
    let config = steady_spawns();
    let inherit = config.spawn.inherit_velocity;
    let (mut field, _host) = started(config, 14);
    field.on_pointer_move(PointerMove::at(250.0, 120.0).with_delta(20.0, 0.0));

    assert_eq!(field.len(), 2);
    for particle in field.particles() {
        assert_eq!(particle.kind, ParticleKind::Rising);
        assert_eq!(particle.position, Vec2::new(250.0, 120.0));
        assert_eq!(particle.velocity, Vec2::new(20.0, 0.0) * inherit);
    }
}

#[test]
fn jitter_stays_within_half_its_span() {
    let mut config = bursts_only();
    config.max_particles = 1_000;
    config.spawn.position_jitter = 10.0;
    config.spawn.velocity_jitter = 2.0;
    config.spawn.speed_jitter = 0.1;
    let inherit = config.spawn.inherit_velocity;
    let (mut field, _host) = started(config, 15);
    for _ in 0..200 {
        field.on_pointer_move(PointerMove::at(400.0, 300.0).with_delta(20.0, 0.0));
    }

    let inherited = Vec2::new(20.0, 0.0) * inherit;
    // velocity_jitter + speed * speed_jitter
    let spread = 2.0 + 20.0 * 0.1;
    let mut offsets = Vec2::ZERO;
    for particle in field.particles() {
        let offset = particle.position - Vec2::new(400.0, 300.0);
        assert!(offset.abs().max_element() <= 5.0, "placed at {offset}");
        let kick = particle.velocity - inherited;
        assert!(kick.abs().max_element() <= spread / 2.0 + 1e-4, "kicked by {kick}");
        offsets += offset.abs();
    }
    assert!(offsets.max_element() > 0.0);
}

#[derive(Clone, Default)]
struct ErrorCount(Arc<AtomicUsize>);

impl ErrorCount {
    fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for ErrorCount {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[test]
fn missing_surface_is_reported_once_per_attachment() {
    let errors = ErrorCount::default();
    let subscriber = tracing_subscriber::registry().with(errors.clone());
    tracing::subscriber::with_default(subscriber, || {
        let mut field: Field = ParticleField::with_seed(FieldConfig::default(), 2);
        let mut host = ManualHost::new();
        for _ in 0..5 {
            assert!(field.start(&mut host).is_err());
            field.tick(&mut host);
        }
        assert_eq!(errors.get(), 1);

        field.attach_surface(RecordingSurface::default());
        field.detach_surface();
        assert!(field.start(&mut host).is_err());
        assert!(field.start(&mut host).is_err());
        assert_eq!(errors.get(), 2);
    });
}

use std::f32::consts::FRAC_PI_2;
use std::io::Write;

use glam::Vec2;
use sparkfield_core::{FieldConfig, FieldStats, ParticleField, PointerMove};
use sparkfield_platform::{
    EventChannel, ManualHost, RecordingSurface, Result, SurfaceSize,
};
use tracing::debug;

/// Scripted run against in-memory host primitives.
///
/// The pointer traces a Lissajous figure across the surface, so its speed
/// sweeps through every spawn band. Halfway through, the surface is resized.
#[derive(Debug, Clone)]
pub struct Headless {
    pub frames: u64,
    pub every: u64,
    pub size: SurfaceSize,
    pub resized: SurfaceSize,
    /// Pointer events delivered between two frames.
    pub moves_per_frame: u32,
}

impl Default for Headless {
    fn default() -> Self {
        Self {
            frames: 600,
            every: 30,
            size: SurfaceSize::new(1280, 720),
            resized: SurfaceSize::new(1920, 1080),
            moves_per_frame: 2,
        }
    }
}

impl Headless {
    /// Runs the script and writes one JSON line of stats every `every` frames
    /// and after the last one. Returns the final stats.
    pub fn run<W: Write>(
        &self,
        config: FieldConfig,
        seed: Option<u64>,
        out: &mut W,
    ) -> Result<FieldStats> {
        let mut field = match seed {
            Some(seed) => ParticleField::with_seed(config, seed),
            None => ParticleField::new(config),
        };
        field.attach_surface(RecordingSurface::new(self.size));
        let mut host = ManualHost::new();
        field.start(&mut host)?;

        let every = self.every.max(1);
        let mut size = self.size;
        let mut step = 0u32;
        field.on_pointer_enter();
        for frame in 1..=self.frames {
            if frame == self.frames / 2 + 1 && host.is_subscribed(EventChannel::Resize) {
                size = self.resized;
                debug!("resizing to {}x{}", size.width, size.height);
                field.on_resize(size.width, size.height);
            }
            if host.is_subscribed(EventChannel::PointerMove) {
                for _ in 0..self.moves_per_frame {
                    let position = lissajous(step, size);
                    field.on_pointer_move(PointerMove::at(position.x, position.y));
                    step += 1;
                }
            }
            if host.take_frame().is_some() {
                field.tick(&mut host);
            }
            if frame % every == 0 || frame == self.frames {
                serde_json::to_writer(&mut *out, &field.stats())?;
                writeln!(out)?;
            }
        }
        field.on_pointer_leave();

        let stats = field.stats();
        field.stop(&mut host);
        Ok(stats)
    }
}

/// Position of the scripted pointer after `step` events.
fn lissajous(step: u32, size: SurfaceSize) -> Vec2 {
    let t = step as f32 * 0.02;
    let half = Vec2::new(size.width as f32, size.height as f32) * 0.5;
    let swing = half * 0.8;
    half + swing * Vec2::new((3.0 * t).sin(), (2.0 * t + FRAC_PI_2).sin())
}

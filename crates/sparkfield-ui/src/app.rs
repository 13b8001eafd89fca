use egui::{Align2, Color32, FontId, Pos2, Rect, Sense};
use sparkfield_core::{FieldConfig, ParticleField, PointerMove, PRESET_NAMES};
use sparkfield_platform::{EventChannel, Surface, SurfaceSize};
use tracing::{info, warn};

use crate::host::EguiHost;
use crate::surface::EguiSurface;

const BACKDROP: Color32 = Color32::from_rgb(12, 8, 24);

enum PointerInput {
    Moved(Pos2),
    Gone,
}

pub struct SparkfieldApp {
    field: ParticleField<EguiSurface>,
    host: EguiHost,
    presets: Vec<FieldConfig>,
    preset_index: usize,
    seed: Option<u64>,
    canvas: Rect,
}

impl SparkfieldApp {
    pub fn new(context: &egui::Context, config: FieldConfig, seed: Option<u64>) -> Self {
        let mut presets = vec![config];
        for name in PRESET_NAMES {
            if presets.iter().all(|p| p.name != name) {
                if let Ok(preset) = FieldConfig::preset(name) {
                    presets.push(preset);
                }
            }
        }
        let mut host = EguiHost::new(context.clone());
        let mut field = build_field(presets[0].clone(), seed);
        field.attach_surface(EguiSurface::default());
        if let Err(err) = field.start(&mut host) {
            warn!("particle field did not start: {err}");
        }
        Self {
            field,
            host,
            presets,
            preset_index: 0,
            seed,
            canvas: Rect::NOTHING,
        }
    }

    fn toggle(&mut self) {
        if self.field.is_running() {
            self.field.stop(&mut self.host);
        } else if let Err(err) = self.field.start(&mut self.host) {
            warn!("particle field did not start: {err}");
        }
    }

    fn cycle_preset(&mut self) {
        self.field.stop(&mut self.host);
        let surface = self.field.detach_surface().unwrap_or_default();
        self.preset_index = (self.preset_index + 1) % self.presets.len();
        let config = self.presets[self.preset_index].clone();
        info!("switching to preset '{}'", config.name);
        self.field = build_field(config, self.seed);
        self.field.attach_surface(surface);
        if let Err(err) = self.field.start(&mut self.host) {
            warn!("particle field did not start: {err}");
        }
    }

    /// Keeps the surface aligned with the canvas rect. The surface's own size
    /// is the last size forwarded, so a resize missed while stopped is caught
    /// on the first frame after a restart.
    fn sync_canvas(&mut self, canvas: Rect) {
        self.canvas = canvas;
        let size = surface_size(canvas);
        let stale = match self.field.surface_mut() {
            Some(surface) => {
                surface.set_origin(canvas.min);
                surface.size() != size
            }
            None => false,
        };
        if stale && self.host.listens_to(EventChannel::Resize) {
            self.field.on_resize(size.width, size.height);
        }
    }

    fn forward_pointer(&mut self, context: &egui::Context) {
        let inputs: Vec<PointerInput> = context.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::PointerMoved(pos) => Some(PointerInput::Moved(*pos)),
                    egui::Event::PointerGone => Some(PointerInput::Gone),
                    _ => None,
                })
                .collect()
        });
        for input in inputs {
            match input {
                PointerInput::Moved(pos) if self.canvas.contains(pos) => {
                    if !self.field.pointer().is_inside()
                        && self.host.listens_to(EventChannel::PointerEnter)
                    {
                        self.field.on_pointer_enter();
                    }
                    if self.host.listens_to(EventChannel::PointerMove) {
                        let local = pos - self.canvas.min;
                        self.field
                            .on_pointer_move(PointerMove::at(local.x, local.y));
                    }
                }
                PointerInput::Moved(_) | PointerInput::Gone => {
                    if self.field.pointer().is_inside()
                        && self.host.listens_to(EventChannel::PointerLeave)
                    {
                        self.field.on_pointer_leave();
                    }
                }
            }
        }
    }

    fn status_line(&self) -> String {
        let stats = self.field.stats();
        format!(
            "{} | {:?} | {} live / {} max | space: start/stop, c: next preset",
            self.field.config().name,
            stats.state,
            stats.live,
            self.field.config().max_particles,
        )
    }
}

fn build_field(config: FieldConfig, seed: Option<u64>) -> ParticleField<EguiSurface> {
    match seed {
        Some(seed) => ParticleField::with_seed(config, seed),
        None => ParticleField::new(config),
    }
}

impl eframe::App for SparkfieldApp {
    fn update(&mut self, context: &egui::Context, _frame: &mut eframe::Frame) {
        let (toggle, cycle) = context.input(|i| {
            (
                i.key_pressed(egui::Key::Space),
                i.key_pressed(egui::Key::C),
            )
        });
        if toggle {
            self.toggle();
        }
        if cycle {
            self.cycle_preset();
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(BACKDROP))
            .show(context, |ui| {
                let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::hover());
                self.sync_canvas(response.rect);
                self.forward_pointer(context);

                if self.host.take_due_frame().is_some() {
                    self.field.tick(&mut self.host);
                }
                if let Some(surface) = self.field.surface() {
                    painter.extend(surface.shapes().iter().cloned());
                }
                painter.text(
                    response.rect.left_top() + egui::vec2(12.0, 12.0),
                    Align2::LEFT_TOP,
                    self.status_line(),
                    FontId::monospace(12.0),
                    Color32::from_gray(150),
                );
            });
    }
}

impl Drop for SparkfieldApp {
    fn drop(&mut self) {
        self.field.stop(&mut self.host);
    }
}

fn surface_size(rect: Rect) -> SurfaceSize {
    SurfaceSize::new(rect.width().round() as u32, rect.height().round() as u32)
}

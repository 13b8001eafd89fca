use std::f32::consts::TAU;

use egui::{Color32, Mesh, Pos2, Shape, Stroke};
use glam::Vec2;
use sparkfield_platform::{Paint, Surface, SurfaceSize};

const ELLIPSE_SEGMENTS: usize = 24;
/// Alpha of the glow halo relative to the shape it surrounds.
const GLOW_ALPHA: f32 = 0.2;

/// Surface that turns draw calls into egui shapes for the next paint.
#[derive(Debug, Default)]
pub struct EguiSurface {
    size: SurfaceSize,
    origin: Pos2,
    shapes: Vec<Shape>,
}

impl EguiSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    /// Screen position of the field's `(0, 0)`.
    pub fn set_origin(&mut self, origin: Pos2) {
        self.origin = origin;
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    fn to_screen(&self, point: Vec2) -> Pos2 {
        self.origin + egui::vec2(point.x, point.y)
    }

    fn halo(&mut self, center: Pos2, radius: f32, paint: Paint) {
        if paint.glow > 0.0 {
            let faded = Paint {
                alpha: paint.alpha * GLOW_ALPHA,
                ..paint
            };
            self.shapes
                .push(Shape::circle_filled(center, radius + paint.glow * 0.5, color32(faded)));
        }
    }
}

fn color32(paint: Paint) -> Color32 {
    let alpha = (paint.alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(paint.color.r, paint.color.g, paint.color.b, alpha)
}

impl Surface for EguiSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    fn clear(&mut self) {
        self.shapes.clear();
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: Paint) {
        let center = self.to_screen(center);
        self.halo(center, radius, paint);
        self.shapes
            .push(Shape::circle_filled(center, radius, color32(paint)));
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, paint: Paint) {
        let spin = Vec2::from_angle(rotation);
        let points: Vec<Pos2> = (0..ELLIPSE_SEGMENTS)
            .map(|i| {
                let t = i as f32 * TAU / ELLIPSE_SEGMENTS as f32;
                let local = Vec2::new(radii.x * t.cos(), radii.y * t.sin());
                self.to_screen(center + spin.rotate(local))
            })
            .collect();
        self.halo(self.to_screen(center), radii.max_element(), paint);
        self.shapes
            .push(Shape::convex_polygon(points, color32(paint), Stroke::NONE));
    }

    fn fill_polygon(&mut self, points: &[Vec2], paint: Paint) {
        if points.len() < 3 {
            return;
        }
        let centroid = points.iter().copied().sum::<Vec2>() / points.len() as f32;
        let reach = points
            .iter()
            .map(|p| p.distance(centroid))
            .fold(0.0, f32::max);
        self.halo(self.to_screen(centroid), reach, paint);

        // Triangle fan around the centroid handles concave star outlines.
        let color = color32(paint);
        let mut mesh = Mesh::default();
        mesh.colored_vertex(self.to_screen(centroid), color);
        for point in points {
            mesh.colored_vertex(self.to_screen(*point), color);
        }
        let n = points.len() as u32;
        for i in 0..n {
            mesh.add_triangle(0, 1 + i, 1 + (i + 1) % n);
        }
        self.shapes.push(Shape::mesh(mesh));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparkfield_core::star_outline;
    use sparkfield_platform::Color;

    #[test]
    fn circles_get_a_halo_when_glowing() {
        let mut surface = EguiSurface::new(SurfaceSize::new(100, 100));
        surface.fill_circle(Vec2::new(5.0, 5.0), 2.0, Paint::new(Color::WHITE, 1.0));
        assert_eq!(surface.shapes().len(), 1);
        surface.fill_circle(
            Vec2::new(5.0, 5.0),
            2.0,
            Paint::new(Color::WHITE, 1.0).with_glow(8.0),
        );
        assert_eq!(surface.shapes().len(), 3);
        surface.clear();
        assert!(surface.shapes().is_empty());
    }

    #[test]
    fn origin_offsets_every_shape() {
        let mut surface = EguiSurface::default();
        surface.set_origin(Pos2::new(100.0, 50.0));
        surface.fill_circle(Vec2::new(1.0, 2.0), 3.0, Paint::new(Color::WHITE, 1.0));
        match &surface.shapes()[0] {
            Shape::Circle(circle) => assert_eq!(circle.center, Pos2::new(101.0, 52.0)),
            other => panic!("expected a circle, got {other:?}"),
        }
    }

    #[test]
    fn stars_become_a_triangle_fan() {
        let mut surface = EguiSurface::default();
        let outline = star_outline(Vec2::new(20.0, 20.0), 6.0, 0.0);
        surface.fill_polygon(&outline, Paint::new(Color::rgb(255, 215, 0), 0.5));
        match &surface.shapes()[0] {
            Shape::Mesh(mesh) => {
                assert_eq!(mesh.vertices.len(), 11);
                assert_eq!(mesh.indices.len(), 30);
            }
            other => panic!("expected a mesh, got {other:?}"),
        }
    }

    #[test]
    fn degenerate_polygons_are_skipped() {
        let mut surface = EguiSurface::default();
        surface.fill_polygon(&[Vec2::ZERO, Vec2::ONE], Paint::new(Color::WHITE, 1.0));
        assert!(surface.shapes().is_empty());
    }
}

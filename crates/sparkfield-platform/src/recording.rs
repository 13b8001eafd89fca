//! In-memory host pieces for headless runs and tests.

use std::collections::{BTreeMap, VecDeque};

use glam::Vec2;
use tracing::{debug, trace};

use crate::{
    EventChannel, EventSource, FrameRequest, FrameScheduler, Paint, Result, Subscription, Surface,
    SurfaceSize,
};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Circle {
        center: Vec2,
        radius: f32,
        paint: Paint,
    },
    Ellipse {
        center: Vec2,
        radii: Vec2,
        rotation: f32,
        paint: Paint,
    },
    Polygon {
        points: Vec<Vec2>,
        paint: Paint,
    },
}

impl DrawCommand {
    pub fn paint(&self) -> &Paint {
        match self {
            DrawCommand::Circle { paint, .. }
            | DrawCommand::Ellipse { paint, .. }
            | DrawCommand::Polygon { paint, .. } => paint,
        }
    }
}

/// Surface that keeps the draw calls issued since the last clear.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    size: SurfaceSize,
    commands: Vec<DrawCommand>,
    clears: usize,
}

impl RecordingSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clears(&self) -> usize {
        self.clears
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.clears += 1;
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: Paint) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            paint,
        });
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, paint: Paint) {
        self.commands.push(DrawCommand::Ellipse {
            center,
            radii,
            rotation,
            paint,
        });
    }

    fn fill_polygon(&mut self, points: &[Vec2], paint: Paint) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            paint,
        });
    }
}

/// Host whose frames fire only when the driver asks for them.
#[derive(Debug, Default)]
pub struct ManualHost {
    next_id: u64,
    pending: VecDeque<FrameRequest>,
    cancelled: usize,
    listeners: BTreeMap<u64, EventChannel>,
    refuse: Option<EventChannel>,
}

impl ManualHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later subscription to `channel` fail.
    pub fn refuse_channel(&mut self, channel: EventChannel) {
        self.refuse = Some(channel);
    }

    /// Removes and returns the oldest outstanding frame, as a repaint would.
    pub fn take_frame(&mut self) -> Option<FrameRequest> {
        self.pending.pop_front()
    }

    pub fn pending_frames(&self) -> usize {
        self.pending.len()
    }

    pub fn cancelled_frames(&self) -> usize {
        self.cancelled
    }

    pub fn live_subscriptions(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_subscribed(&self, channel: EventChannel) -> bool {
        self.listeners.values().any(|c| *c == channel)
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl FrameScheduler for ManualHost {
    fn request_frame(&mut self) -> FrameRequest {
        let request = FrameRequest(self.next_id());
        trace!("manual host: frame {:?} requested", request);
        self.pending.push_back(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        let before = self.pending.len();
        self.pending.retain(|r| *r != request);
        if self.pending.len() != before {
            self.cancelled += 1;
        }
    }
}

impl EventSource for ManualHost {
    fn subscribe(&mut self, channel: EventChannel) -> Result<Subscription> {
        if self.refuse == Some(channel) {
            debug!("manual host: refusing {:?} subscription", channel);
            return Err(format!("{channel:?} listeners are unavailable").into());
        }
        let id = self.next_id();
        self.listeners.insert(id, channel);
        Ok(Subscription::new(id, channel))
    }

    fn unsubscribe(&mut self, subscription: Subscription) -> Result<()> {
        match self.listeners.remove(&subscription.id()) {
            Some(_) => Ok(()),
            None => Err(format!("subscription {} is not registered", subscription.id()).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    #[test]
    fn cancelled_frames_never_fire() {
        let mut host = ManualHost::new();
        let first = host.request_frame();
        let second = host.request_frame();
        host.cancel_frame(first);
        host.cancel_frame(first);
        assert_eq!(host.cancelled_frames(), 1);
        assert_eq!(host.take_frame(), Some(second));
        assert_eq!(host.take_frame(), None);
    }

    #[test]
    fn subscriptions_are_tracked_until_released() {
        let mut host = ManualHost::new();
        let sub = host.subscribe(EventChannel::Resize).unwrap();
        assert!(host.is_subscribed(EventChannel::Resize));
        host.unsubscribe(sub).unwrap();
        assert_eq!(host.live_subscriptions(), 0);

        host.refuse_channel(EventChannel::PointerLeave);
        assert!(host.subscribe(EventChannel::PointerLeave).is_err());
    }

    #[test]
    fn clear_discards_recorded_commands() {
        let mut surface = RecordingSurface::new(SurfaceSize::new(640, 480));
        surface.fill_circle(Vec2::ZERO, 2.0, Paint::new(Color::WHITE, 1.0));
        assert_eq!(surface.commands().len(), 1);
        surface.clear();
        assert!(surface.commands().is_empty());
        assert_eq!(surface.clears(), 1);
    }
}

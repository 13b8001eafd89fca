//! Host abstraction traits so `sparkfield-core` stays independent of any windowing toolkit.

use glam::Vec2;
use serde::{Deserialize, Serialize};

mod recording;
pub use recording::{DrawCommand, ManualHost, RecordingSurface};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Opaque 8-bit RGB color. Serialized as a `#RRGGBB` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB` (the leading `#` is optional).
    pub fn from_hex(text: &str) -> Option<Self> {
        let digits = text.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |at: usize| u8::from_str_radix(&digits[at..at + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid color '{value}', expected #RRGGBB"))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Fill style for a single draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub color: Color,
    /// Opacity in `[0, 1]`.
    pub alpha: f32,
    /// Soft glow radius around the shape, in surface units. Zero disables it.
    pub glow: f32,
}

impl Paint {
    pub fn new(color: Color, alpha: f32) -> Self {
        Self {
            color,
            alpha: alpha.clamp(0.0, 1.0),
            glow: 0.0,
        }
    }

    pub fn with_glow(mut self, glow: f32) -> Self {
        self.glow = glow.max(0.0);
        self
    }
}

/// A drawable 2D target sharing the particles' logical coordinate space.
pub trait Surface {
    fn size(&self) -> SurfaceSize;
    /// Changes pixel dimensions only; coordinates keep their meaning.
    fn resize(&mut self, size: SurfaceSize);
    /// Wipes the whole surface.
    fn clear(&mut self);
    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: Paint);
    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, paint: Paint);
    /// Fills a polygon that is star-shaped around the centroid of its vertices.
    fn fill_polygon(&mut self, points: &[Vec2], paint: Paint);
}

/// Handle for a frame callback requested from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRequest(pub u64);

/// "Run this callback before the next repaint."
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameRequest;
    /// Must take effect before returning.
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// Host notifications a particle field listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventChannel {
    PointerMove,
    PointerEnter,
    PointerLeave,
    Resize,
}

impl EventChannel {
    pub const ALL: [EventChannel; 4] = [
        EventChannel::PointerMove,
        EventChannel::PointerEnter,
        EventChannel::PointerLeave,
        EventChannel::Resize,
    ];
}

/// Live registration with an [`EventSource`]. Not `Clone`: whoever holds it owns the listener.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Subscription {
    id: u64,
    channel: EventChannel,
}

impl Subscription {
    pub fn new(id: u64, channel: EventChannel) -> Self {
        Self { id, channel }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn channel(&self) -> EventChannel {
        self.channel
    }
}

/// Source of pointer and resize notifications.
pub trait EventSource {
    fn subscribe(&mut self, channel: EventChannel) -> Result<Subscription>;
    fn unsubscribe(&mut self, subscription: Subscription) -> Result<()>;
}

/// Everything a running field needs from its host besides the surface.
pub trait Host: FrameScheduler + EventSource {}

impl<T: FrameScheduler + EventSource + ?Sized> Host for T {}

use glam::Vec2;

/// One pointer-move notification from the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerMove {
    pub position: Vec2,
    /// Raw per-event movement, when the host reports it.
    pub delta: Option<Vec2>,
}

impl PointerMove {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            delta: None,
        }
    }

    pub fn with_delta(mut self, dx: f32, dy: f32) -> Self {
        self.delta = Some(Vec2::new(dx, dy));
        self
    }
}

/// Current and previous pointer position plus the derived speed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointerTrack {
    current: Option<Vec2>,
    previous: Option<Vec2>,
    motion: Vec2,
    speed: f32,
    inside: bool,
}

impl PointerTrack {
    /// Shifts current into previous and returns the new speed.
    ///
    /// Without a reported delta the speed is the distance travelled since the
    /// last event; the first event after a reset travels nowhere.
    pub fn record(&mut self, event: PointerMove) -> f32 {
        let previous = self.current.unwrap_or(event.position);
        self.previous = Some(previous);
        self.current = Some(event.position);
        self.motion = event.delta.unwrap_or(event.position - previous);
        self.speed = self.motion.length();
        if !self.speed.is_finite() {
            self.motion = Vec2::ZERO;
            self.speed = 0.0;
        }
        self.inside = true;
        self.speed
    }

    pub fn enter(&mut self) {
        self.inside = true;
    }

    /// Forgets the path so re-entering elsewhere does not read as a fast swipe.
    pub fn leave(&mut self) {
        self.reset();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn current(&self) -> Option<Vec2> {
        self.current
    }

    pub fn previous(&self) -> Option<Vec2> {
        self.previous
    }

    /// Path segment covered by the last event.
    pub fn segment(&self) -> Option<(Vec2, Vec2)> {
        Some((self.previous?, self.current?))
    }

    /// Movement of the last event: the reported delta, else the segment vector.
    pub fn motion(&self) -> Vec2 {
        self.motion
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_inside(&self) -> bool {
        self.inside
    }
}

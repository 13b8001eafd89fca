use std::collections::HashMap;

use sparkfield_platform::{EventChannel, EventSource, FrameRequest, FrameScheduler, Result, Subscription};
use tracing::debug;

/// Host backed by an egui context: frames are repaints, listeners are a registry
/// the app consults before forwarding input.
pub struct EguiHost {
    context: egui::Context,
    next_id: u64,
    pending: Option<FrameRequest>,
    listeners: HashMap<u64, EventChannel>,
}

impl EguiHost {
    pub fn new(context: egui::Context) -> Self {
        Self {
            context,
            next_id: 0,
            pending: None,
            listeners: HashMap::new(),
        }
    }

    /// Claims the outstanding frame, if one was requested and not cancelled.
    pub fn take_due_frame(&mut self) -> Option<FrameRequest> {
        self.pending.take()
    }

    pub fn listens_to(&self, channel: EventChannel) -> bool {
        self.listeners.values().any(|c| *c == channel)
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl FrameScheduler for EguiHost {
    fn request_frame(&mut self) -> FrameRequest {
        let request = FrameRequest(self.next_id());
        self.pending = Some(request);
        self.context.request_repaint();
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
        }
    }
}

impl EventSource for EguiHost {
    fn subscribe(&mut self, channel: EventChannel) -> Result<Subscription> {
        let id = self.next_id();
        self.listeners.insert(id, channel);
        debug!("egui host: listening to {:?}", channel);
        Ok(Subscription::new(id, channel))
    }

    fn unsubscribe(&mut self, subscription: Subscription) -> Result<()> {
        self.listeners
            .remove(&subscription.id())
            .map(|_| ())
            .ok_or_else(|| format!("unknown listener {}", subscription.id()).into())
    }
}

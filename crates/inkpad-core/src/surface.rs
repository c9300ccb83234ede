//! Host surface abstraction and scoped event subscriptions.

use std::fmt;
use std::sync::mpsc::Sender;

use kurbo::Rect;

use crate::input::DeviceEvent;
use crate::render::Renderer;

/// Channel end handed to a surface for delivering device events.
#[derive(Debug, Clone)]
pub struct EventSink {
    sender: Sender<DeviceEvent>,
}

impl EventSink {
    pub fn new(sender: Sender<DeviceEvent>) -> Self {
        Self { sender }
    }

    /// Deliver an event. Returns false once the controller has let go of the
    /// other end.
    pub fn send(&self, event: DeviceEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}

/// Live binding of device events to a controller.
///
/// Dropping the subscription runs its disposer, which unbinds the platform
/// listeners. It runs at most once.
#[must_use = "dropping a subscription unbinds its listeners"]
pub struct Subscription {
    disposer: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(disposer: impl FnOnce() + 'static) -> Self {
        Self {
            disposer: Some(Box::new(disposer)),
        }
    }

    /// Unbind now.
    pub fn dispose(mut self) {
        self.run_disposer();
    }

    fn run_disposer(&mut self) {
        if let Some(disposer) = self.disposer.take() {
            disposer();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_disposer();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.disposer.is_some())
            .finish()
    }
}

/// A platform drawing surface the controller can attach to.
pub trait Surface {
    /// On-screen bounds in client coordinates.
    fn bounds(&self) -> Rect;

    /// Physical pixels per logical pixel.
    fn device_pixel_ratio(&self) -> f64;

    /// The drawing context, or `None` if the surface cannot be drawn to.
    fn renderer(&mut self) -> Option<&mut dyn Renderer>;

    /// Ask the platform for an animation frame callback.
    fn request_frame(&self);

    /// Start forwarding device events to `sink`.
    fn subscribe(&mut self, sink: EventSink) -> Subscription;
}

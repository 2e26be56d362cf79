//! Placement observer hook.
//!
//! Callers that want to trace or animate a packing pass an observer into the
//! placement loop. It is called synchronously after every committed
//! placement.

use crate::geometry::{AnchorPoint, Rectangle};

/// A committed placement.
#[derive(Debug, Clone)]
pub struct PlacementEvent {
    /// The rectangle with its final position and orientation.
    pub rect: Rectangle,
    /// Where it was anchored.
    pub anchor: AnchorPoint,
    /// Whether it was placed by the forced-move shortcut.
    pub forced: bool,
    /// Rectangles still waiting.
    pub remaining: usize,
}

/// Receives placement events.
pub trait PlacementObserver {
    /// Called after a placement has been committed and the skyline repaired.
    fn on_placement(&mut self, event: &PlacementEvent);
}

/// Collects every event; handy for tests and replay.
#[derive(Debug, Default)]
pub struct PlacementLog {
    /// Events in commit order.
    pub events: Vec<PlacementEvent>,
}

impl PlacementObserver for PlacementLog {
    fn on_placement(&mut self, event: &PlacementEvent) {
        self.events.push(event.clone());
    }
}

use tracing::{debug, info};

use crate::events::InventoryEvent;

/// Trait for inventory change observation
pub trait InventoryObserver {
    /// Called after a mutation has been applied
    fn on_event(&self, event: &InventoryEvent);
}

/// Logs every mutation at debug level
#[derive(Debug)]
pub struct TransitionLogger;

impl InventoryObserver for TransitionLogger {
    fn on_event(&self, event: &InventoryEvent) {
        debug!(?event, "inventory changed");
    }
}

/// Announces when a title runs out or comes back on the shelf
#[derive(Debug)]
pub struct AvailabilityNotifier;

impl InventoryObserver for AvailabilityNotifier {
    fn on_event(&self, event: &InventoryEvent) {
        match event {
            InventoryEvent::CheckedOut { isbn, counts } if counts.available() == 0 => {
                info!(isbn = %isbn, "last available copy checked out");
            }
            InventoryEvent::Returned { isbn, counts } if counts.available() == 1 => {
                info!(isbn = %isbn, "title is available again");
            }
            _ => {}
        }
    }
}

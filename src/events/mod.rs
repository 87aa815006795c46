use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

// Define the various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Transfer events
    TransferCreated {
        transfer_id: Uuid,
        transfer_number: String,
        from_store_id: String,
        to_store_id: String,
        item_count: usize,
    },
    TransferStatusChanged {
        transfer_id: Uuid,
        old_status: String,
        new_status: String,
    },
    TransferSettled {
        transfer_id: Uuid,
        items_settled: usize,
        items_failed: usize,
    },
    TransferDeleted(Uuid),

    // Inventory events
    InventoryCreated {
        inventory_id: Uuid,
        store_id: String,
        item_num: String,
    },
    InventoryUpdated(Uuid),
    InventorySoftDeleted(Uuid),
    StockAdjusted {
        store_id: String,
        item_num: String,
        quantity_change: Decimal,
        new_stock: Decimal,
    },

    // Ledger events
    ChangeRecorded {
        change_id: Uuid,
        store_id: String,
        change_type: String,
    },

    // Store events
    StoreCreated(String),
}

/// Consumes domain events off the channel. Settlement failures surface here
/// as warnings so operators can reconcile stock by hand.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = receiver.recv().await {
        match event {
            Event::TransferCreated {
                transfer_id,
                ref transfer_number,
                ref from_store_id,
                ref to_store_id,
                item_count,
            } => {
                info!(
                    "Transfer {} ({}) created: {} -> {} with {} items",
                    transfer_id, transfer_number, from_store_id, to_store_id, item_count
                );
            }
            Event::TransferStatusChanged {
                transfer_id,
                ref old_status,
                ref new_status,
            } => {
                info!(
                    "Transfer {} status changed from '{}' to '{}'",
                    transfer_id, old_status, new_status
                );
            }
            Event::TransferSettled {
                transfer_id,
                items_settled,
                items_failed,
            } => {
                if items_failed > 0 {
                    warn!(
                        "Transfer {} settled with failures: {} ok, {} failed (manual reconciliation required)",
                        transfer_id, items_settled, items_failed
                    );
                } else {
                    info!(
                        "Transfer {} fully settled ({} items)",
                        transfer_id, items_settled
                    );
                }
            }
            Event::TransferDeleted(transfer_id) => {
                info!("Transfer {} deleted", transfer_id);
            }
            Event::InventoryCreated {
                inventory_id,
                ref store_id,
                ref item_num,
            } => {
                info!(
                    "Inventory record {} created for item {} at store {}",
                    inventory_id, item_num, store_id
                );
            }
            Event::StockAdjusted {
                ref store_id,
                ref item_num,
                quantity_change,
                new_stock,
            } => {
                info!(
                    "Stock adjusted at {}: item {} by {} to {}",
                    store_id, item_num, quantity_change, new_stock
                );
                if new_stock < Decimal::ZERO {
                    warn!(
                        "Negative stock at {}: item {} now at {}",
                        store_id, item_num, new_stock
                    );
                }
            }
            _ => {
                info!("No specific handler for event: {:?}", event);
            }
        }
    }

    warn!("Event processing loop has ended");
}

/// Builds a connected sender/processor pair; the caller spawns the returned
/// future.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

/// Domain events emitted after a lifecycle or sale operation commits.
///
/// Events are strictly post-commit notifications: a failed send is logged and
/// never fails the already-committed operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Inventory events
    ItemCreated {
        item_id: Uuid,
        owner_id: Uuid,
    },
    StockMerged {
        item_id: Uuid,
        owner_id: Uuid,
        quantity_added: Decimal,
        new_quantity: Decimal,
        new_unit_cost: Decimal,
    },
    ItemUpdated {
        item_id: Uuid,
    },
    ItemDeleted {
        item_id: Uuid,
    },

    // Sale events
    SaleRecorded {
        sale_id: Uuid,
        item_id: Uuid,
        profit: Decimal,
    },
    SaleDeleted {
        sale_id: Uuid,
        restocked: bool,
    },
}

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
            .map_err(|e| format!("Failed to send event: {e}"))
    }
}

/// Drains the event channel, logging each event. Spawn this alongside the
/// application; it exits when every sender has been dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::ItemCreated { item_id, owner_id } => {
                info!(%item_id, %owner_id, "inventory item created");
            }
            Event::StockMerged {
                item_id,
                new_quantity,
                new_unit_cost,
                ..
            } => {
                info!(%item_id, %new_quantity, %new_unit_cost, "stock batch merged");
            }
            Event::ItemUpdated { item_id } => {
                info!(%item_id, "inventory item updated");
            }
            Event::ItemDeleted { item_id } => {
                info!(%item_id, "inventory item deleted");
            }
            Event::SaleRecorded {
                sale_id,
                item_id,
                profit,
            } => {
                info!(%sale_id, %item_id, %profit, "sale recorded");
            }
            Event::SaleDeleted { sale_id, restocked } => {
                info!(%sale_id, restocked, "sale deleted");
            }
        }
    }
    info!("event channel closed, stopping event processor");
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn send_delivers_to_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);

        let item_id = Uuid::new_v4();
        sender
            .send(Event::SaleRecorded {
                sale_id: Uuid::new_v4(),
                item_id,
                profit: dec!(25),
            })
            .await
            .unwrap();

        match rx.recv().await {
            Some(Event::SaleRecorded { item_id: got, .. }) => assert_eq!(got, item_id),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn events_round_trip_through_json() {
        let event = Event::StockMerged {
            item_id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            quantity_added: dec!(5),
            new_quantity: dec!(15),
            new_unit_cost: dec!(110),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        match back {
            Event::StockMerged { new_unit_cost, .. } => assert_eq!(new_unit_cost, dec!(110)),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn send_fails_once_receiver_is_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        let result = sender
            .send(Event::ItemDeleted {
                item_id: Uuid::new_v4(),
            })
            .await;
        assert!(result.is_err());
    }
}

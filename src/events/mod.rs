use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

/// Domain events emitted after an atomic unit commits. Consumers are
/// in-process; a failed send never unwinds the committed transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderCreated {
        order_id: Uuid,
        reference_number: String,
    },
    OrderUpdated(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },
    QuoteConverted {
        quote_id: Uuid,
        sales_order_id: Uuid,
    },
    StockAdjusted {
        product_id: Uuid,
        movement_id: i64,
        quantity: Decimal,
        new_stock: Decimal,
    },
    StockBelowMinimum {
        product_id: Uuid,
        stock_on_hand: Decimal,
        minimum_stock: Decimal,
    },
    FinancialTransactionRecorded {
        transaction_id: Uuid,
        amount: Decimal,
    },
    VoucherSettled {
        voucher_id: Uuid,
        transaction_id: Uuid,
        settled_at: DateTime<Utc>,
    },
    PaymentSchedulesGenerated {
        order_id: Uuid,
        installments: usize,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Creates a bounded event channel.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}

/// Drains events, logging each. The server runs this on a background task;
/// tests usually keep the receiver alive and ignore it.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        info!(?event, "domain event");
    }
}

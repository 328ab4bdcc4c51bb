pub mod catalog;
pub mod finance;
pub mod inventory;
pub mod ledger;
pub mod order_workflow;
pub mod orders;
pub mod payment_schedules;
pub mod reports;

use std::sync::Arc;

use crate::{db::DbPool, events::EventSender};

/// All services, constructed once at startup and shared through AppState.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<catalog::CatalogService>,
    pub ledger: Arc<ledger::LedgerService>,
    pub inventory: Arc<inventory::InventoryService>,
    pub orders: Arc<orders::OrderService>,
    pub workflow: Arc<order_workflow::OrderWorkflowService>,
    pub finance: Arc<finance::FinanceService>,
    pub payment_schedules: Arc<payment_schedules::PaymentScheduleService>,
    pub reports: Arc<reports::ReportService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            catalog: Arc::new(catalog::CatalogService::new(db.clone())),
            ledger: Arc::new(ledger::LedgerService::new(db.clone())),
            inventory: Arc::new(inventory::InventoryService::new(
                db.clone(),
                event_sender.clone(),
            )),
            orders: Arc::new(orders::OrderService::new(db.clone(), event_sender.clone())),
            workflow: Arc::new(order_workflow::OrderWorkflowService::new(
                db.clone(),
                event_sender.clone(),
            )),
            finance: Arc::new(finance::FinanceService::new(
                db.clone(),
                event_sender.clone(),
            )),
            payment_schedules: Arc::new(payment_schedules::PaymentScheduleService::new(
                db.clone(),
                event_sender,
            )),
            reports: Arc::new(reports::ReportService::new(db)),
        }
    }
}

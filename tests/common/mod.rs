#![allow(dead_code)]

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tradeforge_api::{
    db::{self, DbPool},
    entities::{
        party::{self, PartyKind},
        product,
        stock_movement::MovementType,
    },
    events::{self, Event},
    services::{
        catalog::{CreatePartyRequest, CreateProductRequest},
        inventory::AdjustStockRequest,
        AppServices,
    },
};
use uuid::Uuid;

/// A fully wired service stack over a fresh named in-memory SQLite
/// database. The event receiver is kept alive so service event sends
/// never fail.
pub struct TestApp {
    pub db: Arc<DbPool>,
    pub services: AppServices,
    _events: mpsc::Receiver<Event>,
}

pub async fn spawn_app() -> TestApp {
    // A unique name per test keeps shared-cache connections within one
    // test wired to the same database while isolating tests from each
    // other.
    let url = format!("sqlite:file:{}?mode=memory&cache=shared", Uuid::new_v4());
    let db = db::establish_connection(&url)
        .await
        .expect("failed to open test database");
    db::run_migrations(&db)
        .await
        .expect("failed to run migrations");
    let db = Arc::new(db);

    let (event_sender, events) = events::channel(1024);
    let services = AppServices::new(db.clone(), event_sender);

    TestApp {
        db,
        services,
        _events: events,
    }
}

pub fn actor() -> Uuid {
    Uuid::new_v4()
}

pub async fn seed_product(
    app: &TestApp,
    sku: &str,
    unit_price: Decimal,
    initial_stock: Decimal,
) -> product::Model {
    let product = app
        .services
        .catalog
        .create_product(CreateProductRequest {
            sku: sku.to_string(),
            name: format!("{sku} test product"),
            unit: "pcs".to_string(),
            unit_price,
            minimum_stock: Decimal::ZERO,
            reorder_quantity: Decimal::ZERO,
            track_stock: true,
        })
        .await
        .expect("failed to create product");

    if initial_stock > Decimal::ZERO {
        app.services
            .inventory
            .adjust(
                AdjustStockRequest {
                    product_id: product.id,
                    movement_type: MovementType::AdjustmentIn,
                    quantity: initial_stock,
                    unit_price: None,
                    order_id: None,
                    location: None,
                    remarks: Some("initial stock".to_string()),
                },
                actor(),
            )
            .await
            .expect("failed to seed stock");
    }

    app.services
        .inventory
        .stock_level(product.id)
        .await
        .expect("failed to reload product")
}

pub async fn seed_party(app: &TestApp, name: &str, kind: PartyKind) -> party::Model {
    app.services
        .catalog
        .create_party(CreatePartyRequest {
            name: name.to_string(),
            kind,
            email: None,
            phone: None,
            address: None,
        })
        .await
        .expect("failed to create party")
}

pub async fn seed_customer(app: &TestApp, name: &str) -> party::Model {
    seed_party(app, name, PartyKind::Customer).await
}

pub async fn seed_supplier(app: &TestApp, name: &str) -> party::Model {
    seed_party(app, name, PartyKind::Supplier).await
}

mod common;

use assert_matches::assert_matches;
use chrono::{Datelike, Utc};
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use tradeforge_api::{
    entities::{
        order::{OrderStatus, OrderType},
        stock_movement::{self, Entity as StockMovement, MovementType},
    },
    errors::ServiceError,
    services::orders::{CreateOrderRequest, OrderLineRequest, UpdateOrderRequest},
};
use uuid::Uuid;

use common::{actor, seed_customer, seed_product, seed_supplier, spawn_app};

fn line(product_id: Uuid, quantity: rust_decimal::Decimal) -> OrderLineRequest {
    OrderLineRequest {
        product_id,
        quantity,
        unit_price: None,
        discount_percent: dec!(0),
        tax_percent: dec!(0),
        description: None,
    }
}

fn order_request(
    order_type: OrderType,
    party_id: Uuid,
    lines: Vec<OrderLineRequest>,
) -> CreateOrderRequest {
    CreateOrderRequest {
        order_type,
        party_id,
        order_date: None,
        expected_date: None,
        discount_percent: dec!(0),
        tax_percent: dec!(0),
        notes: None,
        lines,
    }
}

async fn order_movements(app: &common::TestApp, order_id: Uuid) -> Vec<stock_movement::Model> {
    StockMovement::find()
        .filter(stock_movement::Column::OrderId.eq(order_id))
        .all(app.db.as_ref())
        .await
        .expect("failed to load movements")
}

#[tokio::test]
async fn totals_are_recomputed_server_side() {
    let app = spawn_app().await;
    let customer = seed_customer(&app, "Acme Retail").await;
    let widget = seed_product(&app, "W-100", dec!(100.00), dec!(0)).await;
    let gadget = seed_product(&app, "G-50", dec!(50.00), dec!(0)).await;

    let order = app
        .services
        .orders
        .create_order(
            CreateOrderRequest {
                order_type: OrderType::SalesOrder,
                party_id: customer.id,
                order_date: None,
                expected_date: None,
                discount_percent: dec!(5),
                tax_percent: dec!(19),
                notes: None,
                lines: vec![
                    OrderLineRequest {
                        product_id: widget.id,
                        quantity: dec!(2),
                        unit_price: Some(dec!(100)),
                        discount_percent: dec!(0),
                        tax_percent: dec!(0),
                        description: None,
                    },
                    OrderLineRequest {
                        product_id: gadget.id,
                        quantity: dec!(1),
                        unit_price: Some(dec!(50)),
                        discount_percent: dec!(10),
                        tax_percent: dec!(0),
                        description: None,
                    },
                ],
            },
            actor(),
        )
        .await
        .expect("order creation failed");

    assert_eq!(order.subtotal, dec!(245.00));
    assert_eq!(order.discount_amount, dec!(12.25));
    assert_eq!(order.tax_amount, dec!(44.22));
    assert_eq!(order.total_amount, dec!(276.97));
    assert_eq!(order.status, OrderStatus::Draft);
    assert_eq!(order.lines.len(), 2);
    assert_eq!(order.lines[0].line_total, dec!(200.00));
    assert_eq!(order.lines[1].line_total, dec!(45.00));
}

#[tokio::test]
async fn reference_numbers_are_monotonic_per_type() {
    let app = spawn_app().await;
    let customer = seed_customer(&app, "Acme Retail").await;
    let supplier = seed_supplier(&app, "Steelworks GmbH").await;
    let product = seed_product(&app, "W-101", dec!(10.00), dec!(0)).await;
    let year = Utc::now().year();

    let so1 = app
        .services
        .orders
        .create_order(
            order_request(OrderType::SalesOrder, customer.id, vec![line(product.id, dec!(1))]),
            actor(),
        )
        .await
        .unwrap();
    let so2 = app
        .services
        .orders
        .create_order(
            order_request(OrderType::SalesOrder, customer.id, vec![line(product.id, dec!(1))]),
            actor(),
        )
        .await
        .unwrap();
    let po1 = app
        .services
        .orders
        .create_order(
            order_request(OrderType::PurchaseOrder, supplier.id, vec![line(product.id, dec!(1))]),
            actor(),
        )
        .await
        .unwrap();

    assert_eq!(so1.reference_number, format!("SO-{year}-0001"));
    assert_eq!(so2.reference_number, format!("SO-{year}-0002"));
    // Purchase orders count independently.
    assert_eq!(po1.reference_number, format!("PO-{year}-0001"));
}

#[tokio::test]
async fn purchase_receipt_adds_stock_one_movement_per_line() {
    let app = spawn_app().await;
    let supplier = seed_supplier(&app, "Steelworks GmbH").await;
    let bolts = seed_product(&app, "BOLT-M8", dec!(0.20), dec!(0)).await;
    let nuts = seed_product(&app, "NUT-M8", dec!(0.10), dec!(0)).await;

    let po = app
        .services
        .orders
        .create_order(
            order_request(
                OrderType::PurchaseOrder,
                supplier.id,
                vec![line(bolts.id, dec!(500)), line(nuts.id, dec!(800))],
            ),
            actor(),
        )
        .await
        .unwrap();

    app.services
        .workflow
        .transition(po.id, OrderStatus::Pending, actor())
        .await
        .unwrap();
    let received = app
        .services
        .workflow
        .transition(po.id, OrderStatus::Received, actor())
        .await
        .unwrap();
    assert_eq!(received.status, OrderStatus::Received);

    assert_eq!(
        app.services.ledger.current_stock(bolts.id).await.unwrap(),
        dec!(500)
    );
    assert_eq!(
        app.services.ledger.current_stock(nuts.id).await.unwrap(),
        dec!(800)
    );

    let movements = order_movements(&app, po.id).await;
    assert_eq!(movements.len(), 2);
    assert!(movements
        .iter()
        .all(|m| m.movement_type == MovementType::Purchase && m.quantity > dec!(0)));

    // The follow-on administrative state moves no further stock.
    app.services
        .workflow
        .transition(po.id, OrderStatus::Completed, actor())
        .await
        .unwrap();
    assert_eq!(order_movements(&app, po.id).await.len(), 2);
}

#[tokio::test]
async fn sales_shipment_consumes_stock_once() {
    let app = spawn_app().await;
    let customer = seed_customer(&app, "Acme Retail").await;
    let widget = seed_product(&app, "W-102", dec!(40.00), dec!(12)).await;

    let so = app
        .services
        .orders
        .create_order(
            order_request(OrderType::SalesOrder, customer.id, vec![line(widget.id, dec!(5))]),
            actor(),
        )
        .await
        .unwrap();

    for status in [OrderStatus::Pending, OrderStatus::Confirmed, OrderStatus::Shipped] {
        app.services
            .workflow
            .transition(so.id, status, actor())
            .await
            .unwrap();
    }

    assert_eq!(
        app.services.ledger.current_stock(widget.id).await.unwrap(),
        dec!(7)
    );
    let movements = order_movements(&app, so.id).await;
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].movement_type, MovementType::Sale);
    assert_eq!(movements[0].quantity, dec!(-5));
    assert_eq!(movements[0].quantity_before, dec!(12));
    assert_eq!(movements[0].quantity_after, dec!(7));

    // delivered is administrative
    app.services
        .workflow
        .transition(so.id, OrderStatus::Delivered, actor())
        .await
        .unwrap();
    assert_eq!(order_movements(&app, so.id).await.len(), 1);
    assert_eq!(
        app.services.ledger.current_stock(widget.id).await.unwrap(),
        dec!(7)
    );
}

#[tokio::test]
async fn failing_line_aborts_the_whole_shipment() {
    let app = spawn_app().await;
    let customer = seed_customer(&app, "Acme Retail").await;
    let plenty = seed_product(&app, "W-103", dec!(10.00), dec!(100)).await;
    let some = seed_product(&app, "W-104", dec!(10.00), dec!(50)).await;
    let scarce = seed_product(&app, "W-105", dec!(10.00), dec!(2)).await;

    let so = app
        .services
        .orders
        .create_order(
            order_request(
                OrderType::SalesOrder,
                customer.id,
                vec![
                    line(plenty.id, dec!(10)),
                    line(some.id, dec!(5)),
                    line(scarce.id, dec!(5)), // more than available
                ],
            ),
            actor(),
        )
        .await
        .unwrap();

    app.services
        .workflow
        .transition(so.id, OrderStatus::Pending, actor())
        .await
        .unwrap();
    app.services
        .workflow
        .transition(so.id, OrderStatus::Confirmed, actor())
        .await
        .unwrap();

    let err = app
        .services
        .workflow
        .transition(so.id, OrderStatus::Shipped, actor())
        .await
        .expect_err("shipment should have failed");
    assert_matches!(err, ServiceError::InsufficientStock(_));

    // Nothing moved: not the two lines that would have succeeded, not the
    // status.
    assert_eq!(
        app.services.ledger.current_stock(plenty.id).await.unwrap(),
        dec!(100)
    );
    assert_eq!(
        app.services.ledger.current_stock(some.id).await.unwrap(),
        dec!(50)
    );
    assert_eq!(
        app.services.ledger.current_stock(scarce.id).await.unwrap(),
        dec!(2)
    );
    assert!(order_movements(&app, so.id).await.is_empty());

    let reloaded = app.services.orders.get_order(so.id).await.unwrap();
    assert_eq!(reloaded.status, OrderStatus::Confirmed);
}

#[tokio::test]
async fn illegal_transitions_are_rejected() {
    let app = spawn_app().await;
    let customer = seed_customer(&app, "Acme Retail").await;
    let product = seed_product(&app, "W-106", dec!(10.00), dec!(10)).await;

    let so = app
        .services
        .orders
        .create_order(
            order_request(OrderType::SalesOrder, customer.id, vec![line(product.id, dec!(1))]),
            actor(),
        )
        .await
        .unwrap();

    // draft cannot jump straight to shipped
    let err = app
        .services
        .workflow
        .transition(so.id, OrderStatus::Shipped, actor())
        .await
        .expect_err("transition should have failed");
    assert_matches!(err, ServiceError::InvalidTransition(_));

    let reloaded = app.services.orders.get_order(so.id).await.unwrap();
    assert_eq!(reloaded.status, OrderStatus::Draft);
}

#[tokio::test]
async fn cancellation_blocked_once_fulfilled() {
    let app = spawn_app().await;
    let customer = seed_customer(&app, "Acme Retail").await;
    let product = seed_product(&app, "W-107", dec!(10.00), dec!(10)).await;

    // A draft order cancels fine.
    let draft = app
        .services
        .orders
        .create_order(
            order_request(OrderType::SalesOrder, customer.id, vec![line(product.id, dec!(1))]),
            actor(),
        )
        .await
        .unwrap();
    let cancelled = app.services.workflow.cancel(draft.id, actor()).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    // A shipped order does not.
    let shipped = app
        .services
        .orders
        .create_order(
            order_request(OrderType::SalesOrder, customer.id, vec![line(product.id, dec!(2))]),
            actor(),
        )
        .await
        .unwrap();
    for status in [OrderStatus::Pending, OrderStatus::Confirmed, OrderStatus::Shipped] {
        app.services
            .workflow
            .transition(shipped.id, status, actor())
            .await
            .unwrap();
    }
    let err = app
        .services
        .workflow
        .cancel(shipped.id, actor())
        .await
        .expect_err("cancel should have failed");
    assert_matches!(err, ServiceError::InvalidTransition(_));
}

#[tokio::test]
async fn updates_are_rejected_after_fulfillment_starts() {
    let app = spawn_app().await;
    let customer = seed_customer(&app, "Acme Retail").await;
    let product = seed_product(&app, "W-108", dec!(10.00), dec!(10)).await;

    let so = app
        .services
        .orders
        .create_order(
            order_request(OrderType::SalesOrder, customer.id, vec![line(product.id, dec!(1))]),
            actor(),
        )
        .await
        .unwrap();

    // Still editable in pending; totals recompute from the new lines.
    app.services
        .workflow
        .transition(so.id, OrderStatus::Pending, actor())
        .await
        .unwrap();
    let updated = app
        .services
        .orders
        .update_order(
            so.id,
            UpdateOrderRequest {
                expected_date: None,
                discount_percent: None,
                tax_percent: None,
                notes: None,
                lines: Some(vec![line(product.id, dec!(3))]),
            },
            actor(),
        )
        .await
        .unwrap();
    assert_eq!(updated.subtotal, dec!(30.00));
    assert_eq!(updated.total_amount, dec!(30.00));

    app.services
        .workflow
        .transition(so.id, OrderStatus::Confirmed, actor())
        .await
        .unwrap();
    let err = app
        .services
        .orders
        .update_order(
            so.id,
            UpdateOrderRequest {
                expected_date: None,
                discount_percent: None,
                tax_percent: None,
                notes: Some("too late".to_string()),
                lines: None,
            },
            actor(),
        )
        .await
        .expect_err("update should have failed");
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn approved_quote_converts_into_draft_sales_order() {
    let app = spawn_app().await;
    let customer = seed_customer(&app, "Acme Retail").await;
    let product = seed_product(&app, "W-109", dec!(75.00), dec!(0)).await;

    let quote = app
        .services
        .orders
        .create_order(
            order_request(OrderType::Quote, customer.id, vec![line(product.id, dec!(4))]),
            actor(),
        )
        .await
        .unwrap();

    app.services
        .workflow
        .transition(quote.id, OrderStatus::Pending, actor())
        .await
        .unwrap();
    app.services
        .workflow
        .transition(quote.id, OrderStatus::Approved, actor())
        .await
        .unwrap();

    let so = app
        .services
        .workflow
        .convert_quote(quote.id, actor())
        .await
        .expect("conversion failed");

    assert_eq!(so.order_type, OrderType::SalesOrder);
    assert_eq!(so.status, OrderStatus::Draft);
    assert_eq!(so.quote_id, Some(quote.id));
    assert_eq!(so.total_amount, quote.total_amount);
    assert_eq!(so.lines.len(), 1);
    assert_eq!(so.lines[0].quantity, dec!(4));
    assert!(so.reference_number.starts_with("SO-"));

    let reloaded_quote = app.services.orders.get_order(quote.id).await.unwrap();
    assert_eq!(reloaded_quote.status, OrderStatus::Converted);
    assert_eq!(reloaded_quote.converted_order_id, Some(so.id));

    // A converted quote cannot convert twice.
    let err = app
        .services
        .workflow
        .convert_quote(quote.id, actor())
        .await
        .expect_err("second conversion should have failed");
    assert_matches!(err, ServiceError::InvalidTransition(_));
}

#[tokio::test]
async fn unapproved_quote_cannot_convert() {
    let app = spawn_app().await;
    let customer = seed_customer(&app, "Acme Retail").await;
    let product = seed_product(&app, "W-110", dec!(75.00), dec!(0)).await;

    let quote = app
        .services
        .orders
        .create_order(
            order_request(OrderType::Quote, customer.id, vec![line(product.id, dec!(1))]),
            actor(),
        )
        .await
        .unwrap();

    let err = app
        .services
        .workflow
        .convert_quote(quote.id, actor())
        .await
        .expect_err("conversion should have failed");
    assert_matches!(err, ServiceError::InvalidTransition(_));

    // And a sales order is not a quote.
    let so = app
        .services
        .orders
        .create_order(
            order_request(OrderType::SalesOrder, customer.id, vec![line(product.id, dec!(1))]),
            actor(),
        )
        .await
        .unwrap();
    let err = app
        .services
        .workflow
        .convert_quote(so.id, actor())
        .await
        .expect_err("conversion should have failed");
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn order_requires_matching_counterparty_kind() {
    let app = spawn_app().await;
    let supplier = seed_supplier(&app, "Steelworks GmbH").await;
    let product = seed_product(&app, "W-111", dec!(10.00), dec!(0)).await;

    // Sales order against a supplier is rejected.
    let err = app
        .services
        .orders
        .create_order(
            order_request(OrderType::SalesOrder, supplier.id, vec![line(product.id, dec!(1))]),
            actor(),
        )
        .await
        .expect_err("creation should have failed");
    assert_matches!(err, ServiceError::ValidationError(_));

    // Unknown counterparty is NotFound.
    let err = app
        .services
        .orders
        .create_order(
            order_request(OrderType::SalesOrder, Uuid::new_v4(), vec![line(product.id, dec!(1))]),
            actor(),
        )
        .await
        .expect_err("creation should have failed");
    assert_matches!(err, ServiceError::NotFound(_));
}

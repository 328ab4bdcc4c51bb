mod common;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use tradeforge_api::{
    entities::{
        financial_transaction::{self, Entity as FinancialTransaction, TransactionKind},
        order::OrderType,
        payment_schedule::ScheduleStatus,
        voucher::{VoucherKind, VoucherStatus},
    },
    errors::ServiceError,
    services::{
        finance::{CreateVoucherRequest, RecordTransactionRequest, SettleVoucherRequest},
        orders::{CreateOrderRequest, OrderLineRequest},
        payment_schedules::{ApplyScheduleRequest, CreateModelRequest, TermRequest},
    },
};
use uuid::Uuid;

use common::{actor, seed_customer, seed_product, seed_supplier, spawn_app};

async fn voucher_transaction_count(app: &common::TestApp, voucher_id: Uuid) -> u64 {
    FinancialTransaction::find()
        .filter(financial_transaction::Column::VoucherId.eq(voucher_id))
        .count(app.db.as_ref())
        .await
        .expect("failed to count transactions")
}

#[tokio::test]
async fn settling_a_receipt_voucher_records_income() {
    let app = spawn_app().await;
    let customer = seed_customer(&app, "Acme Retail").await;

    let voucher = app
        .services
        .finance
        .create_voucher(
            CreateVoucherRequest {
                kind: VoucherKind::Receipt,
                party_id: customer.id,
                amount: dec!(500.00),
                issued_date: None,
                notes: None,
            },
            actor(),
        )
        .await
        .unwrap();
    assert_eq!(voucher.status, VoucherStatus::Pending);

    let settlement = app
        .services
        .finance
        .settle_voucher(
            voucher.id,
            SettleVoucherRequest {
                amount: dec!(500.00),
                settled_date: None,
                method: Some("bank_transfer".to_string()),
            },
            actor(),
        )
        .await
        .expect("settlement failed");

    assert_eq!(settlement.voucher.status, VoucherStatus::Settled);
    assert_eq!(settlement.voucher.settled_amount, Some(dec!(500.00)));
    assert_eq!(settlement.transaction.kind, TransactionKind::Income);
    assert_eq!(settlement.transaction.amount, dec!(500.00));
    assert_eq!(settlement.transaction.voucher_id, Some(voucher.id));
    assert_eq!(voucher_transaction_count(&app, voucher.id).await, 1);
}

#[tokio::test]
async fn settling_a_payment_voucher_records_expense() {
    let app = spawn_app().await;
    let supplier = seed_supplier(&app, "Steelworks GmbH").await;

    let voucher = app
        .services
        .finance
        .create_voucher(
            CreateVoucherRequest {
                kind: VoucherKind::Payment,
                party_id: supplier.id,
                amount: dec!(1250.00),
                issued_date: None,
                notes: None,
            },
            actor(),
        )
        .await
        .unwrap();

    let settlement = app
        .services
        .finance
        .settle_voucher(
            voucher.id,
            SettleVoucherRequest {
                amount: dec!(1250.00),
                settled_date: None,
                method: None,
            },
            actor(),
        )
        .await
        .unwrap();
    assert_eq!(settlement.transaction.kind, TransactionKind::Expense);
}

#[tokio::test]
async fn a_voucher_settles_exactly_once() {
    let app = spawn_app().await;
    let customer = seed_customer(&app, "Acme Retail").await;

    let voucher = app
        .services
        .finance
        .create_voucher(
            CreateVoucherRequest {
                kind: VoucherKind::Receipt,
                party_id: customer.id,
                amount: dec!(300.00),
                issued_date: None,
                notes: None,
            },
            actor(),
        )
        .await
        .unwrap();

    app.services
        .finance
        .settle_voucher(
            voucher.id,
            SettleVoucherRequest {
                amount: dec!(300.00),
                settled_date: None,
                method: None,
            },
            actor(),
        )
        .await
        .unwrap();

    let err = app
        .services
        .finance
        .settle_voucher(
            voucher.id,
            SettleVoucherRequest {
                amount: dec!(300.00),
                settled_date: None,
                method: None,
            },
            actor(),
        )
        .await
        .expect_err("second settlement should have failed");
    assert_matches!(err, ServiceError::AlreadySettled(_));

    // No second transaction appeared.
    assert_eq!(voucher_transaction_count(&app, voucher.id).await, 1);
}

#[tokio::test]
async fn settling_an_unknown_voucher_is_not_found() {
    let app = spawn_app().await;
    let err = app
        .services
        .finance
        .settle_voucher(
            Uuid::new_v4(),
            SettleVoucherRequest {
                amount: dec!(10.00),
                settled_date: None,
                method: None,
            },
            actor(),
        )
        .await
        .expect_err("settlement should have failed");
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn recorded_transactions_require_valid_references() {
    let app = spawn_app().await;

    let err = app
        .services
        .finance
        .record(
            RecordTransactionRequest {
                kind: TransactionKind::Expense,
                category: "office".to_string(),
                subcategory: None,
                amount: dec!(42.00),
                transaction_date: None,
                party_id: Some(Uuid::new_v4()),
                order_id: None,
                payment_method: None,
                remarks: None,
                tags: None,
            },
            actor(),
        )
        .await
        .expect_err("record should have failed");
    assert_matches!(err, ServiceError::NotFound(_));

    let err = app
        .services
        .finance
        .record(
            RecordTransactionRequest {
                kind: TransactionKind::Income,
                category: "misc".to_string(),
                subcategory: None,
                amount: dec!(-5.00),
                transaction_date: None,
                party_id: None,
                order_id: None,
                payment_method: None,
                remarks: None,
                tags: None,
            },
            actor(),
        )
        .await
        .expect_err("record should have failed");
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn finance_summary_derives_from_the_ledger() {
    let app = spawn_app().await;

    for (kind, category, amount) in [
        (TransactionKind::Income, "sales", dec!(1000.00)),
        (TransactionKind::Income, "sales", dec!(250.00)),
        (TransactionKind::Expense, "rent", dec!(400.00)),
    ] {
        app.services
            .finance
            .record(
                RecordTransactionRequest {
                    kind,
                    category: category.to_string(),
                    subcategory: None,
                    amount,
                    transaction_date: None,
                    party_id: None,
                    order_id: None,
                    payment_method: None,
                    remarks: None,
                    tags: None,
                },
                actor(),
            )
            .await
            .unwrap();
    }

    let summary = app
        .services
        .reports
        .finance_summary(None, None)
        .await
        .unwrap();
    assert_eq!(summary.income, dec!(1250.00));
    assert_eq!(summary.expense, dec!(400.00));
    assert_eq!(summary.net, dec!(850.00));
}

async fn order_with_total_1000(app: &common::TestApp) -> Uuid {
    let customer = seed_customer(app, "Acme Retail").await;
    let product = seed_product(app, "MACHINE-1K", dec!(1000.00), dec!(0)).await;
    app.services
        .orders
        .create_order(
            CreateOrderRequest {
                order_type: OrderType::SalesOrder,
                party_id: customer.id,
                order_date: None,
                expected_date: None,
                discount_percent: dec!(0),
                tax_percent: dec!(0),
                notes: None,
                lines: vec![OrderLineRequest {
                    product_id: product.id,
                    quantity: dec!(1),
                    unit_price: None,
                    discount_percent: dec!(0),
                    tax_percent: dec!(0),
                    description: None,
                }],
            },
            actor(),
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn applying_a_model_generates_dated_installments() {
    let app = spawn_app().await;
    let order_id = order_with_total_1000(&app).await;

    let model = app
        .services
        .payment_schedules
        .create_model(
            CreateModelRequest {
                name: "30/70 net 30".to_string(),
                description: None,
                terms: vec![
                    TermRequest {
                        day_offset: 0,
                        percentage: dec!(30),
                        description: Some("deposit".to_string()),
                    },
                    TermRequest {
                        day_offset: 30,
                        percentage: dec!(70),
                        description: Some("balance".to_string()),
                    },
                ],
            },
            actor(),
        )
        .await
        .unwrap();

    let installments = app
        .services
        .payment_schedules
        .apply_schedule(
            ApplyScheduleRequest {
                order_id,
                model_id: model.model.id,
                start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            },
            actor(),
        )
        .await
        .expect("schedule application failed");

    assert_eq!(installments.len(), 2);
    assert_eq!(
        installments[0].due_date,
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    );
    assert_eq!(installments[0].amount, dec!(300.00));
    assert_eq!(
        installments[1].due_date,
        NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
    );
    assert_eq!(installments[1].amount, dec!(700.00));
    assert!(installments
        .iter()
        .all(|i| i.status == ScheduleStatus::Pending));
}

#[tokio::test]
async fn applying_an_unknown_model_writes_nothing() {
    let app = spawn_app().await;
    let order_id = order_with_total_1000(&app).await;

    let err = app
        .services
        .payment_schedules
        .apply_schedule(
            ApplyScheduleRequest {
                order_id,
                model_id: Uuid::new_v4(),
                start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            },
            actor(),
        )
        .await
        .expect_err("application should have failed");
    assert_matches!(err, ServiceError::NotFound(_));

    let installments = app
        .services
        .payment_schedules
        .list_for_order(order_id)
        .await
        .unwrap();
    assert!(installments.is_empty());
}

#[tokio::test]
async fn term_percentages_need_not_sum_to_100() {
    let app = spawn_app().await;

    // A deposit-only model is accepted (logged, not rejected).
    let model = app
        .services
        .payment_schedules
        .create_model(
            CreateModelRequest {
                name: "deposit only".to_string(),
                description: None,
                terms: vec![TermRequest {
                    day_offset: 0,
                    percentage: dec!(30),
                    description: None,
                }],
            },
            actor(),
        )
        .await
        .expect("model creation failed");
    assert_eq!(model.terms.len(), 1);
}

#[tokio::test]
async fn a_paid_installment_is_terminal() {
    let app = spawn_app().await;
    let order_id = order_with_total_1000(&app).await;

    let model = app
        .services
        .payment_schedules
        .create_model(
            CreateModelRequest {
                name: "single".to_string(),
                description: None,
                terms: vec![TermRequest {
                    day_offset: 0,
                    percentage: dec!(100),
                    description: None,
                }],
            },
            actor(),
        )
        .await
        .unwrap();

    let installments = app
        .services
        .payment_schedules
        .apply_schedule(
            ApplyScheduleRequest {
                order_id,
                model_id: model.model.id,
                start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            },
            actor(),
        )
        .await
        .unwrap();

    let paid = app
        .services
        .payment_schedules
        .update_installment_status(installments[0].id, ScheduleStatus::Paid)
        .await
        .unwrap();
    assert_eq!(paid.status, ScheduleStatus::Paid);

    let err = app
        .services
        .payment_schedules
        .update_installment_status(installments[0].id, ScheduleStatus::Overdue)
        .await
        .expect_err("update should have failed");
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn outstanding_vouchers_track_only_pending() {
    let app = spawn_app().await;
    let customer = seed_customer(&app, "Acme Retail").await;
    let supplier = seed_supplier(&app, "Steelworks GmbH").await;

    let receivable = app
        .services
        .finance
        .create_voucher(
            CreateVoucherRequest {
                kind: VoucherKind::Receipt,
                party_id: customer.id,
                amount: dec!(900.00),
                issued_date: None,
                notes: None,
            },
            actor(),
        )
        .await
        .unwrap();
    app.services
        .finance
        .create_voucher(
            CreateVoucherRequest {
                kind: VoucherKind::Payment,
                party_id: supplier.id,
                amount: dec!(600.00),
                issued_date: None,
                notes: None,
            },
            actor(),
        )
        .await
        .unwrap();

    let outstanding = app.services.reports.outstanding_vouchers().await.unwrap();
    assert_eq!(outstanding.receivable, dec!(900.00));
    assert_eq!(outstanding.payable, dec!(600.00));

    // Settling moves the amount out of the outstanding bucket.
    app.services
        .finance
        .settle_voucher(
            receivable.id,
            SettleVoucherRequest {
                amount: dec!(900.00),
                settled_date: None,
                method: None,
            },
            actor(),
        )
        .await
        .unwrap();
    let outstanding = app.services.reports.outstanding_vouchers().await.unwrap();
    assert_eq!(outstanding.receivable, dec!(0));
    assert_eq!(outstanding.payable, dec!(600.00));
}

use utoipa::OpenApi;

use crate::{
    entities::{
        financial_transaction::TransactionKind,
        order::{OrderStatus, OrderType},
        party::PartyKind,
        payment_schedule::ScheduleStatus,
        stock_movement::MovementType,
        voucher::{VoucherKind, VoucherStatus},
    },
    errors::ErrorResponse,
    handlers::{inventory::StockLevelResponse, orders::TransitionRequest},
    services::{
        catalog::{CreatePartyRequest, CreateProductRequest},
        finance::{CreateVoucherRequest, RecordTransactionRequest, SettleVoucherRequest},
        inventory::{AdjustStockRequest, StockAdjustment},
        orders::{
            CreateOrderRequest, OrderLineRequest, OrderLineResponse, OrderListResponse,
            OrderResponse, UpdateOrderRequest,
        },
        payment_schedules::{ApplyScheduleRequest, CreateModelRequest, TermRequest},
        reports::{FinanceSummary, OutstandingVouchers, StockValuation},
    },
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tradeforge API",
        description = "Inventory, purchasing, sales and finance backend for a small manufacturing/trading business",
    ),
    components(schemas(
        ErrorResponse,
        OrderType,
        OrderStatus,
        MovementType,
        TransactionKind,
        VoucherKind,
        VoucherStatus,
        ScheduleStatus,
        PartyKind,
        CreateProductRequest,
        CreatePartyRequest,
        AdjustStockRequest,
        StockAdjustment,
        StockLevelResponse,
        CreateOrderRequest,
        UpdateOrderRequest,
        OrderLineRequest,
        OrderLineResponse,
        OrderResponse,
        OrderListResponse,
        TransitionRequest,
        RecordTransactionRequest,
        CreateVoucherRequest,
        SettleVoucherRequest,
        CreateModelRequest,
        TermRequest,
        ApplyScheduleRequest,
        FinanceSummary,
        OutstandingVouchers,
        StockValuation,
    )),
    tags(
        (name = "catalog", description = "Products and counterparties"),
        (name = "inventory", description = "Stock adjustments and the movement ledger"),
        (name = "orders", description = "Quotes, sales orders, purchase orders and their workflow"),
        (name = "finance", description = "Financial transactions and vouchers"),
        (name = "payment-schedules", description = "Installment models and schedules"),
        (name = "reports", description = "Read-side aggregation"),
    )
)]
pub struct ApiDoc;

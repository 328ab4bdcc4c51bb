use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        financial_transaction::{self, Entity as FinancialTransaction, TransactionKind},
        order::Entity as OrderEntity,
        party::Entity as Party,
        voucher::{self, Entity as Voucher, VoucherKind, VoucherStatus},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RecordTransactionRequest {
    pub kind: TransactionKind,
    #[validate(length(min = 1, max = 100, message = "Category is required"))]
    pub category: String,
    pub subcategory: Option<String>,
    pub amount: Decimal,
    pub transaction_date: Option<DateTime<Utc>>,
    pub party_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub payment_method: Option<String>,
    #[validate(length(max = 500, message = "Remarks must be at most 500 characters"))]
    pub remarks: Option<String>,
    pub tags: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateVoucherRequest {
    pub kind: VoucherKind,
    pub party_id: Uuid,
    pub amount: Decimal,
    pub issued_date: Option<DateTime<Utc>>,
    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SettleVoucherRequest {
    pub amount: Decimal,
    pub settled_date: Option<DateTime<Utc>>,
    pub method: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    pub party_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoucherSettlement {
    pub voucher: voucher::Model,
    pub transaction: financial_transaction::Model,
}

/// Append-only money ledger plus voucher settlement.
///
/// Transactions are never edited or deleted; balances are always derived by
/// aggregation (see the reports service). Settling a voucher writes its
/// status flip and its financial transaction in one atomic unit.
#[derive(Clone)]
pub struct FinanceService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl FinanceService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Appends one financial transaction. Referenced party/order must exist;
    /// nothing beyond required fields is validated.
    #[instrument(skip(self, request), fields(kind = %request.kind, amount = %request.amount))]
    pub async fn record(
        &self,
        request: RecordTransactionRequest,
        actor_id: Uuid,
    ) -> Result<financial_transaction::Model, ServiceError> {
        request.validate().map_err(ServiceError::from)?;
        if request.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Amount must be positive".to_string(),
            ));
        }

        let db = self.db.as_ref();
        if let Some(party_id) = request.party_id {
            Party::find_by_id(party_id)
                .one(db)
                .await
                .map_err(ServiceError::classify_db_err)?
                .ok_or_else(|| ServiceError::NotFound(format!("Party {} not found", party_id)))?;
        }
        if let Some(order_id) = request.order_id {
            OrderEntity::find_by_id(order_id)
                .one(db)
                .await
                .map_err(ServiceError::classify_db_err)?
                .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;
        }

        let row = financial_transaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            kind: Set(request.kind),
            category: Set(request.category),
            subcategory: Set(request.subcategory),
            amount: Set(request.amount),
            transaction_date: Set(request.transaction_date.unwrap_or_else(Utc::now)),
            party_id: Set(request.party_id),
            voucher_id: Set(None),
            order_id: Set(request.order_id),
            payment_method: Set(request.payment_method),
            remarks: Set(request.remarks),
            tags: Set(request.tags),
            created_by: Set(actor_id),
            ..Default::default()
        };
        let transaction = row
            .insert(db)
            .await
            .map_err(ServiceError::classify_db_err)?;

        if let Err(e) = self
            .event_sender
            .send(Event::FinancialTransactionRecorded {
                transaction_id: transaction.id,
                amount: transaction.amount,
            })
            .await
        {
            warn!(error = %e, "failed to send transaction recorded event");
        }

        Ok(transaction)
    }

    /// Creates a pending voucher.
    #[instrument(skip(self, request), fields(kind = %request.kind, party_id = %request.party_id))]
    pub async fn create_voucher(
        &self,
        request: CreateVoucherRequest,
        actor_id: Uuid,
    ) -> Result<voucher::Model, ServiceError> {
        request.validate().map_err(ServiceError::from)?;
        if request.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Amount must be positive".to_string(),
            ));
        }

        let db = self.db.as_ref();
        Party::find_by_id(request.party_id)
            .one(db)
            .await
            .map_err(ServiceError::classify_db_err)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Party {} not found", request.party_id))
            })?;

        let row = voucher::ActiveModel {
            id: Set(Uuid::new_v4()),
            kind: Set(request.kind),
            party_id: Set(request.party_id),
            amount: Set(request.amount),
            status: Set(VoucherStatus::Pending),
            issued_date: Set(request.issued_date.unwrap_or_else(Utc::now)),
            settled_date: Set(None),
            settled_amount: Set(None),
            settlement_method: Set(None),
            notes: Set(request.notes),
            created_by: Set(actor_id),
            updated_at: Set(None),
            ..Default::default()
        };
        row.insert(db).await.map_err(ServiceError::classify_db_err)
    }

    /// Settles a pending voucher: flips it to `settled` and appends exactly
    /// one financial transaction (payment → expense, receipt → income) in
    /// the same atomic unit. Repeat settlement fails with `AlreadySettled`
    /// and writes nothing.
    #[instrument(skip(self, request), fields(voucher_id = %voucher_id))]
    pub async fn settle_voucher(
        &self,
        voucher_id: Uuid,
        request: SettleVoucherRequest,
        actor_id: Uuid,
    ) -> Result<VoucherSettlement, ServiceError> {
        if request.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Settlement amount must be positive".to_string(),
            ));
        }

        let db = self.db.as_ref();
        let settlement = db
            .transaction::<_, VoucherSettlement, ServiceError>(move |txn| {
                Box::pin(async move {
                    let voucher = Voucher::find_by_id(voucher_id)
                        .lock_exclusive()
                        .one(txn)
                        .await
                        .map_err(ServiceError::classify_db_err)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Voucher {} not found", voucher_id))
                        })?;

                    if voucher.status != VoucherStatus::Pending {
                        return Err(ServiceError::AlreadySettled(format!(
                            "Voucher {} is already settled",
                            voucher_id
                        )));
                    }

                    let settled_date = request.settled_date.unwrap_or_else(Utc::now);

                    let mut active: voucher::ActiveModel = voucher.clone().into();
                    active.status = Set(VoucherStatus::Settled);
                    active.settled_date = Set(Some(settled_date));
                    active.settled_amount = Set(Some(request.amount));
                    active.settlement_method = Set(request.method.clone());
                    active.updated_at = Set(Some(Utc::now()));
                    let updated = active
                        .update(txn)
                        .await
                        .map_err(ServiceError::classify_db_err)?;

                    let kind = match updated.kind {
                        VoucherKind::Payment => TransactionKind::Expense,
                        VoucherKind::Receipt => TransactionKind::Income,
                    };
                    let transaction = financial_transaction::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        kind: Set(kind),
                        category: Set("voucher_settlement".to_string()),
                        subcategory: Set(None),
                        amount: Set(request.amount),
                        transaction_date: Set(settled_date),
                        party_id: Set(Some(updated.party_id)),
                        voucher_id: Set(Some(updated.id)),
                        order_id: Set(None),
                        payment_method: Set(request.method.clone()),
                        remarks: Set(None),
                        tags: Set(None),
                        created_by: Set(actor_id),
                        ..Default::default()
                    };
                    let transaction = transaction
                        .insert(txn)
                        .await
                        .map_err(ServiceError::classify_db_err)?;

                    Ok(VoucherSettlement {
                        voucher: updated,
                        transaction,
                    })
                })
            })
            .await
            .map_err(ServiceError::from_txn_err)?;

        info!(
            voucher_id = %voucher_id,
            transaction_id = %settlement.transaction.id,
            "voucher settled"
        );

        if let Err(e) = self
            .event_sender
            .send(Event::VoucherSettled {
                voucher_id,
                transaction_id: settlement.transaction.id,
                settled_at: settlement.voucher.settled_date.unwrap_or_else(Utc::now),
            })
            .await
        {
            warn!(error = %e, "failed to send voucher settled event");
        }

        Ok(settlement)
    }

    /// Lists financial transactions, newest first.
    #[instrument(skip(self, filter))]
    pub async fn list_transactions(
        &self,
        filter: TransactionFilter,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<financial_transaction::Model>, u64), ServiceError> {
        let mut query = FinancialTransaction::find()
            .order_by_desc(financial_transaction::Column::TransactionDate);

        if let Some(kind) = filter.kind {
            query = query.filter(financial_transaction::Column::Kind.eq(kind));
        }
        if let Some(party_id) = filter.party_id {
            query = query.filter(financial_transaction::Column::PartyId.eq(party_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(financial_transaction::Column::TransactionDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(financial_transaction::Column::TransactionDate.lte(to));
        }

        let paginator = query.paginate(self.db.as_ref(), limit.max(1));
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::classify_db_err)?;
        let rows = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::classify_db_err)?;

        Ok((rows, total))
    }

    /// Lists vouchers, optionally by status.
    #[instrument(skip(self))]
    pub async fn list_vouchers(
        &self,
        status: Option<VoucherStatus>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<voucher::Model>, u64), ServiceError> {
        let mut query = Voucher::find().order_by_desc(voucher::Column::IssuedDate);
        if let Some(status) = status {
            query = query.filter(voucher::Column::Status.eq(status));
        }

        let paginator = query.paginate(self.db.as_ref(), limit.max(1));
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::classify_db_err)?;
        let rows = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::classify_db_err)?;

        Ok((rows, total))
    }
}

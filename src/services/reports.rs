use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

use crate::{
    db::DbPool,
    entities::{
        financial_transaction::{self, Entity as FinancialTransaction, TransactionKind},
        product::{self, Entity as Product},
        voucher::{self, Entity as Voucher, VoucherKind, VoucherStatus},
    },
    errors::ServiceError,
};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FinanceSummary {
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OutstandingVouchers {
    /// Pending payment vouchers: what we still owe suppliers.
    pub payable: Decimal,
    /// Pending receipt vouchers: what customers still owe us.
    pub receivable: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StockValuation {
    pub products: u64,
    pub total_value: Decimal,
}

/// Read-side aggregation over the ledgers. Nothing in here writes.
#[derive(Clone)]
pub struct ReportService {
    db: Arc<DbPool>,
}

impl ReportService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Tracked products whose cached stock sits below their minimum.
    #[instrument(skip(self))]
    pub async fn low_stock(&self) -> Result<Vec<product::Model>, ServiceError> {
        Product::find()
            .filter(product::Column::TrackStock.eq(true))
            .filter(product::Column::IsActive.eq(true))
            .filter(
                Expr::col(product::Column::StockOnHand)
                    .lt(Expr::col(product::Column::MinimumStock)),
            )
            .order_by_asc(product::Column::Sku)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::classify_db_err)
    }

    /// Sum of cached stock × unit price across tracked, active products.
    #[instrument(skip(self))]
    pub async fn stock_valuation(&self) -> Result<StockValuation, ServiceError> {
        let products = Product::find()
            .filter(product::Column::TrackStock.eq(true))
            .filter(product::Column::IsActive.eq(true))
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::classify_db_err)?;

        let total_value = products
            .iter()
            .map(|p| p.stock_on_hand * p.unit_price)
            .sum();

        Ok(StockValuation {
            products: products.len() as u64,
            total_value,
        })
    }

    /// Income/expense totals over a date range, derived from the
    /// transaction ledger, never from a stored running balance.
    #[instrument(skip(self))]
    pub async fn finance_summary(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<FinanceSummary, ServiceError> {
        let income = self.sum_transactions(TransactionKind::Income, from, to).await?;
        let expense = self.sum_transactions(TransactionKind::Expense, from, to).await?;
        Ok(FinanceSummary {
            income,
            expense,
            net: income - expense,
        })
    }

    /// Open obligations by voucher kind.
    #[instrument(skip(self))]
    pub async fn outstanding_vouchers(&self) -> Result<OutstandingVouchers, ServiceError> {
        let payable = self.sum_pending_vouchers(VoucherKind::Payment).await?;
        let receivable = self.sum_pending_vouchers(VoucherKind::Receipt).await?;
        Ok(OutstandingVouchers {
            payable,
            receivable,
        })
    }

    async fn sum_transactions(
        &self,
        kind: TransactionKind,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Decimal, ServiceError> {
        let mut query = FinancialTransaction::find()
            .select_only()
            .column_as(financial_transaction::Column::Amount.sum(), "total")
            .filter(financial_transaction::Column::Kind.eq(kind));
        if let Some(from) = from {
            query = query.filter(financial_transaction::Column::TransactionDate.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(financial_transaction::Column::TransactionDate.lte(to));
        }

        let total: Option<Option<Decimal>> = query
            .into_tuple()
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::classify_db_err)?;
        Ok(total.flatten().unwrap_or(Decimal::ZERO))
    }

    async fn sum_pending_vouchers(&self, kind: VoucherKind) -> Result<Decimal, ServiceError> {
        let total: Option<Option<Decimal>> = Voucher::find()
            .select_only()
            .column_as(voucher::Column::Amount.sum(), "total")
            .filter(voucher::Column::Kind.eq(kind))
            .filter(voucher::Column::Status.eq(VoucherStatus::Pending))
            .into_tuple()
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::classify_db_err)?;
        Ok(total.flatten().unwrap_or(Decimal::ZERO))
    }
}

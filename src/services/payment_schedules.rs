use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
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
        order::Entity as OrderEntity,
        payment_schedule::{self, Entity as PaymentSchedule, ScheduleStatus},
        payment_schedule_model::{self, Entity as ScheduleModel},
        payment_schedule_term::{self, Entity as ScheduleTerm},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::orders::round_money,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TermRequest {
    pub day_offset: i32,
    pub percentage: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateModelRequest {
    #[validate(length(min = 1, max = 100, message = "Model name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub terms: Vec<TermRequest>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ApplyScheduleRequest {
    pub order_id: Uuid,
    pub model_id: Uuid,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleModelResponse {
    pub model: payment_schedule_model::Model,
    pub terms: Vec<payment_schedule_term::Model>,
}

/// Generates installment plans from reusable term templates.
///
/// Terms are typed rows ({day_offset, percentage, description}), never an
/// encoded blob. Applying a model writes every installment of the order in
/// one atomic unit.
#[derive(Clone)]
pub struct PaymentScheduleService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl PaymentScheduleService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Creates a schedule model with its ordered terms. Percentages are not
    /// required to sum to 100 (deposit-only models are legitimate); a
    /// mismatch is logged at warn level instead.
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_model(
        &self,
        request: CreateModelRequest,
        actor_id: Uuid,
    ) -> Result<ScheduleModelResponse, ServiceError> {
        request.validate().map_err(ServiceError::from)?;
        if request.terms.is_empty() {
            return Err(ServiceError::ValidationError(
                "A schedule model requires at least one term".to_string(),
            ));
        }
        for term in &request.terms {
            if term.percentage <= Decimal::ZERO || term.percentage > Decimal::ONE_HUNDRED {
                return Err(ServiceError::ValidationError(
                    "Term percentage must be in (0, 100]".to_string(),
                ));
            }
            if term.day_offset < 0 {
                return Err(ServiceError::ValidationError(
                    "Term day offset must not be negative".to_string(),
                ));
            }
        }

        let total_pct: Decimal = request.terms.iter().map(|t| t.percentage).sum();
        if total_pct != Decimal::ONE_HUNDRED {
            warn!(
                model = %request.name,
                total_percentage = %total_pct,
                "schedule model percentages do not sum to 100"
            );
        }

        let db = self.db.as_ref();
        let req = request.clone();
        let response = db
            .transaction::<_, ScheduleModelResponse, ServiceError>(move |txn| {
                Box::pin(async move {
                    let model = payment_schedule_model::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        name: Set(req.name.clone()),
                        description: Set(req.description.clone()),
                        is_active: Set(true),
                        created_by: Set(actor_id),
                        created_at: Set(Utc::now()),
                    };
                    let model = model
                        .insert(txn)
                        .await
                        .map_err(ServiceError::classify_db_err)?;

                    let mut terms = Vec::with_capacity(req.terms.len());
                    for (idx, term) in req.terms.iter().enumerate() {
                        let row = payment_schedule_term::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            model_id: Set(model.id),
                            sort_order: Set(idx as i32),
                            day_offset: Set(term.day_offset),
                            percentage: Set(term.percentage),
                            description: Set(term.description.clone()),
                        };
                        terms.push(
                            row.insert(txn)
                                .await
                                .map_err(ServiceError::classify_db_err)?,
                        );
                    }

                    Ok(ScheduleModelResponse { model, terms })
                })
            })
            .await
            .map_err(ServiceError::from_txn_err)?;

        Ok(response)
    }

    /// Applies a model to an order: one pending installment per term, due
    /// `day_offset` days after `start_date`, for `percentage` of the order
    /// total. All rows commit or roll back together.
    #[instrument(skip(self, request), fields(order_id = %request.order_id, model_id = %request.model_id))]
    pub async fn apply_schedule(
        &self,
        request: ApplyScheduleRequest,
        actor_id: Uuid,
    ) -> Result<Vec<payment_schedule::Model>, ServiceError> {
        let db = self.db.as_ref();
        let order_id = request.order_id;
        let installments = db
            .transaction::<_, Vec<payment_schedule::Model>, ServiceError>(move |txn| {
                Box::pin(async move {
                    let order = OrderEntity::find_by_id(request.order_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::classify_db_err)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Order {} not found",
                                request.order_id
                            ))
                        })?;

                    let model = ScheduleModel::find_by_id(request.model_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::classify_db_err)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Schedule model {} not found",
                                request.model_id
                            ))
                        })?;
                    if !model.is_active {
                        return Err(ServiceError::ValidationError(format!(
                            "Schedule model {} is deactivated",
                            model.name
                        )));
                    }

                    let terms = ScheduleTerm::find()
                        .filter(payment_schedule_term::Column::ModelId.eq(model.id))
                        .order_by_asc(payment_schedule_term::Column::SortOrder)
                        .all(txn)
                        .await
                        .map_err(ServiceError::classify_db_err)?;
                    if terms.is_empty() {
                        return Err(ServiceError::NotFound(format!(
                            "Schedule model {} has no terms",
                            model.name
                        )));
                    }

                    let mut installments = Vec::with_capacity(terms.len());
                    for term in terms {
                        let due_date =
                            request.start_date + Duration::days(term.day_offset as i64);
                        let amount =
                            round_money(order.total_amount * term.percentage / Decimal::ONE_HUNDRED);

                        let row = payment_schedule::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            order_id: Set(order.id),
                            model_id: Set(model.id),
                            due_date: Set(due_date),
                            amount: Set(amount),
                            percentage: Set(term.percentage),
                            description: Set(term.description.clone()),
                            status: Set(ScheduleStatus::Pending),
                            created_by: Set(actor_id),
                            updated_at: Set(None),
                            ..Default::default()
                        };
                        installments.push(
                            row.insert(txn)
                                .await
                                .map_err(ServiceError::classify_db_err)?,
                        );
                    }

                    Ok(installments)
                })
            })
            .await
            .map_err(ServiceError::from_txn_err)?;

        info!(
            order_id = %order_id,
            installments = installments.len(),
            "payment schedule applied"
        );

        if let Err(e) = self
            .event_sender
            .send(Event::PaymentSchedulesGenerated {
                order_id,
                installments: installments.len(),
            })
            .await
        {
            warn!(error = %e, "failed to send schedules generated event");
        }

        Ok(installments)
    }

    /// Moves an installment between pending/overdue/paid. `paid` is
    /// terminal.
    #[instrument(skip(self), fields(schedule_id = %schedule_id, target = %target))]
    pub async fn update_installment_status(
        &self,
        schedule_id: Uuid,
        target: ScheduleStatus,
    ) -> Result<payment_schedule::Model, ServiceError> {
        let db = self.db.as_ref();
        let schedule = PaymentSchedule::find_by_id(schedule_id)
            .one(db)
            .await
            .map_err(ServiceError::classify_db_err)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Installment {} not found", schedule_id))
            })?;

        if schedule.status == ScheduleStatus::Paid {
            return Err(ServiceError::Conflict(format!(
                "Installment {} is already paid",
                schedule_id
            )));
        }

        let mut active: payment_schedule::ActiveModel = schedule.into();
        active.status = Set(target);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::classify_db_err)
    }

    /// Lists a model with its terms.
    #[instrument(skip(self), fields(model_id = %model_id))]
    pub async fn get_model(&self, model_id: Uuid) -> Result<ScheduleModelResponse, ServiceError> {
        let db = self.db.as_ref();
        let model = ScheduleModel::find_by_id(model_id)
            .one(db)
            .await
            .map_err(ServiceError::classify_db_err)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Schedule model {} not found", model_id))
            })?;
        let terms = ScheduleTerm::find()
            .filter(payment_schedule_term::Column::ModelId.eq(model.id))
            .order_by_asc(payment_schedule_term::Column::SortOrder)
            .all(db)
            .await
            .map_err(ServiceError::classify_db_err)?;
        Ok(ScheduleModelResponse { model, terms })
    }

    /// Installments for one order, soonest due first.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn list_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<payment_schedule::Model>, ServiceError> {
        PaymentSchedule::find()
            .filter(payment_schedule::Column::OrderId.eq(order_id))
            .order_by_asc(payment_schedule::Column::DueDate)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::classify_db_err)
    }
}

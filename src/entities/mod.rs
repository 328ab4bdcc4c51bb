pub mod financial_transaction;
pub mod order;
pub mod order_line;
pub mod party;
pub mod payment_schedule;
pub mod payment_schedule_model;
pub mod payment_schedule_term;
pub mod product;
pub mod stock_movement;
pub mod voucher;

//! PostgreSQL repository implementations

mod bank_link;
mod transaction;

pub use bank_link::BankLinkRepo;
pub use transaction::TransactionRepo;

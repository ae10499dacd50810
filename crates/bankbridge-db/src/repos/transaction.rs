//! Transaction repository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::{DbTransaction, NewTransaction};
use crate::store::TransactionStore;

pub struct TransactionRepo {
    pool: PgPool,
}

impl TransactionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionStore for TransactionRepo {
    async fn insert_ignore_duplicate(&self, tx: &NewTransaction) -> DbResult<bool> {
        // ON CONFLICT on the dedup tuple makes re-ingestion a no-op; the
        // affected-row count tells us whether the record was new.
        let result = sqlx::query(
            r#"
            INSERT INTO transactions (bank_link_id, booking_date, value_date, amount, currency,
                creditor_name, debtor_name, creditor_account_last4, debtor_account_last4, booking_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT ON CONSTRAINT uq_transactions_dedup DO NOTHING
            "#,
        )
        .bind(tx.bank_link_id)
        .bind(tx.booking_date)
        .bind(tx.value_date)
        .bind(tx.amount)
        .bind(&tx.currency)
        .bind(&tx.creditor_name)
        .bind(&tx.debtor_name)
        .bind(&tx.creditor_account_last4)
        .bind(&tx.debtor_account_last4)
        .bind(tx.booking_status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_by_link(
        &self,
        link_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<DbTransaction>> {
        let transactions = sqlx::query_as::<_, DbTransaction>(
            r#"
            SELECT * FROM transactions
            WHERE bank_link_id = $1
            ORDER BY booking_date DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(link_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(transactions)
    }

    async fn count_by_link(&self, link_id: Uuid) -> DbResult<i64> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM transactions WHERE bank_link_id = $1")
                .bind(link_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count.0)
    }
}

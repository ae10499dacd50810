//! Bank link repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use bankbridge_types::ConsentStatus;

use crate::error::{DbError, DbResult};
use crate::models::{DbBankLink, NewBankLink};
use crate::store::BankLinkStore;

pub struct BankLinkRepo {
    pool: PgPool,
}

impl BankLinkRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BankLinkStore for BankLinkRepo {
    async fn create(&self, link: &NewBankLink) -> DbResult<DbBankLink> {
        let created = sqlx::query_as::<_, DbBankLink>(
            r#"
            INSERT INTO bank_links (owner_id, provider, consent_id, iban, consent_valid_until, consent_status, is_active)
            VALUES ($1, $2, $3, $4, $5, 'valid', TRUE)
            RETURNING *
            "#,
        )
        .bind(link.owner_id)
        .bind(link.provider.as_str())
        .bind(&link.consent_id)
        .bind(&link.iban)
        .bind(link.consent_valid_until)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::from_sqlx(e, "bank link already exists for owner or consent"))?;
        Ok(created)
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> DbResult<Option<DbBankLink>> {
        let link = sqlx::query_as::<_, DbBankLink>(
            "SELECT * FROM bank_links WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(link)
    }

    async fn find_by_consent_id(&self, consent_id: &str) -> DbResult<Option<DbBankLink>> {
        let link = sqlx::query_as::<_, DbBankLink>(
            "SELECT * FROM bank_links WHERE consent_id = $1",
        )
        .bind(consent_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(link)
    }

    async fn find_for_owner(&self, link_id: Uuid, owner_id: Uuid) -> DbResult<Option<DbBankLink>> {
        let link = sqlx::query_as::<_, DbBankLink>(
            "SELECT * FROM bank_links WHERE id = $1 AND owner_id = $2",
        )
        .bind(link_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(link)
    }

    async fn record_sync_time(&self, link_id: Uuid, at: DateTime<Utc>) -> DbResult<()> {
        sqlx::query("UPDATE bank_links SET last_synced_at = $2, updated_at = NOW() WHERE id = $1")
            .bind(link_id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_consent_status(&self, link_id: Uuid, status: ConsentStatus) -> DbResult<()> {
        sqlx::query("UPDATE bank_links SET consent_status = $2, updated_at = NOW() WHERE id = $1")
            .bind(link_id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn expire_lapsed(&self, now: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE bank_links
            SET consent_status = 'expired', updated_at = NOW()
            WHERE consent_status = 'valid' AND consent_valid_until <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

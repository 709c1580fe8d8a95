use sqlx::PgPool;
use uuid::Uuid;

use crate::models::financials::{FinancialsUpdate, UserFinancials};

#[derive(Clone)]
pub struct FinancialsRepository {
    conn: PgPool,
}

impl FinancialsRepository {
    pub fn new(conn: PgPool) -> Self {
        FinancialsRepository { conn }
    }

    /// A profile is expected to have one financials row; the first one wins.
    pub async fn get_first(&self, profile_id: Uuid) -> Result<Option<UserFinancials>, anyhow::Error> {
        let financials = sqlx::query_as::<_, UserFinancials>(
            r#"SELECT id, user_profile_id, total_balance, invested_amount, profit_amount, credit_score
            FROM user_financials
            WHERE user_profile_id = $1
            ORDER BY id
            LIMIT 1"#,
        )
        .bind(profile_id)
        .fetch_optional(&self.conn)
        .await?;

        Ok(financials)
    }

    pub async fn update_for_profile(
        &self,
        profile_id: Uuid,
        update: &FinancialsUpdate,
    ) -> Result<u64, anyhow::Error> {
        let result = sqlx::query(
            r#"UPDATE user_financials
            SET total_balance = $1, invested_amount = $2, profit_amount = $3, credit_score = $4
            WHERE user_profile_id = $5"#,
        )
        .bind(update.total_balance)
        .bind(update.invested_amount)
        .bind(update.profit_amount)
        .bind(update.credit_score)
        .bind(profile_id)
        .execute(&self.conn)
        .await?;

        Ok(result.rows_affected())
    }
}

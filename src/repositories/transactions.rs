use sqlx::PgPool;
use uuid::Uuid;

use crate::models::transactions::{self, NewTransaction, UserTransaction};

#[derive(Clone)]
pub struct TransactionRepository {
    conn: PgPool,
}

impl TransactionRepository {
    pub fn new(conn: PgPool) -> Self {
        TransactionRepository { conn }
    }

    pub async fn insert(
        &self,
        profile_id: Uuid,
        transaction: &NewTransaction,
    ) -> Result<UserTransaction, anyhow::Error> {
        let transaction = sqlx::query_as::<_, UserTransaction>(
            r#"INSERT INTO user_transactions
            (user_profile_id, transaction_type, amount, description, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_profile_id, transaction_type, amount, description, status, transaction_date
            "#,
        )
        .bind(profile_id)
        .bind(transaction.transaction_type)
        .bind(transaction.amount)
        .bind(transaction.description.as_deref())
        .bind(transactions::COMPLETED)
        .fetch_one(&self.conn)
        .await?;

        Ok(transaction)
    }

    pub async fn list_for_profile(
        &self,
        profile_id: Uuid,
    ) -> Result<Vec<UserTransaction>, anyhow::Error> {
        let transactions = sqlx::query_as::<_, UserTransaction>(
            r#"SELECT id, user_profile_id, transaction_type, amount, description, status, transaction_date
            FROM user_transactions
            WHERE user_profile_id = $1"#,
        )
        .bind(profile_id)
        .fetch_all(&self.conn)
        .await?;

        Ok(transactions)
    }
}

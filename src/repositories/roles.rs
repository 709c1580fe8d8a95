use sqlx::PgPool;
use uuid::Uuid;

use crate::models::roles::Role;

#[derive(Clone)]
pub struct RoleRepository {
    conn: PgPool,
}

impl RoleRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    pub async fn get_role(&self, user_id: Uuid) -> Result<Option<Role>, anyhow::Error> {
        let role: Option<Role> = sqlx::query_scalar("SELECT role FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.conn)
            .await?;

        Ok(role)
    }
}

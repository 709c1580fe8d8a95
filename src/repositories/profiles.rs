use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    financials::UserFinancials,
    profiles::{ProfileWithFinancials, UserProfile},
};

const PROFILE_COLUMNS: &str =
    "id, user_id, full_name, email, username, share_token, is_admin, referred_by, created_at";

/// Profiles joined with their first financials row. The caller appends the
/// filter and ordering.
const PROFILES_WITH_FINANCIALS: &str = r#"
    SELECT
        p.id, p.user_id, p.full_name, p.email, p.username, p.share_token,
        p.is_admin, p.referred_by, p.created_at,
        f.id AS financials_id,
        f.total_balance,
        f.invested_amount,
        f.profit_amount,
        f.credit_score
    FROM user_profiles p
    LEFT JOIN LATERAL (
        SELECT id, total_balance, invested_amount, profit_amount, credit_score
        FROM user_financials
        WHERE user_profile_id = p.id
        ORDER BY id
        LIMIT 1
    ) f ON true
"#;

#[derive(sqlx::FromRow)]
struct ProfileFinancialsRow {
    #[sqlx(flatten)]
    profile: UserProfile,
    financials_id: Option<Uuid>,
    total_balance: Option<Decimal>,
    invested_amount: Option<Decimal>,
    profit_amount: Option<Decimal>,
    credit_score: Option<i32>,
}

impl From<ProfileFinancialsRow> for ProfileWithFinancials {
    fn from(row: ProfileFinancialsRow) -> Self {
        let financials = row.financials_id.map(|id| UserFinancials {
            id,
            user_profile_id: row.profile.id,
            total_balance: row.total_balance.unwrap_or_default(),
            invested_amount: row.invested_amount.unwrap_or_default(),
            profit_amount: row.profit_amount.unwrap_or_default(),
            credit_score: row
                .credit_score
                .unwrap_or(crate::models::financials::DEFAULT_CREDIT_SCORE),
        });

        ProfileWithFinancials {
            profile: row.profile,
            financials,
        }
    }
}

#[derive(Clone)]
pub struct ProfileRepository {
    conn: PgPool,
}

impl ProfileRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    pub async fn get_by_user_id(&self, user_id: Uuid) -> Result<Option<UserProfile>, anyhow::Error> {
        let profile = sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {} FROM user_profiles WHERE user_id = $1",
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.conn)
        .await?;

        Ok(profile)
    }

    pub async fn get_by_share_token(
        &self,
        share_token: &str,
    ) -> Result<Option<UserProfile>, anyhow::Error> {
        let profile = sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {} FROM user_profiles WHERE share_token = $1",
            PROFILE_COLUMNS
        ))
        .bind(share_token)
        .fetch_optional(&self.conn)
        .await?;

        Ok(profile)
    }

    pub async fn list_with_financials(&self) -> Result<Vec<ProfileWithFinancials>, anyhow::Error> {
        let rows = sqlx::query_as::<_, ProfileFinancialsRow>(&format!(
            "{} ORDER BY p.created_at DESC",
            PROFILES_WITH_FINANCIALS
        ))
        .fetch_all(&self.conn)
        .await?;

        Ok(rows.into_iter().map(ProfileWithFinancials::from).collect())
    }

    pub async fn list_referred_by(
        &self,
        referrer_id: Uuid,
    ) -> Result<Vec<ProfileWithFinancials>, anyhow::Error> {
        let rows = sqlx::query_as::<_, ProfileFinancialsRow>(&format!(
            "{} WHERE p.referred_by = $1 ORDER BY p.created_at DESC",
            PROFILES_WITH_FINANCIALS
        ))
        .bind(referrer_id)
        .fetch_all(&self.conn)
        .await?;

        Ok(rows.into_iter().map(ProfileWithFinancials::from).collect())
    }
}

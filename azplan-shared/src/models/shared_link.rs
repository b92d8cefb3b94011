/// Shared link model and database operations
///
/// A shared link grants read access to one plan (and its comments) to
/// whoever holds the token, while the link is active and unexpired.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

const SHARED_LINK_COLUMNS: &str =
    "id, plan_id, owner_id, share_token, is_active, expires_at, created_at";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SharedLink {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub owner_id: Uuid,
    pub share_token: String,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Whether a link grants access right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Usable,
    Inactive,
    Expired,
}

impl SharedLink {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at < now)
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> LinkState {
        if !self.is_active {
            LinkState::Inactive
        } else if self.is_expired_at(now) {
            LinkState::Expired
        } else {
            LinkState::Usable
        }
    }

    pub fn state(&self) -> LinkState {
        self.state_at(Utc::now())
    }

    /// Creates a link with a fresh random token
    pub async fn create(
        pool: &PgPool,
        plan_id: Uuid,
        owner_id: Uuid,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, SharedLink>(&format!(
            "INSERT INTO shared_links (plan_id, owner_id, share_token, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            SHARED_LINK_COLUMNS
        ))
        .bind(plan_id)
        .bind(owner_id)
        .bind(Uuid::new_v4().to_string())
        .bind(expires_at)
        .fetch_one(pool)
        .await
    }

    /// Looks a link up by token regardless of its state
    pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, SharedLink>(&format!(
            "SELECT {} FROM shared_links WHERE share_token = $1",
            SHARED_LINK_COLUMNS
        ))
        .bind(token)
        .fetch_optional(pool)
        .await
    }

    /// Lists the links of one plan, newest first
    pub async fn list_by_plan(
        pool: &PgPool,
        plan_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, SharedLink>(&format!(
            "SELECT {} FROM shared_links WHERE plan_id = $1 AND owner_id = $2
             ORDER BY created_at DESC",
            SHARED_LINK_COLUMNS
        ))
        .bind(plan_id)
        .bind(owner_id)
        .fetch_all(pool)
        .await
    }

    /// Turns a link off; returns the updated link if the caller owns it
    pub async fn deactivate(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, SharedLink>(&format!(
            "UPDATE shared_links SET is_active = FALSE
             WHERE id = $1 AND owner_id = $2
             RETURNING {}",
            SHARED_LINK_COLUMNS
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn link(is_active: bool, expires_at: Option<DateTime<Utc>>) -> SharedLink {
        SharedLink {
            id: Uuid::new_v4(),
            plan_id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            share_token: Uuid::new_v4().to_string(),
            is_active,
            expires_at,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_link_without_expiry_is_usable() {
        assert_eq!(link(true, None).state(), LinkState::Usable);
    }

    #[test]
    fn test_expired_link() {
        let now = Utc::now();
        let expired = link(true, Some(now - Duration::hours(1)));
        assert_eq!(expired.state_at(now), LinkState::Expired);

        let future = link(true, Some(now + Duration::hours(1)));
        assert_eq!(future.state_at(now), LinkState::Usable);
    }

    #[test]
    fn test_inactive_takes_precedence_over_expiry() {
        let now = Utc::now();
        let inactive = link(false, Some(now - Duration::hours(1)));
        assert_eq!(inactive.state_at(now), LinkState::Inactive);
    }
}

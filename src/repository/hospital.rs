//! Hospital repository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::conflict_on_unique;
use crate::error::Result;
use crate::models::{Hospital, HospitalDraft, VacCenterFilter};

/// There is deliberately no delete-by-query here: every hospital removal
/// goes through `service::delete_hospital_cascade`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HospitalRepository: Send + Sync {
    async fn create(&self, draft: &HospitalDraft) -> Result<Hospital>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Hospital>>;
    async fn list(&self, offset: i64, limit: Option<i64>) -> Result<Vec<Hospital>>;
    async fn find_vac_centers(&self, filter: &VacCenterFilter) -> Result<Vec<Hospital>>;
    async fn update(&self, id: Uuid, draft: &HospitalDraft) -> Result<Option<Hospital>>;
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

pub struct HospitalRepositoryImpl {
    pool: PgPool,
}

impl HospitalRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const DUPLICATE_NAME: &str = "Duplicate field value entered: a hospital with this name already exists";

#[async_trait]
impl HospitalRepository for HospitalRepositoryImpl {
    async fn create(&self, draft: &HospitalDraft) -> Result<Hospital> {
        sqlx::query_as::<_, Hospital>(
            r#"
            INSERT INTO hospitals (id, name, address, district, province, postalcode, tel, region)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            RETURNING id, name, address, district, province, postalcode, tel, region
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&draft.name)
        .bind(&draft.address)
        .bind(&draft.district)
        .bind(&draft.province)
        .bind(&draft.postalcode)
        .bind(&draft.tel)
        .bind(&draft.region)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_NAME))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Hospital>> {
        let row = sqlx::query_as::<_, Hospital>(
            r#"
            SELECT id, name, address, district, province, postalcode, tel, region
            FROM hospitals
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list(&self, offset: i64, limit: Option<i64>) -> Result<Vec<Hospital>> {
        // LIMIT NULL means no limit in PostgreSQL
        let rows = sqlx::query_as::<_, Hospital>(
            r#"
            SELECT id, name, address, district, province, postalcode, tel, region
            FROM hospitals
            ORDER BY created_at, name
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_vac_centers(&self, filter: &VacCenterFilter) -> Result<Vec<Hospital>> {
        let rows = sqlx::query_as::<_, Hospital>(
            r#"
            SELECT id, name, address, district, province, postalcode, tel, region
            FROM hospitals
            WHERE ($1::text IS NULL OR region = $1)
              AND ($2::text IS NULL OR province = $2)
              AND ($3::text IS NULL OR district = $3)
            ORDER BY name
            "#,
        )
        .bind(&filter.region)
        .bind(&filter.province)
        .bind(&filter.district)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn update(&self, id: Uuid, draft: &HospitalDraft) -> Result<Option<Hospital>> {
        sqlx::query_as::<_, Hospital>(
            r#"
            UPDATE hospitals SET
                name       = $2,
                address    = $3,
                district   = $4,
                province   = $5,
                postalcode = $6,
                tel        = $7,
                region     = $8,
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, address, district, province, postalcode, tel, region
            "#,
        )
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.address)
        .bind(&draft.district)
        .bind(&draft.province)
        .bind(&draft.postalcode)
        .bind(&draft.tel)
        .bind(&draft.region)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_NAME))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let res = sqlx::query("DELETE FROM hospitals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

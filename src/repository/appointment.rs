//! Appointment repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Appointment, AppointmentFilter, NewAppointment};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn create(&self, input: &NewAppointment) -> Result<Appointment>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>>;
    async fn list(&self, filter: AppointmentFilter) -> Result<Vec<Appointment>>;
    async fn count_by_user(&self, user_id: Uuid) -> Result<i64>;
    async fn update(&self, id: Uuid, appt_date: DateTime<Utc>) -> Result<Option<Appointment>>;
    async fn delete(&self, id: Uuid) -> Result<bool>;
    /// Remove every appointment booked at `hospital_id`, returning how many went.
    async fn delete_by_hospital(&self, hospital_id: Uuid) -> Result<u64>;
}

pub struct AppointmentRepositoryImpl {
    pool: PgPool,
}

impl AppointmentRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentRepository for AppointmentRepositoryImpl {
    async fn create(&self, input: &NewAppointment) -> Result<Appointment> {
        let row = sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments (id, appt_date, user_id, hospital_id)
            VALUES ($1,$2,$3,$4)
            RETURNING id, appt_date, user_id, hospital_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.appt_date)
        .bind(input.user_id)
        .bind(input.hospital_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>> {
        let row = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT id, appt_date, user_id, hospital_id, created_at
            FROM appointments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list(&self, filter: AppointmentFilter) -> Result<Vec<Appointment>> {
        let rows = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT id, appt_date, user_id, hospital_id, created_at
            FROM appointments
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::uuid IS NULL OR hospital_id = $2)
            ORDER BY appt_date
            "#,
        )
        .bind(filter.user_id)
        .bind(filter.hospital_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_by_user(&self, user_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM appointments WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn update(&self, id: Uuid, appt_date: DateTime<Utc>) -> Result<Option<Appointment>> {
        let row = sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments SET appt_date = $2
            WHERE id = $1
            RETURNING id, appt_date, user_id, hospital_id, created_at
            "#,
        )
        .bind(id)
        .bind(appt_date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let res = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_by_hospital(&self, hospital_id: Uuid) -> Result<u64> {
        let res = sqlx::query("DELETE FROM appointments WHERE hospital_id = $1")
            .bind(hospital_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }
}

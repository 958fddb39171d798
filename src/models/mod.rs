// src/models/mod.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};

/// Appointments a non-admin user may hold at once.
pub const MAX_APPOINTMENTS_PER_USER: i64 = 3;

// ───────────────────────────────────────
// Hospitals
// ───────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Hospital {
    pub id: Uuid,
    #[schema(example = "ธนบุรี 2")]
    pub name: String,
    #[schema(example = "43/4 ถนนบรมราชชนนี แขวงศาลาธรรมสพน์")]
    pub address: String,
    #[schema(example = "ทวีวัฒนา")]
    pub district: String,
    #[schema(example = "กรุงเทพมหานคร")]
    pub province: String,
    #[schema(example = "10170")]
    pub postalcode: String,
    #[schema(example = "02-4872100")]
    pub tel: Option<String>,
    #[schema(example = "กรุงเทพมหานคร (Bangkok)")]
    pub region: String,
}

/// Request body for both create and update. Every field is optional on the
/// wire; `into_draft` and `Hospital::apply` decide what is required.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct HospitalInput {
    pub name: Option<String>,
    pub address: Option<String>,
    pub district: Option<String>,
    pub province: Option<String>,
    pub postalcode: Option<String>,
    pub tel: Option<String>,
    pub region: Option<String>,
}

/// A complete, validated set of hospital fields ready to be written.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct HospitalDraft {
    #[validate(length(max = 50, message = "Name cannot be more than 50 characters"))]
    pub name: String,
    pub address: String,
    pub district: String,
    pub province: String,
    #[validate(length(max = 5, message = "Postal Code cannot be more than 5 digits"))]
    pub postalcode: String,
    pub tel: Option<String>,
    pub region: String,
}

fn required(value: Option<String>, message: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::Validation(message.to_string())),
    }
}

impl HospitalDraft {
    fn build(input: HospitalInput) -> Result<Self> {
        let draft = HospitalDraft {
            name: required(input.name, "Please add a name")?.trim().to_string(),
            address: required(input.address, "Please add an address")?,
            district: required(input.district, "Please add a district")?,
            province: required(input.province, "Please add a province")?,
            postalcode: required(input.postalcode, "Please add a postalcode")?,
            tel: input.tel,
            region: required(input.region, "Please add a region")?,
        };
        draft.validate()?;
        Ok(draft)
    }
}

impl HospitalInput {
    /// Validate a create request.
    pub fn into_draft(self) -> Result<HospitalDraft> {
        HospitalDraft::build(self)
    }
}

impl Hospital {
    /// Merge a partial update over this record and re-validate the result.
    pub fn apply(&self, patch: HospitalInput) -> Result<HospitalDraft> {
        HospitalDraft::build(HospitalInput {
            name: patch.name.or_else(|| Some(self.name.clone())),
            address: patch.address.or_else(|| Some(self.address.clone())),
            district: patch.district.or_else(|| Some(self.district.clone())),
            province: patch.province.or_else(|| Some(self.province.clone())),
            postalcode: patch.postalcode.or_else(|| Some(self.postalcode.clone())),
            tel: patch.tel.or_else(|| self.tel.clone()),
            region: patch.region.or_else(|| Some(self.region.clone())),
        })
    }
}

/// Hospital as returned by the API; `appointments` is only present when
/// the caller asked for the reverse relation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HospitalView {
    #[serde(flatten)]
    pub hospital: Hospital,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointments: Option<Vec<Appointment>>,
}

impl From<Hospital> for HospitalView {
    fn from(hospital: Hospital) -> Self {
        Self { hospital, appointments: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HospitalSummary {
    pub id: Uuid,
    pub name: String,
    pub province: String,
    pub tel: Option<String>,
}

impl From<&Hospital> for HospitalSummary {
    fn from(h: &Hospital) -> Self {
        Self {
            id: h.id,
            name: h.name.clone(),
            province: h.province.clone(),
            tel: h.tel.clone(),
        }
    }
}

/// Optional exact-match filter for vaccination centre lookups.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VacCenterFilter {
    pub region: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
}

impl VacCenterFilter {
    pub fn matches(&self, h: &Hospital) -> bool {
        self.region.as_ref().map_or(true, |r| *r == h.region)
            && self.province.as_ref().map_or(true, |p| *p == h.province)
            && self.district.as_ref().map_or(true, |d| *d == h.district)
    }
}

// ───────────────────────────────────────
// Appointments
// ───────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub appt_date: DateTime<Utc>,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    #[serde(rename = "hospital")]
    pub hospital_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub appt_date: DateTime<Utc>,
    pub user_id: Uuid,
    pub hospital_id: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentInput {
    pub appt_date: Option<DateTime<Utc>>,
    /// Only admins may book on behalf of another user.
    pub user: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentInput {
    pub appt_date: Option<DateTime<Utc>>,
}

/// Appointment with its hospital resolved for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDetail {
    pub id: Uuid,
    pub appt_date: DateTime<Utc>,
    pub user: Uuid,
    pub hospital: HospitalSummary,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AppointmentFilter {
    pub user_id: Option<Uuid>,
    pub hospital_id: Option<Uuid>,
}

// ───────────────────────────────────────
// Users (simple RBAC role)
// ───────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Role {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> std::result::Result<Self, sqlx::error::BoxDynError> {
        let s: String = sqlx::Decode::<'r, sqlx::Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl sqlx::Type<sqlx::Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub tel: Option<String>,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub tel: Option<String>,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
}

/// Self-registration always yields a `user`; admins come from the startup seed.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterInput {
    #[serde(default)]
    #[validate(length(min = 1, message = "Please add a name"))]
    pub name: String,
    pub tel: Option<String>,
    #[serde(default)]
    #[validate(email(message = "Please add a valid email"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

// ───────────────────────────────────────
// DTOs helpful for endpoints
// ───────────────────────────────────────
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Deleted {
    pub deleted: bool,
}

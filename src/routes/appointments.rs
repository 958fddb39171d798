// src/routes/appointments.rs

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use super::parse_id;
use crate::auth::{self, CurrentUser};
use crate::error::{AppError, Result};
use crate::models::{
    Appointment, AppointmentDetail, AppointmentFilter, CreateAppointmentInput, Deleted,
    NewAppointment, UpdateAppointmentInput, MAX_APPOINTMENTS_PER_USER,
};
use crate::service::{self, hospital_not_found};
use crate::AppState;

/// Routes mounted under `/api/v1/appointments`.
pub fn router(state: AppState) -> Router<AppState> {
    let read = Router::new()
        .route("/", get(list_appointments))
        .route("/:id", get(get_appointment));

    let write = Router::new()
        .route("/:id", put(update_appointment).delete(delete_appointment))
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            auth::require_roles(auth::ANY_ROLE, req, next)
        }));

    read.merge(write)
        .route_layer(middleware::from_fn_with_state(state, auth::protect))
}

/// Routes nested under `/api/v1/hospitals/:id/appointments`; the hospital
/// id is the only path parameter these handlers see.
pub fn hospital_router(state: AppState) -> Router<AppState> {
    let read = Router::new().route("/", get(list_hospital_appointments));

    let write = Router::new()
        .route("/", post(add_appointment))
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            auth::require_roles(auth::ANY_ROLE, req, next)
        }));

    read.merge(write)
        .route_layer(middleware::from_fn_with_state(state, auth::protect))
}

fn appointment_not_found(id: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("No appointment with the id of {}", id))
}

fn ensure_owner(current: &CurrentUser, appt: &Appointment, action: &str) -> Result<()> {
    if current.is_admin() || appt.user_id == current.id() {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "User {} is not authorized to {} this appointment",
            current.id(),
            action
        )))
    }
}

async fn load_owned(
    state: &AppState,
    current: &CurrentUser,
    raw_id: &str,
    action: &str,
) -> Result<Appointment> {
    let id = parse_id(raw_id).ok_or_else(|| appointment_not_found(raw_id))?;
    let appt = state
        .appointments
        .find_by_id(id)
        .await?
        .ok_or_else(|| appointment_not_found(raw_id))?;
    ensure_owner(current, &appt, action)?;
    Ok(appt)
}

/// Ordinary users only ever see their own bookings.
fn scope_for(current: &CurrentUser, hospital_id: Option<Uuid>) -> AppointmentFilter {
    AppointmentFilter {
        user_id: (!current.is_admin()).then(|| current.id()),
        hospital_id,
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/appointments",
    tag = "Appointments",
    security(("bearer_jwt" = [])),
    responses(
        (status = 200, description = "Appointments visible to the caller", body = Vec<AppointmentDetail>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_appointments(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<AppointmentDetail>>> {
    let rows = state.appointments.list(scope_for(&current, None)).await?;
    let details = service::with_hospitals(state.hospitals.as_ref(), rows).await?;
    Ok(Json(details))
}

#[utoipa::path(
    get,
    path = "/api/v1/hospitals/{id}/appointments",
    tag = "Appointments",
    params(("id" = String, Path, description = "The hospital id")),
    security(("bearer_jwt" = [])),
    responses(
        (status = 200, description = "Appointments at the hospital visible to the caller", body = Vec<AppointmentDetail>),
        (status = 404, description = "The hospital was not found")
    )
)]
pub async fn list_hospital_appointments(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(hospital_id): Path<String>,
) -> Result<Json<Vec<AppointmentDetail>>> {
    let hid = parse_id(&hospital_id).ok_or_else(|| hospital_not_found(&hospital_id))?;
    if state.hospitals.find_by_id(hid).await?.is_none() {
        return Err(hospital_not_found(&hospital_id));
    }
    let rows = state.appointments.list(scope_for(&current, Some(hid))).await?;
    let details = service::with_hospitals(state.hospitals.as_ref(), rows).await?;
    Ok(Json(details))
}

#[utoipa::path(
    get,
    path = "/api/v1/appointments/{id}",
    tag = "Appointments",
    params(("id" = String, Path, description = "The appointment id")),
    security(("bearer_jwt" = [])),
    responses(
        (status = 200, description = "The appointment", body = AppointmentDetail),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "The appointment was not found")
    )
)]
pub async fn get_appointment(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<AppointmentDetail>> {
    let appt = load_owned(&state, &current, &id, "view").await?;
    service::with_hospitals(state.hospitals.as_ref(), vec![appt])
        .await?
        .pop()
        .map(Json)
        .ok_or_else(|| appointment_not_found(&id))
}

#[utoipa::path(
    post,
    path = "/api/v1/hospitals/{id}/appointments",
    tag = "Appointments",
    params(("id" = String, Path, description = "The hospital id")),
    request_body = CreateAppointmentInput,
    security(("bearer_jwt" = [])),
    responses(
        (status = 201, description = "The appointment was booked", body = Appointment),
        (status = 400, description = "Missing date or booking limit reached"),
        (status = 404, description = "The hospital was not found")
    )
)]
pub async fn add_appointment(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(hospital_id): Path<String>,
    Json(body): Json<CreateAppointmentInput>,
) -> Result<(StatusCode, Json<Appointment>)> {
    let hid = parse_id(&hospital_id).ok_or_else(|| hospital_not_found(&hospital_id))?;
    if state.hospitals.find_by_id(hid).await?.is_none() {
        return Err(hospital_not_found(&hospital_id));
    }

    let appt_date = body
        .appt_date
        .ok_or_else(|| AppError::Validation("Please add an appointment date".to_string()))?;

    let user_id = match body.user {
        Some(other) if other != current.id() => {
            if !current.is_admin() {
                return Err(AppError::Forbidden(
                    "Only admins may book appointments for other users".to_string(),
                ));
            }
            if state.users.find_by_id(other).await?.is_none() {
                return Err(AppError::NotFound(format!("No user with the id of {}", other)));
            }
            other
        }
        _ => current.id(),
    };

    if !current.is_admin() {
        let existing = state.appointments.count_by_user(user_id).await?;
        if existing >= MAX_APPOINTMENTS_PER_USER {
            return Err(AppError::BadRequest(format!(
                "The user with ID {} has already made {} appointments",
                user_id, MAX_APPOINTMENTS_PER_USER
            )));
        }
    }

    let appt = state
        .appointments
        .create(&NewAppointment {
            appt_date,
            user_id,
            hospital_id: hid,
        })
        .await?;
    tracing::info!(appointment_id = %appt.id, hospital_id = %hid, user_id = %user_id, "appointment booked");
    Ok((StatusCode::CREATED, Json(appt)))
}

#[utoipa::path(
    put,
    path = "/api/v1/appointments/{id}",
    tag = "Appointments",
    params(("id" = String, Path, description = "The appointment id")),
    request_body = UpdateAppointmentInput,
    security(("bearer_jwt" = [])),
    responses(
        (status = 200, description = "The appointment was updated", body = Appointment),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "The appointment was not found")
    )
)]
pub async fn update_appointment(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateAppointmentInput>,
) -> Result<Json<Appointment>> {
    let appt = load_owned(&state, &current, &id, "update").await?;
    let appt_date = body
        .appt_date
        .ok_or_else(|| AppError::Validation("Please add an appointment date".to_string()))?;

    let updated = state
        .appointments
        .update(appt.id, appt_date)
        .await?
        .ok_or_else(|| appointment_not_found(&id))?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/v1/appointments/{id}",
    tag = "Appointments",
    params(("id" = String, Path, description = "The appointment id")),
    security(("bearer_jwt" = [])),
    responses(
        (status = 200, description = "The appointment was deleted", body = Deleted),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "The appointment was not found")
    )
)]
pub async fn delete_appointment(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Deleted>> {
    let appt = load_owned(&state, &current, &id, "delete").await?;
    let deleted = state.appointments.delete(appt.id).await?;
    if !deleted {
        return Err(appointment_not_found(&id));
    }
    Ok(Json(Deleted { deleted }))
}

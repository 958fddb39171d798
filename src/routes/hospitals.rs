// src/routes/hospitals.rs

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use super::{appointments, parse_id};
use crate::auth;
use crate::error::Result;
use crate::models::{Deleted, Hospital, HospitalInput, HospitalView, VacCenterFilter};
use crate::service::{self, hospital_not_found};
use crate::AppState;

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQ {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// `appointments` attaches each hospital's appointments
    pub include: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IncludeQ {
    pub include: Option<String>,
}

fn wants_appointments(include: Option<&str>) -> bool {
    include
        .map(|v| v.split(',').any(|p| p.trim() == "appointments"))
        .unwrap_or(false)
}

/// Routes mounted under `/api/v1/hospitals`.
///
/// Writes sit behind `protect` + admin; the appointment sub-resource is
/// handed to the appointments router with the hospital id in the path.
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/vacCenters", get(get_vac_centers))
        .route("/", get(list_hospitals))
        .route("/:id", get(get_hospital));

    let admin = Router::new()
        .route("/", post(create_hospital))
        .route("/:id", put(update_hospital).delete(delete_hospital))
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            auth::require_roles(auth::ADMIN_ONLY, req, next)
        }))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::protect));

    public
        .merge(admin)
        .nest("/:id/appointments", appointments::hospital_router(state))
}

#[utoipa::path(
    get,
    path = "/api/v1/hospitals",
    tag = "Hospitals",
    params(ListQ),
    responses((status = 200, description = "The list of the hospitals", body = Vec<HospitalView>))
)]
pub async fn list_hospitals(
    State(state): State<AppState>,
    Query(q): Query<ListQ>,
) -> Result<Json<Vec<HospitalView>>> {
    let limit = q.limit.map(|l| l.max(0));
    let offset = q.offset.unwrap_or(0).max(0);

    let rows = state.hospitals.list(offset, limit).await?;
    let mut views: Vec<HospitalView> = rows.into_iter().map(HospitalView::from).collect();
    if wants_appointments(q.include.as_deref()) {
        service::populate_appointments(state.appointments.as_ref(), &mut views).await?;
    }
    Ok(Json(views))
}

#[utoipa::path(
    get,
    path = "/api/v1/hospitals/vacCenters",
    tag = "Hospitals",
    params(VacCenterFilter),
    responses((status = 200, description = "Hospitals serving as vaccination centers", body = Vec<Hospital>))
)]
pub async fn get_vac_centers(
    State(state): State<AppState>,
    Query(filter): Query<VacCenterFilter>,
) -> Result<Json<Vec<Hospital>>> {
    let rows = state.hospitals.find_vac_centers(&filter).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/api/v1/hospitals/{id}",
    tag = "Hospitals",
    params(("id" = String, Path, description = "The hospital id"), IncludeQ),
    responses(
        (status = 200, description = "The hospital by id", body = HospitalView),
        (status = 404, description = "The hospital was not found")
    )
)]
pub async fn get_hospital(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<IncludeQ>,
) -> Result<Json<HospitalView>> {
    let hospital_id = parse_id(&id).ok_or_else(|| hospital_not_found(&id))?;
    let hospital = state
        .hospitals
        .find_by_id(hospital_id)
        .await?
        .ok_or_else(|| hospital_not_found(&id))?;

    let mut view = HospitalView::from(hospital);
    if wants_appointments(q.include.as_deref()) {
        view.appointments =
            Some(service::appointments_for(state.appointments.as_ref(), hospital_id).await?);
    }
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/api/v1/hospitals",
    tag = "Hospitals",
    request_body = HospitalInput,
    security(("bearer_jwt" = [])),
    responses(
        (status = 201, description = "The hospital was successfully created", body = Hospital),
        (status = 400, description = "Validation failed or the name is taken"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn create_hospital(
    State(state): State<AppState>,
    Json(body): Json<HospitalInput>,
) -> Result<(StatusCode, Json<Hospital>)> {
    let draft = body.into_draft()?;
    let hospital = state.hospitals.create(&draft).await?;
    tracing::info!(hospital_id = %hospital.id, name = %hospital.name, "hospital created");
    Ok((StatusCode::CREATED, Json(hospital)))
}

#[utoipa::path(
    put,
    path = "/api/v1/hospitals/{id}",
    tag = "Hospitals",
    params(("id" = String, Path, description = "The hospital id")),
    request_body = HospitalInput,
    security(("bearer_jwt" = [])),
    responses(
        (status = 200, description = "The hospital was updated", body = Hospital),
        (status = 400, description = "Validation failed or the name is taken"),
        (status = 404, description = "The hospital was not found")
    )
)]
pub async fn update_hospital(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<HospitalInput>,
) -> Result<Json<Hospital>> {
    let hospital_id = parse_id(&id).ok_or_else(|| hospital_not_found(&id))?;
    let current = state
        .hospitals
        .find_by_id(hospital_id)
        .await?
        .ok_or_else(|| hospital_not_found(&id))?;

    let draft = current.apply(body)?;
    let updated = state
        .hospitals
        .update(hospital_id, &draft)
        .await?
        .ok_or_else(|| hospital_not_found(&id))?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/v1/hospitals/{id}",
    tag = "Hospitals",
    params(("id" = String, Path, description = "The hospital id")),
    security(("bearer_jwt" = [])),
    responses(
        (status = 200, description = "The hospital and its appointments were deleted", body = Deleted),
        (status = 404, description = "The hospital was not found")
    )
)]
pub async fn delete_hospital(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>> {
    let hospital_id = parse_id(&id).ok_or_else(|| hospital_not_found(&id))?;
    service::delete_hospital_cascade(
        state.hospitals.as_ref(),
        state.appointments.as_ref(),
        hospital_id,
    )
    .await?;
    Ok(Json(Deleted { deleted: true }))
}

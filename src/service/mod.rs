//! Operations that span more than one repository

use std::collections::HashMap;

use uuid::Uuid;

use crate::auth::hash_password;
use crate::config::AdminSeed;
use crate::error::{AppError, Result};
use crate::models::{
    Appointment, AppointmentDetail, AppointmentFilter, HospitalSummary, HospitalView, NewUser,
    Role, User,
};
use crate::repository::{AppointmentRepository, HospitalRepository, UserRepository};

pub fn hospital_not_found(id: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("No hospital with the id of {}", id))
}

/// Appointments booked at `hospital_id`, resolved on demand.
pub async fn appointments_for(
    appointments: &dyn AppointmentRepository,
    hospital_id: Uuid,
) -> Result<Vec<Appointment>> {
    appointments
        .list(AppointmentFilter {
            hospital_id: Some(hospital_id),
            ..Default::default()
        })
        .await
}

/// Attach the reverse relation to each hospital view.
pub async fn populate_appointments(
    appointments: &dyn AppointmentRepository,
    views: &mut [HospitalView],
) -> Result<()> {
    for view in views.iter_mut() {
        view.appointments = Some(appointments_for(appointments, view.hospital.id).await?);
    }
    Ok(())
}

/// Delete a hospital and every appointment booked at it.
///
/// Appointments go first; if that fails the hospital is left untouched and
/// the error is returned. The two writes are not wrapped in a transaction.
pub async fn delete_hospital_cascade(
    hospitals: &dyn HospitalRepository,
    appointments: &dyn AppointmentRepository,
    id: Uuid,
) -> Result<()> {
    if hospitals.find_by_id(id).await?.is_none() {
        return Err(hospital_not_found(id));
    }

    let removed = appointments.delete_by_hospital(id).await?;
    tracing::info!(hospital_id = %id, removed, "Appointments removed from hospital");

    if !hospitals.delete(id).await? {
        return Err(hospital_not_found(id));
    }
    Ok(())
}

/// Resolve each appointment's hospital into a display summary.
///
/// A missing hospital means the foreign key was bypassed and is reported as
/// an internal error.
pub async fn with_hospitals(
    hospitals: &dyn HospitalRepository,
    rows: Vec<Appointment>,
) -> Result<Vec<AppointmentDetail>> {
    let mut cache: HashMap<Uuid, Option<HospitalSummary>> = HashMap::new();
    let mut out = Vec::with_capacity(rows.len());

    for appt in rows {
        if !cache.contains_key(&appt.hospital_id) {
            let summary = hospitals
                .find_by_id(appt.hospital_id)
                .await?
                .map(|h| HospitalSummary::from(&h));
            cache.insert(appt.hospital_id, summary);
        }
        let hospital = cache
            .get(&appt.hospital_id)
            .cloned()
            .flatten()
            .ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!(
                    "appointment {} references missing hospital {}",
                    appt.id,
                    appt.hospital_id
                ))
            })?;
        out.push(AppointmentDetail {
            id: appt.id,
            appt_date: appt.appt_date,
            user: appt.user_id,
            hospital,
            created_at: appt.created_at,
        });
    }
    Ok(out)
}

/// Make sure the configured admin account exists. An existing user with the
/// same email is left as is, whatever its role.
pub async fn seed_admin(users: &dyn UserRepository, seed: &AdminSeed) -> Result<User> {
    let email = seed.email.trim().to_lowercase();
    if let Some(existing) = users.find_by_email(&email).await? {
        if existing.role != Role::Admin {
            tracing::warn!(email = %email, "admin seed email belongs to a non-admin user");
        }
        return Ok(existing);
    }

    let user = users
        .create(&NewUser {
            name: seed.name.clone(),
            tel: None,
            email,
            role: Role::Admin,
            password_hash: hash_password(&seed.password)?,
        })
        .await?;
    tracing::info!(user_id = %user.id, "admin account created");
    Ok(user)
}

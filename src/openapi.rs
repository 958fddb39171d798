//! OpenAPI document served at `/api-docs`

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "VacQ API",
        version = "1.0.0",
        description = "Hospitals and vaccination appointment booking API"
    ),
    tags(
        (name = "System", description = "Health check"),
        (name = "Hospitals", description = "The hospitals managing API"),
        (name = "Appointments", description = "Booking appointments at hospitals"),
        (name = "Auth", description = "Registration, login and the current user"),
    ),
    components(schemas(
        crate::models::Hospital,
        crate::models::HospitalInput,
        crate::models::HospitalView,
        crate::models::HospitalSummary,
        crate::models::Appointment,
        crate::models::AppointmentDetail,
        crate::models::CreateAppointmentInput,
        crate::models::UpdateAppointmentInput,
        crate::models::Role,
        crate::models::User,
        crate::models::RegisterInput,
        crate::models::LoginInput,
        crate::models::TokenResponse,
        crate::models::Deleted,
        crate::routes::health::HealthResp,
    )),
    paths(
        crate::routes::health::health,

        crate::routes::hospitals::get_vac_centers,
        crate::routes::hospitals::list_hospitals,
        crate::routes::hospitals::get_hospital,
        crate::routes::hospitals::create_hospital,
        crate::routes::hospitals::update_hospital,
        crate::routes::hospitals::delete_hospital,

        crate::routes::appointments::list_appointments,
        crate::routes::appointments::list_hospital_appointments,
        crate::routes::appointments::get_appointment,
        crate::routes::appointments::add_appointment,
        crate::routes::appointments::update_appointment,
        crate::routes::appointments::delete_appointment,

        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::get_me,
        crate::routes::auth::logout,
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// The generated document plus the bearer security scheme.
    pub fn build() -> utoipa::openapi::OpenApi {
        let mut doc = Self::openapi();
        if let Some(c) = doc.components.as_mut() {
            c.security_schemes.insert(
                "bearer_jwt".to_string(),
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            );
        }
        doc
    }
}

use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{SupabaseClient, SupabaseError};

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, BookAppointmentRequest, ParticipantRef,
};
use crate::services::conflict::{
    validate_participants, validate_schedule_date, ConflictDetectionService,
};
use crate::services::lifecycle::AppointmentLifecycleService;

pub struct AppointmentBookingService {
    supabase: Arc<SupabaseClient>,
    conflict_service: ConflictDetectionService,
    lifecycle_service: AppointmentLifecycleService,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        let conflict_service = ConflictDetectionService::new(Arc::clone(&supabase));
        let lifecycle_service = AppointmentLifecycleService::new();

        Self {
            supabase,
            conflict_service,
            lifecycle_service,
        }
    }

    /// Book a new appointment. Referenced profiles are fetched up front and
    /// handed to the validators; the insert relies on the storage unique
    /// index as the final word on double-booking.
    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking appointment for doctor {} / patient {} at {} {}",
            request.doctor_id, request.patient_id, request.date, request.time
        );

        let doctor = self
            .fetch_participant("doctors", request.doctor_id, auth_token)
            .await?
            .ok_or(AppointmentError::DoctorNotFound)?;
        let patient = self
            .fetch_participant("patients", request.patient_id, auth_token)
            .await?
            .ok_or(AppointmentError::PatientNotFound)?;

        validate_participants(&doctor, &patient)?;
        validate_schedule_date(request.date, Utc::now().date_naive())?;

        let conflicts = self
            .conflict_service
            .find_conflicts(
                request.doctor_id,
                request.patient_id,
                request.date,
                request.time,
                None,
                auth_token,
            )
            .await?;
        if !conflicts.is_empty() {
            return Err(AppointmentError::ConflictDetected);
        }

        let appointment_data = json!({
            "doctor_id": request.doctor_id,
            "patient_id": request.patient_id,
            "date": request.date.format("%Y-%m-%d").to_string(),
            "time": request.time.format("%H:%M:%S").to_string(),
            "status": AppointmentStatus::Pending,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339(),
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let inserted: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(auth_token),
                Some(appointment_data),
                Some(headers),
            )
            .await
            .map_err(|e| match e {
                // Unique (doctor_id, patient_id, date, time) violation: a
                // concurrent booking won the slot after our pre-check.
                SupabaseError::Conflict(_) => {
                    warn!("Storage-level conflict on appointment insert");
                    AppointmentError::ConflictDetected
                }
                other => AppointmentError::Database(other.to_string()),
            })?;

        let row = inserted
            .into_iter()
            .next()
            .ok_or_else(|| AppointmentError::Database("Insert returned no row".to_string()))?;
        let appointment: Appointment = serde_json::from_value(row).map_err(|e| {
            AppointmentError::Database(format!("Failed to parse appointment: {}", e))
        })?;

        info!("Appointment {} booked", appointment.id);
        Ok(appointment)
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Fetching appointment {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        let row = result.into_iter().next().ok_or(AppointmentError::NotFound)?;
        serde_json::from_value(row).map_err(|e| {
            AppointmentError::Database(format!("Failed to parse appointment: {}", e))
        })
    }

    /// Upcoming schedule: open appointments ordered by date, then time.
    pub async fn list_open_ordered(
        &self,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Listing open appointments in schedule order");

        let path =
            "/rest/v1/appointments?status=in.(pending,confirmed)&order=date.asc,time.asc";
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| {
                AppointmentError::Database(format!("Failed to parse appointments: {}", e))
            })
    }

    /// Move an appointment to a new status, subject to the lifecycle rules.
    pub async fn transition(
        &self,
        appointment_id: Uuid,
        new_status: AppointmentStatus,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let current = self.get_appointment(appointment_id, auth_token).await?;

        self.lifecycle_service
            .validate_status_transition(current.status, new_status)?;

        let update = json!({
            "status": new_status,
            "updated_at": Utc::now().to_rfc3339(),
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let updated: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(update),
                Some(headers),
            )
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        let row = updated.into_iter().next().ok_or(AppointmentError::NotFound)?;
        let appointment: Appointment = serde_json::from_value(row).map_err(|e| {
            AppointmentError::Database(format!("Failed to parse appointment: {}", e))
        })?;

        info!("Appointment {} is now {}", appointment.id, appointment.status);
        Ok(appointment)
    }

    async fn fetch_participant(
        &self,
        table: &str,
        id: Uuid,
        auth_token: &str,
    ) -> Result<Option<ParticipantRef>, AppointmentError> {
        let path = format!(
            "/rest/v1/{}?id=eq.{}&select=id,user_id,is_active",
            table, id
        );

        let result: Vec<ParticipantRef> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        Ok(result.into_iter().next())
    }
}

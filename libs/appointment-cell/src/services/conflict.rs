use chrono::{NaiveDate, NaiveTime};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::SupabaseClient;

use crate::models::{Appointment, AppointmentError, ParticipantRef};

/// Scheduling invariants for a candidate appointment. The stored lookup here
/// is an optimization; the unique index on (doctor_id, patient_id, date,
/// time) remains the authoritative guard at insert time.
pub struct ConflictDetectionService {
    supabase: Arc<SupabaseClient>,
}

impl ConflictDetectionService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Appointments already persisted for this doctor-patient pair at the
    /// same date and time, excluding the candidate's own row when updating.
    pub async fn find_conflicts(
        &self,
        doctor_id: Uuid,
        patient_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        exclude_appointment_id: Option<Uuid>,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        debug!(
            "Checking conflicts for doctor {} / patient {} at {} {}",
            doctor_id, patient_id, date, time
        );

        let mut query_parts = vec![
            format!("doctor_id=eq.{}", doctor_id),
            format!("patient_id=eq.{}", patient_id),
            format!("date=eq.{}", date.format("%Y-%m-%d")),
            format!("time=eq.{}", time.format("%H:%M:%S")),
        ];

        if let Some(exclude_id) = exclude_appointment_id {
            query_parts.push(format!("id=neq.{}", exclude_id));
        }

        let path = format!("/rest/v1/appointments?{}", query_parts.join("&"));

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        let conflicts: Vec<Appointment> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| {
                AppointmentError::Database(format!("Failed to parse appointments: {}", e))
            })?;

        if !conflicts.is_empty() {
            warn!(
                "Conflict detected for doctor {} / patient {}: {} existing appointment(s)",
                doctor_id,
                patient_id,
                conflicts.len()
            );
        }

        Ok(conflicts)
    }
}

/// Both bound account identities must still be active.
pub fn validate_participants(
    doctor: &ParticipantRef,
    patient: &ParticipantRef,
) -> Result<(), AppointmentError> {
    if !doctor.is_active || !patient.is_active {
        return Err(AppointmentError::ParticipantInactive);
    }
    Ok(())
}

/// Date-only comparison: booking for later today is allowed, any earlier
/// calendar date is not.
pub fn validate_schedule_date(date: NaiveDate, today: NaiveDate) -> Result<(), AppointmentError> {
    if date < today {
        return Err(AppointmentError::DateInPast);
    }
    Ok(())
}

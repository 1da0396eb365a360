// libs/appointment-cell/src/services/workflow.rs
use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use auth_cell::AppState;
use security_cell::{AuditEventType, AuditService};
use shared_database::{AccountStore, AppointmentGuard, AppointmentStore, UpdateOutcome};
use shared_models::{
    account::AccountId,
    appointment::{
        is_consistent, Appointment, AppointmentId, AppointmentPatch, AppointmentStatus, NewAppointment,
    },
    auth::Role,
};
use shared_utils::validation::optional_text;

use crate::models::{
    AppointmentError, AppointmentRequest, AssignDoctorRequest, CancelActor, EditAppointmentRequest,
    ScheduleAppointmentRequest, WorkflowAction,
};

/// Status reached by applying `action` to an appointment in `current`, or
/// `None` if the transition table does not allow it. `Edit` is not part of
/// the table.
pub fn next_status(current: AppointmentStatus, action: WorkflowAction) -> Option<AppointmentStatus> {
    use AppointmentStatus::*;

    match (current, action) {
        (Requested, WorkflowAction::AssignDoctor) => Some(AssignedPendingDoctor),
        (AssignedPendingDoctor, WorkflowAction::Accept) => Some(Accepted),
        (AssignedPendingDoctor, WorkflowAction::Refuse) => Some(Refused),
        (Cancelled, WorkflowAction::Cancel) => None,
        (Requested | AssignedPendingDoctor | Accepted | Refused, WorkflowAction::Cancel) => Some(Cancelled),
        (_, WorkflowAction::RequestAppointment | WorkflowAction::ScheduleDirect | WorkflowAction::Edit) => None,
        (_, WorkflowAction::AssignDoctor | WorkflowAction::Accept | WorkflowAction::Refuse) => None,
    }
}

/// Appointment state machine. Every transition is a single conditional
/// store update whose guard restates the transition's preconditions.
pub struct AppointmentWorkflow {
    appointments: Arc<dyn AppointmentStore>,
    accounts: Arc<dyn AccountStore>,
    audit: Arc<AuditService>,
}

impl AppointmentWorkflow {
    pub fn new(state: &AppState) -> Self {
        Self {
            appointments: state.appointments.clone(),
            accounts: state.accounts.clone(),
            audit: state.audit.clone(),
        }
    }

    pub async fn request_appointment(
        &self,
        patient_id: AccountId,
        request: AppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self
            .appointments
            .insert(NewAppointment {
                date: request.date,
                time: request.time,
                symptoms: optional_text(request.symptoms),
                patient_id,
                doctor_id: None,
                status: AppointmentStatus::Requested,
            })
            .await?;

        info!("Patient {} requested appointment {}", patient_id, appointment.id);
        Ok(appointment)
    }

    pub async fn schedule_direct(
        &self,
        request: ScheduleAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        if self.accounts.find_by_id(Role::Patient, request.patient_id).await?.is_none() {
            return Err(AppointmentError::PatientNotFound);
        }
        self.ensure_doctor_exists(request.doctor_id).await?;

        let appointment = self
            .appointments
            .insert(NewAppointment {
                date: request.date,
                time: request.time,
                symptoms: optional_text(request.symptoms),
                patient_id: request.patient_id,
                doctor_id: Some(request.doctor_id),
                status: AppointmentStatus::AssignedPendingDoctor,
            })
            .await?;
        self.confirm_doctor_after_write(request.doctor_id).await?;

        info!(
            "Scheduled appointment {} for patient {} with doctor {}",
            appointment.id, request.patient_id, request.doctor_id
        );
        Ok(appointment)
    }

    pub async fn assign_doctor(
        &self,
        id: AppointmentId,
        request: AssignDoctorRequest,
    ) -> Result<Appointment, AppointmentError> {
        let action = WorkflowAction::AssignDoctor;

        // Fail fast on the appointment before looking up the doctor.
        let current = self.find(id).await?;
        let target = next_status(current.status, action)
            .ok_or(AppointmentError::InvalidTransition { action, status: current.status })?;
        self.ensure_doctor_exists(request.doctor_id).await?;

        let guard = AppointmentGuard::any().in_status(AppointmentStatus::Requested);
        let patch = AppointmentPatch {
            date: request.date,
            time: request.time,
            status: Some(target),
            doctor_id: Some(Some(request.doctor_id)),
        };

        let appointment = match self.appointments.update_where(id, &guard, &patch).await? {
            UpdateOutcome::Updated(appointment) => appointment,
            UpdateOutcome::NotFound => return Err(AppointmentError::NotFound),
            UpdateOutcome::Rejected(current) => {
                return Err(AppointmentError::InvalidTransition { action, status: current.status })
            }
        };
        self.confirm_doctor_after_write(request.doctor_id).await?;

        info!("Assigned doctor {} to appointment {}", request.doctor_id, id);
        Ok(appointment)
    }

    pub async fn accept(&self, doctor_id: AccountId, id: AppointmentId) -> Result<Appointment, AppointmentError> {
        self.doctor_decision(doctor_id, id, WorkflowAction::Accept).await
    }

    pub async fn refuse(&self, doctor_id: AccountId, id: AppointmentId) -> Result<Appointment, AppointmentError> {
        self.doctor_decision(doctor_id, id, WorkflowAction::Refuse).await
    }

    async fn doctor_decision(
        &self,
        doctor_id: AccountId,
        id: AppointmentId,
        action: WorkflowAction,
    ) -> Result<Appointment, AppointmentError> {
        let target = next_status(AppointmentStatus::AssignedPendingDoctor, action)
            .ok_or(AppointmentError::InvalidTransition {
                action,
                status: AppointmentStatus::AssignedPendingDoctor,
            })?;
        let guard = AppointmentGuard::any()
            .in_status(AppointmentStatus::AssignedPendingDoctor)
            .assigned_to(Some(doctor_id));

        match self.appointments.update_where(id, &guard, &AppointmentPatch::status(target)).await? {
            UpdateOutcome::Updated(appointment) => {
                info!("Doctor {} moved appointment {} to {}", doctor_id, id, target);
                Ok(appointment)
            }
            UpdateOutcome::NotFound => Err(AppointmentError::NotFound),
            // Another doctor's appointment is reported as missing.
            UpdateOutcome::Rejected(current) if current.doctor_id != Some(doctor_id) => {
                debug!("Doctor {} is not assigned to appointment {}", doctor_id, id);
                Err(AppointmentError::NotFound)
            }
            UpdateOutcome::Rejected(current) => {
                Err(AppointmentError::InvalidTransition { action, status: current.status })
            }
        }
    }

    pub async fn cancel(&self, actor: CancelActor, id: AppointmentId) -> Result<Appointment, AppointmentError> {
        let mut guard = AppointmentGuard::any().not_in_status(AppointmentStatus::Cancelled);
        if let CancelActor::Patient(patient_id) = actor {
            guard = guard.owned_by(patient_id);
        }

        let appointment = match self
            .appointments
            .update_where(id, &guard, &AppointmentPatch::status(AppointmentStatus::Cancelled))
            .await?
        {
            UpdateOutcome::Updated(appointment) => appointment,
            UpdateOutcome::NotFound => return Err(AppointmentError::NotFound),
            UpdateOutcome::Rejected(current) => {
                return Err(match actor {
                    CancelActor::Patient(patient_id) if current.patient_id != patient_id => {
                        AppointmentError::NotFound
                    }
                    CancelActor::Patient(_) | CancelActor::Secretary(_) => AppointmentError::AlreadyCancelled,
                })
            }
        };

        self.audit
            .log_appointment_change(
                AuditEventType::AppointmentCancelled,
                (actor.role(), actor.account_id()),
                id,
                json!({ "statut": appointment.status }),
            )
            .await;

        info!("Appointment {} cancelled by {} {}", id, actor.role(), actor.account_id());
        Ok(appointment)
    }

    /// Secretary correction outside the transition table. Still keeps the
    /// doctor invariant and never moves an appointment out of `Cancelled`.
    pub async fn edit(
        &self,
        secretary_id: AccountId,
        id: AppointmentId,
        request: EditAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let patch = AppointmentPatch {
            date: request.date,
            time: request.time,
            status: request.status,
            doctor_id: request.doctor_id,
        };
        if patch.is_empty() {
            return Err(AppointmentError::Validation("Nothing to update".to_string()));
        }

        let current = self.find(id).await?;
        if let Some(Some(doctor_id)) = patch.doctor_id {
            self.ensure_doctor_exists(doctor_id).await?;
        }

        if current.status == AppointmentStatus::Cancelled
            && patch.status.is_some_and(|status| status != AppointmentStatus::Cancelled)
        {
            return Err(AppointmentError::InvalidTransition {
                action: WorkflowAction::Edit,
                status: current.status,
            });
        }

        let mut edited = current.clone();
        patch.apply(&mut edited);
        if !is_consistent(edited.status, edited.doctor_id) {
            return Err(AppointmentError::Validation(format!(
                "Status {} requires an assigned doctor",
                edited.status
            )));
        }

        // The checks above hold only if nothing changed since `current` was read.
        let guard = AppointmentGuard::any()
            .in_status(current.status)
            .assigned_to(current.doctor_id);

        let appointment = match self.appointments.update_where(id, &guard, &patch).await? {
            UpdateOutcome::Updated(appointment) => appointment,
            UpdateOutcome::NotFound => return Err(AppointmentError::NotFound),
            UpdateOutcome::Rejected(_) => {
                warn!("Appointment {} changed during edit", id);
                return Err(AppointmentError::ConcurrentModification);
            }
        };
        if let Some(Some(doctor_id)) = patch.doctor_id {
            self.confirm_doctor_after_write(doctor_id).await?;
        }

        self.audit
            .log_appointment_change(
                AuditEventType::AppointmentEdited,
                (Role::Secretary, secretary_id),
                id,
                json!({ "before": current, "after": appointment }),
            )
            .await;

        info!("Secretary {} edited appointment {}", secretary_id, id);
        Ok(appointment)
    }

    async fn find(&self, id: AppointmentId) -> Result<Appointment, AppointmentError> {
        self.appointments.find(id).await?.ok_or(AppointmentError::NotFound)
    }

    async fn ensure_doctor_exists(&self, doctor_id: AccountId) -> Result<(), AppointmentError> {
        match self.accounts.find_by_id(Role::Doctor, doctor_id).await? {
            Some(_) => Ok(()),
            None => Err(AppointmentError::DoctorNotFound),
        }
    }

    /// The existence check and the write are separate store calls, so a
    /// doctor deleted in between leaves a dangling reference. Such
    /// appointments go back to the secretaries' queue.
    async fn confirm_doctor_after_write(&self, doctor_id: AccountId) -> Result<(), AppointmentError> {
        if self.accounts.find_by_id(Role::Doctor, doctor_id).await?.is_some() {
            return Ok(());
        }

        let released = self.appointments.release_doctor(doctor_id).await?;
        warn!(
            "Doctor {} was deleted during the update, released {} appointments",
            doctor_id,
            released.len()
        );
        Err(AppointmentError::DoctorNotFound)
    }
}

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::{AccountId, AccountSummary};

pub type AppointmentId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[serde(rename = "en_attente_secretaire", alias = "requested")]
    Requested,
    #[serde(rename = "en_attente_docteur", alias = "assigned_pending_doctor")]
    AssignedPendingDoctor,
    #[serde(rename = "accepte", alias = "accepted")]
    Accepted,
    #[serde(rename = "refuse", alias = "refused")]
    Refused,
    #[serde(rename = "annule", alias = "cancelled")]
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 5] = [
        AppointmentStatus::Requested,
        AppointmentStatus::AssignedPendingDoctor,
        AppointmentStatus::Accepted,
        AppointmentStatus::Refused,
        AppointmentStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Requested => "en_attente_secretaire",
            AppointmentStatus::AssignedPendingDoctor => "en_attente_docteur",
            AppointmentStatus::Accepted => "accepte",
            AppointmentStatus::Refused => "refuse",
            AppointmentStatus::Cancelled => "annule",
        }
    }

    /// States in which an appointment must reference a doctor.
    pub fn requires_doctor(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::AssignedPendingDoctor
                | AppointmentStatus::Accepted
                | AppointmentStatus::Refused
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        AppointmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| format!("Unknown appointment status: {}", value))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub date: NaiveDate,
    #[serde(rename = "heure", with = "clock_time")]
    pub time: NaiveTime,
    #[serde(rename = "statut")]
    pub status: AppointmentStatus,
    #[serde(rename = "symptomes")]
    pub symptoms: Option<String>,
    pub patient_id: AccountId,
    #[serde(rename = "docteur_id")]
    pub doctor_id: Option<AccountId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// `doctor_id` is set whenever the status requires one.
    pub fn is_consistent(&self) -> bool {
        is_consistent(self.status, self.doctor_id)
    }
}

pub fn is_consistent(status: AppointmentStatus, doctor_id: Option<AccountId>) -> bool {
    !status.requires_doctor() || doctor_id.is_some()
}

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub symptoms: Option<String>,
    pub patient_id: AccountId,
    pub doctor_id: Option<AccountId>,
    pub status: AppointmentStatus,
}

/// Field-level change applied in a single store write. `None` leaves the
/// field untouched; `doctor_id: Some(None)` clears the assignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentPatch {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub status: Option<AppointmentStatus>,
    pub doctor_id: Option<Option<AccountId>>,
}

impl AppointmentPatch {
    pub fn status(status: AppointmentStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.time.is_none() && self.status.is_none() && self.doctor_id.is_none()
    }

    pub fn apply(&self, appointment: &mut Appointment) {
        if let Some(date) = self.date {
            appointment.date = date;
        }
        if let Some(time) = self.time {
            appointment.time = time;
        }
        if let Some(status) = self.status {
            appointment.status = status;
        }
        if let Some(doctor_id) = self.doctor_id {
            appointment.doctor_id = doctor_id;
        }
    }
}

/// Appointment with the patient and doctor it references, as listed to callers.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentDetails {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient: Option<AccountSummary>,
    #[serde(rename = "docteur")]
    pub doctor: Option<AccountSummary>,
}

/// `HH:MM` on the wire; seconds are kept only when present.
pub mod clock_time {
    use chrono::{NaiveTime, Timelike};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn format(time: &NaiveTime) -> String {
        if time.second() == 0 && time.nanosecond() == 0 {
            time.format("%H:%M").to_string()
        } else {
            time.format("%H:%M:%S").to_string()
        }
    }

    pub fn parse(value: &str) -> Result<NaiveTime, String> {
        NaiveTime::parse_from_str(value, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
            .map_err(|_| format!("Invalid time '{}', expected HH:MM", value))
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let value = String::deserialize(deserializer)?;
        parse(&value).map_err(D::Error::custom)
    }

    pub mod option {
        use chrono::NaiveTime;
        use serde::{de::Error, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error> {
            match time {
                Some(time) => serializer.serialize_str(&super::format(time)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|value| super::parse(&value).map_err(D::Error::custom))
                .transpose()
        }
    }
}

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{AvailabilityRequest, CalendarQuery, DoctorDirectory, DoctorError};
pub use services::DoctorService;

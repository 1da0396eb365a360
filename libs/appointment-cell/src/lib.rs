pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{AppointmentError, CancelActor, WorkflowAction};
pub use services::{AppointmentQueries, AppointmentWorkflow};

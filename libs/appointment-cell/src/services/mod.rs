pub mod queries;
pub mod workflow;

pub use queries::AppointmentQueries;
pub use workflow::{next_status, AppointmentWorkflow};

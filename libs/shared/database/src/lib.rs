pub mod memory;
pub mod redis_sessions;
pub mod sessions;
pub mod store;

pub use memory::{InMemoryAccountStore, InMemoryAppointmentStore};
pub use redis_sessions::RedisSessionRegistry;
pub use sessions::{InMemorySessionRegistry, SessionRegistry};
pub use store::{
    AccountStore, AppointmentFilter, AppointmentGuard, AppointmentOrder, AppointmentStore,
    StoreError, UpdateOutcome,
};

pub mod clock;
pub mod pg_storage;
pub mod rental_ops;
pub mod session;
pub mod sms_service;
pub mod storage;
pub mod store;
pub mod views;

pub use clock::{Clock, FixedClock, SystemClock};
pub use pg_storage::PgStorage;
pub use rental_ops::RentalData;
pub use session::{SessionService, SessionState};
pub use sms_service::SmsService;
pub use storage::{KeyValueStorage, MemoryStorage, StorageEvent, StorageKey};
pub use store::RentalStore;

pub mod complaint;
pub mod dashboard;
pub mod payment;
pub mod property;
pub mod user;

pub use complaint::*;
pub use dashboard::*;
pub use payment::*;
pub use property::*;
pub use user::*;

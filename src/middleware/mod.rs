pub mod session;

pub use session::{require_owner, require_tenant, session_middleware, AppState, CurrentUser};

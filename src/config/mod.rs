pub mod app;
pub mod session;

pub use app::{AppConfig, Environment};
pub use session::{SessionConfig, SessionLayer};

//! credence-serve: HTTP prediction service and training command for
//! `credence-features` pipelines.
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod settings;
pub mod state;
pub mod train;

pub use error::{AppError, AppResult};
pub use router::create_router;
pub use settings::Settings;
pub use state::{AppState, SharedState};

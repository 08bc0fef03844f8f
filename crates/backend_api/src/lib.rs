pub mod error;
pub mod handlers;
pub mod reader;
pub mod repository;
pub mod router;
pub mod server;

pub use error::{ApiError, Result};
pub use reader::parse_grid;
pub use repository::{FileGridRepository, GridRepository};
pub use router::create_router;
pub use server::run_server;

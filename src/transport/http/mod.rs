pub mod router;
pub mod types;
pub mod handlers {
    pub mod common;
    pub mod exercises;
    pub mod health;
    pub mod leaderboard;
    pub mod sessions;
}

pub use router::{create_router, ApiDoc};
pub use types::AppState;

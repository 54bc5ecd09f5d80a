pub mod extract;
pub mod films;
pub mod reference;
pub mod routes;
pub mod state;
pub mod users;

pub use routes::create_router;
pub use state::AppState;

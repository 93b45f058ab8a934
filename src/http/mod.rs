// HTTP server module

pub mod response;
pub mod routes;
pub mod server;

pub use response::Envelope;
pub use routes::{router, AppState};
pub use server::HttpServer;

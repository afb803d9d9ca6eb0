mod diagnostics;
mod routes;
mod server;
mod state;

#[cfg(test)]
mod testing;

pub use server::{router, GatewayServer};
pub use state::AppState;

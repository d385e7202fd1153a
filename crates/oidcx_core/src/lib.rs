//! Server side of the oidcx proxy: the accept loop and the request handler.

pub mod master;
pub mod state;
pub mod worker;

pub use master::{Master, shutdown_signal};
pub use state::AppState;
pub use worker::{Route, RouteTable, handle_request};

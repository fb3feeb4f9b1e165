// Interface adapters: HTTP contract, handlers and store adapters.

pub mod handlers;
pub mod protocol;
pub mod routes;
pub mod state;

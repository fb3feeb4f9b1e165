// Use cases for resolving identity, joining a room and upgrading a guest.

pub mod bootstrap;
pub mod exchange;
pub mod join_flow;
pub mod resolve_identity;
pub mod upgrade_identity;

#[cfg(test)]
pub(crate) mod test_support;

// Use cases layer: backend workflows behind the join contract.

pub mod authenticate;
pub mod issue_room;
pub mod join_room;
pub mod sign_in;
pub mod upgrade_identity;

#[cfg(test)]
pub(crate) mod test_support;

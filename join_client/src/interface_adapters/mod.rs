// Adapters between the join core and the outside world: HTTP backend, storage, navigation.

pub mod clients;
pub mod navigation;
pub mod protocol;
pub mod storage;

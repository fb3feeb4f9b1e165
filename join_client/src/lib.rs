pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod use_cases;

pub use domain::{JoinError, JoinPorts, JoinResult, JoinState, RoomCode};
pub use frameworks::runner::{RunError, SystemClock, build_ports, join, run, upgrade_use_case};
pub use use_cases::join_flow::JoinFlow;

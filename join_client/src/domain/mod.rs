// Domain layer: room codes, identities and the join state machine.

pub mod best_effort;
pub mod errors;
pub mod flow;
pub mod identity;
pub mod join;
pub mod ports;
pub mod room_code;

pub use best_effort::BestEffort;
pub use errors::{BackendError, JoinError, StorageError};
pub use flow::{Effect, JoinEvent, JoinState, Transition, transition};
pub use identity::{
    DisplayNameError, Identity, PendingUpgrade, PriorGuest, Profile, Session, SessionContext,
    validate_display_name,
};
pub use join::{IdentityUpgrade, JoinResult, Permission, TokenExchange, UpgradeReceipt};
pub use ports::{
    AccountAuth, AnonymousAuth, Clock, IdentityMerge, JoinPorts, Navigator, ProfileProvider,
    RoomGateway, SessionStorage, StoredState,
};
pub use room_code::{FormatError, ROOM_CODE_LEN, RoomCode, format_for_display, normalize};

// Domain layer: identities, room codes and the rules that govern them.

pub mod entities;
pub mod errors;
pub mod ports;
pub mod rules;

pub use entities::{ActivityEntry, Permission, Profile, RoomShare, Session};
pub use errors::RoomError;
pub use ports::{ActivityLog, Clock, ProfileStore, RoomStore, SessionStore};

// Domain-level errors for session, room and identity workflows.
#[derive(Debug, PartialEq)]
pub enum RoomError {
    InvalidDisplayName,
    InvalidEmail,
    EmailTaken,
    AccountNotFound,
    MalformedRoomCode,
    InvalidRoomSettings,
    Unauthenticated,
    SessionExpired,
    RegistrationRequired,
    RoomNotFound,
    RoomExpired,
    RoomFull,
    GuestNotFound,
    NotAGuest,
    AlreadyConverted,
    CodeSpaceExhausted,
    StorageFailure,
}

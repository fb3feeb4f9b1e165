use crate::domain::entities::{Profile, Session};
use crate::domain::errors::RoomError;
use crate::domain::ports::{ActivityLog, ProfileStore};
use crate::interface_adapters::protocol::{
    ActivityEntryResponse, AnonymousSignInRequest, ErrorResponse, IssueRoomBody,
    IssueRoomResponse, JoinRoomRequest, JoinRoomResponse, ProfileResponse, RegisterRequest,
    SessionResponse, SignInRequest, UpgradeRequest, UpgradeResponse,
};
use crate::interface_adapters::state::{AppState, SystemClock};
use crate::use_cases::authenticate::AuthenticateUseCase;
use crate::use_cases::issue_room::{IssueRoomRequest, IssueRoomUseCase};
use crate::use_cases::join_room::JoinRoomUseCase;
use crate::use_cases::sign_in::{
    AnonymousSignInUseCase, IssuedSession, RegisterUseCase, SignInUseCase,
};
use crate::use_cases::upgrade_identity::UpgradeIdentityUseCase;
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
};
use tracing::{error, info, warn};

// Session lifetime for issued access tokens (in seconds).
const SESSION_TTL_SECONDS: u64 = 60 * 60;

type HandlerError = (StatusCode, Json<ErrorResponse>);

// Handler for anonymous (guest) sign-in.
#[tracing::instrument(name = "anonymous_sign_in", skip_all)]
pub async fn anonymous_sign_in(
    State(state): State<AppState>,
    Json(payload): Json<AnonymousSignInRequest>,
) -> Result<Json<SessionResponse>, HandlerError> {
    let use_case = AnonymousSignInUseCase {
        clock: SystemClock,
        sessions: state.session_store(),
        profiles: state.profile_store(),
        ttl_seconds: SESSION_TTL_SECONDS,
    };

    let issued = use_case
        .execute(payload.display_name)
        .await
        .map_err(map_room_error)?;

    info!(user_id = %issued.user_id, "guest session created");
    mirror_profiles(&state, &[&issued.profile]).await;

    Ok(Json(session_response(issued)))
}

// Handler for registering a durable identity.
#[tracing::instrument(name = "register", skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<SessionResponse>, HandlerError> {
    let use_case = RegisterUseCase {
        clock: SystemClock,
        sessions: state.session_store(),
        profiles: state.profile_store(),
        ttl_seconds: SESSION_TTL_SECONDS,
    };

    let issued = use_case
        .execute(&payload.email, payload.display_name)
        .await
        .map_err(map_room_error)?;

    info!(user_id = %issued.user_id, "registered session created");
    mirror_profiles(&state, &[&issued.profile]).await;

    Ok(Json(session_response(issued)))
}

// Handler for signing in to an existing registered account.
#[tracing::instrument(name = "sign_in", skip_all)]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> Result<Json<SessionResponse>, HandlerError> {
    let use_case = SignInUseCase {
        clock: SystemClock,
        sessions: state.session_store(),
        profiles: state.profile_store(),
        ttl_seconds: SESSION_TTL_SECONDS,
    };

    let issued = use_case
        .execute(&payload.email)
        .await
        .map_err(map_room_error)?;

    info!(user_id = %issued.user_id, "registered session opened");
    Ok(Json(session_response(issued)))
}

// Handler for profile lookup by user id.
#[tracing::instrument(name = "get_profile", skip_all, fields(user_id = %user_id))]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileResponse>, HandlerError> {
    let profile = state
        .profile_store()
        .get(&user_id)
        .await
        .map_err(|_| map_room_error(RoomError::StorageFailure))?
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "profile not found"))?;

    Ok(Json(ProfileResponse {
        user_id: profile.user_id,
        display_name: profile.display_name,
        email: profile.email,
        avatar_url: profile.avatar_url,
        is_anonymous: profile.is_anonymous,
        converted_user_id: profile.converted_user_id,
    }))
}

// Handler for exchanging a room code for map access.
#[tracing::instrument(name = "join_room", skip_all)]
pub async fn join_room(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<JoinRoomRequest>,
) -> Result<Json<JoinRoomResponse>, HandlerError> {
    let session = authenticate(&state, &headers).await?;
    let use_case = JoinRoomUseCase {
        clock: SystemClock,
        rooms: state.room_store(),
        profiles: state.profile_store(),
        activity: state.activity_log(),
    };

    let outcome = use_case
        .execute(&session, &payload.token, payload.display_name)
        .await
        .map_err(map_room_error)?;

    info!(
        user_id = %session.user_id,
        map_id = %outcome.map_id,
        current_users = outcome.current_users,
        "room joined"
    );

    Ok(Json(JoinRoomResponse {
        map_id: outcome.map_id,
        map_title: outcome.map_title,
        permissions: outcome.permissions,
        is_guest: outcome.is_guest,
        current_users: outcome.current_users,
        max_users: outcome.max_users,
    }))
}

// Handler for issuing a new room code.
#[tracing::instrument(name = "issue_room", skip_all)]
pub async fn issue_room(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<IssueRoomBody>,
) -> Result<Json<IssueRoomResponse>, HandlerError> {
    let session = authenticate(&state, &headers).await?;
    let use_case = IssueRoomUseCase {
        clock: SystemClock,
        rooms: state.room_store(),
    };

    let issued = use_case
        .execute(
            &session,
            IssueRoomRequest {
                map_id: payload.map_id,
                map_title: payload.map_title,
                permissions: payload.permissions,
                max_users: payload.max_users,
                ttl_seconds: payload.ttl_seconds,
            },
        )
        .await
        .map_err(map_room_error)?;

    Ok(Json(IssueRoomResponse {
        display_token: format!("{}-{}", &issued.token[..3], &issued.token[3..]),
        token: issued.token,
        expires_at: issued.expires_at,
    }))
}

// Handler for the guest-to-registered merge.
#[tracing::instrument(name = "upgrade_identity", skip_all, fields(guest_user_id = %payload.guest_user_id))]
pub async fn upgrade_identity(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UpgradeRequest>,
) -> Result<Json<UpgradeResponse>, HandlerError> {
    let session = authenticate(&state, &headers).await?;
    let use_case = UpgradeIdentityUseCase {
        profiles: state.profile_store(),
        rooms: state.room_store(),
        activity: state.activity_log(),
    };

    let outcome = use_case
        .execute(&session, &payload.guest_user_id, payload.display_name)
        .await
        .map_err(map_room_error)?;

    mirror_profiles(&state, &[&outcome.guest, &outcome.registered]).await;

    Ok(Json(UpgradeResponse {
        converted: outcome.converted,
        display_name: outcome.display_name,
        reattributed_activity: outcome.reattributed_activity,
        reassigned_rooms: outcome.reassigned_rooms,
    }))
}

// Handler listing the activity log of a map.
pub async fn map_activity(
    State(state): State<AppState>,
    Path(map_id): Path<String>,
) -> Result<Json<Vec<ActivityEntryResponse>>, HandlerError> {
    let entries = state
        .activity_log()
        .list_for_map(&map_id)
        .await
        .map_err(|_| map_room_error(RoomError::StorageFailure))?;

    Ok(Json(
        entries
            .into_iter()
            .map(|entry| ActivityEntryResponse {
                id: entry.id,
                map_id: entry.map_id,
                user_id: entry.user_id,
                action: entry.action,
                created_at: entry.created_at,
            })
            .collect(),
    ))
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Session, HandlerError> {
    let token = bearer_token(headers)
        .ok_or_else(|| error_response(StatusCode::UNAUTHORIZED, "missing bearer token"))?;
    let use_case = AuthenticateUseCase {
        clock: SystemClock,
        store: state.session_store(),
    };

    use_case.execute(token).await.map_err(map_room_error)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// Best-effort persistence of profiles for downstream services.
async fn mirror_profiles(state: &AppState, profiles: &[&Profile]) {
    let Some(mirror) = state.profile_mirror() else {
        return;
    };
    for profile in profiles {
        if let Err(err) = mirror.upsert_profile(profile).await {
            warn!(error = %err, user_id = %profile.user_id, "failed to mirror profile");
        }
    }
}

fn session_response(issued: IssuedSession) -> SessionResponse {
    SessionResponse {
        user_id: issued.user_id,
        access_token: issued.access_token,
        expires_at: issued.expires_at,
        is_anonymous: issued.is_anonymous,
        display_name: issued.display_name,
    }
}

// Helper to build a JSON error response.
fn error_response(status: StatusCode, message: &str) -> HandlerError {
    (
        status,
        Json(ErrorResponse {
            message: message.to_string(),
        }),
    )
}

// Maps domain errors to HTTP responses; clients branch on these statuses.
fn map_room_error(err: RoomError) -> HandlerError {
    match err {
        RoomError::InvalidDisplayName => {
            error_response(StatusCode::BAD_REQUEST, "invalid display_name")
        }
        RoomError::InvalidEmail => error_response(StatusCode::BAD_REQUEST, "invalid email"),
        RoomError::EmailTaken => error_response(StatusCode::CONFLICT, "email already registered"),
        RoomError::AccountNotFound => error_response(StatusCode::NOT_FOUND, "account not found"),
        RoomError::MalformedRoomCode => {
            error_response(StatusCode::BAD_REQUEST, "invalid room code format")
        }
        RoomError::InvalidRoomSettings => {
            error_response(StatusCode::BAD_REQUEST, "invalid room settings")
        }
        RoomError::Unauthenticated => {
            error_response(StatusCode::UNAUTHORIZED, "invalid session token")
        }
        RoomError::SessionExpired => error_response(StatusCode::UNAUTHORIZED, "session expired"),
        RoomError::RegistrationRequired => {
            error_response(StatusCode::FORBIDDEN, "registered account required")
        }
        RoomError::RoomNotFound => error_response(StatusCode::NOT_FOUND, "room code not found"),
        RoomError::RoomExpired => error_response(StatusCode::GONE, "room code expired"),
        RoomError::RoomFull => error_response(StatusCode::FORBIDDEN, "room is full"),
        RoomError::GuestNotFound => error_response(StatusCode::NOT_FOUND, "guest not found"),
        RoomError::NotAGuest => error_response(StatusCode::BAD_REQUEST, "identity is not a guest"),
        RoomError::AlreadyConverted => {
            error_response(StatusCode::CONFLICT, "guest already converted")
        }
        RoomError::CodeSpaceExhausted => {
            error!("room code allocation exhausted its attempts");
            error_response(StatusCode::SERVICE_UNAVAILABLE, "could not allocate room code")
        }
        RoomError::StorageFailure => {
            error!("storage failure while handling request");
            error_response(StatusCode::BAD_GATEWAY, "storage error")
        }
    }
}

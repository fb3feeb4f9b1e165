use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::flow::{Effect, JoinEvent, JoinState, Transition, transition};
use crate::domain::identity::SessionContext;
use crate::domain::ports::JoinPorts;
use crate::use_cases::bootstrap::SessionBootstrapper;
use crate::use_cases::exchange::TokenExchangeUseCase;
use crate::use_cases::resolve_identity::ResolveIdentityUseCase;

/// Drives one join flow: applies transitions under the state lock and
/// performs their effects with the lock released.
pub struct JoinFlow {
    ports: JoinPorts,
    state: Mutex<JoinState>,
    context: Mutex<SessionContext>,
}

impl JoinFlow {
    pub fn new(ports: JoinPorts) -> Self {
        Self {
            ports,
            state: Mutex::new(JoinState::Unknown),
            context: Mutex::new(SessionContext::default()),
        }
    }

    // Resolves the identity; must complete before a submit has any effect.
    pub async fn start(&self) -> JoinState {
        self.dispatch(JoinEvent::Mounted).await
    }

    pub async fn submit(&self, code: &str, display_name: Option<&str>) -> JoinState {
        self.dispatch(JoinEvent::Submitted {
            code: code.to_string(),
            display_name: display_name.map(str::to_string),
        })
        .await
    }

    pub async fn retry(&self) -> JoinState {
        self.dispatch(JoinEvent::Retry).await
    }

    pub async fn state(&self) -> JoinState {
        self.state.lock().await.clone()
    }

    pub async fn context(&self) -> SessionContext {
        self.context.lock().await.clone()
    }

    async fn dispatch(&self, event: JoinEvent) -> JoinState {
        let mut next = Some(event);

        while let Some(event) = next.take() {
            let effect = {
                let mut state = self.state.lock().await;
                let current = std::mem::replace(&mut *state, JoinState::Unknown);
                let Transition {
                    state: updated,
                    effect,
                } = transition(current, event);
                debug!(state = updated.name(), "join state");
                *state = updated;
                effect
            };

            if let Some(effect) = effect {
                next = self.perform(effect).await;
            }
        }

        self.state().await
    }

    async fn perform(&self, effect: Effect) -> Option<JoinEvent> {
        match effect {
            Effect::CheckSession => {
                let resolver = ResolveIdentityUseCase {
                    storage: self.ports.storage.clone(),
                    profiles: self.ports.profiles.clone(),
                    clock: self.ports.clock.clone(),
                };
                let context = resolver.execute().await;
                let identity = context.identity();
                *self.context.lock().await = context;
                Some(JoinEvent::IdentityResolved(identity))
            }
            Effect::SignInAnonymously { display_name } => {
                let mut context = self.context().await;
                match self.bootstrapper().sign_in(&mut context, &display_name).await {
                    Ok(()) => {
                        *self.context.lock().await = context;
                        Some(JoinEvent::Bootstrapped)
                    }
                    Err(err) => Some(JoinEvent::BootstrapFailed(err)),
                }
            }
            Effect::ReuseGuestSession { display_name } => {
                let mut context = self.context.lock().await;
                match self.bootstrapper().reuse_guest(&mut context, &display_name) {
                    Ok(()) => Some(JoinEvent::Bootstrapped),
                    Err(err) => Some(JoinEvent::BootstrapFailed(err)),
                }
            }
            Effect::ExchangeToken { code, display_name } => {
                let context = self.context().await;
                let exchange = TokenExchangeUseCase {
                    rooms: self.ports.rooms.clone(),
                };
                match exchange.execute(&context, code, display_name).await {
                    Ok(result) => Some(JoinEvent::Joined(result)),
                    Err(err) => Some(JoinEvent::JoinFailed(err)),
                }
            }
            Effect::Navigate(result) => {
                info!(map_id = %result.map_id, "handing off to navigation");
                self.ports.navigator.navigate(&result);
                None
            }
        }
    }

    fn bootstrapper(&self) -> SessionBootstrapper {
        SessionBootstrapper {
            auth: self.ports.anonymous_auth.clone(),
            storage: self.ports.storage.clone(),
        }
    }
}

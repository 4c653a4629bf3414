use std::time::Duration as StdDuration;

use chrono::Duration;
use tokio::sync::watch;

use clinpush_core::poll::poll_until;

use crate::api::{CreateInstallRequest, InstallApi};
use crate::auth_persist::{AuthBackup, persist_auth_backup};
use crate::bridge::Bridge;
use crate::error::SetupError;
use crate::identity::IdentityClient;
use crate::platform::{Shell, install_instructions};
use crate::push::PushSdk;

const INSTALL_CODE_KEY: &str = "install_code";
const RECOVERY_ATTEMPTED_KEY: &str = "recovery_attempted";

/// Local install-code records age out after this long. The server stays the
/// validity authority; the ceiling only discards fossils.
const INSTALL_CODE_MAX_AGE_DAYS: i64 = 90;

const SESSION_POLL_INTERVAL: StdDuration = StdDuration::from_millis(100);
const SESSION_POLL_TIMEOUT: StdDuration = StdDuration::from_secs(4);

const PUSH_READY_PROBE_INTERVAL: StdDuration = StdDuration::from_millis(300);
const PUSH_READY_TIMEOUT: StdDuration = StdDuration::from_secs(10);
/// Minimum splash time after login, so the home screen never flashes in
/// before registration had a chance to settle.
const PUSH_READY_MIN_SPLASH: StdDuration = StdDuration::from_secs(4);

/// Rotating splash phrases while push registration settles.
const SPLASH_PHRASES: [&str; 4] = [
    "Configurando seu Aplicativo.",
    "Puxando seus dados",
    "Só um minutinho...",
    "Quase lá",
];

/// Observable phase of the setup state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupState {
    Idle,
    ResumeSession,
    ActivateFromUrl,
    ActivateFromStorage,
    PrepareInstall,
    AwaitInstall,
    Error,
    Done,
}

/// Terminal result of one setup pass.
#[derive(Debug, Clone, PartialEq)]
pub enum SetupOutcome {
    /// Session live, home navigation performed.
    Home,
    /// Code parked; waiting for the user to install and relaunch.
    AwaitingInstall {
        code: String,
        instructions: &'static [&'static str],
    },
    Failed(SetupError),
}

/// Drives the install/activation flow from the three observed inputs —
/// installed context, URL code, recoverable stored code — plus the provider
/// session. Runs at most once per page load; a second call (or a call while
/// an activation is in flight) is a no-op.
pub struct SetupOrchestrator<A, I, P, S>
where
    A: InstallApi,
    I: IdentityClient,
    P: PushSdk,
    S: Shell,
{
    bridge: Bridge,
    api: A,
    identity: I,
    push: P,
    shell: S,
    state: SetupState,
    started: bool,
    in_flight: bool,
    status: watch::Sender<String>,
}

impl<A, I, P, S> SetupOrchestrator<A, I, P, S>
where
    A: InstallApi,
    I: IdentityClient,
    P: PushSdk,
    S: Shell,
{
    pub fn new(bridge: Bridge, api: A, identity: I, push: P, shell: S) -> Self {
        let (status, _) = watch::channel(String::new());
        Self {
            bridge,
            api,
            identity,
            push,
            shell,
            state: SetupState::Idle,
            started: false,
            in_flight: false,
            status,
        }
    }

    pub fn state(&self) -> SetupState {
        self.state
    }

    /// Subscribe to user-visible status text.
    pub fn status(&self) -> watch::Receiver<String> {
        self.status.subscribe()
    }

    /// Run one setup pass. Returns `None` when the entry guard or the
    /// in-flight token suppresses the pass.
    pub async fn run(&mut self) -> Option<SetupOutcome> {
        if self.started || self.in_flight {
            return None;
        }
        self.started = true;

        let outcome = self.process().await;
        self.state = match &outcome {
            SetupOutcome::Home => SetupState::Done,
            SetupOutcome::AwaitingInstall { .. } => SetupState::AwaitInstall,
            SetupOutcome::Failed(_) => SetupState::Error,
        };
        Some(outcome)
    }

    async fn process(&mut self) -> SetupOutcome {
        // A valid session makes activation moot: refresh the backup, go home.
        if let Some(session) = self.identity.session().await {
            self.state = SetupState::ResumeSession;
            persist_auth_backup(&self.bridge, &AuthBackup::from(&session)).await;
            self.shell.navigate_home();
            return SetupOutcome::Home;
        }

        let installed = self.shell.installed();
        let url_code = self.shell.query_param("code");

        match (installed, url_code) {
            (true, Some(code)) => {
                self.state = SetupState::ActivateFromUrl;
                match self.activate(&code).await {
                    Ok(()) => {
                        self.shell.navigate_home();
                        SetupOutcome::Home
                    }
                    Err(e) => SetupOutcome::Failed(e),
                }
            }
            (true, None) => {
                self.state = SetupState::ActivateFromStorage;
                match self.recover_code().await {
                    Some(code) => match self.activate(&code).await {
                        Ok(()) => {
                            self.shell.navigate_home();
                            SetupOutcome::Home
                        }
                        Err(e) => SetupOutcome::Failed(e),
                    },
                    None => SetupOutcome::Failed(self.record_recovery_failure().await),
                }
            }
            (false, None) => {
                self.state = SetupState::PrepareInstall;
                match self.prepare_install().await {
                    Ok(code) => SetupOutcome::AwaitingInstall {
                        code,
                        instructions: install_instructions(self.shell.os()),
                    },
                    Err(e) => SetupOutcome::Failed(e),
                }
            }
            (false, Some(code)) => {
                self.state = SetupState::AwaitInstall;
                // Park the code preventively so the installed context can
                // recover it even if the URL does not survive the transition.
                self.store_code(&code).await;
                SetupOutcome::AwaitingInstall {
                    code,
                    instructions: install_instructions(self.shell.os()),
                }
            }
        }
    }

    /// Issue a fresh code for the `email` query parameter, park it, and
    /// rewrite the URL so the next page load re-enters with `?code=`.
    async fn prepare_install(&mut self) -> Result<String, SetupError> {
        let email = self
            .shell
            .query_param("email")
            .ok_or(SetupError::MissingEmail)?;
        self.set_status("Preparando instalação...");

        let name = self.shell.query_param("name");
        let wh_id = self.shell.query_param("wh_id");
        let inst = self.shell.query_param("inst");
        let origin = self.shell.origin();
        let redirect_to = format!("{origin}/");

        let issued = self
            .api
            .create_install(CreateInstallRequest {
                email: &email,
                name: name.as_deref(),
                wh_id: wh_id.as_deref(),
                inst: inst.as_deref(),
                redirect_to: Some(&redirect_to),
            })
            .await?;

        self.store_code(&issued.code).await;
        self.shell
            .replace_url(&format!("{origin}/setup?code={}", issued.code));
        Ok(issued.code)
    }

    async fn activate(&mut self, code: &str) -> Result<(), SetupError> {
        self.in_flight = true;
        let result = self.do_activate(code).await;
        self.in_flight = false;
        result
    }

    /// Redeem `code`, confirm the session materialized, back it up, and hold
    /// the splash until push registration settles.
    async fn do_activate(&mut self, code: &str) -> Result<(), SetupError> {
        self.set_status("Ativando seu acesso...");
        // Park the code again so later relaunches can replay it.
        self.store_code(code).await;

        let redirect_to = format!("{}/", self.shell.origin());
        let exchanged = self
            .api
            .exchange_install(code, Some(&redirect_to))
            .await?;

        self.identity
            .verify_otp(&exchanged.email, &exchanged.email_otp)
            .await?;

        // Session materialization is asynchronous relative to verification.
        let identity = &self.identity;
        let session = poll_until(SESSION_POLL_INTERVAL, SESSION_POLL_TIMEOUT, || {
            identity.session()
        })
        .await
        .map_err(|_| SetupError::SessionTimeout)?;

        persist_auth_backup(&self.bridge, &AuthBackup::from(&session)).await;
        self.bridge.clear(RECOVERY_ATTEMPTED_KEY).await;

        self.extend_until_push_ready().await;
        Ok(())
    }

    async fn store_code(&self, code: &str) {
        self.bridge
            .write(INSTALL_CODE_KEY, serde_json::json!({ "code": code }))
            .await;
    }

    async fn recover_code(&self) -> Option<String> {
        self.set_status("Verificando dados de ativação…");
        let record = self
            .bridge
            .read(INSTALL_CODE_KEY, Duration::days(INSTALL_CODE_MAX_AGE_DAYS))
            .await?;
        record
            .value
            .get("code")
            .and_then(|v| v.as_str())
            .map(str::to_owned)
    }

    /// First miss asks the user to reopen the configuration link; a repeat
    /// miss (flagged in storage) escalates to reinstall instructions.
    async fn record_recovery_failure(&self) -> SetupError {
        let attempted = self
            .bridge
            .read(
                RECOVERY_ATTEMPTED_KEY,
                Duration::days(INSTALL_CODE_MAX_AGE_DAYS),
            )
            .await
            .is_some();
        if attempted {
            SetupError::RecoveryExhausted
        } else {
            self.bridge
                .write(RECOVERY_ATTEMPTED_KEY, serde_json::json!(true))
                .await;
            SetupError::NoStoredCode
        }
    }

    /// Hold the splash until push registration settles (or the timeout falls
    /// through), rotating status phrases, never shorter than the minimum.
    async fn extend_until_push_ready(&self) {
        let started = tokio::time::Instant::now();
        let push = &self.push;
        let status = &self.status;
        let _ = poll_until(PUSH_READY_PROBE_INTERVAL, PUSH_READY_TIMEOUT, || {
            let phrase =
                SPLASH_PHRASES[(started.elapsed().as_secs() / 2) as usize % SPLASH_PHRASES.len()];
            let _ = status.send(phrase.to_owned());
            async move {
                if push.is_ready().await {
                    Some(())
                } else {
                    None
                }
            }
        })
        .await;

        let elapsed = started.elapsed();
        if elapsed < PUSH_READY_MIN_SPLASH {
            tokio::time::sleep(PUSH_READY_MIN_SPLASH - elapsed).await;
        }
    }

    fn set_status(&self, text: &str) {
        let _ = self.status.send(text.to_owned());
    }
}

#![allow(async_fn_in_trait)]

/// OS-level notification permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Default,
    Granted,
    Denied,
}

/// The push SDK surface consumed here, treated as an opaque capability.
pub trait PushSdk: Send + Sync {
    /// Has initial registration settled?
    async fn is_ready(&self) -> bool;

    async fn permission(&self) -> Permission;

    /// SDK-level opt-in flag.
    async fn opted_in(&self) -> bool;

    /// Subscription identifier, once one has been minted.
    async fn subscription_id(&self) -> Option<String>;
}

//! Session Context and Event Bus (C7).
//!
//! The Context is the single mutable record the transport thread updates
//! before publishing an event; subscribers read it but never write it
//! (§5, §9). We model the single-writer contract with a `parking_lot`
//! mutex rather than unsafe aliasing tricks — cheap, and it keeps the
//! borrow checker honest about who's allowed to touch what.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::adapter;
use crate::path::AddressN;
use crate::signing::SigningJob;

/// The (chaincode, pubkey, path) triple cached by `requestDeterministicHierarchy`.
/// Reconstructing an actual derivation tree from this is the host's Bitcoin
/// library's job (§9) — we only remember what was asked for and what came back.
#[derive(Debug, Clone, PartialEq)]
pub struct DeterministicKey {
    pub path: AddressN,
    pub fingerprint: bitcoin::bip32::Fingerprint,
    pub chain_code: bitcoin::bip32::ChainCode,
    pub public_key: Option<bitcoin::secp256k1::PublicKey>,
    pub xpub: Option<String>,
}

/// Everything the transport thread knows about the session at a point in
/// time. Cleared on attach/detach.
#[derive(Debug, Clone, Default)]
pub struct ContextState {
    pub wallet_present: bool,
    pub features: Option<adapter::Features>,
    pub public_key: Option<adapter::PublicKey>,
    pub deterministic_key: Option<DeterministicKey>,
    pub last_address: Option<adapter::Address>,
    pub signatures: Vec<(u32, Vec<u8>)>,
    pub serialized_tx: Vec<u8>,
}

impl ContextState {
    fn reset(&mut self) {
        *self = ContextState { wallet_present: false, ..Default::default() };
    }
}

/// Shared, cloneable handle onto the session's mutable state plus its
/// in-flight signing job, which lives separately because it is not
/// `Clone`-cheap and only one can exist at a time (§4.5 Busy rule).
#[derive(Clone)]
pub struct Context {
    state: Arc<Mutex<ContextState>>,
    job: Arc<Mutex<Option<SigningJob>>>,
}

impl Context {
    pub fn new() -> Self {
        Context { state: Arc::new(Mutex::new(ContextState::default())), job: Arc::new(Mutex::new(None)) }
    }

    pub fn snapshot(&self) -> ContextState {
        self.state.lock().clone()
    }

    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut ContextState) -> R) -> R {
        f(&mut self.state.lock())
    }

    pub(crate) fn reset(&self) {
        self.state.lock().reset();
        *self.job.lock() = None;
    }

    pub(crate) fn take_job(&self) -> Option<SigningJob> {
        self.job.lock().take()
    }

    /// Whether a `signTx` operation is currently in flight (§4.5 Busy
    /// rule) — lets a caller check before starting a new one instead of
    /// relying on the `Busy` error.
    pub fn job_in_flight(&self) -> bool {
        self.job.lock().is_some()
    }

    pub(crate) fn start_job(&self, job: SigningJob) {
        *self.job.lock() = Some(job);
    }

    pub(crate) fn with_job<R>(&self, f: impl FnOnce(&mut SigningJob) -> Option<R>) -> Option<R> {
        let mut guard = self.job.lock();
        guard.as_mut().and_then(f)
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new()
    }
}

/// Public event-type set (§4.4). Each variant carries the payload a
/// subscriber needs without having to re-read the Context, though the
/// Context snapshot is always consistent with the event by the time it
/// is published (§4.7).
#[derive(Debug, Clone)]
pub enum Event {
    DeviceReady(adapter::Features),
    DeviceDetached,
    DeviceFailed(adapter::Failure),
    ShowPinEntry(adapter::PinMatrixRequest),
    ShowPassphraseEntry,
    ShowButtonPress(adapter::ButtonRequest),
    DeterministicHierarchy(DeterministicKey),
    Address(adapter::Address),
    PublicKey(adapter::PublicKey),
    OperationSucceeded(adapter::Success),
    OperationFailed(String),
}

type Subscriber = Box<dyn Fn(&Event) + Send + 'static>;

/// Synchronous publish/subscribe dispatch (§4.7). Subscribers run inline
/// on the publishing thread and MUST NOT block; anything long-running
/// belongs on the consumer's own executor.
#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Subscriber>>,
}

impl EventBus {
    pub fn new() -> Self {
        EventBus { subscribers: Mutex::new(Vec::new()) }
    }

    pub fn subscribe(&self, handler: impl Fn(&Event) + Send + 'static) {
        self.subscribers.lock().push(Box::new(handler));
    }

    pub(crate) fn publish(&self, event: Event) {
        for subscriber in self.subscribers.lock().iter() {
            subscriber(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn publish_delivers_to_all_subscribers_in_order() {
        let bus = EventBus::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let c1 = calls.clone();
        bus.subscribe(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        });
        let c2 = calls.clone();
        bus.subscribe(move |_| {
            c2.fetch_add(10, Ordering::SeqCst);
        });
        bus.publish(Event::DeviceDetached);
        assert_eq!(calls.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn reset_clears_state_and_job() {
        let ctx = Context::new();
        ctx.with_state(|s| s.wallet_present = true);
        ctx.reset();
        assert!(!ctx.snapshot().wallet_present);
        assert!(!ctx.job_in_flight());
    }
}

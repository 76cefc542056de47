// ── Keyed leading + trailing throttle ──
//
// At most one call per key per window reaches the operation: the first
// call of a burst fires immediately, later calls inside the window are
// coalesced and the merged payload fires once when the window closes.
// Every coalesced caller resolves with the outcome of that trailing call.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::trace;

use crate::error::CoreError;

/// Payloads that can absorb a newer payload for the same key.
pub trait Coalesce {
    /// Fold `newer` into `self`. Fields present in `newer` win.
    fn coalesce(&mut self, newer: Self);
}

type Outcome = Result<(), CoreError>;
type Operation<K, P> = Arc<dyn Fn(K, P) -> BoxFuture<'static, Outcome> + Send + Sync>;

struct Slot<P> {
    last_fire: Option<Instant>,
    pending: Option<P>,
    waiters: Vec<oneshot::Sender<Outcome>>,
    timer_armed: bool,
}

impl<P> Default for Slot<P> {
    fn default() -> Self {
        Self {
            last_fire: None,
            pending: None,
            waiters: Vec::new(),
            timer_armed: false,
        }
    }
}

enum Decision {
    Fire,
    Wait {
        rx: oneshot::Receiver<Outcome>,
        arm_at: Option<Instant>,
    },
}

/// Per-key throttle around an async operation. The operation receives
/// the key along with the (possibly coalesced) payload.
pub struct Throttle<K, P> {
    window: Duration,
    operation: Operation<K, P>,
    slots: Arc<Mutex<HashMap<K, Slot<P>>>>,
}

impl<K, P> Clone for Throttle<K, P> {
    fn clone(&self) -> Self {
        Self {
            window: self.window,
            operation: Arc::clone(&self.operation),
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<K, P> Throttle<K, P>
where
    K: Eq + Hash + Clone + Send + 'static,
    P: Coalesce + Send + 'static,
{
    pub fn new<F>(window: Duration, operation: F) -> Self
    where
        F: Fn(K, P) -> BoxFuture<'static, Outcome> + Send + Sync + 'static,
    {
        Self {
            window,
            operation: Arc::new(operation),
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Run `payload` through the throttle for `key`.
    pub async fn call(&self, key: K, payload: P) -> Outcome {
        let now = Instant::now();

        let (decision, payload) = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            let slot = slots.entry(key.clone()).or_default();
            let window_open = slot
                .last_fire
                .is_none_or(|at| now.duration_since(at) >= self.window);

            if window_open && !slot.timer_armed {
                slot.last_fire = Some(now);
                (Decision::Fire, Some(payload))
            } else {
                match slot.pending.as_mut() {
                    Some(pending) => pending.coalesce(payload),
                    None => slot.pending = Some(payload),
                }
                let (tx, rx) = oneshot::channel();
                slot.waiters.push(tx);

                let arm_at = (!slot.timer_armed).then(|| {
                    slot.timer_armed = true;
                    slot.last_fire.map_or(now, |at| at + self.window)
                });
                (Decision::Wait { rx, arm_at }, None)
            }
        };

        match (decision, payload) {
            (Decision::Fire, Some(payload)) => {
                trace!("throttle: leading call");
                (self.operation)(key, payload).await
            }
            (Decision::Wait { rx, arm_at }, _) => {
                if let Some(deadline) = arm_at {
                    self.spawn_trailing(key, deadline);
                }
                rx.await.unwrap_or_else(|_| {
                    Err(CoreError::Internal("throttled call was dropped".into()))
                })
            }
            (Decision::Fire, None) => Err(CoreError::Internal("throttle lost its payload".into())),
        }
    }

    fn spawn_trailing(&self, key: K, deadline: Instant) {
        let slots = Arc::clone(&self.slots);
        let operation = Arc::clone(&self.operation);

        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;

            let (payload, waiters) = {
                let mut slots = slots.lock().unwrap_or_else(PoisonError::into_inner);
                let Some(slot) = slots.get_mut(&key) else {
                    return;
                };
                slot.timer_armed = false;
                slot.last_fire = Some(Instant::now());
                (slot.pending.take(), std::mem::take(&mut slot.waiters))
            };

            let Some(payload) = payload else {
                return;
            };

            trace!(coalesced = waiters.len(), "throttle: trailing call");
            let outcome = operation(key, payload).await;
            for waiter in waiters {
                let _ = waiter.send(outcome.clone());
            }
        });
    }
}

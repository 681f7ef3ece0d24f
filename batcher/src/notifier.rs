use std::sync::Mutex;

use tokio::sync::mpsc;

/// Edge-triggered one-shot signal that the encoded results have crossed a
/// size threshold.
///
/// After firing once the notifier deactivates, so at most one signal is
/// emitted per batch cycle; [EncodedSizeNotifier::reset] re-arms it when
/// the batcher drains the store.
pub struct EncodedSizeNotifier {
    threshold: u64,
    active: Mutex<bool>,
    notify_tx: mpsc::Sender<()>,
}

impl EncodedSizeNotifier {
    /// A `threshold` of zero disables the notifier.
    pub fn new(notify_tx: mpsc::Sender<()>, threshold: u64) -> Self {
        EncodedSizeNotifier {
            threshold,
            active: Mutex::new(true),
            notify_tx,
        }
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Fires the signal if the notifier is armed and `encoded_size` has
    /// reached the threshold. Returns whether a signal was emitted.
    pub fn maybe_notify(&self, encoded_size: u64) -> bool {
        if self.threshold == 0 || encoded_size < self.threshold {
            return false;
        }
        let mut active = self.active.lock().unwrap();
        if !*active {
            return false;
        }
        // capacity-1 channel: the previous signal has always been consumed
        // before the notifier is re-armed, so this cannot drop a signal
        let _ = self.notify_tx.try_send(());
        *active = false;
        true
    }

    /// Re-arms the notifier for the next batch cycle.
    pub fn reset(&self) {
        *self.active.lock().unwrap() = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fires_once_per_cycle() {
        let (tx, mut rx) = mpsc::channel(1);
        let notifier = EncodedSizeNotifier::new(tx, 100);

        assert!(!notifier.maybe_notify(99));
        assert!(notifier.maybe_notify(100));
        // crossing again without a reset stays silent
        assert!(!notifier.maybe_notify(500));
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());

        notifier.reset();
        assert!(notifier.maybe_notify(101));
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn zero_threshold_never_fires() {
        let (tx, mut rx) = mpsc::channel(1);
        let notifier = EncodedSizeNotifier::new(tx, 0);
        assert!(!notifier.maybe_notify(u64::MAX));
        assert!(rx.try_recv().is_err());
    }
}

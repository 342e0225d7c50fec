//! Tools for noticing stop signals (e.g. `SIGINT`) by polling. While enabled,
//! stop signals no longer end the process, so a program can finish what it's
//! doing and clean up before exiting.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};

use signal_hook::{SigId, consts, flag, low_level};

/// Start catching stop signals. See [requested] and [disable].
///
/// Does nothing if already enabled.
pub fn enable() -> Result<(), io::Error> {
    let mut sig_ids = lock_sig_ids();
    if !sig_ids.is_empty() {
        return Ok(());
    }

    for &signal in consts::TERM_SIGNALS {
        match flag::register(signal, Arc::clone(&STOP_REQUESTED)) {
            Ok(sig_id) => sig_ids.push(sig_id),
            Err(e) => {
                crate::debug_log_warning!("Failed to register signal handler: {e}");
                for sig_id in sig_ids.drain(..) {
                    low_level::unregister(sig_id);
                }
                return Err(e);
            }
        }
    }

    Ok(())
}

/// Stop catching stop signals, restoring the default behavior. A stop signal
/// that was already caught stays [requested] until [reset].
pub fn disable() {
    for sig_id in lock_sig_ids().drain(..) {
        low_level::unregister(sig_id);
    }
}

/// Whether stop signals are being caught (see [enable]).
pub fn is_enabled() -> bool {
    !lock_sig_ids().is_empty()
}

/// Whether a stop signal has been caught since the last [reset].
pub fn requested() -> bool {
    STOP_REQUESTED.load(Ordering::SeqCst)
}

/// Forget any caught stop signal.
pub fn reset() {
    STOP_REQUESTED.store(false, Ordering::SeqCst);
}

static STOP_REQUESTED: LazyLock<Arc<AtomicBool>> =
    LazyLock::new(|| Arc::new(AtomicBool::new(false)));

static SIG_IDS: Mutex<Vec<SigId>> = Mutex::new(Vec::new());

fn lock_sig_ids() -> MutexGuard<'static, Vec<SigId>> {
    SIG_IDS.lock().unwrap_or_else(|e| e.into_inner())
}

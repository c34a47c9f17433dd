//! Cooperative cancellation on Ctrl+C

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Shared cancellation flag.
///
/// Starts lowered, is raised at most once and never lowered again. The tree
/// walker only consults it after finishing a subtree, so raising it never
/// interrupts a translation that is already in flight.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    raised: Arc<AtomicBool>,
}

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}

/// Listen for the first Ctrl+C and raise `flag` when it arrives.
///
/// Later Ctrl+C presses have no further effect.
pub fn install_ctrl_c_handler(flag: InterruptFlag) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                flag.raise();
                info!("Interrupt received");
                println!("\n⚠️  Interrupt requested. Saving the file...");
            }
            Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
        }
    })
}

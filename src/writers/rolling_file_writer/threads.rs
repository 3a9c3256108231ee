use super::{config::Config, state::remove_or_compress_too_old_logfiles_impl};
use crate::util::LOG_TARGET;
use log::debug;
use std::{
    sync::{
        mpsc::{channel, Sender},
        Arc,
    },
    thread::{Builder as ThreadBuilder, JoinHandle},
};

const CLEANER: &str = "rollsink-cleanup";

enum MessageToCleanupThread {
    Act,
    Die,
}

// Owns the background thread that executes the retention cycles of one writer.
#[derive(Debug)]
pub(super) struct CleanupThreadHandle {
    sender: Sender<MessageToCleanupThread>,
    join_handle: JoinHandle<()>,
}
impl CleanupThreadHandle {
    // Asks for a retention cycle, without waiting for it.
    pub(super) fn request_cleanup(&self) {
        self.sender.send(MessageToCleanupThread::Act).ok();
    }

    // Lets the thread finish all requested cycles, and waits until it has terminated.
    pub(super) fn shutdown(self) {
        self.sender.send(MessageToCleanupThread::Die).ok();
        self.join_handle.join().ok();
    }
}

pub(super) fn start_cleanup_thread(
    config: Arc<Config>,
) -> Result<CleanupThreadHandle, std::io::Error> {
    let (sender, receiver) = channel();
    let builder = ThreadBuilder::new().name(CLEANER.to_string());
    Ok(CleanupThreadHandle {
        sender,
        join_handle: builder.spawn(move || {
            while let Ok(MessageToCleanupThread::Act) = receiver.recv() {
                // requests that queued up meanwhile are served by the same cycle,
                // because every cycle re-scans the folder
                let mut die = false;
                for message in receiver.try_iter() {
                    if let MessageToCleanupThread::Die = message {
                        die = true;
                        break;
                    }
                }
                let done = remove_or_compress_too_old_logfiles_impl(&config);
                for file in &done.remove {
                    debug!(target: LOG_TARGET, "removed backup {}", file.display());
                }
                for file in &done.compress {
                    debug!(target: LOG_TARGET, "compressed backup {}", file.display());
                }
                if die {
                    break;
                }
            }
        })?,
    })
}

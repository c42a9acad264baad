//! Background loop running a pass at a fixed interval.

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info};

use crate::error::Result;
use crate::mailbox::Mailbox;
use crate::pdf::TextSource;
use crate::pipeline::Pipeline;

/// Opens a new mailbox session.
pub type Connect = Box<dyn FnMut() -> Result<Box<dyn Mailbox>> + Send>;

/// Runs [`Pipeline::run_once`] on a dedicated thread until stopped.
///
/// A session whose pass fails is dropped, and a new one is opened on the
/// next cycle. Connection failures are logged and retried.
pub struct Poller<S> {
    pipeline: Pipeline<S>,
    connect: Connect,
    session: Option<Box<dyn Mailbox>>,
    interval: Duration,
}

impl<S: TextSource + Send + 'static> Poller<S> {
    pub fn new(pipeline: Pipeline<S>, connect: Connect, interval: Duration) -> Self {
        Self {
            pipeline,
            connect,
            session: None,
            interval,
        }
    }

    /// Use an already open session for the first pass.
    pub fn with_session(mut self, session: Box<dyn Mailbox>) -> Self {
        self.session = Some(session);
        self
    }

    /// Start the loop on its own thread.
    pub fn spawn(self) -> io::Result<PollerHandle> {
        let (stop_tx, stop_rx) = mpsc::channel();
        let thread = thread::Builder::new()
            .name("invoicemail-poller".to_string())
            .spawn(move || self.run(stop_rx))?;

        Ok(PollerHandle { stop_tx, thread })
    }

    fn run(mut self, stop_rx: mpsc::Receiver<()>) {
        info!("Polling every {}s", self.interval.as_secs_f32());

        loop {
            self.cycle();

            match stop_rx.recv_timeout(self.interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        if let Some(session) = self.session.take() {
            session.logout();
        }
        info!("Poller stopped");
    }

    fn cycle(&mut self) {
        if self.session.is_none() {
            match (self.connect)() {
                Ok(session) => {
                    debug!("Mailbox session opened");
                    self.session = Some(session);
                }
                Err(e) => {
                    error!("Connection failed: {}", e);
                    return;
                }
            }
        }

        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Err(e) = self.pipeline.run_once(session.as_mut()) {
            error!("Error processing emails: {}", e);
            // Reconnect on the next cycle.
            self.session = None;
        }
    }
}

/// Handle to a running [`Poller`].
pub struct PollerHandle {
    stop_tx: Sender<()>,
    thread: JoinHandle<()>,
}

impl PollerHandle {
    /// Wake the loop, let it log out, and wait for the thread to finish.
    pub fn stop(self) {
        let _ = self.stop_tx.send(());
        if self.thread.join().is_err() {
            error!("Poller thread panicked");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MailboxError;
    use crate::models::config::{FolderConfig, InvoiceMailConfig};
    use crate::test_support::{FakeMailbox, Fetch, PlainText};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    fn pipeline_in(root: &std::path::Path) -> Pipeline<PlainText> {
        let config = InvoiceMailConfig {
            folders: FolderConfig {
                pending: root.join("re_"),
                ..FolderConfig::default()
            },
            ..InvoiceMailConfig::default()
        };
        Pipeline::new(&config, PlainText)
    }

    fn wait_until(mut done: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_failed_pass_reconnects() {
        let root = tempfile::tempdir().unwrap();
        let mailbox = FakeMailbox::with(vec![Fetch::Fail]);
        let connects = Arc::new(AtomicUsize::new(0));

        let connect: Connect = {
            let mailbox = mailbox.clone();
            let connects = connects.clone();
            Box::new(move || -> Result<Box<dyn Mailbox>> {
                connects.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(mailbox.clone()))
            })
        };

        let handle = Poller::new(pipeline_in(root.path()), connect, Duration::from_millis(10))
            .spawn()
            .unwrap();
        wait_until(|| mailbox.fetch_count() >= 3);
        handle.stop();

        assert!(mailbox.fetch_count() >= 3);
        assert_eq!(connects.load(Ordering::SeqCst), 2);
        // Only the live session is logged out.
        assert_eq!(mailbox.logout_count(), 1);
    }

    #[test]
    fn test_connection_errors_are_retried() {
        let root = tempfile::tempdir().unwrap();
        let attempts = Arc::new(AtomicUsize::new(0));

        let connect: Connect = {
            let attempts = attempts.clone();
            Box::new(move || -> Result<Box<dyn Mailbox>> {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(MailboxError::NoHost.into())
            })
        };

        let handle = Poller::new(pipeline_in(root.path()), connect, Duration::from_millis(5))
            .spawn()
            .unwrap();
        wait_until(|| attempts.load(Ordering::SeqCst) >= 3);
        assert!(!handle.is_finished());
        handle.stop();

        assert!(attempts.load(Ordering::SeqCst) >= 3);
    }

    #[test]
    fn test_stop_interrupts_wait() {
        let root = tempfile::tempdir().unwrap();
        let mailbox = FakeMailbox::default();
        let connect: Connect =
            Box::new(|| -> Result<Box<dyn Mailbox>> { Err(MailboxError::NoHost.into()) });

        let handle = Poller::new(pipeline_in(root.path()), connect, Duration::from_secs(3600))
            .with_session(Box::new(mailbox.clone()))
            .spawn()
            .unwrap();
        wait_until(|| mailbox.fetch_count() >= 1);

        let started = Instant::now();
        handle.stop();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(mailbox.fetch_count(), 1);
        assert_eq!(mailbox.logout_count(), 1);
    }
}

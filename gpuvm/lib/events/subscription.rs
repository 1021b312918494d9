use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
    time::Duration,
};

use futures::StreamExt;
use tokio::{task::JoinHandle, time::timeout};
use tracing::trace;

use crate::backend::OperationLogStream;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// How long a closing subscription waits for the backend to end the stream before the reader is
/// torn down. Covers lines still in flight when the operation's response arrives.
const DRAIN_GRACE: Duration = Duration::from_millis(250);

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A live attachment to one operation-log channel.
///
/// Owns the background task reading the stream; every line is handed to the sink in arrival
/// order. [`close`](Self::close) is idempotent, and dropping an unclosed subscription tears the
/// reader down without draining.
pub struct LogSubscription {
    channel: String,
    reader: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl LogSubscription {
    /// Attaches to a stream, pumping every line into `sink` until the stream ends or the
    /// subscription is closed.
    pub fn attach(
        channel: impl Into<String>,
        mut stream: OperationLogStream,
        mut sink: impl FnMut(String) + Send + 'static,
    ) -> Self {
        let channel = channel.into();
        let reader = tokio::spawn({
            let channel = channel.clone();
            async move {
                while let Some(line) = stream.next().await {
                    sink(line);
                }
                trace!(channel = %channel, "operation log stream ended");
            }
        });

        Self {
            channel,
            reader: Mutex::new(Some(reader)),
            closed: AtomicBool::new(false),
        }
    }

    /// The channel this subscription is attached to.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Closes the subscription. The first call waits briefly for the stream to drain; callers
    /// after that return immediately. Safe to call any number of times.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        let handle = self.reader.lock().unwrap().take();
        if let Some(mut handle) = handle {
            if timeout(DRAIN_GRACE, &mut handle).await.is_err() {
                trace!(channel = %self.channel, "stream did not end before grace period");
                handle.abort();
            }
        }
    }

    /// Returns whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Drop for LogSubscription {
    fn drop(&mut self) {
        if let Ok(reader) = self.reader.get_mut() {
            if let Some(handle) = reader.take() {
                handle.abort();
            }
        }
    }
}

impl std::fmt::Debug for LogSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSubscription")
            .field("channel", &self.channel)
            .field("closed", &self.is_closed())
            .finish()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

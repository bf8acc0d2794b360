//! Bridges live feeds into the tracker's event queue.
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};

use crate::runtime::Event;

/// A running subscription. Dropping the handle releases the listener.
#[derive(Debug)]
pub struct ListenerHandle {
    label: &'static str,
    task: JoinHandle<()>,
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.task.abort();
        tracing::debug!("released {} listener", self.label);
    }
}

/// Forward every value published on `source`, starting with the current one,
/// into `sink` as an [`Event`].
///
/// The task ends when either side closes. Must be called from within a
/// tokio runtime.
pub(crate) fn forward<T, F>(
    label: &'static str,
    mut source: watch::Receiver<T>,
    sink: mpsc::UnboundedSender<Event>,
    wrap: F,
) -> ListenerHandle
where
    T: Clone + Send + Sync + 'static,
    F: Fn(T) -> Event + Send + 'static,
{
    tracing::debug!("opening {label} listener");
    let task = tokio::spawn(async move {
        loop {
            let value = source.borrow_and_update().clone();
            if sink.send(wrap(value)).is_err() {
                break;
            }
            if source.changed().await.is_err() {
                break;
            }
        }
    });
    ListenerHandle { label, task }
}

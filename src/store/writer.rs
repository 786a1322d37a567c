use std::sync::mpsc;
use std::thread;

use serde::Serialize;
use tracing::{debug, warn};

use super::{KeyValueStore, StoreError, StoreResult};

#[derive(Debug)]
struct Snapshot {
    key: &'static str,
    value: String,
}

#[derive(Debug)]
enum Message {
    Write(Snapshot),
    Shutdown,
}

/// Handle the stores use to queue full snapshots for the background writer.
#[derive(Debug, Clone)]
pub(crate) struct SnapshotSink {
    tx: mpsc::Sender<Message>,
}

impl SnapshotSink {
    /// Queues `value` under `key`. Best effort: failures are logged and dropped.
    pub(crate) fn persist<T: Serialize + ?Sized>(&self, key: &'static str, value: &T) {
        if let Err(err) = self.try_persist(key, value) {
            warn!(key, error = %err, "dropping snapshot");
        }
    }

    fn try_persist<T: Serialize + ?Sized>(&self, key: &'static str, value: &T) -> StoreResult<()> {
        let value = serde_json::to_string(value)?;
        self.tx
            .send(Message::Write(Snapshot { key, value }))
            .map_err(|_| StoreError::WriterClosed)
    }
}

/// Owns the durable store on a worker thread and applies queued snapshots in order.
///
/// Snapshots queued before [`StorageWriter::start`] wait in the channel. Dropping
/// the writer flushes everything queued before the drop.
pub(crate) struct StorageWriter {
    tx: mpsc::Sender<Message>,
    rx: Option<mpsc::Receiver<Message>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl StorageWriter {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::channel::<Message>();
        Self {
            tx,
            rx: Some(rx),
            handle: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn spawn<S>(store: S) -> Self
    where
        S: KeyValueStore + 'static,
    {
        let mut writer = Self::new();
        writer.start(store);
        writer
    }

    /// Moves `store` onto the worker thread. Later calls are ignored.
    pub(crate) fn start<S>(&mut self, store: S)
    where
        S: KeyValueStore + 'static,
    {
        let Some(rx) = self.rx.take() else {
            warn!("storage writer already started");
            return;
        };
        self.handle = Some(thread::spawn(move || run_writer(store, rx)));
    }

    pub(crate) fn sink(&self) -> SnapshotSink {
        SnapshotSink {
            tx: self.tx.clone(),
        }
    }
}

impl Drop for StorageWriter {
    fn drop(&mut self) {
        let _ = self.tx.send(Message::Shutdown);
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("storage writer thread panicked");
        }
    }
}

fn run_writer<S: KeyValueStore>(mut store: S, rx: mpsc::Receiver<Message>) {
    let mut shutting_down = false;
    while !shutting_down {
        let Ok(first) = rx.recv() else {
            break;
        };

        let mut batch = Vec::new();
        let mut next = Some(first);
        while let Some(message) = next {
            match message {
                Message::Write(snapshot) => batch.push(snapshot),
                Message::Shutdown => {
                    shutting_down = true;
                    break;
                }
            }
            next = rx.try_recv().ok();
        }

        for snapshot in latest_per_key(batch) {
            match store.set(snapshot.key, &snapshot.value) {
                Ok(()) => debug!(key = snapshot.key, bytes = snapshot.value.len(), "persisted"),
                Err(err) => warn!(key = snapshot.key, error = %err, "failed to persist snapshot"),
            }
        }
    }
    debug!("storage writer stopped");
}

/// Collapses a batch so each key is written once, with its last queued value.
fn latest_per_key(batch: Vec<Snapshot>) -> Vec<Snapshot> {
    let mut out: Vec<Snapshot> = Vec::with_capacity(batch.len());
    for snapshot in batch {
        match out.iter_mut().find(|queued| queued.key == snapshot.key) {
            Some(queued) => queued.value = snapshot.value,
            None => out.push(snapshot),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::super::MemoryStore;
    use super::*;

    #[test]
    fn drop_flushes_queued_snapshots() {
        let store = MemoryStore::default();
        let writer = StorageWriter::spawn(store.clone());
        let sink = writer.sink();
        sink.persist("a", &vec![1, 2]);
        sink.persist("b", "text");
        sink.persist("a", &vec![3]);
        drop(writer);

        assert_eq!(store.raw("a").as_deref(), Some("[3]"));
        assert_eq!(store.raw("b").as_deref(), Some("\"text\""));
    }

    #[test]
    fn snapshots_queued_before_start_are_written() {
        let store = MemoryStore::default();
        let mut writer = StorageWriter::new();
        writer.sink().persist("early", &1);
        writer.start(store.clone());
        drop(writer);

        assert_eq!(store.raw("early").as_deref(), Some("1"));
    }

    #[test]
    fn persist_after_shutdown_is_dropped_quietly() {
        let store = MemoryStore::default();
        let writer = StorageWriter::spawn(store.clone());
        let sink = writer.sink();
        drop(writer);

        sink.persist("late", &true);
        assert_eq!(store.raw("late"), None);
    }

    #[test]
    fn latest_per_key_keeps_first_position_and_last_value() {
        let batch = vec![
            Snapshot {
                key: "x",
                value: "1".to_string(),
            },
            Snapshot {
                key: "y",
                value: "2".to_string(),
            },
            Snapshot {
                key: "x",
                value: "3".to_string(),
            },
        ];
        let collapsed = latest_per_key(batch);
        assert_eq!(collapsed.len(), 2);
        assert_eq!((collapsed[0].key, collapsed[0].value.as_str()), ("x", "3"));
        assert_eq!((collapsed[1].key, collapsed[1].value.as_str()), ("y", "2"));
    }
}

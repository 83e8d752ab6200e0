use std::{
    sync::{
        mpsc::{self, RecvTimeoutError},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crate::store::NoteStore;

/// Background thread reclaiming expired notes every `interval`.
///
/// Reads already ignore expired notes, this only frees their space. Stops
/// when shut down or dropped.
pub struct Sweeper {
    stop: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    pub fn spawn(store: Arc<dyn NoteStore>, interval: Duration) -> std::io::Result<Sweeper> {
        let (stop, stopped) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("note-sweeper".into())
            .spawn(move || loop {
                match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => match store.purge_expired() {
                        Ok(0) => {}
                        Ok(purged) => log::info!("purged {purged} expired notes"),
                        Err(e) => log::warn!("sweeping expired notes failed: {e}"),
                    },
                    _ => break,
                }
            })?;

        Ok(Sweeper {
            stop: Some(stop),
            handle: Some(handle),
        })
    }

    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        // dropping the sender wakes the thread with Disconnected
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("note sweeper panicked");
            }
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! Event loop around [`PhotoBooth`]
//!
//! Handlers never wait. They return a [`Command`] describing the wait, and the
//! runtime spawns it as a tokio task that reports back with exactly one
//! [`Message`]. Counting outstanding tasks lets headless callers run the booth
//! until nothing is left to happen.

use crate::app::PhotoBooth;
use crate::app::state::{Command, Message};
use crate::errors::AppError;
use crate::pipelines::strip::StripRenderer;
use crate::pipelines::strip::export::render_and_export;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

/// Drives a booth: dispatches messages and executes the commands they return
pub struct BoothRuntime {
    booth: PhotoBooth,
    renderer: Arc<StripRenderer>,
    output_dir: PathBuf,
    results_tx: mpsc::UnboundedSender<Message>,
    results_rx: mpsc::UnboundedReceiver<Message>,
    /// Spawned tasks whose message has not been dispatched yet
    pending: usize,
    tasks: Vec<AbortHandle>,
}

impl BoothRuntime {
    pub fn new(booth: PhotoBooth, renderer: StripRenderer, output_dir: PathBuf) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Self {
            booth,
            renderer: Arc::new(renderer),
            output_dir,
            results_tx,
            results_rx,
            pending: 0,
            tasks: Vec::new(),
        }
    }

    pub fn booth(&self) -> &PhotoBooth {
        &self.booth
    }

    pub fn output_dir(&self) -> &std::path::Path {
        &self.output_dir
    }

    /// Number of tasks still due to report back
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Turn the camera on
    ///
    /// Must be called from within a tokio runtime, like every other method
    /// that may spawn work.
    pub fn start(&mut self) {
        let command = self.booth.start();
        self.execute(command);
    }

    /// Handle one message and run whatever it asks for
    pub fn dispatch(&mut self, message: Message) {
        debug!(?message, "Dispatch");
        let command = self.booth.update(message);
        self.execute(command);
    }

    /// Dispatch every task result that is already available
    pub fn poll(&mut self) {
        while let Ok(message) = self.results_rx.try_recv() {
            self.pending = self.pending.saturating_sub(1);
            self.dispatch(message);
        }
    }

    /// Wait for the next task result and dispatch it
    ///
    /// Returns `false` without waiting when no task is outstanding.
    pub async fn next(&mut self) -> bool {
        if self.pending == 0 {
            return false;
        }
        match self.results_rx.recv().await {
            Some(message) => {
                self.pending -= 1;
                self.dispatch(message);
                true
            }
            None => false,
        }
    }

    /// Run until no timer, activation or export is outstanding
    pub async fn settle(&mut self) {
        while self.next().await {}
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::None => {}
            Command::Batch(commands) => {
                for command in commands {
                    self.execute(command);
                }
            }
            Command::Delay { after, message } => {
                self.spawn(async move {
                    tokio::time::sleep(after).await;
                    message
                });
            }
            Command::ActivateCamera => {
                let camera = self.booth.camera().clone();
                self.spawn(async move {
                    let result = tokio::task::spawn_blocking(move || camera.activate())
                        .await
                        .unwrap_or_else(|e| {
                            Err(AppError::CameraUnavailable(format!(
                                "Camera start task failed: {}",
                                e
                            )))
                        });
                    Message::CameraActivated(result)
                });
            }
            Command::Export { photos, template } => {
                let renderer = Arc::clone(&self.renderer);
                let output_dir = self.output_dir.clone();
                let render = tokio::spawn(async move {
                    render_and_export(&renderer, &photos, template, &output_dir).await
                });
                self.tasks.push(render.abort_handle());
                self.spawn(async move {
                    let result = render.await.unwrap_or_else(|e| {
                        Err(AppError::ExportFailed(format!("Export task failed: {}", e)))
                    });
                    Message::ExportFinished(result)
                });
            }
        }
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = Message> + Send + 'static,
    {
        let tx = self.results_tx.clone();
        self.pending += 1;
        self.tasks.retain(|handle| !handle.is_finished());
        let handle = tokio::spawn(async move {
            let message = task.await;
            if tx.send(message).is_err() {
                warn!("Booth runtime gone, dropping task result");
            }
        });
        self.tasks.push(handle.abort_handle());
    }
}

impl Drop for BoothRuntime {
    fn drop(&mut self) {
        // Abandon timers and renders still in flight
        for handle in &self.tasks {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for BoothRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoothRuntime")
            .field("booth", &self.booth)
            .field("output_dir", &self.output_dir)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

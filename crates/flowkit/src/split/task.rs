//! Mesh splitting off the calling thread.
//!
//! The worker runs on rayon's pool and talks to its [`SplitTask`] handle
//! over two channels:
//!
//! ```text
//!   handle ── SplitCommand::{Start, Cancel} ──► worker
//!   handle ◄── SplitResponse::Progress* ──────  worker
//!          ◄── Done | Canceled | Error ───────  (exactly one, then closed)
//! ```
//!
//! Buffers move through the channels; nothing is copied. Cancellation is
//! cooperative: the worker checks for `Cancel` at every progress batch. A
//! dropped handle counts as a cancel.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crossbeam_channel::{self as channel, Receiver, Sender, TryRecvError};
use web_time::Instant;

use super::{split_mesh, SplitPhase, SplitRequest};
use crate::error::SplitError;
use crate::types::MeshComponent;

/// Handle-to-worker messages.
#[derive(Debug)]
pub enum SplitCommand {
  Start(SplitRequest),
  Cancel,
}

/// Worker-to-handle messages.
#[derive(Debug, PartialEq)]
pub enum SplitResponse {
  Progress { value: f64, phase: SplitPhase },
  Done { parts: Vec<MeshComponent> },
  Canceled,
  Error { message: String },
}

impl SplitResponse {
  /// True for the final message of a run.
  pub fn is_terminal(&self) -> bool {
    !matches!(self, SplitResponse::Progress { .. })
  }

  pub fn label(&self) -> &'static str {
    match self {
      SplitResponse::Progress { .. } => "progress",
      SplitResponse::Done { .. } => "done",
      SplitResponse::Canceled => "canceled",
      SplitResponse::Error { .. } => "error",
    }
  }
}

/// Handle to one in-flight split.
pub struct SplitTask {
  commands: Sender<SplitCommand>,
  responses: Receiver<SplitResponse>,
  finished: bool,
}

impl SplitTask {
  /// Spawn a worker and hand it `request`.
  pub fn start(request: SplitRequest) -> Self {
    let (commands, command_rx) = channel::unbounded();
    let (response_tx, responses) = channel::unbounded();
    // The receiver is alive, so this cannot fail.
    let _ = commands.send(SplitCommand::Start(request));

    rayon::spawn(move || run_worker(command_rx, response_tx));

    Self {
      commands,
      responses,
      finished: false,
    }
  }

  /// Ask the worker to stop at its next batch boundary.
  pub fn cancel(&self) {
    let _ = self.commands.send(SplitCommand::Cancel);
  }

  /// True once the terminal response has been received.
  pub fn is_finished(&self) -> bool {
    self.finished
  }

  /// Next response without blocking.
  pub fn try_recv(&mut self) -> Option<SplitResponse> {
    if self.finished {
      return None;
    }
    match self.responses.try_recv() {
      Ok(response) => {
        self.finished = response.is_terminal();
        Some(response)
      }
      Err(TryRecvError::Empty) => None,
      Err(TryRecvError::Disconnected) => {
        self.finished = true;
        Some(SplitResponse::Error {
          message: "split worker exited without a result".to_string(),
        })
      }
    }
  }

  /// Block until the terminal response, dropping progress messages.
  pub fn wait(self) -> SplitResponse {
    loop {
      match self.responses.recv() {
        Ok(response) if response.is_terminal() => return response,
        Ok(_) => {}
        Err(_) => {
          return SplitResponse::Error {
            message: "split worker exited without a result".to_string(),
          }
        }
      }
    }
  }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
  if let Some(message) = payload.downcast_ref::<&str>() {
    message.to_string()
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else {
    "unknown panic".to_string()
  }
}

fn run_worker(commands: Receiver<SplitCommand>, responses: Sender<SplitResponse>) {
  let request = match commands.recv() {
    Ok(SplitCommand::Start(request)) => request,
    Ok(SplitCommand::Cancel) => {
      let _ = responses.send(SplitResponse::Canceled);
      return;
    }
    Err(_) => return,
  };

  let start = Instant::now();
  let mut observer = |value: f64, phase: SplitPhase| {
    loop {
      match commands.try_recv() {
        Ok(SplitCommand::Cancel) | Err(TryRecvError::Disconnected) => return false,
        Ok(SplitCommand::Start(_)) => {
          tracing::warn!("split worker ignores a second start command");
        }
        Err(TryRecvError::Empty) => break,
      }
    }
    let _ = responses.send(SplitResponse::Progress { value, phase });
    true
  };

  let outcome = panic::catch_unwind(AssertUnwindSafe(|| split_mesh(&request, &mut observer)));
  let response = match outcome {
    Ok(Ok(parts)) => SplitResponse::Done { parts },
    Ok(Err(SplitError::Canceled)) => SplitResponse::Canceled,
    Ok(Err(err)) => SplitResponse::Error {
      message: err.to_string(),
    },
    Err(payload) => SplitResponse::Error {
      message: SplitError::Panicked(panic_message(payload)).to_string(),
    },
  };
  tracing::debug!(
    elapsed_us = start.elapsed().as_micros() as u64,
    response = response.label(),
    "split worker finished"
  );
  let _ = responses.send(response);
}

#[cfg(test)]
#[path = "task_test.rs"]
mod task_test;

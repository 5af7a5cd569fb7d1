/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines progress reporting messages, sinks, and helper functions for fitting and mapping.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Progress reporting primitives for fitting and evaluating deformation fields.

use std::fmt::Debug;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

/// Progress events emitted while fitting or evaluating a deformation field.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressMsg {
    /// Affine columns were dropped because the control points do not span
    /// three dimensions (fewer than four points, or coplanar/collinear points).
    PolynomialReduced { rank: usize },

    /// The LU solution was rejected and the pseudo-inverse was used instead.
    SolverFallback { lu_residual: f64, rank: usize },

    /// Fraction of query chunks mapped so far, in `[0, 1]`.
    EvaluationProgress { chunk: usize, num_chunks: usize, progress: f64 },

    /// Arbitrary informational message.
    Message { message: String },
}

/// Sink that consumes progress messages.
pub trait ProgressSink: Send + Sync + Debug {
    fn emit(&self, msg: ProgressMsg);
}

/// Progress sink that forwards messages over a channel.
#[derive(Debug)]
pub struct ClosureSink {
    tx: mpsc::SyncSender<ProgressMsg>,
}

impl ProgressSink for ClosureSink {
    #[inline]
    fn emit(&self, msg: ProgressMsg) {
        let _ = self.tx.try_send(msg);
    }
}

/// Spawns a listener thread that runs a handler closure for each progress message.
///
/// The listener exits once every clone of the returned sink has been dropped.
pub fn closure_sink<F>(
    buffer: usize,
    mut handler: F,
) -> (Arc<dyn ProgressSink>, thread::JoinHandle<()>)
where
    F: FnMut(ProgressMsg) + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel::<ProgressMsg>(buffer.max(1));
    let sink: Arc<dyn ProgressSink> = Arc::new(ClosureSink { tx });

    let handle = thread::spawn(move || {
        while let Ok(msg) = rx.recv() {
            handler(msg);
        }
    });

    (sink, handle)
}

/// Progress sink that keeps every message in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    messages: Mutex<Vec<ProgressMsg>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the messages received so far.
    pub fn messages(&self) -> Vec<ProgressMsg> {
        match self.messages.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ProgressSink for CollectingSink {
    fn emit(&self, msg: ProgressMsg) {
        match self.messages.lock() {
            Ok(mut guard) => guard.push(msg),
            Err(poisoned) => poisoned.into_inner().push(msg),
        }
    }
}

/// Fraction of chunks completed, as a value between [0, 1].
#[inline]
pub(crate) fn progress_from_chunks(chunk: usize, num_chunks: usize) -> f64 {
    if num_chunks == 0 {
        1.0
    } else {
        (chunk as f64 / num_chunks as f64).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_sink_delivers_messages() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = received.clone();

        let (sink, handle) = closure_sink(8, move |msg| {
            received_clone.lock().unwrap().push(msg);
        });

        sink.emit(ProgressMsg::PolynomialReduced { rank: 1 });
        sink.emit(ProgressMsg::Message {
            message: "done".to_string(),
        });
        drop(sink);
        handle.join().unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0], ProgressMsg::PolynomialReduced { rank: 1 });
    }

    #[test]
    fn chunk_progress_is_clamped() {
        assert_eq!(progress_from_chunks(0, 4), 0.0);
        assert_eq!(progress_from_chunks(2, 4), 0.5);
        assert_eq!(progress_from_chunks(5, 4), 1.0);
        assert_eq!(progress_from_chunks(0, 0), 1.0);
    }
}

// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Shared JSON artifact receiving finished performances.

use std::{
    collections::HashSet,
    fmt, io,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{
    error::{WriterError, WriterResult},
    event::PerformanceId,
    report::{PerformanceReport, ReportMetadata},
};

/// Stage of a [`JsonArtifact`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Stage {
    /// Nothing was written yet.
    Pending,

    /// Header was written, performances are being appended.
    Streaming,

    /// Closing brackets were written, nothing more is accepted.
    Completed,
}

/// Mutable state of a [`JsonArtifact`].
struct State<Out> {
    /// [`io::Write`] implementor to output the document into.
    output: Out,

    /// [`ReportMetadata`] of the document.
    metadata: ReportMetadata,

    /// Current [`Stage`].
    stage: Stage,

    /// Performances written so far.
    written: HashSet<PerformanceId>,

    /// Number of reporters currently writing into the artifact.
    reporters: usize,
}

impl<Out: io::Write> State<Out> {
    /// Writes the document header, unless already written.
    fn open(&mut self) -> WriterResult<()> {
        match self.stage {
            Stage::Pending => {
                self.output.write_all(br#"{"Metadata":"#)?;
                serde_json::to_writer(&mut self.output, &self.metadata)?;
                self.output.write_all(br#","Performances":["#)?;
                self.stage = Stage::Streaming;
                Ok(())
            }
            Stage::Streaming => Ok(()),
            Stage::Completed => {
                Err(WriterError::unavailable("artifact is already completed"))
            }
        }
    }

    /// Writes the closing brackets, unless already written.
    fn close(&mut self) -> WriterResult<()> {
        if self.stage == Stage::Completed {
            return Ok(());
        }
        self.open()?;
        self.output.write_all(b"]}")?;
        self.output.flush()?;
        self.stage = Stage::Completed;
        Ok(())
    }
}

/// [JSON report document][1] written incrementally into an [`io::Write`]
/// implementor, one performance at a time.
///
/// Several reporters may share a single [`JsonArtifact`]: each of them
/// [attaches][2] to it, and the document is completed once the last one
/// [releases][3] it. Every write happens under a lock held only for the
/// duration of that write.
///
/// [1]: crate::report::ScreenplayReport
/// [2]: JsonArtifact::attach
/// [3]: JsonArtifact::release
pub struct JsonArtifact<Out: io::Write> {
    /// Locked [`State`].
    state: Mutex<State<Out>>,
}

impl<Out: io::Write> fmt::Debug for JsonArtifact<Out> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("JsonArtifact")
            .field("stage", &state.stage)
            .field("written", &state.written.len())
            .field("reporters", &state.reporters)
            .finish_non_exhaustive()
    }
}

impl<Out: io::Write> JsonArtifact<Out> {
    /// Creates a new [`JsonArtifact`] stamped with the current time.
    #[must_use]
    pub fn new(output: Out) -> Self {
        Self::with_metadata(output, ReportMetadata::now())
    }

    /// Creates a new [`JsonArtifact`] with the given [`ReportMetadata`].
    #[must_use]
    pub fn with_metadata(output: Out, metadata: ReportMetadata) -> Self {
        Self {
            state: Mutex::new(State {
                output,
                metadata,
                stage: Stage::Pending,
                written: HashSet::new(),
                reporters: 0,
            }),
        }
    }

    /// Registers one more reporter writing into this [`JsonArtifact`].
    pub fn attach(&self) {
        self.lock().reporters += 1;
    }

    /// Unregisters a reporter, completing this [`JsonArtifact`] if it was the
    /// last one.
    ///
    /// # Errors
    ///
    /// If completing fails.
    pub fn release(&self) -> WriterResult<()> {
        let mut state = self.lock();
        state.reporters = state.reporters.saturating_sub(1);
        if state.reporters == 0 { state.close() } else { Ok(()) }
    }

    /// Writes the document header, unless already written.
    ///
    /// # Errors
    ///
    /// If writing fails, or this [`JsonArtifact`] is already completed.
    pub fn begin(&self) -> WriterResult<()> {
        self.lock().open()
    }

    /// Appends the given finished [`PerformanceReport`] of the performance
    /// with the given `id`.
    ///
    /// Every performance is written at most once: appending an already
    /// written one does nothing and returns `false`.
    ///
    /// # Errors
    ///
    /// If writing fails, or this [`JsonArtifact`] is already completed.
    pub fn append(
        &self,
        id: PerformanceId,
        report: &PerformanceReport,
    ) -> WriterResult<bool> {
        let mut state = self.lock();
        state.open()?;
        if state.written.contains(&id) {
            tracing::warn!(
                performance = %id,
                "performance is already written into the artifact, skipping",
            );
            return Ok(false);
        }
        if !state.written.is_empty() {
            state.output.write_all(b",")?;
        }
        serde_json::to_writer(&mut state.output, report)?;
        state.output.flush()?;
        _ = state.written.insert(id);
        Ok(true)
    }

    /// Writes the closing brackets and flushes, so the document is complete.
    ///
    /// Completing an already completed [`JsonArtifact`] does nothing.
    ///
    /// # Errors
    ///
    /// If writing fails.
    pub fn complete(&self) -> WriterResult<()> {
        self.lock().close()
    }

    /// Indicates whether this [`JsonArtifact`] is completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.lock().stage == Stage::Completed
    }

    /// Returns the number of performances appended so far.
    #[must_use]
    pub fn performances_written(&self) -> usize {
        self.lock().written.len()
    }

    /// Unwraps the underlying output.
    pub fn into_output(self) -> Out {
        self.state.into_inner().unwrap_or_else(PoisonError::into_inner).output
    }

    /// Locks the [`State`].
    ///
    /// A write interrupted by a panic leaves the document malformed anyway,
    /// so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, State<Out>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

//! ``src/controller/event_loop.rs``
//! ============================================================================
//! # Event Loop: terminal events, effects and task completions
//!
//! The dispatcher never runs anything itself. It returns [`Effect`]s; the
//! event loop executes each [`Effect::Run`] to completion and queues a
//! [`TaskResult`] tagged with the [`RunPurpose`] that says what the
//! dispatcher should do with the outcome. Completions are always drained
//! before the next terminal event is read.

use std::sync::Arc;

use crossterm::event::{Event as TermEvent, EventStream};
use futures::StreamExt;
use tempfile::TempPath;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::tasks::edit_task::EditSession;
use crate::tasks::plugin_task::PluginInvocation;
use crate::tasks::process_task::{ProcessRequest, ProcessRunner, RunOutcome};

/// What to do once a process finishes.
#[derive(Debug)]
pub enum RunPurpose {
    /// Captured file operation. A failure is queued as
    /// `"<failure_message> with cmd: ..."`; the selection is cleared.
    FileOperation { failure_message: &'static str },

    /// Command that owned the terminal. Unless errors are expected, a
    /// failure is shown as a report in the pager.
    Tracked { error_expected: bool },

    /// Plugin run; its command file is applied afterwards.
    Plugin(PluginInvocation),

    /// Editor session on a temp buffer.
    Edit(EditSession),

    /// Pager showing a report; the report is removed afterwards.
    Report(TempPath),
}

/// Side effect requested by the dispatcher.
#[derive(Debug)]
pub enum Effect {
    Run {
        request: ProcessRequest,
        purpose: RunPurpose,
    },

    /// Leave the program.
    Quit,
}

impl Effect {
    pub const fn run(request: ProcessRequest, purpose: RunPurpose) -> Self {
        Self::Run { request, purpose }
    }
}

#[derive(Debug)]
pub enum TaskResult {
    Finished {
        purpose: RunPurpose,
        outcome: RunOutcome,
    },
}

/// Input to the dispatcher, one at a time.
#[derive(Debug)]
pub enum AppEvent {
    Terminal(TermEvent),
    Task(TaskResult),
}

/// Runs requests and queues their completions.
pub struct TaskExecutor {
    runner: Arc<dyn ProcessRunner>,
    task_tx: mpsc::UnboundedSender<TaskResult>,
    task_rx: mpsc::UnboundedReceiver<TaskResult>,
}

impl TaskExecutor {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        Self {
            runner,
            task_tx,
            task_rx,
        }
    }

    /// Run `request` to completion and queue the result.
    pub async fn execute(&self, request: ProcessRequest, purpose: RunPurpose) {
        debug!("Executing {}", request.full_command());
        let outcome = self.runner.run(&request).await;

        if self
            .task_tx
            .send(TaskResult::Finished { purpose, outcome })
            .is_err()
        {
            warn!("Task queue closed; dropping result");
        }
    }

    pub async fn recv(&mut self) -> Option<TaskResult> {
        self.task_rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<TaskResult> {
        self.task_rx.try_recv().ok()
    }
}

pub struct EventLoop {
    executor: TaskExecutor,

    /// Dropped while an interactive child owns the terminal so no keys are
    /// read out from under it; reopened on the next read.
    event_stream: Option<EventStream>,
}

impl EventLoop {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        info!("Initializing event loop");
        Self {
            executor: TaskExecutor::new(runner),
            event_stream: Some(EventStream::new()),
        }
    }

    pub async fn execute(&mut self, request: ProcessRequest, purpose: RunPurpose) {
        if request.stdio.is_interactive() {
            self.event_stream = None;
        }
        self.executor.execute(request, purpose).await;
    }

    /// Next event, task completions first. `None` once the terminal stream
    /// has ended.
    pub async fn next_event(&mut self) -> Option<AppEvent> {
        loop {
            let event_stream = self.event_stream.get_or_insert_with(EventStream::new);
            let event = tokio::select! {
                biased;

                Some(task_result) = self.executor.recv() => {
                    trace!("Task result received");
                    Some(AppEvent::Task(task_result))
                }

                maybe_event = event_stream.next() => match maybe_event {
                    Some(Ok(event)) => Some(AppEvent::Terminal(event)),
                    Some(Err(e)) => {
                        warn!("Terminal event error: {}", e);
                        continue;
                    }
                    None => None,
                },
            };

            if event.is_none() {
                info!("Event loop terminated - no more events");
            }
            return event;
        }
    }
}

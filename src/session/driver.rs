//! Async driver running a `CompletionController` on its own task
//!
//! Intents arrive over an unbounded channel; the task sleeps until the next
//! debounce or focus-loss deadline and publishes every session change on a
//! `watch` channel. All controller mutation happens on this one task.

use std::future;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info};

use super::controller::CompletionController;
use super::state::{CompletionSession, EditInstruction};

/// User intents forwarded by the editing surface
#[derive(Debug)]
pub enum SessionIntent {
    Edit { text: String, cursor: usize },
    ManualTrigger { text: String, cursor: usize },
    NavigateNext,
    NavigatePrevious,
    Accept {
        index: Option<usize>,
        reply: oneshot::Sender<Option<EditInstruction>>,
    },
    Cancel,
    FocusLost,
    FocusGained,
}

/// Client side of a running session driver
#[derive(Debug, Clone)]
pub struct SessionHandle {
    intents: mpsc::UnboundedSender<SessionIntent>,
    session: watch::Receiver<CompletionSession>,
}

impl SessionHandle {
    /// Send an intent; false once the driver has stopped
    pub fn send(&self, intent: SessionIntent) -> bool {
        self.intents.send(intent).is_ok()
    }

    pub fn edit(&self, text: impl Into<String>, cursor: usize) -> bool {
        self.send(SessionIntent::Edit {
            text: text.into(),
            cursor,
        })
    }

    pub fn manual_trigger(&self, text: impl Into<String>, cursor: usize) -> bool {
        self.send(SessionIntent::ManualTrigger {
            text: text.into(),
            cursor,
        })
    }

    /// Accept the suggestion at `index`, or the selected one when `None`
    pub async fn accept(&self, index: Option<usize>) -> Option<EditInstruction> {
        let (reply, response) = oneshot::channel();
        if !self.send(SessionIntent::Accept { index, reply }) {
            return None;
        }
        response.await.ok().flatten()
    }

    /// Latest published session
    pub fn session(&self) -> CompletionSession {
        self.session.borrow().clone()
    }

    /// Wait for the next published session; `None` once the driver has stopped
    pub async fn changed(&mut self) -> Option<CompletionSession> {
        self.session.changed().await.ok()?;
        Some(self.session.borrow_and_update().clone())
    }
}

/// Spawn the driver task; it ends when every handle has been dropped
pub fn spawn_session_driver(
    controller: CompletionController,
) -> (SessionHandle, JoinHandle<CompletionController>) {
    let (intents_tx, intents_rx) = mpsc::unbounded_channel();
    let (session_tx, session_rx) = watch::channel(controller.session().clone());

    let task = tokio::spawn(run(controller, intents_rx, session_tx));
    let handle = SessionHandle {
        intents: intents_tx,
        session: session_rx,
    };
    (handle, task)
}

async fn run(
    mut controller: CompletionController,
    mut intents: mpsc::UnboundedReceiver<SessionIntent>,
    session: watch::Sender<CompletionSession>,
) -> CompletionController {
    info!("Completion session driver started");

    loop {
        let deadline = controller.next_deadline();
        let wake = async {
            match deadline {
                Some(deadline) => time::sleep_until(Instant::from_std(deadline)).await,
                None => future::pending().await,
            }
        };

        tokio::select! {
            intent = intents.recv() => {
                let Some(intent) = intent else {
                    break;
                };
                apply(&mut controller, intent);
            }
            _ = wake => {
                if !controller.poll(Instant::now().into_std()) {
                    continue;
                }
            }
        }

        session.send_if_modified(|current| {
            if current == controller.session() {
                false
            } else {
                *current = controller.session().clone();
                true
            }
        });
    }

    info!("Completion session driver terminated");
    controller
}

fn apply(controller: &mut CompletionController, intent: SessionIntent) {
    debug!("Session intent: {:?}", intent);
    let now = Instant::now().into_std();

    match intent {
        SessionIntent::Edit { text, cursor } => controller.edit(text, cursor, now),
        SessionIntent::ManualTrigger { text, cursor } => {
            controller.manual_trigger(&text, cursor);
        }
        SessionIntent::NavigateNext => controller.navigate_next(),
        SessionIntent::NavigatePrevious => controller.navigate_previous(),
        SessionIntent::Accept { index, reply } => {
            let edit = match index {
                Some(index) => controller.accept(index),
                None => controller.accept_selected(),
            };
            // The requester may have given up waiting
            let _ = reply.send(edit);
        }
        SessionIntent::Cancel => controller.cancel(),
        SessionIntent::FocusLost => controller.focus_lost(now),
        SessionIntent::FocusGained => controller.focus_gained(),
    }
}

/*
 * dispatcher.rs
 *
 * Copyright (C) 2026 Posit Software, PBC. All rights reserved.
 *
 */

use std::sync::Arc;
use std::sync::Mutex;

use log::debug;
use log::info;
use log::trace;
use log::warn;

use crate::error::Error;
use crate::repl::Interpreter;
use crate::repl::InterpreterFactory;
use crate::session::Session;
use crate::sync::BlockingQueue;
use crate::wire::content::Content;
use crate::wire::execute_reply::ExecuteReply;
use crate::wire::execute_request::ExecuteRequest;
use crate::wire::execute_result::ExecuteResult;
use crate::wire::history_reply::HistoryReply;
use crate::wire::is_complete_reply::IsComplete;
use crate::wire::is_complete_reply::IsCompleteReply;
use crate::wire::jupyter_message::Message;
use crate::wire::kernel_info_reply::KernelInfoReply;
use crate::wire::status::ExecutionState;
use crate::wire::status::KernelStatus;

/// Kernel-wide state touched while handling requests.
#[derive(Debug, Default)]
pub struct KernelState {
    /// Number of the last accepted execute request
    execution_count: u32,

    /// Session of the first client to execute code
    working_session: Option<String>,
}

impl KernelState {
    /// Claims the next execution number. Numbers start at 1.
    pub fn next_execution_count(&mut self) -> u32 {
        self.execution_count += 1;
        self.execution_count
    }

    pub fn execution_count(&self) -> u32 {
        self.execution_count
    }

    pub fn working_session(&self) -> Option<&str> {
        self.working_session.as_deref()
    }
}

/// Third stage: answers requests, running code on the interpreter and
/// broadcasting status and results on IOPub.
pub struct Dispatcher {
    session: Session,
    state: Arc<Mutex<KernelState>>,

    /// Starts interpreter sessions; a new one after each termination
    factory: Box<dyn InterpreterFactory>,
    interpreter: Option<Box<dyn Interpreter>>,

    kernel_info: KernelInfoReply,

    input: BlockingQueue<Message>,
    output: BlockingQueue<Message>,
    iopub: BlockingQueue<Message>,
}

impl Dispatcher {
    pub fn new(
        session: Session,
        factory: Box<dyn InterpreterFactory>,
        kernel_info: KernelInfoReply,
        input: BlockingQueue<Message>,
        output: BlockingQueue<Message>,
        iopub: BlockingQueue<Message>,
    ) -> Self {
        Self {
            session,
            state: Arc::new(Mutex::new(KernelState::default())),
            factory,
            interpreter: None,
            kernel_info,
            input,
            output,
            iopub,
        }
    }

    pub fn state(&self) -> Arc<Mutex<KernelState>> {
        self.state.clone()
    }

    pub fn run(mut self) {
        loop {
            let message = self.input.take();
            self.dispatch(message);
        }
    }

    /// Handles one verified request, queuing its reply (if it gets one).
    pub fn dispatch(&mut self, request: Message) {
        let kind = request.message_type();
        let Some(reply_type) = kind.reply_type() else {
            debug!("Not replying to '{kind}' message {}", request.header.msg_id);
            return;
        };
        trace!("Handling '{kind}' message {}", request.header.msg_id);

        let content: Content = match &request.content {
            Content::KernelInfoRequest(_) => self.kernel_info.clone().into(),
            Content::HistoryRequest(_) => HistoryReply::default().into(),
            Content::IsCompleteRequest(_) => IsCompleteReply {
                status: IsComplete::Unknown,
                indent: None,
            }
            .into(),
            Content::ExecuteRequest(req) => self.execute(&request, req).into(),
            _ => return,
        };
        debug_assert_eq!(content.message_type(), reply_type);

        self.output
            .add(Message::create_reply(&request, content, &self.session));
    }

    fn execute(&mut self, request: &Message, req: &ExecuteRequest) -> ExecuteReply {
        let (execution_count, starting) = {
            let mut state = self.state.lock().unwrap();
            let starting = match &state.working_session {
                None => {
                    state.working_session = Some(request.header.session.clone());
                    true
                },
                Some(session) => {
                    if *session != request.header.session {
                        info!(
                            "Execute request from session '{}' while working with '{session}'",
                            request.header.session
                        );
                    }
                    false
                },
            };
            (state.next_execution_count(), starting)
        };

        if starting {
            // Not a reply to anything, but part of the working session
            let mut message = Message::create(status(ExecutionState::Starting), None, &self.session);
            message.header.session = request.header.session.clone();
            self.iopub.add(message);
        }
        self.publish(request, status(ExecutionState::Busy));

        let reply = match self.run_code(&req.code) {
            Ok(output) => {
                if !req.silent {
                    self.publish(request, ExecuteResult::plain(execution_count, output));
                }
                ExecuteReply::ok(execution_count)
            },
            Err(err) => {
                warn!("Execution {execution_count} failed: {err}");
                if self.interpreter.is_none() {
                    self.publish(request, status(ExecutionState::Dead));
                }
                ExecuteReply::error(execution_count, error_name(&err), err.to_string())
            },
        };

        self.publish(request, status(ExecutionState::Idle));
        reply
    }

    /// Runs code on the current interpreter, starting one if needed. The
    /// interpreter is discarded when it stops working so the next request
    /// starts a fresh one.
    fn run_code(&mut self, code: &str) -> crate::Result<String> {
        let interpreter = match self.interpreter.take() {
            Some(interpreter) => interpreter,
            None => self.factory.launch()?,
        };

        let result = interpreter.run_command(code);
        match &result {
            Err(Error::ReplProcessTerminated(_)) | Err(Error::ReplIoError(_)) => {},
            _ => self.interpreter = Some(interpreter),
        }
        result
    }

    fn publish(&self, request: &Message, content: impl Into<Content>) {
        self.iopub.add(Message::create(
            content,
            Some(&request.header),
            &self.session,
        ));
    }
}

fn status(execution_state: ExecutionState) -> KernelStatus {
    KernelStatus { execution_state }
}

/// Reported as `ename` in error replies.
fn error_name(err: &Error) -> String {
    let name = match err {
        Error::ReplProcessTerminated(_) => "ReplProcessTerminated",
        Error::ReplSpawnFailed(_, _) => "ReplSpawnFailed",
        Error::ReplPtyError(_) => "ReplPtyError",
        Error::ReplIoError(_) => "ReplIoError",
        _ => "KernelError",
    };
    String::from(name)
}

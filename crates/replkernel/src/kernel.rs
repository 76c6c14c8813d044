/*
 * kernel.rs
 *
 * Copyright (C) 2022-2026 Posit Software, PBC. All rights reserved.
 *
 */

use std::sync::Arc;
use std::sync::Mutex;

use crossbeam::channel::unbounded;
use crossbeam::channel::Receiver;
use crossbeam::channel::RecvTimeoutError;
use crossbeam::channel::Sender;
use log::info;
use stdext::spawn;
use stdext::ResultExt;

use crate::connection_file::ConnectionFile;
use crate::error::Error;
use crate::pipeline;
use crate::pipeline::dispatcher::Dispatcher;
use crate::pipeline::dispatcher::KernelState;
use crate::pipeline::Queues;
use crate::repl::driver::ReplLauncher;
use crate::repl::ReplConfig;
use crate::session::Session;
use crate::socket::control::Control;
use crate::socket::heartbeat::Heartbeat;
use crate::socket::iopub::IOPub;
use crate::socket::socket::Socket;
use crate::sync::BlockingQueue;
use crate::sync::TaskFactory;
use crate::wire::kernel_info_reply::KernelInfoReply;

/// Things that end the kernel's life
#[derive(Debug, Clone, PartialEq)]
pub enum KernelEvent {
    /// A frontend asked the kernel to shut down
    Shutdown { restart: bool },

    /// Every pipeline stage has returned; carries the names of the stages that
    /// panicked
    PipelineStopped(Vec<String>),
}

/// The ports the kernel's sockets are bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelPorts {
    pub shell: u16,
    pub iopub: u16,
    pub stdin: u16,
    pub control: u16,
    pub hb: u16,
}

/// A running kernel: bound sockets plus the threads serving them.
pub struct Kernel {
    connection: ConnectionFile,
    events_rx: Receiver<KernelEvent>,
    launcher: ReplLauncher,
    state: Arc<Mutex<KernelState>>,

    /// Bound so frontends can connect; input requests are not supported
    _stdin: Socket,
}

impl Kernel {
    /// Binds all sockets described by the connection file and starts serving
    /// them. The REPL is started on the first execute request.
    pub fn connect(connection_file: ConnectionFile, config: ReplConfig) -> crate::Result<Kernel> {
        let ctx = zmq::Context::new();
        let session = Session::create(connection_file.key.as_str())?;
        let (events_tx, events_rx) = unbounded::<KernelEvent>();

        // Shell: the request pipeline
        let shell_socket = Socket::new(
            &ctx,
            String::from("Shell"),
            zmq::ROUTER,
            connection_file.endpoint(connection_file.shell_port),
        )?;
        let shell_port = port_finalize(&shell_socket, connection_file.shell_port)?;

        // IOPub: broadcasts from the dispatcher
        let iopub_socket = Socket::new(
            &ctx,
            String::from("IOPub"),
            zmq::PUB,
            connection_file.endpoint(connection_file.iopub_port),
        )?;
        let iopub_port = port_finalize(&iopub_socket, connection_file.iopub_port)?;

        let heartbeat_socket = Socket::new(
            &ctx,
            String::from("Heartbeat"),
            zmq::REP,
            connection_file.endpoint(connection_file.hb_port),
        )?;
        let hb_port = port_finalize(&heartbeat_socket, connection_file.hb_port)?;

        let control_socket = Socket::new(
            &ctx,
            String::from("Control"),
            zmq::ROUTER,
            connection_file.endpoint(connection_file.control_port),
        )?;
        let control_port = port_finalize(&control_socket, connection_file.control_port)?;

        let stdin_socket = Socket::new(
            &ctx,
            String::from("Stdin"),
            zmq::ROUTER,
            connection_file.endpoint(connection_file.stdin_port),
        )?;
        let stdin_port = port_finalize(&stdin_socket, connection_file.stdin_port)?;

        let iopub_queue = BlockingQueue::new();
        let iopub = IOPub::new(iopub_socket, session.clone(), iopub_queue.clone());
        spawn!("iopub", move || iopub.listen());

        let heartbeat = Heartbeat::new(heartbeat_socket);
        spawn!("heartbeat", move || heartbeat.listen());

        let control = Control::new(control_socket, session.clone(), events_tx.clone());
        spawn!("control", move || control.listen());

        let launcher = ReplLauncher::new(config.clone());
        let queues = Queues::default();
        let dispatcher = Dispatcher::new(
            session.clone(),
            Box::new(launcher.clone()),
            KernelInfoReply::new(config.language_info.clone(), config.banner.clone()),
            queues.dispatch.clone(),
            queues.encode.clone(),
            iopub_queue,
        );
        let state = dispatcher.state();

        let tasks = TaskFactory::new("shell");
        pipeline::start(
            &tasks,
            Arc::new(Mutex::new(shell_socket)),
            &session,
            &queues,
            dispatcher,
        );
        Self::supervise(tasks, events_tx);

        let connection = ConnectionFile {
            shell_port,
            iopub_port,
            stdin_port,
            control_port,
            hb_port,
            ..connection_file
        };
        info!(
            "Kernel listening on {} (shell {shell_port}, iopub {iopub_port}, stdin {stdin_port}, control {control_port}, hb {hb_port})",
            connection.ip
        );

        Ok(Kernel {
            connection,
            events_rx,
            launcher,
            state,
            _stdin: stdin_socket,
        })
    }

    /// Reports when the pipeline stops.
    fn supervise(tasks: TaskFactory, events_tx: Sender<KernelEvent>) {
        spawn!("shell-supervisor", move || {
            let panicked = tasks.wait_all();
            log::error!("Shell pipeline stopped");
            events_tx
                .send(KernelEvent::PipelineStopped(panicked))
                .on_err(|err| log::warn!("Nobody is waiting for kernel events: {err:?}"));
        });
    }

    pub fn ports(&self) -> KernelPorts {
        KernelPorts {
            shell: self.connection.shell_port,
            iopub: self.connection.iopub_port,
            stdin: self.connection.stdin_port,
            control: self.connection.control_port,
            hb: self.connection.hb_port,
        }
    }

    /// The connection file with ephemeral ports resolved.
    pub fn connection(&self) -> &ConnectionFile {
        &self.connection
    }

    /// The number of the last accepted execute request.
    pub fn execution_count(&self) -> u32 {
        self.state.lock().unwrap().execution_count()
    }

    /// Blocks until something ends the kernel's life.
    pub fn wait_for_event(&self) -> KernelEvent {
        match self.events_rx.recv() {
            Ok(event) => event,
            // The control thread and the supervisor both hold senders; if
            // both are gone, nothing is serving the kernel anymore
            Err(_) => KernelEvent::PipelineStopped(Vec::new()),
        }
    }

    /// Like `wait_for_event()`, giving up after `timeout`.
    pub fn wait_for_event_timeout(&self, timeout: std::time::Duration) -> crate::Result<KernelEvent> {
        match self.events_rx.recv_timeout(timeout) {
            Ok(event) => Ok(event),
            Err(RecvTimeoutError::Timeout) => Err(Error::Timeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => Ok(KernelEvent::PipelineStopped(Vec::new())),
        }
    }

    /// Stops the REPL, if one is running.
    pub fn shutdown(&self) {
        info!("Shutting down kernel");
        self.launcher.kill();
    }
}

fn port_finalize(socket: &Socket, port: u16) -> crate::Result<u16> {
    if port == 0 {
        // Server provided the port, extract it from the socket
        // since we gave zmq a port number of `0` to begin with.
        socket.port()
    } else {
        // Client provided the port, just use that
        Ok(port)
    }
}

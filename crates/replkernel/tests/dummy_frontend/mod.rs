/*
 * mod.rs
 *
 * Copyright (C) 2022-2026 Posit Software, PBC. All rights reserved.
 *
 */

use std::time::Duration;

use replkernel::connection_file::ConnectionFile;
use replkernel::kernel::Kernel;
use replkernel::repl::ReplConfig;
use replkernel::session::Session;
use replkernel::socket::socket::Socket;
use replkernel::wire::content::Content;
use replkernel::wire::execute_request::ExecuteRequest;
use replkernel::wire::jupyter_message::Message;
use replkernel::wire::status::ExecutionState;

pub const KEY: &str = "abc";

/// A REPL that prompts with `repl> ` and answers each line with `out: <line>`.
/// `exit` makes it quit.
const FAKE_REPL: &str = r#"
printf 'Fake REPL 1.0\n'
while true; do
  printf 'repl> '
  IFS= read -r line || exit 0
  case "$line" in
    exit) exit 3;;
    *) printf 'out: %s\n' "$line";;
  esac
done
"#;

/// How long to wait for the kernel; the first execute request starts the REPL
const RECV_TIMEOUT_MS: i64 = 5000;

pub fn fake_repl_config() -> ReplConfig {
    ReplConfig::swift()
        .unwrap()
        .with_command("/bin/sh", vec![String::from("-c"), String::from(FAKE_REPL)])
        .with_prompt(r"^repl>\s*$")
        .unwrap()
}

/// Starts a kernel on ephemeral loopback ports.
pub fn start_kernel() -> Kernel {
    let _ = env_logger::builder().is_test(true).try_init();

    let connection_file = ConnectionFile::from_json(&format!(
        r#"{{
            "control_port": 0,
            "shell_port": 0,
            "stdin_port": 0,
            "iopub_port": 0,
            "hb_port": 0,
            "transport": "tcp",
            "signature_scheme": "hmac-sha256",
            "ip": "127.0.0.1",
            "key": "{KEY}"
        }}"#
    ))
    .unwrap();

    Kernel::connect(connection_file, fake_repl_config()).unwrap()
}

/// The client side of a kernel connection.
pub struct DummyFrontend {
    pub control_socket: Socket,
    pub shell_socket: Socket,
    pub iopub_socket: Socket,
    pub heartbeat_socket: Socket,
    pub session: Session,
}

impl DummyFrontend {
    pub fn new(kernel: &Kernel) -> Self {
        Self::with_key(kernel, KEY)
    }

    /// Connects to `kernel`, signing with `key`.
    pub fn with_key(kernel: &Kernel, key: &str) -> Self {
        let connection = kernel.connection();
        let ports = kernel.ports();
        let ctx = zmq::Context::new();

        let socket = |name: &str, kind: zmq::SocketType, port: u16| {
            Socket::new(&ctx, String::from(name), kind, connection.endpoint(port)).unwrap()
        };

        let frontend = Self {
            control_socket: socket("Control", zmq::DEALER, ports.control),
            shell_socket: socket("Shell", zmq::DEALER, ports.shell),
            iopub_socket: socket("IOPub", zmq::SUB, ports.iopub),
            heartbeat_socket: socket("Heartbeat", zmq::REQ, ports.hb),
            session: Session::create(key).unwrap(),
        };

        // Subscriptions propagate asynchronously; give the kernel's PUB
        // socket time to learn about ours so no broadcast is lost
        frontend.iopub_socket.subscribe().unwrap();
        std::thread::sleep(Duration::from_millis(300));

        frontend
    }

    /// Signs and sends a message; returns its ID.
    pub fn send(&self, socket: &Socket, mut message: Message) -> String {
        message.sign(&self.session).unwrap();
        socket.send_message(&message).unwrap();
        message.header.msg_id
    }

    pub fn send_shell(&self, content: impl Into<Content>) -> String {
        let message = Message::create(content, None, &self.session);
        self.send(&self.shell_socket, message)
    }

    pub fn send_execute_request(&self, code: &str) -> String {
        self.send_shell(ExecuteRequest {
            code: String::from(code),
            silent: false,
            store_history: true,
            user_expressions: serde_json::json!({}),
            allow_stdin: false,
            stop_on_error: false,
        })
    }

    /// Waits for a message, failing the test instead of hanging when the
    /// kernel never answers.
    pub fn recv(&self, socket: &Socket) -> Message {
        if socket.poll_incoming(RECV_TIMEOUT_MS).unwrap() {
            return socket.recv_message().unwrap();
        }
        panic!("Timeout while expecting message on socket {}", socket.name);
    }

    /// Like `recv()`, but checks the kernel signed the message with our key.
    pub fn recv_verified(&self, socket: &Socket) -> Message {
        let message = self.recv(socket);
        message.verify(&self.session).unwrap();
        message
    }

    pub fn recv_shell(&self) -> Message {
        self.recv_verified(&self.shell_socket)
    }

    pub fn recv_iopub(&self) -> Message {
        self.recv_verified(&self.iopub_socket)
    }

    pub fn recv_control(&self) -> Message {
        self.recv_verified(&self.control_socket)
    }

    /// Receives a status broadcast and returns its state.
    pub fn recv_iopub_status(&self) -> ExecutionState {
        let message = self.recv_iopub();
        match message.content {
            Content::Status(status) => status.execution_state,
            other => panic!("Expected a status broadcast, got {other:?}"),
        }
    }

    /// Checks that nothing arrives on `socket` for a while.
    pub fn assert_no_incoming(&self, socket: &Socket) {
        if socket.poll_incoming(500).unwrap() {
            let message = socket.recv_message();
            panic!("Unexpected message on socket {}: {message:?}", socket.name);
        }
    }
}

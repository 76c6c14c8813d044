/*
 * kernel.rs
 *
 * Copyright (C) 2022-2026 Posit Software, PBC. All rights reserved.
 *
 */

use std::time::Duration;

use assert_matches::assert_matches;
use replkernel::kernel::KernelEvent;
use replkernel::wire::content::Content;
use replkernel::wire::header::JupyterHeader;
use replkernel::wire::jupyter_message::Message;
use replkernel::wire::jupyter_message::Status;
use replkernel::wire::kernel_info_request::KernelInfoRequest;
use replkernel::wire::message_type::MessageType;
use replkernel::wire::shutdown_request::ShutdownRequest;
use replkernel::wire::status::ExecutionState;
use replkernel::wire::wire_message::SignedParts;
use replkernel::wire::wire_message::WireMessage;

mod dummy_frontend;

use crate::dummy_frontend::start_kernel;
use crate::dummy_frontend::DummyFrontend;

#[test]
fn test_kernel_info_reply_correlates_with_request() {
    let kernel = start_kernel();
    let frontend = DummyFrontend::new(&kernel);

    let mut request = Message::create(KernelInfoRequest {}, None, &frontend.session);
    request.header.msg_id = String::from("m1");
    request.header.session = String::from("s1");
    frontend.send(&frontend.shell_socket, request);

    let reply = frontend.recv_shell();
    assert_eq!(reply.message_type(), MessageType::KernelInfoReply);
    assert_eq!(reply.parent_header.as_ref().unwrap().msg_id, "m1");
    assert_eq!(reply.header.session, "s1");
    assert_matches!(reply.content, Content::KernelInfoReply(info) => {
        assert_eq!(info.status, Status::Ok);
        assert_eq!(info.protocol_version, "5.0");
        assert_eq!(info.language_info.name, "swift");
    });

    // Kernel info doesn't touch the execution state
    frontend.assert_no_incoming(&frontend.iopub_socket);
    kernel.shutdown();
}

#[test]
fn test_wrongly_signed_requests_are_dropped() {
    let kernel = start_kernel();
    let frontend = DummyFrontend::with_key(&kernel, "not-the-key");

    frontend.send_shell(KernelInfoRequest {});
    frontend.send_execute_request("1 + 1");

    frontend.assert_no_incoming(&frontend.shell_socket);
    frontend.assert_no_incoming(&frontend.iopub_socket);
    assert_eq!(kernel.execution_count(), 0);
    kernel.shutdown();
}

#[test]
fn test_execute_requests_are_counted_and_broadcast() {
    let kernel = start_kernel();
    let frontend = DummyFrontend::new(&kernel);

    let first = frontend.send_execute_request("1 + 1");

    // The first execution starts the working session
    let starting = frontend.recv_iopub();
    assert_matches!(&starting.content, Content::Status(status) => {
        assert_eq!(status.execution_state, ExecutionState::Starting);
    });
    assert!(starting.parent_header.is_none());
    assert_eq!(starting.header.session, frontend.session.session_id);

    assert_eq!(frontend.recv_iopub_status(), ExecutionState::Busy);
    let result = frontend.recv_iopub();
    assert_eq!(result.parent_header.as_ref().unwrap().msg_id, first);
    assert_matches!(result.content, Content::ExecuteResult(result) => {
        assert_eq!(result.execution_count, 1);
        assert_eq!(result.data["text/plain"], "out: 1 + 1\n");
    });
    assert_eq!(frontend.recv_iopub_status(), ExecutionState::Idle);

    let reply = frontend.recv_shell();
    assert_eq!(reply.parent_header.as_ref().unwrap().msg_id, first);
    assert_matches!(reply.content, Content::ExecuteReply(reply) => {
        assert_eq!(reply.status, Status::Ok);
        assert_eq!(reply.execution_count, 1);
    });

    let second = frontend.send_execute_request("2 + 2");
    assert_eq!(frontend.recv_iopub_status(), ExecutionState::Busy);
    assert_matches!(frontend.recv_iopub().content, Content::ExecuteResult(result) => {
        assert_eq!(result.execution_count, 2);
        assert_eq!(result.data["text/plain"], "out: 2 + 2\n");
    });
    assert_eq!(frontend.recv_iopub_status(), ExecutionState::Idle);

    let reply = frontend.recv_shell();
    assert_eq!(reply.parent_header.as_ref().unwrap().msg_id, second);
    assert_matches!(reply.content, Content::ExecuteReply(reply) => {
        assert_eq!(reply.execution_count, 2);
    });
    assert_eq!(kernel.execution_count(), 2);
    kernel.shutdown();
}

#[test]
fn test_unknown_message_type_is_dropped() {
    let kernel = start_kernel();
    let frontend = DummyFrontend::new(&kernel);

    // A well-formed, correctly signed message of a type the kernel doesn't know
    let mut header = JupyterHeader::create(
        MessageType::KernelInfoRequest,
        frontend.session.session_id.clone(),
        frontend.session.username.clone(),
    );
    header.msg_type = String::from("comm_info_request");
    let parts = SignedParts {
        header: serde_json::to_vec(&header).unwrap(),
        parent_header: b"{}".to_vec(),
        metadata: b"{}".to_vec(),
        content: b"{}".to_vec(),
    };
    let wire = WireMessage {
        zmq_identities: Vec::new(),
        signature: parts.sign(&frontend.session.hmac).into_bytes(),
        parts,
        buffers: Vec::new(),
    };
    frontend
        .shell_socket
        .send_multipart(&wire.into_frames())
        .unwrap();
    frontend.assert_no_incoming(&frontend.shell_socket);

    // The pipeline is still alive
    let id = frontend.send_shell(KernelInfoRequest {});
    let reply = frontend.recv_shell();
    assert_eq!(reply.parent_header.unwrap().msg_id, id);
    kernel.shutdown();
}

#[test]
fn test_terminated_repl_is_reported_and_restarted() {
    let kernel = start_kernel();
    let frontend = DummyFrontend::new(&kernel);

    frontend.send_execute_request("exit");
    assert_eq!(frontend.recv_iopub_status(), ExecutionState::Starting);
    assert_eq!(frontend.recv_iopub_status(), ExecutionState::Busy);
    assert_eq!(frontend.recv_iopub_status(), ExecutionState::Dead);
    assert_eq!(frontend.recv_iopub_status(), ExecutionState::Idle);
    assert_matches!(frontend.recv_shell().content, Content::ExecuteReply(reply) => {
        assert_eq!(reply.status, Status::Error);
        assert_eq!(reply.execution_count, 1);
        assert_eq!(reply.ename.as_deref(), Some("ReplProcessTerminated"));
    });

    // The next request gets a fresh REPL
    frontend.send_execute_request("hello");
    assert_eq!(frontend.recv_iopub_status(), ExecutionState::Busy);
    assert_matches!(frontend.recv_iopub().content, Content::ExecuteResult(result) => {
        assert_eq!(result.execution_count, 2);
        assert_eq!(result.data["text/plain"], "out: hello\n");
    });
    assert_eq!(frontend.recv_iopub_status(), ExecutionState::Idle);
    assert_matches!(frontend.recv_shell().content, Content::ExecuteReply(reply) => {
        assert_eq!(reply.status, Status::Ok);
    });
    kernel.shutdown();
}

#[test]
fn test_heartbeat_echoes() {
    let kernel = start_kernel();
    let frontend = DummyFrontend::new(&kernel);

    frontend
        .heartbeat_socket
        .send(zmq::Message::from(&b"ping"[..]))
        .unwrap();
    assert!(frontend.heartbeat_socket.poll_incoming(5000).unwrap());
    let mut echo = zmq::Message::new();
    frontend.heartbeat_socket.recv(&mut echo).unwrap();
    assert_eq!(&*echo, b"ping");
    kernel.shutdown();
}

#[test]
fn test_shutdown_request_on_control() {
    let kernel = start_kernel();
    let frontend = DummyFrontend::new(&kernel);

    let request = Message::create(ShutdownRequest { restart: true }, None, &frontend.session);
    let id = frontend.send(&frontend.control_socket, request);

    let reply = frontend.recv_control();
    assert_eq!(reply.parent_header.as_ref().unwrap().msg_id, id);
    assert_matches!(reply.content, Content::ShutdownReply(reply) => {
        assert_eq!(reply.status, Status::Ok);
        assert!(reply.restart);
    });

    assert_eq!(
        kernel
            .wait_for_event_timeout(Duration::from_secs(5))
            .unwrap(),
        KernelEvent::Shutdown { restart: true }
    );
    kernel.shutdown();
}

#[test]
fn test_unsigned_requests_are_dropped_by_signed_kernel() {
    let kernel = start_kernel();
    let frontend = DummyFrontend::with_key(&kernel, "");

    frontend.send_shell(KernelInfoRequest {});
    frontend.assert_no_incoming(&frontend.shell_socket);
    kernel.shutdown();
}

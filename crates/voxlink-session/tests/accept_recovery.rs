#![cfg(unix)]

//! Runs alone in its own test binary: it exhausts the process's file
//! descriptors, which would break any test running beside it.

use std::fs::File;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use voxlink_frame::PacingConfig;
use voxlink_session::{exchange, Server, ServerConfig};
use voxlink_transport::TcpLink;

const MAX_OPEN: usize = 1 << 20;

#[test]
fn serve_survives_descriptor_exhaustion() {
    let server = Server::bind("127.0.0.1:0")
        .expect("server should bind")
        .with_config(ServerConfig {
            pacing: PacingConfig::unpaced(256),
            reply_delay: Duration::ZERO,
            ..ServerConfig::default()
        })
        .expect("config should be valid");
    let addr = server.local_addr();
    let running = Arc::new(AtomicBool::new(true));

    let handle = {
        let running = running.clone();
        thread::spawn(move || server.serve(&running, |_| {}))
    };

    let mut held = Vec::new();
    while held.len() < MAX_OPEN {
        match File::open("/dev/null") {
            Ok(file) => held.push(file),
            Err(_) => break,
        }
    }
    if held.len() == MAX_OPEN {
        // Descriptor limit too high to reach; nothing to exercise.
        running.store(false, Ordering::SeqCst);
        let _ = handle.join();
        return;
    }

    // One free descriptor for the client; the server's accept has none.
    held.pop();
    let stream = TcpLink::connect(addr).expect("client should connect");
    thread::sleep(Duration::from_millis(300));
    assert!(
        !handle.is_finished(),
        "accept loop exited while descriptors were exhausted"
    );

    drop(held);
    let reply = exchange(stream, &[0, 0]).expect("pending client should be served");
    assert_eq!(reply.control.status, "ok");

    running.store(false, Ordering::SeqCst);
    let served = handle
        .join()
        .expect("serve thread should not panic")
        .expect("serve should return cleanly");
    assert_eq!(served, 1);
}

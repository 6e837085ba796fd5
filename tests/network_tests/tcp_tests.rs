//! Loopback TCP Tests
//!
//! A full session against a minimal scripted server on 127.0.0.1.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

use crossbeam::channel;
use linechat::{establish, CloseReason, Config, Connection, Event, LoginOutcome, Observer};

use super::mock::next_matching;

#[test]
fn test_session_over_loopback() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut writer = stream.try_clone().unwrap();
        let mut reader = BufReader::new(stream);
        let mut received = Vec::new();

        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        received.push(line.clone());
        // Taken name first, then accept; the reply is split over two writes
        writer.write_all(b"IN-").unwrap();
        writer.flush().unwrap();
        writer.write_all(b"USE\n").unwrap();

        line.clear();
        reader.read_line(&mut line).unwrap();
        received.push(line.clone());
        writer.write_all(b"HELLO bob\n").unwrap();

        line.clear();
        reader.read_line(&mut line).unwrap();
        received.push(line.clone());
        writer.write_all(b"LIST-OK alice,bob\n").unwrap();

        // Remaining lines until the client shuts down
        loop {
            line.clear();
            if reader.read_line(&mut line).unwrap_or(0) == 0 {
                break;
            }
            received.push(line.clone());
        }
        received
    });

    let config = Config::builder()
        .server_addr(addr.to_string())
        .read_chunk_size(2)
        .build();
    let connection = Arc::new(Connection::connect(&config).unwrap());

    let (input, input_rx) = channel::unbounded();
    let (events_tx, events) = channel::unbounded();

    input.send("alice".to_string()).unwrap();
    input.send("bob".to_string()).unwrap();

    let session = match establish(connection, &config, &input_rx, &events_tx).unwrap() {
        LoginOutcome::LoggedIn(session) => session,
        _ => panic!("Expected login to succeed"),
    };
    assert_eq!(session.username().as_str(), "bob");

    let observer: Arc<dyn Observer> = Arc::new(events_tx);
    let running = thread::spawn(move || session.run(input_rx, observer).unwrap());

    input.send("!who".to_string()).unwrap();
    let presence = next_matching(&events, |e| matches!(e, Event::Presence { .. }));
    assert_eq!(
        presence,
        Event::Presence {
            users: vec!["alice".to_string(), "bob".to_string()]
        }
    );

    input.send("!quit".to_string()).unwrap();
    assert_eq!(running.join().unwrap(), CloseReason::UserQuit);

    let received = server.join().unwrap();
    assert_eq!(
        received,
        vec!["HELLO-FROM alice\n", "HELLO-FROM bob\n", "LIST\n", "QUIT\n"]
    );
}

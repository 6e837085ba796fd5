//! linechat Client Binary
//!
//! Connects to a chat server and bridges the terminal to the protocol engine.

use std::io::{self, BufRead};
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;

use clap::Parser;
use crossbeam::channel::{self, Receiver};
use linechat::session::RejectReason;
use linechat::{establish, CloseReason, Config, Connection, Event, LoginOutcome, Observer, SelfMessagePolicy};
use tracing_subscriber::{fmt, EnvFilter};

/// linechat client
#[derive(Parser, Debug)]
#[command(name = "linechat")]
#[command(about = "Client for a newline-delimited text chat protocol")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(short, long, default_value = "127.0.0.1")]
    address: String,

    /// Server port
    #[arg(short, long, default_value = "5378")]
    port: u16,

    /// Send messages addressed to yourself instead of refusing them
    #[arg(long)]
    allow_self_messages: bool,

    /// Socket read timeout in milliseconds (0 = none)
    #[arg(long, default_value = "0")]
    read_timeout_ms: u64,
}

fn main() -> ExitCode {
    // Logs go to stderr; stdout carries the conversation
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,linechat=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let policy = if args.allow_self_messages {
        SelfMessagePolicy::Forward
    } else {
        SelfMessagePolicy::Reject
    };

    let config = Config::builder()
        .server_addr(format!("{}:{}", args.address, args.port))
        .read_timeout_ms(args.read_timeout_ms)
        .self_message_policy(policy)
        .build();

    tracing::debug!("linechat v{}", linechat::VERSION);

    let connection = match Connection::connect(&config) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            tracing::error!("Failed to connect to {}: {}", config.server_addr, e);
            println!("Cannot connect to server.");
            return ExitCode::FAILURE;
        }
    };

    let input = spawn_stdin_reader();
    let console: Arc<dyn Observer> = Arc::new(Console);

    println!("Welcome to Chat Client.");

    let session = match establish(connection, &config, &input, &*console) {
        Ok(LoginOutcome::LoggedIn(session)) => session,
        Ok(LoginOutcome::Aborted) => return ExitCode::SUCCESS,
        Ok(LoginOutcome::Rejected(_)) => return ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("Login failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match session.run(input, console) {
        Ok(CloseReason::ReadFailed | CloseReason::WriteFailed) => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Session error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Forward stdin lines to a channel; the channel disconnects at EOF
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = channel::unbounded();

    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });

    rx
}

/// Renders session events as console text
struct Console;

impl Observer for Console {
    fn notify(&self, event: Event) {
        match event {
            Event::LoginPrompt => println!("Enter your login:"),
            Event::InvalidUsername { username, error } => {
                println!("Cannot log in as {}. That username is not allowed: {}.", username, error)
            }
            Event::UsernameTaken { username } => {
                println!("Cannot log in as {}. That username is already in use.", username)
            }
            Event::LoginDeclined { username, header } => {
                println!("Cannot log in as {}. The server refused the login ({}).", username, header)
            }
            Event::LoggedIn { username } => println!("Successfully logged in as {}!", username),
            Event::LoginRejected { reason: RejectReason::ServerFull } => {
                println!("Cannot log in. The server is full!")
            }
            Event::LoginRejected { reason } => println!("Cannot log in: {}.", reason),
            Event::LoginAborted => println!("Exiting."),
            Event::Presence { users } => {
                println!("There are {} online users:", users.len());
                for user in users {
                    println!("{}", user);
                }
            }
            Event::Delivery { sender, body } => println!("From {}: {}", sender, body),
            Event::SendConfirmed => println!("The message was sent successfully"),
            Event::SendFailed { reason } => println!("The message was not sent: {}", reason),
            Event::ProtocolWarning { detail } => println!("Warning: {}", detail),
            Event::InputRejected { error, .. } => {
                println!("Error: {}. Use '@username message', '!who' or '!quit'.", error)
            }
            Event::SessionClosed { reason } => println!("Disconnected: {}.", reason),
        }
    }
}

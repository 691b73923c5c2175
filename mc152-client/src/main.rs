//! A Minecraft 1.5.2 protocol client in Rust.

use std::error::Error;
use std::net::TcpStream;
use std::process::ExitCode;

use tracing::{error, info, warn};

use mc152_client::conn::{self, Connection};
use mc152_client::net::Client;
use mc152_client::proto::{self, HandshakePacket, Packet};
use mc152_client::world::Simulator;
use mc152_client::{config, crypto};


fn main() -> ExitCode {

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut host = None;
    let mut port = None;
    let mut username = None;
    let mut encrypt = false;

    for arg in std::env::args().skip(1) {
        if arg == "--encrypt" {
            encrypt = true;
        } else if host.is_none() {
            host = Some(arg);
        } else if port.is_none() {
            match arg.parse::<u16>() {
                Ok(p) => port = Some(p),
                Err(_) => {
                    eprintln!("invalid port: {arg}");
                    return ExitCode::FAILURE;
                }
            }
        } else if username.is_none() {
            username = Some(arg);
        } else {
            eprintln!("usage: mc152-client [--encrypt] [host] [port] [username]");
            return ExitCode::FAILURE;
        }
    }

    let host = host.unwrap_or_else(|| config::DEFAULT_HOST.to_string());
    let port = port.unwrap_or(config::DEFAULT_PORT);
    let username = username.unwrap_or_else(|| config::DEFAULT_USERNAME.to_string());

    match run(&host, port, &username, encrypt) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }

}

fn run(host: &str, port: u16, username: &str, encrypt: bool) -> Result<(), Box<dyn Error>> {

    let stream = TcpStream::connect((host, port))?;
    let interrupt_handle = stream.try_clone()?;
    let mut conn = Connection::tcp(stream)?;

    let handshake = HandshakePacket {
        version: proto::VERSION,
        username: username.to_string(),
        hostname: host.to_string(),
        port: port as i32,
    };

    if encrypt {
        let secret = crypto::generate_secret();
        conn::establish_encrypted(&mut conn, handshake, &secret)?;
        conn::encrypt_connection(&mut conn);
        info!("connected to {host}:{port} as {username} (encrypted)");
    } else {
        conn::establish_plaintext(&mut conn, handshake)?;
        info!("connected to {host}:{port} as {username}");
    }

    let client = Client::start(conn, config::queue_capacity());

    ctrlc::set_handler(move || {
        let _ = interrupt_handle.shutdown(std::net::Shutdown::Both);
    })?;

    let mut simulator = Simulator::new();

    for packet in client.inbox().iter() {

        if let Err(e) = simulator.handle(&packet) {
            warn!("simulation error: {e}");
        }

        match packet {
            Packet::KeepAlive(p) => {
                if client.send(Packet::KeepAlive(p)).is_err() {
                    break;
                }
            }
            Packet::ChatMessage(p) => info!("chat: {}", p.message),
            Packet::Disconnect(p) => {
                info!("disconnected by server: {}", p.reason);
                break;
            }
            _ => {}
        }

    }

    client.disconnect();
    client.wait();
    Ok(())

}

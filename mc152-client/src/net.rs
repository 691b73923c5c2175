//! Threaded client driver, pumping decoded packets between the connection
//! and a pair of bounded channels. One worker owns the reading half, the
//! other owns the writing half, they never share any other mutable state.

use std::io;
use std::net::{Shutdown, TcpStream};
use std::thread;

use crossbeam_channel::{bounded, Receiver, SendError, Sender};
use tracing::{debug, error, warn};

use crate::conn::Connection;
use crate::proto::{Packet, ProtoError};


/// Handle on the two worker threads bound to one connection. The handshake
/// must be complete before the workers start, nothing may upgrade the
/// streams once they own them.
pub struct Client {
    /// Packets decoded from the server, delivered in on-wire order. Not
    /// draining it blocks the inbox worker and applies backpressure to the
    /// network.
    inbox: Receiver<Packet>,
    /// Sending half of the outbox, taken on close.
    outbox: Option<Sender<Packet>>,
    /// Signaled once by each worker when it terminates.
    exit: Receiver<()>,
    socket: Option<TcpStream>,
}

impl Client {

    /// Split the connection and spawn the inbox and outbox workers, each
    /// queue bounded to the given capacity.
    pub fn start(conn: Connection, capacity: usize) -> Self {

        let (mut reader, mut writer, socket) = conn.into_split();
        let (inbox_sender, inbox_receiver) = bounded(capacity);
        let (outbox_sender, outbox_receiver) = bounded::<Packet>(capacity);
        let (exit_sender, exit_receiver) = bounded(2);

        let reader_exit = exit_sender.clone();
        thread::Builder::new()
            .name("mc152 inbox".to_string())
            .spawn(move || {
                loop {
                    match reader.read_packet() {
                        Ok(packet) => {
                            // A send error means every receiver is gone, no
                            // point decoding further.
                            if inbox_sender.send(packet).is_err() {
                                break;
                            }
                        }
                        Err(ProtoError::UnexpectedEof) => {
                            debug!("server closed the connection");
                            break;
                        }
                        Err(e) => {
                            error!("failed to read packet: {e}");
                            break;
                        }
                    }
                }
                let _ = reader_exit.try_send(());
            })
            .expect("failed to spawn the inbox worker");

        let writer_exit = exit_sender;
        thread::Builder::new()
            .name("mc152 outbox".to_string())
            .spawn(move || {
                // Receiving fails once every sender is dropped, which is the
                // cooperative way of shutting the driver down.
                while let Ok(packet) = outbox_receiver.recv() {
                    match writer.write_packet(&packet) {
                        Ok(()) => {}
                        Err(ProtoError::UnexpectedEof) => {
                            debug!("server closed the connection");
                            break;
                        }
                        Err(ProtoError::Io(e)) if is_disconnect(&e) => {
                            debug!("server closed the connection: {e}");
                            break;
                        }
                        Err(e) => {
                            warn!("failed to write packet: {e}");
                        }
                    }
                }
                let _ = writer_exit.try_send(());
            })
            .expect("failed to spawn the outbox worker");

        Self {
            inbox: inbox_receiver,
            outbox: Some(outbox_sender),
            exit: exit_receiver,
            socket,
        }

    }

    /// Queue of packets decoded from the server, in on-wire order.
    pub fn inbox(&self) -> &Receiver<Packet> {
        &self.inbox
    }

    /// Queue a packet for the outbox worker, blocking while the outbox is
    /// full. Fails once the worker has terminated.
    pub fn send(&self, packet: Packet) -> Result<(), SendError<Packet>> {
        let outbox = self.outbox.as_ref().expect("outbox closed");
        outbox.send(packet)
    }

    /// A clone of the outbox sender for producers on other threads. All
    /// clones must be dropped for [`close_outbox`](Self::close_outbox) to
    /// take effect.
    pub fn outbox(&self) -> Sender<Packet> {
        self.outbox.clone().expect("outbox closed")
    }

    /// Close the outbox: the outbox worker drains the pending packets and
    /// terminates.
    pub fn close_outbox(&mut self) {
        self.outbox = None;
    }

    /// Block until either worker has terminated: the peer closed the
    /// connection, a fatal read error occurred, or the outbox was closed.
    pub fn wait(&self) {
        let _ = self.exit.recv();
    }

    /// Shut the socket down, forcing both workers to terminate.
    pub fn disconnect(&self) {
        if let Some(socket) = &self.socket {
            let _ = socket.shutdown(Shutdown::Both);
        }
    }

}

/// Return true for I/O errors raised by writing to a closed peer.
fn is_disconnect(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
    )
}


#[cfg(test)]
mod tests {

    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    use crate::conn::{PacketReader, PacketWriter};
    use crate::proto::{Direction, KeepAlivePacket};

    use super::*;

    fn tcp_pair() -> (Connection, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();
        (Connection::tcp(client).unwrap(), server)
    }

    #[test]
    fn inbox_preserves_wire_order_under_backpressure() {

        let (conn, server) = tcp_pair();
        let total = 50;

        let producer = thread::spawn(move || {
            let mut writer = PacketWriter::new(Box::new(server), Direction::Clientbound);
            for id in 0..total {
                writer.write_packet(&Packet::KeepAlive(KeepAlivePacket { id })).unwrap();
            }
            // Closing the stream ends the inbox worker with a clean EOF.
        });

        // A small inbox forces the worker to block while the consumer lags.
        let client = Client::start(conn, 8);
        thread::sleep(Duration::from_millis(100));

        let mut received = Vec::new();
        while let Ok(packet) = client.inbox().recv_timeout(Duration::from_secs(5)) {
            if let Packet::KeepAlive(p) = packet {
                received.push(p.id);
            }
        }

        // Nothing lost, nothing reordered.
        assert_eq!(received, (0..total).collect::<Vec<_>>());
        producer.join().unwrap();
        client.wait();

    }

    #[test]
    fn outbox_preserves_enqueue_order() {

        let (conn, server) = tcp_pair();
        let total = 20;

        let consumer = thread::spawn(move || {
            let mut reader = PacketReader::new(Box::new(server), Direction::Serverbound);
            let mut received = Vec::new();
            for _ in 0..total {
                if let Packet::KeepAlive(p) = reader.read_packet().unwrap() {
                    received.push(p.id);
                }
            }
            received
        });

        let mut client = Client::start(conn, 4);
        for id in 0..total {
            client.send(Packet::KeepAlive(KeepAlivePacket { id })).unwrap();
        }

        assert_eq!(consumer.join().unwrap(), (0..total).collect::<Vec<_>>());

        // Closing the outbox drains the worker and signals the exit.
        client.close_outbox();
        client.wait();

    }

    #[test]
    fn peer_close_signals_exit() {
        let (conn, server) = tcp_pair();
        let client = Client::start(conn, 4);
        drop(server);
        // Returns because the inbox worker terminates on EOF.
        client.wait();
        assert!(client.inbox().recv().is_err());
    }

    #[test]
    fn disconnect_forces_both_workers_out() {
        let (conn, server) = tcp_pair();
        let client = Client::start(conn, 4);
        client.disconnect();
        client.wait();
        drop(server);
    }

}

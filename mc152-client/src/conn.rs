//! Packet stream wrappers and the connection handshake. The reader and the
//! writer each own their view of the underlying byte stream, so that the
//! handshake can upgrade both sides to an encrypting wrapper in place.

use std::io::{self, Read, Write};
use std::net::TcpStream;

use rsa::RsaPublicKey;
use tracing::debug;

use crate::crypto::{self, CipherReader, CipherWriter, CryptoError};
use crate::proto::{
    Direction, EncryptionKeyResponsePacket, HandshakePacket, Packet, ProtoError,
};


/// Errors of the connection establishment.
#[derive(thiserror::Error, Debug)]
pub enum HandshakeError {
    /// The peer answered a handshake step with the wrong packet type.
    #[error("expected {expected} but the peer sent another packet")]
    ProtocolViolation { expected: &'static str },
    /// PKIX parsing or RSA encryption failed.
    #[error("crypto: {0}")]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Proto(#[from] ProtoError),
}


/// Reading half of a connection: owns the byte source and decodes the
/// packets arriving in one direction.
pub struct PacketReader {
    stream: Box<dyn Read + Send>,
    direction: Direction,
}

impl PacketReader {

    pub fn new(stream: Box<dyn Read + Send>, direction: Direction) -> Self {
        Self { stream, direction }
    }

    pub fn read_packet(&mut self) -> Result<Packet, ProtoError> {
        Packet::read(&mut self.stream, self.direction)
    }

    /// Replace the inner byte source with a wrapper around the previous one.
    pub fn upgrade(&mut self, f: impl FnOnce(Box<dyn Read + Send>) -> Box<dyn Read + Send>) {
        let stream = std::mem::replace(&mut self.stream, Box::new(io::empty()));
        self.stream = f(stream);
    }

}

/// Writing half of a connection: owns the byte sink and encodes the packets
/// traveling in one direction.
pub struct PacketWriter {
    stream: Box<dyn Write + Send>,
    direction: Direction,
}

impl PacketWriter {

    pub fn new(stream: Box<dyn Write + Send>, direction: Direction) -> Self {
        Self { stream, direction }
    }

    pub fn write_packet(&mut self, packet: &Packet) -> Result<(), ProtoError> {
        packet.write(&mut self.stream, self.direction)?;
        self.stream.flush()?;
        Ok(())
    }

    /// Replace the inner byte sink with a wrapper around the previous one.
    pub fn upgrade(&mut self, f: impl FnOnce(Box<dyn Write + Send>) -> Box<dyn Write + Send>) {
        let stream = std::mem::replace(&mut self.stream, Box::new(io::sink()));
        self.stream = f(stream);
    }

}

/// State of the transport encryption negotiated during the handshake.
#[derive(Default)]
pub struct EncryptionState {
    /// The server's RSA public key, parsed from the encryption request.
    pub public_key: Option<RsaPublicKey>,
    /// The committed shared key, which doubles as the cipher IV. Set only
    /// once the encrypted handshake fully succeeded.
    pub shared_key: Option<[u8; 16]>,
}

/// A client connection to a server, owning one packet reader, one packet
/// writer and the encryption state.
pub struct Connection {
    pub reader: PacketReader,
    pub writer: PacketWriter,
    pub encryption: EncryptionState,
    /// The server identifier learned during the handshake, "-" for servers
    /// in offline mode.
    pub server_id: String,
    /// Retained socket handle used to force both workers out on disconnect.
    socket: Option<TcpStream>,
}

impl Connection {

    /// A client connection over independent byte streams.
    pub fn new(reader: Box<dyn Read + Send>, writer: Box<dyn Write + Send>) -> Self {
        Self {
            reader: PacketReader::new(reader, Direction::Clientbound),
            writer: PacketWriter::new(writer, Direction::Serverbound),
            encryption: EncryptionState::default(),
            server_id: String::new(),
            socket: None,
        }
    }

    /// A client connection over TCP, the reader and the writer each wrap
    /// their own clone of the stream.
    pub fn tcp(stream: TcpStream) -> io::Result<Self> {
        let reader = stream.try_clone()?;
        let writer = stream.try_clone()?;
        let mut conn = Self::new(Box::new(reader), Box::new(writer));
        conn.socket = Some(stream);
        Ok(conn)
    }

    /// Return true once a shared key has been committed by an encrypted
    /// handshake.
    pub fn is_encrypted(&self) -> bool {
        self.encryption.shared_key.is_some()
    }

    pub fn read_packet(&mut self) -> Result<Packet, ProtoError> {
        self.reader.read_packet()
    }

    pub fn write_packet(&mut self, packet: &Packet) -> Result<(), ProtoError> {
        self.writer.write_packet(packet)
    }

    pub fn upgrade_reader(&mut self, f: impl FnOnce(Box<dyn Read + Send>) -> Box<dyn Read + Send>) {
        self.reader.upgrade(f);
    }

    pub fn upgrade_writer(&mut self, f: impl FnOnce(Box<dyn Write + Send>) -> Box<dyn Write + Send>) {
        self.writer.upgrade(f);
    }

    /// Tear the connection apart for the driver workers, each taking its
    /// own half, plus the socket handle when connected over TCP.
    pub(crate) fn into_split(self) -> (PacketReader, PacketWriter, Option<TcpStream>) {
        (self.reader, self.writer, self.socket)
    }

}


/// Perform the plaintext handshake: send the handshake packet and expect the
/// server's encryption request, which is left unanswered. The connection
/// stays unencrypted.
pub fn establish_plaintext(
    conn: &mut Connection,
    handshake: HandshakePacket,
) -> Result<(), HandshakeError> {

    conn.write_packet(&Packet::Handshake(handshake))?;

    match conn.read_packet()? {
        Packet::EncryptionKeyRequest(_) => Ok(()),
        _ => Err(HandshakeError::ProtocolViolation { expected: "encryption key request" }),
    }

}

/// Perform the encrypted handshake with the given 16-byte shared secret. On
/// success the server id and the shared key are committed, the caller then
/// upgrades the streams with [`encrypt_connection`]. On any failure the
/// connection is left untouched, unencrypted.
///
/// A secret whose length is not 16 is a usage error and panics.
pub fn establish_encrypted(
    conn: &mut Connection,
    handshake: HandshakePacket,
    secret: &[u8],
) -> Result<(), HandshakeError> {

    let key: [u8; 16] = secret.try_into().expect("shared secret must be 16 bytes");

    conn.write_packet(&Packet::Handshake(handshake))?;

    let request = match conn.read_packet()? {
        Packet::EncryptionKeyRequest(request) => request,
        _ => return Err(HandshakeError::ProtocolViolation { expected: "encryption key request" }),
    };

    let public_key = crypto::parse_public_key(&request.public_key)?;
    let shared_secret = crypto::encrypt_rsa(&public_key, &key)?;
    let verify_token = crypto::encrypt_rsa(&public_key, &request.verify_token)?;
    conn.encryption.public_key = Some(public_key);

    conn.write_packet(&Packet::EncryptionKeyResponse(EncryptionKeyResponsePacket {
        shared_secret,
        verify_token,
    }))?;

    // The server echoes an empty response to commit the exchange.
    match conn.read_packet()? {
        Packet::EncryptionKeyResponse(_) => {}
        _ => return Err(HandshakeError::ProtocolViolation { expected: "encryption key response" }),
    }

    debug!("encryption committed, server id: {:?}", request.server_id);
    conn.server_id = request.server_id;
    conn.encryption.shared_key = Some(key);

    Ok(())

}

/// Upgrade both directions of the connection to the CFB8 cipher keyed by the
/// committed shared key. Must only be called before the driver workers
/// start, nothing else may touch the streams during the upgrade.
pub fn encrypt_connection(conn: &mut Connection) {
    let key = conn.encryption.shared_key.expect("no shared key committed");
    conn.upgrade_reader(|inner| Box::new(CipherReader::new(inner, &key)));
    conn.upgrade_writer(|inner| Box::new(CipherWriter::new(inner, &key)));
}


#[cfg(test)]
mod tests {

    use std::net::TcpListener;
    use std::thread;

    use rand::rngs::OsRng;
    use rsa::pkcs8::EncodePublicKey;
    use rsa::{Pkcs1v15Encrypt, RsaPrivateKey};

    use crate::proto::{EncryptionKeyRequestPacket, KeepAlivePacket};

    use super::*;

    fn test_handshake() -> HandshakePacket {
        HandshakePacket {
            version: crate::proto::VERSION,
            username: "MCBot".to_string(),
            hostname: "localhost".to_string(),
            port: 25565,
        }
    }

    /// Accept one client and return the server's packet reader and writer,
    /// with the directions of a server.
    fn accept(listener: TcpListener) -> (PacketReader, PacketWriter) {
        let (stream, _) = listener.accept().unwrap();
        let reader = PacketReader::new(Box::new(stream.try_clone().unwrap()), Direction::Serverbound);
        let writer = PacketWriter::new(Box::new(stream), Direction::Clientbound);
        (reader, writer)
    }

    #[test]
    fn plaintext_handshake() {

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (mut reader, mut writer) = accept(listener);

            let Packet::Handshake(handshake) = reader.read_packet().unwrap() else {
                panic!("expected a handshake");
            };
            assert_eq!(handshake.username, "MCBot");
            assert_eq!(handshake.version, crate::proto::VERSION);

            writer.write_packet(&Packet::EncryptionKeyRequest(EncryptionKeyRequestPacket {
                server_id: "-".to_string(),
                public_key: vec![1, 2, 3],
                verify_token: vec![4, 5, 6, 7],
            })).unwrap();
        });

        let stream = std::net::TcpStream::connect(addr).unwrap();
        let mut conn = Connection::tcp(stream).unwrap();
        establish_plaintext(&mut conn, test_handshake()).unwrap();

        assert!(!conn.is_encrypted());
        assert_eq!(conn.server_id, "");
        server.join().unwrap();

    }

    #[test]
    fn plaintext_handshake_rejects_wrong_packet() {

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (mut reader, mut writer) = accept(listener);
            reader.read_packet().unwrap();
            writer.write_packet(&Packet::KeepAlive(KeepAlivePacket { id: 1 })).unwrap();
        });

        let stream = std::net::TcpStream::connect(addr).unwrap();
        let mut conn = Connection::tcp(stream).unwrap();
        match establish_plaintext(&mut conn, test_handshake()) {
            Err(HandshakeError::ProtocolViolation { .. }) => {}
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!conn.is_encrypted());
        server.join().unwrap();

    }

    #[test]
    fn encrypted_handshake_commits_key_and_upgrades() {

        let secret: [u8; 16] = std::array::from_fn(|i| i as u8 + 1);
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server_secret = secret;
        let server = thread::spawn(move || {

            let private_key = RsaPrivateKey::new(&mut OsRng, 1024).unwrap();
            let der = private_key.to_public_key().to_public_key_der().unwrap();

            let (mut reader, mut writer) = accept(listener);

            let Packet::Handshake(_) = reader.read_packet().unwrap() else {
                panic!("expected a handshake");
            };

            writer.write_packet(&Packet::EncryptionKeyRequest(EncryptionKeyRequestPacket {
                server_id: "-".to_string(),
                public_key: der.as_bytes().to_vec(),
                verify_token: vec![1, 2, 3, 4],
            })).unwrap();

            let Packet::EncryptionKeyResponse(response) = reader.read_packet().unwrap() else {
                panic!("expected an encryption key response");
            };

            // The bytes on the wire decrypt back to the secret and the
            // verify token.
            let secret = private_key.decrypt(Pkcs1v15Encrypt, &response.shared_secret).unwrap();
            assert_eq!(secret, server_secret);
            let token = private_key.decrypt(Pkcs1v15Encrypt, &response.verify_token).unwrap();
            assert_eq!(token, [1, 2, 3, 4]);

            // Commit with the empty echo, then speak through the cipher.
            writer.write_packet(&Packet::EncryptionKeyResponse(Default::default())).unwrap();

            let key: [u8; 16] = secret.try_into().unwrap();
            reader.upgrade(|inner| Box::new(CipherReader::new(inner, &key)));
            writer.upgrade(|inner| Box::new(CipherWriter::new(inner, &key)));

            writer.write_packet(&Packet::KeepAlive(KeepAlivePacket { id: 42 })).unwrap();
            let Packet::KeepAlive(echoed) = reader.read_packet().unwrap() else {
                panic!("expected a keep alive");
            };
            assert_eq!(echoed.id, 42);

        });

        let stream = std::net::TcpStream::connect(addr).unwrap();
        let mut conn = Connection::tcp(stream).unwrap();
        establish_encrypted(&mut conn, test_handshake(), &secret).unwrap();

        assert!(conn.is_encrypted());
        assert_eq!(conn.server_id, "-");
        assert_eq!(conn.encryption.shared_key, Some(secret));
        assert!(conn.encryption.public_key.is_some());

        encrypt_connection(&mut conn);
        let Packet::KeepAlive(packet) = conn.read_packet().unwrap() else {
            panic!("expected a keep alive");
        };
        assert_eq!(packet.id, 42);
        conn.write_packet(&Packet::KeepAlive(KeepAlivePacket { id: 42 })).unwrap();

        server.join().unwrap();

    }

    #[test]
    #[should_panic(expected = "shared secret must be 16 bytes")]
    fn short_secret_is_fatal() {
        let mut conn = Connection::new(Box::new(io::empty()), Box::new(io::sink()));
        let _ = establish_encrypted(&mut conn, test_handshake(), &[1, 2, 3]);
    }

}

//! Transport encryption: the byte-granular AES-128-CFB8 stream mode used
//! after the handshake, and the RSA helpers used during it.

use std::io::{self, Read, Write};

use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes128;

use rand::rngs::OsRng;
use rand::RngCore;

use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};


/// Errors of the asymmetric part of the key exchange.
#[derive(thiserror::Error, Debug)]
pub enum CryptoError {
    #[error("invalid public key: {0}")]
    InvalidPublicKey(#[from] rsa::pkcs8::spki::Error),
    #[error("rsa: {0}")]
    Rsa(#[from] rsa::Error),
}


/// AES-128 used as a one-byte-at-a-time CFB stream. Each input byte is XORed
/// with the first byte of the encrypted IV, then the IV shifts left by one
/// and the ciphertext byte enters at its end.
pub struct Cfb8 {
    cipher: Aes128,
    iv: [u8; 16],
}

impl Cfb8 {

    /// Cipher for the negotiated shared key, which the protocol reuses as
    /// the initial IV.
    pub fn new(key: &[u8; 16]) -> Self {
        Self::with_iv(key, key)
    }

    pub fn with_iv(key: &[u8; 16], iv: &[u8; 16]) -> Self {
        Self {
            cipher: Aes128::new(key.into()),
            iv: *iv,
        }
    }

    /// Encrypt in place, the ciphertext bytes feed the IV.
    pub fn encrypt(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            let mut block = aes::Block::from(self.iv);
            self.cipher.encrypt_block(&mut block);
            *byte ^= block[0];
            self.iv.copy_within(1.., 0);
            self.iv[15] = *byte;
        }
    }

    /// Decrypt in place, the original ciphertext bytes feed the IV.
    pub fn decrypt(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            let mut block = aes::Block::from(self.iv);
            self.cipher.encrypt_block(&mut block);
            let ciphertext = *byte;
            *byte ^= block[0];
            self.iv.copy_within(1.., 0);
            self.iv[15] = ciphertext;
        }
    }

}

/// Decrypting stream wrapper, deciphers in place whatever the inner source
/// produced.
pub struct CipherReader<R: Read> {
    inner: R,
    cipher: Cfb8,
}

impl<R: Read> CipherReader<R> {
    pub fn new(inner: R, key: &[u8; 16]) -> Self {
        Self { inner, cipher: Cfb8::new(key) }
    }
}

impl<R: Read> Read for CipherReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = self.inner.read(buf)?;
        self.cipher.decrypt(&mut buf[..len]);
        Ok(len)
    }
}

/// Encrypting stream wrapper, enciphers into a scratch buffer so the
/// caller's bytes are left untouched.
pub struct CipherWriter<W: Write> {
    inner: W,
    cipher: Cfb8,
}

impl<W: Write> CipherWriter<W> {

    pub fn new(inner: W, key: &[u8; 16]) -> Self {
        Self { inner, cipher: Cfb8::new(key) }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

}

impl<W: Write> Write for CipherWriter<W> {

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut scratch = buf.to_vec();
        self.cipher.encrypt(&mut scratch);
        self.inner.write_all(&scratch)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

}


/// Securely generate the random 16-byte shared secret of an encrypted
/// session.
pub fn generate_secret() -> [u8; 16] {
    let mut secret = [0; 16];
    OsRng.fill_bytes(&mut secret);
    secret
}

/// Parse the PKIX-encoded RSA public key sent by the server.
pub fn parse_public_key(der: &[u8]) -> Result<RsaPublicKey, CryptoError> {
    Ok(RsaPublicKey::from_public_key_der(der)?)
}

/// Encrypt a payload under the server's public key with PKCS#1 v1.5 padding.
pub fn encrypt_rsa(key: &RsaPublicKey, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    Ok(key.encrypt(&mut OsRng, Pkcs1v15Encrypt, data)?)
}

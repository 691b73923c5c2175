//! The configuration for the client, given from environment variables and
//! lazy initialized when needed.

use once_cell::sync::OnceCell;
use std::env;


/// Default server host when none is given on the command line.
pub const DEFAULT_HOST: &str = "localhost";
/// Default server port.
pub const DEFAULT_PORT: u16 = 25565;
/// Default username.
pub const DEFAULT_USERNAME: &str = "MCBot";


/// Capacity of the inbox and outbox queues of the driver.
///
/// To change it, set `MC152_QUEUE_CAPACITY`.
pub fn queue_capacity() -> usize {
    static ENV: OnceCell<usize> = OnceCell::new();
    *ENV.get_or_init(|| {
        env::var("MC152_QUEUE_CAPACITY")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|&capacity| capacity > 0)
            .unwrap_or(20)
    })
}

//! Connectivity probe: writes a single greeting line and hangs up.

use tracing::info;

use crate::{
    error::LogClientError,
    transport::{Connection, Transport},
};

/// The line the probe sends, `hello from pid=<pid>\n`.
pub fn greeting(pid: u32) -> String {
    format!("hello from pid={pid}\n")
}

/// Sends the greeting for `pid` and releases the transport, which shuts
/// down both directions. Returns the number of bytes sent.
pub fn send_greeting<T: Transport>(stream: T, pid: u32) -> Result<usize, LogClientError> {
    let mut conn = Connection::new(stream);
    let peer = conn.peer_addr();
    let sent = conn.send_all(greeting(pid).as_bytes())?;
    conn.release();
    info!(pid, ?peer, sent, "probe sent");
    Ok(sent)
}

//! Rigpad Remote Control
//!
//! A UDP producer thread that decodes remote drive vectors and metadata
//! requests into an unbounded FIFO queue. The consumer drains the queue
//! every tick and keeps only the newest entry — stale vectors are
//! discarded unread, trading completeness for low control lag.
//!
//! The socket uses a one-second read timeout so the running flag is
//! checked even on an idle network; malformed datagrams never terminate
//! the listener.

pub mod protocol;

use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use rigpad_common::config::MIN_REMOTE_PORT;
use rigpad_common::error::{RigpadError, RigpadResult};

pub use protocol::{decode, GroupsReply, RemoteMessage};

/// Remote datagrams are assumed to fit one small JSON object.
pub const MAX_DATAGRAM: usize = 1024;

/// Sender side of the bound socket, handed to the consumer so it can
/// answer `GET_GROUPS` from the port the request arrived on.
#[derive(Debug)]
pub struct ReplyHandle {
    socket: UdpSocket,
}

impl ReplyHandle {
    /// Send the group-UID listing to a requester.
    pub fn send_groups(&self, to: SocketAddr, groups: Vec<String>) -> RigpadResult<()> {
        let reply = serde_json::to_vec(&GroupsReply::new(groups))?;
        self.socket.send_to(&reply, to)?;
        Ok(())
    }
}

/// The UDP listener loop.
pub struct RemoteListener {
    socket: UdpSocket,
    queue: Sender<RemoteMessage>,
    running: Arc<AtomicBool>,
}

impl RemoteListener {
    /// Bind the listener socket and build the message queue.
    ///
    /// Ports below 1024 are rejected up front; a bind failure surfaces
    /// as an error so the session can fall back to STOPPED without
    /// spawning anything.
    pub fn bind(
        port: u16,
        running: Arc<AtomicBool>,
    ) -> RigpadResult<(Self, Receiver<RemoteMessage>, ReplyHandle)> {
        if port < MIN_REMOTE_PORT {
            return Err(RigpadError::remote(format!(
                "port {port} below minimum {MIN_REMOTE_PORT}"
            )));
        }

        let socket = UdpSocket::bind(("0.0.0.0", port))
            .map_err(|e| RigpadError::remote(format!("failed to bind port {port}: {e}")))?;
        socket.set_read_timeout(Some(Duration::from_secs(1)))?;

        let reply = ReplyHandle {
            socket: socket.try_clone()?,
        };
        let (queue, receiver) = std::sync::mpsc::channel();

        Ok((
            Self {
                socket,
                queue,
                running,
            },
            receiver,
            reply,
        ))
    }

    /// Spawn the loop on its own named thread.
    pub fn spawn(self) -> RigpadResult<JoinHandle<()>> {
        let handle = std::thread::Builder::new()
            .name("rigpad-remote".to_string())
            .spawn(move || self.run())?;
        Ok(handle)
    }

    /// Run until the shared flag clears; the socket closes on return.
    pub fn run(self) {
        let port = self
            .socket
            .local_addr()
            .map(|addr| addr.port())
            .unwrap_or_default();
        tracing::info!(port, "Remote listener started");

        let mut buffer = [0u8; MAX_DATAGRAM];
        while self.running.load(Ordering::Relaxed) {
            match self.socket.recv_from(&mut buffer) {
                Ok((length, from)) => match decode(&buffer[..length], from) {
                    Some(message) => {
                        // The receiver only disappears at session
                        // teardown; a send error just means we are done.
                        if self.queue.send(message).is_err() {
                            break;
                        }
                    }
                    None => {
                        tracing::debug!(%from, length, "Dropped undecodable datagram");
                    }
                },
                Err(e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    // Read timeout: loop back around to the flag check.
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Remote receive failed");
                }
            }
        }

        tracing::info!("Remote listener stopped");
    }
}

/// Drain a message queue, keeping only the newest entry.
pub fn drain_latest<T>(receiver: &Receiver<T>) -> Option<T> {
    receiver.try_iter().last()
}

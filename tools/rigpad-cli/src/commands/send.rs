//! Send test datagrams to a running instance.

use std::net::UdpSocket;
use std::time::Duration;

use rigpad_remote_control::{GroupsReply, MAX_DATAGRAM};

pub fn run(
    addr: String,
    x: Option<f64>,
    y: Option<f64>,
    group: Option<String>,
    get_groups: bool,
) -> anyhow::Result<()> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;

    if get_groups {
        socket.set_read_timeout(Some(Duration::from_secs(2)))?;
        socket.send_to(br#"{"type": "GET_GROUPS"}"#, &addr)?;

        let mut buffer = [0u8; MAX_DATAGRAM];
        let (length, from) = socket
            .recv_from(&mut buffer)
            .map_err(|e| anyhow::anyhow!("no reply from {addr}: {e}"))?;
        let reply: GroupsReply = serde_json::from_slice(&buffer[..length])?;

        println!("Groups reported by {from}:");
        for uid in &reply.groups {
            println!("  {uid}");
        }
        return Ok(());
    }

    let (Some(x), Some(y)) = (x, y) else {
        anyhow::bail!("provide --x and --y, or use --get-groups");
    };

    let payload = match &group {
        Some(uid) => serde_json::json!({ uid: { "x": x, "y": y } }),
        None => serde_json::json!({ "x": x, "y": y }),
    };
    socket.send_to(payload.to_string().as_bytes(), &addr)?;

    match group {
        Some(uid) => println!("Sent ({x}, {y}) for {uid} to {addr}"),
        None => println!("Sent ({x}, {y}) for the active groups to {addr}"),
    }
    Ok(())
}

use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::time::timeout;

use crate::error::SampQueryError;
use crate::packet::{Endpoint, Opcode, RequestPacket, ResponsePacket};

/// Largest payload a UDP datagram can carry; big player lists get close.
const MAX_DATAGRAM: usize = 65_535;

/// Send one request and wait for one reply.
///
/// Every call binds a fresh socket and drops it before returning, whatever
/// the outcome. The protocol has no request id, so the first datagram that
/// arrives on the socket is taken as the answer: never share a socket
/// between requests.
///
/// `timeout_dur` bounds the whole exchange, send and receive together.
pub async fn send_recv(
    endpoint: &Endpoint,
    opcode: Opcode,
    timeout_dur: Duration,
) -> Result<ResponsePacket, SampQueryError> {
    // just arbitrarily bind any port, doesn't matter really
    let sock: UdpSocket = UdpSocket::bind("0.0.0.0:0")
        .await
        .map_err(SampQueryError::FailedPortBind)?;

    // connecting filters out datagrams from any other peer
    sock.connect(endpoint.socket_addr())
        .await
        .map_err(SampQueryError::UnreachableHost)?;

    let packet = RequestPacket::new(*endpoint, opcode);
    let reply = timeout(timeout_dur, exchange(&sock, &packet)).await??;
    drop(sock);

    log::debug!("'{opcode}' reply from {endpoint}: {} bytes", reply.len());
    unpack_reply(opcode, &reply)
}

async fn exchange(sock: &UdpSocket, packet: &RequestPacket) -> Result<Vec<u8>, SampQueryError> {
    log::debug!("sending '{}' request to {}", packet.opcode(), packet.endpoint());
    sock.send(&packet.pack())
        .await
        .map_err(SampQueryError::SendError)?;

    let mut resp_buf = vec![0u8; MAX_DATAGRAM];
    let len = sock
        .recv(&mut resp_buf)
        .await
        .map_err(SampQueryError::ReceiveError)?;
    resp_buf.truncate(len);
    Ok(resp_buf)
}

fn unpack_reply(opcode: Opcode, reply: &[u8]) -> Result<ResponsePacket, SampQueryError> {
    let packet = ResponsePacket::unpack(reply)?;
    if packet.opcode() != Some(opcode) {
        log::warn!("asked for '{opcode}' but reply echoes {:?}", packet.opcode());
    }
    log::trace!("'{opcode}' payload: {} bytes", packet.body().len());
    Ok(packet)
}

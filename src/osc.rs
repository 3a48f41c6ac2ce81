use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use rosc::{OscMessage, OscPacket, OscType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where the renderer listens for parameter messages
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OscEndpoint {
    pub host: String,
    pub port: u16,
}

impl Default for OscEndpoint {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 12000,
        }
    }
}

impl std::fmt::Display for OscEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Error, Debug)]
pub enum OscSendError {
    #[error("Could not resolve OSC endpoint {0}")]
    Resolve(String),
    #[error("Failed to bind local UDP socket: {0}")]
    Bind(std::io::Error),
    #[error("Failed to encode OSC message: {0}")]
    Encode(String),
    #[error("Failed to send OSC datagram: {0}")]
    Io(#[from] std::io::Error),
}

/// Anything that can deliver one addressed value to the renderer
pub trait MessageSink {
    fn send(&self, address: &str, value: OscType) -> Result<(), OscSendError>;
}

/// Encode a single-argument message into one OSC packet
pub fn encode_message(address: &str, value: OscType) -> Result<Vec<u8>, OscSendError> {
    let packet = OscPacket::Message(OscMessage {
        addr: address.to_string(),
        args: vec![value],
    });
    rosc::encoder::encode(&packet).map_err(|e| OscSendError::Encode(e.to_string()))
}

/// Fire-and-forget UDP sender. One datagram per call, nothing is read back.
pub struct OscSender {
    socket: UdpSocket,
    target: SocketAddr,
}

impl OscSender {
    pub fn connect(endpoint: &OscEndpoint) -> Result<Self, OscSendError> {
        let target = (endpoint.host.as_str(), endpoint.port)
            .to_socket_addrs()
            .map_err(|_| OscSendError::Resolve(endpoint.to_string()))?
            .next()
            .ok_or_else(|| OscSendError::Resolve(endpoint.to_string()))?;

        let bind_addr = if target.is_ipv6() { "[::]:0" } else { "0.0.0.0:0" };
        let socket = UdpSocket::bind(bind_addr).map_err(OscSendError::Bind)?;

        tracing::info!("[OSC] Sending to {}", target);
        Ok(Self { socket, target })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl MessageSink for OscSender {
    fn send(&self, address: &str, value: OscType) -> Result<(), OscSendError> {
        tracing::debug!("[OSC] {} {:?}", address, value);
        let buf = encode_message(address, value)?;
        self.socket.send_to(&buf, self.target)?;
        Ok(())
    }
}

// ========== Tests ============

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn decode(buf: &[u8]) -> OscMessage {
        match rosc::decoder::decode_udp(buf).unwrap().1 {
            OscPacket::Message(msg) => msg,
            other => panic!("expected message, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_message_layout() {
        let buf = encode_message("/effect", OscType::Int(5)).unwrap();
        // "/effect" padded to 8, ",i" padded to 4, one int32
        assert_eq!(buf.len(), 8 + 4 + 4);
        let msg = decode(&buf);
        assert_eq!(msg.addr, "/effect");
        assert_eq!(msg.args, vec![OscType::Int(5)]);
    }

    #[test]
    fn test_default_endpoint() {
        let endpoint = OscEndpoint::default();
        assert_eq!(endpoint.to_string(), "127.0.0.1:12000");
    }

    #[test]
    fn test_sender_delivers_datagram() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let port = receiver.local_addr().unwrap().port();

        let sender = OscSender::connect(&OscEndpoint {
            host: "127.0.0.1".to_string(),
            port,
        })
        .unwrap();
        assert_eq!(sender.target().port(), port);

        sender.send("/base_hue", OscType::Float(180.0)).unwrap();
        sender.send("/text", OscType::String(String::new())).unwrap();

        let mut buf = [0u8; 1024];
        let (n, _) = receiver.recv_from(&mut buf).unwrap();
        let msg = decode(&buf[..n]);
        assert_eq!(msg.addr, "/base_hue");
        assert_eq!(msg.args, vec![OscType::Float(180.0)]);

        let (n, _) = receiver.recv_from(&mut buf).unwrap();
        let msg = decode(&buf[..n]);
        assert_eq!(msg.addr, "/text");
        assert_eq!(msg.args, vec![OscType::String(String::new())]);
    }
}

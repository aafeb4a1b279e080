use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, warn};
use socket2::{Domain, Protocol, Socket, Type};
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};

use crate::diagnostics::{DebugLog, RequestLog};
use crate::handlers::echo_status;
use crate::request::{HeadError, Request};
use crate::response::{HttpResponse, ResponseWriter};

/// A bound listener plus the log every request is reported to.
pub struct EchoServer<L = DebugLog> {
    listener: TcpListener,
    log: Arc<L>,
}

impl EchoServer<DebugLog> {
    pub async fn start(port: u16) -> Result<Self> {
        Self::start_with_log(port, DebugLog).await
    }
}

impl<L: RequestLog + 'static> EchoServer<L> {
    pub async fn start_with_log(port: u16, log: L) -> Result<Self> {
        let listener = match bind_dual_stack(port) {
            Ok(listener) => listener,
            Err(e) => {
                debug!("no IPv6 listener on port {port} ({e}), falling back to IPv4");
                TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
                    .await
                    .with_context(|| format!("failed to bind port {port}"))?
            }
        };
        Ok(Self { listener, log: Arc::new(log) })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves connections until the process ends. A failing connection
    /// only affects itself.
    pub async fn listen(self) -> Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((conn, addr)) => {
                    let log = Arc::clone(&self.log);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, addr, log.as_ref()).await {
                            warn!("connection error from {addr}: {e:#}");
                        }
                    });
                }
                Err(e) => warn!("failed to accept connection: {e}"),
            }
        }
    }
}

/// Listens on `[::]:port` with IPv4-mapped addresses accepted as well.
fn bind_dual_stack(port: u16) -> std::io::Result<TcpListener> {
    let socket = Socket::new(Domain::IPV6, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_only_v6(false)?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&SocketAddr::from((Ipv6Addr::UNSPECIFIED, port)).into())?;
    socket.listen(1024)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}

/// Answers exactly one request on `conn`, then closes it.
pub async fn handle_connection<L: RequestLog + ?Sized>(
    mut conn: TcpStream,
    addr: SocketAddr,
    log: &L,
) -> Result<()> {
    debug!("accepted connection from {addr}");
    let (read_half, write_half) = conn.split();
    let mut reader = BufReader::new(read_half);

    let response = match Request::read_head(&mut reader).await {
        Ok(request) => {
            debug!("{addr}: {}", request.request_line);
            echo_status(&request, log)?
        }
        Err(HeadError::Closed) => {
            debug!("{addr} closed before sending a request");
            return Ok(());
        }
        Err(e) => match e.status() {
            Some(status) => {
                debug!("rejecting request from {addr}: {e}");
                HttpResponse::new().with_status(status).with_framing_headers()
            }
            None => return Err(e.into()),
        },
    };

    let mut writer = ResponseWriter::from(write_half);
    writer.write_all(&response).await?;
    debug!("answered {addr} with {}", response.status.as_u64());
    Ok(())
}

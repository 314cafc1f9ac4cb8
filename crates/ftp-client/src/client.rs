//! The active-mode FTP client.
//!
//! One [`FtpClient`] owns one control connection. A dedicated reader thread
//! owns the read half and forwards each parsed reply line over a channel —
//! the single-consumer response queue that keeps reply correlation strictly
//! FIFO. Exactly one command is in flight at a time; the `&mut self`
//! receivers make a second concurrent sender unrepresentable.
//!
//! Transport failures (socket errors, timeouts, unexpected close) reset the
//! whole session: the socket is shut down, the reader drains out, and every
//! subsequent call fails with [`FtpError::ConnectionClosed`] until the
//! caller reconnects. There is no automatic retry or reconnect.

use std::fs;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{IpAddr, Shutdown, SocketAddr, TcpListener, TcpStream};
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use socket2::{SockRef, TcpKeepalive};

use crate::addr::resolve_printer_addr;
use crate::iface::{encode_port_args, local_addr_on_peer_subnet};
use crate::reply::Reply;
use crate::{FtpConfig, FtpError};

/// Callback invoked for each 1xx intermediate reply.
type IntermediateNotifier = Box<dyn FnMut(&Reply) + Send>;

/// A synchronous active-mode FTP connection to a printer.
pub struct FtpClient {
    stream: TcpStream,
    replies: mpsc::Receiver<Result<Reply, FtpError>>,
    config: FtpConfig,
    peer: SocketAddr,
    /// False once the session has been reset; every operation then fails
    /// fast with `ConnectionClosed`.
    alive: bool,
    last_activity: Instant,
    on_intermediate: Option<IntermediateNotifier>,
}

impl std::fmt::Debug for FtpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FtpClient")
            .field("peer", &self.peer)
            .field("config", &self.config)
            .field("alive", &self.alive)
            .field("last_activity", &self.last_activity)
            .field(
                "on_intermediate",
                &self.on_intermediate.as_ref().map(|_| "<callback>"),
            )
            .finish_non_exhaustive()
    }
}

impl FtpClient {
    /// Connect to the printer's control listener and log in.
    ///
    /// The first inbound line is the greeting; a 4xx/5xx greeting or no
    /// greeting within the configured window fails the attempt. On success
    /// a `USER` command is issued and must not be rejected.
    pub fn connect(addr: &str, username: &str, config: FtpConfig) -> Result<Self, FtpError> {
        let peer = resolve_printer_addr(addr)?;
        let stream = open_stream(&peer, &config)?;

        let reader_stream = stream
            .try_clone()
            .map_err(|e| FtpError::ConnectionFailed {
                addr: peer.to_string(),
                source: e,
            })?;
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || reader_loop(reader_stream, &tx));

        let mut client = Self {
            stream,
            replies: rx,
            peer,
            alive: true,
            last_activity: Instant::now(),
            on_intermediate: None,
            config,
        };

        let greeting_timeout = client.config.timeouts.greeting;
        let greeting = match client.recv_reply(greeting_timeout) {
            Ok(reply) => reply,
            Err(FtpError::ReplyTimeout { .. }) => {
                client.reset();
                return Err(FtpError::GreetingTimeout {
                    timeout: greeting_timeout,
                });
            }
            Err(e) => {
                client.reset();
                return Err(e);
            }
        };
        if greeting.is_error() {
            client.reset();
            return Err(FtpError::Rejected {
                status: greeting.status,
                message: greeting.message,
            });
        }

        client.send_command(&format!("USER {username}"))?;
        Ok(client)
    }

    /// The resolved control-channel peer address.
    pub fn remote_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Register a callback for 1xx intermediate replies. Intermediate
    /// replies never complete a command; they only notify.
    pub fn on_intermediate_reply(&mut self, notifier: impl FnMut(&Reply) + Send + 'static) {
        self.on_intermediate = Some(Box::new(notifier));
    }

    /// Issue a command and await its terminal (non-1xx) reply.
    ///
    /// If the control channel has been idle past the keep-alive interval, a
    /// `NOOP` is exchanged first.
    pub fn command(&mut self, verb: &str) -> Result<Reply, FtpError> {
        self.keep_alive()?;
        self.send_command(verb)
    }

    /// Exchange a `NOOP` if the channel has been idle past the configured
    /// interval. Cheap no-op otherwise.
    pub fn keep_alive(&mut self) -> Result<(), FtpError> {
        if self.alive && self.last_activity.elapsed() >= self.config.keepalive_interval {
            self.send_command("NOOP")?;
        }
        Ok(())
    }

    /// Upload a byte buffer as `filename` over an active-mode data channel.
    pub fn put_data(&mut self, filename: &str, data: &[u8]) -> Result<(), FtpError> {
        self.put_reader(filename, &mut io::Cursor::new(data))
    }

    /// Upload a local file as `filename`.
    pub fn put_file(&mut self, path: &Path, filename: &str) -> Result<(), FtpError> {
        let data = fs::read(path).map_err(|e| FtpError::FileReadFailed {
            path: path.display().to_string(),
            source: e,
        })?;
        self.put_data(filename, &data)
    }

    /// Upload from a streaming source as `filename`.
    ///
    /// Active-mode sequence: bind an ephemeral listener on the local
    /// address sharing the printer's subnet, negotiate it via `PORT`,
    /// switch to binary with `TYPE I`, issue `STOR`, accept the printer's
    /// connect-back, stream the payload, and close the data socket. Returns
    /// only once **both** the data connection has closed and the `STOR`
    /// command's terminal reply has arrived, whichever order they occur in.
    pub fn put_reader(
        &mut self,
        filename: &str,
        source: &mut impl Read,
    ) -> Result<(), FtpError> {
        self.ensure_alive()?;
        self.keep_alive()?;

        let IpAddr::V4(peer_v4) = self.peer.ip() else {
            return Err(FtpError::ActiveModeRequiresIpv4);
        };
        let local_ip = local_addr_on_peer_subnet(peer_v4)?;

        let listener =
            TcpListener::bind((local_ip, 0)).map_err(FtpError::DataListenFailed)?;
        listener
            .set_nonblocking(true)
            .map_err(FtpError::DataListenFailed)?;
        let port = listener
            .local_addr()
            .map_err(FtpError::DataListenFailed)?
            .port();

        self.send_command(&format!("PORT {}", encode_port_args(local_ip, port)))?;
        self.send_command("TYPE I")?;

        // STOR's terminal reply only arrives after the transfer, so the
        // wait is split: send now, join with the data-channel close below.
        let stor = format!("STOR {filename}");
        self.write_line(&stor)?;

        // The printer may reply (150, or an early rejection) before or
        // after it opens the data connection; watch both until it connects.
        let mut terminal: Option<Reply> = None;
        let data_stream = self.accept_data_connection(&listener, &stor, &mut terminal)?;
        drop(listener); // one upload per listener

        self.write_payload(data_stream, source)?;

        // Data channel is closed; now require the terminal reply too.
        match terminal {
            // An early terminal reply was already checked when it arrived.
            Some(_) => Ok(()),
            None => self.await_terminal(&stor).map(|_| ()),
        }
    }

    /// Issue `QUIT` (best effort) and unconditionally reset the session.
    pub fn disconnect(&mut self) {
        if self.alive {
            let _ = self.send_command("QUIT");
        }
        self.reset();
    }

    // ── Control-channel internals ───────────────────────────────────────

    /// Write a command line and await its terminal reply. Does not
    /// interleave a keep-alive.
    fn send_command(&mut self, verb: &str) -> Result<Reply, FtpError> {
        self.write_line(verb)?;
        self.await_terminal(verb)
    }

    fn write_line(&mut self, verb: &str) -> Result<(), FtpError> {
        self.ensure_alive()?;
        let result = self
            .stream
            .write_all(format!("{verb}\r\n").as_bytes())
            .and_then(|()| self.stream.flush());
        if let Err(e) = result {
            self.reset();
            return Err(FtpError::WriteFailed(e));
        }
        Ok(())
    }

    /// Receive replies until a non-1xx one, invoking the intermediate
    /// notifier for each 1xx along the way, and map error statuses.
    fn await_terminal(&mut self, command: &str) -> Result<Reply, FtpError> {
        loop {
            let reply = self.recv_reply_for(command)?;
            if reply.is_intermediate() {
                if let Some(notify) = self.on_intermediate.as_mut() {
                    notify(&reply);
                }
                continue;
            }
            return check_terminal(command, reply);
        }
    }

    fn recv_reply_for(&mut self, command: &str) -> Result<Reply, FtpError> {
        match self.recv_reply(self.config.timeouts.reply) {
            Err(FtpError::ReplyTimeout { timeout, .. }) => Err(FtpError::ReplyTimeout {
                command: command.to_string(),
                timeout,
            }),
            other => other,
        }
    }

    /// Dequeue the next reply from the reader thread.
    ///
    /// A channel error or timeout means the oldest waiter (us) must never
    /// be left hanging: the session is reset and the failure surfaced.
    fn recv_reply(&mut self, timeout: Duration) -> Result<Reply, FtpError> {
        match self.replies.recv_timeout(timeout) {
            Ok(Ok(reply)) => {
                self.last_activity = Instant::now();
                Ok(reply)
            }
            Ok(Err(e)) => {
                self.reset();
                Err(e)
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                // A late reply would desynchronize correlation, so the
                // session cannot be reused.
                self.reset();
                Err(FtpError::ReplyTimeout {
                    command: String::new(),
                    timeout,
                })
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                self.reset();
                Err(FtpError::ConnectionClosed)
            }
        }
    }

    fn ensure_alive(&self) -> Result<(), FtpError> {
        if self.alive {
            Ok(())
        } else {
            Err(FtpError::ConnectionClosed)
        }
    }

    /// Tear everything down. Idempotent; nothing can complete afterwards.
    fn reset(&mut self) {
        self.alive = false;
        let _ = self.stream.shutdown(Shutdown::Both);
        // The reader thread exits on the shutdown it observes; pending
        // replies in the channel die with the receiver.
    }

    // ── Data-channel internals ──────────────────────────────────────────

    /// Deadline-bounded non-blocking accept, watching the control channel
    /// for replies that arrive before the printer connects back.
    fn accept_data_connection(
        &mut self,
        listener: &TcpListener,
        command: &str,
        terminal: &mut Option<Reply>,
    ) -> Result<TcpStream, FtpError> {
        let timeout = self.config.timeouts.data_accept;
        let now = Instant::now();
        let deadline = now
            .checked_add(timeout)
            .unwrap_or_else(|| now + Duration::from_secs(86400));

        loop {
            // An early control reply can precede the connect-back: a 1xx
            // notifies, an error aborts, a success is remembered for the
            // two-way join.
            match self.replies.try_recv() {
                Ok(Ok(reply)) if reply.is_intermediate() => {
                    self.last_activity = Instant::now();
                    if let Some(notify) = self.on_intermediate.as_mut() {
                        notify(&reply);
                    }
                }
                Ok(Ok(reply)) => {
                    self.last_activity = Instant::now();
                    *terminal = Some(check_terminal(command, reply)?);
                }
                Ok(Err(e)) => {
                    self.reset();
                    return Err(e);
                }
                Err(mpsc::TryRecvError::Empty) => {}
                Err(mpsc::TryRecvError::Disconnected) => {
                    self.reset();
                    return Err(FtpError::ConnectionClosed);
                }
            }

            match listener.accept() {
                Ok((stream, _)) => return Ok(stream),
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    if Instant::now() >= deadline {
                        self.reset();
                        return Err(FtpError::DataConnectionTimeout { timeout });
                    }
                    thread::sleep(Duration::from_millis(1));
                }
                Err(e) => {
                    self.reset();
                    return Err(FtpError::DataAcceptFailed(e));
                }
            }
        }
    }

    /// Stream the payload into the data socket and close it.
    fn write_payload(
        &mut self,
        mut data_stream: TcpStream,
        source: &mut impl Read,
    ) -> Result<(), FtpError> {
        let configure = data_stream
            .set_nonblocking(false)
            .and_then(|()| data_stream.set_write_timeout(Some(self.config.timeouts.write)));
        if let Err(e) = configure {
            self.reset();
            return Err(FtpError::WriteFailed(e));
        }

        let mut buf = [0u8; 8192];
        loop {
            let n = match source.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.reset();
                    return Err(FtpError::ReadFailed(e));
                }
            };
            if let Err(e) = data_stream.write_all(&buf[..n]) {
                self.reset();
                return Err(FtpError::WriteFailed(e));
            }
        }

        if let Err(e) = data_stream.flush() {
            self.reset();
            return Err(FtpError::WriteFailed(e));
        }
        let _ = data_stream.shutdown(Shutdown::Both);
        Ok(())
    }
}

impl Drop for FtpClient {
    fn drop(&mut self) {
        self.reset();
    }
}

/// Map a terminal error reply to [`FtpError::Protocol`].
fn check_terminal(command: &str, reply: Reply) -> Result<Reply, FtpError> {
    if reply.is_error() {
        Err(FtpError::Protocol {
            command: command.to_string(),
            status: reply.status,
            message: reply.message,
        })
    } else {
        Ok(reply)
    }
}

/// Reader-thread body: parse each control-channel line into the queue.
///
/// Exits when the socket closes (EOF or error) or the receiver is dropped;
/// the final event is forwarded so the oldest pending waiter is completed
/// rather than left hanging.
fn reader_loop(stream: TcpStream, tx: &mpsc::Sender<Result<Reply, FtpError>>) {
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => {
                let _ = tx.send(Err(FtpError::ConnectionClosed));
                return;
            }
            Ok(_) => {
                if tx.send(Reply::parse(&line)).is_err() {
                    return;
                }
            }
            Err(e) => {
                let _ = tx.send(Err(FtpError::ReadFailed(e)));
                return;
            }
        }
    }
}

/// Open and configure the control connection: connect with timeout, then
/// TCP_NODELAY, TCP keepalive, and the configured write timeout.
fn open_stream(addr: &SocketAddr, config: &FtpConfig) -> Result<TcpStream, FtpError> {
    let stream =
        TcpStream::connect_timeout(addr, config.timeouts.connect).map_err(|e| match e.kind() {
            io::ErrorKind::ConnectionRefused => FtpError::ConnectionRefused {
                addr: addr.to_string(),
                source: e,
            },
            io::ErrorKind::TimedOut => FtpError::ConnectionTimeout {
                addr: addr.to_string(),
                timeout: config.timeouts.connect,
                source: e,
            },
            _ => FtpError::ConnectionFailed {
                addr: addr.to_string(),
                source: e,
            },
        })?;

    let wrap = |e: io::Error| FtpError::ConnectionFailed {
        addr: addr.to_string(),
        source: e,
    };

    stream.set_nodelay(true).map_err(wrap)?;
    configure_keepalive(&stream, Duration::from_secs(60)).map_err(wrap)?;
    stream
        .set_write_timeout(Some(config.timeouts.write))
        .map_err(wrap)?;

    Ok(stream)
}

/// Configure TCP keepalive via `socket2`.
fn configure_keepalive(stream: &TcpStream, interval: Duration) -> io::Result<()> {
    let keepalive = TcpKeepalive::new().with_time(interval);

    #[cfg(any(target_os = "linux", target_os = "macos"))]
    let keepalive = keepalive.with_interval(interval);

    SockRef::from(stream).set_tcp_keepalive(&keepalive)?;
    Ok(())
}

//! Just enough of RFC 959 to log in, change directory and store one file
//! over a passive-mode data connection.

use std::{
    future::Future,
    io,
    net::{IpAddr, SocketAddr},
    time::Duration,
};

use thiserror::Error;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufStream},
    net::TcpStream,
    time,
};
use tracing::debug;

#[derive(Debug, Error)]
pub enum FtpError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("server closed the connection")]
    ConnectionClosed,
    #[error("malformed reply: {0:?}")]
    MalformedReply(String),
    #[error("{code} {text}")]
    Rejected {
        command: String,
        code: u16,
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub code: u16,
    pub text: String,
}

pub struct FtpStream {
    control: BufStream<TcpStream>,
    peer: IpAddr,
    timeout: Duration,
}

async fn bounded<T, F>(limit: Duration, future: F) -> Result<T, FtpError>
where
    F: Future<Output = io::Result<T>>,
{
    time::timeout(limit, future)
        .await
        .map_err(|_| FtpError::Timeout(limit))?
        .map_err(FtpError::Io)
}

impl FtpStream {
    pub async fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self, FtpError> {
        debug!(host, port, "connecting");
        let stream = bounded(timeout, TcpStream::connect((host, port))).await?;
        let peer = stream.peer_addr()?.ip();

        let mut ftp = Self {
            control: BufStream::new(stream),
            peer,
            timeout,
        };

        let greeting = ftp.read_reply().await?;
        expect("connect", greeting, &[220])?;
        Ok(ftp)
    }

    pub async fn login(&mut self, user: &str, password: &str) -> Result<(), FtpError> {
        let reply = self.command(&format!("USER {user}")).await?;
        if reply.code == 230 {
            return Ok(());
        }
        expect("USER", reply, &[331])?;

        let reply = self.command(&format!("PASS {password}")).await?;
        expect("PASS", reply, &[230, 202]).map(drop)
    }

    pub async fn cwd(&mut self, dir: &str) -> Result<(), FtpError> {
        let reply = self.command(&format!("CWD {dir}")).await?;
        expect_success("CWD", reply).map(drop)
    }

    pub async fn binary(&mut self) -> Result<(), FtpError> {
        let reply = self.command("TYPE I").await?;
        expect("TYPE", reply, &[200]).map(drop)
    }

    /// Stores `data` as `name` in the current directory.
    pub async fn put(&mut self, name: &str, data: &[u8]) -> Result<(), FtpError> {
        let addr = self.passive().await?;
        let mut data_stream = bounded(self.timeout, TcpStream::connect(addr)).await?;

        let reply = self.command(&format!("STOR {name}")).await?;
        expect("STOR", reply, &[125, 150])?;

        bounded(self.timeout, data_stream.write_all(data)).await?;
        bounded(self.timeout, data_stream.shutdown()).await?;
        drop(data_stream);

        let reply = self.read_reply().await?;
        expect_success("STOR", reply).map(drop)
    }

    pub async fn quit(mut self) -> Result<(), FtpError> {
        let reply = self.command("QUIT").await?;
        expect_success("QUIT", reply).map(drop)
    }

    async fn passive(&mut self) -> Result<SocketAddr, FtpError> {
        let reply = self.command("PASV").await?;
        let reply = expect("PASV", reply, &[227])?;
        let port = parse_pasv_port(&reply.text)?;
        // The announced host is ignored, NAT'd servers often report a private one.
        Ok(SocketAddr::new(self.peer, port))
    }

    async fn command(&mut self, command: &str) -> Result<Reply, FtpError> {
        if command.starts_with("PASS ") {
            debug!("> PASS ****");
        } else {
            debug!("> {command}");
        }

        let line = format!("{command}\r\n");
        bounded(self.timeout, self.control.write_all(line.as_bytes())).await?;
        bounded(self.timeout, self.control.flush()).await?;
        self.read_reply().await
    }

    async fn read_line(&mut self) -> Result<String, FtpError> {
        let mut line = String::new();
        let read = bounded(self.timeout, self.control.read_line(&mut line)).await?;
        if read == 0 {
            return Err(FtpError::ConnectionClosed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    async fn read_reply(&mut self) -> Result<Reply, FtpError> {
        let first = self.read_line().await?;
        let code = parse_code(&first)?;
        let mut text = first.get(4..).unwrap_or_default().to_string();

        if first.as_bytes().get(3) == Some(&b'-') {
            let terminator = format!("{code} ");
            loop {
                let line = self.read_line().await?;
                if let Some(last) = line.strip_prefix(&terminator) {
                    text.push('\n');
                    text.push_str(last);
                    break;
                }
                text.push('\n');
                text.push_str(&line);
            }
        }

        debug!("< {code} {text}");
        Ok(Reply { code, text })
    }
}

fn expect(command: &str, reply: Reply, codes: &[u16]) -> Result<Reply, FtpError> {
    if codes.contains(&reply.code) {
        Ok(reply)
    } else {
        Err(FtpError::Rejected {
            command: command.to_string(),
            code: reply.code,
            text: reply.text,
        })
    }
}

/// Any 2xx completion counts, servers differ on the exact code.
fn expect_success(command: &str, reply: Reply) -> Result<Reply, FtpError> {
    if (200..300).contains(&reply.code) {
        Ok(reply)
    } else {
        expect(command, reply, &[])
    }
}

fn parse_code(line: &str) -> Result<u16, FtpError> {
    let code = line
        .get(..3)
        .filter(|code| code.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|code| code.parse().ok())
        .ok_or_else(|| FtpError::MalformedReply(line.to_string()))?;

    match line.as_bytes().get(3) {
        None | Some(b' ') | Some(b'-') => Ok(code),
        Some(_) => Err(FtpError::MalformedReply(line.to_string())),
    }
}

/// Extracts the data port from the first `h1,h2,h3,h4,p1,p2` group of a
/// `227` reply. Parentheses around the group are optional.
fn parse_pasv_port(text: &str) -> Result<u16, FtpError> {
    let malformed = || FtpError::MalformedReply(text.to_string());

    let group = text
        .split(|c: char| !c.is_ascii_digit() && c != ',')
        .find_map(|run| {
            let parts: Vec<&str> = run.split(',').collect();
            parts
                .windows(6)
                .find(|window| window.iter().all(|part| !part.is_empty()))
                .map(<[&str]>::to_vec)
        })
        .ok_or_else(malformed)?;

    let high: u8 = group[4].parse().map_err(|_| malformed())?;
    let low: u8 = group[5].parse().map_err(|_| malformed())?;
    Ok(u16::from(high) << 8 | u16::from(low))
}

#[cfg(test)]
pub(crate) mod fake {
    //! A scripted in-process FTP server.

    use std::{
        net::SocketAddr,
        sync::{Arc, Mutex},
    };

    use tokio::{
        io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
        net::{TcpListener, TcpStream},
    };

    #[derive(Debug, Default, Clone)]
    pub struct Session {
        pub commands: Vec<String>,
        pub stored: Vec<(String, Vec<u8>)>,
    }

    pub struct FakeServer {
        pub addr: SocketAddr,
        sessions: Arc<Mutex<Vec<Session>>>,
    }

    impl FakeServer {
        pub async fn start(password: &'static str) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let sessions = Arc::new(Mutex::new(Vec::new()));

            let shared = Arc::clone(&sessions);
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    let id = {
                        let mut sessions = shared.lock().unwrap();
                        sessions.push(Session::default());
                        sessions.len() - 1
                    };
                    serve(stream, id, password, Arc::clone(&shared)).await;
                }
            });

            Self { addr, sessions }
        }

        pub fn sessions(&self) -> Vec<Session> {
            self.sessions.lock().unwrap().clone()
        }

        pub fn uploads(&self) -> Vec<(String, Vec<u8>)> {
            self.sessions()
                .into_iter()
                .flat_map(|session| session.stored)
                .collect()
        }
    }

    async fn serve(
        stream: TcpStream,
        id: usize,
        password: &'static str,
        sessions: Arc<Mutex<Vec<Session>>>,
    ) {
        let (read, mut write) = stream.into_split();
        let mut lines = BufReader::new(read).lines();
        let mut data: Option<TcpListener> = None;

        write
            .write_all(b"220-fake server\r\n220 ready\r\n")
            .await
            .unwrap();

        while let Ok(Some(line)) = lines.next_line().await {
            sessions.lock().unwrap()[id].commands.push(line.clone());
            let (verb, arg) = line.split_once(' ').unwrap_or((line.as_str(), ""));

            let reply = match verb {
                "USER" => "331 Password required".to_string(),
                "PASS" if arg == password => "230 Logged in".to_string(),
                "PASS" => "530 Login incorrect.".to_string(),
                "CWD" if arg.starts_with("/missing") => "550 No such directory".to_string(),
                "CWD" => "250 Directory changed".to_string(),
                "TYPE" => "200 Type set to I".to_string(),
                "PASV" => {
                    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
                    let port = listener.local_addr().unwrap().port();
                    data = Some(listener);
                    format!(
                        "227 Entering Passive Mode (10,0,0,1,{},{})",
                        port >> 8,
                        port & 0xff
                    )
                }
                "STOR" => match data.take() {
                    Some(listener) => {
                        write.write_all(b"150 Opening data connection\r\n").await.unwrap();
                        let (mut conn, _) = listener.accept().await.unwrap();
                        let mut buf = Vec::new();
                        conn.read_to_end(&mut buf).await.unwrap();
                        sessions.lock().unwrap()[id]
                            .stored
                            .push((arg.to_string(), buf));
                        "226 Transfer complete".to_string()
                    }
                    None => "425 Use PASV first".to_string(),
                },
                "QUIT" => {
                    write.write_all(b"221 Goodbye\r\n").await.unwrap();
                    break;
                }
                _ => "502 Command not implemented".to_string(),
            };

            write
                .write_all(format!("{reply}\r\n").as_bytes())
                .await
                .unwrap();
        }
    }
}

//! Unix-socket [`CommandSource`] implementation.
//!
//! Binds a Unix stream socket and serves one connection at a time.  Every
//! line received is parsed as a JSON-encoded [`Command`].
//!
//! # Wire format
//!
//! ```json
//! {"DragStart":{"widget":"mail"}}
//! {"DragOver":{"page":0,"x":310.0,"y":42.5}}
//! {"Drop":{"page":0,"x":310.0,"y":42.5}}
//! "DragEnd"
//! {"Go":"right"}
//! {"ShowMenu":{"widget":"mail","x":300.0,"y":40.0}}
//! {"MenuAction":"delete"}
//! ```

use crate::command::Command;
use crate::traits::CommandSource;
use log::{debug, error, info, warn};
use std::io::{BufRead, BufReader};
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// A [`CommandSource`] that listens on a Unix stream socket for
/// JSON-encoded commands.
///
/// A connection may send any number of commands; when it closes the
/// listener waits for the next client.  The socket file is removed once the
/// command sink goes away.
pub struct UnixSocketListener {
    path: PathBuf,
}

/// Errors produced by the Unix socket listener.
#[derive(Debug, thiserror::Error)]
pub enum UnixSocketError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What happened to one line of input.
#[derive(Debug, PartialEq)]
enum Line {
    Blank,
    Command(Command),
    Invalid(String),
}

fn parse_line(text: &str) -> Line {
    let text = text.trim();
    if text.is_empty() {
        return Line::Blank;
    }
    match serde_json::from_str::<Command>(text) {
        Ok(cmd) => Line::Command(cmd),
        Err(e) => Line::Invalid(e.to_string()),
    }
}

/// Forward every command read from `reader` into `sink`.  Returns `false`
/// once the sink is closed.
fn forward<R: BufRead>(reader: R, sink: &mpsc::Sender<Command>) -> bool {
    for line in reader.lines() {
        let text = match line {
            Ok(text) => text,
            Err(e) => {
                warn!("read error: {}", e);
                break;
            }
        };
        match parse_line(&text) {
            Line::Blank => {}
            Line::Command(cmd) => {
                debug!("received {:?}", cmd);
                if sink.send(cmd).is_err() {
                    return false;
                }
            }
            Line::Invalid(reason) => error!("bad command {:?}: {}", text, reason),
        }
    }
    true
}

impl UnixSocketListener {
    /// Create a listener for `path`.  Nothing is bound until
    /// [`run`](CommandSource::run).
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The filesystem path of the socket.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> UnixSocketError {
        UnixSocketError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CommandSource for UnixSocketListener {
    type Error = UnixSocketError;

    /// Bind the socket and serve clients until the sink is dropped.
    ///
    /// This method **blocks**.  Run it on a dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error> {
        // A previous instance may have left its socket behind.
        let _ = std::fs::remove_file(&self.path);

        let listener = UnixListener::bind(&self.path).map_err(|e| self.io_error(e))?;
        info!("listening on {}", self.path.display());

        for stream in listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    error!("accept error: {}", e);
                    continue;
                }
            };
            debug!("client connected");
            if !forward(BufReader::new(stream), &sink) {
                info!("board gone, closing {}", self.path.display());
                break;
            }
            debug!("client disconnected");
        }
        let _ = std::fs::remove_file(&self.path);
        Ok(())
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Direction;
    use crate::widget::WidgetId;
    use std::io::{Cursor, Write};
    use std::os::unix::net::UnixStream;
    use std::time::Duration;

    #[test]
    fn parse_line_classifies_input() {
        assert_eq!(parse_line("   "), Line::Blank);
        assert_eq!(parse_line(r#""HideMenu""#), Line::Command(Command::HideMenu));
        assert!(matches!(parse_line("{\"Go\":\"up\"}"), Line::Invalid(_)));
    }

    #[test]
    fn forward_skips_garbage_and_keeps_order() {
        let input = "not json\n{\"GoTo\":2}\n\n{\"Activate\":{\"widget\":\"mail\"}}\n";
        let (tx, rx) = mpsc::channel();
        assert!(forward(Cursor::new(input), &tx));
        let cmds: Vec<Command> = rx.try_iter().collect();
        assert_eq!(
            cmds,
            vec![
                Command::GoTo(2),
                Command::Activate {
                    widget: WidgetId::from("mail")
                }
            ]
        );
    }

    #[test]
    fn forward_stops_when_sink_is_closed() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        assert!(!forward(Cursor::new("\"DragEnd\"\n"), &tx));
    }

    #[test]
    fn commands_arrive_over_socket() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("dashgrd-test.sock");
        let listener_path = path.clone();
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            let mut listener = UnixSocketListener::new(&listener_path);
            let _ = listener.run(tx);
        });

        // Give the listener a moment to bind.
        let mut stream = None;
        for _ in 0..50 {
            if let Ok(s) = UnixStream::connect(&path) {
                stream = Some(s);
                break;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        let mut stream = stream.expect("connect");
        writeln!(stream, r#"{{"DragStart":{{"widget":"mail"}}}}"#).unwrap();
        writeln!(stream, r#"{{"Drop":{{"page":0,"x":150.0,"y":50.0}}}}"#).unwrap();
        writeln!(stream, r#"{{"Go":"next"}}"#).unwrap();
        stream.shutdown(std::net::Shutdown::Write).unwrap();

        let timeout = Duration::from_secs(2);
        let cmds: Vec<Command> = (0..3).filter_map(|_| rx.recv_timeout(timeout).ok()).collect();
        assert_eq!(
            cmds,
            vec![
                Command::DragStart {
                    widget: WidgetId::from("mail")
                },
                Command::Drop {
                    page: 0,
                    x: 150.0,
                    y: 50.0
                },
                Command::Go(Direction::Right),
            ]
        );
    }

    #[test]
    fn bind_failure_is_reported() {
        let mut listener = UnixSocketListener::new("/nonexistent-dir/dashgrd.sock");
        let (tx, _rx) = mpsc::channel();
        let err = listener.run(tx).unwrap_err();
        assert!(err.to_string().contains("/nonexistent-dir/dashgrd.sock"));
    }
}

//! Session loop: prompt, line editing and command dispatch.

use crate::{
    sanitize, CommandTable, Context, Error, Flow, Line, LineEditor, Output, Peering, Result,
    StubPeering,
};
use registry::{Asn, Config, SessionIdentity};
use std::{io, sync::Arc, time::Duration};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

/// Presentation settings of a shell.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShellConfig {
    /// Banner written when a session starts.
    pub intro: String,

    /// Prompt written before each line, verbatim.
    pub prompt: String,

    /// End sessions which send nothing for this long.
    pub idle_timeout: Option<Duration>,
}

impl ShellConfig {
    /// Settings for the peering shell of the given local AS.
    pub fn new(asn: &Asn) -> Self {
        Self {
            intro: format!("AS{asn} SSH Shell. Type help or ? to list commands."),
            prompt: format!("\r\nAS{asn}> "),
            idle_timeout: None,
        }
    }

    /// Settings for the local AS of a validated [`Config`].
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.asn)
    }

    /// Set the idle timeout.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }
}

/// Why a session ended.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Exit {
    /// A command stopped the session.
    Command,

    /// Empty line, or the input stream closed.
    EndOfInput,

    /// Nothing was received within the idle timeout.
    IdleTimeout,
}

/// Line-editor state.
#[derive(Debug)]
enum State {
    /// Prompt for a new line.
    Idle,

    /// Accumulate keystrokes.
    ReadingLine,

    /// Run a completed line.
    Dispatching(Line),
}

/// One read from the session input.
enum Input {
    Byte(u8),
    Closed,
    TimedOut,
}

/// Command shell shared by all sessions.
///
/// Cloning is cheap; the command table and peering backend are shared and
/// never mutated.
#[derive(Clone)]
pub struct Shell {
    config: Arc<ShellConfig>,
    commands: Arc<CommandTable>,
    peering: Arc<dyn Peering>,
}

impl Shell {
    /// Create a shell.
    pub fn new(config: ShellConfig, commands: CommandTable, peering: Arc<dyn Peering>) -> Self {
        Self {
            config: Arc::new(config),
            commands: Arc::new(commands),
            peering,
        }
    }

    /// Create a shell with the built-in commands and the stub peering
    /// backend.
    pub fn builtin(config: ShellConfig) -> Self {
        Self::new(config, CommandTable::builtin(), Arc::new(StubPeering))
    }

    /// Get the shell settings.
    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Get the command table.
    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    /// Run a session for `identity` until a command stops it, the input
    /// ends, or the idle timeout expires.
    ///
    /// Closing the input is not an error.
    pub async fn run<R, W>(
        &self,
        identity: &SessionIdentity,
        reader: R,
        mut writer: W,
    ) -> Result<Exit>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut reader = BufReader::new(reader);
        let mut editor = LineEditor::new();
        let mut echo = Vec::new();
        let mut state = State::Idle;

        info!(user = identity.username(), "session started");
        writer.write_all(sanitize(&self.config.intro).as_bytes()).await?;

        let exit = loop {
            state = match state {
                State::Idle => {
                    editor.clear();
                    writer.write_all(self.config.prompt.as_bytes()).await?;
                    writer.flush().await?;
                    State::ReadingLine
                }
                State::ReadingLine => match self.read_byte(&mut reader).await? {
                    Input::Byte(byte) => {
                        let line = editor.feed(byte, &mut echo);

                        if !echo.is_empty() {
                            writer.write_all(&echo).await?;
                            writer.flush().await?;
                            echo.clear();
                        }

                        match line {
                            Some(line) => State::Dispatching(line),
                            None => State::ReadingLine,
                        }
                    }
                    Input::Closed => State::Dispatching(editor.finish()),
                    Input::TimedOut => break Exit::IdleTimeout,
                },
                State::Dispatching(Line::EndOfInput) => break Exit::EndOfInput,
                State::Dispatching(Line::Text(line)) => {
                    let (flow, output) = self.dispatch_blocking(identity, line).await?;

                    writer.write_all(output.as_str().as_bytes()).await?;

                    match flow {
                        Flow::Continue => State::Idle,
                        Flow::Stop => break Exit::Command,
                    }
                }
            };
        };

        writer.flush().await?;
        info!(user = identity.username(), ?exit, "session ended");
        Ok(exit)
    }

    /// Run one completed input line on the blocking thread pool.
    ///
    /// Handlers may resolve host names or wait on the peering backend, so
    /// they never run on the session's async task.
    async fn dispatch_blocking(
        &self,
        identity: &SessionIdentity,
        line: String,
    ) -> Result<(Flow, Output)> {
        let shell = self.clone();
        let identity = identity.clone();

        tokio::task::spawn_blocking(move || {
            let mut output = Output::new();
            let flow = shell.dispatch(&identity, &line, &mut output);
            (flow, output)
        })
        .await
        .map_err(|err| {
            warn!(%err, "command handler failed");
            Error::Handler
        })
    }

    /// Run one completed input line, writing its output to `output`.
    ///
    /// A line of only whitespace writes an empty line.
    pub fn dispatch(&self, identity: &SessionIdentity, line: &str, output: &mut Output) -> Flow {
        let line = line.trim_end_matches(['\r', '\n']).trim();
        let help;

        // `?topic` is short for `help topic`
        let line = match line.strip_prefix('?') {
            Some(topic) => {
                help = format!("help {topic}");
                help.trim_end()
            }
            None => line,
        };

        if line.is_empty() {
            output.line("");
            return Flow::Continue;
        }

        let (name, args) = match line.find(char::is_whitespace) {
            Some(end) => (&line[..end], line[end..].trim_start()),
            None => (line, ""),
        };

        let Some(command) = self.commands.get(name) else {
            debug!(user = identity.username(), command = name, "unknown command");
            output.line(format!("*** Unknown syntax: {line}"));
            return Flow::Continue;
        };

        debug!(user = identity.username(), command = name, "dispatch");

        let mut ctx = Context {
            identity,
            peering: self.peering.as_ref(),
            commands: &self.commands,
            output,
        };

        command.run(&mut ctx, args)
    }

    /// Read one byte. End of stream and a dropped connection both read as
    /// [`Input::Closed`].
    async fn read_byte<R>(&self, reader: &mut R) -> Result<Input>
    where
        R: AsyncRead + Unpin,
    {
        let read = match self.config.idle_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, reader.read_u8()).await {
                Ok(read) => read,
                Err(_) => {
                    debug!(?timeout, "idle timeout");
                    return Ok(Input::TimedOut);
                }
            },
            None => reader.read_u8().await,
        };

        match read {
            Ok(byte) => Ok(Input::Byte(byte)),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::UnexpectedEof
                        | io::ErrorKind::ConnectionReset
                        | io::ErrorKind::BrokenPipe
                ) =>
            {
                Ok(Input::Closed)
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl core::fmt::Debug for Shell {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Shell")
            .field("config", &self.config)
            .field("commands", &self.commands)
            .finish_non_exhaustive()
    }
}

use std::{
    fmt,
    io::{self, Write},
    path::Path,
    process::{self, Command, Stdio as ChildStdio},
    thread,
};

use log::debug;

use crate::error::{Error, Result};

/// The pair of sinks a child process's output is forwarded to.
///
/// Defaults to the real standard streams of the current process.
///
/// # Example
///
/// ```no_run
/// # use northbrook::Stdio;
/// // Discard all child output
/// let io = Stdio::new(std::io::sink(), std::io::sink());
/// ```
pub struct Stdio {
    pub stdout: Box<dyn Write + Send>,
    pub stderr: Box<dyn Write + Send>,
}

impl Stdio {
    pub fn new<O, E>(stdout: O, stderr: E) -> Stdio
    where
        O: Write + Send + 'static,
        E: Write + Send + 'static,
    {
        Stdio {
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
        }
    }
}

impl Default for Stdio {
    fn default() -> Self { Stdio::new(io::stdout(), io::stderr()) }
}

impl fmt::Debug for Stdio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("Stdio { .. }") }
}

/// How a child process ended. `code` is `None` when it was terminated by a
/// signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus {
    pub code: Option<i32>,
}

impl ExitStatus {
    pub fn from_code(code: i32) -> ExitStatus { ExitStatus { code: Some(code) } }

    pub fn signaled() -> ExitStatus { ExitStatus { code: None } }

    pub fn success(&self) -> bool { self.code == Some(0) }
}

impl From<process::ExitStatus> for ExitStatus {
    fn from(status: process::ExitStatus) -> Self { ExitStatus { code: status.code() } }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {code}"),
            None => f.write_str("termination by signal"),
        }
    }
}

/// The capability of running an external program to completion inside a
/// working directory, with its output streamed to a `Stdio`.
///
/// `SystemRunner` is the implementation that actually spawns processes; tests
/// substitute their own.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str], dir: &Path, io: &mut Stdio) -> Result<ExitStatus>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, program: &str, args: &[&str], dir: &Path, io: &mut Stdio) -> Result<ExitStatus> {
        (**self).run(program, args, dir, io)
    }
}

/// Spawns real child processes with `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str], dir: &Path, io: &mut Stdio) -> Result<ExitStatus> {
        debug!("Running `{} {}` in {:?}", program, args.join(" "), dir);
        let mut child = Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(ChildStdio::null())
            .stdout(ChildStdio::piped())
            .stderr(ChildStdio::piped())
            .spawn()
            .map_err(|source| Error::Spawn {
                program: program.to_owned(),
                source,
            })?;

        let child_out = child.stdout.take();
        let child_err = child.stderr.take();
        let Stdio { stdout, stderr } = io;

        // Both pipes are drained at once so a chatty stderr cannot block the
        // child while we are still reading stdout.
        let forwarded = thread::scope(|s| -> io::Result<()> {
            let err_pump = s.spawn(move || match child_err {
                Some(mut pipe) => io::copy(&mut pipe, stderr).map(drop),
                None => Ok(()),
            });
            let copied = match child_out {
                Some(mut pipe) => io::copy(&mut pipe, stdout).map(drop),
                None => Ok(()),
            };
            if copied.is_err() {
                // Nobody reads stdout any more; stop the child so its stderr
                // closes and the pump can finish.
                if let Err(e) = child.kill() {
                    debug!("Could not kill `{}`: {}", program, e);
                }
            }
            let pumped = err_pump.join().unwrap_or_else(|_| {
                Err(io::Error::new(
                    io::ErrorKind::Other,
                    "stderr forwarding thread panicked",
                ))
            });
            copied.and(pumped)
        });

        // The child is always reaped, even when forwarding its output failed
        let waited = child.wait();
        forwarded?;
        io.stdout.flush()?;
        io.stderr.flush()?;

        let status = ExitStatus::from(waited?);
        debug!("`{}` finished with {}", program, status);
        Ok(status)
    }
}

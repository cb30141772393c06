use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::{
    config::ReleaseConfig,
    error::{Error, Result},
    process::{CommandRunner, Stdio, SystemRunner},
};

/// Runs a package's test suite and lets the release continue only when it
/// passes.
///
/// # Example
///
/// ```no_run
/// # use northbrook::{Stdio, TestRunner};
/// let affected = vec!["packages/a", "packages/b"];
///
/// // Hands `affected` back untouched once `npm test --silent` exits 0
/// let affected = TestRunner::new(".").run(affected, &mut Stdio::default()).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct TestRunner<R = SystemRunner> {
    directory: PathBuf,
    program: String,
    args: Vec<String>,
    runner: R,
}

impl TestRunner {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        TestRunner {
            directory: directory.as_ref().to_path_buf(),
            program: "npm".to_owned(),
            args: vec!["test".to_owned(), "--silent".to_owned()],
            runner: SystemRunner,
        }
    }

    /// Creates a `TestRunner` using the configured test command
    pub fn from_config<P: AsRef<Path>>(directory: P, cfg: &ReleaseConfig) -> Self {
        TestRunner::new(directory).command(cfg.test_command.as_slice())
    }
}

impl<R: CommandRunner> TestRunner<R> {
    /// Swaps out how the test command gets spawned
    pub fn with_runner<T: CommandRunner>(self, runner: T) -> TestRunner<T> {
        TestRunner {
            directory: self.directory,
            program: self.program,
            args: self.args,
            runner,
        }
    }

    /// Sets the test command, program first. An empty command is ignored.
    pub fn command<S: AsRef<str>>(mut self, command: &[S]) -> Self {
        if let Some((program, args)) = command.split_first() {
            self.program = program.as_ref().to_owned();
            self.args = args.iter().map(|a| a.as_ref().to_owned()).collect();
        }
        self
    }

    pub fn directory(&self) -> &Path { &self.directory }

    /// Runs the tests, returning `payload` unchanged when they pass
    pub fn run<T>(&self, payload: T, io: &mut Stdio) -> Result<T> {
        info!("Running tests in {:?}", self.directory);
        let args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        let status = self.runner.run(&self.program, &args, &self.directory, io)?;
        debug!("Tests in {:?} finished with {}", self.directory, status);

        if status.success() {
            Ok(payload)
        } else {
            Err(Error::TestsFailed {
                directory: self.directory.clone(),
                status,
            })
        }
    }
}

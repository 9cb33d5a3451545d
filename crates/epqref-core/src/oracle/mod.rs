//! Subprocess adapter for the reference oracle. The adapter owns the full
//! child lifecycle: spawn, write batch input, drain both pipes, wait, reap.
//! Exactly one subprocess is spawned per batch, regardless of request count.

use crate::domain::{BridgeError, BridgeResult, DumpRequest, RawTable};
use crate::wire;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Seam between the orchestrator and the subprocess adapter; tests substitute
/// spy or stub runners here.
pub trait BatchRunner {
    fn run_batch(
        &self,
        requests: &BTreeSet<DumpRequest>,
    ) -> BridgeResult<BTreeMap<DumpRequest, RawTable>>;
}

/// How to invoke the oracle entrypoint. `leading_args` come before the mode
/// arguments (`batch`, or `<module> k=v ...` for single mode).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleCommand {
    program: PathBuf,
    leading_args: Vec<String>,
    working_dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl OracleCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            working_dir: None,
            timeout: None,
        }
    }

    /// Split a whitespace-separated command line into program plus leading
    /// args. This is the shape accepted from `EPQREF_ORACLE_CMD`.
    pub fn from_command_line(command_line: &str) -> BridgeResult<Self> {
        let mut tokens = command_line.split_whitespace();
        let Some(program) = tokens.next() else {
            return Err(BridgeError::oracle_unavailable(
                "ORACLE.EMPTY_COMMAND",
                "oracle command line is empty",
            ));
        };
        Ok(Self::new(program).with_leading_args(tokens))
    }

    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// One-shot convenience invocation: `<oracle> <module> k=v ...`, unframed
    /// CSV back. No caching or dedup semantics attach to this path.
    pub fn run_single(&self, module: &str, arguments: &[(String, String)]) -> BridgeResult<RawTable> {
        let request = DumpRequest::build(module, arguments.iter().cloned())?;
        let mut command = self.base_command();
        command.arg(request.module());
        for (key, value) in request.arguments() {
            command.arg(format!("{key}={value}"));
        }
        let (stdout, _stderr) = self.run_to_completion(command, None)?;
        wire::decode_single(&stdout)
    }

    fn base_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.leading_args);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }

    /// Spawn, feed stdin, drain stdout/stderr on background threads (a large
    /// dump must not deadlock against a full pipe), wait, and reap. Returns
    /// captured (stdout, stderr) on a zero exit status.
    fn run_to_completion(
        &self,
        mut command: Command,
        stdin_payload: Option<String>,
    ) -> BridgeResult<(String, String)> {
        let mut child = command.spawn().map_err(|source| match source.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => BridgeError::oracle_unavailable(
                "ORACLE.SPAWN",
                format!(
                    "failed to launch oracle '{}': {}",
                    self.program.display(),
                    source
                ),
            ),
            _ => BridgeError::oracle_process(
                "ORACLE.SPAWN",
                format!(
                    "failed to launch oracle '{}': {}",
                    self.program.display(),
                    source
                ),
            ),
        })?;

        let stdin_writer = match (child.stdin.take(), stdin_payload) {
            (Some(mut stdin), Some(payload)) => Some(thread::spawn(move || {
                // EPIPE here means the oracle exited early; the exit status
                // check below reports the real failure.
                let _ = stdin.write_all(payload.as_bytes());
            })),
            (stdin, _) => {
                drop(stdin);
                None
            }
        };

        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        let stdout_reader = thread::spawn(move || read_to_string(stdout_pipe));
        let stderr_reader = thread::spawn(move || read_to_string(stderr_pipe));

        let wait_result = self.wait_with_deadline(&mut child);

        let stdout = stdout_reader.join().unwrap_or_default();
        let stderr = stderr_reader.join().unwrap_or_default();
        if let Some(writer) = stdin_writer {
            let _ = writer.join();
        }

        let status = wait_result?;
        if !status.success() {
            let code = status
                .code()
                .map(|code| code.to_string())
                .unwrap_or_else(|| "terminated by signal".to_string());
            return Err(BridgeError::oracle_process(
                "ORACLE.EXIT_STATUS",
                format!(
                    "oracle exited with status {code}; stderr:\n{}",
                    stderr.trim_end()
                ),
            ));
        }

        Ok((stdout, stderr))
    }

    fn wait_with_deadline(&self, child: &mut Child) -> BridgeResult<ExitStatus> {
        let Some(timeout) = self.timeout else {
            return child.wait().map_err(|source| {
                BridgeError::oracle_process(
                    "ORACLE.WAIT",
                    format!("failed waiting for oracle termination: {source}"),
                )
            });
        };

        let deadline = Instant::now() + timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(BridgeError::oracle_process(
                            "ORACLE.TIMEOUT",
                            format!(
                                "oracle did not finish within {:.1}s and was killed",
                                timeout.as_secs_f64()
                            ),
                        ));
                    }
                    thread::sleep(Duration::from_millis(10));
                }
                Err(source) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(BridgeError::oracle_process(
                        "ORACLE.WAIT",
                        format!("failed waiting for oracle termination: {source}"),
                    ));
                }
            }
        }
    }
}

impl BatchRunner for OracleCommand {
    /// Encode the whole batch, spawn the oracle once with the `batch`
    /// argument, and decode its framed output. All-or-nothing: any process or
    /// protocol failure discards the invocation. A request without a frame is
    /// simply absent from the result map; completeness is judged at lookup.
    fn run_batch(
        &self,
        requests: &BTreeSet<DumpRequest>,
    ) -> BridgeResult<BTreeMap<DumpRequest, RawTable>> {
        let batch_input = wire::encode_batch(requests);
        let mut command = self.base_command();
        command.arg("batch");
        let (stdout, _stderr) = self.run_to_completion(command, Some(batch_input))?;
        let frames = wire::decode_batch(&stdout)?;
        Ok(frames.into_iter().collect())
    }
}

fn read_to_string<R: Read>(pipe: Option<R>) -> String {
    let mut buffer = String::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_string(&mut buffer);
    }
    buffer
}

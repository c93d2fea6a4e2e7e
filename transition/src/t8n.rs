use crate::error::ToolError;
use crate::request::TransitionRequest;
use crate::response::ToolResponse;
use crate::TransitionTool;
use containers::document::from_json_str;
use containers::Document;
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const ALLOC_FILE: &str = "alloc.json";
const ENV_FILE: &str = "env.json";
const TXS_FILE: &str = "txs.json";
const RESULT_FILE: &str = "result.json";
const POST_ALLOC_FILE: &str = "post_alloc.json";
const STDOUT_FILE: &str = "stdout.log";
const STDERR_FILE: &str = "stderr.log";

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// An `evm t8n` compatible executable.
///
/// Every call runs in a fresh scratch directory: the inputs are written as
/// JSON files, the tool is run to completion and its result and post-state
/// files are read back. The tool keeps no state between calls.
#[derive(Clone, Debug)]
pub struct T8nTool {
    path: PathBuf,
    extra_args: Vec<String>,
    timeout: Option<Duration>,
}

impl T8nTool {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            extra_args: Vec::new(),
            timeout: None,
        }
    }

    /// Arguments placed before the generated ones, e.g. `["t8n"]` for `evm t8n`.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, workdir: &Path, request: &TransitionRequest<'_>) -> Result<Command, ToolError> {
        let reward = match request.reward() {
            Some(reward) => reward.to_string(),
            None => "-1".to_string(),
        };

        let mut command = Command::new(&self.path);
        command
            .current_dir(workdir)
            .args(&self.extra_args)
            .arg("--input.alloc")
            .arg(workdir.join(ALLOC_FILE))
            .arg("--input.env")
            .arg(workdir.join(ENV_FILE))
            .arg("--input.txs")
            .arg(workdir.join(TXS_FILE))
            .arg("--output.basedir")
            .arg(workdir)
            .arg("--output.result")
            .arg(RESULT_FILE)
            .arg("--output.alloc")
            .arg(POST_ALLOC_FILE)
            .arg("--state.fork")
            .arg(&request.fork.name)
            .arg("--state.reward")
            .arg(reward)
            .stdin(Stdio::null())
            .stdout(Stdio::from(File::create(workdir.join(STDOUT_FILE))?))
            .stderr(Stdio::from(File::create(workdir.join(STDERR_FILE))?));
        Ok(command)
    }

    fn wait(&self, child: &mut Child) -> Result<ExitStatus, ToolError> {
        let Some(timeout) = self.timeout else {
            return Ok(child.wait()?);
        };

        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                if let Err(e) = child.kill().and_then(|_| child.wait().map(|_| ())) {
                    warn!(tool = %self.path.display(), error = %e, "Failed to stop timed out transition tool");
                }
                return Err(ToolError::Timeout(timeout));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl TransitionTool for T8nTool {
    fn apply(&self, request: &TransitionRequest<'_>) -> Result<ToolResponse, ToolError> {
        let workdir = tempfile::Builder::new().prefix("t8n-").tempdir()?;
        let dir = workdir.path();

        write_json(&dir.join(ALLOC_FILE), request.alloc())?;
        write_json(&dir.join(ENV_FILE), &request.env())?;
        write_json(&dir.join(TXS_FILE), &request.transactions())?;

        debug!(
            tool = %self.path.display(),
            fork = %request.fork,
            seal_engine = %request.seal_engine,
            number = %request.pending.header.number,
            "Invoking transition tool"
        );

        let mut child = self
            .command(dir, request)?
            .spawn()
            .map_err(|source| ToolError::Spawn {
                path: self.path.clone(),
                source,
            })?;
        let status = self.wait(&mut child)?;

        let stdout = read_log(&dir.join(STDOUT_FILE))?;
        let stderr = read_log(&dir.join(STDERR_FILE))?;

        if !status.success() {
            return Err(ToolError::Exit {
                status: status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        let result = read_output(&dir.join(RESULT_FILE))?;
        let post_alloc = read_output(&dir.join(POST_ALLOC_FILE))?;

        let response = ToolResponse::from_documents(&result, post_alloc, stdout + &stderr)?;
        debug!(
            state_root = %response.state_root,
            rejected = response.rejected.len(),
            "Transition tool finished"
        );
        Ok(response)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ToolError> {
    let bytes = serde_json::to_vec_pretty(value)
        .map_err(|e| ToolError::MalformedOutput(format!("cannot encode {}: {e}", path.display())))?;
    fs::write(path, bytes)?;
    Ok(())
}

// Console output is diagnostic only; tools are free to print any bytes.
fn read_log(path: &Path) -> Result<String, ToolError> {
    Ok(String::from_utf8_lossy(&fs::read(path)?).into_owned())
}

// A missing or unparsable output file means the whole answer is discarded.
fn read_output(path: &Path) -> Result<Document, ToolError> {
    let content = fs::read_to_string(path).map_err(|e| {
        ToolError::MalformedOutput(format!("cannot read {}: {e}", path.display()))
    })?;
    from_json_str(&content)
        .map_err(|e| ToolError::MalformedOutput(format!("{}: {e}", path.display())))
}

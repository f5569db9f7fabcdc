use super::config::{PreprocessingSettings, ProcessingSettings, RejectionSettings};
use super::pipeline::{HvsrPipeline, HvsrResult, PipelineError};
use crate::core::io::sac::SacTrace;
use crate::core::models::recording::{Component, RecordingSet};
use serde::{Deserialize, Serialize};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use tempfile::TempDir;
use tracing::{debug, trace};

const STDERR_TAIL_LINES: usize = 20;

/// Drives an external HVSR program over a JSON-on-stdio protocol.
///
/// The snapshot is written as SAC files into a private temporary directory.
/// The child receives one JSON request on stdin:
///
/// ```text
/// {"records": [{"prefix", "east", "north", "vertical"}],
///  "preprocessing": {..}, "rejection": {"method", ..}, "processing": {..}}
/// ```
///
/// and must answer on stdout with either an [`HvsrResult`] object or
/// `{"error": "<message>"}`. Undefined amplitudes in `mean_curve` are sent
/// as `null`.
#[derive(Debug, Clone)]
pub struct CommandPipeline {
    program: String,
    args: Vec<String>,
}

impl CommandPipeline {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn execute(&self, payload: &[u8]) -> Result<Vec<u8>, PipelineError> {
        let launch_err = |source| PipelineError::Launch {
            program: self.program.clone(),
            source,
        };

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(launch_err)?;

        // Stdin is fed from its own thread so a child that fills its stdout or
        // stderr pipe before reading the request cannot stall both sides.
        let stdin = child.stdin.take();
        let output = thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => match stdin.write_all(payload) {
                    // The child quit without reading; its exit status tells the story.
                    Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                        debug!("Pipeline command closed stdin early.");
                        Ok(())
                    }
                    written => written,
                },
                None => Ok(()),
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
            written.and(output)
        })
        .map_err(launch_err)?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(PipelineError::CommandFailed {
                status: output.status.to_string(),
                stderr: tail(&stderr, STDERR_TAIL_LINES),
            });
        }
        if !stderr.trim().is_empty() {
            trace!("Pipeline stderr: {}", stderr.trim_end());
        }
        Ok(output.stdout)
    }
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.trim_end().lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}

#[derive(Debug, Serialize)]
struct StagedGroup {
    prefix: String,
    east: PathBuf,
    north: PathBuf,
    vertical: PathBuf,
}

/// Recordings written to disk, waiting for the rejection settings.
/// The directory is removed when this value is dropped.
pub struct StagedRecords {
    dir: TempDir,
    groups: Vec<StagedGroup>,
    preprocessing: PreprocessingSettings,
}

impl StagedRecords {
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn channel_paths(&self) -> impl Iterator<Item = &Path> {
        self.groups.iter().flat_map(|g| {
            [g.east.as_path(), g.north.as_path(), g.vertical.as_path()]
        })
    }
}

pub struct PendingRequest {
    staged: StagedRecords,
    rejection: RejectionSettings,
}

#[derive(Serialize)]
struct BridgeRequest<'a> {
    records: &'a [StagedGroup],
    preprocessing: &'a PreprocessingSettings,
    rejection: &'a RejectionSettings,
    processing: &'a ProcessingSettings,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BridgeResponse {
    Failure { error: String },
    Success(HvsrResult),
}

fn stage_channel(
    dir: &Path,
    prefix: &str,
    token: &str,
    component: Component,
    records: &RecordingSet,
    index: usize,
) -> Result<PathBuf, PipelineError> {
    let record = &records.records()[index];
    let path = dir.join(format!("{prefix}.{token}.sac"));
    let trace = SacTrace::from_time_series(
        record.component(component),
        Some(&record.name),
        Some(token),
    );
    trace
        .write_to_path(&path)
        .map_err(|source| PipelineError::StagedWrite {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

impl HvsrPipeline for CommandPipeline {
    type Preprocessed = StagedRecords;
    type Accepted = PendingRequest;

    fn preprocess(
        &self,
        records: RecordingSet,
        settings: &PreprocessingSettings,
    ) -> Result<Self::Preprocessed, PipelineError> {
        let dir = tempfile::Builder::new()
            .prefix("hvsweep-")
            .tempdir()
            .map_err(PipelineError::Staging)?;

        let mut groups = Vec::with_capacity(records.len());
        for (index, record) in records.records().iter().enumerate() {
            let prefix = format!("{index:04}-{}", record.name);
            let stage = |token, component| {
                stage_channel(dir.path(), &prefix, token, component, &records, index)
            };
            groups.push(StagedGroup {
                east: stage("E", Component::Ew)?,
                north: stage("N", Component::Ns)?,
                vertical: stage("Z", Component::Vt)?,
                prefix,
            });
        }
        debug!(
            "Staged {} recording(s) in {:?}.",
            groups.len(),
            dir.path()
        );

        Ok(StagedRecords {
            dir,
            groups,
            preprocessing: settings.clone(),
        })
    }

    fn reject_windows(
        &self,
        preprocessed: Self::Preprocessed,
        settings: &RejectionSettings,
    ) -> Result<Self::Accepted, PipelineError> {
        Ok(PendingRequest {
            staged: preprocessed,
            rejection: settings.clone(),
        })
    }

    fn process(
        &self,
        accepted: Self::Accepted,
        settings: &ProcessingSettings,
    ) -> Result<HvsrResult, PipelineError> {
        let request = BridgeRequest {
            records: &accepted.staged.groups,
            preprocessing: &accepted.staged.preprocessing,
            rejection: &accepted.rejection,
            processing: settings,
        };
        let payload = serde_json::to_vec(&request).map_err(PipelineError::Request)?;

        let stdout = self.execute(&payload)?;
        let response: BridgeResponse = serde_json::from_slice(&stdout)
            .map_err(|e| PipelineError::MalformedResponse(e.to_string()))?;

        match response {
            BridgeResponse::Failure { error } => Err(PipelineError::Reported(error)),
            BridgeResponse::Success(result) => Ok(result),
        }
    }
}

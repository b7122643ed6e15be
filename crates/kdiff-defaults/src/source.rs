use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use kdiff_core::model::Document;
use kdiff_core::yaml::{self, DocumentError};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum DefaultsError {
    #[error("failed to read defaults file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("defaults from {origin} are not valid YAML: {source}")]
    Decode {
        origin: String,
        #[source]
        source: DocumentError,
    },
}

/// Anything that can produce the reference defaults document.
pub trait DefaultsSource {
    fn load(&self) -> Result<Document, DefaultsError>;
}

/// Defaults stored as a YAML file.
#[derive(Debug, Clone)]
pub struct FileDefaults {
    path: PathBuf,
}

impl FileDefaults {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DefaultsSource for FileDefaults {
    fn load(&self) -> Result<Document, DefaultsError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| DefaultsError::Read {
            path: self.path.clone(),
            source,
        })?;
        decode(&self.path.display().to_string(), &text)
    }
}

/// Defaults printed by an external program, usually a container image that
/// dumps its effective configuration.
///
/// The program runs to completion before its output is decoded; stdout must
/// hold exactly one YAML document.
#[derive(Debug, Clone)]
pub struct CommandDefaults {
    program: String,
    args: Vec<String>,
    stdin: Option<String>,
}

impl CommandDefaults {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            stdin: None,
        }
    }

    /// `<runtime> run --rm -i <image> -config.file=/dev/stdin -print.config`
    ///
    /// With no config text the image prints its built-in defaults.
    pub fn container(runtime: &str, image: &str) -> Self {
        Self::new(
            runtime,
            ["run", "--rm", "-i", image, "-config.file=/dev/stdin", "-print.config"]
                .map(String::from)
                .to_vec(),
        )
    }

    /// Text written to the program's stdin.
    pub fn with_stdin(mut self, text: impl Into<String>) -> Self {
        self.stdin = Some(text.into());
        self
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl DefaultsSource for CommandDefaults {
    fn load(&self) -> Result<Document, DefaultsError> {
        let command = self.command_line();
        info!(command = %command, "extracting defaults");

        let spawn_err = |source| DefaultsError::Spawn {
            command: command.clone(),
            source,
        };

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;

        // Stdin is fed from its own thread while the main thread drains
        // stdout and stderr, so neither side can stall on a full pipe.
        // Dropping the handle closes stdin and the program sees EOF.
        let writer = child.stdin.take().map(|mut stdin| {
            let text = self.stdin.clone().unwrap_or_default();
            thread::spawn(move || stdin.write_all(text.as_bytes()))
        });

        let output = child.wait_with_output().map_err(spawn_err)?;

        // A program that exits without reading its input surfaces through
        // its status instead.
        if let Some(writer) = writer {
            match writer.join() {
                Ok(Err(e)) if e.kind() != std::io::ErrorKind::BrokenPipe => {
                    return Err(spawn_err(e));
                }
                Err(_) => {
                    return Err(spawn_err(std::io::Error::other("stdin writer panicked")));
                }
                _ => {}
            }
        }

        if !output.status.success() {
            return Err(DefaultsError::Failed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!(bytes = output.stdout.len(), "defaults captured");
        decode(&command, &String::from_utf8_lossy(&output.stdout))
    }
}

fn decode(origin: &str, text: &str) -> Result<Document, DefaultsError> {
    let object = yaml::decode(text).map_err(|source| DefaultsError::Decode {
        origin: origin.to_string(),
        source,
    })?;
    Ok(Document::new(origin, object))
}


//! The boundary to external renderers.
//!
//! Turning DOT text into an image is the job of a Graphviz layout program,
//! which this crate never runs itself. Instead it prepares a
//! [`RenderRequest`] (program, arguments, and input text) and hands it to a
//! [`Renderer`] supplied by the application. Interactive front ends
//! implement [`Presenter`] to show either the DOT source or a rendering.
//!
//! # Overview
//!
//! - [`OutputFormat`] - A lower-cased `-T` format token.
//! - [`RenderOptions`] - Deserializable rendering parameters.
//! - [`RenderRequest`] - Everything a renderer needs for one invocation.
//! - [`Renderer`] / [`RenderError`] - The rendering collaborator.
//! - [`Presenter`] / [`DisplayHint`] / [`DisplayError`] - The display
//!   collaborator.

use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use log::{info, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::{config::EmitConfig, error::DotError, graph::Dot};

/// File extensions from which an [`OutputFormat`] can be inferred.
const INFERABLE_EXTENSIONS: [&str; 6] = ["svg", "png", "jpg", "jpeg", "gif", "pdf"];

// =============================================================================
// Errors
// =============================================================================

/// Failures reported by a [`Renderer`].
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Could not run program {program}: {reason}")]
    Invocation { program: String, reason: String },

    #[error("Program {program} exited with status {status}: {stderr}")]
    Process {
        program: String,
        status: i32,
        stderr: String,
    },

    #[error("Program {program} timed out after {timeout:?}")]
    Timeout {
        program: String,
        timeout: Duration,
        stderr: String,
    },

    #[error("Cannot infer format from {}", .0.display())]
    UnknownFormat(PathBuf),
}

impl RenderError {
    /// Builds a [`RenderError::Process`] from raw standard error output,
    /// replacing invalid UTF-8.
    pub fn process(program: impl Into<String>, status: i32, stderr: &[u8]) -> Self {
        RenderError::Process {
            program: program.into(),
            status,
            stderr: String::from_utf8_lossy(stderr).into_owned(),
        }
    }

    /// Builds a [`RenderError::Timeout`] from raw standard error output,
    /// replacing invalid UTF-8.
    pub fn timeout(program: impl Into<String>, timeout: Duration, stderr: &[u8]) -> Self {
        RenderError::Timeout {
            program: program.into(),
            timeout,
            stderr: String::from_utf8_lossy(stderr).into_owned(),
        }
    }
}

/// A display could not be completed. Details have already been reported
/// through the log.
#[derive(Debug, Error)]
#[error("Display could not complete")]
pub struct DisplayError;

// =============================================================================
// Options
// =============================================================================

/// A renderer output format, such as `svg` or `png`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub struct OutputFormat(String);

impl OutputFormat {
    /// Creates a format token, lower-casing it.
    pub fn new(format: &str) -> Self {
        Self(format.to_lowercase())
    }

    /// Infers the format from a file extension.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnknownFormat`] unless the extension is one
    /// of `svg`, `png`, `jpg`, `jpeg`, `gif`, or `pdf` (in any case).
    pub fn infer(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        path.extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_lowercase)
            .filter(|extension| INFERABLE_EXTENSIONS.contains(&extension.as_str()))
            .map(Self)
            .ok_or_else(|| RenderError::UnknownFormat(path.to_path_buf()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for formats whose output is SVG text.
    pub fn is_svg(&self) -> bool {
        self.0 == "svg" || self.0 == "svg_inline"
    }
}

impl From<String> for OutputFormat {
    fn from(format: String) -> Self {
        Self::new(&format)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parameters of one rendering.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Program name or path, such as `dot` or `circo`.
    program: String,

    /// Output format.
    format: OutputFormat,

    /// Pixels per inch (`-Gdpi`).
    dpi: Option<f64>,

    /// Maximum drawing size in inches (`-Gsize`), such as `"5,5"`.
    size: Option<String>,

    /// Aspect ratio handling (`-Gratio`), such as `fill` or `0.5`.
    ratio: Option<String>,

    /// Seconds the program may run.
    timeout: Option<f64>,

    /// Directory in which to find the program.
    directory: Option<PathBuf>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            program: "dot".to_string(),
            format: OutputFormat::new("png"),
            dpi: None,
            size: None,
            ratio: None,
            timeout: None,
            directory: None,
        }
    }
}

impl RenderOptions {
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.dpi = Some(dpi);
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.ratio = Some(ratio.into());
        self
    }

    /// Sets the time limit in seconds.
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn format(&self) -> &OutputFormat {
        &self.format
    }

    /// Returns the time limit; non-positive or non-finite values mean none.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
            .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
            .filter(|timeout| !timeout.is_zero())
    }

    /// Returns the program path, joined to the directory if one is set.
    pub fn program_path(&self) -> PathBuf {
        match &self.directory {
            Some(directory) => directory.join(&self.program),
            None => PathBuf::from(&self.program),
        }
    }

    /// Returns the program arguments: the format, then any graph attribute
    /// overrides.
    pub fn arguments(&self) -> Vec<String> {
        let mut arguments = vec![format!("-T{}", self.format)];
        if let Some(dpi) = self.dpi {
            arguments.push(format!("-Gdpi={dpi}"));
        }
        if let Some(size) = &self.size {
            arguments.push(format!("-Gsize={size}"));
        }
        if let Some(ratio) = &self.ratio {
            arguments.push(format!("-Gratio={ratio}"));
        }
        arguments
    }
}

// =============================================================================
// Collaborators
// =============================================================================

/// One invocation of a layout program.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    program: PathBuf,
    arguments: Vec<String>,
    input: String,
    timeout: Option<Duration>,
}

impl RenderRequest {
    /// Captures the DOT text of `dot` together with the invocation described
    /// by `options`.
    ///
    /// # Errors
    ///
    /// Fails as [`Dot::emit`] does.
    pub fn new(dot: &Dot, options: &RenderOptions) -> Result<Self, DotError> {
        Self::with_config(dot, options, &EmitConfig::default())
    }

    /// Like [`RenderRequest::new`], emitting with `config`.
    ///
    /// # Errors
    ///
    /// Fails as [`Dot::emit`] does.
    pub fn with_config(
        dot: &Dot,
        options: &RenderOptions,
        config: &EmitConfig,
    ) -> Result<Self, DotError> {
        Ok(Self::from_text(dot.emit_with(config)?, options))
    }

    /// Builds a request for DOT text produced elsewhere.
    pub fn from_text(input: String, options: &RenderOptions) -> Self {
        Self {
            program: options.program_path(),
            arguments: options.arguments(),
            input,
            timeout: options.timeout(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// The DOT text to feed on standard input.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Runs layout programs.
///
/// Implementations live outside this crate; they are expected to feed
/// [`RenderRequest::input`] to the program and return its standard output.
pub trait Renderer {
    /// Renders one request.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Invocation`] if the program cannot be started,
    /// [`RenderError::Process`] if it exits unsuccessfully, and
    /// [`RenderError::Timeout`] if it exceeds the request's time limit.
    fn render(&self, request: &RenderRequest) -> Result<Vec<u8>, RenderError>;
}

/// What kind of content is being presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayHint {
    /// DOT source text.
    Source,
    /// A rendering in the given format.
    Image,
}

/// Shows content to a user, for example in a notebook.
pub trait Presenter {
    /// Presents `content`.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError`] if the content could not be shown.
    fn present(&self, content: &[u8], hint: DisplayHint, format: &OutputFormat) -> Result<(), DisplayError>;
}

/// Presents the DOT source of `dot`.
///
/// # Errors
///
/// Returns [`DisplayError`] if emission or presentation fails; the cause is
/// logged.
pub fn show_source(dot: &Dot, presenter: &impl Presenter) -> Result<(), DisplayError> {
    let text = dot.emit().map_err(|err| {
        warn!(err:% = err; "Cannot show DOT source");
        DisplayError
    })?;
    presenter.present(text.as_bytes(), DisplayHint::Source, &OutputFormat::new("dot"))
}

/// Renders `dot` and presents the result.
///
/// # Errors
///
/// Returns [`DisplayError`] if emission, rendering, or presentation fails;
/// the cause is logged.
pub fn show(
    dot: &Dot,
    renderer: &impl Renderer,
    presenter: &impl Presenter,
    options: &RenderOptions,
) -> Result<(), DisplayError> {
    let request = RenderRequest::new(dot, options).map_err(|err| {
        warn!(err:% = err; "Cannot prepare rendering");
        DisplayError
    })?;
    let data = renderer.render(&request).map_err(|err| {
        warn!(
            program = request.program().display().to_string(),
            err:% = err;
            "Rendering failed"
        );
        DisplayError
    })?;
    info!(bytes = data.len(), format = options.format().as_str(); "Rendering complete");
    presenter.present(&data, DisplayHint::Image, options.format())
}

//! Compilation driver: input selection, output naming, tree writing

use crate::common::CompileResult;
use crate::frontend::{CompileContext, Frontend, FrontendConfig, TreeDumper};
use std::fmt;
use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

/// Marks the end of a program typed on standard input
pub const SENTINEL: char = '$';

/// Output file used when the source comes from standard input
pub const DEFAULT_OUTPUT: &str = "Default.ast";

/// Where the source program comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    File(PathBuf),
    Stdin,
}

impl Input {
    pub fn from_arg(path: Option<PathBuf>) -> Self {
        path.map_or(Input::Stdin, Input::File)
    }

    /// Read the whole program
    pub fn read_source(&self) -> io::Result<String> {
        match self {
            Input::File(path) => fs::read_to_string(path),
            Input::Stdin => read_until_sentinel(io::stdin().lock()),
        }
    }

    /// Output path for the tree dump, unless overridden
    pub fn default_output(&self) -> PathBuf {
        match self {
            Input::File(path) => path.with_extension("ast"),
            Input::Stdin => PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::File(path) => write!(f, "{}", path.display()),
            Input::Stdin => write!(f, "<stdin>"),
        }
    }
}

/// Read lines until one contains the sentinel (kept, along with the text
/// before it on that line) or the reader runs out.
pub fn read_until_sentinel(reader: impl BufRead) -> io::Result<String> {
    let mut source = String::new();

    for line in reader.lines() {
        let line = line?;
        if let Some(end) = line.find(SENTINEL) {
            source.push_str(&line[..=end]);
            source.push('\n');
            break;
        }
        source.push_str(&line);
        source.push('\n');
    }

    Ok(source)
}

/// Success banner printed after the tree has been written
pub fn banner(output: &Path) -> String {
    format!("\nValid!\nWriting AST to \"{}\"\n", output.display())
}

/// Compilation pipeline: frontend, then the tree dump
pub struct Pipeline {
    frontend: Frontend,
    config: FrontendConfig,
}

impl Pipeline {
    pub fn new(config: FrontendConfig) -> Self {
        Self {
            frontend: Frontend::new(),
            config,
        }
    }

    /// Compile `source` and render the annotated tree
    pub fn compile(&self, source: &str, ctx: &CompileContext) -> CompileResult<String> {
        let program = self.frontend.compile(source, ctx, &self.config)?;
        Ok(TreeDumper::dump(&program))
    }

    /// Compile `source` and write the tree dump to `output`
    pub fn compile_to_file(
        &self,
        source: &str,
        ctx: &CompileContext,
        output: &Path,
    ) -> CompileResult<()> {
        let dump = self.compile(source, ctx)?;
        fs::write(output, dump)?;
        tracing::info!(output = %output.display(), "wrote tree dump");
        Ok(())
    }
}

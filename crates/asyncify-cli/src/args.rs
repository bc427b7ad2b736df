use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the asyncify binary.
#[derive(Parser, Debug)]
#[command(
    name = "asyncify",
    version,
    about = "Rewrite promise .then/.catch chains as async/await"
)]
pub struct CliArgs {
    /// Files or directories to convert. Directories are searched recursively.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Convert the innermost function containing this byte offset.
    #[arg(long, conflicts_with_all = ["line", "function", "all"])]
    pub position: Option<u32>,

    /// Convert the function containing this 1-based line (needs --column).
    #[arg(long, requires = "column", conflicts_with_all = ["function", "all"])]
    pub line: Option<u32>,

    /// 1-based column paired with --line.
    #[arg(long, requires = "line")]
    pub column: Option<u32>,

    /// Convert the outermost convertible function with this name.
    #[arg(long, conflicts_with = "all")]
    pub function: Option<String>,

    /// Convert every flagged function (the default when no target is given).
    #[arg(long)]
    pub all: bool,

    /// Only report the functions that may be converted.
    #[arg(long)]
    pub list: bool,

    /// Print machine-readable JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// Write converted files in place instead of printing them.
    #[arg(short = 'w', long)]
    pub write: bool,

    /// JSON5 file with promise producer and type name settings.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Indentation width of rewritten statements.
    #[arg(long, default_value_t = 4)]
    pub indent: usize,

    /// Disable colored output.
    #[arg(long = "no-color")]
    pub no_color: bool,
}

/// Which functions of a file to convert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Position(u32),
    LineColumn { line: u32, column: u32 },
    Function(String),
    All,
}

impl CliArgs {
    pub fn target(&self) -> Target {
        if let Some(position) = self.position {
            return Target::Position(position);
        }
        if let (Some(line), Some(column)) = (self.line, self.column) {
            return Target::LineColumn { line, column };
        }
        if let Some(name) = &self.function {
            return Target::Function(name.clone());
        }
        Target::All
    }
}

use std::fmt;

#[derive(Debug)]
pub enum IoError {
    /// File read/write or CSV-level error.
    Io(String),
    /// Missing required column in an input file.
    MissingColumn { file: String, column: String },
    /// A non-blank cell failed to parse as a number.
    NumberParse {
        file: String,
        line: u64,
        column: String,
        value: String,
    },
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::MissingColumn { file, column } => {
                write!(f, "{file}: missing column '{column}'")
            }
            Self::NumberParse {
                file,
                line,
                column,
                value,
            } => {
                write!(f, "{file}:{line}: cannot parse '{value}' in column '{column}'")
            }
        }
    }
}

impl std::error::Error for IoError {}

use std::fmt;

/// Errors raised while interpreting SAM/GTF input and building the
/// splice-aware structures derived from it.
#[derive(Debug)]
pub enum CoreError {
    OverlappingExons {
        identifier: String,
        left: (i64, i64),
        right: (i64, i64),
    },
    NoMapping,
    NoMappedSegments,
    MalformedInput {
        context: String,
        line: String,
    },
    Io(std::io::Error),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::OverlappingExons {
                identifier,
                left,
                right,
            } => write!(
                f,
                "overlapping exons in {}: ({}, {}) overlaps ({}, {})",
                identifier, left.0, left.1, right.0, right.1
            ),
            CoreError::NoMapping => write!(f, "alignment record carries no mapping information"),
            CoreError::NoMappedSegments => {
                write!(f, "read group produced no mapped segments")
            }
            CoreError::MalformedInput { context, line } => {
                write!(f, "malformed input ({}): {}", context, line)
            }
            CoreError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CoreError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Io(e)
    }
}

impl CoreError {
    pub fn malformed(context: impl Into<String>, line: impl Into<String>) -> Self {
        CoreError::MalformedInput {
            context: context.into(),
            line: line.into(),
        }
    }
}

use crate::{ErrorKind, ParseError};
use std::fmt::{Display, Formatter};

impl ParseError {
    pub(crate) fn new(
        kind: ErrorKind,
        phrase: &'static str,
        row_no: usize,
        row: &str,
        cursor: usize,
        message: String,
    ) -> Self {
        let unparsed = row.get(cursor.min(row.len())..).unwrap_or("").to_string();
        Self {
            kind,
            phrase,
            row_no,
            row: row.to_string(),
            cursor,
            unparsed,
            designated: None,
            message,
        }
    }

    pub(crate) fn with_designated(mut self, designated: &str) -> Self {
        self.designated = Some(designated.to_string());
        self
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::AdvanceStuckRow => "advance-stuck-row",
            ErrorKind::AdvanceStuckTokenize => "advance-stuck-tokenize",
            ErrorKind::NullToken => "null-token",
            ErrorKind::Feature => "feature-error",
            ErrorKind::Misuse => "runtime-misuse",
        };
        write!(f, "{}", name)
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}: {}", self.kind, self.message)?;
        writeln!(f, "in phrase         : {:?}", self.phrase)?;
        writeln!(f, "row     [no. {:4}]: {:?}", self.row_no, self.row)?;
        write!(f, "unparsed[cur {:4}]: {:?}", self.cursor, self.unparsed)?;
        if let Some(designated) = &self.designated {
            write!(f, "\ndesignated        : {:?}", designated)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

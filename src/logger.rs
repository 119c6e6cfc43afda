use crate::Log;
use std::fmt::{Display, Formatter};

impl<T> Log<T> {
    /// The label carried by the level, [None] when logging is off.
    pub fn label(&self) -> Option<&T> {
        match self {
            Log::None => None,
            Log::Default(label)
            | Log::Success(label)
            | Log::Result(label)
            | Log::Verbose(label) => Some(label),
        }
    }

    /// Whether committed candidates are reported under this level.
    pub fn reports_success(&self) -> bool {
        matches!(self, Log::Success(_) | Log::Result(_) | Log::Verbose(_))
    }

    /// Whether failed candidate queries are reported under this level.
    pub fn reports_failure(&self) -> bool {
        matches!(self, Log::Result(_) | Log::Verbose(_))
    }
}

impl<T: Display> Display for Log<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.label() {
            Some(label) => write!(f, "{}", label),
            None => Ok(()),
        }
    }
}

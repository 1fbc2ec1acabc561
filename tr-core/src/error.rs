use std::fmt;

use compact_str::CompactString;
use tr_cfg::SchemaError;

use crate::environment::EnvironmentKey;
use crate::validate::Violation;

/// Errors that can occur when resolving targets.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("target '{target}': unknown option '{option}'")]
    UnknownOption {
        target: CompactString,
        option: CompactString,
    },
    #[error("target '{target}': failed to resolve option '{option}'")]
    Resolution {
        target: CompactString,
        option: CompactString,
        #[source]
        source: anyhow::Error,
    },
    #[error("target '{target}': no target rules named '{rules}'")]
    MissingConstructor {
        target: CompactString,
        rules: CompactString,
    },
    #[error("target '{target}': target rules '{rules}' failed")]
    ConstructorFailed {
        target: CompactString,
        rules: CompactString,
        #[source]
        source: anyhow::Error,
    },
    #[error("target '{target}': {reason}")]
    UnsupportedTarget {
        target: CompactString,
        reason: String,
    },
    #[error("target '{target}' is requested more than once")]
    DuplicateTarget { target: CompactString },
    #[error(
        "build environment {group} has {} conflicting option(s)\n{}",
        .violations.len(),
        ViolationList(.violations)
    )]
    EnvironmentViolation {
        group: EnvironmentKey,
        violations: Vec<Violation>,
    },
}

impl Error {
    /// Attach a target name to an error from the option schema.
    pub(crate) fn from_schema(target: &str, option: &str, err: SchemaError) -> Self {
        match err {
            SchemaError::UnknownOption { name } => Error::UnknownOption {
                target: CompactString::new(target),
                option: name,
            },
            other => Error::Resolution {
                target: CompactString::new(target),
                option: CompactString::new(option),
                source: other.into(),
            },
        }
    }

    /// Name of the target this error is about, `None` for errors about a whole group.
    pub fn target(&self) -> Option<&str> {
        match self {
            Error::UnknownOption { target, .. }
            | Error::Resolution { target, .. }
            | Error::MissingConstructor { target, .. }
            | Error::ConstructorFailed { target, .. }
            | Error::UnsupportedTarget { target, .. }
            | Error::DuplicateTarget { target } => Some(target.as_str()),
            Error::EnvironmentViolation { .. } => None,
        }
    }
}

struct ViolationList<'a>(&'a [Violation]);

impl fmt::Display for ViolationList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for violation in self.0 {
            writeln!(f, "  {violation}")?;
        }
        Ok(())
    }
}

/// Every error produced while resolving a plan.
#[derive(Debug)]
pub struct PlanErrors {
    errors: Vec<Error>,
}

impl PlanErrors {
    pub(crate) fn new(errors: Vec<Error>) -> Self {
        PlanErrors { errors }
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<Error> {
        self.errors
    }
}

impl fmt::Display for PlanErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} error(s) while resolving targets:", self.errors.len())?;
        for err in &self.errors {
            writeln!(f, "- {}", ErrorChain(err))?;
        }
        Ok(())
    }
}

impl std::error::Error for PlanErrors {}

/// Renders an error followed by all of its causes.
pub struct ErrorChain<'a>(pub &'a Error);

impl fmt::Display for ErrorChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = std::error::Error::source(self.0);
        while let Some(cause) = source {
            write!(f, ": {cause}")?;
            source = cause.source();
        }
        Ok(())
    }
}

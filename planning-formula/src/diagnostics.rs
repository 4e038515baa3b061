//! Accumulates warnings and errors for one declaration unit, so the
//! front end can report every problem before giving up.
use crate::error::FormulaError;
use crate::error::Severity;
use std::fmt;
use tracing::warn;

/// What to do with warnings.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum WarningLevel {
    /// Drop them.
    Silent,
    /// Record and log them.
    Warn,
    /// Treat them as errors.
    Strict,
}

impl Default for WarningLevel {
    fn default() -> Self {
        WarningLevel::Warn
    }
}

/// A recorded problem, with the severity it was recorded at (which
/// may be higher than its natural severity under `Strict`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    severity: Severity,
    error: FormulaError,
}

impl Diagnostic {
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    #[must_use]
    pub fn error(&self) -> &FormulaError {
        &self.error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        };

        write!(f, "{}: {}", label, self.error)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    level: WarningLevel,
    reports: Vec<Diagnostic>,
}

impl Diagnostics {
    #[must_use]
    pub fn new(level: WarningLevel) -> Self {
        Self {
            level,
            reports: Vec::new(),
        }
    }

    #[must_use]
    pub fn level(&self) -> WarningLevel {
        self.level
    }

    /// Records `error`.
    ///
    /// # Errors
    ///
    /// Returns `Err(error)` for fatal problems: the caller must stop
    /// processing the current input.  Everything else is recorded and
    /// yields `Ok`.
    pub fn report(&mut self, error: FormulaError) -> Result<(), FormulaError> {
        let severity = match error.severity() {
            Severity::Warning if self.level == WarningLevel::Strict => Severity::Error,
            severity => severity,
        };

        match severity {
            Severity::Warning => {
                if self.level == WarningLevel::Silent {
                    return Ok(());
                }

                warn!(%error, "recoverable problem");
            }
            Severity::Error => tracing::error!(%error, "replaced construct with default"),
            Severity::Fatal => {
                tracing::error!(%error, "aborting");
                self.reports.push(Diagnostic {
                    severity,
                    error: error.clone(),
                });
                return Err(error);
            }
        }

        self.reports.push(Diagnostic { severity, error });
        Ok(())
    }

    /// Returns true iff an error (or fatal problem) was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.reports
            .iter()
            .any(|report| report.severity >= Severity::Error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.reports.iter()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.reports
            .iter()
            .filter(|report| report.severity == Severity::Warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.reports
            .iter()
            .filter(|report| report.severity >= Severity::Error)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Closes the declaration unit.
    ///
    /// # Errors
    ///
    /// Returns every report as `Err` if any of them is an error;
    /// otherwise, returns the warnings.
    pub fn finish(self) -> Result<Vec<Diagnostic>, Vec<Diagnostic>> {
        if self.has_errors() {
            Err(self.reports)
        } else {
            Ok(self.reports)
        }
    }
}

#[cfg(test)]
fn implicit_type() -> FormulaError {
    FormulaError::ImplicitType {
        name: "block".into(),
    }
}

#[test]
fn test_warn_level() {
    let mut diagnostics = Diagnostics::default();

    assert_eq!(diagnostics.report(implicit_type()), Ok(()));
    assert!(!diagnostics.has_errors());
    assert_eq!(diagnostics.warnings().count(), 1);

    let reports = diagnostics.finish().expect("only warnings");
    assert_eq!(
        reports[0].to_string(),
        "warning: type `block` used before declaration"
    );
}

#[test]
fn test_silent_level() {
    let mut diagnostics = Diagnostics::new(WarningLevel::Silent);

    assert_eq!(diagnostics.report(implicit_type()), Ok(()));
    assert!(diagnostics.is_empty());
}

#[test]
fn test_strict_level() {
    let mut diagnostics = Diagnostics::new(WarningLevel::Strict);

    assert_eq!(diagnostics.report(implicit_type()), Ok(()));
    assert!(diagnostics.has_errors());
    assert_eq!(diagnostics.warnings().count(), 0);
    assert!(diagnostics.finish().is_err());
}

#[test]
fn test_errors_accumulate() {
    let mut diagnostics = Diagnostics::default();

    for name in &["x", "y"] {
        diagnostics
            .report(FormulaError::FreeVariable {
                name: (*name).into(),
            })
            .expect("recoverable");
    }

    assert_eq!(diagnostics.errors().count(), 2);
    assert_eq!(diagnostics.finish().expect_err("has errors").len(), 2);
}

#[test]
fn test_fatal() {
    let mut diagnostics = Diagnostics::default();
    let fatal = FormulaError::Unsupported {
        feature: ":fluents".into(),
    };

    assert_eq!(diagnostics.report(fatal.clone()), Err(fatal));
    assert!(diagnostics.has_errors());
    assert_eq!(diagnostics.len(), 1);
}

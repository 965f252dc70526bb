//! Findings of [`validate_ir`](super::validate_ir).
//!
//! A report can be printed for people, serialized to JSON, or inspected
//! programmatically through the stable [`IssueCode`]s.

use std::fmt;

use serde::Serialize;

/// The result of validating an annotation IR.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ValidationReport {
    /// All issues found during validation, in discovery order.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// No errors; warnings allowed.
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    /// Neither errors nor warnings.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Whether the report passes, with warnings counting as failures when
    /// `strict` is set.
    pub fn passes(&self, strict: bool) -> bool {
        if strict {
            self.is_clean()
        } else {
            self.is_ok()
        }
    }

    /// Returns true if any issue carries `code`.
    pub fn has(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }

    /// The JSON summary printed by `annotrack validate --output json`.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "error_count": self.error_count(),
            "warning_count": self.warning_count(),
            "issues": self.issues,
        })
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return writeln!(f, "Validation passed: no issues found");
        }

        writeln!(
            f,
            "Validation completed with {} error(s) and {} warning(s):",
            self.error_count(),
            self.warning_count()
        )?;
        writeln!(f)?;

        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }

        Ok(())
    }
}

/// One finding, located by track, keyframe, tag or shape.
#[derive(Clone, Debug, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: IssueCode,
    pub message: String,
    /// Rendered as text in JSON, e.g. `"track 1 frame 0"`.
    #[serde(serialize_with = "serialize_context")]
    pub context: IssueContext,
}

impl ValidationIssue {
    pub fn new(
        severity: Severity,
        code: IssueCode,
        message: impl Into<String>,
        context: IssueContext,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            context,
        }
    }

    pub fn error(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self::new(Severity::Error, code, message, context)
    }

    pub fn warning(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self::new(Severity::Warning, code, message, context)
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
        };
        write!(
            f,
            "[{}] {:?} in {}: {}",
            severity, self.code, self.context, self.message
        )
    }
}

/// How much an issue matters to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// The engine can still process the data, but the result may surprise.
    Warning,
    /// The engine would reject or misinterpret the data.
    Error,
}

/// Machine-readable issue kind. Variant names are part of the JSON output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum IssueCode {
    // Track structure
    /// A track has no keyframes.
    EmptyTrack,
    /// Keyframe frames of a track go backwards.
    NonIncreasingKeyframes,
    /// Two keyframes of a track sit on the same frame.
    DuplicateKeyframe,
    /// A track mixes shape types across keyframes.
    MixedShapeTypes,
    /// A track is made of mask shapes, which cannot be interpolated.
    MaskTrack,
    /// A track's start frame is not its first keyframe's frame.
    TrackFrameMismatch,
    /// Two tracks share a non-zero id.
    DuplicateTrackId,

    // Geometry
    /// The point list does not fit the shape type.
    InvalidPointCount,
    /// A coordinate is NaN or infinite.
    PointsNotFinite,
    /// A mask's run lengths do not cover its bounding box.
    InconsistentMask,

    // Tags
    /// The same label is tagged twice on one frame.
    DuplicateTag,
}

/// Where in the IR an issue was found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IssueContext {
    /// The IR as a whole.
    Ir,
    /// A tag, by position.
    Tag { index: usize },
    /// A standalone shape, by position.
    Shape { index: usize },
    /// A track, by id.
    Track { id: u64 },
    /// A keyframe of a track.
    Keyframe { track_id: u64, frame: u64 },
    /// A skeleton element track of a parent track.
    Element { track_id: u64, element_id: u64 },
}

impl fmt::Display for IssueContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueContext::Ir => write!(f, "ir"),
            IssueContext::Tag { index } => write!(f, "tag #{}", index),
            IssueContext::Shape { index } => write!(f, "shape #{}", index),
            IssueContext::Track { id } => write!(f, "track {}", id),
            IssueContext::Keyframe { track_id, frame } => {
                write!(f, "track {} frame {}", track_id, frame)
            }
            IssueContext::Element {
                track_id,
                element_id,
            } => write!(f, "track {} element {}", track_id, element_id),
        }
    }
}

fn serialize_context<S: serde::Serializer>(
    context: &IssueContext,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(context)
}

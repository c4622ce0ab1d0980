//! Output types returned by the extraction pipeline.

use serde::Serialize;

/// The decoded field mapping pulled out of a model reply.
///
/// Keys are whatever the model returned (the prompt asks for six fixed
/// names, but aliases such as `"Name"` or `"Contact"` are tolerated
/// downstream); values may be strings, lists of strings, or null. No schema
/// is enforced beyond successful JSON decoding.
pub type FieldMap = serde_json::Map<String, serde_json::Value>;

/// Result of a full pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionOutput {
    /// The extracted field mapping. Present by construction: a run that
    /// produced no mapping returns an error instead of an output.
    pub fields: FieldMap,

    /// What the sink did with the mapping. A [`SinkOutcome::Failed`] here
    /// does not fail the run.
    pub sink: SinkOutcome,

    /// Timing and size counters for the run.
    pub stats: ExtractionStats,
}

/// Terminal state of the persistence stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkOutcome {
    /// The row was appended to the spreadsheet.
    Appended,
    /// No credential file was present; the mapping went to stdout.
    Printed,
    /// Spreadsheet mode was selected but the append failed. Logged, not
    /// escalated.
    Failed,
}

impl SinkOutcome {
    /// True only for [`SinkOutcome::Failed`].
    pub fn is_failure(&self) -> bool {
        matches!(self, SinkOutcome::Failed)
    }
}

/// Counters describing a single run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionStats {
    /// Characters of text read from page one.
    pub text_chars: usize,
    /// Characters in the raw model reply.
    pub reply_chars: usize,
    /// Wall-clock time spent waiting on the inference call.
    pub llm_duration_ms: u64,
    /// Wall-clock time for the whole pipeline.
    pub total_duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_failed_is_a_failure() {
        assert!(SinkOutcome::Failed.is_failure());
        assert!(!SinkOutcome::Appended.is_failure());
        assert!(!SinkOutcome::Printed.is_failure());
    }
}

//! Per-draft outcomes for operations run over many drafts.

use draftcut_common::DraftResult;
use serde::Serialize;

/// Result of one draft in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub draft: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Where the result was written, when it was written somewhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl BatchOutcome {
    pub fn succeeded(draft: impl Into<String>, output: Option<String>) -> Self {
        Self {
            draft: draft.into(),
            success: true,
            error: None,
            output,
        }
    }

    pub fn failed(draft: impl Into<String>, error: impl ToString) -> Self {
        Self {
            draft: draft.into(),
            success: false,
            error: Some(error.to_string()),
            output: None,
        }
    }

    pub fn from_result(draft: impl Into<String>, result: DraftResult<Option<String>>) -> Self {
        match result {
            Ok(output) => Self::succeeded(draft, output),
            Err(e) => Self::failed(draft, e),
        }
    }
}

/// Apply `op` to every `(label, item)` pair. A failure is recorded and the
/// batch moves on.
pub fn run_batch<T, F>(items: impl IntoIterator<Item = (String, T)>, mut op: F) -> Vec<BatchOutcome>
where
    F: FnMut(T) -> DraftResult<Option<String>>,
{
    items
        .into_iter()
        .map(|(label, item)| {
            let outcome = BatchOutcome::from_result(label, op(item));
            if let Some(error) = &outcome.error {
                tracing::warn!(draft = %outcome.draft, %error, "batch item failed");
            }
            outcome
        })
        .collect()
}

/// `(succeeded, failed)` counts.
pub fn summarize(outcomes: &[BatchOutcome]) -> (usize, usize) {
    let ok = outcomes.iter().filter(|o| o.success).count();
    (ok, outcomes.len() - ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use draftcut_common::DraftError;

    #[test]
    fn test_batch_continues_past_failures() {
        let items = vec![
            ("a".to_string(), 1),
            ("b".to_string(), 0),
            ("c".to_string(), 3),
        ];
        let outcomes = run_batch(items, |n| {
            if n == 0 {
                Err(DraftError::invalid("zero"))
            } else {
                Ok(Some(format!("out/{n}")))
            }
        });

        assert_eq!(outcomes.len(), 3);
        assert_eq!(summarize(&outcomes), (2, 1));
        assert!(!outcomes[1].success);
        assert_eq!(outcomes[1].error.as_deref(), Some("Invalid argument: zero"));
        assert_eq!(outcomes[2].output.as_deref(), Some("out/3"));
    }

    #[test]
    fn test_outcome_serialization_omits_empty_fields() {
        let value = serde_json::to_value(BatchOutcome::succeeded("d", None)).unwrap();
        assert_eq!(value, serde_json::json!({"draft": "d", "success": true}));
    }
}

//! Deriving chaos [`Hint`]s from a recorded workflow's `FillString` text
//! (§4.9), so a chaos run seeded from a recording starts with plausible
//! transaction codes instead of guessing blind.

use tn3270_chaos::Hint;
use tn3270_recording::WorkflowDocument;

/// A transaction candidate: 2-12 characters, only `A-Z0-9-_/`, at least
/// one letter, no whitespace.
fn is_transaction_candidate(text: &str) -> bool {
    let len = text.chars().count();
    if !(2..=12).contains(&len) {
        return false;
    }
    if text.chars().any(char::is_whitespace) {
        return false;
    }
    if !text
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/'))
    {
        return false;
    }
    text.chars().any(|c| c.is_ascii_alphabetic())
}

/// Extract candidate transaction codes and leftover known-good values
/// from every `FillString` step's text. One [`Hint`] is produced per
/// distinct transaction candidate, each carrying the full deduplicated
/// known-data list; an empty result means nothing in the workflow looked
/// like a transaction code or usable value.
pub fn extract_hints(doc: &WorkflowDocument) -> Vec<Hint> {
    let mut transactions: Vec<String> = Vec::new();
    let mut known_data: Vec<String> = Vec::new();

    for step in &doc.steps {
        if step.step_type != "FillString" {
            continue;
        }
        let Some(text) = step.text.as_deref().map(str::trim) else {
            continue;
        };
        if text.is_empty() {
            continue;
        }
        if is_transaction_candidate(text) {
            let upper = text.to_uppercase();
            if !transactions.contains(&upper) {
                transactions.push(upper);
            }
        } else if !known_data.iter().any(|v| v == text) {
            known_data.push(text.to_string());
        }
    }

    if transactions.is_empty() {
        if known_data.is_empty() {
            return Vec::new();
        }
        return vec![Hint {
            transaction: String::new(),
            known_data,
        }];
    }

    transactions
        .into_iter()
        .map(|transaction| Hint {
            transaction,
            known_data: known_data.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tn3270_recording::WorkflowStep;

    fn doc_with_fills(texts: &[&str]) -> WorkflowDocument {
        let mut doc = WorkflowDocument::new("h", 23);
        for text in texts {
            doc.steps.push(WorkflowStep::fill_string(1, 1, *text));
        }
        doc
    }

    #[test]
    fn short_alnum_text_becomes_a_transaction_hint() {
        let doc = doc_with_fills(&["ikjeft01"]);
        let hints = extract_hints(&doc);
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].transaction, "IKJEFT01");
    }

    #[test]
    fn long_or_whitespace_text_is_known_data_not_a_transaction() {
        let doc = doc_with_fills(&["this has spaces", "thisiswaytoolongforatransactioncode"]);
        let hints = extract_hints(&doc);
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].transaction, "");
        assert!(hints[0].known_data.contains(&"this has spaces".to_string()));
    }

    #[test]
    fn pure_digit_text_is_not_a_transaction_candidate() {
        let doc = doc_with_fills(&["123456"]);
        let hints = extract_hints(&doc);
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].transaction, "");
        assert_eq!(hints[0].known_data, vec!["123456".to_string()]);
    }

    #[test]
    fn empty_workflow_yields_no_hints() {
        let doc = WorkflowDocument::new("h", 23);
        assert!(extract_hints(&doc).is_empty());
    }

    #[test]
    fn multiple_transactions_each_carry_the_full_known_data_set() {
        let doc = doc_with_fills(&["IKJEFT01", "TSO", "account-999", "needs a space"]);
        let hints = extract_hints(&doc);
        assert_eq!(hints.len(), 3);
        for hint in &hints {
            assert_eq!(hint.known_data, vec!["needs a space".to_string()]);
        }
    }
}

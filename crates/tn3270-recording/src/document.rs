//! Reading and writing [`WorkflowDocument`]s as JSON.

use std::io::{Read, Write};

use crate::error::RecordingError;
use crate::types::WorkflowDocument;

/// Serialize a document to pretty-printed JSON and write it to `sink`.
pub fn write_document<W: Write>(sink: W, doc: &WorkflowDocument) -> Result<(), RecordingError> {
    serde_json::to_writer_pretty(sink, doc)?;
    Ok(())
}

/// Read and parse a document from `source`.
///
/// Unknown fields in the source JSON are ignored (forward compatibility —
/// see §6), since `serde`'s default `Deserialize` already skips keys it
/// doesn't recognize.
pub fn read_document<R: Read>(mut source: R) -> Result<WorkflowDocument, RecordingError> {
    let mut text = String::new();
    source.read_to_string(&mut text)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WorkflowStep;

    #[test]
    fn round_trips_through_json() {
        let mut doc = WorkflowDocument::new("mvs.example.com", 23);
        doc.steps.push(WorkflowStep::connect());
        doc.steps.push(WorkflowStep::fill_string(3, 11, "HELLO"));
        doc.steps.push(WorkflowStep::press("Enter"));
        doc.steps.push(WorkflowStep::disconnect());

        let mut buf = Vec::new();
        write_document(&mut buf, &doc).unwrap();
        let read_back = read_document(buf.as_slice()).unwrap();
        assert_eq!(read_back, doc);
    }

    #[test]
    fn unknown_fields_are_ignored_on_load() {
        let json = r#"{"Host":"h","Port":23,"EveryStepDelay":null,"EndOfTaskDelay":null,
            "Steps":[],"FutureField":"ignored"}"#;
        let doc = read_document(json.as_bytes()).unwrap();
        assert_eq!(doc.host, "h");
        assert!(doc.steps.is_empty());
    }
}

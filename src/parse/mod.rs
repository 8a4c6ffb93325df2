pub mod legacy;
pub mod structured;

use log::{debug, warn};
use thiserror::Error;

use crate::config::GraphOptions;
use crate::model::TimelineModel;
use crate::theme::Palette;

/// Fatal payload errors. A failing instance simply does not render;
/// other instances on the page are unaffected.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("task '{task}' references unknown person id '{id}'")]
    UnknownPerson { task: String, id: String },

    #[error("invalid date '{value}' (expected format '{format}')")]
    InvalidDate { value: String, format: String },

    #[error("malformed date line '{line}' in block '{group}'")]
    BadDateLine { group: String, line: String },

    #[error("malformed person line '{line}'")]
    BadPersonLine { line: String },

    #[error("block '{group}' ends before its date line")]
    IncompleteBlock { group: String },
}

/// Parse a raw payload into the timeline model.
///
/// The structured JSON grammar is tried first. When the payload is not
/// JSON at all, or is JSON of the wrong shape, the legacy line grammar
/// takes over; the two causes are kept apart in the log because a
/// schema-invalid structured payload usually means an authoring error,
/// not a legacy document. Semantic errors inside a grammar (bad dates,
/// unresolved person ids) are fatal and do not trigger the fallback.
pub fn parse_payload(
    text: &str,
    options: &GraphOptions,
    palette: &mut Palette,
) -> Result<TimelineModel, ParseError> {
    match serde_json::from_str::<structured::RawPayload>(text) {
        Ok(raw) => structured::build(raw, options, palette),
        Err(err) => {
            if err.classify() == serde_json::error::Category::Data {
                warn!(
                    "payload is JSON but not the structured grammar ({}); \
                     falling back to the legacy grammar",
                    err
                );
            } else {
                debug!("payload is not JSON ({}); using the legacy grammar", err);
            }
            legacy::parse(text, options, palette)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_payload_wins() {
        let text = r#"{"tasks":[{"taskName":"Alpha","from":"2024-01-01","to":"2024-01-03"}]}"#;
        let model =
            parse_payload(text, &GraphOptions::default(), &mut Palette::new()).unwrap();
        assert_eq!(model.tasks.len(), 1);
        assert_eq!(model.tasks[0].group, "Alpha");
    }

    #[test]
    fn non_json_falls_back_to_legacy() {
        let text = "Alpha, Kickoff\n2024-01-01 2024-01-05\nann\n";
        let model =
            parse_payload(text, &GraphOptions::default(), &mut Palette::new()).unwrap();
        assert_eq!(model.tasks.len(), 1);
        assert_eq!(model.people.len(), 1);
    }

    #[test]
    fn schema_invalid_json_also_falls_back() {
        // Valid JSON, wrong shape: the legacy parser then rejects it
        // because a JSON object is not a legacy block.
        let text = r#"{"rows": [1, 2, 3]}"#;
        let err = parse_payload(text, &GraphOptions::default(), &mut Palette::new());
        assert!(err.is_err());
    }
}

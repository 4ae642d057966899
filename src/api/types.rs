//! REST API types for frontend integration.

use serde_json::{json, Value};

use crate::error::PipelineError;
use crate::pipeline::PipelineSummary;

/// Media type for the generated workbook.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// JSON body returned when the pipeline rejects a request.
///
/// `input` names the upload the failure is attributed to, when there is one,
/// so the frontend can point at the right file field.
pub fn error_response(error: &PipelineError) -> Value {
    json!({
        "status": "error",
        "input": error.input(),
        "error": error.to_string(),
    })
}

/// JSON body for request-level failures before the pipeline runs.
pub fn bad_request(message: &str) -> Value {
    json!({
        "status": "error",
        "input": Value::Null,
        "error": message,
    })
}

/// Row counts echoed in response headers for quick frontend display.
pub fn summary_header(summary: &PipelineSummary) -> String {
    format!(
        "dock={};matera={};depara={}",
        summary.dock_rows, summary.matera_rows, summary.depara_rows
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NormalizeError, PipelineError};

    #[test]
    fn test_error_response_names_the_input() {
        let err = PipelineError::Depara(NormalizeError::HeaderNotFound { anchor: 2 }.into());
        let body = error_response(&err);
        assert_eq!(body["status"], "error");
        assert_eq!(body["input"], "Depara");
        assert!(body["error"].as_str().unwrap().contains("header"));
    }

    #[test]
    fn test_summary_header_format() {
        let summary = PipelineSummary {
            dock_rows: 3,
            matera_rows: 2,
            depara_rows: 5,
        };
        assert_eq!(summary_header(&summary), "dock=3;matera=2;depara=5");
    }
}

use std::fmt;

use fit_core::{FindRequest, SearchSummary, SortRequest};
use serde::{Deserialize, Serialize};

/// Error text for a request whose `action` is not recognised.
pub const UNKNOWN_ACTION: &str = "unknown action";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    FindCombinations,
    Sort,
}

impl Action {
    pub fn name(self) -> &'static str {
        match self {
            Action::FindCombinations => "findCombinations",
            Action::Sort => "sort",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `{ "action": ..., "payload": ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "camelCase")]
pub enum Request {
    FindCombinations(FindRequest),
    Sort(SortRequest),
}

impl Request {
    pub fn action(&self) -> Action {
        match self {
            Request::FindCombinations(_) => Action::FindCombinations,
            Request::Sort(_) => Action::Sort,
        }
    }

    /// Parses a request message. Failures come back as the terminal
    /// `Response` the caller should deliver instead of running anything.
    pub fn from_json(text: &str) -> Result<Request, Response> {
        let value: serde_json::Value = serde_json::from_str(text).map_err(|err| {
            Response::failed(Action::Sort, format!("malformed request: {err}"))
        })?;
        Request::from_value(value)
    }

    pub fn from_value(mut value: serde_json::Value) -> Result<Request, Response> {
        let action = match value.get("action").and_then(serde_json::Value::as_str) {
            Some("findCombinations") => Action::FindCombinations,
            Some("sort") => Action::Sort,
            // Unrecognised actions are reported under `sort`, the action the
            // front end falls back to.
            _ => return Err(Response::failed(Action::Sort, UNKNOWN_ACTION)),
        };
        let payload = value
            .get_mut("payload")
            .map(serde_json::Value::take)
            .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));
        let parsed = match action {
            Action::FindCombinations => {
                serde_json::from_value(payload).map(Request::FindCombinations)
            }
            Action::Sort => serde_json::from_value(payload).map(Request::Sort),
        };
        parsed.map_err(|err| Response::failed(action, format!("malformed payload: {err}")))
    }
}

/// Terminal payload: a search summary, or the echoed sort request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponsePayload {
    Search(SearchSummary),
    Sorted(SortRequest),
}

/// One message on a job's response channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireResponse", try_from = "WireResponse")]
pub enum Response {
    /// Running count of results found so far.
    Progress { action: Action, found: usize },
    Finished {
        action: Action,
        result: ResponsePayload,
    },
    Failed { action: Action, error: String },
}

impl Response {
    pub fn failed(action: Action, error: impl Into<String>) -> Self {
        Response::Failed {
            action,
            error: error.into(),
        }
    }

    pub fn action(&self) -> Action {
        match self {
            Response::Progress { action, .. }
            | Response::Finished { action, .. }
            | Response::Failed { action, .. } => *action,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Response::Progress { .. })
    }
}

/// Flat message shape: `{ action, isProgress?, progressValue?, result?, error? }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse {
    action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_progress: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    progress_value: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result: Option<ResponsePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<Response> for WireResponse {
    fn from(response: Response) -> Self {
        let mut wire = WireResponse {
            action: response.action(),
            is_progress: None,
            progress_value: None,
            result: None,
            error: None,
        };
        match response {
            Response::Progress { found, .. } => {
                wire.is_progress = Some(true);
                wire.progress_value = Some(found);
            }
            Response::Finished { result, .. } => {
                wire.is_progress = Some(false);
                wire.result = Some(result);
            }
            Response::Failed { error, .. } => wire.error = Some(error),
        }
        wire
    }
}

impl TryFrom<WireResponse> for Response {
    type Error = String;

    fn try_from(wire: WireResponse) -> Result<Self, Self::Error> {
        let action = wire.action;
        if let Some(error) = wire.error {
            return Ok(Response::Failed { action, error });
        }
        if wire.is_progress == Some(true) {
            let found = wire
                .progress_value
                .ok_or("progress message without progressValue")?;
            return Ok(Response::Progress { action, found });
        }
        match wire.result {
            Some(result) => Ok(Response::Finished { action, result }),
            None => Err("response carries neither result nor error".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fit_core::test_fixtures::{blank_result, dps, find_request};
    use fit_core::{Category, SortField, SortKey};
    use serde_json::json;

    #[test]
    fn find_request_round_trips_through_envelope() {
        let request = Request::FindCombinations(find_request(
            30.0,
            5.0,
            [dps(1, 10.0, 1.0, 1.1, 10.0)],
            &[(Category::Dps, 1)],
        ));
        let text = serde_json::to_string(&request).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["action"], "findCombinations");
        assert_eq!(value["payload"]["cpuBudget"], 30.0);
        assert_eq!(Request::from_json(&text), Ok(request));
    }

    #[test]
    fn unknown_action_is_reported() {
        let err = Request::from_value(json!({"action": "explode", "payload": {}})).unwrap_err();
        assert_eq!(err, Response::failed(Action::Sort, UNKNOWN_ACTION));
    }

    #[test]
    fn malformed_payload_keeps_the_action() {
        let err = Request::from_value(json!({
            "action": "findCombinations",
            "payload": {"cpuBudget": "lots"}
        }))
        .unwrap_err();
        assert_eq!(err.action(), Action::FindCombinations);
        assert!(err.is_terminal());
    }

    #[test]
    fn missing_payload_defaults_to_empty_request() {
        let request = Request::from_value(json!({"action": "sort"})).unwrap();
        assert_eq!(request, Request::Sort(SortRequest::default()));
    }

    #[test]
    fn progress_wire_shape() {
        let value = serde_json::to_value(Response::Progress {
            action: Action::FindCombinations,
            found: 12,
        })
        .unwrap();
        assert_eq!(
            value,
            json!({"action": "findCombinations", "isProgress": true, "progressValue": 12})
        );
    }

    #[test]
    fn error_wire_shape() {
        let value = serde_json::to_value(Response::failed(
            Action::FindCombinations,
            "Please enter valid budget and number of modules.",
        ))
        .unwrap();
        assert_eq!(
            value,
            json!({
                "action": "findCombinations",
                "error": "Please enter valid budget and number of modules."
            })
        );
    }

    #[test]
    fn finished_payloads_decode_to_the_right_variant() {
        let search = Response::Finished {
            action: Action::FindCombinations,
            result: ResponsePayload::Search(SearchSummary {
                results: vec![blank_result(0, &[(Category::Dps, 1)])],
                combinations_examined: 3,
            }),
        };
        let sorted = Response::Finished {
            action: Action::Sort,
            result: ResponsePayload::Sorted(SortRequest {
                results: vec![],
                sort_keys: vec![SortKey::asc(SortField::TotalCpu)],
                make_unique: true,
            }),
        };
        for response in [search, sorted] {
            let value = serde_json::to_value(&response).unwrap();
            assert_eq!(value["isProgress"], false);
            let back: Response = serde_json::from_value(value).unwrap();
            assert_eq!(back, response);
        }
    }

    #[test]
    fn message_without_outcome_is_rejected() {
        let parsed = serde_json::from_value::<Response>(json!({"action": "sort"}));
        assert!(parsed.is_err());
    }
}

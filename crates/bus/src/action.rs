use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Requests the popup sends to the page-side component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ActionRequest {
    /// Comma list mixing bare tag names and CSS selectors.
    HideElementsUnified { selector: String },
    ShowElementsUnified { selector: String },
    HideBareTagElements {
        #[serde(rename = "tagName")]
        tag_name: String,
    },
    ShowTagElements {
        #[serde(rename = "tagName")]
        tag_name: String,
    },
    ResetAll,
    GetHiddenElements,
}

const KNOWN_ACTIONS: [&str; 6] = [
    "hideElementsUnified",
    "showElementsUnified",
    "hideBareTagElements",
    "showTagElements",
    "resetAll",
    "getHiddenElements",
];

impl ActionRequest {
    pub fn action_name(&self) -> &'static str {
        match self {
            ActionRequest::HideElementsUnified { .. } => KNOWN_ACTIONS[0],
            ActionRequest::ShowElementsUnified { .. } => KNOWN_ACTIONS[1],
            ActionRequest::HideBareTagElements { .. } => KNOWN_ACTIONS[2],
            ActionRequest::ShowTagElements { .. } => KNOWN_ACTIONS[3],
            ActionRequest::ResetAll => KNOWN_ACTIONS[4],
            ActionRequest::GetHiddenElements => KNOWN_ACTIONS[5],
        }
    }
}

/// Decode a raw JSON message. Unknown or missing actions answer `Unknown action`; a known
/// action with a malformed payload answers with the decoding error.
pub fn decode_request(message: &Value) -> Result<ActionRequest, ActionResponse> {
    let action = message.get("action").and_then(Value::as_str);
    if !action.is_some_and(|a| KNOWN_ACTIONS.contains(&a)) {
        return Err(ActionResponse::unknown_action());
    }
    serde_json::from_value(message.clone()).map_err(|err| ActionResponse::Failed {
        error: err.to_string(),
    })
}

/// Page-side answers. On the wire every variant is an object with a `success` flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WireResponse", try_from = "WireResponse")]
pub enum ActionResponse {
    Changed {
        count: usize,
        message: String,
    },
    Listing {
        selectors: Vec<String>,
        tags: Vec<String>,
        count: usize,
    },
    Failed {
        error: String,
    },
}

impl ActionResponse {
    pub fn unknown_action() -> Self {
        ActionResponse::Failed {
            error: "Unknown action".to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, ActionResponse::Failed { .. })
    }

    pub fn count(&self) -> Option<usize> {
        match self {
            ActionResponse::Changed { count, .. } | ActionResponse::Listing { count, .. } => {
                Some(*count)
            }
            ActionResponse::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ActionResponse::Failed { error } => Some(error),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct WireResponse {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selectors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<ActionResponse> for WireResponse {
    fn from(response: ActionResponse) -> Self {
        match response {
            ActionResponse::Changed { count, message } => WireResponse {
                success: true,
                count: Some(count),
                message: Some(message),
                ..WireResponse::default()
            },
            ActionResponse::Listing {
                selectors,
                tags,
                count,
            } => WireResponse {
                success: true,
                count: Some(count),
                selectors: Some(selectors),
                tags: Some(tags),
                ..WireResponse::default()
            },
            ActionResponse::Failed { error } => WireResponse {
                success: false,
                error: Some(error),
                ..WireResponse::default()
            },
        }
    }
}

impl TryFrom<WireResponse> for ActionResponse {
    type Error = String;

    fn try_from(wire: WireResponse) -> Result<Self, Self::Error> {
        if !wire.success {
            return Ok(ActionResponse::Failed {
                error: wire.error.unwrap_or_default(),
            });
        }
        if wire.selectors.is_some() || wire.tags.is_some() {
            return Ok(ActionResponse::Listing {
                selectors: wire.selectors.unwrap_or_default(),
                tags: wire.tags.unwrap_or_default(),
                count: wire.count.unwrap_or_default(),
            });
        }
        let count = wire
            .count
            .ok_or_else(|| "successful response is missing `count`".to_string())?;
        Ok(ActionResponse::Changed {
            count,
            message: wire.message.unwrap_or_default(),
        })
    }
}

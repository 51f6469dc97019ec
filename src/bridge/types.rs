use crate::config::PresentationConfig;
use crate::platform::ScanRequest;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Correlates one command invocation with its single terminal result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(Uuid);

impl CallbackId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CallbackId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One command object received from the hybrid-app bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandInvocation {
    pub command: String,
    #[serde(flatten)]
    pub args: Map<String, Value>,
}

impl CommandInvocation {
    pub fn new<S: Into<String>>(command: S) -> Self {
        Self {
            command: command.into(),
            args: Map::new(),
        }
    }

    /// A startScanner invocation carrying the request's presentational
    /// fields as named arguments.
    pub fn start_scanner(request: &ScanRequest) -> Self {
        let args = match serde_json::to_value(request) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        Self {
            command: "startScanner".to_string(),
            args,
        }
    }

    pub fn stop_scanner() -> Self {
        Self::new("stopScanner")
    }

    pub fn with_arg<S: Into<String>>(mut self, key: S, value: Value) -> Self {
        self.args.insert(key.into(), value);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Ok,
    Error,
}

/// Terminal result delivered on the hybrid-app command-result channel.
///
/// Exactly one is produced per invocation. Errors carry a machine-readable
/// reason code rather than a bare status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub status: ResultStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CommandResult {
    pub fn ok() -> Self {
        Self {
            status: ResultStatus::Ok,
            value: None,
            reason: None,
        }
    }

    pub fn ok_with_value<S: Into<String>>(value: S) -> Self {
        Self {
            status: ResultStatus::Ok,
            value: Some(value.into()),
            reason: None,
        }
    }

    pub fn error<S: Into<String>>(reason: S) -> Self {
        Self {
            status: ResultStatus::Error,
            value: None,
            reason: Some(reason.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ResultStatus::Ok
    }
}

/// Build a ScanRequest from named command arguments, falling back to the
/// configured defaults field by field. An argument of the wrong type counts
/// as absent, matching what hosting apps have historically tolerated.
pub(crate) fn scan_request_from_args(
    args: &Map<String, Value>,
    defaults: &PresentationConfig,
) -> ScanRequest {
    ScanRequest {
        screen_title: string_arg(args, "screenTitle")
            .unwrap_or_else(|| defaults.screen_title.clone()),
        display_text: string_arg(args, "displayText")
            .unwrap_or_else(|| defaults.display_text.clone()),
        display_text_color: string_arg(args, "displayTextColor")
            .unwrap_or_else(|| defaults.display_text_color.clone()),
        button_text: string_arg(args, "buttonText")
            .unwrap_or_else(|| defaults.button_text.clone()),
        show_cancel_button: bool_arg(args, "showCancelButton")
            .or_else(|| bool_arg(args, "showButton"))
            .unwrap_or(defaults.show_cancel_button),
        is_right_to_left: bool_arg(args, "isRightToLeft")
            .or_else(|| bool_arg(args, "isRtl"))
            .unwrap_or(defaults.is_right_to_left),
    }
}

fn string_arg(args: &Map<String, Value>, key: &str) -> Option<String> {
    args.get(key).and_then(Value::as_str).map(str::to_string)
}

fn bool_arg(args: &Map<String, Value>, key: &str) -> Option<bool> {
    args.get(key).and_then(Value::as_bool)
}

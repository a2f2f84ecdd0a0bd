//! Inline button payloads.
//!
//! Button presses arrive as `action_id_value...`. The first two segments are
//! fixed; everything after the second `_` is the value, so status tokens that
//! themselves contain `_` (like `in_work`) survive the split.

use std::fmt;

use leadbot_models::{LeadId, LeadStatus};

use crate::error::CallbackError;

/// Raw `action_id_value` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackData {
    pub action: String,
    pub id: LeadId,
    pub value: String,
}

impl CallbackData {
    /// Splits a payload. A missing id segment or a non-integer id is an error;
    /// a missing value yields `""`.
    pub fn parse(data: &str) -> Result<Self, CallbackError> {
        let mut parts = data.splitn(3, '_');
        let action = parts.next().unwrap_or_default();
        let id = parts
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CallbackError::MissingId(data.to_string()))?;
        let id = id
            .parse::<i64>()
            .map(LeadId)
            .map_err(|_| CallbackError::InvalidId(id.to_string()))?;
        let value = parts.next().unwrap_or_default();

        Ok(Self {
            action: action.to_string(),
            id,
            value: value.to_string(),
        })
    }
}

/// A decoded operator action on one lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadAction {
    SetStatus { id: LeadId, status: LeadStatus },
    Delete { id: LeadId },
    AddNote { id: LeadId },
}

impl LeadAction {
    /// Parses and decodes a button payload in one step.
    pub fn decode(data: &str) -> Result<Self, CallbackError> {
        CallbackData::parse(data)?.try_into()
    }

    pub fn lead_id(&self) -> LeadId {
        match *self {
            LeadAction::SetStatus { id, .. } | LeadAction::Delete { id } | LeadAction::AddNote { id } => id,
        }
    }
}

impl TryFrom<CallbackData> for LeadAction {
    type Error = CallbackError;

    fn try_from(data: CallbackData) -> Result<Self, Self::Error> {
        match data.action.as_str() {
            "status" => {
                let status = data
                    .value
                    .parse::<LeadStatus>()
                    .map_err(|e| CallbackError::UnknownStatus(e.0))?;
                Ok(LeadAction::SetStatus { id: data.id, status })
            }
            "delete" => Ok(LeadAction::Delete { id: data.id }),
            "note" => Ok(LeadAction::AddNote { id: data.id }),
            other => Err(CallbackError::UnknownAction(other.to_string())),
        }
    }
}

/// Encodes the payload placed on a button.
impl fmt::Display for LeadAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeadAction::SetStatus { id, status } => write!(f, "status_{}_{}", id, status.as_str()),
            LeadAction::Delete { id } => write!(f, "delete_{}", id),
            LeadAction::AddNote { id } => write!(f, "note_{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_keeps_underscores() {
        let data = CallbackData::parse("status_42_in_work").unwrap();
        assert_eq!(data.action, "status");
        assert_eq!(data.id, LeadId(42));
        assert_eq!(data.value, "in_work");
    }

    #[test]
    fn test_trailing_separator_gives_empty_value() {
        let data = CallbackData::parse("status_42_").unwrap();
        assert_eq!(data.value, "");
        assert_eq!(
            LeadAction::try_from(data),
            Err(CallbackError::UnknownStatus(String::new()))
        );
    }

    #[test]
    fn test_missing_or_bad_id() {
        assert!(matches!(CallbackData::parse("delete"), Err(CallbackError::MissingId(_))));
        assert!(matches!(CallbackData::parse("delete_"), Err(CallbackError::MissingId(_))));
        assert_eq!(
            CallbackData::parse("delete_abc"),
            Err(CallbackError::InvalidId("abc".to_string()))
        );
    }

    #[test]
    fn test_decode_actions() {
        assert_eq!(
            LeadAction::decode("status_7_done").unwrap(),
            LeadAction::SetStatus { id: LeadId(7), status: LeadStatus::Done }
        );
        assert_eq!(LeadAction::decode("delete_7").unwrap(), LeadAction::Delete { id: LeadId(7) });
        assert_eq!(LeadAction::decode("note_7").unwrap(), LeadAction::AddNote { id: LeadId(7) });
        assert_eq!(
            LeadAction::decode("archive_7"),
            Err(CallbackError::UnknownAction("archive".to_string()))
        );
        assert_eq!(
            LeadAction::decode("status_7_closed"),
            Err(CallbackError::UnknownStatus("closed".to_string()))
        );
    }

    #[test]
    fn test_encoding_decodes_back() {
        let actions = [
            LeadAction::SetStatus { id: LeadId(3), status: LeadStatus::InWork },
            LeadAction::Delete { id: LeadId(3) },
            LeadAction::AddNote { id: LeadId(3) },
        ];
        for action in actions {
            assert_eq!(LeadAction::decode(&action.to_string()).unwrap(), action);
        }
        assert_eq!(actions[0].to_string(), "status_3_in_work");
    }
}

//! Derived-action construction

use serde_json::Value;

use crate::action::Action;

/// Inputs for building one derived lifecycle action.
#[derive(Debug)]
pub struct BuildAction<'a> {
    /// Base action type name.
    pub base: &'a str,
    /// Lifecycle token appended to the base type.
    pub async_type: &'a str,
    /// Separator between base type and token.
    pub delimiter: &'a str,
    /// Payload, dropped when null so consumers see "no payload" rather than
    /// a null one.
    pub payload: Option<Value>,
    /// Metadata copied verbatim from the originating action, when present.
    pub meta: Option<Value>,
    /// Marks the payload as an error value. Only ever emitted as `true`.
    pub error: bool,
}

/// Build a derived action with type `base + delimiter + async_type`.
///
/// Inclusion is asymmetric on purpose: a fulfilled action whose settled value
/// is null carries no payload field at all, metadata appears only when the
/// source action defined it, and `error` appears only when true.
pub fn build_action(parts: BuildAction<'_>) -> Action {
    let BuildAction {
        base,
        async_type,
        delimiter,
        payload,
        meta,
        error,
    } = parts;

    Action {
        kind: format!("{base}{delimiter}{async_type}"),
        payload: payload.filter(|value| !value.is_null()),
        meta,
        error,
    }
}

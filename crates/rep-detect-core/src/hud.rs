use std::collections::HashMap;

use serde::Serialize;

/// Diagnostic value carried in [`FrameHud::extra`].
///
/// A closed sum type instead of an untyped map value keeps the renderer
/// boundary precise: every entry is a number, a flag, or a short label.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DiagValue {
    Float(f32),
    Int(i64),
    Bool(bool),
    Text(String),
}

impl From<f32> for DiagValue {
    fn from(v: f32) -> Self {
        DiagValue::Float(v)
    }
}

impl From<i64> for DiagValue {
    fn from(v: i64) -> Self {
        DiagValue::Int(v)
    }
}

impl From<bool> for DiagValue {
    fn from(v: bool) -> Self {
        DiagValue::Bool(v)
    }
}

impl From<&str> for DiagValue {
    fn from(v: &str) -> Self {
        DiagValue::Text(v.to_owned())
    }
}

/// Per-frame display state returned by every `on_frame` call.
///
/// Safe to render at any time: when no repetition is in progress (or input
/// was unusable) `angle_deg` is `None` and the counters simply repeat their
/// last values.
#[derive(Clone, Debug, Serialize)]
pub struct FrameHud {
    pub angle_deg: Option<f32>,
    pub state: &'static str,
    pub hold_sec: f32,
    pub success: u32,
    pub fail: u32,
    /// Open-ended diagnostics for overlays (baseline endpoints, peak delta,
    /// smoothed fps, ...). Keys are stable per detector.
    pub extra: HashMap<&'static str, DiagValue>,
}

impl FrameHud {
    /// HUD with no measurable angle this frame.
    pub fn empty(state: &'static str, hold_sec: f32, success: u32, fail: u32) -> Self {
        Self {
            angle_deg: None,
            state,
            hold_sec,
            success,
            fail,
            extra: HashMap::new(),
        }
    }

    pub fn with_extra(mut self, key: &'static str, value: impl Into<DiagValue>) -> Self {
        self.extra.insert(key, value.into());
        self
    }
}

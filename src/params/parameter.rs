use std::{fmt, path::PathBuf, sync::Arc};

use crate::{
    curve::naming::TempNamer,
    envelope::{mapping::ValueMapping, model::Envelope},
    foundation::error::CdpResult,
};

/// One generated command-line argument.
///
/// `cleanup` names a file the argument refers to that must be deleted when the render
/// attempt ends.
#[derive(Clone, Debug, PartialEq)]
pub struct CommandArg {
    pub text: String,
    pub cleanup: Option<PathBuf>,
}

impl CommandArg {
    pub fn inline(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            cleanup: None,
        }
    }

    pub fn file(text: impl Into<String>, path: PathBuf) -> Self {
        Self {
            text: text.into(),
            cleanup: Some(path),
        }
    }
}

/// Where an automated parameter's curve times come from.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeScaling {
    /// Curve times are multiplied by another parameter's current value (for example an
    /// output-duration parameter of a process that changes the file length).
    ParameterValue { index: usize },
    Constant { seconds: f64 },
}

pub type FormatterFn = dyn Fn(&Parameter, &TempNamer) -> CdpResult<CommandArg> + Send + Sync;

/// Caller-supplied argument formatter.
#[derive(Clone)]
pub struct CustomFormatter(pub Arc<FormatterFn>);

impl CustomFormatter {
    pub fn new(
        f: impl Fn(&Parameter, &TempNamer) -> CdpResult<CommandArg> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(f))
    }
}

impl fmt::Debug for CustomFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomFormatter(..)")
    }
}

/// Overrides the default inline-number / curve-file argument generation.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgFormatter {
    /// Write `current_value` into a one-line text file and pass the file path.
    ValueFile,
    #[serde(skip)]
    Custom(CustomFormatter),
}

/// A processor parameter: a scalar value plus an optional automation envelope.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Parameter {
    pub name: String,
    pub current_value: f64,
    pub default_value: f64,
    pub min: f64,
    pub max: f64,
    #[serde(default = "default_step")]
    pub step: f64,
    #[serde(default)]
    pub can_automate: bool,
    #[serde(default)]
    pub automation_enabled: bool,
    #[serde(default)]
    pub command_prefix: String,
    #[serde(default)]
    pub skew: Option<f64>,
    #[serde(default)]
    pub envelope: Envelope,
    /// Normalized-to-scaled mapping; `min..max` linear when absent.
    #[serde(default)]
    pub mapping: Option<ValueMapping>,
    #[serde(default)]
    pub time_scaling: Option<TimeScaling>,
    #[serde(default)]
    pub formatter: Option<ArgFormatter>,
}

fn default_step() -> f64 {
    0.05
}

impl Parameter {
    pub fn new(name: impl Into<String>, default_value: f64, min: f64, max: f64) -> Self {
        let name = name.into();
        Self {
            envelope: Envelope::new(name.clone(), min, max),
            name,
            current_value: default_value,
            default_value,
            min,
            max,
            step: default_step(),
            can_automate: false,
            automation_enabled: false,
            command_prefix: String::new(),
            skew: None,
            mapping: None,
            time_scaling: None,
            formatter: None,
        }
    }

    pub fn automatable(mut self) -> Self {
        self.can_automate = true;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.command_prefix = prefix.into();
        self
    }

    pub fn with_skew(mut self, skew: f64) -> Self {
        self.skew = Some(skew);
        self
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    pub fn with_formatter(mut self, formatter: ArgFormatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    pub fn with_time_scaling(mut self, scaling: TimeScaling) -> Self {
        self.time_scaling = Some(scaling);
        self
    }

    pub fn slider_mapping(&self) -> ValueMapping {
        self.mapping.unwrap_or(ValueMapping::linear(self.min, self.max))
    }

    /// Map a normalized envelope value into this parameter's units.
    pub fn scale(&self, normalized: f64) -> f64 {
        self.slider_mapping().to_scaled(normalized)
    }

    /// True when the envelope, not `current_value`, drives the argument.
    ///
    /// Only `automation_enabled` counts here; `can_automate` is an editing capability.
    pub fn is_automated(&self) -> bool {
        self.automation_enabled
    }

    pub fn set_value(&mut self, value: f64) {
        self.current_value = value.clamp(self.min.min(self.max), self.max.max(self.min));
    }

    /// `command_prefix` followed by the formatted value.
    pub fn prefixed(&self, value: impl fmt::Display) -> String {
        format!("{}{}", self.command_prefix, value)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/params/parameter.rs"]
mod tests;

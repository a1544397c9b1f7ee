use crate::params::parameter::Parameter;

pub const PRE_VOLUME: usize = 0;
pub const FFT_SIZE: usize = 1;
pub const FFT_OVERLAP: usize = 2;

/// A CDP program invocation template plus its parameters.
///
/// Index 0 is always the implicit "Pre volume" gain in dB. Spectral processors also carry
/// "FFT Size" and "FFT Overlap" at indices 1 and 2, used only by the analysis stage; the
/// main program's arguments start after them (see [`ProcessorDescriptor::main_param_offset`]).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(from = "ProcessorDef", into = "ProcessorDef")]
pub struct ProcessorDescriptor {
    pub title: String,
    pub program: String,
    pub sub_command: String,
    pub mode: Option<String>,
    pub is_spectral: bool,
    pub mono_only: bool,
    pub changes_duration: bool,
    pub parameters: Vec<Parameter>,
    /// Set by edits that should trigger a re-render.
    pub dirty: bool,
}

impl ProcessorDescriptor {
    pub fn new(
        title: impl Into<String>,
        program: impl Into<String>,
        sub_command: impl Into<String>,
        mode: Option<&str>,
        is_spectral: bool,
    ) -> Self {
        let mut parameters = vec![Parameter::new("Pre volume", 0.0, -12.0, 12.0).automatable()];
        if is_spectral {
            parameters.push(
                Parameter::new("FFT Size", 1024.0, 128.0, 8192.0)
                    .with_prefix("-c")
                    .with_step(1.0),
            );
            parameters.push(
                Parameter::new("FFT Overlap", 3.0, 1.0, 4.0)
                    .with_prefix("-o")
                    .with_step(1.0),
            );
        }
        Self {
            title: title.into(),
            program: program.into(),
            sub_command: sub_command.into(),
            mode: mode.map(str::to_owned),
            is_spectral,
            mono_only: is_spectral,
            changes_duration: false,
            parameters,
            dirty: false,
        }
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn mono_only(mut self) -> Self {
        self.mono_only = true;
        self
    }

    pub fn changes_duration(mut self) -> Self {
        self.changes_duration = true;
        self
    }

    /// Index of the first parameter passed to the main program.
    pub fn main_param_offset(&self) -> usize {
        if self.is_spectral { FFT_OVERLAP + 1 } else { PRE_VOLUME + 1 }
    }

    pub fn main_parameters(&self) -> &[Parameter] {
        self.parameters
            .get(self.main_param_offset()..)
            .unwrap_or_default()
    }

    /// Spectral processors always run per channel.
    pub fn requires_mono(&self) -> bool {
        self.mono_only || self.is_spectral
    }

    pub fn pre_volume_db(&self) -> f64 {
        self.parameters
            .get(PRE_VOLUME)
            .map_or(0.0, |p| p.current_value)
    }

    /// `(window size, overlap)` for the analysis stage, rounded to integers.
    pub fn fft_settings(&self) -> Option<(u32, u32)> {
        if !self.is_spectral {
            return None;
        }
        let size = self.parameters.get(FFT_SIZE)?.current_value.round().max(1.0) as u32;
        let overlap = self.parameters.get(FFT_OVERLAP)?.current_value.round().max(1.0) as u32;
        Some((size, overlap))
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn parameter_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        let found = self.parameters.iter_mut().find(|p| p.name == name);
        if found.is_some() {
            self.dirty = true;
        }
        found
    }

    /// Set a parameter's current value by name, clamped to its range.
    pub fn set_value(&mut self, name: &str, value: f64) -> bool {
        match self.parameter_mut(name) {
            Some(p) => {
                p.set_value(value);
                true
            }
            None => false,
        }
    }
}

/// Serialized form: the implicit parameters appear as plain fields so job files only list
/// the program's own parameters.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
struct ProcessorDef {
    title: String,
    program: String,
    sub_command: String,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    spectral: bool,
    #[serde(default)]
    mono_only: bool,
    #[serde(default)]
    changes_duration: bool,
    #[serde(default)]
    pre_volume: Option<Parameter>,
    #[serde(default)]
    fft_size: Option<f64>,
    #[serde(default)]
    fft_overlap: Option<f64>,
    #[serde(default)]
    parameters: Vec<Parameter>,
}

impl From<ProcessorDef> for ProcessorDescriptor {
    fn from(def: ProcessorDef) -> Self {
        let mut out = Self::new(
            def.title,
            def.program,
            def.sub_command,
            def.mode.as_deref(),
            def.spectral,
        );
        out.mono_only |= def.mono_only;
        out.changes_duration = def.changes_duration;
        if let Some(pre) = def.pre_volume {
            out.parameters[PRE_VOLUME] = pre;
        }
        if out.is_spectral {
            if let Some(size) = def.fft_size {
                out.parameters[FFT_SIZE].set_value(size);
            }
            if let Some(overlap) = def.fft_overlap {
                out.parameters[FFT_OVERLAP].set_value(overlap);
            }
        }
        out.parameters.extend(def.parameters);
        out
    }
}

impl From<ProcessorDescriptor> for ProcessorDef {
    fn from(desc: ProcessorDescriptor) -> Self {
        let offset = desc.main_param_offset();
        let fft = desc.fft_settings();
        let mut params = desc.parameters;
        let main = if params.len() > offset {
            params.split_off(offset)
        } else {
            Vec::new()
        };
        let pre_volume = if params.is_empty() {
            None
        } else {
            Some(params.swap_remove(PRE_VOLUME))
        };
        Self {
            title: desc.title,
            program: desc.program,
            sub_command: desc.sub_command,
            mode: desc.mode,
            spectral: desc.is_spectral,
            mono_only: desc.mono_only,
            changes_duration: desc.changes_duration,
            pre_volume,
            fft_size: fft.map(|(s, _)| f64::from(s)),
            fft_overlap: fft.map(|(_, o)| f64::from(o)),
            parameters: main,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/params/processor.rs"]
mod tests;

use crate::{
    foundation::core::{TimeRange, fuzzy_is_zero},
    params::processor::{PRE_VOLUME, ProcessorDescriptor},
};

#[derive(Clone, Copy, Debug, PartialEq)]
/// One step of a [`RenderPlan`].
pub enum Stage {
    /// Trim the source to the selected window.
    Cut { window: TimeRange },
    /// Mix every channel down to one.
    MonoDownmix,
    /// Apply the processor's "Pre volume" gain.
    PreGain,
    /// Write one mono file per channel; later stages run once per channel.
    ChannelSplit { channels: u32 },
    /// Phase-vocoder analysis into `.ana` files.
    SpectralAnalysis { window_size: u32, overlap: u32 },
    /// The processor's own program.
    MainTransform,
    /// Phase-vocoder resynthesis back to sound files.
    SpectralResynthesis,
    /// Interleave the per-channel results into one file.
    ChannelMerge,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cut { .. } => "cut",
            Self::MonoDownmix => "mono downmix",
            Self::PreGain => "pre gain",
            Self::ChannelSplit { .. } => "channel split",
            Self::SpectralAnalysis { .. } => "spectral analysis",
            Self::MainTransform => "main transform",
            Self::SpectralResynthesis => "spectral resynthesis",
            Self::ChannelMerge => "channel merge",
        }
    }

    /// Progress line emitted once the stage has finished.
    pub fn status_ok(&self) -> &'static str {
        match self {
            Self::Cut { .. } => "Cut OK...",
            Self::MonoDownmix => "Mono mixdown OK...",
            Self::PreGain => "Volume adjust OK...",
            Self::ChannelSplit { .. } => "Split file OK...",
            Self::SpectralAnalysis { .. } => "PVOC analysis OK...",
            Self::MainTransform => "Main processing OK...",
            Self::SpectralResynthesis => "PVOC resynth OK...",
            Self::ChannelMerge => "Merge OK...",
        }
    }
}

/// The ordered stage list for one render attempt, decided before anything runs.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderPlan {
    pub stages: Vec<Stage>,
    /// Number of parallel lanes (channel files) the middle stages run over.
    pub lanes: u32,
}

impl RenderPlan {
    /// Shape the pipeline from processor capabilities and the source channel count.
    ///
    /// Split and merge appear together or not at all; analysis and resynthesis likewise.
    pub fn build(
        processor: &ProcessorDescriptor,
        channels: u32,
        window: TimeRange,
        downmix: bool,
    ) -> Self {
        let mut stages = vec![Stage::Cut { window }];
        let mut channels = channels.max(1);
        if downmix && channels > 1 {
            stages.push(Stage::MonoDownmix);
            channels = 1;
        }
        if needs_pre_gain(processor) {
            stages.push(Stage::PreGain);
        }
        let split = processor.requires_mono() && channels > 1;
        if split {
            stages.push(Stage::ChannelSplit { channels });
        }
        let fft = processor.fft_settings();
        if let Some((window_size, overlap)) = fft {
            stages.push(Stage::SpectralAnalysis {
                window_size,
                overlap,
            });
        }
        stages.push(Stage::MainTransform);
        if fft.is_some() {
            stages.push(Stage::SpectralResynthesis);
        }
        if split {
            stages.push(Stage::ChannelMerge);
        }
        Self {
            stages,
            lanes: if split { channels } else { 1 },
        }
    }

    pub fn contains(&self, pred: impl Fn(&Stage) -> bool) -> bool {
        self.stages.iter().any(pred)
    }
}

fn needs_pre_gain(processor: &ProcessorDescriptor) -> bool {
    processor
        .parameters
        .get(PRE_VOLUME)
        .is_some_and(|p| p.is_automated() || !fuzzy_is_zero(p.current_value))
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;

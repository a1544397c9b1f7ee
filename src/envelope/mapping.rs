/// Conversion between normalized `[0, 1]` envelope values and a parameter's scaled range.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueMapping {
    #[default]
    Identity,
    Linear {
        min: f64,
        max: f64,
    },
    /// Linear range with a power skew on the normalized side; `skew < 1` spends more of the
    /// normalized range on the low end.
    Skewed {
        min: f64,
        max: f64,
        skew: f64,
    },
}

impl ValueMapping {
    pub fn linear(min: f64, max: f64) -> Self {
        Self::Linear { min, max }
    }

    pub fn to_scaled(self, normalized: f64) -> f64 {
        match self {
            Self::Identity => normalized,
            Self::Linear { min, max } => min + (max - min) * normalized,
            Self::Skewed { min, max, skew } => {
                let x = normalized.clamp(0.0, 1.0);
                let shaped = if skew > 0.0 && x > 0.0 {
                    (x.ln() / skew).exp()
                } else {
                    x
                };
                min + (max - min) * shaped
            }
        }
    }

    pub fn to_normalized(self, scaled: f64) -> f64 {
        match self {
            Self::Identity => scaled,
            Self::Linear { min, max } => {
                let range = max - min;
                if range == 0.0 {
                    0.0
                } else {
                    (scaled - min) / range
                }
            }
            Self::Skewed { min, max, skew } => {
                let range = max - min;
                if range == 0.0 {
                    return 0.0;
                }
                let x = ((scaled - min) / range).clamp(0.0, 1.0);
                if skew > 0.0 && x > 0.0 {
                    (x.ln() * skew).exp()
                } else {
                    x
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/envelope/mapping.rs"]
mod tests;

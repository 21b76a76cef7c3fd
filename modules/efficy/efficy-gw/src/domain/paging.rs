use crate::config::EfficyConfig;

/// Page size bounds taken from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    default: u32,
    max: u32,
}

impl PageLimits {
    #[must_use]
    pub fn from_config(cfg: &EfficyConfig) -> Self {
        Self {
            default: cfg.effective_default_page_size(),
            max: cfg.effective_max_page_size(),
        }
    }

    /// `0` means "not given" and falls back to the default; anything else is capped.
    #[must_use]
    pub fn clamp(self, requested: u32) -> u32 {
        if requested == 0 {
            self.default
        } else {
            requested.min(self.max)
        }
    }

    /// Parse a raw `pageSize` parameter. Missing, non-numeric and non-positive values
    /// fall back to the default.
    #[must_use]
    pub fn parse(self, raw: Option<&str>) -> u32 {
        let requested = raw
            .and_then(|value| value.trim().parse::<i64>().ok())
            .filter(|value| *value > 0)
            .map_or(0, |value| u32::try_from(value).unwrap_or(u32::MAX));
        self.clamp(requested)
    }
}

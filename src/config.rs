use std::{fs::File, io::BufReader, path::Path, path::PathBuf, time::Duration};

use crate::{
    assets::{loader::LoadOpts, source::DirFrameSource},
    foundation::{
        core::Rgba8,
        error::{ReelError, ReelResult},
    },
    footer::FooterConfig,
    navbar::NavConfig,
    overlay::panels::{OverlayController, PanelSpec, default_panels},
    render::filter::FrameFilter,
};

/// Largest sequence the 3-digit file template can address.
pub const MAX_FRAMES: usize = 999;

/// Where the frame sequence lives and how long it is.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FramesConfig {
    pub count: usize,
    pub dir: PathBuf,
    pub template: String,
    pub extension: String,
}

impl Default for FramesConfig {
    fn default() -> Self {
        Self {
            count: 240,
            dir: PathBuf::from("sequence"),
            template: "ezgif-frame".to_owned(),
            extension: "jpg".to_owned(),
        }
    }
}

impl FramesConfig {
    /// Directory source for this sequence, with `dir` resolved against `base` when relative.
    pub fn dir_source(&self, base: Option<&Path>) -> DirFrameSource {
        let dir = match base {
            Some(base) if self.dir.is_relative() => base.join(&self.dir),
            _ => self.dir.clone(),
        };
        DirFrameSource::new(dir, self.template.clone(), self.extension.clone())
    }
}

/// Geometry of the scroll container.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrollConfig {
    /// Container height in viewport heights (`800vh` is `8.0`).
    pub container_vh: f64,
    /// Document offset of the container's top edge.
    pub container_top: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            container_vh: 8.0,
            container_top: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub background: Rgba8,
    /// Cosmetic image filter; `null` disables it.
    pub filter: Option<FrameFilter>,
    /// Frame paints kept by CPU surfaces.
    pub paint_cache: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: Rgba8::opaque(0x05, 0x05, 0x05),
            filter: Some(FrameFilter::default()),
            paint_cache: 32,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    pub concurrency: usize,
    /// Per-attempt deadline in milliseconds; `null` waits forever.
    pub timeout_ms: Option<u64>,
    pub retries: u32,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        let opts = LoadOpts::default();
        Self {
            concurrency: opts.concurrency,
            timeout_ms: opts.timeout.map(|t| t.as_millis() as u64),
            retries: opts.retries,
        }
    }
}

impl LoaderConfig {
    pub fn to_load_opts(&self) -> LoadOpts {
        LoadOpts {
            concurrency: self.concurrency,
            timeout: self.timeout_ms.map(Duration::from_millis),
            retries: self.retries,
        }
    }
}

/// Complete player configuration. Every field is optional in JSON.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReelConfig {
    pub frames: FramesConfig,
    pub scroll: ScrollConfig,
    pub render: RenderConfig,
    pub navbar: NavConfig,
    pub panels: Vec<PanelSpec>,
    pub footer: FooterConfig,
    pub loader: LoaderConfig,
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self {
            frames: FramesConfig::default(),
            scroll: ScrollConfig::default(),
            render: RenderConfig::default(),
            navbar: NavConfig::default(),
            panels: default_panels(),
            footer: FooterConfig::default(),
            loader: LoaderConfig::default(),
        }
    }
}

impl ReelConfig {
    /// Parse and validate a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ReelResult<Self> {
        let config: Self = serde_json::from_reader(r)
            .map_err(|e| ReelError::config(format!("parse config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> ReelResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .map_err(|e| ReelError::config(format!("open config '{}': {e}", path.display())))?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn to_json_pretty(&self) -> ReelResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ReelError::config(format!("serialize config: {e}")))
    }

    pub fn validate(&self) -> ReelResult<()> {
        let frames = &self.frames;
        if frames.count == 0 || frames.count > MAX_FRAMES {
            return Err(ReelError::config(format!(
                "frames.count must be in 1..={MAX_FRAMES}, got {}",
                frames.count
            )));
        }
        if frames.template.is_empty() || frames.extension.is_empty() {
            return Err(ReelError::config(
                "frames.template and frames.extension must not be empty",
            ));
        }

        if !self.scroll.container_vh.is_finite() || self.scroll.container_vh <= 0.0 {
            return Err(ReelError::config("scroll.container_vh must be > 0"));
        }
        if !self.scroll.container_top.is_finite() {
            return Err(ReelError::config("scroll.container_top must be finite"));
        }

        if let Some(filter) = &self.render.filter {
            filter.validate()?;
        }
        if self.render.paint_cache == 0 {
            return Err(ReelError::config("render.paint_cache must be >= 1"));
        }

        self.navbar.validate()?;
        self.footer.validate()?;

        for spec in &self.panels {
            let (lo, hi) = spec.opacity.domain();
            if lo < 0.0 || hi > 1.0 {
                return Err(ReelError::config(format!(
                    "panel '{}' breakpoints must lie within [0, 1]",
                    spec.panel.name()
                )));
            }
        }
        OverlayController::new(self.panels.clone())?;

        if self.loader.concurrency == 0 {
            return Err(ReelError::config("loader.concurrency must be >= 1"));
        }
        if self.loader.timeout_ms == Some(0) {
            return Err(ReelError::config("loader.timeout_ms must be > 0 when set"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;

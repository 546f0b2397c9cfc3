use crate::foundation::{
    core::Rgba8,
    error::{ReelError, ReelResult},
};

/// Visual state of the fixed navigation bar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavState {
    #[default]
    Transparent,
    Opaque,
}

/// A state change observed on a scroll tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct NavTransition {
    pub from: NavState,
    pub to: NavState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CtaStyle {
    /// Translucent white pill.
    Neutral,
    /// Brand-colored gradient pill.
    Gradient,
}

/// Labels and colors of the navigation bar. Loaded from configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavConfig {
    /// Scroll offset in pixels past which the bar turns opaque.
    pub threshold_px: f64,
    pub brand: String,
    pub product: String,
    pub links: Vec<String>,
    pub cta_idle: String,
    pub cta_active: String,
    /// Fill of the opaque bar (alpha included).
    pub opaque_fill: Rgba8,
    /// Backdrop blur radius of the opaque bar, in logical pixels.
    pub blur_px: f64,
    pub gradient: [Rgba8; 2],
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            threshold_px: 100.0,
            brand: "Sony".to_owned(),
            product: "WH-1000XM6".to_owned(),
            links: ["Overview", "Technology", "Noise Cancelling", "Specs"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            cta_idle: "Pre-order".to_owned(),
            cta_active: "Buy Now".to_owned(),
            opaque_fill: Rgba8::opaque(0x05, 0x05, 0x05).with_alpha(204),
            blur_px: 24.0,
            gradient: [Rgba8::opaque(0x00, 0x50, 0xff), Rgba8::opaque(0x00, 0xd6, 0xff)],
        }
    }
}

impl NavConfig {
    pub fn validate(&self) -> ReelResult<()> {
        if !self.threshold_px.is_finite() || self.threshold_px < 0.0 {
            return Err(ReelError::config(
                "navbar threshold_px must be finite and >= 0",
            ));
        }
        if !self.blur_px.is_finite() || self.blur_px < 0.0 {
            return Err(ReelError::config("navbar blur_px must be finite and >= 0"));
        }
        Ok(())
    }
}

/// Everything a host needs to draw the bar in its current state.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct NavAppearance {
    pub state: NavState,
    /// `None` for a fully transparent bar.
    pub background: Option<Rgba8>,
    pub blur_px: f64,
    pub divider_visible: bool,
    pub brand: String,
    /// Product name next to the brand; `None` while hidden.
    pub product_label: Option<String>,
    /// Center links; empty while hidden.
    pub links: Vec<String>,
    pub cta_label: String,
    pub cta_style: CtaStyle,
    /// Gradient stops of the CTA pill while it is styled [`CtaStyle::Gradient`].
    pub cta_gradient: Option<[Rgba8; 2]>,
}

/// Two-state navigation bar driven by the raw scroll offset.
///
/// Re-evaluated on every tick with no hysteresis: the bar is opaque exactly while the offset is
/// strictly greater than the threshold.
#[derive(Clone, Debug)]
pub struct NavBar {
    config: NavConfig,
    state: NavState,
}

impl NavBar {
    pub fn new(config: NavConfig) -> ReelResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: NavState::Transparent,
        })
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn state_for(&self, scroll_y: f64) -> NavState {
        if scroll_y > self.config.threshold_px {
            NavState::Opaque
        } else {
            NavState::Transparent
        }
    }

    /// Apply one scroll tick; returns the transition if the state changed.
    pub fn on_scroll(&mut self, scroll_y: f64) -> Option<NavTransition> {
        let next = self.state_for(scroll_y);
        if next == self.state {
            return None;
        }
        let transition = NavTransition {
            from: self.state,
            to: next,
        };
        tracing::debug!(
            from = ?transition.from,
            to = ?transition.to,
            scroll_y,
            "navbar state changed"
        );
        self.state = next;
        Some(transition)
    }

    pub fn appearance(&self) -> NavAppearance {
        let c = &self.config;
        match self.state {
            NavState::Transparent => NavAppearance {
                state: NavState::Transparent,
                background: None,
                blur_px: 0.0,
                divider_visible: false,
                brand: c.brand.clone(),
                product_label: None,
                links: Vec::new(),
                cta_label: c.cta_idle.clone(),
                cta_style: CtaStyle::Neutral,
                cta_gradient: None,
            },
            NavState::Opaque => NavAppearance {
                state: NavState::Opaque,
                background: Some(c.opaque_fill),
                blur_px: c.blur_px,
                divider_visible: true,
                brand: c.brand.clone(),
                product_label: Some(c.product.clone()),
                links: c.links.clone(),
                cta_label: c.cta_active.clone(),
                cta_style: CtaStyle::Gradient,
                cta_gradient: Some(c.gradient),
            },
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/navbar.rs"]
mod tests;

use crate::{
    foundation::{
        core::Progress,
        error::{ReelError, ReelResult},
    },
    overlay::curve::Curve,
};

/// The five text/CTA panels layered over the frame sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Panel {
    Hero,
    Engineering,
    NoiseCancelling,
    Sound,
    CallToAction,
}

impl Panel {
    /// All panels in page order.
    pub const ALL: [Panel; 5] = [
        Panel::Hero,
        Panel::Engineering,
        Panel::NoiseCancelling,
        Panel::Sound,
        Panel::CallToAction,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::Hero => 0,
            Self::Engineering => 1,
            Self::NoiseCancelling => 2,
            Self::Sound => 3,
            Self::CallToAction => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::Engineering => "engineering",
            Self::NoiseCancelling => "noise-cancelling",
            Self::Sound => "sound",
            Self::CallToAction => "call-to-action",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PanelAction {
    pub label: String,
    /// Primary actions render as a filled button, the rest as links.
    #[serde(default)]
    pub primary: bool,
}

/// Copy and layout hints a host needs to draw a panel.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PanelCopy {
    /// Headline, one entry per line.
    pub headline: Vec<String>,
    /// Highlighted trailing headline line, if any.
    pub accent: Option<String>,
    pub body: Option<String>,
    pub align: Align,
    /// Draw the copy on a translucent card.
    pub boxed: bool,
    pub actions: Vec<PanelAction>,
}

/// One panel: its opacity curve over progress plus its copy.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PanelSpec {
    pub panel: Panel,
    pub opacity: Curve,
    #[serde(default)]
    pub copy: PanelCopy,
}

impl PanelSpec {
    /// Panels that accept pointer input while visible.
    pub fn is_interactive(&self) -> bool {
        !self.copy.actions.is_empty()
    }
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

fn curve(pairs: &[(f64, f64)]) -> Curve {
    Curve::from_table(pairs)
}

/// The product page's panel configuration.
pub fn default_panels() -> Vec<PanelSpec> {
    vec![
        PanelSpec {
            panel: Panel::Hero,
            opacity: curve(&[(0.0, 1.0), (0.10, 1.0), (0.15, 0.0)]),
            copy: PanelCopy {
                headline: lines(&["Sony WH-1000XM6"]),
                body: Some("Silence, perfected.".to_owned()),
                align: Align::Center,
                ..PanelCopy::default()
            },
        },
        PanelSpec {
            panel: Panel::Engineering,
            opacity: curve(&[(0.15, 0.0), (0.25, 1.0), (0.35, 1.0), (0.45, 0.0)]),
            copy: PanelCopy {
                headline: lines(&["Precision-engineered"]),
                accent: Some("for silence.".to_owned()),
                body: Some(
                    "Custom drivers, sealed acoustic chambers, and optimized airflow deliver \
                     studio-grade clarity. Every component is tuned for balance."
                        .to_owned(),
                ),
                align: Align::Left,
                ..PanelCopy::default()
            },
        },
        PanelSpec {
            panel: Panel::NoiseCancelling,
            opacity: curve(&[(0.45, 0.0), (0.50, 1.0), (0.60, 1.0), (0.65, 0.0)]),
            copy: PanelCopy {
                headline: lines(&["Adaptive noise cancelling,"]),
                accent: Some("redefined.".to_owned()),
                body: Some(
                    "Multi-microphone array listens in every direction. Real-time noise \
                     analysis adjusts to your environment instantly."
                        .to_owned(),
                ),
                align: Align::Right,
                ..PanelCopy::default()
            },
        },
        PanelSpec {
            panel: Panel::Sound,
            opacity: curve(&[(0.65, 0.0), (0.70, 1.0), (0.80, 1.0), (0.85, 0.0)]),
            copy: PanelCopy {
                headline: lines(&["Immersive,", "lifelike sound."]),
                body: Some(
                    "AI-enhanced upscaling restores clarity to compressed audio, so every \
                     note feels alive."
                        .to_owned(),
                ),
                align: Align::Center,
                boxed: true,
                ..PanelCopy::default()
            },
        },
        PanelSpec {
            panel: Panel::CallToAction,
            opacity: curve(&[(0.85, 0.0), (0.90, 1.0), (1.0, 1.0)]),
            copy: PanelCopy {
                headline: lines(&["Hear everything.", "Feel nothing else."]),
                align: Align::Center,
                actions: vec![
                    PanelAction {
                        label: "Experience WH-1000XM6".to_owned(),
                        primary: true,
                    },
                    PanelAction {
                        label: "View Full Specs".to_owned(),
                        primary: false,
                    },
                ],
                ..PanelCopy::default()
            },
        },
    ]
}

/// Opacity of every panel at one progress value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayState {
    opacities: [f64; 5],
}

impl OverlayState {
    pub fn opacity(&self, panel: Panel) -> f64 {
        self.opacities[panel.index()]
    }

    /// Panels with non-zero opacity, in page order.
    pub fn visible(&self) -> impl Iterator<Item = (Panel, f64)> + '_ {
        Panel::ALL
            .into_iter()
            .map(|p| (p, self.opacity(p)))
            .filter(|(_, o)| *o > 0.0)
    }
}

impl serde::Serialize for OverlayState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(Panel::ALL.len()))?;
        for panel in Panel::ALL {
            map.serialize_entry(panel.name(), &self.opacity(panel))?;
        }
        map.end()
    }
}

/// Derives every panel's opacity from scroll progress.
///
/// Panels are independent: nothing prevents two of them from being partially visible at once,
/// which is what produces the crossfades between sections.
#[derive(Clone, Debug)]
pub struct OverlayController {
    panels: Vec<PanelSpec>,
}

impl OverlayController {
    /// Controller over exactly one spec per [`Panel`], in any order.
    pub fn new(mut panels: Vec<PanelSpec>) -> ReelResult<Self> {
        for panel in Panel::ALL {
            let count = panels.iter().filter(|s| s.panel == panel).count();
            if count != 1 {
                return Err(ReelError::config(format!(
                    "overlay needs exactly one '{}' panel, found {count}",
                    panel.name()
                )));
            }
        }
        if panels.len() != Panel::ALL.len() {
            return Err(ReelError::config("overlay has unknown extra panels"));
        }
        panels.sort_by_key(|s| s.panel.index());
        Ok(Self { panels })
    }

    pub fn spec(&self, panel: Panel) -> &PanelSpec {
        &self.panels[panel.index()]
    }

    pub fn specs(&self) -> &[PanelSpec] {
        &self.panels
    }

    pub fn sample(&self, progress: Progress) -> OverlayState {
        let mut opacities = [0.0; 5];
        for spec in &self.panels {
            opacities[spec.panel.index()] = spec.opacity.sample(progress.get()).clamp(0.0, 1.0);
        }
        OverlayState { opacities }
    }
}

impl Default for OverlayController {
    fn default() -> Self {
        let mut panels = default_panels();
        panels.sort_by_key(|s| s.panel.index());
        Self { panels }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/panels.rs"]
mod tests;

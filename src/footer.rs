use crate::foundation::error::{ReelError, ReelResult};

/// Static page footer shown after the scroll container.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FooterConfig {
    pub brand: String,
    pub links: Vec<String>,
    pub copyright: String,
}

impl Default for FooterConfig {
    fn default() -> Self {
        Self {
            brand: "Sony".to_owned(),
            links: ["Privacy Policy", "Terms of Use", "Sales Policy", "Site Map"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            copyright: "\u{a9} 2026 Sony Electronics Inc. All rights reserved. Design Concept."
                .to_owned(),
        }
    }
}

impl FooterConfig {
    pub fn validate(&self) -> ReelResult<()> {
        if self.links.iter().any(|l| l.trim().is_empty()) {
            return Err(ReelError::config("footer links must not be blank"));
        }
        Ok(())
    }
}

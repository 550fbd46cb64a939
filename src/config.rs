//! Site configuration.
//!
//! A single JSON file (`--config`) with every section optional. Absent keys take the
//! defaults the page has always used, so an empty object `{}` is a valid configuration.

use std::{fs, path::Path};

use crate::{
    background::BackgroundOptions,
    foundation::error::{FolioError, FolioResult},
    observe::{NavOptions, RevealOptions, SectionOptions},
    render::RenderOptions,
    transform::TransformOptions,
};

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub transform: TransformOptions,
    pub render: RenderOptions,
    pub reveal: RevealOptions,
    pub sections: SectionOptions,
    pub nav: NavOptions,
    pub background: BackgroundOptions,
}

impl SiteConfig {
    pub fn from_json(json: &str) -> FolioResult<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| FolioError::validation(format!("config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    #[tracing::instrument]
    pub fn load(path: &Path) -> FolioResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| FolioError::load(format!("read config '{}': {e}", path.display())))?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> FolioResult<()> {
        self.transform.validate()?;
        self.render.validate()?;
        self.reveal.validate()?;
        self.sections.validate()?;
        self.nav.validate()?;
        self.background.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let cfg = SiteConfig::from_json("{}").unwrap();
        assert_eq!(cfg, SiteConfig::default());
        assert_eq!(cfg.reveal.threshold, 0.1);
        assert_eq!(cfg.nav.scroll_threshold, 100.0);
        assert_eq!(cfg.background.mesh_count, 25);
    }

    #[test]
    fn partial_sections_override_only_given_keys() {
        let cfg = SiteConfig::from_json(
            r#"{"transform":{"cv":"cv.pdf"},"render":{"stagger_secs":0.2}}"#,
        )
        .unwrap();
        assert_eq!(cfg.transform.cv.as_deref(), Some("cv.pdf"));
        assert_eq!(cfg.render.stagger_secs, 0.2);
        assert_eq!(cfg.transform.program, TransformOptions::default().program);
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let err = SiteConfig::from_json(r#"{"reveal":{"threshold":1.5}}"#).unwrap_err();
        assert!(matches!(err, FolioError::Validation(_)));
    }

    #[test]
    fn rejects_unknown_shape() {
        assert!(SiteConfig::from_json(r#"{"nav":{"scroll_threshold":"high"}}"#).is_err());
    }
}

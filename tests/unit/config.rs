use super::*;
use crate::overlay::panels::Panel;

#[test]
fn defaults_describe_the_product_page() {
    let config = ReelConfig::default();
    config.validate().unwrap();
    assert_eq!(config.frames.count, 240);
    assert_eq!(config.frames.template, "ezgif-frame");
    assert_eq!(config.scroll.container_vh, 8.0);
    assert_eq!(config.render.background.to_hex(), "#050505");
    assert_eq!(config.navbar.threshold_px, 100.0);
    assert_eq!(config.panels.len(), 5);
    assert_eq!(config.loader.to_load_opts(), LoadOpts::default());
}

#[test]
fn empty_object_yields_defaults() {
    let config = ReelConfig::from_json_str("{}").unwrap();
    assert_eq!(config, ReelConfig::default());
}

#[test]
fn partial_sections_keep_remaining_defaults() {
    let config = ReelConfig::from_json_str(
        r##"{
            "frames": { "count": 12, "extension": "png" },
            "render": { "background": "#101820", "filter": null },
            "loader": { "timeout_ms": null, "retries": 0 }
        }"##,
    )
    .unwrap();
    assert_eq!(config.frames.count, 12);
    assert_eq!(config.frames.extension, "png");
    assert_eq!(config.frames.template, "ezgif-frame");
    assert_eq!(config.render.background, Rgba8::opaque(0x10, 0x18, 0x20));
    assert_eq!(config.render.filter, None);
    let opts = config.loader.to_load_opts();
    assert_eq!(opts.timeout, None);
    assert_eq!(opts.retries, 0);
    assert_eq!(opts.concurrency, 4);
}

#[test]
fn serialized_config_reads_back_identically() {
    let config = ReelConfig::default();
    let json = config.to_json_pretty().unwrap();
    let back = ReelConfig::from_json_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn unknown_fields_are_rejected() {
    let err = ReelConfig::from_json_str(r#"{ "frames": { "cnt": 3 } }"#).unwrap_err();
    assert!(matches!(err, ReelError::Config(_)));
}

#[test]
fn frame_count_is_bounded_by_template_width() {
    assert!(ReelConfig::from_json_str(r#"{ "frames": { "count": 0 } }"#).is_err());
    assert!(ReelConfig::from_json_str(r#"{ "frames": { "count": 1000 } }"#).is_err());
    assert!(ReelConfig::from_json_str(r#"{ "frames": { "count": 999 } }"#).is_ok());
}

#[test]
fn unsorted_or_out_of_range_curves_are_rejected() {
    let mut config = ReelConfig::default();
    config.panels[0].opacity = crate::overlay::curve::Curve::from_pairs(&[(0.0, 1.0), (1.5, 0.0)])
        .unwrap();
    assert!(config.validate().is_err());

    let unsorted = r#"{ "panels": [ { "panel": "hero", "opacity": [[0.5, 1.0], [0.1, 0.0]] } ] }"#;
    assert!(ReelConfig::from_json_str(unsorted).is_err());
}

#[test]
fn every_panel_must_be_configured() {
    let mut config = ReelConfig::default();
    config.panels.retain(|p| p.panel != Panel::Sound);
    assert!(config.validate().is_err());
}

#[test]
fn invalid_numbers_are_rejected() {
    let mut config = ReelConfig::default();
    config.loader.concurrency = 0;
    assert!(config.validate().is_err());

    let mut config = ReelConfig::default();
    config.render.filter = Some(FrameFilter {
        contrast: -0.5,
        saturate: 1.0,
    });
    assert!(config.validate().is_err());

    let mut config = ReelConfig::default();
    config.navbar.threshold_px = f64::INFINITY;
    assert!(config.validate().is_err());
}

#[test]
fn relative_frame_dir_resolves_against_base() {
    let frames = FramesConfig::default();
    let source = frames.dir_source(Some(Path::new("/srv/page")));
    assert_eq!(source.dir(), Path::new("/srv/page/sequence"));
    assert!(
        source
            .path_for(7)
            .ends_with("sequence/ezgif-frame-007.jpg")
    );
}

#[test]
fn missing_file_is_a_config_error() {
    let err = ReelConfig::from_path("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, ReelError::Config(_)));
}

#[test]
fn footer_section_is_configurable() {
    let config =
        ReelConfig::from_json_str(r#"{ "footer": { "links": ["Imprint"] } }"#).unwrap();
    assert_eq!(config.footer.links, vec!["Imprint".to_owned()]);
    assert_eq!(config.footer.brand, "Sony");
    assert!(ReelConfig::from_json_str(r#"{ "footer": { "links": [""] } }"#).is_err());
}

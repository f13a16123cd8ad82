mod tests {
    use living_light::pattern::PatternId;
    use living_light::{Error, Installation, Scenario, Timing};

    const CONFIG: &str = r#"
range_top_border_row = 1

[layout]
strip_len = 6

[[layout.surfaces]]
name = "Back"
addresses = [[0, 1, -1], [2, 3, 4]]
sweep = "backward"
shadows = [{ axis = "col", index = 2, level = "dark" }]
bbox = [0, 0, 30, 20]

[[color_profiles]]
name = "Candle"
kelvin = 1900

[[color_profiles]]
name = "Blue Sky"
rgb = [64, 156, 255]

[[scenarios]]
name = "Idle"
pattern = "ellipse"
color_profile = "Candle"
brightness_scale = 0.5
cycle_time = 4.0

[[scenarios]]
name = "Chase"
pattern = "come_in"
color_profile = "Blue Sky"
cycle_time = 2.5

[timing]
led_timestep_sec = 0.1
"#;

    #[test]
    fn test_parse_installation() {
        let installation = Installation::from_toml_str(CONFIG).unwrap();

        assert_eq!(installation.range_top_border_row, 1);
        assert_eq!(installation.layout.strip_len, 6);
        let back = installation.layout.surface("Back").unwrap();
        assert_eq!((back.rows(), back.cols()), (2, 3));
        assert_eq!(back.address(0, 2), None);
        assert_eq!(back.address(1, 2), Some(4));
        assert_eq!(back.shadow_at(0, 2), Some(0.0));

        let chase = installation.scenario("Chase").unwrap();
        assert_eq!(chase.pattern, PatternId::ComeIn);
        assert_eq!(chase.brightness_scale, 1.0);
        assert_eq!(installation.color_profile("Blue Sky").unwrap().rgb.b, 255);
        assert!(installation.color_profile("Candle").is_ok());

        assert_eq!(installation.timing.led_timestep_sec, 0.1);
        assert_eq!(installation.timing.report_interval_sec, Timing::default().report_interval_sec);
        assert_eq!(installation.scenario_names().collect::<Vec<_>>(), ["Idle", "Chase"]);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let installation = Installation::from_toml_str("").unwrap();
        assert_eq!(installation, Installation::default());
        assert!(installation.scenario("Calibrate Distance").is_ok());
    }

    #[test]
    fn test_unknown_pattern_is_rejected() {
        let source = CONFIG.replace("\"come_in\"", "\"sparkle\"");
        let err = Installation::from_toml_str(&source).unwrap_err();
        assert!(matches!(&err, Error::Config(msg) if msg.contains("sparkle")), "{err}");
    }

    #[test]
    fn test_unknown_color_profile_is_rejected() {
        let source = CONFIG.replace("color_profile = \"Blue Sky\"", "color_profile = \"Moonlight\"");
        assert!(matches!(
            Installation::from_toml_str(&source),
            Err(Error::UnknownColorProfile(name)) if name == "Moonlight"
        ));
    }

    #[test]
    fn test_invalid_cycle_time_is_rejected() {
        let source = CONFIG.replace("cycle_time = 2.5", "cycle_time = 0.0");
        assert!(matches!(
            Installation::from_toml_str(&source),
            Err(Error::InvalidCycleTime { name, .. }) if name == "Chase"
        ));
    }

    #[test]
    fn test_invalid_layout_is_rejected() {
        let source = CONFIG.replace("[2, 3, 4]", "[2, 3, 1]");
        assert!(matches!(Installation::from_toml_str(&source), Err(Error::InvalidLayout(_))));

        let source = CONFIG.replace("strip_len = 6", "strip_len = 4");
        assert!(matches!(Installation::from_toml_str(&source), Err(Error::InvalidLayout(_))));
    }

    #[test]
    fn test_unknown_scenario() {
        let installation = Installation::default();
        assert!(matches!(
            installation.scenario("Disco"),
            Err(Error::UnknownScenario(name)) if name == "Disco"
        ));
    }

    #[test]
    fn test_timesteps() {
        let timing = Timing::default();
        assert_eq!(timing.timesteps_per_cycle(2.0), 40);
        assert_eq!(timing.timesteps_per_cycle(3.0), 60);
        assert_eq!(timing.timesteps_per_cycle(0.01), 1);

        assert_eq!(timing.buffer_timesteps(4.0), 80);
        assert_eq!(timing.buffer_timesteps(2.02), 50);
        assert_eq!(timing.buffer_timesteps(0.01), 10);
        assert_eq!(Installation::default().buffer_timesteps(), 80);
    }

    #[test]
    fn test_pattern_params() {
        let installation = Installation::from_toml_str(CONFIG).unwrap();
        let idle = installation.scenario("Idle").unwrap();
        let params = installation.pattern_params(idle);
        assert_eq!(params.timesteps_per_cycle, 40);
        assert_eq!(params.range_top_border_row, 1);
        assert_eq!(installation.buffer_timesteps(), 40);

        let custom = Scenario::new("Slow", PatternId::Ellipse, "Candle", 1.0, 10.0);
        assert_eq!(installation.pattern_params(&custom).timesteps_per_cycle, 100);
    }

    #[test]
    fn test_default_layout_is_valid() {
        let layout = Installation::default().layout;
        assert!(layout.validate().is_ok());
        assert_eq!(layout.len(), 3);
        assert_eq!(layout.shape("Left"), Some((10, 7)));
        assert_eq!(layout.shape("Right"), Some((10, 9)));
        assert_eq!(layout.shape("Top"), Some((3, 17)));
    }
}

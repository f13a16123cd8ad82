mod tests {
    use living_light::color::{
        Compositor, Hls, Rgb, default_profiles, kelvin_to_rgb, rgb_from_u32, rgb_to_u32,
    };

    const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };
    const TUNGSTEN: Rgb = Rgb {
        r: 255,
        g: 197,
        b: 143,
    };

    fn assert_close(a: Rgb, b: Rgb) {
        let near = |x: u8, y: u8| x.abs_diff(y) <= 1;
        assert!(
            near(a.r, b.r) && near(a.g, b.g) && near(a.b, b.b),
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn test_packed_round_trip_covers_every_color() {
        for packed in 0..=0x00FF_FFFF_u32 {
            assert_eq!(rgb_to_u32(rgb_from_u32(packed)), packed);
        }
    }

    #[test]
    fn test_packed_layout() {
        assert_eq!(rgb_to_u32(Rgb { r: 0x12, g: 0x34, b: 0x56 }), 0x12_34_56);
        assert_eq!(rgb_from_u32(0xFF_00_80), Rgb { r: 255, g: 0, b: 128 });
    }

    #[test]
    fn test_hls_round_trip() {
        for rgb in [BLACK, WHITE, TUNGSTEN, Rgb { r: 64, g: 156, b: 255 }, Rgb { r: 200, g: 10, b: 30 }] {
            assert_close(Hls::from_rgb(rgb).to_rgb(), rgb);
        }
    }

    #[test]
    fn test_hls_of_grey_has_no_saturation() {
        let hls = Hls::from_rgb(Rgb { r: 128, g: 128, b: 128 });
        assert_eq!(hls.saturation, 0.0);
        assert_eq!(hls.hue, 0.0);
    }

    #[test]
    fn test_compositor_full_brightness_keeps_base() {
        let compositor = Compositor::new(TUNGSTEN, 1.0);
        assert_close(compositor.rgb(1.0), TUNGSTEN);
    }

    #[test]
    fn test_compositor_zero_brightness_is_black() {
        for profile in default_profiles() {
            let compositor = Compositor::new(profile.rgb, 1.0);
            assert_eq!(compositor.packed(0.0), 0, "{}", profile.name);
        }
    }

    #[test]
    fn test_compositor_dims_white_on_lightness() {
        let compositor = Compositor::new(WHITE, 1.0);
        assert_eq!(compositor.rgb(0.5), Rgb { r: 128, g: 128, b: 128 });

        let scaled = Compositor::new(WHITE, 0.5);
        assert_eq!(scaled.rgb(1.0), Rgb { r: 128, g: 128, b: 128 });
    }

    #[test]
    fn test_compositor_preserves_hue() {
        let base = Hls::from_rgb(TUNGSTEN);
        let dimmed = Hls::from_rgb(Compositor::new(TUNGSTEN, 1.0).rgb(0.4));
        assert!((dimmed.hue - base.hue).abs() < 0.02);
        assert!(dimmed.lightness < base.lightness);
    }

    #[test]
    fn test_compositor_clips_lightness() {
        let compositor = Compositor::new(TUNGSTEN, 10.0);
        assert_eq!(compositor.rgb(1.0), WHITE);
    }

    #[test]
    fn test_kelvin_to_rgb_warm_and_cool() {
        let candle = kelvin_to_rgb(1900);
        assert_eq!(candle.r, 255);
        assert_eq!(candle.b, 0);
        assert!(candle.g > 100 && candle.g < 160);

        let sky = kelvin_to_rgb(20000);
        assert_eq!(sky.b, 255);
        assert!(sky.r < sky.b);
    }

    #[test]
    fn test_default_profiles() {
        let profiles = default_profiles();
        assert_eq!(profiles.len(), 9);
        let sunlight = profiles.iter().find(|p| p.name == "Direct Sunlight").unwrap();
        assert_eq!(sunlight.rgb, WHITE);
        assert_eq!(sunlight.kelvin, Some(6000));
    }
}

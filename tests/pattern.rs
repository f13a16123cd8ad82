mod tests {
    use living_light::layout::{LedAddress, ShadowAxis, ShadowLevel, ShadowRule, Surface, Sweep};
    use living_light::pattern::{
        BASE_BRIGHTNESS, PatternId, PatternParams, PatternSlot, RangePattern, Sample, breath,
    };
    use living_light::{DISTANCE_BUCKETS, Error, PROXIMITY_STATES};

    const PARAMS: PatternParams = PatternParams {
        timesteps_per_cycle: 40,
        range_top_border_row: 1,
    };

    fn wall(rows: usize, cols: usize) -> Surface {
        let grid = (0..rows)
            .map(|row| {
                (0..cols)
                    .map(|col| LedAddress::try_from(row * cols + col).ok())
                    .collect()
            })
            .collect();
        Surface::new("Wall", grid).unwrap()
    }

    fn sample(row: usize, col: usize, timestep: usize) -> Sample {
        Sample {
            row,
            col,
            timestep,
            distance: 9,
            proximity: 0,
        }
    }

    fn every_sample(surface: &Surface) -> impl Iterator<Item = Sample> + '_ {
        (0..PROXIMITY_STATES).flat_map(move |proximity| {
            (0..DISTANCE_BUCKETS).flat_map(move |distance| {
                (0..50).step_by(7).flat_map(move |timestep| {
                    (0..surface.rows()).flat_map(move |row| {
                        (0..surface.cols()).map(move |col| Sample {
                            row,
                            col,
                            timestep,
                            distance,
                            proximity,
                        })
                    })
                })
            })
        })
    }

    #[test]
    fn test_pattern_id_parse() {
        assert_eq!(PatternId::parse_from_str("come_in"), Some(PatternId::ComeIn));
        assert_eq!(PatternId::parse_from_str("all_off"), Some(PatternId::AllOff));
        assert_eq!(PatternId::parse_from_str("sparkle"), None);
        assert!(matches!(
            "sparkle".parse::<PatternId>(),
            Err(Error::UnknownPattern(name)) if name == "sparkle"
        ));
    }

    #[test]
    fn test_pattern_id_raw_round_trip() {
        for id in [
            PatternId::ComeIn,
            PatternId::Ellipse,
            PatternId::Range,
            PatternId::AllOn,
            PatternId::AllOff,
            PatternId::Follow,
        ] {
            assert_eq!(PatternId::from_raw(id.as_raw()), Some(id));
            assert_eq!(PatternId::parse_from_str(id.as_str()), Some(id));
        }
        assert_eq!(PatternId::from_raw(200), None);
    }

    #[test]
    fn test_all_on_and_all_off_ignore_inputs() {
        let surface = wall(4, 5).with_shadows(vec![ShadowRule {
            axis: ShadowAxis::Col,
            index: 2,
            level: ShadowLevel::Dark,
        }]);
        let on = PatternId::AllOn.to_slot(PARAMS);
        let off = PatternId::AllOff.to_slot(PARAMS);

        for sample in every_sample(&surface) {
            assert_eq!(on.brightness(&surface, sample), 1.0);
            assert_eq!(off.brightness(&surface, sample), 0.0);
        }
    }

    #[test]
    fn test_range_ramp_is_monotonic() {
        let (rows, cols) = (10, 9);
        for row in 0..rows {
            for col in 0..cols {
                let here = RangePattern::ramp(row, col, rows, cols);
                if row + 1 < rows {
                    assert!(RangePattern::ramp(row + 1, col, rows, cols) >= here);
                }
                if col + 1 < cols {
                    assert!(RangePattern::ramp(row, col + 1, rows, cols) >= here);
                }
            }
        }
        assert_eq!(RangePattern::ramp(0, 0, rows, cols), 0.0);
        assert_eq!(RangePattern::ramp(rows - 1, cols - 1, rows, cols), 1.0);
    }

    #[test]
    fn test_range_border_uses_configured_top_row() {
        let surface = wall(5, 6);
        let range = PatternId::Range.to_slot(PARAMS);

        // Row 0 is not the border with the default top row
        assert_eq!(range.brightness(&surface, sample(0, 2, 0)), 0.0);
        for col in 0..6 {
            assert_eq!(range.brightness(&surface, sample(1, col, 0)), 1.0);
            assert_eq!(range.brightness(&surface, sample(4, col, 0)), 1.0);
        }
        for row in 0..5 {
            assert_eq!(range.brightness(&surface, sample(row, 0, 0)), 1.0);
            assert_eq!(range.brightness(&surface, sample(row, 5, 0)), 1.0);
        }

        let top_zero = PatternId::Range.to_slot(PatternParams {
            range_top_border_row: 0,
            ..PARAMS
        });
        assert_eq!(top_zero.brightness(&surface, sample(0, 2, 0)), 1.0);
        let inner = top_zero.brightness(&surface, sample(2, 2, 0));
        assert!((inner - RangePattern::ramp(2, 2, 5, 6)).abs() < 1e-6);
    }

    #[test]
    fn test_breath_period_is_one_cycle() {
        assert_eq!(breath(0, 40), 0.0);
        assert!((breath(20, 40) - 1.0).abs() < 1e-6);
        for t in 0..40 {
            assert!((breath(t, 40) - breath(t + 40, 40)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_come_in_starts_at_base_brightness() {
        let surface = wall(3, 7);
        let come_in = PatternId::ComeIn.to_slot(PARAMS);
        for row in 0..3 {
            for col in 0..7 {
                let value = come_in.brightness(&surface, sample(row, col, 0));
                assert!((value - BASE_BRIGHTNESS).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_come_in_stays_in_range_and_repeats_each_cycle() {
        let surface = wall(3, 7);
        let come_in = PatternId::ComeIn.to_slot(PARAMS);
        for sample in every_sample(&surface) {
            let value = come_in.brightness(&surface, sample);
            assert!((BASE_BRIGHTNESS - 1e-6..=1.0).contains(&value));

            let later = Sample {
                timestep: sample.timestep + 40,
                ..sample
            };
            assert!((come_in.brightness(&surface, later) - value).abs() < 1e-5);
        }
    }

    fn brightest_col(pattern: &PatternSlot, surface: &Surface, timestep: usize) -> usize {
        (0..surface.cols())
            .max_by(|&a, &b| {
                let a = pattern.brightness(surface, sample(0, a, timestep));
                let b = pattern.brightness(surface, sample(0, b, timestep));
                a.total_cmp(&b)
            })
            .unwrap()
    }

    #[test]
    fn test_traveling_patterns_share_sweep_direction() {
        let come_in = PatternId::ComeIn.to_slot(PARAMS);
        let ellipse = PatternId::Ellipse.to_slot(PARAMS);

        let forward = wall(1, 10);
        let peaks = |pattern: &PatternSlot| [8, 12, 16].map(|t| brightest_col(pattern, &forward, t));
        assert_eq!(peaks(&come_in), [3, 2, 1]);
        assert_eq!(peaks(&ellipse), [8, 7, 6]);

        let backward = wall(1, 10).with_sweep(Sweep::Backward);
        let peaks = |pattern: &PatternSlot| [8, 12, 16].map(|t| brightest_col(pattern, &backward, t));
        assert_eq!(peaks(&come_in), [7, 8, 9]);
        assert_eq!(peaks(&ellipse), [2, 3, 4]);
    }

    #[test]
    fn test_ellipse_is_brightest_near_travelling_center() {
        let surface = wall(10, 9);
        let ellipse = PatternId::Ellipse.to_slot(PARAMS);

        // Half way through the cycle the center has moved to column 4.5
        let center = ellipse.brightness(&surface, sample(4, 4, 20));
        let corner = ellipse.brightness(&surface, sample(0, 0, 20));
        assert!(center > corner);
        for sample in every_sample(&surface) {
            let value = ellipse.brightness(&surface, sample);
            assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn test_shadow_overrides_animated_patterns() {
        let surface = wall(3, 17).with_shadows(vec![
            ShadowRule {
                axis: ShadowAxis::Col,
                index: 8,
                level: ShadowLevel::Dark,
            },
            ShadowRule {
                axis: ShadowAxis::Row,
                index: 0,
                level: ShadowLevel::Full,
            },
        ]);

        for id in [PatternId::ComeIn, PatternId::Ellipse, PatternId::Range] {
            let slot = id.to_slot(PARAMS);
            assert!(slot.is_shadowed());
            assert_eq!(slot.brightness(&surface, sample(1, 8, 13)), 0.0, "{id}");
            assert_eq!(slot.brightness(&surface, sample(2, 8, 13)), 0.0, "{id}");
            assert_eq!(slot.brightness(&surface, sample(0, 3, 13)), 1.0, "{id}");
        }
        assert!(!PatternId::AllOn.to_slot(PARAMS).is_shadowed());
    }

    #[test]
    fn test_follow_tracks_distance_bucket() {
        let surface = wall(2, 10);
        let follow = PatternId::Follow.to_slot(PARAMS);
        let at = |col, distance| {
            follow.brightness(
                &surface,
                Sample {
                    row: 0,
                    col,
                    timestep: 0,
                    distance,
                    proximity: 0,
                },
            )
        };

        assert!(at(9, 9) > at(0, 9));
        assert!(at(0, 0) > at(9, 0));
        assert!((at(9, 9) - 1.0).abs() < 1e-6);
    }
}

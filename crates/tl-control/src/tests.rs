//! Unit tests for tl-control.

/// Shared fixtures: the four-light crossroad around (25, 25).
#[cfg(test)]
mod fixtures {
    use tl_core::{Direction, LightId, LightState, Point};

    use crate::LightData;

    pub fn light(id: u32, direction: Direction, x: f64, y: f64) -> LightData {
        LightData {
            id:              LightId(id),
            state:           LightState::Red,
            position:        Point::new(x, y),
            direction,
            timer:           0,
            steps_in_state:  0,
            green_duration:  30,
            yellow_duration: 5,
            red_duration:    35,
            queue_length:    0,
            neighbors:       (0..4).filter(|&n| n != id).map(LightId).collect(),
        }
    }

    pub fn crossroad() -> Vec<LightData> {
        vec![
            light(0, Direction::Horizontal, 15.0, 25.0),
            light(1, Direction::Horizontal, 35.0, 25.0),
            light(2, Direction::Vertical, 25.0, 15.0),
            light(3, Direction::Vertical, 25.0, 35.0),
        ]
    }
}

#[cfg(test)]
mod static_timing {
    use tl_core::{Direction, LightState, Tick};

    use super::fixtures::crossroad;
    use crate::{
        AlgorithmConfig, ControlAlgorithm, SimulationContext, StaticAlgorithm, StaticConfig,
    };

    #[test]
    fn horizontal_schedule_follows_cycle() {
        let lights = crossroad();
        let config = AlgorithmConfig::default();
        let algo   = StaticAlgorithm::default();

        for step in 0..140u64 {
            let ctx = SimulationContext::new(Tick(step), &[], &lights, &config);
            let expected = match step % 70 {
                0..30  => LightState::Green,
                30..35 => LightState::Yellow,
                _      => LightState::Red,
            };
            for h in &lights[..2] {
                assert_eq!(algo.calculate_state(h, &ctx), expected, "step {step}");
            }
        }
    }

    #[test]
    fn horizontal_and_vertical_never_green_together() {
        let lights = crossroad();
        let config = AlgorithmConfig::default();
        let algo   = StaticAlgorithm::default();

        for step in 0..1000u64 {
            let ctx = SimulationContext::new(Tick(step), &[], &lights, &config);
            let green = |dir| {
                lights
                    .iter()
                    .filter(|l| l.direction == dir)
                    .any(|l| algo.calculate_state(l, &ctx).is_green())
            };
            assert!(
                !(green(Direction::Horizontal) && green(Direction::Vertical)),
                "conflicting greens at step {step}"
            );
        }
    }

    #[test]
    fn vertical_runs_half_cycle_behind() {
        let lights = crossroad();
        let config = AlgorithmConfig::default();
        let algo   = StaticAlgorithm::default();
        let v      = &lights[2];

        let at = |step| algo.calculate_state(v, &SimulationContext::new(Tick(step), &[], &lights, &config));
        assert_eq!(at(0), LightState::Red);
        assert_eq!(at(34), LightState::Red);
        assert_eq!(at(35), LightState::Green);
        assert_eq!(at(64), LightState::Green);
        assert_eq!(at(65), LightState::Yellow);
        assert_eq!(at(70), LightState::Red);
    }

    #[test]
    fn cycle_offset_shifts_by_light_id() {
        let lights = crossroad();
        let config = AlgorithmConfig::default();
        let algo   = StaticAlgorithm::new(StaticConfig { cycle_offset: 10, ..Default::default() });

        let ctx = SimulationContext::new(Tick(25), &[], &lights, &config);
        // Light 0 sits at phase 25, light 1 at phase 35.
        assert_eq!(algo.calculate_state(&lights[0], &ctx), LightState::Green);
        assert_eq!(algo.calculate_state(&lights[1], &ctx), LightState::Red);
    }

    #[test]
    fn update_advances_timer_and_state_age() {
        let lights = crossroad();
        let config = AlgorithmConfig::default();
        let algo   = StaticAlgorithm::default();

        let mut light = lights[0].clone();
        light.steps_in_state = 4;

        let ctx  = SimulationContext::new(Tick(0), &[], &lights, &config);
        let next = algo.update_light(&light, &ctx);
        assert_eq!(next.state, LightState::Green);
        assert_eq!(next.timer, 1);
        assert_eq!(next.steps_in_state, 0);
        assert_eq!(next.green_duration, 30);

        let ctx   = SimulationContext::new(Tick(1), &[], &lights, &config);
        let after = algo.update_light(&next, &ctx);
        assert_eq!(after.timer, 2);
        assert_eq!(after.steps_in_state, 1);
        assert_eq!(after.neighbors, light.neighbors);
    }

    #[test]
    fn update_reports_configured_durations() {
        let lights = crossroad();
        let config = AlgorithmConfig::default();
        let algo   = StaticAlgorithm::new(StaticConfig {
            green_duration:  10,
            yellow_duration: 5,
            red_duration:    55,
            ..Default::default()
        });

        let ctx  = SimulationContext::new(Tick(12), &[], &lights, &config);
        let next = algo.update_light(&lights[0], &ctx);
        assert_eq!(next.state, LightState::Yellow);
        assert_eq!(
            (next.green_duration, next.yellow_duration, next.red_duration),
            (10, 5, 55)
        );
        assert_eq!(next.cycle_length(), 70);
    }
}

#[cfg(test)]
mod adaptive {
    use tl_core::{LightState, Tick};

    use super::fixtures::crossroad;
    use crate::{AdaptiveAlgorithm, AdaptiveConfig, AlgorithmConfig, ControlAlgorithm, SimulationContext};

    #[test]
    fn green_time_stays_within_bounds() {
        let cfg = AdaptiveConfig::default();
        for queue in 0..40 {
            for current in 0..=120 {
                let g = cfg.green_time(queue, current);
                assert!((10..=60).contains(&g), "queue {queue} current {current} -> {g}");
            }
        }
    }

    #[test]
    fn smoothing_toward_target() {
        let cfg = AdaptiveConfig::default();
        // High: target 45, 30 + 1.5 = 31.5.
        assert_eq!(cfg.green_time(20, 30), 31);
        // Medium: target 60, 50 + 1.0 = 51.
        assert_eq!(cfg.green_time(10, 50), 51);
        // Low: target 21, 30 - 0.9 = 29.1.
        assert_eq!(cfg.green_time(0, 30), 29);
    }

    #[test]
    fn empty_approach_converges_to_minimum() {
        let cfg = AdaptiveConfig::default();
        let mut green = 60;
        for _ in 0..200 {
            green = cfg.green_time(0, green);
        }
        assert_eq!(green, cfg.min_green_time);
    }

    #[test]
    fn congested_approach_never_shrinks_green() {
        let cfg = AdaptiveConfig::default();
        let mut green = 30;
        for _ in 0..200 {
            let next = cfg.green_time(25, green);
            assert!(next >= green && next <= cfg.max_green_time);
            green = next;
        }
    }

    #[test]
    fn state_uses_the_new_green_time() {
        let mut lights = crossroad();
        lights[0].queue_length = 20;
        let config = AlgorithmConfig::default();
        let algo   = AdaptiveAlgorithm::default();

        // New green is 31, so step 30 is still GREEN and step 31 is YELLOW.
        let at = |step| algo.calculate_state(&lights[0], &SimulationContext::new(Tick(step), &[], &lights, &config));
        assert_eq!(at(30), LightState::Green);
        assert_eq!(at(31), LightState::Yellow);
        assert_eq!(at(36), LightState::Red);
        assert_eq!(at(71), LightState::Green);
    }

    #[test]
    fn update_rewrites_green_duration() {
        let mut lights = crossroad();
        lights[0].queue_length = 20;
        let config = AlgorithmConfig::default();
        let algo   = AdaptiveAlgorithm::default();

        let ctx  = SimulationContext::new(Tick(0), &[], &lights, &config);
        let next = algo.update_light(&lights[0], &ctx);
        assert_eq!(next.green_duration, 31);
        assert_eq!(next.yellow_duration, 5);
        assert_eq!(next.red_duration, 35);
        assert_eq!(next.timer, 1);
    }
}

#[cfg(test)]
mod coordinated {
    use tl_core::{LightState, Tick};

    use super::fixtures::crossroad;
    use crate::{
        AdaptiveAlgorithm, AlgorithmConfig, ControlAlgorithm, CoordinatedAlgorithm,
        CoordinatedConfig, OffsetCalculation, SimulationContext,
    };

    fn nearby_of(lights: &[crate::LightData], idx: usize) -> Vec<&crate::LightData> {
        lights.iter().filter(|l| lights[idx].neighbors.contains(&l.id)).collect()
    }

    #[test]
    fn offset_clamped_to_minimum() {
        let lights = crossroad();
        let algo   = CoordinatedAlgorithm::default();
        // Mean travel time (2 + 1.41 + 1.41) / 3 truncates to 1, clamped up to 5.
        assert_eq!(algo.offset(&lights[0], &nearby_of(&lights, 0)), 5);
    }

    #[test]
    fn offset_zero_without_neighbors_or_when_disabled() {
        let lights = crossroad();
        let algo   = CoordinatedAlgorithm::default();
        assert_eq!(algo.offset(&lights[0], &[]), 0);

        let none = CoordinatedAlgorithm::new(CoordinatedConfig {
            offset_calculation: OffsetCalculation::None,
            ..Default::default()
        });
        assert_eq!(none.offset(&lights[0], &nearby_of(&lights, 0)), 0);
    }

    #[test]
    fn extension_needs_queue_and_expiring_red_neighbor() {
        let mut lights = crossroad();
        lights[2].steps_in_state = 31;
        let algo = CoordinatedAlgorithm::default();

        lights[0].queue_length = 4;
        assert!(algo.should_extend(&lights[0], &nearby_of(&lights, 0)));

        lights[0].queue_length = 3;
        assert!(!algo.should_extend(&lights[0], &nearby_of(&lights, 0)));

        lights[0].queue_length = 4;
        lights[2].steps_in_state = 30;
        assert!(!algo.should_extend(&lights[0], &nearby_of(&lights, 0)));

        lights[2].steps_in_state = 33;
        lights[2].state = LightState::Green;
        assert!(!algo.should_extend(&lights[0], &nearby_of(&lights, 0)));
    }

    #[test]
    fn out_of_radius_neighbors_are_ignored() {
        let mut lights = crossroad();
        lights[0].queue_length = 4;
        lights[1].steps_in_state = 33;
        let config = AlgorithmConfig::default();
        // Light 1 is 20 away; only the vertical lights (14.1 away) are in range.
        let algo = CoordinatedAlgorithm::new(CoordinatedConfig {
            coordination_radius: 15.0,
            ..Default::default()
        });

        let ctx  = SimulationContext::new(Tick(0), &[], &lights, &config);
        let next = algo.update_light(&lights[0], &ctx);
        assert_eq!(next.green_duration, 29);
    }

    #[test]
    fn green_trimmed_without_extension() {
        let lights = crossroad();
        let config = AlgorithmConfig::default();
        let algo   = CoordinatedAlgorithm::default();

        // Adaptive base green is 29; offset 5 moves the cutoff to step 20.
        let at = |step| algo.calculate_state(&lights[0], &SimulationContext::new(Tick(step), &[], &lights, &config));
        assert_eq!(at(0), LightState::Green);
        assert_eq!(at(19), LightState::Green);
        assert_eq!(at(20), LightState::Yellow);
        assert_eq!(at(24), LightState::Yellow);
    }

    #[test]
    fn green_extended_when_neighbor_about_to_release() {
        let mut lights = crossroad();
        lights[0].queue_length   = 4;
        lights[2].steps_in_state = 33;
        let config = AlgorithmConfig::default();
        let algo   = CoordinatedAlgorithm::default();

        let at = |step| algo.calculate_state(&lights[0], &SimulationContext::new(Tick(step), &[], &lights, &config));
        assert_eq!(at(24), LightState::Green);
        assert_eq!(at(25), LightState::Yellow);
    }

    #[test]
    fn non_green_passes_through() {
        let lights = crossroad();
        let config = AlgorithmConfig::default();
        let coord  = CoordinatedAlgorithm::default();
        let base   = AdaptiveAlgorithm::default();

        for step in 29..69u64 {
            let ctx = SimulationContext::new(Tick(step), &[], &lights, &config);
            assert_eq!(coord.calculate_state(&lights[0], &ctx), base.calculate_state(&lights[0], &ctx));
        }
    }

    #[test]
    fn extension_grows_green_up_to_cap() {
        let mut lights = crossroad();
        lights[0].queue_length   = 4;
        lights[2].steps_in_state = 33;
        let config = AlgorithmConfig::default();
        let algo   = CoordinatedAlgorithm::default();

        let ctx  = SimulationContext::new(Tick(0), &[], &lights, &config);
        assert_eq!(algo.update_light(&lights[0], &ctx).green_duration, 34);

        lights[0].green_duration = 58;
        let ctx  = SimulationContext::new(Tick(0), &[], &lights, &config);
        assert_eq!(algo.update_light(&lights[0], &ctx).green_duration, 60);
    }
}

#[cfg(test)]
mod registry {
    use serde_json::{Value, json};

    use crate::{
        ALGORITHMS, AdaptiveConfig, AlgorithmConfig, AlgorithmKind, ControlError,
        CoordinatedConfig, OffsetCalculation, StaticConfig, algorithm_info, create_algorithm,
    };

    #[test]
    fn unknown_identifier_is_rejected() {
        assert!(matches!(
            create_algorithm("fuzzy", &json!({})),
            Err(ControlError::UnknownAlgorithm(id)) if id == "fuzzy"
        ));
        assert!("Static".parse::<AlgorithmKind>().is_err());
    }

    #[test]
    fn every_kind_builds_with_defaults() {
        for kind in AlgorithmKind::ALL {
            let algo = create_algorithm(kind.as_str(), &Value::Null).unwrap();
            assert_eq!(algo.kind(), kind);
            assert_eq!(kind.to_string().parse::<AlgorithmKind>().unwrap(), kind);
        }
    }

    #[test]
    fn table_defaults_match_config_defaults() {
        let defaults = [
            serde_json::to_value(StaticConfig::default()).unwrap(),
            serde_json::to_value(AdaptiveConfig::default()).unwrap(),
            serde_json::to_value(CoordinatedConfig::default()).unwrap(),
        ];
        for (info, values) in algorithm_info().iter().zip(&defaults) {
            for p in info.parameters {
                let v = values[p.name].as_f64().unwrap();
                assert_eq!(v, p.default, "{} {}", info.id, p.name);
                assert!(p.min <= p.default && p.default <= p.max);
            }
        }
    }

    #[test]
    fn partial_config_fills_defaults() {
        let cfg = AlgorithmConfig::from_json(AlgorithmKind::Static, &json!({"green_duration": 40})).unwrap();
        assert_eq!(
            cfg,
            AlgorithmConfig::Static(StaticConfig { green_duration: 40, ..Default::default() })
        );
    }

    #[test]
    fn nested_adaptive_settings() {
        let cfg = AlgorithmConfig::from_json(
            AlgorithmKind::Coordinated,
            &json!({"offset_calculation": "none", "adaptive": {"max_green_time": 45}}),
        )
        .unwrap();
        let AlgorithmConfig::Coordinated(c) = cfg else { panic!("wrong variant") };
        assert_eq!(c.offset_calculation, OffsetCalculation::None);
        assert_eq!(c.adaptive.max_green_time, 45);
        assert_eq!(c.adaptive.min_green_time, 10);
    }

    #[test]
    fn out_of_range_value_is_rejected() {
        let err = AlgorithmConfig::from_json(AlgorithmKind::Static, &json!({"green_duration": 5})).unwrap_err();
        assert!(matches!(err, ControlError::OutOfRange { name: "green_duration", .. }));

        let err = AlgorithmConfig::from_json(AlgorithmKind::Adaptive, &json!({"adaptation_rate": 2.0})).unwrap_err();
        assert!(matches!(err, ControlError::OutOfRange { name: "adaptation_rate", .. }));
    }

    #[test]
    fn malformed_configs_are_rejected() {
        for (kind, value) in [
            (AlgorithmKind::Static, json!({"bogus": 1})),
            (AlgorithmKind::Static, json!({"green_duration": "long"})),
            (AlgorithmKind::Adaptive, json!(5)),
            (AlgorithmKind::Adaptive, json!({"queue_threshold_medium": 20, "queue_threshold_high": 5})),
            (AlgorithmKind::Coordinated, json!({"min_offset": 20, "max_offset": 10})),
            (AlgorithmKind::Coordinated, json!({"offset_calculation": "random"})),
        ] {
            assert!(
                matches!(AlgorithmConfig::from_json(kind, &value), Err(ControlError::InvalidConfig { .. })),
                "{kind}: {value}"
            );
        }
    }

    #[test]
    fn listed_but_unread_keys_are_accepted_and_checked() {
        let cfg = AlgorithmConfig::from_json(AlgorithmKind::Adaptive, &json!({"base_green_time": 25}))
            .unwrap();
        let AlgorithmConfig::Adaptive(a) = cfg else { panic!("wrong variant") };
        assert_eq!(a.base_green_time, 25);

        let cfg = AlgorithmConfig::from_json(
            AlgorithmKind::Coordinated,
            &json!({"base_green_time": 30, "sync_tolerance": 4}),
        )
        .unwrap();
        let AlgorithmConfig::Coordinated(c) = cfg else { panic!("wrong variant") };
        assert_eq!((c.base_green_time, c.sync_tolerance), (30, 4));

        let err = AlgorithmConfig::from_json(AlgorithmKind::Adaptive, &json!({"base_green_time": 5}))
            .unwrap_err();
        assert!(matches!(err, ControlError::OutOfRange { name: "base_green_time", .. }));
        let err = AlgorithmConfig::from_json(AlgorithmKind::Coordinated, &json!({"sync_tolerance": 50}))
            .unwrap_err();
        assert!(matches!(err, ControlError::OutOfRange { name: "sync_tolerance", .. }));
    }

    #[test]
    fn metadata_serializes_with_wire_keys() {
        let v = serde_json::to_value(&ALGORITHMS[2]).unwrap();
        assert_eq!(v["id"], "coordinated");
        assert_eq!(v["parameters"][0]["name"], "coordination_radius");
        assert_eq!(v["parameters"][0]["type"], "float");
        assert_eq!(v["parameters"][2]["type"], "int");
    }
}

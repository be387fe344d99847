//! Property-based tests for the media player
//!
//! Uses proptest to verify the validation ranges, channel equivalence and
//! play/loop invariants across many random inputs.

use media_player::sim::SimEnvironment;
use media_player::{MediaPlayer, PlayerConfig, RawValue, UiEvent};
use proptest::prelude::*;

// ===== Helpers =====

fn attached() -> (MediaPlayer, SimEnvironment) {
    let env = SimEnvironment::new();
    let mut player = MediaPlayer::new(env.bindings(), PlayerConfig::default());
    player.attach().expect("attach should succeed");
    (player, env)
}

fn outside(low: f64, high: f64) -> impl Strategy<Value = f64> {
    prop_oneof![(low - 1000.0)..(low - 1e-6), (high + 1e-6)..(high + 1000.0)]
}

// ===== Property Tests =====

proptest! {
    /// Property: every in-range volume is applied and displayed as given
    #[test]
    fn volume_in_range_is_applied(volume in 0.0f64..=1.0) {
        let (mut player, env) = attached();

        player.set_volume(Some(RawValue::Number(volume))).unwrap();

        prop_assert_eq!(player.params().volume, volume);
        prop_assert_eq!(env.media.volume(), volume);
        prop_assert_eq!(env.controls.volume.number(), Some(volume));
    }

    /// Property: out-of-range volume is rejected and nothing changes
    #[test]
    fn volume_out_of_range_is_rejected(volume in outside(0.0, 1.0)) {
        let (mut player, env) = attached();
        let updates = env.controls.volume.update_count();

        let result = player.set_volume(Some(RawValue::Number(volume)));

        prop_assert!(result.unwrap_err().is_invalid_parameter());
        prop_assert_eq!(player.params().volume, 1.0);
        prop_assert_eq!(env.media.volume(), 1.0);
        prop_assert_eq!(env.controls.volume.update_count(), updates);
    }

    /// Property: gain is accepted exactly on [0, 3]
    #[test]
    fn gain_range_is_enforced(gain in -1.0f64..4.0) {
        let (mut player, env) = attached();
        let graph = *player.signal_graph().unwrap();

        let result = player.set_gain(Some(RawValue::Number(gain)));

        if (0.0..=3.0).contains(&gain) {
            prop_assert!(result.is_ok());
            prop_assert_eq!(env.audio.param(graph.gain_node()), Some(f64::from(gain as f32)));
        } else {
            prop_assert!(result.is_err());
            prop_assert_eq!(player.params().gain, 1.0);
        }
    }

    /// Property: balance is accepted exactly on [-1, 1]
    #[test]
    fn balance_range_is_enforced(balance in -2.0f64..2.0) {
        let (mut player, _env) = attached();

        let result = player.set_balance(RawValue::Number(balance));

        prop_assert_eq!(result.is_ok(), (-1.0..=1.0).contains(&balance));
        let expected = if result.is_ok() { balance } else { 0.0 };
        prop_assert_eq!(player.params().balance, expected);
    }

    /// Property: a control input and the equivalent attribute change reach
    /// the same state
    #[test]
    fn channels_are_equivalent(
        volume in 0.0f64..=1.0,
        gain in 0.0f64..=3.0,
        balance in -1.0f64..=1.0,
    ) {
        let (mut via_ui, ui_env) = attached();
        let (mut via_attr, attr_env) = attached();

        via_ui.handle_ui_event(UiEvent::VolumeInput(RawValue::Number(volume))).unwrap();
        via_ui.handle_ui_event(UiEvent::GainInput(RawValue::Number(gain))).unwrap();
        via_ui.handle_ui_event(UiEvent::BalanceInput(RawValue::Number(balance))).unwrap();

        via_attr.attribute_changed("volume", Some(&volume.to_string())).unwrap();
        via_attr.attribute_changed("gain", Some(&gain.to_string())).unwrap();
        via_attr.attribute_changed("balance", Some(&balance.to_string())).unwrap();

        prop_assert_eq!(via_ui.params(), via_attr.params());
        prop_assert_eq!(ui_env.media.volume(), attr_env.media.volume());
        prop_assert_eq!(ui_env.controls.gain.number(), attr_env.controls.gain.number());
    }

    /// Property: play state follows the parity of toggles, and a frame is
    /// pending exactly while playing
    #[test]
    fn toggle_play_parity(toggles in 0usize..12) {
        let (mut player, env) = attached();

        for _ in 0..toggles {
            player.toggle_play().unwrap();
        }

        let playing = toggles % 2 == 1;
        prop_assert_eq!(player.is_playing(), playing);
        prop_assert_eq!(player.is_animating(), playing);
        prop_assert_eq!(env.scheduler.pending().len(), usize::from(playing));
    }

    /// Property: toggling loop twice restores the flag
    #[test]
    fn toggle_loop_is_an_involution(initial in any::<bool>()) {
        let mut config = PlayerConfig::default();
        config.transport.looping = initial;
        let env = SimEnvironment::new();
        let mut player = MediaPlayer::new(env.bindings(), config);
        player.attach().unwrap();

        player.toggle_loop().unwrap();
        prop_assert_eq!(env.media.is_looping(), !initial);
        player.toggle_loop().unwrap();
        prop_assert_eq!(env.media.is_looping(), initial);
    }

    /// Property: seeking within the duration lands exactly; past it is rejected
    #[test]
    fn seek_respects_duration(duration in 1.0f64..10_000.0, fraction in 0.0f64..=1.0) {
        let (mut player, env) = attached();
        env.load_metadata(&mut player, duration);
        let target = duration * fraction;

        player.seek_to(RawValue::Number(target)).unwrap();
        prop_assert_eq!(player.current_time(), target);

        let result = player.seek_to(RawValue::Number(duration + 1.0));
        prop_assert!(result.is_err());
        prop_assert_eq!(player.current_time(), target);
    }

    /// Property: skipping never leaves [0, duration]
    #[test]
    fn skips_stay_within_bounds(
        duration in 1.0f64..600.0,
        moves in prop::collection::vec(any::<bool>(), 1..40),
    ) {
        let (mut player, env) = attached();
        env.load_metadata(&mut player, duration);

        for forward in moves {
            let event = if forward {
                UiEvent::SkipForwardClicked
            } else {
                UiEvent::SkipBackwardClicked
            };
            player.handle_ui_event(event).unwrap();

            let time = player.current_time();
            prop_assert!((0.0..=duration).contains(&time), "time {} outside [0, {}]", time, duration);
        }
    }

    /// Property: non-numeric text never passes validation
    #[test]
    fn non_numeric_text_is_rejected(text in "[a-zA-Z]{1,12}") {
        let (mut player, _env) = attached();

        prop_assert!(player.attribute_changed("volume", Some(&text)).is_err());
        prop_assert!(player.attribute_changed("gain", Some(&text)).is_err());
        prop_assert!(player.attribute_changed("balance", Some(&text)).is_err());
    }
}

//! Property-based tests for timeout conversion and controller invariants.

#![cfg(test)]

use bflb_wdt::prelude::*;
use proptest::prelude::*;

fn attach() -> Result<BflbWatchdog<SimRegisters>, TestCaseError> {
    BflbWatchdog::new(SimRegisters::new(), "wdt-prop", WatchdogConfig::default())
        .map_err(|e| TestCaseError::fail(e.to_string()))
}

#[derive(Debug, Clone)]
enum Op {
    Start,
    Stop,
    Ping,
    SetTimeout(u32),
    Tick(u32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Start),
        Just(Op::Stop),
        Just(Op::Ping),
        (0u32..40_000).prop_map(Op::SetTimeout),
        (0u32..2_000).prop_map(Op::Tick),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_seconds_ticks_roundtrip(secs in 0u32..=16383) {
        let rate = TickRate::BL808;
        prop_assert_eq!(rate.ticks_to_seconds(rate.seconds_to_ticks(secs)), secs);
    }

    #[test]
    fn prop_ticks_seconds_truncates(ticks in 0u32..=0xFFFF) {
        let rate = TickRate::BL808;
        let secs = rate.ticks_to_seconds(ticks);
        prop_assert!(rate.seconds_to_ticks(secs) <= ticks);
        prop_assert!(ticks - rate.seconds_to_ticks(secs) < rate.ticks_per_second());
    }

    #[test]
    fn prop_timeout_always_within_bounds(requested in any::<u32>()) {
        let wdt = attach()?;
        let update = wdt.set_timeout(requested);
        prop_assert!(wdt.timeout() >= wdt.min_timeout());
        prop_assert!(wdt.timeout() <= wdt.max_timeout());
        prop_assert_eq!(update.applied, wdt.timeout());
        let at_bound = requested >= wdt.max_timeout() || requested < wdt.min_timeout();
        prop_assert_eq!(update.was_clamped(), at_bound);
    }

    #[test]
    fn prop_compare_register_never_exceeds_counter(requested in any::<u32>()) {
        let wdt = attach()?;
        let _update = wdt.set_timeout(requested);
        let ticks = wdt.registers().compare_ticks();
        prop_assert!(ticks <= 0xFFFF);
        prop_assert_eq!(ticks, wdt.timeout() * 4);
    }

    #[test]
    fn prop_every_protected_write_unlocked(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let wdt = attach()?;
        for op in ops {
            match op {
                Op::Start => wdt.start(),
                Op::Stop => wdt.stop(),
                Op::Ping => wdt.ping(),
                Op::SetTimeout(secs) => {
                    let _update = wdt.set_timeout(secs);
                }
                Op::Tick(ticks) => wdt.registers().advance_ticks(ticks),
            }
        }
        prop_assert!(wdt.registers().protected_writes_unlocked());
        prop_assert!(wdt.registers().rejected_writes().is_empty());
    }

    #[test]
    fn prop_status_tracks_last_transition(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let wdt = attach()?;
        let mut expected = WatchdogStatus::Disabled;
        for op in ops {
            match op {
                Op::Start => {
                    wdt.start();
                    expected = WatchdogStatus::Armed;
                }
                Op::Stop => {
                    wdt.stop();
                    expected = WatchdogStatus::Disabled;
                }
                Op::Ping => wdt.ping(),
                Op::SetTimeout(secs) => {
                    let _update = wdt.set_timeout(secs);
                }
                Op::Tick(ticks) => wdt.registers().advance_ticks(ticks),
            }
            prop_assert_eq!(wdt.status(), expected);
            prop_assert_eq!(wdt.registers().is_enabled(), expected == WatchdogStatus::Armed);
        }
    }

    #[test]
    fn prop_timeleft_bounded_and_restored_by_ping(ticks in 4u32..0xFFFF) {
        let wdt = attach()?;
        wdt.start();
        wdt.registers().advance_ticks(ticks);

        let before = wdt.get_timeleft();
        prop_assert!(before <= wdt.max_timeout());

        wdt.ping();
        let after = wdt.get_timeleft();
        prop_assert!(after <= wdt.max_timeout());
        prop_assert!(after > before);
    }
}

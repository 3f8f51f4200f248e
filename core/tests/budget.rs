//! Per-tick budget tests.
//!
//! Tests cover: the noise-stage carry of revenue minus expenses plus the
//! hourly accrual for the tick's simulated hours, and the policy debit.

use chrono::{DateTime, Duration, TimeZone, Utc};
use citysim_core::{
    budget_subsystem::HOURS_PER_MONTH,
    config::SimConfig,
    engine::{SimEngine, TickOutcome},
    error::SimResult,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// No catalogs, no spawns: only noise and accrual move the budget.
fn quiet_engine(run_id: &str, seed: u64) -> SimResult<SimEngine> {
    let mut config = SimConfig::default_test();
    config.tuning.event_spawn_probability = 0.0;
    SimEngine::build(run_id.into(), seed, config, t0())
}

/// 2 real seconds at 3x = 6 simulated hours. The budget gains one carry
/// of this tick's revenue minus expenses plus 6/720 of it as accrual.
#[test]
fn one_tick_budget_change() -> SimResult<()> {
    let mut engine = quiet_engine("budget-tick", 21)?;
    engine.set_acceleration(3.0);
    let before = engine.city().economy.budget;

    let outcome = engine.tick(t0() + Duration::seconds(2))?;
    assert!(matches!(outcome, TickOutcome::Completed { tick: 1, .. }), "{outcome:?}");

    let economy = engine.city().economy;
    let net = economy.revenue - economy.expenses;
    let expected = before + net + net / HOURS_PER_MONTH * 6.0;
    assert!(
        (economy.budget - expected).abs() < 1e-9,
        "budget {} expected {expected} (net {net})",
        economy.budget
    );
    Ok(())
}

#[test]
fn zero_acceleration_still_carries_without_accrual() -> SimResult<()> {
    let mut engine = quiet_engine("budget-frozen", 22)?;
    engine.set_acceleration(0.0);
    let before = engine.city().economy.budget;

    engine.tick(t0() + Duration::seconds(1))?;

    let economy = engine.city().economy;
    let expected = before + (economy.revenue - economy.expenses);
    assert!((economy.budget - expected).abs() < 1e-9, "{} vs {expected}", economy.budget);
    Ok(())
}

#[test]
fn policy_debit_lands_before_the_next_tick_carry() -> SimResult<()> {
    let mut config = SimConfig::builtin()?;
    config.tuning.event_spawn_probability = 0.0;
    let mut engine = SimEngine::build("budget-policy".into(), 23, config, t0())?;
    engine.activate_policy("p2");
    assert_eq!(engine.city().economy.budget, 310.0);

    engine.tick(t0() + Duration::seconds(1))?;

    // p2 takes 60 days, so one hour leaves its impact unapplied.
    let economy = engine.city().economy;
    let net = economy.revenue - economy.expenses;
    let expected = 310.0 + net + net / HOURS_PER_MONTH;
    assert!((economy.budget - expected).abs() < 1e-9, "{} vs {expected}", economy.budget);
    Ok(())
}

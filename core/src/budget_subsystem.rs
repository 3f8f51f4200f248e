//! Budget accrual — carries monthly revenue and expenses into the budget
//! at an hourly rate for the simulated time the tick covered.
//!
//! Execution: every tick, after the city event stage, so this tick's
//! policy and event deltas on revenue/expenses are already in.

use crate::{
    city::CityState,
    clock::DAYS_PER_MONTH,
    error::SimResult,
    event::SimEvent,
    rng::SubsystemRng,
    subsystem::{SimSubsystem, TickContext},
    types::HOURS_PER_DAY,
};

/// Hours in the fixed 30-day month.
pub const HOURS_PER_MONTH: f64 = HOURS_PER_DAY * DAYS_PER_MONTH as f64;

#[derive(Debug, Default)]
pub struct BudgetSubsystem;

impl BudgetSubsystem {
    pub fn new() -> Self {
        Self
    }
}

/// Net budget change over `sim_hours` given monthly revenue and expenses.
pub fn accrual(revenue: f64, expenses: f64, sim_hours: f64) -> f64 {
    (revenue / HOURS_PER_MONTH - expenses / HOURS_PER_MONTH) * sim_hours
}

impl SimSubsystem for BudgetSubsystem {
    fn name(&self) -> &'static str { "budget" }

    fn update(
        &mut self,
        ctx: &TickContext,
        city: &mut CityState,
        _rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let economy = &mut city.economy;
        economy.budget += accrual(economy.revenue, economy.expenses, ctx.sim_hours);
        Ok(vec![])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_full_month_accrues_the_monthly_surplus() {
        let net = accrual(45.0, 40.0, HOURS_PER_MONTH);
        assert!((net - 5.0).abs() < 1e-9, "{net}");
        assert_eq!(accrual(45.0, 40.0, 0.0), 0.0);
    }
}

//! Landed-cost evaluation for profitability simulations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::allocation::prorate;
use crate::currency::{Currency, RateBook};
use crate::domain::simulation::{CostBasis, Simulation};
use crate::errors::{CoreError, CoreResult};
use crate::utils::percentage;

const KG_PER_TON: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Landed-cost figures for one manifest line. All amounts are GNF.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostLineReport {
    pub article_id: Uuid,
    pub quantity: Decimal,
    pub unit_purchase_gnf: Decimal,
    pub purchase_value_gnf: Decimal,
    pub mass_kg: Decimal,
    pub allocated_logistics_gnf: Decimal,
    pub logistics_per_unit_gnf: Decimal,
    pub cost_price_per_unit_gnf: Decimal,
    pub selling_price_gnf: Decimal,
    pub unit_margin_gnf: Decimal,
    pub margin_percentage: Decimal,
}

/// Result of evaluating one simulation: per-line landed costs, margin
/// figures, and truck utilization. Amounts stay in GNF at full precision;
/// [`CostReport::in_currency`] projects them for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostReport {
    pub simulation_id: Uuid,
    pub basis: CostBasis,
    pub currency: Currency,
    pub rates: RateBook,
    pub lines: Vec<CostLineReport>,
    pub total_purchase_value_gnf: Decimal,
    pub total_mass_kg: Decimal,
    pub fixed_logistics_gnf: Decimal,
    pub variable_logistics_gnf: Decimal,
    pub total_logistics_gnf: Decimal,
    pub total_cost_gnf: Decimal,
    pub total_revenue_gnf: Decimal,
    pub total_margin_gnf: Decimal,
    pub total_margin_percentage: Decimal,
    pub truck_utilization_percentage: Decimal,
    pub truck_overflow: bool,
}

impl CostReport {
    /// Projects every monetary amount into `currency` by dividing by the
    /// simulation's frozen rate. Quantities, masses, and percentages are
    /// unchanged. Identity for GNF.
    pub fn in_currency(&self, currency: Currency) -> CoreResult<CostReport> {
        if currency == self.currency {
            return Ok(self.clone());
        }
        let mut projected = self.clone();
        projected.currency = currency;
        projected.total_purchase_value_gnf =
            self.rates.from_base(self.total_purchase_value_gnf, currency)?;
        projected.fixed_logistics_gnf = self.rates.from_base(self.fixed_logistics_gnf, currency)?;
        projected.variable_logistics_gnf =
            self.rates.from_base(self.variable_logistics_gnf, currency)?;
        projected.total_logistics_gnf = self.rates.from_base(self.total_logistics_gnf, currency)?;
        projected.total_cost_gnf = self.rates.from_base(self.total_cost_gnf, currency)?;
        projected.total_revenue_gnf = self.rates.from_base(self.total_revenue_gnf, currency)?;
        projected.total_margin_gnf = self.rates.from_base(self.total_margin_gnf, currency)?;
        for (line, source) in projected.lines.iter_mut().zip(&self.lines) {
            line.unit_purchase_gnf = self.rates.from_base(source.unit_purchase_gnf, currency)?;
            line.purchase_value_gnf = self.rates.from_base(source.purchase_value_gnf, currency)?;
            line.allocated_logistics_gnf =
                self.rates.from_base(source.allocated_logistics_gnf, currency)?;
            line.logistics_per_unit_gnf =
                self.rates.from_base(source.logistics_per_unit_gnf, currency)?;
            line.cost_price_per_unit_gnf =
                self.rates.from_base(source.cost_price_per_unit_gnf, currency)?;
            line.selling_price_gnf = self.rates.from_base(source.selling_price_gnf, currency)?;
            line.unit_margin_gnf = self.rates.from_base(source.unit_margin_gnf, currency)?;
        }
        Ok(projected)
    }
}

/// Evaluates simulations into [`CostReport`]s.
pub struct CostingService;

impl CostingService {
    /// Runs the full landed-cost computation for one simulation.
    ///
    /// Purchase prices are converted to GNF with the simulation's frozen
    /// rates, the logistics pool is prorated over the lines by the
    /// simulation's basis, and per-line margins are derived against the
    /// selling prices. Fails without partial results on an empty manifest,
    /// a non-positive line quantity, or an unusable exchange rate.
    pub fn evaluate(simulation: &Simulation) -> CoreResult<CostReport> {
        if simulation.lines.is_empty() {
            return Err(CoreError::EmptySimulation);
        }
        if let Some(line) = simulation
            .lines
            .iter()
            .find(|line| line.quantity <= Decimal::ZERO)
        {
            return Err(CoreError::NonPositiveQuantity(line.quantity));
        }

        let rates = simulation.rate_book();

        let mut unit_purchases = Vec::with_capacity(simulation.lines.len());
        let mut purchase_values = Vec::with_capacity(simulation.lines.len());
        let mut masses = Vec::with_capacity(simulation.lines.len());
        let mut total_purchase_value = Decimal::ZERO;
        let mut total_mass = Decimal::ZERO;
        for line in &simulation.lines {
            let unit_purchase = rates.to_base(line.unit_price, line.currency)?;
            let purchase_value = unit_purchase * line.quantity;
            let mass = line.mass_kg();
            total_purchase_value += purchase_value;
            total_mass += mass;
            unit_purchases.push(unit_purchase);
            purchase_values.push(purchase_value);
            masses.push(mass);
        }

        let fixed_logistics = simulation.logistics.fixed_total();
        let variable_logistics = simulation.logistics.variable_total(total_mass);
        let total_logistics = fixed_logistics + variable_logistics;

        let weights = match simulation.basis {
            CostBasis::Value => &purchase_values,
            CostBasis::Weight => &masses,
        };
        let allocations = prorate(total_logistics, weights)?;

        let mut lines = Vec::with_capacity(simulation.lines.len());
        let mut total_cost = Decimal::ZERO;
        let mut total_revenue = Decimal::ZERO;
        for (index, line) in simulation.lines.iter().enumerate() {
            let allocated = allocations[index];
            let logistics_per_unit = allocated / line.quantity;
            let cost_per_unit = unit_purchases[index] + logistics_per_unit;
            let unit_margin = line.selling_price_gnf - cost_per_unit;
            // Summing value + allocation keeps cost conservation exact even
            // when the per-unit quotient is inexact.
            total_cost += purchase_values[index] + allocated;
            total_revenue += line.selling_price_gnf * line.quantity;
            lines.push(CostLineReport {
                article_id: line.article_id,
                quantity: line.quantity,
                unit_purchase_gnf: unit_purchases[index],
                purchase_value_gnf: purchase_values[index],
                mass_kg: masses[index],
                allocated_logistics_gnf: allocated,
                logistics_per_unit_gnf: logistics_per_unit,
                cost_price_per_unit_gnf: cost_per_unit,
                selling_price_gnf: line.selling_price_gnf,
                unit_margin_gnf: unit_margin,
                margin_percentage: percentage(unit_margin, cost_per_unit),
            });
        }

        let total_margin = total_revenue - total_cost;
        let capacity_kg = simulation.truck_capacity_tons * KG_PER_TON;
        let truck_utilization = percentage(total_mass, capacity_kg);

        debug!(
            simulation = %simulation.name,
            basis = %simulation.basis,
            lines = lines.len(),
            "evaluated simulation"
        );

        Ok(CostReport {
            simulation_id: simulation.id,
            basis: simulation.basis,
            currency: Currency::GNF,
            rates,
            lines,
            total_purchase_value_gnf: total_purchase_value,
            total_mass_kg: total_mass,
            fixed_logistics_gnf: fixed_logistics,
            variable_logistics_gnf: variable_logistics,
            total_logistics_gnf: total_logistics,
            total_cost_gnf: total_cost,
            total_revenue_gnf: total_revenue,
            total_margin_gnf: total_margin,
            total_margin_percentage: percentage(total_margin, total_cost),
            truck_utilization_percentage: truck_utilization,
            truck_overflow: truck_utilization > Decimal::ONE_HUNDRED,
        })
    }
}

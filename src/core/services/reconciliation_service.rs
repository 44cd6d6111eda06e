//! Attribution of validated orders onto active sales forecasts.

use chrono::NaiveDate;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::forecast::Forecast;
use crate::domain::order::CommercialOrder;
use crate::errors::{CoreError, CoreResult};
use crate::storage::{ForecastRepo, OrderRepo};

/// What one order contributed to the forecasts it was attributed onto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributionReport {
    pub order_id: Uuid,
    pub order_reference: String,
    pub attributed_lines: usize,
    pub affected_forecasts: Vec<Uuid>,
    /// Stock items skipped because a forecast carried more than one line for
    /// them. Attribution never guesses between duplicates.
    pub ambiguous_stock_items: Vec<Uuid>,
}

/// Outcome of a full accumulator rebuild over a date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecalculationReport {
    pub orders_processed: usize,
    pub orders_rolled_back: Vec<String>,
    pub attributed_lines: usize,
    pub ambiguous_stock_items: usize,
    pub forecasts_saved: usize,
}

/// Attributes realized quantities and values from validated orders onto the
/// matching forecast lines.
pub struct ReconciliationService;

impl ReconciliationService {
    /// Adds one validated order's lines onto every active forecast whose
    /// window covers the order date. Purely in-memory; accumulation is
    /// additive, so replaying a set of orders in any traversal order lands
    /// on the same state.
    pub fn attribute(
        order: &CommercialOrder,
        forecasts: &mut [Forecast],
    ) -> CoreResult<AttributionReport> {
        if !order.is_validated() {
            return Err(CoreError::OrderNotValidated(order.reference.clone()));
        }

        let mut report = AttributionReport {
            order_id: order.id,
            order_reference: order.reference.clone(),
            attributed_lines: 0,
            affected_forecasts: Vec::new(),
            ambiguous_stock_items: Vec::new(),
        };

        for forecast in forecasts.iter_mut() {
            if !forecast.is_active() || !forecast.covers(order.order_date) {
                continue;
            }
            let mut touched = false;
            for client in order.clients.iter().filter(|client| !client.is_rejected()) {
                for item in &client.items {
                    let mut matches = forecast
                        .items
                        .iter_mut()
                        .filter(|line| line.stock_item_id == item.stock_item_id);
                    let Some(first) = matches.next() else {
                        continue;
                    };
                    if matches.next().is_some() {
                        warn!(
                            forecast = %forecast.name,
                            stock_item = %item.stock_item_id,
                            order = %order.reference,
                            "duplicate forecast lines for stock item, skipping attribution"
                        );
                        if !report.ambiguous_stock_items.contains(&item.stock_item_id) {
                            report.ambiguous_stock_items.push(item.stock_item_id);
                        }
                        continue;
                    }
                    first.accumulate(item.quantity, item.total_gnf());
                    report.attributed_lines += 1;
                    touched = true;
                }
            }
            if touched {
                forecast.refresh_totals();
                forecast.touch();
                report.affected_forecasts.push(forecast.id);
            }
        }

        debug!(
            order = %order.reference,
            lines = report.attributed_lines,
            forecasts = report.affected_forecasts.len(),
            "attributed order"
        );
        Ok(report)
    }

    /// Loads the active forecasts covering the order date, attributes the
    /// order, and persists the affected forecasts as one unit. A persistence
    /// failure leaves no part of the order durable.
    pub fn attribute_order(
        order: &CommercialOrder,
        forecast_repo: &dyn ForecastRepo,
    ) -> CoreResult<AttributionReport> {
        let mut forecasts = forecast_repo.active_covering(order.order_date)?;
        let report = Self::attribute(order, &mut forecasts)?;
        if !report.affected_forecasts.is_empty() {
            let affected: Vec<Forecast> = forecasts
                .into_iter()
                .filter(|forecast| report.affected_forecasts.contains(&forecast.id))
                .collect();
            forecast_repo.save_forecasts(&affected)?;
        }
        Ok(report)
    }

    /// Rebuilds every active forecast's accumulators from scratch: zeroes
    /// them, replays the validated orders in `[start, end]` (both bounds
    /// optional), and persists the result in one save.
    ///
    /// An order whose attribution fails is rolled back in isolation and the
    /// replay continues with the next order.
    pub fn recalculate(
        order_repo: &dyn OrderRepo,
        forecast_repo: &dyn ForecastRepo,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> CoreResult<RecalculationReport> {
        let mut forecasts = forecast_repo.list_active()?;
        for forecast in &mut forecasts {
            forecast.reset_realization();
        }

        let orders = order_repo.validated_in_range(start, end)?;
        let mut report = RecalculationReport {
            orders_processed: 0,
            orders_rolled_back: Vec::new(),
            attributed_lines: 0,
            ambiguous_stock_items: 0,
            forecasts_saved: 0,
        };
        for order in &orders {
            let snapshot = forecasts.clone();
            match Self::attribute(order, &mut forecasts) {
                Ok(attribution) => {
                    report.orders_processed += 1;
                    report.attributed_lines += attribution.attributed_lines;
                    report.ambiguous_stock_items += attribution.ambiguous_stock_items.len();
                }
                Err(err) => {
                    warn!(
                        order = %order.reference,
                        error = %err,
                        "attribution failed, rolling the order back"
                    );
                    forecasts = snapshot;
                    report.orders_rolled_back.push(order.reference.clone());
                }
            }
        }

        forecast_repo.save_forecasts(&forecasts)?;
        report.forecasts_saved = forecasts.len();
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::RateBook;
    use crate::domain::forecast::ForecastItem;
    use crate::domain::order::{OrderClient, OrderItem};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn active_forecast(stock_item: Uuid) -> Forecast {
        let mut forecast = Forecast::new(
            "Q1",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            RateBook::new(),
        )
        .expect("forecast");
        forecast.add_item(ForecastItem::new(stock_item, dec!(100), dec!(50000)));
        forecast.activate().expect("activate");
        forecast
    }

    fn validated_order(stock_item: Uuid, date: NaiveDate) -> CommercialOrder {
        let mut order = CommercialOrder::new(format!("CMD-{date}"), date);
        let client_id = order.add_client(OrderClient::new("Diallo")).expect("client");
        order
            .add_item(client_id, OrderItem::new(stock_item, dec!(30), dec!(55000)))
            .expect("item");
        order.validate("admin").expect("validate");
        order
    }

    #[test]
    fn draft_orders_are_refused() {
        let stock_item = Uuid::new_v4();
        let mut forecasts = vec![active_forecast(stock_item)];
        let order = CommercialOrder::new("CMD-1", NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());
        let err =
            ReconciliationService::attribute(&order, &mut forecasts).expect_err("draft order");
        assert!(matches!(err, CoreError::OrderNotValidated(reference) if reference == "CMD-1"));
    }

    #[test]
    fn attribution_fills_accumulators_and_totals() {
        let stock_item = Uuid::new_v4();
        let mut forecasts = vec![active_forecast(stock_item)];
        let order =
            validated_order(stock_item, NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());

        let report =
            ReconciliationService::attribute(&order, &mut forecasts).expect("attribute");
        assert_eq!(report.attributed_lines, 1);
        assert_eq!(report.affected_forecasts, vec![forecasts[0].id]);

        let item = &forecasts[0].items[0];
        assert_eq!(item.realized_quantity, dec!(30));
        assert_eq!(item.realized_value_gnf, dec!(1650000));
        assert_eq!(item.realization_percentage, dec!(33));
        assert_eq!(forecasts[0].total_realized_value, dec!(1650000));
    }

    #[test]
    fn out_of_range_orders_leave_forecasts_untouched() {
        let stock_item = Uuid::new_v4();
        let mut forecasts = vec![active_forecast(stock_item)];
        let before = forecasts.clone();
        let order =
            validated_order(stock_item, NaiveDate::from_ymd_opt(2024, 4, 5).unwrap());

        let report =
            ReconciliationService::attribute(&order, &mut forecasts).expect("attribute");
        assert_eq!(report.attributed_lines, 0);
        assert!(report.affected_forecasts.is_empty());
        assert_eq!(forecasts, before);
    }

    #[test]
    fn rejected_clients_contribute_nothing() {
        let stock_item = Uuid::new_v4();
        let mut forecasts = vec![active_forecast(stock_item)];
        let date = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        let mut order = CommercialOrder::new("CMD-2", date);
        let client_id = order.add_client(OrderClient::new("Bah")).expect("client");
        order
            .add_item(client_id, OrderItem::new(stock_item, dec!(30), dec!(55000)))
            .expect("item");
        order.clients[0].reject("unpaid");
        order.validate("admin").expect("validate");

        let report =
            ReconciliationService::attribute(&order, &mut forecasts).expect("attribute");
        assert_eq!(report.attributed_lines, 0);
        assert_eq!(forecasts[0].items[0].realized_quantity, Decimal::ZERO);
    }

    #[test]
    fn duplicate_forecast_lines_are_skipped_not_guessed() {
        let stock_item = Uuid::new_v4();
        let mut forecast = active_forecast(stock_item);
        forecast.add_item(ForecastItem::new(stock_item, dec!(50), dec!(48000)));
        let mut forecasts = vec![forecast];
        let order =
            validated_order(stock_item, NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());

        let report =
            ReconciliationService::attribute(&order, &mut forecasts).expect("attribute");
        assert_eq!(report.attributed_lines, 0);
        assert_eq!(report.ambiguous_stock_items, vec![stock_item]);
        assert_eq!(forecasts[0].items[0].realized_quantity, Decimal::ZERO);
        assert_eq!(forecasts[0].items[1].realized_quantity, Decimal::ZERO);
    }

    #[test]
    fn attribution_is_additive_across_orders() {
        let stock_item = Uuid::new_v4();
        let mut forecasts = vec![active_forecast(stock_item)];
        let first =
            validated_order(stock_item, NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut second = CommercialOrder::new("CMD-3", date);
        let client_id = second.add_client(OrderClient::new("Toure")).expect("client");
        second
            .add_item(client_id, OrderItem::new(stock_item, dec!(20), dec!(60000)))
            .expect("item");
        second.validate("admin").expect("validate");

        ReconciliationService::attribute(&first, &mut forecasts).expect("first");
        ReconciliationService::attribute(&second, &mut forecasts).expect("second");

        let item = &forecasts[0].items[0];
        assert_eq!(item.realized_quantity, dec!(50));
        assert_eq!(item.realized_value_gnf, dec!(2850000));
        assert_eq!(item.realization_percentage, dec!(57));
    }
}

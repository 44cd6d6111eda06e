//! Order and client totals, plus the unit-price suggestion policy.

use rust_decimal::Decimal;

use crate::domain::article::StockItem;
use crate::domain::order::{CommercialOrder, OrderClient, OrderItem};
use crate::domain::price_list::PriceList;

/// Stateless aggregation helpers over commercial orders.
pub struct OrderService;

impl OrderService {
    /// Line total in GNF. A missing unit price counts as zero.
    pub fn item_total_gnf(item: &OrderItem) -> Decimal {
        item.total_gnf()
    }

    /// One client's total in GNF, regardless of the client's status. Callers
    /// rendering rejected clients decide for themselves whether to show it.
    pub fn client_total_gnf(client: &OrderClient) -> Decimal {
        client.items.iter().map(OrderItem::total_gnf).sum()
    }

    /// The order total in GNF. Rejected clients are excluded.
    pub fn order_total_gnf(order: &CommercialOrder) -> Decimal {
        order
            .clients
            .iter()
            .filter(|client| !client.is_rejected())
            .map(Self::client_total_gnf)
            .sum()
    }

    /// Suggests a unit price for a new order line: the active price list's
    /// entry for the stock item (wholesale before retail), else the stock
    /// item's own purchase price, else `fallback`, else zero.
    pub fn suggest_unit_price(
        stock_item: &StockItem,
        active_price_list: Option<&PriceList>,
        fallback: Option<Decimal>,
    ) -> Decimal {
        if let Some(entry) =
            active_price_list.and_then(|list| list.entry_for(&stock_item.name))
        {
            if let Some(price) = entry.wholesale_price_gnf.or(entry.retail_price_gnf) {
                return price;
            }
        }
        stock_item
            .purchase_price_gnf
            .or(fallback)
            .unwrap_or_default()
    }
}

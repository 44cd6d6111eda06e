pub mod article;
pub mod common;
pub mod forecast;
pub mod order;
pub mod price_list;
pub mod simulation;

pub use article::{Article, StockItem};
pub use common::{Identifiable, NamedEntity};
pub use forecast::{Forecast, ForecastItem, ForecastStatus};
pub use order::{ClientStatus, CommercialOrder, OrderClient, OrderItem, OrderStatus};
pub use price_list::{PriceList, PriceListEntry};
pub use simulation::{CostBasis, LogisticsSchedule, Simulation, SimulationLine};

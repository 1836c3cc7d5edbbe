//! Application layer: use cases and the ports they depend on, wired
//! together with whichever adapters the deployment chooses.

pub mod error;
pub mod ports;
pub mod use_cases;

pub use error::{AppError, AppResult};
pub use ports::{Clock, Logger, Pricing, StaticPricingCatalog, SystemClock, TracingLogger};
pub use use_cases::{AddItemToOrder, AddItemToOrderInput, CreateOrder, CreateOrderInput};

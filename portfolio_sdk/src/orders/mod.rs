pub mod batch;
pub mod collection;
pub mod token_order;

pub use collection::OrderCollection;
pub use token_order::{FeesOn, OrderKind, OrderState, QuotedOrder, TokenOrder};

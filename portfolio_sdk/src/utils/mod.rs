pub mod number_conversion;
pub mod portfolio_id;
pub mod ratio;
pub mod uint;

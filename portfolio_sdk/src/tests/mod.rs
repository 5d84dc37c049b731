#[cfg(test)]
pub fn init_tracing_in_tests() {
    portfolio_models::log::try_init_tracing();
}

use std::collections::HashSet;
use std::str::FromStr;

use error_stack::{ResultExt, report};
use portfolio_models::constants::chains::Chain;
use portfolio_models::network::RateLimitWindow;

use crate::error::{Error, SdkResult};
use crate::routers::AggregatorType;

pub const ENV_CHAIN: &str = "PORTFOLIO_CHAIN";
pub const ENV_ONLY_USE_AGGREGATORS: &str = "ONLY_USE_AGGREGATORS";
pub const ENV_ZERO_X_API_KEY: &str = "ZERO_X_API_KEY";
pub const ENV_PARASWAP_RATE_LIMIT: &str = "PARASWAP_RATE_LIMIT";
pub const ENV_ZERO_X_RATE_LIMIT: &str = "ZERO_X_RATE_LIMIT";

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionConfig {
    pub chain: Chain,
    /// When set, only these aggregators compete for quotes
    pub only_use_aggregators: Option<HashSet<AggregatorType>>,
    pub zero_x_api_key: Option<String>,
    pub paraswap_rate_limit: Option<RateLimitWindow>,
    pub zero_x_rate_limit: Option<RateLimitWindow>,
    /// Overrides the public API hosts
    pub paraswap_base_url: Option<String>,
    pub zero_x_base_url: Option<String>,
}

impl ConnectionConfig {
    pub fn new(chain: Chain) -> Self {
        Self {
            chain,
            only_use_aggregators: None,
            zero_x_api_key: None,
            paraswap_rate_limit: None,
            zero_x_rate_limit: None,
            paraswap_base_url: None,
            zero_x_base_url: None,
        }
    }

    pub fn with_aggregators(mut self, aggregators: &[AggregatorType]) -> Self {
        self.only_use_aggregators = Some(aggregators.iter().copied().collect());
        self
    }

    /// Reads the configuration from the environment (and `.env` if present)
    pub fn from_env() -> SdkResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> SdkResult<Self> {
        let chain = lookup(ENV_CHAIN).ok_or_else(|| {
            report!(Error::ParseError).attach_printable(format!("{ENV_CHAIN} is not set"))
        })?;
        let chain = Chain::try_from(chain.as_str())
            .change_context(Error::UnsupportedChain(chain.clone()))?;

        let only_use_aggregators = lookup(ENV_ONLY_USE_AGGREGATORS)
            .filter(|list| !list.trim().is_empty())
            .map(|list| parse_aggregators(&list))
            .transpose()?;

        Ok(Self {
            chain,
            only_use_aggregators,
            zero_x_api_key: lookup(ENV_ZERO_X_API_KEY).filter(|key| !key.is_empty()),
            paraswap_rate_limit: parse_rate_limit(
                ENV_PARASWAP_RATE_LIMIT,
                lookup(ENV_PARASWAP_RATE_LIMIT),
            )?,
            zero_x_rate_limit: parse_rate_limit(
                ENV_ZERO_X_RATE_LIMIT,
                lookup(ENV_ZERO_X_RATE_LIMIT),
            )?,
            paraswap_base_url: None,
            zero_x_base_url: None,
        })
    }
}

fn parse_aggregators(list: &str) -> SdkResult<HashSet<AggregatorType>> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            AggregatorType::from_str(name)
                .change_context(Error::ParseError)
                .attach_printable(format!("Unknown aggregator: {name}"))
        })
        .collect()
}

fn parse_rate_limit(key: &str, value: Option<String>) -> SdkResult<Option<RateLimitWindow>> {
    match value {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => RateLimitWindow::from_string(value.trim())
            .map(Some)
            .ok_or_else(|| {
                report!(Error::ParseError)
                    .attach_printable(format!("Invalid rate limit for {key}: {value}"))
            }),
    }
}

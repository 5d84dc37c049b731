pub mod client_rate_limit;
pub mod http;

use std::{num::NonZeroU32, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitWindow {
    PerSecond(NonZeroU32),
    PerMinute(NonZeroU32),
    Custom { period: Duration },
}

impl RateLimitWindow {
    /// - `<n>s` → PerSecond(n)
    /// - `<n>m` → PerMinute(n)
    /// - `<n>h` → Custom { period = Duration::from_secs(n * 3600) }
    /// - `<n>d` → Custom { period = Duration::from_secs(n * 86400) }
    pub fn from_string(s: &str) -> Option<Self> {
        if s.is_empty() {
            return None;
        }

        let (num_str, unit) = s.split_at(s.len() - 1);
        let number: u32 = match num_str.parse() {
            Ok(n) if n > 0 => n,
            _ => return None,
        };
        let nonzero = NonZeroU32::new(number)?;

        match unit {
            "s" => Some(RateLimitWindow::PerSecond(nonzero)),
            "m" => Some(RateLimitWindow::PerMinute(nonzero)),
            "h" => Some(RateLimitWindow::Custom {
                period: Duration::from_secs(number as u64 * 3600),
            }),
            "d" => Some(RateLimitWindow::Custom {
                period: Duration::from_secs(number as u64 * 86400),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_window_from_string() {
        assert_eq!(
            RateLimitWindow::from_string("5s"),
            Some(RateLimitWindow::PerSecond(NonZeroU32::new(5).unwrap()))
        );
        assert_eq!(
            RateLimitWindow::from_string("60m"),
            Some(RateLimitWindow::PerMinute(NonZeroU32::new(60).unwrap()))
        );
        assert_eq!(
            RateLimitWindow::from_string("2h"),
            Some(RateLimitWindow::Custom {
                period: Duration::from_secs(7200)
            })
        );
        assert_eq!(
            RateLimitWindow::from_string("1d"),
            Some(RateLimitWindow::Custom {
                period: Duration::from_secs(86400)
            })
        );
    }

    #[test]
    fn test_rate_limit_window_invalid() {
        assert_eq!(RateLimitWindow::from_string(""), None);
        assert_eq!(RateLimitWindow::from_string("0s"), None);
        assert_eq!(RateLimitWindow::from_string("10x"), None);
        assert_eq!(RateLimitWindow::from_string("s"), None);
        assert_eq!(RateLimitWindow::from_string("-1s"), None);
    }
}

//! Portal endpoints and shared request headers.

use lazy_static::lazy_static;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};

/// Default trading portal origin.
pub const DEFAULT_PORTAL_URL: &str = "https://jywg.18.cn";

/// Default market snapshot endpoint. Lives on a separate quote host and needs
/// no session.
pub const DEFAULT_QUOTE_URL: &str = "https://emhsmarketwg.eastmoneysec.com/api/SHSZQuoteSnapshot";

/// Authenticated landing page that carries the hidden validation key.
pub(crate) const TRADE_BUY_PATH: &str = "/Trade/Buy";

/// Referer the portal expects on the login POST.
pub(crate) const LOGIN_REFERER_PATH: &str = "/Login?el=1&clear=&returl=%2fTrade%2fBuy";

/// Session duration requested when the caller does not pick one, in minutes.
pub const DEFAULT_SESSION_DURATION_MIN: u32 = 180;

lazy_static! {
    /// Browser-style headers sent on every request.
    pub(crate) static ref BASE_HEADERS: HeaderMap = {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            ),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"));
        headers
    };
}

/// Identifies one fixed portal endpoint.
///
/// The set is closed: an unknown tag is unrepresentable, so endpoint
/// resolution cannot fail at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestTag {
    AssetAndPosition,
    Orders,
    Trades,
    HistoryOrders,
    HistoryTrades,
    FundsFlow,
    CreateOrder,
    CancelOrder,
    Captcha,
    Login,
}

impl RequestTag {
    /// URL path under the portal origin. Token-bearing paths end at the
    /// `validatekey=` query parameter; the session token is appended verbatim.
    pub(crate) fn path(&self) -> &'static str {
        match self {
            Self::AssetAndPosition => "/Com/queryAssetAndPosV1?validatekey=",
            Self::Orders => "/Search/GetOrdersData?validatekey=",
            Self::Trades => "/Search/GetDealData?validatekey=",
            Self::HistoryOrders => "/Search/GetHisOrdersData?validatekey=",
            Self::HistoryTrades => "/Search/GetHisDealData?validatekey=",
            Self::FundsFlow => "/Search/GetFundsFlow?validatekey=",
            Self::CreateOrder => "/Trade/SubmitTradeV2?validatekey=",
            Self::CancelOrder => "/Trade/RevokeOrders?validatekey=",
            Self::Captcha => "/Login/YZM?randNum=",
            Self::Login => "/Login/Authentication?validatekey=",
        }
    }

    /// Whether the resolved URL expects the session token appended.
    pub(crate) fn token_bearing(&self) -> bool {
        !matches!(self, Self::Captcha | Self::Login)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TAGS: [RequestTag; 10] = [
        RequestTag::AssetAndPosition,
        RequestTag::Orders,
        RequestTag::Trades,
        RequestTag::HistoryOrders,
        RequestTag::HistoryTrades,
        RequestTag::FundsFlow,
        RequestTag::CreateOrder,
        RequestTag::CancelOrder,
        RequestTag::Captcha,
        RequestTag::Login,
    ];

    #[test]
    fn token_bearing_paths_end_at_the_key_parameter() {
        for tag in ALL_TAGS {
            if tag.token_bearing() {
                assert!(tag.path().ends_with("validatekey="), "{tag:?}");
            }
        }
    }

    #[test]
    fn captcha_path_takes_the_correlation_number() {
        assert!(RequestTag::Captcha.path().ends_with("randNum="));
        assert!(!RequestTag::Captcha.token_bearing());
        assert!(!RequestTag::Login.token_bearing());
    }
}

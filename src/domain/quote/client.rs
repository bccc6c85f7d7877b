//! Quote sub-client — market snapshot and last price.

use crate::client::EmtClient;
use crate::domain::quote::float_field;
use crate::error::EmtError;

pub struct Quote<'a> {
    pub(crate) client: &'a EmtClient,
}

impl<'a> Quote<'a> {
    /// Raw market snapshot for a symbol. Needs no session.
    pub async fn snapshot(
        &self,
        symbol: &str,
        market: &str,
    ) -> Result<serde_json::Value, EmtError> {
        let body = self.client.http.fetch_quote_snapshot(symbol, market).await?;
        Ok(body.into_json()?)
    }

    /// Last traded price for a symbol.
    ///
    /// NaN when the symbol is absent from the snapshot or the quote host is
    /// unreachable — price lookups never fail loudly.
    pub async fn last_price(&self, symbol: &str, market: &str) -> f64 {
        let snap = match self.snapshot(symbol, market).await {
            Ok(snap) => snap,
            Err(e) => {
                tracing::debug!("snapshot for {} unavailable: {}", symbol, e);
                return f64::NAN;
            }
        };
        if snap.get("status").and_then(|s| s.as_i64()) != Some(0) {
            return f64::NAN;
        }
        snap.get("realtimequote")
            .and_then(|q| q.get("currentPrice"))
            .map(float_field)
            .unwrap_or(f64::NAN)
    }
}

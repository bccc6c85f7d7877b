//! Orders sub-client — create, cancel, open & historical listings.

use crate::client::EmtClient;
use crate::domain::date_range_form;
use crate::domain::order::Direction;
use crate::error::EmtError;
use crate::network::RequestTag;

pub struct Orders<'a> {
    pub(crate) client: &'a EmtClient,
}

impl<'a> Orders<'a> {
    /// Today's open orders.
    pub async fn open(&self) -> Result<serde_json::Value, EmtError> {
        let body = self.client.query_with_retry(RequestTag::Orders, None).await?;
        Ok(body.into_json()?)
    }

    /// Historical orders over an inclusive `YYYY-MM-DD` date range.
    pub async fn history(
        &self,
        size: u32,
        start_date: &str,
        end_date: &str,
    ) -> Result<serde_json::Value, EmtError> {
        let form = date_range_form(size, start_date, end_date);
        let body = self
            .client
            .query_with_retry(RequestTag::HistoryOrders, Some(form))
            .await?;
        Ok(body.into_json()?)
    }

    /// Place an order.
    ///
    /// `market` is the portal's market code (`"HA"` Shanghai, `"SA"`
    /// Shenzhen). Returns the raw response envelope.
    pub async fn create(
        &self,
        stock_code: &str,
        direction: Direction,
        market: &str,
        price: f64,
        amount: u32,
    ) -> Result<serde_json::Value, EmtError> {
        let form = vec![
            ("stockCode", stock_code.to_string()),
            ("tradeType", direction.as_str().to_string()),
            ("zqmc", String::new()),
            ("market", market.to_string()),
            ("price", format!("{}", price)),
            ("amount", amount.to_string()),
        ];
        let body = self
            .client
            .query_with_retry(RequestTag::CreateOrder, Some(form))
            .await?;
        let resp = body.into_json()?;
        tracing::info!("create_order response: {}", resp);
        Ok(resp)
    }

    /// Revoke an order.
    ///
    /// `order_ref` combines the order date and number as
    /// `"<YYYYMMDD>_<order-number>"`, e.g. `"20240520_130662"`. The portal
    /// answers in plain text beginning with the order number on success.
    pub async fn cancel(&self, order_ref: &str) -> Result<String, EmtError> {
        let form = vec![("revokes", order_ref.trim().to_string())];
        let body = self
            .client
            .query_with_retry(RequestTag::CancelOrder, Some(form))
            .await?;
        Ok(body.into_text()?.trim().to_string())
    }
}

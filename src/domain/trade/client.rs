//! Trades sub-client — today's and historical executions.

use crate::client::EmtClient;
use crate::domain::date_range_form;
use crate::error::EmtError;
use crate::network::RequestTag;

pub struct Trades<'a> {
    pub(crate) client: &'a EmtClient,
}

impl<'a> Trades<'a> {
    /// Today's executed trades.
    pub async fn today(&self) -> Result<serde_json::Value, EmtError> {
        let body = self.client.query_with_retry(RequestTag::Trades, None).await?;
        Ok(body.into_json()?)
    }

    /// Historical trades over an inclusive `YYYY-MM-DD` date range.
    pub async fn history(
        &self,
        size: u32,
        start_date: &str,
        end_date: &str,
    ) -> Result<serde_json::Value, EmtError> {
        let form = date_range_form(size, start_date, end_date);
        let body = self
            .client
            .query_with_retry(RequestTag::HistoryTrades, Some(form))
            .await?;
        Ok(body.into_json()?)
    }
}

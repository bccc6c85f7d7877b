//! Account sub-client — asset & position summary, funds flow.

use crate::client::EmtClient;
use crate::domain::date_range_form;
use crate::error::EmtError;
use crate::network::RequestTag;

pub struct Account<'a> {
    pub(crate) client: &'a EmtClient,
}

impl<'a> Account<'a> {
    /// Current asset and position summary.
    pub async fn asset_and_position(&self) -> Result<serde_json::Value, EmtError> {
        let body = self
            .client
            .query_with_retry(RequestTag::AssetAndPosition, None)
            .await?;
        Ok(body.into_json()?)
    }

    /// Funds flow over an inclusive `YYYY-MM-DD` date range.
    pub async fn funds_flow(
        &self,
        size: u32,
        start_date: &str,
        end_date: &str,
    ) -> Result<serde_json::Value, EmtError> {
        let form = date_range_form(size, start_date, end_date);
        let body = self
            .client
            .query_with_retry(RequestTag::FundsFlow, Some(form))
            .await?;
        Ok(body.into_json()?)
    }
}

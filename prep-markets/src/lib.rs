//! Market-data client: ticker search and company profiles.
//!
//! Thin wrapper around a FinancialModelingPrep-style JSON API. Auth is a
//! static `apikey` query parameter on every call; there is no retry, caching,
//! or rate limiting here — a failure is surfaced once and the caller decides
//! how much of its report survives.

use std::borrow::Cow;

use prep_http::{Auth, HttpClient, HttpError, RequestOpts};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://financialmodelingprep.com/api/v3/";

#[derive(Debug, Error)]
pub enum MarketsError {
    #[error("market data request failed: {0}")]
    Http(#[from] HttpError),

    /// Profile endpoint answered with an empty payload for the symbol.
    #[error("no profile data for ticker '{0}'")]
    UnknownSymbol(String),
}

/// One hit from the ticker search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TickerHit {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "stockExchange")]
    pub stock_exchange: Option<String>,
}

/// Company profile as the provider returns it: a bag of field/value pairs.
///
/// The long-form `description` is split out by [`CompanyProfile::description`];
/// [`CompanyProfile::fields`] yields everything else with null, empty, and
/// blank values dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyProfile(serde_json::Map<String, Value>);

impl CompanyProfile {
    pub fn description(&self) -> Option<&str> {
        self.0.get("description").and_then(Value::as_str)
    }

    /// Displayable profile fields, minus `description` and valueless entries.
    pub fn fields(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter(|(key, _)| key.as_str() != "description")
            .filter_map(|(key, value)| {
                let rendered = match value {
                    Value::Null => return None,
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                if rendered.trim().is_empty() {
                    return None;
                }
                Some((key.clone(), rendered))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Client for the market-data provider.
#[derive(Clone)]
pub struct FmpClient {
    http: HttpClient,
    api_key: String,
}

impl FmpClient {
    pub fn new(api_key: String) -> Result<Self, HttpError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Anchor the client to a different endpoint (gateways, mock servers).
    pub fn with_base_url(api_key: String, base_url: &str) -> Result<Self, HttpError> {
        let http = HttpClient::new(base_url)?;
        Ok(Self { http, api_key })
    }

    fn auth(&self) -> Auth<'_> {
        Auth::Query {
            name: "apikey",
            value: Cow::Borrowed(&self.api_key),
        }
    }

    /// Best-matching ticker symbol for a free-text company name, if any.
    pub async fn search_ticker(&self, company: &str) -> Result<Option<String>, MarketsError> {
        tracing::info!(target: "markets", company = %company, "markets.search.start");

        let hits: Vec<TickerHit> = self
            .http
            .get_json(
                "search",
                RequestOpts {
                    query: Some(vec![
                        ("query", company.into()),
                        ("limit", "1".into()),
                    ]),
                    auth: Some(self.auth()),
                    ..Default::default()
                },
            )
            .await?;

        let symbol = hits.into_iter().next().map(|hit| hit.symbol);
        tracing::info!(target: "markets", company = %company, symbol = ?symbol, "markets.search.done");
        Ok(symbol)
    }

    /// Full profile for a ticker symbol.
    ///
    /// The provider answers an array; an empty one means the symbol is
    /// unrecognized and becomes [`MarketsError::UnknownSymbol`].
    pub async fn profile(&self, symbol: &str) -> Result<CompanyProfile, MarketsError> {
        let symbol = symbol.to_uppercase();
        tracing::info!(target: "markets", symbol = %symbol, "markets.profile.start");

        let mut payload: Vec<CompanyProfile> = self
            .http
            .get_json(
                &format!("profile/{symbol}"),
                RequestOpts {
                    auth: Some(self.auth()),
                    ..Default::default()
                },
            )
            .await?;

        if payload.is_empty() {
            return Err(MarketsError::UnknownSymbol(symbol));
        }
        Ok(payload.remove(0))
    }
}

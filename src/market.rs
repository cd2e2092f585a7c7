//! Static market reference data served by the market endpoints
//!
//! Figures are fixed demonstration values, not live quotes.

use serde::Serialize;
use std::collections::BTreeMap;

pub const MOCK_SOURCE: &str = "mock_data";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InflationData {
    pub current_rate: f64,
    pub last_12_months: f64,
    pub target: f64,
    pub last_updated: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PolicyRate {
    pub current_rate: f64,
    pub last_updated: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_meeting: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InterestRates {
    pub selic: PolicyRate,
    pub cdi: PolicyRate,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StockQuote {
    pub symbol: &'static str,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketIndex {
    pub name: &'static str,
    pub value: f64,
    pub change: f64,
    pub change_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CommodityPrices {
    pub oil_brent: f64,
    pub gold: f64,
    pub coffee: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EconomicIndicators {
    pub gdp_growth: f64,
    pub unemployment_rate: f64,
    pub exchange_rate_usd: f64,
    pub exchange_rate_eur: f64,
    pub commodity_prices: CommodityPrices,
}

/// Inflation figures by lowercase country name
pub const INFLATION: &[(&str, InflationData)] = &[(
    "brazil",
    InflationData {
        current_rate: 4.62,
        last_12_months: 4.62,
        target: 3.0,
        last_updated: "2025-06-21",
    },
)];

pub const INTEREST_RATES: InterestRates = InterestRates {
    selic: PolicyRate {
        current_rate: 10.75,
        last_updated: "2025-06-21",
        next_meeting: Some("2025-07-31"),
    },
    cdi: PolicyRate {
        current_rate: 10.65,
        last_updated: "2025-06-21",
        next_meeting: None,
    },
};

pub const STOCKS: &[StockQuote] = &[
    StockQuote { symbol: "PETR4", price: 30.81, change: 2.73, change_percent: 9.72 },
    StockQuote { symbol: "VALE3", price: 65.42, change: -1.23, change_percent: -1.85 },
    StockQuote { symbol: "ITUB4", price: 32.15, change: 0.87, change_percent: 2.78 },
    StockQuote { symbol: "BBDC4", price: 14.92, change: 0.34, change_percent: 2.33 },
];

pub const INDICES: &[MarketIndex] = &[
    MarketIndex { name: "IBOVESPA", value: 126543.21, change: 1234.56, change_percent: 0.98 },
    MarketIndex { name: "IFIX", value: 2876.43, change: -12.34, change_percent: -0.43 },
];

pub const ECONOMIC_INDICATORS: EconomicIndicators = EconomicIndicators {
    gdp_growth: 2.1,
    unemployment_rate: 8.5,
    exchange_rate_usd: 5.23,
    exchange_rate_eur: 5.67,
    commodity_prices: CommodityPrices {
        oil_brent: 82.45,
        gold: 1987.32,
        coffee: 156.78,
    },
};

/// Inflation data for a country, matched case-insensitively
pub fn inflation_for(country: &str) -> Option<&'static InflationData> {
    let country = country.to_lowercase();
    INFLATION.iter().find(|(name, _)| *name == country).map(|(_, data)| data)
}

/// Every inflation entry keyed by country
pub fn inflation_by_country() -> BTreeMap<&'static str, InflationData> {
    INFLATION.iter().copied().collect()
}

/// Quotes for the requested symbols, in table order; an empty filter returns every quote
pub fn stocks_matching(symbols: &[&str]) -> Vec<StockQuote> {
    if symbols.is_empty() {
        return STOCKS.to_vec();
    }
    STOCKS.iter().filter(|s| symbols.contains(&s.symbol)).copied().collect()
}

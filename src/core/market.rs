//! # Market Panels
//!
//! Display state and number formatting for the fund and stock widgets.
//! A panel is `Loading` until its fetch resolves and `Unavailable` when the
//! fetch fails, so a missing value is never shown as `0`.

use crate::api::{ApiError, FundSnapshot, StockSnapshot};

#[derive(Debug, Clone, PartialEq)]
pub enum Panel<T> {
    Loading,
    Ready(T),
    Unavailable(String),
}

impl<T> Panel<T> {
    pub fn from_result(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => Panel::Ready(value),
            Err(e) => Panel::Unavailable(e.to_string()),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Panel::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// One fund card: the configured name plus whatever we know about it.
#[derive(Debug, Clone, PartialEq)]
pub struct FundPanel {
    pub name: String,
    pub panel: Panel<FundSnapshot>,
}

/// The stock card: the configured symbols and one panel per symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct StockBoard {
    pub symbols: Vec<String>,
    pub panel: Panel<Vec<Panel<StockSnapshot>>>,
}

#[derive(Debug, Default)]
pub struct MarketState {
    pub funds: Vec<FundPanel>,
    pub stocks: Option<StockBoard>,
}

impl MarketState {
    pub fn new(fund_names: &[String], stock_symbols: &[String]) -> Self {
        Self {
            funds: fund_names
                .iter()
                .map(|name| FundPanel {
                    name: name.clone(),
                    panel: Panel::Loading,
                })
                .collect(),
            stocks: (!stock_symbols.is_empty()).then(|| StockBoard {
                symbols: stock_symbols.to_vec(),
                panel: Panel::Loading,
            }),
        }
    }

    pub fn fund_names(&self) -> Vec<String> {
        self.funds.iter().map(|f| f.name.clone()).collect()
    }

    pub fn stock_symbols(&self) -> Vec<String> {
        self.stocks
            .as_ref()
            .map(|board| board.symbols.clone())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.funds.is_empty() && self.stocks.is_none()
    }

    /// Puts every panel back into `Loading` ahead of a refresh.
    pub fn mark_loading(&mut self) {
        for fund in &mut self.funds {
            fund.panel = Panel::Loading;
        }
        if let Some(board) = &mut self.stocks {
            board.panel = Panel::Loading;
        }
    }

    /// Applies a batch fund result. A failed batch marks every fund unavailable.
    pub fn apply_funds(&mut self, result: Result<Vec<Result<FundSnapshot, ApiError>>, ApiError>) {
        match result {
            Ok(items) => {
                for (fund, item) in self.funds.iter_mut().zip(items) {
                    fund.panel = Panel::from_result(item);
                }
            }
            Err(e) => {
                let reason = e.to_string();
                for fund in &mut self.funds {
                    fund.panel = Panel::Unavailable(reason.clone());
                }
            }
        }
    }

    pub fn apply_stocks(
        &mut self,
        result: Result<Vec<Result<StockSnapshot, ApiError>>, ApiError>,
    ) {
        if let Some(board) = &mut self.stocks {
            board.panel = Panel::from_result(
                result.map(|items| items.into_iter().map(Panel::from_result).collect()),
            );
        }
    }
}

/// Direction of a return figure; drives the colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    /// Strictly positive is up; zero and below are down.
    pub fn of(value: f64) -> Self {
        if value > 0.0 { Trend::Up } else { Trend::Down }
    }
}

pub fn format_nav(nav: f64) -> String {
    format!("₹{nav:.2}")
}

pub fn format_aum(aum_crore: f64) -> String {
    format!("₹{aum_crore:.0} Cr")
}

pub fn format_min_investment(amount: f64) -> String {
    format!("₹{amount}")
}

pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

/// Formats an optional return figure; absent figures read "n/a".
pub fn format_return(value: Option<f64>) -> String {
    value.map(format_percent).unwrap_or_else(|| "n/a".to_string())
}

pub fn format_price(price: f64) -> String {
    format!("{price}")
}

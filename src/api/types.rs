use serde::{Deserialize, Serialize};

use super::ApiError;

/// Who authored a chat message.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
pub enum Sender {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "bot")]
    Bot,
}

/// A single chat message. Immutable once created.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}

/// Body of both the chat request and the chat response.
///
/// The request carries the prior transcript plus the new user message;
/// the response carries the complete authoritative transcript.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatPayload {
    pub messages: Vec<Message>,
}

// ============================================================================
// Market data
// ============================================================================

/// `{ "status": "success", "data": ... }` or `{ "status": "error", "message": ... }`
#[derive(Deserialize, Debug)]
pub(crate) struct Envelope<T> {
    pub status: String,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwraps the payload. An in-band `"error"` status counts as a server error
    /// even though the HTTP status was a success.
    pub fn into_result(self, http_status: u16) -> Result<T, ApiError> {
        if self.status != "success" {
            return Err(ApiError::Server {
                status: http_status,
                message: self
                    .message
                    .unwrap_or_else(|| format!("status \"{}\"", self.status)),
            });
        }
        self.data
            .ok_or_else(|| ApiError::MalformedResponse("envelope has no data".to_string()))
    }
}

#[derive(Deserialize, Debug)]
pub(crate) struct SipReturn {
    pub return3y: f64,
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct ReturnStats {
    pub return1y: Option<f64>,
    pub return3y: Option<f64>,
    pub return5y: Option<f64>,
}

/// Fund details as the backend relays them from the upstream fund search.
#[derive(Deserialize, Debug)]
pub(crate) struct FundData {
    pub nav: f64,
    pub aum: f64,
    pub min_investment_amount: f64,
    pub sip_return: SipReturn,
    #[serde(default)]
    pub return_stats: Vec<ReturnStats>,
}

/// Point-in-time view of a mutual fund.
#[derive(Debug, Clone, PartialEq)]
pub struct FundSnapshot {
    pub name: String,
    pub nav: f64,
    /// Assets under management, in crore.
    pub aum: f64,
    pub min_investment: f64,
    pub cagr: f64,
    pub return_1y: Option<f64>,
    pub return_3y: Option<f64>,
    pub return_5y: Option<f64>,
}

impl FundSnapshot {
    pub(crate) fn from_wire(name: &str, data: FundData) -> Self {
        let stats = data.return_stats.into_iter().next().unwrap_or_default();
        Self {
            name: name.to_string(),
            nav: data.nav,
            aum: data.aum,
            min_investment: data.min_investment_amount,
            cagr: data.sip_return.return3y,
            return_1y: stats.return1y,
            return_3y: stats.return3y,
            return_5y: stats.return5y,
        }
    }
}

/// Point-in-time view of a listed stock.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockSnapshot {
    pub company_name: String,
    pub symbol: String,
    pub current_price: f64,
    /// Fractional or percentage change over 52 weeks, as reported upstream.
    pub one_year_change: f64,
}

/// One element of the batch stock response: either a quote or a per-symbol failure.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub(crate) enum StockEntry {
    Quote(StockSnapshot),
    Failed { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Contract test: the request body must match what the agent route reads.
    #[test]
    fn chat_payload_serialization() {
        let payload = ChatPayload {
            messages: vec![Message::user("hello"), Message::bot("hi there")],
        };
        let serialized = serde_json::to_string(&payload).unwrap();
        let expected = r#"{"messages":[{"sender":"user","text":"hello"},{"sender":"bot","text":"hi there"}]}"#;
        assert_eq!(serialized, expected);
    }

    #[test]
    fn legacy_message_field_is_not_accepted() {
        // Mock data used `message` instead of `text`; only `text` is on the wire.
        let json = r#"{"sender":"bot","message":"Hello! How can I help you today?"}"#;
        assert!(serde_json::from_str::<Message>(json).is_err());
    }

    #[test]
    fn unknown_sender_is_rejected() {
        let json = r#"{"sender":"system","text":"x"}"#;
        assert!(serde_json::from_str::<Message>(json).is_err());
    }

    #[test]
    fn fund_envelope_maps_to_snapshot() {
        let json = r#"{
            "status": "success",
            "data": {
                "nav": 10.6,
                "aum": 17635.2,
                "min_investment_amount": 500,
                "sip_return": {"return3y": 15.6},
                "return_stats": [{"return1y": 18.5, "return3y": 13.5, "return5y": null}],
                "scheme_code": "12345"
            }
        }"#;
        let env: Envelope<FundData> = serde_json::from_str(json).unwrap();
        let snapshot = FundSnapshot::from_wire("HDFC Top 100 Fund", env.into_result(200).unwrap());
        assert_eq!(snapshot.name, "HDFC Top 100 Fund");
        assert_eq!(snapshot.nav, 10.6);
        assert_eq!(snapshot.min_investment, 500.0);
        assert_eq!(snapshot.cagr, 15.6);
        assert_eq!(snapshot.return_1y, Some(18.5));
        assert_eq!(snapshot.return_5y, None);
    }

    #[test]
    fn error_envelope_is_server_error() {
        let json = r#"{"status":"error","message":"Something went wrong. Please try again later."}"#;
        let env: Envelope<FundData> = serde_json::from_str(json).unwrap();
        match env.into_result(200) {
            Err(ApiError::Server { status, message }) => {
                assert_eq!(status, 200);
                assert!(message.starts_with("Something went wrong"));
            }
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[test]
    fn missing_return_stats_leaves_returns_empty() {
        let json = r#"{"nav":1.0,"aum":2.0,"min_investment_amount":100,"sip_return":{"return3y":4.0}}"#;
        let data: FundData = serde_json::from_str(json).unwrap();
        let snapshot = FundSnapshot::from_wire("x", data);
        assert_eq!(snapshot.return_1y, None);
        assert_eq!(snapshot.return_3y, None);
    }

    #[test]
    fn stock_entries_distinguish_quotes_from_failures() {
        let json = r#"[
            {"oneYearChange": 0.12, "symbol": "HDFCBANK.NS", "currentPrice": 1650.5, "companyName": "HDFC Bank Limited"},
            {"message": "Something went wrong. Please try again later."}
        ]"#;
        let entries: Vec<StockEntry> = serde_json::from_str(json).unwrap();
        assert!(matches!(&entries[0], StockEntry::Quote(s) if s.symbol == "HDFCBANK.NS"));
        assert!(matches!(&entries[1], StockEntry::Failed { .. }));
    }
}

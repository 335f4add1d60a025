use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a fungible asset that can be routed through pools.
///
/// `Native` is the chain-native asset; every other asset is a `Token`
/// named by an opaque identifier. Currencies are totally ordered and
/// `Native` sorts below every token, so a native pool always holds the
/// native asset in slot A.
///
/// # Examples
///
/// ```
/// use flash_router::core::currency::Currency;
///
/// let usdc = Currency::token("USDC");
/// let weth = Currency::token("WETH");
/// assert!(usdc < weth);
/// assert!(Currency::Native < usdc);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Currency {
    Native,
    Token(String),
}

impl Currency {
    pub fn token(id: impl Into<String>) -> Self {
        Self::Token(id.into())
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }

    /// Parse the textual form produced by `Display`.
    ///
    /// `"NATIVE"` (any case) maps to the native asset, anything else is a token.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("native") {
            Self::Native
        } else {
            Self::token(s)
        }
    }

    /// Order two currencies into (slot A, slot B).
    pub fn sort_pair(a: Currency, b: Currency) -> (Currency, Currency) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "NATIVE"),
            Self::Token(id) => write!(f, "{}", id),
        }
    }
}

impl From<String> for Currency {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Currency> for String {
    fn from(c: Currency) -> Self {
        c.to_string()
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

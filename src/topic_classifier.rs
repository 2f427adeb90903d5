use lazy_static::lazy_static;
use serde_json::Value;

use crate::shared_types::{value_text, RawMarket};

// Union of both historical crypto term lists. Entries with a trailing space
// only match when followed by whitespace, which narrows short tickers a little.
const CRYPTO_TERMS: &[&str] = &[
    "bitcoin", "btc", "ethereum", "eth", "crypto", "cryptocurrency", "solana", "sol", "sol ",
    "cardano", "ada", "ada ", "polygon", "matic", "avalanche", "avax", "chainlink", "link",
    "link ", "uniswap", "uni", "uni ", "litecoin", "ltc", "dogecoin", "doge", "xrp", "ripple",
    "polkadot", "dot", "dot ", "cosmos", "atom", "atom ", "algorand", "algo", "algo ", "shiba",
    "shib", "tether", "usdt", "usdc", "binance", "bnb", "terra", "luna", "stellar", "xlm",
    "monero", "xmr", "eos", "tezos", "xtz", "dash", "zcash", "zec", "defi", "web3",
    "blockchain", "price", "usd", "market cap", "trading", "exchange",
];

const MARKET_FIELDS: [&str; 10] = [
    "question",
    "description",
    "slug",
    "title",
    "name",
    "text",
    "market",
    "condition",
    "conditionId",
    "condition_id",
];
const OUTCOME_FIELDS: [&str; 4] = ["title", "name", "text", "outcome"];

lazy_static! {
    static ref CRYPTO_KEYWORDS: Vec<String> = dedup_lowercase(CRYPTO_TERMS.iter().copied());
}

fn dedup_lowercase<'a, I: IntoIterator<Item = &'a str>>(terms: I) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for term in terms {
        let term = term.to_lowercase();
        if !term.is_empty() && !keywords.contains(&term) {
            keywords.push(term);
        }
    }
    keywords
}

/// Keyword-based market filter.
///
/// Matching is a plain substring test over the lowercased text of a market, so
/// it over-matches: "eth" hits "method", "atom" hits "atomic". That is a known
/// limitation of the heuristic, not something callers should rely on.
#[derive(Debug, Clone)]
pub struct TopicClassifier {
    keywords: Vec<String>,
}

impl TopicClassifier {
    pub fn new<'a, I: IntoIterator<Item = &'a str>>(keywords: I) -> Self {
        Self {
            keywords: dedup_lowercase(keywords),
        }
    }

    pub fn crypto() -> Self {
        Self {
            keywords: CRYPTO_KEYWORDS.clone(),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_match(&self, market: &RawMarket) -> bool {
        let text = searchable_text(market);
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }

    pub fn filter<'m>(&self, markets: &'m [RawMarket]) -> Vec<&'m RawMarket> {
        markets.iter().filter(|m| self.is_match(m)).collect()
    }
}

/// Lowercased concatenation of every field the classifier searches, including
/// object-shaped entries of `outcomes` and the `outcome` label of each token.
pub fn searchable_text(market: &RawMarket) -> String {
    let mut parts: Vec<String> = MARKET_FIELDS
        .iter()
        .map(|key| market.get(*key).map(value_text).unwrap_or_default())
        .collect();

    if let Some(Value::Array(outcomes)) = market.get("outcomes") {
        for outcome in outcomes {
            if let Value::Object(fields) = outcome {
                parts.extend(
                    OUTCOME_FIELDS
                        .iter()
                        .map(|key| fields.get(*key).map(value_text).unwrap_or_default()),
                );
            }
        }
    }

    if let Some(Value::Array(tokens)) = market.get("tokens") {
        for token in tokens {
            if let Some(label) = token.get("outcome") {
                parts.push(value_text(label));
            }
        }
    }

    parts.join(" ").to_lowercase()
}

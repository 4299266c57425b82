//! Pricing configuration for cost accounting
//!
//! Prices are supplied as configuration, not computed: a flat per-million
//! rate for worker models, and separate input/output rates for the
//! reasoning models used by master synthesis.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-model price table for worker agents, in USD per 1M tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceTable {
    prices: HashMap<String, f64>,
}

impl PriceTable {
    /// Create an empty price table (every model prices at zero)
    pub fn empty() -> Self {
        Self {
            prices: HashMap::new(),
        }
    }

    /// Price in USD per 1M tokens; unknown models price at zero
    pub fn price_per_million(&self, model: &str) -> f64 {
        self.prices.get(model).copied().unwrap_or(0.0)
    }

    /// Set the price for a model
    pub fn with_price(mut self, model: impl Into<String>, price: f64) -> Self {
        self.prices.insert(model.into(), price);
        self
    }

    /// Merge price overrides into this table
    pub fn extend(&mut self, overrides: impl IntoIterator<Item = (String, f64)>) {
        self.prices.extend(overrides);
    }

    /// Cost of a single call in USD
    pub fn cost(&self, model: &str, tokens: u64) -> f64 {
        (tokens as f64 / 1_000_000.0) * self.price_per_million(model)
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::empty()
            .with_price(presets::OPENAI_GPT4O, 0.15)
            .with_price(presets::GEMINI_FLASH, 0.0) // free tier
            .with_price(presets::DEEPSEEK_R1, 0.0) // local
    }
}

/// Input/output price pair for a reasoning model, in USD per 1M tokens
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InputOutputPrice {
    /// Price per 1M input (prompt) tokens
    pub input: f64,
    /// Price per 1M output (completion) tokens
    pub output: f64,
}

/// Per-model price table for the master synthesis call
///
/// Input and output tokens are priced independently, unlike worker models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisPriceTable {
    prices: HashMap<String, InputOutputPrice>,
}

impl SynthesisPriceTable {
    /// Create an empty table (every model prices at zero)
    pub fn empty() -> Self {
        Self {
            prices: HashMap::new(),
        }
    }

    /// Input/output prices for a model; unknown models price at zero
    pub fn prices_for(&self, model: &str) -> InputOutputPrice {
        self.prices.get(model).copied().unwrap_or(InputOutputPrice {
            input: 0.0,
            output: 0.0,
        })
    }

    /// Set the input/output prices for a model
    pub fn with_prices(mut self, model: impl Into<String>, input: f64, output: f64) -> Self {
        self.prices
            .insert(model.into(), InputOutputPrice { input, output });
        self
    }

    /// Cost of one synthesis call in USD
    pub fn cost(&self, model: &str, prompt_tokens: u64, completion_tokens: u64) -> f64 {
        let price = self.prices_for(model);
        (prompt_tokens as f64 / 1_000_000.0) * price.input
            + (completion_tokens as f64 / 1_000_000.0) * price.output
    }
}

impl Default for SynthesisPriceTable {
    fn default() -> Self {
        Self::empty()
            .with_prices(presets::OPENAI_GPT4O, 2.5, 10.0)
            .with_prices("o1-mini", 3.0, 12.0)
            .with_prices("o1", 15.0, 60.0)
            .with_prices("o3-mini", 3.0, 12.0)
    }
}

/// Default model identifiers for the council
pub mod presets {
    /// OpenAI general-purpose model, also the default synthesis model
    pub const OPENAI_GPT4O: &str = "gpt-4o";

    /// Gemini free-tier fast model
    pub const GEMINI_FLASH: &str = "gemini-2.5-flash";

    /// DeepSeek reasoning model served locally via Ollama
    pub const DEEPSEEK_R1: &str = "deepseek-r1:14b";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_model_prices_at_zero() {
        let table = PriceTable::default();
        assert_eq!(table.price_per_million("made-up-model"), 0.0);
        assert_eq!(table.cost("made-up-model", 1_000_000), 0.0);
    }

    #[test]
    fn test_worker_cost_is_linear_in_tokens() {
        let table = PriceTable::default();
        let one = table.cost(presets::OPENAI_GPT4O, 500_000);
        let two = table.cost(presets::OPENAI_GPT4O, 1_000_000);
        assert!((two - 2.0 * one).abs() < 1e-12);
        assert!((two - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_synthesis_prices_in_and_out_independently() {
        let table = SynthesisPriceTable::default();
        let cost = table.cost(presets::OPENAI_GPT4O, 1_000_000, 1_000_000);
        assert!((cost - 12.5).abs() < 1e-9);
    }
}

#![allow(dead_code)]

//! Commodity quotes shown on the mandi price panel.

use std::time::SystemTime;

use rand::Rng;

use super::entities::{change_against, PriceQuote};

/// Largest jitter applied to a price per refresh, in INR.
const PRICE_JITTER: f64 = 100.0;
/// Largest simulated day-over-day move, in INR.
const CHANGE_SPREAD: f64 = 150.0;

#[derive(Clone, Debug, PartialEq)]
pub struct PriceBoard {
    quotes: Vec<PriceQuote>,
}

impl PriceBoard {
    pub fn new(quotes: Vec<PriceQuote>) -> Self {
        Self { quotes }
    }

    pub fn quotes(&self) -> &[PriceQuote] {
        &self.quotes
    }

    pub fn find(&self, commodity: &str) -> Option<&PriceQuote> {
        self.quotes
            .iter()
            .find(|quote| quote.commodity.eq_ignore_ascii_case(commodity))
    }

    /// Replace the quote for the same commodity and market, or add it.
    pub fn upsert(&mut self, quote: PriceQuote) {
        match self.quotes.iter_mut().find(|existing| {
            existing.commodity.eq_ignore_ascii_case(&quote.commodity)
                && existing.market == quote.market
        }) {
            Some(existing) => *existing = quote,
            None => self.quotes.push(quote),
        }
    }

    /// Nudge every quote as if a fresh mandi feed had arrived.
    pub fn refresh<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let now = SystemTime::now();
        for quote in &mut self.quotes {
            let price = (quote.price + rng.gen_range(-PRICE_JITTER..PRICE_JITTER)).max(0.0);
            let previous = price - rng.gen_range(-CHANGE_SPREAD..CHANGE_SPREAD);
            let (change, change_percent) = change_against(price, previous);
            quote.price = price;
            quote.change = change;
            quote.change_percent = change_percent;
            quote.observed_at = now;
        }
    }
}

impl Default for PriceBoard {
    fn default() -> Self {
        let now = SystemTime::now();
        let seed = [
            ("Wheat", 2500.0, 2450.0, "Delhi Mandi"),
            ("Rice (Basmati)", 4200.0, 4300.0, "Punjab Mandi"),
            ("Onion", 3500.0, 3300.0, "Maharashtra Mandi"),
            ("Tomato", 2800.0, 2950.0, "Karnataka Mandi"),
            ("Soybean", 4800.0, 4720.0, "Madhya Pradesh Mandi"),
            ("Cotton", 6200.0, 6050.0, "Gujarat Mandi"),
        ];
        Self::new(
            seed.into_iter()
                .map(|(commodity, price, previous, market)| {
                    PriceQuote::from_previous(commodity, market, price, previous, now)
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::domain::entities::PriceDirection;

    #[test]
    fn default_board_lists_six_commodities() {
        let board = PriceBoard::default();
        assert_eq!(board.quotes().len(), 6);
        let wheat = board.find("wheat").expect("wheat on board");
        assert_eq!(wheat.change, 50.0);
    }

    #[test]
    fn refresh_keeps_change_and_percent_aligned() {
        let mut board = PriceBoard::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            board.refresh(&mut rng);
            for quote in board.quotes() {
                assert!(quote.price >= 0.0);
                assert_eq!(
                    PriceDirection::of(quote.change),
                    PriceDirection::of(quote.change_percent),
                    "{quote:?}"
                );
            }
        }
    }

    #[test]
    fn upsert_replaces_matching_market() {
        let mut board = PriceBoard::default();
        let quote = PriceQuote::unchanged("WHEAT", "Delhi Mandi", 2600.0, SystemTime::now());
        board.upsert(quote);
        assert_eq!(board.quotes().len(), 6);
        assert_eq!(board.find("Wheat").map(|q| q.price), Some(2600.0));

        board.upsert(PriceQuote::unchanged("Wheat", "Ludhiana Mandi", 2550.0, SystemTime::now()));
        assert_eq!(board.quotes().len(), 7);
    }
}

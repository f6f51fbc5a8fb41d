use crate::{
    error::{PacingError, PacingResult},
    parser::Parser,
};

#[derive(Debug)]
pub struct RangeParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecondsRange {
    pub min: u64,
    pub max: u64,
}

impl Parser for RangeParser {
    type Item = SecondsRange;

    fn parse(&self, input: &str) -> PacingResult<Self::Item> {
        let numbers = input.split('-').filter_map(leading_integer).collect::<Vec<_>>();

        match numbers[..] {
            [a, b] => Ok(SecondsRange {
                min: a.min(b),
                max: a.max(b),
            }),
            // anything else degenerates to a fixed delay of the first number
            [first, ..] => Ok(SecondsRange {
                min: first,
                max: first,
            }),
            [] => Err(PacingError::invalid(format!("delay is not a number: {input:?}"))),
        }
    }
}

fn leading_integer(token: &str) -> Option<u64> {
    let token = token.trim();
    let token = token.strip_prefix('+').unwrap_or(token);
    let end = token.find(|c: char| !c.is_ascii_digit()).unwrap_or(token.len());

    token[..end].parse().ok()
}

use crate::error::PacingResult;

pub mod batch;
pub mod range;

pub trait Parser {
    type Item;

    fn parse(&self, input: &str) -> PacingResult<Self::Item>;
}

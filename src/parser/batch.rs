use crate::{
    error::{PacingError, PacingResult},
    parser::Parser,
};

#[derive(Debug)]
pub struct BatchFileParser;

impl Parser for BatchFileParser {
    type Item = Vec<Vec<String>>;

    fn parse(&self, input: &str) -> PacingResult<Self::Item> {
        let mut groups = Vec::new();
        let mut current = Vec::new();

        for line in input.lines().map(str::trim) {
            if line.starts_with('#') {
                continue;
            }

            if line.is_empty() {
                if !current.is_empty() {
                    groups.push(std::mem::take(&mut current));
                }
                continue;
            }

            current.push(line.to_string());
        }

        if !current.is_empty() {
            groups.push(current);
        }

        if groups.is_empty() {
            return Err(PacingError::invalid("batch contains no items"));
        }

        Ok(groups)
    }
}

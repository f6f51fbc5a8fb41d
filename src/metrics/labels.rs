use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue, LabelValueEncoder};
use strum::Display as StrumDisplay;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct OperationLabels {
    pub outcome: OperationOutcome,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct LevelLabels {
    pub level: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct BatchLabels {
    pub outcome: BatchOutcomeLabel,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug, StrumDisplay)]
#[strum(serialize_all = "snake_case")]
pub enum OperationOutcome {
    Success,
    Failure,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug, StrumDisplay)]
#[strum(serialize_all = "snake_case")]
pub enum BatchOutcomeLabel {
    Done,
    Cancelled,
}

impl EncodeLabelValue for OperationOutcome {
    fn encode(&self, encoder: &mut LabelValueEncoder) -> Result<(), std::fmt::Error> {
        self.to_string().encode(encoder)
    }
}

impl EncodeLabelValue for BatchOutcomeLabel {
    fn encode(&self, encoder: &mut LabelValueEncoder) -> Result<(), std::fmt::Error> {
        self.to_string().encode(encoder)
    }
}

mod metrics;
mod pacing;

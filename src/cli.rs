use std::{path::PathBuf, str::FromStr};

use clap::{Args, Parser, ValueEnum};

use crate::resolver::{Mode, PacingIntent};

const DEFAULT_DELAY: &str = "3";

/// Run the lines of a batch file as shell commands, paced to stay under a rate limit.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Batch file: one command per line, blank lines separate groups
    pub file: PathBuf,

    #[command(flatten)]
    pub items: ItemPacing,

    #[command(flatten)]
    pub groups: GroupPacing,

    /// Fraction of the auto interval used as ± jitter
    #[arg(long, default_value_t = crate::strategy::DEFAULT_JITTER_FRACTION)]
    pub jitter: f64,

    /// Also wait after the last item of each level
    #[arg(long)]
    pub trailing_delay: bool,

    /// Seed for reproducible delays
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value = "sh")]
    pub shell: String,

    /// Write OpenMetrics counters here once the batch finishes
    #[arg(long)]
    pub metrics_output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Log::Plain)]
    pub log: Log,
}

#[derive(Debug, Clone, Args)]
pub struct ItemPacing {
    /// Pacing mode: manual or auto
    #[arg(short, long, value_parser = Mode::from_str, default_value_t = Mode::Manual)]
    pub mode: Mode,

    /// Seconds between items, `n` or `a-b` [default: 3]
    #[arg(short, long)]
    pub delay: Option<String>,

    /// Auto mode: operations to spread over the window (defaults to the item count)
    #[arg(long, allow_negative_numbers = true)]
    pub total_ops: Option<i64>,

    /// Auto mode: seconds the items should take
    #[arg(short, long, allow_negative_numbers = true)]
    pub window: Option<i64>,
}

#[derive(Debug, Clone, Args)]
pub struct GroupPacing {
    /// Pacing mode between groups: manual or auto
    #[arg(long, value_parser = Mode::from_str)]
    pub group_mode: Option<Mode>,

    /// Seconds between groups, `n` or `a-b`
    #[arg(long)]
    pub group_delay: Option<String>,

    /// Auto mode: groups to spread over the window (defaults to the group count)
    #[arg(long, allow_negative_numbers = true)]
    pub group_total_ops: Option<i64>,

    /// Auto mode: seconds the groups should take
    #[arg(long, allow_negative_numbers = true)]
    pub group_window: Option<i64>,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Log {
    Plain,
    Json,
}

impl ItemPacing {
    pub fn intent(&self, items: usize) -> PacingIntent {
        match self.mode {
            Mode::Manual => PacingIntent::Manual {
                delay: Some(self.delay.clone().unwrap_or_else(|| DEFAULT_DELAY.to_string())),
            },
            Mode::Auto => PacingIntent::Auto {
                total_ops: self.total_ops.or(Some(items as i64)),
                window_sec: self.window,
            },
        }
    }

    pub fn ignored_flags(&self) -> Vec<&'static str> {
        let mut ignored = Vec::new();
        match self.mode {
            Mode::Manual => {
                if self.total_ops.is_some() {
                    ignored.push("--total-ops");
                }
                if self.window.is_some() {
                    ignored.push("--window");
                }
            },
            Mode::Auto => {
                if self.delay.is_some() {
                    ignored.push("--delay");
                }
            },
        }

        ignored
    }
}

impl GroupPacing {
    pub fn is_enabled(&self) -> bool {
        self.group_mode.is_some() || self.group_delay.is_some()
    }

    pub fn intent(&self, groups: usize) -> PacingIntent {
        match self.group_mode.unwrap_or_default() {
            Mode::Manual => PacingIntent::Manual {
                delay: self.group_delay.clone(),
            },
            Mode::Auto => PacingIntent::Auto {
                total_ops: self.group_total_ops.or(Some(groups as i64)),
                window_sec: self.group_window,
            },
        }
    }

    pub fn ignored_flags(&self) -> Vec<&'static str> {
        let mode = self.is_enabled().then(|| self.group_mode.unwrap_or_default());

        let mut ignored = Vec::new();
        if mode != Some(Mode::Auto) {
            if self.group_total_ops.is_some() {
                ignored.push("--group-total-ops");
            }
            if self.group_window.is_some() {
                ignored.push("--group-window");
            }
        }
        if mode == Some(Mode::Auto) && self.group_delay.is_some() {
            ignored.push("--group-delay");
        }

        ignored
    }
}

use crate::model::{metrics, Item};

pub fn currency(value: f64) -> String {
    if value < 0.0 {
        format!("-₹{:.2}", -value)
    } else {
        format!("₹{:.2}", value)
    }
}

pub fn percent(value: f64) -> String {
    format!("{:.2}%", value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Profit,
    Loss,
    BreakEven,
}

impl Status {
    pub fn of(profit: f64) -> Self {
        if profit > 0.0 {
            Status::Profit
        } else if profit < 0.0 {
            Status::Loss
        } else {
            Status::BreakEven
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Profit => "Profitable",
            Status::Loss => "Loss",
            Status::BreakEven => "Break-even",
        }
    }
}

pub fn status(item: &Item) -> Status {
    Status::of(item.profit)
}

/// Live numbers shown under the add/edit forms before anything is saved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preview {
    pub profit: f64,
    pub profit_percent: f64,
    pub worth_buying: bool,
}

pub fn preview(buying: &str, market: &str) -> Option<Preview> {
    let buying: f64 = buying.trim().parse().ok()?;
    let market: f64 = market.trim().parse().ok()?;
    if !buying.is_finite() || !market.is_finite() || buying <= 0.0 || market <= 0.0 {
        return None;
    }
    let (profit, profit_percent) = metrics(buying, market);
    Some(Preview {
        profit,
        profit_percent,
        worth_buying: profit > 0.0,
    })
}

/// Coarse "how long ago" label for a millisecond timestamp.
pub fn time_ago(timestamp: i64, now: i64) -> String {
    if timestamp == 0 {
        return "just now".to_string();
    }
    let seconds = ((now - timestamp) / 1000).max(0);
    if seconds < 60 {
        return format!("{seconds}s ago");
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h {}m ago", minutes % 60);
    }
    format!("{}d ago", hours / 24)
}

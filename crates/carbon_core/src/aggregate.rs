//! Day, week and category rollups over a set of task records.
//!
//! Everything is recomputed from the records passed in. Bucket boundaries come
//! from a single `now` supplied by the caller, and the offset of that `now` is
//! the time zone every `created_at` is converted into before bucketing.

use crate::model::{Category, Task};
use serde::Serialize;
use time::{Date, Duration, OffsetDateTime, Weekday};

pub const DAILY_BUCKETS: usize = 7;
pub const WEEKLY_BUCKETS: usize = 4;

/// A closed calendar interval `[start, end]` and the carbon logged inside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub start: Date,
    pub end: Date,
    pub carbon: f64,
}

impl Bucket {
    fn empty(label: String, start: Date, end: Date) -> Self {
        Self {
            label,
            start,
            end,
            carbon: 0.0,
        }
    }

    fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub carbon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total: f64,
    pub budget: Option<f64>,
    /// `budget - total`; negative when over budget.
    pub budget_remaining: Option<f64>,
    pub daily: Vec<Bucket>,
    pub weekly: Vec<Bucket>,
    pub categories: Vec<CategoryTotal>,
}

impl Summary {
    pub fn is_over_budget(&self) -> bool {
        self.budget_remaining.is_some_and(|remaining| remaining < 0.0)
    }

    pub fn category_total(&self, category: Category) -> Option<f64> {
        self.categories
            .iter()
            .find(|entry| entry.category == category)
            .map(|entry| entry.carbon)
    }
}

pub fn aggregate(tasks: &[Task], now: OffsetDateTime, budget: Option<f64>) -> Summary {
    let offset = now.offset();
    let today = now.date();

    let mut daily = daily_buckets(today);
    let mut weekly = weekly_buckets(today);
    let mut categories = Category::BREAKDOWN.map(|category| CategoryTotal {
        category,
        carbon: 0.0,
    });
    let mut total = 0.0;

    for task in tasks {
        total += task.carbon;

        // Timestamps with no representable local date still count toward the
        // total and category, never toward a calendar bucket.
        if let Some(created) = task.created_at.checked_to_offset(offset).map(|at| at.date()) {
            if let Some(bucket) = daily.iter_mut().find(|bucket| bucket.contains(created)) {
                bucket.carbon += task.carbon;
            }
            if let Some(bucket) = weekly.iter_mut().find(|bucket| bucket.contains(created)) {
                bucket.carbon += task.carbon;
            }
        }
        if let Some(entry) = categories
            .iter_mut()
            .find(|entry| entry.category == task.category)
        {
            entry.carbon += task.carbon;
        }
    }

    Summary {
        total,
        budget,
        budget_remaining: budget.map(|budget| budget - total),
        daily,
        weekly,
        categories: categories.to_vec(),
    }
}

fn daily_buckets(today: Date) -> Vec<Bucket> {
    (0..DAILY_BUCKETS)
        .rev()
        .map(|days_back| {
            let day = today.saturating_sub(Duration::days(days_back as i64));
            Bucket::empty(weekday_label(day.weekday()).to_string(), day, day)
        })
        .collect()
}

fn weekly_buckets(today: Date) -> Vec<Bucket> {
    let monday = today.saturating_sub(Duration::days(i64::from(
        today.weekday().number_days_from_monday(),
    )));

    (0..WEEKLY_BUCKETS)
        .map(|index| {
            let weeks_back = (WEEKLY_BUCKETS - 1 - index) as i64;
            let start = monday.saturating_sub(Duration::weeks(weeks_back));
            let end = start.saturating_add(Duration::days(6));
            Bucket::empty(format!("Week-{}", index + 1), start, end)
        })
        .collect()
}

pub fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Monday => "Mon",
        Weekday::Tuesday => "Tue",
        Weekday::Wednesday => "Wed",
        Weekday::Thursday => "Thu",
        Weekday::Friday => "Fri",
        Weekday::Saturday => "Sat",
        Weekday::Sunday => "Sun",
    }
}

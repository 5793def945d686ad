use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::{TradeDate, ValidationError};

/// Ascending, duplicate-free mapping from trading day to a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DateSeries<T> {
    points: BTreeMap<TradeDate, T>,
}

impl<T> Default for DateSeries<T> {
    fn default() -> Self {
        Self {
            points: BTreeMap::new(),
        }
    }
}

impl<T> DateSeries<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from pairs in any order, rejecting repeated dates.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (TradeDate, T)>,
    {
        let mut points = BTreeMap::new();
        for (date, value) in pairs {
            if points.insert(date, value).is_some() {
                return Err(ValidationError::DuplicateDate { date });
            }
        }
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, date: &TradeDate) -> Option<&T> {
        self.points.get(date)
    }

    pub fn contains(&self, date: &TradeDate) -> bool {
        self.points.contains_key(date)
    }

    pub fn first_date(&self) -> Option<TradeDate> {
        self.points.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<TradeDate> {
        self.points.keys().next_back().copied()
    }

    pub fn dates(&self) -> impl Iterator<Item = TradeDate> + '_ {
        self.points.keys().copied()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.points.values()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, TradeDate, T> {
        self.points.iter()
    }

    /// Apply `f` to every value, keeping the date index.
    pub fn map<U, F>(&self, mut f: F) -> DateSeries<U>
    where
        F: FnMut(&T) -> U,
    {
        DateSeries {
            points: self
                .points
                .iter()
                .map(|(date, value)| (*date, f(value)))
                .collect(),
        }
    }
}

impl<T: Clone> DateSeries<T> {
    /// Keep only the dates for which `keep` returns true.
    pub fn filter_dates<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(TradeDate) -> bool,
    {
        Self {
            points: self
                .points
                .iter()
                .filter(|(date, _)| keep(**date))
                .map(|(date, value)| (*date, value.clone()))
                .collect(),
        }
    }
}

/// Later pairs overwrite earlier ones for the same date.
impl<T> FromIterator<(TradeDate, T)> for DateSeries<T> {
    fn from_iter<I: IntoIterator<Item = (TradeDate, T)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a DateSeries<T> {
    type Item = (&'a TradeDate, &'a T);
    type IntoIter = btree_map::Iter<'a, TradeDate, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(value: &str) -> TradeDate {
        TradeDate::parse(value).expect("valid date")
    }

    #[test]
    fn orders_dates_ascending_regardless_of_input_order() {
        let series = DateSeries::from_pairs([
            (day("2021-01-29"), 3),
            (day("2021-01-27"), 1),
            (day("2021-01-28"), 2),
        ])
        .expect("unique dates");

        let values = series.values().copied().collect::<Vec<_>>();
        assert_eq!(values, vec![1, 2, 3]);
        assert_eq!(series.first_date(), Some(day("2021-01-27")));
        assert_eq!(series.last_date(), Some(day("2021-01-29")));
    }

    #[test]
    fn rejects_duplicate_dates() {
        let err = DateSeries::from_pairs([(day("2021-01-27"), 1), (day("2021-01-27"), 2)])
            .expect_err("duplicate must fail");
        assert!(matches!(err, ValidationError::DuplicateDate { .. }));
    }
}

use serde::{
    Deserialize,
    Serialize,
};
use strum::{
    Display,
    EnumIter,
};

/// Activity counters for one app as returned by `globalProtocolStats`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatRecord {
    pub total_posts: u64,
    pub total_mirrors: u64,
    pub total_comments: u64,
}

impl StatRecord {
    pub fn new(total_posts: u64, total_mirrors: u64, total_comments: u64) -> Self {
        Self {
            total_posts,
            total_mirrors,
            total_comments,
        }
    }

    pub fn get(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Posts => self.total_posts,
            Metric::Mirrors => self.total_mirrors,
            Metric::Comments => self.total_comments,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Metric {
    Posts,
    Mirrors,
    Comments,
}

/// Groups digits by thousands: `1234567` becomes `1,234,567`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn metric_lookup() {
        let record = StatRecord::new(1, 2, 3);
        assert_eq!(
            [Metric::Posts, Metric::Mirrors, Metric::Comments].map(|metric| record.get(metric)),
            [1, 2, 3]
        );
    }
}

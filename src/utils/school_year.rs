//! 学年计算，学年从 8 月 1 日开始

use chrono::{DateTime, Datelike, Utc};

const SCHOOL_YEAR_START_MONTH: u32 = 8;

/// 形如 `2025/26` 的学年名称
pub fn school_year_name(at: DateTime<Utc>) -> String {
    let start = if at.month() >= SCHOOL_YEAR_START_MONTH {
        at.year()
    } else {
        at.year() - 1
    };
    format!("{start}/{:02}", (start + 1) % 100)
}

pub fn current_school_year() -> String {
    school_year_name(Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_school_year_boundaries() {
        let july = Utc.with_ymd_and_hms(2025, 7, 31, 23, 0, 0).unwrap();
        let august = Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap();
        assert_eq!(school_year_name(july), "2024/25");
        assert_eq!(school_year_name(august), "2025/26");
    }

    #[test]
    fn test_century_rollover() {
        let at = Utc.with_ymd_and_hms(2099, 9, 1, 0, 0, 0).unwrap();
        assert_eq!(school_year_name(at), "2099/00");
    }
}

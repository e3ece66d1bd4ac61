use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::models::MealPlan;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// 解析计划创建时间或筛选边界；只有日期时取当天零点
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// 餐饮计划列表筛选：关键字 + 创建时间区间 (闭区间)
#[derive(Debug, Clone, Default)]
pub struct PlanFilter {
    term: String,
    from: Option<NaiveDateTime>,
    to: Option<NaiveDateTime>,
}

impl PlanFilter {
    pub fn new(term: Option<&str>, from: Option<&str>, to: Option<&str>) -> Self {
        Self {
            term: term.unwrap_or_default().trim().to_lowercase(),
            from: from.and_then(parse_timestamp),
            to: to.and_then(parse_timestamp),
        }
    }

    /// 关键字匹配名称、文件名或ID，不区分大小写
    pub fn matches(&self, plan: &MealPlan) -> bool {
        let matches_term = self.term.is_empty()
            || [&plan.meal_plan_name, &plan.file_name, &plan.id]
                .iter()
                .any(|field| field.to_lowercase().contains(&self.term));
        if !matches_term {
            return false;
        }

        if self.from.is_none() && self.to.is_none() {
            return true;
        }
        match parse_timestamp(&plan.create_at) {
            Some(created) => {
                self.from.map_or(true, |from| created >= from)
                    && self.to.map_or(true, |to| created <= to)
            }
            None => false,
        }
    }

    pub fn apply(&self, plans: Vec<MealPlan>) -> Vec<MealPlan> {
        plans.into_iter().filter(|p| self.matches(p)).collect()
    }
}

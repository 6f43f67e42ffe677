use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const GRADE_MIN: f64 = 1.0;
pub const GRADE_MAX: f64 = 5.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRead {
    pub id: i64,
    pub user_id: Option<i64>,
    pub product_id: i64,
    pub comment: Option<String>,
    pub comment_date: DateTime<Utc>,
    pub grade: f64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReview {
    pub product_id: i64,
    #[serde(default)]
    pub comment: Option<String>,
    pub grade: f64,
}

impl CreateReview {
    /// Grade is fixed at creation and never mutated afterwards, so the
    /// range check happens exactly once — here.
    pub fn validate(&self) -> Result<(), String> {
        if !grade_in_range(self.grade) {
            return Err(format!(
                "The rating must be between {} and {}.",
                GRADE_MIN, GRADE_MAX
            ));
        }
        Ok(())
    }
}

pub fn grade_in_range(grade: f64) -> bool {
    (GRADE_MIN..=GRADE_MAX).contains(&grade) && grade.is_finite()
}

use crate::models::Plan;

/// Maximum number of notes a FREE tenant may hold.
pub const FREE_NOTE_LIMIT: i64 = 3;

impl Plan {
    /// Note ceiling for this plan, `None` when unlimited.
    pub fn note_limit(self) -> Option<i64> {
        match self {
            Plan::Free => Some(FREE_NOTE_LIMIT),
            Plan::Pro => None,
        }
    }
}

/// can_create
///
/// Whether a tenant on `plan` currently holding `current_count` notes may create one more.
/// Callers must read `current_count` as close to the insert as they can; repositories
/// do it inside the same locked transaction.
pub fn can_create(plan: Plan, current_count: i64) -> bool {
    match plan.note_limit() {
        Some(limit) => current_count < limit,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_plan_stops_at_three() {
        assert!(can_create(Plan::Free, 0));
        assert!(can_create(Plan::Free, 2));
        assert!(!can_create(Plan::Free, 3));
        assert!(!can_create(Plan::Free, 10));
    }

    #[test]
    fn pro_plan_has_no_ceiling() {
        assert_eq!(Plan::Pro.note_limit(), None);
        assert!(can_create(Plan::Pro, 0));
        assert!(can_create(Plan::Pro, 3));
        assert!(can_create(Plan::Pro, i64::MAX));
    }
}

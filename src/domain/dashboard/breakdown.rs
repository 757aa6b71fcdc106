//! Per-dimension breakdowns over the realized set.

use crate::domain::filtering::Predicate;
use crate::domain::production::Column;

/// Service types shown in the service-type breakdown.
pub const SERVICE_TYPES: [&str; 2] = ["Atendimento", "Procedimento"];

/// Attendance types shown in the attendance-type breakdown.
pub const ATTENDANCE_TYPES: [&str; 2] = ["Particular", "Por Contrato"];

pub const TOP_SUB_AREAS: usize = 10;
pub const LEAD_TIME_SUB_AREAS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Breakdown {
    Category,
    ServiceType,
    AttendanceType,
    TopSubAreas,
    LeadTimeSubAreas,
}

impl Breakdown {
    pub const ALL: [Breakdown; 5] = [
        Breakdown::Category,
        Breakdown::ServiceType,
        Breakdown::AttendanceType,
        Breakdown::TopSubAreas,
        Breakdown::LeadTimeSubAreas,
    ];

    pub fn column(&self) -> Column {
        match self {
            Breakdown::Category => Column::Category,
            Breakdown::ServiceType => Column::ServiceType,
            Breakdown::AttendanceType => Column::AttendanceType,
            Breakdown::TopSubAreas | Breakdown::LeadTimeSubAreas => Column::SubArea,
        }
    }

    /// Extra restriction on top of the realized set.
    pub fn restriction(&self) -> Predicate {
        let column = self.column();
        match self {
            Breakdown::Category => Predicate::all().and_not_null(column),
            Breakdown::ServiceType => Predicate::all().and_in(column, SERVICE_TYPES),
            Breakdown::AttendanceType => Predicate::all().and_in(column, ATTENDANCE_TYPES),
            Breakdown::TopSubAreas | Breakdown::LeadTimeSubAreas => {
                Predicate::all().and_not_blank(column)
            }
        }
    }

    pub fn limit(&self) -> Option<usize> {
        match self {
            Breakdown::TopSubAreas => Some(TOP_SUB_AREAS),
            Breakdown::LeadTimeSubAreas => Some(LEAD_TIME_SUB_AREAS),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filtering::Clause;
    use crate::domain::production::Value;

    #[test]
    fn allow_lists_become_membership_clauses() {
        assert_eq!(
            Breakdown::AttendanceType.restriction().clauses(),
            &[Clause::In {
                column: Column::AttendanceType,
                values: vec![Value::text("Particular"), Value::text("Por Contrato")],
            }]
        );
    }

    #[test]
    fn sub_area_variants_share_column_but_not_limit() {
        assert_eq!(Breakdown::TopSubAreas.column(), Breakdown::LeadTimeSubAreas.column());
        assert_eq!(Breakdown::TopSubAreas.limit(), Some(10));
        assert_eq!(Breakdown::LeadTimeSubAreas.limit(), Some(5));
        assert_eq!(Breakdown::Category.limit(), None);
    }
}

//! Cohort selection from students and enrollments.

use std::collections::HashSet;

use crate::model::{CohortMembership, Enrollment, Student, StudentStatus};

/// The active students of `program_id`/`batch_id` enrolled in `course_id`,
/// in student-list order without duplicates.
pub fn select_cohort(
    course_id: &str,
    program_id: &str,
    batch_id: &str,
    students: &[Student],
    enrollments: &[Enrollment],
) -> CohortMembership {
    let enrolled: HashSet<&str> = enrollments
        .iter()
        .filter(|e| e.course_id == course_id)
        .map(|e| e.student_id.as_str())
        .collect();

    let mut seen = HashSet::new();
    let student_ids = students
        .iter()
        .filter(|s| s.status == StudentStatus::Active)
        .filter(|s| s.program_id == program_id && s.batch_id == batch_id)
        .filter(|s| enrolled.contains(s.id.as_str()))
        .filter(|s| seen.insert(s.id.as_str()))
        .map(|s| s.id.clone())
        .collect();

    CohortMembership {
        course_id: course_id.to_string(),
        student_ids,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: &str, program: &str, batch: &str, status: StudentStatus) -> Student {
        Student {
            id: id.into(),
            program_id: program.into(),
            batch_id: batch.into(),
            status,
        }
    }

    fn enroll(course: &str, student: &str) -> Enrollment {
        Enrollment {
            course_id: course.into(),
            student_id: student.into(),
        }
    }

    #[test]
    fn selects_active_enrolled_students_of_batch() {
        let students = vec![
            student("s1", "CSE", "2021", StudentStatus::Active),
            student("s2", "CSE", "2021", StudentStatus::Inactive),
            student("s3", "CSE", "2022", StudentStatus::Active),
            student("s4", "ECE", "2021", StudentStatus::Active),
            student("s5", "CSE", "2021", StudentStatus::Active),
            student("s6", "CSE", "2021", StudentStatus::Active),
        ];
        let enrollments = vec![
            enroll("CS101", "s1"),
            enroll("CS101", "s2"),
            enroll("CS101", "s3"),
            enroll("CS101", "s4"),
            enroll("CS101", "s5"),
            enroll("MA101", "s6"),
        ];

        let cohort = select_cohort("CS101", "CSE", "2021", &students, &enrollments);
        assert_eq!(cohort.course_id, "CS101");
        assert_eq!(cohort.student_ids, vec!["s1", "s5"]);
    }

    #[test]
    fn duplicate_students_appear_once() {
        let students = vec![
            student("s1", "CSE", "2021", StudentStatus::Active),
            student("s1", "CSE", "2021", StudentStatus::Active),
        ];
        let enrollments = vec![enroll("CS101", "s1"), enroll("CS101", "s1")];
        let cohort = select_cohort("CS101", "CSE", "2021", &students, &enrollments);
        assert_eq!(cohort.student_ids, vec!["s1"]);
    }

    #[test]
    fn no_enrollments_gives_empty_cohort() {
        let students = vec![student("s1", "CSE", "2021", StudentStatus::Active)];
        let cohort = select_cohort("CS101", "CSE", "2021", &students, &[]);
        assert!(cohort.student_ids.is_empty());
    }
}

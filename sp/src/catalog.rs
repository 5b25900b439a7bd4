//! Built-in CS course catalog and default plan generation
//!
//! The catalog is static demo data: a 20-course computer science program
//! with prerequisites, offering terms, and requirement buckets. The default
//! plan spreads the core sequence over eight fall/spring semesters.

use tracing::debug;

use crate::domain::{Course, CourseType, Major, PlannedCourse, Semester, Term};
use crate::export::CourseSection;

const FS: &[Term] = &[Term::Fall, Term::Spring];
const F: &[Term] = &[Term::Fall];
const S: &[Term] = &[Term::Spring];

#[allow(clippy::too_many_arguments)]
fn course(
    id: &str,
    code: &str,
    title: &str,
    credits: u32,
    description: &str,
    prereqs: &[&str],
    terms: &[Term],
    course_type: CourseType,
    bucket: &str,
) -> Course {
    let prerequisites: Vec<String> = prereqs.iter().map(|p| p.to_string()).collect();
    let prereq_expression = match prerequisites.len() {
        0 => None,
        1 => Some(prerequisites[0].clone()),
        _ => Some(prerequisites.join(" AND ")),
    };
    Course {
        id: id.to_string(),
        code: code.to_string(),
        title: title.to_string(),
        credits,
        description: Some(description.to_string()),
        prerequisites,
        prereq_expression,
        offered_terms: terms.to_vec(),
        course_type,
        requirement_bucket: Some(bucket.to_string()),
    }
}

/// The full CS course catalog
pub fn course_catalog() -> Vec<Course> {
    use CourseType::{Core, Elective, General};
    vec![
        course(
            "cs-101", "CS-101", "Introduction to Computer Science", 3,
            "Fundamental concepts of programming and computational thinking.",
            &[], FS, Core, "Core",
        ),
        course(
            "cs-102", "CS-102", "Programming Fundamentals", 4,
            "Object-oriented programming concepts with practical applications.",
            &["CS-101"], FS, Core, "Core",
        ),
        course(
            "math-101", "MATH-101", "Calculus I", 4,
            "Limits, derivatives, and integrals of single-variable functions.",
            &[], FS, Core, "Math",
        ),
        course(
            "math-102", "MATH-102", "Calculus II", 4,
            "Integration techniques, sequences, and series.",
            &["MATH-101"], FS, Core, "Math",
        ),
        course(
            "cs-201", "CS-201", "Data Structures", 3,
            "Arrays, linked lists, trees, graphs, and algorithm analysis.",
            &["CS-102"], FS, Core, "Core",
        ),
        course(
            "cs-202", "CS-202", "Algorithms", 3,
            "Algorithm design, analysis, and complexity theory.",
            &["CS-201", "MATH-102"], FS, Core, "Core",
        ),
        course(
            "cs-210", "CS-210", "Computer Organization", 3,
            "Digital logic, assembly language, and computer architecture.",
            &["CS-102"], F, Core, "Systems",
        ),
        course(
            "math-201", "MATH-201", "Discrete Mathematics", 3,
            "Logic, sets, relations, functions, and graph theory.",
            &["MATH-101"], FS, Core, "Math",
        ),
        course(
            "cs-301", "CS-301", "Operating Systems", 3,
            "Process management, memory management, and file systems.",
            &["CS-210"], F, Core, "Systems",
        ),
        course(
            "cs-302", "CS-302", "Database Systems", 3,
            "Relational databases, SQL, and database design.",
            &["CS-201"], FS, Core, "Core",
        ),
        course(
            "cs-310", "CS-310", "Software Engineering", 3,
            "Software development methodologies and project management.",
            &["CS-201"], S, Core, "Core",
        ),
        course(
            "cs-320", "CS-320", "Computer Networks", 3,
            "Network protocols, architecture, and security fundamentals.",
            &["CS-210"], S, Core, "Systems",
        ),
        course(
            "cs-401", "CS-401", "Senior Capstone Project", 4,
            "Team-based software development project.",
            &["CS-310"], FS, Core, "Capstone",
        ),
        course(
            "cs-350", "CS-350", "Artificial Intelligence", 3,
            "Search algorithms, machine learning, and neural networks.",
            &["CS-202"], F, Elective, "Elective",
        ),
        course(
            "cs-360", "CS-360", "Web Development", 3,
            "Full-stack web development with modern frameworks.",
            &["CS-201"], FS, Elective, "Elective",
        ),
        course(
            "cs-370", "CS-370", "Mobile App Development", 3,
            "iOS and Android application development.",
            &["CS-201"], S, Elective, "Elective",
        ),
        course(
            "cs-380", "CS-380", "Cybersecurity", 3,
            "Security principles, cryptography, and ethical hacking.",
            &["CS-320"], FS, Elective, "Elective",
        ),
        course(
            "cs-390", "CS-390", "Cloud Computing", 3,
            "Distributed systems, virtualization, and cloud services.",
            &["CS-301"], S, Elective, "Elective",
        ),
        course(
            "eng-101", "ENG-101", "College Writing", 3,
            "Academic writing and critical thinking skills.",
            &[], FS, General, "General Education",
        ),
        course(
            "comm-101", "COMM-101", "Public Speaking", 3,
            "Oral communication and presentation skills.",
            &[], FS, General, "General Education",
        ),
    ]
}

/// Look up a catalog course by id or code (case-insensitive on code)
pub fn find_course(key: &str) -> Option<Course> {
    course_catalog()
        .into_iter()
        .find(|c| c.id == key || c.code.eq_ignore_ascii_case(key))
}

/// The CS major definition backing the catalog
pub fn cs_major() -> Major {
    Major {
        id: "cs".to_string(),
        name: "Computer Science".to_string(),
        catalog_year: "2024-2025".to_string(),
        required_credits: 120,
        core_credits: 45,
        elective_credits: 12,
    }
}

/// Registered demo sections with parseable meeting times
///
/// Three CS-201 offerings, enough to drive the recurring-event calendar
/// export path.
pub fn sample_sections() -> Vec<CourseSection> {
    let section = |id: &str, number: &str, professor: &str, total, open, meeting: &str| CourseSection {
        id: id.to_string(),
        course_id: "cs-201".to_string(),
        section_number: number.to_string(),
        professor: professor.to_string(),
        seats_total: total,
        seats_open: open,
        meeting_times: meeting.to_string(),
    };
    vec![
        section("cs201-001", "001", "Dr. Sarah Chen", 35, 8, "MWF 9:00-9:50 AM"),
        section("cs201-002", "002", "Dr. Michael Park", 35, 2, "TR 10:30 AM-11:45 AM"),
        section("cs201-003", "003", "Dr. Sarah Chen", 30, 15, "MWF 2:00-2:50 PM"),
    ]
}

/// Generate the default eight-semester plan for a given admission year
///
/// Four academic years of fall + spring, each capped at `max_credits`,
/// pre-populated with the standard course sequence. The final spring is
/// left empty.
pub fn generate_default_plan(admitted_year: i32, max_credits: u32) -> Vec<Semester> {
    debug!(admitted_year, max_credits, "generate_default_plan: called");
    let catalog = course_catalog();
    let mut semesters = Vec::with_capacity(8);

    for i in 0..4 {
        let year = admitted_year + i;
        let label = format!("Y{}", i + 1);
        semesters.push(Semester::new(Term::Fall, year, format!("Fall {}", label), max_credits));
        semesters.push(Semester::new(Term::Spring, year + 1, format!("Spring {}", label), max_credits));
    }

    let assignments: &[(Term, i32, &[&str])] = &[
        (Term::Fall, 0, &["cs-101", "math-101", "eng-101"]),
        (Term::Spring, 1, &["cs-102", "math-102", "comm-101"]),
        (Term::Fall, 1, &["cs-201", "cs-210", "math-201"]),
        (Term::Spring, 2, &["cs-202", "cs-302", "cs-360"]),
        (Term::Fall, 2, &["cs-301", "cs-310", "cs-350"]),
        (Term::Spring, 3, &["cs-320", "cs-370", "cs-380"]),
        (Term::Fall, 3, &["cs-401", "cs-390"]),
    ];

    for (term, offset, course_ids) in assignments {
        let id = format!("{}-{}", term, admitted_year + offset);
        let Some(semester) = semesters.iter_mut().find(|s| s.id == id) else {
            continue;
        };
        for course_id in *course_ids {
            if let Some(c) = catalog.iter().find(|c| &c.id == course_id) {
                let sem_id = semester.id.clone();
                semester.courses.push(PlannedCourse::place(c.clone(), &sem_id));
            }
        }
    }

    semesters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;

    #[test]
    fn test_catalog_size_and_lookup() {
        let catalog = course_catalog();
        assert_eq!(catalog.len(), 20);
        assert!(find_course("cs-101").is_some());
        assert!(find_course("CS-101").is_some());
        assert!(find_course("cs-999").is_none());
    }

    #[test]
    fn test_prereq_expressions_derived() {
        let cs202 = find_course("cs-202").unwrap();
        assert_eq!(cs202.prereq_expression.as_deref(), Some("CS-201 AND MATH-102"));
        let cs101 = find_course("cs-101").unwrap();
        assert!(cs101.prereq_expression.is_none());
    }

    #[test]
    fn test_sample_sections_cover_cs201() {
        let sections = sample_sections();
        assert_eq!(sections.len(), 3);
        assert!(sections.iter().all(|s| s.course_id == "cs-201"));
        assert_eq!(sections[0].section_number, "001");
        assert_eq!(sections[1].meeting_times, "TR 10:30 AM-11:45 AM");
    }

    #[test]
    fn test_default_plan_shape() {
        let semesters = generate_default_plan(2024, 18);
        assert_eq!(semesters.len(), 8);
        assert_eq!(semesters[0].id, "fall-2024");
        assert_eq!(semesters[7].id, "spring-2028");
        assert!(semesters.iter().all(|s| s.max_credits == 18));

        // Final spring is a free slot
        assert!(semesters[7].courses.is_empty());
        let total: usize = semesters.iter().map(|s| s.courses.len()).sum();
        assert_eq!(total, 20);
    }

    #[test]
    fn test_default_plan_back_references() {
        let semesters = generate_default_plan(2024, 18);
        for semester in &semesters {
            for course in &semester.courses {
                assert_eq!(course.semester_id, semester.id);
            }
        }
    }

    #[test]
    fn test_default_plan_prereq_errors() {
        // Re-validating every placement against its own semester flags
        // exactly one course: CS-380 shares spring Y3 with its prerequisite
        // CS-320, and a same-semester prerequisite does not satisfy the
        // check
        let semesters = generate_default_plan(2024, 18);
        let mut flagged = Vec::new();
        for (ix, semester) in semesters.iter().enumerate() {
            let mut others = semesters.clone();
            for course in &semester.courses {
                others[ix].courses.retain(|c| c.course.id != course.course.id);
                let result = validate(course, &others[ix], &others);
                if result.errors().next().is_some() {
                    flagged.push(course.course.code.clone());
                }
                others[ix].courses.push(course.clone());
            }
        }
        assert_eq!(flagged, vec!["CS-380".to_string()]);
    }
}

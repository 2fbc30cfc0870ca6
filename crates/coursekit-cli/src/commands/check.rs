use coursekit_kernel::ResolverOptions;
use serde_json::json;

use crate::support::load_course_or_exit;

pub fn run(course_path: String, vocabulary: Option<String>, json_output: bool) {
    let course = load_course_or_exit(
        &course_path,
        vocabulary.as_deref(),
        ResolverOptions::default(),
    );

    if json_output {
        let payload = json!({
            "course": course_path,
            "declarations": course.registry.len(),
            "exercises": course.exercises.len(),
            "report": course.report,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).expect("json serialization")
        );
    } else {
        println!("coursekit check {course_path}");
        println!("  Declarations: {}", course.registry.len());
        println!("  Exercises: {}", course.exercises.len());
        println!("  Result: {}", course.report.result);
        for issue in &course.report.issues {
            let locus = match (&issue.declaration, issue.line) {
                (Some(name), Some(line)) => format!("{name} (line {line})"),
                (Some(name), None) => name.clone(),
                (None, Some(line)) => format!("line {line}"),
                (None, None) => "course".to_string(),
            };
            println!("  [{}] {locus}: {}", issue.failure_class, issue.message);
        }
    }

    if !course.report.is_accepted() {
        std::process::exit(1);
    }
}

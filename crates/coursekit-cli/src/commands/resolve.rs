use coursekit_kernel::{CATEGORIES, ResolverOptions};
use serde_json::json;

use crate::support::load_course_or_exit;

pub fn run(
    course_path: String,
    vocabulary: Option<String>,
    no_inheritance: bool,
    json_output: bool,
) {
    let options = ResolverOptions {
        inheritance: !no_inheritance,
    };
    let course = load_course_or_exit(&course_path, vocabulary.as_deref(), options);

    if json_output {
        let payload = json!({
            "course": course_path,
            "exercises": course.exercises,
            "report": course.report,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).expect("json serialization")
        );
    } else {
        println!("coursekit resolve {course_path}");
        println!("  Exercises: {}", course.exercises.len());
        for exercise in &course.exercises {
            println!("  {} ({})", exercise.name, exercise.pretty_name);
            for category in CATEGORIES {
                if let Some(permitted) = exercise.toolset.permitted(category) {
                    let names: Vec<&str> = permitted.iter().map(String::as_str).collect();
                    println!("    {category}: {}", names.join(", "));
                }
            }
        }
        if !course.report.is_accepted() {
            println!("  Issues: {}", course.report.issues.len());
        }
    }

    if !course.report.is_accepted() {
        std::process::exit(1);
    }
}

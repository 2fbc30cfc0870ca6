use coursekit_kernel::ResolverOptions;
use serde_json::json;

use crate::support::load_course_or_exit;

pub fn run(course_path: String, json_output: bool) {
    let course = load_course_or_exit(&course_path, None, ResolverOptions::default());

    if json_output {
        let payload = json!({
            "course": course_path,
            "outline": course.outline,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).expect("json serialization")
        );
    } else {
        println!("coursekit outline {course_path}");
        for entry in &course.outline {
            let depth = entry.namespace.matches('.').count();
            println!("  {}{}: {}", "  ".repeat(depth), entry.namespace, entry.title);
        }
    }
}

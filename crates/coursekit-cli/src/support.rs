//! Shared command plumbing: file loading and exit-on-error helpers.

use coursekit_course::{Course, parse_course_with};
use coursekit_kernel::{ResolverOptions, Vocabulary};

pub fn load_course_or_exit(
    course_path: &str,
    vocabulary_path: Option<&str>,
    options: ResolverOptions,
) -> Course {
    let vocabulary = load_vocabulary_or_exit(vocabulary_path);
    let text = match std::fs::read_to_string(course_path) {
        Ok(text) => text,
        Err(error) => {
            eprintln!("error: cannot read {course_path}: {error}");
            std::process::exit(2);
        }
    };
    parse_course_with(&text, &vocabulary, options)
}

fn load_vocabulary_or_exit(path: Option<&str>) -> Vocabulary {
    let Some(path) = path else {
        return Vocabulary::default();
    };
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) => {
            eprintln!("error: cannot read {path}: {error}");
            std::process::exit(2);
        }
    };
    match Vocabulary::from_toml_str(&text) {
        Ok(vocabulary) => vocabulary,
        Err(error) => {
            eprintln!("error: invalid vocabulary file {path}: {error}");
            std::process::exit(2);
        }
    }
}

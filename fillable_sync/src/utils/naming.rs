//! Naming utilities for FillableSync
//!
//! PHP class-name handling and the Eloquent table naming convention.

use inflector::Inflector;

/// Strip the leading namespace separator from a class name
pub fn normalize_class_name(name: &str) -> String {
    name.trim().trim_start_matches('\\').to_string()
}

/// Last segment of a fully-qualified class name
pub fn class_basename(class_name: &str) -> &str {
    class_name.rsplit('\\').next().unwrap_or(class_name)
}

/// Join a namespace and a class name into a fully-qualified name
pub fn qualify(namespace: &str, name: &str) -> String {
    let namespace = namespace.trim_matches('\\');
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}\\{}", namespace, name)
    }
}

/// Pluralize a single lowercase word
pub fn pluralize_word(word: &str) -> String {
    // Handle special pluralization cases that the inflector might not handle correctly
    match word.to_lowercase().as_str() {
        "person" => "people".to_string(),
        "child" => "children".to_string(),
        "man" => "men".to_string(),
        "woman" => "women".to_string(),
        "foot" => "feet".to_string(),
        "tooth" => "teeth".to_string(),
        "goose" => "geese".to_string(),
        "mouse" => "mice".to_string(),
        _ => word.to_plural(),
    }
}

/// Default table name Eloquent derives for a model class
///
/// The basename is snake-cased and only its last word is pluralized, so
/// `App\Models\UserProfile` maps to `user_profiles`.
pub fn default_table_name(class_name: &str) -> String {
    let snake = class_basename(class_name).to_snake_case();

    match snake.rsplit_once('_') {
        Some((head, last)) => format!("{}_{}", head, pluralize_word(last)),
        None => pluralize_word(&snake),
    }
}

//! Declaration renderer

/// Render the `$fillable` declaration for `fields`
///
/// One field per line at eight spaces, trailing comma after each, closing
/// bracket at four spaces. No fields renders an empty list.
pub fn render(fields: &[String]) -> String {
    if fields.is_empty() {
        return "protected $fillable = [];".to_string();
    }

    let mut rendered = String::from("protected $fillable = [\n");
    for field in fields {
        rendered.push_str("        ");
        rendered.push_str(&quote(field));
        rendered.push_str(",\n");
    }
    rendered.push_str("    ];");
    rendered
}

/// Render a single-line `$dates` declaration
pub fn render_dates(columns: &[String]) -> String {
    let quoted: Vec<String> = columns.iter().map(|c| quote(c)).collect();
    format!("protected $dates = [{}];", quoted.join(", "))
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_render_layout() {
        assert_eq!(
            render(&strings(&["name", "email"])),
            "protected $fillable = [\n        'name',\n        'email',\n    ];"
        );
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&[]), "protected $fillable = [];");
    }

    #[test]
    fn test_render_dates() {
        assert_eq!(
            render_dates(&strings(&["starts_on", "ends_on"])),
            "protected $dates = ['starts_on', 'ends_on'];"
        );
        assert_eq!(render_dates(&[]), "protected $dates = [];");
    }

    #[test]
    fn test_quotes_are_escaped() {
        assert!(render(&strings(&["o'clock"])).contains(r"'o\'clock',"));
    }
}

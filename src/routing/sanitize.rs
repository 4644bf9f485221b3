//! Hostname sanitization for application names.

/// Turn an application name into a DNS-label safe hostname fragment.
///
/// ASCII letters are lowercased, digits are kept, spaces and hyphens become
/// hyphens and everything else is dropped. A name without any letter or
/// digit sanitizes to the empty string.
pub fn sanitize_hostname(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    let mut valid_count = 0usize;

    for c in name.trim().chars() {
        match c {
            'a'..='z' | '0'..='9' => {
                sanitized.push(c);
                valid_count += 1;
            }
            'A'..='Z' => {
                sanitized.push(c.to_ascii_lowercase());
                valid_count += 1;
            }
            ' ' | '-' => sanitized.push('-'),
            _ => {}
        }
    }

    if valid_count == 0 {
        return String::new();
    }

    sanitized.trim_matches('-').to_string()
}

//! Small string helpers shared by the formatters and the advanced generator.

/// Capitalize the first letter of every whitespace-separated word and lower
/// the rest: `"user profiles"` -> `"User Profiles"`.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Title-case a uri segment, reading dashes as word breaks.
pub fn segment_title(segment: &str) -> String {
    title_case(&segment.replace('-', " "))
}

/// Split `CamelCase` into `camel_case`. Existing underscores are kept.
pub fn snake_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    let mut prev_lower = false;

    for c in text.chars() {
        if c.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }

    out
}

/// Last segment of a qualified identifier, for both Rust (`a::b::C`) and
/// namespaced (`App\Http\C`) spellings.
pub fn basename(identifier: &str) -> &str {
    identifier
        .rsplit(|c| c == '\\' || c == ':')
        .find(|s| !s.is_empty())
        .unwrap_or(identifier)
}

/// Uri as an absolute API path: a leading `api/` is stripped and a leading
/// slash ensured (`api/users/{id}` -> `/users/{id}`, `health` -> `/health`).
pub fn api_path(uri: &str) -> String {
    if let Some(rest) = uri.strip_prefix("api/") {
        format!("/{}", rest)
    } else if uri.starts_with('/') {
        uri.to_string()
    } else {
        format!("/{}", uri)
    }
}

/// Non-empty path segments of a uri.
pub fn segments(uri: &str) -> Vec<&str> {
    uri.split('/').filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("user profiles"), "User Profiles");
        assert_eq!(title_case("API"), "Api");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_segment_title_reads_dashes_as_spaces() {
        assert_eq!(segment_title("order-items"), "Order Items");
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("UserProfile"), "user_profile");
        assert_eq!(snake_case("User"), "user");
        assert_eq!(snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename("handlers::users::UserController"), "UserController");
        assert_eq!(basename("App\\Http\\Controllers\\PostController"), "PostController");
        assert_eq!(basename("users"), "users");
    }

    #[test]
    fn test_api_path() {
        assert_eq!(api_path("api/users/{id}"), "/users/{id}");
        assert_eq!(api_path("health"), "/health");
        assert_eq!(api_path("/"), "/");
        assert_eq!(api_path("apix/items"), "/apix/items");
    }
}

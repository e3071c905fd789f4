//! HTTP span helpers.

use uuid::Uuid;

/// The request path with identifiers collapsed, for span and metric labels.
pub(super) fn route_template(path: &str) -> String {
    if path == "/" {
        return "/".to_owned();
    }

    let mut normalised = String::from("/");

    for (index, segment) in path.trim_start_matches('/').split('/').enumerate() {
        if index > 0 {
            normalised.push('/');
        }

        if Uuid::parse_str(segment).is_ok() {
            normalised.push_str("{uuid}");
        } else {
            normalised.push_str(segment);
        }
    }

    normalised
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_collapsed() {
        let path = format!("/api/bookings/{}/cancel", Uuid::now_v7());

        assert_eq!(route_template(&path), "/api/bookings/{uuid}/cancel");
        assert_eq!(route_template("/api/products"), "/api/products");
        assert_eq!(route_template("/"), "/");
    }
}

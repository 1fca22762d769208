use crate::layout::PATH_SEPARATOR;

/// Splits a node path on `/`, dropping empty segments.
pub fn split_path(path: &str) -> Vec<String> {
    path.split(PATH_SEPARATOR)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn join_path<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(PATH_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_drops_empty_segments() {
        assert_eq!(split_path("/a//b/c/"), vec!["a", "b", "c"]);
        assert!(split_path("").is_empty());
        assert!(split_path("///").is_empty());
    }

    #[test]
    fn test_round_trip() {
        for path in ["a", "a/b", "s1/c1/p1/_files/x y.txt"] {
            assert_eq!(join_path(&split_path(path)), path);
        }
    }
}

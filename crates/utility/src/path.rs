use std::path::{Component, Path};

/// Returns the final, normal component of a client supplied file name.
///
/// Both `/` and `\` count as separators regardless of platform, so a name
/// like `..\..\secret.txt` uploaded from a Windows browser is reduced the same
/// way as `../../secret.txt`. Returns `None` if nothing usable remains, e.g.
/// for `""`, `".."` or `"uploads/"`.
pub fn basename(name: &str) -> Option<&str> {
    let last = name.rsplit(&['/', '\\'][..]).next()?;
    let mut components = Path::new(last).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(last),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::basename;

    #[test]
    fn keeps_plain_names() {
        assert_eq!(basename("photo.png"), Some("photo.png"));
        assert_eq!(basename("my photo.final.jpeg"), Some("my photo.final.jpeg"));
    }

    #[test]
    fn strips_directories() {
        assert_eq!(basename("../../etc/passwd"), Some("passwd"));
        assert_eq!(basename("/var/www/uploads/7_photo.png"), Some("7_photo.png"));
        assert_eq!(basename("C:\\Users\\me\\photo.png"), Some("photo.png"));
        assert_eq!(basename("..\\..\\photo.png"), Some("photo.png"));
    }

    #[test]
    fn rejects_names_without_a_file_component() {
        assert_eq!(basename(""), None);
        assert_eq!(basename("."), None);
        assert_eq!(basename(".."), None);
        assert_eq!(basename("uploads/"), None);
        assert_eq!(basename("../.."), None);
    }
}

/// Drops the last `/`-delimited segment of `location`.
///
/// `"/users/42/add-to-group"` becomes `"/users/42"`; a single segment such as
/// `"users"` or `"/users"` resolves to the empty path.
pub fn parent_path(location: &str) -> String {
    let mut segments: Vec<&str> = location.split('/').collect();
    segments.pop();
    segments.join("/")
}

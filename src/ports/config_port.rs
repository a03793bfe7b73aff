//! Configuration access port trait.

/// Sectioned key/value configuration. Values are returned raw; parsing and
/// range checks belong to the caller.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Keys present in `section`, in definition order. Empty when the section
    /// is absent.
    fn section_keys(&self, section: &str) -> Vec<String>;
}

//! Configuration access port trait.

/// Typed reads from a sectioned key/value configuration source.
///
/// Both getters distinguish "absent" (`Ok(None)`) from
/// "present but unparseable" (`Err`), so callers can report bad values
/// instead of silently falling back to a default.
pub trait ConfigPort {
    fn get_uint(&self, section: &str, key: &str) -> Result<Option<u64>, String>;
    fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>, String>;
}

/// No loader API is known for this target.
pub fn library_handle() -> Option<usize> {
    None
}

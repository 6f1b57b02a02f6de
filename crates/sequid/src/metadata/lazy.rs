use std::sync::OnceLock;

/// Returns the value cached in `slot`, computing it with `load` on first
/// access.
///
/// The loader runs outside any lock, so a reader never waits behind a
/// computing thread: racing first readers may each run the loader, but
/// exactly one result is published and the rest are dropped. Loaders must
/// therefore be side-effect-free.
pub(crate) fn get_or_publish<T>(slot: &OnceLock<T>, load: impl FnOnce() -> T) -> &T {
    if let Some(value) = slot.get() {
        return value;
    }
    let computed = load();
    slot.get_or_init(|| computed)
}

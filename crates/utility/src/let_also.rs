/// Kotlin style `let`, used to keep long builder and iterator chains flowing
/// without temporary bindings.
pub trait LetAlso: Sized {
    fn let_owned<R, F: FnOnce(Self) -> R>(self, f: F) -> R {
        f(self)
    }
}

impl<T> LetAlso for T {}

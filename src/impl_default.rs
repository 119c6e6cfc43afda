use crate::TagImpl;

impl TagImpl for i8 {
    fn plain() -> Self {
        0
    }
    fn root() -> Self {
        Self::MIN
    }
    fn eof() -> Self {
        Self::MAX
    }
}
impl TagImpl for i16 {
    fn plain() -> Self {
        0
    }
    fn root() -> Self {
        Self::MIN
    }
    fn eof() -> Self {
        Self::MAX
    }
}
impl TagImpl for i32 {
    fn plain() -> Self {
        0
    }
    fn root() -> Self {
        Self::MIN
    }
    fn eof() -> Self {
        Self::MAX
    }
}

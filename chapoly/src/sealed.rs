pub trait Sealed {}
pub trait AadSealed {}

// raw 256-bit keys, shared by `chacha` and `poly1305`
impl<'r> Sealed for &'r [u8; 32] {}

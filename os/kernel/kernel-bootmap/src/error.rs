/// Reasons a boot information block could not be (fully) parsed.
///
/// None of these are fatal on their own; the parser logs them and degrades.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("boot info of {len} bytes is too short to hold a header")]
    TooShort { len: usize },
    #[error("boot info declares an empty tag stream")]
    EmptyStream,
    #[error("tag at offset {offset:#x} runs past the end of the stream")]
    Truncated { offset: usize },
    #[error("tag at offset {offset:#x} declares invalid size {size}")]
    MalformedTag { offset: usize, size: u32 },
    #[error("read of {len} bytes at offset {offset:#x} is out of bounds")]
    OutOfBounds { offset: usize, len: usize },
    #[error("no memory regions found in boot info")]
    NoRegions,
}

/// Random access to the units a parser consumes.
///
/// `str` is addressed by byte, so literals above `0x7f` are compared against
/// individual UTF-8 bytes. Use `[char]` to match by code point.
pub trait Input {
    type Unit: Copy;

    fn len(&self) -> usize;

    fn unit_at(&self, idx: usize) -> Option<Self::Unit>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Input for str {
    type Unit = u8;

    fn len(&self) -> usize {
        str::len(self)
    }

    fn unit_at(&self, idx: usize) -> Option<u8> {
        self.as_bytes().get(idx).copied()
    }
}

impl Input for [u8] {
    type Unit = u8;

    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn unit_at(&self, idx: usize) -> Option<u8> {
        self.get(idx).copied()
    }
}

impl Input for [char] {
    type Unit = char;

    fn len(&self) -> usize {
        <[char]>::len(self)
    }

    fn unit_at(&self, idx: usize) -> Option<char> {
        self.get(idx).copied()
    }
}

use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn slice<'a>(&self, bytes: &'a [u8]) -> io::Result<&'a [u8]> {
        bytes.get(self.start..self.end).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "range {}..{} is outside a buffer of {} bytes",
                    self.start,
                    self.end,
                    bytes.len()
                ),
            )
        })
    }

    pub fn slice_mut<'a>(&self, bytes: &'a mut [u8]) -> io::Result<&'a mut [u8]> {
        let len = bytes.len();
        bytes.get_mut(self.start..self.end).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "range {}..{} is outside a buffer of {} bytes",
                    self.start, self.end, len
                ),
            )
        })
    }
}

/// Fixed slot geometry of one platform's save file.
///
/// `file_len` is the exact file size, except on the Sega CD where files may
/// be any multiple of it (larger backup RAM cartridges).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformLayout {
    pub file_len: usize,
    pub slot_start: usize,
    pub slot_len: usize,
    pub slot_count: usize,
}

impl PlatformLayout {
    pub fn slot_range(&self, index: usize) -> ByteRange {
        let start = self.slot_start + index * self.slot_len;
        ByteRange {
            start,
            end: start + self.slot_len,
        }
    }

    pub fn slot_ranges(&self) -> Vec<ByteRange> {
        (0..self.slot_count).map(|i| self.slot_range(i)).collect()
    }

    /// Checks that every slot fits inside a file of `file_len` bytes and that
    /// slots neither overlap nor leave gaps between each other.
    pub fn validate(&self, file_len: usize) -> io::Result<()> {
        let mut expected = self.slot_start;
        for (index, range) in self.slot_ranges().iter().enumerate() {
            if range.is_empty() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("slot {index} is empty"),
                ));
            }
            if range.start != expected {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "slot {index} gap/overlap: expected start {expected}, got {}",
                        range.start
                    ),
                ));
            }
            if range.end > file_len {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "slot {index} ends at {} past file length {file_len}",
                        range.end
                    ),
                ));
            }
            expected = range.end;
        }
        Ok(())
    }
}

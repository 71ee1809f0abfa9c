use std::io;

/// Fixed-size output buffer that fields are patched into by offset.
#[derive(Debug, Clone)]
pub struct SlotWriter {
    bytes: Vec<u8>,
}

impl SlotWriter {
    pub fn zeroed(len: usize) -> Self {
        Self {
            bytes: vec![0u8; len],
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn put_u8(&mut self, offset: usize, value: u8, field: &str) -> io::Result<()> {
        self.put_bytes(offset, &[value], field)
    }

    pub fn put_u16(&mut self, offset: usize, value: u16, field: &str) -> io::Result<()> {
        self.put_bytes(offset, &value.to_le_bytes(), field)
    }

    /// Writes the low three bytes of `value`.
    pub fn put_u24(&mut self, offset: usize, value: u32, field: &str) -> io::Result<()> {
        self.put_bytes(offset, &value.to_le_bytes()[..3], field)
    }

    pub fn put_u32(&mut self, offset: usize, value: u32, field: &str) -> io::Result<()> {
        self.put_bytes(offset, &value.to_le_bytes(), field)
    }

    pub fn put_bytes(&mut self, offset: usize, value: &[u8], field: &str) -> io::Result<()> {
        let end = offset + value.len();
        if self.bytes.len() < end {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "buffer too short for {field} patch: len={}, need at least {end}",
                    self.bytes.len()
                ),
            ));
        }
        self.bytes[offset..end].copy_from_slice(value);
        Ok(())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

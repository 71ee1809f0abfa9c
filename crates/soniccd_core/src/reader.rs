use std::io::{self, Read, Seek, SeekFrom};

/// Little-endian field reader over a slot or file buffer.
pub struct LittleEndianReader<R> {
    inner: R,
}

impl<R: Read + Seek> LittleEndianReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        let mut buf = [0u8; 1];
        self.inner.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    pub fn read_u16(&mut self) -> io::Result<u16> {
        let mut buf = [0u8; 2];
        self.inner.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    pub fn read_u32(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.inner.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    pub fn read_bytes(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn read_u8_at(&mut self, pos: usize) -> io::Result<u8> {
        self.seek_to(pos)?;
        self.read_u8()
    }

    pub fn read_u16_at(&mut self, pos: usize) -> io::Result<u16> {
        self.seek_to(pos)?;
        self.read_u16()
    }

    pub fn read_u32_at(&mut self, pos: usize) -> io::Result<u32> {
        self.seek_to(pos)?;
        self.read_u32()
    }

    pub fn read_bytes_at(&mut self, pos: usize, n: usize) -> io::Result<Vec<u8>> {
        self.seek_to(pos)?;
        self.read_bytes(n)
    }

    pub fn seek_to(&mut self, pos: usize) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(pos as u64))?;
        Ok(())
    }
}

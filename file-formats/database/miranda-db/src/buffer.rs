//! The in-memory database image and its bounds-checked readers

use crate::{Error, Result};
use binrw::BinRead;
use std::fmt;
use std::io::Cursor;
use std::path::Path;

#[cfg(feature = "mmap")]
use memmap2::{Mmap, MmapOptions};

/// A record layout with a fixed size on disk
pub trait FixedLayout {
    /// Size of the layout in bytes
    const SIZE: usize;
}

enum Backing {
    Owned(Vec<u8>),
    #[cfg(feature = "mmap")]
    Mapped(Mmap),
}

/// An immutable, fully loaded database file.
///
/// Every decoder reads through this type. Offsets are absolute from the
/// start of the file and every read is checked against the file length.
pub struct DbBuffer {
    data: Backing,
}

impl fmt::Debug for DbBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.data {
            Backing::Owned(_) => "owned",
            #[cfg(feature = "mmap")]
            Backing::Mapped(_) => "mapped",
        };
        f.debug_struct("DbBuffer")
            .field("backing", &kind)
            .field("len", &self.len())
            .finish()
    }
}

impl From<Vec<u8>> for DbBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self::from_vec(data)
    }
}

impl DbBuffer {
    /// Wrap an owned byte vector
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self {
            data: Backing::Owned(data),
        }
    }

    /// Read a whole file into memory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading database file: {}", path.display());
        let data = std::fs::read(path)?;
        Ok(Self::from_vec(data))
    }

    /// Map a file into memory read-only
    ///
    /// The file must not be modified while the map is alive.
    #[cfg(feature = "mmap")]
    #[allow(unsafe_code)]
    pub fn open_mmap<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Mapping database file: {}", path.display());
        let file = std::fs::File::open(path)?;
        // SAFETY: the map is read-only and the database is never written by this crate.
        let mmap = unsafe { MmapOptions::new().map(&file)? };
        Ok(Self {
            data: Backing::Mapped(mmap),
        })
    }

    /// The whole file
    pub fn as_slice(&self) -> &[u8] {
        match &self.data {
            Backing::Owned(data) => data,
            #[cfg(feature = "mmap")]
            Backing::Mapped(mmap) => &mmap[..],
        }
    }

    /// File length in bytes
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether the file is empty
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// Borrow `length` bytes at `offset` without copying
    pub fn slice(&self, offset: u32, length: usize) -> Result<&[u8]> {
        let data = self.as_slice();
        let start = offset as usize;
        match start.checked_add(length) {
            Some(end) if end <= data.len() => Ok(&data[start..end]),
            _ => Err(Error::OutOfRange {
                offset: u64::from(offset),
                length: length as u64,
                end: data.len() as u64,
            }),
        }
    }

    /// Copy `length` bytes at `offset`
    pub fn read_bytes(&self, offset: u32, length: usize) -> Result<Vec<u8>> {
        self.slice(offset, length).map(<[u8]>::to_vec)
    }

    /// Read a fixed-size array at `offset`
    pub fn read_array<const N: usize>(&self, offset: u32) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.slice(offset, N)?);
        Ok(out)
    }

    /// Read a byte
    pub fn read_u8(&self, offset: u32) -> Result<u8> {
        Ok(self.read_array::<1>(offset)?[0])
    }

    /// Read a little-endian `u16`
    pub fn read_u16(&self, offset: u32) -> Result<u16> {
        self.read_array(offset).map(u16::from_le_bytes)
    }

    /// Read a little-endian `u32`
    pub fn read_u32(&self, offset: u32) -> Result<u32> {
        self.read_array(offset).map(u32::from_le_bytes)
    }

    /// Parse a fixed layout at `offset`
    pub fn read_struct<T>(&self, offset: u32) -> Result<T>
    where
        T: FixedLayout + for<'a> BinRead<Args<'a> = ()>,
    {
        let bytes = self.slice(offset, T::SIZE)?;
        Ok(T::read_le_args(&mut Cursor::new(bytes), ())?)
    }
}

//! State that must survive deep sleep.
//!
//! [`RetainedState`] is the logical view; [`RetainedImage`] is the fixed
//! `#[repr(C)]` layout written into RTC slow memory. The image carries a
//! magic word and a checksum so that a cold boot (memory never written)
//! and a corrupted image (brown-out mid-write) are both detected and
//! reported instead of being read as valid values.

use crc_all::Crc;

use crate::error::RetainedError;

/// Device identifier text (12 hex chars today, room for longer schemes).
pub type DeviceId = heapless::String<24>;

const ID_CAPACITY: usize = 24;

/// "AQPN" in ASCII.
pub const RETAINED_MAGIC: u32 = 0x4151_504E;

/// Values carried from one wake cycle to the next.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RetainedState {
    /// Last value that was *published*, not merely measured.
    pub last_reading: f32,
    /// Cached device identity; empty until first resolved.
    pub device_id: DeviceId,
}

impl RetainedState {
    pub fn has_device_id(&self) -> bool {
        !self.device_id.is_empty()
    }
}

/// Raw RTC-memory layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetainedImage {
    magic: u32,
    last_reading_bits: u32,
    id_len: u8,
    id: [u8; ID_CAPACITY],
    checksum: u32,
}

impl RetainedImage {
    /// All-zero image, as found in RTC memory after a cold boot.
    pub const fn blank() -> Self {
        Self {
            magic: 0,
            last_reading_bits: 0,
            id_len: 0,
            id: [0; ID_CAPACITY],
            checksum: 0,
        }
    }

    pub fn encode(state: &RetainedState) -> Self {
        let bytes = state.device_id.as_bytes();
        let len = bytes.len().min(ID_CAPACITY);
        let mut id = [0u8; ID_CAPACITY];
        id[..len].copy_from_slice(&bytes[..len]);

        let mut image = Self {
            magic: RETAINED_MAGIC,
            last_reading_bits: state.last_reading.to_bits(),
            id_len: len as u8,
            id,
            checksum: 0,
        };
        image.checksum = image.compute_checksum();
        image
    }

    pub fn decode(&self) -> Result<RetainedState, RetainedError> {
        if self.magic != RETAINED_MAGIC {
            return Err(RetainedError::Uninitialised);
        }
        if self.checksum != self.compute_checksum() || usize::from(self.id_len) > ID_CAPACITY {
            return Err(RetainedError::Corrupted);
        }
        let id_bytes = &self.id[..usize::from(self.id_len)];
        let id_str = core::str::from_utf8(id_bytes).map_err(|_| RetainedError::Corrupted)?;
        let mut device_id = DeviceId::new();
        device_id
            .push_str(id_str)
            .map_err(|_| RetainedError::Corrupted)?;

        Ok(RetainedState {
            last_reading: f32::from_bits(self.last_reading_bits),
            device_id,
        })
    }

    /// CRC-32 (ISO-HDLC) over every field except the checksum itself.
    fn compute_checksum(&self) -> u32 {
        const POLYNOMIAL: u32 = 0x04C1_1DB7;
        const WIDTH: usize = 32;
        const INITIAL: u32 = 0xFFFF_FFFF;
        const XOR: u32 = 0xFFFF_FFFF;
        const REFLECT: bool = true;
        let mut crc32 = Crc::<u32>::new(POLYNOMIAL, WIDTH, INITIAL, XOR, REFLECT);

        crc32.update(&self.magic.to_le_bytes());
        crc32.update(&self.last_reading_bits.to_le_bytes());
        crc32.update(&[self.id_len]);
        crc32.update(&self.id);
        crc32.finish()
    }

    #[cfg(test)]
    fn corrupt(&mut self) {
        self.last_reading_bits ^= 1;
    }
}

//! 64KB memory map: RAM, ROM, and the region dispatcher.
//!
//! [`Memory64`] answers the CPU's bus traffic from a set of fixed,
//! non-overlapping, sorted regions. The map is validated when it is
//! assembled, before the first cycle runs; reads that land outside every
//! region return 0 (open bus), writes there are dropped.

use emu_core::Bus;
use thiserror::Error;

/// Errors raised while assembling a memory map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MapError {
    /// Two regions claim the same addresses.
    #[error("memory regions overlap at ${at:04X}")]
    Overlap {
        /// First address claimed twice.
        at: u16,
    },

    /// The map extends past the 64KB address space.
    #[error("memory map ends at {end:#07X}, past the 64KB address space")]
    TooBig {
        /// One past the last mapped address.
        end: u32,
    },
}

/// Zero-initialized read/write memory of 2^bits bytes.
pub struct Ram {
    bytes: Vec<u8>,
    org: u16,
}

impl Ram {
    /// Allocate 2^`bits` bytes of zeroed RAM based at $0000.
    #[must_use]
    pub fn new(bits: u32) -> Self {
        Self {
            bytes: vec![0; 1 << bits],
            org: 0x0000,
        }
    }

    /// Move the region base.
    pub fn set_org(&mut self, org: u16) {
        self.org = org;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Read-only memory initialized from an image. Writes are ignored.
pub struct Rom {
    bytes: Vec<u8>,
    org: u16,
}

impl Rom {
    /// Wrap a ROM image, based at $0000.
    #[must_use]
    pub fn new(image: Vec<u8>) -> Self {
        Self {
            bytes: image,
            org: 0x0000,
        }
    }

    /// Move the region base.
    pub fn set_org(&mut self, org: u16) {
        self.org = org;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A device behind a region of the map.
enum Device {
    Ram(Ram),
    Rom(Rom),
}

impl Device {
    fn read(&self, offset: usize) -> u8 {
        match self {
            Device::Ram(ram) => ram.bytes[offset],
            Device::Rom(rom) => rom.bytes[offset],
        }
    }

    fn write(&mut self, offset: usize, value: u8) {
        match self {
            Device::Ram(ram) => ram.bytes[offset] = value,
            // ROM drops writes silently, like the real part.
            Device::Rom(_) => {}
        }
    }
}

/// One mapped region: `[base, end)` in absolute addresses.
struct Region {
    base: u16,
    end: u32,
    device: Device,
}

impl Region {
    fn contains(&self, address: u16) -> bool {
        address >= self.base && u32::from(address) < self.end
    }
}

/// The 64KB address space: sorted, non-overlapping regions of RAM and
/// ROM answering the CPU's read/write traffic.
pub struct Memory64 {
    regions: Vec<Region>,
}

impl Memory64 {
    /// Assemble the map from a RAM and a ROM region.
    ///
    /// Fails immediately if the regions overlap or the union runs past
    /// 64KB; a bad map is a configuration error, not a runtime one.
    pub fn new(ram: Ram, rom: Rom) -> Result<Self, MapError> {
        let mut regions = vec![
            Region {
                base: ram.org,
                end: u32::from(ram.org) + ram.len() as u32,
                device: Device::Ram(ram),
            },
            Region {
                base: rom.org,
                end: u32::from(rom.org) + rom.len() as u32,
                device: Device::Rom(rom),
            },
        ];
        regions.sort_by_key(|region| region.base);

        for pair in regions.windows(2) {
            if pair[0].end > u32::from(pair[1].base) {
                return Err(MapError::Overlap { at: pair[1].base });
            }
        }
        if let Some(last) = regions.last() {
            if last.end > 0x1_0000 {
                return Err(MapError::TooBig { end: last.end });
            }
        }

        Ok(Self { regions })
    }
}

impl Bus for Memory64 {
    fn read(&mut self, address: u16) -> u8 {
        self.regions
            .iter()
            .find(|region| region.contains(address))
            .map_or(0, |region| region.device.read(usize::from(address - region.base)))
    }

    fn write(&mut self, address: u16, value: u8) {
        if let Some(region) = self
            .regions
            .iter_mut()
            .find(|region| region.contains(address))
        {
            region.device.write(usize::from(address - region.base), value);
        }
    }
}

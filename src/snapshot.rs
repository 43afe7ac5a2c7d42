use serde::{Deserialize, Serialize};

use crate::{
    board::Board,
    error::{MemoryError, Result},
    memory::Memory,
    region::RegionKind,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegionImage {
    pub kind: RegionKind,
    pub size: usize,
    pub data: Vec<u8>,
}

/// Contents of all memory regions plus the flags the bank maps depend on.
///
/// Regions are stored in the order rom, wom, ext, chip, slow, fast. The bank
/// maps are not stored, they are rebuilt on restore.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemorySnapshot {
    pub regions: Vec<RegionImage>,
    pub wom_lock: bool,
    pub overlay: bool,
}

impl MemorySnapshot {
    pub fn region(&self, kind: RegionKind) -> Option<&RegionImage> {
        self.regions.iter().find(|image| image.kind == kind)
    }
}

impl<B: Board> Memory<B> {
    pub fn snapshot(&self) -> MemorySnapshot {
        let regions = RegionKind::ALL
            .iter()
            .map(|&kind| {
                let region = self.region(kind);
                RegionImage {
                    kind,
                    size: region.size(),
                    data: region.contents().to_vec(),
                }
            })
            .collect();

        MemorySnapshot {
            regions,
            wom_lock: self.wom_lock,
            overlay: self.overlay,
        }
    }

    /// Restores all regions from a snapshot.
    ///
    /// The snapshot is validated before anything is touched. A region missing
    /// from the snapshot is removed.
    pub fn restore(&mut self, snapshot: &MemorySnapshot) -> Result<()> {
        for image in &snapshot.regions {
            image.kind.validate_size(image.size)?;
            if image.data.len() != image.size {
                return Err(MemoryError::InvalidSize {
                    region: image.kind,
                    size: image.data.len(),
                });
            }
        }

        tracing::debug!("[MEM] Restoring snapshot");

        for kind in RegionKind::ALL {
            match snapshot.region(kind) {
                Some(image) => {
                    self.alloc(kind, image.size)?;
                    self.region_mut(kind).load(&image.data);
                }
                None => self.dealloc(kind)?,
            }
        }

        self.wom_lock = snapshot.wom_lock;
        self.overlay = snapshot.overlay;
        self.update_mem_src_tables();

        Ok(())
    }
}

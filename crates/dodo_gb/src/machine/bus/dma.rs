use super::super::ppu::{Mode, OAM_SIZE};
use super::GameboyBus;

const HDMA_BLOCK_SIZE: u16 = 0x10;
/// PPU dots the CPU is stalled per transferred block.
const HDMA_BLOCK_DOTS: u32 = 8;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(super) enum HdmaMode {
    #[default]
    None,
    /// Everything at once, on the next bus tick.
    General,
    /// One block per H-blank.
    HBlank,
}

/// CGB VRAM DMA state (FF51-FF55).
#[derive(Clone, Copy, Debug)]
pub(super) struct Hdma {
    /// Raw FF51-FF54 after masking.
    regs: [u8; 4],
    src: u16,
    dst: u16,
    /// Remaining blocks minus one.
    len: u8,
    mode: HdmaMode,
    /// Line of the last H-blank block, so each H-blank copies once.
    last_line: Option<u8>,
}

impl Default for Hdma {
    fn default() -> Self {
        Self {
            regs: [0; 4],
            src: 0,
            dst: 0x8000,
            len: 0x7F,
            mode: HdmaMode::None,
            last_line: None,
        }
    }
}

impl GameboyBus {
    /// OAM DMA: copy 160 bytes from `value * 0x100` into OAM immediately.
    pub(super) fn do_oam_dma(&mut self, value: u8) {
        self.oam_dma_source = value;
        let base = (value as u16) << 8;
        for i in 0..OAM_SIZE as u16 {
            let byte = self.read8_mmio(base.wrapping_add(i));
            self.ppu.write_oam(i as usize, byte);
        }
    }

    pub(super) fn read_hdma(&self, addr: u16) -> u8 {
        match addr {
            0xFF51..=0xFF54 => self.hdma.regs[(addr - 0xFF51) as usize],
            _ => {
                if self.hdma.mode == HdmaMode::None {
                    0x80 | self.hdma.len
                } else {
                    self.hdma.len
                }
            }
        }
    }

    pub(super) fn write_hdma_address(&mut self, addr: u16, value: u8) {
        const MASKS: [u8; 4] = [0xFF, 0xF0, 0x1F, 0xF0];
        let index = (addr - 0xFF51) as usize;
        self.hdma.regs[index] = value & MASKS[index];
    }

    /// FF55: start a transfer, or cancel a running one when bit 7 is clear.
    pub(super) fn write_hdma5(&mut self, value: u8) {
        let [src_hi, src_lo, dst_hi, dst_lo] = self.hdma.regs;
        self.hdma.src = u16::from_be_bytes([src_hi, src_lo]);
        self.hdma.dst = 0x8000 | u16::from_be_bytes([dst_hi, dst_lo]);
        self.hdma.len = value & 0x7F;

        if self.hdma.mode != HdmaMode::None && value & 0x80 == 0 {
            log::debug!("HDMA cancelled with {:#04x} blocks left", self.hdma.len);
            self.hdma.mode = HdmaMode::None;
            return;
        }

        self.hdma.mode = if value & 0x80 != 0 {
            HdmaMode::HBlank
        } else {
            HdmaMode::General
        };
        self.hdma.last_line = None;
        log::debug!(
            "HDMA {:?}: {:#06x} -> {:#06x}, {} blocks",
            self.hdma.mode,
            self.hdma.src,
            self.hdma.dst,
            self.hdma.len as u32 + 1
        );
    }

    /// Run pending VRAM DMA and return the PPU dots it took.
    pub(super) fn progress_dma(&mut self) -> u32 {
        match self.hdma.mode {
            HdmaMode::None => 0,
            HdmaMode::General => {
                let mut blocks = 0;
                while self.hdma.mode == HdmaMode::General {
                    self.copy_hdma_block();
                    blocks += 1;
                }
                blocks * HDMA_BLOCK_DOTS
            }
            HdmaMode::HBlank => {
                let ly = self.ppu.ly();
                let in_hblank = self.lcd_on() && self.ppu.mode() == Mode::HBlank;
                if !in_hblank || self.hdma.last_line == Some(ly) {
                    return 0;
                }
                self.hdma.last_line = Some(ly);
                self.copy_hdma_block();
                HDMA_BLOCK_DOTS
            }
        }
    }

    fn copy_hdma_block(&mut self) {
        for _ in 0..HDMA_BLOCK_SIZE {
            let byte = self.read8_mmio(self.hdma.src);
            self.ppu.write_vram(self.hdma.dst, byte);
            self.hdma.src = self.hdma.src.wrapping_add(1);
            self.hdma.dst = 0x8000 | (self.hdma.dst.wrapping_add(1) & 0x1FFF);
        }

        if self.hdma.len == 0 {
            self.hdma.len = 0x7F;
            self.hdma.mode = HdmaMode::None;
        } else {
            self.hdma.len -= 1;
        }
    }
}

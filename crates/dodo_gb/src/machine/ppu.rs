use super::Interrupt;
use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};

mod registers;
mod render;

pub(super) const VRAM_BANK_SIZE: usize = 0x2000;
pub(super) const OAM_SIZE: usize = 0xA0;
const PALETTE_RAM_SIZE: usize = 0x40;

const DOTS_PER_LINE: u32 = 456;
const LINES_PER_FRAME: u8 = 154;
const OAM_SEARCH_DOTS: u32 = 80;
const TRANSFER_END_DOTS: u32 = OAM_SEARCH_DOTS + 172;

/// STAT interrupt enable bits.
const STAT_LYC: u8 = 1 << 6;
const STAT_MODE2: u8 = 1 << 5;
const STAT_MODE1: u8 = 1 << 4;
const STAT_MODE0: u8 = 1 << 3;

/// One RGB555 colour per pixel.
pub type Frame = [[u16; SCREEN_WIDTH]; SCREEN_HEIGHT];

/// LCD controller mode as reported in STAT[1:0].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Mode {
    HBlank = 0,
    VBlank = 1,
    OamSearch = 2,
    Transfer = 3,
}

/// Picture processing unit.
///
/// Owns VRAM, OAM and the CGB palette memories; everything else reaches
/// them through the accessors below. Lines are rendered whole when pixel
/// transfer begins.
pub(super) struct Ppu {
    vram: [[u8; VRAM_BANK_SIZE]; 2],
    /// VBK (FF4F); only bank 0 exists in DMG mode.
    vram_bank: usize,
    oam: [u8; OAM_SIZE],
    cgb: bool,

    lcdc: u8,
    /// STAT interrupt enables (bits 3-6).
    stat: u8,
    scy: u8,
    scx: u8,
    ly: u8,
    lyc: u8,
    bgp: u8,
    obp0: u8,
    obp1: u8,
    wy: u8,
    wx: u8,

    /// BCPS / OCPS: bit 7 auto-increment, bits 0-5 index.
    bcps: u8,
    ocps: u8,
    bg_palette: [u8; PALETTE_RAM_SIZE],
    obj_palette: [u8; PALETTE_RAM_SIZE],

    mode: Mode,
    /// Dot position within the current line.
    dots: u32,
    /// Window row to draw next; only advances on lines showing the window.
    window_line: u8,

    framebuffer: Frame,
}

impl Ppu {
    pub(super) fn new() -> Self {
        Self {
            vram: [[0; VRAM_BANK_SIZE]; 2],
            vram_bank: 0,
            oam: [0; OAM_SIZE],
            cgb: false,
            lcdc: 0,
            stat: 0,
            scy: 0,
            scx: 0,
            ly: 0,
            lyc: 0,
            bgp: 0,
            obp0: 0,
            obp1: 0,
            wy: 0,
            wx: 0,
            bcps: 0,
            ocps: 0,
            bg_palette: [0; PALETTE_RAM_SIZE],
            obj_palette: [0; PALETTE_RAM_SIZE],
            mode: Mode::HBlank,
            dots: 0,
            window_line: 0,
            framebuffer: [[0; SCREEN_WIDTH]; SCREEN_HEIGHT],
        }
    }

    /// Power-up state left by the boot ROM: LCD on, LY 0 in V-blank.
    pub(super) fn reset(&mut self, cgb: bool) {
        *self = Self::new();
        self.cgb = cgb;
        self.lcdc = 0x91;
        self.bgp = 0xFC;
        self.obp0 = 0xFF;
        self.obp1 = 0xFF;
        self.mode = Mode::VBlank;
        if cgb {
            // All-white palettes until the game loads its own.
            self.bg_palette = [0xFF; PALETTE_RAM_SIZE];
            self.obj_palette = [0xFF; PALETTE_RAM_SIZE];
        }
    }

    #[inline]
    fn lcd_on(&self) -> bool {
        self.lcdc & 0x80 != 0
    }

    #[inline]
    fn stat_enabled(&self, bit: u8) -> bool {
        self.stat & bit != 0
    }

    pub(super) fn mode(&self) -> Mode {
        self.mode
    }

    pub(super) fn ly(&self) -> u8 {
        self.ly
    }

    pub(super) fn frame(&self) -> &Frame {
        &self.framebuffer
    }

    /// Advance by `dots` PPU dots and return the interrupt bits to raise
    /// (V-blank and/or STAT).
    pub(super) fn tick(&mut self, dots: u32) -> u8 {
        if !self.lcd_on() {
            return 0;
        }

        let mut irq = Interrupt::empty();
        let mut remaining = dots;
        loop {
            irq |= self.enter_mode_for_dot();
            if remaining == 0 {
                break;
            }

            // Never step past a mode boundary.
            let delta = remaining.min(self.next_boundary() - self.dots);
            remaining -= delta;
            self.dots += delta;

            if self.dots >= DOTS_PER_LINE {
                self.dots -= DOTS_PER_LINE;
                irq |= self.next_line();
            }
        }

        irq.bits()
    }

    /// Dot at which the current mode of a line ends.
    fn next_boundary(&self) -> u32 {
        if self.ly as usize >= SCREEN_HEIGHT {
            DOTS_PER_LINE
        } else if self.dots < OAM_SEARCH_DOTS {
            OAM_SEARCH_DOTS
        } else if self.dots < TRANSFER_END_DOTS {
            TRANSFER_END_DOTS
        } else {
            DOTS_PER_LINE
        }
    }

    fn next_line(&mut self) -> Interrupt {
        let mut irq = Interrupt::empty();
        self.ly = (self.ly + 1) % LINES_PER_FRAME;

        if self.stat_enabled(STAT_LYC) && self.ly == self.lyc {
            irq |= Interrupt::STAT;
        }

        if self.ly as usize >= SCREEN_HEIGHT && self.mode != Mode::VBlank {
            self.mode = Mode::VBlank;
            irq |= Interrupt::VBLANK;
            if self.stat_enabled(STAT_MODE1) {
                irq |= Interrupt::STAT;
            }
            self.window_line = 0;
        }
        irq
    }

    /// Switch to the mode the current dot of a visible line belongs to.
    /// Entering pixel transfer draws the line.
    fn enter_mode_for_dot(&mut self) -> Interrupt {
        if self.ly as usize >= SCREEN_HEIGHT {
            return Interrupt::empty();
        }

        let (mode, stat_source) = if self.dots < OAM_SEARCH_DOTS {
            (Mode::OamSearch, Some(STAT_MODE2))
        } else if self.dots < TRANSFER_END_DOTS {
            (Mode::Transfer, None)
        } else {
            (Mode::HBlank, Some(STAT_MODE0))
        };
        if self.mode == mode {
            return Interrupt::empty();
        }

        if mode == Mode::Transfer {
            self.draw_line();
        }
        self.mode = mode;
        match stat_source {
            Some(bit) if self.stat_enabled(bit) => Interrupt::STAT,
            _ => Interrupt::empty(),
        }
    }

    pub(super) fn read_vram(&self, addr: u16) -> u8 {
        self.vram[self.vram_bank][(addr & 0x1FFF) as usize]
    }

    pub(super) fn write_vram(&mut self, addr: u16, value: u8) {
        self.vram[self.vram_bank][(addr & 0x1FFF) as usize] = value;
    }

    pub(super) fn read_oam(&self, offset: usize) -> u8 {
        self.oam.get(offset).copied().unwrap_or(0)
    }

    pub(super) fn write_oam(&mut self, offset: usize, value: u8) {
        if let Some(slot) = self.oam.get_mut(offset) {
            *slot = value;
        }
    }
}

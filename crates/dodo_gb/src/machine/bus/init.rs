use super::{GameboyBus, HRAM_SIZE, WRAM_SIZE};

impl GameboyBus {
    /// Put the bus and its peripherals into the state the boot ROM hands
    /// over at 0x0100. The cartridge is kept.
    pub(crate) fn reset(&mut self, cgb: bool) {
        self.cgb = cgb;
        self.wram = [0; WRAM_SIZE];
        self.hram = [0; HRAM_SIZE];
        self.wram_bank = 0;

        self.double_speed = false;
        self.speed_switch_prepare = false;
        self.hdma = Default::default();
        self.oam_dma_source = 0xFF;

        // Joypad: nothing selected, nothing pressed.
        self.joyp_select = 0x30;
        self.joyp_action = 0x0F;
        self.joyp_direction = 0x0F;

        self.serial.reset();
        // DIV/TIMA/TMA/TAC all start at zero.
        self.timer = super::Timer::new();
        self.apu.reset();
        // LCDC=0x91, STAT=0x85, BGP=0xFC, OBP0/OBP1=0xFF.
        self.ppu.reset(cgb);

        // V-blank is already requested when the cartridge starts.
        self.if_reg = 0x01;
        self.ie_reg = 0x00;

        log::debug!("bus reset ({} mode)", if cgb { "CGB" } else { "DMG" });
    }
}

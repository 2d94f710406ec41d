use super::rtc::{unix_now, Rtc, RTC_SAVE_LEN};
use super::{banked_read, banked_write, restore_ram, Mapper, SaveFile, RAM_BANK_SIZE, ROM_BANK_SIZE};

/// MBC3 controller with optional real-time clock.
pub(in super::super) struct Mbc3 {
    rom: Vec<u8>,
    ram: Vec<u8>,
    ram_enabled: bool,
    rom_bank: u8,
    /// 0x00-0x03 selects a RAM bank, 0x08-0x0C an RTC register.
    select: u8,
    /// Last value written to the latch register, for 0 -> 1 edge detection.
    latch: u8,
    rtc: Option<Rtc>,
    /// Wall-clock source in seconds, replaceable for tests.
    clock: fn() -> u64,
    save: Option<SaveFile>,
}

impl Mbc3 {
    pub(super) fn new(rom: Vec<u8>, ram_size: usize, has_rtc: bool, save: Option<SaveFile>) -> Self {
        let mut mbc = Self {
            rom,
            ram: vec![0; ram_size],
            ram_enabled: false,
            rom_bank: 1,
            select: 0,
            latch: 0xFF,
            rtc: None,
            clock: unix_now,
            save,
        };
        if has_rtc {
            mbc.rtc = Some(Rtc::new((mbc.clock)()));
        }
        mbc.restore();
        mbc
    }

    fn restore(&mut self) {
        let Some(saved) = self.save.as_ref().and_then(SaveFile::load) else {
            return;
        };

        let mut ram_part = saved.as_slice();
        if self.rtc.is_some() && saved.len() == self.ram.len() + RTC_SAVE_LEN {
            let (ram, record) = saved.split_at(self.ram.len());
            ram_part = ram;
            match Rtc::from_bytes(record) {
                Some(rtc) => self.rtc = Some(rtc),
                None => log::warn!("ignoring malformed RTC record"),
            }
        }
        restore_ram(&mut self.ram, ram_part);
    }

    fn rtc_register(&self) -> Option<usize> {
        match self.select {
            0x08..=0x0C => Some((self.select - 0x08) as usize),
            _ => None,
        }
    }
}

impl Mapper for Mbc3 {
    fn read_rom_lo(&self, addr: u16) -> u8 {
        banked_read(&self.rom, 0, ROM_BANK_SIZE, addr)
    }

    fn read_rom_hi(&self, offset: u16) -> u8 {
        banked_read(&self.rom, self.rom_bank as usize, ROM_BANK_SIZE, offset)
    }

    fn read_ram(&self, offset: u16) -> u8 {
        if !self.ram_enabled {
            return 0xFF;
        }
        match (self.rtc_register(), &self.rtc) {
            (Some(reg), Some(rtc)) => rtc.read(reg),
            (Some(_), None) => 0xFF,
            (None, _) => banked_read(&self.ram, (self.select & 0x03) as usize, RAM_BANK_SIZE, offset),
        }
    }

    fn write_rom_lo(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram_enabled = value & 0x0F == 0x0A,
            _ => self.rom_bank = (value & 0x7F).max(1),
        }
    }

    fn write_rom_hi(&mut self, offset: u16, value: u8) {
        match offset {
            0x0000..=0x1FFF => self.select = value,
            _ => {
                if self.latch == 0 && value == 1 {
                    let now = (self.clock)();
                    if let Some(rtc) = self.rtc.as_mut() {
                        rtc.latch(now);
                    }
                }
                self.latch = value;
            }
        }
    }

    fn write_ram(&mut self, offset: u16, value: u8) {
        if !self.ram_enabled {
            return;
        }
        match self.rtc_register() {
            Some(reg) => {
                let now = (self.clock)();
                if let Some(rtc) = self.rtc.as_mut() {
                    rtc.write(reg, value, now);
                }
            }
            None => {
                let bank = (self.select & 0x03) as usize;
                banked_write(&mut self.ram, bank, RAM_BANK_SIZE, offset, value);
            }
        }
    }

    fn save(&self) {
        let Some(save) = &self.save else {
            return;
        };
        let mut data = self.ram.clone();
        if let Some(rtc) = &self.rtc {
            data.extend_from_slice(&rtc.to_bytes());
        }
        save.store(&data);
    }
}

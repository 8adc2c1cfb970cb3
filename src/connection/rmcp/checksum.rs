/// The IPMB two's complement checksum: `sum(data) + checksum == 0 (mod 256)`.
pub struct Checksum {
    state: u8,
}

impl Default for Checksum {
    fn default() -> Self {
        Self::new()
    }
}

impl Checksum {
    pub fn new() -> Self {
        Self { state: 0 }
    }

    pub fn of(data: &[u8]) -> u8 {
        let mut me = Self::default();
        data.iter().for_each(|v| me.feed(*v));
        me.finalize()
    }

    pub fn feed(&mut self, data: u8) {
        self.state = self.state.wrapping_add(data);
    }

    pub fn finalize(&self) -> u8 {
        (!self.state).wrapping_add(1)
    }
}

#[test]
pub fn checksum_test() {
    assert_eq!(0xC8, Checksum::of(&[0x20, 0x06 << 2]));
    assert_eq!(0x00, Checksum::of(&[]));
}

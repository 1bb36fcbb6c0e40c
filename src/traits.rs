pub trait HardwareFlashDevice {
    type Error;

    /// Reads flash contents into `data`, starting at `addr`.
    fn read(&mut self, addr: u32, data: &mut [u8]) -> Result<(), Self::Error>;

    /// Sets all memory within the sector containing `addr` to the erased state.
    fn sector_erase(&mut self, addr: u32) -> Result<(), Self::Error>;

    /// Programs `data` at previously erased memory locations starting at `addr`.
    fn page_program(&mut self, addr: u32, data: &[u8]) -> Result<(), Self::Error>;

    /// Sets all memory within the device to the erased state.
    fn chip_erase(&mut self) -> Result<(), Self::Error>;
}

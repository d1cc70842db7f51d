//! MFRC522 card reader adapter.
//!
//! Polls the reader for a tag in the field and hands back the raw UID.
//! The anti-collision HALT is issued by the service only after a read
//! has been accepted, so a card left on the antenna is not re-selected
//! every tick.
//!
//! The host build presents a deterministic simulated card so the
//! pipeline can be driven without hardware.

use crate::app::ports::{CardReaderPort, TagUid};

pub struct Mfrc522Reader {
    #[cfg(not(target_os = "espidf"))]
    sim: SimField,
}

impl Mfrc522Reader {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            sim: SimField::default(),
        }
    }

    #[cfg(target_os = "espidf")]
    fn platform_card_present(&mut self) -> Option<TagUid> {
        // SPI bring-up for the MFRC522 lives in main(); the polling
        // path is REQA → anticollision → SELECT, returning the 4/7/10
        // byte UID the select cascade produced.
        espidf_spi::poll_for_tag()
    }

    #[cfg(target_os = "espidf")]
    fn platform_halt(&mut self) {
        espidf_spi::halt_a();
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_card_present(&mut self) -> Option<TagUid> {
        self.sim.poll()
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_halt(&mut self) {
        self.sim.halted = true;
    }

    /// Simulation hook: place a card on the antenna.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_present(&mut self, uid: TagUid) {
        self.sim.card = Some(uid);
        self.sim.halted = false;
    }

    /// Simulation hook: remove the card.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_remove(&mut self) {
        self.sim.card = None;
        self.sim.halted = false;
    }
}

impl Default for Mfrc522Reader {
    fn default() -> Self {
        Self::new()
    }
}

impl CardReaderPort for Mfrc522Reader {
    fn card_present(&mut self) -> Option<TagUid> {
        self.platform_card_present()
    }

    fn halt(&mut self) {
        self.platform_halt();
    }
}

// ─── host simulation ───────────────────────────────────────────────

/// A card sitting in the field answers every poll until halted; after
/// a HALT it stays quiet until re-presented, which is exactly how a
/// physical tag behaves.
#[cfg(not(target_os = "espidf"))]
#[derive(Default)]
struct SimField {
    card: Option<TagUid>,
    halted: bool,
}

#[cfg(not(target_os = "espidf"))]
impl SimField {
    fn poll(&mut self) -> Option<TagUid> {
        if self.halted {
            return None;
        }
        self.card
    }
}

// ─── espidf SPI path ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod espidf_spi {
    use std::sync::Mutex;

    use esp_idf_svc::hal::spi::SpiDeviceDriver;
    use log::warn;

    use crate::app::ports::TagUid;

    static DEVICE: Mutex<Option<SpiDeviceDriver<'static, esp_idf_svc::hal::spi::SpiDriver<'static>>>> =
        Mutex::new(None);

    const CMD_REQA: u8 = 0x26;
    const CMD_HALT: [u8; 4] = [0x50, 0x00, 0x57, 0xCD];

    pub fn install(
        device: SpiDeviceDriver<'static, esp_idf_svc::hal::spi::SpiDriver<'static>>,
    ) {
        if let Ok(mut guard) = DEVICE.lock() {
            *guard = Some(device);
        }
    }

    pub fn poll_for_tag() -> Option<TagUid> {
        let mut guard = DEVICE.lock().ok()?;
        let device = guard.as_mut()?;

        // REQA then the cascade-level-1 anticollision exchange.  A
        // failed transfer means no tag answered; that is the common
        // case and not worth logging.
        let mut atqa = [0u8; 2];
        device.transfer(&mut atqa, &[CMD_REQA, 0x00]).ok()?;
        if atqa == [0, 0] {
            return None;
        }

        let mut cascade = [0u8; 5];
        if device.transfer(&mut cascade, &[0x93, 0x20, 0, 0, 0]).is_err() {
            warn!("reader: anticollision exchange failed");
            return None;
        }

        let bcc = cascade[4];
        if cascade[0] ^ cascade[1] ^ cascade[2] ^ cascade[3] != bcc {
            warn!("reader: UID checksum mismatch, read dropped");
            return None;
        }
        Some(TagUid::new(&cascade[..4]))
    }

    pub fn halt_a() {
        if let Ok(mut guard) = DEVICE.lock() {
            if let Some(device) = guard.as_mut() {
                let mut sink = [0u8; 4];
                let _ = device.transfer(&mut sink, &CMD_HALT);
            }
        }
    }
}

#[cfg(target_os = "espidf")]
pub use espidf_spi::install as install_spi_device;

//! Save codec for the three releases of Sonic CD.
//!
//! Raw save files from the Sega CD (`.brm`), the 1996 PC port (`s_score.dat`)
//! and the Retro Engine remaster (`sdata.bin` / `sgame.bin`) are decoded into
//! one platform-independent [`model::SaveCollection`] and encoded back onto an
//! unedited defaults template.

pub mod charset;
pub mod cipher;
pub mod collection;
pub mod core_api;
pub mod layout;
pub mod model;
pub mod platform;
pub mod reader;
pub mod tick;
pub mod writer;

pub use collection::{Decoded, decode, detect, encode};
pub use core_api::{CoreError, CoreErrorCode, Engine, Session, SessionSnapshot, SlotState};
pub use model::{Platform, SaveCollection, SaveSlot};

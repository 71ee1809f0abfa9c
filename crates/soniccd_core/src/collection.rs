//! Format detection and whole-file decode/encode.

use crate::core_api::{CoreError, CoreErrorCode, SlotState};
use crate::model::{Options, Platform, SaveCollection};

/// A decoded save file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub platform: Platform,
    pub collection: SaveCollection,
    pub selected: usize,
    pub slot_states: Vec<SlotState>,
}

/// Finds the platform whose content validation accepts `bytes`. A hint is
/// tried first but never trusted on its own.
pub fn detect(bytes: &[u8], hint: Option<Platform>) -> Result<Platform, CoreError> {
    let order = hint
        .into_iter()
        .chain(Platform::ALL.into_iter().filter(|p| Some(*p) != hint));

    for platform in order {
        if platform.codec().detect(bytes) {
            tracing::debug!(%platform, len = bytes.len(), "detected save format");
            return Ok(platform);
        }
        tracing::debug!(%platform, len = bytes.len(), "save format rejected");
    }

    Err(CoreError::new(
        CoreErrorCode::FormatUnrecognized,
        format!(
            "could not determine save format of a {} byte file (expected a Sega CD image \
             of {}-byte banks, a {} byte PC save or a {} byte Retro save)",
            bytes.len(),
            Platform::SegaCd.layout().file_len,
            Platform::Pc.layout().file_len,
            Platform::Retro.layout().file_len,
        ),
    ))
}

pub fn decode(bytes: &[u8], hint: Option<Platform>) -> Result<Decoded, CoreError> {
    let platform = detect(bytes, hint)?;
    let codec = platform.codec();
    let layout = codec.layout();
    layout
        .validate(bytes.len())
        .map_err(|e| CoreError::io("invalid slot layout", e))?;

    let mut slots = Vec::with_capacity(layout.slot_count);
    let mut slot_states = Vec::with_capacity(layout.slot_count);
    for (index, range) in layout.slot_ranges().into_iter().enumerate() {
        let raw = range
            .slice(bytes)
            .map_err(|e| CoreError::io(&format!("slot {index}"), e))?;
        let (slot, state) = codec
            .decode_slot(index, raw)
            .map_err(|e| CoreError::io(&format!("failed to decode {platform} slot {index}"), e))?;
        slots.push(slot);
        slot_states.push(state);
    }

    let mut options = Options::default();
    let selected = codec
        .decode_shared(bytes, &mut slots, &mut options)
        .map_err(|e| CoreError::io(&format!("failed to decode {platform} shared data"), e))?;
    if selected >= slots.len() {
        return Err(CoreError::new(
            CoreErrorCode::InvalidSlot,
            format!("selected slot {selected} out of range for {platform}"),
        ));
    }

    let collection = SaveCollection::from_decoded(platform, slots, selected, options);
    Ok(Decoded {
        platform,
        collection,
        selected,
        slot_states,
    })
}

/// Overlays every non-empty slot and the file-wide data onto a copy of an
/// unedited template of the collection's platform.
pub fn encode(collection: &SaveCollection, template: &[u8]) -> Result<Vec<u8>, CoreError> {
    let platform = collection.platform();
    let codec = platform.codec();
    let layout = codec.layout();

    if !codec.accepts_template_len(template.len()) {
        return Err(CoreError::new(
            CoreErrorCode::TemplateMismatch,
            format!(
                "{platform} template must be {} bytes, got {}",
                layout.file_len,
                template.len()
            ),
        ));
    }
    layout
        .validate(template.len())
        .map_err(|e| CoreError::io("invalid slot layout", e))?;

    let mut file = template.to_vec();
    for (index, slot) in collection.slots().iter().enumerate() {
        if slot.is_empty {
            continue;
        }
        let bytes = codec
            .encode_slot(slot)
            .map_err(|e| CoreError::io(&format!("failed to encode {platform} slot {index}"), e))?;
        let target = layout
            .slot_range(index)
            .slice_mut(&mut file)
            .map_err(|e| CoreError::io(&format!("slot {index}"), e))?;
        target.copy_from_slice(&bytes);
    }

    codec
        .encode_shared(collection, &mut file)
        .map_err(|e| CoreError::io(&format!("failed to encode {platform} shared data"), e))?;
    Ok(file)
}

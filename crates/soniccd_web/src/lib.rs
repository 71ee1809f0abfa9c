use soniccd_core::core_api::{CoreError, CoreErrorCode, Engine, SessionSnapshot, SlotState};
use soniccd_core::model::Platform;
use soniccd_render::{JsonStyle, TextStyle, render_json_full, render_text};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct WebOptions {
    pub platform_hint: Option<String>,
    pub json_output: bool,
}

/// What the page needs to show and later re-encode a save.
#[derive(Debug, Clone, Serialize)]
pub struct DecodedSave {
    pub file_name: String,
    pub slot_states: Vec<String>,
    pub snapshot: SessionSnapshot,
}

#[derive(Debug, Clone)]
struct WebError {
    code: &'static str,
    message: String,
}

#[derive(Debug, Clone, Serialize)]
struct WebErrorPayload {
    code: String,
    message: String,
}

impl WebError {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn to_js_value(&self) -> JsValue {
        let payload = WebErrorPayload {
            code: self.code.to_string(),
            message: self.message.clone(),
        };
        serde_wasm_bindgen::to_value(&payload).unwrap_or_else(|_| {
            JsValue::from_str(&format!("{}: {}", payload.code, payload.message))
        })
    }
}

impl From<CoreError> for WebError {
    fn from(err: CoreError) -> Self {
        let code = match err.code {
            CoreErrorCode::FormatUnrecognized => "unsupported_file",
            CoreErrorCode::TemplateMismatch => "template_mismatch",
            CoreErrorCode::InvalidSnapshot => "invalid_snapshot",
            CoreErrorCode::InvalidSlot => "invalid_slot",
            CoreErrorCode::Io => "parse_failed",
        };
        Self::new(code, err.message)
    }
}

#[wasm_bindgen]
pub fn decode_save(file_name: &str, save_bytes: &[u8]) -> Result<JsValue, JsValue> {
    let decoded = decode_save_impl(file_name, save_bytes).map_err(|err| err.to_js_value())?;
    serde_wasm_bindgen::to_value(&decoded).map_err(|err| {
        WebError::new(
            "render_failed",
            format!("failed to convert decoded save: {err}"),
        )
        .to_js_value()
    })
}

#[wasm_bindgen]
pub fn encode_save(snapshot: JsValue, template_bytes: &[u8]) -> Result<Vec<u8>, JsValue> {
    let snapshot: SessionSnapshot = serde_wasm_bindgen::from_value(snapshot).map_err(|err| {
        WebError::new(
            "invalid_snapshot",
            format!("Failed to parse session snapshot: {err}"),
        )
        .to_js_value()
    })?;
    encode_save_impl(snapshot, template_bytes).map_err(|err| err.to_js_value())
}

#[wasm_bindgen]
pub fn render_save_text(save_bytes: &[u8], options: JsValue) -> Result<String, JsValue> {
    let parsed_options = parse_options(options).map_err(|err| err.to_js_value())?;
    render_save_text_impl(save_bytes, &parsed_options).map_err(|err| err.to_js_value())
}

fn decode_save_impl(file_name: &str, save_bytes: &[u8]) -> Result<DecodedSave, WebError> {
    reject_empty(save_bytes)?;
    let session = Engine::new().open_named(file_name, save_bytes)?;
    Ok(DecodedSave {
        file_name: session.file_name().to_string(),
        slot_states: session
            .slot_states()
            .iter()
            .map(|state| state.as_str().to_string())
            .collect(),
        snapshot: session.snapshot(),
    })
}

fn encode_save_impl(snapshot: SessionSnapshot, template_bytes: &[u8]) -> Result<Vec<u8>, WebError> {
    let session = Engine::new().restore(snapshot)?;
    Ok(session.encode(template_bytes)?)
}

fn render_save_text_impl(save_bytes: &[u8], options: &WebOptions) -> Result<String, WebError> {
    reject_empty(save_bytes)?;
    let hint = parse_platform_hint(options.platform_hint.as_deref())?;

    let session = Engine::new().open_bytes(save_bytes, hint)?;
    if session
        .slot_states()
        .iter()
        .any(|state| *state == SlotState::ChecksumMismatch)
    {
        tracing::warn!("rendering a save with checksum mismatches");
    }

    if options.json_output {
        let value = render_json_full(&session, JsonStyle::CanonicalV1);
        return serde_json::to_string_pretty(&value).map_err(|err| {
            WebError::new(
                "render_failed",
                format!("failed to serialize rendered JSON output: {err}"),
            )
        });
    }

    Ok(render_text(&session, TextStyle::Sheet))
}

fn reject_empty(save_bytes: &[u8]) -> Result<(), WebError> {
    if save_bytes.is_empty() {
        return Err(WebError::new(
            "unsupported_file",
            "The uploaded file is empty. Please provide a Sonic CD save file.",
        ));
    }
    Ok(())
}

fn parse_options(options: JsValue) -> Result<WebOptions, WebError> {
    if options.is_null() || options.is_undefined() {
        return Ok(WebOptions::default());
    }

    serde_wasm_bindgen::from_value(options).map_err(|err| {
        WebError::new(
            "invalid_options",
            format!("Failed to parse web render options: {err}"),
        )
    })
}

fn parse_platform_hint(raw_hint: Option<&str>) -> Result<Option<Platform>, WebError> {
    let Some(raw_hint) = raw_hint else {
        return Ok(None);
    };

    let normalized = raw_hint.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return Ok(None);
    }

    match normalized.as_str() {
        "sega-cd" | "segacd" | "cd" => Ok(Some(Platform::SegaCd)),
        "pc" => Ok(Some(Platform::Pc)),
        "retro" => Ok(Some(Platform::Retro)),
        _ => Err(WebError::new(
            "invalid_options",
            format!("Invalid platform_hint '{raw_hint}'. Expected one of: sega-cd, pc, retro"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use soniccd_core::platform::{retro, sega_cd};

    use super::{
        Platform, WebOptions, decode_save_impl, encode_save_impl, parse_platform_hint,
        render_save_text_impl,
    };

    fn sega_cd_blank() -> Vec<u8> {
        let mut file = vec![0u8; sega_cd::LAYOUT.file_len];
        let tail = file.len() - sega_cd::IDENTIFIER.len();
        file[tail..].copy_from_slice(sega_cd::IDENTIFIER);
        file
    }

    #[test]
    fn parse_platform_hint_accepts_aliases() {
        assert_eq!(
            parse_platform_hint(Some("Sega-CD")).expect("sega-cd should parse"),
            Some(Platform::SegaCd)
        );
        assert_eq!(
            parse_platform_hint(Some("retro")).expect("retro should parse"),
            Some(Platform::Retro)
        );
        assert_eq!(
            parse_platform_hint(Some("   ")).expect("blank is allowed"),
            None
        );
        assert_eq!(parse_platform_hint(None).expect("none is allowed"), None);
    }

    #[test]
    fn parse_platform_hint_rejects_invalid_values() {
        let err = parse_platform_hint(Some("saturn")).expect_err("invalid hint should fail");
        assert_eq!(err.code, "invalid_options");
        assert!(err.message.contains("Invalid platform_hint"));
    }

    #[test]
    fn render_save_text_impl_renders_sega_cd_image() {
        let rendered = render_save_text_impl(&sega_cd_blank(), &WebOptions::default())
            .expect("blank image should render");
        assert!(rendered.contains("Sega CD save (soniccd.brm)"));
        assert!(rendered.contains("(empty)"));
    }

    #[test]
    fn render_save_text_impl_rejects_empty_and_unknown_payloads() {
        let err = render_save_text_impl(&[], &WebOptions::default())
            .expect_err("empty payload should fail");
        assert_eq!(err.code, "unsupported_file");

        let err = render_save_text_impl(&[1, 2, 3], &WebOptions::default())
            .expect_err("unknown payload should fail");
        assert_eq!(err.code, "unsupported_file");
    }

    #[test]
    fn render_save_text_impl_can_emit_json() {
        let options = WebOptions {
            json_output: true,
            platform_hint: Some("retro".to_string()),
        };
        let rendered = render_save_text_impl(&vec![0u8; retro::LAYOUT.file_len], &options)
            .expect("json output should render");

        let parsed: serde_json::Value =
            serde_json::from_str(&rendered).expect("json output should parse");
        assert_eq!(parsed["platform"], "Retro");
        assert_eq!(parsed["file_name"], "sdata.bin");
        assert!(parsed.get("slots").is_some());
    }

    #[test]
    fn decoded_snapshot_encodes_back_onto_its_template() {
        let template = sega_cd_blank();
        let decoded = decode_save_impl("SONICCD.BRM", &template).expect("blank image decodes");
        assert_eq!(decoded.file_name, "soniccd.brm");
        assert_eq!(decoded.slot_states, vec!["empty".to_string()]);

        let mut snapshot = decoded.snapshot;
        snapshot.slots[0].is_empty = false;
        snapshot.slots[0].single_player.stage = 4;
        snapshot.slots[0].time_attack.records[0][0].sec = 50;
        let bytes = encode_save_impl(snapshot, &template).expect("snapshot encodes");

        let reopened = decode_save_impl("SONICCD.BRM", &bytes).expect("encoded image decodes");
        assert_eq!(reopened.slot_states, vec!["present".to_string()]);
        assert_eq!(reopened.snapshot.slots[0].single_player.stage, 4);
    }

    #[test]
    fn encode_save_impl_reports_template_mismatch() {
        let decoded = decode_save_impl("x.brm", &sega_cd_blank()).expect("blank image decodes");
        let err = encode_save_impl(decoded.snapshot, &[0u8; 10]).expect_err("short template");
        assert_eq!(err.code, "template_mismatch");
    }
}
